//! Weight-balance feasibility of the products sharing one mold.
//!
//! A set of weights is *balanced* when
//!
//! - heaviest / lightest ≤ the weight-ratio allowance for the average weight
//! - heaviest − lightest ≤ the weight-difference allowance for the heaviest
//!
//! A mold is feasible when its products are balanced as a whole, or split
//! into two balanced halves whose totals are balanced against each other.

use u_molding_core::{LookupTables, GEOM_EPS};

/// Largest set split by exhaustive bitmask; larger sets use sorted cuts.
const MAX_BITMASK_ITEMS: usize = 16;

/// True if `weights` satisfy both allowance tables.
///
/// Sets of zero or one weight are balanced. A zero weight next to a
/// positive one never is.
pub fn is_balanced(weights: &[f64], tables: &LookupTables) -> bool {
    if weights.len() <= 1 {
        return true;
    }
    let (lo, hi, sum) = weights
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY, 0.0), |(lo, hi, s), &w| {
            (lo.min(w), hi.max(w), s + w)
        });
    if hi <= GEOM_EPS {
        return true;
    }
    if lo <= GEOM_EPS {
        return false;
    }
    let avg = sum / weights.len() as f64;
    let ratio_ok = hi / lo <= tables.weight_ratio.lookup_or_zero(avg) + GEOM_EPS;
    let diff_ok = hi - lo <= tables.weight_difference.lookup_or_zero(hi) + GEOM_EPS;
    ratio_ok && diff_ok
}

/// True if the products with `weights` may share a mold: balanced as a
/// whole, or divisible into two balanced sub-groups with balanced totals.
pub fn is_valid_grouping(weights: &[f64], tables: &LookupTables) -> bool {
    if weights.len() <= 1 || is_balanced(weights, tables) {
        return true;
    }
    balanced_split(weights, tables).is_some()
}

/// Finds a two-way split of `weights` into balanced halves with balanced
/// totals, returned as the index sets of both halves.
pub fn balanced_split(weights: &[f64], tables: &LookupTables) -> Option<(Vec<usize>, Vec<usize>)> {
    let n = weights.len();
    if n < 2 {
        return None;
    }
    let accept = |left: &[usize], right: &[usize]| -> bool {
        let a: Vec<f64> = left.iter().map(|&i| weights[i]).collect();
        let b: Vec<f64> = right.iter().map(|&i| weights[i]).collect();
        is_balanced(&a, tables)
            && is_balanced(&b, tables)
            && is_balanced(&[a.iter().sum(), b.iter().sum()], tables)
    };

    if n <= MAX_BITMASK_ITEMS {
        // item 0 always on the left so each split is visited once
        let full = (1u32 << n) - 1;
        for mask in (1..full).filter(|m| m & 1 == 1) {
            let (left, right): (Vec<usize>, Vec<usize>) =
                (0..n).partition(|&i| mask & (1 << i) != 0);
            if accept(&left, &right) {
                return Some((left, right));
            }
        }
        None
    } else {
        let mut order: Vec<usize> = (0..n).collect();
        order.sort_by(|&a, &b| weights[a].total_cmp(&weights[b]));
        (1..n).find_map(|cut| {
            let (left, right) = order.split_at(cut);
            accept(left, right).then(|| (left.to_vec(), right.to_vec()))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heavy_and_light_pair_is_invalid() {
        let tables = LookupTables::default();
        // average 425 sits in the <= 1000 tier (ratio allowance 2.0, here 16)
        // and a heaviest of 800 allows a difference of 200 (here 750)
        assert!(!is_balanced(&[800.0, 50.0], &tables));
        assert!(!is_valid_grouping(&[800.0, 50.0], &tables));
    }

    #[test]
    fn test_similar_weights_are_valid() {
        let tables = LookupTables::default();
        assert!(is_valid_grouping(&[100.0, 90.0, 110.0], &tables));
        assert!(is_valid_grouping(&[800.0], &tables));
        assert!(is_valid_grouping(&[], &tables));
    }

    #[test]
    fn test_allowances() {
        let tables = LookupTables::default();
        // ratio 5 is at the light-part allowance, difference 40 exceeds 20
        assert!(!is_balanced(&[10.0, 50.0], &tables));
        assert!(is_balanced(&[10.0, 25.0], &tables));
        // heavy parts: ratio 1.25 exceeds the 1.2 default above 3000
        assert!(!is_balanced(&[4000.0, 5000.0], &tables));
    }

    #[test]
    fn test_unsplittable_group() {
        let tables = LookupTables::default();
        assert!(!is_valid_grouping(&[100.0, 40.0, 100.0, 40.0], &tables));
    }

    #[test]
    fn test_two_way_split_rescues_group() {
        let tables = LookupTables::default();
        let weights = [90.0, 50.0, 90.0, 50.0, 50.0, 50.0];
        assert!(!is_balanced(&weights, &tables));
        assert!(is_valid_grouping(&weights, &tables));
        let (left, right) = balanced_split(&weights, &tables).unwrap();
        assert_eq!(left.len() + right.len(), weights.len());
        assert!(left.contains(&0));
    }

    #[test]
    fn test_zero_weight() {
        let tables = LookupTables::default();
        assert!(is_balanced(&[0.0, 0.0], &tables));
        assert!(!is_balanced(&[0.0, 10.0], &tables));
    }

    #[test]
    fn test_large_sets_use_sorted_cuts() {
        let tables = LookupTables::default();
        let mut weights = vec![45.0; 6];
        weights.extend(vec![20.0; 12]);
        assert!(!is_balanced(&weights, &tables));
        let (left, right) = balanced_split(&weights, &tables).unwrap();
        assert_eq!(left.len(), 12);
        assert!(right.iter().all(|&i| i < 6));
    }
}
