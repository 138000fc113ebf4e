//! Mold-distribution search.
//!
//! Spreads products over any number of molds with the same placement order
//! as scheme enumeration. A product only joins a mold whose reference member
//! it is compatible with. Weight balance is not monotone in the members
//! (`{100, 50}` fails while `{100, 50, 50}` passes), so it is checked on
//! complete distributions only. Complete distributions are deduplicated by
//! their sorted-membership key.

use crate::compat::GroupingRules;
use crate::config::MoldDistributionConfig;
use crate::enumerate::{Budget, CHECK_INTERVAL};
use crate::scheme::membership_key;
use crate::weight_balance::is_valid_grouping;
use std::collections::HashSet;
use std::sync::atomic::AtomicBool;
use u_molding_core::{validate_products, LookupTables, Product, Result};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Result of a mold-distribution search.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MoldDistribution {
    /// Distinct distributions; each lists the product indices per mold.
    pub distributions: Vec<Vec<Vec<usize>>>,
    /// True if a cap or the time limit cut the search short.
    pub truncated: bool,
    /// Complete distributions rejected as duplicates.
    pub duplicates: usize,
}

impl MoldDistribution {
    /// Number of distinct distributions.
    pub fn len(&self) -> usize {
        self.distributions.len()
    }

    /// True if none was found.
    pub fn is_empty(&self) -> bool {
        self.distributions.is_empty()
    }

    /// Distributions using the fewest molds.
    pub fn fewest_molds(&self) -> impl Iterator<Item = &Vec<Vec<usize>>> {
        let min = self.distributions.iter().map(Vec::len).min().unwrap_or(0);
        self.distributions.iter().filter(move |d| d.len() == min)
    }
}

/// Distributes `products` over molds with the default lookup tables.
pub fn distribute_molds(
    products: &[Product],
    config: &MoldDistributionConfig,
) -> Result<MoldDistribution> {
    distribute_molds_with(products, config, &LookupTables::default(), &AtomicBool::new(false))
}

/// Distributes `products` over molds with explicit tables and a cancel flag.
///
/// # Errors
///
/// - [`Error::InvalidInput`](u_molding_core::Error::InvalidInput) for
///   malformed products
/// - [`Error::Cancelled`](u_molding_core::Error::Cancelled) once `cancelled` is set
/// - overflow or timeout errors when the limits are strict
pub fn distribute_molds_with(
    products: &[Product],
    config: &MoldDistributionConfig,
    tables: &LookupTables,
    cancelled: &AtomicBool,
) -> Result<MoldDistribution> {
    validate_products(products)?;
    if products.is_empty() {
        return Ok(MoldDistribution::default());
    }

    let budget = Budget::new(&config.limits, cancelled);
    let mut search = Distributor {
        products,
        rules: GroupingRules::from_distribution(config),
        max_molds: config.max_molds,
        tables,
        budget: &budget,
        molds: Vec::new(),
        seen: HashSet::new(),
        out: MoldDistribution::default(),
        visited: 0,
        stopped: false,
    };
    search.place(0)?;

    log::debug!(
        "mold distribution: {} distinct, {} duplicates, {} nodes",
        search.out.distributions.len(),
        search.out.duplicates,
        search.visited
    );
    Ok(search.out)
}

struct Distributor<'a> {
    products: &'a [Product],
    rules: GroupingRules,
    max_molds: Option<usize>,
    tables: &'a LookupTables,
    budget: &'a Budget<'a>,
    molds: Vec<Vec<usize>>,
    seen: HashSet<Vec<Vec<usize>>>,
    out: MoldDistribution,
    visited: usize,
    stopped: bool,
}

impl Distributor<'_> {
    fn place(&mut self, next: usize) -> Result<()> {
        self.visited += 1;
        if self.visited % CHECK_INTERVAL == 0 && self.budget.exhausted()? {
            self.budget.on_timeout()?;
            self.stop();
            return Ok(());
        }

        if next == self.products.len() {
            return self.emit();
        }

        for m in 0..self.molds.len() {
            if !self.rules.accepts(self.products, &self.molds[m], next) {
                continue;
            }
            self.molds[m].push(next);
            self.place(next + 1)?;
            self.molds[m].pop();
            if self.stopped {
                return Ok(());
            }
        }

        if self.max_molds.map_or(true, |max| self.molds.len() < max) {
            self.molds.push(vec![next]);
            self.place(next + 1)?;
            self.molds.pop();
        }
        Ok(())
    }

    fn is_feasible(&self, mold: &[usize]) -> bool {
        let weights: Vec<f64> = mold
            .iter()
            .filter_map(|&i| self.products[i].effective_weight())
            .collect();
        is_valid_grouping(&weights, self.tables)
    }

    fn emit(&mut self) -> Result<()> {
        if !self.molds.iter().all(|mold| self.is_feasible(mold)) {
            return Ok(());
        }
        let key = membership_key(&self.molds);
        if self.seen.contains(&key) {
            self.out.duplicates += 1;
            return Ok(());
        }
        if self.out.distributions.len() >= self.budget.limits().max_schemes {
            self.budget.on_overflow()?;
            self.stop();
            return Ok(());
        }
        self.seen.insert(key);
        self.out.distributions.push(self.molds.clone());
        Ok(())
    }

    fn stop(&mut self) {
        self.stopped = true;
        self.out.truncated = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SearchLimits;
    use u_molding_core::Error;

    fn weighted(weights: &[f64]) -> Vec<Product> {
        weights
            .iter()
            .enumerate()
            .map(|(i, &w)| Product::new(format!("p{}", i), 40.0, 40.0, 10.0).with_weight(w))
            .collect()
    }

    #[test]
    fn test_unbalanced_pair_never_shares_a_mold() {
        let d = distribute_molds(&weighted(&[800.0, 50.0]), &MoldDistributionConfig::default())
            .unwrap();
        assert_eq!(d.distributions, vec![vec![vec![0], vec![1]]]);
    }

    #[test]
    fn test_balanced_products_cover_all_partitions() {
        let d = distribute_molds(
            &weighted(&[100.0, 100.0, 100.0, 100.0]),
            &MoldDistributionConfig::default(),
        )
        .unwrap();
        assert_eq!(d.len(), 15);
        assert_eq!(d.duplicates, 0);
        assert_eq!(d.fewest_molds().count(), 1);
    }

    #[test]
    fn test_max_molds() {
        let config = MoldDistributionConfig::new().with_max_molds(2);
        let d = distribute_molds(&weighted(&[100.0, 100.0, 100.0]), &config).unwrap();
        // 5 partitions of 3, minus the one with three molds
        assert_eq!(d.len(), 4);
        assert!(d.distributions.iter().all(|m| m.len() <= 2));

        let none = distribute_molds(&weighted(&[800.0, 50.0]), &config.with_max_molds(1)).unwrap();
        assert!(none.is_empty());
    }

    #[test]
    fn test_distributions_are_unique_partitions() {
        let products = weighted(&[100.0, 95.0, 300.0, 310.0, 20.0]);
        let d = distribute_molds(&products, &MoldDistributionConfig::default()).unwrap();
        let mut keys = HashSet::new();
        for dist in &d.distributions {
            let mut all: Vec<usize> = dist.iter().flatten().copied().collect();
            all.sort_unstable();
            assert_eq!(all, (0..products.len()).collect::<Vec<_>>());
            assert!(keys.insert(membership_key(dist)));
        }
    }

    #[test]
    fn test_infeasible_prefix_still_reaches_valid_mold() {
        let tables = LookupTables::default();
        assert!(!is_valid_grouping(&[100.0, 50.0], &tables));
        assert!(is_valid_grouping(&[100.0, 50.0, 50.0], &tables));

        let d = distribute_molds(
            &weighted(&[100.0, 50.0, 50.0]),
            &MoldDistributionConfig::default(),
        )
        .unwrap();
        assert!(d.distributions.contains(&vec![vec![0, 1, 2]]));
        assert!(!d.distributions.contains(&vec![vec![0, 1], vec![2]]));
        assert!(!d.distributions.contains(&vec![vec![0, 2], vec![1]]));
        assert_eq!(d.len(), 3);
    }

    #[test]
    fn test_strict_limit() {
        let config = MoldDistributionConfig::new()
            .with_limits(SearchLimits::new().with_max_schemes(3).with_strict(true));
        let err = distribute_molds(&weighted(&[100.0; 4]), &config).unwrap_err();
        assert!(matches!(err, Error::EnumerationOverflow { limit: 3 }));
    }
}
