//! Candidate partitions and their evaluated form.

use u_molding_balance::BalanceScore;
use u_molding_core::Layout;
use u_molding_layout::MoldSpec;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Score of a singleton group.
pub const SINGLETON_SCORE: f64 = 100.0;

/// Score of a multi-member group before its layout has been evaluated.
pub const PENDING_SCORE: f64 = 0.0;

/// One complete partition of the input products into groups.
///
/// Groups hold indices into the product slice that produced the scheme.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Scheme {
    /// Member indices per group, in enumeration order.
    pub groups: Vec<Vec<usize>>,
    /// Per-group score: 100 for a singleton, pending otherwise.
    pub group_scores: Vec<f64>,
    /// Mean of the group scores.
    pub score: f64,
}

impl Scheme {
    /// Builds a scheme and assigns its placeholder scores.
    pub fn new(groups: Vec<Vec<usize>>) -> Self {
        let group_scores: Vec<f64> = groups
            .iter()
            .map(|g| {
                if g.len() == 1 {
                    SINGLETON_SCORE
                } else {
                    PENDING_SCORE
                }
            })
            .collect();
        let score = if group_scores.is_empty() {
            0.0
        } else {
            group_scores.iter().sum::<f64>() / group_scores.len() as f64
        };
        Self {
            groups,
            group_scores,
            score,
        }
    }

    /// Number of groups (molds).
    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// Number of products covered.
    pub fn product_count(&self) -> usize {
        self.groups.iter().map(Vec::len).sum()
    }

    /// Order-independent identity: sorted members, groups sorted.
    pub fn membership_key(&self) -> Vec<Vec<usize>> {
        membership_key(&self.groups)
    }

    /// True if every index in `0..n` appears in exactly one group.
    pub fn is_partition_of(&self, n: usize) -> bool {
        let mut seen = vec![false; n];
        for &i in self.groups.iter().flatten() {
            if i >= n || seen[i] {
                return false;
            }
            seen[i] = true;
        }
        seen.into_iter().all(|s| s) && self.groups.iter().all(|g| !g.is_empty())
    }
}

/// Sorted-index-set key of a partition.
pub fn membership_key(groups: &[Vec<usize>]) -> Vec<Vec<usize>> {
    let mut key: Vec<Vec<usize>> = groups
        .iter()
        .map(|g| {
            let mut g = g.clone();
            g.sort_unstable();
            g
        })
        .collect();
    key.sort();
    key
}

/// One group after packing, scoring and pricing.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EvaluatedGroup {
    /// Member indices into the input products.
    pub members: Vec<usize>,
    /// Packed cavity layout; `layout.rects[i]` belongs to `members[i]`.
    pub layout: Layout,
    /// Balance score of the layout.
    pub balance: BalanceScore,
    /// Group score used for filtering: 100 for a singleton, the balance total otherwise.
    pub score: f64,
    /// Derived mold block.
    pub mold: MoldSpec,
    /// Mold price from the pricing model.
    pub mold_price: f64,
    /// Unit price per member, aligned with `members`.
    pub product_prices: Vec<f64>,
    /// Mold price plus unit prices times quantities.
    pub total_price: f64,
}

/// A scheme whose groups have all been evaluated.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EvaluatedScheme {
    /// Evaluated groups.
    pub groups: Vec<EvaluatedGroup>,
    /// Mean group score.
    pub score: f64,
    /// Sum of group prices.
    pub total_price: f64,
}

impl EvaluatedScheme {
    /// Number of molds.
    pub fn mold_count(&self) -> usize {
        self.groups.len()
    }

    /// Lowest group score (100 for an empty scheme).
    pub fn min_group_score(&self) -> f64 {
        self.groups
            .iter()
            .map(|g| g.score)
            .fold(SINGLETON_SCORE, f64::min)
    }
}
