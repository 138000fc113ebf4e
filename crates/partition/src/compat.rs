//! Color and material compatibility between products sharing a mold.

use crate::config::{MoldDistributionConfig, PartitionConfig};
use u_molding_core::Product;

/// Which product attributes must match inside a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GroupingRules {
    /// Colors may differ.
    pub allow_different_colors: bool,
    /// Materials may differ.
    pub allow_different_materials: bool,
}

impl GroupingRules {
    /// Creates rules from the two relaxation flags.
    pub fn new(allow_different_colors: bool, allow_different_materials: bool) -> Self {
        Self {
            allow_different_colors,
            allow_different_materials,
        }
    }

    /// Rules taken from a partition configuration.
    pub fn from_partition(config: &PartitionConfig) -> Self {
        Self::new(
            config.allow_different_colors,
            config.allow_different_materials,
        )
    }

    /// Rules taken from a mold distribution configuration.
    pub fn from_distribution(config: &MoldDistributionConfig) -> Self {
        Self::new(
            config.allow_different_colors,
            config.allow_different_materials,
        )
    }

    /// True if `candidate` may join a group whose reference member is `reference`.
    pub fn compatible(&self, reference: &Product, candidate: &Product) -> bool {
        (self.allow_different_colors || reference.color == candidate.color)
            && (self.allow_different_materials || reference.material == candidate.material)
    }

    /// True if `candidate` may join `group`, judged against its first member.
    /// Any product may start an empty group.
    pub fn accepts(&self, products: &[Product], group: &[usize], candidate: usize) -> bool {
        group
            .first()
            .map_or(true, |&r| self.compatible(&products[r], &products[candidate]))
    }
}
