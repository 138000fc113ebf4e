//! Partition search configuration.

use std::time::Duration;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Caps applied to partition enumeration.
///
/// Set partitions grow with the Bell numbers (4 140 for 8 products,
/// 4 213 597 for 12), so every search is bounded by a product count, a scheme
/// count and a wall-clock budget.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SearchLimits {
    /// Largest product count accepted by the exhaustive strategy.
    pub max_products: usize,

    /// Maximum number of complete schemes produced.
    pub max_schemes: usize,

    /// Wall-clock budget in milliseconds (0 = unlimited).
    pub time_limit_ms: u64,

    /// When set, hitting `max_schemes` or the time limit is an error instead
    /// of a truncated result.
    pub strict: bool,
}

impl Default for SearchLimits {
    fn default() -> Self {
        Self {
            max_products: 12,
            max_schemes: 50_000,
            time_limit_ms: 10_000,
            strict: false,
        }
    }
}

impl SearchLimits {
    /// Creates limits with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the exhaustive product cap (at least 1).
    pub fn with_max_products(mut self, max: usize) -> Self {
        self.max_products = max.max(1);
        self
    }

    /// Sets the scheme cap (at least 1).
    pub fn with_max_schemes(mut self, max: usize) -> Self {
        self.max_schemes = max.max(1);
        self
    }

    /// Sets the time limit in milliseconds (0 = unlimited).
    pub fn with_time_limit_ms(mut self, ms: u64) -> Self {
        self.time_limit_ms = ms;
        self
    }

    /// Turns caps into errors.
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// The time limit as a duration, if one is set.
    pub fn time_limit(&self) -> Option<Duration> {
        (self.time_limit_ms > 0).then(|| Duration::from_millis(self.time_limit_ms))
    }
}

/// How candidate partitions are generated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SearchStrategy {
    /// Full backtracking over every compatible partition, bounded by
    /// [`SearchLimits`].
    #[default]
    Exhaustive,
    /// Level-by-level expansion keeping only the best `width` partial
    /// partitions by footprint similarity.
    Beam {
        /// Number of partial partitions kept per level.
        width: usize,
    },
}

/// Where the injection point of a group's layout is placed.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum InjectionPolicy {
    /// Center of the packed layout.
    #[default]
    LayoutCenter,
    /// Fixed fraction of the packed width and length (0.5, 0.5 is the center).
    Relative {
        /// Fraction of the width.
        x: f64,
        /// Fraction of the length.
        y: f64,
    },
}

/// Configuration for partition enumeration and evaluation.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PartitionConfig {
    /// Group products of different colors.
    pub allow_different_colors: bool,

    /// Group products of different materials.
    pub allow_different_materials: bool,

    /// Enumeration caps.
    pub limits: SearchLimits,

    /// Enumeration strategy.
    pub strategy: SearchStrategy,

    /// Schemes containing a group scored below this are discarded.
    pub min_group_score: f64,

    /// Injection point used when scoring each group layout.
    pub injection: InjectionPolicy,

    /// Evaluate schemes and groups on the rayon thread pool.
    pub parallel: bool,
}

impl Default for PartitionConfig {
    fn default() -> Self {
        Self {
            allow_different_colors: false,
            allow_different_materials: false,
            limits: SearchLimits::default(),
            strategy: SearchStrategy::Exhaustive,
            min_group_score: 50.0,
            injection: InjectionPolicy::LayoutCenter,
            parallel: true,
        }
    }
}

impl PartitionConfig {
    /// Creates a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Allows or forbids mixed colors within a group.
    pub fn with_different_colors(mut self, allow: bool) -> Self {
        self.allow_different_colors = allow;
        self
    }

    /// Allows or forbids mixed materials within a group.
    pub fn with_different_materials(mut self, allow: bool) -> Self {
        self.allow_different_materials = allow;
        self
    }

    /// Sets the enumeration caps.
    pub fn with_limits(mut self, limits: SearchLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Sets the enumeration strategy. A beam width of 0 is raised to 1.
    pub fn with_strategy(mut self, strategy: SearchStrategy) -> Self {
        self.strategy = match strategy {
            SearchStrategy::Beam { width } => SearchStrategy::Beam {
                width: width.max(1),
            },
            other => other,
        };
        self
    }

    /// Sets the minimum group score (0-100).
    pub fn with_min_group_score(mut self, score: f64) -> Self {
        self.min_group_score = score.clamp(0.0, 100.0);
        self
    }

    /// Sets the injection point policy. Relative fractions are clamped to [0, 1].
    pub fn with_injection(mut self, injection: InjectionPolicy) -> Self {
        self.injection = match injection {
            InjectionPolicy::Relative { x, y } => InjectionPolicy::Relative {
                x: x.clamp(0.0, 1.0),
                y: y.clamp(0.0, 1.0),
            },
            other => other,
        };
        self
    }

    /// Enables or disables parallel evaluation.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }
}

/// Configuration for [`distribute_molds`](crate::distribute_molds).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MoldDistributionConfig {
    /// Put products of different colors in one mold.
    pub allow_different_colors: bool,

    /// Put products of different materials in one mold.
    pub allow_different_materials: bool,

    /// Upper bound on molds per distribution (`None` = unbounded).
    pub max_molds: Option<usize>,

    /// Enumeration caps. `max_products` is not enforced here.
    pub limits: SearchLimits,
}

impl Default for MoldDistributionConfig {
    fn default() -> Self {
        Self {
            allow_different_colors: false,
            allow_different_materials: false,
            max_molds: None,
            limits: SearchLimits::default(),
        }
    }
}

impl MoldDistributionConfig {
    /// Creates a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Allows or forbids mixed colors within a mold.
    pub fn with_different_colors(mut self, allow: bool) -> Self {
        self.allow_different_colors = allow;
        self
    }

    /// Allows or forbids mixed materials within a mold.
    pub fn with_different_materials(mut self, allow: bool) -> Self {
        self.allow_different_materials = allow;
        self
    }

    /// Caps the number of molds (at least 1).
    pub fn with_max_molds(mut self, max: usize) -> Self {
        self.max_molds = Some(max.max(1));
        self
    }

    /// Sets the enumeration caps.
    pub fn with_limits(mut self, limits: SearchLimits) -> Self {
        self.limits = limits;
        self
    }
}
