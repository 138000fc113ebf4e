//! Packer configuration.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Upper bound on randomized mutation rounds per rotation candidate.
pub const MAX_MUTATION_ROUNDS: usize = 8;

/// Configuration for [`LayoutPacker`](crate::LayoutPacker).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PackerConfig {
    /// Seed for the mutation RNG. A fixed seed makes packing reproducible.
    pub seed: u64,

    /// Randomized rotation mutations tried per candidate (at most 8).
    pub mutation_rounds: usize,

    /// Items whose aspect ratio is within this fraction of 1.0 are never
    /// auto-rotated by the preferred-rotation heuristic.
    pub near_square_tolerance: f64,

    /// Items with at least this fraction of the largest area get their own
    /// perturbed rotation candidate.
    pub large_item_fraction: f64,

    /// Maximum number of perturbed candidates.
    pub max_perturbed_items: usize,

    /// Attempts whose scores differ by at most this many area units are
    /// compared by fill ratio instead.
    pub tie_tolerance: f64,

    /// Penalty factor applied to `|aspect_ratio - 1|` of the bounding box.
    pub aspect_penalty: f64,

    /// Plate module: the packed extent (boxes plus their trailing spacing)
    /// is rounded up to a multiple of this before the spacing is removed.
    /// Zero reports the tight extent.
    pub size_module: f64,
}

impl Default for PackerConfig {
    fn default() -> Self {
        Self {
            seed: 0x5eed_cafe,
            mutation_rounds: MAX_MUTATION_ROUNDS,
            near_square_tolerance: 0.1,
            large_item_fraction: 0.5,
            max_perturbed_items: 4,
            tie_tolerance: 100.0,
            aspect_penalty: 0.1,
            size_module: 25.0,
        }
    }
}

impl PackerConfig {
    /// Creates a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the mutation RNG seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Sets the number of mutation rounds (clamped to 8).
    pub fn with_mutation_rounds(mut self, rounds: usize) -> Self {
        self.mutation_rounds = rounds.min(MAX_MUTATION_ROUNDS);
        self
    }

    /// Sets the near-square tolerance.
    pub fn with_near_square_tolerance(mut self, tolerance: f64) -> Self {
        self.near_square_tolerance = tolerance.max(0.0);
        self
    }

    /// Sets the large-item fraction (0.0 - 1.0).
    pub fn with_large_item_fraction(mut self, fraction: f64) -> Self {
        self.large_item_fraction = fraction.clamp(0.0, 1.0);
        self
    }

    /// Sets the near-tie tolerance in area units.
    pub fn with_tie_tolerance(mut self, tolerance: f64) -> Self {
        self.tie_tolerance = tolerance.max(0.0);
        self
    }

    /// Sets the bounding-box aspect penalty.
    pub fn with_aspect_penalty(mut self, penalty: f64) -> Self {
        self.aspect_penalty = penalty.max(0.0);
        self
    }

    /// Sets the plate module (0 disables rounding).
    pub fn with_size_module(mut self, module: f64) -> Self {
        self.size_module = module.max(0.0);
        self
    }
}

/// Material constants for mold weight derivation.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MoldConfig {
    /// Density of the mold material in weight units per cubic length unit.
    /// Default: tool steel, 7.85e-6 kg/mm³.
    pub material_density: f64,
}

impl Default for MoldConfig {
    fn default() -> Self {
        Self {
            material_density: 7.85e-6,
        }
    }
}

impl MoldConfig {
    /// Creates a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the mold material density.
    pub fn with_material_density(mut self, density: f64) -> Self {
        self.material_density = density.max(0.0);
        self
    }
}
