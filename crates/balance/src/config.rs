//! Scoring configuration.
//!
//! Every weight, threshold and cutoff the scorer uses lives here, so a call
//! can override any of them without touching shared state.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Top-level weights of the composite score.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TotalWeights {
    /// Weight of the geometry sub-score.
    pub geometry: f64,
    /// Weight of the flow sub-score.
    pub flow: f64,
    /// Weight of the distribution sub-score.
    pub distribution: f64,
}

impl Default for TotalWeights {
    fn default() -> Self {
        Self {
            geometry: 0.3,
            flow: 0.4,
            distribution: 0.3,
        }
    }
}

/// Geometry sub-score parameters.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GeometryConfig {
    /// Weight of pairwise similarity against layout efficiency.
    pub similarity_weight: f64,
    /// Weight of layout efficiency.
    pub efficiency_weight: f64,
    /// Weight of shape similarity within a pair.
    pub shape_weight: f64,
    /// Weight of dimension similarity within a pair.
    pub dimension_weight: f64,
    /// Weight of aspect-ratio similarity within shape similarity.
    pub aspect_weight: f64,
    /// Weight of volume similarity within shape similarity.
    pub volume_weight: f64,
    /// Weight of surface-area similarity within shape similarity.
    pub surface_weight: f64,
    /// Steepness of the aspect-ratio S-curve.
    pub aspect_curve_steepness: f64,
    /// Midpoint of the aspect-ratio S-curve.
    pub aspect_curve_midpoint: f64,
    /// Aspect ratio beyond which mismatched pairs are hard-penalized.
    pub extreme_aspect_ratio: f64,
    /// Multiplier applied in the extreme aspect region.
    pub extreme_aspect_penalty: f64,
    /// Weight of planar density within efficiency.
    pub density_weight: f64,
    /// Weight of volume utilization within efficiency.
    pub volume_utilization_weight: f64,
    /// Weight of height evenness within efficiency.
    pub height_weight: f64,
    /// Planar density considered ideal.
    pub ideal_density: f64,
    /// Quadratic penalty factor for planar density above 1.0.
    pub overlap_penalty: f64,
}

impl Default for GeometryConfig {
    fn default() -> Self {
        Self {
            similarity_weight: 0.6,
            efficiency_weight: 0.4,
            shape_weight: 0.6,
            dimension_weight: 0.4,
            aspect_weight: 0.5,
            volume_weight: 0.3,
            surface_weight: 0.2,
            aspect_curve_steepness: 10.0,
            aspect_curve_midpoint: 0.7,
            extreme_aspect_ratio: 3.0,
            extreme_aspect_penalty: 0.5,
            density_weight: 0.4,
            volume_utilization_weight: 0.3,
            height_weight: 0.3,
            ideal_density: 0.9,
            overlap_penalty: 4.0,
        }
    }
}

/// Flow sub-score parameters.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FlowConfig {
    /// Nominal max relative deviation for a symmetric flow pattern.
    pub symmetric_threshold: f64,
    /// Nominal consecutive ratio a progressive flow pattern clusters around.
    pub progressive_threshold: f64,
    /// Allowed distance of the ratios (mean and spread) from that target.
    pub progressive_tolerance: f64,
    /// How strongly layout complexity widens the pattern thresholds.
    pub complexity_widening: f64,
    /// Range penalty factor for symmetric layouts.
    pub symmetric_range_factor: f64,
    /// Variance penalty factor for symmetric layouts.
    pub symmetric_variance_factor: f64,
    /// Range penalty factor for progressive layouts.
    pub progressive_range_factor: f64,
    /// Variance penalty factor for progressive layouts.
    pub progressive_variance_factor: f64,
    /// Base weight of the range penalty.
    pub range_weight: f64,
    /// Base weight of the variance penalty.
    pub variance_weight: f64,
    /// Weight of flow-path balance.
    pub flow_weight: f64,
    /// Weight of surface-area balance.
    pub surface_weight: f64,
    /// Weight of volume balance.
    pub volume_weight: f64,
    /// Flow weight moved to the other balances per unit of complexity.
    pub complexity_shift: f64,
    /// Pre-boost score a symmetric layout must exceed to be boosted.
    pub symmetric_boost_threshold: f64,
    /// Pre-boost score a progressive layout must exceed to be boosted.
    pub progressive_boost_threshold: f64,
    /// Boost applied just above the threshold.
    pub min_boost: f64,
    /// Boost applied at a perfect pre-boost score.
    pub max_boost: f64,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            symmetric_threshold: 0.15,
            progressive_threshold: 0.6,
            progressive_tolerance: 0.1,
            complexity_widening: 0.5,
            symmetric_range_factor: 0.2,
            symmetric_variance_factor: 0.1,
            progressive_range_factor: 0.5,
            progressive_variance_factor: 0.3,
            range_weight: 0.5,
            variance_weight: 1.0,
            flow_weight: 0.7,
            surface_weight: 0.15,
            volume_weight: 0.15,
            complexity_shift: 0.1,
            symmetric_boost_threshold: 60.0,
            progressive_boost_threshold: 70.0,
            min_boost: 0.05,
            max_boost: 0.20,
        }
    }
}

/// Weights of the six volume-balance components.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct VolumeBalanceWeights {
    /// Mirror symmetry about the bounding-box center.
    pub symmetry: f64,
    /// Footprint density (mass per footprint area) uniformity.
    pub density: f64,
    /// Height uniformity.
    pub height: f64,
    /// Mass uniformity.
    pub mass: f64,
    /// Angular spacing regularity around the centroid.
    pub angular: f64,
    /// Radial distance regularity around the centroid.
    pub radial: f64,
}

impl Default for VolumeBalanceWeights {
    fn default() -> Self {
        Self {
            symmetry: 0.3,
            density: 0.3,
            height: 0.1,
            mass: 0.1,
            angular: 0.1,
            radial: 0.1,
        }
    }
}

/// Distribution sub-score parameters.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DistributionConfig {
    /// Weight of the physics (inertia) score.
    pub physics_weight: f64,
    /// Weight of the spatial occupancy score.
    pub spatial_weight: f64,
    /// Weight of the volume-balance score.
    pub volume_weight: f64,
    /// Weight of isotropy within the physics score.
    pub isotropy_weight: f64,
    /// Weight of center deviation within the physics score.
    pub center_weight: f64,
    /// Spread ratio above which the inertia tensor is corrected.
    pub spread_ratio_limit: f64,
    /// Isotropy reported for a degenerate single-axis distribution.
    pub degenerate_isotropy: f64,
    /// Radial deviation tolerated before it counts as excess.
    pub radial_tolerance: f64,
    /// Deviation multiplier when a gradient pattern is detected.
    pub gradient_leniency: f64,
    /// Deviation multiplier when a hierarchical pattern is detected.
    pub hierarchical_leniency: f64,
    /// Deviation multiplier when the layout is axis-aligned.
    pub axis_leniency: f64,
    /// Row clustering tolerance as a fraction of the average length.
    pub row_tolerance: f64,
    /// Minimum smallest/largest row size ratio for a hierarchy.
    pub hierarchy_balance: f64,
    /// Bonus when the three distribution parts agree.
    pub balance_bonus: f64,
    /// Maximum spread between the parts that still earns the bonus.
    pub balance_bonus_spread: f64,
    /// Maximum gradient/hierarchical quality bonus.
    pub pattern_bonus_max: f64,
    /// Maximum spacing-consistency bonus.
    pub spacing_bonus_max: f64,
    /// Nearest-neighbour distance CV above which no spacing bonus is given.
    pub spacing_cv_limit: f64,
    /// Maximum grid cells per axis for the occupancy score.
    pub max_grid_cells: usize,
    /// Weights of the volume-balance components.
    pub volume_balance: VolumeBalanceWeights,
}

impl Default for DistributionConfig {
    fn default() -> Self {
        Self {
            physics_weight: 0.3,
            spatial_weight: 0.3,
            volume_weight: 0.4,
            isotropy_weight: 0.5,
            center_weight: 0.5,
            spread_ratio_limit: 1.5,
            degenerate_isotropy: 20.0,
            radial_tolerance: 0.05,
            gradient_leniency: 0.6,
            hierarchical_leniency: 0.7,
            axis_leniency: 0.8,
            row_tolerance: 0.5,
            hierarchy_balance: 0.5,
            balance_bonus: 5.0,
            balance_bonus_spread: 20.0,
            pattern_bonus_max: 20.0,
            spacing_bonus_max: 5.0,
            spacing_cv_limit: 0.2,
            max_grid_cells: 64,
            volume_balance: VolumeBalanceWeights::default(),
        }
    }
}

/// Complete scorer configuration.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BalanceConfig {
    /// Composite weights.
    pub weights: TotalWeights,
    /// Geometry sub-score parameters.
    pub geometry: GeometryConfig,
    /// Flow sub-score parameters.
    pub flow: FlowConfig,
    /// Distribution sub-score parameters.
    pub distribution: DistributionConfig,
    /// Also run the 3D CAD symmetry analysis when CAD data is present.
    pub analyze_cad_symmetry: bool,
}

impl BalanceConfig {
    /// Creates a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the composite weights.
    pub fn with_weights(mut self, geometry: f64, flow: f64, distribution: f64) -> Self {
        self.weights = TotalWeights {
            geometry: geometry.max(0.0),
            flow: flow.max(0.0),
            distribution: distribution.max(0.0),
        };
        self
    }

    /// Sets the geometry parameters.
    pub fn with_geometry(mut self, geometry: GeometryConfig) -> Self {
        self.geometry = geometry;
        self
    }

    /// Sets the flow parameters.
    pub fn with_flow(mut self, flow: FlowConfig) -> Self {
        self.flow = flow;
        self
    }

    /// Sets the distribution parameters.
    pub fn with_distribution(mut self, distribution: DistributionConfig) -> Self {
        self.distribution = distribution;
        self
    }

    /// Enables or disables the 3D CAD symmetry analysis.
    pub fn with_cad_symmetry(mut self, enabled: bool) -> Self {
        self.analyze_cad_symmetry = enabled;
        self
    }
}
