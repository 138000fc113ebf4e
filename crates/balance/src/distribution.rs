//! Distribution sub-score: physical balance of mass across the layout.
//!
//! # Parts
//!
//! - **Physics**: isotropy of the planar inertia tensor and deviation of
//!   rectangle centers from an area-weighted average radius.
//! - **Spatial**: grid occupancy and neighbour evenness.
//! - **Volume balance**: density, height and mass uniformity, mirror
//!   symmetry, angular and radial regularity.
//!
//! The parts are blended, then small bonuses are added for agreement
//! between the parts, recognized arrangement patterns and consistent
//! spacing.

use crate::config::DistributionConfig;
use crate::inertia::{inertia_2d_with_limit, InertiaState2D, MassPoint2};
use crate::occupancy::occupancy_score;
use crate::patterns::{detect_patterns, PatternSet};
use crate::symmetry::{
    angular_regularity, mirror_scores, radial_regularity, CenterIndex, MirrorScores,
};
use nalgebra::Point2;
use u_molding_core::stats::{clamp_score, coefficient_of_variation};
use u_molding_core::{Layout, Product, GEOM_EPS};

/// Breakdown of the volume-balance part.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct VolumeBalanceReport {
    /// Weighted volume-balance score (0-100).
    pub score: f64,
    /// Uniformity of mass per footprint area (0-100).
    pub density: f64,
    /// Uniformity of heights (0-100).
    pub height: f64,
    /// Uniformity of masses (0-100).
    pub mass: f64,
    /// Mirror scores about the bounding-box center.
    pub symmetry: MirrorScores,
    /// Angular spacing regularity (0-100).
    pub angular: f64,
    /// Radial distance regularity (0-100).
    pub radial: f64,
}

/// Breakdown of the distribution sub-score.
#[derive(Debug, Clone, PartialEq)]
pub struct DistributionReport {
    /// Final distribution score (0-100).
    pub score: f64,
    /// Planar inertia state.
    pub inertia: InertiaState2D,
    /// Isotropy (0-100).
    pub isotropy: f64,
    /// Center-deviation score (0-100).
    pub center_deviation: f64,
    /// Physics part (0-100).
    pub physics: f64,
    /// Spatial occupancy part (0-100).
    pub spatial: f64,
    /// Volume-balance part.
    pub volume_balance: VolumeBalanceReport,
    /// Detected arrangement patterns.
    pub patterns: PatternSet,
    /// Agreement bonus.
    pub balance_bonus: f64,
    /// Gradient or hierarchical quality bonus.
    pub pattern_bonus: f64,
    /// Spacing consistency bonus.
    pub spacing_bonus: f64,
}

impl DistributionReport {
    fn empty() -> Self {
        Self {
            score: 0.0,
            inertia: inertia_2d_with_limit(&[], 1.5),
            isotropy: 0.0,
            center_deviation: 0.0,
            physics: 0.0,
            spatial: 0.0,
            volume_balance: VolumeBalanceReport::default(),
            patterns: PatternSet::default(),
            balance_bonus: 0.0,
            pattern_bonus: 0.0,
            spacing_bonus: 0.0,
        }
    }
}

/// Planar mass elements: rectangle centers weighted by product mass.
pub fn mass_points(layout: &Layout, products: &[Product]) -> Vec<MassPoint2> {
    layout
        .rects
        .iter()
        .zip(products)
        .map(|(r, p)| {
            let c = r.center();
            MassPoint2::new(c.x, c.y, p.scoring_mass())
        })
        .collect()
}

/// Isotropy score of an inertia state (0-100).
///
/// The principal moment ratio is passed through a power curve whose
/// exponent shrinks as the distribution factor grows; the factor is the
/// smallest of the moment ratio, an axis-angle factor and an orthogonality
/// factor.
pub fn isotropy_score(state: &InertiaState2D, config: &DistributionConfig) -> f64 {
    let [l1, l2] = state.principal_moments;
    if l1.abs() <= GEOM_EPS && l2.abs() <= GEOM_EPS {
        return 100.0;
    }
    if l2 < 1e-6 * l1 {
        return config.degenerate_isotropy;
    }
    let ratio = (l2 / l1).clamp(0.0, 1.0);
    let [v1, v2] = state.principal_axes;
    let theta = v1.y.atan2(v1.x);
    let angle_factor = 1.0 - 0.5 * (2.0 * theta).sin().abs();
    let orthogonality = 1.0 - v1.dot(&v2).abs();
    let factor = ratio.min(angle_factor).min(orthogonality).clamp(0.0, 1.0);
    clamp_score(100.0 * ratio.powf(1.0 - 0.5 * factor))
}

/// Center-deviation score (0-100).
///
/// Radii are measured from the center of mass. Deviation beyond
/// `radial_tolerance` from the area-weighted average radius is penalized,
/// scaled by the pattern leniency.
pub fn center_deviation_score(
    layout: &Layout,
    center: Point2<f64>,
    leniency: f64,
    config: &DistributionConfig,
) -> f64 {
    if layout.len() < 2 {
        return 100.0;
    }
    let items: Vec<(f64, f64)> = layout
        .rects
        .iter()
        .map(|r| (nalgebra::distance(&r.center(), &center), r.area()))
        .collect();
    let total_area: f64 = items.iter().map(|i| i.1).sum();
    if total_area <= GEOM_EPS {
        return 100.0;
    }
    let avg_radius = items.iter().map(|(r, a)| r * a).sum::<f64>() / total_area;
    if avg_radius <= GEOM_EPS {
        return 100.0;
    }
    let excess = items
        .iter()
        .map(|(r, a)| {
            let dev = (r - avg_radius).abs() / avg_radius;
            a * (dev - config.radial_tolerance).max(0.0)
        })
        .sum::<f64>()
        / total_area;
    clamp_score(100.0 * (1.0 - (excess * leniency).min(1.0)))
}

fn uniformity(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 100.0;
    }
    clamp_score(100.0 * (1.0 - coefficient_of_variation(values)))
}

/// Volume-balance part.
pub fn volume_balance(
    layout: &Layout,
    products: &[Product],
    index: &CenterIndex,
    config: &DistributionConfig,
) -> VolumeBalanceReport {
    let masses: Vec<f64> = products.iter().map(Product::scoring_mass).collect();
    let densities: Vec<f64> = layout
        .rects
        .iter()
        .zip(&masses)
        .map(|(r, m)| if r.area() > GEOM_EPS { m / r.area() } else { 0.0 })
        .collect();
    let heights: Vec<f64> = products.iter().map(|p| p.dimensions.height).collect();

    let symmetry = mirror_scores(layout, index);
    let density = uniformity(&densities);
    let height = uniformity(&heights);
    let mass = uniformity(&masses);
    let angular = angular_regularity(index.centers());
    let radial = radial_regularity(index.centers());

    let w = &config.volume_balance;
    let total = w.symmetry + w.density + w.height + w.mass + w.angular + w.radial;
    let score = if total > 0.0 {
        (w.symmetry * symmetry.best()
            + w.density * density
            + w.height * height
            + w.mass * mass
            + w.angular * angular
            + w.radial * radial)
            / total
    } else {
        0.0
    };

    VolumeBalanceReport {
        score: clamp_score(score),
        density,
        height,
        mass,
        symmetry,
        angular,
        radial,
    }
}

/// Computes the distribution sub-score.
///
/// `layout.rects[i]` must belong to `products[i]`; the caller checks counts.
pub fn distribution_report(
    layout: &Layout,
    products: &[Product],
    config: &DistributionConfig,
) -> DistributionReport {
    if products.is_empty() || layout.is_empty() {
        return DistributionReport::empty();
    }

    let points = mass_points(layout, products);
    let inertia = inertia_2d_with_limit(&points, config.spread_ratio_limit);
    let patterns = detect_patterns(layout, config);

    let isotropy = isotropy_score(&inertia, config);
    let center_deviation = center_deviation_score(
        layout,
        inertia.center_of_mass,
        patterns.leniency(config),
        config,
    );
    let physics_total = config.isotropy_weight + config.center_weight;
    let physics = if physics_total > 0.0 {
        (config.isotropy_weight * isotropy + config.center_weight * center_deviation)
            / physics_total
    } else {
        0.0
    };

    let spatial = occupancy_score(layout, config.max_grid_cells);
    let index = CenterIndex::new(layout);
    let volume = volume_balance(layout, products, &index, config);

    let total = config.physics_weight + config.spatial_weight + config.volume_weight;
    let base = if total > 0.0 {
        (config.physics_weight * physics
            + config.spatial_weight * spatial
            + config.volume_weight * volume.score)
            / total
    } else {
        0.0
    };

    let parts = [physics, spatial, volume.score];
    let hi = parts.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let lo = parts.iter().copied().fold(f64::INFINITY, f64::min);
    let balance_bonus = if hi - lo <= config.balance_bonus_spread {
        config.balance_bonus
    } else {
        0.0
    };

    let pattern_bonus = if patterns.gradient.is_some() || patterns.hierarchical.is_some() {
        config.pattern_bonus_max * patterns.quality()
    } else {
        0.0
    };

    let spacing_bonus = {
        let distances = index.nearest_neighbor_distances();
        let cv = coefficient_of_variation(&distances);
        if distances.len() >= 2 && cv < config.spacing_cv_limit && config.spacing_cv_limit > 0.0 {
            config.spacing_bonus_max * (1.0 - cv / config.spacing_cv_limit)
        } else {
            0.0
        }
    };

    let score = clamp_score(base + balance_bonus + pattern_bonus + spacing_bonus);
    log::trace!(
        "distribution: physics {:.1}, spatial {:.1}, volume {:.1}, bonus {:.1}/{:.1}/{:.1}",
        physics,
        spatial,
        volume.score,
        balance_bonus,
        pattern_bonus,
        spacing_bonus
    );

    DistributionReport {
        score,
        inertia,
        isotropy,
        center_deviation,
        physics,
        spatial,
        volume_balance: volume,
        patterns,
        balance_bonus,
        pattern_bonus,
        spacing_bonus,
    }
}

/// Computes the distribution sub-score only.
pub fn distribution_score(
    layout: &Layout,
    products: &[Product],
    config: &DistributionConfig,
) -> f64 {
    distribution_report(layout, products, config).score
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inertia::inertia_2d;
    use approx::assert_relative_eq;
    use u_molding_core::{Footprint, PlacedRect};

    fn grid_layout(n: usize) -> (Layout, Vec<Product>) {
        let fp = Footprint::new(20.0, 20.0);
        let mut rects = Vec::new();
        let mut products = Vec::new();
        for i in 0..n {
            for j in 0..n {
                rects.push(PlacedRect::new(fp, i as f64 * 30.0, j as f64 * 30.0, false));
                products.push(
                    Product::new(format!("p{}{}", i, j), 20.0, 20.0, 5.0).with_weight(10.0),
                );
            }
        }
        let extent = n as f64 * 30.0 - 10.0;
        (Layout::new(rects, extent, extent, 10.0), products)
    }

    #[test]
    fn test_isotropy_special_cases() {
        let config = DistributionConfig::default();
        let point = inertia_2d(&[MassPoint2::new(1.0, 1.0, 1.0)]);
        assert_eq!(isotropy_score(&point, &config), 100.0);

        let line = inertia_2d(&[
            MassPoint2::new(0.0, 0.0, 1.0),
            MassPoint2::new(10.0, 0.0, 1.0),
        ]);
        assert_eq!(isotropy_score(&line, &config), config.degenerate_isotropy);
    }

    #[test]
    fn test_square_grid_is_isotropic() {
        let (layout, products) = grid_layout(2);
        let report = distribution_report(&layout, &products, &DistributionConfig::default());
        assert_relative_eq!(report.isotropy, 100.0, epsilon = 1e-9);
        assert_relative_eq!(report.center_deviation, 100.0, epsilon = 1e-9);
        assert!(report.score > 90.0);
        assert!(report.score <= 100.0);
    }

    #[test]
    fn test_center_deviation_penalizes_outlier() {
        let config = DistributionConfig::default();
        let fp = Footprint::new(10.0, 10.0);
        let rects = vec![
            PlacedRect::new(fp, 0.0, 0.0, false),
            PlacedRect::new(fp, 20.0, 0.0, false),
            PlacedRect::new(fp, 10.0, 20.0, false),
            PlacedRect::new(fp, 200.0, 200.0, false),
        ];
        let layout = Layout::new(rects, 210.0, 210.0, 10.0);
        let products: Vec<Product> = (0..4)
            .map(|i| Product::new(format!("p{}", i), 10.0, 10.0, 5.0))
            .collect();
        let inertia = inertia_2d(&mass_points(&layout, &products));
        let strict = center_deviation_score(&layout, inertia.center_of_mass, 1.0, &config);
        let lenient = center_deviation_score(&layout, inertia.center_of_mass, 0.6, &config);
        assert!(strict < 100.0);
        assert!(lenient >= strict);
    }

    #[test]
    fn test_uneven_masses_lower_volume_balance() {
        let (layout, products) = grid_layout(2);
        let mut heavy = products.clone();
        heavy[0] = heavy[0].clone().with_weight(200.0);
        let config = DistributionConfig::default();
        let even = distribution_report(&layout, &products, &config);
        let uneven = distribution_report(&layout, &heavy, &config);
        assert!(uneven.volume_balance.score < even.volume_balance.score);
        assert!(uneven.isotropy <= even.isotropy + 1e-9);
    }

    #[test]
    fn test_empty_is_zero() {
        let report = distribution_report(&Layout::empty(), &[], &DistributionConfig::default());
        assert_eq!(report.score, 0.0);
    }
}
