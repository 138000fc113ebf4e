//! Flow sub-score: how evenly melt reaches every cavity from the injection
//! point.
//!
//! Flow lengths are classified as symmetric, progressive or unpatterned. A
//! progressive layout has sorted consecutive ratios clustered around a target
//! ratio. Layout complexity widens the tolerances and lowers that target.
//! Recognized patterns are penalized less for their spread and may earn a
//! final boost.

use crate::config::FlowConfig;
use nalgebra::Point2;
use u_molding_core::stats::{
    balance_score, clamp_score, coefficient_of_variation, max_relative_deviation, mean, std_dev,
};
use u_molding_core::{Layout, Product, GEOM_EPS};

/// Shape of the flow-length distribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FlowPattern {
    /// No recognized pattern.
    #[default]
    None,
    /// All flow lengths close to the mean.
    Symmetric,
    /// Sorted flow lengths grow by a steady ratio.
    Progressive,
}

/// Breakdown of the flow sub-score.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FlowReport {
    /// Final flow score (0-100).
    pub score: f64,
    /// Flow length per product, in input order.
    pub lengths: Vec<f64>,
    /// Layout complexity (0-1).
    pub complexity: f64,
    /// Detected pattern.
    pub pattern: FlowPattern,
    /// Flow-path balance (0-100).
    pub flow_balance: f64,
    /// Surface-area balance (0-100).
    pub surface_balance: f64,
    /// Volume balance (0-100).
    pub volume_balance: f64,
    /// Score before the pattern boost.
    pub pre_boost: f64,
    /// Boost fraction applied (0 when none).
    pub boost: f64,
}

/// Flow length of each product: the manual value when given, otherwise the
/// distance from `injection` to the rectangle center.
pub fn flow_lengths(layout: &Layout, products: &[Product], injection: Point2<f64>) -> Vec<f64> {
    layout
        .rects
        .iter()
        .zip(products)
        .map(|(rect, product)| match product.flow_length {
            Some(len) if len.is_finite() && len >= 0.0 => len,
            _ => nalgebra::distance(&rect.center(), &injection),
        })
        .collect()
}

/// Layout complexity in [0, 1]: mean of the spatial, shape and flow
/// coefficients of variation.
pub fn layout_complexity(layout: &Layout, lengths: &[f64]) -> f64 {
    if layout.len() < 2 {
        return 0.0;
    }
    let c = layout.center();
    let radii: Vec<f64> = layout
        .rects
        .iter()
        .map(|r| nalgebra::distance(&r.center(), &c))
        .collect();
    let areas: Vec<f64> = layout.rects.iter().map(|r| r.area()).collect();
    let spatial = coefficient_of_variation(&radii);
    let shape = coefficient_of_variation(&areas);
    let flow = coefficient_of_variation(lengths);
    ((spatial + shape + flow) / 3.0).clamp(0.0, 1.0)
}

/// Classifies flow lengths under the given complexity.
pub fn classify(lengths: &[f64], complexity: f64, config: &FlowConfig) -> FlowPattern {
    if lengths.len() < 2 {
        return FlowPattern::Symmetric;
    }
    let widen = 1.0 + config.complexity_widening * complexity;
    if max_relative_deviation(lengths) < config.symmetric_threshold * widen {
        return FlowPattern::Symmetric;
    }
    if lengths.len() >= 3 {
        let mut sorted = lengths.to_vec();
        sorted.sort_by(f64::total_cmp);
        let ratios: Vec<f64> = sorted
            .windows(2)
            .filter(|w| w[1] > GEOM_EPS)
            .map(|w| w[0] / w[1])
            .collect();
        // spread-out layouts drift toward smaller consecutive ratios
        let target = config.progressive_threshold / widen;
        let tolerance = config.progressive_tolerance * widen;
        if ratios.len() == sorted.len() - 1
            && (mean(&ratios) - target).abs() <= tolerance
            && std_dev(&ratios) <= tolerance
        {
            return FlowPattern::Progressive;
        }
    }
    FlowPattern::None
}

/// Computes the flow sub-score.
///
/// `layout.rects[i]` must belong to `products[i]`; the caller checks counts.
pub fn flow_report(
    layout: &Layout,
    products: &[Product],
    injection: Point2<f64>,
    config: &FlowConfig,
) -> FlowReport {
    if products.is_empty() {
        return FlowReport::default();
    }

    let lengths = flow_lengths(layout, products, injection);
    let complexity = layout_complexity(layout, &lengths);
    let pattern = classify(&lengths, complexity, config);

    let (range_factor, variance_factor) = match pattern {
        FlowPattern::Symmetric => (config.symmetric_range_factor, config.symmetric_variance_factor),
        FlowPattern::Progressive => (
            config.progressive_range_factor,
            config.progressive_variance_factor,
        ),
        FlowPattern::None => (1.0, 1.0),
    };

    let flow_balance = if lengths.len() < 2 {
        100.0
    } else {
        let m = mean(&lengths);
        let (lo, hi) = lengths
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
                (lo.min(*v), hi.max(*v))
            });
        let range = if m > GEOM_EPS { (hi - lo) / m } else { 0.0 };
        let cv = coefficient_of_variation(&lengths);
        let penalty = range_factor * config.range_weight * range
            + variance_factor * config.variance_weight * cv;
        clamp_score(100.0 * (1.0 - penalty.min(1.0)))
    };

    let surfaces: Vec<f64> = products.iter().map(Product::surface_area).collect();
    let volumes: Vec<f64> = products.iter().map(Product::volume).collect();
    let surface_balance = balance_score(&surfaces);
    let volume_balance = balance_score(&volumes);

    // complex layouts lean on the material balances
    let shift = config.complexity_shift * complexity;
    let w_flow = (config.flow_weight - shift).max(0.0);
    let w_surface = config.surface_weight + shift / 2.0;
    let w_volume = config.volume_weight + shift / 2.0;
    let total = w_flow + w_surface + w_volume;
    let pre_boost = if total > 0.0 {
        clamp_score(
            (w_flow * flow_balance + w_surface * surface_balance + w_volume * volume_balance)
                / total,
        )
    } else {
        0.0
    };

    let threshold = match pattern {
        FlowPattern::Symmetric => Some(config.symmetric_boost_threshold),
        FlowPattern::Progressive => Some(config.progressive_boost_threshold),
        FlowPattern::None => None,
    };
    let boost = match threshold {
        Some(t) if pre_boost > t && t < 100.0 => {
            config.min_boost + (config.max_boost - config.min_boost) * (pre_boost - t) / (100.0 - t)
        }
        _ => 0.0,
    };
    let score = clamp_score(pre_boost * (1.0 + boost));

    FlowReport {
        score,
        lengths,
        complexity,
        pattern,
        flow_balance,
        surface_balance,
        volume_balance,
        pre_boost,
        boost,
    }
}

/// Computes the flow sub-score only.
pub fn flow_score(
    layout: &Layout,
    products: &[Product],
    injection: Point2<f64>,
    config: &FlowConfig,
) -> f64 {
    flow_report(layout, products, injection, config).score
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use u_molding_core::{Footprint, PlacedRect};

    fn ring_layout() -> (Layout, Vec<Product>) {
        // four equal cavities around a central sprue
        let fp = Footprint::new(20.0, 20.0);
        let rects = vec![
            PlacedRect::new(fp, 0.0, 0.0, false),
            PlacedRect::new(fp, 40.0, 0.0, false),
            PlacedRect::new(fp, 0.0, 40.0, false),
            PlacedRect::new(fp, 40.0, 40.0, false),
        ];
        let products = (0..4)
            .map(|i| Product::new(format!("p{}", i), 20.0, 20.0, 10.0))
            .collect();
        (Layout::new(rects, 60.0, 60.0, 20.0), products)
    }

    #[test]
    fn test_balanced_ring_is_symmetric() {
        let (layout, products) = ring_layout();
        let injection = Point2::new(30.0, 30.0);
        let report = flow_report(&layout, &products, injection, &FlowConfig::default());
        assert_eq!(report.pattern, FlowPattern::Symmetric);
        assert_relative_eq!(report.flow_balance, 100.0, epsilon = 1e-9);
        assert_relative_eq!(report.score, 100.0, epsilon = 1e-9);
    }

    #[test]
    fn test_off_center_injection_is_worse() {
        let (layout, products) = ring_layout();
        let config = FlowConfig::default();
        let centered = flow_score(&layout, &products, Point2::new(30.0, 30.0), &config);
        let corner = flow_score(&layout, &products, Point2::new(0.0, 0.0), &config);
        assert!(corner < centered);
    }

    #[test]
    fn test_manual_flow_length_overrides() {
        let (layout, mut products) = ring_layout();
        products[0] = products[0].clone().with_flow_length(123.0);
        let lengths = flow_lengths(&layout, &products, Point2::new(30.0, 30.0));
        assert_eq!(lengths[0], 123.0);
        assert_relative_eq!(lengths[1], 20.0 * 2f64.sqrt());
    }

    #[test]
    fn test_progressive_detection() {
        // consecutive ratios of 0.6
        let lengths = vec![100.0, 100.0 / 0.6, 100.0 / 0.36, 100.0 / 0.216];
        let pattern = classify(&lengths, 0.0, &FlowConfig::default());
        assert_eq!(pattern, FlowPattern::Progressive);

        let scattered = vec![10.0, 100.0, 15.0, 300.0];
        assert_eq!(
            classify(&scattered, 0.0, &FlowConfig::default()),
            FlowPattern::None
        );
    }

    #[test]
    fn test_ratios_must_cluster_around_threshold() {
        let config = FlowConfig::default();
        // ratios 0.8, 1, 1: tight but far above 0.6
        let flat_tail = vec![80.0, 100.0, 100.0, 100.0];
        assert_eq!(classify(&flat_tail, 0.0, &config), FlowPattern::None);

        let steady = vec![80.0, 100.0, 125.0, 156.25];
        assert_eq!(classify(&steady, 0.0, &config), FlowPattern::None);
    }

    #[test]
    fn test_complexity_shifts_progressive_threshold() {
        let config = FlowConfig::default();
        // consecutive ratios of 0.45
        let lengths = vec![100.0, 100.0 / 0.45, 100.0 / 0.2025];
        assert_eq!(classify(&lengths, 0.0, &config), FlowPattern::None);
        // complexity 1 moves the target to 0.4 with tolerance 0.15
        assert_eq!(classify(&lengths, 1.0, &config), FlowPattern::Progressive);
    }

    #[test]
    fn test_complexity_widens_symmetric_threshold() {
        let config = FlowConfig::default();
        // max relative deviation 0.16
        let lengths = vec![84.0, 116.0, 100.0];
        assert_ne!(classify(&lengths, 0.0, &config), FlowPattern::Symmetric);
        assert_eq!(classify(&lengths, 1.0, &config), FlowPattern::Symmetric);
    }

    #[test]
    fn test_single_product_is_high() {
        let layout = Layout::new(
            vec![PlacedRect::new(Footprint::new(50.0, 30.0), 0.0, 0.0, false)],
            50.0,
            30.0,
            0.0,
        );
        let products = vec![Product::new("solo", 30.0, 50.0, 10.0)];
        let score = flow_score(&layout, &products, Point2::new(0.0, 0.0), &FlowConfig::default());
        assert!(score > 90.0);
    }
}
