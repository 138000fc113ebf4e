//! Geometry sub-score: how alike the products are and how efficiently the
//! layout uses its bounding box.

use crate::config::GeometryConfig;
use u_molding_core::stats::{clamp_score, coefficient_of_variation, mean, min_max_ratio};
use u_molding_core::{Layout, Product, GEOM_EPS};

/// Breakdown of the geometry sub-score.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GeometryReport {
    /// Final geometry score (0-100).
    pub score: f64,
    /// Mean pairwise similarity (0-100).
    pub similarity: f64,
    /// Combined efficiency (0-100).
    pub efficiency: f64,
    /// Planar density score (0-100).
    pub planar_density: f64,
    /// Volume utilization score (0-100).
    pub volume_utilization: f64,
    /// Height evenness score (0-100).
    pub height_evenness: f64,
}

impl GeometryReport {
    fn uniform(score: f64) -> Self {
        Self {
            score,
            similarity: score,
            efficiency: score,
            planar_density: score,
            volume_utilization: score,
            height_evenness: score,
        }
    }
}

/// Computes the geometry sub-score.
///
/// `layout.rects[i]` must belong to `products[i]`; the caller checks counts.
pub fn geometry_report(
    layout: &Layout,
    products: &[Product],
    config: &GeometryConfig,
) -> GeometryReport {
    if products.is_empty() {
        return GeometryReport::uniform(0.0);
    }
    if products.len() == 1 || all_identical(products) {
        return GeometryReport::uniform(100.0);
    }

    let mut pair_scores = Vec::with_capacity(products.len() * (products.len() - 1) / 2);
    for (i, a) in products.iter().enumerate() {
        for b in &products[i + 1..] {
            pair_scores.push(pair_similarity(a, b, config));
        }
    }
    let similarity = clamp_score(100.0 * mean(&pair_scores));

    let planar_density = planar_density_score(layout, config);
    let volume_utilization = volume_utilization_score(layout, products);
    let height_evenness = height_evenness_score(products);

    let eff_total =
        config.density_weight + config.volume_utilization_weight + config.height_weight;
    let efficiency = if eff_total > 0.0 {
        (config.density_weight * planar_density
            + config.volume_utilization_weight * volume_utilization
            + config.height_weight * height_evenness)
            / eff_total
    } else {
        0.0
    };

    let total = config.similarity_weight + config.efficiency_weight;
    let score = if total > 0.0 {
        (config.similarity_weight * similarity + config.efficiency_weight * efficiency) / total
    } else {
        0.0
    };

    GeometryReport {
        score: clamp_score(score),
        similarity,
        efficiency: clamp_score(efficiency),
        planar_density,
        volume_utilization,
        height_evenness,
    }
}

/// Computes the geometry sub-score only.
pub fn geometry_score(layout: &Layout, products: &[Product], config: &GeometryConfig) -> f64 {
    geometry_report(layout, products, config).score
}

fn all_identical(products: &[Product]) -> bool {
    let first = &products[0];
    products[1..].iter().all(|p| {
        let same_dims = close(p.dimensions.length, first.dimensions.length)
            && close(p.dimensions.width, first.dimensions.width)
            && close(p.dimensions.height, first.dimensions.height);
        let same_weight = match (p.effective_weight(), first.effective_weight()) {
            (Some(a), Some(b)) => close(a, b),
            (None, None) => true,
            _ => false,
        };
        same_dims && same_weight
    })
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() <= 1e-6 * a.abs().max(b.abs()).max(1.0)
}

/// Normalized logistic curve through (0, 0) and (1, 1).
///
/// Ratios below the midpoint fall off faster than linearly.
pub fn aspect_s_curve(ratio: f64, steepness: f64, midpoint: f64) -> f64 {
    let sigmoid = |x: f64| 1.0 / (1.0 + (-steepness * (x - midpoint)).exp());
    let lo = sigmoid(0.0);
    let hi = sigmoid(1.0);
    if (hi - lo).abs() < GEOM_EPS {
        return ratio.clamp(0.0, 1.0);
    }
    ((sigmoid(ratio.clamp(0.0, 1.0)) - lo) / (hi - lo)).clamp(0.0, 1.0)
}

/// Similarity of two products in [0, 1].
pub fn pair_similarity(a: &Product, b: &Product, config: &GeometryConfig) -> f64 {
    let ar_a = a.footprint().aspect_ratio();
    let ar_b = b.footprint().aspect_ratio();
    let ar_ratio = min_max_ratio(ar_a, ar_b);
    let mut aspect = aspect_s_curve(
        ar_ratio,
        config.aspect_curve_steepness,
        config.aspect_curve_midpoint,
    );
    if ar_a.max(ar_b) > config.extreme_aspect_ratio && ar_ratio < 0.9 {
        aspect *= config.extreme_aspect_penalty;
    }

    let volume = min_max_ratio(a.volume(), b.volume());
    let surface = min_max_ratio(a.surface_area(), b.surface_area());
    let shape_total = config.aspect_weight + config.volume_weight + config.surface_weight;
    let shape = if shape_total > 0.0 {
        (config.aspect_weight * aspect
            + config.volume_weight * volume
            + config.surface_weight * surface)
            / shape_total
    } else {
        0.0
    };

    let da = sorted_extents(a);
    let db = sorted_extents(b);
    let axis_ratios = [
        min_max_ratio(da[0], db[0]),
        min_max_ratio(da[1], db[1]),
        min_max_ratio(da[2], db[2]),
    ];
    let axis = mean(&axis_ratios);
    let consistency = (1.0 - coefficient_of_variation(&axis_ratios)).clamp(0.0, 1.0);
    let dimension = 0.7 * axis + 0.3 * consistency;

    let total = config.shape_weight + config.dimension_weight;
    if total > 0.0 {
        (config.shape_weight * shape + config.dimension_weight * dimension) / total
    } else {
        0.0
    }
}

/// `[long planar edge, short planar edge, height]`; rotation-independent.
fn sorted_extents(p: &Product) -> [f64; 3] {
    let fp = p.footprint();
    [fp.max_dimension(), fp.width.min(fp.length), p.dimensions.height]
}

fn planar_density_score(layout: &Layout, config: &GeometryConfig) -> f64 {
    if layout.area <= GEOM_EPS {
        return 0.0;
    }
    let density = layout.used_area() / layout.area;
    let score = if density > 1.0 {
        100.0 * (1.0 - config.overlap_penalty * (density - 1.0).powi(2))
    } else if density >= config.ideal_density {
        100.0
    } else {
        100.0 * density / config.ideal_density
    };
    clamp_score(score)
}

fn volume_utilization_score(layout: &Layout, products: &[Product]) -> f64 {
    let max_height = products
        .iter()
        .map(|p| p.dimensions.height)
        .fold(0.0, f64::max);
    let bounding_volume = layout.area * max_height;
    if bounding_volume <= GEOM_EPS {
        return 0.0;
    }
    let total: f64 = products.iter().map(Product::volume).sum();
    clamp_score(100.0 * (total / bounding_volume).min(1.0).sqrt())
}

fn height_evenness_score(products: &[Product]) -> f64 {
    let heights: Vec<f64> = products.iter().map(|p| p.dimensions.height).collect();
    let evenness = (1.0 - coefficient_of_variation(&heights)).clamp(0.0, 1.0);
    clamp_score(100.0 * evenness * evenness)
}
