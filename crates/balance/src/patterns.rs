//! Arrangement pattern detection.
//!
//! Layouts that deliberately grade item sizes across the cavity (gradient),
//! stack them in size rows (hierarchical), or line them up on a grid
//! (axis-aligned) are intentionally off-center. Detected patterns make the
//! center-deviation penalty more lenient and can earn a bonus.

use crate::config::DistributionConfig;
use u_molding_core::stats::{coefficient_of_variation, mean};
use u_molding_core::{Layout, GEOM_EPS};

/// Detected gradient pattern.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradientPattern {
    /// True if the gradient runs along x, false for y.
    pub along_x: bool,
    /// True if areas grow along the axis.
    pub increasing: bool,
    /// Regularity of the steps (0-1).
    pub quality: f64,
}

/// Detected hierarchical (row) pattern.
#[derive(Debug, Clone, PartialEq)]
pub struct HierarchicalPattern {
    /// Number of rectangles per row, bottom row first.
    pub level_sizes: Vec<usize>,
    /// Balance of row sizes (0-1).
    pub quality: f64,
}

/// Patterns found in a layout.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PatternSet {
    /// Monotonic area sequence along an axis.
    pub gradient: Option<GradientPattern>,
    /// Two or more balanced rows.
    pub hierarchical: Option<HierarchicalPattern>,
    /// All rectangles share row and column lines.
    pub axis_aligned: bool,
}

impl PatternSet {
    /// Multiplier applied to the center deviation (1 when nothing is detected).
    pub fn leniency(&self, config: &DistributionConfig) -> f64 {
        let mut factor: f64 = 1.0;
        if self.gradient.is_some() {
            factor = factor.min(config.gradient_leniency);
        }
        if self.hierarchical.is_some() {
            factor = factor.min(config.hierarchical_leniency);
        }
        if self.axis_aligned {
            factor = factor.min(config.axis_leniency);
        }
        factor
    }

    /// Best gradient or hierarchical quality (0-1).
    pub fn quality(&self) -> f64 {
        let g = self.gradient.map_or(0.0, |g| g.quality);
        let h = self.hierarchical.as_ref().map_or(0.0, |h| h.quality);
        g.max(h)
    }
}

/// Detects all patterns in `layout`.
pub fn detect_patterns(layout: &Layout, config: &DistributionConfig) -> PatternSet {
    PatternSet {
        gradient: detect_gradient(layout),
        hierarchical: detect_hierarchy(layout, config),
        axis_aligned: is_axis_aligned(layout),
    }
}

/// Detects a monotonic area sequence along x or y.
///
/// Needs at least three rectangles and a non-constant sequence. When both
/// axes qualify the more regular one wins.
pub fn detect_gradient(layout: &Layout) -> Option<GradientPattern> {
    if layout.len() < 3 {
        return None;
    }
    let along = |use_x: bool| -> Option<GradientPattern> {
        let items: Vec<(f64, f64)> = layout
            .rects
            .iter()
            .map(|r| {
                let c = r.center();
                (if use_x { c.x } else { c.y }, r.area())
            })
            .collect();
        let (lo, hi) = items
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), i| {
                (lo.min(i.0), hi.max(i.0))
            });
        if hi - lo <= GEOM_EPS {
            return None;
        }
        let tol = GEOM_EPS * mean(&items.iter().map(|i| i.1).collect::<Vec<_>>()).max(1.0);
        // Rectangles sharing a position are ordered in the direction being
        // tested, so a mirrored layout detects the same gradient.
        let steps_for = |increasing: bool| -> Vec<f64> {
            let mut sorted = items.clone();
            sorted.sort_by(|a, b| {
                let by_area = if increasing {
                    a.1.total_cmp(&b.1)
                } else {
                    b.1.total_cmp(&a.1)
                };
                a.0.total_cmp(&b.0).then(by_area)
            });
            sorted.windows(2).map(|w| w[1].1 - w[0].1).collect()
        };
        let up = steps_for(true);
        let down = steps_for(false);
        let (increasing, steps) = if up.iter().all(|s| *s >= -tol) {
            (true, up)
        } else if down.iter().all(|s| *s <= tol) {
            (false, down)
        } else {
            return None;
        };
        if !steps.iter().any(|s| s.abs() > tol) {
            return None;
        }
        let magnitudes: Vec<f64> = steps.iter().map(|s| s.abs()).collect();
        let quality = (1.0 - coefficient_of_variation(&magnitudes)).clamp(0.0, 1.0);
        Some(GradientPattern {
            along_x: use_x,
            increasing,
            quality,
        })
    };
    match (along(true), along(false)) {
        (Some(x), Some(y)) => Some(if x.quality >= y.quality { x } else { y }),
        (x, y) => x.or(y),
    }
}

/// Clusters rectangles into rows by center y.
///
/// Sorted centers start a new row wherever the gap to the previous center
/// exceeds `row_tolerance × average length`.
pub fn rows(layout: &Layout, row_tolerance: f64) -> Vec<Vec<usize>> {
    if layout.is_empty() {
        return Vec::new();
    }
    let avg_length = mean(&layout.rects.iter().map(|r| r.length()).collect::<Vec<_>>());
    let tol = row_tolerance * avg_length;
    let mut order: Vec<usize> = (0..layout.len()).collect();
    order.sort_by(|&a, &b| {
        layout.rects[a]
            .center()
            .y
            .total_cmp(&layout.rects[b].center().y)
    });

    let mut out: Vec<Vec<usize>> = Vec::new();
    let mut prev_y = f64::NEG_INFINITY;
    for i in order {
        let y = layout.rects[i].center().y;
        match out.last_mut() {
            Some(row) if y - prev_y <= tol => row.push(i),
            _ => out.push(vec![i]),
        }
        prev_y = y;
    }
    out
}

/// Detects two or more rows with balanced sizes.
pub fn detect_hierarchy(
    layout: &Layout,
    config: &DistributionConfig,
) -> Option<HierarchicalPattern> {
    let rows = rows(layout, config.row_tolerance);
    if rows.len() < 2 {
        return None;
    }
    let sizes: Vec<usize> = rows.iter().map(Vec::len).collect();
    let min = sizes.iter().copied().min().unwrap_or(0) as f64;
    let max = sizes.iter().copied().max().unwrap_or(0) as f64;
    if max <= 0.0 {
        return None;
    }
    let balance = min / max;
    if balance < config.hierarchy_balance {
        return None;
    }
    Some(HierarchicalPattern {
        level_sizes: sizes,
        quality: balance,
    })
}

/// Returns true if every rectangle center shares its row line with another
/// rectangle or its column line with another rectangle.
pub fn is_axis_aligned(layout: &Layout) -> bool {
    if layout.len() < 2 {
        return false;
    }
    let tol = 1e-6 * layout.width.max(layout.length).max(1.0);
    layout.rects.iter().enumerate().all(|(i, a)| {
        let ca = a.center();
        layout.rects.iter().enumerate().any(|(j, b)| {
            let cb = b.center();
            i != j && ((ca.x - cb.x).abs() <= tol || (ca.y - cb.y).abs() <= tol)
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use u_molding_core::{Footprint, PlacedRect};

    #[test]
    fn test_gradient_along_x() {
        let rects = vec![
            PlacedRect::new(Footprint::new(10.0, 10.0), 0.0, 0.0, false),
            PlacedRect::new(Footprint::new(20.0, 10.0), 20.0, 0.0, false),
            PlacedRect::new(Footprint::new(30.0, 10.0), 50.0, 0.0, false),
        ];
        let layout = Layout::new(rects, 80.0, 10.0, 10.0);
        let g = detect_gradient(&layout).unwrap();
        assert!(g.along_x);
        assert!(g.increasing);
        assert!((g.quality - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_no_gradient_for_uniform_sizes() {
        let fp = Footprint::new(10.0, 10.0);
        let rects = (0..4)
            .map(|i| PlacedRect::new(fp, i as f64 * 15.0, 0.0, false))
            .collect();
        let layout = Layout::new(rects, 55.0, 10.0, 5.0);
        assert!(detect_gradient(&layout).is_none());
        assert!(is_axis_aligned(&layout));
    }

    #[test]
    fn test_two_rows_are_hierarchical() {
        let fp = Footprint::new(10.0, 10.0);
        let rects = vec![
            PlacedRect::new(fp, 0.0, 0.0, false),
            PlacedRect::new(fp, 15.0, 0.0, false),
            PlacedRect::new(fp, 0.0, 15.0, false),
            PlacedRect::new(fp, 15.0, 16.0, false),
        ];
        let layout = Layout::new(rects, 25.0, 26.0, 5.0);
        let config = DistributionConfig::default();
        let h = detect_hierarchy(&layout, &config).unwrap();
        assert_eq!(h.level_sizes, vec![2, 2]);
        let patterns = detect_patterns(&layout, &config);
        assert!(patterns.leniency(&config) < 1.0);
    }

    #[test]
    fn test_unbalanced_rows_rejected() {
        let fp = Footprint::new(10.0, 10.0);
        let mut rects: Vec<PlacedRect> = (0..5)
            .map(|i| PlacedRect::new(fp, i as f64 * 15.0, 0.0, false))
            .collect();
        rects.push(PlacedRect::new(fp, 0.0, 30.0, false));
        let layout = Layout::new(rects, 70.0, 40.0, 5.0);
        assert!(detect_hierarchy(&layout, &DistributionConfig::default()).is_none());
    }

    #[test]
    fn test_leniency_default_is_one() {
        assert_eq!(PatternSet::default().leniency(&DistributionConfig::default()), 1.0);
    }
}
