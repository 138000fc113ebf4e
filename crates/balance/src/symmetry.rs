//! Planar symmetry and regularity of rectangle centers.
//!
//! Rectangle centers are bulk-loaded into an R*-tree so the mirror
//! counterpart of each rectangle is found with a nearest-neighbour query
//! instead of an all-pairs scan.

use rstar::primitives::GeomWithData;
use rstar::RTree;
use u_molding_core::stats::{clamp_score, coefficient_of_variation, mean, min_max_ratio};
use u_molding_core::{Layout, GEOM_EPS};

type CenterEntry = GeomWithData<[f64; 2], usize>;

const POSITION_WEIGHT: f64 = 0.7;
const SIZE_WEIGHT: f64 = 0.3;

/// Mirror scores of a layout about its bounding-box center.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MirrorScores {
    /// Reflection across the vertical center line (x mirrored).
    pub vertical: f64,
    /// Reflection across the horizontal center line (y mirrored).
    pub horizontal: f64,
    /// Point reflection through the center.
    pub point: f64,
}

impl MirrorScores {
    /// Best of the three reflections.
    pub fn best(&self) -> f64 {
        self.vertical.max(self.horizontal).max(self.point)
    }
}

/// Spatial index over the rectangle centers of a layout.
pub struct CenterIndex {
    tree: RTree<CenterEntry>,
    centers: Vec<[f64; 2]>,
}

impl CenterIndex {
    /// Builds the index.
    pub fn new(layout: &Layout) -> Self {
        let centers: Vec<[f64; 2]> = layout
            .rects
            .iter()
            .map(|r| {
                let c = r.center();
                [c.x, c.y]
            })
            .collect();
        let entries = centers
            .iter()
            .enumerate()
            .map(|(i, c)| GeomWithData::new(*c, i))
            .collect();
        Self {
            tree: RTree::bulk_load(entries),
            centers,
        }
    }

    /// Rectangle centers in layout order.
    pub fn centers(&self) -> &[[f64; 2]] {
        &self.centers
    }

    /// Index of the center nearest to `point`.
    pub fn nearest(&self, point: [f64; 2]) -> Option<(usize, f64)> {
        self.tree
            .nearest_neighbor(&point)
            .map(|e| (e.data, distance(*e.geom(), point)))
    }

    /// Distance from each center to its nearest other center.
    pub fn nearest_neighbor_distances(&self) -> Vec<f64> {
        self.centers
            .iter()
            .enumerate()
            .filter_map(|(i, c)| {
                self.tree
                    .nearest_neighbor_iter(c)
                    .find(|e| e.data != i)
                    .map(|e| distance(*e.geom(), *c))
            })
            .collect()
    }
}

fn distance(a: [f64; 2], b: [f64; 2]) -> f64 {
    ((a[0] - b[0]).powi(2) + (a[1] - b[1]).powi(2)).sqrt()
}

/// Mirror symmetry of `layout` about its bounding-box center.
///
/// Each rectangle is reflected and matched to the nearest actual rectangle;
/// the penalty mixes the match distance (relative to the half diagonal) and
/// the footprint area mismatch.
pub fn mirror_scores(layout: &Layout, index: &CenterIndex) -> MirrorScores {
    let n = layout.len();
    if n == 0 {
        return MirrorScores::default();
    }
    if n == 1 {
        // a lone rectangle is its own counterpart only when centered
        let s = single_rect_score(layout);
        return MirrorScores {
            vertical: s.0,
            horizontal: s.1,
            point: s.0.min(s.1),
        };
    }

    let cx = layout.width / 2.0;
    let cy = layout.length / 2.0;
    let scale = (cx * cx + cy * cy).sqrt().max(GEOM_EPS);

    let score = |reflect: &dyn Fn([f64; 2]) -> [f64; 2]| -> f64 {
        let mut penalty = 0.0;
        for (i, c) in index.centers().iter().enumerate() {
            let Some((j, d)) = index.nearest(reflect(*c)) else {
                continue;
            };
            let position = (d / scale).min(1.0);
            let size = 1.0 - min_max_ratio(layout.rects[i].area(), layout.rects[j].area());
            penalty += POSITION_WEIGHT * position + SIZE_WEIGHT * size;
        }
        clamp_score(100.0 * (1.0 - penalty / n as f64))
    };

    MirrorScores {
        vertical: score(&|c| [2.0 * cx - c[0], c[1]]),
        horizontal: score(&|c| [c[0], 2.0 * cy - c[1]]),
        point: score(&|c| [2.0 * cx - c[0], 2.0 * cy - c[1]]),
    }
}

fn single_rect_score(layout: &Layout) -> (f64, f64) {
    let c = layout.rects[0].center();
    let half_w = (layout.width / 2.0).max(GEOM_EPS);
    let half_l = (layout.length / 2.0).max(GEOM_EPS);
    let dx = ((c.x - layout.width / 2.0).abs() / half_w).min(1.0);
    let dy = ((c.y - layout.length / 2.0).abs() / half_l).min(1.0);
    (
        clamp_score(100.0 * (1.0 - dx)),
        clamp_score(100.0 * (1.0 - dy)),
    )
}

/// Unweighted centroid of the centers.
pub fn centroid(centers: &[[f64; 2]]) -> [f64; 2] {
    let xs: Vec<f64> = centers.iter().map(|c| c[0]).collect();
    let ys: Vec<f64> = centers.iter().map(|c| c[1]).collect();
    [mean(&xs), mean(&ys)]
}

/// Regularity of the angular gaps between centers around their centroid.
///
/// Centers sitting on the centroid carry no angle and are ignored; fewer
/// than two remaining centers score 100.
pub fn angular_regularity(centers: &[[f64; 2]]) -> f64 {
    let c = centroid(centers);
    let mut angles: Vec<f64> = centers
        .iter()
        .filter(|p| distance(**p, c) > GEOM_EPS)
        .map(|p| (p[1] - c[1]).atan2(p[0] - c[0]))
        .collect();
    if angles.len() < 2 {
        return 100.0;
    }
    angles.sort_by(f64::total_cmp);
    let mut gaps: Vec<f64> = angles.windows(2).map(|w| w[1] - w[0]).collect();
    if let (Some(first), Some(last)) = (angles.first(), angles.last()) {
        gaps.push(first + std::f64::consts::TAU - last);
    }
    clamp_score(100.0 * (1.0 - coefficient_of_variation(&gaps)))
}

/// Regularity of center distances from their centroid.
pub fn radial_regularity(centers: &[[f64; 2]]) -> f64 {
    if centers.len() < 2 {
        return 100.0;
    }
    let c = centroid(centers);
    let radii: Vec<f64> = centers.iter().map(|p| distance(*p, c)).collect();
    clamp_score(100.0 * (1.0 - coefficient_of_variation(&radii)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use u_molding_core::{Footprint, PlacedRect};

    fn grid(n: usize, size: f64, gap: f64) -> Layout {
        let fp = Footprint::new(size, size);
        let mut rects = Vec::new();
        for i in 0..n {
            for j in 0..n {
                let step = size + gap;
                rects.push(PlacedRect::new(fp, i as f64 * step, j as f64 * step, false));
            }
        }
        let extent = n as f64 * size + (n as f64 - 1.0) * gap;
        Layout::new(rects, extent, extent, gap)
    }

    #[test]
    fn test_grid_is_mirror_symmetric() {
        let layout = grid(3, 10.0, 5.0);
        let index = CenterIndex::new(&layout);
        let scores = mirror_scores(&layout, &index);
        assert_relative_eq!(scores.vertical, 100.0, epsilon = 1e-9);
        assert_relative_eq!(scores.horizontal, 100.0, epsilon = 1e-9);
        assert_relative_eq!(scores.point, 100.0, epsilon = 1e-9);
    }

    #[test]
    fn test_lopsided_layout_scores_lower() {
        let big = Footprint::new(40.0, 40.0);
        let small = Footprint::new(10.0, 10.0);
        let rects = vec![
            PlacedRect::new(big, 0.0, 0.0, false),
            PlacedRect::new(small, 50.0, 0.0, false),
        ];
        let layout = Layout::new(rects, 60.0, 40.0, 10.0);
        let index = CenterIndex::new(&layout);
        let scores = mirror_scores(&layout, &index);
        assert!(scores.best() < 100.0);
    }

    #[test]
    fn test_nearest_neighbor_distances() {
        let layout = grid(2, 10.0, 10.0);
        let index = CenterIndex::new(&layout);
        let d = index.nearest_neighbor_distances();
        assert_eq!(d.len(), 4);
        for v in d {
            assert_relative_eq!(v, 20.0);
        }
    }

    #[test]
    fn test_regular_ring() {
        let centers: Vec<[f64; 2]> = (0..6)
            .map(|k| {
                let a = k as f64 * std::f64::consts::TAU / 6.0;
                [10.0 * a.cos(), 10.0 * a.sin()]
            })
            .collect();
        assert_relative_eq!(angular_regularity(&centers), 100.0, epsilon = 1e-9);
        assert_relative_eq!(radial_regularity(&centers), 100.0, epsilon = 1e-9);
    }

    #[test]
    fn test_degenerate_inputs() {
        assert_eq!(angular_regularity(&[[1.0, 1.0]]), 100.0);
        assert_eq!(radial_regularity(&[]), 100.0);
        let scores = mirror_scores(&Layout::empty(), &CenterIndex::new(&Layout::empty()));
        assert_eq!(scores.best(), 0.0);
    }
}
