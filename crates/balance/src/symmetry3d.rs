//! Mirror-plane symmetry of CAD-derived mass points.
//!
//! Each point is reflected through the center of mass across the three
//! cardinal planes. For every reflection the nearest actual point is found
//! with the [`Octree`], and position and mass mismatches are accumulated.

use crate::inertia::{inertia_3d, MassPoint3};
use crate::octree::Octree;
use nalgebra::Point3;
use u_molding_core::stats::{clamp_score, min_max_ratio};
use u_molding_core::{Error, Layout, Product, Result};

/// Weight of positional mismatch within a point's penalty.
const POSITION_WEIGHT: f64 = 0.7;
/// Weight of mass mismatch within a point's penalty.
const MASS_WEIGHT: f64 = 0.3;

/// A cardinal mirror plane through the center of mass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MirrorPlane {
    /// The YZ plane (x is negated).
    YZ,
    /// The XZ plane (y is negated).
    XZ,
    /// The XY plane (z is negated).
    XY,
}

impl MirrorPlane {
    /// All planes in evaluation order.
    pub const ALL: [MirrorPlane; 3] = [MirrorPlane::YZ, MirrorPlane::XZ, MirrorPlane::XY];

    fn axis(self) -> usize {
        match self {
            MirrorPlane::YZ => 0,
            MirrorPlane::XZ => 1,
            MirrorPlane::XY => 2,
        }
    }

    /// Reflects `p` across this plane through `center`.
    pub fn reflect(self, p: &Point3<f64>, center: &Point3<f64>) -> Point3<f64> {
        let mut out = *p;
        let a = self.axis();
        out[a] = 2.0 * center[a] - p[a];
        out
    }
}

/// Result of the 3D mirror-plane analysis.
#[derive(Debug, Clone, PartialEq)]
pub struct MirrorSymmetry3D {
    /// Score (0-100) per plane, in [`MirrorPlane::ALL`] order.
    pub plane_scores: [(MirrorPlane, f64); 3],
    /// Plane with the highest score.
    pub best_plane: MirrorPlane,
    /// Highest plane score.
    pub best_score: f64,
    /// Mean of the plane scores.
    pub mean_score: f64,
}

impl MirrorSymmetry3D {
    fn uniform(score: f64) -> Self {
        Self {
            plane_scores: MirrorPlane::ALL.map(|p| (p, score)),
            best_plane: MirrorPlane::YZ,
            best_score: score,
            mean_score: score,
        }
    }

    /// Score of a given plane.
    pub fn score_for(&self, plane: MirrorPlane) -> f64 {
        self.plane_scores
            .iter()
            .find(|(p, _)| *p == plane)
            .map(|(_, s)| *s)
            .unwrap_or(0.0)
    }
}

/// Computes mirror-plane symmetry of `points`.
///
/// No points score 0 and a single point scores 100. Positional mismatch is
/// normalized by the radius of gyration.
pub fn mirror_symmetry_3d(points: &[MassPoint3]) -> MirrorSymmetry3D {
    if points.is_empty() {
        return MirrorSymmetry3D::uniform(0.0);
    }
    if points.len() == 1 {
        return MirrorSymmetry3D::uniform(100.0);
    }

    let state = inertia_3d(points);
    let center = state.center_of_mass;
    let scale = state.gyration_radius;
    if scale <= 1e-12 {
        // all points coincide
        return MirrorSymmetry3D::uniform(100.0);
    }

    let positions: Vec<Point3<f64>> = points.iter().map(|p| p.position).collect();
    let tree = Octree::build(&positions);

    let plane_scores = MirrorPlane::ALL.map(|plane| {
        let mut penalty = 0.0;
        for p in points {
            let mirrored = plane.reflect(&p.position, &center);
            let Some(n) = tree.nearest_neighbor(&mirrored) else {
                continue;
            };
            let position = (n.squared_distance.sqrt() / scale).min(1.0);
            let mass = 1.0 - min_max_ratio(p.mass, points[n.index].mass);
            penalty += POSITION_WEIGHT * position + MASS_WEIGHT * mass;
        }
        let mean_penalty = penalty / points.len() as f64;
        (plane, clamp_score(100.0 * (1.0 - mean_penalty)))
    });

    let (best_plane, best_score) = plane_scores
        .iter()
        .copied()
        .fold((MirrorPlane::YZ, f64::NEG_INFINITY), |acc, (p, s)| {
            if s > acc.1 {
                (p, s)
            } else {
                acc
            }
        });
    let mean_score = plane_scores.iter().map(|(_, s)| s).sum::<f64>() / 3.0;

    log::trace!(
        "3D mirror symmetry: best {:?} at {:.2}, mean {:.2}",
        best_plane,
        best_score,
        mean_score
    );

    MirrorSymmetry3D {
        plane_scores,
        best_plane,
        best_score,
        mean_score,
    }
}

/// Derives 3D mass points for a layout from the products' CAD data.
///
/// Each point sits above its rectangle center at half the product height,
/// shifted by the CAD center-of-mass offset (x and y swap when the rectangle
/// is rotated). Products without CAD data use the geometric center.
pub fn cad_mass_points(layout: &Layout, products: &[Product]) -> Result<Vec<MassPoint3>> {
    if layout.len() != products.len() {
        return Err(Error::invalid(format!(
            "layout has {} rectangles but {} products were given",
            layout.len(),
            products.len()
        )));
    }
    Ok(layout
        .rects
        .iter()
        .zip(products)
        .map(|(rect, product)| {
            let c = rect.center();
            let [ox, oy, oz] = match &product.cad {
                Some(cad) => cad.com_offset(),
                None => [0.0; 3],
            };
            let (dx, dy) = if rect.rotated { (oy, ox) } else { (ox, oy) };
            MassPoint3::new(
                c.x + dx,
                c.y + dy,
                0.5 * product.dimensions.height + oz,
                product.scoring_mass(),
            )
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use u_molding_core::{CadData, Footprint, PlacedRect};

    #[test]
    fn test_empty_and_single() {
        assert_eq!(mirror_symmetry_3d(&[]).best_score, 0.0);
        let one = [MassPoint3::new(1.0, 2.0, 3.0, 4.0)];
        assert_eq!(mirror_symmetry_3d(&one).best_score, 100.0);
    }

    #[test]
    fn test_symmetric_box_is_perfect() {
        let mut points = Vec::new();
        for &x in &[-2.0, 2.0] {
            for &y in &[-1.0, 1.0] {
                for &z in &[-0.5, 0.5] {
                    points.push(MassPoint3::new(x, y, z, 2.0));
                }
            }
        }
        let sym = mirror_symmetry_3d(&points);
        for (_, s) in sym.plane_scores {
            assert_relative_eq!(s, 100.0, epsilon = 1e-9);
        }
        assert_relative_eq!(sym.mean_score, 100.0, epsilon = 1e-9);
    }

    #[test]
    fn test_asymmetric_plane_is_lower() {
        // symmetric across YZ, lopsided along y
        let points = vec![
            MassPoint3::new(-1.0, 0.0, 0.0, 1.0),
            MassPoint3::new(1.0, 0.0, 0.0, 1.0),
            MassPoint3::new(0.0, 3.0, 0.0, 1.0),
        ];
        let sym = mirror_symmetry_3d(&points);
        assert!(sym.score_for(MirrorPlane::YZ) > sym.score_for(MirrorPlane::XZ));
        assert_eq!(sym.best_plane, MirrorPlane::YZ);
    }

    #[test]
    fn test_mass_mismatch_penalized() {
        let balanced = [
            MassPoint3::new(-1.0, 0.0, 0.0, 1.0),
            MassPoint3::new(1.0, 0.0, 0.0, 1.0),
        ];
        let unbalanced = [
            MassPoint3::new(-1.0, 0.0, 0.0, 1.0),
            MassPoint3::new(1.0, 0.0, 0.0, 1.0),
            MassPoint3::new(0.0, 0.0, 0.0, 0.0),
        ];
        let a = mirror_symmetry_3d(&balanced).score_for(MirrorPlane::YZ);
        let b = mirror_symmetry_3d(&unbalanced).score_for(MirrorPlane::YZ);
        assert_relative_eq!(a, 100.0, epsilon = 1e-9);
        assert!(b <= a);
    }

    #[test]
    fn test_cad_mass_points_rotation_swaps_offset() {
        let cad = CadData::new(1000.0, 600.0)
            .with_bbox([5.0, 10.0, 2.0], [10.0, 20.0, 4.0])
            .with_center_of_mass([6.0, 10.0, 2.0]);
        let products = vec![Product::new("a", 20.0, 10.0, 4.0).with_cad(cad)];
        let rect = PlacedRect::new(Footprint::new(10.0, 20.0), 0.0, 0.0, true);
        let layout = Layout::new(vec![rect], 20.0, 10.0, 0.0);
        let points = cad_mass_points(&layout, &products).unwrap();
        let c = rect.center();
        assert_relative_eq!(points[0].position.x, c.x);
        assert_relative_eq!(points[0].position.y, c.y + 1.0);
        assert_relative_eq!(points[0].position.z, 2.0);
    }

    #[test]
    fn test_cad_mass_points_count_mismatch() {
        let err = cad_mass_points(&Layout::empty(), &[Product::new("a", 1.0, 1.0, 1.0)]);
        assert!(err.is_err());
    }
}
