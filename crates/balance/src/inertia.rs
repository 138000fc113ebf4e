//! Mass-distribution inertia.
//!
//! # 2D
//!
//! The planar tensor uses the physical convention
//! `Ixx = Σ m·dy²`, `Iyy = Σ m·dx²`, `Ixy = -Σ m·dx·dy` about the center of
//! mass. Layouts that are much longer in one direction than the other are
//! damped before diagonalization so a long single row does not read as
//! hopelessly anisotropic. The 2×2 symmetric eigenproblem is solved in
//! closed form.
//!
//! # 3D
//!
//! The 3×3 tensor is diagonalized with cyclic Jacobi rotations until the
//! largest off-diagonal element drops below [`JACOBI_TOLERANCE`], capped at
//! [`JACOBI_MAX_SWEEPS`] sweeps.

use nalgebra::{Matrix2, Matrix3, Point2, Point3, Vector2, Vector3};

/// Convergence threshold on the largest off-diagonal element.
pub const JACOBI_TOLERANCE: f64 = 1e-10;

/// Maximum number of Jacobi sweeps.
pub const JACOBI_MAX_SWEEPS: usize = 100;

const MASS_EPS: f64 = 1e-12;

/// A planar mass element.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MassPoint2 {
    /// Position.
    pub position: Point2<f64>,
    /// Mass (non-negative).
    pub mass: f64,
}

impl MassPoint2 {
    /// Creates a mass point.
    pub fn new(x: f64, y: f64, mass: f64) -> Self {
        Self {
            position: Point2::new(x, y),
            mass,
        }
    }
}

/// A spatial mass element.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MassPoint3 {
    /// Position.
    pub position: Point3<f64>,
    /// Mass (non-negative).
    pub mass: f64,
}

impl MassPoint3 {
    /// Creates a mass point.
    pub fn new(x: f64, y: f64, z: f64, mass: f64) -> Self {
        Self {
            position: Point3::new(x, y, z),
            mass,
        }
    }
}

/// Planar inertia state of a layout.
#[derive(Debug, Clone, PartialEq)]
pub struct InertiaState2D {
    /// Total mass.
    pub total_mass: f64,
    /// Center of mass.
    pub center_of_mass: Point2<f64>,
    /// Tensor after spread correction.
    pub tensor: Matrix2<f64>,
    /// Principal moments, largest first.
    pub principal_moments: [f64; 2],
    /// Unit principal axes matching `principal_moments`.
    pub principal_axes: [Vector2<f64>; 2],
    /// Radius of gyration about the center of mass.
    pub gyration_radius: f64,
    /// Ratio of the larger to the smaller positional spread.
    pub spread_ratio: f64,
    /// Correction factor applied to the dominant moment (1 if none).
    pub spread_correction: f64,
}

impl InertiaState2D {
    fn degenerate(center: Point2<f64>, total_mass: f64) -> Self {
        Self {
            total_mass,
            center_of_mass: center,
            tensor: Matrix2::zeros(),
            principal_moments: [0.0, 0.0],
            principal_axes: [Vector2::x(), Vector2::y()],
            gyration_radius: 0.0,
            spread_ratio: 1.0,
            spread_correction: 1.0,
        }
    }

    /// Returns true if the mass is concentrated in a single point.
    pub fn is_point_mass(&self) -> bool {
        self.principal_moments[0] <= MASS_EPS
    }
}

/// Spatial inertia state.
#[derive(Debug, Clone, PartialEq)]
pub struct InertiaState3D {
    /// Total mass.
    pub total_mass: f64,
    /// Center of mass.
    pub center_of_mass: Point3<f64>,
    /// Inertia tensor about the center of mass.
    pub tensor: Matrix3<f64>,
    /// Principal moments, largest first.
    pub principal_moments: Vector3<f64>,
    /// Principal axes as columns, matching `principal_moments`.
    pub principal_axes: Matrix3<f64>,
    /// Radius of gyration about the center of mass.
    pub gyration_radius: f64,
    /// Jacobi sweeps used.
    pub sweeps: usize,
}

/// Mass-weighted center of `points`, or the plain centroid when all masses are zero.
pub fn center_of_mass_2d(points: &[MassPoint2]) -> (Point2<f64>, f64) {
    let total: f64 = points.iter().map(|p| p.mass.max(0.0)).sum();
    if points.is_empty() {
        return (Point2::origin(), 0.0);
    }
    if total <= MASS_EPS {
        let n = points.len() as f64;
        let sx: f64 = points.iter().map(|p| p.position.x).sum();
        let sy: f64 = points.iter().map(|p| p.position.y).sum();
        return (Point2::new(sx / n, sy / n), 0.0);
    }
    let mut c = Vector2::zeros();
    for p in points {
        c += p.position.coords * p.mass.max(0.0);
    }
    (Point2::from(c / total), total)
}

/// Computes the planar inertia state with the default spread correction limit of 1.5.
pub fn inertia_2d(points: &[MassPoint2]) -> InertiaState2D {
    inertia_2d_with_limit(points, 1.5)
}

/// Computes the planar inertia state.
///
/// When the x and y spreads differ by more than `spread_ratio_limit`, the
/// moment about the long axis is scaled by `limit / ratio` and the product
/// of inertia by its square root.
pub fn inertia_2d_with_limit(points: &[MassPoint2], spread_ratio_limit: f64) -> InertiaState2D {
    let (center, total_mass) = center_of_mass_2d(points);
    if total_mass <= MASS_EPS {
        return InertiaState2D::degenerate(center, total_mass);
    }

    let mut ixx = 0.0;
    let mut iyy = 0.0;
    let mut ixy = 0.0;
    for p in points {
        let m = p.mass.max(0.0);
        let dx = p.position.x - center.x;
        let dy = p.position.y - center.y;
        ixx += m * dy * dy;
        iyy += m * dx * dx;
        ixy -= m * dx * dy;
    }

    // Iyy measures spread along x, Ixx spread along y.
    let spread_x = iyy.max(0.0).sqrt();
    let spread_y = ixx.max(0.0).sqrt();
    let (hi, lo) = if spread_x >= spread_y {
        (spread_x, spread_y)
    } else {
        (spread_y, spread_x)
    };
    let spread_ratio = if lo > MASS_EPS {
        hi / lo
    } else if hi > MASS_EPS {
        f64::INFINITY
    } else {
        1.0
    };

    let mut correction = 1.0;
    if spread_ratio > spread_ratio_limit && spread_ratio.is_finite() {
        correction = spread_ratio_limit / spread_ratio;
        if spread_x >= spread_y {
            iyy *= correction;
        } else {
            ixx *= correction;
        }
        ixy *= correction.sqrt();
    }

    let tensor = Matrix2::new(ixx, ixy, ixy, iyy);
    let (moments, axes) = symmetric_eigen_2x2(ixx, ixy, iyy);
    let gyration_radius = ((moments[0] + moments[1]).max(0.0) / total_mass).sqrt();

    InertiaState2D {
        total_mass,
        center_of_mass: center,
        tensor,
        principal_moments: moments,
        principal_axes: axes,
        gyration_radius,
        spread_ratio,
        spread_correction: correction,
    }
}

/// Closed-form eigendecomposition of `[[a, b], [b, c]]`.
///
/// Returns eigenvalues largest first and matching unit eigenvectors.
pub fn symmetric_eigen_2x2(a: f64, b: f64, c: f64) -> ([f64; 2], [Vector2<f64>; 2]) {
    let mid = 0.5 * (a + c);
    let radius = (0.25 * (a - c) * (a - c) + b * b).sqrt();
    let l1 = mid + radius;
    let l2 = mid - radius;

    if b.abs() <= MASS_EPS * (a.abs() + c.abs()).max(1.0) {
        return if a >= c {
            ([a, c], [Vector2::x(), Vector2::y()])
        } else {
            ([c, a], [Vector2::y(), Vector2::x()])
        };
    }

    // (A - l1 I) v = 0  =>  v = (b, l1 - a)
    let v1 = Vector2::new(b, l1 - a);
    let v1 = if v1.norm() > MASS_EPS {
        v1.normalize()
    } else {
        Vector2::x()
    };
    let v2 = Vector2::new(-v1.y, v1.x);
    ([l1, l2], [v1, v2])
}

/// Mass-weighted center of `points`.
pub fn center_of_mass_3d(points: &[MassPoint3]) -> (Point3<f64>, f64) {
    if points.is_empty() {
        return (Point3::origin(), 0.0);
    }
    let total: f64 = points.iter().map(|p| p.mass.max(0.0)).sum();
    if total <= MASS_EPS {
        let mut c = Vector3::zeros();
        for p in points {
            c += p.position.coords;
        }
        return (Point3::from(c / points.len() as f64), 0.0);
    }
    let mut c = Vector3::zeros();
    for p in points {
        c += p.position.coords * p.mass.max(0.0);
    }
    (Point3::from(c / total), total)
}

/// Inertia tensor of `points` about `center`.
pub fn inertia_tensor_3d(points: &[MassPoint3], center: &Point3<f64>) -> Matrix3<f64> {
    let mut t = Matrix3::zeros();
    for p in points {
        let m = p.mass.max(0.0);
        let d = p.position - center;
        let (x, y, z) = (d.x, d.y, d.z);
        t[(0, 0)] += m * (y * y + z * z);
        t[(1, 1)] += m * (x * x + z * z);
        t[(2, 2)] += m * (x * x + y * y);
        t[(0, 1)] -= m * x * y;
        t[(0, 2)] -= m * x * z;
        t[(1, 2)] -= m * y * z;
    }
    t[(1, 0)] = t[(0, 1)];
    t[(2, 0)] = t[(0, 2)];
    t[(2, 1)] = t[(1, 2)];
    t
}

/// Computes the spatial inertia state.
pub fn inertia_3d(points: &[MassPoint3]) -> InertiaState3D {
    let (center, total_mass) = center_of_mass_3d(points);
    let tensor = inertia_tensor_3d(points, &center);
    let (moments, axes, sweeps) = jacobi_eigen_3x3(tensor);
    let gyration_radius = if total_mass > MASS_EPS {
        // trace = 2 Σ m r²
        (tensor.trace().max(0.0) / (2.0 * total_mass)).sqrt()
    } else {
        0.0
    };
    InertiaState3D {
        total_mass,
        center_of_mass: center,
        tensor,
        principal_moments: moments,
        principal_axes: axes,
        gyration_radius,
        sweeps,
    }
}

/// Cyclic Jacobi eigendecomposition of a symmetric 3×3 matrix.
///
/// Returns the eigenvalues sorted largest first, the eigenvectors as matching
/// columns, and the number of sweeps performed. Only the upper triangle is
/// read.
pub fn jacobi_eigen_3x3(matrix: Matrix3<f64>) -> (Vector3<f64>, Matrix3<f64>, usize) {
    let mut a = matrix;
    for i in 0..3 {
        for j in 0..i {
            a[(i, j)] = a[(j, i)];
        }
    }
    let mut v = Matrix3::identity();
    let mut sweeps = 0;

    while sweeps < JACOBI_MAX_SWEEPS {
        let off = a[(0, 1)].abs().max(a[(0, 2)].abs()).max(a[(1, 2)].abs());
        if off < JACOBI_TOLERANCE {
            break;
        }
        for (p, q) in [(0, 1), (0, 2), (1, 2)] {
            if a[(p, q)].abs() < JACOBI_TOLERANCE {
                continue;
            }
            rotate(&mut a, &mut v, p, q);
        }
        sweeps += 1;
    }

    let mut order = [0usize, 1, 2];
    order.sort_by(|&i, &j| a[(j, j)].total_cmp(&a[(i, i)]));
    let values = Vector3::new(
        a[(order[0], order[0])],
        a[(order[1], order[1])],
        a[(order[2], order[2])],
    );
    let vectors = Matrix3::from_columns(&[
        v.column(order[0]).into_owned(),
        v.column(order[1]).into_owned(),
        v.column(order[2]).into_owned(),
    ]);
    (values, vectors, sweeps)
}

/// Applies one Jacobi rotation zeroing `a[(p, q)]`.
fn rotate(a: &mut Matrix3<f64>, v: &mut Matrix3<f64>, p: usize, q: usize) {
    let apq = a[(p, q)];
    let theta = (a[(q, q)] - a[(p, p)]) / (2.0 * apq);
    let t = theta.signum() / (theta.abs() + (theta * theta + 1.0).sqrt());
    let c = 1.0 / (t * t + 1.0).sqrt();
    let s = t * c;
    let tau = s / (1.0 + c);

    a[(p, p)] -= t * apq;
    a[(q, q)] += t * apq;
    a[(p, q)] = 0.0;
    a[(q, p)] = 0.0;

    let r = 3 - p - q;
    let arp = a[(r, p)];
    let arq = a[(r, q)];
    a[(r, p)] = arp - s * (arq + tau * arp);
    a[(p, r)] = a[(r, p)];
    a[(r, q)] = arq + s * (arp - tau * arq);
    a[(q, r)] = a[(r, q)];

    for k in 0..3 {
        let vkp = v[(k, p)];
        let vkq = v[(k, q)];
        v[(k, p)] = vkp - s * (vkq + tau * vkp);
        v[(k, q)] = vkq + s * (vkp - tau * vkq);
    }
}
