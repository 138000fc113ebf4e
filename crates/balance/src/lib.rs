//! # U-Molding Balance
//!
//! Manufacturing balance scoring for packed mold layouts.
//!
//! A layout is graded on three axes and blended into a 0-100 total:
//!
//! - **Geometry**: pairwise product similarity and bounding-box efficiency
//! - **Flow**: flow-length balance from the injection point, with
//!   symmetric/progressive pattern recognition
//! - **Distribution**: inertia isotropy, center deviation, grid occupancy and
//!   mirror symmetry
//!
//! A 3D mirror-plane analysis over CAD-derived mass points, backed by an
//! octree index, is available separately.
//!
//! ## Quick Start
//!
//! ```rust
//! use u_molding_balance::{BalanceConfig, BalanceScorer};
//! use u_molding_core::{Footprint, Layout, PlacedRect, Point2, Product};
//!
//! let products = vec![
//!     Product::new("lid", 40.0, 40.0, 10.0).with_weight(20.0),
//!     Product::new("cap", 40.0, 40.0, 10.0).with_weight(20.0),
//! ];
//! let fp = Footprint::new(40.0, 40.0);
//! let layout = Layout::new(
//!     vec![
//!         PlacedRect::new(fp, 0.0, 0.0, false),
//!         PlacedRect::new(fp, 70.0, 0.0, false),
//!     ],
//!     110.0,
//!     40.0,
//!     30.0,
//! );
//!
//! let scorer = BalanceScorer::new(BalanceConfig::default());
//! let score = scorer.score(&layout, &products, Point2::new(55.0, 20.0)).unwrap();
//! assert!(score.total > 0.0 && score.total <= 100.0);
//! ```

pub mod config;
pub mod distribution;
pub mod flow;
pub mod geometry;
pub mod inertia;
pub mod occupancy;
pub mod octree;
pub mod patterns;
pub mod scorer;
pub mod symmetry;
pub mod symmetry3d;

// Re-exports
pub use config::{
    BalanceConfig, DistributionConfig, FlowConfig, GeometryConfig, TotalWeights,
    VolumeBalanceWeights,
};
pub use distribution::{distribution_report, distribution_score, DistributionReport};
pub use flow::{flow_report, flow_score, FlowPattern, FlowReport};
pub use geometry::{geometry_report, geometry_score, GeometryReport};
pub use inertia::{
    inertia_2d, inertia_3d, jacobi_eigen_3x3, InertiaState2D, InertiaState3D, MassPoint2,
    MassPoint3,
};
pub use octree::{Neighbor, Octree};
pub use scorer::{BalanceReport, BalanceScore, BalanceScorer};
pub use symmetry3d::{cad_mass_points, mirror_symmetry_3d, MirrorPlane, MirrorSymmetry3D};
pub use u_molding_core::{Error, Result};
