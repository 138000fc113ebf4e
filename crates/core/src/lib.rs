//! # U-Molding Core
//!
//! Shared types for the U-Molding mold cavity planner.
//!
//! This crate provides the data model consumed by the layout packer, the
//! balance scorer and the partition search:
//!
//! - **Geometry**: [`Footprint`], [`PlacedRect`], [`Layout`]
//! - **Products**: [`Product`], [`Dimensions`], [`CadData`]
//! - **Lookup tables**: [`StepTable`], [`LookupTables`] - monotonic step
//!   functions for spacing, border margins, height brackets and weight
//!   balance allowances
//! - **Errors**: [`Error`], [`Result`]
//!
//! ## Example
//!
//! ```rust
//! use u_molding_core::{LookupTables, Product};
//!
//! let product = Product::new("cap", 120.0, 80.0, 30.0)
//!     .with_weight(45.0)
//!     .with_material("PP")
//!     .with_color("white");
//!
//! let tables = LookupTables::default();
//! let spacing = tables.spacing_for(product.footprint().max_dimension()).unwrap();
//! assert_eq!(spacing, 30.0);
//! ```
//!
//! ## Feature Flags
//!
//! - `serde`: Enable serialization/deserialization support

pub mod error;
pub mod geometry;
pub mod product;
pub mod stats;
pub mod tables;

// Re-exports
pub use error::{Error, Result};
pub use geometry::{Footprint, Layout, PlacedRect, GEOM_EPS};
pub use product::{validate_products, CadData, Dimensions, Product, ProductId};
pub use tables::{LookupTables, Overflow, StepTable};

pub use nalgebra::Point2;
