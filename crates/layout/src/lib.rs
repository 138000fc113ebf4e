//! # U-Molding Layout
//!
//! Packs rectangular product footprints into a near-minimal mold cavity.
//!
//! ## Components
//!
//! - [`LayoutPacker`]: rotation search over a rectangle-packing primitive,
//!   with spacing derived from the footprint sizes
//! - [`RectPacker`] / [`SkylinePacker`]: the packing primitive
//! - [`MoldSpec`]: edge margin, bottom margin and block weight derived from
//!   a packed layout
//!
//! ## Quick Start
//!
//! ```rust
//! use u_molding_layout::{LayoutPacker, PackerConfig};
//! use u_molding_core::Footprint;
//!
//! let packer = LayoutPacker::new(PackerConfig::default());
//! let layout = packer
//!     .pack(&[Footprint::new(120.0, 60.0), Footprint::new(80.0, 80.0)])
//!     .unwrap();
//!
//! assert_eq!(layout.len(), 2);
//! assert!(layout.area >= 120.0 * 60.0 + 80.0 * 80.0);
//! ```

pub mod config;
pub mod mold;
pub mod packer;
pub mod skyline;

// Re-exports
pub use config::{MoldConfig, PackerConfig, MAX_MUTATION_ROUNDS};
pub use mold::{bottom_margin, edge_margin, max_product_height, MoldSpec};
pub use packer::LayoutPacker;
pub use skyline::{PackedBoxes, RectPacker, SkylinePacker};
pub use u_molding_core::{Error, Footprint, Layout, LookupTables, PlacedRect, Result};
