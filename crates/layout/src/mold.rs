//! Mold block derivations from a packed layout.
//!
//! The cavity layout is surrounded by an edge margin on every side and sits
//! on a bottom block tall enough for the tallest product:
//!
//! - edge margin = half the larger border-table value for the packed width
//!   and the packed length
//! - bottom margin = tallest product + height-bracket allowance
//! - mold weight = outer length × outer width × bottom margin × density

use crate::config::MoldConfig;
use u_molding_core::{Layout, LookupTables, Product, Result};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Derived mold block dimensions and weight.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MoldSpec {
    /// Packed cavity width.
    pub cavity_width: f64,
    /// Packed cavity length.
    pub cavity_length: f64,
    /// Margin added on every side of the cavity.
    pub edge_margin: f64,
    /// Block thickness below the parting line.
    pub bottom_margin: f64,
    /// Outer block width (`cavity_width + 2 * edge_margin`).
    pub outer_width: f64,
    /// Outer block length (`cavity_length + 2 * edge_margin`).
    pub outer_length: f64,
    /// Mold block weight.
    pub weight: f64,
}

impl MoldSpec {
    /// Derives the mold block for `layout` holding parts up to `max_height` tall.
    pub fn derive(
        layout: &Layout,
        max_height: f64,
        tables: &LookupTables,
        config: &MoldConfig,
    ) -> Result<Self> {
        let edge = edge_margin(layout, tables)?;
        let bottom = bottom_margin(max_height, tables)?;
        let outer_width = layout.width + 2.0 * edge;
        let outer_length = layout.length + 2.0 * edge;
        Ok(Self {
            cavity_width: layout.width,
            cavity_length: layout.length,
            edge_margin: edge,
            bottom_margin: bottom,
            outer_width,
            outer_length,
            weight: outer_length * outer_width * bottom * config.material_density,
        })
    }

    /// Derives the mold block for a layout of `products`.
    pub fn for_products(
        layout: &Layout,
        products: &[Product],
        tables: &LookupTables,
        config: &MoldConfig,
    ) -> Result<Self> {
        Self::derive(layout, max_product_height(products), tables, config)
    }

    /// Outer block volume.
    pub fn volume(&self) -> f64 {
        self.outer_width * self.outer_length * self.bottom_margin
    }
}

/// Half the larger of the border margins looked up by packed width and length.
pub fn edge_margin(layout: &Layout, tables: &LookupTables) -> Result<f64> {
    let by_width = tables.border_margin.lookup(layout.width)?;
    let by_length = tables.border_margin.lookup(layout.length)?;
    Ok(by_width.max(by_length) / 2.0)
}

/// Tallest product plus its height-bracket allowance.
pub fn bottom_margin(max_height: f64, tables: &LookupTables) -> Result<f64> {
    Ok(max_height + tables.height_bracket.lookup(max_height)?)
}

/// Height of the tallest product (0 for none).
pub fn max_product_height(products: &[Product]) -> f64 {
    products
        .iter()
        .map(|p| p.dimensions.height)
        .fold(0.0, f64::max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use u_molding_core::{Footprint, PlacedRect};

    fn layout(width: f64, length: f64) -> Layout {
        let rect = PlacedRect::new(Footprint::new(width, length), 0.0, 0.0, false);
        Layout::new(vec![rect], width, length, 30.0)
    }

    #[test]
    fn test_edge_margin_uses_larger_lookup() {
        let tables = LookupTables::default();
        // width 150 -> 70, length 450 -> 100
        let edge = edge_margin(&layout(150.0, 450.0), &tables).unwrap();
        assert_relative_eq!(edge, 50.0);
    }

    #[test]
    fn test_bottom_margin() {
        let tables = LookupTables::default();
        assert_relative_eq!(bottom_margin(80.0, &tables).unwrap(), 140.0);
        assert_relative_eq!(bottom_margin(500.0, &tables).unwrap(), 660.0);
    }

    #[test]
    fn test_mold_weight() {
        let tables = LookupTables::default();
        let config = MoldConfig::new().with_material_density(1e-6);
        let block = MoldSpec::derive(&layout(200.0, 100.0), 40.0, &tables, &config).unwrap();
        // edge = max(70, 60) / 2 = 35, bottom = 40 + 40 = 80
        assert_relative_eq!(block.edge_margin, 35.0);
        assert_relative_eq!(block.outer_width, 270.0);
        assert_relative_eq!(block.outer_length, 170.0);
        assert_relative_eq!(block.bottom_margin, 80.0);
        assert_relative_eq!(block.weight, 170.0 * 270.0 * 80.0 * 1e-6, epsilon = 1e-9);
        assert_relative_eq!(block.volume(), 170.0 * 270.0 * 80.0);
    }

    #[test]
    fn test_max_product_height() {
        let products = vec![
            Product::new("a", 10.0, 10.0, 12.0),
            Product::new("b", 10.0, 10.0, 30.0),
        ];
        assert_relative_eq!(max_product_height(&products), 30.0);
        assert_eq!(max_product_height(&[]), 0.0);
    }
}
