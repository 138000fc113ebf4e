//! Pricing collaborator interface.
//!
//! The search only consumes prices; how they are computed is up to the
//! [`PricingModel`] implementation.

use u_molding_core::Product;
use u_molding_layout::MoldSpec;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// What a pricing model is told about one mold.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MoldQuote {
    /// Derived mold block.
    pub mold: MoldSpec,
    /// Material of the group's reference product.
    pub material: String,
    /// Number of cavities (products) in the mold.
    pub cavities: usize,
    /// Sum of known product weights.
    pub shot_weight: f64,
}

impl MoldQuote {
    /// Builds a quote for `members` molded in `mold`.
    pub fn new(mold: MoldSpec, members: &[&Product]) -> Self {
        Self {
            mold,
            material: members
                .first()
                .map(|p| p.material.clone())
                .unwrap_or_default(),
            cavities: members.len(),
            shot_weight: members
                .iter()
                .filter_map(|p| p.effective_weight())
                .sum(),
        }
    }
}

/// Prices molds and molded parts.
pub trait PricingModel: Send + Sync {
    /// Price of building the mold.
    fn mold_price(&self, quote: &MoldQuote) -> f64;

    /// Unit price of `product` molded in the quoted mold.
    fn product_price(&self, quote: &MoldQuote, product: &Product) -> f64;
}

/// Linear pricing: mold by block weight, parts by weight plus a share of the
/// per-shot machine cost.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FlatRatePricing {
    /// Fixed cost per mold.
    pub mold_base: f64,
    /// Cost per unit of mold block weight.
    pub mold_rate: f64,
    /// Cost per unit of product weight.
    pub material_rate: f64,
    /// Machine cost per shot, shared by the cavities.
    pub shot_rate: f64,
}

impl Default for FlatRatePricing {
    fn default() -> Self {
        Self {
            mold_base: 2_000.0,
            mold_rate: 15.0,
            material_rate: 0.004,
            shot_rate: 0.5,
        }
    }
}

impl FlatRatePricing {
    /// Creates a pricing model with default rates.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the fixed cost per mold.
    pub fn with_mold_base(mut self, base: f64) -> Self {
        self.mold_base = base.max(0.0);
        self
    }

    /// Sets the cost per unit of mold weight.
    pub fn with_mold_rate(mut self, rate: f64) -> Self {
        self.mold_rate = rate.max(0.0);
        self
    }

    /// Sets the cost per unit of product weight.
    pub fn with_material_rate(mut self, rate: f64) -> Self {
        self.material_rate = rate.max(0.0);
        self
    }

    /// Sets the machine cost per shot.
    pub fn with_shot_rate(mut self, rate: f64) -> Self {
        self.shot_rate = rate.max(0.0);
        self
    }
}

impl PricingModel for FlatRatePricing {
    fn mold_price(&self, quote: &MoldQuote) -> f64 {
        self.mold_base + self.mold_rate * quote.mold.weight
    }

    fn product_price(&self, quote: &MoldQuote, product: &Product) -> f64 {
        let material = self.material_rate * product.effective_weight().unwrap_or(0.0);
        material + self.shot_rate / quote.cavities.max(1) as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn mold(weight: f64) -> MoldSpec {
        MoldSpec {
            cavity_width: 100.0,
            cavity_length: 100.0,
            edge_margin: 35.0,
            bottom_margin: 80.0,
            outer_width: 170.0,
            outer_length: 170.0,
            weight,
        }
    }

    #[test]
    fn test_quote_from_members() {
        let a = Product::new("a", 10.0, 10.0, 5.0)
            .with_weight(20.0)
            .with_material("ABS");
        let b = Product::new("b", 10.0, 10.0, 5.0).with_material("ABS");
        let quote = MoldQuote::new(mold(18.0), &[&a, &b]);
        assert_eq!(quote.material, "ABS");
        assert_eq!(quote.cavities, 2);
        assert_eq!(quote.shot_weight, 20.0);
    }

    #[test]
    fn test_flat_rate_prices() {
        let pricing = FlatRatePricing::default();
        let p = Product::new("a", 10.0, 10.0, 5.0).with_weight(100.0);
        let quote = MoldQuote::new(mold(20.0), &[&p, &p]);
        assert_relative_eq!(pricing.mold_price(&quote), 2_000.0 + 15.0 * 20.0);
        assert_relative_eq!(pricing.product_price(&quote, &p), 0.4 + 0.25);
    }
}
