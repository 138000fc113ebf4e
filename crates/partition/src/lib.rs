//! # U-Molding Partition
//!
//! Splits a product mix into mold-compatible groups and ranks the
//! resulting schemes by price.
//!
//! ## Pipeline
//!
//! 1. **Enumerate**: backtracking over color/material-compatible partitions,
//!    bounded by [`SearchLimits`] (or a beam search for larger mixes)
//! 2. **Evaluate**: pack every group with the layout packer, grade the
//!    layout with the balance scorer, derive the mold and price it through a
//!    [`PricingModel`]
//! 3. **Rank**: drop schemes with a weak group and sort by total price
//!
//! A separate [`distribute_molds`] search spreads products over molds under
//! the weight-balance rules of [`is_valid_grouping`].
//!
//! ## Quick Start
//!
//! ```rust
//! use u_molding_partition::{search, PartitionConfig, SearchContext};
//! use u_molding_core::Product;
//!
//! let products = vec![
//!     Product::new("lid", 120.0, 80.0, 20.0).with_weight(60.0),
//!     Product::new("base", 120.0, 80.0, 35.0).with_weight(75.0),
//!     Product::new("clip", 30.0, 10.0, 5.0).with_weight(2.0),
//! ];
//!
//! let ctx = SearchContext::new(PartitionConfig::default());
//! let outcome = search(&products, &ctx).unwrap();
//!
//! assert_eq!(outcome.enumerated, 5);
//! if let Some(best) = outcome.best() {
//!     assert!(best.total_price > 0.0);
//! }
//! ```

pub mod compat;
pub mod config;
pub mod distribution;
pub mod enumerate;
pub mod evaluate;
pub mod pricing;
pub mod scheme;
pub mod weight_balance;

// Re-exports
pub use compat::GroupingRules;
pub use config::{
    InjectionPolicy, MoldDistributionConfig, PartitionConfig, SearchLimits, SearchStrategy,
};
pub use distribution::{distribute_molds, distribute_molds_with, MoldDistribution};
pub use enumerate::{enumerate_schemes, enumerate_schemes_with_cancel, Enumeration};
pub use evaluate::{
    evaluate_group, evaluate_scheme, evaluate_schemes, search, SearchContext, SearchOutcome,
};
pub use pricing::{FlatRatePricing, MoldQuote, PricingModel};
pub use scheme::{membership_key, EvaluatedGroup, EvaluatedScheme, Scheme};
pub use u_molding_core::{Error, Result};
pub use weight_balance::{balanced_split, is_balanced, is_valid_grouping};
