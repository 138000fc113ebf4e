//! Scheme evaluation: pack, score and price every group, then rank.
//!
//! Schemes are evaluated on the rayon pool, one task per scheme, with the
//! groups of a scheme evaluated by a nested parallel iterator. All groups of
//! a scheme are joined before its total price is computed.

use crate::config::{InjectionPolicy, PartitionConfig};
use crate::enumerate::enumerate_schemes_with_cancel;
use crate::pricing::{FlatRatePricing, MoldQuote, PricingModel};
use crate::scheme::{EvaluatedGroup, EvaluatedScheme, Scheme, SINGLETON_SCORE};
use rayon::prelude::*;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use u_molding_balance::BalanceScorer;
use u_molding_core::{validate_products, Error, Layout, LookupTables, Point2, Product, Result};
use u_molding_layout::{LayoutPacker, MoldConfig, MoldSpec};

/// Everything a search needs besides the products.
#[derive(Debug, Clone)]
pub struct SearchContext<M: PricingModel = FlatRatePricing> {
    config: PartitionConfig,
    packer: LayoutPacker,
    scorer: BalanceScorer,
    tables: LookupTables,
    mold: MoldConfig,
    pricing: M,
    cancelled: Arc<AtomicBool>,
}

impl SearchContext<FlatRatePricing> {
    /// Creates a context with default packer, scorer, tables and flat-rate pricing.
    pub fn new(config: PartitionConfig) -> Self {
        Self::with_pricing(config, FlatRatePricing::default())
    }

    /// Creates a context with default configuration.
    pub fn default_config() -> Self {
        Self::new(PartitionConfig::default())
    }
}

impl<M: PricingModel> SearchContext<M> {
    /// Creates a context with an explicit pricing model.
    pub fn with_pricing(config: PartitionConfig, pricing: M) -> Self {
        Self {
            config,
            packer: LayoutPacker::default_config(),
            scorer: BalanceScorer::default_config(),
            tables: LookupTables::default(),
            mold: MoldConfig::default(),
            pricing,
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Replaces the layout packer.
    pub fn with_packer(mut self, packer: LayoutPacker) -> Self {
        self.packer = packer;
        self
    }

    /// Replaces the balance scorer.
    pub fn with_scorer(mut self, scorer: BalanceScorer) -> Self {
        self.scorer = scorer;
        self
    }

    /// Replaces the lookup tables used by the packer and the mold derivation.
    pub fn with_tables(mut self, tables: LookupTables) -> Self {
        self.packer = self.packer.with_tables(tables.clone());
        self.tables = tables;
        self
    }

    /// Replaces the mold material constants.
    pub fn with_mold_config(mut self, mold: MoldConfig) -> Self {
        self.mold = mold;
        self
    }

    /// Returns the partition configuration.
    pub fn config(&self) -> &PartitionConfig {
        &self.config
    }

    /// Returns the pricing model.
    pub fn pricing(&self) -> &M {
        &self.pricing
    }

    /// Returns a handle to cancel the search.
    pub fn cancel_handle(&self) -> Arc<AtomicBool> {
        self.cancelled.clone()
    }

    fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }

    fn injection_point(&self, layout: &Layout) -> Point2<f64> {
        match self.config.injection {
            InjectionPolicy::LayoutCenter => layout.center(),
            InjectionPolicy::Relative { x, y } => Point2::new(layout.width * x, layout.length * y),
        }
    }
}

/// Result of [`search`].
#[derive(Debug, Clone, Default)]
pub struct SearchOutcome {
    /// Surviving schemes, cheapest first.
    pub schemes: Vec<EvaluatedScheme>,
    /// Schemes produced by enumeration.
    pub enumerated: usize,
    /// Schemes dropped for a group below the minimum score.
    pub discarded: usize,
    /// True if enumeration was cut short.
    pub truncated: bool,
    /// Wall-clock time in milliseconds.
    pub elapsed_ms: u64,
}

impl SearchOutcome {
    /// The cheapest surviving scheme.
    pub fn best(&self) -> Option<&EvaluatedScheme> {
        self.schemes.first()
    }

    /// True if no scheme survived.
    pub fn is_empty(&self) -> bool {
        self.schemes.is_empty()
    }
}

/// Packs, scores and prices the products at `members`.
pub fn evaluate_group<M: PricingModel>(
    products: &[Product],
    members: &[usize],
    ctx: &SearchContext<M>,
) -> Result<EvaluatedGroup> {
    if members.is_empty() {
        return Err(Error::invalid("cannot evaluate an empty group"));
    }
    let group: Vec<&Product> = members
        .iter()
        .map(|&i| {
            products
                .get(i)
                .ok_or_else(|| Error::invalid(format!("group member {} out of range", i)))
        })
        .collect::<Result<_>>()?;
    let owned: Vec<Product> = group.iter().map(|p| (*p).clone()).collect();

    let footprints: Vec<_> = owned.iter().map(Product::footprint).collect();
    let layout = ctx.packer.pack(&footprints)?;
    let balance = ctx
        .scorer
        .score(&layout, &owned, ctx.injection_point(&layout))?;
    let score = if members.len() == 1 {
        SINGLETON_SCORE
    } else {
        balance.total
    };

    let mold = MoldSpec::for_products(&layout, &owned, &ctx.tables, &ctx.mold)?;
    let quote = MoldQuote::new(mold.clone(), &group);
    let mold_price = ctx.pricing.mold_price(&quote);
    let product_prices: Vec<f64> = group
        .iter()
        .map(|p| ctx.pricing.product_price(&quote, p))
        .collect();
    let total_price = mold_price
        + product_prices
            .iter()
            .zip(&group)
            .map(|(price, p)| price * f64::from(p.quantity))
            .sum::<f64>();

    log::trace!(
        "group {:?}: score {:.2}, mold weight {:.3}, price {:.2}",
        members,
        score,
        mold.weight,
        total_price
    );

    Ok(EvaluatedGroup {
        members: members.to_vec(),
        layout,
        balance,
        score,
        mold,
        mold_price,
        product_prices,
        total_price,
    })
}

/// Evaluates every group of `scheme`.
///
/// # Errors
///
/// [`Error::InvalidInput`] if `scheme` is not a partition of `products`.
pub fn evaluate_scheme<M: PricingModel>(
    products: &[Product],
    scheme: &Scheme,
    ctx: &SearchContext<M>,
) -> Result<EvaluatedScheme> {
    if !scheme.is_partition_of(products.len()) {
        return Err(Error::invalid(format!(
            "scheme {:?} is not a partition of {} products",
            scheme.groups,
            products.len()
        )));
    }

    let groups: Vec<EvaluatedGroup> = if ctx.config.parallel {
        scheme
            .groups
            .par_iter()
            .map(|members| evaluate_group(products, members, ctx))
            .collect::<Result<_>>()?
    } else {
        scheme
            .groups
            .iter()
            .map(|members| evaluate_group(products, members, ctx))
            .collect::<Result<_>>()?
    };

    let score = if groups.is_empty() {
        0.0
    } else {
        groups.iter().map(|g| g.score).sum::<f64>() / groups.len() as f64
    };
    let total_price = groups.iter().map(|g| g.total_price).sum();
    Ok(EvaluatedScheme {
        groups,
        score,
        total_price,
    })
}

/// Evaluates `schemes`, drops those with a group below the minimum score and
/// sorts the rest by ascending total price.
///
/// # Errors
///
/// The first packing, scoring or pricing error, or [`Error::Cancelled`].
pub fn evaluate_schemes<M: PricingModel>(
    products: &[Product],
    schemes: &[Scheme],
    ctx: &SearchContext<M>,
) -> Result<Vec<EvaluatedScheme>> {
    validate_products(products)?;
    let min_score = ctx.config.min_group_score;

    let evaluate = |scheme: &Scheme| -> Result<Option<EvaluatedScheme>> {
        if ctx.is_cancelled() {
            return Err(Error::Cancelled);
        }
        let evaluated = evaluate_scheme(products, scheme, ctx)?;
        if evaluated.min_group_score() < min_score {
            log::debug!(
                "discarding scheme {:?}: group score {:.2} below {:.2}",
                scheme.groups,
                evaluated.min_group_score(),
                min_score
            );
            return Ok(None);
        }
        Ok(Some(evaluated))
    };

    let results: Vec<Option<EvaluatedScheme>> = if ctx.config.parallel {
        schemes.par_iter().map(evaluate).collect::<Result<_>>()?
    } else {
        schemes.iter().map(evaluate).collect::<Result<_>>()?
    };

    let mut kept: Vec<EvaluatedScheme> = results.into_iter().flatten().collect();
    kept.sort_by(|a, b| a.total_price.total_cmp(&b.total_price));
    Ok(kept)
}

/// Enumerates, evaluates and ranks partitions of `products`.
pub fn search<M: PricingModel>(products: &[Product], ctx: &SearchContext<M>) -> Result<SearchOutcome> {
    let start = Instant::now();
    let enumeration = enumerate_schemes_with_cancel(products, &ctx.config, &ctx.cancelled)?;
    let schemes = evaluate_schemes(products, &enumeration.schemes, ctx)?;
    let enumerated = enumeration.schemes.len();

    let outcome = SearchOutcome {
        discarded: enumerated - schemes.len(),
        schemes,
        enumerated,
        truncated: enumeration.truncated,
        elapsed_ms: start.elapsed().as_millis() as u64,
    };
    log::debug!(
        "search: {} of {} schemes kept in {}ms{}",
        outcome.schemes.len(),
        outcome.enumerated,
        outcome.elapsed_ms,
        if outcome.truncated { " (truncated)" } else { "" }
    );
    Ok(outcome)
}
