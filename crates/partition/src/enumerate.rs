//! Bounded enumeration of compatible product partitions.
//!
//! # Exhaustive
//!
//! Products are placed in input order. Each product either joins an existing
//! group whose first member it is compatible with, or opens a new group.
//! Because groups are only ever opened in order, every set partition is
//! reached by exactly one recursion path, so the output has no duplicates.
//!
//! # Beam
//!
//! The same expansion is run level by level, keeping only the `width`
//! partial partitions whose groups have the most similar footprint areas.

use crate::compat::GroupingRules;
use crate::config::{PartitionConfig, SearchLimits, SearchStrategy};
use crate::scheme::Scheme;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;
use u_molding_core::{validate_products, Error, Product, Result};

/// Nodes visited between wall-clock checks.
pub(crate) const CHECK_INTERVAL: usize = 1024;

/// Result of an enumeration.
#[derive(Debug, Clone, Default)]
pub struct Enumeration {
    /// Complete partitions found.
    pub schemes: Vec<Scheme>,
    /// True if a cap or the time limit cut the search short.
    pub truncated: bool,
    /// Search nodes (partial placements) visited.
    pub explored: usize,
}

impl Enumeration {
    /// Number of schemes.
    pub fn len(&self) -> usize {
        self.schemes.len()
    }

    /// True if no scheme was found.
    pub fn is_empty(&self) -> bool {
        self.schemes.is_empty()
    }
}

/// Wall-clock and cancellation budget shared by the search routines.
pub(crate) struct Budget<'a> {
    limits: &'a SearchLimits,
    start: Instant,
    cancelled: &'a AtomicBool,
}

impl<'a> Budget<'a> {
    pub(crate) fn new(limits: &'a SearchLimits, cancelled: &'a AtomicBool) -> Self {
        Self {
            limits,
            start: Instant::now(),
            cancelled,
        }
    }

    /// `Err(Cancelled)` when cancelled, `Ok(true)` when the time limit is spent.
    pub(crate) fn exhausted(&self) -> Result<bool> {
        if self.cancelled.load(Ordering::Relaxed) {
            return Err(Error::Cancelled);
        }
        Ok(self
            .limits
            .time_limit()
            .map_or(false, |limit| self.start.elapsed() > limit))
    }

    /// Handles an expired time limit: an error in strict mode.
    pub(crate) fn on_timeout(&self) -> Result<()> {
        log::warn!(
            "enumeration stopped after {}ms time limit",
            self.limits.time_limit_ms
        );
        if self.limits.strict {
            Err(Error::Timeout(self.limits.time_limit_ms))
        } else {
            Ok(())
        }
    }

    /// Handles a full scheme cap: an error in strict mode.
    pub(crate) fn on_overflow(&self) -> Result<()> {
        log::warn!(
            "enumeration truncated at {} schemes",
            self.limits.max_schemes
        );
        if self.limits.strict {
            Err(Error::EnumerationOverflow {
                limit: self.limits.max_schemes,
            })
        } else {
            Ok(())
        }
    }

    pub(crate) fn limits(&self) -> &SearchLimits {
        self.limits
    }
}

/// Enumerates partitions of `products` under `config`.
///
/// # Errors
///
/// - [`Error::InvalidInput`] for malformed products, or more products than
///   `limits.max_products` under the exhaustive strategy
/// - [`Error::EnumerationOverflow`] / [`Error::Timeout`] when a cap is hit in
///   strict mode
pub fn enumerate_schemes(products: &[Product], config: &PartitionConfig) -> Result<Enumeration> {
    enumerate_schemes_with_cancel(products, config, &AtomicBool::new(false))
}

/// Like [`enumerate_schemes`], stopping with [`Error::Cancelled`] once
/// `cancelled` is set.
pub fn enumerate_schemes_with_cancel(
    products: &[Product],
    config: &PartitionConfig,
    cancelled: &AtomicBool,
) -> Result<Enumeration> {
    validate_products(products)?;
    if products.is_empty() {
        return Ok(Enumeration::default());
    }

    let rules = GroupingRules::from_partition(config);
    let budget = Budget::new(&config.limits, cancelled);
    let enumeration = match config.strategy {
        SearchStrategy::Exhaustive => {
            if products.len() > config.limits.max_products {
                return Err(Error::invalid(format!(
                    "{} products exceed the exhaustive search limit of {}",
                    products.len(),
                    config.limits.max_products
                )));
            }
            exhaustive(products, rules, &budget)?
        }
        SearchStrategy::Beam { width } => beam(products, rules, width.max(1), &budget)?,
    };

    log::debug!(
        "enumerated {} schemes over {} nodes{}",
        enumeration.schemes.len(),
        enumeration.explored,
        if enumeration.truncated {
            " (truncated)"
        } else {
            ""
        }
    );
    Ok(enumeration)
}

struct Backtrack<'a> {
    products: &'a [Product],
    rules: GroupingRules,
    budget: &'a Budget<'a>,
    groups: Vec<Vec<usize>>,
    out: Enumeration,
    stopped: bool,
}

impl Backtrack<'_> {
    fn place(&mut self, next: usize) -> Result<()> {
        self.out.explored += 1;
        if self.out.explored % CHECK_INTERVAL == 0 && self.budget.exhausted()? {
            self.budget.on_timeout()?;
            self.stop();
            return Ok(());
        }

        if next == self.products.len() {
            if self.out.schemes.len() >= self.budget.limits().max_schemes {
                self.budget.on_overflow()?;
                self.stop();
                return Ok(());
            }
            self.out.schemes.push(Scheme::new(self.groups.clone()));
            return Ok(());
        }

        for g in 0..self.groups.len() {
            if !self.rules.accepts(self.products, &self.groups[g], next) {
                continue;
            }
            self.groups[g].push(next);
            self.place(next + 1)?;
            self.groups[g].pop();
            if self.stopped {
                return Ok(());
            }
        }

        self.groups.push(vec![next]);
        self.place(next + 1)?;
        self.groups.pop();
        Ok(())
    }

    fn stop(&mut self) {
        self.stopped = true;
        self.out.truncated = true;
    }
}

fn exhaustive(
    products: &[Product],
    rules: GroupingRules,
    budget: &Budget<'_>,
) -> Result<Enumeration> {
    let mut search = Backtrack {
        products,
        rules,
        budget,
        groups: Vec::with_capacity(products.len()),
        out: Enumeration::default(),
        stopped: false,
    };
    search.place(0)?;
    Ok(search.out)
}

/// A partial partition and its running estimate.
#[derive(Debug, Clone)]
struct Partial {
    groups: Vec<Vec<usize>>,
    estimate: f64,
}

/// Mean over groups of `100 * smallest / largest` footprint area.
fn footprint_similarity(products: &[Product], groups: &[Vec<usize>]) -> f64 {
    if groups.is_empty() {
        return 100.0;
    }
    let total: f64 = groups
        .iter()
        .map(|g| {
            let (lo, hi) = g.iter().fold((f64::INFINITY, 0.0f64), |(lo, hi), &i| {
                let a = products[i].footprint().area();
                (lo.min(a), hi.max(a))
            });
            if hi > 0.0 {
                100.0 * lo / hi
            } else {
                100.0
            }
        })
        .sum();
    total / groups.len() as f64
}

fn beam(
    products: &[Product],
    rules: GroupingRules,
    width: usize,
    budget: &Budget<'_>,
) -> Result<Enumeration> {
    let mut out = Enumeration::default();
    let mut frontier = vec![Partial {
        groups: Vec::new(),
        estimate: 100.0,
    }];
    let mut placed = 0;

    while placed < products.len() {
        if budget.exhausted()? {
            budget.on_timeout()?;
            out.truncated = true;
            break;
        }

        let mut expanded = Vec::with_capacity(frontier.len() * 2);
        for partial in &frontier {
            for g in 0..partial.groups.len() {
                if rules.accepts(products, &partial.groups[g], placed) {
                    let mut groups = partial.groups.clone();
                    groups[g].push(placed);
                    expanded.push(groups);
                }
            }
            let mut groups = partial.groups.clone();
            groups.push(vec![placed]);
            expanded.push(groups);
        }
        out.explored += expanded.len();

        let mut next: Vec<Partial> = expanded
            .into_iter()
            .map(|groups| Partial {
                estimate: footprint_similarity(products, &groups),
                groups,
            })
            .collect();
        if next.len() > width {
            // stable sort keeps join-existing-group candidates ahead on ties
            next.sort_by(|a, b| b.estimate.total_cmp(&a.estimate));
            next.truncate(width);
            out.truncated = true;
        }
        frontier = next;
        placed += 1;
    }

    // an interrupted beam completes each survivor with singletons
    for partial in &mut frontier {
        partial.groups.extend((placed..products.len()).map(|i| vec![i]));
    }

    let max = budget.limits().max_schemes;
    if frontier.len() > max {
        budget.on_overflow()?;
        frontier.truncate(max);
        out.truncated = true;
    }
    out.schemes = frontier
        .into_iter()
        .map(|p| Scheme::new(p.groups))
        .collect();
    if out.truncated {
        log::warn!(
            "beam search kept {} of the candidate partitions",
            out.schemes.len()
        );
    }
    Ok(out)
}
