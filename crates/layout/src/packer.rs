//! Rotation-searching layout packer.
//!
//! # Algorithm
//!
//! 1. Derive the inter-item spacing from the largest footprint dimension.
//! 2. Order footprints by area (descending), preferring near-square items on ties.
//! 3. Build a small set of global rotation candidates: the preferred-rotation
//!    heuristic, its complement, all unrotated, all rotated, and one variant per
//!    distinct large item with only that item flipped.
//! 4. For each candidate, run a few randomized mutations (flip one or two
//!    items) and pack the spacing-inflated boxes with the [`RectPacker`].
//!    When every rotation assignment fits in that attempt budget, try them
//!    all instead.
//! 5. Round the packed extent up to the plate module and remove the trailing
//!    spacing.
//! 6. Keep the attempt with the lowest `area * (1 + penalty * |aspect - 1|)`,
//!    breaking near-ties by fill ratio.

use crate::config::PackerConfig;
use crate::skyline::{RectPacker, SkylinePacker};
use rand::prelude::*;
use rand::rngs::StdRng;
use u_molding_core::{Footprint, Layout, LookupTables, PlacedRect, Result, GEOM_EPS};

/// One packing attempt for a full rotation assignment.
#[derive(Debug, Clone)]
struct Attempt {
    rotations: Vec<bool>,
    positions: Vec<(f64, f64)>,
    width: f64,
    length: f64,
    score: f64,
    fill: f64,
}

/// Packs product footprints into a near-minimal bounding rectangle.
#[derive(Debug, Clone)]
pub struct LayoutPacker<P: RectPacker = SkylinePacker> {
    config: PackerConfig,
    tables: LookupTables,
    primitive: P,
}

impl LayoutPacker<SkylinePacker> {
    /// Creates a packer with the default skyline primitive and lookup tables.
    pub fn new(config: PackerConfig) -> Self {
        Self::with_primitive(config, LookupTables::default(), SkylinePacker::default())
    }

    /// Creates a packer with default configuration.
    pub fn default_config() -> Self {
        Self::new(PackerConfig::default())
    }
}

impl<P: RectPacker> LayoutPacker<P> {
    /// Creates a packer with an explicit primitive and table set.
    pub fn with_primitive(config: PackerConfig, tables: LookupTables, primitive: P) -> Self {
        Self {
            config,
            tables,
            primitive,
        }
    }

    /// Replaces the lookup tables.
    pub fn with_tables(mut self, tables: LookupTables) -> Self {
        self.tables = tables;
        self
    }

    /// Returns the configuration.
    pub fn config(&self) -> &PackerConfig {
        &self.config
    }

    /// Returns the lookup tables.
    pub fn tables(&self) -> &LookupTables {
        &self.tables
    }

    /// Spacing required between the given footprints.
    pub fn required_spacing(&self, footprints: &[Footprint]) -> Result<f64> {
        let largest = footprints
            .iter()
            .map(Footprint::max_dimension)
            .fold(0.0, f64::max);
        self.tables.spacing_for(largest)
    }

    /// Packs `footprints` and returns a layout whose `rects[i]` belongs to
    /// `footprints[i]`.
    ///
    /// Empty input yields [`Layout::empty`]. A footprint larger than the
    /// spacing table supports is an `InvalidInput` error.
    pub fn pack(&self, footprints: &[Footprint]) -> Result<Layout> {
        if footprints.is_empty() {
            return Ok(Layout::empty());
        }
        for fp in footprints {
            fp.validate()?;
        }

        let spacing = self.required_spacing(footprints)?;
        let order = area_order(footprints);
        let candidates = self.rotation_candidates(footprints);
        log::debug!(
            "packing {} footprints with spacing {} over {} rotation candidates",
            footprints.len(),
            spacing,
            candidates.len()
        );

        let budget = candidates.len() * (1 + self.config.mutation_rounds);
        let best = match 1usize.checked_shl(footprints.len() as u32) {
            Some(total) if total <= budget => {
                log::trace!("trying all {} rotation assignments", total);
                self.search_all(footprints, &order, total, spacing)
            }
            _ => self.search_candidates(footprints, &order, candidates, spacing),
        };

        let Some(best) = best else {
            return Ok(Layout::empty());
        };
        log::debug!(
            "selected layout {:.1} x {:.1} (score {:.1}, fill {:.3})",
            best.width,
            best.length,
            best.score,
            best.fill
        );

        let rects = footprints
            .iter()
            .zip(best.positions.iter().zip(best.rotations.iter()))
            .map(|(fp, (&(x, y), &rotated))| PlacedRect::new(*fp, x, y, rotated))
            .collect();
        Ok(Layout::new(rects, best.width, best.length, spacing))
    }

    /// Mutation search around each rotation candidate.
    fn search_candidates(
        &self,
        footprints: &[Footprint],
        order: &[usize],
        candidates: Vec<Vec<bool>>,
        spacing: f64,
    ) -> Option<Attempt> {
        let mut rng = StdRng::seed_from_u64(self.config.seed);
        let mut best: Option<Attempt> = None;

        for candidate in candidates {
            let mut local = self.attempt(footprints, order, candidate, spacing);
            for _ in 0..self.config.mutation_rounds {
                let mutated = mutate(&local.rotations, &mut rng);
                let attempt = self.attempt(footprints, order, mutated, spacing);
                if self.is_better(&attempt, &local) {
                    local = attempt;
                }
            }
            best = self.keep_better(best, local);
        }
        best
    }

    /// Packs every rotation assignment; bit `i` of the mask rotates item `i`.
    fn search_all(
        &self,
        footprints: &[Footprint],
        order: &[usize],
        total: usize,
        spacing: f64,
    ) -> Option<Attempt> {
        (0..total).fold(None, |best, mask| {
            let rotations = (0..footprints.len()).map(|i| mask & (1 << i) != 0).collect();
            let attempt = self.attempt(footprints, order, rotations, spacing);
            self.keep_better(best, attempt)
        })
    }

    fn keep_better(&self, best: Option<Attempt>, candidate: Attempt) -> Option<Attempt> {
        match best {
            Some(current) if !self.is_better(&candidate, &current) => Some(current),
            _ => Some(candidate),
        }
    }

    /// Preferred rotation: turn long-vertical items to lie horizontally,
    /// leaving near-square items untouched.
    pub fn preferred_rotations(&self, footprints: &[Footprint]) -> Vec<bool> {
        footprints
            .iter()
            .map(|fp| {
                fp.aspect_ratio() > 1.0 + self.config.near_square_tolerance
                    && fp.length > fp.width
            })
            .collect()
    }

    /// Builds the deduplicated set of global rotation assignments to try.
    fn rotation_candidates(&self, footprints: &[Footprint]) -> Vec<Vec<bool>> {
        let n = footprints.len();
        let heuristic = self.preferred_rotations(footprints);
        let complement: Vec<bool> = heuristic.iter().map(|r| !r).collect();

        let mut candidates = vec![heuristic.clone(), complement, vec![false; n], vec![true; n]];

        let max_area = footprints.iter().map(Footprint::area).fold(0.0, f64::max);
        let threshold = max_area * self.config.large_item_fraction;
        let mut seen: Vec<Footprint> = Vec::new();
        for (i, fp) in footprints.iter().enumerate() {
            if seen.len() >= self.config.max_perturbed_items {
                break;
            }
            if fp.area() + GEOM_EPS < threshold {
                continue;
            }
            let duplicate = seen.iter().any(|s| same_shape(s, fp));
            if duplicate {
                continue;
            }
            seen.push(*fp);
            let mut variant = heuristic.clone();
            variant[i] = !variant[i];
            candidates.push(variant);
        }

        let mut unique: Vec<Vec<bool>> = Vec::with_capacity(candidates.len());
        for c in candidates {
            if !unique.contains(&c) {
                unique.push(c);
            }
        }
        unique
    }

    /// Packs the spacing-inflated boxes for one rotation assignment.
    fn attempt(
        &self,
        footprints: &[Footprint],
        order: &[usize],
        rotations: Vec<bool>,
        spacing: f64,
    ) -> Attempt {
        let boxes: Vec<Footprint> = order
            .iter()
            .map(|&i| {
                let fp = if rotations[i] {
                    footprints[i].rotated()
                } else {
                    footprints[i]
                };
                fp.inflated(spacing)
            })
            .collect();

        let packed = self.primitive.pack(&boxes);

        let mut positions = vec![(0.0, 0.0); footprints.len()];
        for (slot, &i) in order.iter().enumerate() {
            positions[i] = packed.positions[slot];
        }

        let module = self.config.size_module;
        let width = (round_up(packed.width, module) - spacing).max(0.0);
        let length = (round_up(packed.height, module) - spacing).max(0.0);
        let area = width * length;
        let aspect = if width.min(length) > GEOM_EPS {
            width.max(length) / width.min(length)
        } else {
            1.0
        };
        let used: f64 = footprints.iter().map(Footprint::area).sum();

        Attempt {
            rotations,
            positions,
            width,
            length,
            score: area * (1.0 + self.config.aspect_penalty * (aspect - 1.0).abs()),
            fill: if area > GEOM_EPS { used / area } else { 0.0 },
        }
    }

    fn is_better(&self, candidate: &Attempt, incumbent: &Attempt) -> bool {
        let delta = candidate.score - incumbent.score;
        if delta.abs() <= self.config.tie_tolerance {
            candidate.fill > incumbent.fill + 1e-12
        } else {
            delta < 0.0
        }
    }
}

/// Indices sorted by area descending, near-square first on ties.
fn area_order(footprints: &[Footprint]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..footprints.len()).collect();
    order.sort_by(|&a, &b| {
        let fa = &footprints[a];
        let fb = &footprints[b];
        fb.area().total_cmp(&fa.area()).then(
            (fa.aspect_ratio() - 1.0)
                .abs()
                .total_cmp(&(fb.aspect_ratio() - 1.0).abs()),
        )
    });
    order
}

/// Rounds `value` up to a multiple of `module`; a zero module is a no-op.
fn round_up(value: f64, module: f64) -> f64 {
    if module <= GEOM_EPS {
        return value;
    }
    ((value - GEOM_EPS) / module).ceil().max(0.0) * module
}

fn same_shape(a: &Footprint, b: &Footprint) -> bool {
    ((a.width - b.width).abs() < GEOM_EPS && (a.length - b.length).abs() < GEOM_EPS)
        || ((a.width - b.length).abs() < GEOM_EPS && (a.length - b.width).abs() < GEOM_EPS)
}

/// Flips the rotation of one or two random items.
fn mutate<R: Rng>(rotations: &[bool], rng: &mut R) -> Vec<bool> {
    let mut mutated = rotations.to_vec();
    let n = mutated.len();
    if n == 0 {
        return mutated;
    }
    let flips = if n > 1 && rng.gen_bool(0.5) { 2 } else { 1 };
    let first = rng.gen_range(0..n);
    mutated[first] = !mutated[first];
    if flips == 2 {
        let mut second = rng.gen_range(0..n - 1);
        if second >= first {
            second += 1;
        }
        mutated[second] = !mutated[second];
    }
    mutated
}
