//! Rectangle-packing primitive.
//!
//! The layout packer treats the primitive as a black box: given fixed-size
//! boxes it returns one position per box and the bounding size. The default
//! [`SkylinePacker`] picks a strip width from the total area and places boxes
//! bottom-left on a skyline, tallest first.

use u_molding_core::{Footprint, GEOM_EPS};

/// Output of a [`RectPacker`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PackedBoxes {
    /// `(x, y)` of each box, in input order.
    pub positions: Vec<(f64, f64)>,
    /// Bounding width.
    pub width: f64,
    /// Bounding height.
    pub height: f64,
}

impl PackedBoxes {
    /// Bounding area.
    pub fn area(&self) -> f64 {
        self.width * self.height
    }
}

/// A packing primitive for fixed-size, unrotatable boxes.
pub trait RectPacker: Send + Sync {
    /// Packs `boxes` without overlap and returns their positions.
    fn pack(&self, boxes: &[Footprint]) -> PackedBoxes;
}

#[derive(Debug, Clone, Copy)]
struct Segment {
    x: f64,
    y: f64,
    width: f64,
}

impl Segment {
    fn end(&self) -> f64 {
        self.x + self.width
    }
}

#[derive(Debug)]
struct Skyline {
    segments: Vec<Segment>,
    strip_width: f64,
}

impl Skyline {
    fn new(strip_width: f64) -> Self {
        Self {
            segments: vec![Segment {
                x: 0.0,
                y: 0.0,
                width: strip_width,
            }],
            strip_width,
        }
    }

    /// Resting height for a box of width `w` whose left edge is at segment `i`.
    fn fit(&self, i: usize, w: f64) -> Option<f64> {
        let x = self.segments[i].x;
        let end = x + w;
        if end > self.strip_width + GEOM_EPS {
            return None;
        }
        let y = self.segments[i..]
            .iter()
            .take_while(|s| s.x < end - GEOM_EPS)
            .map(|s| s.y)
            .fold(f64::NEG_INFINITY, f64::max);
        Some(y)
    }

    /// Finds the bottom-left position for a box of width `w`.
    fn find_position(&self, w: f64) -> Option<(f64, f64)> {
        let mut best: Option<(f64, f64)> = None;
        for i in 0..self.segments.len() {
            let Some(y) = self.fit(i, w) else { continue };
            let x = self.segments[i].x;
            let better = match best {
                None => true,
                Some((bx, by)) => y < by - GEOM_EPS || ((y - by).abs() <= GEOM_EPS && x < bx),
            };
            if better {
                best = Some((x, y));
            }
        }
        best
    }

    /// Raises the skyline over `[x, x + w)` to `top`.
    fn place(&mut self, x: f64, w: f64, top: f64) {
        let end = x + w;
        let mut next = Vec::with_capacity(self.segments.len() + 2);
        for seg in &self.segments {
            if seg.end() <= x + GEOM_EPS || seg.x >= end - GEOM_EPS {
                next.push(*seg);
                continue;
            }
            if seg.x < x - GEOM_EPS {
                next.push(Segment {
                    x: seg.x,
                    y: seg.y,
                    width: x - seg.x,
                });
            }
            if seg.end() > end + GEOM_EPS {
                next.push(Segment {
                    x: end,
                    y: seg.y,
                    width: seg.end() - end,
                });
            }
        }
        next.push(Segment { x, y: top, width: w });
        next.sort_by(|a, b| a.x.total_cmp(&b.x));

        // merge neighbours at the same height
        let mut merged: Vec<Segment> = Vec::with_capacity(next.len());
        for seg in next {
            match merged.last_mut() {
                Some(last) if (last.y - seg.y).abs() <= GEOM_EPS => last.width += seg.width,
                _ => merged.push(seg),
            }
        }
        self.segments = merged;
    }
}

/// Bottom-left skyline packer over an area-derived strip width.
#[derive(Debug, Clone, PartialEq)]
pub struct SkylinePacker {
    /// Fill ratio assumed when deriving the strip width from the total area.
    pub target_fill: f64,
}

impl Default for SkylinePacker {
    fn default() -> Self {
        Self { target_fill: 0.95 }
    }
}

impl SkylinePacker {
    /// Creates a skyline packer with the default target fill.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the target fill used to size the strip (0.1 - 1.0).
    pub fn with_target_fill(mut self, fill: f64) -> Self {
        self.target_fill = fill.clamp(0.1, 1.0);
        self
    }

    fn strip_width(&self, boxes: &[Footprint]) -> f64 {
        let area: f64 = boxes.iter().map(Footprint::area).sum();
        let widest = boxes.iter().map(|b| b.width).fold(0.0, f64::max);
        (area / self.target_fill).sqrt().ceil().max(widest)
    }
}

impl RectPacker for SkylinePacker {
    fn pack(&self, boxes: &[Footprint]) -> PackedBoxes {
        if boxes.is_empty() {
            return PackedBoxes::default();
        }

        let mut order: Vec<usize> = (0..boxes.len()).collect();
        order.sort_by(|&a, &b| {
            boxes[b]
                .length
                .total_cmp(&boxes[a].length)
                .then(boxes[b].width.total_cmp(&boxes[a].width))
        });

        let mut skyline = Skyline::new(self.strip_width(boxes));
        let mut positions = vec![(0.0, 0.0); boxes.len()];
        let mut width = 0.0_f64;
        let mut height = 0.0_f64;

        for idx in order {
            let b = boxes[idx];
            // The strip is at least as wide as the widest box, so the
            // leftmost segment always fits.
            let (x, y) = skyline.find_position(b.width).unwrap_or((0.0, height));
            skyline.place(x, b.width, y + b.length);
            positions[idx] = (x, y);
            width = width.max(x + b.width);
            height = height.max(y + b.length);
        }

        PackedBoxes {
            positions,
            width,
            height,
        }
    }
}
