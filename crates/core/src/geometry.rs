//! Planar geometry: footprints, placed rectangles and packed layouts.

use crate::{Error, Result};
use nalgebra::Point2;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Tolerance used for geometric comparisons.
pub const GEOM_EPS: f64 = 1e-9;

/// A product's planar extent, ignoring height.
///
/// `width` runs along the x axis and `length` along the y axis.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Footprint {
    /// Extent along x.
    pub width: f64,
    /// Extent along y.
    pub length: f64,
}

impl Footprint {
    /// Creates a new footprint.
    pub fn new(width: f64, length: f64) -> Self {
        Self { width, length }
    }

    /// Returns the planar area.
    pub fn area(&self) -> f64 {
        self.width * self.length
    }

    /// Returns the long edge divided by the short edge (always >= 1).
    ///
    /// Degenerate footprints report 1.0.
    pub fn aspect_ratio(&self) -> f64 {
        let long = self.width.max(self.length);
        let short = self.width.min(self.length);
        if short <= GEOM_EPS {
            1.0
        } else {
            long / short
        }
    }

    /// Returns the larger of the two dimensions.
    pub fn max_dimension(&self) -> f64 {
        self.width.max(self.length)
    }

    /// Returns the footprint with width and length swapped.
    pub fn rotated(&self) -> Self {
        Self {
            width: self.length,
            length: self.width,
        }
    }

    /// Returns the footprint grown by `amount` on both axes.
    pub fn inflated(&self, amount: f64) -> Self {
        Self {
            width: self.width + amount,
            length: self.length + amount,
        }
    }

    /// Validates that both dimensions are finite and positive.
    pub fn validate(&self) -> Result<()> {
        if !self.width.is_finite() || !self.length.is_finite() {
            return Err(Error::invalid(format!(
                "footprint dimensions must be finite, got {}x{}",
                self.width, self.length
            )));
        }
        if self.width <= 0.0 || self.length <= 0.0 {
            return Err(Error::invalid(format!(
                "footprint dimensions must be positive, got {}x{}",
                self.width, self.length
            )));
        }
        Ok(())
    }
}

/// A footprint positioned inside a layout.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PlacedRect {
    /// The unrotated footprint.
    pub footprint: Footprint,
    /// Minimum x of the placed rectangle.
    pub x: f64,
    /// Minimum y of the placed rectangle.
    pub y: f64,
    /// Whether width and length are swapped in the layout.
    pub rotated: bool,
}

impl PlacedRect {
    /// Creates a placed rectangle.
    pub fn new(footprint: Footprint, x: f64, y: f64, rotated: bool) -> Self {
        Self {
            footprint,
            x,
            y,
            rotated,
        }
    }

    /// Returns the footprint as laid out (rotation applied).
    pub fn placed_footprint(&self) -> Footprint {
        if self.rotated {
            self.footprint.rotated()
        } else {
            self.footprint
        }
    }

    /// Extent along x after rotation.
    pub fn width(&self) -> f64 {
        self.placed_footprint().width
    }

    /// Extent along y after rotation.
    pub fn length(&self) -> f64 {
        self.placed_footprint().length
    }

    /// Returns the planar area.
    pub fn area(&self) -> f64 {
        self.footprint.area()
    }

    /// Returns the rectangle center.
    pub fn center(&self) -> Point2<f64> {
        Point2::new(self.x + self.width() / 2.0, self.y + self.length() / 2.0)
    }

    /// Returns the bounding box as `[min_x, min_y, max_x, max_y]`.
    pub fn aabb(&self) -> [f64; 4] {
        [self.x, self.y, self.x + self.width(), self.y + self.length()]
    }

    /// Checks whether this rectangle, grown by `gap` on its max sides,
    /// overlaps `other` grown the same way.
    ///
    /// With `gap` equal to the layout spacing this is the packer's
    /// non-overlap guarantee.
    pub fn overlaps(&self, other: &PlacedRect, gap: f64) -> bool {
        let a = self.aabb();
        let b = other.aabb();
        a[0] < b[2] + gap - GEOM_EPS
            && b[0] < a[2] + gap - GEOM_EPS
            && a[1] < b[3] + gap - GEOM_EPS
            && b[1] < a[3] + gap - GEOM_EPS
    }
}

/// The packed arrangement of a group of footprints.
///
/// `rects` preserves the order of the footprints passed to the packer, so
/// `rects[i]` belongs to product `i`.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Layout {
    /// One placed rectangle per input footprint.
    pub rects: Vec<PlacedRect>,
    /// Packed width (x extent), spacing excluded.
    pub width: f64,
    /// Packed length (y extent), spacing excluded.
    pub length: f64,
    /// `width * length`.
    pub area: f64,
    /// Required spacing between neighbouring rectangles.
    pub spacing: f64,
}

impl Layout {
    /// Creates a layout and derives its area.
    pub fn new(rects: Vec<PlacedRect>, width: f64, length: f64, spacing: f64) -> Self {
        Self {
            rects,
            width,
            length,
            area: width * length,
            spacing,
        }
    }

    /// Returns the zero-area layout produced for empty input.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Returns the number of placed rectangles.
    pub fn len(&self) -> usize {
        self.rects.len()
    }

    /// Returns true if nothing is placed.
    pub fn is_empty(&self) -> bool {
        self.rects.is_empty()
    }

    /// Sum of the individual footprint areas.
    pub fn used_area(&self) -> f64 {
        self.rects.iter().map(PlacedRect::area).sum()
    }

    /// Used area divided by bounding area (0 for an empty layout).
    pub fn fill_ratio(&self) -> f64 {
        if self.area <= GEOM_EPS {
            0.0
        } else {
            self.used_area() / self.area
        }
    }

    /// Center of the packed bounding box.
    pub fn center(&self) -> Point2<f64> {
        Point2::new(self.width / 2.0, self.length / 2.0)
    }

    /// Returns the layout mirrored about its bounding-box center.
    pub fn mirrored(&self) -> Self {
        let rects = self
            .rects
            .iter()
            .map(|r| {
                PlacedRect::new(
                    r.footprint,
                    self.width - r.x - r.width(),
                    self.length - r.y - r.length(),
                    r.rotated,
                )
            })
            .collect();
        Self::new(rects, self.width, self.length, self.spacing)
    }

    /// Strict validation: no overlap and a non-degenerate bounding box.
    pub fn validate(&self) -> Result<()> {
        if self.rects.is_empty() {
            return Ok(());
        }
        if self.area <= GEOM_EPS {
            return Err(Error::DegenerateGeometry(
                "layout has zero bounding area".into(),
            ));
        }
        for (i, a) in self.rects.iter().enumerate() {
            a.footprint.validate()?;
            for (j, b) in self.rects.iter().enumerate().skip(i + 1) {
                if a.overlaps(b, self.spacing) {
                    return Err(Error::invalid(format!(
                        "rectangles {} and {} overlap within spacing {}",
                        i, j, self.spacing
                    )));
                }
            }
        }
        Ok(())
    }
}
