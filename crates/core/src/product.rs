//! Product description consumed by the packer, scorer and partition search.

use crate::geometry::Footprint;
use crate::{Error, Result};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Unique identifier for a product.
pub type ProductId = String;

/// Bounding dimensions of a product.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Dimensions {
    /// Extent along y.
    pub length: f64,
    /// Extent along x.
    pub width: f64,
    /// Extent along z.
    pub height: f64,
}

impl Dimensions {
    /// Creates new dimensions.
    pub fn new(length: f64, width: f64, height: f64) -> Self {
        Self {
            length,
            width,
            height,
        }
    }

    /// Volume of the bounding box.
    pub fn box_volume(&self) -> f64 {
        self.length * self.width * self.height
    }

    /// Surface area of the bounding box.
    pub fn box_surface_area(&self) -> f64 {
        2.0 * (self.length * self.width + self.length * self.height + self.width * self.height)
    }
}

/// Attributes extracted from a CAD model of the product.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CadData {
    /// Solid volume.
    pub volume: f64,
    /// Surface area.
    pub surface_area: f64,
    /// Center of the model bounding box (x, y, z).
    pub bbox_center: [f64; 3],
    /// Model bounding box dimensions (x, y, z).
    pub bbox_dimensions: [f64; 3],
    /// Center of mass (x, y, z), if the mesh analysis produced one.
    pub center_of_mass: Option<[f64; 3]>,
}

impl CadData {
    /// Creates CAD data with volume and surface area only.
    pub fn new(volume: f64, surface_area: f64) -> Self {
        Self {
            volume,
            surface_area,
            ..Default::default()
        }
    }

    /// Sets the bounding box.
    pub fn with_bbox(mut self, center: [f64; 3], dimensions: [f64; 3]) -> Self {
        self.bbox_center = center;
        self.bbox_dimensions = dimensions;
        self
    }

    /// Sets the center of mass.
    pub fn with_center_of_mass(mut self, com: [f64; 3]) -> Self {
        self.center_of_mass = Some(com);
        self
    }

    /// Returns true if all attributes needed for confident scoring are present.
    pub fn is_complete(&self) -> bool {
        self.volume > 0.0
            && self.surface_area > 0.0
            && self.bbox_dimensions.iter().all(|d| *d > 0.0)
            && self.center_of_mass.is_some()
    }

    /// Offset of the center of mass from the bounding-box center.
    pub fn com_offset(&self) -> [f64; 3] {
        match self.center_of_mass {
            Some(com) => [
                com[0] - self.bbox_center[0],
                com[1] - self.bbox_center[1],
                com[2] - self.bbox_center[2],
            ],
            None => [0.0; 3],
        }
    }
}

/// A product to be molded.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Product {
    /// Unique identifier.
    pub id: ProductId,
    /// Display name.
    pub name: String,
    /// Bounding dimensions.
    pub dimensions: Dimensions,
    /// Part weight, if known.
    pub weight: Option<f64>,
    /// Material density, used to derive weight from volume.
    pub density: Option<f64>,
    /// Material name.
    pub material: String,
    /// Color name.
    pub color: String,
    /// Number of parts ordered.
    pub quantity: u32,
    /// Optional CAD attributes.
    pub cad: Option<CadData>,
    /// Manually supplied flow length overriding the computed one.
    pub flow_length: Option<f64>,
}

impl Product {
    /// Creates a product with the given id and dimensions.
    pub fn new(id: impl Into<String>, length: f64, width: f64, height: f64) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            dimensions: Dimensions::new(length, width, height),
            weight: None,
            density: None,
            material: String::new(),
            color: String::new(),
            quantity: 1,
            cad: None,
            flow_length: None,
        }
    }

    /// Sets the display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the weight.
    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = Some(weight);
        self
    }

    /// Sets the material density.
    pub fn with_density(mut self, density: f64) -> Self {
        self.density = Some(density);
        self
    }

    /// Sets the material.
    pub fn with_material(mut self, material: impl Into<String>) -> Self {
        self.material = material.into();
        self
    }

    /// Sets the color.
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }

    /// Sets the quantity (at least 1).
    pub fn with_quantity(mut self, quantity: u32) -> Self {
        self.quantity = quantity.max(1);
        self
    }

    /// Attaches CAD data.
    pub fn with_cad(mut self, cad: CadData) -> Self {
        self.cad = Some(cad);
        self
    }

    /// Sets a manual flow length.
    pub fn with_flow_length(mut self, flow_length: f64) -> Self {
        self.flow_length = Some(flow_length);
        self
    }

    /// Planar footprint (width along x, length along y).
    pub fn footprint(&self) -> Footprint {
        Footprint::new(self.dimensions.width, self.dimensions.length)
    }

    /// Volume: CAD volume when available, bounding-box volume otherwise.
    pub fn volume(&self) -> f64 {
        match &self.cad {
            Some(cad) if cad.volume > 0.0 => cad.volume,
            _ => self.dimensions.box_volume(),
        }
    }

    /// Surface area: CAD value when available, bounding-box surface otherwise.
    pub fn surface_area(&self) -> f64 {
        match &self.cad {
            Some(cad) if cad.surface_area > 0.0 => cad.surface_area,
            _ => self.dimensions.box_surface_area(),
        }
    }

    /// Weight, falling back to `volume * density` when only density is known.
    pub fn effective_weight(&self) -> Option<f64> {
        match (self.weight, self.density) {
            (Some(w), _) => Some(w),
            (None, Some(d)) => Some(self.volume() * d),
            (None, None) => None,
        }
    }

    /// Density, falling back to `weight / volume` when only weight is known.
    pub fn effective_density(&self) -> Option<f64> {
        match (self.density, self.weight) {
            (Some(d), _) => Some(d),
            (None, Some(w)) => {
                let v = self.volume();
                (v > 0.0).then(|| w / v)
            }
            (None, None) => None,
        }
    }

    /// Mass used for physical scoring: effective weight, or 1 when unknown.
    pub fn scoring_mass(&self) -> f64 {
        match self.effective_weight() {
            Some(w) if w > 0.0 => w,
            _ => 1.0,
        }
    }

    /// Returns true if complete CAD attributes are attached.
    pub fn has_complete_cad(&self) -> bool {
        self.cad.as_ref().is_some_and(CadData::is_complete)
    }

    /// Validates dimensions and weight.
    pub fn validate(&self) -> Result<()> {
        let d = &self.dimensions;
        if !(d.length.is_finite() && d.width.is_finite() && d.height.is_finite()) {
            return Err(Error::invalid(format!(
                "product {} has non-finite dimensions",
                self.id
            )));
        }
        if d.length <= 0.0 || d.width <= 0.0 || d.height < 0.0 {
            return Err(Error::invalid(format!(
                "product {} has invalid dimensions {}x{}x{}",
                self.id, d.length, d.width, d.height
            )));
        }
        if let Some(w) = self.weight {
            if !w.is_finite() || w < 0.0 {
                return Err(Error::invalid(format!(
                    "product {} has negative weight {}",
                    self.id, w
                )));
            }
        }
        if let Some(density) = self.density {
            if !density.is_finite() || density < 0.0 {
                return Err(Error::invalid(format!(
                    "product {} has negative density {}",
                    self.id, density
                )));
            }
        }
        Ok(())
    }
}

/// Validates every product in a slice.
pub fn validate_products(products: &[Product]) -> Result<()> {
    products.iter().try_for_each(Product::validate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_footprint_axes() {
        let p = Product::new("P1", 100.0, 50.0, 20.0);
        let f = p.footprint();
        assert_relative_eq!(f.width, 50.0);
        assert_relative_eq!(f.length, 100.0);
    }

    #[test]
    fn test_weight_from_density() {
        let p = Product::new("P1", 10.0, 10.0, 10.0).with_density(0.002);
        assert_relative_eq!(p.effective_weight().unwrap_or(0.0), 2.0);

        let p = Product::new("P2", 10.0, 10.0, 10.0).with_weight(5.0);
        assert_relative_eq!(p.effective_density().unwrap_or(0.0), 0.005);
        assert_relative_eq!(p.scoring_mass(), 5.0);

        let p = Product::new("P3", 10.0, 10.0, 10.0);
        assert!(p.effective_weight().is_none());
        assert_relative_eq!(p.scoring_mass(), 1.0);
    }

    #[test]
    fn test_cad_overrides_box_values() {
        let p = Product::new("P1", 10.0, 10.0, 10.0).with_cad(CadData::new(400.0, 350.0));
        assert_relative_eq!(p.volume(), 400.0);
        assert_relative_eq!(p.surface_area(), 350.0);
        assert!(!p.has_complete_cad());

        let cad = CadData::new(400.0, 350.0)
            .with_bbox([5.0, 5.0, 5.0], [10.0, 10.0, 10.0])
            .with_center_of_mass([5.0, 6.0, 4.0]);
        assert_eq!(cad.com_offset(), [0.0, 1.0, -1.0]);
        let p = p.with_cad(cad);
        assert!(p.has_complete_cad());
    }

    #[test]
    fn test_validate_rejects_negative_weight() {
        let p = Product::new("P1", 10.0, 10.0, 10.0).with_weight(-1.0);
        assert!(p.validate().is_err());
        let p = Product::new("P1", 0.0, 10.0, 10.0);
        assert!(p.validate().is_err());
        let p = Product::new("P1", 10.0, 10.0, 10.0).with_weight(0.0);
        assert!(p.validate().is_ok());
    }
}
