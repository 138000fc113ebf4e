//! Composite balance scorer.

use crate::config::BalanceConfig;
use crate::distribution::{distribution_report, DistributionReport};
use crate::flow::{flow_report, FlowReport};
use crate::geometry::{geometry_report, GeometryReport};
use crate::symmetry3d::{cad_mass_points, mirror_symmetry_3d, MirrorSymmetry3D};
use nalgebra::Point2;
use u_molding_core::stats::clamp_score;
use u_molding_core::{validate_products, Error, Layout, Product, Result};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Composite balance score of one layout.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BalanceScore {
    /// Weighted total (0-100).
    pub total: f64,
    /// Geometry sub-score (0-100).
    pub geometry: f64,
    /// Flow sub-score (0-100).
    pub flow: f64,
    /// Distribution sub-score (0-100).
    pub distribution: f64,
    /// Fraction of products with complete CAD data (0-1).
    pub confidence: f64,
}

/// Full diagnostic breakdown of a score.
#[derive(Debug, Clone, PartialEq)]
pub struct BalanceReport {
    /// The composite score.
    pub score: BalanceScore,
    /// Geometry breakdown.
    pub geometry: GeometryReport,
    /// Flow breakdown.
    pub flow: FlowReport,
    /// Distribution breakdown.
    pub distribution: DistributionReport,
    /// 3D mirror-plane symmetry, when enabled and CAD data is present.
    pub cad_symmetry: Option<MirrorSymmetry3D>,
}

/// Scores layouts for manufacturing balance.
///
/// The scorer holds only its configuration; every call is independent.
#[derive(Debug, Clone, Default)]
pub struct BalanceScorer {
    config: BalanceConfig,
}

impl BalanceScorer {
    /// Creates a scorer with the given configuration.
    pub fn new(config: BalanceConfig) -> Self {
        Self { config }
    }

    /// Creates a scorer with default configuration.
    pub fn default_config() -> Self {
        Self::new(BalanceConfig::default())
    }

    /// Returns the configuration.
    pub fn config(&self) -> &BalanceConfig {
        &self.config
    }

    /// Scores `layout`, where `layout.rects[i]` belongs to `products[i]`.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidInput`] if the counts differ or a product is malformed.
    pub fn score(
        &self,
        layout: &Layout,
        products: &[Product],
        injection: Point2<f64>,
    ) -> Result<BalanceScore> {
        self.report(layout, products, injection).map(|r| r.score)
    }

    /// Scores `layout` and returns every intermediate result.
    pub fn report(
        &self,
        layout: &Layout,
        products: &[Product],
        injection: Point2<f64>,
    ) -> Result<BalanceReport> {
        if layout.len() != products.len() {
            return Err(Error::invalid(format!(
                "layout has {} rectangles but {} products were given",
                layout.len(),
                products.len()
            )));
        }
        validate_products(products)?;

        let geometry = geometry_report(layout, products, &self.config.geometry);
        let flow = flow_report(layout, products, injection, &self.config.flow);
        let distribution = distribution_report(layout, products, &self.config.distribution);

        let w = &self.config.weights;
        let total = clamp_score(
            w.geometry * geometry.score + w.flow * flow.score + w.distribution * distribution.score,
        );

        let confidence = if products.is_empty() {
            0.0
        } else {
            products.iter().filter(|p| p.has_complete_cad()).count() as f64
                / products.len() as f64
        };

        let cad_symmetry = if self.config.analyze_cad_symmetry
            && products.iter().any(|p| p.cad.is_some())
        {
            Some(mirror_symmetry_3d(&cad_mass_points(layout, products)?))
        } else {
            None
        };

        let score = BalanceScore {
            total,
            geometry: geometry.score,
            flow: flow.score,
            distribution: distribution.score,
            confidence,
        };
        log::debug!(
            "balance: total {:.2} (geometry {:.2}, flow {:.2}, distribution {:.2}), confidence {:.2}",
            score.total,
            score.geometry,
            score.flow,
            score.distribution,
            score.confidence
        );

        Ok(BalanceReport {
            score,
            geometry,
            flow,
            distribution,
            cad_symmetry,
        })
    }
}
