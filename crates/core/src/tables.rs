//! Monotonic step lookup tables.
//!
//! Every table maps a key to the value of the first threshold that is greater
//! than or equal to the key. What happens beyond the largest threshold is
//! decided per table by [`Overflow`]: spacing lookups fail, all other tables
//! fall back to a default.

use crate::{Error, Result};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Behaviour for keys larger than the last threshold.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Overflow {
    /// Out-of-range keys are an [`Error::InvalidInput`].
    Error,
    /// Out-of-range keys map to this value.
    Default(f64),
}

/// A sorted list of `(threshold, value)` steps.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct StepTable {
    name: String,
    steps: Vec<(f64, f64)>,
    overflow: Overflow,
}

impl StepTable {
    /// Creates a table, sorting the steps by threshold.
    ///
    /// Fails if the table is empty, contains non-finite entries or repeats a
    /// threshold.
    pub fn new(
        name: impl Into<String>,
        mut steps: Vec<(f64, f64)>,
        overflow: Overflow,
    ) -> Result<Self> {
        let name = name.into();
        if steps.is_empty() {
            return Err(Error::Config(format!("lookup table '{}' is empty", name)));
        }
        if steps.iter().any(|(t, v)| !t.is_finite() || !v.is_finite()) {
            return Err(Error::Config(format!(
                "lookup table '{}' has non-finite entries",
                name
            )));
        }
        steps.sort_by(|a, b| a.0.total_cmp(&b.0));
        if steps.windows(2).any(|w| w[0].0 == w[1].0) {
            return Err(Error::Config(format!(
                "lookup table '{}' repeats a threshold",
                name
            )));
        }
        Ok(Self {
            name,
            steps,
            overflow,
        })
    }

    /// Looks up the value for `key`.
    pub fn lookup(&self, key: f64) -> Result<f64> {
        if let Some((_, value)) = self.steps.iter().find(|(t, _)| key <= *t) {
            return Ok(*value);
        }
        match self.overflow {
            Overflow::Default(value) => Ok(value),
            Overflow::Error => Err(Error::invalid(format!(
                "{} lookup key {} exceeds the maximum supported value {}",
                self.name,
                key,
                self.max_threshold()
            ))),
        }
    }

    /// Looks up `key`, returning the overflow default (or 0) instead of an error.
    pub fn lookup_or_zero(&self, key: f64) -> f64 {
        self.lookup(key).unwrap_or(0.0)
    }

    /// Largest threshold in the table.
    pub fn max_threshold(&self) -> f64 {
        self.steps.last().map(|(t, _)| *t).unwrap_or(0.0)
    }

    /// Table name used in error messages.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The sorted steps.
    pub fn steps(&self) -> &[(f64, f64)] {
        &self.steps
    }

    // Built-in tables are constant data; construction cannot fail.
    fn builtin(name: &str, steps: &[(f64, f64)], overflow: Overflow) -> Self {
        Self {
            name: name.to_string(),
            steps: steps.to_vec(),
            overflow,
        }
    }
}

/// The five lookup tables the packer and partition search consume.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LookupTables {
    /// Inter-item spacing keyed by the largest footprint dimension.
    pub spacing: StepTable,
    /// Border space keyed by packed width or length.
    pub border_margin: StepTable,
    /// Extra bottom thickness keyed by the tallest product.
    pub height_bracket: StepTable,
    /// Allowed weight difference keyed by the heaviest item.
    pub weight_difference: StepTable,
    /// Allowed heaviest/lightest ratio keyed by the average weight.
    pub weight_ratio: StepTable,
}

impl Default for LookupTables {
    fn default() -> Self {
        Self {
            spacing: StepTable::builtin(
                "spacing",
                &[
                    (200.0, 30.0),
                    (300.0, 35.0),
                    (400.0, 40.0),
                    (500.0, 45.0),
                    (600.0, 50.0),
                    (700.0, 55.0),
                    (800.0, 60.0),
                    (900.0, 65.0),
                    (1000.0, 70.0),
                ],
                Overflow::Error,
            ),
            border_margin: StepTable::builtin(
                "border margin",
                &[
                    (100.0, 60.0),
                    (200.0, 70.0),
                    (300.0, 80.0),
                    (400.0, 90.0),
                    (500.0, 100.0),
                    (700.0, 120.0),
                    (1000.0, 150.0),
                ],
                Overflow::Default(180.0),
            ),
            height_bracket: StepTable::builtin(
                "height bracket",
                &[
                    (50.0, 40.0),
                    (100.0, 60.0),
                    (150.0, 80.0),
                    (200.0, 100.0),
                    (300.0, 130.0),
                ],
                Overflow::Default(160.0),
            ),
            weight_difference: StepTable::builtin(
                "weight difference",
                &[
                    (50.0, 20.0),
                    (100.0, 35.0),
                    (300.0, 80.0),
                    (500.0, 120.0),
                    (1000.0, 200.0),
                    (3000.0, 400.0),
                ],
                Overflow::Default(0.0),
            ),
            weight_ratio: StepTable::builtin(
                "weight ratio",
                &[(100.0, 5.0), (300.0, 3.0), (1000.0, 2.0), (3000.0, 1.5)],
                Overflow::Default(1.2),
            ),
        }
    }
}

impl LookupTables {
    /// Creates the default table set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the spacing table.
    pub fn with_spacing(mut self, table: StepTable) -> Self {
        self.spacing = table;
        self
    }

    /// Replaces the border margin table.
    pub fn with_border_margin(mut self, table: StepTable) -> Self {
        self.border_margin = table;
        self
    }

    /// Replaces the height bracket table.
    pub fn with_height_bracket(mut self, table: StepTable) -> Self {
        self.height_bracket = table;
        self
    }

    /// Replaces the weight difference table.
    pub fn with_weight_difference(mut self, table: StepTable) -> Self {
        self.weight_difference = table;
        self
    }

    /// Replaces the weight ratio table.
    pub fn with_weight_ratio(mut self, table: StepTable) -> Self {
        self.weight_ratio = table;
        self
    }

    /// Spacing required for a layout whose largest footprint dimension is `max_dimension`.
    pub fn spacing_for(&self, max_dimension: f64) -> Result<f64> {
        self.spacing.lookup(max_dimension)
    }
}
