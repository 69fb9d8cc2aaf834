//! Min-max bounds that can be persisted next to a trained model.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::features::FeatureColumn;

/// Errors raised when bounds are incomplete or inconsistent.
#[derive(Debug, Error, PartialEq)]
pub enum BoundsError {
    #[error("scaler bounds missing column '{0}'")]
    MissingColumn(FeatureColumn),

    #[error("scaler bounds for '{column}' are invalid: min {min} > max {max}")]
    Inverted {
        column: FeatureColumn,
        min: f64,
        max: f64,
    },
}

/// Observed range of a single column.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColumnBounds {
    pub column: FeatureColumn,
    pub min: f64,
    pub max: f64,
}

impl ColumnBounds {
    /// Width of the observed range.
    #[inline]
    pub fn range(&self) -> f64 {
        self.max - self.min
    }

    /// Map a raw value into `[0, 1]` relative to these bounds.
    ///
    /// A constant column (zero range) maps every value to `0.0`.
    pub fn scale(&self, value: f64) -> f64 {
        let range = self.range();
        if range == 0.0 {
            0.0
        } else {
            (value - self.min) / range
        }
    }

    /// Map a scaled value back to raw units.
    pub fn unscale(&self, value: f64) -> f64 {
        value * self.range() + self.min
    }
}

/// Bounds for every feature column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScalerBounds {
    pub columns: Vec<ColumnBounds>,
}

impl ScalerBounds {
    /// Bounds for one column, if recorded.
    pub fn get(&self, column: FeatureColumn) -> Option<&ColumnBounds> {
        self.columns.iter().find(|b| b.column == column)
    }

    /// Check that every feature column is present with `min <= max`.
    pub fn validate(&self) -> Result<(), BoundsError> {
        for column in FeatureColumn::ALL {
            let bounds = self.get(column).ok_or(BoundsError::MissingColumn(column))?;
            if bounds.min > bounds.max {
                return Err(BoundsError::Inverted {
                    column,
                    min: bounds.min,
                    max: bounds.max,
                });
            }
        }
        Ok(())
    }
}
