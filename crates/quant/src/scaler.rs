//! Per-column min-max scaling.
//!
//! A scaler is fitted on one batch and can be persisted as
//! [`ScalerBounds`], so inference reuses training-time statistics instead
//! of refitting on whatever batch it is given.

use types::{ColumnBounds, FeatureColumn, FeatureRow, ScalerBounds, TARGET_COLUMN};

use crate::PipelineError;

/// Rescales every feature column to `[0, 1]`.
///
/// Constant columns (zero range) map to `0.0`.
#[derive(Debug, Clone, PartialEq)]
pub struct MinMaxScaler {
    bounds: ScalerBounds,
}

impl MinMaxScaler {
    /// Fit bounds on the observed min/max of each column.
    pub fn fit(rows: &[FeatureRow]) -> Result<Self, PipelineError> {
        if rows.is_empty() {
            return Err(PipelineError::EmptyBatch);
        }

        let columns = FeatureColumn::ALL
            .iter()
            .map(|&column| {
                let (min, max) = rows.iter().map(|r| r.get(column)).fold(
                    (f64::INFINITY, f64::NEG_INFINITY),
                    |(lo, hi), v| (lo.min(v), hi.max(v)),
                );
                ColumnBounds { column, min, max }
            })
            .collect();

        Ok(Self {
            bounds: ScalerBounds { columns },
        })
    }

    /// Rebuild a scaler from persisted bounds.
    pub fn from_bounds(bounds: ScalerBounds) -> Result<Self, PipelineError> {
        bounds.validate()?;
        Ok(Self { bounds })
    }

    /// Scale rows in place.
    ///
    /// Values outside the fitted range land outside `[0, 1]`.
    pub fn transform(&self, rows: &mut [FeatureRow]) {
        for bounds in &self.bounds.columns {
            for row in rows.iter_mut() {
                row.set(bounds.column, bounds.scale(row.get(bounds.column)));
            }
        }
    }

    /// Map a scaled target value back to price units.
    pub fn unscale_target(&self, value: f64) -> Option<f64> {
        self.bounds.get(TARGET_COLUMN).map(|b| b.unscale(value))
    }

    pub fn bounds(&self) -> &ScalerBounds {
        &self.bounds
    }

    pub fn into_bounds(self) -> ScalerBounds {
        self.bounds
    }
}
