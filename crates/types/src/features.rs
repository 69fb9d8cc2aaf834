//! Engineered feature rows and the fixed feature column order.
//!
//! The model consumes exactly [`FEATURE_COUNT`] values per row, in the order
//! given by [`FeatureColumn::ALL`]. The column names are also the CSV headers
//! and the JSON record keys, so they must stay stable.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of model input features.
pub const FEATURE_COUNT: usize = 8;

/// Column the model learns to predict.
pub const TARGET_COLUMN: FeatureColumn = FeatureColumn::Close;

/// A numeric column of a feature row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FeatureColumn {
    #[serde(rename = "open")]
    Open,
    #[serde(rename = "high")]
    High,
    #[serde(rename = "low")]
    Low,
    #[serde(rename = "close")]
    Close,
    #[serde(rename = "volume")]
    Volume,
    #[serde(rename = "daily_return")]
    DailyReturn,
    #[serde(rename = "5_day_moving_avg")]
    MovingAvg5,
    #[serde(rename = "30_day_moving_avg")]
    MovingAvg30,
}

impl FeatureColumn {
    /// All feature columns in model input order.
    pub const ALL: [FeatureColumn; FEATURE_COUNT] = [
        FeatureColumn::Open,
        FeatureColumn::High,
        FeatureColumn::Low,
        FeatureColumn::Close,
        FeatureColumn::Volume,
        FeatureColumn::DailyReturn,
        FeatureColumn::MovingAvg5,
        FeatureColumn::MovingAvg30,
    ];

    /// Column header as it appears in CSV files and JSON records.
    pub fn name(self) -> &'static str {
        match self {
            FeatureColumn::Open => "open",
            FeatureColumn::High => "high",
            FeatureColumn::Low => "low",
            FeatureColumn::Close => "close",
            FeatureColumn::Volume => "volume",
            FeatureColumn::DailyReturn => "daily_return",
            FeatureColumn::MovingAvg5 => "5_day_moving_avg",
            FeatureColumn::MovingAvg30 => "30_day_moving_avg",
        }
    }

    /// Position in the model input vector.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Look up a column by header name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.name() == name)
    }
}

impl fmt::Display for FeatureColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// =============================================================================
// Feature Row
// =============================================================================

/// An OHLCV record extended with derived features.
///
/// Values are raw until the pipeline rescales them, after which every
/// column lies in `[0, 1]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureRow {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    pub daily_return: f64,
    #[serde(rename = "5_day_moving_avg")]
    pub moving_avg_5: f64,
    #[serde(rename = "30_day_moving_avg")]
    pub moving_avg_30: f64,
}

impl FeatureRow {
    /// Read a column value.
    pub fn get(&self, column: FeatureColumn) -> f64 {
        match column {
            FeatureColumn::Open => self.open,
            FeatureColumn::High => self.high,
            FeatureColumn::Low => self.low,
            FeatureColumn::Close => self.close,
            FeatureColumn::Volume => self.volume,
            FeatureColumn::DailyReturn => self.daily_return,
            FeatureColumn::MovingAvg5 => self.moving_avg_5,
            FeatureColumn::MovingAvg30 => self.moving_avg_30,
        }
    }

    /// Overwrite a column value.
    pub fn set(&mut self, column: FeatureColumn, value: f64) {
        let slot = match column {
            FeatureColumn::Open => &mut self.open,
            FeatureColumn::High => &mut self.high,
            FeatureColumn::Low => &mut self.low,
            FeatureColumn::Close => &mut self.close,
            FeatureColumn::Volume => &mut self.volume,
            FeatureColumn::DailyReturn => &mut self.daily_return,
            FeatureColumn::MovingAvg5 => &mut self.moving_avg_5,
            FeatureColumn::MovingAvg30 => &mut self.moving_avg_30,
        };
        *slot = value;
    }

    /// Model input vector in [`FeatureColumn::ALL`] order.
    pub fn to_features(&self) -> [f64; FEATURE_COUNT] {
        FeatureColumn::ALL.map(|c| self.get(c))
    }

    /// Value of the prediction target.
    #[inline]
    pub fn target(&self) -> f64 {
        self.get(TARGET_COLUMN)
    }
}
