//! Feature pipeline for daily stock data.
//!
//! Turns raw OHLCV records into model-ready feature rows and prepares
//! the training sample.
//!
//! # Modules
//!
//! - [`rolling`] - Ring-buffer trailing mean for moving averages
//! - [`pipeline`] - Cleaning and feature derivation (`preprocess`)
//! - [`scaler`] - Per-column min-max scaling
//! - [`dataset`] - Shuffled sample and train/test split
//!
//! # Example
//!
//! ```
//! use quant::preprocess;
//!
//! // Fewer than 31 records leaves nothing after the 30-day window.
//! let out = preprocess(&[], true).unwrap();
//! assert!(out.rows.is_empty());
//! ```

pub mod dataset;
pub mod pipeline;
pub mod rolling;
pub mod scaler;

pub use dataset::{DatasetSplit, SplitConfig, prepare_data};
pub use pipeline::{
    LONG_WINDOW, Preprocessed, SHORT_WINDOW, engineer_features, preprocess,
};
pub use rolling::TrailingMean;
pub use scaler::MinMaxScaler;

use thiserror::Error;

/// Errors raised by the feature pipeline.
#[derive(Debug, Error, PartialEq)]
pub enum PipelineError {
    #[error("cannot fit a scaler on an empty batch")]
    EmptyBatch,

    #[error("invalid scaler bounds: {0}")]
    Bounds(#[from] types::BoundsError),

    #[error("need at least {needed} rows to split, got {got}")]
    NotEnoughRows { needed: usize, got: usize },

    #[error("test fraction must be in (0, 1), got {0}")]
    InvalidTestFraction(f64),
}
