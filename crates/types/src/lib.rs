//! Core types shared across the quantum stock workspace.
//!
//! This crate holds the data model every other crate speaks: raw daily
//! OHLCV records as fetched, engineered feature rows, and the min-max
//! bounds that travel with a trained model.
//!
//! # Modules
//!
//! - [`market_data`]: OHLCV records and date-ordered series
//! - [`features`]: Feature columns and feature rows
//! - [`scaling`]: Persistable min-max bounds per column

pub mod features;
pub mod market_data;
pub mod scaling;

pub use features::{FEATURE_COUNT, FeatureColumn, FeatureRow, TARGET_COLUMN};
pub use market_data::{OhlcvRecord, sort_by_date};
pub use scaling::{BoundsError, ColumnBounds, ScalerBounds};

/// Ticker symbol (e.g., "AAPL").
pub type Symbol = String;
