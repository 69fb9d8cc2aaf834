//! Market data access and tabular file formats.
//!
//! # Modules
//!
//! - [`alpha_vantage`]: HTTP client for the daily time-series endpoint
//! - [`api_key`]: Loading the provider API key from a JSON file
//! - [`csv_io`]: Feature-table CSV files and scaler sidecar files
//! - [`table`]: Loosely typed CSV tables (uploads) with JSON record output

pub mod alpha_vantage;
pub mod api_key;
pub mod csv_io;
pub mod table;

pub use alpha_vantage::{AlphaVantageClient, DEFAULT_BASE_URL, parse_daily_series};
pub use api_key::{ApiKeyError, load_api_key};
pub use csv_io::{
    CsvError, csv_path_for, load_feature_csv, read_feature_csv, read_scaler, save_feature_csv,
    scaler_path_for, write_feature_csv, write_scaler,
};
pub use table::{RecordTable, TableError};

use async_trait::async_trait;
use thiserror::Error;
use types::OhlcvRecord;

/// Errors raised while fetching a daily series.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The response lacked the expected series key.
    #[error("Error fetching data for {symbol}: {message}")]
    Provider { symbol: String, message: String },

    #[error("failed to parse response for {symbol}: {message}")]
    Parse { symbol: String, message: String },
}

/// Anything that can produce a date-ordered daily OHLCV series for a ticker.
#[async_trait]
pub trait DailySeriesSource: Send + Sync {
    async fn fetch_daily(&self, symbol: &str) -> Result<Vec<OhlcvRecord>, FetchError>;
}
