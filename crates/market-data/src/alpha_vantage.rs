//! Alpha Vantage `TIME_SERIES_DAILY` client.
//!
//! One network call per fetch: no retry, rate limiting or caching.

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::{debug, info};
use types::{OhlcvRecord, sort_by_date};

use crate::{DailySeriesSource, FetchError};

/// Public query endpoint.
pub const DEFAULT_BASE_URL: &str = "https://www.alphavantage.co/query";

/// Key under which the daily series is returned.
const SERIES_KEY: &str = "Time Series (Daily)";

/// Keys the provider uses for diagnostics, in order of preference.
const DIAGNOSTIC_KEYS: [&str; 3] = ["Note", "Information", "Error Message"];

/// One day as returned by the provider (all values are strings).
#[derive(Debug, Deserialize)]
struct DailyBar {
    #[serde(rename = "1. open")]
    open: String,
    #[serde(rename = "2. high")]
    high: String,
    #[serde(rename = "3. low")]
    low: String,
    #[serde(rename = "4. close")]
    close: String,
    #[serde(rename = "5. volume")]
    volume: String,
}

/// Client for the daily series endpoint.
#[derive(Debug, Clone)]
pub struct AlphaVantageClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl AlphaVantageClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    /// Point the client at another endpoint (e.g., a local stub).
    pub fn with_base_url(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch the full daily history for `symbol`, oldest first.
    pub async fn fetch_daily_series(&self, symbol: &str) -> Result<Vec<OhlcvRecord>, FetchError> {
        info!("Fetching data for {}...", symbol);
        let body: Value = self
            .client
            .get(&self.base_url)
            .query(&[
                ("function", "TIME_SERIES_DAILY"),
                ("symbol", symbol),
                ("outputsize", "full"),
                ("apikey", self.api_key.as_str()),
            ])
            .send()
            .await?
            .json()
            .await?;

        let records = parse_daily_series(symbol, &body)?;
        info!(records = records.len(), "Data for {} fetched successfully.", symbol);
        Ok(records)
    }
}

#[async_trait]
impl DailySeriesSource for AlphaVantageClient {
    async fn fetch_daily(&self, symbol: &str) -> Result<Vec<OhlcvRecord>, FetchError> {
        self.fetch_daily_series(symbol).await
    }
}

/// Convert a provider response into date-ordered records.
///
/// A response without the series key becomes [`FetchError::Provider`]
/// carrying whatever diagnostic text the provider sent.
pub fn parse_daily_series(symbol: &str, body: &Value) -> Result<Vec<OhlcvRecord>, FetchError> {
    let Some(series) = body.get(SERIES_KEY) else {
        let message = DIAGNOSTIC_KEYS
            .iter()
            .find_map(|k| body.get(*k).and_then(Value::as_str))
            .unwrap_or("Unknown error")
            .to_string();
        return Err(FetchError::Provider {
            symbol: symbol.to_string(),
            message,
        });
    };

    let parse_err = |message: String| FetchError::Parse {
        symbol: symbol.to_string(),
        message,
    };

    let bars: BTreeMap<String, DailyBar> =
        serde_json::from_value(series.clone()).map_err(|e| parse_err(e.to_string()))?;

    let mut records = Vec::with_capacity(bars.len());
    for (date, bar) in bars {
        let date = NaiveDate::parse_from_str(&date, "%Y-%m-%d")
            .map_err(|e| parse_err(format!("bad date '{date}': {e}")))?;
        let num = |field: &str, raw: &str| {
            raw.trim()
                .parse::<f64>()
                .map_err(|e| parse_err(format!("bad {field} '{raw}' on {date}: {e}")))
        };
        records.push(OhlcvRecord {
            date,
            open: num("open", &bar.open)?,
            high: num("high", &bar.high)?,
            low: num("low", &bar.low)?,
            close: num("close", &bar.close)?,
            volume: num("volume", &bar.volume)? as u64,
        });
    }

    sort_by_date(&mut records);
    debug!(symbol, records = records.len(), "parsed daily series");
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn bar(open: &str, close: &str) -> Value {
        json!({
            "1. open": open,
            "2. high": "200.0",
            "3. low": "100.0",
            "4. close": close,
            "5. volume": "12345"
        })
    }

    #[test]
    fn test_parse_sorts_ascending() {
        let body = json!({
            "Meta Data": {},
            "Time Series (Daily)": {
                "2024-01-03": bar("3.0", "3.5"),
                "2024-01-02": bar("2.0", "2.5"),
                "2023-12-29": bar("1.0", "1.5"),
            }
        });
        let records = parse_daily_series("AAPL", &body).unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].date, NaiveDate::from_ymd_opt(2023, 12, 29).unwrap());
        assert_eq!(records[2].open, 3.0);
        assert_eq!(records[2].close, 3.5);
        assert_eq!(records[1].volume, 12345);
    }

    #[test]
    fn test_missing_series_uses_note() {
        let body = json!({ "Note": "API call frequency exceeded" });
        let err = parse_daily_series("MSFT", &body).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Error fetching data for MSFT: API call frequency exceeded"
        );
    }

    #[test]
    fn test_missing_series_falls_back() {
        let body = json!({ "Error Message": "Invalid API call" });
        assert!(
            parse_daily_series("X", &body)
                .unwrap_err()
                .to_string()
                .ends_with("Invalid API call")
        );

        let err = parse_daily_series("X", &json!({})).unwrap_err();
        assert!(matches!(err, FetchError::Provider { ref message, .. } if message == "Unknown error"));
    }

    #[test]
    fn test_bad_number_is_parse_error() {
        let body = json!({ "Time Series (Daily)": { "2024-01-02": bar("abc", "1.0") } });
        assert!(matches!(
            parse_daily_series("X", &body),
            Err(FetchError::Parse { .. })
        ));
    }
}
