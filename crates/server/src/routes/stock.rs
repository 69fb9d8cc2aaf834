//! Provider-backed endpoints: fetch a ticker, derive features, and return
//! the table or a chart of it.

use axum::Json;
use axum::extract::{Query, State};
use axum::response::Response;
use market_data::RecordTable;
use quant::{engineer_features, preprocess};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::info;
use types::{FeatureRow, OhlcvRecord};

use super::{blocking, png_response};
use crate::chart::{Series, render_line_chart};
use crate::error::{AppError, AppResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct TickerQuery {
    pub ticker: Option<String>,
}

impl TickerQuery {
    fn require(self) -> AppResult<String> {
        self.ticker
            .map(|t| t.trim().to_uppercase())
            .filter(|t| !t.is_empty())
            .ok_or_else(|| AppError::BadRequest("Ticker symbol is required.".into()))
    }
}

/// Fetch and preprocess with bounds fitted on this batch.
async fn fetch_scaled(state: &AppState, ticker: &str) -> AppResult<Vec<FeatureRow>> {
    let records = state.source.fetch_daily(ticker).await?;
    let out = preprocess(&records, true)?;
    info!(ticker, rows = out.rows.len(), "Data preprocessing complete.");
    Ok(out.rows)
}

/// `GET /fetch_stock?ticker=`
pub async fn fetch_stock(
    State(state): State<Arc<AppState>>,
    Query(query): Query<TickerQuery>,
) -> AppResult<Json<Value>> {
    let ticker = query.require()?;
    let rows = fetch_scaled(&state, &ticker).await?;
    Ok(Json(Value::Array(
        RecordTable::from_feature_rows(&rows).to_records(),
    )))
}

/// `GET /fetch_stock_image?ticker=`: scaled close with both moving averages.
pub async fn fetch_stock_image(
    State(state): State<Arc<AppState>>,
    Query(query): Query<TickerQuery>,
) -> AppResult<Response> {
    let ticker = query.require()?;
    let rows = fetch_scaled(&state, &ticker).await?;

    let png = blocking(move || {
        let close: Vec<f64> = rows.iter().map(|r| r.close).collect();
        let ma5: Vec<f64> = rows.iter().map(|r| r.moving_avg_5).collect();
        let ma30: Vec<f64> = rows.iter().map(|r| r.moving_avg_30).collect();

        Ok(render_line_chart(
            &format!("{ticker} Close and Moving Averages"),
            "Trading day",
            "Scaled value",
            &[
                Series::new("close", &close),
                Series::new("5_day_moving_avg", &ma5),
                Series::new("30_day_moving_avg", &ma30),
            ],
        )?)
    })
    .await?;
    Ok(png_response(png))
}

/// Derive features from raw records, scale them for the served model and
/// predict each row.
///
/// Uses the model's training bounds when it has them, otherwise bounds
/// fitted on this batch. Returns the scaled rows and one prediction per row.
pub fn scaled_predictions(
    state: &AppState,
    records: &[OhlcvRecord],
) -> AppResult<(Vec<FeatureRow>, Vec<f64>)> {
    let mut rows = engineer_features(records);
    let scaler = state.inference_scaler(&rows)?;
    scaler.transform(&mut rows);

    let inputs: Vec<_> = rows.iter().map(FeatureRow::to_features).collect();
    let predictions = state.model.predict_batch(&inputs)?;
    Ok((rows, predictions))
}

/// `GET /default_stock_image`: close vs predictions for the default ticker.
pub async fn default_stock_image(State(state): State<Arc<AppState>>) -> AppResult<Response> {
    let records = state.source.fetch_daily(&state.default_ticker).await?;

    let png = blocking(move || {
        let (rows, predictions) = scaled_predictions(&state, &records)?;
        let close: Vec<f64> = rows.iter().map(FeatureRow::target).collect();

        Ok(render_line_chart(
            &format!("{} Actual vs Predicted Close", state.default_ticker),
            "Trading day",
            "Scaled close",
            &[
                Series::new("close", &close),
                Series::new("predictions", &predictions),
            ],
        )?)
    })
    .await?;
    Ok(png_response(png))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ticker_required() {
        let missing = TickerQuery { ticker: None }.require().unwrap_err();
        assert_eq!(missing.to_string(), "Ticker symbol is required.");

        let blank = TickerQuery { ticker: Some("  ".into()) }.require();
        assert!(matches!(blank, Err(AppError::BadRequest(_))));

        let ok = TickerQuery { ticker: Some(" msft ".into()) }.require().unwrap();
        assert_eq!(ok, "MSFT");
    }
}
