//! Predictions for an uploaded CSV.
//!
//! The upload must already contain the eight engineered feature columns
//! (as written by `fetch`). Values are fed to the model as-is; predictions
//! are in the same scaled space as the `close` column.

use axum::Json;
use axum::body::Bytes;
use axum::extract::multipart::{Multipart, MultipartRejection};
use axum::extract::State;
use axum::response::Response;
use market_data::RecordTable;
use serde_json::Value;
use std::sync::Arc;
use tracing::info;
use types::TARGET_COLUMN;

use super::{blocking, png_response};
use crate::chart::{Series, render_line_chart};
use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Column appended to the uploaded table.
pub const PREDICTIONS_COLUMN: &str = "predictions";

const UPLOAD_FIELD: &str = "file";
const NO_FILE: &str = "No file uploaded.";

/// Pull the `file` field out of a multipart body.
async fn read_upload(multipart: Result<Multipart, MultipartRejection>) -> AppResult<Bytes> {
    let mut multipart = multipart.map_err(|_| AppError::BadRequest(NO_FILE.into()))?;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.body_text()))?
    {
        if field.name() == Some(UPLOAD_FIELD) {
            return field
                .bytes()
                .await
                .map_err(|e| AppError::BadRequest(e.body_text()));
        }
    }
    Err(AppError::BadRequest(NO_FILE.into()))
}

/// Parse the upload, run the model and append the predictions column.
pub fn predict_table(state: &AppState, csv: &[u8]) -> AppResult<RecordTable> {
    let mut table = RecordTable::from_csv_reader(csv)?;
    let inputs = table.feature_matrix()?;
    let predictions = state.model.predict_batch(&inputs)?;
    table.set_numeric_column(PREDICTIONS_COLUMN, &predictions)?;
    info!(rows = table.len(), "predicted");
    Ok(table)
}

/// `POST /predict`: the uploaded records with `predictions` appended.
pub async fn predict(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> AppResult<Json<Value>> {
    let upload = read_upload(multipart).await?;
    let table = blocking(move || predict_table(&state, &upload)).await?;
    Ok(Json(Value::Array(table.to_records())))
}

/// `POST /predict_image`: `close` against `predictions` as a PNG.
pub async fn predict_image(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> AppResult<Response> {
    let upload = read_upload(multipart).await?;
    let png = blocking(move || {
        let table = predict_table(&state, &upload)?;

        let column = |name: &str| -> AppResult<Vec<f64>> {
            table
                .numeric_column(name)?
                .ok_or_else(|| AppError::Internal(format!("missing column '{name}'")))
        };
        let close = column(TARGET_COLUMN.name())?;
        let predictions = column(PREDICTIONS_COLUMN)?;

        Ok(render_line_chart(
            "Actual vs Predicted Close",
            "Row",
            "Scaled close",
            &[
                Series::new("close", &close),
                Series::new(PREDICTIONS_COLUMN, &predictions),
            ],
        )?)
    })
    .await?;
    Ok(png_response(png))
}
