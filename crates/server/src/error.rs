//! Error handling for the service.
//!
//! Every handler error becomes `{"error": <message>}`. Client-input problems
//! (missing ticker, missing upload) are 400; anything raised while
//! processing a request is 500.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use std::path::PathBuf;
use tracing::error;

use crate::chart::ChartError;

/// Application error type with HTTP response mapping.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Invalid request data (400).
    #[error("{0}")]
    BadRequest(String),

    /// Processing failure (500).
    #[error("{0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Internal(msg) => {
                error!("request failed: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

/// Result type alias for handlers.
pub type AppResult<T> = Result<T, AppError>;

macro_rules! internal_from {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for AppError {
                fn from(err: $ty) -> Self {
                    AppError::Internal(err.to_string())
                }
            }
        )*
    };
}

internal_from!(
    market_data::FetchError,
    market_data::TableError,
    quant::PipelineError,
    qnn::QnnError,
    ChartError,
    tokio::task::JoinError,
);

/// Reasons the service refuses to start.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error(
        "model file {0} not found; train a model first or start with --allow-untrained"
    )]
    ModelMissing(PathBuf),

    #[error("failed to load model: {0}")]
    Artifact(#[from] qnn::ArtifactError),

    #[error("failed to assemble model: {0}")]
    Model(#[from] qnn::QnnError),
}
