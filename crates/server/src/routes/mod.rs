//! Route handlers.
//!
//! # Modules
//!
//! - [`health`]: Liveness and model status
//! - [`predict`]: Predictions for uploaded feature tables
//! - [`stock`]: Provider-backed tables and charts

pub mod health;
pub mod predict;
pub mod stock;

use axum::http::header;
use axum::response::{IntoResponse, Response};

use crate::error::AppResult;

/// Wrap encoded PNG bytes in an `image/png` response.
pub(crate) fn png_response(bytes: Vec<u8>) -> Response {
    ([(header::CONTENT_TYPE, "image/png")], bytes).into_response()
}

/// Run model inference or chart rendering off the async workers.
pub(crate) async fn blocking<T, F>(work: F) -> AppResult<T>
where
    F: FnOnce() -> AppResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work).await?
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;

    #[tokio::test]
    async fn test_blocking_passes_result_through() {
        assert_eq!(blocking(|| Ok(3)).await.unwrap(), 3);
        let err = blocking::<(), _>(|| Err(AppError::BadRequest("bad".into())))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn test_blocking_panic_is_internal() {
        let err = blocking::<(), _>(|| panic!("boom")).await.unwrap_err();
        assert!(matches!(err, AppError::Internal(_)));
    }
}
