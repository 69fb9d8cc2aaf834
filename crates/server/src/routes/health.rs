//! `GET /health`

use axum::Json;
use axum::extract::State;
use serde::Serialize;
use std::sync::Arc;

use crate::state::{AppState, ModelStatus};

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub model: ModelStatus,
    pub version: &'static str,
    pub uptime_secs: u64,
}

/// Liveness probe; also reports whether trained weights are being served.
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        model: state.status,
        version: env!("CARGO_PKG_VERSION"),
        uptime_secs: state.uptime_secs(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_response_serialization() {
        let response = HealthResponse {
            status: "ok",
            model: ModelStatus::Untrained,
            version: "0.1.0",
            uptime_secs: 3,
        };

        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("\"model\":\"untrained\""));
        assert!(json.contains("\"status\":\"ok\""));
    }
}
