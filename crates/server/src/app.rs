//! Axum application builder and server configuration.
//!
//! # Routes
//!
//! - `GET /health` - liveness and model status
//! - `POST /predict` - predictions for an uploaded feature CSV
//! - `POST /predict_image` - same, as a PNG chart
//! - `GET /fetch_stock?ticker=` - fetched, preprocessed and scaled table
//! - `GET /fetch_stock_image?ticker=` - close and moving averages as PNG
//! - `GET /default_stock_image` - close vs predictions for the default ticker

use axum::Router;
use axum::routing::{get, post};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::routes::{health, predict, stock};
use crate::state::AppState;

/// Create the Axum application with all routes.
pub fn create_app(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
        .max_age(Duration::from_secs(3600));

    Router::new()
        .route("/health", get(health::health))
        .route("/predict", post(predict::predict))
        .route("/predict_image", post(predict::predict_image))
        .route("/fetch_stock", get(stock::fetch_stock))
        .route("/fetch_stock_image", get(stock::fetch_stock_image))
        .route("/default_stock_image", get(stock::default_stock_image))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Host to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
    /// Model artifact to serve.
    pub model_path: PathBuf,
    /// JSON file holding the provider API key.
    pub api_key_path: PathBuf,
    /// Ticker charted by `/default_stock_image`.
    pub default_ticker: String,
    /// Start with random weights when the model file is missing.
    pub allow_untrained: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 5000,
            model_path: PathBuf::from("model/quantum_nn_model.json"),
            api_key_path: PathBuf::from("API_KEY.json"),
            default_ticker: "AAPL".into(),
            allow_untrained: false,
        }
    }
}

impl ServerConfig {
    /// Get bind address.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Bind and serve until Ctrl-C.
pub async fn serve(config: &ServerConfig, state: Arc<AppState>) -> std::io::Result<()> {
    let listener = TcpListener::bind(config.bind_addr()).await?;
    info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, create_app(state))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutting down");
        })
        .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_config_default() {
        let config = ServerConfig::default();
        assert_eq!(config.port, 5000);
        assert_eq!(config.bind_addr(), "127.0.0.1:5000");
        assert_eq!(config.default_ticker, "AAPL");
        assert!(!config.allow_untrained);
    }
}
