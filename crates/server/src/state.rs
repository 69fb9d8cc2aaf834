//! Service context shared by every handler.
//!
//! Built once at startup and passed through axum `State`. The model is
//! read-only after construction.

use market_data::DailySeriesSource;
use qnn::{ArtifactError, HybridModel, ModelArtifact, QnnConfig, assemble};
use quant::{MinMaxScaler, PipelineError};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};
use types::{FeatureRow, ScalerBounds};

use crate::app::ServerConfig;
use crate::error::StartupError;

/// Where the served weights came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelStatus {
    /// Weights and bounds read from a model artifact.
    Loaded,
    /// Freshly assembled weights (demo mode).
    Untrained,
}

/// Shared state for all handlers.
pub struct AppState {
    pub model: HybridModel,
    /// Training-time bounds; absent in untrained mode.
    pub scaler: Option<ScalerBounds>,
    pub status: ModelStatus,
    pub source: Arc<dyn DailySeriesSource>,
    pub default_ticker: String,
    started_at: Instant,
}

impl AppState {
    pub fn new(
        model: HybridModel,
        scaler: Option<ScalerBounds>,
        status: ModelStatus,
        source: Arc<dyn DailySeriesSource>,
        default_ticker: impl Into<String>,
    ) -> Self {
        Self {
            model,
            scaler,
            status,
            source,
            default_ticker: default_ticker.into(),
            started_at: Instant::now(),
        }
    }

    /// Load the model named by `config`, failing closed when it is absent
    /// unless untrained mode was requested.
    pub fn load(
        config: &ServerConfig,
        qnn: &QnnConfig,
        source: Arc<dyn DailySeriesSource>,
    ) -> Result<Arc<Self>, StartupError> {
        let (model, scaler, status) = match ModelArtifact::load(&config.model_path) {
            Ok(artifact) => {
                let (model, scaler) = artifact.into_model(qnn)?;
                info!(path = %config.model_path.display(), "Model loaded successfully.");
                (model, Some(scaler), ModelStatus::Loaded)
            }
            Err(ArtifactError::NotFound(path)) if config.allow_untrained => {
                warn!(
                    path = %path.display(),
                    "Model file not found; serving UNTRAINED randomly initialised weights"
                );
                let model = assemble(qnn, &mut rand::thread_rng())?;
                (model, None, ModelStatus::Untrained)
            }
            Err(ArtifactError::NotFound(path)) => return Err(StartupError::ModelMissing(path)),
            Err(e) => return Err(e.into()),
        };

        Ok(Arc::new(Self::new(
            model,
            scaler,
            status,
            source,
            config.default_ticker.clone(),
        )))
    }

    /// Scaler for rows that are about to be fed to the model.
    ///
    /// Uses the persisted training bounds when available, otherwise fits
    /// on the batch itself.
    pub fn inference_scaler(&self, rows: &[FeatureRow]) -> Result<MinMaxScaler, PipelineError> {
        match &self.scaler {
            Some(bounds) => MinMaxScaler::from_bounds(bounds.clone()),
            None => {
                warn!("no persisted scaler bounds; scaling with batch statistics");
                MinMaxScaler::fit(rows)
            }
        }
    }

    pub fn uptime_secs(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}
