//! Versioned on-disk model format.
//!
//! An artifact holds everything needed to rebuild a trained model and feed
//! it correctly scaled inputs: the circuit shape, all trainable weights and
//! the min-max bounds fitted on the training data.
//!
//! # JSON Format
//!
//! ```json
//! {
//!   "format_version": 1,
//!   "num_qubits": 4,
//!   "reps": 1,
//!   "feature_columns": ["open", "high", ..., "30_day_moving_avg"],
//!   "ansatz_weights": [...8 values...],
//!   "linear": { "weight": 0.42, "bias": -0.1 },
//!   "scaler": { "columns": [{ "column": "open", "min": 1.0, "max": 2.0 }, ...] },
//!   "losses": [...],
//!   "trained_at": "2024-05-01T12:00:00Z"
//! }
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use types::{BoundsError, FeatureColumn, ScalerBounds};

use crate::QnnError;
use crate::linear::Linear;
use crate::model::{HybridModel, QnnConfig, assemble};

/// Current artifact format.
pub const ARTIFACT_VERSION: u32 = 1;

/// Errors raised while saving or loading an artifact.
#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("model file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("failed to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("malformed model file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("unsupported model format version {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },

    #[error(
        "model was trained with {found_qubits} qubits / {found_reps} reps, \
         service expects {expected_qubits} qubits / {expected_reps} reps"
    )]
    ShapeMismatch {
        expected_qubits: usize,
        expected_reps: usize,
        found_qubits: usize,
        found_reps: usize,
    },

    #[error("model feature columns {found:?} do not match {expected:?}")]
    FeatureMismatch {
        expected: Vec<FeatureColumn>,
        found: Vec<FeatureColumn>,
    },

    #[error("invalid scaler bounds: {0}")]
    Scaler(#[from] BoundsError),

    #[error("invalid model weights: {0}")]
    Model(#[from] QnnError),
}

/// Serialized trained model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub format_version: u32,
    pub num_qubits: usize,
    pub reps: usize,
    pub feature_columns: Vec<FeatureColumn>,
    pub ansatz_weights: Vec<f64>,
    pub linear: Linear,
    pub scaler: ScalerBounds,
    #[serde(default)]
    pub losses: Vec<f64>,
    pub trained_at: DateTime<Utc>,
}

impl ModelArtifact {
    /// Capture a trained model together with its training-time bounds.
    pub fn new(model: &HybridModel, scaler: ScalerBounds, losses: Vec<f64>) -> Self {
        let config = model.config();
        Self {
            format_version: ARTIFACT_VERSION,
            num_qubits: config.num_qubits,
            reps: config.reps,
            feature_columns: FeatureColumn::ALL.to_vec(),
            ansatz_weights: model.ansatz_weights().to_vec(),
            linear: model.head(),
            scaler,
            losses,
            trained_at: Utc::now(),
        }
    }

    /// Write as pretty JSON, creating parent directories.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ArtifactError> {
        let path = path.as_ref();
        let io_err = |source| ArtifactError::Io {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).map_err(io_err)
    }

    /// Read and structurally validate an artifact.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ArtifactError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| match source.kind() {
            io::ErrorKind::NotFound => ArtifactError::NotFound(path.to_path_buf()),
            _ => ArtifactError::Io {
                path: path.to_path_buf(),
                source,
            },
        })?;
        Self::from_json_str(&content)
    }

    /// Parse and validate an artifact from JSON.
    pub fn from_json_str(json: &str) -> Result<Self, ArtifactError> {
        let artifact: Self = serde_json::from_str(json)?;
        if artifact.format_version != ARTIFACT_VERSION {
            return Err(ArtifactError::UnsupportedVersion {
                found: artifact.format_version,
                expected: ARTIFACT_VERSION,
            });
        }
        if artifact.feature_columns != FeatureColumn::ALL {
            return Err(ArtifactError::FeatureMismatch {
                expected: FeatureColumn::ALL.to_vec(),
                found: artifact.feature_columns,
            });
        }
        artifact.scaler.validate()?;
        Ok(artifact)
    }

    /// Circuit shape recorded in the artifact.
    pub fn qnn_config(&self) -> QnnConfig {
        QnnConfig {
            num_qubits: self.num_qubits,
            reps: self.reps,
        }
    }

    /// Rebuild the model through the shared assembler, requiring the
    /// recorded shape to equal `expected`.
    pub fn into_model(self, expected: &QnnConfig) -> Result<(HybridModel, ScalerBounds), ArtifactError> {
        let found = self.qnn_config();
        if found != *expected {
            return Err(ArtifactError::ShapeMismatch {
                expected_qubits: expected.num_qubits,
                expected_reps: expected.reps,
                found_qubits: found.num_qubits,
                found_reps: found.reps,
            });
        }

        // Random init is immediately overwritten.
        let mut model = assemble(expected, &mut rand::thread_rng())?;
        model.load_weights(self.ansatz_weights, self.linear)?;
        Ok((model, self.scaler))
    }
}
