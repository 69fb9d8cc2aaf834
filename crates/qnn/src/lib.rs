//! Hybrid quantum/classical regression model.
//!
//! A shallow variational circuit is simulated exactly on a real statevector
//! and wrapped as a differentiable layer; a single affine transform maps its
//! expectation value to the predicted (scaled) closing price.
//!
//! # Architecture
//!
//! ```text
//!  features (8) ──► feature map RY/CX ──► ansatz RY/CX ──► <Z⊗Z⊗Z⊗Z> ──► w·q + b
//!                   fm_theta[0..8]        ansatz_theta[0..8]   quantum layer   linear head
//! ```
//!
//! # Modules
//!
//! - [`circuit`]: Circuit IR, named parameter vectors, `RealAmplitudes` template
//! - [`statevector`]: Real-amplitude statevector simulator
//! - [`layer`]: Differentiable quantum layer (parameter-shift gradients)
//! - [`linear`]: Scalar affine output layer
//! - [`model`]: Model assembler shared by training and serving
//! - [`optimizer`]: Adam
//! - [`trainer`]: Full-batch training loop
//! - [`artifact`]: Versioned on-disk model format

pub mod artifact;
pub mod circuit;
pub mod layer;
pub mod linear;
pub mod model;
pub mod optimizer;
pub mod statevector;
pub mod trainer;

pub use artifact::{ARTIFACT_VERSION, ArtifactError, ModelArtifact};
pub use circuit::{Circuit, Gate, ParameterVector};
pub use layer::QuantumLayer;
pub use linear::Linear;
pub use model::{HybridModel, QnnConfig, assemble};
pub use optimizer::Adam;
pub use trainer::{TrainConfig, TrainingRun, fit, mse, train};

use thiserror::Error;

/// Errors raised while building, evaluating or training a model.
#[derive(Debug, Error, PartialEq)]
pub enum QnnError {
    #[error("invalid model configuration: {0}")]
    InvalidConfig(String),

    #[error("parameter vector '{0}' is bound more than once")]
    ParameterCollision(String),

    #[error("expected {expected} input features, got {got}")]
    InputDimension { expected: usize, got: usize },

    #[error("expected {expected} trainable weights, got {got}")]
    WeightCount { expected: usize, got: usize },

    #[error("feature rows ({features}) and targets ({targets}) differ in length")]
    LengthMismatch { features: usize, targets: usize },

    #[error("cannot train on an empty batch")]
    EmptyBatch,
}
