//! Full-batch training loop.
//!
//! One forward pass, one backward pass and one Adam step per epoch, for
//! exactly `epochs` epochs. There is no validation, early stopping or
//! checkpointing; the loss history is returned for plotting.

use rand::Rng;
use std::time::{Duration, Instant};
use tracing::info;

use crate::QnnError;
use crate::model::{HybridModel, QnnConfig, assemble};
use crate::optimizer::Adam;

/// Training hyperparameters.
#[derive(Debug, Clone)]
pub struct TrainConfig {
    pub epochs: usize,
    pub learning_rate: f64,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            epochs: 10,
            learning_rate: 0.01,
        }
    }
}

/// Outcome of a training run.
#[derive(Debug, Clone, Default)]
pub struct TrainingRun {
    /// Loss recorded at each epoch, before that epoch's update.
    pub losses: Vec<f64>,
    pub elapsed: Duration,
}

impl TrainingRun {
    pub fn final_loss(&self) -> Option<f64> {
        self.losses.last().copied()
    }
}

/// Assemble a fresh model and train it.
pub fn train<X, R>(
    inputs: &[X],
    targets: &[f64],
    qnn: &QnnConfig,
    config: &TrainConfig,
    rng: &mut R,
) -> Result<(HybridModel, TrainingRun), QnnError>
where
    X: AsRef<[f64]> + Sync,
    R: Rng,
{
    let mut model = assemble(qnn, rng)?;
    let run = fit(&mut model, inputs, targets, config)?;
    Ok((model, run))
}

/// Train an existing model in place.
pub fn fit<X>(
    model: &mut HybridModel,
    inputs: &[X],
    targets: &[f64],
    config: &TrainConfig,
) -> Result<TrainingRun, QnnError>
where
    X: AsRef<[f64]> + Sync,
{
    let mut optimizer = Adam::new(config.learning_rate);
    let mut params = model.parameters();
    let mut losses = Vec::with_capacity(config.epochs);
    let start = Instant::now();

    for epoch in 0..config.epochs {
        let (loss, gradient) = model.loss_and_gradient(inputs, targets)?;
        optimizer.step(&mut params, &gradient);
        model.set_parameters(&params)?;

        losses.push(loss);
        info!("Epoch {}/{}, Loss: {}", epoch + 1, config.epochs, loss);
    }

    let elapsed = start.elapsed();
    info!("Training completed in {:.2} seconds", elapsed.as_secs_f64());
    Ok(TrainingRun { losses, elapsed })
}

/// Mean squared error of `model` on a batch.
pub fn mse<X>(model: &HybridModel, inputs: &[X], targets: &[f64]) -> Result<f64, QnnError>
where
    X: AsRef<[f64]> + Sync,
{
    if inputs.len() != targets.len() {
        return Err(QnnError::LengthMismatch {
            features: inputs.len(),
            targets: targets.len(),
        });
    }
    if inputs.is_empty() {
        return Err(QnnError::EmptyBatch);
    }
    let predictions = model.predict_batch(inputs)?;
    let sum: f64 = predictions
        .iter()
        .zip(targets)
        .map(|(p, y)| (p - y).powi(2))
        .sum();
    Ok(sum / inputs.len() as f64)
}
