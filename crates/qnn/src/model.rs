//! Model assembler.
//!
//! [`assemble`] is the single factory used by both the trainer and the
//! inference service, so a trained artifact and the model that loads it
//! always share qubit count, repetition depth and parameter layout.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::QnnError;
use crate::circuit::{Circuit, ParameterVector};
use crate::layer::QuantumLayer;
use crate::linear::Linear;
use crate::statevector::MAX_QUBITS;

/// Name of the feature-map parameter vector.
pub const FEATURE_MAP_PARAMS: &str = "fm_theta";
/// Name of the ansatz parameter vector.
pub const ANSATZ_PARAMS: &str = "ansatz_theta";

/// Circuit shape shared by training and serving.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QnnConfig {
    pub num_qubits: usize,
    /// Repetition depth of both `RealAmplitudes` circuits.
    pub reps: usize,
}

impl Default for QnnConfig {
    fn default() -> Self {
        Self {
            num_qubits: 4,
            reps: 1,
        }
    }
}

impl QnnConfig {
    /// Parameters per circuit; also the required input width.
    pub fn params_per_circuit(&self) -> usize {
        self.num_qubits * (self.reps + 1)
    }

    pub fn validate(&self) -> Result<(), QnnError> {
        if self.num_qubits == 0 || self.num_qubits > MAX_QUBITS {
            return Err(QnnError::InvalidConfig(format!(
                "num_qubits must be in 1..={MAX_QUBITS}, got {}",
                self.num_qubits
            )));
        }
        Ok(())
    }
}

/// Quantum layer followed by a linear head.
#[derive(Debug, Clone, PartialEq)]
pub struct HybridModel {
    config: QnnConfig,
    layer: QuantumLayer,
    ansatz_weights: Vec<f64>,
    head: Linear,
}

/// Build a freshly initialised model.
///
/// Ansatz weights are drawn uniformly from `[-1, 1]`, as is the linear head.
/// Two calls with the same config produce the same parameter count but
/// different values unless `rng` is seeded identically.
pub fn assemble<R: Rng>(config: &QnnConfig, rng: &mut R) -> Result<HybridModel, QnnError> {
    config.validate()?;
    let n = config.params_per_circuit();

    let feature_map = Circuit::real_amplitudes(config.num_qubits, config.reps)
        .assign_parameters(ParameterVector::new(FEATURE_MAP_PARAMS, n))?;
    let ansatz = Circuit::real_amplitudes(config.num_qubits, config.reps)
        .assign_parameters(ParameterVector::new(ANSATZ_PARAMS, n))?;
    let layer = QuantumLayer::new(&feature_map, &ansatz)?;

    let ansatz_weights = (0..layer.num_weights())
        .map(|_| rng.gen_range(-1.0..=1.0))
        .collect();

    Ok(HybridModel {
        config: *config,
        layer,
        ansatz_weights,
        head: Linear::random(rng),
    })
}

impl HybridModel {
    pub fn config(&self) -> &QnnConfig {
        &self.config
    }

    /// Required width of an input row.
    pub fn num_inputs(&self) -> usize {
        self.layer.num_inputs()
    }

    /// Trainable parameters: ansatz weights plus linear weight and bias.
    pub fn num_parameters(&self) -> usize {
        self.ansatz_weights.len() + 2
    }

    pub fn ansatz_weights(&self) -> &[f64] {
        &self.ansatz_weights
    }

    pub fn head(&self) -> Linear {
        self.head
    }

    /// All trainable parameters as one vector: ansatz weights, then the
    /// linear weight, then the bias.
    pub fn parameters(&self) -> Vec<f64> {
        let mut flat = self.ansatz_weights.clone();
        flat.push(self.head.weight);
        flat.push(self.head.bias);
        flat
    }

    /// Overwrite all trainable parameters from the layout of
    /// [`parameters`](Self::parameters).
    pub fn set_parameters(&mut self, flat: &[f64]) -> Result<(), QnnError> {
        if flat.len() != self.num_parameters() {
            return Err(QnnError::WeightCount {
                expected: self.num_parameters(),
                got: flat.len(),
            });
        }
        let (ansatz, head) = flat.split_at(self.ansatz_weights.len());
        self.ansatz_weights.copy_from_slice(ansatz);
        self.head = Linear::new(head[0], head[1]);
        Ok(())
    }

    /// Replace the ansatz weights and linear head.
    pub fn load_weights(&mut self, ansatz: Vec<f64>, head: Linear) -> Result<(), QnnError> {
        if ansatz.len() != self.layer.num_weights() {
            return Err(QnnError::WeightCount {
                expected: self.layer.num_weights(),
                got: ansatz.len(),
            });
        }
        self.ansatz_weights = ansatz;
        self.head = head;
        Ok(())
    }

    /// Prediction for one row.
    pub fn predict(&self, input: &[f64]) -> Result<f64, QnnError> {
        let q = self.layer.forward(input, &self.ansatz_weights)?;
        Ok(self.head.forward(q))
    }

    /// Predictions for many rows.
    pub fn predict_batch<X>(&self, inputs: &[X]) -> Result<Vec<f64>, QnnError>
    where
        X: AsRef<[f64]> + Sync,
    {
        let q = self.layer.forward_batch(inputs, &self.ansatz_weights)?;
        Ok(q.into_iter().map(|q| self.head.forward(q)).collect())
    }

    /// Mean squared error over a batch and its gradient in the layout of
    /// [`parameters`](Self::parameters).
    pub fn loss_and_gradient<X>(&self, inputs: &[X], targets: &[f64]) -> Result<(f64, Vec<f64>), QnnError>
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

        let evaluated = self
            .layer
            .forward_batch_with_gradient(inputs, &self.ansatz_weights)?;

        let n = inputs.len() as f64;
        let num_weights = self.ansatz_weights.len();
        let mut gradient = vec![0.0; num_weights + 2];
        let mut loss = 0.0;

        for ((q, dq), &y) in evaluated.iter().zip(targets) {
            let residual = self.head.forward(*q) - y;
            loss += residual * residual;

            // dL/dp for this row
            let dp = 2.0 * residual / n;
            for (g, d) in gradient[..num_weights].iter_mut().zip(dq) {
                *g += dp * self.head.weight * d;
            }
            gradient[num_weights] += dp * q;
            gradient[num_weights + 1] += dp;
        }

        Ok((loss / n, gradient))
    }
}
