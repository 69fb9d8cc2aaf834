//! Differentiable quantum layer.
//!
//! Maps an input row to the expectation value `<Z⊗...⊗Z>` of the composed
//! circuit. Gradients with respect to the trainable weights use the
//! parameter-shift rule, which is exact for RY rotations:
//!
//! ```text
//! d<Z>/dθ_k = ( <Z>(θ_k + π/2) - <Z>(θ_k - π/2) ) / 2
//! ```

use rayon::prelude::*;
use std::f64::consts::FRAC_PI_2;

use crate::QnnError;
use crate::circuit::{Circuit, ComposedCircuit};
use crate::statevector::simulate;

/// Feature map + ansatz evaluated as one trainable unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuantumLayer {
    circuit: ComposedCircuit,
}

impl QuantumLayer {
    /// Compose `feature_map` (data encoding) with `ansatz` (trainable).
    pub fn new(feature_map: &Circuit, ansatz: &Circuit) -> Result<Self, QnnError> {
        Ok(Self {
            circuit: ComposedCircuit::compose(feature_map, ansatz)?,
        })
    }

    pub fn num_qubits(&self) -> usize {
        self.circuit.num_qubits
    }

    /// Width of an input row.
    pub fn num_inputs(&self) -> usize {
        self.circuit.num_inputs
    }

    /// Number of trainable weights.
    pub fn num_weights(&self) -> usize {
        self.circuit.num_weights
    }

    fn check(&self, input: &[f64], weights: &[f64]) -> Result<(), QnnError> {
        if input.len() != self.num_inputs() {
            return Err(QnnError::InputDimension {
                expected: self.num_inputs(),
                got: input.len(),
            });
        }
        if weights.len() != self.num_weights() {
            return Err(QnnError::WeightCount {
                expected: self.num_weights(),
                got: weights.len(),
            });
        }
        Ok(())
    }

    /// Expectation value for one row, in `[-1, 1]`.
    pub fn forward(&self, input: &[f64], weights: &[f64]) -> Result<f64, QnnError> {
        self.check(input, weights)?;
        Ok(simulate(&self.circuit, input, weights).expectation_z_all())
    }

    /// Expectation value and its gradient with respect to every weight.
    pub fn forward_with_gradient(
        &self,
        input: &[f64],
        weights: &[f64],
    ) -> Result<(f64, Vec<f64>), QnnError> {
        self.check(input, weights)?;
        let value = simulate(&self.circuit, input, weights).expectation_z_all();

        let mut shifted = weights.to_vec();
        let gradient = (0..weights.len())
            .map(|k| {
                shifted[k] = weights[k] + FRAC_PI_2;
                let plus = simulate(&self.circuit, input, &shifted).expectation_z_all();
                shifted[k] = weights[k] - FRAC_PI_2;
                let minus = simulate(&self.circuit, input, &shifted).expectation_z_all();
                shifted[k] = weights[k];
                (plus - minus) / 2.0
            })
            .collect();

        Ok((value, gradient))
    }

    /// Evaluate many rows in parallel.
    pub fn forward_batch<X>(&self, inputs: &[X], weights: &[f64]) -> Result<Vec<f64>, QnnError>
    where
        X: AsRef<[f64]> + Sync,
    {
        inputs
            .par_iter()
            .map(|x| self.forward(x.as_ref(), weights))
            .collect()
    }

    /// Evaluate many rows with gradients in parallel.
    pub fn forward_batch_with_gradient<X>(
        &self,
        inputs: &[X],
        weights: &[f64],
    ) -> Result<Vec<(f64, Vec<f64>)>, QnnError>
    where
        X: AsRef<[f64]> + Sync,
    {
        inputs
            .par_iter()
            .map(|x| self.forward_with_gradient(x.as_ref(), weights))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::circuit::ParameterVector;

    fn layer(num_qubits: usize) -> QuantumLayer {
        let n = num_qubits * 2;
        let fm = Circuit::real_amplitudes(num_qubits, 1)
            .assign_parameters(ParameterVector::new("fm_theta", n))
            .unwrap();
        let ansatz = Circuit::real_amplitudes(num_qubits, 1)
            .assign_parameters(ParameterVector::new("ansatz_theta", n))
            .unwrap();
        QuantumLayer::new(&fm, &ansatz).unwrap()
    }

    #[test]
    fn test_dimensions() {
        let layer = layer(4);
        assert_eq!(layer.num_inputs(), 8);
        assert_eq!(layer.num_weights(), 8);
        assert_eq!(layer.num_qubits(), 4);
    }

    #[test]
    fn test_forward_bounded() {
        let layer = layer(4);
        let x = [0.1, 0.9, 0.3, 0.5, 0.2, 0.7, 0.4, 0.6];
        let w = [0.5, -0.2, 0.8, -0.9, 0.1, 0.3, -0.4, 0.7];
        let q = layer.forward(&x, &w).unwrap();
        assert!((-1.0..=1.0).contains(&q));
    }

    #[test]
    fn test_forward_rejects_wrong_width() {
        let layer = layer(4);
        assert_eq!(
            layer.forward(&[0.0; 7], &[0.0; 8]),
            Err(QnnError::InputDimension {
                expected: 8,
                got: 7
            })
        );
        assert_eq!(
            layer.forward(&[0.0; 8], &[0.0; 9]),
            Err(QnnError::WeightCount {
                expected: 8,
                got: 9
            })
        );
    }

    #[test]
    fn test_parameter_shift_matches_finite_difference() {
        let layer = layer(3);
        let x = [0.2, 0.4, 0.6, 0.8, 1.0, 0.1];
        let w = vec![0.3, -0.5, 1.2, 0.7, -1.1, 0.05];
        let (_, gradient) = layer.forward_with_gradient(&x, &w).unwrap();

        let h = 1e-6;
        for k in 0..w.len() {
            let mut up = w.clone();
            let mut down = w.clone();
            up[k] += h;
            down[k] -= h;
            let numeric =
                (layer.forward(&x, &up).unwrap() - layer.forward(&x, &down).unwrap()) / (2.0 * h);
            assert!(
                (gradient[k] - numeric).abs() < 1e-6,
                "weight {k}: shift {} vs numeric {numeric}",
                gradient[k]
            );
        }
    }

    #[test]
    fn test_batch_matches_single() {
        let layer = layer(2);
        let rows = vec![[0.1, 0.2, 0.3, 0.4], [0.9, 0.8, 0.7, 0.6]];
        let w = [0.5, 0.4, 0.3, 0.2];
        let batch = layer.forward_batch(&rows, &w).unwrap();
        for (row, q) in rows.iter().zip(&batch) {
            assert_eq!(layer.forward(row, &w).unwrap(), *q);
        }
    }
}
