//! Exact statevector simulation for RY/CX circuits.
//!
//! RY and CX map real amplitudes to real amplitudes, so the state is a plain
//! `Vec<f64>` of length `2^n`. Qubit `q` is bit `q` of the basis index.

use crate::circuit::{BoundGate, ComposedCircuit, ParamSource};

/// Largest register the simulator accepts.
pub const MAX_QUBITS: usize = 20;

/// Real amplitudes of an `n`-qubit state.
#[derive(Debug, Clone, PartialEq)]
pub struct Statevector {
    num_qubits: usize,
    amplitudes: Vec<f64>,
}

impl Statevector {
    /// The all-zeros state `|0...0>`.
    pub fn zero(num_qubits: usize) -> Self {
        assert!(num_qubits <= MAX_QUBITS, "too many qubits: {num_qubits}");
        let mut amplitudes = vec![0.0; 1 << num_qubits];
        amplitudes[0] = 1.0;
        Self {
            num_qubits,
            amplitudes,
        }
    }

    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    pub fn amplitudes(&self) -> &[f64] {
        &self.amplitudes
    }

    /// Apply `RY(theta)` to `qubit`.
    pub fn ry(&mut self, qubit: usize, theta: f64) {
        let (sin, cos) = (theta / 2.0).sin_cos();
        let mask = 1usize << qubit;
        for i in 0..self.amplitudes.len() {
            if i & mask == 0 {
                let j = i | mask;
                let a0 = self.amplitudes[i];
                let a1 = self.amplitudes[j];
                self.amplitudes[i] = cos * a0 - sin * a1;
                self.amplitudes[j] = sin * a0 + cos * a1;
            }
        }
    }

    /// Apply `CX` with the given control and target.
    pub fn cx(&mut self, control: usize, target: usize) {
        let c = 1usize << control;
        let t = 1usize << target;
        for i in 0..self.amplitudes.len() {
            if i & c != 0 && i & t == 0 {
                self.amplitudes.swap(i, i | t);
            }
        }
    }

    /// Expectation value of `Z` on every qubit, `<Z⊗...⊗Z>`.
    ///
    /// Each basis state contributes its probability with sign
    /// `(-1)^popcount(index)`.
    pub fn expectation_z_all(&self) -> f64 {
        self.amplitudes
            .iter()
            .enumerate()
            .map(|(i, a)| {
                let p = a * a;
                if i.count_ones() % 2 == 0 { p } else { -p }
            })
            .sum()
    }

    /// Sum of probabilities; 1 for any state produced by unitary gates.
    pub fn norm_sqr(&self) -> f64 {
        self.amplitudes.iter().map(|a| a * a).sum()
    }
}

/// Run `circuit` from `|0...0>` with the given parameter values.
///
/// Callers guarantee `inputs` and `weights` have the circuit's lengths.
pub(crate) fn simulate(circuit: &ComposedCircuit, inputs: &[f64], weights: &[f64]) -> Statevector {
    let mut state = Statevector::zero(circuit.num_qubits);
    for gate in &circuit.gates {
        match *gate {
            BoundGate::Ry {
                qubit,
                source,
                index,
            } => {
                let theta = match source {
                    ParamSource::Input => inputs[index],
                    ParamSource::Weight => weights[index],
                };
                state.ry(qubit, theta);
            }
            BoundGate::Cx { control, target } => state.cx(control, target),
        }
    }
    state
}
