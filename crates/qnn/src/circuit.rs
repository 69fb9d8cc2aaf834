//! Circuit IR and the `RealAmplitudes` template.
//!
//! Only two gates are needed: `RY` rotations, whose angles come from named
//! parameter vectors, and `CX`. Both keep amplitudes real, which is what lets
//! the simulator skip complex arithmetic.

use std::fmt;

use crate::QnnError;

/// A named, fixed-length vector of circuit parameters.
///
/// Individual entries print as `name[i]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterVector {
    name: String,
    len: usize,
}

impl ParameterVector {
    pub fn new(name: impl Into<String>, len: usize) -> Self {
        Self {
            name: name.into(),
            len,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Display name of entry `index`.
    pub fn entry(&self, index: usize) -> String {
        format!("{}[{}]", self.name, index)
    }
}

/// Which parameter vector a rotation angle is read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamSource {
    /// Data-encoding parameters (feature map), supplied per row.
    Input,
    /// Trainable parameters (ansatz).
    Weight,
}

/// A single gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gate {
    /// Y rotation by parameter `param` of this circuit's vector.
    Ry { qubit: usize, param: usize },
    /// Controlled NOT.
    Cx { control: usize, target: usize },
}

/// A parameterized circuit over one parameter vector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Circuit {
    num_qubits: usize,
    gates: Vec<Gate>,
    parameters: ParameterVector,
}

impl Circuit {
    /// Build the `RealAmplitudes` template.
    ///
    /// Each repetition is an RY layer followed by reverse-linear CX
    /// entanglement (`CX(n-2, n-1)`, ..., `CX(0, 1)`); a final RY layer
    /// closes the circuit, giving `num_qubits * (reps + 1)` parameters.
    pub fn real_amplitudes(num_qubits: usize, reps: usize) -> Self {
        let mut gates = Vec::new();
        let mut next_param = 0;
        let mut rotation_layer = |gates: &mut Vec<Gate>| {
            for qubit in 0..num_qubits {
                gates.push(Gate::Ry {
                    qubit,
                    param: next_param,
                });
                next_param += 1;
            }
        };

        for _ in 0..reps {
            rotation_layer(&mut gates);
            for control in (0..num_qubits.saturating_sub(1)).rev() {
                gates.push(Gate::Cx {
                    control,
                    target: control + 1,
                });
            }
        }
        rotation_layer(&mut gates);

        Self {
            num_qubits,
            parameters: ParameterVector::new("θ", num_qubits * (reps + 1)),
            gates,
        }
    }

    /// Rebind the circuit's parameters to a differently named vector of the
    /// same length.
    pub fn assign_parameters(mut self, parameters: ParameterVector) -> Result<Self, QnnError> {
        if parameters.len() != self.parameters.len() {
            return Err(QnnError::InvalidConfig(format!(
                "parameter vector '{}' has {} entries, circuit needs {}",
                parameters.name(),
                parameters.len(),
                self.parameters.len()
            )));
        }
        self.parameters = parameters;
        Ok(self)
    }

    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    pub fn num_parameters(&self) -> usize {
        self.parameters.len()
    }

    pub fn parameters(&self) -> &ParameterVector {
        &self.parameters
    }

    pub fn gates(&self) -> &[Gate] {
        &self.gates
    }
}

impl fmt::Display for Circuit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for gate in &self.gates {
            match *gate {
                Gate::Ry { qubit, param } => {
                    writeln!(f, "ry({}) q{}", self.parameters.entry(param), qubit)?
                }
                Gate::Cx { control, target } => writeln!(f, "cx q{}, q{}", control, target)?,
            }
        }
        Ok(())
    }
}

/// A gate after composition, with its parameter source resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BoundGate {
    Ry {
        qubit: usize,
        source: ParamSource,
        index: usize,
    },
    Cx {
        control: usize,
        target: usize,
    },
}

/// Feature map followed by ansatz, ready to simulate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ComposedCircuit {
    pub num_qubits: usize,
    pub num_inputs: usize,
    pub num_weights: usize,
    pub gates: Vec<BoundGate>,
}

impl ComposedCircuit {
    /// Append `ansatz` after `feature_map`.
    ///
    /// The two parameter vectors must have distinct names, and both circuits
    /// must act on the same register.
    pub fn compose(feature_map: &Circuit, ansatz: &Circuit) -> Result<Self, QnnError> {
        if feature_map.parameters().name() == ansatz.parameters().name() {
            return Err(QnnError::ParameterCollision(
                ansatz.parameters().name().to_string(),
            ));
        }
        if feature_map.num_qubits() != ansatz.num_qubits() {
            return Err(QnnError::InvalidConfig(format!(
                "feature map acts on {} qubits, ansatz on {}",
                feature_map.num_qubits(),
                ansatz.num_qubits()
            )));
        }

        Ok(Self {
            num_qubits: feature_map.num_qubits(),
            num_inputs: feature_map.num_parameters(),
            num_weights: ansatz.num_parameters(),
            gates: bind(feature_map, ParamSource::Input)
                .chain(bind(ansatz, ParamSource::Weight))
                .collect(),
        })
    }
}

fn bind(circuit: &Circuit, source: ParamSource) -> impl Iterator<Item = BoundGate> + '_ {
    circuit.gates().iter().map(move |gate| match *gate {
        Gate::Ry { qubit, param } => BoundGate::Ry {
            qubit,
            source,
            index: param,
        },
        Gate::Cx { control, target } => BoundGate::Cx { control, target },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_real_amplitudes_structure() {
        let circuit = Circuit::real_amplitudes(4, 1);
        assert_eq!(circuit.num_parameters(), 8);

        let rotations = circuit
            .gates()
            .iter()
            .filter(|g| matches!(g, Gate::Ry { .. }))
            .count();
        assert_eq!(rotations, 8);

        let cx: Vec<_> = circuit
            .gates()
            .iter()
            .filter_map(|g| match *g {
                Gate::Cx { control, target } => Some((control, target)),
                _ => None,
            })
            .collect();
        assert_eq!(cx, vec![(2, 3), (1, 2), (0, 1)]);
    }

    #[test]
    fn test_real_amplitudes_param_count_scales_with_reps() {
        assert_eq!(Circuit::real_amplitudes(3, 2).num_parameters(), 9);
        assert_eq!(Circuit::real_amplitudes(1, 1).num_parameters(), 2);
    }

    #[test]
    fn test_assign_parameters() {
        let circuit = Circuit::real_amplitudes(2, 1)
            .assign_parameters(ParameterVector::new("fm_theta", 4))
            .unwrap();
        assert_eq!(circuit.parameters().name(), "fm_theta");
        assert!(circuit.to_string().contains("ry(fm_theta[3]) q1"));

        let err = Circuit::real_amplitudes(2, 1)
            .assign_parameters(ParameterVector::new("short", 3))
            .unwrap_err();
        assert!(matches!(err, QnnError::InvalidConfig(_)));
    }

    #[test]
    fn test_compose_rejects_name_collision() {
        let a = Circuit::real_amplitudes(2, 1);
        let b = Circuit::real_amplitudes(2, 1);
        assert_eq!(
            ComposedCircuit::compose(&a, &b),
            Err(QnnError::ParameterCollision("θ".into()))
        );
    }

    #[test]
    fn test_compose_orders_feature_map_first() {
        let fm = Circuit::real_amplitudes(2, 1)
            .assign_parameters(ParameterVector::new("fm_theta", 4))
            .unwrap();
        let ansatz = Circuit::real_amplitudes(2, 1)
            .assign_parameters(ParameterVector::new("ansatz_theta", 4))
            .unwrap();
        let composed = ComposedCircuit::compose(&fm, &ansatz).unwrap();

        assert_eq!(composed.num_inputs, 4);
        assert_eq!(composed.num_weights, 4);
        assert_eq!(composed.gates.len(), fm.gates().len() + ansatz.gates().len());
        assert!(matches!(
            composed.gates[0],
            BoundGate::Ry {
                source: ParamSource::Input,
                ..
            }
        ));
        assert!(matches!(
            composed.gates.last(),
            Some(BoundGate::Ry {
                source: ParamSource::Weight,
                ..
            })
        ));
    }
}
