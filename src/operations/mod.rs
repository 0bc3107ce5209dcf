// src/operations/mod.rs

//! Defines the gates the engine can apply to a register.
//!
//! Gates form a closed set. Every kind is a single-qubit unitary applied to
//! amplitude pairs selected by a target bit mask, optionally restricted to
//! the subspace where all control bits are set.

use crate::core::{Result, SimError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A quantum gate with its operands.
///
/// Qubit operands are register indices (bit positions of the amplitude
/// index). Angles are in radians.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)] // PartialEq compares angles exactly
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Gate {
    /// `(|0⟩ + |1⟩)/√2`, `(|0⟩ − |1⟩)/√2` on the target.
    Hadamard { target: usize },
    /// Bit flip.
    PauliX { target: usize },
    /// `[[0, −i], [i, 0]]`
    PauliY { target: usize },
    /// Phase flip.
    PauliZ { target: usize },
    /// Flips `target` where `control` is 1.
    Cnot { control: usize, target: usize },
    /// Flips `target` where both controls are 1.
    Toffoli { controls: [usize; 2], target: usize },
    /// Multiplies the `|1⟩` component of the target by `e^(iθ)`.
    Phase { target: usize, angle: f64 },
    /// Real rotation `[[cos θ/2, −sin θ/2], [sin θ/2, cos θ/2]]` on the target.
    Rotation { target: usize, angle: f64 },
}

impl Gate {
    /// Short mnemonic used in logs and circuit listings.
    pub fn name(&self) -> &'static str {
        match self {
            Gate::Hadamard { .. } => "H",
            Gate::PauliX { .. } => "X",
            Gate::PauliY { .. } => "Y",
            Gate::PauliZ { .. } => "Z",
            Gate::Cnot { .. } => "CNOT",
            Gate::Toffoli { .. } => "CCX",
            Gate::Phase { .. } => "P",
            Gate::Rotation { .. } => "R",
        }
    }

    /// The qubit the gate acts on.
    pub fn target(&self) -> usize {
        match self {
            Gate::Hadamard { target }
            | Gate::PauliX { target }
            | Gate::PauliY { target }
            | Gate::PauliZ { target }
            | Gate::Cnot { target, .. }
            | Gate::Toffoli { target, .. }
            | Gate::Phase { target, .. }
            | Gate::Rotation { target, .. } => *target,
        }
    }

    /// Control qubits, empty for uncontrolled gates.
    pub fn controls(&self) -> &[usize] {
        match self {
            Gate::Cnot { control, .. } => std::slice::from_ref(control),
            Gate::Toffoli { controls, .. } => controls,
            _ => &[],
        }
    }

    /// Controls followed by the target.
    pub fn involved_qubits(&self) -> Vec<usize> {
        let mut qubits = self.controls().to_vec();
        qubits.push(self.target());
        qubits
    }

    /// Number of qubits the gate touches.
    pub fn arity(&self) -> usize {
        self.controls().len() + 1
    }

    /// Rotation or phase angle, if the gate carries one.
    pub fn angle(&self) -> Option<f64> {
        match self {
            Gate::Phase { angle, .. } | Gate::Rotation { angle, .. } => Some(*angle),
            _ => None,
        }
    }

    /// Whether applying the gate twice is the identity.
    pub fn is_self_inverse(&self) -> bool {
        !matches!(self, Gate::Phase { .. } | Gate::Rotation { .. })
    }

    /// Checks the gate's operands against a register of `qubits` qubits.
    ///
    /// Every index must be `< qubits`, controls and target pairwise distinct,
    /// and angles finite.
    pub fn validate(&self, qubits: usize) -> Result<()> {
        for q in self.involved_qubits() {
            if q >= qubits {
                return Err(SimError::invalid_config(format!(
                    "{} references qubit {} but the register has {} qubits",
                    self, q, qubits
                )));
            }
        }
        let target = self.target();
        let controls = self.controls();
        if controls.contains(&target) {
            return Err(SimError::invalid_config(format!("{}: control and target overlap", self)));
        }
        if let [c1, c2] = controls {
            if c1 == c2 {
                return Err(SimError::invalid_config(format!("{}: duplicate control qubit", self)));
            }
        }
        if let Some(angle) = self.angle() {
            if !angle.is_finite() {
                return Err(SimError::invalid_config(format!("{}: angle must be finite", self)));
            }
        }
        Ok(())
    }

    /// Builds a gate from an untyped request as received from collaborators.
    ///
    /// Kind names are case-insensitive; short aliases (`h`, `x`, `cx`, `ccx`,
    /// `p`, `ry`, ...) are accepted. Unknown kinds fail with
    /// [`SimError::UnsupportedGateKind`]; wrong operand or parameter counts
    /// fail with [`SimError::InvalidCircuitConfig`].
    pub fn from_request(request: &GateRequest) -> Result<Self> {
        let kind = request.kind.trim().to_ascii_lowercase();
        let targets = &request.targets;
        let controls = &request.controls;
        let params = &request.params;

        let single_target = || -> Result<usize> {
            match (targets.as_slice(), controls.is_empty()) {
                ([t], true) => Ok(*t),
                _ => Err(SimError::invalid_config(format!(
                    "gate '{}' takes exactly one target and no controls",
                    request.kind
                ))),
            }
        };
        let angle = || -> Result<f64> {
            match params.as_slice() {
                [a] => Ok(*a),
                _ => Err(SimError::invalid_config(format!(
                    "gate '{}' takes exactly one angle parameter",
                    request.kind
                ))),
            }
        };

        let gate = match kind.as_str() {
            "hadamard" | "h" => Gate::Hadamard { target: single_target()? },
            "paulix" | "pauli_x" | "x" | "not" => Gate::PauliX { target: single_target()? },
            "pauliy" | "pauli_y" | "y" => Gate::PauliY { target: single_target()? },
            "pauliz" | "pauli_z" | "z" => Gate::PauliZ { target: single_target()? },
            "cnot" | "cx" => match (targets.as_slice(), controls.as_slice()) {
                ([t], [c]) => Gate::Cnot { control: *c, target: *t },
                _ => {
                    return Err(SimError::invalid_config(
                        "cnot takes exactly one control and one target",
                    ));
                }
            },
            "toffoli" | "ccx" | "ccnot" => match (targets.as_slice(), controls.as_slice()) {
                ([t], [c1, c2]) => Gate::Toffoli { controls: [*c1, *c2], target: *t },
                _ => {
                    return Err(SimError::invalid_config(
                        "toffoli takes exactly two controls and one target",
                    ));
                }
            },
            "phase" | "p" => Gate::Phase { target: single_target()?, angle: angle()? },
            "rotation" | "ry" => Gate::Rotation { target: single_target()?, angle: angle()? },
            _ => return Err(SimError::UnsupportedGateKind { kind: request.kind.clone() }),
        };
        Ok(gate)
    }
}

impl fmt::Display for Gate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Gate::Cnot { control, target } => write!(f, "CNOT({} -> {})", control, target),
            Gate::Toffoli { controls, target } => {
                write!(f, "CCX({}, {} -> {})", controls[0], controls[1], target)
            }
            Gate::Phase { target, angle } | Gate::Rotation { target, angle } => {
                write!(f, "{}({}, {:.4})", self.name(), target, angle)
            }
            _ => write!(f, "{}({})", self.name(), self.target()),
        }
    }
}

/// Untyped gate description as sent by orchestration collaborators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GateRequest {
    /// Gate kind name, e.g. `"hadamard"` or `"cnot"`.
    pub kind: String,
    #[serde(default)]
    pub targets: Vec<usize>,
    #[serde(default)]
    pub controls: Vec<usize>,
    /// Real-valued parameters such as a rotation angle.
    #[serde(default)]
    pub params: Vec<f64>,
}

impl GateRequest {
    /// Request for an uncontrolled, unparameterised gate.
    pub fn new(kind: impl Into<String>, target: usize) -> Self {
        Self { kind: kind.into(), targets: vec![target], controls: Vec::new(), params: Vec::new() }
    }

    pub fn with_controls(mut self, controls: Vec<usize>) -> Self {
        self.controls = controls;
        self
    }

    pub fn with_params(mut self, params: Vec<f64>) -> Self {
        self.params = params;
        self
    }
}

impl TryFrom<&GateRequest> for Gate {
    type Error = SimError;

    fn try_from(request: &GateRequest) -> Result<Self> {
        Gate::from_request(request)
    }
}
