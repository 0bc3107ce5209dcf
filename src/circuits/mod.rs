// src/circuits/mod.rs

//! Circuit configurations: an ordered gate list over a fixed-width register,
//! together with the error-correction flag and optimisation mode that govern
//! how the manager prepares and runs it.

mod optimize;

pub use optimize::optimize;

use crate::core::{Result, SimError};
use crate::operations::{Gate, GateRequest};
use serde::{Deserialize, Serialize};
use std::fmt;

/// How much static rewriting a circuit receives before it is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptimizationMode {
    /// Store the gate list as given.
    Speed,
    /// Cancel adjacent self-inverse pairs and fold rotations.
    Accuracy,
    /// Cancel adjacent self-inverse pairs.
    #[default]
    Balanced,
}

/// Immutable description of a circuit.
///
/// Once handed to the manager a configuration is never mutated; executing a
/// circuit advances its associated state only.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct CircuitConfig {
    qubits: usize,
    gates: Vec<Gate>,
    error_correction: bool,
    optimization: OptimizationMode,
}

impl CircuitConfig {
    /// Creates a configuration over `qubits` qubits with no gates,
    /// error correction off and `Balanced` optimisation.
    pub fn new(qubits: usize) -> Self {
        Self {
            qubits,
            gates: Vec::new(),
            error_correction: false,
            optimization: OptimizationMode::default(),
        }
    }

    pub fn qubits(&self) -> usize {
        self.qubits
    }

    /// The ordered gate sequence.
    pub fn gates(&self) -> &[Gate] {
        &self.gates
    }

    pub fn error_correction(&self) -> bool {
        self.error_correction
    }

    pub fn optimization(&self) -> OptimizationMode {
        self.optimization
    }

    /// Number of gates.
    pub fn len(&self) -> usize {
        self.gates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.gates.is_empty()
    }

    /// Checks the register width against `max_qubits` and every gate against
    /// the register. All violations surface as `InvalidCircuitConfig`.
    pub fn validate(&self, max_qubits: usize) -> Result<()> {
        if self.qubits == 0 || self.qubits > max_qubits {
            return Err(SimError::invalid_config(format!(
                "qubit count {} outside supported range 1..={}",
                self.qubits, max_qubits
            )));
        }
        for (position, gate) in self.gates.iter().enumerate() {
            gate.validate(self.qubits).map_err(|e| match e {
                SimError::InvalidCircuitConfig { reason } => {
                    SimError::invalid_config(format!("gate #{}: {}", position, reason))
                }
                other => other,
            })?;
        }
        Ok(())
    }

    /// Same configuration with a rewritten gate list.
    pub(crate) fn with_gates(self, gates: Vec<Gate>) -> Self {
        Self { gates, ..self }
    }
}

//-------------------------------------------------------------------------
// Circuit Builder
//-------------------------------------------------------------------------

/// Builds a [`CircuitConfig`] by method chaining.
///
/// ```
/// use qsim::{CircuitBuilder, OptimizationMode};
///
/// let config = CircuitBuilder::new(2)
///     .hadamard(0)
///     .cnot(0, 1)
///     .error_correction(true)
///     .optimization(OptimizationMode::Speed)
///     .build();
/// assert_eq!(config.len(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct CircuitBuilder {
    config: CircuitConfig,
}

impl CircuitBuilder {
    pub fn new(qubits: usize) -> Self {
        Self { config: CircuitConfig::new(qubits) }
    }

    /// Appends a gate.
    pub fn add_gate(mut self, gate: Gate) -> Self {
        self.config.gates.push(gate);
        self
    }

    /// Appends several gates in order.
    pub fn add_gates<I>(mut self, gates: I) -> Self
    where
        I: IntoIterator<Item = Gate>,
    {
        self.config.gates.extend(gates);
        self
    }

    pub fn hadamard(self, target: usize) -> Self {
        self.add_gate(Gate::Hadamard { target })
    }

    pub fn x(self, target: usize) -> Self {
        self.add_gate(Gate::PauliX { target })
    }

    pub fn y(self, target: usize) -> Self {
        self.add_gate(Gate::PauliY { target })
    }

    pub fn z(self, target: usize) -> Self {
        self.add_gate(Gate::PauliZ { target })
    }

    pub fn cnot(self, control: usize, target: usize) -> Self {
        self.add_gate(Gate::Cnot { control, target })
    }

    pub fn toffoli(self, control1: usize, control2: usize, target: usize) -> Self {
        self.add_gate(Gate::Toffoli { controls: [control1, control2], target })
    }

    pub fn phase(self, target: usize, angle: f64) -> Self {
        self.add_gate(Gate::Phase { target, angle })
    }

    pub fn rotation(self, target: usize, angle: f64) -> Self {
        self.add_gate(Gate::Rotation { target, angle })
    }

    pub fn error_correction(mut self, enabled: bool) -> Self {
        self.config.error_correction = enabled;
        self
    }

    pub fn optimization(mut self, mode: OptimizationMode) -> Self {
        self.config.optimization = mode;
        self
    }

    /// Finalizes the builder. Validation happens when the manager stores it.
    pub fn build(self) -> CircuitConfig {
        self.config
    }
}

//-------------------------------------------------------------------------
// External request form
//-------------------------------------------------------------------------

/// Circuit creation request as sent by orchestration collaborators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CircuitRequest {
    pub id: String,
    pub qubits: usize,
    #[serde(default)]
    pub gates: Vec<GateRequest>,
    #[serde(default)]
    pub error_correction: bool,
    #[serde(default)]
    pub optimization: OptimizationMode,
}

impl CircuitRequest {
    /// Parses every gate request and returns the id with its configuration.
    ///
    /// Unknown gate kinds fail with `UnsupportedGateKind`.
    pub fn into_config(self) -> Result<(String, CircuitConfig)> {
        let gates = self
            .gates
            .iter()
            .map(Gate::from_request)
            .collect::<Result<Vec<_>>>()?;
        let config = CircuitBuilder::new(self.qubits)
            .add_gates(gates)
            .error_correction(self.error_correction)
            .optimization(self.optimization)
            .build();
        Ok((self.id, config))
    }
}

//-------------------------------------------------------------------------
// Text rendering
//-------------------------------------------------------------------------

impl fmt::Display for CircuitConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "qsim::Circuit[{} gates on {} qubits, error correction {}, {:?}]",
            self.gates.len(),
            self.qubits,
            if self.error_correction { "on" } else { "off" },
            self.optimization
        )?;
        if self.gates.is_empty() || self.qubits == 0 {
            return Ok(());
        }

        let num_ops = self.gates.len();
        let num_rows = self.qubits;
        let label_width = format!("q{}", num_rows - 1).len();
        let label_padding = " ".repeat(label_width + 2);

        const GATE_WIDTH: usize = 7;
        const WIRE: &str = "───────";
        const V_WIRE: char = '│';
        const H_WIRE: char = '─';

        // op_grid[row][time] holds the gate or wire segment; v_connect[row][time]
        // holds the connector drawn below that row.
        let mut op_grid: Vec<Vec<String>> = vec![vec![WIRE.to_string(); num_ops]; num_rows];
        let mut v_connect: Vec<Vec<char>> = vec![vec![' '; num_ops]; num_rows];

        fn format_gate(symbol: &str) -> String {
            let slen = symbol.chars().count();
            if slen >= GATE_WIDTH {
                symbol.chars().take(GATE_WIDTH).collect()
            } else {
                let total = GATE_WIDTH - slen;
                let pre = total / 2;
                let post = total - pre;
                format!("{}{}{}", H_WIRE.to_string().repeat(pre), symbol, H_WIRE.to_string().repeat(post))
            }
        }

        for (t, gate) in self.gates.iter().enumerate() {
            let target = gate.target();
            if target >= num_rows {
                continue;
            }
            let symbol = match gate {
                Gate::Cnot { .. } | Gate::Toffoli { .. } => "X",
                _ => gate.name(),
            };
            op_grid[target][t] = format_gate(symbol);

            let mut r_min = target;
            let mut r_max = target;
            for &control in gate.controls() {
                if control < num_rows {
                    op_grid[control][t] = format_gate("@");
                    r_min = r_min.min(control);
                    r_max = r_max.max(control);
                }
            }
            for row in v_connect.iter_mut().take(r_max).skip(r_min) {
                row[t] = V_WIRE;
            }
        }

        for r in 0..num_rows {
            let label = format!("q{}: ", r);
            write!(f, "{:<width$}", label, width = label_width + 2)?;
            writeln!(f, "{}", op_grid[r].join(""))?;

            if r < num_rows - 1 {
                write!(f, "{}", label_padding)?;
                for t in 0..num_ops {
                    let padding = GATE_WIDTH - 1;
                    let pre = padding / 2;
                    let post = padding - pre;
                    write!(f, "{}{}{}", " ".repeat(pre), v_connect[r][t], " ".repeat(post))?;
                }
                writeln!(f)?;
            }
        }
        Ok(())
    }
}

// Keep the Debug impl delegating to Display
impl fmt::Debug for CircuitConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}
