// src/simulation/mod.rs

//! Runs circuits against state vectors.
//!
//! [`Simulator`] bundles the gate engine, the decoherence monitor and the
//! configuration they share. It is stateless between calls: the
//! [`CircuitManager`](crate::manager::CircuitManager) owns persisted states and
//! drives a `Simulator` to advance them.

pub mod engine;
mod results;

pub use engine::{DecoherenceEvent, Evolution, GateEngine};
pub use results::{Measurement, SimulationResult, collapse, measure, sample_outcome};

use crate::circuits::{CircuitConfig, optimize};
use crate::config::SimulatorConfig;
use crate::core::{QuantumState, Result, SimError};
use crate::decoherence::{DecoherenceMonitor, ErrorCorrection};
use crate::operations::Gate;
use std::sync::Arc;
use tracing::debug;

/// Stateless entry point for simulating circuits.
#[derive(Debug, Clone)]
pub struct Simulator {
    config: SimulatorConfig,
    engine: GateEngine,
    monitor: DecoherenceMonitor,
}

impl Default for Simulator {
    fn default() -> Self {
        let config = SimulatorConfig::default();
        Self {
            engine: GateEngine::new(config.parallel_threshold),
            monitor: DecoherenceMonitor::new(&config),
            config,
        }
    }
}

impl Simulator {
    /// Creates a simulator after validating `config`.
    pub fn new(config: SimulatorConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            engine: GateEngine::new(config.parallel_threshold),
            monitor: DecoherenceMonitor::new(&config),
            config,
        })
    }

    /// Creates a simulator whose error correction uses `strategy`.
    pub fn with_error_correction(config: SimulatorConfig, strategy: Arc<dyn ErrorCorrection>) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            engine: GateEngine::new(config.parallel_threshold),
            monitor: DecoherenceMonitor::with_strategy(&config, strategy),
            config,
        })
    }

    pub fn config(&self) -> &SimulatorConfig {
        &self.config
    }

    pub fn monitor(&self) -> &DecoherenceMonitor {
        &self.monitor
    }

    /// `|0…0⟩` over `qubits` qubits with the configured coherence.
    pub fn initial_state(&self, qubits: usize) -> Result<QuantumState> {
        QuantumState::new(qubits, self.config.max_qubits, self.config.initial_coherence)
    }

    /// Applies one gate. No coherence is charged.
    pub fn apply_gate(&self, state: QuantumState, gate: &Gate) -> Result<QuantumState> {
        self.engine.apply_gate(state, gate)
    }

    /// Angle-encodes classical values: value `k` rotates qubit `k` by that
    /// angle. Zeros are skipped. Encoding does not charge coherence.
    ///
    /// Fails with `InvalidClassicalInput` for non-finite values or more values
    /// than qubits.
    pub fn encode_input(&self, mut state: QuantumState, input: &[f64]) -> Result<QuantumState> {
        if input.len() > state.qubits() {
            return Err(SimError::InvalidClassicalInput {
                reason: format!("{} values for a register of {} qubits", input.len(), state.qubits()),
            });
        }
        if let Some(position) = input.iter().position(|v| !v.is_finite()) {
            return Err(SimError::InvalidClassicalInput {
                reason: format!("value at position {} is not finite", position),
            });
        }
        for (target, &angle) in input.iter().enumerate() {
            if angle != 0.0 {
                state = self.engine.apply_gate(state, &Gate::Rotation { target, angle })?;
            }
        }
        Ok(state)
    }

    /// Runs the circuit's gates on `state` with decoherence monitoring.
    pub fn evolve(&self, state: QuantumState, circuit: &CircuitConfig) -> Result<Evolution> {
        if state.qubits() != circuit.qubits() {
            return Err(SimError::invalid_config(format!(
                "circuit expects {} qubits but the state has {}",
                circuit.qubits(),
                state.qubits()
            )));
        }
        self.engine.run(state, circuit.gates(), &self.monitor, circuit.error_correction())
    }

    /// Validates and (per its optimisation mode) rewrites a configuration.
    pub fn prepare(&self, circuit: CircuitConfig) -> Result<CircuitConfig> {
        circuit.validate(self.config.max_qubits)?;
        let gates = optimize(circuit.gates(), circuit.optimization());
        Ok(circuit.with_gates(gates))
    }

    /// One-shot simulation from `|0…0⟩`: prepare, evolve and measure.
    ///
    /// ```
    /// use qsim::{CircuitBuilder, Simulator};
    ///
    /// let circuit = CircuitBuilder::new(2).hadamard(0).cnot(0, 1).build();
    /// let result = Simulator::default().run(&circuit).unwrap();
    /// assert_eq!(result.measurements().len(), 2);
    /// assert!((result.probability_of(0b11).unwrap() - 0.5).abs() < 1e-9);
    /// ```
    pub fn run(&self, circuit: &CircuitConfig) -> Result<SimulationResult> {
        let circuit = self.prepare(circuit.clone())?;
        let state = self.initial_state(circuit.qubits())?;
        let evolution = self.evolve(state, &circuit)?;
        let measurements = measure(&evolution.state);
        debug!(gates = circuit.len(), outcomes = measurements.len(), "circuit simulated");
        Ok(SimulationResult::new(measurements, evolution.state, evolution.decoherence))
    }
}
