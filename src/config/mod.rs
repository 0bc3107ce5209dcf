// src/config/mod.rs

//! Simulator-wide settings.

use crate::core::constants::{
    ABSOLUTE_MAX_QUBITS, DEFAULT_DECAY_PER_GATE, DEFAULT_DECOHERENCE_THRESHOLD,
    DEFAULT_INITIAL_COHERENCE, DEFAULT_MAX_QUBITS, DEFAULT_PARALLEL_THRESHOLD,
};
use crate::core::{Result, SimError};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Whether gates consume simulated coherence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SimulationMode {
    /// Coherence never decays; the decoherence monitor never fires.
    Ideal,
    /// Every gate costs `decay_per_gate` per qubit it touches.
    #[default]
    Noisy,
}

/// Settings shared by the engine, the decoherence monitor and the manager.
///
/// Missing fields take their defaults when deserialised.
///
/// ```
/// use qsim::SimulatorConfig;
///
/// let config = SimulatorConfig::from_json(r#"{"max_qubits": 12, "mode": "ideal"}"#).unwrap();
/// assert_eq!(config.max_qubits, 12);
/// assert_eq!(config.decoherence_threshold, 100.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulatorConfig {
    /// Widest register a circuit may request.
    pub max_qubits: usize,
    pub mode: SimulationMode,
    /// Coherence every new state starts with.
    pub initial_coherence: f64,
    /// Coherence below which a state counts as decohered.
    pub decoherence_threshold: f64,
    /// Coherence lost per qubit touched by a gate in noisy mode.
    pub decay_per_gate: f64,
    /// Amplitude count at which gate kernels go data-parallel.
    pub parallel_threshold: usize,
    /// Advisory execution budget in microseconds.
    pub latency_budget_micros: u64,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            max_qubits: DEFAULT_MAX_QUBITS,
            mode: SimulationMode::default(),
            initial_coherence: DEFAULT_INITIAL_COHERENCE,
            decoherence_threshold: DEFAULT_DECOHERENCE_THRESHOLD,
            decay_per_gate: DEFAULT_DECAY_PER_GATE,
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
            latency_budget_micros: 1_000,
        }
    }
}

impl SimulatorConfig {
    /// Parses a JSON document and validates it.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json).map_err(|e| SimError::Config { reason: e.to_string() })?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_max_qubits(mut self, max_qubits: usize) -> Self {
        self.max_qubits = max_qubits;
        self
    }

    pub fn with_mode(mut self, mode: SimulationMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_initial_coherence(mut self, coherence: f64) -> Self {
        self.initial_coherence = coherence;
        self
    }

    pub fn with_decoherence_threshold(mut self, threshold: f64) -> Self {
        self.decoherence_threshold = threshold;
        self
    }

    pub fn with_decay_per_gate(mut self, decay: f64) -> Self {
        self.decay_per_gate = decay;
        self
    }

    pub fn with_parallel_threshold(mut self, threshold: usize) -> Self {
        self.parallel_threshold = threshold;
        self
    }

    pub fn with_latency_budget(mut self, budget: Duration) -> Self {
        self.latency_budget_micros = u64::try_from(budget.as_micros()).unwrap_or(u64::MAX);
        self
    }

    /// Advisory execution budget.
    pub fn latency_budget(&self) -> Duration {
        Duration::from_micros(self.latency_budget_micros)
    }

    /// Rejects values the simulator cannot honour.
    pub fn validate(&self) -> Result<()> {
        if self.max_qubits == 0 || self.max_qubits > ABSOLUTE_MAX_QUBITS {
            return Err(SimError::Config {
                reason: format!("max_qubits must be in 1..={}, got {}", ABSOLUTE_MAX_QUBITS, self.max_qubits),
            });
        }
        for (name, value) in [
            ("initial_coherence", self.initial_coherence),
            ("decoherence_threshold", self.decoherence_threshold),
            ("decay_per_gate", self.decay_per_gate),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(SimError::Config {
                    reason: format!("{} must be a finite non-negative number, got {}", name, value),
                });
            }
        }
        if self.parallel_threshold < 2 {
            return Err(SimError::Config { reason: "parallel_threshold must be at least 2".to_string() });
        }
        Ok(())
    }
}
