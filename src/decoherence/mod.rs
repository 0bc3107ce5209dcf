// src/decoherence/mod.rs

//! Decoherence tracking and error correction.
//!
//! Coherence is modelled as a counter on the state that gates deplete in
//! noisy mode. The monitor reports when it has fallen below a threshold; the
//! circuit's error-correction flag decides whether a correction strategy then
//! replaces the state.

use crate::config::{SimulationMode, SimulatorConfig};
use crate::core::complex;
use crate::core::QuantumState;
use crate::operations::Gate;
use std::fmt;
use std::sync::Arc;

/// A correction pass run on a decohered state.
///
/// Implementations must preserve the register width and return a state whose
/// coherence has been restored toward its initial value.
pub trait ErrorCorrection: Send + Sync {
    fn name(&self) -> &'static str;

    fn correct(&self, state: QuantumState) -> QuantumState;
}

/// Restores coherence and leaves the amplitudes untouched.
#[derive(Debug, Default, Clone, Copy)]
pub struct CoherenceRestore;

impl ErrorCorrection for CoherenceRestore {
    fn name(&self) -> &'static str {
        "coherence-restore"
    }

    fn correct(&self, state: QuantumState) -> QuantumState {
        let initial = state.initial_coherence();
        state.with_coherence_time(initial)
    }
}

/// Restores coherence and rescales the amplitudes to unit norm, removing
/// accumulated rounding drift.
#[derive(Debug, Default, Clone, Copy)]
pub struct Renormalize;

impl ErrorCorrection for Renormalize {
    fn name(&self) -> &'static str {
        "renormalize"
    }

    fn correct(&self, state: QuantumState) -> QuantumState {
        let norm = state.norm_sqr().sqrt();
        let initial = state.initial_coherence();
        if norm > 0.0 && (norm - 1.0).abs() > f64::EPSILON {
            let rescaled = state.amplitudes().iter().map(|a| complex::scale(*a, 1.0 / norm)).collect();
            state.with_amplitudes(rescaled).with_coherence_time(initial)
        } else {
            state.with_coherence_time(initial)
        }
    }
}

/// Watches coherence and applies the configured correction strategy.
#[derive(Clone)]
pub struct DecoherenceMonitor {
    mode: SimulationMode,
    threshold: f64,
    decay_per_gate: f64,
    strategy: Arc<dyn ErrorCorrection>,
}

impl DecoherenceMonitor {
    /// Monitor using [`CoherenceRestore`].
    pub fn new(config: &SimulatorConfig) -> Self {
        Self::with_strategy(config, Arc::new(CoherenceRestore))
    }

    pub fn with_strategy(config: &SimulatorConfig, strategy: Arc<dyn ErrorCorrection>) -> Self {
        Self {
            mode: config.mode,
            threshold: config.decoherence_threshold,
            decay_per_gate: config.decay_per_gate,
            strategy,
        }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn strategy_name(&self) -> &'static str {
        self.strategy.name()
    }

    /// Charges the coherence cost of `gate`: `decay_per_gate` per qubit the
    /// gate touches in noisy mode, nothing in ideal mode.
    pub fn tick(&self, state: QuantumState, gate: &Gate) -> QuantumState {
        match self.mode {
            SimulationMode::Ideal => state,
            SimulationMode::Noisy => {
                let remaining = state.coherence_time() - self.decay_per_gate * gate.arity() as f64;
                state.with_coherence_time(remaining)
            }
        }
    }

    /// True when coherence has fallen below the threshold.
    pub fn check_decoherence(&self, state: &QuantumState) -> bool {
        state.coherence_time() < self.threshold
    }

    /// Runs the correction strategy.
    pub fn apply_error_correction(&self, state: QuantumState) -> QuantumState {
        self.strategy.correct(state)
    }
}

impl fmt::Debug for DecoherenceMonitor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecoherenceMonitor")
            .field("mode", &self.mode)
            .field("threshold", &self.threshold)
            .field("decay_per_gate", &self.decay_per_gate)
            .field("strategy", &self.strategy.name())
            .finish()
    }
}
