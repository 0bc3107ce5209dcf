// src/core/state.rs

use super::complex::Amplitude;
use super::constants::ABSOLUTE_MAX_QUBITS;
use super::error::{Result, SimError};
use num_complex::Complex;
use num_traits::{One, Zero};
use serde::Serialize;
use std::fmt;

/// Dense state vector of an `n`-qubit register plus simulation bookkeeping.
///
/// Amplitude index `i` encodes the basis state whose qubit `b` (0 = least
/// significant) has value `(i >> b) & 1`.
///
/// A `QuantumState` is a value: the gate engine consumes one and returns a new
/// one built around a freshly computed amplitude vector. Nothing mutates an
/// amplitude vector that another holder can still observe.
#[derive(Debug, Clone, PartialEq, Serialize)] // Avoid Eq for floating-point amplitudes
pub struct QuantumState {
    amplitudes: Vec<Amplitude>,
    qubits: usize,
    /// Advisory only: set when a controlled gate has been applied.
    entangled: bool,
    /// Remaining simulated coherence, never negative.
    coherence_time: f64,
    initial_coherence: f64,
}

impl QuantumState {
    /// Creates the `|0…0⟩` state of `qubits` qubits.
    ///
    /// Fails with [`SimError::InvalidQubitCount`] when `qubits` is zero or above
    /// `max_qubits`. `max_qubits` itself is clamped to
    /// [`ABSOLUTE_MAX_QUBITS`](super::constants::ABSOLUTE_MAX_QUBITS).
    pub fn new(qubits: usize, max_qubits: usize, initial_coherence: f64) -> Result<Self> {
        let max = max_qubits.min(ABSOLUTE_MAX_QUBITS);
        if qubits == 0 || qubits > max {
            return Err(SimError::InvalidQubitCount { requested: qubits, max });
        }
        let dim = 1usize << qubits;
        let mut amplitudes = vec![Complex::zero(); dim];
        amplitudes[0] = Complex::one();

        let coherence = initial_coherence.max(0.0);
        Ok(Self {
            amplitudes,
            qubits,
            entangled: false,
            coherence_time: coherence,
            initial_coherence: coherence,
        })
    }

    /// Builds a state directly from an amplitude vector. Test-only.
    #[cfg(test)]
    pub(crate) fn from_amplitudes(amplitudes: Vec<Amplitude>, initial_coherence: f64) -> Result<Self> {
        let dim = amplitudes.len();
        if dim < 2 || !dim.is_power_of_two() {
            return Err(SimError::InvalidQubitCount { requested: 0, max: ABSOLUTE_MAX_QUBITS });
        }
        Ok(Self {
            amplitudes,
            qubits: dim.trailing_zeros() as usize,
            entangled: false,
            coherence_time: initial_coherence,
            initial_coherence,
        })
    }

    /// Read-only access to the amplitude vector.
    pub fn amplitudes(&self) -> &[Amplitude] {
        &self.amplitudes
    }

    /// Number of qubits in the register.
    pub fn qubits(&self) -> usize {
        self.qubits
    }

    /// Number of amplitudes, `2^qubits`.
    pub fn dim(&self) -> usize {
        self.amplitudes.len()
    }

    pub fn is_entangled(&self) -> bool {
        self.entangled
    }

    pub fn coherence_time(&self) -> f64 {
        self.coherence_time
    }

    pub fn initial_coherence(&self) -> f64 {
        self.initial_coherence
    }

    /// `Σ|a_i|²`. Equals 1 up to rounding for every state the engine produces.
    pub fn norm_sqr(&self) -> f64 {
        self.amplitudes.iter().map(|a| a.norm_sqr()).sum()
    }

    /// Born-rule probability of every basis state, in index order.
    pub fn probabilities(&self) -> Vec<f64> {
        self.amplitudes.iter().map(|a| a.norm_sqr()).collect()
    }

    /// Replaces the amplitude vector, keeping the bookkeeping.
    pub(crate) fn with_amplitudes(self, amplitudes: Vec<Amplitude>) -> Self {
        debug_assert_eq!(amplitudes.len(), self.amplitudes.len());
        Self { amplitudes, ..self }
    }

    /// Sets the remaining coherence, clamped at zero.
    pub(crate) fn with_coherence_time(self, coherence_time: f64) -> Self {
        Self { coherence_time: coherence_time.max(0.0), ..self }
    }

    pub(crate) fn mark_entangled(self) -> Self {
        Self { entangled: true, ..self }
    }
}

impl fmt::Display for QuantumState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "State[{}q, coherence {:.1}: ", self.qubits, self.coherence_time)?;
        for (i, c) in self.amplitudes.iter().enumerate() {
            write!(f, "{}{:.4}", if i > 0 { ", " } else { "" }, c)?;
        }
        write!(f, "]")
    }
}
