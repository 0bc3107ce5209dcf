//! Error handling logic

use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, SimError>;

/// Failures surfaced by the simulator.
///
/// Every variant is an immediate, synchronous failure. Simulation is
/// deterministic, so nothing here is retried internally; callers translate
/// these into their own user-facing messages.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimError {
    /// Qubit count outside the supported range `1..=max`.
    #[error("Invalid qubit count {requested}: supported range is 1..={max}")]
    InvalidQubitCount {
        /// The rejected qubit count
        requested: usize,
        /// The maximum in force when the request was made
        max: usize,
    },

    /// Malformed gate list, qubit bound violation or otherwise unusable circuit.
    #[error("Invalid circuit configuration: {reason}")]
    InvalidCircuitConfig {
        /// What was wrong with the configuration
        reason: String,
    },

    /// Execution requested against an id the manager does not know.
    #[error("Circuit '{id}' not found")]
    CircuitNotFound {
        /// The unknown circuit id
        id: String,
    },

    /// A gate request named a kind the engine cannot dispatch.
    #[error("Unsupported gate kind '{kind}'")]
    UnsupportedGateKind {
        /// The kind name as received
        kind: String,
    },

    /// Classical input that cannot be encoded into the register.
    #[error("Invalid classical input: {reason}")]
    InvalidClassicalInput {
        /// Why the input was rejected
        reason: String,
    },

    /// A non-blocking execution found the circuit already executing.
    #[error("Circuit '{id}' is busy executing")]
    CircuitBusy {
        /// The contended circuit id
        id: String,
    },

    /// The classical collaborator of a hybrid call failed.
    #[error("Classical processing failed: {message}")]
    ClassicalProcessing {
        /// Failure message from the collaborator
        message: String,
    },

    /// Rejected simulator configuration.
    #[error("Invalid simulator configuration: {reason}")]
    Config {
        /// What was wrong with the configuration
        reason: String,
    },

    /// Amplitude norm deviates from 1 beyond the requested tolerance.
    #[error("State vector normalization failed: sum(|a_i|^2) = {norm} (deviation > {tolerance})")]
    NormDrift {
        /// Observed squared norm
        norm: f64,
        /// Tolerance that was exceeded
        tolerance: f64,
    },
}

impl SimError {
    /// Shorthand for building an `InvalidCircuitConfig` error.
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidCircuitConfig { reason: reason.into() }
    }

    /// Shorthand for building a `CircuitNotFound` error.
    pub fn not_found(id: impl Into<String>) -> Self {
        Self::CircuitNotFound { id: id.into() }
    }
}
