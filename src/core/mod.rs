// src/core/mod.rs

//! Core data structures and types

pub mod complex;
pub mod error;
pub mod state;

// Re-export public types for convenient access via `qsim::core::TypeName`
pub use complex::Amplitude;
pub use error::{Result, SimError};
pub use state::QuantumState;

pub mod constants;
pub use constants::{ABSOLUTE_MAX_QUBITS, DEFAULT_MAX_QUBITS, MEASUREMENT_EPSILON, NORM_TOLERANCE};
