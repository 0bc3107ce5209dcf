// src/validation/mod.rs

//! Numerical health checks on `QuantumState`.
//!
//! Drift is never an error on the simulation path; these checks let callers
//! and tests assert on it explicitly.

use crate::core::constants::NORM_TOLERANCE;
use crate::core::{QuantumState, Result, SimError};

/// Checks that `Σ|a_i|²` is within `tolerance` (default `1e-9`) of 1.
///
/// # Returns
/// * `Ok(())` if normalized within tolerance.
/// * `Err(SimError::NormDrift)` otherwise.
pub fn check_normalization(state: &QuantumState, tolerance: Option<f64>) -> Result<()> {
    let tolerance = tolerance.unwrap_or(NORM_TOLERANCE);
    let norm = state.norm_sqr();
    if (norm - 1.0).abs() > tolerance || !norm.is_finite() {
        Err(SimError::NormDrift { norm, tolerance })
    } else {
        Ok(())
    }
}

/// True when no amplitude component is NaN or infinite.
pub fn is_finite(state: &QuantumState) -> bool {
    state.amplitudes().iter().all(|a| a.re.is_finite() && a.im.is_finite())
}

/// Deviation of `Σ|a_i|²` from 1.
pub fn norm_drift(state: &QuantumState) -> f64 {
    (state.norm_sqr() - 1.0).abs()
}

/// Runs every check: finiteness, then normalization.
pub fn validate_state(state: &QuantumState, norm_tolerance: Option<f64>) -> Result<()> {
    if !is_finite(state) {
        return Err(SimError::NormDrift { norm: f64::NAN, tolerance: norm_tolerance.unwrap_or(NORM_TOLERANCE) });
    }
    check_normalization(state, norm_tolerance)
}
