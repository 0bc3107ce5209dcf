// src/simulation/engine.rs

use crate::core::complex::{self, Amplitude};
use crate::core::{QuantumState, Result};
use crate::decoherence::DecoherenceMonitor;
use crate::operations::Gate;
use num_complex::Complex;
use rayon::prelude::*;
use serde::Serialize;
use std::f64::consts::FRAC_1_SQRT_2;
use tracing::trace;

/// Applies gates to states.
///
/// Every gate is a 2×2 update applied to the amplitude pairs `(i0, i1)` that
/// differ only in the target bit, restricted to indices where every control
/// bit is set. The engine never mutates an amplitude vector in place: each
/// application reads the old vector and returns a state around a new one.
#[derive(Debug, Clone)]
pub struct GateEngine {
    /// At or above this many amplitudes the new vector is computed with rayon.
    parallel_threshold: usize,
}

/// A decoherence detection during a gate run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecoherenceEvent {
    /// Position in the gate list after which coherence was below threshold.
    pub after_gate: usize,
    /// Coherence observed before any correction.
    pub coherence_time: f64,
    /// Whether the error-correction pass replaced the state.
    pub corrected: bool,
}

/// Final state of a gate run and what the monitor saw along the way.
#[derive(Debug, Clone)]
pub struct Evolution {
    pub state: QuantumState,
    pub decoherence: Vec<DecoherenceEvent>,
}

impl GateEngine {
    pub fn new(parallel_threshold: usize) -> Self {
        Self { parallel_threshold: parallel_threshold.max(2) }
    }

    /// Applies one gate and returns the resulting state.
    ///
    /// Fails with `InvalidCircuitConfig` when the gate's operands do not fit
    /// the register. Controlled gates set the advisory entanglement flag.
    pub fn apply_gate(&self, state: QuantumState, gate: &Gate) -> Result<QuantumState> {
        gate.validate(state.qubits())?;
        trace!(%gate, qubits = state.qubits(), "applying gate");

        let old = state.amplitudes();
        let target = gate.target();
        let control_mask = gate.controls().iter().fold(0usize, |mask, c| mask | (1usize << *c));

        let amplitudes = match *gate {
            Gate::Hadamard { .. } => self.pair_update(old, target, 0, |a0, a1| {
                (
                    complex::scale(complex::add(a0, a1), FRAC_1_SQRT_2),
                    complex::scale(complex::add(a0, complex::negate(a1)), FRAC_1_SQRT_2),
                )
            }),
            Gate::PauliX { .. } | Gate::Cnot { .. } | Gate::Toffoli { .. } => {
                self.pair_update(old, target, control_mask, |a0, a1| (a1, a0))
            }
            Gate::PauliY { .. } => {
                let i = Complex::i();
                self.pair_update(old, target, 0, |a0, a1| {
                    (complex::multiply(complex::negate(i), a1), complex::multiply(i, a0))
                })
            }
            Gate::PauliZ { .. } => self.pair_update(old, target, 0, |a0, a1| (a0, complex::negate(a1))),
            Gate::Phase { angle, .. } => {
                let factor = complex::phase_factor(angle);
                self.pair_update(old, target, 0, |a0, a1| (a0, complex::multiply(factor, a1)))
            }
            Gate::Rotation { angle, .. } => {
                let [[m00, m01], [m10, m11]] = rotation_matrix(angle);
                self.pair_update(old, target, 0, |a0, a1| {
                    (
                        complex::add(complex::multiply(m00, a0), complex::multiply(m01, a1)),
                        complex::add(complex::multiply(m10, a0), complex::multiply(m11, a1)),
                    )
                })
            }
        };

        let next = state.with_amplitudes(amplitudes);
        Ok(if control_mask != 0 { next.mark_entangled() } else { next })
    }

    /// Applies `gates` in order, charging coherence for each and consulting
    /// the monitor after each. With `error_correction` set, a decohered state
    /// is replaced by the monitor's corrected state before the next gate.
    pub fn run(
        &self,
        mut state: QuantumState,
        gates: &[Gate],
        monitor: &DecoherenceMonitor,
        error_correction: bool,
    ) -> Result<Evolution> {
        let mut decoherence = Vec::new();
        for (position, gate) in gates.iter().enumerate() {
            state = self.apply_gate(state, gate)?;
            state = monitor.tick(state, gate);

            if monitor.check_decoherence(&state) {
                decoherence.push(DecoherenceEvent {
                    after_gate: position,
                    coherence_time: state.coherence_time(),
                    corrected: error_correction,
                });
                if error_correction {
                    state = monitor.apply_error_correction(state);
                }
            }
        }
        Ok(Evolution { state, decoherence })
    }

    /// Picks the sequential or the data-parallel kernel by vector size.
    fn pair_update<F>(&self, old: &[Amplitude], target: usize, control_mask: usize, f: F) -> Vec<Amplitude>
    where
        F: Fn(Amplitude, Amplitude) -> (Amplitude, Amplitude) + Sync,
    {
        if old.len() >= self.parallel_threshold {
            pair_update_parallel(old, target, control_mask, f)
        } else {
            pair_update_sequential(old, target, control_mask, f)
        }
    }
}

impl Default for GateEngine {
    fn default() -> Self {
        Self::new(crate::core::constants::DEFAULT_PARALLEL_THRESHOLD)
    }
}

/// Visits each pair once from its `i0` (target bit clear) side and writes both
/// results into a copy of the old vector.
fn pair_update_sequential<F>(old: &[Amplitude], target: usize, control_mask: usize, f: F) -> Vec<Amplitude>
where
    F: Fn(Amplitude, Amplitude) -> (Amplitude, Amplitude),
{
    let target_mask = 1usize << target;
    let mut new = old.to_vec();
    for i0 in 0..old.len() {
        if i0 & target_mask != 0 || i0 & control_mask != control_mask {
            continue;
        }
        let i1 = i0 | target_mask;
        let (b0, b1) = f(old[i0], old[i1]);
        new[i0] = b0;
        new[i1] = b1;
    }
    new
}

/// Computes every output index independently from its pair.
fn pair_update_parallel<F>(old: &[Amplitude], target: usize, control_mask: usize, f: F) -> Vec<Amplitude>
where
    F: Fn(Amplitude, Amplitude) -> (Amplitude, Amplitude) + Sync,
{
    let target_mask = 1usize << target;
    (0..old.len())
        .into_par_iter()
        .map(|i| {
            if i & control_mask != control_mask {
                return old[i];
            }
            let i0 = i & !target_mask;
            let (b0, b1) = f(old[i0], old[i0 | target_mask]);
            if i & target_mask == 0 { b0 } else { b1 }
        })
        .collect()
}

/// `[[cos θ/2, −sin θ/2], [sin θ/2, cos θ/2]]`
fn rotation_matrix(angle: f64) -> [[Amplitude; 2]; 2] {
    let (sin, cos) = (angle / 2.0).sin_cos();
    [
        [Complex::new(cos, 0.0), Complex::new(-sin, 0.0)],
        [Complex::new(sin, 0.0), Complex::new(cos, 0.0)],
    ]
}
