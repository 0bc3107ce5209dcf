// src/circuits/optimize.rs

//! Static gate-list rewriting applied before a circuit is stored.
//!
//! The pass walks the gate list once, keeping an output stack. Each incoming
//! gate is compared with the most recent kept gate that touches any of its
//! qubits; nothing between the two acts on those wires, so they may be
//! combined:
//! - identical self-inverse gates cancel (H·H, X·X, CNOT·CNOT, ...)
//! - in `Accuracy` mode, same-wire rotations and phases fold into one gate,
//!   and gates whose angle is a multiple of the identity period are dropped.

use super::OptimizationMode;
use crate::operations::Gate;
use std::f64::consts::PI;
use tracing::debug;

/// Angles closer than this to an identity period count as identity.
const ANGLE_TOLERANCE: f64 = 1e-12;

/// Rewrites `gates` according to `mode`. `Speed` returns the list unchanged.
pub fn optimize(gates: &[Gate], mode: OptimizationMode) -> Vec<Gate> {
    if mode == OptimizationMode::Speed {
        return gates.to_vec();
    }
    let fold = mode == OptimizationMode::Accuracy;

    let mut out: Vec<Gate> = Vec::with_capacity(gates.len());
    for gate in gates {
        if fold && is_identity(gate) {
            continue;
        }
        let qubits = gate.involved_qubits();
        let previous = out
            .iter()
            .rposition(|g| g.involved_qubits().iter().any(|q| qubits.contains(q)));

        if let Some(pos) = previous {
            let prev = out[pos];
            if gate.is_self_inverse() && same_operation(&prev, gate) {
                out.remove(pos);
                continue;
            }
            if fold {
                if let Some(merged) = merge_angles(&prev, gate) {
                    if is_identity(&merged) {
                        out.remove(pos);
                    } else {
                        out[pos] = merged;
                    }
                    continue;
                }
            }
        }
        out.push(*gate);
    }

    if out.len() != gates.len() {
        debug!(before = gates.len(), after = out.len(), ?mode, "optimised gate list");
    }
    out
}

/// Same kind on the same operands; Toffoli controls compare as a set.
fn same_operation(a: &Gate, b: &Gate) -> bool {
    match (a, b) {
        (Gate::Toffoli { controls: ca, target: ta }, Gate::Toffoli { controls: cb, target: tb }) => {
            ta == tb && (ca == cb || (ca[0] == cb[1] && ca[1] == cb[0]))
        }
        _ => a == b,
    }
}

fn merge_angles(a: &Gate, b: &Gate) -> Option<Gate> {
    match (a, b) {
        (Gate::Rotation { target: ta, angle: x }, Gate::Rotation { target: tb, angle: y }) if ta == tb => {
            Some(Gate::Rotation { target: *ta, angle: x + y })
        }
        (Gate::Phase { target: ta, angle: x }, Gate::Phase { target: tb, angle: y }) if ta == tb => {
            Some(Gate::Phase { target: *ta, angle: x + y })
        }
        _ => None,
    }
}

/// A rotation by a multiple of 4π or a phase by a multiple of 2π.
fn is_identity(gate: &Gate) -> bool {
    let (angle, period) = match gate {
        Gate::Rotation { angle, .. } => (*angle, 4.0 * PI),
        Gate::Phase { angle, .. } => (*angle, 2.0 * PI),
        _ => return false,
    };
    let r = angle.rem_euclid(period);
    r < ANGLE_TOLERANCE || period - r < ANGLE_TOLERANCE
}
