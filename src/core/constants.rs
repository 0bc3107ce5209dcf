//! Numeric constants shared across the simulator.

/// Hard ceiling on register width. A dense vector of 2^26 `Complex<f64>`
/// already occupies 1 GiB.
pub const ABSOLUTE_MAX_QUBITS: usize = 26;

/// Default register width limit used when no configuration overrides it.
pub const DEFAULT_MAX_QUBITS: usize = 24;

/// Tolerance for the unit-norm invariant.
pub const NORM_TOLERANCE: f64 = 1e-9;

/// Outcomes at or below this probability are dropped from a measurement summary.
pub const MEASUREMENT_EPSILON: f64 = 0.001;

/// Default simulated coherence a freshly created state starts with.
pub const DEFAULT_INITIAL_COHERENCE: f64 = 1000.0;

/// Default coherence level below which a state counts as decohered.
pub const DEFAULT_DECOHERENCE_THRESHOLD: f64 = 100.0;

/// Default coherence lost per qubit touched by a gate in noisy mode.
pub const DEFAULT_DECAY_PER_GATE: f64 = 10.0;

/// Amplitude count at which gate kernels switch to the rayon path.
pub const DEFAULT_PARALLEL_THRESHOLD: usize = 1 << 14;
