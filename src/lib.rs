// src/lib.rs

//! `qsim` - A state-vector quantum circuit simulator
//!
//! This library simulates small quantum registers as dense complex amplitude
//! vectors. It applies a fixed gate set, tracks a simulated coherence budget
//! with optional error correction, keeps named circuits with persisted
//! state and couples them with classical processing.

pub mod core;
pub mod operations;
pub mod circuits;
pub mod simulation;
pub mod decoherence;
pub mod manager;
pub mod hybrid;
pub mod telemetry;
pub mod config;
pub mod validation;

// Re-export the most common types for easier top-level use
pub use core::{Amplitude, QuantumState, Result, SimError};
pub use operations::{Gate, GateRequest};
pub use circuits::{CircuitBuilder, CircuitConfig, CircuitRequest, OptimizationMode};
pub use simulation::{Measurement, SimulationResult, Simulator, measure};
pub use decoherence::{DecoherenceMonitor, ErrorCorrection};
pub use manager::{CircuitManager, CircuitStatus, ExecutionRequest};
pub use hybrid::{ClassicalProcessor, HybridBridge, HybridRequest, HybridResult};
pub use telemetry::{Telemetry, TelemetryEvent, TelemetrySink};
pub use config::{SimulationMode, SimulatorConfig};
pub use validation::{check_normalization, validate_state};

// Example 1: Bell pair through the one-shot simulator
// H on qubit 0 followed by CNOT(0 -> 1) leaves |00> and |11> equally likely.
/// ```
/// use qsim::{CircuitBuilder, Simulator, SimError};
///
/// let circuit = CircuitBuilder::new(2).hadamard(0).cnot(0, 1).build();
/// let result = Simulator::default().run(&circuit)?;
/// println!("Circuit:\n{}", circuit);
/// println!("{}", result);
///
/// assert_eq!(result.measurements().len(), 2);
/// assert!((result.probability_of(0b00).unwrap() - 0.5).abs() < 1e-9);
/// assert!((result.probability_of(0b11).unwrap() - 0.5).abs() < 1e-9);
/// assert!(result.final_state().is_entangled());
/// # Ok::<(), SimError>(())
/// ```
#[doc(hidden)]
const _: () = (); // Attaches the preceding doc comment block to a hidden item

// Example 2: Persisted circuits
// A registered circuit continues from the state its previous run left behind,
// so running H twice returns to |0>.
/// ```
/// use qsim::{CircuitBuilder, CircuitManager, SimError, SimulatorConfig};
///
/// let manager = CircuitManager::new(SimulatorConfig::default())?;
/// manager.create_circuit("h", CircuitBuilder::new(1).hadamard(0).build())?;
///
/// let first = manager.execute_circuit("h", &[])?;
/// assert_eq!(first.len(), 2);
/// let second = manager.execute_circuit("h", &[])?;
/// assert_eq!(second[0].state, 0);
/// assert!((second[0].probability - 1.0).abs() < 1e-9);
/// # Ok::<(), SimError>(())
/// ```
#[doc(hidden)]
const _: () = (); // Attaches the preceding doc comment block to a hidden item
