// src/hybrid/mod.rs

//! Classical/quantum round trips.
//!
//! A hybrid call hands the classical payload to a [`ClassicalProcessor`],
//! executes a registered circuit with the quantum input and returns both
//! results side by side.

use crate::core::{Result, SimError};
use crate::manager::CircuitManager;
use crate::simulation::Measurement;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

/// The classical half of a hybrid call.
pub trait ClassicalProcessor: Send + Sync {
    /// Transforms the classical payload. Failures are reported as
    /// `SimError::ClassicalProcessing`.
    fn process(&self, data: &Value) -> Result<Value>;
}

/// Returns the payload unchanged.
#[derive(Debug, Default, Clone, Copy)]
pub struct PassThrough;

impl ClassicalProcessor for PassThrough {
    fn process(&self, data: &Value) -> Result<Value> {
        Ok(data.clone())
    }
}

/// Adapts a closure returning a string error into a processor.
pub struct FnProcessor<F>(pub F);

impl<F> ClassicalProcessor for FnProcessor<F>
where
    F: Fn(&Value) -> std::result::Result<Value, String> + Send + Sync,
{
    fn process(&self, data: &Value) -> Result<Value> {
        (self.0)(data).map_err(|message| SimError::ClassicalProcessing { message })
    }
}

/// Merged outcome of a hybrid call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HybridResult {
    pub classical: Value,
    pub quantum: Vec<Measurement>,
}

/// Deserialisable form of a hybrid call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HybridRequest {
    pub circuit_id: String,
    #[serde(default)]
    pub classical_data: Value,
    #[serde(default)]
    pub quantum_input: Vec<f64>,
}

/// Couples a classical processor with circuits held by a [`CircuitManager`].
#[derive(Clone)]
pub struct HybridBridge {
    manager: Arc<CircuitManager>,
    processor: Arc<dyn ClassicalProcessor>,
}

impl HybridBridge {
    /// Bridge using [`PassThrough`].
    pub fn new(manager: Arc<CircuitManager>) -> Self {
        Self::with_processor(manager, Arc::new(PassThrough))
    }

    pub fn with_processor(manager: Arc<CircuitManager>, processor: Arc<dyn ClassicalProcessor>) -> Self {
        Self { manager, processor }
    }

    pub fn manager(&self) -> &CircuitManager {
        &self.manager
    }

    /// Processes `classical_data`, executes `circuit_id` with `quantum_data`
    /// and merges the two.
    ///
    /// The classical step runs first; if it fails the circuit is not
    /// executed. Execution errors propagate unchanged.
    pub fn hybrid_process(&self, circuit_id: &str, classical_data: Value, quantum_data: &[f64]) -> Result<HybridResult> {
        let classical = self.processor.process(&classical_data)?;
        let quantum = self.manager.execute_circuit(circuit_id, quantum_data)?;
        debug!(circuit = %circuit_id, outcomes = quantum.len(), "hybrid call merged");
        Ok(HybridResult { classical, quantum })
    }

    pub fn handle_request(&self, request: HybridRequest) -> Result<HybridResult> {
        self.hybrid_process(&request.circuit_id, request.classical_data, &request.quantum_input)
    }
}

impl std::fmt::Debug for HybridBridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HybridBridge").field("manager", &self.manager).finish_non_exhaustive()
    }
}
