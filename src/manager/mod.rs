// src/manager/mod.rs

//! Registry of named circuits and their persisted states.
//!
//! Each circuit id maps to an entry holding its prepared configuration and the
//! state left behind by its last execution, so repeated executions continue
//! from where the previous one stopped. Entries sit behind their own lock:
//! executions on one id run one at a time while different ids proceed in
//! parallel.

use crate::circuits::{CircuitConfig, CircuitRequest};
use crate::config::SimulatorConfig;
use crate::core::{QuantumState, Result, SimError};
use crate::simulation::{DecoherenceEvent, Measurement, Simulator, measure};
use crate::telemetry::{LifecycleEvent, Telemetry, TelemetryEvent};
use crate::validation;
use dashmap::DashMap;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// Where a circuit is in its lifecycle. Unknown ids have no status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CircuitStatus {
    /// Created or reset, never executed since.
    Created,
    /// An execution currently holds the circuit.
    Executing,
    /// Executed at least once and not currently running.
    Idle,
}

impl fmt::Display for CircuitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CircuitStatus::Created => "created",
            CircuitStatus::Executing => "executing",
            CircuitStatus::Idle => "idle",
        };
        write!(f, "{}", name)
    }
}

/// Deserialisable form of an execution call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionRequest {
    pub circuit_id: String,
    #[serde(default)]
    pub classical_input: Vec<f64>,
}

#[derive(Debug)]
struct CircuitEntry {
    config: CircuitConfig,
    state: QuantumState,
    status: CircuitStatus,
}

/// Owns every registered circuit and drives a [`Simulator`] over them.
pub struct CircuitManager {
    circuits: DashMap<String, Arc<Mutex<CircuitEntry>>>,
    simulator: Simulator,
    telemetry: Telemetry,
}

impl CircuitManager {
    /// Manager reporting through the default (tracing) telemetry.
    pub fn new(config: SimulatorConfig) -> Result<Self> {
        Self::with_telemetry(config, Telemetry::default())
    }

    pub fn with_telemetry(config: SimulatorConfig, telemetry: Telemetry) -> Result<Self> {
        telemetry.lifecycle(LifecycleEvent::Initializing);
        let simulator = Simulator::new(config)?;
        Ok(Self::from_parts(simulator, telemetry))
    }

    /// Manager around an already configured simulator.
    pub fn from_parts(simulator: Simulator, telemetry: Telemetry) -> Self {
        telemetry.lifecycle(LifecycleEvent::Initialized { max_qubits: simulator.config().max_qubits });
        Self { circuits: DashMap::new(), simulator, telemetry }
    }

    pub fn simulator(&self) -> &Simulator {
        &self.simulator
    }

    pub fn telemetry(&self) -> &Telemetry {
        &self.telemetry
    }

    /// Validates, optimises and registers a circuit under `id`, starting from
    /// `|0…0⟩`. Re-creating an existing id replaces it.
    ///
    /// Fails with `InvalidCircuitConfig` when the qubit count is outside
    /// `1..=max_qubits` or a gate does not fit the register.
    pub fn create_circuit(&self, id: impl Into<String>, config: CircuitConfig) -> Result<()> {
        let id = id.into();
        let config = self.simulator.prepare(config)?;
        let state = self.simulator.initial_state(config.qubits())?;
        let (qubits, gates) = (config.qubits(), config.len());

        let entry = CircuitEntry { config, state, status: CircuitStatus::Created };
        if self.circuits.insert(id.clone(), Arc::new(Mutex::new(entry))).is_some() {
            debug!(circuit = %id, "replaced existing circuit");
        }
        self.telemetry.lifecycle(LifecycleEvent::CircuitCreated { id, qubits, gates });
        Ok(())
    }

    /// Parses a [`CircuitRequest`] and registers it. Returns the circuit id.
    pub fn create_from_request(&self, request: CircuitRequest) -> Result<String> {
        let (id, config) = request.into_config()?;
        self.create_circuit(id.clone(), config)?;
        Ok(id)
    }

    /// Runs the circuit from its persisted state and returns the measurement
    /// summary. The resulting state becomes the circuit's new current state.
    ///
    /// Waits for any execution already running on the same id.
    pub fn execute_circuit(&self, id: &str, classical_input: &[f64]) -> Result<Vec<Measurement>> {
        let entry = self.entry(id)?;
        let mut guard = entry.lock();
        self.execute_locked(id, &mut guard, classical_input)
    }

    /// Like [`execute_circuit`](Self::execute_circuit) but fails with
    /// `CircuitBusy` instead of waiting when the circuit is executing.
    pub fn try_execute_circuit(&self, id: &str, classical_input: &[f64]) -> Result<Vec<Measurement>> {
        let entry = self.entry(id)?;
        let mut guard = entry.try_lock().ok_or_else(|| SimError::CircuitBusy { id: id.to_string() })?;
        self.execute_locked(id, &mut guard, classical_input)
    }

    pub fn handle_execution(&self, request: &ExecutionRequest) -> Result<Vec<Measurement>> {
        self.execute_circuit(&request.circuit_id, &request.classical_input)
    }

    /// Unregisters `id` and returns its configuration. An execution already
    /// running on it completes against the detached entry.
    pub fn remove_circuit(&self, id: &str) -> Result<CircuitConfig> {
        let (id, entry) = self.circuits.remove(id).ok_or_else(|| SimError::not_found(id))?;
        let config = entry.lock().config.clone();
        self.telemetry.lifecycle(LifecycleEvent::CircuitRemoved { id });
        Ok(config)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.circuits.contains_key(id)
    }

    /// Registered ids, sorted.
    pub fn circuit_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.circuits.iter().map(|e| e.key().clone()).collect();
        ids.sort();
        ids
    }

    pub fn len(&self) -> usize {
        self.circuits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.circuits.is_empty()
    }

    /// Current status of `id`. Does not wait on a running execution.
    pub fn status(&self, id: &str) -> Result<CircuitStatus> {
        let entry = self.entry(id)?;
        let status = entry.try_lock().map_or(CircuitStatus::Executing, |guard| guard.status);
        Ok(status)
    }

    /// The prepared (validated and optimised) configuration of `id`.
    pub fn config(&self, id: &str) -> Result<CircuitConfig> {
        let entry = self.entry(id)?;
        let config = entry.lock().config.clone();
        Ok(config)
    }

    /// Snapshot of the persisted state of `id`.
    pub fn current_state(&self, id: &str) -> Result<QuantumState> {
        let entry = self.entry(id)?;
        let state = entry.lock().state.clone();
        Ok(state)
    }

    /// Puts `id` back to `|0…0⟩` with full coherence.
    pub fn reset_circuit(&self, id: &str) -> Result<()> {
        let entry = self.entry(id)?;
        let mut guard = entry.lock();
        guard.state = self.simulator.initial_state(guard.config.qubits())?;
        guard.status = CircuitStatus::Created;
        debug!(circuit = %id, "circuit reset");
        Ok(())
    }

    /// Clones the entry handle so the map shard is released before locking.
    fn entry(&self, id: &str) -> Result<Arc<Mutex<CircuitEntry>>> {
        self.circuits
            .get(id)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| SimError::not_found(id))
    }

    fn execute_locked(&self, id: &str, entry: &mut CircuitEntry, classical_input: &[f64]) -> Result<Vec<Measurement>> {
        let stopwatch = self.telemetry.start();

        let state = self.simulator.encode_input(entry.state.clone(), classical_input)?;
        let evolution = self.simulator.evolve(state, &entry.config)?;
        self.report_decoherence(id, &evolution.decoherence);

        if let Err(e) = validation::check_normalization(&evolution.state, None) {
            warn!(circuit = %id, error = %e, "state norm drifted");
        }
        let measurements = measure(&evolution.state);
        entry.state = evolution.state;
        entry.status = CircuitStatus::Idle;

        self.telemetry.finish(stopwatch, "execute_circuit", self.simulator.config().latency_budget());
        self.telemetry.lifecycle(LifecycleEvent::CircuitExecuted {
            id: id.to_string(),
            outcomes: measurements.len(),
        });
        Ok(measurements)
    }

    /// Reports every corrected detection and only the first uncorrected one,
    /// since without correction every later gate stays below threshold.
    fn report_decoherence(&self, id: &str, events: &[DecoherenceEvent]) {
        let mut uncorrected_seen = false;
        for event in events {
            if !event.corrected {
                if uncorrected_seen {
                    continue;
                }
                uncorrected_seen = true;
            }
            self.telemetry.record(TelemetryEvent::DecoherenceDetected {
                circuit: id.to_string(),
                coherence_time: event.coherence_time,
                corrected: event.corrected,
            });
        }
    }
}

impl fmt::Debug for CircuitManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CircuitManager")
            .field("circuits", &self.circuit_ids())
            .field("simulator", &self.simulator)
            .finish_non_exhaustive()
    }
}
