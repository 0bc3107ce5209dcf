// tests/manager_tests.rs

use qsim::telemetry::{LifecycleEvent, MemorySink, SystemClock};
use qsim::{
    CircuitBuilder, CircuitManager, CircuitRequest, CircuitStatus, ExecutionRequest, HybridBridge, SimError,
    SimulatorConfig, Telemetry, TelemetryEvent,
};
use serde_json::json;
use std::f64::consts::PI;
use std::sync::Arc;
use std::thread;

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_env_filter("qsim=debug").with_test_writer().try_init();
}

fn manager() -> CircuitManager {
    init_tracing();
    CircuitManager::new(SimulatorConfig::default()).unwrap()
}

#[test]
fn test_execution_continues_from_persisted_state() -> Result<(), SimError> {
    let manager = manager();
    manager.create_circuit("h", CircuitBuilder::new(1).hadamard(0).build())?;

    let first = manager.execute_circuit("h", &[])?;
    assert_eq!(first.len(), 2);
    assert!(first.iter().all(|m| (m.probability - 0.5).abs() < 1e-9));

    let second = manager.execute_circuit("h", &[])?;
    assert_eq!(second.len(), 1);
    assert_eq!(second[0].state, 0);
    assert!((second[0].probability - 1.0).abs() < 1e-9);
    Ok(())
}

#[test]
fn test_recreate_resets_state() -> Result<(), SimError> {
    let manager = manager();
    manager.create_circuit("x", CircuitBuilder::new(1).x(0).build())?;
    assert_eq!(manager.execute_circuit("x", &[])?[0].state, 1);
    manager.create_circuit("x", CircuitBuilder::new(1).x(0).build())?;
    assert_eq!(manager.execute_circuit("x", &[])?[0].state, 1);
    assert_eq!(manager.len(), 1);
    Ok(())
}

#[test]
fn test_unknown_circuit_is_not_found() {
    let manager = manager();
    let err = manager.execute_circuit("nope", &[]).unwrap_err();
    assert_eq!(err, SimError::CircuitNotFound { id: "nope".to_string() });
    assert!(matches!(manager.status("nope"), Err(SimError::CircuitNotFound { .. })));
}

#[test]
fn test_qubit_bounds_rejected() {
    let manager = CircuitManager::new(SimulatorConfig::default().with_max_qubits(8)).unwrap();
    for qubits in [0, 9] {
        let err = manager.create_circuit("bad", CircuitBuilder::new(qubits).build()).unwrap_err();
        assert!(matches!(err, SimError::InvalidCircuitConfig { .. }), "qubits = {}: {:?}", qubits, err);
    }
    assert!(!manager.contains("bad"));
}

#[test]
fn test_gate_outside_register_rejected() {
    let manager = manager();
    let err = manager.create_circuit("bad", CircuitBuilder::new(2).cnot(0, 2).build()).unwrap_err();
    match err {
        SimError::InvalidCircuitConfig { reason } => assert!(reason.starts_with("gate #0")),
        other => panic!("unexpected error {:?}", other),
    }
}

#[test]
fn test_classical_input_is_angle_encoded() -> Result<(), SimError> {
    let manager = manager();
    manager.create_circuit("enc", CircuitBuilder::new(2).build())?;
    let outcomes = manager.execute_circuit("enc", &[0.0, PI])?;
    assert_eq!(outcomes.len(), 1);
    assert_eq!(outcomes[0].state, 0b10);

    let err = manager.execute_circuit("enc", &[0.1, 0.2, 0.3]).unwrap_err();
    assert!(matches!(err, SimError::InvalidClassicalInput { .. }));
    // A rejected input leaves the persisted state alone.
    assert!((manager.current_state("enc")?.probabilities()[0b10] - 1.0).abs() < 1e-9);
    Ok(())
}

#[test]
fn test_requests_from_json() -> Result<(), SimError> {
    let manager = manager();
    let request: CircuitRequest = serde_json::from_value(json!({
        "id": "bell",
        "qubits": 2,
        "gates": [
            {"kind": "H", "targets": [0]},
            {"kind": "cx", "targets": [1], "controls": [0]}
        ]
    }))
    .unwrap();
    assert_eq!(manager.create_from_request(request)?, "bell");
    assert_eq!(manager.status("bell")?, CircuitStatus::Created);

    let execution: ExecutionRequest = serde_json::from_value(json!({"circuit_id": "bell"})).unwrap();
    let outcomes = manager.handle_execution(&execution)?;
    let states: Vec<usize> = outcomes.iter().map(|m| m.state).collect();
    assert_eq!(states, vec![0b00, 0b11]);

    let unsupported: CircuitRequest = serde_json::from_value(json!({
        "id": "odd", "qubits": 1, "gates": [{"kind": "sqrt_swap", "targets": [0]}]
    }))
    .unwrap();
    assert!(matches!(manager.create_from_request(unsupported), Err(SimError::UnsupportedGateKind { .. })));
    Ok(())
}

#[test]
fn test_concurrent_distinct_circuits() -> Result<(), SimError> {
    let manager = Arc::new(manager());
    for i in 0..8 {
        manager.create_circuit(format!("c{}", i), CircuitBuilder::new(3).x(i % 3).build())?;
    }

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let manager = Arc::clone(&manager);
            thread::spawn(move || manager.execute_circuit(&format!("c{}", i), &[]))
        })
        .collect();
    for (i, handle) in handles.into_iter().enumerate() {
        let outcomes = handle.join().expect("worker panicked")?;
        assert_eq!(outcomes[0].state, 1 << (i % 3));
    }
    Ok(())
}

#[test]
fn test_concurrent_same_circuit_is_serialised() -> Result<(), SimError> {
    let manager = Arc::new(manager());
    manager.create_circuit("shared", CircuitBuilder::new(1).x(0).build())?;

    let handles: Vec<_> = (0..10)
        .map(|_| {
            let manager = Arc::clone(&manager);
            thread::spawn(move || manager.execute_circuit("shared", &[]).map(|_| ()))
        })
        .collect();
    for handle in handles {
        handle.join().expect("worker panicked")?;
    }
    // Ten serialised X gates return to |0>; a lost update would leave |1>.
    assert_eq!(manager.current_state("shared")?.probabilities()[0], 1.0);
    Ok(())
}

#[test]
fn test_lifecycle_reported_to_sink() -> Result<(), SimError> {
    let sink = Arc::new(MemorySink::new());
    let telemetry = Telemetry::new(sink.clone(), Arc::new(SystemClock));
    let manager = CircuitManager::with_telemetry(SimulatorConfig::default(), telemetry)?;
    manager.create_circuit("l", CircuitBuilder::new(2).hadamard(1).build())?;
    manager.execute_circuit("l", &[])?;
    manager.remove_circuit("l")?;

    let lifecycle: Vec<LifecycleEvent> = sink
        .events()
        .into_iter()
        .filter_map(|e| match e {
            TelemetryEvent::Lifecycle(event) => Some(event),
            _ => None,
        })
        .collect();
    assert_eq!(
        lifecycle,
        vec![
            LifecycleEvent::Initializing,
            LifecycleEvent::Initialized { max_qubits: 24 },
            LifecycleEvent::CircuitCreated { id: "l".into(), qubits: 2, gates: 1 },
            LifecycleEvent::CircuitExecuted { id: "l".into(), outcomes: 2 },
            LifecycleEvent::CircuitRemoved { id: "l".into() },
        ]
    );
    Ok(())
}

#[test]
fn test_hybrid_round_trip() -> Result<(), SimError> {
    let manager = Arc::new(manager());
    manager.create_circuit("bell", CircuitBuilder::new(2).hadamard(0).cnot(0, 1).build())?;
    let bridge = HybridBridge::new(Arc::clone(&manager));

    let result = bridge.hybrid_process("bell", json!({"epoch": 3}), &[])?;
    assert_eq!(result.classical, json!({"epoch": 3}));
    assert_eq!(result.quantum.len(), 2);
    assert!(result.quantum.iter().all(|m| (m.probability - 0.5).abs() < 1e-9));
    assert_eq!(manager.status("bell")?, CircuitStatus::Idle);
    Ok(())
}
