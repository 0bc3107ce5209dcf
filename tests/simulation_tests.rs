// tests/simulation_tests.rs

use qsim::{
    CircuitBuilder, Gate, GateRequest, OptimizationMode, QuantumState, SimError, Simulator, SimulatorConfig,
    check_normalization, measure,
};
use num_complex::Complex;
use std::f64::consts::{FRAC_1_SQRT_2, PI};

const TOLERANCE: f64 = 1e-9;

fn assert_states_close(actual: &QuantumState, expected: &QuantumState, context: &str) {
    assert_eq!(actual.dim(), expected.dim(), "dimension mismatch - {}", context);
    for (i, (a, b)) in actual.amplitudes().iter().zip(expected.amplitudes()).enumerate() {
        assert!((a - b).norm() < TOLERANCE, "amplitude {} differs: {} vs {} - {}", i, a, b, context);
    }
}

#[test]
fn test_initial_state_for_every_width() -> Result<(), SimError> {
    let simulator = Simulator::new(SimulatorConfig::default().with_max_qubits(12))?;
    for qubits in 1..=12 {
        let state = simulator.initial_state(qubits)?;
        assert_eq!(state.amplitudes().len(), 1 << qubits);
        assert_eq!(state.amplitudes()[0], Complex::new(1.0, 0.0));
        assert!(state.amplitudes()[1..].iter().all(|a| *a == Complex::new(0.0, 0.0)));
        check_normalization(&state, None)?;
    }
    assert!(matches!(simulator.initial_state(0), Err(SimError::InvalidQubitCount { .. })));
    assert!(matches!(simulator.initial_state(13), Err(SimError::InvalidQubitCount { requested: 13, max: 12 })));
    Ok(())
}

#[test]
fn test_unitarity_after_every_gate() -> Result<(), SimError> {
    let simulator = Simulator::default();
    let gates = [
        Gate::Hadamard { target: 0 },
        Gate::Rotation { target: 1, angle: 0.37 },
        Gate::Cnot { control: 0, target: 2 },
        Gate::PauliY { target: 1 },
        Gate::Toffoli { controls: [0, 1], target: 2 },
        Gate::Phase { target: 2, angle: PI / 3.0 },
        Gate::PauliZ { target: 0 },
        Gate::PauliX { target: 1 },
    ];
    let mut state = simulator.initial_state(3)?;
    for gate in &gates {
        state = simulator.apply_gate(state, gate)?;
        check_normalization(&state, Some(TOLERANCE))?;
    }
    Ok(())
}

#[test]
fn test_hadamard_and_x_are_involutions() -> Result<(), SimError> {
    let simulator = Simulator::default();
    let start = simulator.apply_gate(simulator.initial_state(2)?, &Gate::Rotation { target: 1, angle: 1.1 })?;
    for gate in [Gate::Hadamard { target: 0 }, Gate::Hadamard { target: 1 }, Gate::PauliX { target: 0 }] {
        let once = simulator.apply_gate(start.clone(), &gate)?;
        let twice = simulator.apply_gate(once, &gate)?;
        assert_states_close(&twice, &start, &gate.to_string());
    }
    Ok(())
}

#[test]
fn test_cnot_control_semantics() -> Result<(), SimError> {
    let simulator = Simulator::default();
    let cnot = Gate::Cnot { control: 0, target: 1 };

    // Control |0>, target in superposition: pair (|00>, |10>) untouched.
    let state = simulator.apply_gate(simulator.initial_state(2)?, &Gate::Hadamard { target: 1 })?;
    let after = simulator.apply_gate(state.clone(), &cnot)?;
    assert_states_close(&after, &state, "control |0>");

    // Control |1>: |01> becomes |11>.
    let state = simulator.apply_gate(simulator.initial_state(2)?, &Gate::PauliX { target: 0 })?;
    let after = simulator.apply_gate(state, &cnot)?;
    assert!((after.amplitudes()[0b11].re - 1.0).abs() < TOLERANCE);
    assert!(after.amplitudes()[0b01].norm() < TOLERANCE);
    Ok(())
}

#[test]
fn test_measure_ground_and_superposition() -> Result<(), SimError> {
    let simulator = Simulator::default();
    let ground = simulator.initial_state(1)?;
    let outcomes = measure(&ground);
    assert_eq!(outcomes.len(), 1);
    assert_eq!((outcomes[0].state, outcomes[0].probability), (0, 1.0));

    let plus = simulator.apply_gate(ground, &Gate::Hadamard { target: 0 })?;
    let outcomes = measure(&plus);
    assert_eq!(outcomes.len(), 2);
    assert_eq!(outcomes[0].state, 0);
    assert_eq!(outcomes[1].state, 1);
    for outcome in &outcomes {
        assert!((outcome.probability - 0.5).abs() < TOLERANCE);
    }
    assert!((plus.amplitudes()[1].re - FRAC_1_SQRT_2).abs() < TOLERANCE);
    Ok(())
}

#[test]
fn test_ghz_state_one_shot() -> Result<(), SimError> {
    let circuit = CircuitBuilder::new(3).hadamard(0).cnot(0, 1).cnot(1, 2).build();
    let result = Simulator::default().run(&circuit)?;
    let states: Vec<usize> = result.measurements().iter().map(|m| m.state).collect();
    assert_eq!(states, vec![0b000, 0b111]);
    Ok(())
}

#[test]
fn test_accuracy_mode_merges_rotations() -> Result<(), SimError> {
    let simulator = Simulator::default();
    let circuit = CircuitBuilder::new(1)
        .rotation(0, PI / 4.0)
        .rotation(0, PI / 4.0)
        .optimization(OptimizationMode::Accuracy)
        .build();
    let prepared = simulator.prepare(circuit.clone())?;
    assert_eq!(prepared.gates(), &[Gate::Rotation { target: 0, angle: PI / 2.0 }]);

    // Folding is exact: both forms yield the same distribution.
    let merged = simulator.run(&circuit)?;
    let unmerged = simulator.run(&CircuitBuilder::new(1).rotation(0, PI / 4.0).rotation(0, PI / 4.0)
        .optimization(OptimizationMode::Speed).build())?;
    assert_states_close(merged.final_state(), unmerged.final_state(), "merged rotations");
    Ok(())
}

#[test]
fn test_gate_request_parsing() -> Result<(), SimError> {
    let gate = Gate::from_request(&GateRequest::new("CX", 1).with_controls(vec![0]))?;
    assert_eq!(gate, Gate::Cnot { control: 0, target: 1 });
    let err = Gate::from_request(&GateRequest::new("swap", 0)).unwrap_err();
    assert_eq!(err, SimError::UnsupportedGateKind { kind: "swap".to_string() });
    Ok(())
}
