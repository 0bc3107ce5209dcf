// src/simulation/results.rs
use super::engine::DecoherenceEvent;
use crate::core::constants::MEASUREMENT_EPSILON;
use crate::core::{QuantumState, Result, SimError};
use num_complex::Complex;
use num_traits::Zero;
use rand::Rng;
use serde::Serialize;
use std::fmt;
use std::time::SystemTime;

/// One entry of a measurement distribution summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Measurement {
    /// Basis state index.
    pub state: usize,
    /// Born-rule probability, in `[0, 1]`.
    pub probability: f64,
    /// When the measurement was captured.
    pub timestamp: SystemTime,
}

/// Summarises the outcome distribution of `state`.
///
/// Keeps basis states with probability above
/// [`MEASUREMENT_EPSILON`](crate::core::MEASUREMENT_EPSILON), ordered by
/// descending probability (ties by ascending index). The state is neither
/// mutated nor collapsed, so repeated calls return the same distribution.
pub fn measure(state: &QuantumState) -> Vec<Measurement> {
    let timestamp = SystemTime::now();
    let mut outcomes: Vec<Measurement> = state
        .amplitudes()
        .iter()
        .enumerate()
        .filter_map(|(index, amplitude)| {
            let probability = amplitude.re * amplitude.re + amplitude.im * amplitude.im;
            (probability > MEASUREMENT_EPSILON).then_some(Measurement {
                state: index,
                probability: probability.min(1.0),
                timestamp,
            })
        })
        .collect();
    outcomes.sort_by(|a, b| b.probability.total_cmp(&a.probability).then(a.state.cmp(&b.state)));
    outcomes
}

/// Draws a single basis state according to the Born rule without collapsing.
///
/// Falls back to the last index with non-zero weight when rounding leaves the
/// draw past the cumulative total.
pub fn sample_outcome<R: Rng>(state: &QuantumState, rng: &mut R) -> usize {
    let probabilities = state.probabilities();
    let total: f64 = probabilities.iter().sum();
    let draw = rng.random::<f64>() * total;

    let mut cumulative = 0.0;
    let mut last_nonzero = 0;
    for (index, p) in probabilities.iter().enumerate() {
        if *p <= 0.0 {
            continue;
        }
        cumulative += p;
        last_nonzero = index;
        if draw < cumulative {
            return index;
        }
    }
    last_nonzero
}

/// Projects `state` onto basis state `outcome`.
///
/// This is the physical post-measurement state; [`measure`] never does it
/// implicitly. Fails with `InvalidCircuitConfig` when `outcome` is outside the
/// register.
pub fn collapse(state: QuantumState, outcome: usize) -> Result<QuantumState> {
    if outcome >= state.dim() {
        return Err(SimError::invalid_config(format!(
            "outcome {} outside a register of {} basis states",
            outcome,
            state.dim()
        )));
    }
    let mut amplitudes = vec![Complex::zero(); state.dim()];
    amplitudes[outcome] = Complex::new(1.0, 0.0);
    Ok(state.with_amplitudes(amplitudes))
}

/// Outcome of a one-shot circuit simulation.
#[derive(Debug, Clone)]
pub struct SimulationResult {
    measurements: Vec<Measurement>,
    final_state: QuantumState,
    decoherence: Vec<DecoherenceEvent>,
}

impl SimulationResult {
    pub(crate) fn new(measurements: Vec<Measurement>, final_state: QuantumState, decoherence: Vec<DecoherenceEvent>) -> Self {
        Self { measurements, final_state, decoherence }
    }

    /// Ranked outcome distribution of the final state.
    pub fn measurements(&self) -> &[Measurement] {
        &self.measurements
    }

    pub fn final_state(&self) -> &QuantumState {
        &self.final_state
    }

    /// Decoherence detections seen while running the gates.
    pub fn decoherence_events(&self) -> &[DecoherenceEvent] {
        &self.decoherence
    }

    /// Probability recorded for `state`, if it survived the epsilon filter.
    pub fn probability_of(&self, state: usize) -> Option<f64> {
        self.measurements.iter().find(|m| m.state == state).map(|m| m.probability)
    }

    /// The most likely basis state.
    pub fn most_likely(&self) -> Option<usize> {
        self.measurements.first().map(|m| m.state)
    }
}

impl fmt::Display for SimulationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self.final_state.qubits();
        writeln!(f, "Simulation Results:")?;
        if self.measurements.is_empty() {
            writeln!(f, "  No outcome above threshold.")?;
        } else {
            for m in &self.measurements {
                writeln!(f, "  |{:0width$b}>: {:.6}", m.state, m.probability, width = width)?;
            }
        }
        if !self.decoherence.is_empty() {
            writeln!(f, "  Decoherence detected {} time(s)", self.decoherence.len())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::f64::consts::FRAC_1_SQRT_2;

    fn state_of(amps: &[(f64, f64)]) -> QuantumState {
        QuantumState::from_amplitudes(amps.iter().map(|(re, im)| Complex::new(*re, *im)).collect(), 1000.0).unwrap()
    }

    #[test]
    fn test_initial_state_single_outcome() -> Result<()> {
        let state = QuantumState::new(1, 24, 1000.0)?;
        let outcomes = measure(&state);
        assert_eq!(outcomes.len(), 1);
        assert_eq!(outcomes[0].state, 0);
        assert_eq!(outcomes[0].probability, 1.0);
        Ok(())
    }

    #[test]
    fn test_sorted_and_filtered() {
        // 0.6² = 0.36, 0.8² ≈ 0.64, 0.0001² below epsilon.
        let state = state_of(&[(0.6, 0.0), (0.0, 0.0), (0.0, 0.8), (0.0001, 0.0)]);
        let outcomes = measure(&state);
        assert_eq!(outcomes.iter().map(|m| m.state).collect::<Vec<_>>(), vec![2, 0]);
        assert!((outcomes[0].probability - 0.64).abs() < 1e-12);
        assert!((outcomes[1].probability - 0.36).abs() < 1e-12);
    }

    #[test]
    fn test_ties_ordered_by_index() {
        let state = state_of(&[(0.5, 0.0), (0.5, 0.0), (0.5, 0.0), (0.5, 0.0)]);
        let order: Vec<usize> = measure(&state).iter().map(|m| m.state).collect();
        assert_eq!(order, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_measure_is_idempotent() {
        let state = state_of(&[(FRAC_1_SQRT_2, 0.0), (FRAC_1_SQRT_2, 0.0)]);
        let first: Vec<(usize, f64)> = measure(&state).iter().map(|m| (m.state, m.probability)).collect();
        let second: Vec<(usize, f64)> = measure(&state).iter().map(|m| (m.state, m.probability)).collect();
        assert_eq!(first, second);
        assert_eq!(state.amplitudes()[1], Complex::new(FRAC_1_SQRT_2, 0.0));
    }

    #[test]
    fn test_sample_follows_distribution() {
        let state = state_of(&[(0.0, 0.0), (1.0, 0.0)]);
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..20 {
            assert_eq!(sample_outcome(&state, &mut rng), 1);
        }

        let state = state_of(&[(FRAC_1_SQRT_2, 0.0), (FRAC_1_SQRT_2, 0.0)]);
        let ones = (0..2000).filter(|_| sample_outcome(&state, &mut rng) == 1).count();
        assert!((800..1200).contains(&ones), "got {} ones out of 2000", ones);
    }

    #[test]
    fn test_collapse_projects() -> Result<()> {
        let state = state_of(&[(FRAC_1_SQRT_2, 0.0), (FRAC_1_SQRT_2, 0.0)]);
        let collapsed = collapse(state.clone(), 1)?;
        assert_eq!(collapsed.amplitudes(), &[Complex::zero(), Complex::new(1.0, 0.0)]);
        assert!(collapse(state, 2).is_err());
        Ok(())
    }
}
