//! Circuits of gates and measurements, and a seeded simulator to run them on.
//!
//! The [`Backend`] trait is the only thing the gate graph executor knows about
//! the machine it runs on: apply a gate, measure a qubit. [`Simulator`] is the
//! state-vector implementation used throughout the crate.

use rand::{ rngs::StdRng, SeedableRng };
use thiserror::Error;
use tracing::trace;
use crate::{
    gate::Gate,
    outcome::{ Outcome, OutcomeError, OutcomeKey, Outcomes },
    state::{ StateError, StateVec },
};

#[derive(Debug, Error, Clone, PartialEq)]
pub enum CircuitError {
    #[error("qubit index {0} is out of range for a {1}-qubit circuit")]
    QubitOutOfRange(usize, usize),

    #[error("two-qubit gate must act on distinct qubits, but got {0} twice")]
    SameQubit(usize),
}
pub type CircuitResult<T> = Result<T, CircuitError>;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum BackendError {
    #[error("state error: {0}")]
    StateError(#[from] StateError),

    #[error("sample record error: {0}")]
    RecordError(#[from] OutcomeError),

    #[error("circuit acts on {0} qubits, but the backend holds {1}")]
    QubitCountMismatch(usize, usize),
}
pub type BackendResult<T> = Result<T, BackendError>;

/// A single operation in a [`Circuit`].
#[derive(Clone, Debug, PartialEq)]
pub enum Op {
    /// Apply a unitary gate.
    Gate(Gate),
    /// Measure a qubit in the Z-basis, saving the outcome under a key.
    Measure(usize, OutcomeKey),
}

impl From<Gate> for Op {
    fn from(gate: Gate) -> Self { Self::Gate(gate) }
}

impl Op {}

/// An ordered list of operations on a fixed number of qubits.
#[derive(Clone, Debug, PartialEq)]
pub struct Circuit {
    n: usize,
    ops: Vec<Op>,
}

impl Circuit {
    /// Create a new, empty circuit on `n` qubits.
    pub fn new(n: usize) -> Self { Self { n, ops: Vec::new() } }

    // caller guarantees every op is valid for `n` qubits
    pub(crate) fn from_ops_unchecked(n: usize, ops: Vec<Op>) -> Self {
        Self { n, ops }
    }

    /// Return the number of qubits the circuit acts on.
    pub fn num_qubits(&self) -> usize { self.n }

    /// Return the number of operations.
    pub fn len(&self) -> usize { self.ops.len() }

    /// Return `true` if the circuit has no operations.
    pub fn is_empty(&self) -> bool { self.ops.is_empty() }

    /// Return all operations in order.
    pub fn ops(&self) -> &[Op] { &self.ops }

    /// Iterate over all operations in order.
    pub fn iter(&self) -> std::slice::Iter<'_, Op> { self.ops.iter() }

    fn check(&self, op: &Op) -> CircuitResult<()> {
        let in_range = |k: usize| {
            (k < self.n).then_some(())
                .ok_or(CircuitError::QubitOutOfRange(k, self.n))
        };
        match op {
            Op::Gate(gate) => match gate.qubits() {
                (k, None) => in_range(k),
                (a, Some(b)) => {
                    in_range(a)?;
                    in_range(b)?;
                    (a != b).then_some(()).ok_or(CircuitError::SameQubit(a))
                },
            },
            Op::Measure(k, _) => in_range(*k),
        }
    }

    /// Append an operation, checking its qubit indices.
    pub fn push<O>(&mut self, op: O) -> CircuitResult<&mut Self>
    where O: Into<Op>
    {
        let op = op.into();
        self.check(&op)?;
        self.ops.push(op);
        Ok(self)
    }

    /// Append a series of operations, checking each one.
    ///
    /// Operations up to the first invalid one are kept.
    pub fn extend<I, O>(&mut self, ops: I) -> CircuitResult<&mut Self>
    where
        I: IntoIterator<Item = O>,
        O: Into<Op>,
    {
        ops.into_iter().try_for_each(|op| self.push(op).map(|_| ()))?;
        Ok(self)
    }

    /// Append a Z-basis measurement.
    pub fn measure<K>(&mut self, k: usize, key: K) -> CircuitResult<&mut Self>
    where K: Into<OutcomeKey>
    {
        self.push(Op::Measure(k, key.into()))
    }
}

impl<'a> IntoIterator for &'a Circuit {
    type Item = &'a Op;
    type IntoIter = std::slice::Iter<'a, Op>;

    fn into_iter(self) -> Self::IntoIter { self.ops.iter() }
}

/// Something that can apply gates to and measure qubits.
pub trait Backend {
    /// Return the number of qubits held by the backend.
    fn num_qubits(&self) -> usize;

    /// Apply a unitary gate.
    fn apply_gate(&mut self, gate: Gate) -> BackendResult<()>;

    /// Measure `qubit` in the Z-basis.
    fn measure(&mut self, qubit: usize, key: OutcomeKey)
        -> BackendResult<Outcome>;

    /// Apply a single circuit operation, returning the outcome if it was a
    /// measurement.
    fn apply_op(&mut self, op: &Op) -> BackendResult<Option<Outcome>> {
        match op {
            Op::Gate(gate) => self.apply_gate(*gate).map(|_| None),
            Op::Measure(k, key) => self.measure(*k, key.clone()).map(Some),
        }
    }
}

/// The result of [`Simulator::simulate`].
#[derive(Clone, Debug, PartialEq)]
pub struct Run {
    /// Final state of the register.
    pub state: StateVec,
    /// All measurement outcomes produced by the circuit.
    pub outcomes: Outcomes,
}

/// State-vector simulator with a seeded random number generator.
///
/// Every measurement performed is also kept in an internal sample record,
/// which is write-once in the same way as [`Outcomes`].
#[derive(Clone, Debug)]
pub struct Simulator {
    state: StateVec,
    record: Outcomes,
    rng: StdRng,
}

impl Simulator {
    /// Create a new simulator of `n` qubits initialized to ∣0...0⟩, optionally
    /// seeding the internal random number generator.
    pub fn new(n: usize, seed: Option<u64>) -> Self {
        Self::from_state(StateVec::new(n), seed)
    }

    /// Create a new simulator from an existing state.
    pub fn from_state(state: StateVec, seed: Option<u64>) -> Self {
        let rng
            = seed.map(StdRng::seed_from_u64)
            .unwrap_or_else(StdRng::from_entropy);
        Self { state, record: Outcomes::new(), rng }
    }

    /// Return a reference to the current state.
    pub fn state(&self) -> &StateVec { &self.state }

    /// Return a reference to the sample record.
    pub fn record(&self) -> &Outcomes { &self.record }

    /// Replace the current state, clearing the sample record.
    ///
    /// The random number generator is left as-is, so that consecutive trials
    /// drawn from the same seed are still reproducible as a sequence.
    pub fn load(&mut self, state: StateVec) -> &mut Self {
        self.state = state;
        self.record.clear();
        self
    }

    /// Reset to ∣0...0⟩ on `n` qubits, clearing the sample record.
    pub fn reset(&mut self, n: usize) -> &mut Self {
        self.load(StateVec::new(n))
    }

    /// Apply every operation of a circuit to the current state.
    pub fn run(&mut self, circuit: &Circuit) -> BackendResult<&mut Self> {
        if circuit.num_qubits() != self.state.num_qubits() {
            return Err(BackendError::QubitCountMismatch(
                circuit.num_qubits(), self.state.num_qubits()));
        }
        circuit.iter()
            .try_for_each(|op| self.apply_op(op).map(|_| ()))?;
        Ok(self)
    }

    /// Run a circuit from an initial state, returning the final state and the
    /// outcomes of all measurements in the circuit.
    pub fn simulate(&mut self, circuit: &Circuit, init: StateVec)
        -> BackendResult<Run>
    {
        self.load(init).run(circuit)?;
        Ok(Run { state: self.state.clone(), outcomes: self.record.clone() })
    }
}

impl Backend for Simulator {
    fn num_qubits(&self) -> usize { self.state.num_qubits() }

    fn apply_gate(&mut self, gate: Gate) -> BackendResult<()> {
        trace!(?gate, "apply gate");
        self.state.apply_gate(gate)?;
        Ok(())
    }

    fn measure(&mut self, qubit: usize, key: OutcomeKey)
        -> BackendResult<Outcome>
    {
        if self.record.contains(&key) {
            return Err(OutcomeError::Rewrite(key).into());
        }
        let outcome = self.state.measure(qubit, &mut self.rng)?;
        trace!(qubit, %key, %outcome, "measure");
        self.record.record(key, outcome)?;
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bell_circuit() -> Circuit {
        let mut circuit = Circuit::new(2);
        circuit.push(Gate::H(0)).unwrap()
            .push(Gate::CX(0, 1)).unwrap()
            .measure(0, "a").unwrap()
            .measure(1, "b").unwrap();
        circuit
    }

    #[test]
    fn circuit_validation() {
        let mut circuit = Circuit::new(3);
        assert_eq!(
            circuit.push(Gate::H(3)).map(|_| ()),
            Err(CircuitError::QubitOutOfRange(3, 3)),
        );
        assert_eq!(
            circuit.push(Gate::CZ(1, 1)).map(|_| ()),
            Err(CircuitError::SameQubit(1)),
        );
        assert_eq!(
            circuit.measure(5, "m").map(|_| ()),
            Err(CircuitError::QubitOutOfRange(5, 3)),
        );
        assert!(circuit.is_empty());
        circuit.extend([Gate::H(0), Gate::H(1), Gate::CZ(0, 2)]).unwrap();
        assert_eq!(circuit.len(), 3);
        assert!(!circuit.ops().iter().any(|op| matches!(op, Op::Measure(..))));
    }

    #[test]
    fn bell_outcomes_correlated() {
        let circuit = bell_circuit();
        let mut sim = Simulator::new(2, Some(10546));
        for _ in 0..10 {
            let run = sim.simulate(&circuit, StateVec::new(2)).unwrap();
            assert_eq!(run.outcomes.len(), 2);
            assert_eq!(
                run.outcomes.get(&"a".into()),
                run.outcomes.get(&"b".into()),
            );
        }
    }

    #[test]
    fn seeded_runs_are_deterministic() {
        let circuit = bell_circuit();
        let trials = |seed: u64| -> Vec<Outcomes> {
            let mut sim = Simulator::new(2, Some(seed));
            (0..16)
                .map(|_| sim.simulate(&circuit, StateVec::new(2)).unwrap())
                .map(|run| run.outcomes)
                .collect()
        };
        assert_eq!(trials(1234), trials(1234));
    }

    #[test]
    fn measurement_keys_are_write_once() {
        let mut sim = Simulator::new(1, Some(0));
        sim.measure(0, "m".into()).unwrap();
        assert_eq!(
            sim.measure(0, "m".into()),
            Err(BackendError::RecordError(OutcomeError::Rewrite("m".into()))),
        );
        sim.reset(1);
        assert!(sim.record().is_empty());
        assert!(sim.measure(0, "m".into()).is_ok());
    }

    #[test]
    fn qubit_count_mismatch() {
        let mut sim = Simulator::new(3, None);
        assert_eq!(
            sim.run(&bell_circuit()).map(|_| ()),
            Err(BackendError::QubitCountMismatch(2, 3)),
        );
    }
}
