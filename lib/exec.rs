//! Execution of gate graphs against a backend.
//!
//! [`execute`] walks the nodes of a [`GateGraph`] in ascending order. For each
//! slot, it looks up the slot's dependencies in the outcome store, evaluates
//! the slot's formula, and dispatches the resulting measurement or power gate
//! to the backend on the node's qubit. Measurement outcomes are written back to
//! the store, where later slots can read them.
//!
//! Execution is all-or-nothing: if any step fails, the store and backend are
//! left partway through the gate and should be thrown away.
//!
//! # Example
//! ```
//! use mbqc_sim::{ exec::Executor, gates::XPowGate, graph_state::GraphState };
//!
//! let mut exec = Executor::new(Some(10546));
//! exec.prepare(&GraphState::cluster_1d(5)).unwrap();
//! exec.run(&XPowGate::new(1.0, "x"), &[0, 1, 2, 3, 4]).unwrap();
//! println!("{}", exec.outcomes());
//! ```

use thiserror::Error;
use tracing::{ debug, debug_span, trace };
use crate::{
    circuit::{ Backend, BackendError, Simulator },
    gate::Gate,
    gate_graph::{ GateGraph, GateGraphError, Inputs, Operation, Params },
    gates::MbqGate,
    graph_state::{ GraphState, GraphStateError },
    outcome::{ OutcomeError, Outcomes },
    projector::Projector,
    state::StateVec,
};

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ExecError {
    #[error("gate acts on {expected} qubits, but {got} were given")]
    QubitCountMismatch { expected: usize, got: usize },

    #[error("slot {slot} of node {node} produced parameters that don't fit its operation")]
    ParamMismatch { node: usize, slot: usize },

    #[error("outcome error: {0}")]
    OutcomeError(#[from] OutcomeError),

    #[error("gate graph error: {0}")]
    GateGraphError(#[from] GateGraphError),

    #[error("graph state error: {0}")]
    GraphStateError(#[from] GraphStateError),

    #[error("backend error: {0}")]
    BackendError(#[from] BackendError),
}
pub type ExecResult<T> = Result<T, ExecError>;
use ExecError::*;

/// Run a gate graph on `qubits` of a backend, reading and writing classical
/// outcomes in `store`.
///
/// `qubits[k]` is the physical qubit acted on by node `k`. The graph's label is
/// claimed in `store` first, so running two graphs with the same label against
/// the same store fails before anything is applied.
pub fn execute<B>(
    graph: &GateGraph,
    qubits: &[usize],
    store: &mut Outcomes,
    backend: &mut B,
) -> ExecResult<()>
where B: Backend + ?Sized
{
    let span = debug_span!("execute", gate = %graph.label(), nodes = graph.len());
    let _enter = span.enter();

    if qubits.len() != graph.len() {
        return Err(QubitCountMismatch { expected: graph.len(), got: qubits.len() });
    }
    store.claim(graph.label())?;

    for (k, (node, &q)) in graph.nodes().iter().zip(qubits).enumerate() {
        for (j, slot) in node.slots().iter().enumerate() {
            let inputs = Inputs::resolve(&slot.dependencies, store)?;
            let params = slot.formula.eval(&inputs);
            debug!(node = k, qubit = q, ?params, "slot {}", j);
            match (slot.operation, params) {
                (Operation::Projector { collapse }, Params::Projector { phi, key }) => {
                    if store.contains(&key) {
                        return Err(OutcomeError::Rewrite(key).into());
                    }
                    let proj = Projector::phi(phi, key.clone())
                        .with_collapse(collapse);
                    let outcome = proj.apply(q, backend)?;
                    trace!(%key, %outcome, "recorded");
                    store.record(key, outcome)?;
                },
                (Operation::XPow, Params::Exponent(t)) => {
                    backend.apply_gate(Gate::XPow(q, t))?;
                },
                (Operation::ZPow, Params::Exponent(t)) => {
                    backend.apply_gate(Gate::ZPow(q, t))?;
                },
                _ => { return Err(ParamMismatch { node: k, slot: j }); },
            }
        }
    }
    Ok(())
}

/// Convenience driver owning a [`Simulator`] and an outcome store.
#[derive(Clone, Debug)]
pub struct Executor {
    sim: Simulator,
    store: Outcomes,
}

impl Executor {
    /// Create a new executor with an empty register, optionally seeding the
    /// simulator's random number generator.
    pub fn new(seed: Option<u64>) -> Self {
        Self { sim: Simulator::new(0, seed), store: Outcomes::new() }
    }

    /// Load a graph state as the resource state, clearing all outcomes.
    ///
    /// Uses the graph state's cached state vector if it has one, and otherwise
    /// simulates its preparation circuit. Fails without touching the register
    /// if the graph state is too large to simulate.
    pub fn prepare(&mut self, graph_state: &GraphState) -> ExecResult<&mut Self> {
        match graph_state.state_vector() {
            Some(state) => { self.sim.load(state.clone()); },
            None => {
                let init = StateVec::try_new(graph_state.num_qubits())
                    .map_err(BackendError::from)?;
                self.sim.simulate(graph_state.initialization_circuit(), init)?;
            },
        }
        self.store.clear();
        Ok(self)
    }

    /// Load an arbitrary resource state, clearing all outcomes.
    pub fn load(&mut self, state: StateVec) -> &mut Self {
        self.sim.load(state);
        self.store.clear();
        self
    }

    /// Run a gate on `qubits`.
    pub fn run<G>(&mut self, gate: &G, qubits: &[usize]) -> ExecResult<&mut Self>
    where G: MbqGate + ?Sized
    {
        execute(gate.gate_graph(), qubits, &mut self.store, &mut self.sim)?;
        Ok(self)
    }

    /// Return the outcome store.
    pub fn outcomes(&self) -> &Outcomes { &self.store }

    /// Return the current state of the register.
    pub fn state(&self) -> &StateVec { self.sim.state() }

    /// Return the underlying simulator.
    pub fn simulator(&self) -> &Simulator { &self.sim }

    /// Reset the register to ∣0...0⟩ and clear all outcomes, for the start of
    /// an independent trial.
    pub fn reset(&mut self) -> &mut Self {
        let n = self.sim.num_qubits();
        self.sim.reset(n);
        self.store.clear();
        self
    }
}

#[cfg(test)]
mod tests {
    use std::f64::consts::{ FRAC_1_SQRT_2, PI };
    use nalgebra as na;
    use num_complex::Complex64 as C64;
    use rand::{ rngs::StdRng, Rng, SeedableRng };
    use crate::{
        gate::Pauli,
        gate_graph::{ Formula, GateNode, Slot },
        gates::{ SU2Gate, XPowGate, YPowGate, ZPowGate },
        outcome::{ GateLabel, Outcome },
    };
    use super::*;

    const CHAIN: [usize; 5] = [0, 1, 2, 3, 4];

    // prepare `input` on qubit 0 of a 5-qubit 1D cluster state
    fn resource(input: na::Vector2<C64>) -> StateVec {
        let plus = na::Vector2::new(C64::from(FRAC_1_SQRT_2), C64::from(FRAC_1_SQRT_2));
        let mut state = StateVec::from_qubits([input, plus, plus, plus, plus]).unwrap();
        state.apply_circuit(&(1..5).map(|k| Gate::CZ(k - 1, k)).collect::<Vec<_>>())
            .unwrap();
        state
    }

    fn random_input(rng: &mut StdRng) -> na::Vector2<C64> {
        let a = C64::new(rng.gen::<f64>() - 0.5, rng.gen::<f64>() - 0.5);
        let b = C64::new(rng.gen::<f64>() - 0.5, rng.gen::<f64>() - 0.5);
        na::Vector2::new(a, b).normalize()
    }

    fn same_ray(a: &na::Vector2<C64>, b: &na::Vector2<C64>) -> bool {
        (a.dotc(b).norm() - 1.0).abs() < 1e-9
    }

    // run a gate on a fresh resource state and return the output qubit
    fn output_of<G>(gate: &G, input: na::Vector2<C64>, seed: u64) -> na::Vector2<C64>
    where G: MbqGate
    {
        let mut exec = Executor::new(Some(seed));
        exec.load(resource(input));
        exec.run(gate, &CHAIN).unwrap();
        assert_eq!(exec.outcomes().len(), 4);
        exec.state().qubit_state(4).unwrap()
    }

    #[test]
    fn same_seed_same_run() {
        let gate = SU2Gate::new(0.4, -1.3, 2.2, "d");
        let trial = |seed: u64| -> (Outcomes, StateVec) {
            let mut exec = Executor::new(Some(seed));
            exec.prepare(&GraphState::cluster_1d(5)).unwrap();
            exec.run(&gate, &CHAIN).unwrap();
            (exec.outcomes().clone(), exec.state().clone())
        };
        for seed in [0, 1, 2, 10546] {
            assert_eq!(trial(seed), trial(seed));
        }
    }

    #[test]
    fn outcomes_are_write_once() {
        let label = GateLabel::from("w");
        let mut exec = Executor::new(Some(7));
        exec.prepare(&GraphState::cluster_1d(5)).unwrap();
        assert_eq!(
            Inputs::resolve(&[label.slot(0)], exec.outcomes()),
            Err(OutcomeError::Unresolved(label.slot(0))),
        );
        exec.run(&SU2Gate::new(0.1, 0.2, 0.3, "w"), &CHAIN).unwrap();
        let keys: Vec<String>
            = exec.outcomes().iter().map(|(k, _)| k.to_string()).collect();
        assert_eq!(keys, vec!["b_q0[w]", "b_q1[w]", "b_q2[w]", "b_q3[w]"]);
        let mut store = exec.outcomes().clone();
        assert_eq!(
            store.record(label.slot(2), Outcome::Zero).map(|_| ()),
            Err(OutcomeError::Rewrite(label.slot(2))),
        );
    }

    #[test]
    fn label_collision_is_an_error() {
        let mut exec = Executor::new(Some(3));
        let qubits: Vec<usize> = (0..9).collect();
        exec.prepare(&GraphState::cluster_1d(9)).unwrap();
        exec.run(&SU2Gate::new(0.1, 0.2, 0.0, "g"), &qubits[0..5]).unwrap();
        let before = exec.outcomes().clone();
        assert_eq!(
            exec.run(&SU2Gate::new(0.3, 0.2, 0.0, "g"), &qubits[4..9]).map(|_| ()),
            Err(ExecError::OutcomeError(
                OutcomeError::LabelCollision(GateLabel::from("g")))),
        );
        // nothing was applied by the rejected gate
        assert_eq!(exec.outcomes(), &before);
        // a distinct label composes fine
        exec.run(&SU2Gate::new(0.3, 0.2, 0.0, "h"), &qubits[4..9]).unwrap();
        assert_eq!(exec.outcomes().len(), 8);
    }

    #[test]
    fn qubit_count_mismatch() {
        let mut exec = Executor::new(None);
        exec.prepare(&GraphState::cluster_1d(5)).unwrap();
        assert_eq!(
            exec.run(&XPowGate::new(1.0, ""), &[0, 1, 2]).map(|_| ()),
            Err(QubitCountMismatch { expected: 5, got: 3 }),
        );
    }

    #[test]
    fn zero_angles_give_identity() {
        let mut rng = StdRng::seed_from_u64(10546);
        let gate = SU2Gate::new(0.0, 0.0, 0.0, "id");
        for seed in 0..16 {
            let input = random_input(&mut rng);
            let output = output_of(&gate, input, seed);
            assert!(same_ray(&output, &input));
        }
    }

    #[test]
    fn pauli_gates() {
        let mut rng = StdRng::seed_from_u64(5);
        for seed in 0..8 {
            let input = random_input(&mut rng);
            let x = output_of(&XPowGate::new(1.0, "x"), input, seed);
            assert!(same_ray(&x, &(Pauli::X.matrix() * input)));
            let y = output_of(&YPowGate::new(1.0, "y"), input, seed);
            assert!(same_ray(&y, &(Pauli::Y.matrix() * input)));
            let z = output_of(&ZPowGate::new(1.0, "z"), input, seed);
            assert!(same_ray(&z, &(Pauli::Z.matrix() * input)));
        }
    }

    #[test]
    fn matches_logical_unitary() {
        // exact for any outcomes when γ = 0
        let mut rng = StdRng::seed_from_u64(1);
        for seed in 0..16 {
            let alpha = PI * (2.0 * rng.gen::<f64>() - 1.0);
            let beta = PI * (2.0 * rng.gen::<f64>() - 1.0);
            let gate = SU2Gate::new(alpha, beta, 0.0, "u");
            let input = random_input(&mut rng);
            let output = output_of(&gate, input, seed);
            assert!(same_ray(&output, &(gate.logical_unitary() * input)));

            let gate = gate.with_collapse(true);
            let output = output_of(&gate, input, seed);
            assert!(same_ray(&output, &(gate.logical_unitary() * input)));
        }
    }

    #[test]
    fn mismatched_params() {
        let label = GateLabel::from("m");
        // a fixed exponent fed to a measurement can only come from a node
        // built outside of the checked constructors
        let node = GateNode::from_slots_unchecked(vec![Slot {
            operation: Operation::Projector { collapse: false },
            formula: Formula::Exponent(1.0),
            dependencies: vec![],
        }]);
        let graph = GateGraph::path_unchecked(label, vec![node]);
        let mut sim = Simulator::new(1, Some(0));
        let mut store = Outcomes::new();
        assert_eq!(
            execute(&graph, &[0], &mut store, &mut sim),
            Err(ParamMismatch { node: 0, slot: 0 }),
        );
    }

    #[test]
    fn oversized_resource_is_an_error() {
        let mut exec = Executor::new(Some(0));
        exec.prepare(&GraphState::cluster_1d(5)).unwrap();
        assert_eq!(
            exec.prepare(&GraphState::cluster_2d(8, 8)).map(|_| ()),
            Err(BackendError(crate::circuit::BackendError::StateError(
                crate::state::StateError::TooManyQubits(64)))),
        );
        assert_eq!(exec.state().num_qubits(), 5);
    }
}
