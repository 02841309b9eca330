//! Graph states built from structural graphs.
//!
//! Construction happens in two phases. [`GraphState::new`] only fixes the
//! qubit assignment and the preparation circuit (*H* on every qubit, then *CZ*
//! on every edge); the state vector itself is computed on request with
//! [`GraphState::compute_state_vector`].

use tracing::debug;
use thiserror::Error;
use crate::{
    circuit::{ BackendError, Circuit, Op, Simulator },
    gate::{ Gate, NPauli, Pauli },
    graph::{ Graph, Node },
    state::{ StateError, StateVec },
};

#[derive(Debug, Error, Clone, PartialEq)]
pub enum GraphStateError {
    #[error("graph states can only be built from graphs of dimension 1 or 2, but got dimension {0}")]
    UnsupportedDimension(usize),

    #[error("node {0} is not part of the graph")]
    UnknownNode(Node),

    #[error("state vector has not been computed")]
    NotComputed,

    #[error("backend error: {0}")]
    BackendError(#[from] BackendError),

    #[error("state error: {0}")]
    StateError(#[from] StateError),
}
pub type GraphStateResult<T> = Result<T, GraphStateError>;
use GraphStateError::*;

/// A graph state, with one qubit per node of a [`Graph`].
#[derive(Clone, Debug, PartialEq)]
pub struct GraphState {
    graph: Graph,
    circuit: Circuit,
    state: Option<StateVec>,
}

impl GraphState {
    /// Create a new graph state from a 1D or 2D graph.
    ///
    /// The node at position *k* in the graph's node list is assigned qubit
    /// *k*.
    pub fn new(graph: Graph) -> GraphStateResult<Self> {
        let dim = graph.description().dimension;
        if !matches!(dim, 1 | 2) { return Err(UnsupportedDimension(dim)); }
        Ok(Self::build(graph))
    }

    fn build(graph: Graph) -> Self {
        let n = graph.len();
        let ops: Vec<Op>
            = (0..n).map(|k| Op::Gate(Gate::H(k)))
            .chain(
                (0..n).flat_map(|k| {
                    graph.neighbor_indices(k).into_iter()
                        .filter(move |j| *j > k)
                        .map(move |j| Op::Gate(Gate::CZ(k, j)))
                })
            )
            .collect();
        let circuit = Circuit::from_ops_unchecked(n, ops);
        debug!(
            qubits = n,
            edges = graph.num_edges(),
            "prepared graph state circuit",
        );
        Self { graph, circuit, state: None }
    }

    /// Create a 1D cluster state of `n` qubits.
    pub fn cluster_1d(n: usize) -> Self { Self::build(Graph::linear(n)) }

    /// Create a 2D cluster state on a `rows` × `cols` grid.
    pub fn cluster_2d(rows: usize, cols: usize) -> Self {
        Self::build(Graph::grid(rows, cols))
    }

    /// Return the underlying graph.
    pub fn graph(&self) -> &Graph { &self.graph }

    /// Return the number of qubits.
    pub fn num_qubits(&self) -> usize { self.graph.len() }

    /// Return the qubit indices of all nodes, in node order.
    pub fn qubits(&self) -> Vec<usize> { (0..self.graph.len()).collect() }

    /// Return the qubit assigned to `node`.
    pub fn get_qubit(&self, node: &Node) -> GraphStateResult<usize> {
        self.graph.index_of(node).ok_or(UnknownNode(*node))
    }

    /// Return the circuit preparing the state from ∣0...0⟩.
    pub fn initialization_circuit(&self) -> &Circuit { &self.circuit }

    /// Simulate the preparation circuit and cache the result.
    ///
    /// The simulator is left holding the prepared state. Fails with
    /// [`StateError::TooManyQubits`] if the graph has more than
    /// [`MAX_QUBITS`][crate::state::MAX_QUBITS] nodes.
    pub fn compute_state_vector(&mut self, sim: &mut Simulator)
        -> GraphStateResult<&StateVec>
    {
        let init = StateVec::try_new(self.num_qubits())?;
        let run = sim.simulate(&self.circuit, init)?;
        let state: &StateVec = self.state.insert(run.state);
        Ok(state)
    }

    /// Return the cached state vector, if it has been computed.
    pub fn state_vector(&self) -> Option<&StateVec> { self.state.as_ref() }

    /// Return the stabilizer generators
    /// *K*<sub>*a*</sub> = *X*<sub>*a*</sub> ⊗<sub>*b* ∈ *N*(*a*)</sub>
    /// *Z*<sub>*b*</sub>, one per node in node order.
    pub fn stabilizers(&self) -> Vec<NPauli> {
        let n = self.num_qubits();
        (0..n)
            .map(|a| {
                let mut stab = NPauli::identity(n);
                stab.set(a, Pauli::X);
                self.graph.neighbor_indices(a).into_iter()
                    .for_each(|b| { stab.set(b, Pauli::Z); });
                stab
            })
            .collect()
    }

    /// Compute the expectation value of every stabilizer generator on the
    /// cached state vector.
    ///
    /// For a correctly prepared graph state, every value is +1.
    pub fn check_stabilizers(&self) -> GraphStateResult<Vec<f64>> {
        let state = self.state.as_ref().ok_or(NotComputed)?;
        self.stabilizers().iter()
            .map(|stab| Ok(state.expectation(stab)?.re))
            .collect()
    }
}
