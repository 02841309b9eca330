//! Tools for simulating measurement-based quantum computation (MBQC) on small
//! registers of qubits.
//!
//! Resource states are graph states prepared on a dense state-vector
//! simulator. Gates are expressed as graphs of adaptive single-qubit
//! measurements, where the basis of each measurement depends on the outcomes
//! of earlier ones, and are run against the resource state by an executor that
//! keeps a write-once record of all classical outcomes.

pub mod gate;
pub mod outcome;
pub mod state;
pub mod circuit;
pub mod graph;
pub mod graph_state;
pub mod projector;
pub mod gate_graph;
pub mod gates;
pub mod exec;
