//! Single-qubit measurement-based gates.
//!
//! Every gate here is realized on a 5-qubit chain of a 1D cluster state: the
//! input sits on the first qubit, four adaptive measurements teleport it down
//! the chain while rotating it, and a final Pauli-frame correction on the last
//! qubit removes the dependence on the measurement outcomes.
//!
//! Measuring a qubit in the ∣±<sub>φ</sub>⟩ basis with outcome *s* acts on
//! the next qubit in the chain as *X*<sup>*s*</sup> *H* *P*(-φ), so that four
//! measurements at angles (0, -α, -β, -γ), with signs adapted to earlier
//! outcomes, implement
//! *H* *P*(γ) *H* *P*(β) *H* *P*(α) *H* ∝ *R*<sub>*x*</sub>(γ)
//! *R*<sub>*z*</sub>(β) *R*<sub>*x*</sub>(α).
//!
//! The angle at node 3 is flipped on the parity of `b_q2` only. This is exact
//! whenever `b_q0` = 0 or γ is a multiple of π, which covers all the Pauli
//! specializations at integer exponents.

use std::f64::consts::PI;
use nalgebra as na;
use num_complex::Complex64 as C64;
use crate::{
    gate::{ phase_shift, HADAMARD },
    gate_graph::{ Formula, GateGraph, GateNode, Operation, Slot },
    outcome::GateLabel,
};

/// A gate that can be run by the [executor][crate::exec].
pub trait MbqGate {
    /// Return the gate's dependency graph.
    fn gate_graph(&self) -> &GateGraph;

    /// Return the gate's label.
    fn label(&self) -> &GateLabel { self.gate_graph().label() }

    /// Return the number of physical qubits the gate acts on.
    fn num_qubits(&self) -> usize { self.gate_graph().len() }
}

/// Arbitrary SU(2) rotation *R*<sub>*x*</sub>(γ) *R*<sub>*z*</sub>(β)
/// *R*<sub>*x*</sub>(α), up to global phase.
#[derive(Clone, Debug, PartialEq)]
pub struct SU2Gate {
    alpha: f64,
    beta: f64,
    gamma: f64,
    collapse: bool,
    graph: GateGraph,
}

impl SU2Gate {
    /// Create a new gate from Euler angles.
    ///
    /// Outcomes are recorded under `b_q{k}[label]` for measured nodes `k`, so
    /// gates run against the same outcome store must have distinct labels. The
    /// empty label is allowed.
    pub fn new<L>(alpha: f64, beta: f64, gamma: f64, label: L) -> Self
    where L: Into<GateLabel>
    {
        let label = label.into();
        let graph = Self::build(alpha, beta, gamma, false, label);
        Self { alpha, beta, gamma, collapse: false, graph }
    }

    /// Set whether measured qubits are rotated back to the measured basis
    /// state.
    pub fn with_collapse(self, collapse: bool) -> Self {
        let Self { alpha, beta, gamma, graph, .. } = self;
        let label = graph.label().clone();
        let graph = Self::build(alpha, beta, gamma, collapse, label);
        Self { alpha, beta, gamma, collapse, graph }
    }

    fn build(alpha: f64, beta: f64, gamma: f64, collapse: bool, label: GateLabel)
        -> GateGraph
    {
        let proj = Operation::Projector { collapse };
        let measure = |formula: Formula, deps: Vec<usize>| -> GateNode {
            let dependencies = deps.into_iter().map(|k| label.slot(k)).collect();
            GateNode::from_slots_unchecked(
                vec![Slot { operation: proj, formula, dependencies }])
        };
        let nodes = vec![
            measure(Formula::Angle { phi: 0.0, key: label.slot(0) }, vec![]),
            measure(Formula::FlippedAngle { base: alpha, key: label.slot(1) }, vec![0]),
            measure(Formula::FlippedAngle { base: beta, key: label.slot(2) }, vec![1]),
            measure(Formula::FlippedAngle { base: gamma, key: label.slot(3) }, vec![2]),
            GateNode::from_slots_unchecked(vec![
                Slot {
                    operation: Operation::XPow,
                    formula: Formula::ParityExponent,
                    dependencies: vec![label.slot(1), label.slot(3)],
                },
                Slot {
                    operation: Operation::ZPow,
                    formula: Formula::ParityExponent,
                    dependencies: vec![label.slot(0), label.slot(2)],
                },
            ]),
        ];
        GateGraph::path_unchecked(label, nodes)
    }

    /// Return the Euler angles (α, β, γ).
    pub fn angles(&self) -> (f64, f64, f64) { (self.alpha, self.beta, self.gamma) }

    /// Return `true` if measured qubits are rotated back after measurement.
    pub fn collapse(&self) -> bool { self.collapse }

    /// Return the ideal single-qubit unitary
    /// *H* *P*(γ) *H* *P*(β) *H* *P*(α) *H* carried out by the gate.
    pub fn logical_unitary(&self) -> na::Matrix2<C64> {
        let h: &na::Matrix2<C64> = &HADAMARD;
        h * phase_shift(self.gamma)
            * h * phase_shift(self.beta)
            * h * phase_shift(self.alpha)
            * h
    }
}

impl MbqGate for SU2Gate {
    fn gate_graph(&self) -> &GateGraph { &self.graph }
}

macro_rules! pauli_pow_gate {
    (
        $(#[$meta:meta])*
        $name:ident, $angles:expr
    ) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq)]
        pub struct $name {
            exponent: f64,
            su2: SU2Gate,
        }

        impl $name {
            /// Create a new gate with exponent `theta`.
            pub fn new<L>(theta: f64, label: L) -> Self
            where L: Into<GateLabel>
            {
                let (alpha, beta, gamma) = $angles(theta);
                Self { exponent: theta, su2: SU2Gate::new(alpha, beta, gamma, label) }
            }

            /// Set whether measured qubits are rotated back to the measured
            /// basis state.
            pub fn with_collapse(self, collapse: bool) -> Self {
                Self { exponent: self.exponent, su2: self.su2.with_collapse(collapse) }
            }

            /// Return the exponent.
            pub fn exponent(&self) -> f64 { self.exponent }

            /// Return the ideal single-qubit unitary carried out by the gate.
            pub fn logical_unitary(&self) -> na::Matrix2<C64> {
                self.su2.logical_unitary()
            }
        }

        impl MbqGate for $name {
            fn gate_graph(&self) -> &GateGraph { self.su2.gate_graph() }
        }

        impl From<$name> for SU2Gate {
            fn from(gate: $name) -> Self { gate.su2 }
        }
    }
}

pauli_pow_gate!(
    /// *X*<sup>θ</sup> as an [`SU2Gate`] with (α, β, γ) = (0, 0, -πθ).
    ///
    /// The logical unitary is *H* *P*(-πθ) *H*, which is exactly
    /// *X*<sup>θ</sup> at integer θ with no extra phase.
    XPowGate, |theta: f64| (0.0, 0.0, -PI * theta)
);

pauli_pow_gate!(
    /// *Y*<sup>θ</sup> as an [`SU2Gate`] with (α, β, γ) = (-πθ, -πθ, 0).
    ///
    /// The logical unitary is *P*(-πθ) *H* *P*(-πθ) *H*, which at integer θ is
    /// *Z*<sup>θ</sup> *X*<sup>θ</sup>: the identity for even θ and *i* *Y*
    /// for odd θ. The factor *i* is kept.
    YPowGate, |theta: f64| (-PI * theta, -PI * theta, 0.0)
);

pauli_pow_gate!(
    /// *Z*<sup>θ</sup> as an [`SU2Gate`] with (α, β, γ) = (0, -πθ, 0).
    ///
    /// The logical unitary is *P*(-πθ), which is exactly *Z*<sup>θ</sup> at
    /// integer θ with no extra phase.
    ZPowGate, |theta: f64| (0.0, -PI * theta, 0.0)
);
