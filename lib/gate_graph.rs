//! Gates as dependency graphs of adaptive single-qubit measurements.
//!
//! A [`GateGraph`] is a fixed list of [`GateNode`]s, one per physical qubit
//! of the resource state it acts on, plus the edges of that resource state.
//! Every node holds one or more [`Slot`]s; each slot pairs an [`Operation`]
//! with a [`Formula`] that computes its parameters from the classical outcomes
//! named in its dependency list.
//!
//! Formulas are plain data rather than closures so that a graph can be
//! inspected (and its dependency structure checked) without running it.

use thiserror::Error;
use rustc_hash::FxHashSet;
use crate::outcome::{ GateLabel, Outcome, OutcomeKey, OutcomeResult, Outcomes };

#[derive(Debug, Error, Clone, PartialEq)]
pub enum GateGraphError {
    #[error("node has {operations} operations, {formulas} formulas, and {dependencies} dependency lists")]
    SlotCountMismatch {
        operations: usize,
        formulas: usize,
        dependencies: usize,
    },

    #[error("formula in slot {slot} does not match its operation")]
    KindMismatch { slot: usize },

    #[error("node {node} depends on {key}, which is not produced by any earlier node")]
    ForwardDependency { node: usize, key: OutcomeKey },

    #[error("outcome {0} is produced more than once")]
    DuplicateKey(OutcomeKey),

    #[error("outcome {0} does not belong to this gate")]
    ForeignKey(OutcomeKey),

    #[error("edge ({0}, {1}) is invalid")]
    BadEdge(usize, usize),
}
pub type GateGraphResult<T> = Result<T, GateGraphError>;
use GateGraphError::*;

/// The kind of operation performed by a slot.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Operation {
    /// Measurement with a [`Projector`][crate::projector::Projector] in the
    /// ∣±<sub>φ</sub>⟩ basis.
    Projector { collapse: bool },
    /// *X*<sup>*t*</sup>
    XPow,
    /// *Z*<sup>*t*</sup>
    ZPow,
}

impl Operation {
    /// Return `true` if `self` is a measurement.
    pub fn is_projector(&self) -> bool { matches!(self, Self::Projector { .. }) }
}

/// Resolved classical inputs to a [`Formula`], in dependency order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Inputs(pub Vec<(OutcomeKey, Outcome)>);

impl Inputs {
    /// Look up every key in a store.
    ///
    /// Fails on the first key that hasn't been recorded.
    pub fn resolve(keys: &[OutcomeKey], store: &Outcomes) -> OutcomeResult<Self> {
        keys.iter()
            .map(|k| Ok((k.clone(), store.get(k)?)))
            .collect::<OutcomeResult<Vec<_>>>()
            .map(Self)
    }

    /// Return the sum of all inputs modulo 2.
    pub fn parity(&self) -> Outcome {
        self.0.iter()
            .fold(false, |acc, (_, b)| acc ^ b.is_one())
            .into()
    }

    /// Return the number of inputs.
    pub fn len(&self) -> usize { self.0.len() }

    /// Return `true` if there are no inputs.
    pub fn is_empty(&self) -> bool { self.0.is_empty() }
}

/// Parameters produced by a [`Formula`].
#[derive(Clone, Debug, PartialEq)]
pub enum Params {
    /// Measurement angle and the key to record the outcome under.
    Projector { phi: f64, key: OutcomeKey },
    /// Exponent of a power gate.
    Exponent(f64),
}

/// Descriptor for the parameters of a slot as a function of its inputs.
#[derive(Clone, Debug, PartialEq)]
pub enum Formula {
    /// Measure at a fixed angle.
    Angle { phi: f64, key: OutcomeKey },
    /// Measure at φ = -`base` (-1)<sup>*p*</sup>, where *p* is the parity of
    /// the inputs.
    FlippedAngle { base: f64, key: OutcomeKey },
    /// Use the parity of the inputs as an exponent.
    ParityExponent,
    /// Use a fixed exponent.
    Exponent(f64),
}

impl Formula {
    /// Return `true` if `self` produces measurement parameters.
    pub fn is_projector(&self) -> bool {
        matches!(self, Self::Angle { .. } | Self::FlippedAngle { .. })
    }

    /// Return the key of the outcome produced by the slot, if any.
    pub fn produces(&self) -> Option<&OutcomeKey> {
        match self {
            Self::Angle { key, .. } | Self::FlippedAngle { key, .. }
                => Some(key),
            Self::ParityExponent | Self::Exponent(_) => None,
        }
    }

    /// Compute parameters.
    pub fn eval(&self, inputs: &Inputs) -> Params {
        match self {
            Self::Angle { phi, key }
                => Params::Projector { phi: *phi, key: key.clone() },
            Self::FlippedAngle { base, key }
                => Params::Projector {
                    phi: -base * inputs.parity().sign(),
                    key: key.clone(),
                },
            Self::ParityExponent
                => Params::Exponent(f64::from(inputs.parity().as_u8())),
            Self::Exponent(t)
                => Params::Exponent(*t),
        }
    }
}

/// A single operation in a node, with the formula for its parameters and the
/// outcomes the formula takes as input.
#[derive(Clone, Debug, PartialEq)]
pub struct Slot {
    pub operation: Operation,
    pub formula: Formula,
    pub dependencies: Vec<OutcomeKey>,
}

/// One vertex of a gate graph, acting on a single physical qubit.
#[derive(Clone, Debug, PartialEq)]
pub struct GateNode {
    slots: Vec<Slot>,
}

impl GateNode {
    /// Create a new node from parallel lists of operations, formulas, and
    /// dependencies.
    ///
    /// Fails if the three lists differ in length, or if a measurement is
    /// paired with an exponent formula or vice versa.
    pub fn new(
        operations: Vec<Operation>,
        formulas: Vec<Formula>,
        dependencies: Vec<Vec<OutcomeKey>>,
    ) -> GateGraphResult<Self>
    {
        if operations.len() != formulas.len()
            || formulas.len() != dependencies.len()
        {
            return Err(SlotCountMismatch {
                operations: operations.len(),
                formulas: formulas.len(),
                dependencies: dependencies.len(),
            });
        }
        let slots: Vec<Slot>
            = operations.into_iter()
            .zip(formulas)
            .zip(dependencies)
            .map(|((operation, formula), dependencies)| {
                Slot { operation, formula, dependencies }
            })
            .collect();
        Self::from_slots(slots)
    }

    /// Create a new node from a list of slots.
    pub fn from_slots(slots: Vec<Slot>) -> GateGraphResult<Self> {
        let bad_slot
            = slots.iter()
            .position(|s| s.operation.is_projector() != s.formula.is_projector());
        if let Some(slot) = bad_slot { return Err(KindMismatch { slot }); }
        Ok(Self { slots })
    }

    // for nodes that are valid by construction
    pub(crate) fn from_slots_unchecked(slots: Vec<Slot>) -> Self {
        Self { slots }
    }

    /// Return all slots in order.
    pub fn slots(&self) -> &[Slot] { &self.slots }

    /// Return the number of slots.
    pub fn len(&self) -> usize { self.slots.len() }

    /// Return `true` if the node has no slots.
    pub fn is_empty(&self) -> bool { self.slots.is_empty() }

    /// Iterate over the keys of all outcomes produced by the node.
    pub fn produces(&self) -> impl Iterator<Item = &OutcomeKey> + '_ {
        self.slots.iter().filter_map(|s| s.formula.produces())
    }
}

/// An immutable, labeled graph of [`GateNode`]s.
///
/// Node *k* acts on the *k*-th qubit passed to the executor, and nodes are
/// always executed in ascending order.
#[derive(Clone, Debug, PartialEq)]
pub struct GateGraph {
    label: GateLabel,
    nodes: Vec<GateNode>,
    edges: Vec<(usize, usize)>,
}

impl GateGraph {
    /// Create a new gate graph.
    ///
    /// Fails if any edge references a missing node or is a self-loop, if any
    /// produced outcome isn't keyed to `label` or is produced twice, or if any
    /// node depends on an outcome that isn't produced by a node strictly
    /// before it.
    pub fn new(label: GateLabel, nodes: Vec<GateNode>, edges: Vec<(usize, usize)>)
        -> GateGraphResult<Self>
    {
        let graph = Self { label, nodes, edges };
        graph.validate()?;
        Ok(graph)
    }

    /// Like [`Self::new`], with edges forming the path `0 - 1 - ... - (n - 1)`.
    pub fn path(label: GateLabel, nodes: Vec<GateNode>) -> GateGraphResult<Self> {
        let edges = (1..nodes.len()).map(|k| (k - 1, k)).collect();
        Self::new(label, nodes, edges)
    }

    // for graphs that are valid by construction; checked in tests
    pub(crate) fn path_unchecked(label: GateLabel, nodes: Vec<GateNode>)
        -> Self
    {
        let edges = (1..nodes.len()).map(|k| (k - 1, k)).collect();
        Self { label, nodes, edges }
    }

    /// Check the structural invariants listed in [`Self::new`].
    pub fn validate(&self) -> GateGraphResult<()> {
        let n = self.nodes.len();
        if let Some((a, b))
            = self.edges.iter().find(|(a, b)| *a >= n || *b >= n || a == b)
        {
            return Err(BadEdge(*a, *b));
        }
        let mut produced: FxHashSet<&OutcomeKey> = FxHashSet::default();
        for (k, node) in self.nodes.iter().enumerate() {
            let missing
                = node.slots.iter()
                .flat_map(|s| s.dependencies.iter())
                .find(|dep| !produced.contains(dep));
            if let Some(key) = missing {
                return Err(ForwardDependency { node: k, key: key.clone() });
            }
            for key in node.produces() {
                if key.gate() != Some(&self.label) {
                    return Err(ForeignKey(key.clone()));
                }
                if !produced.insert(key) {
                    return Err(DuplicateKey(key.clone()));
                }
            }
        }
        Ok(())
    }

    /// Return the gate label.
    pub fn label(&self) -> &GateLabel { &self.label }

    /// Return the number of nodes, which is also the number of physical qubits
    /// the gate acts on.
    pub fn len(&self) -> usize { self.nodes.len() }

    /// Return `true` if the graph has no nodes.
    pub fn is_empty(&self) -> bool { self.nodes.is_empty() }

    /// Return all nodes in execution order.
    pub fn nodes(&self) -> &[GateNode] { &self.nodes }

    /// Return a single node.
    pub fn node(&self, k: usize) -> Option<&GateNode> { self.nodes.get(k) }

    /// Return all edges.
    pub fn edges(&self) -> &[(usize, usize)] { &self.edges }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn measure(label: &GateLabel, k: usize, deps: Vec<OutcomeKey>) -> GateNode {
        GateNode::new(
            vec![Operation::Projector { collapse: false }],
            vec![Formula::FlippedAngle { base: 0.5, key: label.slot(k) }],
            vec![deps],
        ).unwrap()
    }

    #[test]
    fn slot_count_mismatch() {
        let label = GateLabel::from("g");
        let res = GateNode::new(
            vec![Operation::XPow, Operation::ZPow],
            vec![Formula::ParityExponent],
            vec![vec![], vec![]],
        );
        assert_eq!(
            res,
            Err(SlotCountMismatch { operations: 2, formulas: 1, dependencies: 2 }),
        );
        let res = GateNode::new(
            vec![Operation::XPow],
            vec![Formula::ParityExponent],
            vec![vec![label.slot(0)], vec![]],
        );
        assert!(matches!(res, Err(SlotCountMismatch { dependencies: 2, .. })));
    }

    #[test]
    fn kind_mismatch() {
        let res = GateNode::new(
            vec![Operation::XPow, Operation::Projector { collapse: true }],
            vec![Formula::Exponent(1.0), Formula::ParityExponent],
            vec![vec![], vec![]],
        );
        assert_eq!(res, Err(KindMismatch { slot: 1 }));
    }

    #[test]
    fn forward_dependencies_rejected() {
        let label = GateLabel::from("g");
        // node 1 depending on itself
        let nodes = vec![
            measure(&label, 0, vec![]),
            measure(&label, 1, vec![label.slot(1)]),
        ];
        assert_eq!(
            GateGraph::path(label.clone(), nodes),
            Err(ForwardDependency { node: 1, key: label.slot(1) }),
        );
        // node 0 depending on node 1
        let nodes = vec![
            measure(&label, 0, vec![label.slot(1)]),
            measure(&label, 1, vec![]),
        ];
        assert_eq!(
            GateGraph::path(label.clone(), nodes),
            Err(ForwardDependency { node: 0, key: label.slot(1) }),
        );
        let nodes = vec![
            measure(&label, 0, vec![]),
            measure(&label, 1, vec![label.slot(0)]),
        ];
        let graph = GateGraph::path(label.clone(), nodes).unwrap();
        assert_eq!(graph.edges(), &[(0, 1)]);
        let produced: Vec<&OutcomeKey>
            = graph.nodes().iter().flat_map(|node| node.produces()).collect();
        assert_eq!(produced, vec![&label.slot(0), &label.slot(1)]);
    }

    #[test]
    fn key_ownership() {
        let label = GateLabel::from("g");
        let other = GateLabel::from("h");
        let nodes = vec![measure(&label, 0, vec![]), measure(&other, 1, vec![])];
        assert_eq!(
            GateGraph::path(label.clone(), nodes),
            Err(ForeignKey(other.slot(1))),
        );
        let nodes = vec![measure(&label, 0, vec![]), measure(&label, 0, vec![])];
        assert_eq!(
            GateGraph::path(label.clone(), nodes),
            Err(DuplicateKey(label.slot(0))),
        );
    }

    #[test]
    fn bad_edges() {
        let label = GateLabel::from("g");
        let nodes = vec![measure(&label, 0, vec![])];
        assert_eq!(
            GateGraph::new(label.clone(), nodes.clone(), vec![(0, 1)]),
            Err(BadEdge(0, 1)),
        );
        assert_eq!(
            GateGraph::new(label, nodes, vec![(0, 0)]),
            Err(BadEdge(0, 0)),
        );
    }

    #[test]
    fn formulas() {
        let label = GateLabel::from("g");
        let even = Inputs(vec![
            (label.slot(0), Outcome::One),
            (label.slot(1), Outcome::One),
        ]);
        let odd = Inputs(vec![(label.slot(0), Outcome::One)]);
        let flipped = Formula::FlippedAngle { base: 0.25, key: label.slot(2) };
        assert_eq!(
            flipped.eval(&even),
            Params::Projector { phi: -0.25, key: label.slot(2) },
        );
        assert_eq!(
            flipped.eval(&odd),
            Params::Projector { phi: 0.25, key: label.slot(2) },
        );
        assert_eq!(Formula::ParityExponent.eval(&even), Params::Exponent(0.0));
        assert_eq!(Formula::ParityExponent.eval(&odd), Params::Exponent(1.0));
        assert_eq!(Formula::Exponent(0.3).eval(&odd), Params::Exponent(0.3));
        assert_eq!(Formula::ParityExponent.eval(&Inputs::default()), Params::Exponent(0.0));
        assert_eq!(flipped.produces(), Some(&label.slot(2)));
        assert_eq!(Formula::ParityExponent.produces(), None);
    }

    #[test]
    fn resolve_inputs() {
        let label = GateLabel::from("g");
        let mut store = Outcomes::new();
        let keys = [label.slot(0), label.slot(1)];
        assert_eq!(
            Inputs::resolve(&keys, &store),
            Err(crate::outcome::OutcomeError::Unresolved(label.slot(0))),
        );
        store.record(label.slot(0), Outcome::One).unwrap()
            .record(label.slot(1), Outcome::Zero).unwrap();
        let inputs = Inputs::resolve(&keys, &store).unwrap();
        assert_eq!(inputs.len(), 2);
        assert_eq!(inputs.parity(), Outcome::One);
    }
}
