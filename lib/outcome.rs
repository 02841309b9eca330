//! Classical measurement outcomes and the write-once store they are kept in.
//!
//! Measurements are keyed by [`OutcomeKey`]s rather than bare strings: a
//! measurement belonging to a gate graph is identified by the label of the gate
//! instance and the index of the node that produced it, so that two gates can
//! only collide if they share a label. Gate labels are *claimed* in an
//! [`Outcomes`] store before execution, which makes such a collision an
//! explicit error.

use std::fmt;
use rustc_hash::{ FxHashMap, FxHashSet };
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum OutcomeError {
    #[error("outcome for {0} has already been recorded")]
    Rewrite(OutcomeKey),

    #[error("outcome for {0} has not been recorded yet")]
    Unresolved(OutcomeKey),

    #[error("gate label '{0}' is already in use in this outcome store")]
    LabelCollision(GateLabel),
}
pub type OutcomeResult<T> = Result<T, OutcomeError>;
use OutcomeError::*;

/// The result of a single-qubit measurement in the computational basis.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Outcome {
    /// ∣0⟩
    Zero,
    /// ∣1⟩
    One,
}

impl From<bool> for Outcome {
    fn from(b: bool) -> Self { if b { Self::One } else { Self::Zero } }
}

impl From<Outcome> for u8 {
    fn from(outcome: Outcome) -> Self { outcome.as_u8() }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_u8())
    }
}

impl Outcome {
    /// Return `0` or `1`.
    pub fn as_u8(self) -> u8 {
        match self {
            Self::Zero => 0,
            Self::One => 1,
        }
    }

    /// Return `true` if `self` is `One`.
    pub fn is_one(self) -> bool { matches!(self, Self::One) }

    /// Return (-1)<sup>*b*</sup>.
    pub fn sign(self) -> f64 {
        match self {
            Self::Zero => 1.0,
            Self::One => -1.0,
        }
    }
}

/// Identifier for a single gate instance.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GateLabel(pub String);

impl fmt::Display for GateLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for GateLabel {
    fn from(s: &str) -> Self { Self(s.to_string()) }
}

impl From<String> for GateLabel {
    fn from(s: String) -> Self { Self(s) }
}

impl GateLabel {
    /// Return the key of the measurement made at `node` of the gate.
    pub fn slot(&self, node: usize) -> OutcomeKey {
        OutcomeKey::Slot { gate: self.clone(), node }
    }
}

/// Key identifying a single measurement outcome.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum OutcomeKey {
    /// A free-standing measurement with a plain name.
    Named(String),
    /// The measurement made at node `node` of the gate labeled `gate`.
    Slot { gate: GateLabel, node: usize },
}

impl fmt::Display for OutcomeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named(name) => write!(f, "{}", name),
            Self::Slot { gate, node } => write!(f, "b_q{}[{}]", node, gate),
        }
    }
}

impl From<&str> for OutcomeKey {
    fn from(s: &str) -> Self { Self::Named(s.to_string()) }
}

impl From<String> for OutcomeKey {
    fn from(s: String) -> Self { Self::Named(s) }
}

impl OutcomeKey {
    /// Return the gate label if `self` is a `Slot`.
    pub fn gate(&self) -> Option<&GateLabel> {
        match self {
            Self::Named(_) => None,
            Self::Slot { gate, .. } => Some(gate),
        }
    }
}

/// Append-only record of measurement outcomes.
///
/// Each key can be written exactly once; reading a key that hasn't been
/// written is an error. Iteration follows the order in which outcomes were
/// recorded.
#[derive(Clone, Debug, Default)]
pub struct Outcomes {
    data: FxHashMap<OutcomeKey, Outcome>,
    order: Vec<OutcomeKey>,
    labels: FxHashSet<GateLabel>,
}

impl PartialEq for Outcomes {
    fn eq(&self, other: &Self) -> bool {
        self.order == other.order
            && self.order.iter().all(|k| self.data.get(k) == other.data.get(k))
    }
}

impl Outcomes {
    /// Create a new, empty store.
    pub fn new() -> Self { Self::default() }

    /// Return the number of recorded outcomes.
    pub fn len(&self) -> usize { self.order.len() }

    /// Return `true` if no outcomes have been recorded.
    pub fn is_empty(&self) -> bool { self.order.is_empty() }

    /// Return `true` if an outcome has been recorded for `key`.
    pub fn contains(&self, key: &OutcomeKey) -> bool {
        self.data.contains_key(key)
    }

    /// Record a new outcome.
    ///
    /// Fails if an outcome has already been recorded for `key`.
    pub fn record(&mut self, key: OutcomeKey, outcome: Outcome)
        -> OutcomeResult<&mut Self>
    {
        if self.data.contains_key(&key) { return Err(Rewrite(key)); }
        self.order.push(key.clone());
        self.data.insert(key, outcome);
        Ok(self)
    }

    /// Look up a recorded outcome.
    pub fn get(&self, key: &OutcomeKey) -> OutcomeResult<Outcome> {
        self.data.get(key).copied()
            .ok_or_else(|| Unresolved(key.clone()))
    }

    /// Return the sum modulo 2 of a set of recorded outcomes.
    pub fn parity<'a, I>(&self, keys: I) -> OutcomeResult<Outcome>
    where I: IntoIterator<Item = &'a OutcomeKey>
    {
        keys.into_iter()
            .try_fold(false, |acc, key| Ok(acc ^ self.get(key)?.is_one()))
            .map(Outcome::from)
    }

    /// Reserve a gate label for use in this store.
    ///
    /// Fails if the label has already been claimed.
    pub fn claim(&mut self, label: &GateLabel) -> OutcomeResult<&mut Self> {
        if !self.labels.insert(label.clone()) {
            return Err(LabelCollision(label.clone()));
        }
        Ok(self)
    }

    /// Forget all outcomes and claimed labels.
    pub fn clear(&mut self) -> &mut Self {
        self.data.clear();
        self.order.clear();
        self.labels.clear();
        self
    }

    /// Iterate over all outcomes in the order they were recorded.
    pub fn iter(&self) -> impl Iterator<Item = (&OutcomeKey, Outcome)> + '_ {
        self.order.iter().map(|k| (k, self.data[k]))
    }
}

impl fmt::Display for Outcomes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (k, (key, outcome)) in self.iter().enumerate() {
            write!(f, "{}: {}", key, outcome)?;
            if k < self.len() - 1 { write!(f, ", ")?; }
        }
        write!(f, "}}")?;
        Ok(())
    }
}
