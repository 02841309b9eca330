//! Dense state vectors for small registers of qubits.
//!
//! States are stored as a full vector of 2<sup>*n*</sup> complex amplitudes in
//! big-endian order: qubit 0 is the most significant bit of a basis state's
//! index, so that ∣q<sub>0</sub> q<sub>1</sub> ... q<sub>*n*-1</sub>⟩ reads
//! left to right.
//!
//! # Example
//! ```
//! use mbqc_sim::{ gate::Gate, state::StateVec };
//!
//! // initialize a new state to ∣00⟩ and make a Bell pair
//! let mut state = StateVec::new(2);
//! state.apply_gate(Gate::H(0)).unwrap();
//! state.apply_gate(Gate::CX(0, 1)).unwrap();
//! println!("{}", state);
//! // +0.707∣00⟩ +0.707∣11⟩
//! ```

use std::fmt;
use nalgebra as na;
use num_complex::Complex64 as C64;
use rand::Rng;
use thiserror::Error;
use crate::{
    gate::{ Gate, NPauli },
    outcome::Outcome,
};

/// Numerical tolerance used for normalization and equality checks.
pub const EPSILON: f64 = 1e-10;

/// Largest number of qubits a [`StateVec`] can be created with.
pub const MAX_QUBITS: usize = 30;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum StateError {
    #[error("qubit index {0} is out of range for a {1}-qubit state")]
    QubitOutOfRange(usize, usize),

    #[error("two-qubit gate must act on distinct qubits, but got {0} twice")]
    SameQubit(usize),

    #[error("state vector length {0} is not a nonzero power of 2")]
    BadDimension(usize),

    #[error("state vector has zero norm")]
    ZeroNorm,

    #[error("cannot post-select outcome {1} on qubit {0}: zero probability")]
    ImpossibleOutcome(usize, Outcome),

    #[error("mismatched qubit counts: {0} and {1}")]
    QubitCountMismatch(usize, usize),

    #[error("cannot hold {0} qubits in a dense state vector (limit is {MAX_QUBITS})")]
    TooManyQubits(usize),
}
pub type StateResult<T> = Result<T, StateError>;
use StateError::*;

/// A pure state of `n` qubits.
#[derive(Clone, Debug, PartialEq)]
pub struct StateVec {
    n: usize,
    amps: na::DVector<C64>,
}

impl StateVec {
    /// Create a new `n`-qubit state initialized to ∣0...0⟩.
    ///
    /// *Panics if `n` is greater than [`MAX_QUBITS`].*
    pub fn new(n: usize) -> Self {
        if n > MAX_QUBITS {
            panic!("StateVec: {} qubits exceeds the limit of {}", n, MAX_QUBITS);
        }
        let mut amps: na::DVector<C64> = na::DVector::zeros(1 << n);
        amps[0] = C64::from(1.0);
        Self { n, amps }
    }

    /// Like [`Self::new`], but returns an error instead of panicking if `n` is
    /// greater than [`MAX_QUBITS`].
    pub fn try_new(n: usize) -> StateResult<Self> {
        if n > MAX_QUBITS { return Err(TooManyQubits(n)); }
        Ok(Self::new(n))
    }

    /// Create a state from a list of amplitudes, normalizing them.
    pub fn from_amps<I>(amps: I) -> StateResult<Self>
    where I: IntoIterator<Item = C64>
    {
        let amps: Vec<C64> = amps.into_iter().collect();
        let len = amps.len();
        if len == 0 || !len.is_power_of_two() { return Err(BadDimension(len)); }
        let n = len.trailing_zeros() as usize;
        let mut state = Self { n, amps: na::DVector::from_vec(amps) };
        state.normalize()?;
        Ok(state)
    }

    /// Create a product state from single-qubit amplitudes, with the first
    /// item giving the state of qubit 0.
    pub fn from_qubits<I>(qubits: I) -> StateResult<Self>
    where I: IntoIterator<Item = na::Vector2<C64>>
    {
        let mut amps: na::DVector<C64> = na::DVector::from_element(1, 1.0.into());
        let mut n: usize = 0;
        for q in qubits.into_iter() {
            amps = amps.kronecker(&q);
            n += 1;
        }
        let mut state = Self { n, amps };
        state.normalize()?;
        Ok(state)
    }

    /// Return the number of qubits.
    pub fn num_qubits(&self) -> usize { self.n }

    /// Return a reference to the amplitudes.
    pub fn amps(&self) -> &na::DVector<C64> { &self.amps }

    /// Return the norm of the state.
    pub fn norm(&self) -> f64 { self.amps.norm() }

    fn normalize(&mut self) -> StateResult<&mut Self> {
        let norm = self.amps.norm();
        if norm < EPSILON { return Err(ZeroNorm); }
        self.amps.unscale_mut(norm);
        Ok(self)
    }

    fn check_qubit(&self, k: usize) -> StateResult<()> {
        (k < self.n).then_some(()).ok_or(QubitOutOfRange(k, self.n))
    }

    // bit mask for qubit `k` in a basis state index
    fn mask(&self, k: usize) -> usize { 1 << (self.n - 1 - k) }

    fn apply_single(&mut self, k: usize, mat: &na::Matrix2<C64>) {
        let m = self.mask(k);
        let mut a0: C64;
        let mut a1: C64;
        for i in (0..self.amps.len()).filter(|i| i & m == 0) {
            a0 = self.amps[i];
            a1 = self.amps[i | m];
            self.amps[i] = mat[(0, 0)] * a0 + mat[(0, 1)] * a1;
            self.amps[i | m] = mat[(1, 0)] * a0 + mat[(1, 1)] * a1;
        }
    }

    fn apply_cz(&mut self, a: usize, b: usize) {
        let mab = self.mask(a) | self.mask(b);
        self.amps.iter_mut()
            .enumerate()
            .filter(|(i, _)| i & mab == mab)
            .for_each(|(_, amp)| { *amp = -*amp; });
    }

    fn apply_cx(&mut self, c: usize, t: usize) {
        let mc = self.mask(c);
        let mt = self.mask(t);
        for i in (0..self.amps.len()).filter(|i| i & mc != 0 && i & mt == 0) {
            self.amps.swap_rows(i, i | mt);
        }
    }

    /// Perform the action of a gate.
    pub fn apply_gate(&mut self, gate: Gate) -> StateResult<&mut Self> {
        match gate.qubits() {
            (k, None) => {
                self.check_qubit(k)?;
                if let Some(mat) = gate.matrix() { self.apply_single(k, &mat); }
            },
            (a, Some(b)) => {
                self.check_qubit(a)?;
                self.check_qubit(b)?;
                if a == b { return Err(SameQubit(a)); }
                match gate {
                    Gate::CZ(..) => { self.apply_cz(a, b); },
                    Gate::CX(..) => { self.apply_cx(a, b); },
                    _ => unreachable!(),
                }
            },
        }
        Ok(self)
    }

    /// Perform a series of gates.
    pub fn apply_circuit<'a, I>(&mut self, gates: I) -> StateResult<&mut Self>
    where I: IntoIterator<Item = &'a Gate>
    {
        gates.into_iter()
            .try_for_each(|g| self.apply_gate(*g).map(|_| ()))?;
        Ok(self)
    }

    /// Return the probability that a Z-basis measurement of qubit `k` gives
    /// ∣1⟩.
    pub fn prob_one(&self, k: usize) -> StateResult<f64> {
        self.check_qubit(k)?;
        let m = self.mask(k);
        let p = self.amps.iter()
            .enumerate()
            .filter(|(i, _)| i & m != 0)
            .map(|(_, a)| a.norm_sqr())
            .sum();
        Ok(p)
    }

    // zero out the amplitudes incompatible with `outcome` and renormalize
    fn collapse(&mut self, k: usize, outcome: Outcome) -> StateResult<()> {
        let m = self.mask(k);
        let keep = if outcome.is_one() { m } else { 0 };
        self.amps.iter_mut()
            .enumerate()
            .filter(|(i, _)| i & m != keep)
            .for_each(|(_, a)| { *a = C64::from(0.0); });
        self.normalize()
            .map(|_| ())
            .map_err(|_| ImpossibleOutcome(k, outcome))
    }

    /// Perform a projective measurement on qubit `k` in the Z-basis, returning
    /// the outcome and leaving the state collapsed.
    pub fn measure<R>(&mut self, k: usize, rng: &mut R) -> StateResult<Outcome>
    where R: Rng + ?Sized
    {
        let p1 = self.prob_one(k)?;
        let outcome = Outcome::from(rng.gen::<f64>() < p1);
        self.collapse(k, outcome)?;
        Ok(outcome)
    }

    /// Like [`Self::measure`], but deterministically post-selects on a desired
    /// outcome.
    ///
    /// Fails, leaving `self` unchanged, if the outcome has zero probability.
    pub fn measure_postsel(&mut self, k: usize, outcome: Outcome)
        -> StateResult<&mut Self>
    {
        let p1 = self.prob_one(k)?;
        let p = if outcome.is_one() { p1 } else { 1.0 - p1 };
        if p < EPSILON { return Err(ImpossibleOutcome(k, outcome)); }
        self.collapse(k, outcome)?;
        Ok(self)
    }

    /// Compute the inner product ⟨`self`∣`other`⟩.
    pub fn inner(&self, other: &Self) -> StateResult<C64> {
        if self.n != other.n { return Err(QubitCountMismatch(self.n, other.n)); }
        Ok(self.amps.dotc(&other.amps))
    }

    /// Return `true` if `self` and `other` describe the same state up to a
    /// global phase.
    pub fn approx_eq_phase(&self, other: &Self) -> bool {
        self.inner(other)
            .map(|ip| (ip.norm() - 1.0).abs() < 1e-9)
            .unwrap_or(false)
    }

    /// Compute the expectation value ⟨ψ∣*P*∣ψ⟩ of an *n*-qubit Pauli operator.
    pub fn expectation(&self, op: &NPauli) -> StateResult<C64> {
        if op.len() != self.n {
            return Err(QubitCountMismatch(self.n, op.len()));
        }
        let mut applied = self.clone();
        for (k, p) in op.ops.iter().enumerate() {
            applied.apply_single(k, p.matrix());
        }
        applied.amps *= op.phase.as_complex();
        self.inner(&applied)
    }

    /// Extract the state of qubit `k`, assuming it is not entangled with the
    /// rest of the register.
    ///
    /// Returns `None` if qubit `k` is entangled with any other qubit.
    pub fn qubit_state(&self, k: usize) -> Option<na::Vector2<C64>> {
        self.check_qubit(k).ok()?;
        let m = self.mask(k);
        let pairs: Vec<na::Vector2<C64>> =
            (0..self.amps.len())
            .filter(|i| i & m == 0)
            .map(|i| na::Vector2::new(self.amps[i], self.amps[i | m]))
            .collect();
        let largest = pairs.iter()
            .max_by(|l, r| l.norm_squared().total_cmp(&r.norm_squared()))?;
        let v = largest.normalize();
        pairs.iter()
            .all(|p| (v.dotc(p).norm_sqr() - p.norm_squared()).abs() < 1e-9)
            .then_some(v)
    }
}

impl fmt::Display for StateVec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let terms: Vec<(usize, &C64)> =
            self.amps.iter()
            .enumerate()
            .filter(|(_, a)| a.norm() > EPSILON)
            .collect();
        for (j, (i, a)) in terms.iter().enumerate() {
            if a.im.abs() < EPSILON {
                write!(f, "{:+.3}", a.re)?;
            } else if a.re.abs() < EPSILON {
                write!(f, "{:+.3}i", a.im)?;
            } else {
                write!(f, "({:+.3}{:+.3}i)", a.re, a.im)?;
            }
            write!(f, "∣{:0width$b}⟩", i, width = self.n)?;
            if j < terms.len() - 1 { write!(f, " ")?; }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::f64::consts::FRAC_1_SQRT_2;
    use rand::{ rngs::StdRng, SeedableRng };
    use crate::gate::{ Pauli, Phase };
    use super::*;

    fn c(re: f64) -> C64 { C64::from(re) }

    #[test]
    fn register_size_limit() {
        let state = StateVec::try_new(MAX_QUBITS - 20).unwrap();
        assert_eq!(state.num_qubits(), 10);
        assert_eq!(state.amps().len(), 1 << 10);
        assert_eq!(StateVec::try_new(MAX_QUBITS + 1), Err(TooManyQubits(MAX_QUBITS + 1)));
        assert_eq!(StateVec::try_new(64), Err(TooManyQubits(64)));
    }

    #[test]
    #[should_panic]
    fn oversized_register_panics() {
        let _ = StateVec::new(64);
    }

    #[test]
    fn bell_state() {
        let mut state = StateVec::new(2);
        state.apply_gate(Gate::H(0)).unwrap()
            .apply_gate(Gate::CX(0, 1)).unwrap();
        let expected =
            StateVec::from_amps([c(1.0), c(0.0), c(0.0), c(1.0)]).unwrap();
        assert!(state.approx_eq_phase(&expected));
        assert_eq!(format!("{}", state), "+0.707∣00⟩ +0.707∣11⟩");
    }

    #[test]
    fn big_endian_order() {
        let mut state = StateVec::new(3);
        state.apply_gate(Gate::X(0)).unwrap();
        assert_eq!(state.amps()[0b100], c(1.0));
        assert_eq!(state.prob_one(0).unwrap(), 1.0);
        assert_eq!(state.prob_one(2).unwrap(), 0.0);
    }

    #[test]
    fn bad_gates() {
        let mut state = StateVec::new(2);
        assert_eq!(
            state.apply_gate(Gate::H(2)).map(|_| ()),
            Err(QubitOutOfRange(2, 2)),
        );
        assert_eq!(
            state.apply_gate(Gate::CZ(1, 1)).map(|_| ()),
            Err(SameQubit(1)),
        );
        assert_eq!(StateVec::from_amps([c(1.0); 3]), Err(BadDimension(3)));
        assert_eq!(StateVec::from_amps([c(0.0); 4]), Err(ZeroNorm));
    }

    #[test]
    fn measurement_collapses() {
        let mut rng = StdRng::seed_from_u64(10546);
        for _ in 0..20 {
            let mut state = StateVec::new(2);
            state.apply_gate(Gate::H(0)).unwrap()
                .apply_gate(Gate::CX(0, 1)).unwrap();
            let a = state.measure(0, &mut rng).unwrap();
            // perfectly correlated after the first measurement
            let b = state.measure(1, &mut rng).unwrap();
            assert_eq!(a, b);
            assert!((state.norm() - 1.0).abs() < EPSILON);
        }
    }

    #[test]
    fn postselection() {
        let mut state = StateVec::new(1);
        state.apply_gate(Gate::H(0)).unwrap();
        state.measure_postsel(0, Outcome::One).unwrap();
        assert_eq!(state.prob_one(0).unwrap(), 1.0);
        assert_eq!(
            state.measure_postsel(0, Outcome::Zero).map(|_| ()),
            Err(ImpossibleOutcome(0, Outcome::Zero)),
        );
    }

    #[test]
    fn pauli_expectation() {
        let mut state = StateVec::new(2);
        state.apply_gate(Gate::H(0)).unwrap();
        let mut xi = NPauli::identity(2);
        xi.set(0, Pauli::X);
        let mut iz = NPauli::identity(2);
        iz.set(1, Pauli::Z);
        let mut zi = NPauli::identity(2);
        zi.set(0, Pauli::Z);
        assert!((state.expectation(&xi).unwrap() - c(1.0)).norm() < EPSILON);
        assert!((state.expectation(&iz).unwrap() - c(1.0)).norm() < EPSILON);
        assert!(state.expectation(&zi).unwrap().norm() < EPSILON);
        xi.phase = Phase::Pi;
        assert!((state.expectation(&xi).unwrap() - c(-1.0)).norm() < EPSILON);
    }

    #[test]
    fn product_states() {
        let plus = na::Vector2::new(c(FRAC_1_SQRT_2), c(FRAC_1_SQRT_2));
        let one = na::Vector2::new(c(0.0), c(1.0));
        let state = StateVec::from_qubits([one, plus]).unwrap();
        assert_eq!(state.num_qubits(), 2);
        let q1 = state.qubit_state(1).unwrap();
        assert!((q1.dotc(&plus).norm() - 1.0).abs() < 1e-9);
        let q0 = state.qubit_state(0).unwrap();
        assert!((q0.dotc(&one).norm() - 1.0).abs() < 1e-9);

        let mut bell = StateVec::new(2);
        bell.apply_gate(Gate::H(0)).unwrap()
            .apply_gate(Gate::CX(0, 1)).unwrap();
        assert!(bell.qubit_state(0).is_none());
    }
}
