//! Unitary gates, Pauli operators, and a few small matrix utilities.
//!
//! Single-qubit power gates follow the convention
//! *Z*<sup>*t*</sup> = diag(1, *e*<sup>*iπt*</sup>) and
//! *X*<sup>*t*</sup> = *H* *Z*<sup>*t*</sup> *H*, so that integer powers
//! reproduce the usual Pauli matrices exactly and *t* = 2 is the identity.

use std::{ f64::consts::{ FRAC_1_SQRT_2, PI }, fmt };
use nalgebra as na;
use num_complex::Complex64 as C64;
use once_cell::sync::Lazy;

/// The argument of a complex phase factor, limited to integer multiples of
/// π/2.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Phase {
    /// 0
    Pi0,
    /// π/2
    Pi1h,
    /// π
    Pi,
    /// 3π/2
    Pi3h,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Pi0 => write!(f, "+1"),
            Self::Pi1h => write!(f, "+i"),
            Self::Pi => write!(f, "-1"),
            Self::Pi3h => write!(f, "-i"),
        }
    }
}

impl Phase {
    pub fn as_complex(self) -> C64 {
        match self {
            Self::Pi0  => 1.0_f64.into(),
            Self::Pi1h => C64::i(),
            Self::Pi   => (-1.0_f64).into(),
            Self::Pi3h => -C64::i(),
        }
    }
}

/// Description of a single gate for a register of qubits.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Gate {
    /// Hadamard
    H(usize),
    /// π rotation about X
    X(usize),
    /// π rotation about Y
    Y(usize),
    /// π rotation about Z
    Z(usize),
    /// π/2 rotation about Z
    S(usize),
    /// X raised to a real power, *X*<sup>*t*</sup> = *H* *Z*<sup>*t*</sup> *H*.
    XPow(usize, f64),
    /// Z raised to a real power, *Z*<sup>*t*</sup> = diag(1, *e*<sup>*iπt*</sup>).
    ZPow(usize, f64),
    /// Z-controlled π rotation about X.
    ///
    /// The first qubit index is the control.
    CX(usize, usize),
    /// Z-controlled π rotation about Z.
    CZ(usize, usize),
}

impl Gate {
    /// Return the qubit indices the gate acts on.
    pub fn qubits(&self) -> (usize, Option<usize>) {
        match *self {
            Self::H(k)
            | Self::X(k)
            | Self::Y(k)
            | Self::Z(k)
            | Self::S(k)
            | Self::XPow(k, _)
            | Self::ZPow(k, _)
            => (k, None),
            Self::CX(a, b)
            | Self::CZ(a, b)
            => (a, Some(b)),
        }
    }

    /// Return the 2×2 matrix of a single-qubit gate, or `None` for two-qubit
    /// gates.
    pub fn matrix(&self) -> Option<na::Matrix2<C64>> {
        match *self {
            Self::H(_) => Some(*Lazy::force(&HADAMARD)),
            Self::X(_) => Some(*Lazy::force(&PAULI_X)),
            Self::Y(_) => Some(*Lazy::force(&PAULI_Y)),
            Self::Z(_) => Some(*Lazy::force(&PAULI_Z)),
            Self::S(_) => Some(zpow_matrix(0.5)),
            Self::XPow(_, t) => Some(xpow_matrix(t)),
            Self::ZPow(_, t) => Some(zpow_matrix(t)),
            Self::CX(..) | Self::CZ(..) => None,
        }
    }
}

/// *Z*<sup>*t*</sup> = diag(1, *e*<sup>*iπt*</sup>).
pub fn zpow_matrix(t: f64) -> na::Matrix2<C64> {
    let zero = C64::from(0.0);
    na::Matrix2::new(
        C64::from(1.0), zero,
        zero,           C64::cis(PI * t),
    )
}

/// *X*<sup>*t*</sup> = *H* *Z*<sup>*t*</sup> *H*.
pub fn xpow_matrix(t: f64) -> na::Matrix2<C64> {
    let h = Lazy::force(&HADAMARD);
    h * zpow_matrix(t) * h
}

/// Phase-shift gate *P*(φ) = diag(1, *e*<sup>*iφ*</sup>).
pub fn phase_shift(phi: f64) -> na::Matrix2<C64> { zpow_matrix(phi / PI) }

pub static HADAMARD: Lazy<na::Matrix2<C64>> =
    Lazy::new(|| {
        let h = C64::from(FRAC_1_SQRT_2);
        na::Matrix2::new(h, h, h, -h)
    });

pub static PAULI_I: Lazy<na::Matrix2<C64>> =
    Lazy::new(|| na::Matrix2::identity());

pub static PAULI_X: Lazy<na::Matrix2<C64>> =
    Lazy::new(|| {
        let (zero, one) = (C64::from(0.0), C64::from(1.0));
        na::Matrix2::new(zero, one, one, zero)
    });

pub static PAULI_Y: Lazy<na::Matrix2<C64>> =
    Lazy::new(|| {
        let zero = C64::from(0.0);
        na::Matrix2::new(zero, -C64::i(), C64::i(), zero)
    });

pub static PAULI_Z: Lazy<na::Matrix2<C64>> =
    Lazy::new(|| {
        let (zero, one) = (C64::from(0.0), C64::from(1.0));
        na::Matrix2::new(one, zero, zero, -one)
    });

/// A single-qubit Pauli operator.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Pauli {
    /// Identity
    I,
    /// σ<sub>*x*</sub>
    X,
    /// σ<sub>*y*</sub>
    Y,
    /// σ<sub>*z*</sub>
    Z,
}

impl fmt::Display for Pauli {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::I => write!(f, "{}", if f.alternate() { "." } else { "I" }),
            _ => write!(f, "{:?}", self),
        }
    }
}

impl Pauli {
    /// Return the 2×2 matrix of the operator.
    pub fn matrix(self) -> &'static na::Matrix2<C64> {
        match self {
            Self::I => Lazy::force(&PAULI_I),
            Self::X => Lazy::force(&PAULI_X),
            Self::Y => Lazy::force(&PAULI_Y),
            Self::Z => Lazy::force(&PAULI_Z),
        }
    }
}

/// Return the coefficients *a*<sub>*k*</sub> = tr(σ<sub>*k*</sub> *M*) / 2 of
/// a 2×2 matrix *M* in the Pauli basis, ordered (*I*, *X*, *Y*, *Z*), so that
/// *M* = Σ<sub>*k*</sub> *a*<sub>*k*</sub> σ<sub>*k*</sub>.
pub fn pauli_decomp(mat: &na::Matrix2<C64>) -> [C64; 4] {
    [Pauli::I, Pauli::X, Pauli::Y, Pauli::Z]
        .map(|p| (p.matrix() * mat).trace() * 0.5)
}

/// A tensor product of single-qubit Paulis with an overall phase.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NPauli {
    pub phase: Phase,
    pub ops: Vec<Pauli>,
}

impl fmt::Display for NPauli {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.phase.fmt(f)?;
        write!(f, " ")?;
        self.ops.iter()
            .try_for_each(|p| p.fmt(f))
    }
}

impl NPauli {
    /// Create an `n`-qubit identity with `+1` phase.
    pub fn identity(n: usize) -> Self {
        Self { phase: Phase::Pi0, ops: vec![Pauli::I; n] }
    }

    /// Return the number of qubits.
    pub fn len(&self) -> usize { self.ops.len() }

    /// Return `true` if `self` acts on no qubits.
    pub fn is_empty(&self) -> bool { self.ops.is_empty() }

    /// Set the operator on qubit `k`.
    ///
    /// Does nothing if `k` is out of bounds.
    pub fn set(&mut self, k: usize, op: Pauli) -> &mut Self {
        if let Some(p) = self.ops.get_mut(k) { *p = op; }
        self
    }
}
