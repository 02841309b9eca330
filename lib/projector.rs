//! Single-qubit projective measurements in rotated bases.
//!
//! A [`Projector`] with axis φ measures in the basis
//! ∣±<sub>φ</sub>⟩ = (∣0⟩ ± *e*<sup>*iφ*</sup>∣1⟩) / √2. Since backends only
//! measure in the Z-basis, this is done by rotating with
//! *H* *Z*<sup>-φ/π</sup>, which maps ∣+<sub>φ</sub>⟩ → ∣0⟩ and
//! ∣-<sub>φ</sub>⟩ → ∣1⟩, measuring, and optionally rotating back so that the
//! qubit is left in the basis state matching the outcome.

use std::f64::consts::{ FRAC_1_SQRT_2, FRAC_PI_2, PI };
use nalgebra as na;
use num_complex::Complex64 as C64;
use crate::{
    circuit::{ Backend, BackendResult, Op },
    gate::Gate,
    outcome::{ Outcome, OutcomeKey },
};

/// Measurement axis.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Axis {
    /// The computational basis.
    Z,
    /// The basis ∣±<sub>φ</sub>⟩ in the equatorial plane.
    Phi(f64),
}

/// Projective measurement of a single qubit, with the outcome saved under a
/// key.
#[derive(Clone, Debug, PartialEq)]
pub struct Projector {
    pub axis: Axis,
    pub key: OutcomeKey,
    pub collapse: bool,
}

impl Projector {
    /// Measure in the ∣±<sub>φ</sub>⟩ basis.
    pub fn phi<K>(phi: f64, key: K) -> Self
    where K: Into<OutcomeKey>
    {
        Self { axis: Axis::Phi(phi), key: key.into(), collapse: false }
    }

    /// Like [`Self::phi`], with the outcome saved under `"B_phi"`.
    pub fn phi_default(phi: f64) -> Self { Self::phi(phi, "B_phi") }

    /// Measure in the X-basis (φ = 0).
    pub fn x<K>(key: K) -> Self
    where K: Into<OutcomeKey>
    {
        Self::phi(0.0, key)
    }

    /// Measure in the X-basis, with the outcome saved under `"X"`.
    pub fn x_default() -> Self { Self::x("X") }

    /// Measure in the Y-basis (φ = π/2).
    pub fn y<K>(key: K) -> Self
    where K: Into<OutcomeKey>
    {
        Self::phi(FRAC_PI_2, key)
    }

    /// Measure in the Y-basis, with the outcome saved under `"Y"`.
    pub fn y_default() -> Self { Self::y("Y") }

    /// Measure in the Z-basis.
    pub fn z<K>(key: K) -> Self
    where K: Into<OutcomeKey>
    {
        Self { axis: Axis::Z, key: key.into(), collapse: false }
    }

    /// Measure in the Z-basis, with the outcome saved under `"Z"`.
    pub fn z_default() -> Self { Self::z("Z") }

    /// Set whether the qubit should be rotated back after measurement, so that
    /// it's left in the basis state corresponding to the outcome rather than
    /// ∣0⟩ or ∣1⟩.
    pub fn with_collapse(mut self, collapse: bool) -> Self {
        self.collapse = collapse;
        self
    }

    /// Return the measurement angle, if the axis isn't Z.
    pub fn angle(&self) -> Option<f64> {
        match self.axis {
            Axis::Z => None,
            Axis::Phi(phi) => Some(phi),
        }
    }

    fn rotations(&self, qubit: usize) -> (Vec<Gate>, Vec<Gate>) {
        match self.axis {
            Axis::Z => (Vec::new(), Vec::new()),
            Axis::Phi(phi) => {
                let pre = vec![Gate::ZPow(qubit, -phi / PI), Gate::H(qubit)];
                let post
                    = if self.collapse {
                        vec![Gate::H(qubit), Gate::ZPow(qubit, phi / PI)]
                    } else {
                        Vec::new()
                    };
                (pre, post)
            },
        }
    }

    /// Return the operations performing the measurement on `qubit`.
    pub fn decompose(&self, qubit: usize) -> Vec<Op> {
        let (pre, post) = self.rotations(qubit);
        pre.into_iter().map(Op::Gate)
            .chain(std::iter::once(Op::Measure(qubit, self.key.clone())))
            .chain(post.into_iter().map(Op::Gate))
            .collect()
    }

    /// Return the two basis states of the measurement, with the state
    /// associated with outcome 0 first.
    pub fn basis(&self) -> [na::Vector2<C64>; 2] {
        let zero = C64::from(0.0);
        let one = C64::from(1.0);
        match self.axis {
            Axis::Z => [na::Vector2::new(one, zero), na::Vector2::new(zero, one)],
            Axis::Phi(phi) => {
                let h = C64::from(FRAC_1_SQRT_2);
                let e = C64::cis(phi);
                [na::Vector2::new(h, h * e), na::Vector2::new(h, -h * e)]
            },
        }
    }

    /// Perform the measurement on `qubit` of a backend.
    pub fn apply<B>(&self, qubit: usize, backend: &mut B)
        -> BackendResult<Outcome>
    where B: Backend + ?Sized
    {
        let (pre, post) = self.rotations(qubit);
        pre.into_iter().try_for_each(|g| backend.apply_gate(g))?;
        let outcome = backend.measure(qubit, self.key.clone())?;
        post.into_iter().try_for_each(|g| backend.apply_gate(g))?;
        Ok(outcome)
    }
}
