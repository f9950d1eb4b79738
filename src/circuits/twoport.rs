//! ABCD (transmission) matrices for two-port networks.
//!
//! A two-port relates input voltage and current to output voltage and
//! current:
//!
//! ```text
//! | V1 |   | A  B | | V2 |
//! |    | = |      | |    |
//! | I1 |   | C  D | | I2 |
//! ```
//!
//! Cascading two networks multiplies their matrices in signal order, so
//! `first.cascade(&second)` is the network with `first` nearest the source.

use crate::math::{checked_div, is_exact_zero, C2x2, CScalar, Scalar, ONE, ZERO};

/// Convenience alias for complex scalars.
pub type C = CScalar;

/// Fixed-size ABCD matrix of one stage or of a whole cascade at one frequency.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TwoPort {
    /// A element (open-circuit voltage ratio).
    pub a: C,
    /// B element (short-circuit transfer impedance).
    pub b: C,
    /// C element (open-circuit transfer admittance).
    pub c: C,
    /// D element (short-circuit current ratio).
    pub d: C,
}

impl Default for TwoPort {
    fn default() -> Self {
        Self::identity()
    }
}

impl TwoPort {
    /// Through connection `[[1, 0], [0, 1]]`.
    #[must_use]
    pub const fn identity() -> Self {
        Self {
            a: ONE,
            b: ZERO,
            c: ZERO,
            d: ONE,
        }
    }

    /// Constructs a two-port from explicit ABCD elements.
    #[must_use]
    pub const fn from_abcd(a: C, b: C, c: C, d: C) -> Self {
        Self { a, b, c, d }
    }

    /// Impedance `z` in the signal path: `[[1, z], [0, 1]]`.
    #[must_use]
    pub const fn series_impedance(z: C) -> Self {
        Self::from_abcd(ONE, z, ZERO, ONE)
    }

    /// Admittance `y` from signal to ground: `[[1, 0], [y, 1]]`.
    #[must_use]
    pub const fn shunt_admittance(y: C) -> Self {
        Self::from_abcd(ONE, ZERO, y, ONE)
    }

    /// Impedance `z` from signal to ground. `None` when `z` is a short.
    #[must_use]
    pub fn shunt_impedance(z: C) -> Option<Self> {
        checked_div(ONE, z).map(Self::shunt_admittance)
    }

    /// ABCD determinant `ad - bc`; one for every reciprocal network.
    #[must_use]
    pub fn determinant(&self) -> C {
        self.a * self.d - self.b * self.c
    }

    /// True when `|det - 1| <= tolerance`.
    #[must_use]
    pub fn is_reciprocal(&self, tolerance: Scalar) -> bool {
        (self.determinant() - ONE).norm() <= tolerance
    }

    /// `self` followed by `next` (matrix product `self × next`).
    #[must_use]
    pub fn cascade(&self, next: &Self) -> Self {
        Self {
            a: self.a * next.a + self.b * next.c,
            b: self.a * next.b + self.b * next.d,
            c: self.c * next.a + self.d * next.c,
            d: self.c * next.b + self.d * next.d,
        }
    }

    /// Cascades a sequence of two-ports from first to last. Returns identity for empty.
    #[must_use]
    pub fn cascade_all<'a>(list: impl IntoIterator<Item = &'a Self>) -> Self {
        list.into_iter()
            .fold(Self::identity(), |acc, next| acc.cascade(next))
    }

    /// Input impedance at port 1 with port 2 terminated by `z_load`.
    /// `None` when the denominator `c·Zl + d` vanishes.
    #[must_use]
    pub fn input_impedance(&self, z_load: C) -> Option<C> {
        checked_div(self.a * z_load + self.b, self.c * z_load + self.d)
    }

    /// Impedance seen back into port 2 with port 1 terminated by `z_source`.
    /// `None` when the denominator `c·Zs + a` vanishes.
    #[must_use]
    pub fn output_impedance(&self, z_source: C) -> Option<C> {
        checked_div(self.d * z_source + self.b, self.c * z_source + self.a)
    }

    /// Elementwise comparison within `tolerance` (absolute, per entry).
    #[must_use]
    pub fn approx_eq(&self, other: &Self, tolerance: Scalar) -> bool {
        [
            self.a - other.a,
            self.b - other.b,
            self.c - other.c,
            self.d - other.d,
        ]
        .iter()
        .all(|delta| delta.norm() <= tolerance)
    }

    /// True when every entry is exactly zero except the diagonal ones.
    #[must_use]
    pub fn is_identity(&self) -> bool {
        self.a == ONE && is_exact_zero(self.b) && is_exact_zero(self.c) && self.d == ONE
    }

    /// Converts into a general `nalgebra` matrix.
    #[must_use]
    pub fn to_matrix(&self) -> C2x2 {
        C2x2::new(self.a, self.b, self.c, self.d)
    }

    /// Builds a two-port from a general `nalgebra` matrix.
    #[must_use]
    pub fn from_matrix(m: &C2x2) -> Self {
        Self::from_abcd(m[(0, 0)], m[(0, 1)], m[(1, 0)], m[(1, 1)])
    }
}
