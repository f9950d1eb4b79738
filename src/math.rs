//! Shared numerical primitives anchored on `num-complex` and `nalgebra`.

use nalgebra::Matrix2;
use num_complex::Complex;

/// Primary scalar type used across the crate.
pub type Scalar = f64;
/// Primary complex scalar type used for phasors and impedances.
pub type CScalar = Complex<Scalar>;
/// General-purpose 2×2 complex matrix, used for interop with [`crate::circuits::TwoPort`].
pub type C2x2 = Matrix2<CScalar>;

/// Complex zero.
pub const ZERO: CScalar = Complex::new(0.0, 0.0);
/// Complex one.
pub const ONE: CScalar = Complex::new(1.0, 0.0);

/// Returns the complex exponential `e^(j * theta)` using `Scalar` precision.
#[must_use]
pub fn phasor(theta: Scalar) -> CScalar {
    Complex::from_polar(1.0, theta)
}

/// True when both parts of `z` are exactly zero.
///
/// Singularity checks in the engine are exact on purpose: a denominator that
/// is merely tiny still yields a finite (if large) value.
#[inline]
#[must_use]
pub fn is_exact_zero(z: CScalar) -> bool {
    z.re == 0.0 && z.im == 0.0
}

/// True when both parts of `z` are finite.
#[inline]
#[must_use]
pub fn is_finite(z: CScalar) -> bool {
    z.re.is_finite() && z.im.is_finite()
}

/// Divides `num` by `den`, returning `None` for an exactly zero denominator.
#[inline]
#[must_use]
pub fn checked_div(num: CScalar, den: CScalar) -> Option<CScalar> {
    if is_exact_zero(den) {
        None
    } else {
        Some(num / den)
    }
}
