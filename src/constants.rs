//! Frequency conversions shared by the sweep and component models.

use std::f64::consts::PI;

use crate::math::Scalar;

/// Returns the angular frequency ω = 2πf (rad/s) for a frequency `hz`.
#[inline]
#[must_use]
pub fn angular_frequency(hz: Scalar) -> Scalar {
    2.0 * PI * hz
}

/// Returns the frequency in hertz for an angular frequency `omega` (rad/s).
#[inline]
#[must_use]
pub fn frequency_from_angular(omega: Scalar) -> Scalar {
    omega / (2.0 * PI)
}
