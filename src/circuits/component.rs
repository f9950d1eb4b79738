use num_complex::Complex;

use crate::errors::{ConfigError, DomainError};
use crate::math::{checked_div, CScalar, Scalar, ONE};

/// Trait implemented by every lumped element that has a frequency-domain impedance.
pub trait Lumped {
    /// Returns the element's impedance at angular frequency `omega` (rad/s).
    fn impedance(&self, omega: Scalar) -> Result<CScalar, DomainError>;

    /// Human-readable identifier (e.g. `R1`).
    fn name(&self) -> &str;

    /// Returns the element's admittance at `omega`; a short has none.
    fn admittance(&self, omega: Scalar) -> Result<CScalar, DomainError> {
        let z = self.impedance(omega)?;
        checked_div(ONE, z).ok_or_else(|| DomainError::ZeroImpedance(self.name().to_owned()))
    }
}

fn positive(name: &str, value: Scalar) -> Result<Scalar, ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(ConfigError::NonPositiveValue {
            name: name.to_owned(),
            value,
        })
    }
}

/// Lumped resistor model.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Resistor {
    name: String,
    resistance: Scalar,
}

impl Resistor {
    /// Creates a resistor of `resistance_ohms`.
    pub fn new(name: impl Into<String>, resistance_ohms: Scalar) -> Result<Self, ConfigError> {
        let name = name.into();
        let resistance = positive(&name, resistance_ohms)?;
        Ok(Self { name, resistance })
    }

    /// Creates a resistor from its conductance in siemens.
    pub fn from_conductance(name: impl Into<String>, siemens: Scalar) -> Result<Self, ConfigError> {
        let name = name.into();
        let g = positive(&name, siemens)?;
        Self::new(name, 1.0 / g)
    }

    /// Resistance in ohms.
    #[must_use]
    pub fn resistance(&self) -> Scalar {
        self.resistance
    }
}

impl Lumped for Resistor {
    fn impedance(&self, _omega: Scalar) -> Result<CScalar, DomainError> {
        Ok(Complex::new(self.resistance, 0.0))
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Lumped capacitor model (ideal).
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Capacitor {
    name: String,
    capacitance: Scalar,
}

impl Capacitor {
    /// Creates a capacitor of `capacitance_f`.
    pub fn new(name: impl Into<String>, capacitance_f: Scalar) -> Result<Self, ConfigError> {
        let name = name.into();
        let capacitance = positive(&name, capacitance_f)?;
        Ok(Self { name, capacitance })
    }

    /// Capacitance in farads.
    #[must_use]
    pub fn capacitance(&self) -> Scalar {
        self.capacitance
    }
}

impl Lumped for Capacitor {
    /// `1/(jωC)`; undefined at DC.
    fn impedance(&self, omega: Scalar) -> Result<CScalar, DomainError> {
        if omega == 0.0 {
            return Err(DomainError::CapacitorAtDc(self.name.clone()));
        }
        Ok(ONE / Complex::new(0.0, omega * self.capacitance))
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Lumped inductor model (ideal).
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Inductor {
    name: String,
    inductance: Scalar,
}

impl Inductor {
    /// Creates an inductor of `inductance_h`.
    pub fn new(name: impl Into<String>, inductance_h: Scalar) -> Result<Self, ConfigError> {
        let name = name.into();
        let inductance = positive(&name, inductance_h)?;
        Ok(Self { name, inductance })
    }

    /// Inductance in henries.
    #[must_use]
    pub fn inductance(&self) -> Scalar {
        self.inductance
    }
}

impl Lumped for Inductor {
    /// `jωL`; a short at DC.
    fn impedance(&self, omega: Scalar) -> Result<CScalar, DomainError> {
        Ok(Complex::new(0.0, omega * self.inductance))
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Discriminant of [`Component`], handy for reporting.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentKind {
    /// Ohms.
    Resistor,
    /// Farads.
    Capacitor,
    /// Henries.
    Inductor,
}

/// Closed set of passive elements a stage can hold.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub enum Component {
    /// See [`Resistor`].
    Resistor(Resistor),
    /// See [`Capacitor`].
    Capacitor(Capacitor),
    /// See [`Inductor`].
    Inductor(Inductor),
}

impl Component {
    /// Shorthand for a validated resistor.
    pub fn resistor(name: impl Into<String>, ohms: Scalar) -> Result<Self, ConfigError> {
        Resistor::new(name, ohms).map(Self::Resistor)
    }

    /// Shorthand for a validated capacitor.
    pub fn capacitor(name: impl Into<String>, farads: Scalar) -> Result<Self, ConfigError> {
        Capacitor::new(name, farads).map(Self::Capacitor)
    }

    /// Shorthand for a validated inductor.
    pub fn inductor(name: impl Into<String>, henries: Scalar) -> Result<Self, ConfigError> {
        Inductor::new(name, henries).map(Self::Inductor)
    }

    /// Which kind of element this is.
    #[must_use]
    pub fn kind(&self) -> ComponentKind {
        match self {
            Self::Resistor(_) => ComponentKind::Resistor,
            Self::Capacitor(_) => ComponentKind::Capacitor,
            Self::Inductor(_) => ComponentKind::Inductor,
        }
    }

    /// Magnitude in the element's own unit (Ω, F or H).
    #[must_use]
    pub fn value(&self) -> Scalar {
        match self {
            Self::Resistor(r) => r.resistance(),
            Self::Capacitor(c) => c.capacitance(),
            Self::Inductor(l) => l.inductance(),
        }
    }
}

impl Lumped for Component {
    fn impedance(&self, omega: Scalar) -> Result<CScalar, DomainError> {
        match self {
            Self::Resistor(r) => r.impedance(omega),
            Self::Capacitor(c) => c.impedance(omega),
            Self::Inductor(l) => l.impedance(omega),
        }
    }

    fn name(&self) -> &str {
        match self {
            Self::Resistor(r) => r.name(),
            Self::Capacitor(c) => c.name(),
            Self::Inductor(l) => l.name(),
        }
    }
}

impl From<Resistor> for Component {
    fn from(r: Resistor) -> Self {
        Self::Resistor(r)
    }
}

impl From<Capacitor> for Component {
    fn from(c: Capacitor) -> Self {
        Self::Capacitor(c)
    }
}

impl From<Inductor> for Component {
    fn from(l: Inductor) -> Self {
        Self::Inductor(l)
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn resistor_impedance_is_real() {
        let r = Resistor::new("R1", 100.0).unwrap();
        let z = r.impedance(1.0).unwrap();
        assert_relative_eq!(z.re, 100.0);
        assert_relative_eq!(z.im, 0.0);
    }

    #[test]
    fn capacitor_impedance_is_reactive() {
        let c = Capacitor::new("C1", 1e-6).unwrap();
        let z = c.impedance(1.0e3).unwrap();
        assert_relative_eq!(z.re, 0.0, epsilon = 1.0e-12);
        assert_relative_eq!(z.im, -1.0e3, max_relative = 1.0e-12);
    }

    #[test]
    fn capacitor_rejects_dc() {
        let c = Capacitor::new("C1", 1e-6).unwrap();
        assert_eq!(c.impedance(0.0), Err(DomainError::CapacitorAtDc("C1".into())));
    }

    #[test]
    fn inductor_is_short_at_dc() {
        let l = Inductor::new("L1", 1e-3).unwrap();
        let z = l.impedance(0.0).unwrap();
        assert_eq!(z, Complex::new(0.0, 0.0));
        assert_eq!(
            l.admittance(0.0),
            Err(DomainError::ZeroImpedance("L1".into()))
        );
    }

    #[test]
    fn non_positive_magnitudes_are_rejected() {
        for bad in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            assert!(Component::resistor("R", bad).is_err());
            assert!(Component::capacitor("C", bad).is_err());
            assert!(Component::inductor("L", bad).is_err());
        }
        let err = Component::capacitor("C9", -2.0).unwrap_err();
        assert_eq!(
            err,
            ConfigError::NonPositiveValue {
                name: "C9".into(),
                value: -2.0
            }
        );
    }

    #[test]
    fn conductance_becomes_reciprocal_resistance() {
        let r = Resistor::from_conductance("G1", 0.02).unwrap();
        assert_relative_eq!(r.resistance(), 50.0, max_relative = 1.0e-12);
        assert!(Resistor::from_conductance("G2", 0.0).is_err());
    }

    #[test]
    fn enum_dispatch_matches_inner_models() {
        let c = Component::inductor("L2", 2e-3).unwrap();
        assert_eq!(c.kind(), ComponentKind::Inductor);
        assert_eq!(c.name(), "L2");
        assert_relative_eq!(c.value(), 2e-3);
        let z = c.impedance(500.0).unwrap();
        assert_relative_eq!(z.im, 1.0, max_relative = 1.0e-12);
    }

    proptest! {
        #[test]
        fn prop_resistor_frequency_invariance(
            r in 1e-6_f64..1e9_f64,
            omega in 0.0_f64..1e9_f64,
        ) {
            let z = Component::resistor("R", r).unwrap().impedance(omega).unwrap();
            prop_assert_eq!(z, Complex::new(r, 0.0));
        }

        #[test]
        fn prop_capacitor_matches_formula(
            c in 1e-12_f64..1e-1_f64,
            omega in 1e-3_f64..1e9_f64,
        ) {
            let z = Component::capacitor("C", c).unwrap().impedance(omega).unwrap();
            let expected = ONE / Complex::new(0.0, omega * c);
            prop_assert!((z - expected).norm() <= 1e-12 * expected.norm());
            prop_assert!(z.im < 0.0);
        }
    }
}
