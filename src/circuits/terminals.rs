//! Terminal characteristics of a terminated two-port.
//!
//! [`extract`] turns a composed ABCD matrix plus source and load impedances
//! into gains and port impedances. [`PortQuantities`] goes one step further
//! and drives the network from a concrete source to obtain voltages,
//! currents and powers at both ports.

use std::fmt;

use crate::errors::{ConfigError, DomainError};
use crate::math::{checked_div, is_exact_zero, is_finite, CScalar, ONE};

use super::twoport::TwoPort;

/// Gains and impedances of a terminated two-port at one frequency.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TerminalResponse {
    /// `Vout / Vin`.
    pub voltage_gain: CScalar,
    /// `Iout / Iin`, with `Iout` flowing into the load.
    pub current_gain: CScalar,
    /// Impedance seen by the source at port 1.
    pub input_impedance: CScalar,
    /// Impedance seen by the load at port 2, source replaced by `Zs`.
    pub output_impedance: CScalar,
}

fn singular(quantity: &'static str) -> DomainError {
    DomainError::SingularResponse { quantity }
}

/// Derives the terminal response of `m` driven from `zs` into `zl`.
///
/// Any exactly vanishing denominator fails with
/// [`DomainError::SingularResponse`] instead of producing NaN or infinity.
pub fn extract(m: &TwoPort, zs: CScalar, zl: CScalar) -> Result<TerminalResponse, DomainError> {
    let series_den = m.a * zl + m.b;
    let shunt_den = m.c * zl + m.d;
    let input_impedance =
        checked_div(series_den, shunt_den).ok_or_else(|| singular("input impedance"))?;
    let voltage_gain = checked_div(zl, series_den).ok_or_else(|| singular("voltage gain"))?;
    let current_gain = checked_div(ONE, shunt_den).ok_or_else(|| singular("current gain"))?;
    let output_impedance = m
        .output_impedance(zs)
        .ok_or_else(|| singular("output impedance"))?;
    Ok(TerminalResponse {
        voltage_gain,
        current_gain,
        input_impedance,
        output_impedance,
    })
}

/// Independent source driving port 1 through the cascade's source impedance.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Excitation {
    /// Thevenin source of this open-circuit voltage (V).
    Voltage(CScalar),
    /// Norton source of this short-circuit current (A).
    Current(CScalar),
}

impl Excitation {
    /// Rejects zero and non-finite amplitudes.
    pub fn validate(self) -> Result<Self, ConfigError> {
        let (Self::Voltage(v) | Self::Current(v)) = self;
        if is_finite(v) && !is_exact_zero(v) {
            Ok(self)
        } else {
            Err(ConfigError::InvalidExcitation)
        }
    }

    /// Open-circuit (Thevenin) voltage behind source impedance `zs`.
    #[must_use]
    pub fn thevenin_voltage(self, zs: CScalar) -> CScalar {
        match self {
            Self::Voltage(v) => v,
            Self::Current(i) => i * zs,
        }
    }
}

impl Default for Excitation {
    fn default() -> Self {
        Self::Voltage(ONE)
    }
}

/// Every quantity the output layer can ask for.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputQuantity {
    /// Input port voltage.
    Vin,
    /// Output port voltage.
    Vout,
    /// Input port current.
    Iin,
    /// Load current.
    Iout,
    /// Complex power into port 1.
    Pin,
    /// Complex power into the load.
    Pout,
    /// Input impedance.
    Zin,
    /// Output impedance.
    Zout,
    /// Voltage gain.
    Av,
    /// Current gain.
    Ai,
    /// Power gain.
    Ap,
    /// Transducer gain `Vout / VT`.
    T,
}

impl OutputQuantity {
    /// All quantities in canonical column order.
    pub const ALL: [Self; 12] = [
        Self::Vin,
        Self::Vout,
        Self::Iin,
        Self::Iout,
        Self::Pin,
        Self::Pout,
        Self::Zin,
        Self::Zout,
        Self::Av,
        Self::Ai,
        Self::Ap,
        Self::T,
    ];

    /// Name as written in netlists and CSV headers.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Vin => "Vin",
            Self::Vout => "Vout",
            Self::Iin => "Iin",
            Self::Iout => "Iout",
            Self::Pin => "Pin",
            Self::Pout => "Pout",
            Self::Zin => "Zin",
            Self::Zout => "Zout",
            Self::Av => "Av",
            Self::Ai => "Ai",
            Self::Ap => "Ap",
            Self::T => "T",
        }
    }

    /// Looks a quantity up by its label (exact match).
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|q| q.label() == label)
    }

    /// Base SI unit symbol; empty for dimensionless ratios.
    #[must_use]
    pub const fn unit(self) -> &'static str {
        match self {
            Self::Vin | Self::Vout => "V",
            Self::Iin | Self::Iout => "A",
            Self::Pin | Self::Pout => "W",
            Self::Zin | Self::Zout => "Ohms",
            Self::Av | Self::Ai | Self::Ap | Self::T => "",
        }
    }

    /// Power quantities convert to decibels with `10·log10`.
    #[must_use]
    pub const fn is_power(self) -> bool {
        matches!(self, Self::Pin | Self::Pout | Self::Ap)
    }
}

impl fmt::Display for OutputQuantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Port voltages, currents and powers for a driven, terminated network.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PortQuantities {
    /// Port 1 voltage.
    pub vin: CScalar,
    /// Port 2 voltage.
    pub vout: CScalar,
    /// Port 1 current.
    pub iin: CScalar,
    /// Port 2 current into the load.
    pub iout: CScalar,
    /// `Vin·Iin*`.
    pub pin: CScalar,
    /// `Vout·Iout*`.
    pub pout: CScalar,
    /// `Pout / Pin`.
    pub power_gain: CScalar,
    /// `Vout / VT`.
    pub transducer_gain: CScalar,
    /// Gains and impedances these were derived from.
    pub response: TerminalResponse,
}

impl PortQuantities {
    /// Drives `response` from `source` behind `zs`.
    pub fn drive(
        response: &TerminalResponse,
        source: Excitation,
        zs: CScalar,
    ) -> Result<Self, DomainError> {
        let vt = source.thevenin_voltage(zs);
        let iin = checked_div(vt, zs + response.input_impedance)
            .ok_or_else(|| singular("input current"))?;
        let vin = iin * response.input_impedance;
        let vout = response.voltage_gain * vin;
        let iout = response.current_gain * iin;
        let pin = vin * iin.conj();
        let pout = vout * iout.conj();
        let power_gain = checked_div(pout, pin).ok_or_else(|| singular("power gain"))?;
        let transducer_gain =
            checked_div(vout, vt).ok_or_else(|| singular("transducer gain"))?;
        Ok(Self {
            vin,
            vout,
            iin,
            iout,
            pin,
            pout,
            power_gain,
            transducer_gain,
            response: *response,
        })
    }

    /// Value of one named quantity.
    #[must_use]
    pub fn get(&self, quantity: OutputQuantity) -> CScalar {
        match quantity {
            OutputQuantity::Vin => self.vin,
            OutputQuantity::Vout => self.vout,
            OutputQuantity::Iin => self.iin,
            OutputQuantity::Iout => self.iout,
            OutputQuantity::Pin => self.pin,
            OutputQuantity::Pout => self.pout,
            OutputQuantity::Zin => self.response.input_impedance,
            OutputQuantity::Zout => self.response.output_impedance,
            OutputQuantity::Av => self.response.voltage_gain,
            OutputQuantity::Ai => self.response.current_gain,
            OutputQuantity::Ap => self.power_gain,
            OutputQuantity::T => self.transducer_gain,
        }
    }
}
