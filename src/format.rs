//! Presentation helpers over sweep results.
//!
//! Nothing here feeds back into the engine: every function reads complex
//! values and returns numbers or text.

use std::fmt;
use std::io::{self, Write};

use num_complex::Complex;
use tracing::warn;

use crate::circuits::terminals::{Excitation, OutputQuantity};
use crate::math::{CScalar, Scalar};
use crate::simulation::{PointOutcome, SweepResult};

const MIN_MAGNITUDE: Scalar = 1e-300;
const CELL_WIDTH: usize = 11;
const FREQ_WIDTH: usize = 10;

/// Magnitude of complex sequence.
#[must_use]
pub fn mag(values: impl IntoIterator<Item = Complex<Scalar>>) -> Vec<Scalar> {
    values.into_iter().map(|v| v.norm()).collect()
}

/// Magnitude in dB (20*log10(|x|)), clamping very small values.
#[must_use]
pub fn mag_db(values: impl IntoIterator<Item = Complex<Scalar>>) -> Vec<Scalar> {
    values.into_iter().map(|v| to_decibels(v, false)).collect()
}

/// Phase in radians of complex sequence.
#[must_use]
pub fn phase_rad(values: impl IntoIterator<Item = Complex<Scalar>>) -> Vec<Scalar> {
    values.into_iter().map(|v| v.arg()).collect()
}

/// Phase in degrees of complex sequence.
#[must_use]
pub fn phase_deg(values: impl IntoIterator<Item = Complex<Scalar>>) -> Vec<Scalar> {
    phase_rad(values).into_iter().map(Scalar::to_degrees).collect()
}

/// `10·log10|x|` for power quantities, `20·log10|x|` otherwise.
#[must_use]
pub fn to_decibels(value: CScalar, power: bool) -> Scalar {
    let factor = if power { 10.0 } else { 20.0 };
    factor * value.norm().max(MIN_MAGNITUDE).log10()
}

/// Decimal SI prefixes understood in netlists and output units.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SiPrefix {
    /// 10⁻¹²
    Pico,
    /// 10⁻⁹
    Nano,
    /// 10⁻⁶
    Micro,
    /// 10⁻³
    Milli,
    /// 10⁰
    #[default]
    Unit,
    /// 10³
    Kilo,
    /// 10⁶
    Mega,
    /// 10⁹
    Giga,
}

impl SiPrefix {
    /// Parses a one-letter prefix (`p n u m k M G`).
    #[must_use]
    pub fn from_symbol(symbol: char) -> Option<Self> {
        Some(match symbol {
            'p' => Self::Pico,
            'n' => Self::Nano,
            'u' => Self::Micro,
            'm' => Self::Milli,
            'k' => Self::Kilo,
            'M' => Self::Mega,
            'G' => Self::Giga,
            _ => return None,
        })
    }

    /// Power of ten this prefix stands for.
    #[must_use]
    pub const fn exponent(self) -> i32 {
        match self {
            Self::Pico => -12,
            Self::Nano => -9,
            Self::Micro => -6,
            Self::Milli => -3,
            Self::Unit => 0,
            Self::Kilo => 3,
            Self::Mega => 6,
            Self::Giga => 9,
        }
    }

    /// Multiplier, e.g. `1e3` for kilo.
    #[must_use]
    pub fn factor(self) -> Scalar {
        10f64.powi(self.exponent())
    }

    /// Expresses `value` in this prefix (`2500.0` → `2.5` for kilo).
    #[must_use]
    pub fn scale(self, value: Scalar) -> Scalar {
        value / self.factor()
    }
}

/// Formats `value` like C's `%.3e` (four significant figures, two-digit signed exponent).
#[must_use]
pub fn scientific(value: Scalar) -> String {
    let raw = format!("{value:.3e}");
    match raw.split_once('e') {
        Some((mantissa, exp)) => match exp.parse::<i32>() {
            Ok(e) => {
                let sign = if e < 0 { '-' } else { '+' };
                format!("{mantissa}e{sign}{:02}", e.abs())
            }
            Err(_) => raw,
        },
        // NaN and infinities have no exponent part.
        None => raw,
    }
}

fn cell(text: &str) -> String {
    format!("{text:>CELL_WIDTH$}")
}

/// One requested output column pair.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct OutputSpec {
    /// Quantity to report.
    pub quantity: OutputQuantity,
    /// Magnitude in dB and phase in radians instead of real and imaginary parts.
    pub decibels: bool,
    /// Scale of the real and imaginary columns; dB columns are unscaled.
    pub prefix: SiPrefix,
    /// Unit text shown in the header row.
    pub unit: String,
}

impl OutputSpec {
    /// Plain real/imaginary output in base units.
    #[must_use]
    pub fn new(quantity: OutputQuantity) -> Self {
        let unit = match quantity.unit() {
            "" => "L",
            u => u,
        };
        Self {
            quantity,
            decibels: false,
            prefix: SiPrefix::Unit,
            unit: unit.to_owned(),
        }
    }

    /// Same output reported in decibels.
    #[must_use]
    pub fn in_decibels(mut self) -> Self {
        self.decibels = true;
        self.unit = format!("dB{}", self.unit.trim_start_matches('L'));
        self
    }

    /// Header cells for this output.
    #[must_use]
    pub fn headers(&self) -> [String; 2] {
        let q = self.quantity.label();
        if self.decibels {
            [format!("|{q}|"), format!("/_{q}")]
        } else {
            [format!("Re({q})"), format!("Im({q})")]
        }
    }

    /// Unit cells for this output.
    #[must_use]
    pub fn units(&self) -> [String; 2] {
        if self.decibels {
            [self.unit.clone(), "Rads".to_owned()]
        } else {
            [self.unit.clone(), self.unit.clone()]
        }
    }

    /// The two numbers written for `value`.
    #[must_use]
    pub fn columns(&self, value: CScalar) -> (Scalar, Scalar) {
        if self.decibels {
            (to_decibels(value, self.quantity.is_power()), value.arg())
        } else {
            (self.prefix.scale(value.re), self.prefix.scale(value.im))
        }
    }
}

impl fmt::Display for OutputSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.quantity, self.unit)
    }
}

/// Writes `result` as CSV: a header row, a unit row, then one row per frequency.
///
/// Port quantities are derived from `source` behind `zs`. Points that are
/// undefined, or whose port quantities are, get `undefined` cells.
pub fn write_response_csv<W: Write>(
    mut w: W,
    result: &SweepResult,
    outputs: &[OutputSpec],
    source: Excitation,
    zs: CScalar,
) -> io::Result<()> {
    write!(w, "{:>FREQ_WIDTH$}", "Freq")?;
    for spec in outputs {
        for h in spec.headers() {
            write!(w, ",{}", cell(&h))?;
        }
    }
    writeln!(w)?;
    write!(w, "{:>FREQ_WIDTH$}", "Hz")?;
    for spec in outputs {
        for u in spec.units() {
            write!(w, ",{}", cell(&u))?;
        }
    }
    writeln!(w)?;

    for point in result {
        write!(w, "{:>FREQ_WIDTH$}", scientific(point.frequency()))?;
        let ports = match point {
            PointOutcome::Defined(r) => match r.drive(source, zs) {
                Ok(p) => Some(p),
                Err(e) => {
                    warn!(frequency = e.frequency, "port quantities undefined: {}", e.source);
                    None
                }
            },
            PointOutcome::Undefined(_) => None,
        };
        for spec in outputs {
            match ports {
                Some(p) => {
                    let (first, second) = spec.columns(p.get(spec.quantity));
                    write!(w, ",{},{}", cell(&scientific(first)), cell(&scientific(second)))?;
                }
                None => write!(w, ",{},{}", cell("undefined"), cell("undefined"))?,
            }
        }
        writeln!(w)?;
    }
    Ok(())
}
