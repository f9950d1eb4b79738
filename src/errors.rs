//! Shared error types used across submodules.
//!
//! Two families matter to callers. [`ConfigError`] means the requested setup
//! is invalid and nothing was computed. [`DomainError`] means a physically
//! undefined condition was hit while evaluating one frequency point; it is
//! wrapped in [`EvaluationError`] together with the frequency and, when a
//! stage is at fault, the stage index.

use thiserror::Error;

use crate::math::Scalar;
use crate::netlist::ParseError;

/// Invalid static setup, reported before any frequency point is evaluated.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// A component magnitude was zero, negative or not finite.
    #[error("component `{name}` must have a positive, finite value (got {value})")]
    NonPositiveValue {
        /// Component identifier.
        name: String,
        /// Offending magnitude.
        value: Scalar,
    },
    /// Sweep bounds or point count are malformed.
    #[error("invalid sweep: {0}")]
    InvalidSweep(String),
    /// A cascade needs at least one stage.
    #[error("cascade has no stages")]
    EmptyCascade,
    /// Response extraction needs a non-zero load.
    #[error("load impedance must be non-zero")]
    ZeroLoad,
    /// A source or load termination is NaN or infinite.
    #[error("{0} impedance must be finite")]
    NonFiniteTermination(&'static str),
    /// The source amplitude is zero or not finite.
    #[error("source amplitude must be non-zero and finite")]
    InvalidExcitation,
}

/// Physically undefined condition at a single frequency point.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DomainError {
    /// `1/(jωC)` has no value at ω = 0.
    #[error("capacitor `{0}` has no finite impedance at DC")]
    CapacitorAtDc(String),
    /// A shunt element with zero impedance shorts the signal path.
    #[error("shunt element `{0}` is a short circuit")]
    ShuntShort(String),
    /// An admittance was requested for a zero impedance.
    #[error("element `{0}` has zero impedance")]
    ZeroImpedance(String),
    /// A denominator in the terminal response vanished exactly.
    #[error("{quantity} is singular (zero denominator)")]
    SingularResponse {
        /// Which terminal quantity could not be formed.
        quantity: &'static str,
    },
}

/// A [`DomainError`] located in the sweep.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{}at {frequency} Hz: {source}", stage_prefix(.stage))]
pub struct EvaluationError {
    /// Frequency of the failing point in hertz.
    pub frequency: Scalar,
    /// Index of the failing stage, when a stage is at fault.
    pub stage: Option<usize>,
    /// Underlying physical fault.
    #[source]
    pub source: DomainError,
}

fn stage_prefix(stage: &Option<usize>) -> String {
    stage.map_or_else(String::new, |i| format!("stage {i} "))
}

impl EvaluationError {
    /// Error raised by stage `stage` at `frequency`.
    #[must_use]
    pub fn in_stage(frequency: Scalar, stage: usize, source: DomainError) -> Self {
        Self {
            frequency,
            stage: Some(stage),
            source,
        }
    }

    /// Error raised while forming the terminal response at `frequency`.
    #[must_use]
    pub fn at_terminals(frequency: Scalar, source: DomainError) -> Self {
        Self {
            frequency,
            stage: None,
            source,
        }
    }
}

/// Failure of a whole sweep request.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnalysisError {
    /// Rejected before evaluation started.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// Aborted on the first undefined point.
    #[error("sweep aborted: {0}")]
    Point(#[from] EvaluationError),
}

/// Top-level error type for the crate.
#[derive(Debug, Error)]
pub enum CascadeError {
    /// Wraps configuration errors.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// Wraps sweep failures.
    #[error(transparent)]
    Analysis(#[from] AnalysisError),
    /// Wraps netlist parse failures.
    #[error(transparent)]
    Parse(#[from] ParseError),
    /// Raised while reading input or writing results.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
