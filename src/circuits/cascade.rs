//! Ordered chains of stages between a source and a load.

use tracing::trace;

use crate::constants::{angular_frequency, frequency_from_angular};
use crate::errors::{ConfigError, EvaluationError};
use crate::math::{is_exact_zero, is_finite, CScalar, Scalar};

use super::stage::Stage;
use super::terminals::{extract, TerminalResponse};
use super::twoport::TwoPort;

/// Composes `stages` into one ABCD matrix at angular frequency `omega`.
///
/// Stage 0 sits nearest the source. The product is taken left to right, so
/// the order of `stages` changes the result. A fault in any stage is
/// returned with that stage's index.
pub fn compose(stages: &[Stage], omega: Scalar) -> Result<TwoPort, EvaluationError> {
    compose_at(stages, omega, frequency_from_angular(omega))
}

fn compose_at(stages: &[Stage], omega: Scalar, hz: Scalar) -> Result<TwoPort, EvaluationError> {
    stages
        .iter()
        .enumerate()
        .try_fold(TwoPort::identity(), |acc, (index, stage)| {
            let m = stage
                .matrix(omega)
                .map_err(|source| EvaluationError::in_stage(hz, index, source))?;
            Ok(acc.cascade(&m))
        })
}

/// A validated network: ordered stages plus source and load terminations.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Cascade {
    stages: Vec<Stage>,
    source_impedance: CScalar,
    load_impedance: CScalar,
}

impl Cascade {
    /// Builds a cascade, rejecting an empty stage list, a zero load and
    /// non-finite terminations.
    pub fn new(
        stages: Vec<Stage>,
        source_impedance: CScalar,
        load_impedance: CScalar,
    ) -> Result<Self, ConfigError> {
        if stages.is_empty() {
            return Err(ConfigError::EmptyCascade);
        }
        if !is_finite(source_impedance) {
            return Err(ConfigError::NonFiniteTermination("source"));
        }
        if !is_finite(load_impedance) {
            return Err(ConfigError::NonFiniteTermination("load"));
        }
        if is_exact_zero(load_impedance) {
            return Err(ConfigError::ZeroLoad);
        }
        Ok(Self {
            stages,
            source_impedance,
            load_impedance,
        })
    }

    /// Shorthand for purely resistive terminations.
    pub fn resistive(stages: Vec<Stage>, rs: Scalar, rl: Scalar) -> Result<Self, ConfigError> {
        Self::new(stages, CScalar::new(rs, 0.0), CScalar::new(rl, 0.0))
    }

    /// Stages in signal order.
    #[must_use]
    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    /// Source impedance `Zs`.
    #[must_use]
    pub fn source_impedance(&self) -> CScalar {
        self.source_impedance
    }

    /// Load impedance `Zl`.
    #[must_use]
    pub fn load_impedance(&self) -> CScalar {
        self.load_impedance
    }

    /// Number of stages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    /// Always false for a constructed cascade.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Network ABCD matrix at `frequency` hertz.
    pub fn matrix(&self, frequency: Scalar) -> Result<TwoPort, EvaluationError> {
        compose_at(&self.stages, angular_frequency(frequency), frequency)
    }

    /// Terminal response at `frequency` hertz.
    pub fn response(&self, frequency: Scalar) -> Result<TerminalResponse, EvaluationError> {
        let m = self.matrix(frequency)?;
        trace!(frequency, det = %m.determinant(), "composed cascade");
        extract(&m, self.source_impedance, self.load_impedance)
            .map_err(|source| EvaluationError::at_terminals(frequency, source))
    }
}
