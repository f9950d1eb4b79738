//! Sweep orchestration: evaluates a [`Cascade`] at every point of a
//! [`FrequencySweep`] and collects the results in frequency order.

use tracing::{debug, warn};

use crate::circuits::cascade::Cascade;
use crate::circuits::terminals::{Excitation, PortQuantities, TerminalResponse};
use crate::errors::{AnalysisError, ConfigError, EvaluationError};
use crate::math::{CScalar, Scalar};
use crate::sweep::FrequencySweep;

/// What to do when a point is physically undefined.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorPolicy {
    /// Stop at the lowest failing frequency and report it.
    #[default]
    Abort,
    /// Record the point as undefined and keep sweeping.
    MarkUndefined,
}

/// How points are scheduled.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Execution {
    /// One point after another on the calling thread.
    #[default]
    Sequential,
    /// Points spread over the rayon pool (feature `parallel`); sequential otherwise.
    Parallel,
}

/// Everything a sweep needs besides the network itself.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SweepConfig {
    /// Frequencies to visit.
    pub sweep: FrequencySweep,
    /// Handling of undefined points.
    pub policy: ErrorPolicy,
    /// Scheduling.
    pub execution: Execution,
}

impl SweepConfig {
    /// Sequential, aborting configuration over `sweep`.
    #[must_use]
    pub fn new(sweep: FrequencySweep) -> Self {
        Self {
            sweep,
            ..Self::default()
        }
    }

    /// Log sweep from raw bounds.
    pub fn logarithmic(start: Scalar, stop: Scalar, points: usize) -> Result<Self, ConfigError> {
        FrequencySweep::logarithmic(start, stop, points).map(Self::new)
    }

    /// Sets the error policy.
    #[must_use]
    pub fn with_policy(mut self, policy: ErrorPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Sets the scheduling mode.
    #[must_use]
    pub fn with_execution(mut self, execution: Execution) -> Self {
        self.execution = execution;
        self
    }
}

/// Terminal response at one sweep frequency.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrequencyResponse {
    /// Frequency in hertz.
    pub frequency: Scalar,
    /// Gains and impedances at `frequency`.
    pub response: TerminalResponse,
}

impl FrequencyResponse {
    /// `Vout / Vin`.
    #[must_use]
    pub fn voltage_gain(&self) -> CScalar {
        self.response.voltage_gain
    }

    /// `Iout / Iin`.
    #[must_use]
    pub fn current_gain(&self) -> CScalar {
        self.response.current_gain
    }

    /// Impedance at port 1.
    #[must_use]
    pub fn input_impedance(&self) -> CScalar {
        self.response.input_impedance
    }

    /// Impedance at port 2.
    #[must_use]
    pub fn output_impedance(&self) -> CScalar {
        self.response.output_impedance
    }

    /// Port voltages, currents and powers for `source` behind `zs`.
    pub fn drive(&self, source: Excitation, zs: CScalar) -> Result<PortQuantities, EvaluationError> {
        PortQuantities::drive(&self.response, source, zs)
            .map_err(|e| EvaluationError::at_terminals(self.frequency, e))
    }
}

/// Result of one sweep point.
#[derive(Debug, Clone, PartialEq)]
pub enum PointOutcome {
    /// Evaluated normally.
    Defined(FrequencyResponse),
    /// Physically undefined; the error says why and where.
    Undefined(EvaluationError),
}

impl PointOutcome {
    /// Frequency of the point in hertz.
    #[must_use]
    pub fn frequency(&self) -> Scalar {
        match self {
            Self::Defined(r) => r.frequency,
            Self::Undefined(e) => e.frequency,
        }
    }

    /// The response, if defined.
    #[must_use]
    pub fn response(&self) -> Option<&FrequencyResponse> {
        match self {
            Self::Defined(r) => Some(r),
            Self::Undefined(_) => None,
        }
    }

    /// The failure, if undefined.
    #[must_use]
    pub fn error(&self) -> Option<&EvaluationError> {
        match self {
            Self::Defined(_) => None,
            Self::Undefined(e) => Some(e),
        }
    }
}

/// Ordered results of a sweep, one entry per frequency.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SweepResult {
    points: Vec<PointOutcome>,
}

impl SweepResult {
    /// All points in frequency order.
    #[must_use]
    pub fn points(&self) -> &[PointOutcome] {
        &self.points
    }

    /// Number of points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// True when no points were evaluated.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Iterator over the points.
    pub fn iter(&self) -> std::slice::Iter<'_, PointOutcome> {
        self.points.iter()
    }

    /// Sweep frequencies in hertz.
    #[must_use]
    pub fn frequencies(&self) -> Vec<Scalar> {
        self.points.iter().map(PointOutcome::frequency).collect()
    }

    /// Defined responses only.
    pub fn responses(&self) -> impl Iterator<Item = &FrequencyResponse> + '_ {
        self.points.iter().filter_map(PointOutcome::response)
    }

    /// Undefined points with their position in the sweep.
    pub fn failures(&self) -> impl Iterator<Item = (usize, &EvaluationError)> + '_ {
        self.points
            .iter()
            .enumerate()
            .filter_map(|(k, p)| p.error().map(|e| (k, e)))
    }

    /// True when every point is defined.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.points.iter().all(|p| p.error().is_none())
    }

    /// Projects one quantity per point; `None` where the point is undefined.
    pub fn map<T, F>(&self, mut f: F) -> Vec<Option<T>>
    where
        F: FnMut(&FrequencyResponse) -> T,
    {
        self.points
            .iter()
            .map(|p| p.response().map(&mut f))
            .collect()
    }
}

impl<'a> IntoIterator for &'a SweepResult {
    type Item = &'a PointOutcome;
    type IntoIter = std::slice::Iter<'a, PointOutcome>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}

fn evaluate(cascade: &Cascade, frequency: Scalar) -> PointOutcome {
    match cascade.response(frequency) {
        Ok(response) => PointOutcome::Defined(FrequencyResponse {
            frequency,
            response,
        }),
        Err(e) => PointOutcome::Undefined(e),
    }
}

#[cfg(feature = "parallel")]
fn evaluate_all_parallel(cascade: &Cascade, sweep: &FrequencySweep) -> Vec<PointOutcome> {
    use rayon::prelude::*;

    // Indexed collect: every worker fills its own slot of the output.
    (0..sweep.len())
        .into_par_iter()
        .map(|k| evaluate(cascade, sweep.point(k)))
        .collect()
}

#[cfg(not(feature = "parallel"))]
fn evaluate_all_parallel(cascade: &Cascade, sweep: &FrequencySweep) -> Vec<PointOutcome> {
    debug!("built without `parallel`; evaluating sequentially");
    sweep.iter().map(|f| evaluate(cascade, f)).collect()
}

/// Evaluates `cascade` over `config.sweep`.
///
/// Under [`ErrorPolicy::Abort`] the lowest undefined frequency is returned as
/// [`AnalysisError::Point`]. Under [`ErrorPolicy::MarkUndefined`] the result
/// always has one entry per sweep point.
pub fn analyse(cascade: &Cascade, config: &SweepConfig) -> Result<SweepResult, AnalysisError> {
    let sweep = &config.sweep;
    debug!(
        stages = cascade.len(),
        points = sweep.len(),
        policy = ?config.policy,
        execution = ?config.execution,
        "starting sweep"
    );

    let points = match (config.execution, config.policy) {
        (Execution::Sequential, ErrorPolicy::Abort) => sweep
            .iter()
            .map(|f| match evaluate(cascade, f) {
                PointOutcome::Undefined(e) => Err(e),
                defined => Ok(defined),
            })
            .collect::<Result<Vec<_>, _>>()?,
        (Execution::Sequential, ErrorPolicy::MarkUndefined) => {
            sweep.iter().map(|f| evaluate(cascade, f)).collect()
        }
        (Execution::Parallel, policy) => {
            let out = evaluate_all_parallel(cascade, sweep);
            if policy == ErrorPolicy::Abort {
                if let Some(e) = out.iter().find_map(PointOutcome::error) {
                    return Err(e.clone().into());
                }
            }
            out
        }
    };

    let result = SweepResult { points };
    for (k, e) in result.failures() {
        warn!(point = k, frequency = e.frequency, stage = ?e.stage, "undefined point: {}", e.source);
    }
    debug!(
        points = result.len(),
        undefined = result.failures().count(),
        "sweep finished"
    );
    Ok(result)
}
