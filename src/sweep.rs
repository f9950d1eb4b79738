//! Frequency sweep generation.
//!
//! A [`FrequencySweep`] is a small `Copy` description of the points to
//! visit. Points are computed on demand, so iterating twice yields the same
//! values and nothing is shared between iterations.

use std::iter::FusedIterator;

use crate::errors::ConfigError;
use crate::math::Scalar;

/// Largest number of points a sweep may hold.
pub const MAX_POINTS: usize = 10_000_000;

/// How points are distributed between the sweep bounds.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Spacing {
    /// Equal steps in hertz.
    Linear,
    /// Equal ratios between consecutive points (geometric progression).
    #[default]
    Logarithmic,
}

/// Validated sweep description: `points` frequencies from `start` to `stop` hertz.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrequencySweep {
    start: Scalar,
    stop: Scalar,
    points: usize,
    spacing: Spacing,
}

impl FrequencySweep {
    /// Builds a sweep. Requires `0 < start < stop` (both finite) and
    /// `2 <= points <= MAX_POINTS`.
    pub fn new(
        start: Scalar,
        stop: Scalar,
        points: usize,
        spacing: Spacing,
    ) -> Result<Self, ConfigError> {
        if !(start.is_finite() && start > 0.0) {
            return Err(ConfigError::InvalidSweep(format!(
                "start frequency must be positive, got {start}"
            )));
        }
        if !(stop.is_finite() && stop > start) {
            return Err(ConfigError::InvalidSweep(format!(
                "end frequency {stop} must exceed start frequency {start}"
            )));
        }
        if points < 2 {
            return Err(ConfigError::InvalidSweep(format!(
                "at least 2 points are required, got {points}"
            )));
        }
        if points > MAX_POINTS {
            return Err(ConfigError::InvalidSweep(format!(
                "at most {MAX_POINTS} points are supported, got {points}"
            )));
        }
        Ok(Self {
            start,
            stop,
            points,
            spacing,
        })
    }

    /// Log-spaced sweep: `f_k = start · (stop/start)^(k/(points−1))`.
    pub fn logarithmic(start: Scalar, stop: Scalar, points: usize) -> Result<Self, ConfigError> {
        Self::new(start, stop, points, Spacing::Logarithmic)
    }

    /// Linearly spaced sweep.
    pub fn linear(start: Scalar, stop: Scalar, points: usize) -> Result<Self, ConfigError> {
        Self::new(start, stop, points, Spacing::Linear)
    }

    /// First frequency (Hz).
    #[must_use]
    pub fn start(&self) -> Scalar {
        self.start
    }

    /// Last frequency (Hz).
    #[must_use]
    pub fn stop(&self) -> Scalar {
        self.stop
    }

    /// Number of points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points
    }

    /// Always false; a sweep has at least two points.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points == 0
    }

    /// Point distribution.
    #[must_use]
    pub fn spacing(&self) -> Spacing {
        self.spacing
    }

    /// The `k`-th frequency, or `None` past the end. Both bounds are returned exactly.
    #[must_use]
    pub fn at(&self, k: usize) -> Option<Scalar> {
        (k < self.points).then(|| self.point(k))
    }

    /// The `k`-th frequency; `k` must be below [`Self::len`].
    pub(crate) fn point(&self, k: usize) -> Scalar {
        let last = self.points - 1;
        if k == 0 {
            return self.start;
        }
        if k >= last {
            return self.stop;
        }
        let t = k as Scalar / last as Scalar;
        match self.spacing {
            Spacing::Linear => self.start + (self.stop - self.start) * t,
            Spacing::Logarithmic => {
                let log_start = self.start.log10();
                let log_stop = self.stop.log10();
                10f64.powf(log_start + (log_stop - log_start) * t)
            }
        }
    }

    /// Lazy iterator over the sweep frequencies; restartable at will.
    #[must_use]
    pub fn iter(&self) -> Points {
        Points {
            sweep: *self,
            next: 0,
            end: self.points,
        }
    }

    /// Collects the frequencies into a vector.
    #[must_use]
    pub fn to_vec(&self) -> Vec<Scalar> {
        self.iter().collect()
    }
}

impl Default for FrequencySweep {
    /// 10 Hz to 100 kHz, 50 log-spaced points.
    fn default() -> Self {
        Self {
            start: 10.0,
            stop: 100.0e3,
            points: 50,
            spacing: Spacing::Logarithmic,
        }
    }
}

impl IntoIterator for &FrequencySweep {
    type Item = Scalar;
    type IntoIter = Points;

    fn into_iter(self) -> Points {
        self.iter()
    }
}

/// Iterator returned by [`FrequencySweep::iter`].
#[derive(Debug, Clone)]
pub struct Points {
    sweep: FrequencySweep,
    next: usize,
    end: usize,
}

impl Iterator for Points {
    type Item = Scalar;

    fn next(&mut self) -> Option<Scalar> {
        if self.next >= self.end {
            return None;
        }
        let f = self.sweep.point(self.next);
        self.next += 1;
        Some(f)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.end - self.next;
        (n, Some(n))
    }
}

impl DoubleEndedIterator for Points {
    fn next_back(&mut self) -> Option<Scalar> {
        if self.next >= self.end {
            return None;
        }
        self.end -= 1;
        Some(self.sweep.point(self.end))
    }
}

impl ExactSizeIterator for Points {}

impl FusedIterator for Points {}

/// Log-spaced frequencies between `start` and `end` hertz, `points` of them.
pub fn sweep(start: Scalar, end: Scalar, points: usize) -> Result<FrequencySweep, ConfigError> {
    FrequencySweep::logarithmic(start, end, points)
}

/// Generates `n` linearly spaced samples in [start, stop].
pub fn linspace(start: Scalar, stop: Scalar, n: usize) -> Result<Vec<Scalar>, ConfigError> {
    FrequencySweep::linear(start, stop, n).map(|s| s.to_vec())
}

/// Generates `n` logarithmically spaced samples in [start, stop] hertz.
pub fn logspace_hz(start_hz: Scalar, stop_hz: Scalar, n: usize) -> Result<Vec<Scalar>, ConfigError> {
    FrequencySweep::logarithmic(start_hz, stop_hz, n).map(|s| s.to_vec())
}
