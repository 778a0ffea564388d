//! Decimation engine: pure reductions of `(timestamps, values)` to at most a
//! target number of samples.
//!
//! Every method is deterministic, never mutates its input, and returns samples
//! in source order together with the source index of each retained sample.

mod adaptive;
mod lttb;
mod min_max;
mod peak_aware;
mod selection;
mod uniform;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::DecimationResult;
use crate::error::{DecimationError, DecimationOutcome};

pub use adaptive::adaptive_indices;
pub use lttb::lttb_indices;
pub use min_max::min_max_indices;
pub use peak_aware::peak_aware_indices;
pub use uniform::uniform_indices;

pub(crate) use selection::evenly_spaced;

/// Closed set of supported decimation algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecimationMethod {
    /// Largest-Triangle-Three-Buckets, shape preserving.
    #[default]
    Lttb,
    /// Per-bucket minimum and maximum.
    MinMax,
    /// Density follows local variance.
    Adaptive,
    /// Evenly spaced indices.
    Uniform,
    /// Keeps magnitude peaks, fills the rest evenly.
    PeakAware,
}

impl DecimationMethod {
    pub const ALL: [DecimationMethod; 5] = [
        DecimationMethod::Lttb,
        DecimationMethod::MinMax,
        DecimationMethod::Adaptive,
        DecimationMethod::Uniform,
        DecimationMethod::PeakAware,
    ];

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Lttb => "lttb",
            Self::MinMax => "min_max",
            Self::Adaptive => "adaptive",
            Self::Uniform => "uniform",
            Self::PeakAware => "peak_aware",
        }
    }
}

impl fmt::Display for DecimationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DecimationMethod {
    type Err = DecimationError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        match input.trim().to_ascii_lowercase().as_str() {
            "lttb" => Ok(Self::Lttb),
            "min_max" | "minmax" => Ok(Self::MinMax),
            "adaptive" => Ok(Self::Adaptive),
            "uniform" => Ok(Self::Uniform),
            "peak_aware" | "peakaware" => Ok(Self::PeakAware),
            _ => Err(DecimationError::UnsupportedMethod(input.to_owned())),
        }
    }
}

/// Tuning knobs for the methods that take any.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DecimationParams {
    /// Floor applied to normalized local variance by [`DecimationMethod::Adaptive`].
    #[serde(default = "default_variance_threshold")]
    pub variance_threshold: f64,
    /// Percentile of `|value|` a local maximum must reach for
    /// [`DecimationMethod::PeakAware`].
    #[serde(default = "default_peak_percentile")]
    pub peak_percentile: f64,
}

impl Default for DecimationParams {
    fn default() -> Self {
        Self {
            variance_threshold: default_variance_threshold(),
            peak_percentile: default_peak_percentile(),
        }
    }
}

impl DecimationParams {
    #[must_use]
    pub fn with_variance_threshold(mut self, threshold: f64) -> Self {
        self.variance_threshold = threshold;
        self
    }

    #[must_use]
    pub fn with_peak_percentile(mut self, percentile: f64) -> Self {
        self.peak_percentile = percentile;
        self
    }

    pub fn validate(&self) -> DecimationOutcome<()> {
        if !self.variance_threshold.is_finite() || !(0.0..=1.0).contains(&self.variance_threshold)
        {
            return Err(DecimationError::InvalidParams(
                "variance threshold must be finite and within [0, 1]".to_owned(),
            ));
        }
        if !self.peak_percentile.is_finite() || !(0.0..=100.0).contains(&self.peak_percentile) {
            return Err(DecimationError::InvalidParams(
                "peak percentile must be finite and within [0, 100]".to_owned(),
            ));
        }
        Ok(())
    }
}

fn default_variance_threshold() -> f64 {
    0.1
}

fn default_peak_percentile() -> f64 {
    95.0
}

/// Seam between the stateful managers and the decimation algorithms.
pub trait Decimator: Send + Sync {
    fn decimate(
        &self,
        timestamps: &[f64],
        values: &[f64],
        target_points: usize,
        method: DecimationMethod,
        params: &DecimationParams,
    ) -> DecimationOutcome<DecimationResult>;
}

/// Stateless default [`Decimator`] backed by [`decimate`].
#[derive(Debug, Clone, Copy, Default)]
pub struct DecimationEngine;

impl Decimator for DecimationEngine {
    fn decimate(
        &self,
        timestamps: &[f64],
        values: &[f64],
        target_points: usize,
        method: DecimationMethod,
        params: &DecimationParams,
    ) -> DecimationOutcome<DecimationResult> {
        decimate(timestamps, values, target_points, method, params)
    }
}

/// Reduces `(timestamps, values)` to at most `target_points` samples.
///
/// When `target_points >= N` the input is returned unchanged with an identity
/// index mapping. [`DecimationMethod::MinMax`] may return up to
/// `2 * (target_points / 2)` samples.
pub fn decimate(
    timestamps: &[f64],
    values: &[f64],
    target_points: usize,
    method: DecimationMethod,
    params: &DecimationParams,
) -> DecimationOutcome<DecimationResult> {
    validate_input(timestamps, values, target_points)?;
    params.validate()?;

    let n = values.len();
    if target_points >= n {
        return Ok(DecimationResult::identity(timestamps, values));
    }

    let indices = match method {
        DecimationMethod::Lttb => lttb_indices(timestamps, values, target_points),
        DecimationMethod::MinMax => min_max_indices(values, target_points),
        DecimationMethod::Adaptive => {
            adaptive_indices(values, target_points, params.variance_threshold)
        }
        DecimationMethod::Uniform => uniform_indices(n, target_points),
        DecimationMethod::PeakAware => {
            peak_aware_indices(values, target_points, params.peak_percentile)
        }
    };

    Ok(DecimationResult::from_indices(timestamps, values, indices))
}

fn validate_input(
    timestamps: &[f64],
    values: &[f64],
    target_points: usize,
) -> DecimationOutcome<()> {
    if timestamps.len() != values.len() {
        return Err(DecimationError::MismatchedLengths {
            timestamps: timestamps.len(),
            values: values.len(),
        });
    }
    if values.len() < 2 {
        return Err(DecimationError::InsufficientData { len: values.len() });
    }
    if target_points == 0 {
        return Err(DecimationError::InvalidTarget {
            target: target_points,
        });
    }
    Ok(())
}
