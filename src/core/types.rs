use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{LodError, LodResult};

/// Visible x-range and pixel budget supplied by the drawing layer per frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewportWindow {
    pub x_min: f64,
    pub x_max: f64,
    pub pixel_width: usize,
}

impl ViewportWindow {
    #[must_use]
    pub fn new(x_min: f64, x_max: f64, pixel_width: usize) -> Self {
        Self {
            x_min,
            x_max,
            pixel_width,
        }
    }

    #[must_use]
    pub fn is_valid(self) -> bool {
        self.x_min.is_finite() && self.x_max.is_finite() && self.pixel_width > 0
    }

    pub fn validate(self) -> LodResult<()> {
        if self.is_valid() {
            Ok(())
        } else {
            Err(LodError::InvalidViewport {
                x_min: self.x_min,
                x_max: self.x_max,
                pixel_width: self.pixel_width,
            })
        }
    }

    /// Upper bound of points worth drawing: two per horizontal pixel.
    #[must_use]
    pub fn point_budget(self) -> usize {
        self.pixel_width.saturating_mul(2)
    }
}

/// Output of a decimation pass.
///
/// `timestamps` and `values` always have equal length. When present,
/// `selected_indices[i]` is the source index that produced output sample `i`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DecimationResult {
    pub timestamps: Vec<f64>,
    pub values: Vec<f64>,
    pub selected_indices: Option<Vec<usize>>,
}

impl DecimationResult {
    /// Exact copy of the input with an identity index mapping.
    #[must_use]
    pub fn identity(timestamps: &[f64], values: &[f64]) -> Self {
        Self {
            timestamps: timestamps.to_vec(),
            values: values.to_vec(),
            selected_indices: Some((0..values.len()).collect()),
        }
    }

    /// Gathers the samples at `indices`, which must be ascending and in bounds.
    #[must_use]
    pub fn from_indices(timestamps: &[f64], values: &[f64], indices: Vec<usize>) -> Self {
        let timestamps = indices.iter().map(|&i| timestamps[i]).collect();
        let values = indices.iter().map(|&i| values[i]).collect();
        Self {
            timestamps,
            values,
            selected_indices: Some(indices),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Consumes the result into ready-to-draw `(x, y)` arrays.
    #[must_use]
    pub fn into_xy(self) -> (Vec<f64>, Vec<f64>) {
        (self.timestamps, self.values)
    }
}

#[must_use]
pub fn datetime_to_unix_seconds(time: DateTime<Utc>) -> f64 {
    time.timestamp_millis() as f64 / 1000.0
}

/// Converts wall-clock sample times into the `f64` unix-second axis used by the core.
#[must_use]
pub fn timestamps_from_datetimes(times: &[DateTime<Utc>]) -> Vec<f64> {
    times.iter().copied().map(datetime_to_unix_seconds).collect()
}
