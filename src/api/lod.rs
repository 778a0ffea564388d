#[cfg(feature = "parallel-lod")]
use rayon::prelude::*;
use tracing::{debug, trace};

use crate::core::{
    DecimationMethod, DecimationParams, DecimationResult, ViewportWindow, decimate,
    index_range_in_time_window,
};
use crate::error::{DecimationError, LodError, LodResult};

/// One precomputed resolution of a series.
#[derive(Debug, Clone, PartialEq)]
pub struct LodLevel {
    /// `0` is the coarsest level.
    pub level_index: usize,
    pub target_points: usize,
    pub decimated: DecimationResult,
}

impl LodLevel {
    #[must_use]
    pub fn len(&self) -> usize {
        self.decimated.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.decimated.is_empty()
    }
}

/// Immutable decimation pyramid for a single series.
///
/// Levels are built once in [`LodManager::new`]; queries only read, so a shared
/// reference can be used from several threads without locking.
#[derive(Debug)]
pub struct LodManager {
    timestamps: Vec<f64>,
    values: Vec<f64>,
    levels: Vec<LodLevel>,
    method: DecimationMethod,
    params: DecimationParams,
}

/// Point budget of `level` in a pyramid of `levels` entries:
/// `target_display_points * 2^(levels - 1 - level)`, capped at `source_len`.
#[must_use]
pub fn level_target_points(
    levels: usize,
    target_display_points: usize,
    level: usize,
    source_len: usize,
) -> usize {
    let shift = levels.saturating_sub(1).saturating_sub(level);
    let factor = u32::try_from(shift)
        .ok()
        .and_then(|s| 1usize.checked_shl(s))
        .unwrap_or(usize::MAX);
    target_display_points.saturating_mul(factor).min(source_len)
}

impl LodManager {
    /// Takes ownership of a series and precomputes `levels` decimations of it.
    pub fn new(
        timestamps: Vec<f64>,
        values: Vec<f64>,
        levels: usize,
        target_display_points: usize,
        method: DecimationMethod,
    ) -> LodResult<Self> {
        Self::with_params(
            timestamps,
            values,
            levels,
            target_display_points,
            method,
            DecimationParams::default(),
        )
    }

    pub fn with_params(
        timestamps: Vec<f64>,
        values: Vec<f64>,
        levels: usize,
        target_display_points: usize,
        method: DecimationMethod,
        params: DecimationParams,
    ) -> LodResult<Self> {
        if levels == 0 {
            return Err(LodError::InvalidConfig(
                "lod pyramid needs at least one level".to_owned(),
            ));
        }
        if target_display_points == 0 {
            return Err(DecimationError::InvalidTarget {
                target: target_display_points,
            }
            .into());
        }

        let n = values.len();
        let build = |level: usize| -> LodResult<LodLevel> {
            let target_points = level_target_points(levels, target_display_points, level, n);
            let decimated = decimate(&timestamps, &values, target_points, method, &params)?;
            Ok(LodLevel {
                level_index: level,
                target_points,
                decimated,
            })
        };

        #[cfg(feature = "parallel-lod")]
        let built: LodResult<Vec<LodLevel>> = (0..levels).into_par_iter().map(build).collect();
        #[cfg(not(feature = "parallel-lod"))]
        let built: LodResult<Vec<LodLevel>> = (0..levels).map(build).collect();
        let built = built?;

        debug!(
            source_len = n,
            levels,
            %method,
            counts = ?built.iter().map(LodLevel::len).collect::<Vec<_>>(),
            "built lod pyramid"
        );

        Ok(Self {
            timestamps,
            values,
            levels: built,
            method,
            params,
        })
    }

    /// Returns ready-to-draw points for the inclusive range `[x_min, x_max]`.
    ///
    /// A visible slice of at most `2 * viewport_width_px` raw samples is returned
    /// as is. Otherwise the finest level whose visible part fits that budget is
    /// used; when even the coarsest level is too dense, its visible part is
    /// decimated down to the budget.
    pub fn get_data_for_view(
        &self,
        x_min: f64,
        x_max: f64,
        viewport_width_px: usize,
    ) -> LodResult<(Vec<f64>, Vec<f64>)> {
        let viewport = ViewportWindow::new(x_min, x_max, viewport_width_px);
        viewport.validate()?;
        let budget = viewport.point_budget();

        let raw = index_range_in_time_window(&self.timestamps, x_min, x_max);
        if raw.len() <= budget {
            trace!(visible = raw.len(), budget, "lod view served from raw samples");
            return Ok((
                self.timestamps[raw.clone()].to_vec(),
                self.values[raw].to_vec(),
            ));
        }

        for level in self.levels.iter().rev() {
            let level_ts = &level.decimated.timestamps;
            let visible = index_range_in_time_window(level_ts, x_min, x_max);
            if visible.len() <= budget {
                trace!(
                    level = level.level_index,
                    visible = visible.len(),
                    budget,
                    "lod view served from level"
                );
                return Ok((
                    level_ts[visible.clone()].to_vec(),
                    level.decimated.values[visible].to_vec(),
                ));
            }
        }

        let coarsest = &self.levels[0].decimated;
        let visible = index_range_in_time_window(&coarsest.timestamps, x_min, x_max);
        trace!(
            visible = visible.len(),
            budget,
            "lod view decimating coarsest level"
        );
        let reduced = decimate(
            &coarsest.timestamps[visible.clone()],
            &coarsest.values[visible],
            budget,
            self.method,
            &self.params,
        )?;
        Ok(reduced.into_xy())
    }

    /// Same as [`Self::get_data_for_view`] for a caller-supplied viewport.
    pub fn view(&self, viewport: ViewportWindow) -> LodResult<(Vec<f64>, Vec<f64>)> {
        self.get_data_for_view(viewport.x_min, viewport.x_max, viewport.pixel_width)
    }

    #[must_use]
    pub fn levels(&self) -> &[LodLevel] {
        &self.levels
    }

    #[must_use]
    pub fn level_point_counts(&self) -> Vec<usize> {
        self.levels.iter().map(LodLevel::len).collect()
    }

    #[must_use]
    pub fn source_len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn method(&self) -> DecimationMethod {
        self.method
    }

    /// First and last timestamp of the source series.
    #[must_use]
    pub fn x_range(&self) -> Option<(f64, f64)> {
        Some((*self.timestamps.first()?, *self.timestamps.last()?))
    }
}
