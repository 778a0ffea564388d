use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Instant;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::core::ViewportWindow;
use crate::error::{DecimationError, LodError, LodResult};

use super::{DecimationCache, LodManager, RendererConfig};

/// Path chosen by [`PerformanceRenderer::render_line`] for a series size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderStrategy {
    Direct,
    Decimated,
    Lod,
}

/// Render timing summary for diagnostics panels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PerformanceStats {
    pub total_renders: u64,
    pub avg_render_ms: f64,
    pub max_render_ms: f64,
    pub min_render_ms: f64,
    pub last_strategy: Option<RenderStrategy>,
}

impl PerformanceStats {
    pub fn to_json_pretty(&self) -> LodResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| {
            LodError::InvalidConfig(format!("failed to serialize performance stats: {e}"))
        })
    }
}

/// Chooses between direct, decimated and LOD drawing per series and records
/// how long each call took.
///
/// The renderer is an explicitly owned value; each host view keeps its own.
#[derive(Debug)]
pub struct PerformanceRenderer {
    config: RendererConfig,
    cache: DecimationCache,
    lod_managers: IndexMap<String, Arc<LodManager>>,
    render_times_ms: VecDeque<f64>,
    total_renders: u64,
    last_strategy: Option<RenderStrategy>,
}

impl PerformanceRenderer {
    pub fn new(config: RendererConfig) -> LodResult<Self> {
        config.validate()?;
        Ok(Self {
            cache: DecimationCache::new(config.cache_max_size),
            lod_managers: IndexMap::new(),
            render_times_ms: VecDeque::with_capacity(config.render_history_len),
            total_renders: 0,
            last_strategy: None,
            config,
        })
    }

    #[must_use]
    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    #[must_use]
    pub fn cache(&self) -> &DecimationCache {
        &self.cache
    }

    #[must_use]
    pub fn select_strategy(&self, point_count: usize) -> RenderStrategy {
        if point_count <= self.config.direct_render_limit {
            RenderStrategy::Direct
        } else if point_count <= self.config.decimation_limit {
            RenderStrategy::Decimated
        } else {
            RenderStrategy::Lod
        }
    }

    /// Produces ready-to-draw `(x, y)` arrays for one series.
    ///
    /// Mismatched `timestamps`/`values` lengths are rejected before a strategy is
    /// chosen.
    ///
    /// LOD pyramids are keyed by `series_id` and built on first use; call
    /// [`Self::remove_series`] when a series' data changes.
    pub fn render_line(
        &mut self,
        viewport: &ViewportWindow,
        timestamps: &[f64],
        values: &[f64],
        series_id: &str,
    ) -> LodResult<(Vec<f64>, Vec<f64>)> {
        if timestamps.len() != values.len() {
            return Err(DecimationError::MismatchedLengths {
                timestamps: timestamps.len(),
                values: values.len(),
            }
            .into());
        }

        let started = Instant::now();
        let strategy = self.select_strategy(values.len());

        let output = match strategy {
            RenderStrategy::Direct => (timestamps.to_vec(), values.to_vec()),
            RenderStrategy::Decimated => {
                let result = self.cache.get_or_compute_with(
                    timestamps,
                    values,
                    self.config.target_display_points,
                    self.config.method,
                    &self.config.params,
                )?;
                (result.timestamps.clone(), result.values.clone())
            }
            RenderStrategy::Lod => {
                let manager = self.lod_manager_for(series_id, timestamps, values)?;
                manager.view(*viewport)?
            }
        };

        let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;
        self.record_render(strategy, elapsed_ms);
        trace!(
            series_id,
            ?strategy,
            points_in = values.len(),
            points_out = output.1.len(),
            elapsed_ms,
            "rendered line"
        );
        Ok(output)
    }

    fn lod_manager_for(
        &mut self,
        series_id: &str,
        timestamps: &[f64],
        values: &[f64],
    ) -> LodResult<Arc<LodManager>> {
        if let Some(existing) = self.lod_managers.get(series_id) {
            return Ok(Arc::clone(existing));
        }

        let manager = Arc::new(LodManager::with_params(
            timestamps.to_vec(),
            values.to_vec(),
            self.config.lod_levels,
            self.config.target_display_points,
            self.config.method,
            self.config.params,
        )?);
        debug!(
            series_id,
            source_len = values.len(),
            "registered lod manager for series"
        );
        self.lod_managers
            .insert(series_id.to_owned(), Arc::clone(&manager));
        Ok(manager)
    }

    fn record_render(&mut self, strategy: RenderStrategy, elapsed_ms: f64) {
        if self.render_times_ms.len() >= self.config.render_history_len {
            self.render_times_ms.pop_front();
        }
        self.render_times_ms.push_back(elapsed_ms);
        self.total_renders = self.total_renders.saturating_add(1);
        self.last_strategy = Some(strategy);
    }

    /// Timing over the bounded render history; `total_renders` counts every call.
    #[must_use]
    pub fn get_performance_stats(&self) -> PerformanceStats {
        if self.render_times_ms.is_empty() {
            return PerformanceStats {
                total_renders: self.total_renders,
                last_strategy: self.last_strategy,
                ..PerformanceStats::default()
            };
        }

        let (sum, min, max) = self.render_times_ms.iter().fold(
            (0.0f64, f64::INFINITY, f64::NEG_INFINITY),
            |(sum, min, max), &ms| (sum + ms, min.min(ms), max.max(ms)),
        );
        PerformanceStats {
            total_renders: self.total_renders,
            avg_render_ms: sum / self.render_times_ms.len() as f64,
            max_render_ms: max,
            min_render_ms: min,
            last_strategy: self.last_strategy,
        }
    }

    /// Shared handle to a series' pyramid, if one was built.
    #[must_use]
    pub fn lod_manager(&self, series_id: &str) -> Option<Arc<LodManager>> {
        self.lod_managers.get(series_id).cloned()
    }

    /// Forgets a series' pyramid so the next render rebuilds it.
    pub fn remove_series(&mut self, series_id: &str) -> bool {
        self.lod_managers.shift_remove(series_id).is_some()
    }

    pub fn clear_series(&mut self) {
        self.lod_managers.clear();
        self.cache.clear();
    }

    #[must_use]
    pub fn series_count(&self) -> usize {
        self.lod_managers.len()
    }
}
