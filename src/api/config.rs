use serde::{Deserialize, Serialize};

use crate::core::{DecimationMethod, DecimationParams};
use crate::error::{LodError, LodResult};

/// Strategy thresholds and tuning for [`super::PerformanceRenderer`].
///
/// This type is serializable so host applications can persist/load renderer
/// tuning without inventing their own ad-hoc format.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RendererConfig {
    /// Series at or below this many samples are drawn unchanged.
    #[serde(default = "default_direct_render_limit")]
    pub direct_render_limit: usize,
    /// Series at or below this many samples are decimated once through the cache;
    /// larger ones go through a per-series LOD pyramid.
    #[serde(default = "default_decimation_limit")]
    pub decimation_limit: usize,
    #[serde(default = "default_target_display_points")]
    pub target_display_points: usize,
    #[serde(default = "default_lod_levels")]
    pub lod_levels: usize,
    #[serde(default)]
    pub method: DecimationMethod,
    #[serde(default)]
    pub params: DecimationParams,
    #[serde(default = "default_cache_max_size")]
    pub cache_max_size: usize,
    #[serde(default = "default_render_history_len")]
    pub render_history_len: usize,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl RendererConfig {
    #[must_use]
    pub fn new() -> Self {
        Self {
            direct_render_limit: default_direct_render_limit(),
            decimation_limit: default_decimation_limit(),
            target_display_points: default_target_display_points(),
            lod_levels: default_lod_levels(),
            method: DecimationMethod::default(),
            params: DecimationParams::default(),
            cache_max_size: default_cache_max_size(),
            render_history_len: default_render_history_len(),
        }
    }

    /// Sets both strategy thresholds.
    #[must_use]
    pub fn with_limits(mut self, direct_render_limit: usize, decimation_limit: usize) -> Self {
        self.direct_render_limit = direct_render_limit;
        self.decimation_limit = decimation_limit;
        self
    }

    #[must_use]
    pub fn with_target_display_points(mut self, points: usize) -> Self {
        self.target_display_points = points;
        self
    }

    #[must_use]
    pub fn with_lod_levels(mut self, levels: usize) -> Self {
        self.lod_levels = levels;
        self
    }

    #[must_use]
    pub fn with_method(mut self, method: DecimationMethod) -> Self {
        self.method = method;
        self
    }

    #[must_use]
    pub fn with_params(mut self, params: DecimationParams) -> Self {
        self.params = params;
        self
    }

    #[must_use]
    pub fn with_cache_max_size(mut self, max_size: usize) -> Self {
        self.cache_max_size = max_size;
        self
    }

    #[must_use]
    pub fn with_render_history_len(mut self, len: usize) -> Self {
        self.render_history_len = len;
        self
    }

    pub fn validate(&self) -> LodResult<()> {
        if self.direct_render_limit > self.decimation_limit {
            return Err(LodError::InvalidConfig(
                "direct render limit must be <= decimation limit".to_owned(),
            ));
        }
        if self.target_display_points < 2 {
            return Err(LodError::InvalidConfig(
                "target display points must be >= 2".to_owned(),
            ));
        }
        if self.lod_levels == 0 {
            return Err(LodError::InvalidConfig(
                "lod levels must be >= 1".to_owned(),
            ));
        }
        if self.cache_max_size == 0 {
            return Err(LodError::InvalidConfig(
                "cache max size must be >= 1".to_owned(),
            ));
        }
        if self.render_history_len == 0 {
            return Err(LodError::InvalidConfig(
                "render history length must be >= 1".to_owned(),
            ));
        }
        self.params.validate()?;
        Ok(())
    }

    pub fn to_json_pretty(&self) -> LodResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| {
            LodError::InvalidConfig(format!("failed to serialize renderer config: {e}"))
        })
    }

    pub fn from_json_str(input: &str) -> LodResult<Self> {
        let config: Self = serde_json::from_str(input).map_err(|e| {
            LodError::InvalidConfig(format!("failed to parse renderer config json: {e}"))
        })?;
        config.validate()?;
        Ok(config)
    }
}

/// Chunking and preview tuning for [`super::StreamingChunkManager`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StreamingConfig {
    /// Logical number of samples in the dataset.
    pub total_size: usize,
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    /// Chunks on each side of the current one loaded by `preload_chunks`.
    #[serde(default = "default_preload_window")]
    pub preload_window: usize,
    /// Per-chunk previews are decimated to a tenth of this.
    #[serde(default = "default_target_display_points")]
    pub target_display_points: usize,
    #[serde(default)]
    pub method: DecimationMethod,
    #[serde(default)]
    pub params: DecimationParams,
}

impl StreamingConfig {
    #[must_use]
    pub fn new(total_size: usize) -> Self {
        Self {
            total_size,
            chunk_size: default_chunk_size(),
            preload_window: default_preload_window(),
            target_display_points: default_target_display_points(),
            method: DecimationMethod::default(),
            params: DecimationParams::default(),
        }
    }

    #[must_use]
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    #[must_use]
    pub fn with_preload_window(mut self, window: usize) -> Self {
        self.preload_window = window;
        self
    }

    #[must_use]
    pub fn with_target_display_points(mut self, points: usize) -> Self {
        self.target_display_points = points;
        self
    }

    #[must_use]
    pub fn with_method(mut self, method: DecimationMethod) -> Self {
        self.method = method;
        self
    }

    #[must_use]
    pub fn with_params(mut self, params: DecimationParams) -> Self {
        self.params = params;
        self
    }

    /// Number of samples kept in each chunk preview.
    #[must_use]
    pub fn preview_points(&self) -> usize {
        (self.target_display_points / 10).max(1)
    }

    pub fn validate(&self) -> LodResult<()> {
        if self.chunk_size == 0 {
            return Err(LodError::InvalidConfig(
                "chunk size must be >= 1".to_owned(),
            ));
        }
        if self.target_display_points == 0 {
            return Err(LodError::InvalidConfig(
                "target display points must be >= 1".to_owned(),
            ));
        }
        self.params.validate()?;
        Ok(())
    }

    pub fn to_json_pretty(&self) -> LodResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| {
            LodError::InvalidConfig(format!("failed to serialize streaming config: {e}"))
        })
    }

    pub fn from_json_str(input: &str) -> LodResult<Self> {
        let config: Self = serde_json::from_str(input).map_err(|e| {
            LodError::InvalidConfig(format!("failed to parse streaming config json: {e}"))
        })?;
        config.validate()?;
        Ok(config)
    }
}

fn default_direct_render_limit() -> usize {
    10_000
}

fn default_decimation_limit() -> usize {
    1_000_000
}

fn default_target_display_points() -> usize {
    5_000
}

fn default_lod_levels() -> usize {
    4
}

fn default_cache_max_size() -> usize {
    100
}

fn default_render_history_len() -> usize {
    100
}

fn default_chunk_size() -> usize {
    100_000
}

fn default_preload_window() -> usize {
    2
}
