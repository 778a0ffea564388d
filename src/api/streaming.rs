use std::time::Instant;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::core::decimation::evenly_spaced;
use crate::core::{DecimationResult, decimate};
use crate::error::{DataSourceError, DecimationError, LodError, LodResult};

use super::StreamingConfig;

/// Synchronous range reader into the dataset-loading layer.
///
/// Implementations may block on I/O. `read_range(start, end)` must return the
/// `end - start` samples of `[start, end)`.
pub trait DataSource: Send + Sync {
    fn read_range(&self, start: usize, end: usize) -> Result<Vec<f64>, DataSourceError>;
}

impl<F> DataSource for F
where
    F: Fn(usize, usize) -> Result<Vec<f64>, DataSourceError> + Send + Sync,
{
    fn read_range(&self, start: usize, end: usize) -> Result<Vec<f64>, DataSourceError> {
        self(start, end)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChunkState {
    Unloaded,
    Loading,
    Loaded,
}

/// Read-only snapshot of a chunk's bookkeeping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkInfo {
    pub index: usize,
    pub start_idx: usize,
    pub end_idx: usize,
    pub state: ChunkState,
    pub preview_len: usize,
}

/// Samples served for an index range plus the chunks that are missing from it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RangeFetch {
    /// `timestamps` hold global sample indices; so does `selected_indices`.
    pub data: DecimationResult,
    /// Chunks whose load failed during this request.
    pub failed_chunks: Vec<usize>,
    /// Chunks still being loaded by another caller; retry to get their samples.
    pub pending_chunks: Vec<usize>,
}

impl RangeFetch {
    /// `true` when every requested sample was served.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failed_chunks.is_empty() && self.pending_chunks.is_empty()
    }

    #[must_use]
    pub fn has_failures(&self) -> bool {
        !self.failed_chunks.is_empty()
    }
}

#[derive(Debug)]
struct DataChunk {
    index: usize,
    start_idx: usize,
    end_idx: usize,
    data: Option<Vec<f64>>,
    decimated_preview: Option<DecimationResult>,
    state: ChunkState,
    last_touched: Option<Instant>,
}

impl DataChunk {
    fn new(index: usize, start_idx: usize, end_idx: usize) -> Self {
        Self {
            index,
            start_idx,
            end_idx,
            data: None,
            decimated_preview: None,
            state: ChunkState::Unloaded,
            last_touched: None,
        }
    }

    fn info(&self) -> ChunkInfo {
        ChunkInfo {
            index: self.index,
            start_idx: self.start_idx,
            end_idx: self.end_idx,
            state: self.state,
            preview_len: self.decimated_preview.as_ref().map_or(0, DecimationResult::len),
        }
    }

    fn unload(&mut self) {
        self.data = None;
        self.decimated_preview = None;
        self.state = ChunkState::Unloaded;
    }
}

/// Serves index ranges of a dataset too large to hold in memory at once.
///
/// The dataset is split into fixed-size chunks loaded on demand through a
/// [`DataSource`]. Chunk state transitions are serialized by one mutex; the
/// source itself is called without holding it.
pub struct StreamingChunkManager<S: DataSource> {
    config: StreamingConfig,
    source: S,
    chunks: Mutex<Vec<DataChunk>>,
}

impl<S: DataSource> StreamingChunkManager<S> {
    pub fn new(config: StreamingConfig, source: S) -> LodResult<Self> {
        config.validate()?;
        let chunk_count = config.total_size.div_ceil(config.chunk_size);
        let chunks = (0..chunk_count)
            .map(|index| {
                let start = index * config.chunk_size;
                let end = (start + config.chunk_size).min(config.total_size);
                DataChunk::new(index, start, end)
            })
            .collect();
        debug!(
            total_size = config.total_size,
            chunk_size = config.chunk_size,
            chunk_count,
            "created streaming chunk manager"
        );
        Ok(Self {
            config,
            source,
            chunks: Mutex::new(chunks),
        })
    }

    #[must_use]
    pub fn config(&self) -> &StreamingConfig {
        &self.config
    }

    #[must_use]
    pub fn total_size(&self) -> usize {
        self.config.total_size
    }

    #[must_use]
    pub fn chunk_count(&self) -> usize {
        self.chunks.lock().len()
    }

    /// Chunk holding global sample `sample`, if it is inside the dataset.
    #[must_use]
    pub fn chunk_index_for(&self, sample: usize) -> Option<usize> {
        (sample < self.config.total_size).then(|| sample / self.config.chunk_size)
    }

    #[must_use]
    pub fn chunk_state(&self, index: usize) -> Option<ChunkState> {
        self.chunks.lock().get(index).map(|chunk| chunk.state)
    }

    #[must_use]
    pub fn chunk_info(&self, index: usize) -> Option<ChunkInfo> {
        self.chunks.lock().get(index).map(DataChunk::info)
    }

    #[must_use]
    pub fn loaded_chunk_count(&self) -> usize {
        self.chunks
            .lock()
            .iter()
            .filter(|chunk| chunk.state == ChunkState::Loaded)
            .count()
    }

    /// Bytes currently held by chunk buffers and previews.
    #[must_use]
    pub fn memory_usage_bytes(&self) -> usize {
        let sample = std::mem::size_of::<f64>();
        self.chunks
            .lock()
            .iter()
            .map(|chunk| {
                let data = chunk.data.as_ref().map_or(0, Vec::len) * sample;
                let preview = chunk.decimated_preview.as_ref().map_or(0, |p| {
                    p.len() * (2 * sample + std::mem::size_of::<usize>())
                });
                data + preview
            })
            .sum()
    }

    /// Loads one chunk through the data source.
    ///
    /// Returns `Ok(true)` when this call performed the load and `Ok(false)` when
    /// the chunk was already loading, loaded or out of range. On failure the
    /// chunk is left `Unloaded`.
    pub fn load_chunk(&self, index: usize) -> LodResult<bool> {
        let (start, end) = {
            let mut chunks = self.chunks.lock();
            let Some(chunk) = chunks.get_mut(index) else {
                return Ok(false);
            };
            if chunk.state != ChunkState::Unloaded {
                return Ok(false);
            }
            chunk.state = ChunkState::Loading;
            (chunk.start_idx, chunk.end_idx)
        };

        let loaded = self
            .source
            .read_range(start, end)
            .and_then(|data| {
                if data.len() == end - start {
                    Ok(data)
                } else {
                    Err(format!(
                        "data source returned {} samples for range {start}..{end}",
                        data.len()
                    )
                    .into())
                }
            })
            .map_err(|source| LodError::ChunkLoadFailed {
                chunk: index,
                source,
            })
            .and_then(|data| {
                let preview = self.build_preview(start, &data)?;
                Ok((data, preview))
            });

        let mut chunks = self.chunks.lock();
        let chunk = &mut chunks[index];
        match loaded {
            Ok((data, preview)) => {
                debug!(
                    chunk = index,
                    start,
                    end,
                    preview_len = preview.len(),
                    "loaded chunk"
                );
                chunk.data = Some(data);
                chunk.decimated_preview = Some(preview);
                chunk.state = ChunkState::Loaded;
                chunk.last_touched = Some(Instant::now());
                Ok(true)
            }
            Err(err) => {
                warn!(chunk = index, error = %err, "chunk load failed");
                chunk.unload();
                Err(err)
            }
        }
    }

    fn build_preview(&self, start: usize, data: &[f64]) -> LodResult<DecimationResult> {
        let positions: Vec<f64> = (start..start + data.len()).map(|i| i as f64).collect();
        let target = self.config.preview_points();
        if data.len() <= target {
            return Ok(DecimationResult {
                timestamps: positions,
                values: data.to_vec(),
                selected_indices: Some((start..start + data.len()).collect()),
            });
        }

        let mut preview = decimate(
            &positions,
            data,
            target,
            self.config.method,
            &self.config.params,
        )?;
        if let Some(indices) = preview.selected_indices.as_mut() {
            for index in indices.iter_mut() {
                *index += start;
            }
        }
        Ok(preview)
    }

    /// Returns samples `[start, end)`, decimated when longer than `target_points`.
    ///
    /// Chunks that fail to load are skipped and listed in
    /// [`RangeFetch::failed_chunks`]; chunks another caller is still loading are
    /// skipped and listed in [`RangeFetch::pending_chunks`]. The rest of the range
    /// is still served.
    pub fn get_data_for_range(
        &self,
        start: usize,
        end: usize,
        target_points: usize,
    ) -> LodResult<RangeFetch> {
        if target_points == 0 {
            return Err(DecimationError::InvalidTarget {
                target: target_points,
            }
            .into());
        }
        let end = end.min(self.config.total_size);
        if start >= end {
            return Ok(RangeFetch::default());
        }

        let first = start / self.config.chunk_size;
        let last = (end - 1) / self.config.chunk_size;

        let mut failed_chunks = Vec::new();
        for index in first..=last {
            if self.chunk_state(index) != Some(ChunkState::Loaded)
                && self.load_chunk(index).is_err()
            {
                failed_chunks.push(index);
            }
        }

        let mut pending_chunks = Vec::new();
        let mut indices = Vec::with_capacity(end - start);
        let mut values = Vec::with_capacity(end - start);
        {
            let mut chunks = self.chunks.lock();
            let now = Instant::now();
            for chunk in &mut chunks[first..=last] {
                let Some(data) = chunk.data.as_ref() else {
                    if !failed_chunks.contains(&chunk.index) {
                        pending_chunks.push(chunk.index);
                    }
                    continue;
                };
                let lo = start.max(chunk.start_idx);
                let hi = end.min(chunk.end_idx);
                values.extend_from_slice(&data[lo - chunk.start_idx..hi - chunk.start_idx]);
                indices.extend(lo..hi);
                chunk.last_touched = Some(now);
            }
        }
        failed_chunks.sort_unstable();

        let timestamps: Vec<f64> = indices.iter().map(|&i| i as f64).collect();
        let data = if values.len() > target_points {
            let mut reduced = decimate(
                &timestamps,
                &values,
                target_points,
                self.config.method,
                &self.config.params,
            )?;
            if let Some(selected) = reduced.selected_indices.as_mut() {
                for position in selected.iter_mut() {
                    *position = indices[*position];
                }
            }
            reduced
        } else {
            DecimationResult {
                timestamps,
                values,
                selected_indices: Some(indices),
            }
        };

        trace!(
            start,
            end,
            returned = data.len(),
            failed = failed_chunks.len(),
            pending = pending_chunks.len(),
            "served chunk range"
        );
        Ok(RangeFetch {
            data,
            failed_chunks,
            pending_chunks,
        })
    }

    /// Loads chunks within `preload_window` of `current_chunk`.
    ///
    /// Returns how many chunks this call loaded. Failures are logged and skipped.
    pub fn preload_chunks(&self, current_chunk: usize) -> usize {
        let count = self.chunk_count();
        if count == 0 {
            return 0;
        }
        let window = self.config.preload_window;
        let lo = current_chunk.saturating_sub(window).min(count - 1);
        let hi = current_chunk.saturating_add(window).min(count - 1);
        (lo..=hi)
            .filter(|&index| matches!(self.load_chunk(index), Ok(true)))
            .count()
    }

    /// Drops buffers of loaded chunks more than `keep_range` chunks away from
    /// `current_chunk`. Returns how many chunks were unloaded.
    pub fn unload_distant_chunks(&self, current_chunk: usize, keep_range: usize) -> usize {
        let mut chunks = self.chunks.lock();
        let mut unloaded = 0usize;
        for chunk in chunks.iter_mut() {
            if chunk.state == ChunkState::Loaded && chunk.index.abs_diff(current_chunk) > keep_range
            {
                chunk.unload();
                unloaded += 1;
            }
        }
        if unloaded > 0 {
            debug!(current_chunk, keep_range, unloaded, "unloaded distant chunks");
        }
        unloaded
    }

    /// Dataset-wide preview assembled from the cached chunk previews.
    ///
    /// `target_points` is spread over all chunks, so each chunk gets a quota of
    /// about `target_points / chunk_count` evenly spaced preview samples, and
    /// fewer points than chunks go to evenly spaced chunks. Chunks without a
    /// preview contribute nothing. The result never exceeds `target_points`.
    pub fn get_overview(&self, target_points: usize) -> LodResult<DecimationResult> {
        if target_points == 0 {
            return Err(DecimationError::InvalidTarget {
                target: target_points,
            }
            .into());
        }

        let chunks = self.chunks.lock();
        if chunks.is_empty() {
            return Ok(DecimationResult::default());
        }
        let chunk_count = chunks.len();

        let mut overview = DecimationResult {
            timestamps: Vec::with_capacity(target_points),
            values: Vec::with_capacity(target_points),
            selected_indices: Some(Vec::with_capacity(target_points)),
        };
        for chunk in chunks.iter() {
            let Some(preview) = chunk.decimated_preview.as_ref() else {
                continue;
            };
            let quota = overview_quota(target_points, chunk_count, chunk.index);
            for position in evenly_spaced(preview.len(), quota.min(preview.len())) {
                overview.timestamps.push(preview.timestamps[position]);
                overview.values.push(preview.values[position]);
                if let (Some(out), Some(src)) = (
                    overview.selected_indices.as_mut(),
                    preview.selected_indices.as_ref(),
                ) {
                    out.push(src[position]);
                }
            }
        }
        Ok(overview)
    }
}

/// Share of `target_points` assigned to chunk `index` of `chunk_count`.
///
/// Shares differ by at most one and sum to exactly `target_points`.
fn overview_quota(target_points: usize, chunk_count: usize, index: usize) -> usize {
    let boundary = |i: usize| {
        let share = i as u128 * target_points as u128 / chunk_count as u128;
        usize::try_from(share).unwrap_or(target_points)
    };
    boundary(index + 1) - boundary(index)
}
