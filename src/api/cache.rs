use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::Mutex;
use tracing::{debug, trace};

use crate::core::{
    DecimationEngine, DecimationMethod, DecimationParams, DecimationResult, Decimator,
};
use crate::error::DecimationOutcome;

/// Number of leading samples hashed into a content fingerprint.
pub const FINGERPRINT_PREFIX_LEN: usize = 1024;

/// Runtime metrics exposed by [`DecimationCache`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DecimationCacheStats {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub size: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DecimationCacheKey {
    pub method: DecimationMethod,
    pub target_points: usize,
    pub fingerprint: u64,
    pub timestamp_fingerprint: u64,
    variance_threshold_bits: u64,
    peak_percentile_bits: u64,
}

impl DecimationCacheKey {
    #[must_use]
    pub fn new(
        timestamps: &[f64],
        values: &[f64],
        target_points: usize,
        method: DecimationMethod,
        params: &DecimationParams,
    ) -> Self {
        Self {
            method,
            target_points,
            fingerprint: content_fingerprint(values),
            timestamp_fingerprint: content_fingerprint(timestamps),
            variance_threshold_bits: params.variance_threshold.to_bits(),
            peak_percentile_bits: params.peak_percentile.to_bits(),
        }
    }
}

/// Cheap approximate content hash: the length, the first
/// [`FINGERPRINT_PREFIX_LEN`] sample bit patterns and the last sample.
///
/// Keys hash both the time axis and the values. Two series that agree on
/// length, prefix and last sample of both still collide and share a cache
/// entry; callers that mutate a series in place beyond the prefix must
/// [`DecimationCache::clear`] the cache.
#[must_use]
pub fn content_fingerprint(samples: &[f64]) -> u64 {
    let mut hasher = DefaultHasher::new();
    samples.len().hash(&mut hasher);
    for sample in samples.iter().take(FINGERPRINT_PREFIX_LEN) {
        sample.to_bits().hash(&mut hasher);
    }
    if let Some(last) = samples.last() {
        last.to_bits().hash(&mut hasher);
    }
    hasher.finish()
}

#[derive(Debug, Default)]
struct CacheState {
    entries: IndexMap<DecimationCacheKey, Arc<DecimationResult>>,
    hits: u64,
    misses: u64,
    evictions: u64,
}

/// Bounded memo of decimation results.
///
/// Eviction drops the oldest inserted entry once `max_size` is exceeded; hits do
/// not refresh an entry's position. Results are shared as `Arc`s so a caller
/// holding one needs no lock to read it.
#[derive(Debug)]
pub struct DecimationCache<D: Decimator = DecimationEngine> {
    decimator: D,
    max_size: usize,
    state: Mutex<CacheState>,
}

impl DecimationCache<DecimationEngine> {
    #[must_use]
    pub fn new(max_size: usize) -> Self {
        Self::with_decimator(DecimationEngine, max_size)
    }
}

impl<D: Decimator> DecimationCache<D> {
    #[must_use]
    pub fn with_decimator(decimator: D, max_size: usize) -> Self {
        Self {
            decimator,
            max_size: max_size.max(1),
            state: Mutex::new(CacheState::default()),
        }
    }

    /// Returns the cached result for `(method, target_points, timestamps, values)` or
    /// computes and stores it using default [`DecimationParams`].
    pub fn get_or_compute(
        &self,
        timestamps: &[f64],
        values: &[f64],
        target_points: usize,
        method: DecimationMethod,
    ) -> DecimationOutcome<Arc<DecimationResult>> {
        self.get_or_compute_with(
            timestamps,
            values,
            target_points,
            method,
            &DecimationParams::default(),
        )
    }

    pub fn get_or_compute_with(
        &self,
        timestamps: &[f64],
        values: &[f64],
        target_points: usize,
        method: DecimationMethod,
        params: &DecimationParams,
    ) -> DecimationOutcome<Arc<DecimationResult>> {
        let key = DecimationCacheKey::new(timestamps, values, target_points, method, params);

        {
            let mut state = self.state.lock();
            if let Some(hit) = state.entries.get(&key).cloned() {
                state.hits = state.hits.saturating_add(1);
                trace!(%method, target_points, "decimation cache hit");
                return Ok(hit);
            }
        }

        trace!(%method, target_points, "decimation cache miss");
        let computed = Arc::new(
            self.decimator
                .decimate(timestamps, values, target_points, method, params)?,
        );

        let mut state = self.state.lock();
        state.misses = state.misses.saturating_add(1);
        if let Some(existing) = state.entries.get(&key) {
            return Ok(Arc::clone(existing));
        }
        state.entries.insert(key, Arc::clone(&computed));
        while state.entries.len() > self.max_size {
            if state.entries.shift_remove_index(0).is_none() {
                break;
            }
            state.evictions = state.evictions.saturating_add(1);
            debug!(
                size = state.entries.len(),
                max_size = self.max_size,
                "evicted oldest decimation cache entry"
            );
        }
        Ok(computed)
    }

    pub fn clear(&self) {
        self.state.lock().entries.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.state.lock().entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn max_size(&self) -> usize {
        self.max_size
    }

    #[must_use]
    pub fn decimator(&self) -> &D {
        &self.decimator
    }

    #[must_use]
    pub fn stats(&self) -> DecimationCacheStats {
        let state = self.state.lock();
        DecimationCacheStats {
            hits: state.hits,
            misses: state.misses,
            evictions: state.evictions,
            size: state.entries.len(),
        }
    }
}
