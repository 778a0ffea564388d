use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use chart_lod::api::{DecimationCache, DecimationCacheStats};
use chart_lod::core::{DecimationMethod, DecimationParams, DecimationResult, Decimator, decimate};
use chart_lod::error::{DecimationError, DecimationOutcome};

#[derive(Debug, Default)]
struct CountingDecimator {
    calls: AtomicUsize,
}

impl CountingDecimator {
    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Decimator for CountingDecimator {
    fn decimate(
        &self,
        timestamps: &[f64],
        values: &[f64],
        target_points: usize,
        method: DecimationMethod,
        params: &DecimationParams,
    ) -> DecimationOutcome<DecimationResult> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        decimate(timestamps, values, target_points, method, params)
    }
}

fn ramp(n: usize, offset: f64) -> (Vec<f64>, Vec<f64>) {
    let ts: Vec<f64> = (0..n).map(|i| i as f64).collect();
    let ys: Vec<f64> = (0..n).map(|i| (i as f64 * 0.1).sin() + offset).collect();
    (ts, ys)
}

#[test]
fn identical_requests_hit_engine_once() {
    let cache = DecimationCache::with_decimator(CountingDecimator::default(), 8);
    let (ts, ys) = ramp(2_000, 0.0);

    let first = cache
        .get_or_compute(&ts, &ys, 100, DecimationMethod::Lttb)
        .expect("first");
    assert_eq!(cache.decimator().calls(), 1);

    let second = cache
        .get_or_compute(&ts, &ys, 100, DecimationMethod::Lttb)
        .expect("second");
    assert_eq!(cache.decimator().calls(), 1);
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(
        cache.stats(),
        DecimationCacheStats {
            hits: 1,
            misses: 1,
            evictions: 0,
            size: 1,
        }
    );
}

#[test]
fn method_target_and_params_are_part_of_the_key() {
    let cache = DecimationCache::with_decimator(CountingDecimator::default(), 8);
    let (ts, ys) = ramp(2_000, 0.0);

    cache
        .get_or_compute(&ts, &ys, 100, DecimationMethod::Lttb)
        .expect("lttb");
    cache
        .get_or_compute(&ts, &ys, 100, DecimationMethod::Uniform)
        .expect("uniform");
    cache
        .get_or_compute(&ts, &ys, 120, DecimationMethod::Lttb)
        .expect("other target");
    cache
        .get_or_compute_with(
            &ts,
            &ys,
            100,
            DecimationMethod::Lttb,
            &DecimationParams::default().with_peak_percentile(80.0),
        )
        .expect("other params");

    assert_eq!(cache.decimator().calls(), 4);
    assert_eq!(cache.len(), 4);
}

#[test]
fn eviction_drops_oldest_inserted_entry_even_after_hit() {
    let cache = DecimationCache::with_decimator(CountingDecimator::default(), 2);
    let (ts, a) = ramp(500, 0.0);
    let (_, b) = ramp(500, 1.0);
    let (_, c) = ramp(500, 2.0);

    cache.get_or_compute(&ts, &a, 50, DecimationMethod::Lttb).expect("a");
    cache.get_or_compute(&ts, &b, 50, DecimationMethod::Lttb).expect("b");
    cache.get_or_compute(&ts, &a, 50, DecimationMethod::Lttb).expect("a hit");
    assert_eq!(cache.decimator().calls(), 2);

    cache.get_or_compute(&ts, &c, 50, DecimationMethod::Lttb).expect("c");
    assert_eq!(cache.len(), 2);
    assert_eq!(cache.stats().evictions, 1);

    cache.get_or_compute(&ts, &b, 50, DecimationMethod::Lttb).expect("b hit");
    assert_eq!(cache.decimator().calls(), 3);

    cache.get_or_compute(&ts, &a, 50, DecimationMethod::Lttb).expect("a again");
    assert_eq!(cache.decimator().calls(), 4);
}

#[test]
fn engine_errors_are_surfaced_and_not_cached() {
    let cache = DecimationCache::with_decimator(CountingDecimator::default(), 4);
    let err = cache
        .get_or_compute(&[0.0, 1.0], &[1.0], 1, DecimationMethod::Lttb)
        .expect_err("mismatch");
    assert!(matches!(err, DecimationError::MismatchedLengths { .. }));
    assert!(cache.is_empty());
}

#[test]
fn clear_forces_recompute() {
    let cache = DecimationCache::with_decimator(CountingDecimator::default(), 4);
    let (ts, ys) = ramp(300, 0.0);
    cache.get_or_compute(&ts, &ys, 30, DecimationMethod::MinMax).expect("first");
    cache.clear();
    assert!(cache.is_empty());
    cache.get_or_compute(&ts, &ys, 30, DecimationMethod::MinMax).expect("second");
    assert_eq!(cache.decimator().calls(), 2);
}

#[test]
fn default_cache_is_shareable_across_threads() {
    let cache = DecimationCache::new(16);
    let (ts, ys) = ramp(5_000, 0.0);

    std::thread::scope(|scope| {
        for _ in 0..4 {
            scope.spawn(|| {
                let result = cache
                    .get_or_compute(&ts, &ys, 200, DecimationMethod::Lttb)
                    .expect("decimate");
                assert_eq!(result.len(), 200);
            });
        }
    });

    assert_eq!(cache.len(), 1);
    let stats = cache.stats();
    assert_eq!(stats.hits + stats.misses, 4);
}

#[test]
fn same_values_on_different_time_axes_are_cached_separately() {
    let cache = DecimationCache::with_decimator(CountingDecimator::default(), 8);
    let ys = vec![0.0; 500];
    let early: Vec<f64> = (0..500).map(|i| i as f64).collect();
    let late: Vec<f64> = (10_000..10_500).map(|i| i as f64).collect();

    let first = cache
        .get_or_compute(&early, &ys, 50, DecimationMethod::Lttb)
        .expect("early axis");
    let second = cache
        .get_or_compute(&late, &ys, 50, DecimationMethod::Lttb)
        .expect("late axis");

    assert_eq!(cache.decimator().calls(), 2);
    assert_eq!(cache.len(), 2);
    assert_eq!(first.timestamps.first(), Some(&0.0));
    assert_eq!(second.timestamps.first(), Some(&10_000.0));
    assert_eq!(second.timestamps.last(), Some(&10_499.0));
}
