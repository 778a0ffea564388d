use smallvec::SmallVec;

use super::selection::finalize;

/// Per-bucket minimum and maximum index selection.
///
/// Splits `0..n` into `target / 2` buckets and keeps the index of the minimum
/// and of the maximum value in each (first occurrence wins). The result is
/// de-duplicated and ordered by source index. With no buckets the selection
/// falls back to the first and last sample, truncated to `target`.
#[must_use]
pub fn min_max_indices(values: &[f64], target: usize) -> Vec<usize> {
    let n = values.len();
    let buckets = target / 2;
    if n == 0 {
        return Vec::new();
    }
    if buckets == 0 {
        let mut fallback = vec![0, n - 1];
        fallback.dedup();
        fallback.truncate(target);
        return fallback;
    }

    let bucket_size = n as f64 / buckets as f64;
    let mut selected = Vec::with_capacity(buckets * 2);
    for b in 0..buckets {
        let start = (b as f64 * bucket_size).floor() as usize;
        let end = if b + 1 == buckets {
            n
        } else {
            (((b + 1) as f64 * bucket_size).floor() as usize).min(n)
        };
        selected.extend(bucket_extrema(values, start, end));
    }

    let selected = finalize(selected);
    if selected.is_empty() {
        let mut fallback = vec![0, n - 1];
        fallback.truncate(target);
        return fallback;
    }
    selected
}

fn bucket_extrema(values: &[f64], start: usize, end: usize) -> SmallVec<[usize; 2]> {
    let mut picked = SmallVec::new();
    if start >= end {
        return picked;
    }

    let mut min_idx = start;
    let mut max_idx = start;
    for k in start + 1..end {
        if values[k] < values[min_idx] {
            min_idx = k;
        }
        if values[k] > values[max_idx] {
            max_idx = k;
        }
    }

    picked.push(min_idx.min(max_idx));
    if min_idx != max_idx {
        picked.push(min_idx.max(max_idx));
    }
    picked
}
