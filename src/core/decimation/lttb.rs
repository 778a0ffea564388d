/// Largest-Triangle-Three-Buckets index selection.
///
/// Keeps the first and last sample, splits the interior `n - 2` samples into
/// `target - 2` buckets and keeps, per bucket, the sample forming the largest
/// triangle with the previously kept sample and the mean of the next bucket.
/// Ties keep the first maximum. Callers guarantee `target < n`.
#[must_use]
pub fn lttb_indices(timestamps: &[f64], values: &[f64], target: usize) -> Vec<usize> {
    let n = values.len();
    match target {
        0 => return Vec::new(),
        1 => return vec![0],
        2 => return vec![0, n - 1],
        _ => {}
    }

    let buckets = target - 2;
    let every = (n - 2) as f64 / buckets as f64;
    let bucket_bound = |i: usize| ((i as f64 * every).floor() as usize + 1).min(n - 1);

    let mut selected = Vec::with_capacity(target);
    selected.push(0);
    let mut a = 0usize;

    for i in 0..buckets {
        let range_start = bucket_bound(i);
        let range_end = if i + 1 == buckets {
            n - 1
        } else {
            bucket_bound(i + 1).max(range_start + 1)
        };

        let avg_start = range_end;
        let avg_end = ((((i + 2) as f64 * every).floor() as usize) + 1).min(n);
        let (avg_x, avg_y) = if avg_start < avg_end {
            let count = (avg_end - avg_start) as f64;
            let sum_x: f64 = timestamps[avg_start..avg_end].iter().sum();
            let sum_y: f64 = values[avg_start..avg_end].iter().sum();
            (sum_x / count, sum_y / count)
        } else {
            (timestamps[n - 1], values[n - 1])
        };

        let (a_x, a_y) = (timestamps[a], values[a]);
        let mut max_area = -1.0f64;
        let mut max_idx = range_start;
        for k in range_start..range_end {
            let area = ((a_x - avg_x) * (values[k] - a_y) - (a_x - timestamps[k]) * (avg_y - a_y))
                .abs();
            if area > max_area {
                max_area = area;
                max_idx = k;
            }
        }

        selected.push(max_idx);
        a = max_idx;
    }

    selected.push(n - 1);
    selected
}
