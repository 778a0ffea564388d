use super::selection::{fill_evenly, finalize};

/// Variance-driven index selection.
///
/// Local variance is measured over a centred window of `max(3, n / 100)`
/// samples, normalized to `[0, 1]` and floored at `variance_threshold`. The
/// running sum of that importance is then sampled at `target` evenly spaced
/// levels, so busy regions receive more samples than flat ones. The first and
/// last index are always kept.
#[must_use]
pub fn adaptive_indices(values: &[f64], target: usize, variance_threshold: f64) -> Vec<usize> {
    let n = values.len();
    if n == 0 || target == 0 {
        return Vec::new();
    }
    if target == 1 {
        return vec![0];
    }

    let variance = local_variance(values, (n / 100).max(3));
    let importance = normalized_importance(&variance, variance_threshold);

    let mut cumulative = Vec::with_capacity(n);
    let mut running = 0.0f64;
    for weight in &importance {
        running += weight;
        cumulative.push(running);
    }

    let first = cumulative[0];
    let span = cumulative[n - 1] - first;
    let mut selected = Vec::with_capacity(target);
    selected.push(0);
    for k in 1..target - 1 {
        let level = first + span * k as f64 / (target - 1) as f64;
        selected.push(nearest_index(&cumulative, level));
    }
    selected.push(n - 1);

    fill_evenly(finalize(selected), n, target)
}

/// Variance of each sample's centred neighbourhood, computed from prefix sums.
fn local_variance(values: &[f64], window: usize) -> Vec<f64> {
    let n = values.len();
    let mean = values.iter().sum::<f64>() / n as f64;

    let mut sum = Vec::with_capacity(n + 1);
    let mut sum_sq = Vec::with_capacity(n + 1);
    sum.push(0.0f64);
    sum_sq.push(0.0f64);
    for &v in values {
        let centred = v - mean;
        sum.push(sum[sum.len() - 1] + centred);
        sum_sq.push(sum_sq[sum_sq.len() - 1] + centred * centred);
    }

    let half = window / 2;
    (0..n)
        .map(|i| {
            let lo = i.saturating_sub(half);
            let hi = (i + half + 1).min(n);
            let count = (hi - lo) as f64;
            let m = (sum[hi] - sum[lo]) / count;
            let m2 = (sum_sq[hi] - sum_sq[lo]) / count;
            (m2 - m * m).max(0.0)
        })
        .collect()
}

fn normalized_importance(variance: &[f64], floor: f64) -> Vec<f64> {
    let (min, max) = variance
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });
    let range = max - min;
    if !range.is_finite() || range <= 0.0 {
        return vec![1.0; variance.len()];
    }
    variance
        .iter()
        .map(|&v| ((v - min) / range).max(floor))
        .collect()
}

fn nearest_index(cumulative: &[f64], level: f64) -> usize {
    let upper = cumulative
        .partition_point(|&c| c < level)
        .min(cumulative.len() - 1);
    if upper == 0 {
        return 0;
    }
    let lower = upper - 1;
    if (level - cumulative[lower]).abs() <= (cumulative[upper] - level).abs() {
        lower
    } else {
        upper
    }
}

#[cfg(test)]
mod tests {
    use super::adaptive_indices;

    #[test]
    fn adaptive_concentrates_samples_in_noisy_region() {
        let mut ys = vec![0.0; 1000];
        for (i, y) in ys.iter_mut().enumerate().skip(500) {
            *y = if i % 2 == 0 { 5.0 } else { -5.0 };
        }
        let picked = adaptive_indices(&ys, 50, 0.05);
        assert_eq!(picked.len(), 50);
        assert_eq!(picked[0], 0);
        assert_eq!(picked[49], 999);
        let in_noise = picked.iter().filter(|&&i| i >= 500).count();
        assert!(in_noise > 35, "noisy half got {in_noise} of 50");
    }

    #[test]
    fn flat_signal_degrades_to_even_spacing() {
        let ys = vec![2.0; 101];
        let picked = adaptive_indices(&ys, 11, 0.1);
        assert_eq!(picked, (0..=100).step_by(10).collect::<Vec<_>>());
    }
}
