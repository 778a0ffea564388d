use std::cmp::Reverse;

use ordered_float::OrderedFloat;

use super::selection::{fill_evenly, finalize};

/// Peak-preserving index selection.
///
/// Local maxima of `|value|` at or above the `percentile` of all magnitudes are
/// kept together with the first and last sample. When more peaks qualify than
/// fit, the largest magnitudes win (earlier index on ties); remaining slots are
/// filled with evenly spaced indices from the unselected samples.
#[must_use]
pub fn peak_aware_indices(values: &[f64], target: usize, percentile: f64) -> Vec<usize> {
    let n = values.len();
    if n == 0 || target == 0 {
        return Vec::new();
    }
    if target == 1 {
        return vec![0];
    }

    let magnitudes: Vec<f64> = values.iter().map(|v| v.abs()).collect();
    let threshold = percentile_of(&magnitudes, percentile);

    let mut peaks: Vec<usize> = (1..n.saturating_sub(1))
        .filter(|&i| {
            let m = magnitudes[i];
            m >= threshold && m > magnitudes[i - 1] && m >= magnitudes[i + 1]
        })
        .collect();

    let budget = target - 2;
    if peaks.len() > budget {
        peaks.sort_by_key(|&i| (Reverse(OrderedFloat(magnitudes[i])), i));
        peaks.truncate(budget);
    }

    let mut selected = Vec::with_capacity(target);
    selected.push(0);
    selected.extend(peaks);
    selected.push(n - 1);

    fill_evenly(finalize(selected), n, target)
}

/// Linear-interpolated percentile, `percentile` in `[0, 100]`.
fn percentile_of(samples: &[f64], percentile: f64) -> f64 {
    let mut sorted = samples.to_vec();
    sorted.sort_unstable_by(f64::total_cmp);
    let rank = (percentile / 100.0).clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    let frac = rank - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}
