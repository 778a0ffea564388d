use std::ops::Range;

/// Orders a window so that `start <= end`.
#[must_use]
pub fn normalized_window(start: f64, end: f64) -> (f64, f64) {
    if start <= end { (start, end) } else { (end, start) }
}

/// Returns the index range of samples whose time falls inside an inclusive window.
///
/// `timestamps` must be non-decreasing; the lookup is two binary searches.
#[must_use]
pub fn index_range_in_time_window(timestamps: &[f64], start: f64, end: f64) -> Range<usize> {
    let (min_t, max_t) = normalized_window(start, end);
    let lo = timestamps.partition_point(|&t| t < min_t);
    let hi = timestamps.partition_point(|&t| t <= max_t);
    lo..hi.max(lo)
}
