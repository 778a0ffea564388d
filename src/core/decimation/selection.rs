/// `count` positions spread evenly over `0..len`, rounded to the nearest integer.
///
/// A single position lands on `0`. Positions are strictly increasing while
/// `count <= len`.
pub(crate) fn evenly_spaced(len: usize, count: usize) -> Vec<usize> {
    if len == 0 || count == 0 {
        return Vec::new();
    }
    if count == 1 {
        return vec![0];
    }
    let step = (len - 1) as f64 / (count - 1) as f64;
    (0..count)
        .map(|i| ((i as f64 * step).round() as usize).min(len - 1))
        .collect()
}

/// Sorts and de-duplicates selected indices so the output follows source order.
pub(crate) fn finalize(mut indices: Vec<usize>) -> Vec<usize> {
    indices.sort_unstable();
    indices.dedup();
    indices
}

/// Tops `selected` up to `target` indices with evenly spaced picks from the
/// unselected complement of `0..n`.
///
/// `selected` must already be sorted and unique.
pub(crate) fn fill_evenly(selected: Vec<usize>, n: usize, target: usize) -> Vec<usize> {
    let target = target.min(n);
    if selected.len() >= target {
        return selected;
    }
    let missing = target - selected.len();
    let complement_len = n - selected.len();
    let wanted_ranks = evenly_spaced(complement_len, missing);

    let mut picked = Vec::with_capacity(missing);
    let mut wanted = wanted_ranks.iter().copied().peekable();
    let mut taken = selected.iter().copied().peekable();
    let mut rank = 0usize;
    for index in 0..n {
        if taken.peek() == Some(&index) {
            taken.next();
            continue;
        }
        match wanted.peek() {
            Some(&next) if next == rank => {
                picked.push(index);
                wanted.next();
            }
            Some(_) => {}
            None => break,
        }
        rank += 1;
    }

    let mut merged = selected;
    merged.extend(picked);
    finalize(merged)
}
