use super::selection::evenly_spaced;

/// Evenly spaced indices over `0..n` (`linspace(0, n - 1, target)` rounded).
#[must_use]
pub fn uniform_indices(n: usize, target: usize) -> Vec<usize> {
    evenly_spaced(n, target.min(n))
}
