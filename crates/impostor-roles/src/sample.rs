//! Uniform random selection without replacement.
//!
//! Impostors are picked with a partial Fisher–Yates shuffle: after `k`
//! swap steps over `0..n`, the first `k` slots hold a uniformly random
//! `k`-subset, every subset equally likely. The RNG is a parameter so
//! tests can pass a seeded generator.

use rand::Rng;

/// Picks `k` distinct indices from `0..n`, uniformly at random.
///
/// The result is in selection order, not sorted. `k` larger than `n` is
/// clamped to `n`.
pub fn sample_indices<R: Rng + ?Sized>(
    rng: &mut R,
    n: usize,
    k: usize,
) -> Vec<usize> {
    let k = k.min(n);
    let mut slots: Vec<usize> = (0..n).collect();
    for i in 0..k {
        let j = rng.random_range(i..n);
        slots.swap(i, j);
    }
    slots.truncate(k);
    slots
}
