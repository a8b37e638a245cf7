//! Random helpers over a caller-supplied [`RngCore`].
//!
//! Every shuffle and draw in the allocator goes through these so a single
//! seeded generator reproduces a whole run.
use rand::RngCore;

/// Uniform index in `0..len`. `len` must be non-zero.
#[inline]
pub(crate) fn rand_index<R: RngCore + ?Sized>(rng: &mut R, len: usize) -> usize {
    debug_assert!(len > 0, "rand_index requires a non-empty range");
    // Multiply-shift keeps the result strictly below len.
    ((rng.next_u64() as u128 * len as u128) >> 64) as usize
}

/// Uniform integer in `min..=max`.
#[inline]
pub(crate) fn rand_inclusive<R: RngCore + ?Sized>(rng: &mut R, min: usize, max: usize) -> usize {
    debug_assert!(min <= max, "rand_inclusive requires min <= max");
    min + rand_index(rng, max - min + 1)
}

/// In-place Fisher–Yates shuffle.
pub(crate) fn shuffle<T, R: RngCore + ?Sized>(items: &mut [T], rng: &mut R) {
    for i in (1..items.len()).rev() {
        let j = rand_index(rng, i + 1);
        items.swap(i, j);
    }
}
