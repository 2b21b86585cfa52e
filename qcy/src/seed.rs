//! Deterministic pseudorandom source shared by every generator.

use {
    core::num::NonZero,
    rand_core::{RngCore as _, SeedableRng as _},
    rand_xoshiro::Xoshiro256PlusPlus,
};

/// Deterministic pseudorandom number generator.
/// Every draw a generator makes goes through one of these,
/// so a property run is fully reproducible from its initial seed.
#[derive(/* NOT Clone, NOT Copy, */ Debug)]
pub struct Seed(Xoshiro256PlusPlus);

impl Seed {
    /// Seed used when none is configured.
    pub const DEFAULT: u64 = 1337_1337_1337_1337_1337;

    /// A stream fully determined by `seed`.
    #[inline]
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self(Xoshiro256PlusPlus::seed_from_u64(seed))
    }

    /// Generate a pseudorandom `u64`.
    #[inline]
    #[must_use]
    pub fn prng(&mut self) -> u64 {
        self.0.next_u64()
    }

    /// A fair coin flip.
    #[inline]
    #[must_use]
    pub fn prng_bool(&mut self) -> bool {
        (self.prng() & 1) != 0
    }

    /// Uniform index in `0..bound`.
    #[inline]
    #[must_use]
    #[expect(
        clippy::as_conversions,
        clippy::cast_possible_truncation,
        reason = "the product is shifted back below `bound`"
    )]
    pub fn below(&mut self, bound: NonZero<usize>) -> usize {
        // Widening multiply instead of `%` keeps the result unbiased enough
        // without a rejection loop.
        ((u128::from(self.prng()) * bound.get() as u128) >> 64_u8) as usize
    }

    /// Uniform index into a collection of length `len`,
    /// or `None` if the collection is empty.
    #[inline]
    #[must_use]
    pub fn index(&mut self, len: usize) -> Option<usize> {
        NonZero::new(len).map(|nz| self.below(nz))
    }

    /// Uniform integer in `min..=max`. The bounds are swapped if reversed.
    #[inline]
    #[must_use]
    #[expect(
        clippy::as_conversions,
        clippy::cast_possible_truncation,
        reason = "the offset is shifted back below the span"
    )]
    pub fn int_in(&mut self, min: i64, max: i64) -> i64 {
        let (lo, hi) = if min <= max { (min, max) } else { (max, min) };
        let span = hi.wrapping_sub(lo).cast_unsigned();
        let Some(width) = span.checked_add(1) else {
            // The full 64-bit range.
            return self.prng().cast_signed();
        };
        let offset = ((u128::from(self.prng()) * u128::from(width)) >> 64_u8) as u64;
        lo.wrapping_add(offset.cast_signed())
    }

    /// Uniform `usize` in `min..=max`.
    #[inline]
    #[must_use]
    pub fn usize_in(&mut self, min: usize, max: usize) -> usize {
        let (lo, hi) = if min <= max { (min, max) } else { (max, min) };
        match hi.checked_sub(lo).and_then(|span| span.checked_add(1)) {
            Some(width) => NonZero::new(width).map_or(lo, |nz| lo.saturating_add(self.below(nz))),
            // The full `usize` range.
            None => usize::try_from(self.prng()).unwrap_or(lo),
        }
    }

    /// Uniform float in `[0, 1)`.
    #[inline]
    #[must_use]
    #[expect(
        clippy::as_conversions,
        clippy::cast_precision_loss,
        reason = "53 bits fit exactly in an `f64` mantissa"
    )]
    pub fn unit(&mut self) -> f64 {
        const SCALE: f64 = 1.0 / (1_u64 << 53_u8) as f64;
        (self.prng() >> 11_u8) as f64 * SCALE
    }

    /// Derive an independent child seed,
    /// advancing this one by exactly one draw.
    #[inline]
    #[must_use]
    pub fn split(&mut self) -> Self {
        Self::new(self.prng())
    }
}

impl Default for Seed {
    #[inline]
    fn default() -> Self {
        Self::new(Self::DEFAULT)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn same_seed_same_stream() {
        let mut a = Seed::new(42);
        let mut b = Seed::new(42);
        for _ in 0..100 {
            let () = pretty_assertions::assert_eq!(a.prng(), b.prng());
        }
    }

    #[test]
    fn int_in_stays_in_bounds() {
        let mut seed = Seed::default();
        for _ in 0..10_000 {
            let i = seed.int_in(-3, 7);
            assert!((-3..=7).contains(&i), "{i} escaped -3..=7");
        }
        for _ in 0..1_000 {
            let _: i64 = seed.int_in(i64::MIN, i64::MAX);
        }
        let () = pretty_assertions::assert_eq!(seed.int_in(5, 5), 5);
    }

    #[test]
    fn int_in_hits_both_ends() {
        let mut seed = Seed::default();
        let draws: Vec<i64> = (0..1_000).map(|_| seed.int_in(0, 3)).collect();
        assert!(draws.contains(&0));
        assert!(draws.contains(&3));
    }

    #[test]
    fn unit_is_half_open() {
        let mut seed = Seed::default();
        for _ in 0..10_000 {
            let f = seed.unit();
            assert!((0.0..1.0).contains(&f), "{f} escaped [0, 1)");
        }
    }

    #[test]
    fn index_of_empty_is_none() {
        let mut seed = Seed::default();
        let () = pretty_assertions::assert_eq!(seed.index(0), None);
        let () = pretty_assertions::assert_eq!(seed.index(1), Some(0));
    }

    #[test]
    fn split_children_differ() {
        let mut seed = Seed::default();
        let mut a = seed.split();
        let mut b = seed.split();
        assert_ne!(a.prng(), b.prng());
    }
}
