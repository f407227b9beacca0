#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that draws the series sizes of a block.

use card_sort_core::{SeriesDistribution, SeriesSize};
use rand::{seq::SliceRandom, Rng};

/// Produces a uniformly random permutation of the configured size multiset.
#[derive(Clone, Copy, Debug, Default)]
pub struct SeriesSizePlanner {
    distribution: SeriesDistribution,
}

impl SeriesSizePlanner {
    /// Creates a planner for the provided distribution.
    #[must_use]
    pub const fn new(distribution: SeriesDistribution) -> Self {
        Self { distribution }
    }

    /// Draws the sizes of one block. Successive calls are independent.
    pub fn plan<R>(&self, rng: &mut R) -> Vec<SeriesSize>
    where
        R: Rng + ?Sized,
    {
        let mut sizes = self.distribution.multiset();
        sizes.shuffle(rng);
        sizes
    }
}
