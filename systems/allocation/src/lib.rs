#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that fills the series touched by one deck cut.
//!
//! A cut reserves singles and doubles from the pool in proportion to what
//! the pool currently holds, seeds every series it touches for the first
//! time with two singles, shuffles the rest of the reservation, and deals it
//! across its span in order. Whatever was not reserved is handed back as the
//! carryover for the next cut.

use card_sort_core::{
    AllocationError, BlockIndex, CarryoverState, Card, DeckCut, Series, StimulusKind,
    StimulusPool, MANDATORY_SINGLES_PER_SERIES,
};
use rand::{seq::SliceRandom, Rng};

/// Number of singles and doubles reserved for a cut.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Reservation {
    /// Singles taken from the front of the singles queue.
    pub singles: usize,
    /// Doubles taken from the front of the doubles queue.
    pub doubles: usize,
}

impl Reservation {
    /// Total cards reserved.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.singles + self.doubles
    }
}

/// Splits `demand` between singles and doubles in proportion to the pool.
///
/// The singles share is rounded half-up: `floor((2·n·S + T) / (2·T))`. The
/// doubles share is whatever remains of `demand`. An empty pool yields an
/// empty reservation.
#[must_use]
pub fn proportional_split(demand: usize, singles: usize, doubles: usize) -> Reservation {
    let total = singles + doubles;
    if total == 0 {
        return Reservation::default();
    }

    let numerator = 2 * demand as u128 * singles as u128 + total as u128;
    let singles_share = (numerator / (2 * total as u128)) as usize;
    Reservation {
        singles: singles_share,
        doubles: demand - singles_share,
    }
}

/// Cards the cut must place in each series of its span, in span order.
///
/// A series touched for the first time needs at least its seeding pair even
/// when the cut only plans a single slot for it; the cut that continues the
/// series then places one card fewer. Every other entry matches the planned
/// usage, capped by the slots the series still has free.
///
/// # Panics
///
/// Panics if `cut` names a series outside `series`, which happens only when
/// the cut was planned for a different block.
#[must_use]
pub fn span_quotas(series: &[Series], cut: &DeckCut) -> Vec<usize> {
    cut.usage()
        .iter()
        .map(|entry| {
            let target = &series[entry.series().get()];
            if target.is_initialized() {
                entry.used_slots().min(target.remaining_slots())
            } else {
                entry
                    .used_slots()
                    .max(MANDATORY_SINGLES_PER_SERIES)
                    .min(target.remaining_slots())
            }
        })
        .collect()
}

/// Outcome of allocating one cut.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CutAllocation {
    reservation: Reservation,
    leftover: CarryoverState,
}

impl CutAllocation {
    /// Cards reserved from the pool for this cut.
    #[must_use]
    pub const fn reservation(&self) -> Reservation {
        self.reservation
    }

    /// Undrawn stimuli to carry into the next cut.
    #[must_use]
    pub const fn leftover(&self) -> &CarryoverState {
        &self.leftover
    }

    /// Consumes the outcome, returning the carryover.
    #[must_use]
    pub fn into_leftover(self) -> CarryoverState {
        self.leftover
    }
}

/// Fills series from a stimulus pool one deck cut at a time.
#[derive(Debug, Default)]
pub struct SeriesAllocator {
    mixing_workspace: Vec<Card>,
}

impl SeriesAllocator {
    /// Creates an allocator with an empty mixing workspace.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates `cut` into `series`, consuming the reservation from `pool`.
    ///
    /// On success every series in the cut's span has received its quota and
    /// the returned carryover holds the untouched remainder of `pool`. Any
    /// error aborts the run; `series` may be partially filled by then.
    pub fn allocate<R>(
        &mut self,
        block: BlockIndex,
        series: &mut [Series],
        cut: &DeckCut,
        mut pool: StimulusPool,
        rng: &mut R,
    ) -> Result<CutAllocation, AllocationError>
    where
        R: Rng + ?Sized,
    {
        let quotas = span_quotas(series, cut);
        let demand: usize = quotas.iter().sum();
        let available = pool.len();
        if demand > available {
            return Err(AllocationError::PoolExhausted {
                block,
                cut: cut.index(),
                requested: demand,
                available,
            });
        }

        let reservation = proportional_split(demand, pool.singles_len(), pool.doubles_len());
        let mut singles = pool
            .take_front(StimulusKind::Single, reservation.singles)
            .into_iter();
        let doubles = pool.take_front(StimulusKind::Double, reservation.doubles);

        let mut seeded = vec![0; quotas.len()];
        for (slot, entry) in cut.usage().iter().enumerate() {
            let target = &mut series[entry.series().get()];
            if target.is_initialized() {
                continue;
            }

            let pair: Vec<Card> = singles
                .by_ref()
                .take(MANDATORY_SINGLES_PER_SERIES)
                .collect();
            let [first, second]: [Card; MANDATORY_SINGLES_PER_SERIES] =
                pair.try_into().map_err(|partial: Vec<Card>| {
                    AllocationError::InsufficientSingles {
                        block,
                        cut: cut.index(),
                        series: entry.series(),
                        available: partial.len(),
                    }
                })?;
            target.seed(first, second);
            seeded[slot] = MANDATORY_SINGLES_PER_SERIES;
        }

        self.mixing_workspace.clear();
        self.mixing_workspace.extend(singles);
        self.mixing_workspace.extend(doubles);
        self.mixing_workspace.shuffle(rng);

        let mut mixed = self.mixing_workspace.drain(..);
        for ((entry, quota), seeded) in cut.usage().iter().zip(&quotas).zip(&seeded) {
            let mut batch = mixed.by_ref().take(quota.saturating_sub(*seeded));
            let _ = series[entry.series().get()].fill(&mut batch);
        }
        debug_assert_eq!(mixed.len(), 0, "reservation must match the span demand");
        drop(mixed);

        let leftover = pool.into_carryover();
        tracing::debug!(
            block = %block,
            cut = %cut.index(),
            reserved_singles = reservation.singles,
            reserved_doubles = reservation.doubles,
            leftover = leftover.len(),
            "deck cut allocated"
        );

        Ok(CutAllocation {
            reservation,
            leftover,
        })
    }
}
