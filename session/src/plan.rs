use std::collections::HashSet;

use card_sort_core::{
    AllocationError, Block, CarryoverState, StimulusKind, MANDATORY_SINGLES_PER_SERIES,
};
use serde::{Deserialize, Serialize};

/// Immutable result of a completed run, ready for presentation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExperimentPlan {
    seed: u64,
    blocks: Vec<Block>,
    discarded: CarryoverState,
    initial_singles: usize,
    initial_doubles: usize,
}

impl ExperimentPlan {
    pub(crate) fn new(
        seed: u64,
        blocks: Vec<Block>,
        discarded: CarryoverState,
        initial_singles: usize,
        initial_doubles: usize,
    ) -> Self {
        Self {
            seed,
            blocks,
            discarded,
            initial_singles,
            initial_doubles,
        }
    }

    /// Seed that reproduces the run.
    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    /// Blocks in presentation order.
    #[must_use]
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Stimuli that were never drawn.
    #[must_use]
    pub const fn discarded(&self) -> &CarryoverState {
        &self.discarded
    }

    /// Size of the combined pool the run started from.
    #[must_use]
    pub const fn initial_pool(&self) -> usize {
        self.initial_singles + self.initial_doubles
    }

    /// Number of singles the run started from.
    #[must_use]
    pub const fn initial_singles(&self) -> usize {
        self.initial_singles
    }

    /// Number of doubles the run started from.
    #[must_use]
    pub const fn initial_doubles(&self) -> usize {
        self.initial_doubles
    }

    /// Cards placed across every series of the run.
    #[must_use]
    pub fn drawn(&self) -> usize {
        self.blocks
            .iter()
            .flat_map(Block::series)
            .map(|series| series.cards().len())
            .sum()
    }
}

/// Checks the invariants every finished run must satisfy.
///
/// Every series is complete and opens with two singles, no stimulus appears
/// twice, and the run never places more cards than the pool held.
pub fn verify_plan(plan: &ExperimentPlan) -> Result<(), AllocationError> {
    let mut seen = HashSet::new();

    for block in plan.blocks() {
        for series in block.series() {
            if !series.is_complete() {
                return Err(AllocationError::IncompleteSeries {
                    block: block.index(),
                    series: series.index(),
                    len: series.cards().len(),
                    target: series.size().slots(),
                });
            }

            let seeded = series
                .cards()
                .iter()
                .take(MANDATORY_SINGLES_PER_SERIES)
                .all(|card| card.kind() == StimulusKind::Single);
            if !seeded {
                return Err(AllocationError::MisplacedSeed {
                    block: block.index(),
                    series: series.index(),
                });
            }

            for card in series.cards() {
                if !seen.insert(card.handle()) {
                    return Err(AllocationError::DuplicateStimulus {
                        handle: card.handle().to_owned(),
                    });
                }
            }
        }
    }

    let drawn = seen.len();
    let available = plan.initial_pool();
    if drawn > available {
        return Err(AllocationError::PoolOverdrawn { drawn, available });
    }

    Ok(())
}
