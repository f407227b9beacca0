#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative state of one experiment run.
//!
//! A [`Session`] exclusively owns the stimulus pool, the random source, and
//! every series built during the run. Blocks are produced one at a time:
//! the session draws the block's series sizes, lays the configured deck cuts
//! over them, and hands each cut to the allocator together with the pool
//! carried over from the previous cut. Finished blocks never change again.

use std::mem;

use card_sort_core::{
    AllocationError, Block, BlockIndex, CarryoverState, Event, ExperimentConfig, PoolSource,
    Series, SeriesIndex, StimulusItem, StimulusPool,
};
use card_sort_system_allocation::SeriesAllocator;
use card_sort_system_deck_plan::plan_deck_cuts;
use card_sort_system_series_sizes::SeriesSizePlanner;
use card_sort_system_series_types::SeriesTypeSequencer;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

mod plan;

pub use plan::{verify_plan, ExperimentPlan};

/// Drives the allocation of every block of one experiment run.
#[derive(Debug)]
pub struct Session {
    config: ExperimentConfig,
    seed: u64,
    rng: ChaCha8Rng,
    originals: Option<StimulusPool>,
    carryover: CarryoverState,
    initial_singles: usize,
    initial_doubles: usize,
    blocks: Vec<Block>,
    size_planner: SeriesSizePlanner,
    allocator: SeriesAllocator,
    sequencer: SeriesTypeSequencer,
}

impl Session {
    /// Prepares a run over already shuffled singles and doubles.
    ///
    /// The configuration is validated before anything is drawn so that an
    /// inconsistent deck layout aborts preparation immediately.
    pub fn new(
        config: ExperimentConfig,
        singles: Vec<StimulusItem>,
        doubles: Vec<StimulusItem>,
        seed: u64,
    ) -> Result<Self, AllocationError> {
        config.validate()?;

        let size_planner = SeriesSizePlanner::new(config.series_distribution);
        let sequencer = SeriesTypeSequencer::new(config.rule_labels.clone(), config.label_rounds());
        let initial_singles = singles.len();
        let initial_doubles = doubles.len();

        Ok(Self {
            config,
            seed,
            rng: ChaCha8Rng::seed_from_u64(seed),
            originals: Some(StimulusPool::new(singles, doubles)),
            carryover: CarryoverState::default(),
            initial_singles,
            initial_doubles,
            blocks: Vec::new(),
            size_planner,
            allocator: SeriesAllocator::new(),
            sequencer,
        })
    }

    /// Reports whether every configured block has been built.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.blocks.len() >= self.config.blocks.len()
    }

    /// Builds the next block, returning `None` once every block exists.
    pub fn build_next_block(
        &mut self,
        out_events: &mut Vec<Event>,
    ) -> Result<Option<&Block>, AllocationError> {
        let Some(block_config) = self.config.blocks.get(self.blocks.len()) else {
            return Ok(None);
        };
        let block = BlockIndex::new(self.blocks.len());

        let sizes = self.size_planner.plan(&mut self.rng);
        out_events.push(Event::SeriesSizesPlanned {
            block,
            sizes: sizes.clone(),
        });

        let mut cuts = plan_deck_cuts(&sizes, &block_config.cut_sizes)?;
        let mut series: Vec<Series> = sizes
            .iter()
            .enumerate()
            .map(|(index, size)| Series::new(SeriesIndex::new(index), *size))
            .collect();

        let mut drawn = 0;
        for cut in &mut cuts {
            let (pool, source) = self.next_pool();
            let outcome = self
                .allocator
                .allocate(block, &mut series, cut, pool, &mut self.rng)?;
            let reservation = outcome.reservation();
            drawn += reservation.total();
            cut.record_dealt(reservation.total());

            self.carryover = outcome.into_leftover();
            out_events.push(Event::CutAllocated {
                block,
                cut: cut.index(),
                source,
                reserved_singles: reservation.singles,
                reserved_doubles: reservation.doubles,
                leftover_singles: self.carryover.singles().len(),
                leftover_doubles: self.carryover.doubles().len(),
            });
        }

        if let Some(incomplete) = series.iter().find(|entry| !entry.is_complete()) {
            return Err(AllocationError::IncompleteSeries {
                block,
                series: incomplete.index(),
                len: incomplete.cards().len(),
                target: incomplete.size().slots(),
            });
        }

        let labels = self.sequencer.sequence(&mut self.rng);
        tracing::info!(block = %block, drawn, carried = self.carryover.len(), "block completed");
        out_events.push(Event::BlockCompleted { block, drawn });

        self.blocks.push(Block::new(block, series, cuts, labels));
        Ok(self.blocks.last())
    }

    /// Builds every remaining block, discards the remainder, and verifies the run.
    pub fn run(mut self, out_events: &mut Vec<Event>) -> Result<ExperimentPlan, AllocationError> {
        while self.build_next_block(out_events)?.is_some() {}
        self.finish(out_events)
    }

    fn finish(self, out_events: &mut Vec<Event>) -> Result<ExperimentPlan, AllocationError> {
        let discarded = self.carryover;
        tracing::info!(
            singles = discarded.singles().len(),
            doubles = discarded.doubles().len(),
            "discarding unused stimuli"
        );
        out_events.push(Event::RemainderDiscarded {
            singles: discarded.singles().len(),
            doubles: discarded.doubles().len(),
        });

        let plan = ExperimentPlan::new(
            self.seed,
            self.blocks,
            discarded,
            self.initial_singles,
            self.initial_doubles,
        );
        verify_plan(&plan)?;
        Ok(plan)
    }

    /// Selects the pool for the next cut.
    ///
    /// Leftovers always take precedence. The original collections are used
    /// exactly once, for the first cut of the run; afterwards an empty
    /// carryover yields an empty pool and the allocator reports exhaustion.
    fn next_pool(&mut self) -> (StimulusPool, PoolSource) {
        if !self.carryover.is_empty() {
            let carryover = mem::take(&mut self.carryover);
            return (StimulusPool::from_carryover(carryover), PoolSource::Carryover);
        }

        match self.originals.take() {
            Some(originals) => (originals, PoolSource::Original),
            None => (StimulusPool::default(), PoolSource::Carryover),
        }
    }
}

/// Query functions that provide read-only access to a session in progress.
pub mod query {
    use card_sort_core::{Block, CarryoverState};

    use super::Session;

    /// Blocks completed so far, in presentation order.
    #[must_use]
    pub fn blocks(session: &Session) -> &[Block] {
        &session.blocks
    }

    /// Stimuli that will seed the next cut.
    #[must_use]
    pub fn carryover(session: &Session) -> &CarryoverState {
        &session.carryover
    }

    /// Seed of the random source driving the run.
    #[must_use]
    pub fn seed(session: &Session) -> u64 {
        session.seed
    }

    /// Reports whether the original collections have been handed out yet.
    #[must_use]
    pub fn originals_pending(session: &Session) -> bool {
        session.originals.is_some()
    }
}
