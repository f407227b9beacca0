use thiserror::Error;

use crate::{BlockIndex, CutIndex, SeriesIndex, MANDATORY_SINGLES_PER_SERIES};

/// Raised when a numeric series size falls outside {6, 7, 8}.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
#[error("series size {0} is not one of 6, 7 or 8")]
pub struct InvalidSeriesSize(pub usize);

/// Fatal conditions that abort the preparation of an experiment run.
///
/// Configuration variants are raised before any card is drawn. Pool
/// variants indicate that the stimulus collections are too small for the
/// configured blocks. Verification variants are raised by the end-of-run
/// check and point at a defect in the allocation itself.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum AllocationError {
    /// The configuration declares no blocks.
    #[error("experiment declares no blocks")]
    NoBlocks,
    /// The cut sizes of a block do not add up to its slot total.
    #[error("invalid deck sizes in block {block}: sum is {actual}, expected {expected}")]
    CutSizeMismatch {
        /// Offending block.
        block: BlockIndex,
        /// Slot total required by the series distribution.
        expected: usize,
        /// Sum of the configured cut sizes.
        actual: usize,
    },
    /// A block declares a cut that delivers no cards.
    #[error("deck {cut} of block {block} is empty")]
    EmptyCut {
        /// Offending block.
        block: BlockIndex,
        /// Offending cut.
        cut: CutIndex,
    },
    /// The series count cannot be labelled in whole shuffle rounds.
    #[error("{series} series cannot be labelled in whole rounds of {labels} rule labels")]
    LabelMismatch {
        /// Number of series per block.
        series: usize,
        /// Number of distinct rule labels.
        labels: usize,
    },
    /// The rule label set contains the same label twice.
    #[error("rule label set contains duplicates")]
    DuplicateLabel,
    /// The deck plan does not cover every series slot exactly once.
    #[error("deck plan covers {covered} slots but the series require {expected}")]
    DeckPlanCoverage {
        /// Sum of the series sizes.
        expected: usize,
        /// Slots covered by the cuts.
        covered: usize,
    },
    /// The pool holds fewer cards than a cut demands.
    #[error(
        "deck {cut} of block {block} needs {requested} cards but only {available} remain \
         (short by {})", shortfall(.requested, .available)
    )]
    PoolExhausted {
        /// Block being built.
        block: BlockIndex,
        /// Cut being allocated.
        cut: CutIndex,
        /// Cards the cut must reserve.
        requested: usize,
        /// Cards left in the pool.
        available: usize,
    },
    /// Too few singles were reserved to seed a newly touched series.
    #[error(
        "not enough singles to seed series {series} in deck {cut} of block {block}: \
         {available} left, {} required", MANDATORY_SINGLES_PER_SERIES
    )]
    InsufficientSingles {
        /// Block being built.
        block: BlockIndex,
        /// Cut being allocated.
        cut: CutIndex,
        /// Series that could not be seeded.
        series: SeriesIndex,
        /// Reserved singles left when seeding was attempted.
        available: usize,
    },
    /// A series finished the run with empty slots.
    #[error("series {series} of block {block} holds {len} of {target} cards")]
    IncompleteSeries {
        /// Block containing the series.
        block: BlockIndex,
        /// Incomplete series.
        series: SeriesIndex,
        /// Cards placed.
        len: usize,
        /// Target size.
        target: usize,
    },
    /// A series does not open with two singles.
    #[error("series {series} of block {block} does not open with two singles")]
    MisplacedSeed {
        /// Block containing the series.
        block: BlockIndex,
        /// Offending series.
        series: SeriesIndex,
    },
    /// The same stimulus was placed twice in one run.
    #[error("stimulus {handle} was drawn more than once")]
    DuplicateStimulus {
        /// Handle of the repeated stimulus.
        handle: String,
    },
    /// More cards were placed than the pool ever held.
    #[error("{drawn} cards were placed from a pool of {available}")]
    PoolOverdrawn {
        /// Cards placed across the run.
        drawn: usize,
        /// Size of the original pool.
        available: usize,
    },
}

fn shortfall(requested: &usize, available: &usize) -> usize {
    requested.saturating_sub(*available)
}
