#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the card sorting allocation engine.
//!
//! This crate defines the data model that connects the adapters, the
//! authoritative session, and the pure systems. The session owns a
//! [`StimulusPool`] and the [`Series`] of the block under construction, lends
//! them to the systems one cut at a time, and records [`Event`] values that
//! describe every intermediate carryover state. Once a run completes the
//! resulting [`Block`] values are immutable and are handed to presentation.

use std::fmt;

use serde::{Deserialize, Serialize};

mod config;
mod error;
mod pool;

pub use config::{BlockConfig, ExperimentConfig, SeriesDistribution};
pub use error::{AllocationError, InvalidSeriesSize};
pub use pool::{CarryoverState, StimulusPool};

/// Human readable name of the experiment reported by adapters.
pub const EXPERIMENT_NAME: &str = "Wisconsin Card Sorting";

/// Version of the allocation plan format emitted by adapters.
pub const PLAN_VERSION: &str = "0.1";

/// Number of singles every series receives before any mixing takes place.
pub const MANDATORY_SINGLES_PER_SERIES: usize = 2;

/// Index of a block within an experiment run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BlockIndex(usize);

impl BlockIndex {
    /// Creates a new zero-based block index.
    #[must_use]
    pub const fn new(value: usize) -> Self {
        Self(value)
    }

    /// Retrieves the zero-based index.
    #[must_use]
    pub const fn get(&self) -> usize {
        self.0
    }
}

impl fmt::Display for BlockIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0 + 1)
    }
}

/// Index of a deck cut within its block.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CutIndex(usize);

impl CutIndex {
    /// Creates a new zero-based cut index.
    #[must_use]
    pub const fn new(value: usize) -> Self {
        Self(value)
    }

    /// Retrieves the zero-based index.
    #[must_use]
    pub const fn get(&self) -> usize {
        self.0
    }
}

impl fmt::Display for CutIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0 + 1)
    }
}

/// Index of a series within its block.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SeriesIndex(usize);

impl SeriesIndex {
    /// Creates a new zero-based series index.
    #[must_use]
    pub const fn new(value: usize) -> Self {
        Self(value)
    }

    /// Retrieves the zero-based index.
    #[must_use]
    pub const fn get(&self) -> usize {
        self.0
    }
}

impl fmt::Display for SeriesIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0 + 1)
    }
}

/// Opaque stimulus handle together with the attributes encoded in its name.
///
/// The discriminant is derived from the handle's file stem and is carried
/// through the engine untouched so downstream scoring can compare categories.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StimulusItem {
    handle: String,
    discriminant: Vec<String>,
}

impl StimulusItem {
    /// Creates a stimulus from a resource handle such as an image path.
    #[must_use]
    pub fn new(handle: impl Into<String>) -> Self {
        let handle = handle.into();
        let discriminant = derive_discriminant(&handle);
        Self {
            handle,
            discriminant,
        }
    }

    /// Resource handle identifying the stimulus.
    #[must_use]
    pub fn handle(&self) -> &str {
        &self.handle
    }

    /// Category attributes encoded in the handle's file stem.
    #[must_use]
    pub fn discriminant(&self) -> &[String] {
        &self.discriminant
    }
}

fn derive_discriminant(handle: &str) -> Vec<String> {
    let file_name = handle.rsplit(['/', '\\']).next().unwrap_or(handle);
    let stem = match file_name.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => file_name,
    };
    stem.split(|c: char| c == '_' || c == '-' || c.is_whitespace())
        .filter(|segment| !segment.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Collection a stimulus was drawn from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StimulusKind {
    /// Card showing a single figure; eligible for mandatory series seeding.
    Single,
    /// Card showing two figures; only used for general filling.
    Double,
}

/// Stimulus placed into a series, tagged with the collection it came from.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Card {
    item: StimulusItem,
    kind: StimulusKind,
}

impl Card {
    /// Tags a stimulus with the collection it was drawn from.
    #[must_use]
    pub const fn new(item: StimulusItem, kind: StimulusKind) -> Self {
        Self { item, kind }
    }

    /// Stimulus carried by the card.
    #[must_use]
    pub const fn item(&self) -> &StimulusItem {
        &self.item
    }

    /// Collection the card was drawn from.
    #[must_use]
    pub const fn kind(&self) -> StimulusKind {
        self.kind
    }

    /// Convenience accessor for the stimulus handle.
    #[must_use]
    pub fn handle(&self) -> &str {
        self.item.handle()
    }
}

/// Number of trials a series holds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "usize", into = "usize")]
pub enum SeriesSize {
    /// Six trials.
    Six,
    /// Seven trials.
    Seven,
    /// Eight trials.
    Eight,
}

impl SeriesSize {
    /// Every supported size in ascending order.
    pub const ALL: [SeriesSize; 3] = [SeriesSize::Six, SeriesSize::Seven, SeriesSize::Eight];

    /// Number of slots the series provides.
    #[must_use]
    pub const fn slots(self) -> usize {
        match self {
            Self::Six => 6,
            Self::Seven => 7,
            Self::Eight => 8,
        }
    }
}

impl From<SeriesSize> for usize {
    fn from(size: SeriesSize) -> Self {
        size.slots()
    }
}

impl TryFrom<usize> for SeriesSize {
    type Error = InvalidSeriesSize;

    fn try_from(value: usize) -> Result<Self, Self::Error> {
        match value {
            6 => Ok(Self::Six),
            7 => Ok(Self::Seven),
            8 => Ok(Self::Eight),
            other => Err(InvalidSeriesSize(other)),
        }
    }
}

/// Sorting rule shared by every trial in a series.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleLabel {
    /// Cards are matched by the colour of their figures.
    Colour,
    /// Cards are matched by the shape of their figures.
    Shape,
    /// Cards are matched by how many figures they show.
    Number,
}

impl RuleLabel {
    /// Canonical label set used when no configuration overrides it.
    pub const ALL: [RuleLabel; 3] = [RuleLabel::Colour, RuleLabel::Shape, RuleLabel::Number];
}

impl fmt::Display for RuleLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Colour => "colour",
            Self::Shape => "shape",
            Self::Number => "number",
        };
        f.write_str(name)
    }
}

/// Ordered run of trials that share one sorting rule.
///
/// The cards never exceed the target size. Once the series is initialized
/// its first two cards are singles.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Series {
    index: SeriesIndex,
    size: SeriesSize,
    cards: Vec<Card>,
    initialized: bool,
}

impl Series {
    /// Creates an empty, uninitialized series.
    #[must_use]
    pub const fn new(index: SeriesIndex, size: SeriesSize) -> Self {
        Self {
            index,
            size,
            cards: Vec::new(),
            initialized: false,
        }
    }

    /// Position of the series within its block.
    #[must_use]
    pub const fn index(&self) -> SeriesIndex {
        self.index
    }

    /// Target size of the series.
    #[must_use]
    pub const fn size(&self) -> SeriesSize {
        self.size
    }

    /// Cards placed so far in presentation order.
    #[must_use]
    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    /// Reports whether the mandatory seeding pair has been placed.
    #[must_use]
    pub const fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Reports whether every slot of the series holds a card.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.cards.len() == self.size.slots()
    }

    /// Number of slots that still need a card.
    #[must_use]
    pub fn remaining_slots(&self) -> usize {
        self.size.slots().saturating_sub(self.cards.len())
    }

    /// Places the mandatory pair of singles and marks the series initialized.
    pub fn seed(&mut self, first: Card, second: Card) {
        debug_assert!(!self.initialized, "series seeded twice");
        debug_assert!(self.cards.is_empty(), "seeding must open the series");
        self.cards.push(first);
        self.cards.push(second);
        self.initialized = true;
    }

    /// Appends cards after the seeding pair, never exceeding the target size.
    ///
    /// Returns the number of cards that were accepted; the iterator is only
    /// advanced for accepted cards.
    pub fn fill<I>(&mut self, cards: &mut I) -> usize
    where
        I: Iterator<Item = Card>,
    {
        let before = self.cards.len();
        let room = self.remaining_slots();
        self.cards.extend(cards.take(room));
        self.cards.len() - before
    }
}

/// Number of slots a deck cut assigns to a single series.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SeriesUsage {
    series: SeriesIndex,
    used_slots: usize,
}

impl SeriesUsage {
    /// Records that `used_slots` slots of `series` come from the cut.
    #[must_use]
    pub const fn new(series: SeriesIndex, used_slots: usize) -> Self {
        Self { series, used_slots }
    }

    /// Series receiving the slots.
    #[must_use]
    pub const fn series(&self) -> SeriesIndex {
        self.series
    }

    /// Number of slots filled by the cut.
    #[must_use]
    pub const fn used_slots(&self) -> usize {
        self.used_slots
    }
}

/// One delivered batch of cards ("mazo") spread across a contiguous span of series.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeckCut {
    index: CutIndex,
    size: usize,
    from_series: SeriesIndex,
    to_series: SeriesIndex,
    usage: Vec<SeriesUsage>,
    dealt: usize,
}

impl DeckCut {
    /// Creates a cut description from its ordered usage entries.
    ///
    /// The dealt count starts at the planned size until the allocation of
    /// the cut is recorded.
    #[must_use]
    pub fn new(
        index: CutIndex,
        size: usize,
        from_series: SeriesIndex,
        to_series: SeriesIndex,
        usage: Vec<SeriesUsage>,
    ) -> Self {
        Self {
            index,
            size,
            from_series,
            to_series,
            usage,
            dealt: size,
        }
    }

    /// Position of the cut within its block.
    #[must_use]
    pub const fn index(&self) -> CutIndex {
        self.index
    }

    /// Number of cards delivered with the cut.
    #[must_use]
    pub const fn size(&self) -> usize {
        self.size
    }

    /// Number of cards actually dealt from the pool for the cut.
    ///
    /// Differs from [`DeckCut::size`] by one when a seeding pair overshoots
    /// the single slot the cut planned for a new series.
    #[must_use]
    pub const fn dealt(&self) -> usize {
        self.dealt
    }

    /// Records how many cards the allocation dealt for the cut.
    pub fn record_dealt(&mut self, dealt: usize) {
        self.dealt = dealt;
    }

    /// First series the cut contributes to.
    #[must_use]
    pub const fn from_series(&self) -> SeriesIndex {
        self.from_series
    }

    /// Last series the cut contributes to.
    #[must_use]
    pub const fn to_series(&self) -> SeriesIndex {
        self.to_series
    }

    /// Ordered usage entries, one per series in the span.
    #[must_use]
    pub fn usage(&self) -> &[SeriesUsage] {
        &self.usage
    }

    /// Total slots assigned by the usage entries.
    #[must_use]
    pub fn used_slots(&self) -> usize {
        self.usage.iter().map(SeriesUsage::used_slots).sum()
    }

    /// Zero-based series positions covered by the cut, inclusive on both ends.
    #[must_use]
    pub fn span(&self) -> std::ops::RangeInclusive<usize> {
        self.from_series.get()..=self.to_series.get()
    }
}

/// Fifteen series, their deck cuts, and the rule label of every series.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    index: BlockIndex,
    series: Vec<Series>,
    cuts: Vec<DeckCut>,
    labels: Vec<RuleLabel>,
}

impl Block {
    /// Assembles a finished block.
    #[must_use]
    pub fn new(
        index: BlockIndex,
        series: Vec<Series>,
        cuts: Vec<DeckCut>,
        labels: Vec<RuleLabel>,
    ) -> Self {
        Self {
            index,
            series,
            cuts,
            labels,
        }
    }

    /// Position of the block within the run.
    #[must_use]
    pub const fn index(&self) -> BlockIndex {
        self.index
    }

    /// Series in presentation order.
    #[must_use]
    pub fn series(&self) -> &[Series] {
        &self.series
    }

    /// Deck cuts in delivery order.
    #[must_use]
    pub fn cuts(&self) -> &[DeckCut] {
        &self.cuts
    }

    /// Rule labels aligned one-to-one with [`Block::series`].
    #[must_use]
    pub fn labels(&self) -> &[RuleLabel] {
        &self.labels
    }

    /// Total number of trial slots in the block.
    #[must_use]
    pub fn slot_total(&self) -> usize {
        self.series.iter().map(|series| series.size().slots()).sum()
    }

    /// Iterates over every series paired with its rule label.
    pub fn labelled_series(&self) -> impl Iterator<Item = (&Series, RuleLabel)> {
        self.series.iter().zip(self.labels.iter().copied())
    }
}

/// Origin of the pool handed to the allocator for a cut.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PoolSource {
    /// The original stimulus collections, used only for the very first cut.
    Original,
    /// Leftovers carried over from the previous cut or block.
    Carryover,
}

/// Trace entries recorded by the session while it builds a run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Event {
    /// Announces the shuffled series sizes of a block.
    SeriesSizesPlanned {
        /// Block whose sizes were drawn.
        block: BlockIndex,
        /// Sizes in presentation order.
        sizes: Vec<SeriesSize>,
    },
    /// Confirms that a cut was allocated and reports the resulting carryover.
    CutAllocated {
        /// Block containing the cut.
        block: BlockIndex,
        /// Cut that was allocated.
        cut: CutIndex,
        /// Where the pool for this cut came from.
        source: PoolSource,
        /// Singles reserved for the cut.
        reserved_singles: usize,
        /// Doubles reserved for the cut.
        reserved_doubles: usize,
        /// Singles carried forward after the cut.
        leftover_singles: usize,
        /// Doubles carried forward after the cut.
        leftover_doubles: usize,
    },
    /// Confirms that every series of a block is complete.
    BlockCompleted {
        /// Block that was completed.
        block: BlockIndex,
        /// Cards drawn from the pool while building the block.
        drawn: usize,
    },
    /// Reports the cards that remained unused after the final block.
    RemainderDiscarded {
        /// Singles that were never drawn.
        singles: usize,
        /// Doubles that were never drawn.
        doubles: usize,
    },
}
