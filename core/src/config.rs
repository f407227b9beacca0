use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::{AllocationError, BlockIndex, CutIndex, RuleLabel, SeriesSize};

/// Deck sizes delivered per block when no configuration overrides them.
pub(crate) const DEFAULT_CUT_SIZES: [&[usize]; 4] =
    [&[60, 45], &[15, 60, 30], &[30, 60, 15], &[45, 60]];

/// Fixed configuration of an experiment run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperimentConfig {
    /// Blocks in presentation order.
    pub blocks: Vec<BlockConfig>,
    /// Series sizes drawn for every block.
    pub series_distribution: SeriesDistribution,
    /// Rule labels rotated across the series of a block.
    pub rule_labels: Vec<RuleLabel>,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            blocks: DEFAULT_CUT_SIZES
                .iter()
                .map(|cut_sizes| BlockConfig {
                    cut_sizes: cut_sizes.to_vec(),
                })
                .collect(),
            series_distribution: SeriesDistribution::default(),
            rule_labels: RuleLabel::ALL.to_vec(),
        }
    }
}

impl ExperimentConfig {
    /// Checks that every block can be planned before any card is drawn.
    pub fn validate(&self) -> Result<(), AllocationError> {
        if self.blocks.is_empty() {
            return Err(AllocationError::NoBlocks);
        }

        let expected = self.series_distribution.slot_total();
        for (block_index, block) in self.blocks.iter().enumerate() {
            let block_index = BlockIndex::new(block_index);
            if let Some(cut) = block.cut_sizes.iter().position(|size| *size == 0) {
                return Err(AllocationError::EmptyCut {
                    block: block_index,
                    cut: CutIndex::new(cut),
                });
            }

            let actual = block.slot_total();
            if actual != expected {
                return Err(AllocationError::CutSizeMismatch {
                    block: block_index,
                    expected,
                    actual,
                });
            }
        }

        let mut seen = HashSet::new();
        if !self.rule_labels.iter().all(|label| seen.insert(*label)) {
            return Err(AllocationError::DuplicateLabel);
        }

        let series = self.series_distribution.series_count();
        let labels = self.rule_labels.len();
        if labels == 0 || series == 0 || series % labels != 0 {
            return Err(AllocationError::LabelMismatch { series, labels });
        }

        Ok(())
    }

    /// Number of label shuffle rounds needed to cover one block.
    #[must_use]
    pub fn label_rounds(&self) -> usize {
        match self.rule_labels.len() {
            0 => 0,
            labels => self.series_distribution.series_count() / labels,
        }
    }
}

/// Deck cut sequence of a single block.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockConfig {
    /// Cards delivered by each cut, in delivery order.
    pub cut_sizes: Vec<usize>,
}

impl BlockConfig {
    /// Total cards delivered across the block's cuts.
    #[must_use]
    pub fn slot_total(&self) -> usize {
        self.cut_sizes.iter().sum()
    }
}

/// How many series of each size a block contains.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeriesDistribution {
    /// Series holding six trials.
    pub six: usize,
    /// Series holding seven trials.
    pub seven: usize,
    /// Series holding eight trials.
    pub eight: usize,
}

impl Default for SeriesDistribution {
    fn default() -> Self {
        Self {
            six: 5,
            seven: 5,
            eight: 5,
        }
    }
}

impl SeriesDistribution {
    /// Number of series of the given size.
    #[must_use]
    pub const fn count(&self, size: SeriesSize) -> usize {
        match size {
            SeriesSize::Six => self.six,
            SeriesSize::Seven => self.seven,
            SeriesSize::Eight => self.eight,
        }
    }

    /// Number of series per block.
    #[must_use]
    pub const fn series_count(&self) -> usize {
        self.six + self.seven + self.eight
    }

    /// Number of trial slots per block.
    #[must_use]
    pub fn slot_total(&self) -> usize {
        SeriesSize::ALL
            .iter()
            .map(|size| size.slots() * self.count(*size))
            .sum()
    }

    /// Unshuffled multiset of sizes in ascending order.
    #[must_use]
    pub fn multiset(&self) -> Vec<SeriesSize> {
        SeriesSize::ALL
            .iter()
            .flat_map(|size| std::iter::repeat(*size).take(self.count(*size)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::{BlockConfig, ExperimentConfig, SeriesDistribution};
    use crate::{AllocationError, BlockIndex, CutIndex, RuleLabel};

    #[test]
    fn default_configuration_is_valid() {
        let config = ExperimentConfig::default();
        assert_eq!(config.blocks.len(), 4);
        assert_eq!(config.series_distribution.slot_total(), 105);
        assert_eq!(config.series_distribution.series_count(), 15);
        assert_eq!(config.label_rounds(), 5);
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn every_default_block_sums_to_slot_total() {
        let config = ExperimentConfig::default();
        for block in &config.blocks {
            assert_eq!(block.slot_total(), 105);
        }
    }

    #[test]
    fn rejects_cut_sizes_with_wrong_sum() {
        let mut config = ExperimentConfig::default();
        config.blocks[2] = BlockConfig {
            cut_sizes: vec![30, 60, 10],
        };
        assert_eq!(
            config.validate(),
            Err(AllocationError::CutSizeMismatch {
                block: BlockIndex::new(2),
                expected: 105,
                actual: 100,
            })
        );
    }

    #[test]
    fn rejects_empty_cut() {
        let mut config = ExperimentConfig::default();
        config.blocks[0].cut_sizes = vec![60, 0, 45];
        assert_eq!(
            config.validate(),
            Err(AllocationError::EmptyCut {
                block: BlockIndex::new(0),
                cut: CutIndex::new(1),
            })
        );
    }

    #[test]
    fn rejects_label_sets_that_do_not_tile_the_block() {
        let mut config = ExperimentConfig::default();
        config.rule_labels = vec![RuleLabel::Colour, RuleLabel::Shape];
        assert_eq!(
            config.validate(),
            Err(AllocationError::LabelMismatch {
                series: 15,
                labels: 2,
            })
        );

        config.rule_labels = vec![RuleLabel::Colour, RuleLabel::Colour, RuleLabel::Shape];
        assert_eq!(config.validate(), Err(AllocationError::DuplicateLabel));
    }

    #[test]
    fn multiset_matches_distribution() {
        let distribution = SeriesDistribution {
            six: 1,
            seven: 2,
            eight: 0,
        };
        let sizes: Vec<usize> = distribution.multiset().iter().map(|s| s.slots()).collect();
        assert_eq!(sizes, [6, 7, 7]);
        assert_eq!(distribution.slot_total(), 20);
    }

    #[test]
    fn rejects_missing_blocks() {
        let config = ExperimentConfig {
            blocks: Vec::new(),
            ..ExperimentConfig::default()
        };
        assert_eq!(config.validate(), Err(AllocationError::NoBlocks));
    }
}
