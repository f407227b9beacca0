#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that assigns a sorting rule to every series of a block.
//!
//! The labels are dealt in rounds. Each round is a shuffle of the whole
//! label set, so every label appears once per round, and a round never
//! opens with the label that closed the previous one. The first round of a
//! block is unconstrained by the block before it.

use card_sort_core::RuleLabel;
use rand::{seq::SliceRandom, Rng};

/// Produces balanced, boundary-constrained rule label sequences.
#[derive(Clone, Debug)]
pub struct SeriesTypeSequencer {
    labels: Vec<RuleLabel>,
    rounds: usize,
}

impl Default for SeriesTypeSequencer {
    fn default() -> Self {
        Self::new(RuleLabel::ALL.to_vec(), 5)
    }
}

impl SeriesTypeSequencer {
    /// Creates a sequencer dealing `rounds` shuffles of `labels`.
    #[must_use]
    pub fn new(labels: Vec<RuleLabel>, rounds: usize) -> Self {
        Self { labels, rounds }
    }

    /// Length of every sequence produced by [`SeriesTypeSequencer::sequence`].
    #[must_use]
    pub fn len(&self) -> usize {
        self.labels.len() * self.rounds
    }

    /// Reports whether the sequencer produces empty sequences.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Deals the label sequence of one block.
    pub fn sequence<R>(&self, rng: &mut R) -> Vec<RuleLabel>
    where
        R: Rng + ?Sized,
    {
        let mut sequence: Vec<RuleLabel> = Vec::with_capacity(self.len());
        let mut round = self.labels.clone();

        for _ in 0..self.rounds {
            round.shuffle(rng);
            if let Some(previous) = sequence.last().copied() {
                // Only reshuffle when some other label can open the round.
                if round.iter().any(|label| *label != previous) {
                    while round.first() == Some(&previous) {
                        round.shuffle(rng);
                    }
                }
            }
            sequence.extend_from_slice(&round);
        }

        sequence
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn every_label_appears_once_per_round() {
        let sequencer = SeriesTypeSequencer::default();
        let mut rng = ChaCha8Rng::seed_from_u64(17);
        for _ in 0..100 {
            let sequence = sequencer.sequence(&mut rng);
            assert_eq!(sequence.len(), 15);
            for round in sequence.chunks(3) {
                for label in RuleLabel::ALL {
                    assert_eq!(round.iter().filter(|entry| **entry == label).count(), 1);
                }
            }
        }
    }

    #[test]
    fn rounds_never_repeat_across_their_boundary() {
        let sequencer = SeriesTypeSequencer::default();
        let mut rng = ChaCha8Rng::seed_from_u64(23);
        for _ in 0..200 {
            let sequence = sequencer.sequence(&mut rng);
            for boundary in (3..sequence.len()).step_by(3) {
                assert_ne!(sequence[boundary - 1], sequence[boundary]);
            }
        }
    }

    #[test]
    fn same_seed_replays_same_sequence() {
        let sequencer = SeriesTypeSequencer::default();
        let first = sequencer.sequence(&mut ChaCha8Rng::seed_from_u64(8));
        let second = sequencer.sequence(&mut ChaCha8Rng::seed_from_u64(8));
        assert_eq!(first, second);
    }

    #[test]
    fn single_label_set_terminates() {
        let sequencer = SeriesTypeSequencer::new(vec![RuleLabel::Shape], 4);
        let sequence = sequencer.sequence(&mut ChaCha8Rng::seed_from_u64(1));
        assert_eq!(sequence, [RuleLabel::Shape; 4]);
    }

    #[test]
    fn repeated_label_set_terminates() {
        let sequencer = SeriesTypeSequencer::new(vec![RuleLabel::Colour, RuleLabel::Colour], 2);
        let sequence = sequencer.sequence(&mut ChaCha8Rng::seed_from_u64(3));
        assert_eq!(sequence, [RuleLabel::Colour; 4]);
    }

    #[test]
    fn partly_repeated_label_set_still_avoids_boundary_repeats() {
        let labels = vec![RuleLabel::Colour, RuleLabel::Colour, RuleLabel::Shape];
        let sequencer = SeriesTypeSequencer::new(labels, 6);
        let mut rng = ChaCha8Rng::seed_from_u64(19);
        for _ in 0..50 {
            let sequence = sequencer.sequence(&mut rng);
            assert_eq!(sequence.len(), 18);
            for boundary in (3..sequence.len()).step_by(3) {
                assert_ne!(sequence[boundary - 1], sequence[boundary]);
            }
        }
    }

    #[test]
    fn empty_sequencer_deals_nothing() {
        let sequencer = SeriesTypeSequencer::new(RuleLabel::ALL.to_vec(), 0);
        assert!(sequencer.is_empty());
        assert!(sequencer.sequence(&mut ChaCha8Rng::seed_from_u64(1)).is_empty());
    }
}
