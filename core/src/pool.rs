use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::{Card, StimulusItem, StimulusKind};

/// Two front-consumed queues of stimuli that have not been drawn yet.
///
/// Items only ever leave the pool; `len` never increases after construction.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StimulusPool {
    singles: VecDeque<StimulusItem>,
    doubles: VecDeque<StimulusItem>,
}

impl StimulusPool {
    /// Creates a pool from already shuffled collections.
    #[must_use]
    pub fn new(singles: Vec<StimulusItem>, doubles: Vec<StimulusItem>) -> Self {
        Self {
            singles: singles.into(),
            doubles: doubles.into(),
        }
    }

    /// Rebuilds a pool from the leftovers of a previous cut.
    #[must_use]
    pub fn from_carryover(carryover: CarryoverState) -> Self {
        Self::new(carryover.singles, carryover.doubles)
    }

    /// Number of singles still available.
    #[must_use]
    pub fn singles_len(&self) -> usize {
        self.singles.len()
    }

    /// Number of doubles still available.
    #[must_use]
    pub fn doubles_len(&self) -> usize {
        self.doubles.len()
    }

    /// Total number of stimuli still available.
    #[must_use]
    pub fn len(&self) -> usize {
        self.singles.len() + self.doubles.len()
    }

    /// Reports whether both queues are exhausted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.singles.is_empty() && self.doubles.is_empty()
    }

    /// Removes up to `count` stimuli from the front of one queue.
    pub fn take_front(&mut self, kind: StimulusKind, count: usize) -> Vec<Card> {
        let queue = match kind {
            StimulusKind::Single => &mut self.singles,
            StimulusKind::Double => &mut self.doubles,
        };
        let count = count.min(queue.len());
        queue
            .drain(..count)
            .map(|item| Card::new(item, kind))
            .collect()
    }

    /// Surrenders the undrawn stimuli so they can seed the next cut.
    #[must_use]
    pub fn into_carryover(self) -> CarryoverState {
        CarryoverState {
            singles: self.singles.into(),
            doubles: self.doubles.into(),
        }
    }
}

/// Undrawn stimuli threaded from one cut or block to the next.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CarryoverState {
    singles: Vec<StimulusItem>,
    doubles: Vec<StimulusItem>,
}

impl CarryoverState {
    /// Leftover singles in draw order.
    #[must_use]
    pub fn singles(&self) -> &[StimulusItem] {
        &self.singles
    }

    /// Leftover doubles in draw order.
    #[must_use]
    pub fn doubles(&self) -> &[StimulusItem] {
        &self.doubles
    }

    /// Total number of leftover stimuli.
    #[must_use]
    pub fn len(&self) -> usize {
        self.singles.len() + self.doubles.len()
    }

    /// Reports whether nothing is carried forward.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.singles.is_empty() && self.doubles.is_empty()
    }
}
