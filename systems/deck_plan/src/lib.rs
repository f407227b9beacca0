#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that spreads the deck cuts of a block across its series.
//!
//! Cuts are laid over the series in a single left-to-right sweep. Each cut
//! begins where the previous one stopped, possibly in the middle of a
//! series, so consecutive spans are contiguous and never overlap.

use card_sort_core::{AllocationError, CutIndex, DeckCut, SeriesIndex, SeriesSize, SeriesUsage};

/// Computes which series every cut spans and how many slots it fills in each.
///
/// Fails with [`AllocationError::DeckPlanCoverage`] when the cut sizes and
/// the series sizes do not describe the same number of slots.
pub fn plan_deck_cuts(
    series_sizes: &[SeriesSize],
    cut_sizes: &[usize],
) -> Result<Vec<DeckCut>, AllocationError> {
    let expected: usize = series_sizes.iter().map(|size| size.slots()).sum();
    let requested: usize = cut_sizes.iter().sum();
    if requested != expected {
        return Err(AllocationError::DeckPlanCoverage {
            expected,
            covered: requested,
        });
    }

    let mut cursor = SeriesCursor::new(series_sizes);
    let mut plan = Vec::with_capacity(cut_sizes.len());

    for (cut_index, &cut_size) in cut_sizes.iter().enumerate() {
        let from_series = SeriesIndex::new(cursor.series);
        let mut remaining_in_cut = cut_size;
        let mut usage = Vec::new();

        while remaining_in_cut > 0 {
            let Some(entry) = cursor.consume(remaining_in_cut) else {
                break;
            };
            remaining_in_cut -= entry.used_slots();
            usage.push(entry);
        }

        let to_series = usage.last().map_or(from_series, SeriesUsage::series);
        plan.push(DeckCut::new(
            CutIndex::new(cut_index),
            cut_size,
            from_series,
            to_series,
            usage,
        ));
    }

    let covered: usize = plan.iter().map(DeckCut::used_slots).sum();
    if covered != expected {
        return Err(AllocationError::DeckPlanCoverage { expected, covered });
    }

    Ok(plan)
}

struct SeriesCursor<'a> {
    sizes: &'a [SeriesSize],
    series: usize,
    remaining_in_series: usize,
}

impl<'a> SeriesCursor<'a> {
    fn new(sizes: &'a [SeriesSize]) -> Self {
        Self {
            sizes,
            series: 0,
            remaining_in_series: sizes.first().map_or(0, |size| size.slots()),
        }
    }

    fn consume(&mut self, wanted: usize) -> Option<SeriesUsage> {
        if self.series >= self.sizes.len() {
            return None;
        }

        let use_now = self.remaining_in_series.min(wanted);
        let entry = SeriesUsage::new(SeriesIndex::new(self.series), use_now);
        self.remaining_in_series -= use_now;

        if self.remaining_in_series == 0 {
            self.series += 1;
            if let Some(size) = self.sizes.get(self.series) {
                self.remaining_in_series = size.slots();
            }
        }

        Some(entry)
    }
}
