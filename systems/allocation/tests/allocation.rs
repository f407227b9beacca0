use std::collections::HashSet;

use card_sort_core::{
    AllocationError, BlockIndex, CutIndex, Series, SeriesIndex, SeriesSize, StimulusItem,
    StimulusKind, StimulusPool,
};
use card_sort_system_allocation::{span_quotas, SeriesAllocator};
use card_sort_system_deck_plan::plan_deck_cuts;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn items(prefix: &str, count: usize) -> Vec<StimulusItem> {
    (0..count)
        .map(|n| StimulusItem::new(format!("{prefix}/{n:03}.png")))
        .collect()
}

fn empty_series(sizes: &[SeriesSize]) -> Vec<Series> {
    sizes
        .iter()
        .enumerate()
        .map(|(index, size)| Series::new(SeriesIndex::new(index), *size))
        .collect()
}

fn opens_with_two_singles(series: &Series) -> bool {
    series.cards().len() >= 2
        && series.cards()[..2]
            .iter()
            .all(|card| card.kind() == StimulusKind::Single)
}

#[test]
fn two_cuts_fill_three_series_and_thread_leftovers() {
    let sizes = [SeriesSize::Six, SeriesSize::Seven, SeriesSize::Eight];
    let plan = plan_deck_cuts(&sizes, &[10, 11]).expect("plan");
    let mut series = empty_series(&sizes);
    let mut allocator = SeriesAllocator::new();
    let mut rng = ChaCha8Rng::seed_from_u64(7);

    let pool = StimulusPool::new(items("single", 20), items("double", 20));
    let first = allocator
        .allocate(BlockIndex::new(0), &mut series, &plan[0], pool, &mut rng)
        .expect("first cut");
    assert_eq!(first.reservation().total(), 10);
    assert_eq!(first.reservation().singles, 5);
    assert_eq!(first.leftover().len(), 30);
    assert!(series[0].is_complete());
    assert_eq!(series[1].cards().len(), 4);
    assert!(!series[2].is_initialized());

    let pool = StimulusPool::from_carryover(first.into_leftover());
    let second = allocator
        .allocate(BlockIndex::new(0), &mut series, &plan[1], pool, &mut rng)
        .expect("second cut");
    assert_eq!(second.reservation().total(), 11);
    assert_eq!(second.leftover().len(), 19);

    let mut seen = HashSet::new();
    for entry in &series {
        assert!(entry.is_complete(), "series {} incomplete", entry.index());
        assert!(opens_with_two_singles(entry));
        for card in entry.cards() {
            assert!(seen.insert(card.handle().to_owned()), "duplicate card");
        }
    }
    assert_eq!(seen.len(), 21);
}

#[test]
fn leftovers_keep_their_queue_order() {
    let sizes = [SeriesSize::Six];
    let plan = plan_deck_cuts(&sizes, &[6]).expect("plan");
    let mut series = empty_series(&sizes);
    let pool = StimulusPool::new(items("single", 10), items("double", 10));

    let outcome = SeriesAllocator::new()
        .allocate(
            BlockIndex::new(0),
            &mut series,
            &plan[0],
            pool,
            &mut ChaCha8Rng::seed_from_u64(1),
        )
        .expect("allocation");

    assert_eq!(outcome.reservation().singles, 3);
    assert_eq!(outcome.reservation().doubles, 3);
    assert_eq!(outcome.leftover().singles()[0].handle(), "single/003.png");
    assert_eq!(outcome.leftover().doubles()[0].handle(), "double/003.png");
}

#[test]
fn singles_only_pool_reserves_whole_cut_from_singles() {
    let sizes = [SeriesSize::Six];
    let plan = plan_deck_cuts(&sizes, &[5, 1]).expect("plan");
    let mut series = empty_series(&sizes);
    let pool = StimulusPool::new(items("single", 10), Vec::new());

    let outcome = SeriesAllocator::new()
        .allocate(
            BlockIndex::new(0),
            &mut series,
            &plan[0],
            pool,
            &mut ChaCha8Rng::seed_from_u64(2),
        )
        .expect("allocation");

    assert_eq!(outcome.reservation().singles, 5);
    assert_eq!(outcome.reservation().doubles, 0);
    assert_eq!(outcome.leftover().len(), 5);
    assert_eq!(series[0].cards().len(), 5);
}

#[test]
fn missing_singles_for_seeding_is_fatal() {
    let sizes = [SeriesSize::Six, SeriesSize::Six];
    let plan = plan_deck_cuts(&sizes, &[12]).expect("plan");
    let mut series = empty_series(&sizes);
    let pool = StimulusPool::new(items("single", 1), items("double", 30));

    let error = SeriesAllocator::new()
        .allocate(
            BlockIndex::new(3),
            &mut series,
            &plan[0],
            pool,
            &mut ChaCha8Rng::seed_from_u64(3),
        )
        .expect_err("seeding must fail");

    assert_eq!(
        error,
        AllocationError::InsufficientSingles {
            block: BlockIndex::new(3),
            cut: CutIndex::new(0),
            series: SeriesIndex::new(0),
            available: 0,
        }
    );
}

#[test]
fn undersized_pool_is_fatal() {
    let sizes = [SeriesSize::Eight];
    let plan = plan_deck_cuts(&sizes, &[8]).expect("plan");
    let mut series = empty_series(&sizes);
    let pool = StimulusPool::new(items("single", 4), items("double", 3));

    let error = SeriesAllocator::new()
        .allocate(
            BlockIndex::new(1),
            &mut series,
            &plan[0],
            pool,
            &mut ChaCha8Rng::seed_from_u64(4),
        )
        .expect_err("pool too small");

    assert_eq!(
        error,
        AllocationError::PoolExhausted {
            block: BlockIndex::new(1),
            cut: CutIndex::new(0),
            requested: 8,
            available: 7,
        }
    );
    assert!(series[0].cards().is_empty(), "nothing is drawn on failure");
}

#[test]
fn seeding_a_single_slot_series_borrows_from_the_next_cut() {
    let sizes = [SeriesSize::Six, SeriesSize::Seven];
    let plan = plan_deck_cuts(&sizes, &[7, 6]).expect("plan");
    let mut series = empty_series(&sizes);
    let mut allocator = SeriesAllocator::new();
    let mut rng = ChaCha8Rng::seed_from_u64(5);

    assert_eq!(span_quotas(&series, &plan[0]), [6, 2]);
    let pool = StimulusPool::new(items("single", 20), items("double", 20));
    let first = allocator
        .allocate(BlockIndex::new(0), &mut series, &plan[0], pool, &mut rng)
        .expect("first cut");
    assert_eq!(first.reservation().total(), 8);
    assert!(series[0].is_complete());
    assert_eq!(series[1].cards().len(), 2);

    assert_eq!(span_quotas(&series, &plan[1]), [5]);
    let pool = StimulusPool::from_carryover(first.into_leftover());
    let second = allocator
        .allocate(BlockIndex::new(0), &mut series, &plan[1], pool, &mut rng)
        .expect("second cut");
    assert_eq!(second.reservation().total(), 5);
    assert!(series.iter().all(Series::is_complete));
    assert!(series.iter().all(opens_with_two_singles));
    assert_eq!(second.leftover().len(), 40 - 13);
}

#[test]
fn same_seed_deals_identical_series() {
    let deal = || {
        let sizes = [SeriesSize::Eight, SeriesSize::Seven, SeriesSize::Six];
        let plan = plan_deck_cuts(&sizes, &[21]).expect("plan");
        let mut series = empty_series(&sizes);
        let pool = StimulusPool::new(items("single", 15), items("double", 15));
        let _ = SeriesAllocator::new()
            .allocate(
                BlockIndex::new(0),
                &mut series,
                &plan[0],
                pool,
                &mut ChaCha8Rng::seed_from_u64(42),
            )
            .expect("allocation");
        series
    };

    assert_eq!(deal(), deal());
}

#[test]
#[should_panic]
fn quotas_for_a_cut_from_another_block_panic() {
    let wider = [SeriesSize::Six, SeriesSize::Seven];
    let plan = plan_deck_cuts(&wider, &[13]).expect("plan");
    let narrower = empty_series(&[SeriesSize::Six]);

    let _ = span_quotas(&narrower, &plan[0]);
}
