//! # Geometric EMA Pump Integration Tests
//!
//! Exercises the pump through its public traits:
//! - Initialization, including the zero-balance skip
//! - Per-block capping in both directions and across several blocks
//! - EMA, cumulative and time-weighted-average reads
//! - Rejected updates leave storage untouched

use proptest::prelude::*;
use well_amm::{
    dec, CumulativeReserves, GeoEmaPump, InstantaneousReserves, ManualClock, Pump, PumpError,
    PumpState,
};
use well_codec::{CodecError, MemoryStore, MAX_TIMESTAMP};
use well_config::PumpConfig;
use well_types::{Quad, WellAddress};

const WELL: WellAddress = WellAddress::new([0xAB; 20]);
const START: u64 = 1_700_000_000;
const BLOCK: u64 = 12;
const E16: u128 = 10_000_000_000_000_000;

fn setup() -> (GeoEmaPump<MemoryStore, ManualClock>, ManualClock) {
    let clock = ManualClock::new(START);
    let pump = GeoEmaPump::from_config(
        MemoryStore::new(),
        clock.clone(),
        &PumpConfig::symmetric(dec!(0.5)),
    )
    .unwrap();
    (pump, clock)
}

fn log(reserve: u128) -> Quad {
    Quad::log2_of_u128(reserve).unwrap()
}

fn assert_close(actual: u128, expected: u128, tolerance: u128) {
    assert!(
        actual.abs_diff(expected) <= tolerance,
        "expected {} ± {}, got {}",
        expected,
        tolerance,
        actual
    );
}

#[test]
fn test_initialization_seeds_state() {
    let (mut pump, _clock) = setup();
    pump.update(WELL, &[E16, 3 * E16], &[]).unwrap();

    let state = pump.read_state(WELL).unwrap();
    let record = state.record().expect("initialized");
    assert_eq!(record.last_timestamp(), START);
    assert_eq!(record.last_reserves(), &[log(E16), log(3 * E16)]);
    assert_eq!(record.ema_reserves(), record.last_reserves());
    assert_eq!(record.cumulative_reserves(), &[Quad::ZERO, Quad::ZERO]);
}

#[test]
fn test_zero_balance_skips_initialization() {
    let (mut pump, clock) = setup();
    pump.update(WELL, &[0, E16], &[]).unwrap();
    assert_eq!(pump.read_state(WELL).unwrap(), PumpState::Uninitialized);
    assert!(pump.store().is_empty());

    clock.advance(BLOCK);
    pump.update(WELL, &[E16, E16], &[]).unwrap();
    let state = pump.read_state(WELL).unwrap();
    assert_eq!(state.record().unwrap().last_timestamp(), START + BLOCK);
}

#[test]
fn test_one_block_increase_capped() {
    let (mut pump, clock) = setup();
    pump.update(WELL, &[E16], &[]).unwrap();

    clock.advance(BLOCK);
    pump.update(WELL, &[2 * E16], &[]).unwrap();
    assert_close(pump.read_last_reserves(WELL).unwrap()[0], 15 * E16 / 10, 1);
}

#[test]
fn test_one_block_decrease_capped() {
    let (mut pump, clock) = setup();
    pump.update(WELL, &[E16], &[]).unwrap();

    clock.advance(BLOCK);
    pump.update(WELL, &[E16 / 10], &[]).unwrap();
    assert_close(pump.read_last_reserves(WELL).unwrap()[0], E16 / 2, 1);
}

#[test]
fn test_two_block_cap_compounds() {
    let (mut pump, clock) = setup();
    pump.update(WELL, &[E16], &[]).unwrap();

    clock.advance(2 * BLOCK);
    pump.update(WELL, &[4 * E16], &[]).unwrap();
    assert_close(pump.read_last_reserves(WELL).unwrap()[0], 225 * E16 / 100, 1);
}

#[test]
fn test_move_within_bounds_is_uncapped() {
    let (mut pump, clock) = setup();
    pump.update(WELL, &[E16], &[]).unwrap();

    clock.advance(2 * BLOCK);
    pump.update(WELL, &[12 * E16 / 10], &[]).unwrap();
    assert_close(pump.read_last_reserves(WELL).unwrap()[0], 12 * E16 / 10, 1);
}

#[test]
fn test_instantaneous_reads_return_persisted_ema() {
    let (mut pump, clock) = setup();
    pump.update(WELL, &[E16, E16], &[]).unwrap();

    clock.advance(BLOCK);
    pump.update(WELL, &[2 * E16, E16], &[]).unwrap();

    let ema = pump.read_instantaneous_reserves(WELL).unwrap();
    // one block of decay moves the EMA only slightly toward the capped 1.5e16
    assert!(ema[0] > E16 && ema[0] < 15 * E16 / 10, "ema {}", ema[0]);
    assert_close(ema[1], E16, 1);
    assert_eq!(pump.read_last_instantaneous_reserves(WELL).unwrap(), ema);

    // reads are not reprojected to the current time
    clock.advance(10_000);
    assert_eq!(pump.read_instantaneous_reserves(WELL).unwrap(), ema);
}

#[test]
fn test_twa_of_constant_reserves() {
    let (mut pump, clock) = setup();
    let reserves = [123_456_789_012_345_678u128, 987_654_321];
    pump.update(WELL, &reserves, &[]).unwrap();

    let start = pump.read_cumulative_reserves(WELL).unwrap();
    for _ in 0..10 {
        clock.advance(BLOCK);
        pump.update(WELL, &reserves, &[]).unwrap();
    }

    let (twa, current) = pump.read_twa_reserves(WELL, &start, START).unwrap();
    assert_close(twa[0], reserves[0], 2);
    assert_close(twa[1], reserves[1], 2);
    assert_eq!(current, pump.read_cumulative_reserves(WELL).unwrap());
}

#[test]
fn test_twa_spans_projection_after_last_update() {
    let (mut pump, clock) = setup();
    pump.update(WELL, &[1 << 40], &[]).unwrap();
    let start = pump.read_cumulative_reserves(WELL).unwrap();

    // no update since start: cumulative is projected with the last reserve
    clock.advance(600);
    let (twa, _) = pump.read_twa_reserves(WELL, &start, START).unwrap();
    assert_eq!(twa, vec![1 << 40]);
}

#[test]
fn test_twa_geometric_mean() {
    let config = PumpConfig {
        max_percent_increase: dec!(3),
        ..PumpConfig::symmetric(dec!(0.75))
    };
    let clock = ManualClock::new(START);
    let mut pump = GeoEmaPump::from_config(MemoryStore::new(), clock.clone(), &config).unwrap();

    pump.update(WELL, &[1 << 10], &[]).unwrap();
    let start = pump.read_cumulative_reserves(WELL).unwrap();

    // each update credits its reserve over the interval since the previous one:
    // 2^12 for 120s, then 2^10 for 120s, geometric mean 2^11
    clock.advance(120);
    pump.update(WELL, &[1 << 12], &[]).unwrap();
    clock.advance(120);
    pump.update(WELL, &[1 << 10], &[]).unwrap();

    let (twa, _) = pump.read_twa_reserves(WELL, &start, START).unwrap();
    assert_eq!(twa, vec![1 << 11]);
}

#[test]
fn test_twa_errors() {
    let (mut pump, clock) = setup();
    pump.update(WELL, &[E16, E16], &[]).unwrap();
    let start = pump.read_cumulative_reserves(WELL).unwrap();

    assert_eq!(
        pump.read_twa_reserves(WELL, &start, START),
        Err(PumpError::NoTimePassed {
            start_timestamp: START,
            now: START
        })
    );

    clock.advance(BLOCK);
    let single = well_codec::encode_snapshot(&[Quad::ZERO]).unwrap();
    assert_eq!(
        pump.read_twa_reserves(WELL, &single, START),
        Err(PumpError::LengthMismatch {
            expected: 2,
            got: 1
        })
    );
    assert!(matches!(
        pump.read_twa_reserves(WELL, &start[..5], START),
        Err(PumpError::Codec(CodecError::MalformedSnapshot { .. }))
    ));
}

#[test]
fn test_length_mismatch_rejected_without_state_change() {
    let (mut pump, clock) = setup();
    pump.update(WELL, &[E16, E16], &[]).unwrap();
    let before = pump.store().snapshot();

    clock.advance(BLOCK);
    assert_eq!(
        pump.update(WELL, &[E16, E16, E16], &[]),
        Err(PumpError::LengthMismatch {
            expected: 2,
            got: 3
        })
    );
    assert_eq!(pump.store().snapshot(), before);
}

#[test]
fn test_timestamp_overflow_leaves_state_untouched() {
    let (mut pump, clock) = setup();
    clock.set(MAX_TIMESTAMP - 5);
    pump.update(WELL, &[E16], &[]).unwrap();
    let before = pump.store().snapshot();

    clock.advance(BLOCK);
    assert!(matches!(
        pump.update(WELL, &[E16], &[]),
        Err(PumpError::Codec(CodecError::TimestampOverflow { .. }))
    ));
    assert_eq!(pump.store().snapshot(), before);
}

#[test]
fn test_same_timestamp_update_is_a_no_op() {
    let (mut pump, _clock) = setup();
    pump.update(WELL, &[E16], &[]).unwrap();
    let before = pump.read_state(WELL).unwrap();

    pump.update(WELL, &[5 * E16], &[]).unwrap();
    assert_eq!(pump.read_state(WELL).unwrap(), before);
}

#[test]
fn test_wells_are_independent() {
    let (mut pump, clock) = setup();
    let other = WellAddress::new([0xCD; 20]);
    pump.update(WELL, &[E16], &[]).unwrap();
    pump.update(other, &[E16, 2 * E16, 3 * E16], &[]).unwrap();

    clock.advance(BLOCK);
    pump.update(WELL, &[2 * E16], &[]).unwrap();

    assert_close(pump.read_last_reserves(other).unwrap()[2], 3 * E16, 1);
    assert_eq!(pump.read_last_reserves(other).unwrap().len(), 3);
    assert_eq!(pump.read_last_reserves(WELL).unwrap().len(), 1);
}

#[test]
fn test_drained_reserve_is_floored_at_one() {
    let (mut pump, clock) = setup();
    pump.update(WELL, &[2, 1 << 20], &[]).unwrap();

    clock.advance(BLOCK);
    pump.update(WELL, &[0, 1 << 20], &[]).unwrap();
    assert_eq!(pump.read_last_reserves(WELL).unwrap(), vec![1, 1 << 20]);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_updates_preserve_shape_and_envelope(
        count in 1usize..=8,
        steps in prop::collection::vec((1u64..100, 1u128..(1u128 << 96)), 1..12),
    ) {
        let (mut pump, clock) = setup();
        pump.update(WELL, &vec![E16; count], &[]).unwrap();

        for (elapsed, reserve) in steps {
            let before = pump.read_state(WELL).unwrap();
            let last_before = before.record().unwrap().last_reserves()[0];

            clock.advance(elapsed);
            pump.update(WELL, &vec![reserve; count], &[]).unwrap();

            let state = pump.read_state(WELL).unwrap();
            let record = state.record().unwrap();
            prop_assert_eq!(record.last_reserves().len(), count);
            prop_assert_eq!(record.ema_reserves().len(), count);
            prop_assert_eq!(record.cumulative_reserves().len(), count);

            let blocks = Quad::from(elapsed / BLOCK);
            let params = pump.params();
            let ceiling = last_before
                .checked_add(blocks.checked_mul(params.log_max_increase).unwrap())
                .unwrap();
            let floor = last_before
                .checked_add(blocks.checked_mul(params.log_max_decrease).unwrap())
                .unwrap();
            let last = record.last_reserves()[0];
            prop_assert!(last <= ceiling && last >= floor);
        }
    }
}
