//! Geometric EMA and cumulative reserve pump
//!
//! Each update:
//! 1. Loads the Well's state and measures the elapsed seconds and blocks
//! 2. Caps every observed log reserve against the last capped value
//! 3. Decays the EMA by `α^Δt` toward the capped value
//! 4. Adds `capped × Δt` to the cumulative sum
//! 5. Persists the whole record at once
//!
//! Readers see log values converted back to linear integer reserves.

use tracing::{debug, warn};
use well_codec::{decode_snapshot, encode_snapshot, SlotStore, MAX_VALUES};
use well_config::PumpConfig;
use well_types::{Quad, WellAddress};

use super::cap::PumpParams;
use super::clock::{Clock, SystemClock};
use super::error::{PumpError, PumpResult};
use super::state::{load_state, store_record, PumpRecord, PumpState};
use super::{CumulativeReserves, InstantaneousReserves, Pump};

/// Log-domain EMA and cumulative pump over a slot store
///
/// State for every Well lives in the same store, partitioned by Well address.
#[derive(Debug)]
pub struct GeoEmaPump<S: SlotStore, C: Clock = SystemClock> {
    store: S,
    clock: C,
    params: PumpParams,
}

impl<S: SlotStore, C: Clock> GeoEmaPump<S, C> {
    pub fn new(store: S, clock: C, params: PumpParams) -> Self {
        Self {
            store,
            clock,
            params,
        }
    }

    /// Build from validated configuration
    pub fn from_config(store: S, clock: C, config: &PumpConfig) -> PumpResult<Self> {
        Ok(Self::new(store, clock, PumpParams::from_config(config)?))
    }

    pub fn params(&self) -> &PumpParams {
        &self.params
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Release the underlying store
    pub fn into_store(self) -> S {
        self.store
    }

    /// Decoded state of a Well
    pub fn read_state(&self, well: WellAddress) -> PumpResult<PumpState> {
        load_state(&self.store, well)
    }

    /// Most recent capped reserves, before smoothing
    pub fn read_last_reserves(&self, well: WellAddress) -> PumpResult<Vec<u128>> {
        match self.read_state(well)? {
            PumpState::Initialized(record) => to_linear(record.last_reserves()),
            PumpState::Uninitialized => Ok(Vec::new()),
        }
    }

    /// Record an observation of `reserves` for `well`
    pub fn update_reserves(&mut self, well: WellAddress, reserves: &[u128]) -> PumpResult<()> {
        check_reserve_count(reserves.len())?;

        let now = self.clock.now();
        match self.read_state(well)? {
            PumpState::Uninitialized => self.initialize(well, reserves, now),
            PumpState::Initialized(record) => self.advance(well, record, reserves, now),
        }
    }

    fn initialize(&mut self, well: WellAddress, reserves: &[u128], now: u64) -> PumpResult<()> {
        // log2(0) is undefined; wait for a later update with every balance set
        if reserves.contains(&0) {
            debug!(%well, ?reserves, "skipping pump initialization: zero reserve");
            return Ok(());
        }

        let logs = reserves
            .iter()
            .map(|&reserve| Quad::log2_of_u128(reserve))
            .collect::<Result<Vec<_>, _>>()?;

        store_record(&mut self.store, well, &PumpRecord::seed(now, logs))?;
        debug!(%well, count = reserves.len(), timestamp = now, "pump initialized");
        Ok(())
    }

    /// Fold one observation into an initialized record
    ///
    /// Capping counts whole blocks only. Updates that always arrive less than
    /// `block_time` apart never move the last reserves, while the timestamp,
    /// EMA and cumulative sums keep advancing on the unchanged value.
    fn advance(
        &mut self,
        well: WellAddress,
        record: PumpRecord,
        reserves: &[u128],
        now: u64,
    ) -> PumpResult<()> {
        if reserves.len() != record.reserve_count() {
            return Err(PumpError::LengthMismatch {
                expected: record.reserve_count(),
                got: reserves.len(),
            });
        }

        let elapsed = match now.checked_sub(record.last_timestamp()) {
            Some(elapsed) => elapsed,
            None => {
                warn!(
                    %well,
                    now,
                    last_timestamp = record.last_timestamp(),
                    "clock moved backwards; treating as no elapsed time"
                );
                0
            }
        };
        if elapsed == 0 {
            debug!(%well, timestamp = now, "no time elapsed; pump update skipped");
            return Ok(());
        }

        // params built by hand may carry a zero block time; no block ever passes
        let blocks_passed = elapsed.checked_div(self.params.block_time).unwrap_or(0);
        let decay = self.params.alpha.powu(elapsed)?;
        let weight = Quad::ONE.checked_sub(decay)?;
        let elapsed_q = Quad::from(elapsed);

        let n = reserves.len();
        let mut last = Vec::with_capacity(n);
        let mut ema = Vec::with_capacity(n);
        let mut cumulative = Vec::with_capacity(n);

        for (i, &reserve) in reserves.iter().enumerate() {
            // a drained reserve is observed as 1 so its log stays finite
            let observed = Quad::log2_of_u128(reserve.max(1))?;
            let capped = self
                .params
                .cap(record.last_reserves()[i], observed, blocks_passed)?;

            let smoothed = capped
                .checked_mul(weight)?
                .checked_add(record.ema_reserves()[i].checked_mul(decay)?)?;
            let summed = record.cumulative_reserves()[i].checked_add(capped.checked_mul(elapsed_q)?)?;

            last.push(capped);
            ema.push(smoothed);
            cumulative.push(summed);
        }

        let updated = PumpRecord::new(now, last, ema, cumulative)?;
        store_record(&mut self.store, well, &updated)?;
        debug!(%well, elapsed, blocks_passed, "pump updated");
        Ok(())
    }

    /// Cumulative reserves carried forward to now with the last capped reserves
    fn projected_cumulative(&self, record: &PumpRecord) -> PumpResult<Vec<Quad>> {
        let elapsed = Quad::from(self.clock.now().saturating_sub(record.last_timestamp()));
        record
            .cumulative_reserves()
            .iter()
            .zip(record.last_reserves())
            .map(|(cumulative, last)| Ok(cumulative.checked_add(last.checked_mul(elapsed)?)?))
            .collect()
    }
}

fn check_reserve_count(count: usize) -> PumpResult<()> {
    if count == 0 {
        return Err(PumpError::EmptyReserves);
    }
    if count > MAX_VALUES {
        return Err(PumpError::TooManyReserves {
            count,
            max: MAX_VALUES,
        });
    }
    Ok(())
}

fn to_linear(logs: &[Quad]) -> PumpResult<Vec<u128>> {
    logs.iter()
        .map(|log| Ok(log.pow2_to_u128()?))
        .collect()
}

impl<S: SlotStore, C: Clock> Pump for GeoEmaPump<S, C> {
    fn attach(&mut self, reserve_count: usize, _data: &[u8]) -> PumpResult<()> {
        if reserve_count == 0 || reserve_count > MAX_VALUES {
            return Err(PumpError::InvalidReserveCount(reserve_count));
        }
        Ok(())
    }

    fn update(&mut self, well: WellAddress, reserves: &[u128], _data: &[u8]) -> PumpResult<()> {
        self.update_reserves(well, reserves)
    }
}

impl<S: SlotStore, C: Clock> InstantaneousReserves for GeoEmaPump<S, C> {
    fn read_instantaneous_reserves(&self, well: WellAddress) -> PumpResult<Vec<u128>> {
        match self.read_state(well)? {
            PumpState::Initialized(record) => to_linear(record.ema_reserves()),
            PumpState::Uninitialized => Ok(Vec::new()),
        }
    }

    fn read_last_instantaneous_reserves(&self, well: WellAddress) -> PumpResult<Vec<u128>> {
        self.read_instantaneous_reserves(well)
    }
}

impl<S: SlotStore, C: Clock> CumulativeReserves for GeoEmaPump<S, C> {
    fn read_cumulative_reserves(&self, well: WellAddress) -> PumpResult<Vec<u8>> {
        let projected = match self.read_state(well)? {
            PumpState::Initialized(record) => self.projected_cumulative(&record)?,
            PumpState::Uninitialized => Vec::new(),
        };
        Ok(encode_snapshot(&projected)?)
    }

    fn read_twa_reserves(
        &self,
        well: WellAddress,
        start_cumulative: &[u8],
        start_timestamp: u64,
    ) -> PumpResult<(Vec<u128>, Vec<u8>)> {
        let record = match self.read_state(well)? {
            PumpState::Initialized(record) => record,
            PumpState::Uninitialized => return Ok((Vec::new(), encode_snapshot(&[])?)),
        };

        let start = decode_snapshot(start_cumulative)?;
        if start.len() != record.reserve_count() {
            return Err(PumpError::LengthMismatch {
                expected: record.reserve_count(),
                got: start.len(),
            });
        }

        let now = self.clock.now();
        if now <= start_timestamp {
            return Err(PumpError::NoTimePassed {
                start_timestamp,
                now,
            });
        }
        let window = Quad::from(now - start_timestamp);

        let current = self.projected_cumulative(&record)?;
        let twa = current
            .iter()
            .zip(&start)
            .map(|(current, start)| {
                Ok(current
                    .checked_sub(*start)?
                    .checked_div(window)?
                    .pow2_to_u128()?)
            })
            .collect::<PumpResult<Vec<u128>>>()?;

        Ok((twa, encode_snapshot(&current)?))
    }
}
