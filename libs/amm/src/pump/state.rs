//! Persisted per-Well pump state
//!
//! The header's count byte doubles as the state tag: zero means the Well has
//! never been initialized, anything else is the fixed reserve count.

use serde::{Deserialize, Serialize};
use well_codec::{
    bytes16_words, last_reserves_words, read_bytes16, read_last_reserves, store_bytes16,
    store_last_reserves, SlotStore, StorageKey,
};
use well_types::{Quad, WellAddress};

use super::error::{PumpError, PumpResult};

/// State a pump holds for one Well
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PumpState {
    Uninitialized,
    Initialized(PumpRecord),
}

impl PumpState {
    pub fn is_initialized(&self) -> bool {
        matches!(self, PumpState::Initialized(_))
    }

    pub fn record(&self) -> Option<&PumpRecord> {
        match self {
            PumpState::Initialized(record) => Some(record),
            PumpState::Uninitialized => None,
        }
    }
}

/// Log2-domain reserves of an initialized Well
///
/// All three sequences share one length, fixed at initialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PumpRecord {
    last_timestamp: u64,
    last_reserves: Vec<Quad>,
    ema_reserves: Vec<Quad>,
    cumulative_reserves: Vec<Quad>,
}

impl PumpRecord {
    pub(crate) fn new(
        last_timestamp: u64,
        last_reserves: Vec<Quad>,
        ema_reserves: Vec<Quad>,
        cumulative_reserves: Vec<Quad>,
    ) -> PumpResult<Self> {
        let expected = last_reserves.len();
        for got in [ema_reserves.len(), cumulative_reserves.len()] {
            if got != expected {
                return Err(PumpError::LengthMismatch { expected, got });
            }
        }
        Ok(Self {
            last_timestamp,
            last_reserves,
            ema_reserves,
            cumulative_reserves,
        })
    }

    /// Seed state from first observed logs: EMA equals last, cumulative is zero
    pub(crate) fn seed(timestamp: u64, logs: Vec<Quad>) -> Self {
        let cumulative = vec![Quad::ZERO; logs.len()];
        Self {
            last_timestamp: timestamp,
            ema_reserves: logs.clone(),
            last_reserves: logs,
            cumulative_reserves: cumulative,
        }
    }

    pub fn reserve_count(&self) -> usize {
        self.last_reserves.len()
    }

    pub fn last_timestamp(&self) -> u64 {
        self.last_timestamp
    }

    /// Most recent capped observation
    pub fn last_reserves(&self) -> &[Quad] {
        &self.last_reserves
    }

    pub fn ema_reserves(&self) -> &[Quad] {
        &self.ema_reserves
    }

    /// `Σ last × Δt` up to `last_timestamp`
    pub fn cumulative_reserves(&self) -> &[Quad] {
        &self.cumulative_reserves
    }
}

/// Slot addresses of one Well's three sections
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PumpLayout {
    pub last: StorageKey,
    pub ema: StorageKey,
    pub cumulative: StorageKey,
}

impl PumpLayout {
    pub fn new(well: WellAddress, reserve_count: usize) -> Self {
        let last = StorageKey::for_well(well);
        let ema = last.offset(last_reserves_words(reserve_count) as u64);
        let cumulative = ema.offset(bytes16_words(reserve_count) as u64);
        Self {
            last,
            ema,
            cumulative,
        }
    }

    /// Words the whole region spans
    pub fn words(reserve_count: usize) -> usize {
        last_reserves_words(reserve_count) + 2 * bytes16_words(reserve_count)
    }
}

/// Decode a Well's state
pub fn load_state<S: SlotStore + ?Sized>(store: &S, well: WellAddress) -> PumpResult<PumpState> {
    let header = read_last_reserves(store, &StorageKey::for_well(well))?;
    if header.is_empty() {
        return Ok(PumpState::Uninitialized);
    }

    let count = usize::from(header.count);
    let layout = PumpLayout::new(well, count);
    let record = PumpRecord::new(
        header.timestamp,
        header.values,
        read_bytes16(store, &layout.ema, count)?,
        read_bytes16(store, &layout.cumulative, count)?,
    )?;
    Ok(PumpState::Initialized(record))
}

/// Persist a Well's full state
///
/// The header is written first and is the only write that can fail, so a
/// rejected record leaves storage untouched.
pub fn store_record<S: SlotStore + ?Sized>(
    store: &mut S,
    well: WellAddress,
    record: &PumpRecord,
) -> PumpResult<()> {
    let layout = PumpLayout::new(well, record.reserve_count());
    store_last_reserves(store, &layout.last, record.last_timestamp, &record.last_reserves)?;
    store_bytes16(store, &layout.ema, &record.ema_reserves)?;
    store_bytes16(store, &layout.cumulative, &record.cumulative_reserves)?;
    Ok(())
}
