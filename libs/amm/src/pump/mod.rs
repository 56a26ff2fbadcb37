//! Reserve pumps
//!
//! A pump is an oracle a Well notifies before every reserve-changing
//! operation. [`GeoEmaPump`] keeps, per Well, the capped last reserves, a
//! geometric EMA and a cumulative sum, all as base-2 logs.
//!
//! ## Reads
//!
//! - [`InstantaneousReserves`]: the persisted EMA as linear reserves
//! - [`CumulativeReserves`]: opaque cumulative snapshots and time-weighted
//!   averages between two of them
//!
//! ```rust
//! use rust_decimal_macros::dec;
//! use well_amm::pump::{CumulativeReserves, GeoEmaPump, ManualClock, Pump};
//! use well_codec::MemoryStore;
//! use well_config::PumpConfig;
//! use well_types::WellAddress;
//!
//! let clock = ManualClock::new(1_000);
//! let mut pump =
//!     GeoEmaPump::from_config(MemoryStore::new(), clock.clone(), &PumpConfig::symmetric(dec!(0.5)))?;
//! let well = WellAddress::new([1; 20]);
//!
//! pump.update(well, &[1 << 40, 1 << 30], &[])?;
//! let start = pump.read_cumulative_reserves(well)?;
//!
//! clock.advance(120);
//! pump.update(well, &[1 << 40, 1 << 30], &[])?;
//! let (twa, _end) = pump.read_twa_reserves(well, &start, 1_000)?;
//! assert_eq!(twa, vec![1 << 40, 1 << 30]);
//! # Ok::<(), well_amm::PumpError>(())
//! ```

pub mod cap;
pub mod clock;
pub mod engine;
pub mod error;
pub mod state;

use well_types::WellAddress;

pub use cap::{cap_reserve, PumpParams};
pub use clock::{Clock, ManualClock, SystemClock};
pub use engine::GeoEmaPump;
pub use error::{PumpError, PumpResult};
pub use state::{load_state, store_record, PumpLayout, PumpRecord, PumpState};

/// Oracle notified by a Well before its reserves change
pub trait Pump {
    /// Check that this pump can serve a Well with `reserve_count` tokens
    fn attach(&mut self, reserve_count: usize, data: &[u8]) -> PumpResult<()>;

    /// Observe the Well's reserves as they stand before the operation
    fn update(&mut self, well: WellAddress, reserves: &[u128], data: &[u8]) -> PumpResult<()>;
}

/// Smoothed point-in-time reserves
pub trait InstantaneousReserves {
    fn read_instantaneous_reserves(&self, well: WellAddress) -> PumpResult<Vec<u128>>;

    /// Same persisted EMA, for callers that want the value as of the last update
    fn read_last_instantaneous_reserves(&self, well: WellAddress) -> PumpResult<Vec<u128>>;
}

/// Time-integrated reserves
pub trait CumulativeReserves {
    /// Opaque cumulative snapshot as of now
    fn read_cumulative_reserves(&self, well: WellAddress) -> PumpResult<Vec<u8>>;

    /// Geometric time-weighted average since a prior snapshot, plus the current snapshot
    fn read_twa_reserves(
        &self,
        well: WellAddress,
        start_cumulative: &[u8],
        start_timestamp: u64,
    ) -> PumpResult<(Vec<u128>, Vec<u8>)>;
}
