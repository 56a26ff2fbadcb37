//! # Well Pump Codec
//!
//! ## Purpose
//!
//! Storage layout rules for pump state. Every value a pump persists is a
//! base-2 log reserve held as a 16-byte big-endian [`Quad`](well_types::Quad);
//! this crate decides where those bytes live and how they are framed.
//!
//! ## Layout of one Well's state
//!
//! ```text
//! for_well(address) + 0            header { count, timestamp, last[0] }
//!                   + 1 ..         last[1..n], two per word
//!                   + 1 + n/2 ..   ema[0..n], two per word
//!                   + 1 + n/2 + ceil(n/2) ..  cumulative[0..n], two per word
//! ```
//!
//! ## Architecture Role
//!
//! ```text
//! libs/types → [codec] → libs/amm
//!     ↑           ↓          ↓
//!   Quad     Slot layout   Pump engine
//!            Snapshots     Well shim
//! ```
//!
//! ## What This Crate Contains
//! - [`StorageKey`], [`Word`] and the [`SlotStore`] trait with an in-memory store
//! - Two-per-word packing of 16-byte values ([`store_bytes16`], [`read_bytes16`])
//! - The last-reserves header codec ([`store_last_reserves`], [`read_last_reserves`])
//! - Opaque cumulative snapshots handed to time-weighted-average readers
//!
//! ## What This Crate Does NOT Contain
//! - Capping, EMA or cumulative math (belongs in libs/amm)
//! - Arithmetic on log values (belongs in libs/types)

pub mod error;
pub mod last_reserves;
pub mod packed;
pub mod snapshot;
pub mod storage;

/// Most values any packed region or snapshot holds
pub const MAX_VALUES: usize = 8;

// Re-export key types for convenience
pub use error::{CodecError, CodecResult};
pub use last_reserves::{
    last_reserves_words, read_last_reserves, store_last_reserves, LastReserves, MAX_TIMESTAMP,
};
pub use packed::{bytes16_words, decode_bytes16, encode_bytes16, read_bytes16, store_bytes16};
pub use snapshot::{decode_snapshot, encode_snapshot, snapshot_len};
pub use storage::{MemoryStore, SlotStore, StorageKey, Word, ZERO_WORD};
