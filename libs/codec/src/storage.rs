//! Word-addressed slot storage
//!
//! Pump state lives in a flat key space of 32-byte words addressed by 32-byte
//! big-endian keys. Consecutive regions are reached with [`StorageKey::offset`],
//! so a Well's header, EMA and cumulative sections sit back to back.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};

use primitive_types::U256;
use well_types::WellAddress;

/// One 32-byte storage word
pub type Word = [u8; 32];

/// Word that every unset slot reads as
pub const ZERO_WORD: Word = [0u8; 32];

/// 256-bit big-endian slot address
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct StorageKey([u8; 32]);

impl StorageKey {
    /// Create a key from raw big-endian bytes
    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Key from a small integer slot number
    pub fn from_u64(slot: u64) -> Self {
        let mut bytes = [0u8; 32];
        bytes[24..].copy_from_slice(&slot.to_be_bytes());
        Self(bytes)
    }

    /// Base key of a Well's pump state: the 20-byte address right-aligned
    pub fn for_well(well: WellAddress) -> Self {
        let mut bytes = [0u8; 32];
        bytes[12..].copy_from_slice(well.inner());
        Self(bytes)
    }

    /// Key `k` words after this one, wrapping at 2^256
    pub fn offset(&self, k: u64) -> Self {
        let (slot, _) = U256::from_big_endian(&self.0).overflowing_add(U256::from(k));
        let mut bytes = [0u8; 32];
        slot.to_big_endian(&mut bytes);
        Self(bytes)
    }

    /// Raw big-endian bytes
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Debug for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StorageKey(0x{})", hex::encode(self.0))
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

/// Persistent word storage a pump writes through
///
/// Unset keys must load as [`ZERO_WORD`].
pub trait SlotStore {
    /// Read one word
    fn load(&self, key: &StorageKey) -> Word;

    /// Overwrite one word
    fn store(&mut self, key: &StorageKey, word: Word);
}

impl<S: SlotStore + ?Sized> SlotStore for &mut S {
    fn load(&self, key: &StorageKey) -> Word {
        (**self).load(key)
    }

    fn store(&mut self, key: &StorageKey, word: Word) {
        (**self).store(key, word)
    }
}

impl<S: SlotStore + ?Sized> SlotStore for Box<S> {
    fn load(&self, key: &StorageKey) -> Word {
        (**self).load(key)
    }

    fn store(&mut self, key: &StorageKey, word: Word) {
        (**self).store(key, word)
    }
}

/// HashMap-backed store for tests, simulations and benches
///
/// Counts loads so callers can check that a decoder never reads past its region.
#[derive(Debug, Default)]
pub struct MemoryStore {
    slots: HashMap<StorageKey, Word>,
    loads: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of slots ever written
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Total `load` calls since creation or the last reset
    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::Relaxed)
    }

    pub fn reset_load_count(&self) {
        self.loads.store(0, Ordering::Relaxed);
    }

    /// Point-in-time copy of every written slot
    pub fn snapshot(&self) -> HashMap<StorageKey, Word> {
        self.slots.clone()
    }
}

impl SlotStore for MemoryStore {
    fn load(&self, key: &StorageKey) -> Word {
        self.loads.fetch_add(1, Ordering::Relaxed);
        self.slots.get(key).copied().unwrap_or(ZERO_WORD)
    }

    fn store(&mut self, key: &StorageKey, word: Word) {
        self.slots.insert(*key, word);
    }
}
