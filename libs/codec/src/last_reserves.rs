//! Last-reserves header codec
//!
//! ```text
//! word 0:  | count (1) | timestamp (5, BE) | value[0] (16) | zero (10) |
//! word 1:  | value[1] (16)                 | value[2] (16)             |
//! ...
//! ```
//!
//! A count byte of zero marks a region that has never been written.

use tracing::trace;
use well_types::Quad;

use crate::error::{CodecError, CodecResult};
use crate::packed::{bytes16_words, read_bytes16, store_bytes16};
use crate::storage::{SlotStore, StorageKey, Word, ZERO_WORD};
use crate::MAX_VALUES;

/// Largest timestamp the 40-bit header field holds
pub const MAX_TIMESTAMP: u64 = (1 << 40) - 1;

const COUNT_BYTE: usize = 0;
const TIMESTAMP_RANGE: std::ops::Range<usize> = 1..6;
const FIRST_VALUE_RANGE: std::ops::Range<usize> = 6..22;

/// Decoded header region
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LastReserves {
    /// Number of values; zero for an unwritten region
    pub count: u8,
    /// Seconds timestamp of the write
    pub timestamp: u64,
    pub values: Vec<Quad>,
}

impl LastReserves {
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

/// Words occupied by a header region holding `count` values
#[inline]
pub const fn last_reserves_words(count: usize) -> usize {
    1 + count / 2
}

fn encode_header(count: u8, timestamp: u64, first: Quad) -> Word {
    let mut word = ZERO_WORD;
    word[COUNT_BYTE] = count;
    word[TIMESTAMP_RANGE].copy_from_slice(&timestamp.to_be_bytes()[3..]);
    word[FIRST_VALUE_RANGE].copy_from_slice(&first.to_be_bytes());
    word
}

fn decode_timestamp(word: &Word) -> u64 {
    let mut bytes = [0u8; 8];
    bytes[3..].copy_from_slice(&word[TIMESTAMP_RANGE]);
    u64::from_be_bytes(bytes)
}

fn decode_first(word: &Word) -> Quad {
    let mut bytes = [0u8; 16];
    bytes.copy_from_slice(&word[FIRST_VALUE_RANGE]);
    Quad::from_be_bytes(bytes)
}

/// Write the header word and the packed continuation
pub fn store_last_reserves<S: SlotStore + ?Sized>(
    store: &mut S,
    key: &StorageKey,
    timestamp: u64,
    values: &[Quad],
) -> CodecResult<()> {
    let Some((&first, rest)) = values.split_first() else {
        return Err(CodecError::EmptyValues);
    };
    if values.len() > MAX_VALUES {
        return Err(CodecError::too_many(values.len()));
    }
    if timestamp > MAX_TIMESTAMP {
        return Err(CodecError::TimestampOverflow {
            timestamp,
            max: MAX_TIMESTAMP,
        });
    }

    store.store(key, encode_header(values.len() as u8, timestamp, first));
    store_bytes16(store, &key.offset(1), rest)?;
    trace!(%key, count = values.len(), timestamp, "stored last reserves");
    Ok(())
}

/// Read a header region; an unwritten region decodes to an empty [`LastReserves`]
pub fn read_last_reserves<S: SlotStore + ?Sized>(
    store: &S,
    key: &StorageKey,
) -> CodecResult<LastReserves> {
    let header = store.load(key);
    let count = header[COUNT_BYTE];
    if count == 0 {
        return Ok(LastReserves::default());
    }
    if usize::from(count) > MAX_VALUES {
        return Err(CodecError::too_many(usize::from(count)));
    }

    let mut values = Vec::with_capacity(usize::from(count));
    values.push(decode_first(&header));
    values.extend(read_bytes16(store, &key.offset(1), usize::from(count) - 1)?);
    debug_assert_eq!(
        bytes16_words(usize::from(count) - 1) + 1,
        last_reserves_words(usize::from(count))
    );

    Ok(LastReserves {
        count,
        timestamp: decode_timestamp(&header),
        values,
    })
}
