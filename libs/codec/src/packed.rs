//! Two-per-word packing of 16-byte log values
//!
//! Value `2i` occupies bytes `0..16` of word `i` and value `2i + 1` bytes
//! `16..32`. An odd tail leaves the low half of the final word zeroed.

use well_types::Quad;

use crate::error::{CodecError, CodecResult};
use crate::storage::{SlotStore, StorageKey, Word, ZERO_WORD};
use crate::MAX_VALUES;

/// Words occupied by `count` packed values
#[inline]
pub const fn bytes16_words(count: usize) -> usize {
    count.div_ceil(2)
}

fn check_count(count: usize) -> CodecResult<()> {
    if count > MAX_VALUES {
        return Err(CodecError::too_many(count));
    }
    Ok(())
}

#[inline]
pub(crate) fn pack_pair(high: Quad, low: Option<Quad>) -> Word {
    let mut word = ZERO_WORD;
    word[..16].copy_from_slice(&high.to_be_bytes());
    if let Some(low) = low {
        word[16..].copy_from_slice(&low.to_be_bytes());
    }
    word
}

#[inline]
pub(crate) fn high_half(word: &Word) -> Quad {
    let mut bytes = [0u8; 16];
    bytes.copy_from_slice(&word[..16]);
    Quad::from_be_bytes(bytes)
}

#[inline]
pub(crate) fn low_half(word: &Word) -> Quad {
    let mut bytes = [0u8; 16];
    bytes.copy_from_slice(&word[16..]);
    Quad::from_be_bytes(bytes)
}

/// Pack values into words without touching storage
pub fn encode_bytes16(values: &[Quad]) -> CodecResult<Vec<Word>> {
    check_count(values.len())?;
    Ok(values
        .chunks(2)
        .map(|pair| pack_pair(pair[0], pair.get(1).copied()))
        .collect())
}

/// Unpack exactly `count` values from the front of `words`
pub fn decode_bytes16(words: &[Word], count: usize) -> CodecResult<Vec<Quad>> {
    check_count(count)?;
    let need = bytes16_words(count);
    if words.len() < need {
        return Err(CodecError::TruncatedRegion {
            count,
            need,
            got: words.len(),
        });
    }
    let mut values = Vec::with_capacity(count);
    for i in 0..count {
        let word = &words[i / 2];
        values.push(if i % 2 == 0 {
            high_half(word)
        } else {
            low_half(word)
        });
    }
    Ok(values)
}

/// Write `values` starting at `key`, one word per pair
pub fn store_bytes16<S: SlotStore + ?Sized>(
    store: &mut S,
    key: &StorageKey,
    values: &[Quad],
) -> CodecResult<()> {
    for (i, word) in encode_bytes16(values)?.into_iter().enumerate() {
        store.store(&key.offset(i as u64), word);
    }
    Ok(())
}

/// Read `count` values starting at `key`, loading exactly `ceil(count / 2)` words
pub fn read_bytes16<S: SlotStore + ?Sized>(
    store: &S,
    key: &StorageKey,
    count: usize,
) -> CodecResult<Vec<Quad>> {
    check_count(count)?;
    let words: Vec<Word> = (0..bytes16_words(count))
        .map(|i| store.load(&key.offset(i as u64)))
        .collect();
    decode_bytes16(&words, count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn values(count: usize) -> Vec<Quad> {
        (1..=count as i128).map(|v| Quad::from_i128(v * 3 - 7)).collect()
    }

    #[test]
    fn test_word_counts() {
        assert_eq!(bytes16_words(0), 0);
        assert_eq!(bytes16_words(1), 1);
        assert_eq!(bytes16_words(2), 1);
        assert_eq!(bytes16_words(7), 4);
        assert_eq!(bytes16_words(8), 4);
    }

    #[test]
    fn test_high_then_low_ordering() {
        let words = encode_bytes16(&[Quad::ONE, Quad::TWO]).unwrap();
        assert_eq!(words.len(), 1);
        assert_eq!(&words[0][..16], &Quad::ONE.to_be_bytes());
        assert_eq!(&words[0][16..], &Quad::TWO.to_be_bytes());
    }

    #[test]
    fn test_odd_tail_is_zero_padded() {
        let words = encode_bytes16(&values(3)).unwrap();
        assert_eq!(words.len(), 2);
        assert_eq!(&words[1][..16], &values(3)[2].to_be_bytes());
        assert_eq!(&words[1][16..], &[0u8; 16]);
    }

    #[test]
    fn test_store_read_round_trip_every_length() {
        for count in 0..=MAX_VALUES {
            let mut store = MemoryStore::new();
            let key = StorageKey::from_u64(100);
            store_bytes16(&mut store, &key, &values(count)).unwrap();
            assert_eq!(store.len(), bytes16_words(count));

            store.reset_load_count();
            assert_eq!(read_bytes16(&store, &key, count).unwrap(), values(count));
            assert_eq!(store.load_count(), bytes16_words(count));
        }
    }

    #[test]
    fn test_rejects_more_than_eight() {
        assert_eq!(encode_bytes16(&values(9)), Err(CodecError::too_many(9)));
        let store = MemoryStore::new();
        assert!(read_bytes16(&store, &StorageKey::default(), 9).is_err());
    }

    #[test]
    fn test_decode_rejects_short_buffer() {
        let words = encode_bytes16(&values(2)).unwrap();
        assert_eq!(
            decode_bytes16(&words, 3),
            Err(CodecError::TruncatedRegion {
                count: 3,
                need: 2,
                got: 1
            })
        );
    }
}
