//! Opaque cumulative snapshots
//!
//! Readers receive cumulative reserves as bytes they hand back later as the
//! start of a time-weighted-average window: one count byte followed by each
//! value's 16-byte big-endian encoding.

use well_types::Quad;

use crate::error::{CodecError, CodecResult};
use crate::MAX_VALUES;

/// Encoded length of a snapshot with `count` values
#[inline]
pub const fn snapshot_len(count: usize) -> usize {
    1 + 16 * count
}

/// Encode cumulative values as an opaque snapshot
pub fn encode_snapshot(values: &[Quad]) -> CodecResult<Vec<u8>> {
    if values.len() > MAX_VALUES {
        return Err(CodecError::too_many(values.len()));
    }
    let mut bytes = Vec::with_capacity(snapshot_len(values.len()));
    bytes.push(values.len() as u8);
    for value in values {
        bytes.extend_from_slice(&value.to_be_bytes());
    }
    Ok(bytes)
}

/// Decode a snapshot produced by [`encode_snapshot`]
pub fn decode_snapshot(bytes: &[u8]) -> CodecResult<Vec<Quad>> {
    let Some((&declared, body)) = bytes.split_first() else {
        return Err(CodecError::malformed_snapshot(0, 0));
    };
    let declared = usize::from(declared);
    if declared > MAX_VALUES {
        return Err(CodecError::too_many(declared));
    }
    if bytes.len() != snapshot_len(declared) {
        return Err(CodecError::malformed_snapshot(bytes.len(), declared));
    }

    Ok(body
        .chunks_exact(16)
        .map(|chunk| {
            let mut value = [0u8; 16];
            value.copy_from_slice(chunk);
            Quad::from_be_bytes(value)
        })
        .collect())
}
