//! Record message serialization
//!
//! One transport message carries exactly one record, serialized with
//! `bincode` (fixed-width little-endian integers, bounded size, trailing
//! bytes rejected). A zero-length payload is the stream terminator.
//!
//! Decoding never yields a partially formed record: the descriptor `size`
//! must agree with the decoded content length or the payload is rejected.

use crate::error::{CodecError, CodecResult};
use bincode::Options;
use readout_types::Record;

/// Largest payload accepted by [`decode_record`]
pub const MAX_MESSAGE_SIZE: u64 = 64 * 1024 * 1024;

fn options(limit: u64) -> impl Options {
    bincode::DefaultOptions::new()
        .with_fixint_encoding()
        .with_little_endian()
        .reject_trailing_bytes()
        .with_limit(limit)
}

/// Serialize one record into a message payload
pub fn encode_record(record: &Record) -> CodecResult<Vec<u8>> {
    options(MAX_MESSAGE_SIZE)
        .serialize(record)
        .map_err(|e| CodecError::Serialization {
            index: record.index(),
            reason: e.to_string(),
        })
}

/// Deserialize one message payload into a record
pub fn decode_record(payload: &[u8]) -> CodecResult<Record> {
    decode_record_with_limit(payload, MAX_MESSAGE_SIZE)
}

/// [`decode_record`] with a caller-chosen size limit
pub fn decode_record_with_limit(payload: &[u8], limit: u64) -> CodecResult<Record> {
    if payload.is_empty() {
        return Err(CodecError::EmptyPayload);
    }
    if payload.len() as u64 > limit {
        return Err(CodecError::PayloadTooLarge {
            size: payload.len() as u64,
            limit,
        });
    }

    let record: Record = options(limit)
        .deserialize(payload)
        .map_err(|e| CodecError::malformed(payload.len(), e.to_string()))?;

    if !record.is_consistent() {
        return Err(CodecError::InconsistentRecord {
            index: record.index(),
            declared: record.size(),
            actual: record.content().len(),
        });
    }

    Ok(record)
}

/// Payload that ends a stream
pub fn terminator() -> Vec<u8> {
    Vec::new()
}
