//! Codec-level errors
//!
//! Configuration and serialization failures raised by the validation engine
//! and the record message codec. Per-record validation outcomes are not
//! errors: they are reported through the analyzer's line sink and counters.

use readout_types::RecordError;
use thiserror::Error;

/// Errors raised by readout-codec
#[derive(Debug, Error)]
pub enum CodecError {
    /// Periodic statistics cadence must be a positive record count
    #[error("Invalid output interval {interval}: statistics cadence must be at least 1 record")]
    InvalidOutputInterval { interval: u64 },

    /// Message payload carried no bytes; publishers use this to end a stream
    #[error("Empty message payload (stream terminator)")]
    EmptyPayload,

    /// Payload exceeds the decoder's size limit
    #[error("Record payload too large: {size} bytes exceeds limit {limit}")]
    PayloadTooLarge { size: u64, limit: u64 },

    /// Payload did not deserialize into a record
    #[error("Malformed record payload ({payload_size} bytes): {reason}")]
    MalformedPayload { payload_size: usize, reason: String },

    /// Deserialized record violates `size == content.len()`
    #[error("Inconsistent record {index}: descriptor size {declared}, content {actual} bytes")]
    InconsistentRecord {
        index: u64,
        declared: u64,
        actual: usize,
    },

    /// Record could not be serialized
    #[error("Record serialization failed for index {index}: {reason}")]
    Serialization { index: u64, reason: String },

    /// Record model error
    #[error("Record error: {0}")]
    Record(#[from] RecordError),
}

impl CodecError {
    pub fn malformed(payload_size: usize, reason: impl Into<String>) -> Self {
        Self::MalformedPayload {
            payload_size,
            reason: reason.into(),
        }
    }

    /// True for decode failures that end an ingestion stream
    pub fn is_terminal_decode(&self) -> bool {
        matches!(
            self,
            CodecError::EmptyPayload
                | CodecError::PayloadTooLarge { .. }
                | CodecError::MalformedPayload { .. }
                | CodecError::InconsistentRecord { .. }
        )
    }
}

/// Result type for codec operations
pub type CodecResult<T> = std::result::Result<T, CodecError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_carry_context() {
        let err = CodecError::InvalidOutputInterval { interval: 0 };
        assert!(err.to_string().contains("Invalid output interval 0"));

        let err = CodecError::malformed(12, "unexpected end of input");
        assert!(err.to_string().contains("12 bytes"));
        assert!(err.is_terminal_decode());
    }

    #[test]
    fn test_configuration_error_is_not_a_decode_failure() {
        assert!(!CodecError::InvalidOutputInterval { interval: 0 }.is_terminal_decode());
        assert!(CodecError::EmptyPayload.is_terminal_decode());
        assert!(CodecError::PayloadTooLarge { size: 9, limit: 8 }.is_terminal_decode());
    }
}
