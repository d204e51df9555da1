//! Record-level errors
//!
//! Raised while constructing records or moving them through the fixed wire
//! layout. Each variant carries the values needed to diagnose the producer.

use thiserror::Error;

/// Errors raised by record construction and the descriptor wire codec
#[derive(Debug, Error)]
pub enum RecordError {
    /// Descriptor size field disagrees with the attached content
    #[error("Record size mismatch: descriptor declares {declared} bytes, content has {actual} (index {index})")]
    SizeMismatch {
        index: u64,
        declared: u64,
        actual: usize,
    },

    /// Buffer ended before a complete descriptor could be read
    #[error("Truncated descriptor: need {need} bytes, got {got}")]
    TruncatedDescriptor { need: usize, got: usize },

    /// Content region ended before `size` bytes could be read
    #[error("Truncated content for record {index}: expected {expected} bytes, got {got}")]
    TruncatedContent {
        index: u64,
        expected: u64,
        got: usize,
    },

    /// Declared content size exceeds what this process is willing to allocate
    #[error("Record content too large: {size} bytes exceeds limit {limit}")]
    ContentTooLarge { size: u64, limit: u64 },

    /// Record file does not start with the expected magic bytes
    #[error("Invalid record file magic: {found:02x?}")]
    InvalidMagic { found: [u8; 8] },

    /// Record file was written by an unknown format revision
    #[error("Unsupported record file version {version}: supported version is {supported}")]
    UnsupportedVersion { version: u32, supported: u32 },

    /// Underlying I/O failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl RecordError {
    /// True when the error is a clean or partial end of input rather than corrupt data
    pub fn is_end_of_input(&self) -> bool {
        match self {
            RecordError::TruncatedDescriptor { .. } | RecordError::TruncatedContent { .. } => true,
            RecordError::Io(e) => e.kind() == std::io::ErrorKind::UnexpectedEof,
            _ => false,
        }
    }
}

/// Result type for record operations
pub type RecordResult<T> = std::result::Result<T, RecordError>;
