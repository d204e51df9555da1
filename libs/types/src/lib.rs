//! # Readout Record Types
//!
//! Data model for time-sliced, fixed-record binary streams produced by
//! detector readout hardware.
//!
//! ## Contents
//!
//! - **RecordDescriptor**: 25-byte fixed header (index, size, source tag, flags, checksum)
//! - **RecordFlags**: `CHECKSUM_VALID` and `OVERFLOW_TRUNCATED` bits, reserved bits preserved
//! - **SourceTag**: `(source_id, source_version)` pair selecting the content pattern
//! - **Record**: descriptor plus owned content, `size == content.len()` enforced
//! - **RecordSource**: blocking pull interface with latched end-of-stream
//! - **Record files**: magic-prefixed sequence of wire records
//!
//! ## Architecture Role
//!
//! ```text
//! readout-types → readout-codec   → readout-network → tools
//!      ↑               ↓                 ↓
//! Record model    Checksum/Pattern   Publish/Subscribe
//! Wire layout     StreamAnalyzer     RecordSubscriber
//! ```
//!
//! ## What This Crate Does NOT Contain
//! - Checksum computation or pattern checking (belongs in readout-codec)
//! - Transport or message serialization (belongs in readout-network / readout-codec)

pub mod error;
pub mod file;
pub mod record;
pub mod source;

pub use error::{RecordError, RecordResult};
pub use file::{RecordFileReader, RecordFileWriter, FILE_MAGIC, FILE_VERSION};
pub use record::{
    PatternFormat, Record, RecordDescriptor, RecordFlags, SourceId, SourceTag, MAX_CONTENT_SIZE,
};
pub use source::{records, MemorySource, RecordSource, Records};
