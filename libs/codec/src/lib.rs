//! # Readout Codec - Stream Rules
//!
//! ## Purpose
//!
//! The "Rules" layer for detector readout streams:
//! - CRC-32C checksum computation and verification
//! - Content pattern checkers and matching generators
//! - The sequential stream analyzer with its event lines and statistics
//! - One-record-per-message serialization for the transport layer
//!
//! ## Architecture Role
//!
//! ```text
//! readout-types → [readout-codec] → readout-network
//!      ↑                ↓                  ↓
//! Record model     Stream rules        Transport
//! Wire layout      Validation/Encoding Sockets
//! ```
//!
//! ## What This Crate Does NOT Contain
//! - Record data structures (belongs in readout-types)
//! - Socket management or connection handling (belongs in readout-network)
//!
//! ## Example
//!
//! ```
//! use readout_codec::{AnalyzerConfig, ChecksumEngine, StreamAnalyzer};
//! use readout_types::{Record, RecordFlags, SourceTag};
//!
//! let mut analyzer = StreamAnalyzer::new(&AnalyzerConfig::new(100, "link0"), Vec::new()).unwrap();
//! let mut record = Record::from_parts(0, SourceTag::new(0x10, 1), RecordFlags::empty(), vec![1, 2, 3]);
//! ChecksumEngine::new().stamp_record(&mut record);
//!
//! assert!(analyzer.ingest(&record));
//! assert_eq!(analyzer.sink()[0], "link0 start=0");
//! ```

pub mod error;
pub mod format;
pub mod message;
pub mod validation;

pub use error::{CodecError, CodecResult};
pub use format::{human_readable_count, human_readable_count_with_unit};
pub use message::{decode_record, decode_record_with_limit, encode_record, terminator, MAX_MESSAGE_SIZE};
pub use validation::{
    create_generator, create_pattern_checker, AnalyzerConfig, AnalyzerEvent, AnalyzerStats,
    ChecksumEngine, ContentGenerator, CounterChecker, CounterGenerator, IndexChecker,
    IndexGenerator, LineSink, PatternChecker, PermissiveChecker, RampChecker, RampGenerator,
    StreamAnalyzer, TracingSink, WriterSink, DEFAULT_OUTPUT_INTERVAL,
};
