//! # Record Stream Validation
//!
//! ## Purpose
//!
//! Sequential integrity checks for record streams: index sequencing,
//! readout truncation, content pattern and CRC-32C checksum.
//!
//! ## Architecture
//!
//! ```text
//! Record → StreamAnalyzer → PatternChecker  → LineSink
//!             ↓                 ↓                ↓
//!        Sequencing       Selected once     Tracing / stdout
//!        Checksum         per source tag    or in-memory
//!        Running totals   Reset on failure
//! ```
//!
//! The analyzer owns its checker and checksum engine; nothing here is
//! shared between streams.

pub mod analyzer;
pub mod checksum;
pub mod config;
pub mod event;
pub mod pattern;
pub mod sink;

pub use analyzer::{AnalyzerStats, StreamAnalyzer};
pub use checksum::ChecksumEngine;
pub use config::{AnalyzerConfig, DEFAULT_OUTPUT_INTERVAL};
pub use event::AnalyzerEvent;
pub use pattern::{
    create_generator, create_pattern_checker, ContentGenerator, CounterChecker, CounterGenerator,
    IndexChecker, IndexGenerator, PatternChecker, PermissiveChecker, RampChecker, RampGenerator,
};
pub use sink::{LineSink, TracingSink, WriterSink};
