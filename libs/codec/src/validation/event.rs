//! Analyzer events and their one-line text rendering

use std::fmt;

/// Something the analyzer reports while checking a stream
///
/// `ordinal` is the zero-based position of the record in the stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalyzerEvent {
    /// First record seen; carries its index
    StreamStart { index: u64 },
    /// Index step established by the first two records
    ReferenceDelta { delta: u64 },
    /// Index step differs from the reference delta
    SequencingMismatch { delta: u64, ordinal: u64 },
    /// Content was cut short by the readout hardware
    Truncated { ordinal: u64 },
    /// Content does not match the source's pattern
    PatternError { ordinal: u64 },
    /// Stored checksum differs from the computed one
    ChecksumFailure {
        ordinal: u64,
        stored: u32,
        computed: u32,
    },
    /// Periodic or final summary
    Statistics(String),
}

impl AnalyzerEvent {
    /// Short machine-friendly kind, used as a tracing field
    pub fn kind(&self) -> &'static str {
        match self {
            AnalyzerEvent::StreamStart { .. } => "start",
            AnalyzerEvent::ReferenceDelta { .. } => "reference_delta",
            AnalyzerEvent::SequencingMismatch { .. } => "sequencing_mismatch",
            AnalyzerEvent::Truncated { .. } => "truncated",
            AnalyzerEvent::PatternError { .. } => "pattern_error",
            AnalyzerEvent::ChecksumFailure { .. } => "checksum_failure",
            AnalyzerEvent::Statistics(_) => "statistics",
        }
    }

    /// True for events that mark a failed record
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            AnalyzerEvent::SequencingMismatch { .. }
                | AnalyzerEvent::PatternError { .. }
                | AnalyzerEvent::ChecksumFailure { .. }
        )
    }
}

impl fmt::Display for AnalyzerEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnalyzerEvent::StreamStart { index } => write!(f, "start={}", index),
            AnalyzerEvent::ReferenceDelta { delta } => write!(f, "delta_t={}", delta),
            AnalyzerEvent::SequencingMismatch { delta, ordinal } => {
                write!(f, "delta_t={} in record {}", delta, ordinal)
            }
            AnalyzerEvent::Truncated { ordinal } => {
                write!(f, "data truncated by readout in record {}", ordinal)
            }
            AnalyzerEvent::PatternError { ordinal } => {
                write!(f, "pattern error in record {}", ordinal)
            }
            AnalyzerEvent::ChecksumFailure {
                ordinal,
                stored,
                computed,
            } => write!(
                f,
                "crc failure in record {} (stored {:#010x}, computed {:#010x})",
                ordinal, stored, computed
            ),
            AnalyzerEvent::Statistics(summary) => f.write_str(summary),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rendering() {
        assert_eq!(AnalyzerEvent::StreamStart { index: 1000 }.to_string(), "start=1000");
        assert_eq!(AnalyzerEvent::ReferenceDelta { delta: 100 }.to_string(), "delta_t=100");
        assert_eq!(
            AnalyzerEvent::SequencingMismatch {
                delta: 105,
                ordinal: 2
            }
            .to_string(),
            "delta_t=105 in record 2"
        );
        assert_eq!(
            AnalyzerEvent::ChecksumFailure {
                ordinal: 4,
                stored: 1,
                computed: 0xABCD
            }
            .to_string(),
            "crc failure in record 4 (stored 0x00000001, computed 0x0000abcd)"
        );
    }

    #[test]
    fn test_failure_classification() {
        assert!(AnalyzerEvent::PatternError { ordinal: 0 }.is_failure());
        assert!(!AnalyzerEvent::Truncated { ordinal: 0 }.is_failure());
        assert!(!AnalyzerEvent::StreamStart { index: 0 }.is_failure());
    }
}
