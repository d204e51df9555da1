//! # Analyzer Configuration
//!
//! Deployment-tunable parameters of the stream analyzer. Values are checked
//! when an analyzer is built, never on the per-record path.

use crate::error::{CodecError, CodecResult};
use serde::{Deserialize, Serialize};
use std::num::NonZeroU64;

/// Default statistics cadence in records
pub const DEFAULT_OUTPUT_INTERVAL: u64 = 10_000;

/// Stream analyzer configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// Emit a statistics line every `output_interval` records
    pub output_interval: u64,

    /// Label prepended to every output line
    pub output_prefix: String,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            output_interval: DEFAULT_OUTPUT_INTERVAL,
            output_prefix: String::new(),
        }
    }
}

impl AnalyzerConfig {
    pub fn new(output_interval: u64, output_prefix: impl Into<String>) -> Self {
        Self {
            output_interval,
            output_prefix: output_prefix.into(),
        }
    }

    /// Reject a zero statistics cadence
    pub fn output_interval(&self) -> CodecResult<NonZeroU64> {
        NonZeroU64::new(self.output_interval).ok_or(CodecError::InvalidOutputInterval {
            interval: self.output_interval,
        })
    }
}
