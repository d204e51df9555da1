//! Source tags identifying which pattern applies to a stream

use num_enum::TryFromPrimitive;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Known producer subsystems
///
/// The readout test-pattern generator is the only producer whose content has
/// a defined layout. Detector subsystems carry free-form payloads.
#[repr(u16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive, Serialize, Deserialize)]
pub enum SourceId {
    // Detector subsystems
    Sts = 0x10,
    Mvd = 0x20,
    Rich = 0x30,
    Trd = 0x40,
    Much = 0x50,
    Tof = 0x60,
    Psd = 0x80,

    // Readout infrastructure
    PatternGenerator = 0xF0,
}

/// Content layouts emitted by [`SourceId::PatternGenerator`]
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive, Serialize, Deserialize)]
pub enum PatternFormat {
    /// u32 LE words forming one running counter across the stream
    Counter = 0x10,
    /// u64 LE words, word `i` equals `index + i`
    Index = 0x20,
    /// byte `i` equals `i mod 256`
    Ramp = 0x30,
}

impl PatternFormat {
    pub fn name(&self) -> &'static str {
        match self {
            PatternFormat::Counter => "counter",
            PatternFormat::Index => "index",
            PatternFormat::Ramp => "ramp",
        }
    }

    /// Parse the lowercase name used on command lines and in config files
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "counter" => Some(PatternFormat::Counter),
            "index" => Some(PatternFormat::Index),
            "ramp" => Some(PatternFormat::Ramp),
            _ => None,
        }
    }
}

/// `(source_id, source_version)` pair as carried by a descriptor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceTag {
    pub source_id: u16,
    pub source_version: u8,
}

impl SourceTag {
    pub const fn new(source_id: u16, source_version: u8) -> Self {
        Self {
            source_id,
            source_version,
        }
    }

    /// Tag of the test-pattern generator emitting `format`
    pub const fn pattern(format: PatternFormat) -> Self {
        Self::new(SourceId::PatternGenerator as u16, format as u8)
    }

    pub fn source(&self) -> Option<SourceId> {
        SourceId::try_from(self.source_id).ok()
    }

    /// Pattern format, if this tag names the test-pattern generator
    pub fn pattern_format(&self) -> Option<PatternFormat> {
        match self.source()? {
            SourceId::PatternGenerator => PatternFormat::try_from(self.source_version).ok(),
            _ => None,
        }
    }
}

impl fmt::Display for SourceTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.source() {
            Some(source) => write!(f, "{:?}", source)?,
            None => write!(f, "{:#06x}", self.source_id)?,
        }
        write!(f, "/v{:#04x}", self.source_version)
    }
}
