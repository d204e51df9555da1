//! Byte-ramp pattern: byte `i` equals `i mod 256`

use super::{ContentGenerator, PatternChecker};
use readout_types::{PatternFormat, Record};

#[derive(Debug, Clone, Copy, Default)]
pub struct RampChecker;

impl PatternChecker for RampChecker {
    fn check(&mut self, record: &Record) -> bool {
        record
            .content()
            .iter()
            .enumerate()
            .all(|(i, &byte)| byte == i as u8)
    }

    fn reset(&mut self) {}

    fn name(&self) -> &'static str {
        "ramp"
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RampGenerator;

impl ContentGenerator for RampGenerator {
    fn generate(&mut self, _index: u64, size: usize) -> Vec<u8> {
        (0..size).map(|i| i as u8).collect()
    }

    fn format(&self) -> PatternFormat {
        PatternFormat::Ramp
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use readout_types::{RecordFlags, SourceTag};

    #[test]
    fn test_ramp_wraps_every_256_bytes() {
        let content = RampGenerator.generate(0, 600);
        assert_eq!(content[255], 255);
        assert_eq!(content[256], 0);
        assert_eq!(content[599], (599 % 256) as u8);

        let record = Record::from_parts(0, SourceTag::pattern(PatternFormat::Ramp), RecordFlags::empty(), content);
        assert!(RampChecker.check(&record));
    }

    #[test]
    fn test_ramp_rejects_shifted_content() {
        let content: Vec<u8> = (1..=64).map(|i| i as u8).collect();
        let record = Record::from_parts(0, SourceTag::pattern(PatternFormat::Ramp), RecordFlags::empty(), content);
        assert!(!RampChecker.check(&record));
    }
}
