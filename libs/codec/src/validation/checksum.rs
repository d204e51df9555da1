//! CRC-32C Checksum Engine
//!
//! Castagnoli polynomial (0x1EDC6F41, reflected 0x82F63B78), reflected input
//! and output, initial register 0 and no final XOR. This is the raw register
//! form: it differs from the conventional CRC-32C only in the pre/post
//! inversion, which the `crc32c` crate applies internally. Inverting the
//! register on the way in and out cancels it, so hardware acceleration
//! (SSE 4.2 / ARMv8 CRC) is used when the CPU offers it and the portable
//! table path otherwise, with identical results.

use readout_types::{Record, RecordDescriptor, RecordFlags};

/// Raw CRC-32C register update: `register` is the state before `data`
#[inline]
fn update_register(register: u32, data: &[u8]) -> u32 {
    !crc32c::crc32c_append(!register, data)
}

/// Stateless CRC-32C calculator for record content
#[derive(Debug, Clone, Copy, Default)]
pub struct ChecksumEngine;

impl ChecksumEngine {
    pub fn new() -> Self {
        Self
    }

    /// CRC-32C of `content`; zero for empty input
    pub fn compute(&self, content: &[u8]) -> u32 {
        update_register(0, content)
    }

    /// True when the stored checksum matches the record content
    ///
    /// Ignores [`RecordFlags::CHECKSUM_VALID`]; callers decide whether the
    /// stored value is meaningful.
    pub fn verify(&self, record: &Record) -> bool {
        self.compute(record.content()) == record.descriptor().checksum
    }

    /// Store the content checksum in `descriptor` and mark it valid
    pub fn stamp(&self, descriptor: &mut RecordDescriptor, content: &[u8]) {
        descriptor.checksum = self.compute(content);
        descriptor.flags.insert(RecordFlags::CHECKSUM_VALID);
    }

    /// Stamp a record in place
    pub fn stamp_record(&self, record: &mut Record) {
        let checksum = self.compute(record.content());
        record.set_checksum(checksum);
        record.flags_mut().insert(RecordFlags::CHECKSUM_VALID);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use readout_types::SourceTag;

    /// Bit-at-a-time reference implementation of the raw register update
    fn reference(mut register: u32, data: &[u8]) -> u32 {
        for &byte in data {
            register ^= byte as u32;
            for _ in 0..8 {
                register = if register & 1 != 0 {
                    (register >> 1) ^ 0x82F6_3B78
                } else {
                    register >> 1
                };
            }
        }
        register
    }

    #[test]
    fn test_reference_matches_published_check_value() {
        // Conventional CRC-32C of "123456789" with pre/post inversion
        assert_eq!(!reference(!0, b"123456789"), 0xE306_9283);
    }

    #[test]
    fn test_empty_content_is_zero() {
        assert_eq!(ChecksumEngine::new().compute(&[]), 0);
    }

    #[test]
    fn test_compute_is_deterministic() {
        let engine = ChecksumEngine::new();
        let data = b"detector readout content";
        let first = engine.compute(data);
        for _ in 0..10 {
            assert_eq!(engine.compute(data), first);
        }
        assert_eq!(ChecksumEngine::default().compute(data), first);
    }

    #[test]
    fn test_known_vector() {
        let engine = ChecksumEngine::new();
        assert_eq!(engine.compute(b"123456789"), reference(0, b"123456789"));
        assert_ne!(engine.compute(b"123456789"), engine.compute(b"123456780"));
    }

    #[test]
    fn test_stamp_and_verify() {
        let engine = ChecksumEngine::new();
        let mut record = Record::from_parts(
            7,
            SourceTag::new(0x10, 1),
            RecordFlags::empty(),
            vec![1, 2, 3, 4, 5],
        );
        assert!(!record.descriptor().flags.is_checksum_valid());

        engine.stamp_record(&mut record);
        assert!(record.descriptor().flags.is_checksum_valid());
        assert!(engine.verify(&record));

        record.set_checksum(record.descriptor().checksum ^ 1);
        assert!(!engine.verify(&record));
    }

    #[test]
    fn test_stamp_descriptor() {
        let engine = ChecksumEngine::new();
        let content = [9u8; 64];
        let mut desc = RecordDescriptor::new(1, 64, SourceTag::new(0x10, 1));
        engine.stamp(&mut desc, &content);
        assert_eq!(desc.checksum, engine.compute(&content));
        assert!(desc.flags.is_checksum_valid());
    }

    proptest! {
        #[test]
        fn prop_matches_reference(data in proptest::collection::vec(any::<u8>(), 0..4096)) {
            prop_assert_eq!(ChecksumEngine::new().compute(&data), reference(0, &data));
        }
    }
}
