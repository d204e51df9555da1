//! Descriptor flag bits

use serde::{Deserialize, Serialize};

bitflags::bitflags! {
    /// Descriptor flag bitmask
    ///
    /// Only bits 0 and 1 carry meaning. Reserved bits are kept verbatim
    /// (`from_bits_retain`) so a descriptor read from the wire encodes back
    /// to the same bytes.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct RecordFlags: u16 {
        /// Producer computed `checksum` over the content
        const CHECKSUM_VALID = 1 << 0;
        /// Readout hardware truncated the content on overflow
        const OVERFLOW_TRUNCATED = 1 << 1;
    }
}

impl RecordFlags {
    pub const fn is_checksum_valid(self) -> bool {
        self.contains(Self::CHECKSUM_VALID)
    }

    pub const fn is_overflow_truncated(self) -> bool {
        self.contains(Self::OVERFLOW_TRUNCATED)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_bits_match_wire_layout() {
        assert_eq!(RecordFlags::CHECKSUM_VALID.bits(), 0b01);
        assert_eq!(RecordFlags::OVERFLOW_TRUNCATED.bits(), 0b10);
    }

    #[test]
    fn test_reserved_bits_survive() {
        let flags = RecordFlags::from_bits_retain(0x8001);
        assert!(flags.is_checksum_valid());
        assert!(!flags.is_overflow_truncated());
        assert_eq!(flags.bits(), 0x8001);
    }

    #[test]
    fn test_insert_and_remove() {
        let mut flags = RecordFlags::empty();
        flags |= RecordFlags::OVERFLOW_TRUNCATED;
        assert!(flags.is_overflow_truncated());
        flags.remove(RecordFlags::OVERFLOW_TRUNCATED);
        assert_eq!(flags, RecordFlags::empty());
    }

    #[test]
    fn test_serializes_as_raw_bits() {
        let flags = RecordFlags::CHECKSUM_VALID | RecordFlags::from_bits_retain(0x0100);
        let bytes = bincode::serialize(&flags).unwrap();
        assert_eq!(bytes, 0x0101u16.to_le_bytes().to_vec());
        let back: RecordFlags = bincode::deserialize(&bytes).unwrap();
        assert_eq!(back, flags);
    }
}
