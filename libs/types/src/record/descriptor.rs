//! Record Descriptor
//!
//! Fixed-size header preceding every record's content.
//!
//! ```text
//! ┌───────┬──────┬───────────┬────────────────┬───────┬──────────┬─────────────┐
//! │ index │ size │ source_id │ source_version │ flags │ checksum │ content ... │
//! │ u64   │ u64  │ u16       │ u8             │ u16   │ u32      │ size bytes  │
//! └───────┴──────┴───────────┴────────────────┴───────┴──────────┴─────────────┘
//!   0       8      16          18               19      21         25
//! ```
//!
//! All fields are little-endian and unpadded, 25 bytes in total.

use super::flags::RecordFlags;
use super::source::SourceTag;
use crate::error::{RecordError, RecordResult};
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};

/// Fixed header of one record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RecordDescriptor {
    /// Sequence / time marker, intended to advance by a constant step
    pub index: u64,
    /// Content length in bytes
    pub size: u64,
    pub source_id: u16,
    pub source_version: u8,
    pub flags: RecordFlags,
    /// Producer-computed CRC-32C, meaningful only with [`RecordFlags::CHECKSUM_VALID`]
    pub checksum: u32,
}

impl RecordDescriptor {
    /// Encoded header size in bytes
    pub const WIRE_SIZE: usize = 25;

    pub fn new(index: u64, size: u64, tag: SourceTag) -> Self {
        Self {
            index,
            size,
            source_id: tag.source_id,
            source_version: tag.source_version,
            flags: RecordFlags::empty(),
            checksum: 0,
        }
    }

    pub fn source_tag(&self) -> SourceTag {
        SourceTag::new(self.source_id, self.source_version)
    }

    pub fn with_flags(mut self, flags: RecordFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Write the 25-byte header
    pub fn encode_into<W: Write>(&self, writer: &mut W) -> RecordResult<()> {
        writer.write_u64::<LittleEndian>(self.index)?;
        writer.write_u64::<LittleEndian>(self.size)?;
        writer.write_u16::<LittleEndian>(self.source_id)?;
        writer.write_u8(self.source_version)?;
        writer.write_u16::<LittleEndian>(self.flags.bits())?;
        writer.write_u32::<LittleEndian>(self.checksum)?;
        Ok(())
    }

    pub fn to_bytes(&self) -> [u8; Self::WIRE_SIZE] {
        let mut bytes = [0u8; Self::WIRE_SIZE];
        bytes[0..8].copy_from_slice(&self.index.to_le_bytes());
        bytes[8..16].copy_from_slice(&self.size.to_le_bytes());
        bytes[16..18].copy_from_slice(&self.source_id.to_le_bytes());
        bytes[18] = self.source_version;
        bytes[19..21].copy_from_slice(&self.flags.bits().to_le_bytes());
        bytes[21..25].copy_from_slice(&self.checksum.to_le_bytes());
        bytes
    }

    /// Read a 25-byte header
    pub fn decode_from<R: Read>(reader: &mut R) -> RecordResult<Self> {
        Ok(Self {
            index: reader.read_u64::<LittleEndian>()?,
            size: reader.read_u64::<LittleEndian>()?,
            source_id: reader.read_u16::<LittleEndian>()?,
            source_version: reader.read_u8()?,
            flags: RecordFlags::from_bits_retain(reader.read_u16::<LittleEndian>()?),
            checksum: reader.read_u32::<LittleEndian>()?,
        })
    }

    /// Parse a header from the front of `data`
    pub fn from_bytes(data: &[u8]) -> RecordResult<Self> {
        if data.len() < Self::WIRE_SIZE {
            return Err(RecordError::TruncatedDescriptor {
                need: Self::WIRE_SIZE,
                got: data.len(),
            });
        }
        let mut cursor = &data[..Self::WIRE_SIZE];
        Self::decode_from(&mut cursor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::source::PatternFormat;
    use proptest::prelude::*;

    #[test]
    fn test_wire_layout_offsets() {
        let desc = RecordDescriptor {
            index: 0x0102030405060708,
            size: 0x10,
            source_id: 0xF0,
            source_version: 0x30,
            flags: RecordFlags::CHECKSUM_VALID | RecordFlags::OVERFLOW_TRUNCATED,
            checksum: 0xDEADBEEF,
        };
        let bytes = desc.to_bytes();

        assert_eq!(&bytes[0..8], &[0x08, 0x07, 0x06, 0x05, 0x04, 0x03, 0x02, 0x01]);
        assert_eq!(&bytes[8..16], &[0x10, 0, 0, 0, 0, 0, 0, 0]);
        assert_eq!(&bytes[16..18], &[0xF0, 0x00]);
        assert_eq!(bytes[18], 0x30);
        assert_eq!(&bytes[19..21], &[0x03, 0x00]);
        assert_eq!(&bytes[21..25], &[0xEF, 0xBE, 0xAD, 0xDE]);
    }

    #[test]
    fn test_streamed_encoding_matches_array_encoding() {
        let desc = RecordDescriptor::new(42, 7, SourceTag::pattern(PatternFormat::Counter));
        let mut buffer = Vec::new();
        desc.encode_into(&mut buffer).unwrap();
        assert_eq!(buffer.len(), RecordDescriptor::WIRE_SIZE);
        assert_eq!(buffer.as_slice(), &desc.to_bytes()[..]);
    }

    #[test]
    fn test_short_buffer_is_rejected() {
        let err = RecordDescriptor::from_bytes(&[0u8; 24]).unwrap_err();
        assert!(matches!(
            err,
            RecordError::TruncatedDescriptor { need: 25, got: 24 }
        ));
        assert!(err.is_end_of_input());
    }

    proptest! {
        #[test]
        fn prop_decode_inverts_encode(
            index in any::<u64>(),
            size in any::<u64>(),
            source_id in any::<u16>(),
            source_version in any::<u8>(),
            flags in any::<u16>(),
            checksum in any::<u32>(),
        ) {
            let desc = RecordDescriptor {
                index,
                size,
                source_id,
                source_version,
                flags: RecordFlags::from_bits_retain(flags),
                checksum,
            };
            let decoded = RecordDescriptor::from_bytes(&desc.to_bytes()).unwrap();
            prop_assert_eq!(decoded, desc);
        }
    }
}
