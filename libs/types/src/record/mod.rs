//! Record data model
//!
//! A [`Record`] pairs a [`RecordDescriptor`] with the content region it
//! describes. Records are owned by whichever component produced them; the
//! analyzer only borrows them for the duration of one check.

pub mod descriptor;
pub mod flags;
pub mod source;

pub use descriptor::RecordDescriptor;
pub use flags::RecordFlags;
pub use source::{PatternFormat, SourceId, SourceTag};

use crate::error::{RecordError, RecordResult};
use serde::{Deserialize, Serialize};
use std::io::{ErrorKind, Read, Write};

/// Upper bound on content size accepted when reading from untrusted input
pub const MAX_CONTENT_SIZE: u64 = 1 << 30;

/// Descriptor plus owned content
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    descriptor: RecordDescriptor,
    content: Vec<u8>,
}

impl Record {
    /// Pair a descriptor with its content, enforcing `size == content.len()`
    pub fn new(descriptor: RecordDescriptor, content: Vec<u8>) -> RecordResult<Self> {
        if descriptor.size != content.len() as u64 {
            return Err(RecordError::SizeMismatch {
                index: descriptor.index,
                declared: descriptor.size,
                actual: content.len(),
            });
        }
        Ok(Self {
            descriptor,
            content,
        })
    }

    /// Build a record whose descriptor size is taken from `content`
    pub fn from_parts(index: u64, tag: SourceTag, flags: RecordFlags, content: Vec<u8>) -> Self {
        let descriptor =
            RecordDescriptor::new(index, content.len() as u64, tag).with_flags(flags);
        Self {
            descriptor,
            content,
        }
    }

    pub fn descriptor(&self) -> &RecordDescriptor {
        &self.descriptor
    }

    /// Mutable header access; `size` is not exposed so the invariant holds
    pub fn set_checksum(&mut self, checksum: u32) {
        self.descriptor.checksum = checksum;
    }

    pub fn flags_mut(&mut self) -> &mut RecordFlags {
        &mut self.descriptor.flags
    }

    pub fn content(&self) -> &[u8] {
        &self.content
    }

    pub fn index(&self) -> u64 {
        self.descriptor.index
    }

    pub fn size(&self) -> u64 {
        self.descriptor.size
    }

    pub fn into_parts(self) -> (RecordDescriptor, Vec<u8>) {
        (self.descriptor, self.content)
    }

    /// True when the descriptor still agrees with the content length
    ///
    /// Deserialized records bypass [`Record::new`], so decoders check this.
    pub fn is_consistent(&self) -> bool {
        self.descriptor.size == self.content.len() as u64
    }

    /// Write descriptor followed by content
    pub fn write_to<W: Write>(&self, writer: &mut W) -> RecordResult<()> {
        self.descriptor.encode_into(writer)?;
        writer.write_all(&self.content)?;
        Ok(())
    }

    /// Read descriptor followed by `size` bytes of content
    ///
    /// Returns `Ok(None)` when `reader` is already at EOF. Input that ends
    /// inside a descriptor or its content is an error.
    pub fn read_from<R: Read>(reader: &mut R) -> RecordResult<Option<Self>> {
        let mut header = [0u8; RecordDescriptor::WIRE_SIZE];
        let filled = fill(reader, &mut header)?;
        if filled == 0 {
            return Ok(None);
        }
        if filled < header.len() {
            return Err(RecordError::TruncatedDescriptor {
                need: RecordDescriptor::WIRE_SIZE,
                got: filled,
            });
        }

        let descriptor = RecordDescriptor::from_bytes(&header)?;
        if descriptor.size > MAX_CONTENT_SIZE {
            return Err(RecordError::ContentTooLarge {
                size: descriptor.size,
                limit: MAX_CONTENT_SIZE,
            });
        }
        let mut content = Vec::with_capacity(descriptor.size as usize);
        let got = reader
            .by_ref()
            .take(descriptor.size)
            .read_to_end(&mut content)?;
        if (got as u64) < descriptor.size {
            return Err(RecordError::TruncatedContent {
                index: descriptor.index,
                expected: descriptor.size,
                got,
            });
        }
        Ok(Some(Self {
            descriptor,
            content,
        }))
    }
}

/// Read until `buf` is full or EOF; returns the number of bytes read
fn fill<R: Read>(reader: &mut R, buf: &mut [u8]) -> std::io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_size_mismatch() {
        let desc = RecordDescriptor::new(5, 4, SourceTag::new(0x10, 1));
        let err = Record::new(desc, vec![1, 2, 3]).unwrap_err();
        assert!(matches!(
            err,
            RecordError::SizeMismatch {
                index: 5,
                declared: 4,
                actual: 3
            }
        ));
    }

    #[test]
    fn test_from_parts_takes_size_from_content() {
        let record = Record::from_parts(
            9,
            SourceTag::pattern(PatternFormat::Ramp),
            RecordFlags::OVERFLOW_TRUNCATED,
            vec![0, 1, 2, 3, 4],
        );
        assert_eq!(record.size(), 5);
        assert_eq!(record.index(), 9);
        assert!(record.descriptor().flags.is_overflow_truncated());
        assert!(record.is_consistent());
    }

    #[test]
    fn test_wire_record_read_back() {
        let record = Record::from_parts(
            100,
            SourceTag::new(0x30, 2),
            RecordFlags::empty(),
            b"readout".to_vec(),
        );
        let mut buffer = Vec::new();
        record.write_to(&mut buffer).unwrap();
        assert_eq!(buffer.len(), RecordDescriptor::WIRE_SIZE + 7);

        let mut input = buffer.as_slice();
        let decoded = Record::read_from(&mut input).unwrap();
        assert_eq!(decoded, Some(record));
        assert!(Record::read_from(&mut input).unwrap().is_none());
    }

    #[test]
    fn test_truncated_content_is_reported() {
        let record = Record::from_parts(1, SourceTag::new(0x10, 0), RecordFlags::empty(), vec![7; 16]);
        let mut buffer = Vec::new();
        record.write_to(&mut buffer).unwrap();
        buffer.truncate(buffer.len() - 6);

        let err = Record::read_from(&mut buffer.as_slice()).unwrap_err();
        assert!(matches!(
            err,
            RecordError::TruncatedContent {
                index: 1,
                expected: 16,
                got: 10
            }
        ));
    }

    #[test]
    fn test_oversize_declaration_is_rejected_before_allocation() {
        let desc = RecordDescriptor::new(1, MAX_CONTENT_SIZE + 1, SourceTag::new(0x10, 0));
        let bytes = desc.to_bytes();
        let err = Record::read_from(&mut &bytes[..]).unwrap_err();
        assert!(matches!(err, RecordError::ContentTooLarge { .. }));
    }

    #[test]
    fn test_partial_descriptor_is_not_clean_eof() {
        let err = Record::read_from(&mut &[0u8; 10][..]).unwrap_err();
        assert!(matches!(
            err,
            RecordError::TruncatedDescriptor { need: 25, got: 10 }
        ));
        assert!(err.is_end_of_input());
    }
}
