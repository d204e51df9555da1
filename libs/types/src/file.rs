//! Record files
//!
//! A record file is an 8-byte magic, a `u32` LE format version, then records
//! in wire layout back to back. Clean EOF at a record boundary ends the
//! stream; anything else that fails to parse ends it with a warning.

use crate::error::{RecordError, RecordResult};
use crate::record::Record;
use crate::source::RecordSource;
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

pub const FILE_MAGIC: [u8; 8] = *b"RDOUTREC";
pub const FILE_VERSION: u32 = 1;

/// Sequential writer for record files
pub struct RecordFileWriter<W: Write = BufWriter<File>> {
    writer: W,
    records_written: u64,
}

impl RecordFileWriter {
    pub fn create(path: impl AsRef<Path>) -> RecordResult<Self> {
        let file = File::create(path.as_ref())?;
        debug!(path = %path.as_ref().display(), "Created record file");
        Self::new(BufWriter::new(file))
    }
}

impl<W: Write> RecordFileWriter<W> {
    /// Wrap an arbitrary writer and emit the file header
    pub fn new(mut writer: W) -> RecordResult<Self> {
        writer.write_all(&FILE_MAGIC)?;
        writer.write_u32::<LittleEndian>(FILE_VERSION)?;
        Ok(Self {
            writer,
            records_written: 0,
        })
    }

    pub fn write(&mut self, record: &Record) -> RecordResult<()> {
        record.write_to(&mut self.writer)?;
        self.records_written += 1;
        Ok(())
    }

    pub fn records_written(&self) -> u64 {
        self.records_written
    }

    /// Flush and hand back the inner writer
    pub fn finish(mut self) -> RecordResult<W> {
        self.writer.flush()?;
        Ok(self.writer)
    }
}

/// Record file reader with latched end-of-stream
pub struct RecordFileReader<R: Read = BufReader<File>> {
    reader: R,
    path: Option<PathBuf>,
    records_read: u64,
    eos: bool,
}

impl RecordFileReader {
    pub fn open(path: impl AsRef<Path>) -> RecordResult<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let mut reader = Self::new(BufReader::new(file))?;
        reader.path = Some(path.to_path_buf());
        info!(path = %path.display(), "Opened record file");
        Ok(reader)
    }
}

impl<R: Read> RecordFileReader<R> {
    /// Wrap an arbitrary reader and validate the file header
    pub fn new(mut reader: R) -> RecordResult<Self> {
        let mut magic = [0u8; 8];
        reader.read_exact(&mut magic)?;
        if magic != FILE_MAGIC {
            return Err(RecordError::InvalidMagic { found: magic });
        }
        let version = reader.read_u32::<LittleEndian>()?;
        if version != FILE_VERSION {
            return Err(RecordError::UnsupportedVersion {
                version,
                supported: FILE_VERSION,
            });
        }
        Ok(Self {
            reader,
            path: None,
            records_read: 0,
            eos: false,
        })
    }

    pub fn records_read(&self) -> u64 {
        self.records_read
    }

    /// Read the next record, distinguishing clean EOF (`Ok(None)`) from errors
    pub fn read_record(&mut self) -> RecordResult<Option<Record>> {
        let record = Record::read_from(&mut self.reader)?;
        if record.is_some() {
            self.records_read += 1;
        }
        Ok(record)
    }
}

impl<R: Read> RecordSource for RecordFileReader<R> {
    fn next_record(&mut self) -> Option<Record> {
        if self.eos {
            return None;
        }
        match self.read_record() {
            Ok(Some(record)) => Some(record),
            Ok(None) => {
                debug!(records = self.records_read, "Record file exhausted");
                self.eos = true;
                None
            }
            Err(e) if e.is_end_of_input() => {
                warn!(
                    path = ?self.path,
                    records = self.records_read,
                    error = %e,
                    "Record file ends inside a record, ending stream"
                );
                self.eos = true;
                None
            }
            Err(e) => {
                warn!(
                    path = ?self.path,
                    records = self.records_read,
                    error = %e,
                    "Record file unreadable, ending stream"
                );
                self.eos = true;
                None
            }
        }
    }

    fn is_end_of_stream(&self) -> bool {
        self.eos
    }
}
