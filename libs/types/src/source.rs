//! Pull-based record sources
//!
//! Every producer of records (network subscriber, record file, in-memory
//! queue) exposes the same blocking single-item interface with a latched
//! end-of-stream flag.

use crate::record::Record;
use std::collections::VecDeque;

/// Blocking, single-consumer sequence of records
pub trait RecordSource {
    /// Retrieve the next record, blocking until one is available
    ///
    /// Returns `None` once the stream has ended; after that every call
    /// returns `None` without touching the underlying input.
    fn next_record(&mut self) -> Option<Record>;

    /// Non-blocking view of the end-of-stream latch
    fn is_end_of_stream(&self) -> bool;
}

impl<S: RecordSource + ?Sized> RecordSource for Box<S> {
    fn next_record(&mut self) -> Option<Record> {
        (**self).next_record()
    }

    fn is_end_of_stream(&self) -> bool {
        (**self).is_end_of_stream()
    }
}

/// Records queued in memory, mostly useful for tests and replay
#[derive(Debug, Default)]
pub struct MemorySource {
    records: VecDeque<Record>,
    eos: bool,
}

impl MemorySource {
    pub fn new(records: impl IntoIterator<Item = Record>) -> Self {
        Self {
            records: records.into_iter().collect(),
            eos: false,
        }
    }

    pub fn remaining(&self) -> usize {
        self.records.len()
    }
}

impl RecordSource for MemorySource {
    fn next_record(&mut self) -> Option<Record> {
        if self.eos {
            return None;
        }
        let record = self.records.pop_front();
        if record.is_none() {
            self.eos = true;
        }
        record
    }

    fn is_end_of_stream(&self) -> bool {
        self.eos
    }
}

/// Adapts a source into an iterator that stops at end-of-stream
pub struct Records<'a, S: RecordSource + ?Sized> {
    source: &'a mut S,
}

impl<'a, S: RecordSource + ?Sized> Iterator for Records<'a, S> {
    type Item = Record;

    fn next(&mut self) -> Option<Record> {
        self.source.next_record()
    }
}

/// Borrow `source` as an iterator
pub fn records<S: RecordSource + ?Sized>(source: &mut S) -> Records<'_, S> {
    Records { source }
}
