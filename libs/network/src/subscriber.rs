//! # Record Subscriber
//!
//! ## Purpose
//!
//! Pull-based ingestion of records delivered one per message. Each payload
//! is decoded into an owned [`Record`]; the first payload that does not
//! decode, including the empty terminator, or any transport failure latches
//! end-of-stream permanently.
//!
//! ## Termination
//!
//! Publishers end a stream with a zero-length message. The subscriber does
//! not distinguish that terminator from a malformed payload or from the
//! connection going away: all three end the stream. The cause is logged.
//!
//! ```text
//! MessageSource::receive() → decode_record() → Some(Record)
//!          ↓ Err                  ↓ Err
//!          └──────── latch end_of_stream ──────► None forever
//! ```

use crate::config::SubscriberConfig;
use crate::transports::{MessageSource, TcpSubscription};
use crate::Result;
use readout_codec::{decode_record_with_limit, CodecError};
use readout_types::{Record, RecordSource};
use std::time::Duration;
use tracing::{debug, warn};

/// Outcome of a bounded wait for the next record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Received {
    /// A record arrived and decoded
    Record(Record),
    /// Nothing arrived within the timeout; the stream is still open
    Pending,
    /// The stream has ended
    EndOfStream,
}

/// Streaming ingestion endpoint yielding one owned record at a time
///
/// Owns its transport exclusively and cannot be cloned. Dropping it closes
/// the transport.
pub struct RecordSubscriber<S: MessageSource = TcpSubscription> {
    source: S,
    max_message_size: u64,
    end_of_stream: bool,
    records_received: u64,
}

impl RecordSubscriber<TcpSubscription> {
    /// Connect to a publisher and subscribe to all of its messages
    pub fn connect(config: &SubscriberConfig) -> Result<Self> {
        let subscription = TcpSubscription::connect(config)?;
        Ok(Self::with_limit(subscription, config.max_message_size as u64))
    }
}

impl<S: MessageSource> RecordSubscriber<S> {
    /// Wrap an existing message source
    pub fn new(source: S) -> Self {
        Self::with_limit(source, readout_codec::MAX_MESSAGE_SIZE)
    }

    /// Wrap a message source with an explicit decode size limit
    pub fn with_limit(source: S, max_message_size: u64) -> Self {
        Self {
            source,
            max_message_size,
            end_of_stream: false,
            records_received: 0,
        }
    }

    /// Block until the next record arrives
    ///
    /// Returns `None` once the stream has ended. After that no further
    /// receive is attempted.
    pub fn next(&mut self) -> Option<Record> {
        if self.end_of_stream {
            return None;
        }
        match self.source.receive() {
            Ok(payload) => self.decode(&payload),
            Err(e) => {
                self.latch(&format!("transport: {}", e));
                None
            }
        }
    }

    /// Wait at most `timeout` for the next record
    pub fn next_timeout(&mut self, timeout: Duration) -> Received {
        if self.end_of_stream {
            return Received::EndOfStream;
        }
        match self.source.receive_timeout(timeout) {
            Ok(Some(payload)) => match self.decode(&payload) {
                Some(record) => Received::Record(record),
                None => Received::EndOfStream,
            },
            Ok(None) => Received::Pending,
            Err(e) => {
                self.latch(&format!("transport: {}", e));
                Received::EndOfStream
            }
        }
    }

    /// True once the stream has ended; never blocks
    pub fn is_end_of_stream(&self) -> bool {
        self.end_of_stream
    }

    /// Records successfully decoded so far
    pub fn records_received(&self) -> u64 {
        self.records_received
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    fn decode(&mut self, payload: &[u8]) -> Option<Record> {
        match decode_record_with_limit(payload, self.max_message_size) {
            Ok(record) => {
                self.records_received += 1;
                Some(record)
            }
            Err(CodecError::EmptyPayload) => {
                debug!(
                    records = self.records_received,
                    "Stream terminator received"
                );
                self.end_of_stream = true;
                None
            }
            Err(e) => {
                self.latch(&e.to_string());
                None
            }
        }
    }

    fn latch(&mut self, reason: &str) {
        self.end_of_stream = true;
        warn!(
            records = self.records_received,
            reason, "Record stream ended"
        );
    }
}

impl<S: MessageSource> RecordSource for RecordSubscriber<S> {
    fn next_record(&mut self) -> Option<Record> {
        self.next()
    }

    fn is_end_of_stream(&self) -> bool {
        self.end_of_stream
    }
}
