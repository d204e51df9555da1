//! Record publisher
//!
//! Serializes each record into one message and fans it out to every
//! connected subscriber. [`RecordPublisher::finish`] sends the zero-length
//! terminator and gives subscribers a grace period to drain.

use crate::config::PublisherConfig;
use crate::transports::{TcpPublisher, TransportStats};
use crate::Result;
use readout_codec::{encode_record, terminator};
use readout_types::Record;
use std::net::SocketAddr;
use std::time::Duration;
use tracing::info;

/// Time subscribers get to drain queued frames after the terminator
pub const DEFAULT_LINGER: Duration = Duration::from_secs(5);

/// Publishes records over a [`TcpPublisher`]
pub struct RecordPublisher {
    transport: TcpPublisher,
    records_published: u64,
}

impl RecordPublisher {
    pub fn bind(config: &PublisherConfig) -> Result<Self> {
        Ok(Self {
            transport: TcpPublisher::bind(config)?,
            records_published: 0,
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.transport.local_addr()
    }

    /// Publish one record; returns how many subscribers accepted it
    pub fn publish(&mut self, record: &Record) -> Result<usize> {
        let payload = encode_record(record)?;
        let delivered = self.transport.publish(&payload)?;
        self.records_published += 1;
        Ok(delivered)
    }

    pub fn records_published(&self) -> u64 {
        self.records_published
    }

    pub fn subscriber_count(&self) -> usize {
        self.transport.subscriber_count()
    }

    pub fn wait_for_subscribers(&self, count: usize, timeout: Duration) -> bool {
        self.transport.wait_for_subscribers(count, timeout)
    }

    pub fn stats(&self) -> TransportStats {
        self.transport.stats()
    }

    /// Send the stream terminator and close, lingering up to `linger`
    pub fn finish(self, linger: Duration) -> Result<TransportStats> {
        self.transport.publish(&terminator())?;
        let stats = self.transport.stats();
        info!(
            records = self.records_published,
            dropped = stats.dropped,
            "✅ Record stream finished"
        );
        self.transport.close(linger);
        Ok(stats)
    }
}
