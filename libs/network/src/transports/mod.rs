//! Publish/Subscribe Transport Layer
//!
//! Moves opaque message payloads from one publisher to any number of
//! subscribers. Every subscriber receives every message (no topic
//! filtering); each side buffers at most `high_water_mark` messages.
//!
//! ```text
//! TcpPublisher ──frame──► per-subscriber queue ──► writer task ──► socket
//!   publish()              (drop when full)                          │
//!                                                              reader task
//!                                                                    │
//!                                                       queue (hwm, waits)
//!                                                                    │
//!                                           MessageSource::receive() ◄┘
//! ```
//!
//! Socket I/O runs on tokio tasks; both traits and endpoints expose a
//! blocking surface so the record layer stays synchronous.

use crate::Result;
use std::time::Duration;

mod queue;
pub mod tcp;

pub use tcp::{TcpPublisher, TcpSubscription};

/// Blocking source of message payloads
///
/// An `Err` means no further message will arrive on this source.
pub trait MessageSource {
    /// Block until the next payload arrives
    fn receive(&mut self) -> Result<Vec<u8>>;

    /// Wait at most `timeout` for the next payload; `Ok(None)` if none arrived
    ///
    /// The default ignores the timeout and blocks.
    fn receive_timeout(&mut self, timeout: Duration) -> Result<Option<Vec<u8>>> {
        let _ = timeout;
        self.receive().map(Some)
    }
}

impl<S: MessageSource + ?Sized> MessageSource for Box<S> {
    fn receive(&mut self) -> Result<Vec<u8>> {
        (**self).receive()
    }

    fn receive_timeout(&mut self, timeout: Duration) -> Result<Option<Vec<u8>>> {
        (**self).receive_timeout(timeout)
    }
}

/// Counters shared by transport endpoints
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransportStats {
    pub messages: u64,
    pub bytes: u64,
    pub dropped: u64,
}
