//! # Readout Network - Record Stream Transport
//!
//! ## Purpose
//!
//! Moves serialized records from producers to consumers over a
//! publish/subscribe transport:
//! - Length-prefixed framing on stream sockets
//! - TCP publisher with per-subscriber high-water marks
//! - [`RecordSubscriber`], the blocking pull interface with a latched
//!   end-of-stream flag
//! - [`RecordPublisher`], which ends streams with an empty terminator message
//!
//! ## Architecture Role
//!
//! ```text
//! readout-types → readout-codec → [readout-network] → tools
//!      ↑               ↓                  ↓
//! Record model    encode/decode      Sockets, tokio tasks
//!                 one record per     backpressure,
//!                 message            end-of-stream latch
//! ```
//!
//! ## What This Crate Does NOT Contain
//! - Record validation (belongs in readout-codec)
//! - Configuration file loading (belongs in readout-config)

pub mod config;
pub mod error;
pub mod framing;
pub mod publisher;
pub mod subscriber;
pub mod transports;

pub use config::{PublisherConfig, SubscriberConfig, DEFAULT_HIGH_WATER_MARK, DEFAULT_MAX_MESSAGE_SIZE};
pub use error::{Result, TransportError};
pub use framing::{read_frame, write_frame};
pub use publisher::{RecordPublisher, DEFAULT_LINGER};
pub use subscriber::{Received, RecordSubscriber};
pub use transports::{MessageSource, TcpPublisher, TcpSubscription, TransportStats};
