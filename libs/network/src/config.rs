//! Transport endpoint configuration
//!
//! Addresses are `host:port`, optionally written with a `tcp://` scheme.
//! A `high_water_mark` of zero means unbounded buffering.

use crate::{Result, TransportError};
use serde::{Deserialize, Serialize};
use std::net::{SocketAddr, ToSocketAddrs};

/// Default receive buffer: one undelivered message
pub const DEFAULT_HIGH_WATER_MARK: u32 = 1;

/// Default per-subscriber send buffer at the publisher
pub const DEFAULT_PUBLISHER_HIGH_WATER_MARK: u32 = 1000;

/// Largest frame accepted by default
pub const DEFAULT_MAX_MESSAGE_SIZE: usize = 64 * 1024 * 1024;

const SCHEME: &str = "tcp://";

/// Subscriber-side configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubscriberConfig {
    /// Publisher endpoint to connect to
    pub address: String,
    /// Undelivered messages buffered before the socket stops reading
    pub high_water_mark: u32,
    /// Largest frame accepted
    pub max_message_size: usize,
}

impl Default for SubscriberConfig {
    fn default() -> Self {
        Self {
            address: "tcp://127.0.0.1:5556".to_string(),
            high_water_mark: DEFAULT_HIGH_WATER_MARK,
            max_message_size: DEFAULT_MAX_MESSAGE_SIZE,
        }
    }
}

impl SubscriberConfig {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            ..Default::default()
        }
    }

    pub fn with_high_water_mark(mut self, high_water_mark: u32) -> Self {
        self.high_water_mark = high_water_mark;
        self
    }

    /// Resolve the configured address
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        resolve(&self.address, "address")
    }
}

/// Publisher-side configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PublisherConfig {
    /// Local endpoint to listen on
    pub bind_address: String,
    /// Frames queued per subscriber before new frames are dropped for it
    pub high_water_mark: u32,
    /// Largest frame sent
    pub max_message_size: usize,
}

impl Default for PublisherConfig {
    fn default() -> Self {
        Self {
            bind_address: "tcp://127.0.0.1:5556".to_string(),
            high_water_mark: DEFAULT_PUBLISHER_HIGH_WATER_MARK,
            max_message_size: DEFAULT_MAX_MESSAGE_SIZE,
        }
    }
}

impl PublisherConfig {
    pub fn new(bind_address: impl Into<String>) -> Self {
        Self {
            bind_address: bind_address.into(),
            ..Default::default()
        }
    }

    pub fn with_high_water_mark(mut self, high_water_mark: u32) -> Self {
        self.high_water_mark = high_water_mark;
        self
    }

    /// Resolve the configured bind address
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        resolve(&self.bind_address, "bind_address")
    }
}

/// Strip an optional `tcp://` scheme
pub fn strip_scheme(address: &str) -> &str {
    address.strip_prefix(SCHEME).unwrap_or(address)
}

fn resolve(address: &str, field: &str) -> Result<SocketAddr> {
    let host_port = strip_scheme(address.trim());
    if host_port.contains("://") {
        return Err(TransportError::configuration(
            format!("Unsupported transport scheme in '{}'", address),
            Some(field),
        ));
    }
    host_port
        .to_socket_addrs()
        .map_err(|e| {
            TransportError::configuration(
                format!("Cannot resolve '{}': {}", address, e),
                Some(field),
            )
        })?
        .next()
        .ok_or_else(|| {
            TransportError::configuration(
                format!("'{}' resolved to no addresses", address),
                Some(field),
            )
        })
}
