//! Transport Error Types
//!
//! Failures raised while binding, connecting, framing or moving messages
//! between publishers and subscribers.

use std::net::SocketAddr;
use thiserror::Error;

/// Main transport error type
#[derive(Error, Debug)]
pub enum TransportError {
    /// Could not connect to or bind an endpoint
    #[error("Connection error: {message} (remote: {remote_addr:?})")]
    Connection {
        message: String,
        remote_addr: Option<SocketAddr>,
        #[source]
        source: Option<std::io::Error>,
    },

    /// Peer announced a frame larger than the configured limit
    #[error("Frame of {size} bytes exceeds maximum {limit}")]
    FrameTooLarge { size: usize, limit: usize },

    /// Stream ended inside a frame
    #[error("Truncated frame: expected {expected} bytes, got {got}")]
    TruncatedFrame { expected: usize, got: usize },

    /// Transport was shut down or the peer went away
    #[error("Transport closed: {reason}")]
    Closed { reason: String },

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Configuration {
        message: String,
        field: Option<String>,
    },

    /// Record message could not be encoded
    #[error("Codec error: {0}")]
    Codec(#[from] readout_codec::CodecError),

    /// Generic I/O errors
    #[error("I/O error: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },
}

/// Result type alias for transport operations
pub type Result<T> = std::result::Result<T, TransportError>;

impl TransportError {
    /// Create a connection error
    pub fn connection(message: impl Into<String>, remote_addr: Option<SocketAddr>) -> Self {
        Self::Connection {
            message: message.into(),
            remote_addr,
            source: None,
        }
    }

    /// Create a connection error with source
    pub fn connection_with_source(
        message: impl Into<String>,
        remote_addr: Option<SocketAddr>,
        source: std::io::Error,
    ) -> Self {
        Self::Connection {
            message: message.into(),
            remote_addr,
            source: Some(source),
        }
    }

    /// Create a closed-transport error
    pub fn closed(reason: impl Into<String>) -> Self {
        Self::Closed {
            reason: reason.into(),
        }
    }

    /// Create a configuration error
    pub fn configuration(message: impl Into<String>, field: Option<&str>) -> Self {
        Self::Configuration {
            message: message.into(),
            field: field.map(|s| s.to_string()),
        }
    }

    /// True when no further message can arrive on this transport
    pub fn is_closed(&self) -> bool {
        match self {
            TransportError::Closed { .. } => true,
            TransportError::TruncatedFrame { .. } => true,
            TransportError::Io { source, .. } => matches!(
                source.kind(),
                std::io::ErrorKind::UnexpectedEof
                    | std::io::ErrorKind::ConnectionReset
                    | std::io::ErrorKind::ConnectionAborted
                    | std::io::ErrorKind::BrokenPipe
            ),
            _ => false,
        }
    }
}

/// Convert standard I/O errors to transport errors
impl From<std::io::Error> for TransportError {
    fn from(error: std::io::Error) -> Self {
        TransportError::Io {
            message: error.to_string(),
            source: error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{IpAddr, Ipv4Addr};

    #[test]
    fn test_connection_error() {
        let addr = SocketAddr::new(IpAddr::V4(Ipv4Addr::new(192, 168, 1, 1)), 5556);
        let err = TransportError::connection("Handshake failed", Some(addr));

        match err {
            TransportError::Connection { remote_addr, .. } => {
                assert_eq!(remote_addr, Some(addr));
            }
            _ => panic!("Expected Connection error"),
        }
    }

    #[test]
    fn test_closed_classification() {
        assert!(TransportError::closed("peer left").is_closed());
        let eof = std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "eof");
        assert!(TransportError::from(eof).is_closed());
        let denied = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "no");
        assert!(!TransportError::from(denied).is_closed());
        assert!(!TransportError::FrameTooLarge { size: 2, limit: 1 }.is_closed());
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        match TransportError::from(io_err) {
            TransportError::Io { message, .. } => assert!(message.contains("refused")),
            _ => panic!("Expected Io error"),
        }
    }
}
