//! Error types for apcctl.

use std::io;
use std::time::Duration;

use thiserror::Error;

use crate::port::ResolveError;
use crate::status::StatusError;

/// Main error type for apcctl operations.
#[derive(Error, Debug)]
pub enum Error {
    /// TCP transport-level errors
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// Prompt matching errors
    #[error("Channel error: {0}")]
    Channel(#[from] ChannelError),

    /// Driver-level errors
    #[error("Driver error: {0}")]
    Driver(#[from] DriverError),

    /// The outlet status block could not be read
    #[error("Unable to read status from APC device: {0}")]
    Parse(#[from] StatusError),

    /// The port token could not be mapped to an outlet number
    #[error("{0}")]
    Resolve(#[from] ResolveError),
}

/// Transport layer errors (TCP connection, writes).
#[derive(Error, Debug)]
pub enum TransportError {
    /// Failed to connect to host
    #[error("Connection failed to {host}:{port}: {source}")]
    ConnectionFailed {
        host: String,
        port: u16,
        #[source]
        source: io::Error,
    },

    /// Connect or write deadline elapsed
    #[error("Operation timed out after {0:?}")]
    Timeout(Duration),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Channel layer errors (prompt matching on the byte stream).
#[derive(Error, Debug)]
pub enum ChannelError {
    /// No expected marker arrived before the read deadline
    #[error("None of {markers:?} seen within {timeout:?}")]
    PatternTimeout {
        timeout: Duration,
        markers: Vec<String>,
    },

    /// Remote end closed the connection while a marker was pending
    #[error("Connection closed while waiting for {markers:?}")]
    Closed { markers: Vec<String> },
}

/// Driver layer errors.
#[derive(Error, Debug)]
pub enum DriverError {
    /// The endpoint cannot be used to open a session
    #[error("Invalid endpoint: {message}")]
    InvalidEndpoint { message: String },
}

/// Coarse classification of an [`Error`], one per failure mode of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// TCP connect failed.
    Connect,
    /// A read or write deadline elapsed.
    Timeout,
    /// The device hung up mid-sequence.
    ConnectionClosed,
    /// Writing to the socket failed.
    Write,
    /// The status block was missing or malformed.
    Parse,
    /// The port token did not map to an outlet.
    Resolve,
    /// The caller supplied an unusable endpoint.
    InvalidInput,
}

impl Error {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Transport(TransportError::ConnectionFailed { .. }) => ErrorKind::Connect,
            Error::Transport(TransportError::Timeout(_)) => ErrorKind::Timeout,
            Error::Transport(TransportError::Io(_)) => ErrorKind::Write,
            Error::Channel(ChannelError::PatternTimeout { .. }) => ErrorKind::Timeout,
            Error::Channel(ChannelError::Closed { .. }) => ErrorKind::ConnectionClosed,
            Error::Driver(_) => ErrorKind::InvalidInput,
            Error::Parse(_) => ErrorKind::Parse,
            Error::Resolve(_) => ErrorKind::Resolve,
        }
    }

    /// Whether this error came from an elapsed deadline.
    pub fn is_timeout(&self) -> bool {
        self.kind() == ErrorKind::Timeout
    }
}

/// Result type alias using apcctl's Error.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_mapping() {
        let err: Error = ChannelError::PatternTimeout {
            timeout: Duration::from_secs(10),
            markers: vec!["cancel :".to_string()],
        }
        .into();
        assert_eq!(err.kind(), ErrorKind::Timeout);
        assert!(err.is_timeout());

        let err: Error = ChannelError::Closed { markers: vec![] }.into();
        assert_eq!(err.kind(), ErrorKind::ConnectionClosed);

        let err: Error = TransportError::ConnectionFailed {
            host: "pdu".to_string(),
            port: 23,
            source: io::Error::from(io::ErrorKind::ConnectionRefused),
        }
        .into();
        assert_eq!(err.kind(), ErrorKind::Connect);
        assert_eq!(
            err.to_string(),
            "Transport error: Connection failed to pdu:23: connection refused"
        );
    }

    #[test]
    fn test_resolve_error_message() {
        let err: Error = ResolveError::Unresolved {
            token: "lamp".to_string(),
        }
        .into();
        assert_eq!(err.kind(), ErrorKind::Resolve);
        assert!(err.to_string().contains("unable to resolve port token"));
    }
}
