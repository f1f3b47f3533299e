//! Error types for the takshark host.
//!
//! These cover everything around the decoder: configuration, input handling
//! and listening sockets. Decoding outcomes are not errors and live in
//! `takshark-dissect`. All errors are serializable so they can be emitted
//! alongside JSON records.

use serde::{Deserialize, Serialize};
use std::io;
use thiserror::Error;

/// Result type alias using TakSharkError as the error type.
pub type Result<T> = std::result::Result<T, TakSharkError>;

/// Top-level error type for host operations.
#[derive(Debug, Error, Serialize, Deserialize)]
#[serde(tag = "type", content = "details")]
pub enum TakSharkError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Errors reading or interpreting user-supplied input
    #[error("Input error: {0}")]
    Input(#[from] InputError),

    /// Listener errors
    #[error("Listen error: {0}")]
    Listen(#[from] ListenError),
}

/// Errors related to configuration.
///
/// These errors occur when loading, parsing, or validating configuration files.
#[derive(Debug, Error, Serialize, Deserialize)]
pub enum ConfigError {
    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    FileNotFound { path: String },

    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {reason}")]
    LoadFailed { path: String, reason: String },

    /// Invalid configuration format
    #[error("Invalid configuration format: {reason}")]
    InvalidFormat { reason: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },

    /// The same port is routed to more than one decoder
    #[error("Port {port} is configured more than once")]
    DuplicatePort { port: u16 },
}

impl ConfigError {
    /// Creates a file not found error.
    pub fn file_not_found(path: impl Into<String>) -> Self {
        Self::FileNotFound { path: path.into() }
    }

    /// Creates an invalid value error.
    pub fn invalid_value(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Errors in capture input supplied on the command line.
#[derive(Debug, Error, Serialize, Deserialize)]
pub enum InputError {
    /// Hex string could not be decoded
    #[error("Invalid hex input: {reason}")]
    InvalidHex { reason: String },

    /// Input file could not be read
    #[error("Failed to read {path}: {error}")]
    ReadFailed { path: String, error: IoError },

    /// Nothing to decode
    #[error("No input given")]
    Empty,
}

impl InputError {
    /// Creates an invalid hex error.
    pub fn invalid_hex(reason: impl Into<String>) -> Self {
        Self::InvalidHex {
            reason: reason.into(),
        }
    }

    /// Creates a read failure error.
    pub fn read_failed(path: impl Into<String>, error: io::Error) -> Self {
        Self::ReadFailed {
            path: path.into(),
            error: error.into(),
        }
    }
}

/// Errors binding or serving listening sockets.
#[derive(Debug, Error, Serialize, Deserialize)]
pub enum ListenError {
    /// Socket could not be bound
    #[error("Failed to bind {protocol} {addr}: {reason}")]
    BindFailed {
        protocol: String,
        addr: String,
        reason: String,
    },

    /// No ports to listen on
    #[error("No ports configured")]
    NoPorts,
}

impl ListenError {
    /// Creates a bind failure error.
    pub fn bind_failed(
        protocol: impl Into<String>,
        addr: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::BindFailed {
            protocol: protocol.into(),
            addr: addr.into(),
            reason: reason.into(),
        }
    }
}

/// Wrapper for I/O errors to make them serializable.
#[derive(Debug, Error, Serialize, Deserialize)]
#[error("I/O error: {kind:?}: {message}")]
pub struct IoError {
    pub kind: IoErrorKind,
    pub message: String,
}

impl From<io::Error> for IoError {
    fn from(err: io::Error) -> Self {
        Self {
            kind: err.kind().into(),
            message: err.to_string(),
        }
    }
}

/// Serializable version of the io::ErrorKind values a capture host runs into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IoErrorKind {
    NotFound,
    PermissionDenied,
    ConnectionReset,
    ConnectionAborted,
    AddrInUse,
    AddrNotAvailable,
    BrokenPipe,
    InvalidInput,
    InvalidData,
    TimedOut,
    UnexpectedEof,
    Other,
}

impl From<io::ErrorKind> for IoErrorKind {
    fn from(kind: io::ErrorKind) -> Self {
        match kind {
            io::ErrorKind::NotFound => IoErrorKind::NotFound,
            io::ErrorKind::PermissionDenied => IoErrorKind::PermissionDenied,
            io::ErrorKind::ConnectionReset => IoErrorKind::ConnectionReset,
            io::ErrorKind::ConnectionAborted => IoErrorKind::ConnectionAborted,
            io::ErrorKind::AddrInUse => IoErrorKind::AddrInUse,
            io::ErrorKind::AddrNotAvailable => IoErrorKind::AddrNotAvailable,
            io::ErrorKind::BrokenPipe => IoErrorKind::BrokenPipe,
            io::ErrorKind::InvalidInput => IoErrorKind::InvalidInput,
            io::ErrorKind::InvalidData => IoErrorKind::InvalidData,
            io::ErrorKind::TimedOut => IoErrorKind::TimedOut,
            io::ErrorKind::UnexpectedEof => IoErrorKind::UnexpectedEof,
            _ => IoErrorKind::Other,
        }
    }
}
