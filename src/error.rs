//! Error types for EventIO reading

use thiserror::Error;

/// Errors produced while reading EventIO files and objects
#[derive(Debug, Error)]
pub enum EventIoError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("File {0} is not an eventio file")]
    NotEventIo(String),

    #[error("Sync must be 0xD41F8A37 or 0x378A1FD4. Got: {0:02x?}")]
    InvalidSync([u8; 4]),

    #[error("Big endian byte order is not supported by this reader")]
    BigEndianUnsupported,

    #[error("Unexpected end of data: needed {needed} bytes, {available} available")]
    UnexpectedEnd { needed: usize, available: usize },

    #[error("Expected object of type {expected}, got {got}")]
    WrongType { expected: String, got: String },

    #[error("Unsupported version of {kind}: {version}")]
    UnsupportedVersion { kind: String, version: u32 },

    #[error("Malformed {kind}: {reason}")]
    Malformed { kind: String, reason: String },

    #[error("Missing tracking positions for telescopes {0:?}")]
    NoTrackingPositions(Vec<u32>),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Result alias used throughout the library
pub type Result<T> = std::result::Result<T, EventIoError>;
