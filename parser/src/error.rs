use std::path::PathBuf;

use thiserror::Error;

pub type IResult<I, O> = nom::IResult<I, O, nom::error::Error<I>>;

/// Failures raised while pulling bits out of a compressed frame.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// Fewer bits remain in the buffer than were requested.
    #[error("out of data: requested {requested} bits, {remaining} remaining")]
    OutOfData { requested: u8, remaining: u64 },

    /// A read width outside of `1..=32` was requested.
    #[error("invalid read width: {0} bits")]
    InvalidWidth(u8),

    /// The input ended part way through a prefix code.
    #[error("input ended mid-symbol after {produced} bytes (bit {bit_position})")]
    DecodeTruncated { produced: usize, bit_position: u64 },

    /// The output reached its limit while meaningful input was still left.
    #[error("decoded output exceeds {limit} bytes ({trailing_bits} bits left over)")]
    OutputOverflow { limit: usize, trailing_bits: u64 },
}

/// A frame that cannot be turned into an entity record. These are counted and
/// skipped, never fatal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FrameError {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error("decoded frame is {actual} bytes, expected {expected}")]
    SizeMismatch { expected: usize, actual: usize },
}

/// Errors reported by an [`crate::analyzer::sink::EventSink`].
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to serialize event: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("sink rejected event: {0}")]
    Rejected(String),
}

/// Session-level errors. Anything surfacing here stops processing.
#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Config(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("symbol table must have {expected} weights, got {actual}")]
    InvalidSymbolTable { expected: usize, actual: usize },

    #[error("event sink failed: {0}")]
    Sink(#[from] SinkError),
}
