// Crate-wide error type.
//
// Every data-dependent failure is returned to the immediate caller. Buffer
// over-release is not represented here: it can only come from an integration
// defect and aborts through `pool::resource_misuse`.

use std::io;

use thiserror::Error;

/// Errors returned by encoders, decoders, and the endpoint.
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid setup (lookback, cadence, cache or packet sizing).
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A codec failed while compressing, or the frame does not fit a packet.
    #[error("compression failed: {0}")]
    Compression(#[source] io::Error),

    /// Corrupt, truncated, or oversized compressed input.
    #[error("decompression failed: {0}")]
    Decompression(#[source] io::Error),

    /// Algorithm id not present in the registry.
    #[error("unknown compression algorithm id {0}")]
    UnknownAlgorithm(u8),

    /// Delta frame whose keyframe is not in the receiver cache.
    #[error("referenced keyframe (id={0}) is missing")]
    MissingReference(u16),

    /// Buffer length beyond its fixed capacity.
    #[error("length {length} exceeds buffer capacity {capacity}")]
    InvalidLength { length: usize, capacity: usize },

    /// Header frame type is neither keyframe nor delta frame.
    #[error("invalid frame type {0:#04x}")]
    InvalidFrameType(u8),

    /// Packet shorter than the fixed header.
    #[error("packet of {0} bytes is shorter than the frame header")]
    TruncatedPacket(usize),
}

/// Result type alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
