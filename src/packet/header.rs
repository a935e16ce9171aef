// Frame header encoding/decoding.
//
// Wire layout (4 bytes, big-endian):
//
//   byte 0     frame type in the low nibble; high nibble written as 0,
//              ignored on read
//   byte 1     compression options (high nibble) | algorithm id (low nibble)
//   bytes 2-3  frame id, u16
//
// A keyframe carries its own id; a delta frame carries the id of the
// keyframe it was diffed against.

use crate::compress::{Algorithm, OPTIONS_MASK};
use crate::error::{Error, Result};

/// Header size in bytes (fixed, exactly 4).
pub const HEADER_SIZE: usize = 4;

/// Mask for the frame type nibble of byte 0.
pub const FRAME_TYPE_MASK: u8 = 0x0F;

/// Mask for the algorithm nibble of byte 1.
pub const ALGORITHM_MASK: u8 = 0x0F;

// ---------------------------------------------------------------------------
// Frame type
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum FrameType {
    /// Complete, independently decodable payload.
    Keyframe = 1,
    /// XOR difference against a cached keyframe.
    DeltaFrame = 2,
}

impl FrameType {
    /// Parse byte 0 of a header. Only the low nibble is significant.
    pub fn from_wire(byte: u8) -> Result<Self> {
        match byte & FRAME_TYPE_MASK {
            1 => Ok(Self::Keyframe),
            2 => Ok(Self::DeltaFrame),
            other => Err(Error::InvalidFrameType(other)),
        }
    }
}

// ---------------------------------------------------------------------------
// Header
// ---------------------------------------------------------------------------

/// Decoded frame header.
///
/// `algorithm` is the raw 4-bit id; it is resolved against the registry only
/// when a decoder picks a codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub frame_type: FrameType,
    /// Algorithm id (0-15).
    pub algorithm: u8,
    /// Compression options (0-15).
    pub options: u8,
    pub frame_id: u16,
}

impl Header {
    pub fn new(frame_type: FrameType, algorithm: Algorithm, options: u8, frame_id: u16) -> Self {
        Self {
            frame_type,
            algorithm: algorithm.id(),
            options: options & OPTIONS_MASK,
            frame_id,
        }
    }

    /// Resolve the algorithm id against the registry.
    pub fn algorithm(&self) -> Result<Algorithm> {
        Algorithm::from_id(self.algorithm)
    }

    /// Encode header to bytes.
    pub fn encode(&self) -> [u8; HEADER_SIZE] {
        let mut buf = [0u8; HEADER_SIZE];
        self.encode_into(&mut buf);
        buf
    }

    /// Encode header into the first [`HEADER_SIZE`] bytes of `buf`.
    ///
    /// # Panics
    ///
    /// Panics if `buf` is shorter than [`HEADER_SIZE`].
    pub fn encode_into(&self, buf: &mut [u8]) {
        buf[0] = self.frame_type as u8 & FRAME_TYPE_MASK;
        buf[1] = ((self.options & OPTIONS_MASK) << 4) | (self.algorithm & ALGORITHM_MASK);
        buf[2..4].copy_from_slice(&self.frame_id.to_be_bytes());
    }

    /// Decode a header from the start of `buf`.
    pub fn decode(buf: &[u8]) -> Result<Self> {
        if buf.len() < HEADER_SIZE {
            return Err(Error::TruncatedPacket(buf.len()));
        }
        Ok(Self {
            frame_type: FrameType::from_wire(buf[0])?,
            algorithm: buf[1] & ALGORITHM_MASK,
            options: buf[1] >> 4,
            frame_id: u16::from_be_bytes([buf[2], buf[3]]),
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
