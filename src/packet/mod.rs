// Packets: a 4-byte frame header followed by the compressed payload, held in
// one pooled buffer.

pub mod header;

use std::fmt;
use std::io;

pub use header::{FrameType, HEADER_SIZE, Header};

use crate::error::{Error, Result};
use crate::pool::{Buffer, BufferPool};

/// One encoded frame, ready to hand to a transport.
pub struct Packet {
    header: Header,
    buffer: Buffer,
}

impl Packet {
    /// Write `header` and `payload` into a fresh pool buffer.
    ///
    /// Fails with `Compression` when the frame does not fit the pool's
    /// packet capacity.
    pub fn assemble(pool: &BufferPool, header: Header, payload: &[u8]) -> Result<Self> {
        let length = HEADER_SIZE + payload.len();
        if length > pool.capacity() {
            return Err(Error::Compression(io::Error::other(format!(
                "frame of {length} bytes exceeds max packet size {}",
                pool.capacity()
            ))));
        }

        let mut buffer = pool.acquire();
        buffer.resize(length)?;
        let bytes = buffer.as_mut_slice();
        header.encode_into(&mut bytes[..HEADER_SIZE]);
        bytes[HEADER_SIZE..].copy_from_slice(payload);

        Ok(Self { header, buffer })
    }

    #[inline]
    pub fn header(&self) -> Header {
        self.header
    }

    #[inline]
    pub fn frame_type(&self) -> FrameType {
        self.header.frame_type
    }

    /// Header plus payload, as sent on the wire.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        self.buffer.as_slice()
    }

    /// Compressed payload after the header.
    #[inline]
    pub fn payload(&self) -> &[u8] {
        &self.buffer.as_slice()[HEADER_SIZE..]
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Give up the packet framing and keep the underlying buffer.
    pub fn into_buffer(self) -> Buffer {
        self.buffer
    }
}

impl AsRef<[u8]> for Packet {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl fmt::Debug for Packet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Packet")
            .field("header", &self.header)
            .field("len", &self.len())
            .finish()
    }
}
