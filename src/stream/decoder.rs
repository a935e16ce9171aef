// Per-stream decoder.
//
// Keyframes are decompressed, cached under their frame id, and handed back.
// Delta frames are decompressed and XORed against the cached keyframe their
// header names; the cached bytes are never modified.

use std::sync::Arc;

use crate::cache::KeyframeCache;
use crate::config::EndpointConfig;
use crate::error::{Error, Result};
use crate::packet::{FrameType, HEADER_SIZE, Header};
use crate::pool::{Buffer, BufferPool};
use crate::stream::stats::DecoderStats;
use crate::xor;

/// Receiver half of one stream. Not shareable; serialize calls per stream.
#[derive(Debug)]
pub struct Decoder {
    pool: BufferPool,
    cache: KeyframeCache,
    stats: Option<Arc<DecoderStats>>,

    frames_decoded: u64,
    missing_references: u64,
}

impl Decoder {
    /// Create a decoder drawing buffers from `pool`, optionally reporting
    /// delta lookups to `stats`.
    pub fn new(
        pool: BufferPool,
        config: &EndpointConfig,
        stats: Option<Arc<DecoderStats>>,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            pool,
            cache: KeyframeCache::new(config.cache_slots),
            stats,
            frames_decoded: 0,
            missing_references: 0,
        })
    }

    /// Decode one packet into its payload.
    ///
    /// A keyframe payload is shared with the cache, so the returned buffer
    /// must not be mutated. A delta payload is a fresh buffer.
    pub fn decode(&mut self, packet: &[u8]) -> Result<Buffer> {
        let header = Header::decode(packet)?;
        let mut codec = header.algorithm()?.codec();
        codec.set_options(header.options);

        let mut payload = self.pool.acquire();
        let limit = payload.capacity();
        let out = payload.bytes_mut();
        out.clear();
        codec
            .decompress(&packet[HEADER_SIZE..], out, limit)
            .map_err(Error::Decompression)?;

        match header.frame_type {
            FrameType::Keyframe => {
                log::trace!("keyframe {}: {} bytes", header.frame_id, payload.len());
                self.cache.put(header.frame_id, payload.add_owner());
                self.frames_decoded += 1;
                Ok(payload)
            }
            FrameType::DeltaFrame => {
                let reference = self.cache.get(header.frame_id);
                if let Some(stats) = &self.stats {
                    stats.record(reference.is_some());
                }
                let Some(reference) = reference else {
                    self.missing_references += 1;
                    log::warn!(
                        "delta frame references keyframe {} which is not cached",
                        header.frame_id
                    );
                    return Err(Error::MissingReference(header.frame_id));
                };

                let mut data = self.pool.acquire();
                xor::xor(&reference, &payload, &mut data)?;
                self.frames_decoded += 1;
                Ok(data)
            }
        }
    }

    pub fn stats(&self) -> Option<&Arc<DecoderStats>> {
        self.stats.as_ref()
    }

    pub fn frames_decoded(&self) -> u64 {
        self.frames_decoded
    }

    /// Delta frames rejected for want of their keyframe.
    pub fn missing_references(&self) -> u64 {
        self.missing_references
    }

    pub fn cached_keyframes(&self) -> usize {
        self.cache.len()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
