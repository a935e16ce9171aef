// Per-stream encoder.
//
// Every call produces either a keyframe (the compressed payload, cached under
// the current frame id) or a delta frame (the compressed XOR of the payload
// against the most confident recent keyframe, labelled with that keyframe's
// id). The frame id advances exactly once per call.
//
// Cadence is either fixed (a keyframe whenever `id % N == 0`) or adaptive,
// where a delta is kept only while its packet stays below the running average
// since the last keyframe. Either way a stream starts with a keyframe, even
// when its first attempt failed and the id moved on.

use crate::cache::ConfidenceCache;
use crate::compress::{Compression, Scratch};
use crate::config::EndpointConfig;
use crate::error::{Error, Result};
use crate::packet::{FrameType, HEADER_SIZE, Header, Packet};
use crate::pool::{Buffer, BufferPool, resource_misuse};
use crate::stream::adaptive::AdaptiveCycle;
use crate::xor;

/// Sender half of one stream. Not shareable; serialize calls per stream.
#[derive(Debug)]
pub struct Encoder {
    pool: BufferPool,
    cache: ConfidenceCache,
    scratch: Scratch,
    next_id: u16,
    /// 0 = adaptive.
    cycle_length: u16,
    lookback: usize,
    compression: Compression,
    options: u8,
    adaptive: AdaptiveCycle,

    frames_encoded: u64,
    keyframes_sent: u64,
    deltas_sent: u64,
    bytes_out: u64,
}

impl Encoder {
    /// Create an encoder drawing buffers from `pool`.
    pub fn new(pool: BufferPool, config: &EndpointConfig) -> Result<Self> {
        config.validate()?;
        let cycle_length = u16::try_from(config.cycle_length).map_err(|_| {
            Error::Configuration(format!("cycle length {} exceeds 16 bits", config.cycle_length))
        })?;

        Ok(Self {
            pool,
            cache: ConfidenceCache::new(config.cache_slots),
            scratch: Scratch::new(),
            next_id: 0,
            cycle_length,
            lookback: config.confidence_lookback,
            compression: config.compression,
            options: config.options(),
            adaptive: AdaptiveCycle::new(),
            frames_encoded: 0,
            keyframes_sent: 0,
            deltas_sent: 0,
            bytes_out: 0,
        })
    }

    /// Encode one payload.
    ///
    /// The payload buffer is consumed: a keyframe keeps it in the cache, a
    /// delta frame releases it once the difference is compressed.
    /// `confidence` ranks this payload as a future delta reference should it
    /// become a keyframe.
    ///
    /// Delta frames are XOR differences, so they only pay off for payloads
    /// whose bytes line up at the same offsets from frame to frame. A payload
    /// sent as a delta frame loses any trailing zero bytes on reconstruction.
    pub fn encode(&mut self, payload: Buffer, confidence: u8) -> Result<Packet> {
        let id = self.next_id;
        self.next_id = id.wrapping_add(1);
        self.frames_encoded += 1;

        let max_payload = self.pool.capacity().saturating_sub(HEADER_SIZE);
        if payload.len() > max_payload {
            return Err(Error::InvalidLength {
                length: payload.len(),
                capacity: max_payload,
            });
        }

        let packet = if self.cycle_length != 0 {
            if id % self.cycle_length == 0 || self.cache.is_empty() {
                self.keyframe(id, payload, confidence)?
            } else {
                let packet = self.delta(id, &payload)?;
                self.deltas_sent += 1;
                packet
            }
        } else if self.adaptive.is_first() {
            let packet = self.keyframe(id, payload, confidence)?;
            self.adaptive.keyframe_sent(packet.len());
            packet
        } else {
            let candidate = self.delta(id, &payload)?;
            if self.adaptive.accepts(candidate.len()) {
                self.adaptive.delta_sent(candidate.len());
                self.deltas_sent += 1;
                candidate
            } else {
                log::debug!(
                    "frame {id}: delta of {} bytes not below average {:.1}, resending keyframe",
                    candidate.len(),
                    self.adaptive.average().unwrap_or_default()
                );
                drop(candidate);
                let packet = self.keyframe(id, payload, confidence)?;
                self.adaptive.keyframe_sent(packet.len());
                packet
            }
        };

        self.bytes_out += packet.len() as u64;
        Ok(packet)
    }

    fn keyframe(&mut self, id: u16, payload: Buffer, confidence: u8) -> Result<Packet> {
        let compressed = self
            .compression
            .compress(&payload, self.options, &mut self.scratch)
            .map_err(Error::Compression)?;
        let header = Header::new(
            FrameType::Keyframe,
            compressed.algorithm,
            compressed.options,
            id,
        );
        let packet = Packet::assemble(&self.pool, header, compressed.bytes)?;
        log::debug!(
            "frame {id}: keyframe, {} -> {} bytes ({})",
            payload.len(),
            packet.len(),
            compressed.algorithm
        );

        self.cache.put(id, confidence, payload);
        self.keyframes_sent += 1;
        Ok(packet)
    }

    fn delta(&mut self, id: u16, payload: &[u8]) -> Result<Packet> {
        let reference = match self.cache.most_confident(self.lookback)? {
            Some(reference) => reference,
            None => resource_misuse("delta frame requested with no cached keyframe"),
        };

        let mut diff = self.pool.acquire();
        xor::xor(&reference.buffer, payload, &mut diff)?;

        let compressed = self
            .compression
            .compress(&diff, self.options, &mut self.scratch)
            .map_err(Error::Compression)?;
        let header = Header::new(
            FrameType::DeltaFrame,
            compressed.algorithm,
            compressed.options,
            reference.id,
        );
        let packet = Packet::assemble(&self.pool, header, compressed.bytes)?;
        log::debug!(
            "frame {id}: delta against {} (confidence {}), {} -> {} bytes ({})",
            reference.id,
            reference.confidence,
            diff.len(),
            packet.len(),
            compressed.algorithm
        );
        Ok(packet)
    }

    /// Id the next keyframe would carry.
    pub fn next_frame_id(&self) -> u16 {
        self.next_id
    }

    pub fn frames_encoded(&self) -> u64 {
        self.frames_encoded
    }

    pub fn keyframes_sent(&self) -> u64 {
        self.keyframes_sent
    }

    pub fn deltas_sent(&self) -> u64 {
        self.deltas_sent
    }

    /// Packet bytes produced, headers included.
    pub fn bytes_out(&self) -> u64 {
        self.bytes_out
    }

    pub fn cached_keyframes(&self) -> usize {
        self.cache.len()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
