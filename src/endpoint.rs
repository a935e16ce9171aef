// Endpoint: many named streams over one buffer pool.
//
// Each stream gets its own encoder and decoder, created on first use. The
// stream maps sit behind one lock and each encoder/decoder behind its own,
// so different streams proceed in parallel while calls on one stream
// serialize. All decoders report to one shared `DecoderStats`.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use crate::config::EndpointConfig;
use crate::error::{Error, Result};
use crate::packet::Packet;
use crate::pool::{Buffer, BufferPool};
use crate::stream::{Decoder, DecoderStats, Encoder};

#[derive(Default)]
struct Streams {
    encoders: HashMap<String, Arc<Mutex<Encoder>>>,
    decoders: HashMap<String, Arc<Mutex<Decoder>>>,
}

/// Encoder and decoder side of any number of named streams.
pub struct Endpoint {
    config: EndpointConfig,
    pool: BufferPool,
    stats: Arc<DecoderStats>,
    streams: Mutex<Streams>,
}

impl Endpoint {
    pub fn new(config: EndpointConfig) -> Result<Self> {
        config.validate()?;
        let pool = BufferPool::new(config.max_packet_size);
        let stats = Arc::new(DecoderStats::new(config.stats_window)?);
        log::debug!(
            "endpoint: max packet {} bytes, compression {}, cycle length {}",
            config.max_packet_size,
            config.compression,
            config.cycle_length
        );
        Ok(Self {
            config,
            pool,
            stats,
            streams: Mutex::new(Streams::default()),
        })
    }

    /// Encode a copy of `data` on `stream`.
    ///
    /// `data` may be at most `max_packet_size - 4` bytes.
    pub fn encode(&self, stream: &str, data: &[u8], confidence: u8) -> Result<Packet> {
        let capacity = self.config.max_payload_size();
        if data.len() > capacity {
            return Err(Error::InvalidLength {
                length: data.len(),
                capacity,
            });
        }
        let mut payload = self.pool.acquire();
        payload.copy_from_slice(data)?;
        self.encode_buffer(stream, payload, confidence)
    }

    /// Encode a pool buffer on `stream`, taking ownership of it.
    pub fn encode_buffer(&self, stream: &str, payload: Buffer, confidence: u8) -> Result<Packet> {
        let encoder = self.encoder(stream)?;
        let mut encoder = encoder.lock().unwrap_or_else(PoisonError::into_inner);
        encoder.encode(payload, confidence)
    }

    /// Decode a packet received on `stream`.
    pub fn decode(&self, stream: &str, packet: &[u8]) -> Result<Buffer> {
        let decoder = self.decoder(stream)?;
        let mut decoder = decoder.lock().unwrap_or_else(PoisonError::into_inner);
        decoder.decode(packet)
    }

    fn encoder(&self, stream: &str) -> Result<Arc<Mutex<Encoder>>> {
        let mut streams = self.streams.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(encoder) = streams.encoders.get(stream) {
            return Ok(Arc::clone(encoder));
        }
        log::debug!("stream {stream:?}: new encoder");
        let encoder = Arc::new(Mutex::new(Encoder::new(self.pool.clone(), &self.config)?));
        streams
            .encoders
            .insert(stream.to_owned(), Arc::clone(&encoder));
        Ok(encoder)
    }

    fn decoder(&self, stream: &str) -> Result<Arc<Mutex<Decoder>>> {
        let mut streams = self.streams.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(decoder) = streams.decoders.get(stream) {
            return Ok(Arc::clone(decoder));
        }
        log::debug!("stream {stream:?}: new decoder");
        let decoder = Decoder::new(
            self.pool.clone(),
            &self.config,
            Some(Arc::clone(&self.stats)),
        )?;
        let decoder = Arc::new(Mutex::new(decoder));
        streams
            .decoders
            .insert(stream.to_owned(), Arc::clone(&decoder));
        Ok(decoder)
    }

    /// Delta lookup success ratio across every stream decoded here.
    pub fn stats(&self) -> &Arc<DecoderStats> {
        &self.stats
    }

    pub fn config(&self) -> &EndpointConfig {
        &self.config
    }

    /// Pool shared by every stream; sized to `max_packet_size`.
    pub fn pool(&self) -> &BufferPool {
        &self.pool
    }
}

impl std::fmt::Debug for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let streams = self.streams.lock().unwrap_or_else(PoisonError::into_inner);
        f.debug_struct("Endpoint")
            .field("config", &self.config)
            .field("encoders", &streams.encoders.len())
            .field("decoders", &streams.decoders.len())
            .field("pool", &self.pool)
            .finish()
    }
}
