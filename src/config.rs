// Endpoint configuration.

use crate::compress::{Compression, OPTIONS_MASK};
use crate::error::{Error, Result};
use crate::packet::HEADER_SIZE;
use crate::stream::stats::DEFAULT_STATS_WINDOW;

/// Default maximum packet size, header included.
pub const DEFAULT_MAX_PACKET_SIZE: usize = 1379;
/// Default keyframe cadence: one keyframe every 4 frames.
pub const DEFAULT_CYCLE_LENGTH: u32 = 4;
/// Default number of recent keyframes considered as delta references.
pub const DEFAULT_CONFIDENCE_LOOKBACK: usize = 4;
/// Default keyframe cache slots per stream.
pub const DEFAULT_CACHE_SLOTS: usize = 32;

// ---------------------------------------------------------------------------
// EndpointConfig
// ---------------------------------------------------------------------------

/// Settings shared by every encoder and decoder of an endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct EndpointConfig {
    /// Buffer pool capacity; the largest packet, header included.
    pub max_packet_size: usize,
    /// Fixed algorithm or best-fit search.
    pub compression: Compression,
    /// Compression level (0 = codec default, 1-9). Carried in the header
    /// options nibble.
    pub level: u8,
    /// Frames per keyframe cycle; 0 selects adaptive cadence.
    pub cycle_length: u32,
    /// Recent keyframes considered when picking a delta reference.
    pub confidence_lookback: usize,
    /// Keyframe cache slots per stream, on both sides.
    pub cache_slots: usize,
    /// Decoder stats history length.
    pub stats_window: usize,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            max_packet_size: DEFAULT_MAX_PACKET_SIZE,
            compression: Compression::Auto,
            level: 0,
            cycle_length: DEFAULT_CYCLE_LENGTH,
            confidence_lookback: DEFAULT_CONFIDENCE_LOOKBACK,
            cache_slots: DEFAULT_CACHE_SLOTS,
            stats_window: DEFAULT_STATS_WINDOW,
        }
    }
}

impl EndpointConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_packet_size(mut self, max_packet_size: usize) -> Self {
        self.max_packet_size = max_packet_size;
        self
    }

    pub fn with_compression(mut self, compression: Compression) -> Self {
        self.compression = compression;
        self
    }

    pub fn with_level(mut self, level: u8) -> Self {
        self.level = level;
        self
    }

    pub fn with_cycle_length(mut self, cycle_length: u32) -> Self {
        self.cycle_length = cycle_length;
        self
    }

    pub fn with_confidence_lookback(mut self, confidence_lookback: usize) -> Self {
        self.confidence_lookback = confidence_lookback;
        self
    }

    pub fn with_cache_slots(mut self, cache_slots: usize) -> Self {
        self.cache_slots = cache_slots;
        self
    }

    pub fn with_stats_window(mut self, stats_window: usize) -> Self {
        self.stats_window = stats_window;
        self
    }

    /// Largest payload the endpoint accepts for encoding.
    pub fn max_payload_size(&self) -> usize {
        self.max_packet_size.saturating_sub(HEADER_SIZE)
    }

    /// Adaptive cadence is selected.
    pub fn is_adaptive(&self) -> bool {
        self.cycle_length == 0
    }

    /// Level as the 4-bit header options value.
    pub(crate) fn options(&self) -> u8 {
        self.level & OPTIONS_MASK
    }

    /// Check every setting, naming the first one out of range.
    pub fn validate(&self) -> Result<()> {
        if self.max_packet_size <= HEADER_SIZE {
            return Err(invalid(format!(
                "max packet size {} must exceed the {HEADER_SIZE}-byte header",
                self.max_packet_size
            )));
        }
        if self.level > 9 {
            return Err(invalid(format!(
                "compression level {} out of range 0-9",
                self.level
            )));
        }
        if self.cycle_length > u32::from(u16::MAX) {
            return Err(invalid(format!(
                "cycle length {} exceeds {}",
                self.cycle_length,
                u16::MAX
            )));
        }
        if self.cache_slots == 0 {
            return Err(invalid("cache slots must be at least 1".into()));
        }
        if self.confidence_lookback == 0 {
            return Err(invalid("confidence lookback must be at least 1".into()));
        }
        if self.confidence_lookback > self.cache_slots {
            return Err(invalid(format!(
                "confidence lookback {} exceeds cache slots {}",
                self.confidence_lookback, self.cache_slots
            )));
        }
        if self.stats_window == 0 {
            return Err(invalid("stats window must be at least 1".into()));
        }
        Ok(())
    }
}

fn invalid(message: String) -> Error {
    Error::Configuration(message)
}
