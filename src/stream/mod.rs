// Per-stream encoder/decoder state machines and their helpers.

pub mod adaptive;
pub mod decoder;
pub mod encoder;
pub mod stats;

pub use adaptive::AdaptiveCycle;
pub use decoder::Decoder;
pub use encoder::Encoder;
pub use stats::{DEFAULT_STATS_WINDOW, DecoderStats};
