// Keyframe caches shared by the encoder and decoder sides.
//
// Both caches hold the N most recently inserted keyframes in strict insertion
// order. An evicted keyframe's buffer is released before its slot is reused.

pub mod receiver;
pub mod ring;
pub mod sender;

pub use receiver::KeyframeCache;
pub use ring::Ring;
pub use sender::{ConfidenceCache, Reference};
