//! ICTL: incremental transfer compression for streams of related payloads.
//!
//! Periodic snapshots, telemetry records, and config blobs tend to change a
//! few bytes at a time. ICTL sends an occasional full *keyframe* and, in
//! between, *delta frames*: the XOR of the new payload against a cached
//! keyframe, compressed with whichever registered algorithm does best.
//!
//! The crate provides:
//! - A reference-counted buffer pool (`pool`)
//! - The compression registry and best-fit search (`compress`)
//! - The 4-byte packet header (`packet`)
//! - Sender and receiver keyframe caches (`cache`)
//! - Per-stream encoder/decoder state machines (`stream`)
//! - A multi-stream `Endpoint` on top of them (`endpoint`)
//! - An optional CLI (`cli` feature)
//!
//! Delta frames only help when consecutive payloads line up byte for byte
//! (fixed layouts, in-place updates); they are not a general-purpose diff.
//! A payload sent as a delta frame is reconstructed without its trailing
//! zero bytes. Keyframes always round-trip exactly.
//!
//! # Quick Start
//!
//! ```no_run
//! use ictl::{Endpoint, EndpointConfig};
//!
//! let sender = Endpoint::new(EndpointConfig::default()).unwrap();
//! let receiver = Endpoint::new(EndpointConfig::default()).unwrap();
//!
//! for reading in [b"temp=21.5;rh=40", b"temp=21.6;rh=40", b"temp=21.6;rh=41"] {
//!     let packet = sender.encode("sensor-7", reading, 0).unwrap();
//!     let payload = receiver.decode("sensor-7", packet.as_bytes()).unwrap();
//!     assert_eq!(&payload[..], reading);
//! }
//! ```

pub mod cache;
pub mod compress;
pub mod config;
pub mod endpoint;
pub mod error;
pub mod packet;
pub mod pool;
pub mod stream;
pub mod xor;

#[cfg(feature = "cli")]
pub mod cli;

pub use compress::{Algorithm, Compression};
pub use config::EndpointConfig;
pub use endpoint::Endpoint;
pub use error::{Error, Result};
pub use packet::{FrameType, Header, Packet};
pub use pool::{Buffer, BufferPool};
pub use stream::{Decoder, DecoderStats, Encoder};
