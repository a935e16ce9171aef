// Compression registry.
//
// - `codec`  - closed set of algorithms (None, Flate, Gzip, LZW, Zlib)
// - `select` - fixed-or-auto choice and the exhaustive best-fit search

pub mod codec;
pub mod select;

pub use codec::{Algorithm, Codec, OPTIONS_MASK};
pub use select::{AUTO_ID, Compressed, Compression, Scratch, best_fit, compress_with};
