// Compression codecs.
//
// The algorithm set is closed: five variants with fixed wire ids. Each variant
// hands out a fresh `Codec` handle per call, so the registry itself holds no
// mutable state and can be shared across threads.
//
//   ID 0 = None   (passthrough)
//   ID 1 = Flate  (raw deflate, via flate2)
//   ID 2 = Gzip   (via flate2)
//   ID 3 = LZW    (MSB bit order, 8-bit literals, via weezl)
//   ID 4 = Zlib   (via flate2)
//
// The 4-bit header options are a compression level for the deflate family.

use std::fmt;
use std::io::{self, Read, Write};

use crate::error::{Error, Result};

/// Mask for the 4-bit options nibble.
pub const OPTIONS_MASK: u8 = 0x0F;

/// LZW literal width.
const LZW_LITERAL_BITS: u8 = 8;

// ---------------------------------------------------------------------------
// Algorithm
// ---------------------------------------------------------------------------

/// A registered compression algorithm, identified on the wire by its id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum Algorithm {
    None = 0,
    Flate = 1,
    Gzip = 2,
    Lzw = 3,
    Zlib = 4,
}

impl Algorithm {
    /// Every registered algorithm in ascending id order.
    ///
    /// Best-fit search walks this table, so the order decides ties.
    pub const ALL: [Algorithm; 5] = [
        Algorithm::None,
        Algorithm::Flate,
        Algorithm::Gzip,
        Algorithm::Lzw,
        Algorithm::Zlib,
    ];

    /// Wire id (low nibble of header byte 1).
    #[inline]
    pub const fn id(self) -> u8 {
        self as u8
    }

    /// Look up a registered algorithm by wire id.
    pub fn from_id(id: u8) -> Result<Self> {
        match id {
            0 => Ok(Self::None),
            1 => Ok(Self::Flate),
            2 => Ok(Self::Gzip),
            3 => Ok(Self::Lzw),
            4 => Ok(Self::Zlib),
            _ => Err(Error::UnknownAlgorithm(id)),
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Flate => "flate",
            Self::Gzip => "gzip",
            Self::Lzw => "lzw",
            Self::Zlib => "zlib",
        }
    }

    /// Fresh codec handle with default options.
    pub fn codec(self) -> Box<dyn Codec> {
        match self {
            Self::None => Box::new(NoCompression),
            Self::Flate => Box::new(DeflateCodec::new(DeflateFormat::Raw)),
            Self::Gzip => Box::new(DeflateCodec::new(DeflateFormat::Gzip)),
            Self::Lzw => Box::new(LzwCodec),
            Self::Zlib => Box::new(DeflateCodec::new(DeflateFormat::Zlib)),
        }
    }
}

impl TryFrom<u8> for Algorithm {
    type Error = Error;

    fn try_from(id: u8) -> Result<Self> {
        Self::from_id(id)
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// Codec trait
// ---------------------------------------------------------------------------

/// One compressor/decompressor handle.
///
/// Implementations append to `out` and never read what was already there.
pub trait Codec: Send {
    fn algorithm(&self) -> Algorithm;

    /// Compress `data`, appending the encoded stream to `out`.
    fn compress(&self, data: &[u8], out: &mut Vec<u8>) -> io::Result<()>;

    /// Decompress `data`, appending at most `limit` bytes to `out`.
    ///
    /// Output that would exceed `limit` is an `InvalidData` error.
    fn decompress(&self, data: &[u8], out: &mut Vec<u8>, limit: usize) -> io::Result<()>;

    /// Options nibble to record in the frame header.
    fn options(&self) -> u8 {
        0
    }

    /// Apply an options nibble read from a frame header (or from config).
    fn set_options(&mut self, _options: u8) {}
}

// ---------------------------------------------------------------------------
// Bounded output
// ---------------------------------------------------------------------------

/// Writer that refuses to grow `out` by more than `remaining` bytes.
struct Limited<'a> {
    out: &'a mut Vec<u8>,
    remaining: usize,
}

impl<'a> Limited<'a> {
    fn new(out: &'a mut Vec<u8>, limit: usize) -> Self {
        Self {
            out,
            remaining: limit,
        }
    }
}

impl Write for Limited<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if buf.len() > self.remaining {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                "decompressed frame exceeds buffer capacity",
            ));
        }
        self.out.extend_from_slice(buf);
        self.remaining -= buf.len();
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// No-compression codec
// ---------------------------------------------------------------------------

/// Passthrough "compressor".
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCompression;

impl Codec for NoCompression {
    fn algorithm(&self) -> Algorithm {
        Algorithm::None
    }

    fn compress(&self, data: &[u8], out: &mut Vec<u8>) -> io::Result<()> {
        out.extend_from_slice(data);
        Ok(())
    }

    fn decompress(&self, data: &[u8], out: &mut Vec<u8>, limit: usize) -> io::Result<()> {
        Limited::new(out, limit).write_all(data)
    }
}

// ---------------------------------------------------------------------------
// Deflate family (Flate / Gzip / Zlib)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DeflateFormat {
    Raw,
    Gzip,
    Zlib,
}

/// Flate, Gzip, or Zlib codec. Options carry the compression level.
#[derive(Debug, Clone, Copy)]
pub struct DeflateCodec {
    format: DeflateFormat,
    options: u8,
}

impl DeflateCodec {
    fn new(format: DeflateFormat) -> Self {
        Self { format, options: 0 }
    }

    /// Level 0 in the header means "this format's default".
    fn level(&self) -> flate2::Compression {
        match (self.options, self.format) {
            (0, DeflateFormat::Gzip) => flate2::Compression::default(),
            (0, _) => flate2::Compression::best(),
            (n, _) => flate2::Compression::new(u32::from(n.min(9))),
        }
    }
}

impl Codec for DeflateCodec {
    fn algorithm(&self) -> Algorithm {
        match self.format {
            DeflateFormat::Raw => Algorithm::Flate,
            DeflateFormat::Gzip => Algorithm::Gzip,
            DeflateFormat::Zlib => Algorithm::Zlib,
        }
    }

    fn compress(&self, data: &[u8], out: &mut Vec<u8>) -> io::Result<()> {
        use flate2::write::{DeflateEncoder, GzEncoder, ZlibEncoder};

        let level = self.level();
        match self.format {
            DeflateFormat::Raw => {
                let mut encoder = DeflateEncoder::new(out, level);
                encoder.write_all(data)?;
                encoder.finish()?;
            }
            DeflateFormat::Gzip => {
                let mut encoder = GzEncoder::new(out, level);
                encoder.write_all(data)?;
                encoder.finish()?;
            }
            DeflateFormat::Zlib => {
                let mut encoder = ZlibEncoder::new(out, level);
                encoder.write_all(data)?;
                encoder.finish()?;
            }
        }
        Ok(())
    }

    fn decompress(&self, data: &[u8], out: &mut Vec<u8>, limit: usize) -> io::Result<()> {
        use flate2::read::{DeflateDecoder, GzDecoder, ZlibDecoder};

        let mut sink = Limited::new(out, limit);
        let mut reader: Box<dyn Read + '_> = match self.format {
            DeflateFormat::Raw => Box::new(DeflateDecoder::new(data)),
            DeflateFormat::Gzip => Box::new(GzDecoder::new(data)),
            DeflateFormat::Zlib => Box::new(ZlibDecoder::new(data)),
        };
        io::copy(&mut reader, &mut sink)?;
        Ok(())
    }

    fn options(&self) -> u8 {
        self.options
    }

    fn set_options(&mut self, options: u8) {
        self.options = options & OPTIONS_MASK;
    }
}

// ---------------------------------------------------------------------------
// LZW
// ---------------------------------------------------------------------------

/// LZW codec, most-significant-bit first with 8-bit literals.
#[derive(Debug, Clone, Copy, Default)]
pub struct LzwCodec;

impl Codec for LzwCodec {
    fn algorithm(&self) -> Algorithm {
        Algorithm::Lzw
    }

    fn compress(&self, data: &[u8], out: &mut Vec<u8>) -> io::Result<()> {
        let mut encoder = weezl::encode::Encoder::new(weezl::BitOrder::Msb, LZW_LITERAL_BITS);
        encoder.into_stream(out).encode_all(data).status
    }

    fn decompress(&self, data: &[u8], out: &mut Vec<u8>, limit: usize) -> io::Result<()> {
        let mut decoder = weezl::decode::Decoder::new(weezl::BitOrder::Msb, LZW_LITERAL_BITS);
        let mut sink = Limited::new(out, limit);
        decoder.into_stream(&mut sink).decode_all(data).status
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const LIPSUM: &[u8] = b"Lorem ipsum dolor sit amet, consectetur adipiscing elit, sed do \
        eiusmod tempor incididunt ut labore et dolore magna aliqua. Ut enim ad minim veniam, \
        quis nostrud exercitation ullamco laboris nisi ut aliquip ex ea commodo consequat.";

    fn roundtrip(codec: &dyn Codec, data: &[u8]) -> Vec<u8> {
        let mut compressed = Vec::new();
        codec.compress(data, &mut compressed).unwrap();
        let mut decompressed = Vec::new();
        codec
            .decompress(&compressed, &mut decompressed, data.len())
            .unwrap();
        decompressed
    }

    #[test]
    fn every_algorithm_roundtrips() {
        for algorithm in Algorithm::ALL {
            let codec = algorithm.codec();
            assert_eq!(codec.algorithm(), algorithm);
            assert_eq!(roundtrip(codec.as_ref(), LIPSUM), LIPSUM, "{algorithm}");
        }
    }

    #[test]
    fn every_algorithm_roundtrips_empty_input() {
        for algorithm in Algorithm::ALL {
            let codec = algorithm.codec();
            assert!(roundtrip(codec.as_ref(), b"").is_empty(), "{algorithm}");
        }
    }

    #[test]
    fn ids_are_ascending_and_resolvable() {
        for (i, algorithm) in Algorithm::ALL.iter().enumerate() {
            assert_eq!(algorithm.id() as usize, i);
            assert_eq!(Algorithm::from_id(algorithm.id()).unwrap(), *algorithm);
        }
    }

    #[test]
    fn unknown_id_rejected() {
        for id in [5u8, 14, 15, 0xFF] {
            assert!(matches!(
                Algorithm::from_id(id),
                Err(Error::UnknownAlgorithm(got)) if got == id
            ));
        }
    }

    #[test]
    fn repetitive_data_shrinks() {
        let data: Vec<u8> = LIPSUM.iter().copied().cycle().take(4096).collect();
        for algorithm in [Algorithm::Flate, Algorithm::Gzip, Algorithm::Lzw, Algorithm::Zlib] {
            let mut compressed = Vec::new();
            algorithm.codec().compress(&data, &mut compressed).unwrap();
            assert!(compressed.len() < data.len() / 2, "{algorithm}");
        }
    }

    #[test]
    fn decompress_respects_limit() {
        let data = vec![7u8; 1000];
        for algorithm in Algorithm::ALL {
            let codec = algorithm.codec();
            let mut compressed = Vec::new();
            codec.compress(&data, &mut compressed).unwrap();
            let mut out = Vec::new();
            let err = codec.decompress(&compressed, &mut out, 999).unwrap_err();
            assert_eq!(err.kind(), io::ErrorKind::InvalidData, "{algorithm}");
        }
    }

    #[test]
    fn corrupt_zlib_and_gzip_rejected() {
        for algorithm in [Algorithm::Gzip, Algorithm::Zlib] {
            let codec = algorithm.codec();
            let mut compressed = Vec::new();
            codec.compress(LIPSUM, &mut compressed).unwrap();
            let last = compressed.len() - 1;
            compressed[last] ^= 0xFF;
            let mut out = Vec::new();
            assert!(
                codec.decompress(&compressed, &mut out, 4096).is_err(),
                "{algorithm}"
            );
        }
    }

    #[test]
    fn deflate_options_select_level() {
        let mut codec = Algorithm::Zlib.codec();
        assert_eq!(codec.options(), 0);
        codec.set_options(0x13);
        assert_eq!(codec.options(), 3);
        assert_eq!(roundtrip(codec.as_ref(), LIPSUM), LIPSUM);
    }

    #[test]
    fn optionless_codecs_report_zero() {
        for algorithm in [Algorithm::None, Algorithm::Lzw] {
            let mut codec = algorithm.codec();
            codec.set_options(7);
            assert_eq!(codec.options(), 0, "{algorithm}");
        }
    }
}
