// Compression choice and exhaustive best-fit search.
//
// `Auto` compresses the input with every registered algorithm, walking
// `Algorithm::ALL` in ascending id order and keeping the first strictly
// smaller result, so ties go to the lower id and output is deterministic.
//
// Candidate output lands in a caller-owned `Scratch`, reused across frames.

use std::fmt;
use std::io;

use super::codec::{Algorithm, Codec};
use crate::error::{Error, Result};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Local-only id requesting best-fit search. Never written to the wire.
pub const AUTO_ID: u8 = 0x0F;

/// Which algorithm an encoder uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Compression {
    /// Try every algorithm, keep the smallest output.
    #[default]
    Auto,
    /// Always use one algorithm.
    Fixed(Algorithm),
}

impl Compression {
    /// Resolve a configured id: [`AUTO_ID`] or a registered algorithm id.
    pub fn from_id(id: u8) -> Result<Self> {
        if id == AUTO_ID {
            Ok(Self::Auto)
        } else {
            Algorithm::from_id(id).map(Self::Fixed)
        }
    }

    pub fn id(self) -> u8 {
        match self {
            Self::Auto => AUTO_ID,
            Self::Fixed(algorithm) => algorithm.id(),
        }
    }

    /// Compress `data` according to this choice.
    ///
    /// `options` is the requested options nibble; codecs that ignore options
    /// report 0 in the result.
    pub fn compress<'s>(
        self,
        data: &[u8],
        options: u8,
        scratch: &'s mut Scratch,
    ) -> io::Result<Compressed<'s>> {
        match self {
            Self::Auto => best_fit(data, options, scratch),
            Self::Fixed(algorithm) => compress_with(algorithm, data, options, scratch),
        }
    }
}

impl fmt::Display for Compression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Auto => f.write_str("auto"),
            Self::Fixed(algorithm) => write!(f, "{algorithm}"),
        }
    }
}

impl TryFrom<u8> for Compression {
    type Error = Error;

    fn try_from(id: u8) -> Result<Self> {
        Self::from_id(id)
    }
}

/// Reusable output space for compression.
#[derive(Debug, Default)]
pub struct Scratch {
    best: Vec<u8>,
    candidate: Vec<u8>,
}

impl Scratch {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Result of a compression call, borrowing its bytes from a [`Scratch`].
#[derive(Debug, Clone, Copy)]
pub struct Compressed<'s> {
    pub algorithm: Algorithm,
    pub options: u8,
    pub bytes: &'s [u8],
}

fn configured_codec(algorithm: Algorithm, options: u8) -> Box<dyn Codec> {
    let mut codec = algorithm.codec();
    codec.set_options(options);
    codec
}

/// Compress with one fixed algorithm.
pub fn compress_with<'s>(
    algorithm: Algorithm,
    data: &[u8],
    options: u8,
    scratch: &'s mut Scratch,
) -> io::Result<Compressed<'s>> {
    let codec = configured_codec(algorithm, options);
    scratch.best.clear();
    codec.compress(data, &mut scratch.best)?;
    Ok(Compressed {
        algorithm,
        options: codec.options(),
        bytes: &scratch.best,
    })
}

/// Compress with every registered algorithm and keep the smallest output.
pub fn best_fit<'s>(
    data: &[u8],
    options: u8,
    scratch: &'s mut Scratch,
) -> io::Result<Compressed<'s>> {
    let (algorithm, options) = search(data, options, scratch)?;
    log::trace!(
        "best fit: {algorithm} ({} -> {} bytes)",
        data.len(),
        scratch.best.len()
    );
    Ok(Compressed {
        algorithm,
        options,
        bytes: &scratch.best,
    })
}

/// One step of the search: `next` replaces `best` only when strictly smaller.
fn keep_smaller(
    best: Option<(Algorithm, usize)>,
    next: (Algorithm, usize),
) -> Option<(Algorithm, usize)> {
    match best {
        Some((_, len)) if len <= next.1 => best,
        _ => Some(next),
    }
}

/// Smallest candidate; the earliest one wins a tie.
#[cfg(any(feature = "parallel", test))]
fn smallest(candidates: impl IntoIterator<Item = (Algorithm, usize)>) -> Option<Algorithm> {
    candidates
        .into_iter()
        .fold(None, keep_smaller)
        .map(|(algorithm, _)| algorithm)
}

#[cfg(not(feature = "parallel"))]
fn search(data: &[u8], options: u8, scratch: &mut Scratch) -> io::Result<(Algorithm, u8)> {
    let mut best: Option<(Algorithm, usize)> = None;
    let mut best_options = 0;

    for algorithm in Algorithm::ALL {
        let codec = configured_codec(algorithm, options);
        scratch.candidate.clear();
        codec.compress(data, &mut scratch.candidate)?;
        log::trace!("  {algorithm}: {} bytes", scratch.candidate.len());

        best = keep_smaller(best, (algorithm, scratch.candidate.len()));
        if best.is_some_and(|(winner, _)| winner == algorithm) {
            std::mem::swap(&mut scratch.best, &mut scratch.candidate);
            best_options = codec.options();
        }
    }

    let (algorithm, _) = best.expect("algorithm table is not empty");
    Ok((algorithm, best_options))
}

#[cfg(feature = "parallel")]
fn search(data: &[u8], options: u8, scratch: &mut Scratch) -> io::Result<(Algorithm, u8)> {
    let candidates = Algorithm::ALL
        .par_iter()
        .map(|&algorithm| -> io::Result<(Algorithm, u8, Vec<u8>)> {
            let codec = configured_codec(algorithm, options);
            let mut out = Vec::new();
            codec.compress(data, &mut out)?;
            Ok((algorithm, codec.options(), out))
        })
        .collect::<io::Result<Vec<_>>>()?;

    // Collected in table order, so ties resolve as in the sequential search.
    let winner = smallest(candidates.iter().map(|(algorithm, _, out)| (*algorithm, out.len())))
        .expect("algorithm table is not empty");
    let (algorithm, options, bytes) = candidates
        .into_iter()
        .find(|(algorithm, _, _)| *algorithm == winner)
        .expect("winner is one of the candidates");
    scratch.best = bytes;
    Ok((algorithm, options))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
