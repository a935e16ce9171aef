// Sliding-window delta decode success ratio.
//
// A circular history of the last K delta lookups, seeded all-success, plus a
// running count of successes. The count is atomic so readers never take the
// history lock.

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

use crate::error::{Error, Result};

/// Default history length.
pub const DEFAULT_STATS_WINDOW: usize = 100;

struct History {
    outcomes: Box<[bool]>,
    cursor: usize,
}

/// Success ratio of delta-frame reference lookups, shared across decoders.
pub struct DecoderStats {
    history: Mutex<History>,
    delivered: AtomicUsize,
    window: usize,
}

impl DecoderStats {
    pub fn new(window: usize) -> Result<Self> {
        if window == 0 {
            return Err(Error::Configuration(
                "decoder stats window must be at least 1".into(),
            ));
        }
        Ok(Self {
            history: Mutex::new(History {
                outcomes: vec![true; window].into_boxed_slice(),
                cursor: 0,
            }),
            delivered: AtomicUsize::new(window),
            window,
        })
    }

    /// Record one lookup outcome, overwriting the oldest.
    pub fn record(&self, success: bool) {
        let mut history = self.history.lock().unwrap_or_else(PoisonError::into_inner);
        let cursor = history.cursor;
        if history.outcomes[cursor] != success {
            history.outcomes[cursor] = success;
            if success {
                self.delivered.fetch_add(1, Ordering::AcqRel);
            } else {
                self.delivered.fetch_sub(1, Ordering::AcqRel);
            }
        }
        history.cursor = (cursor + 1) % self.window;
    }

    /// Successes in the window, divided by the window length.
    pub fn success_ratio(&self) -> f64 {
        self.delivered.load(Ordering::Acquire) as f64 / self.window as f64
    }

    pub fn window(&self) -> usize {
        self.window
    }
}

impl Default for DecoderStats {
    fn default() -> Self {
        Self::new(DEFAULT_STATS_WINDOW).expect("default window is nonzero")
    }
}

impl fmt::Debug for DecoderStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecoderStats")
            .field("window", &self.window)
            .field("success_ratio", &self.success_ratio())
            .finish()
    }
}
