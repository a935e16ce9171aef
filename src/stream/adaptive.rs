// Adaptive keyframe cadence.
//
// Tracks the average packet size since the last keyframe. A delta candidate
// is worth sending only while it stays strictly below that average; once it
// does not, the encoder resets with a fresh keyframe.

/// Running packet-size average since the last keyframe.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AdaptiveCycle {
    total: usize,
    count: usize,
}

impl AdaptiveCycle {
    pub fn new() -> Self {
        Self::default()
    }

    /// No frame has been sent on this stream yet.
    #[inline]
    pub fn is_first(&self) -> bool {
        self.count == 0
    }

    /// Restart the average from a keyframe of `size` bytes.
    pub fn keyframe_sent(&mut self, size: usize) {
        self.total = size;
        self.count = 1;
    }

    pub fn delta_sent(&mut self, size: usize) {
        self.total += size;
        self.count += 1;
    }

    /// Whether a delta of `size` bytes beats the running average.
    ///
    /// The average is truncated to whole bytes before comparing.
    pub fn accepts(&self, size: usize) -> bool {
        self.count > 0 && size < self.total / self.count
    }

    /// Current average in bytes, or `None` before the first frame.
    pub fn average(&self) -> Option<f64> {
        (self.count > 0).then(|| self.total as f64 / self.count as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_until_a_keyframe_is_sent() {
        let mut cycle = AdaptiveCycle::new();
        assert!(cycle.is_first());
        assert!(!cycle.accepts(0));
        cycle.keyframe_sent(100);
        assert!(!cycle.is_first());
        assert_eq!(cycle.average(), Some(100.0));
    }

    #[test]
    fn deltas_below_average_are_accepted() {
        let mut cycle = AdaptiveCycle::new();
        cycle.keyframe_sent(100);
        assert!(cycle.accepts(20));
        cycle.delta_sent(20);
        // average 60
        assert!(cycle.accepts(59));
        assert!(!cycle.accepts(60));
        cycle.delta_sent(59);
        // 179 / 3 truncates to 59
        assert!(!cycle.accepts(59));
        assert!(cycle.accepts(58));
    }

    #[test]
    fn keyframe_resets_the_average() {
        let mut cycle = AdaptiveCycle::new();
        cycle.keyframe_sent(100);
        cycle.delta_sent(10);
        cycle.delta_sent(10);
        cycle.keyframe_sent(30);
        assert_eq!(cycle.average(), Some(30.0));
        assert!(!cycle.accepts(30));
        assert!(cycle.accepts(29));
    }
}
