//! Double-blink detection
//!
//! A deliberate double blink toggles the magnet. Single blinks are common
//! and ignored; only a second strong blink within the debounce window fires.

/// Remembers the last qualifying blink
#[derive(Debug, Clone, Default)]
pub struct BlinkDebouncer {
    /// Timestamp of the last qualifying blink; None is "infinitely old"
    last_blink_ms: Option<u64>,
}

impl BlinkDebouncer {
    pub const fn new() -> Self {
        Self {
            last_blink_ms: None,
        }
    }

    /// Feed one blink strength reading
    ///
    /// Returns true exactly when a second blink stronger than `threshold`
    /// arrives less than `window_ms` after the first. Readings at or below
    /// the threshold leave the state untouched.
    pub fn observe(&mut self, strength: u8, now_ms: u64, threshold: u8, window_ms: u64) -> bool {
        if strength <= threshold {
            return false;
        }

        match self.last_blink_ms {
            Some(last) if now_ms.saturating_sub(last) < window_ms => {
                self.last_blink_ms = None;
                true
            }
            _ => {
                self.last_blink_ms = Some(now_ms);
                false
            }
        }
    }

    /// Timestamp of the pending first blink, if any
    pub fn pending_since(&self) -> Option<u64> {
        self.last_blink_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const THRESHOLD: u8 = 50;
    const WINDOW_MS: u64 = 3000;

    #[test]
    fn test_double_blink_fires() {
        let mut blinks = BlinkDebouncer::new();

        assert!(!blinks.observe(80, 0, THRESHOLD, WINDOW_MS));
        assert!(blinks.observe(80, 2000, THRESHOLD, WINDOW_MS));
        // Right after a fire a new pair starts
        assert!(!blinks.observe(80, 2100, THRESHOLD, WINDOW_MS));
        assert_eq!(blinks.pending_since(), Some(2100));
    }

    #[test]
    fn test_weak_blink_ignored() {
        let mut blinks = BlinkDebouncer::new();

        assert!(!blinks.observe(80, 0, THRESHOLD, WINDOW_MS));
        assert!(!blinks.observe(THRESHOLD, 500, THRESHOLD, WINDOW_MS));
        assert_eq!(blinks.pending_since(), Some(0));
        assert!(blinks.observe(51, 1000, THRESHOLD, WINDOW_MS));
    }

    #[test]
    fn test_blink_after_window_restarts_pair() {
        let mut blinks = BlinkDebouncer::new();

        assert!(!blinks.observe(80, 0, THRESHOLD, WINDOW_MS));
        assert!(!blinks.observe(80, WINDOW_MS, THRESHOLD, WINDOW_MS));
        assert_eq!(blinks.pending_since(), Some(WINDOW_MS));
        assert!(blinks.observe(80, WINDOW_MS + 1, THRESHOLD, WINDOW_MS));
    }

    #[test]
    fn test_third_blink_after_fire_does_not_fire() {
        let mut blinks = BlinkDebouncer::new();

        blinks.observe(90, 0, THRESHOLD, WINDOW_MS);
        assert!(blinks.observe(90, 100, THRESHOLD, WINDOW_MS));
        assert!(!blinks.observe(90, 200, THRESHOLD, WINDOW_MS));
        assert!(blinks.observe(90, 300, THRESHOLD, WINDOW_MS));
    }

    #[test]
    fn test_first_blink_at_time_zero() {
        // Timestamp 0 must not be confused with "no blink yet"
        let mut blinks = BlinkDebouncer::new();
        assert!(!blinks.observe(80, 0, THRESHOLD, WINDOW_MS));
        assert!(blinks.observe(80, 1, THRESHOLD, WINDOW_MS));
    }
}
