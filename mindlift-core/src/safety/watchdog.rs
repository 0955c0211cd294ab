//! Stop-on-silence watchdog
//!
//! Tracks a single deadline on a monotonic millisecond clock. Every fresh
//! sample pushes the deadline out; once it passes, the watchdog reports the
//! expiry exactly once and stays stale until the next touch.
//!
//! The watchdog itself never sleeps. A timer context sleeps until
//! [`Watchdog::deadline_ms`] and then calls [`Watchdog::poll`]; as long as
//! `touch` and `poll` run under the same lock, a touch that races with the
//! timer either lands first (poll sees the new deadline) or after (the stale
//! flag is cleared again).

/// Watchdog deadline and stale flag
#[derive(Debug, Clone)]
pub struct Watchdog {
    timeout_ms: u64,
    /// Pending deadline, None when disarmed or already fired
    deadline_ms: Option<u64>,
    stale: bool,
    /// Number of expiries since creation
    fired_count: u32,
}

impl Watchdog {
    /// Create a disarmed watchdog
    pub fn new(timeout_ms: u64) -> Self {
        Self {
            timeout_ms,
            deadline_ms: None,
            stale: false,
            fired_count: 0,
        }
    }

    /// Cancel any pending deadline and arm a new one `timeout` from `now_ms`
    ///
    /// Clears the stale flag.
    pub fn touch(&mut self, now_ms: u64) {
        self.deadline_ms = Some(now_ms.saturating_add(self.timeout_ms));
        self.stale = false;
    }

    /// Disarm the watchdog
    ///
    /// Cancelling an absent or already-fired deadline is a no-op.
    pub fn cancel(&mut self) {
        self.deadline_ms = None;
    }

    /// Check the deadline against `now_ms`
    ///
    /// Returns true exactly once per expiry; the caller must then issue a
    /// stop command.
    pub fn poll(&mut self, now_ms: u64) -> bool {
        match self.deadline_ms {
            Some(deadline) if now_ms >= deadline => {
                self.deadline_ms = None;
                self.stale = true;
                self.fired_count = self.fired_count.saturating_add(1);
                true
            }
            _ => false,
        }
    }

    /// True after an expiry until the next touch
    pub fn is_stale(&self) -> bool {
        self.stale
    }

    /// Pending deadline, if armed
    pub fn deadline_ms(&self) -> Option<u64> {
        self.deadline_ms
    }

    /// Configured timeout
    pub fn timeout_ms(&self) -> u64 {
        self.timeout_ms
    }

    /// Total number of expiries
    pub fn fired_count(&self) -> u32 {
        self.fired_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TIMEOUT_MS: u64 = 5000;

    #[test]
    fn test_new_is_disarmed() {
        let mut watchdog = Watchdog::new(TIMEOUT_MS);
        assert_eq!(watchdog.deadline_ms(), None);
        assert!(!watchdog.poll(u64::MAX));
        assert!(!watchdog.is_stale());
    }

    #[test]
    fn test_fires_once_after_timeout() {
        let mut watchdog = Watchdog::new(TIMEOUT_MS);
        watchdog.touch(1000);

        assert!(!watchdog.poll(5999));
        assert!(watchdog.poll(6000));
        assert!(watchdog.is_stale());

        // Already fired: no second stop
        assert!(!watchdog.poll(7000));
        assert!(!watchdog.poll(60_000));
        assert_eq!(watchdog.fired_count(), 1);
    }

    #[test]
    fn test_touch_before_expiry_prevents_firing() {
        let mut watchdog = Watchdog::new(TIMEOUT_MS);
        watchdog.touch(0);
        watchdog.touch(4999);

        assert!(!watchdog.poll(5000));
        assert!(!watchdog.poll(9998));
        assert!(watchdog.poll(9999));
    }

    #[test]
    fn test_touch_clears_stale() {
        let mut watchdog = Watchdog::new(TIMEOUT_MS);
        watchdog.touch(0);
        assert!(watchdog.poll(TIMEOUT_MS));
        assert!(watchdog.is_stale());

        watchdog.touch(TIMEOUT_MS + 1);
        assert!(!watchdog.is_stale());
        assert_eq!(watchdog.deadline_ms(), Some(2 * TIMEOUT_MS + 1));
    }

    #[test]
    fn test_cancel_is_idempotent() {
        let mut watchdog = Watchdog::new(TIMEOUT_MS);
        watchdog.cancel();

        watchdog.touch(0);
        watchdog.cancel();
        watchdog.cancel();
        assert!(!watchdog.poll(TIMEOUT_MS * 10));

        watchdog.touch(0);
        assert!(watchdog.poll(TIMEOUT_MS));
        watchdog.cancel();
        assert!(watchdog.is_stale());
    }
}
