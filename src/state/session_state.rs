use std::time::{Duration, Instant};

/// Tracks pacing for the single page-loading session
///
/// The politeness delay is measured from the *end* of the previous load, so
/// slow pages do not eat into the pause the server is owed.
#[derive(Debug, Clone)]
pub struct SessionState {
    /// Number of loads issued in this session, retries included
    pub request_count: u32,

    /// When the previous load finished, successfully or not
    pub last_request_end: Option<Instant>,

    /// Minimum pause between two loads
    min_delay: Duration,
}

impl SessionState {
    /// Creates a new SessionState with the given politeness delay
    pub fn new(min_delay: Duration) -> Self {
        Self {
            request_count: 0,
            last_request_end: None,
            min_delay,
        }
    }

    /// Checks if a load may be issued now
    pub fn can_request(&self, now: Instant) -> bool {
        self.time_until_next_request(now).is_none()
    }

    /// Calculates the time until the next load may start
    ///
    /// Returns None if a load can be issued now, or the duration to wait otherwise.
    pub fn time_until_next_request(&self, now: Instant) -> Option<Duration> {
        let last = self.last_request_end?;
        let elapsed = now.saturating_duration_since(last);
        if elapsed < self.min_delay {
            Some(self.min_delay - elapsed)
        } else {
            None
        }
    }

    /// Records that a load started
    pub fn record_request_start(&mut self) {
        self.request_count += 1;
    }

    /// Records that a load finished; the next delay is measured from `now`
    pub fn record_request_end(&mut self, now: Instant) {
        self.last_request_end = Some(now);
    }
}
