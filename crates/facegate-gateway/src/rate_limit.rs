//! Per-identity fixed-window rate limiting

use dashmap::DashMap;
use std::collections::BTreeMap;
use std::time::{Duration, Instant};

/// Outcome of asking the limiter for a slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// Within budget, the request may proceed
    Allowed,
    /// Window budget exhausted
    Rejected,
}

/// One caller's current window
#[derive(Debug, Clone, Copy)]
struct RateWindow {
    count: u32,
    window_end: Instant,
}

/// Fixed-window request counter keyed by subject
pub struct RateLimiter {
    windows: DashMap<String, RateWindow>,
    max_requests: u32,
    window: Duration,
}

impl RateLimiter {
    /// Create a limiter allowing `max_requests` per `window`
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            windows: DashMap::new(),
            max_requests,
            window,
        }
    }

    /// Count a request against the subject's window.
    ///
    /// The entry guard holds the shard lock, so the lapse check and the
    /// increment happen atomically per subject.
    pub fn admit(&self, subject: &str) -> Admission {
        let mut entry = self
            .windows
            .entry(subject.to_string())
            .or_insert_with(|| RateWindow {
                count: 0,
                window_end: Instant::now() + self.window,
            });

        let now = Instant::now();
        if now >= entry.window_end {
            entry.count = 0;
            entry.window_end = now + self.window;
        }

        if entry.count >= self.max_requests {
            return Admission::Rejected;
        }
        entry.count += 1;
        Admission::Allowed
    }

    /// Current request counts for all live windows
    pub fn snapshot(&self) -> BTreeMap<String, u32> {
        let now = Instant::now();
        self.windows
            .iter()
            .filter(|entry| entry.value().window_end > now)
            .map(|entry| (entry.key().clone(), entry.value().count))
            .collect()
    }

    /// Drop lapsed windows, returning how many were removed.
    ///
    /// The predicate runs under the shard lock, so a window renewed by a
    /// concurrent `admit` is never dropped.
    pub fn sweep_expired(&self) -> usize {
        let now = Instant::now();
        let mut removed = 0;
        self.windows.retain(|_, window| {
            let live = window.window_end > now;
            if !live {
                removed += 1;
            }
            live
        });
        removed
    }

    /// Configured per-window budget
    pub fn max_requests(&self) -> u32 {
        self.max_requests
    }

    /// Configured window length
    pub fn window(&self) -> Duration {
        self.window
    }
}
