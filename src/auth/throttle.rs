//! Per-username sliding window of failed logins.

use std::collections::HashMap;
use std::time::{Duration, Instant};

pub const MAX_FAILURES: usize = 5;
pub const WINDOW: Duration = Duration::from_secs(15 * 60);

pub struct LoginThrottle {
    failures: HashMap<String, Vec<Instant>>,
    max_failures: usize,
    window: Duration,
}

impl LoginThrottle {
    pub fn new() -> Self {
        Self::with_limits(MAX_FAILURES, WINDOW)
    }

    pub fn with_limits(max_failures: usize, window: Duration) -> Self {
        Self {
            failures: HashMap::new(),
            max_failures,
            window,
        }
    }

    /// `Err(retry_after_secs)` while the username is locked out.
    fn check_at(&mut self, username: &str, now: Instant) -> Result<(), u64> {
        let Some(entries) = self.failures.get_mut(username) else {
            return Ok(());
        };
        let window = self.window;
        entries.retain(|ts| now.duration_since(*ts) < window);
        if entries.len() < self.max_failures {
            return Ok(());
        }
        let oldest = entries.iter().min().copied().unwrap_or(now);
        let remaining = window.saturating_sub(now.duration_since(oldest));
        Err(remaining.as_secs().max(1))
    }

    /// Check the lockout and count this attempt as a failure under one lock.
    ///
    /// Returns the stamp of the counted attempt. A successful login settles it
    /// with `clear`; an attempt that never reached a verdict gives it back with
    /// `release`.
    pub fn reserve(&mut self, username: &str) -> Result<Instant, u64> {
        self.reserve_at(username, Instant::now())
    }

    fn reserve_at(&mut self, username: &str, now: Instant) -> Result<Instant, u64> {
        self.check_at(username, now)?;
        self.record_failure_at(username, now);
        Ok(now)
    }

    fn record_failure_at(&mut self, username: &str, now: Instant) {
        // Bound memory when many usernames are tried
        if self.failures.len() > 1000 {
            let window = self.window;
            self.failures
                .retain(|_, v| v.iter().any(|ts| now.duration_since(*ts) < window));
        }
        self.failures.entry(username.to_string()).or_default().push(now);
    }

    pub fn release(&mut self, username: &str, stamp: Instant) {
        let Some(entries) = self.failures.get_mut(username) else {
            return;
        };
        if let Some(pos) = entries.iter().rposition(|ts| *ts == stamp) {
            entries.remove(pos);
        }
        if entries.is_empty() {
            self.failures.remove(username);
        }
    }

    pub fn clear(&mut self, username: &str) {
        self.failures.remove(username);
    }
}

impl Default for LoginThrottle {
    fn default() -> Self {
        Self::new()
    }
}
