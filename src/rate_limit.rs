use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use dashmap::DashMap;

const CLEANUP_THRESHOLD: usize = 10_000;
/// Sweep at most once per this many new keys while above the threshold.
const CLEANUP_EVERY: usize = 1_000;

/// Per-email login brute force limiter using a fixed window.
///
/// Every attempt reserves a slot up front; a successful login gives all of them
/// back through [`LoginRateLimiter::reset`].
pub struct LoginRateLimiter {
    /// email -> (attempt_count, window_start)
    entries: DashMap<String, (u32, Instant)>,
    max_failures: u32,
    window: Duration,
    inserts: AtomicUsize,
}

impl Default for LoginRateLimiter {
    fn default() -> Self {
        Self::new(5, Duration::from_secs(15 * 60))
    }
}

impl LoginRateLimiter {
    pub fn new(max_failures: u32, window: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            max_failures,
            window,
            inserts: AtomicUsize::new(0),
        }
    }

    /// Reserve one login attempt for `email`. Returns Err with retry-after seconds
    /// once the window is used up.
    ///
    /// Check and increment happen under the same entry lock, so concurrent
    /// attempts cannot all slip past the limit.
    pub fn try_acquire(&self, email: &str) -> Result<(), u64> {
        let key = email.to_lowercase();

        if !self.entries.contains_key(&key) {
            self.maybe_cleanup();
        }

        let now = Instant::now();
        let mut entry = self.entries.entry(key).or_insert((0, now));
        let (count, start) = entry.value_mut();

        let elapsed = now.duration_since(*start);
        if elapsed > self.window {
            *count = 1;
            *start = now;
            return Ok(());
        }

        if *count >= self.max_failures {
            return Err(self.window.as_secs().saturating_sub(elapsed.as_secs()));
        }

        *count += 1;
        Ok(())
    }

    /// Forget attempts for an email after a successful login.
    pub fn reset(&self, email: &str) {
        self.entries.remove(&email.to_lowercase());
    }

    /// Drop windows that have already expired.
    pub fn cleanup(&self) {
        let now = Instant::now();
        let window = self.window;
        self.entries.retain(|_, (_, start)| now.duration_since(*start) <= window);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn maybe_cleanup(&self) {
        let inserted = self.inserts.fetch_add(1, Ordering::Relaxed) + 1;
        if inserted % CLEANUP_EVERY == 0 && self.entries.len() >= CLEANUP_THRESHOLD {
            self.cleanup();
        }
    }
}
