use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// A rejected attempt: how long until the subject's window resets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Throttle {
    pub retry_after_secs: u64,
}

impl Throttle {
    pub fn message(&self) -> String {
        format!(
            "Rate limit exceeded. Please try again in {} seconds.",
            self.retry_after_secs
        )
    }
}

/// Per-subject, per-action quota. `check` records the attempt when allowed.
pub trait RateLimiter: Send + Sync {
    fn check(&self, subject: &str, action: &str) -> Option<Throttle>;
}

struct Window {
    started: Instant,
    count: u64,
}

/// In-memory fixed-window limiter keyed by "subject:action".
/// The window opens at the first counted attempt and resets once it elapses.
pub struct InMemoryRateLimiter {
    entries: Mutex<HashMap<String, Window>>,
    max_attempts: u64,
    window: Duration,
}

impl InMemoryRateLimiter {
    pub fn new(max_attempts: u64, window: Duration) -> Self {
        InMemoryRateLimiter {
            entries: Mutex::new(HashMap::new()),
            max_attempts,
            window,
        }
    }

    fn check_at(&self, subject: &str, action: &str, now: Instant) -> Option<Throttle> {
        let key = format!("{}:{}", subject, action);
        let mut map = self.entries.lock().unwrap_or_else(|e| e.into_inner());

        let entry = map.entry(key).or_insert(Window {
            started: now,
            count: 0,
        });

        if now.duration_since(entry.started) >= self.window {
            entry.started = now;
            entry.count = 0;
        }

        if entry.count < self.max_attempts {
            entry.count += 1;
            return None;
        }

        let remaining = self.window.saturating_sub(now.duration_since(entry.started));
        // Round up so callers never retry a fraction of a second too early.
        let secs = remaining.as_secs() + u64::from(remaining.subsec_nanos() > 0);
        Some(Throttle {
            retry_after_secs: secs.max(1),
        })
    }

    /// Remaining attempts in the current window, without recording one.
    #[cfg(test)]
    pub fn remaining(&self, subject: &str, action: &str) -> u64 {
        let key = format!("{}:{}", subject, action);
        let map = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        match map.get(&key) {
            Some(w) if w.started.elapsed() < self.window => {
                self.max_attempts.saturating_sub(w.count)
            }
            _ => self.max_attempts,
        }
    }

    /// Drop windows that have already elapsed (call from a timer).
    pub fn cleanup(&self) {
        let mut map = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        let window = self.window;
        map.retain(|_, w| w.started.elapsed() < window);
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }
}

impl RateLimiter for InMemoryRateLimiter {
    fn check(&self, subject: &str, action: &str) -> Option<Throttle> {
        self.check_at(subject, action, Instant::now())
    }
}
