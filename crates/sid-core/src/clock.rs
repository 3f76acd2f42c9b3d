//! Clocks for measuring credential age.
//!
//! The generator never reads wall time directly. It asks a [`Clock`], so
//! tests can control time and exercise TTL expiry without sleeping.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

/// Monotonic time source with millisecond resolution.
pub trait Clock: Send + Sync {
    /// Milliseconds since an arbitrary, fixed origin.
    fn now_ms(&self) -> u64;
}

/// Real monotonic clock.
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    /// Create a clock whose origin is now.
    #[must_use]
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        u64::try_from(self.origin.elapsed().as_millis()).unwrap_or(u64::MAX)
    }
}

/// Simulated clock.
///
/// Time only advances when explicitly requested via `advance_ms`.
///
/// # Thread Safety
///
/// The clock uses atomic operations and is safe to share across threads.
pub struct SimClock {
    /// Current time in milliseconds since origin
    now_ms: AtomicU64,
}

/// Bounds for time operations.
const TIME_MS_MAX: u64 = u64::MAX - 1_000_000_000; // Leave room for advances

impl SimClock {
    /// Create a new clock starting at time 0.
    #[must_use]
    pub fn new() -> Self {
        Self {
            now_ms: AtomicU64::new(0),
        }
    }

    /// Create a clock starting at a specific time.
    #[must_use]
    pub fn with_start_time_ms(start_ms: u64) -> Self {
        debug_assert!(start_ms <= TIME_MS_MAX, "Start time too large");
        Self {
            now_ms: AtomicU64::new(start_ms),
        }
    }

    /// Advance time by the given number of milliseconds.
    pub fn advance_ms(&self, delta_ms: u64) {
        debug_assert!(delta_ms > 0, "Delta must be positive");

        let current = self.now_ms.load(Ordering::Acquire);
        debug_assert!(
            current <= TIME_MS_MAX - delta_ms,
            "Time advance would overflow"
        );

        self.now_ms.fetch_add(delta_ms, Ordering::Release);
    }

    /// Advance time by the given number of seconds.
    pub fn advance_secs(&self, delta_secs: u64) {
        debug_assert!(delta_secs > 0, "Delta must be positive");
        self.advance_ms(delta_secs * 1_000);
    }
}

impl Default for SimClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SimClock {
    fn now_ms(&self) -> u64 {
        self.now_ms.load(Ordering::Acquire)
    }
}
