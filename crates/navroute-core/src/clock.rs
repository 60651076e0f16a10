//! Elapsed-time clock
//!
//! Route expiration is tracked against a monotonic "seconds since start"
//! baseline rather than wall-clock time, so it survives clock adjustments.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::OnceLock;
use std::time::Instant;

/// Process-wide origin shared by every [`SystemElapsedClock`]
static ORIGIN: OnceLock<Instant> = OnceLock::new();

/// Source of the elapsed-seconds baseline
pub trait ElapsedClock: Send + Sync {
    /// Seconds elapsed since the clock's origin
    fn elapsed_seconds(&self) -> u64;
}

/// Monotonic clock counting from the first clock created in the process.
///
/// All instances share one origin, so an expiration stamped by one clock
/// can be checked against any other.
#[derive(Debug, Clone, Copy)]
pub struct SystemElapsedClock {
    origin: Instant,
}

impl SystemElapsedClock {
    pub fn new() -> Self {
        Self {
            origin: *ORIGIN.get_or_init(Instant::now),
        }
    }
}

impl Default for SystemElapsedClock {
    fn default() -> Self {
        Self::new()
    }
}

impl ElapsedClock for SystemElapsedClock {
    fn elapsed_seconds(&self) -> u64 {
        self.origin.elapsed().as_secs()
    }
}

/// Manually driven clock for tests
#[derive(Debug, Default)]
pub struct ManualClock {
    seconds: AtomicU64,
}

impl ManualClock {
    /// Create a clock reading `seconds`
    pub fn new(seconds: u64) -> Self {
        Self {
            seconds: AtomicU64::new(seconds),
        }
    }

    /// Move the clock forward
    pub fn advance(&self, seconds: u64) {
        self.seconds.fetch_add(seconds, Ordering::SeqCst);
    }

    /// Set the clock to an absolute reading
    pub fn set(&self, seconds: u64) {
        self.seconds.store(seconds, Ordering::SeqCst);
    }
}

impl ElapsedClock for ManualClock {
    fn elapsed_seconds(&self) -> u64 {
        self.seconds.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_clock() {
        let clock = ManualClock::new(10);
        assert_eq!(clock.elapsed_seconds(), 10);

        clock.advance(5);
        assert_eq!(clock.elapsed_seconds(), 15);

        clock.set(3);
        assert_eq!(clock.elapsed_seconds(), 3);
    }

    #[test]
    fn test_system_clocks_share_origin() {
        let first = SystemElapsedClock::new();
        std::thread::sleep(std::time::Duration::from_millis(1100));

        let second = SystemElapsedClock::new();
        assert!(second.elapsed_seconds() >= 1);
        assert!(first.elapsed_seconds() >= second.elapsed_seconds());
    }
}
