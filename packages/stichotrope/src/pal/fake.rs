//! Fake platform implementation for testing.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::pal::abstractions::Platform;

#[derive(Debug)]
struct FakePlatformState {
    now: Duration,

    // Added to `now` after every read, so consecutive reads see time pass.
    step: Duration,

    reads: u64,
}

/// Fake clock for testing.
///
/// Clones share the same state, so a test can keep one clone to move time forward and to
/// inspect how many times the code under test read the clock.
#[derive(Clone, Debug)]
pub(crate) struct FakePlatform {
    state: Arc<Mutex<FakePlatformState>>,
}

impl FakePlatform {
    /// Creates a fake clock standing still at zero.
    pub(crate) fn new() -> Self {
        Self::with_step(Duration::ZERO)
    }

    /// Creates a fake clock that advances by `step` after every read.
    pub(crate) fn with_step(step: Duration) -> Self {
        Self {
            state: Arc::new(Mutex::new(FakePlatformState {
                now: Duration::ZERO,
                step,
                reads: 0,
            })),
        }
    }

    /// Moves the clock forward.
    pub(crate) fn advance(&self, by: Duration) {
        let mut state = self
            .state
            .lock()
            .expect("FakePlatform state lock should not be poisoned");

        state.now = state.now.saturating_add(by);
    }

    /// How many times the clock has been read, across all clones.
    pub(crate) fn reads(&self) -> u64 {
        self.state
            .lock()
            .expect("FakePlatform state lock should not be poisoned")
            .reads
    }
}

impl Platform for FakePlatform {
    fn monotonic_time(&self) -> Duration {
        let mut state = self
            .state
            .lock()
            .expect("FakePlatform state lock should not be poisoned");

        let now = state.now;
        state.now = state.now.saturating_add(state.step);
        state.reads = state.reads.saturating_add(1);

        now
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn starts_at_zero_without_reads() {
        let platform = FakePlatform::new();

        assert_eq!(platform.reads(), 0);
        assert_eq!(platform.monotonic_time(), Duration::ZERO);
        assert_eq!(platform.reads(), 1);
    }

    #[test]
    fn advance_is_visible_to_clones() {
        let platform1 = FakePlatform::new();
        let platform2 = platform1.clone();

        platform1.advance(Duration::from_millis(100));
        assert_eq!(platform2.monotonic_time(), Duration::from_millis(100));
        assert_eq!(platform1.reads(), 1);
    }

    #[test]
    fn step_advances_after_each_read() {
        let platform = FakePlatform::with_step(Duration::from_nanos(250));

        assert_eq!(platform.monotonic_time(), Duration::ZERO);
        assert_eq!(platform.monotonic_time(), Duration::from_nanos(250));
        assert_eq!(platform.monotonic_time(), Duration::from_nanos(500));
        assert_eq!(platform.reads(), 3);
    }
}
