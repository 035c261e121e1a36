use std::sync::LazyLock;
use std::time::{Duration, Instant};

use crate::pal::Platform;

static ORIGIN: LazyLock<Instant> = LazyLock::new(Instant::now);

/// The real clock, measuring time since the first read in this process.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct RealPlatform;

impl Platform for RealPlatform {
    #[cfg_attr(test, mutants::skip)] // Real time cannot be asserted exactly.
    fn monotonic_time(&self) -> Duration {
        Instant::now().saturating_duration_since(*ORIGIN)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn never_goes_backwards() {
        let platform = RealPlatform;

        let mut previous = platform.monotonic_time();
        for _ in 0..1000 {
            let current = platform.monotonic_time();
            assert!(current >= previous);
            previous = current;
        }
    }

    #[test]
    #[cfg_attr(miri, ignore)] // Sleeping under Miri is not meaningful.
    fn observes_sleep() {
        let platform = RealPlatform;

        let before = platform.monotonic_time();
        std::thread::sleep(Duration::from_millis(5));
        let after = platform.monotonic_time();

        assert!(after.saturating_sub(before) >= Duration::from_millis(5));
    }
}
