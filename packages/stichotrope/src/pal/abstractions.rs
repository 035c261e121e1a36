//! Platform abstraction trait definitions.

use std::fmt::Debug;
use std::time::Duration;

/// Provides the monotonic clock used to time blocks.
pub(crate) trait Platform: Debug + Send + Sync + 'static {
    /// Gets the current time as an offset from a fixed, process-local origin.
    ///
    /// Consecutive reads never go backwards and are not affected by wall clock adjustments.
    fn monotonic_time(&self) -> Duration;
}
