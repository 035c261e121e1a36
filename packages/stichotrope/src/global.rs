//! The process-wide profiling switch.

use std::sync::atomic::{AtomicBool, Ordering};

use tracing::debug;

static PROCESS: GlobalSwitch = GlobalSwitch::new(true);

/// A shared on/off switch consulted by every instrumented block of the sessions bound to it.
///
/// Every [`Profiler`](crate::Profiler) is bound to one switch; by default that is the process
/// switch returned by [`GlobalSwitch::process()`], which starts out enabled. When the switch
/// is off, instrumented code still runs but is not timed.
///
/// Custom switches are `static` items handed to
/// [`ProfilerBuilder::global_switch()`](crate::ProfilerBuilder::global_switch), which is
/// useful to isolate a group of sessions from the process switch.
///
/// # Examples
///
/// ```
/// use stichotrope::{GlobalSwitch, Profiler};
///
/// static SWITCH: GlobalSwitch = GlobalSwitch::new(true);
///
/// let profiler = Profiler::builder("isolated").global_switch(&SWITCH).build();
///
/// SWITCH.set_enabled(false);
/// drop(profiler.block(0, "not_recorded"));
///
/// assert!(profiler.get_results().is_empty());
/// ```
#[derive(Debug)]
pub struct GlobalSwitch {
    enabled: AtomicBool,
}

impl GlobalSwitch {
    /// Creates a switch in the given state.
    #[must_use]
    pub const fn new(enabled: bool) -> Self {
        Self {
            enabled: AtomicBool::new(enabled),
        }
    }

    /// The switch shared by every session that is not given a custom one.
    #[must_use]
    pub fn process() -> &'static Self {
        &PROCESS
    }

    /// Whether profiling is allowed by this switch.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    /// Turns profiling on or off for every session bound to this switch.
    pub fn set_enabled(&self, enabled: bool) {
        let previous = self.enabled.swap(enabled, Ordering::Relaxed);

        if previous != enabled {
            debug!(enabled, "global profiling switch changed");
        }
    }
}

/// Turns profiling on or off for every session bound to the process switch.
///
/// Profiling is enabled at process start.
pub fn set_global_enabled(enabled: bool) {
    GlobalSwitch::process().set_enabled(enabled);
}

/// Whether the process switch currently allows profiling.
#[must_use]
pub fn is_global_enabled() -> bool {
    GlobalSwitch::process().is_enabled()
}
