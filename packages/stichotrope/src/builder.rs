use std::collections::BTreeMap;

use crate::pal::PlatformFacade;
use crate::{GlobalSwitch, Profiler};

/// Configures a [`Profiler`] before it is created.
///
/// Obtained from [`Profiler::builder()`].
///
/// # Examples
///
/// ```
/// use stichotrope::Profiler;
///
/// let profiler = Profiler::builder("configured")
///     .started(false)
///     .track_name(0, "Requests")
///     .track_enabled(1, false)
///     .build();
///
/// assert!(!profiler.is_started());
/// assert!(!profiler.is_track_enabled(1));
/// assert_eq!(profiler.get_results().track(0).unwrap().name(), Some("Requests"));
/// ```
#[derive(Debug)]
#[must_use = "the builder does nothing until build() is called"]
pub struct ProfilerBuilder {
    name: String,
    started: bool,
    global: &'static GlobalSwitch,
    track_names: BTreeMap<usize, String>,
    track_enabled: BTreeMap<usize, bool>,
    platform: PlatformFacade,
}

impl ProfilerBuilder {
    pub(crate) fn new(name: String) -> Self {
        Self {
            name,
            started: true,
            global: GlobalSwitch::process(),
            track_names: BTreeMap::new(),
            track_enabled: BTreeMap::new(),
            platform: PlatformFacade::real(),
        }
    }

    /// Whether the session records from the moment it is created. Defaults to `true`.
    pub fn started(mut self, started: bool) -> Self {
        self.started = started;
        self
    }

    /// Assigns a display name to a track.
    pub fn track_name(mut self, track_index: usize, name: impl Into<String>) -> Self {
        self.track_names.insert(track_index, name.into());
        self
    }

    /// Sets whether a track records from the moment the session is created.
    pub fn track_enabled(mut self, track_index: usize, enabled: bool) -> Self {
        self.track_enabled.insert(track_index, enabled);
        self
    }

    /// Binds the session to a custom global switch instead of the process switch.
    pub fn global_switch(mut self, switch: &'static GlobalSwitch) -> Self {
        self.global = switch;
        self
    }

    #[cfg(test)]
    pub(crate) fn platform(mut self, platform: PlatformFacade) -> Self {
        self.platform = platform;
        self
    }

    /// Creates the profiling session.
    #[must_use]
    pub fn build(self) -> Profiler {
        let profiler = Profiler::from_parts(self.name, self.started, self.global, self.platform);

        for (track_index, name) in self.track_names {
            profiler.set_track_name(track_index, name);
        }

        for (track_index, enabled) in self.track_enabled {
            profiler.set_track_enabled(track_index, enabled);
        }

        profiler
    }
}
