use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;
use std::panic::Location;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use tracing::debug;

use crate::error::Result;
use crate::pal::PlatformFacade;
use crate::track_state::TrackState;
use crate::{
    BlockGuard, ERR_POISONED_LOCK, GlobalSwitch, ProfilerBuilder, ProfilerResults, Tracker,
    export,
};

/// A profiling session: records timed blocks into independently switchable tracks.
///
/// Code is instrumented either by wrapping callables with a [`Tracker`] obtained from
/// [`track()`](Self::track) or by holding a [`BlockGuard`] obtained from
/// [`block()`](Self::block) for the duration of a scope. Every completed measurement becomes
/// one [`Block`](crate::Block) in the track it was aimed at.
///
/// A block is recorded only if the global switch, the session and the target track are all
/// enabled. Otherwise the instrumented code still runs, but the clock is not read and nothing
/// is recorded.
///
/// Cloning a `Profiler` yields another handle to the same session. The session may be used
/// from any number of threads concurrently.
///
/// # Examples
///
/// ```
/// use stichotrope::Profiler;
///
/// let profiler = Profiler::new("MyApp");
/// profiler.set_track_name(0, "Requests");
/// profiler.set_track_name(1, "Database");
///
/// let handle_request = profiler.track(0, "handle_request").wrap(|| {
///     let _query = profiler.block(1, "query_users");
///     "done"
/// });
///
/// assert_eq!(handle_request(), "done");
///
/// let results = profiler.get_results();
/// assert_eq!(results.tracks().len(), 2);
/// println!("{results}");
/// ```
#[derive(Clone, Debug)]
pub struct Profiler {
    core: Arc<ProfilerCore>,
}

#[derive(Debug)]
pub(crate) struct ProfilerCore {
    name: String,
    started: AtomicBool,
    global: &'static GlobalSwitch,
    tracks: Mutex<BTreeMap<usize, Arc<TrackState>>>,
    platform: PlatformFacade,
}

impl Profiler {
    /// Creates a started profiling session with default settings.
    ///
    /// # Examples
    ///
    /// ```
    /// use stichotrope::Profiler;
    ///
    /// let profiler = Profiler::new("MyApp");
    /// assert!(profiler.is_started());
    /// ```
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self::builder(name).build()
    }

    /// Starts configuring a profiling session.
    #[must_use]
    pub fn builder(name: impl Into<String>) -> ProfilerBuilder {
        ProfilerBuilder::new(name.into())
    }

    pub(crate) fn from_parts(
        name: String,
        started: bool,
        global: &'static GlobalSwitch,
        platform: PlatformFacade,
    ) -> Self {
        debug!(profiler = %name, started, "profiling session created");

        Self {
            core: Arc::new(ProfilerCore {
                name,
                started: AtomicBool::new(started),
                global,
                tracks: Mutex::new(BTreeMap::new()),
                platform,
            }),
        }
    }

    /// The name given to this session.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.core.name
    }

    /// Creates a wrapper that times calls into track `track_index`, naming each block `name`.
    ///
    /// The source location of the call to this method is recorded with every block the
    /// wrapper produces.
    ///
    /// # Examples
    ///
    /// ```
    /// use stichotrope::Profiler;
    ///
    /// let profiler = Profiler::new("decorated");
    /// let square = profiler.track(0, "square").wrap_with(|x: u64| x * x);
    ///
    /// assert_eq!(square(12), 144);
    /// assert_eq!(profiler.get_results().block_count(), 1);
    /// ```
    #[track_caller]
    #[must_use]
    pub fn track(&self, track_index: usize, name: impl Into<Cow<'static, str>>) -> Tracker {
        Tracker::new(
            Arc::clone(&self.core),
            track_index,
            name.into(),
            Location::caller(),
        )
    }

    /// Starts timing a block in track `track_index`, named `name`.
    ///
    /// The block ends, and is recorded, when the returned guard is dropped or finished. The
    /// source location of the call to this method is recorded with the block.
    ///
    /// # Examples
    ///
    /// ```
    /// use stichotrope::Profiler;
    ///
    /// let profiler = Profiler::new("scoped");
    /// {
    ///     let _block = profiler.block(0, "work");
    ///     std::thread::sleep(std::time::Duration::from_millis(1));
    /// }
    ///
    /// let results = profiler.get_results();
    /// let block = &results.track(0).unwrap().blocks()[0];
    /// assert!(block.duration_ns() >= 1_000_000);
    /// ```
    #[track_caller]
    pub fn block(&self, track_index: usize, name: impl Into<Cow<'static, str>>) -> BlockGuard {
        if !self.core.is_recording() {
            return BlockGuard::inactive();
        }

        let track = self.core.track_state(track_index);
        BlockGuard::start(track, &self.core.platform, name.into(), Location::caller())
    }

    /// Resumes recording in this session.
    pub fn start(&self) {
        self.core.started.store(true, Ordering::Relaxed);
        debug!(profiler = %self.core.name, "profiling session started");
    }

    /// Pauses recording in this session. Instrumented code keeps running but is not timed.
    pub fn stop(&self) {
        self.core.started.store(false, Ordering::Relaxed);
        debug!(profiler = %self.core.name, "profiling session stopped");
    }

    /// Whether this session is started. Recording also requires the global switch to be on.
    #[must_use]
    pub fn is_started(&self) -> bool {
        self.core.started.load(Ordering::Relaxed)
    }

    /// Whether both the global switch and this session currently allow recording.
    #[must_use]
    pub fn is_recording(&self) -> bool {
        self.core.is_recording()
    }

    /// Enables or disables recording into one track, creating the track if it is unused.
    ///
    /// Instrumented code aimed at a disabled track still runs but records nothing.
    pub fn set_track_enabled(&self, track_index: usize, enabled: bool) {
        self.core.track_state(track_index).set_enabled(enabled);
    }

    /// Whether recording into a track is enabled. Tracks are enabled until disabled, so this
    /// is `true` for tracks that have not been used yet.
    #[must_use]
    pub fn is_track_enabled(&self, track_index: usize) -> bool {
        self.core
            .tracks
            .lock()
            .expect(ERR_POISONED_LOCK)
            .get(&track_index)
            .is_none_or(|track| track.is_enabled())
    }

    /// Assigns a display name to a track, creating the track if it is unused.
    pub fn set_track_name(&self, track_index: usize, name: impl Into<String>) {
        self.core.track_state(track_index).set_name(name.into());
    }

    /// Takes a snapshot of everything recorded so far.
    ///
    /// The snapshot is detached from the session: recording more blocks or clearing the
    /// session does not affect snapshots already taken.
    #[must_use]
    pub fn get_results(&self) -> ProfilerResults {
        let tracks = self
            .core
            .tracks
            .lock()
            .expect(ERR_POISONED_LOCK)
            .values()
            .map(|track| track.snapshot())
            .collect();

        ProfilerResults::new(self.core.name.clone(), tracks)
    }

    /// Removes every recorded block from every track. Block numbering restarts at 0.
    ///
    /// Track names and enable states are kept.
    pub fn clear(&self) {
        for track in self.core.tracks.lock().expect(ERR_POISONED_LOCK).values() {
            track.clear();
        }

        debug!(profiler = %self.core.name, "profiling session cleared");
    }

    /// Prints a snapshot of the results to stdout.
    ///
    /// This is a convenience method equivalent to
    /// `stichotrope::print_results(&self.get_results())`.
    #[cfg_attr(test, mutants::skip)] // Too difficult to test stdout output reliably - manually tested.
    pub fn print_results(&self) {
        export::console::print_results(&self.get_results());
    }

    /// Writes a snapshot of the results to a CSV file.
    ///
    /// This is a convenience method equivalent to
    /// `stichotrope::export_csv(&self.get_results(), path)`.
    ///
    /// # Errors
    ///
    /// See [`export_csv()`](crate::export_csv).
    pub fn export_csv(&self, path: impl AsRef<Path>) -> Result<()> {
        export::csv::export_csv(&self.get_results(), path)
    }

    /// Writes a snapshot of the results to a JSON file.
    ///
    /// This is a convenience method equivalent to
    /// `stichotrope::export_json(&self.get_results(), path)`.
    ///
    /// # Errors
    ///
    /// See [`export_json()`](crate::export_json).
    pub fn export_json(&self, path: impl AsRef<Path>) -> Result<()> {
        export::json::export_json(&self.get_results(), path)
    }
}

impl fmt::Display for Profiler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Delegate to the results' Display implementation for consistency.
        write!(f, "{}", self.get_results())
    }
}

impl ProfilerCore {
    pub(crate) fn is_recording(&self) -> bool {
        self.global.is_enabled() && self.started.load(Ordering::Relaxed)
    }

    pub(crate) fn platform(&self) -> &PlatformFacade {
        &self.platform
    }

    /// Gets the track with the given index, creating it on first use.
    pub(crate) fn track_state(&self, track_index: usize) -> Arc<TrackState> {
        let mut tracks = self.tracks.lock().expect(ERR_POISONED_LOCK);

        Arc::clone(tracks.entry(track_index).or_insert_with(|| {
            debug!(profiler = %self.name, track_index, "track created");
            Arc::new(TrackState::new(track_index))
        }))
    }
}
