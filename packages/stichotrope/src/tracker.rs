//! Decorator-style instrumentation of callables.

use std::borrow::Cow;
use std::panic::Location;
use std::sync::{Arc, OnceLock};

use crate::BlockGuard;
use crate::profiler::ProfilerCore;
use crate::track_state::TrackState;

/// Times calls to the callables it wraps, recording one block per call.
///
/// Created by [`Profiler::track()`](crate::Profiler::track), which fixes the target track, the
/// block name and the source location for every block this tracker produces. The tracker can
/// time one call with [`call()`](Self::call) or turn a callable into an instrumented callable
/// with the same signature via [`wrap()`](Self::wrap), [`wrap_mut()`](Self::wrap_mut) or
/// [`wrap_with()`](Self::wrap_with).
///
/// The return value of the wrapped callable is passed through unchanged, including any
/// `Err`. If the callable panics, the block is recorded before the panic continues to unwind
/// into the caller.
///
/// The tracker remembers the track it resolved on first use, so repeated calls through the
/// same tracker skip the track lookup.
///
/// # Examples
///
/// ```
/// use stichotrope::Profiler;
///
/// let profiler = Profiler::new("decorated");
///
/// let parse = profiler
///     .track(0, "parse")
///     .wrap_with(|input: &str| input.parse::<u32>());
///
/// assert_eq!(parse("42"), Ok(42));
/// assert!(parse("forty-two").is_err());
///
/// // Both calls were timed, including the one that failed.
/// assert_eq!(profiler.get_results().track(0).unwrap().len(), 2);
/// ```
#[derive(Debug)]
pub struct Tracker {
    core: Arc<ProfilerCore>,
    track_index: usize,
    name: Cow<'static, str>,
    location: &'static Location<'static>,
    track: OnceLock<Arc<TrackState>>,
}

impl Tracker {
    pub(crate) fn new(
        core: Arc<ProfilerCore>,
        track_index: usize,
        name: Cow<'static, str>,
        location: &'static Location<'static>,
    ) -> Self {
        Self {
            core,
            track_index,
            name,
            location,
            track: OnceLock::new(),
        }
    }

    /// The track this tracker records into.
    #[must_use]
    pub fn track_index(&self) -> usize {
        self.track_index
    }

    /// The name given to the blocks this tracker records.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Calls `f` once, timing the call.
    ///
    /// # Examples
    ///
    /// ```
    /// use stichotrope::Profiler;
    ///
    /// let profiler = Profiler::new("single");
    /// let tracker = profiler.track(0, "sum");
    ///
    /// let sum = tracker.call(|| (1..=10).sum::<u32>());
    /// assert_eq!(sum, 55);
    /// ```
    pub fn call<R>(&self, f: impl FnOnce() -> R) -> R {
        // Checked before anything else so that a disabled profiler costs two atomic loads.
        if !self.core.is_recording() {
            return f();
        }

        let _guard = self.enter();
        f()
    }

    /// Wraps a callable that takes no arguments.
    pub fn wrap<F, R>(self, f: F) -> impl Fn() -> R
    where
        F: Fn() -> R,
    {
        move || self.call(&f)
    }

    /// Wraps a callable that takes no arguments and mutates its captured state.
    pub fn wrap_mut<F, R>(self, mut f: F) -> impl FnMut() -> R
    where
        F: FnMut() -> R,
    {
        move || self.call(&mut f)
    }

    /// Wraps a callable that takes one argument. Use a tuple to pass several values.
    ///
    /// # Examples
    ///
    /// ```
    /// use stichotrope::Profiler;
    ///
    /// let profiler = Profiler::new("arguments");
    /// let add = profiler.track(0, "add").wrap_with(|(a, b): (i32, i32)| a + b);
    ///
    /// assert_eq!(add((2, 3)), 5);
    /// ```
    pub fn wrap_with<F, A, R>(self, f: F) -> impl Fn(A) -> R
    where
        F: Fn(A) -> R,
    {
        move |arg| self.call(|| f(arg))
    }

    fn enter(&self) -> BlockGuard {
        let track = self
            .track
            .get_or_init(|| self.core.track_state(self.track_index));

        BlockGuard::start(
            Arc::clone(track),
            self.core.platform(),
            self.name.clone(),
            self.location,
        )
    }
}
