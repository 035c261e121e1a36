//! Scoped timing of a region of code.

use std::borrow::Cow;
use std::cell::RefCell;
use std::marker::PhantomData;
use std::panic::Location;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tracing::warn;

use crate::error::Result;
use crate::pal::{Platform, PlatformFacade};
use crate::track_state::TrackState;
use crate::{Error, SourceLocation};

static NEXT_GUARD_ID: AtomicU64 = AtomicU64::new(0);

thread_local! {
    // Guards that are currently measuring on this thread, innermost last.
    static ACTIVE_GUARDS: RefCell<Vec<u64>> = const { RefCell::new(Vec::new()) };
}

/// Times the region of code between its creation and its drop, recording one block.
///
/// Created by [`Profiler::block()`](crate::Profiler::block). The block is recorded exactly once
/// when the guard is dropped or [finished](Self::finish), no matter whether the scope is left
/// normally, through early return or by unwinding from a panic.
///
/// Guards may be nested to any depth but must be exited in reverse order of creation on each
/// thread. A guard exited while a guard created after it on the same thread is still active
/// is rejected: nothing is recorded for it and [`Error::NonLifoExit`] is returned from
/// [`finish()`](Self::finish) or logged as a warning when the guard is dropped.
///
/// Collections drop their contents front to back, so guards stored in a tuple, array or `Vec`
/// are exited in creation order and all but the last one are rejected. Drop or finish such
/// guards explicitly, newest first.
///
/// A guard passed to [`mem::forget()`](std::mem::forget) stays on its thread's stack of
/// active guards forever. Every guard created before it on that thread and still active is
/// then rejected when it exits.
///
/// If profiling was disabled when the guard was created (at any level), the guard is inactive
/// and does nothing at all.
///
/// # Examples
///
/// ```
/// use stichotrope::Profiler;
///
/// let profiler = Profiler::new("scoped");
///
/// {
///     let _outer = profiler.block(0, "outer");
///     {
///         let _inner = profiler.block(0, "inner");
///         std::hint::black_box(42);
///     } // "inner" is recorded here, as block 0.
/// } // "outer" is recorded here, as block 1.
///
/// let results = profiler.get_results();
/// let names: Vec<_> = results.tracks()[0].blocks().iter().map(|b| b.name()).collect();
/// assert_eq!(names, ["inner", "outer"]);
/// ```
///
/// Guards kept in a collection must be exited newest first:
///
/// ```
/// use stichotrope::Profiler;
///
/// let profiler = Profiler::new("collected");
///
/// let guards = vec![profiler.block(0, "first"), profiler.block(0, "second")];
/// drop(guards); // "first" is dropped first, so it is rejected.
/// assert_eq!(profiler.get_results().block_count(), 1);
///
/// let mut guards = vec![profiler.block(1, "first"), profiler.block(1, "second")];
/// while let Some(guard) = guards.pop() {
///     guard.finish().unwrap();
/// }
/// assert_eq!(profiler.get_results().track(1).unwrap().len(), 2);
/// ```
#[derive(Debug)]
#[must_use = "the block is measured between creation and drop"]
pub struct BlockGuard {
    active: Option<ActiveBlock>,

    // The guard registers itself in a per-thread stack, so it must be dropped on the thread
    // that created it.
    _single_threaded: PhantomData<*const ()>,
}

#[derive(Debug)]
struct ActiveBlock {
    id: u64,
    track: Arc<TrackState>,
    platform: PlatformFacade,
    name: Cow<'static, str>,
    location: &'static Location<'static>,
    started_at: Duration,
}

impl BlockGuard {
    pub(crate) fn inactive() -> Self {
        Self {
            active: None,
            _single_threaded: PhantomData,
        }
    }

    /// Starts measuring, unless the track is disabled.
    pub(crate) fn start(
        track: Arc<TrackState>,
        platform: &PlatformFacade,
        name: Cow<'static, str>,
        location: &'static Location<'static>,
    ) -> Self {
        if !track.is_enabled() {
            return Self::inactive();
        }

        let id = NEXT_GUARD_ID.fetch_add(1, Ordering::Relaxed);
        push_active(id);

        // Read the clock last, so that our own bookkeeping is not part of the measurement.
        let started_at = platform.monotonic_time();

        Self {
            active: Some(ActiveBlock {
                id,
                track,
                platform: platform.clone(),
                name,
                location,
                started_at,
            }),
            _single_threaded: PhantomData,
        }
    }

    /// Whether this guard is measuring, i.e. whether profiling was enabled at every level when
    /// it was created.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// Stops measuring and records the block.
    ///
    /// Returns the index the block was assigned in its track, or `None` if the guard was
    /// inactive.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NonLifoExit`] if a guard created after this one on the same thread is
    /// still active. Nothing is recorded in that case.
    pub fn finish(mut self) -> Result<Option<usize>> {
        self.complete()
    }

    fn complete(&mut self) -> Result<Option<usize>> {
        let Some(active) = self.active.take() else {
            return Ok(None);
        };

        let ended_at = active.platform.monotonic_time();

        if !pop_active(active.id) {
            return Err(Error::NonLifoExit {
                track_index: active.track.track_index(),
                name: active.name.into_owned(),
            });
        }

        let duration_ns = u64::try_from(ended_at.saturating_sub(active.started_at).as_nanos())
            .unwrap_or(u64::MAX);

        Ok(Some(active.track.append(
            active.name,
            SourceLocation::from(active.location),
            duration_ns,
        )))
    }
}

impl Drop for BlockGuard {
    fn drop(&mut self) {
        if let Err(error) = self.complete() {
            warn!(%error, "discarding timing block that was exited out of order");
        }
    }
}

fn push_active(id: u64) {
    // If thread-local storage is already gone, the thread is exiting and there is nothing
    // left to nest with, so it is fine to skip tracking.
    ACTIVE_GUARDS
        .try_with(|stack| stack.borrow_mut().push(id))
        .unwrap_or_default();
}

/// Removes the guard from this thread's active stack.
///
/// Returns whether the guard was the innermost active one.
fn pop_active(id: u64) -> bool {
    ACTIVE_GUARDS
        .try_with(|stack| {
            let mut stack = stack.borrow_mut();

            if stack.last() == Some(&id) {
                stack.pop();
                return true;
            }

            stack.retain(|&active| active != id);
            false
        })
        .unwrap_or(true)
}
