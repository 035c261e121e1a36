//! Point-in-time snapshots of what a profiler has recorded.

use std::borrow::Cow;
use std::fmt;
use std::panic::Location;
use std::time::Duration;

use crate::format::{nanos_to_millis, nanos_to_seconds};
use crate::{CallSiteStats, export};

/// Immutable snapshot of everything a [`Profiler`](crate::Profiler) recorded.
///
/// Obtained from [`Profiler::get_results()`](crate::Profiler::get_results). The snapshot is a
/// copy: later activity in the profiler does not change it. It can be sent to other threads
/// and handed to any of the exporters.
///
/// # Examples
///
/// ```
/// use stichotrope::Profiler;
///
/// let profiler = Profiler::new("example");
/// {
///     let _block = profiler.block(0, "work");
///     std::hint::black_box(42);
/// }
///
/// let results = profiler.get_results();
/// assert_eq!(results.profiler_name(), "example");
/// assert_eq!(results.block_count(), 1);
///
/// for track in results.tracks() {
///     for block in track.blocks() {
///         println!("{}: {} ns", block.name(), block.duration_ns());
///     }
/// }
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProfilerResults {
    profiler_name: String,

    // Sorted by track index.
    tracks: Vec<Track>,
}

impl ProfilerResults {
    pub(crate) fn new(profiler_name: impl Into<String>, mut tracks: Vec<Track>) -> Self {
        tracks.sort_by_key(Track::track_index);

        Self {
            profiler_name: profiler_name.into(),
            tracks,
        }
    }

    /// The name of the profiler the snapshot was taken from.
    #[must_use]
    pub fn profiler_name(&self) -> &str {
        &self.profiler_name
    }

    /// The tracks, in ascending order of track index.
    #[must_use]
    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    /// The track with the given index, if that track has been used.
    #[must_use]
    pub fn track(&self, track_index: usize) -> Option<&Track> {
        self.tracks
            .binary_search_by_key(&track_index, Track::track_index)
            .ok()
            .and_then(|position| self.tracks.get(position))
    }

    /// The number of blocks across all tracks.
    #[must_use]
    pub fn block_count(&self) -> usize {
        self.tracks.iter().map(Track::len).sum()
    }

    /// The sum of all block durations across all tracks, in nanoseconds.
    #[must_use]
    pub fn total_duration_ns(&self) -> u64 {
        self.tracks
            .iter()
            .map(Track::total_duration_ns)
            .fold(0, u64::saturating_add)
    }

    /// Whether no blocks have been recorded.
    ///
    /// Tracks may exist without blocks, for example after a track was disabled before any
    /// block was recorded into it.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tracks.iter().all(Track::is_empty)
    }
}

impl fmt::Display for ProfilerResults {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&export::console::to_console_string(self))
    }
}

/// The blocks recorded into one track, in the order they completed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Track {
    track_index: usize,
    name: Option<String>,
    blocks: Vec<Block>,
}

impl Track {
    pub(crate) fn new(track_index: usize, name: Option<String>, blocks: Vec<Block>) -> Self {
        Self {
            track_index,
            name,
            blocks,
        }
    }

    /// The caller-assigned index identifying this track.
    #[must_use]
    pub fn track_index(&self) -> usize {
        self.track_index
    }

    /// The display name assigned with
    /// [`Profiler::set_track_name()`](crate::Profiler::set_track_name), if any.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// The recorded blocks. The position of each block equals its block index.
    #[must_use]
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// The number of recorded blocks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Whether no blocks have been recorded into this track.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// The sum of all block durations in this track, in nanoseconds.
    #[must_use]
    pub fn total_duration_ns(&self) -> u64 {
        self.blocks
            .iter()
            .map(Block::duration_ns)
            .fold(0, u64::saturating_add)
    }

    /// Aggregated statistics per instrumentation point, in the order the points were first
    /// seen in this track.
    ///
    /// An instrumentation point is a distinct combination of block name and source location.
    #[must_use]
    pub fn call_site_stats(&self) -> Vec<CallSiteStats> {
        CallSiteStats::collect(&self.blocks)
    }
}

/// One measured execution of an instrumented region.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Block {
    block_index: usize,
    name: Cow<'static, str>,
    location: SourceLocation,
    duration_ns: u64,
}

impl Block {
    pub(crate) fn new(
        block_index: usize,
        name: Cow<'static, str>,
        location: SourceLocation,
        duration_ns: u64,
    ) -> Self {
        Self {
            block_index,
            name,
            location,
            duration_ns,
        }
    }

    /// The position of this block in its track, starting at 0.
    #[must_use]
    pub fn block_index(&self) -> usize {
        self.block_index
    }

    /// The caller-supplied label.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Where the instrumentation that produced this block was declared.
    #[must_use]
    pub fn location(&self) -> &SourceLocation {
        &self.location
    }

    /// The elapsed time in nanoseconds.
    #[must_use]
    pub fn duration_ns(&self) -> u64 {
        self.duration_ns
    }

    /// The elapsed time.
    #[must_use]
    pub fn duration(&self) -> Duration {
        Duration::from_nanos(self.duration_ns)
    }

    /// The elapsed time in milliseconds, derived from [`duration_ns()`](Self::duration_ns).
    #[must_use]
    pub fn duration_ms(&self) -> f64 {
        nanos_to_millis(self.duration_ns)
    }

    /// The elapsed time in seconds, derived from [`duration_ns()`](Self::duration_ns).
    #[must_use]
    pub fn duration_s(&self) -> f64 {
        nanos_to_seconds(self.duration_ns)
    }
}

/// A file path and line number identifying where instrumentation was declared.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct SourceLocation {
    file: Cow<'static, str>,
    line: u32,
}

impl SourceLocation {
    /// Creates a source location.
    #[must_use]
    pub fn new(file: impl Into<Cow<'static, str>>, line: u32) -> Self {
        Self {
            file: file.into(),
            line,
        }
    }

    /// The source file path, as reported by the compiler.
    #[must_use]
    pub fn file(&self) -> &str {
        &self.file
    }

    /// The 1-based line number.
    #[must_use]
    pub fn line(&self) -> u32 {
        self.line
    }
}

impl From<&'static Location<'static>> for SourceLocation {
    fn from(location: &'static Location<'static>) -> Self {
        Self {
            file: Cow::Borrowed(location.file()),
            line: location.line(),
        }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}
