#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Block-level execution time profiling.
//!
//! This package lets you mark arbitrary regions of code for timing, organize the measurements
//! into independent logical groups ("tracks") and export the results as CSV, JSON or
//! human-readable text. It sits between function-level profilers, which are too coarse, and
//! line-level profilers, which cost too much: you decide exactly what is measured by
//! instrumenting it explicitly.
//!
//! Instrumentation is cheap enough to leave in production code. When profiling is turned off,
//! instrumented code runs without reading the clock, looking up tracks or allocating.
//!
//! The core functionality includes:
//! - [`Profiler`] - A profiling session that owns tracks and their recorded blocks
//! - [`Tracker`] - Wraps callables so that every call is timed
//! - [`BlockGuard`] - Times a scope between creation and drop
//! - [`ProfilerResults`] - An immutable snapshot of everything recorded by a session
//! - Exporters - [`to_csv_string()`], [`to_json_string()`], [`to_console_string()`] and their
//!   stream and file variants
//!
//! # Simple usage
//!
//! ```
//! use stichotrope::Profiler;
//!
//! # fn main() {
//! let profiler = Profiler::new("MyApp");
//!
//! // Decorator style: every call of the wrapped closure is recorded into track 0.
//! let process_data = profiler
//!     .track(0, "process_data")
//!     .wrap_with(|data: Vec<u32>| data.iter().sum::<u32>());
//!
//! // Scoped style: the block is recorded into track 1 when `_query` is dropped.
//! let total = {
//!     let _query = profiler.block(1, "database_query");
//!     process_data(vec![1, 2, 3])
//! };
//! assert_eq!(total, 6);
//!
//! profiler.print_results();
//! # }
//! ```
//!
//! # Enabling and disabling
//!
//! A block is recorded only if all three levels allow it:
//!
//! 1. The global switch ([`set_global_enabled()`], or a custom [`GlobalSwitch`]).
//! 2. The session ([`Profiler::start()`] and [`Profiler::stop()`]).
//! 3. The track ([`Profiler::set_track_enabled()`]).
//!
//! ```
//! use stichotrope::Profiler;
//!
//! let profiler = Profiler::new("switches");
//! profiler.set_track_enabled(1, false);
//!
//! drop(profiler.block(0, "recorded"));
//! drop(profiler.block(1, "not_recorded"));
//!
//! profiler.stop();
//! drop(profiler.block(0, "not_recorded_either"));
//!
//! let results = profiler.get_results();
//! assert_eq!(results.track(0).unwrap().len(), 1);
//! assert!(results.track(1).unwrap().is_empty());
//! ```
//!
//! # Exporting
//!
//! ```no_run
//! use stichotrope::{Profiler, export_csv, export_json};
//!
//! # fn main() -> Result<(), stichotrope::Error> {
//! let profiler = Profiler::new("export");
//! drop(profiler.block(0, "work"));
//!
//! let results = profiler.get_results();
//! export_csv(&results, "results.csv")?;
//! export_json(&results, "results.json")?;
//! # Ok(())
//! # }
//! ```
//!
//! # Threading
//!
//! A [`Profiler`] can be shared between threads (or cloned into them) and used concurrently
//! without external synchronization. Block indexes within a track stay unique and contiguous,
//! in the order measurements complete. A [`BlockGuard`] must stay on the thread that created
//! it; nesting of guards is tracked per thread.

mod builder;
mod error;
mod export;
mod format;
mod global;
mod guard;
mod pal;
mod profiler;
mod results;
mod stats;
mod track_state;
mod tracker;

pub use builder::ProfilerBuilder;
pub use error::Error;
pub use export::console::{print_results, to_console_string, write_console};
pub use export::csv::{CSV_HEADER, export_csv, to_csv_string, write_csv};
pub use export::json::{export_json, parse_json, to_json_string, write_json};
pub use format::format_duration_ns;
pub use global::{GlobalSwitch, is_global_enabled, set_global_enabled};
pub use guard::BlockGuard;
pub use profiler::Profiler;
pub use results::{Block, ProfilerResults, SourceLocation, Track};
pub use stats::CallSiteStats;
pub use tracker::Tracker;

pub(crate) const ERR_POISONED_LOCK: &str = "profiler state lock should never be poisoned";
