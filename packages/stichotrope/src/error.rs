use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors reported by the profiler and its exporters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// A scoped timing block was exited while a block entered after it on the same thread
    /// was still active. Nothing was recorded for the block that exited out of order.
    #[error(
        "block '{name}' on track {track_index} was exited before a block entered after it; blocks must be exited in reverse order of entry"
    )]
    NonLifoExit {
        /// The track the rejected block would have been recorded into.
        track_index: usize,

        /// The name of the rejected block.
        name: String,
    },

    /// The export destination cannot be written to. Nothing was created at the destination.
    #[error("invalid export destination '{}': {problem}", path.display())]
    InvalidDestination {
        /// The destination the caller asked for.
        path: PathBuf,

        /// A human-readable description of the problem.
        problem: String,
    },

    /// Writing an export file failed.
    #[error("failed to write export file '{}'", path.display())]
    Export {
        /// The file that was being written.
        path: PathBuf,

        /// The underlying I/O error.
        source: io::Error,
    },

    /// Writing to a caller-supplied stream failed.
    #[error("failed to write to the output stream")]
    Io(#[from] io::Error),

    /// The results could not be serialized as JSON, or the JSON given to the parser was not
    /// valid profiler results.
    #[error("invalid profiler results JSON")]
    Json(#[from] serde_json::Error),

    /// The JSON given to the parser was well-formed but described results that a profiler
    /// cannot produce, such as a duplicated track or gaps in the block numbering.
    #[error("inconsistent profiler results: {problem}")]
    InvalidResults {
        /// A human-readable description of the inconsistency.
        problem: String,
    },
}

/// A specialized `Result` type for profiler operations, returning the crate's
/// [`Error`] type as the error value.
pub(crate) type Result<T> = std::result::Result<T, Error>;
