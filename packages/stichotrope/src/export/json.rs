use std::borrow::Cow;
use std::collections::BTreeSet;
use std::io::Write;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::{Block, Error, ProfilerResults, SourceLocation, Track};

// The JSON document shape. Key names are part of the compatibility surface.

#[derive(Debug, Deserialize, Serialize)]
struct ResultsDocument {
    profiler_name: String,
    tracks: Vec<TrackDocument>,
}

#[derive(Debug, Deserialize, Serialize)]
struct TrackDocument {
    track_index: usize,
    #[serde(default)]
    track_name: Option<String>,
    blocks: Vec<BlockDocument>,
}

#[derive(Debug, Deserialize, Serialize)]
struct BlockDocument {
    block_index: usize,
    name: String,
    file: String,
    line: u32,
    duration_ns: u64,

    // Derived from `duration_ns` on output and ignored on input.
    #[serde(default, skip_deserializing)]
    duration_ms: f64,
    #[serde(default, skip_deserializing)]
    duration_s: f64,
}

impl From<&ProfilerResults> for ResultsDocument {
    fn from(results: &ProfilerResults) -> Self {
        Self {
            profiler_name: results.profiler_name().to_string(),
            tracks: results.tracks().iter().map(TrackDocument::from).collect(),
        }
    }
}

impl From<&Track> for TrackDocument {
    fn from(track: &Track) -> Self {
        Self {
            track_index: track.track_index(),
            track_name: track.name().map(str::to_string),
            blocks: track.blocks().iter().map(BlockDocument::from).collect(),
        }
    }
}

impl From<&Block> for BlockDocument {
    fn from(block: &Block) -> Self {
        Self {
            block_index: block.block_index(),
            name: block.name().to_string(),
            file: block.location().file().to_string(),
            line: block.location().line(),
            duration_ns: block.duration_ns(),
            duration_ms: block.duration_ms(),
            duration_s: block.duration_s(),
        }
    }
}

impl TryFrom<ResultsDocument> for ProfilerResults {
    type Error = Error;

    fn try_from(document: ResultsDocument) -> Result<Self> {
        let mut seen_tracks = BTreeSet::new();
        let mut tracks = Vec::with_capacity(document.tracks.len());

        for track in document.tracks {
            if !seen_tracks.insert(track.track_index) {
                return Err(Error::InvalidResults {
                    problem: format!("track {} appears more than once", track.track_index),
                });
            }

            tracks.push(Track::try_from(track)?);
        }

        Ok(Self::new(document.profiler_name, tracks))
    }
}

impl TryFrom<TrackDocument> for Track {
    type Error = Error;

    fn try_from(track: TrackDocument) -> Result<Self> {
        let mut blocks = Vec::with_capacity(track.blocks.len());

        for (position, block) in track.blocks.into_iter().enumerate() {
            // Block indexes are assigned 0, 1, 2... in completion order and stored in that
            // order, so anything else cannot have come from a profiler.
            if block.block_index != position {
                return Err(Error::InvalidResults {
                    problem: format!(
                        "track {} has block index {} at position {position}",
                        track.track_index, block.block_index
                    ),
                });
            }

            blocks.push(Block::new(
                block.block_index,
                Cow::Owned(block.name),
                SourceLocation::new(block.file, block.line),
                block.duration_ns,
            ));
        }

        Ok(Self::new(track.track_index, track.track_name, blocks))
    }
}

/// Renders the results as a pretty-printed JSON document.
///
/// The document has the shape
/// `{profiler_name, tracks: [{track_index, track_name, blocks: [{block_index, name, file,
/// line, duration_ns, duration_ms, duration_s}]}]}`, with tracks ordered by track index and
/// blocks by block index. `track_name` is `null` for tracks without a display name.
///
/// # Errors
///
/// Returns [`Error::Json`](crate::Error::Json) if serialization fails.
///
/// # Examples
///
/// ```
/// use stichotrope::{Profiler, parse_json, to_json_string};
///
/// let profiler = Profiler::new("json");
/// drop(profiler.block(0, "work"));
///
/// let results = profiler.get_results();
/// let json = to_json_string(&results).unwrap();
/// assert!(json.contains("\"profiler_name\": \"json\""));
///
/// assert_eq!(parse_json(&json).unwrap(), results);
/// ```
pub fn to_json_string(results: &ProfilerResults) -> Result<String> {
    Ok(serde_json::to_string_pretty(&ResultsDocument::from(results))?)
}

/// Writes the results as JSON to a stream. See [`to_json_string()`] for the format.
///
/// # Errors
///
/// Returns [`Error::Json`](crate::Error::Json) if serialization fails and
/// [`Error::Io`](crate::Error::Io) if writing to the stream fails.
pub fn write_json(results: &ProfilerResults, mut writer: impl Write) -> Result<()> {
    writer.write_all(to_json_string(results)?.as_bytes())?;
    Ok(())
}

/// Writes the results as JSON to a file, replacing any existing file. See
/// [`to_json_string()`] for the format.
///
/// # Errors
///
/// Returns [`Error::InvalidDestination`](crate::Error::InvalidDestination) if `path` cannot
/// be a file (it is empty, names a directory or its parent directory does not exist),
/// [`Error::Json`](crate::Error::Json) if serialization fails and
/// [`Error::Export`](crate::Error::Export) if writing the file fails.
pub fn export_json(results: &ProfilerResults, path: impl AsRef<Path>) -> Result<()> {
    let json = to_json_string(results)?;
    super::write_file(path.as_ref(), json.as_bytes(), "json")
}

/// Reads results back from a JSON document in the format produced by [`to_json_string()`].
///
/// The derived `duration_ms` and `duration_s` values are ignored; durations are taken from
/// `duration_ns`.
///
/// # Errors
///
/// Returns [`Error::Json`](crate::Error::Json) if the input is not such a document and
/// [`Error::InvalidResults`](crate::Error::InvalidResults) if the document lists a track more
/// than once or a track's block indexes are not `0, 1, 2...` in order.
pub fn parse_json(json: &str) -> Result<ProfilerResults> {
    let document: ResultsDocument = serde_json::from_str(json)?;
    document.try_into()
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use serde_json::Value;

    use super::*;

    fn results() -> ProfilerResults {
        ProfilerResults::new(
            "json",
            vec![
                Track::new(
                    0,
                    Some("Requests".to_string()),
                    vec![Block::new(
                        0,
                        Cow::Borrowed("handle"),
                        SourceLocation::new("src/server.rs", 88),
                        3_000_000,
                    )],
                ),
                Track::new(3, None, Vec::new()),
            ],
        )
    }

    #[test]
    fn document_has_fixed_keys() {
        let json = to_json_string(&results()).unwrap();
        let value: Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["profiler_name"], "json");
        assert_eq!(value["tracks"][0]["track_index"], 0);
        assert_eq!(value["tracks"][0]["track_name"], "Requests");
        assert_eq!(value["tracks"][1]["track_name"], Value::Null);
        assert_eq!(value["tracks"][1]["blocks"], Value::Array(Vec::new()));

        let block = &value["tracks"][0]["blocks"][0];
        assert_eq!(block["block_index"], 0);
        assert_eq!(block["name"], "handle");
        assert_eq!(block["file"], "src/server.rs");
        assert_eq!(block["line"], 88);
        assert_eq!(block["duration_ns"], 3_000_000);
        assert_eq!(block["duration_ms"], 3.0);
        assert_eq!(block["duration_s"], 0.003);
    }

    #[test]
    fn parses_own_output() {
        let results = results();
        let parsed = parse_json(&to_json_string(&results).unwrap()).unwrap();

        assert_eq!(parsed, results);
    }

    #[test]
    fn derived_columns_are_optional_on_input() {
        let json = r#"{
            "profiler_name": "external",
            "tracks": [
                {
                    "track_index": 2,
                    "blocks": [
                        { "block_index": 0, "name": "x", "file": "a.rs", "line": 1, "duration_ns": 5 }
                    ]
                }
            ]
        }"#;

        let parsed = parse_json(json).unwrap();
        let track = parsed.track(2).unwrap();

        assert_eq!(track.name(), None);
        assert_eq!(track.blocks()[0].duration_ns(), 5);
    }

    #[test]
    fn malformed_input_is_json_error() {
        let error = parse_json("{\"profiler_name\": 1}").unwrap_err();
        assert!(matches!(error, Error::Json(_)));
    }

    #[test]
    fn duplicate_track_is_rejected() {
        let json = r#"{
            "profiler_name": "external",
            "tracks": [
                { "track_index": 0, "blocks": [] },
                { "track_index": 0, "blocks": [] }
            ]
        }"#;

        let error = parse_json(json).unwrap_err();
        assert!(matches!(error, Error::InvalidResults { .. }));
        assert!(error.to_string().contains("track 0"));
    }

    #[test]
    fn block_index_gap_is_rejected() {
        let json = r#"{
            "profiler_name": "external",
            "tracks": [
                {
                    "track_index": 1,
                    "blocks": [
                        { "block_index": 0, "name": "x", "file": "a.rs", "line": 1, "duration_ns": 5 },
                        { "block_index": 2, "name": "x", "file": "a.rs", "line": 1, "duration_ns": 5 }
                    ]
                }
            ]
        }"#;

        let error = parse_json(json).unwrap_err();
        assert!(matches!(error, Error::InvalidResults { .. }));
    }

    #[test]
    fn repeated_block_index_is_rejected() {
        let json = r#"{
            "profiler_name": "external",
            "tracks": [
                {
                    "track_index": 0,
                    "blocks": [
                        { "block_index": 5, "name": "x", "file": "a.rs", "line": 1, "duration_ns": 5 },
                        { "block_index": 5, "name": "x", "file": "a.rs", "line": 1, "duration_ns": 5 }
                    ]
                }
            ]
        }"#;

        let error = parse_json(json).unwrap_err();
        assert!(matches!(error, Error::InvalidResults { .. }));
    }

    #[test]
    fn tracks_in_any_order_are_accepted() {
        let json = r#"{
            "profiler_name": "external",
            "tracks": [
                { "track_index": 4, "blocks": [] },
                { "track_index": 1, "blocks": [] }
            ]
        }"#;

        let parsed = parse_json(json).unwrap();
        let indexes: Vec<_> = parsed.tracks().iter().map(Track::track_index).collect();
        assert_eq!(indexes, vec![1, 4]);
    }
}
