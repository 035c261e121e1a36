use std::fmt::Write as _;
use std::io::Write;

use crate::error::Result;
use crate::{ProfilerResults, format_duration_ns};

/// Renders the results as indented, human-readable text.
///
/// The output starts with the profiler name, followed by a header line per track and an
/// indented line per block with its name, source location and formatted duration. Each track
/// with blocks ends with a call site summary: one line per instrumentation point with its hit
/// count, total, mean, minimum and maximum time and its share of the track and session totals.
///
/// # Examples
///
/// ```
/// use stichotrope::{Profiler, to_console_string};
///
/// let profiler = Profiler::new("console");
/// profiler.set_track_name(0, "Requests");
/// drop(profiler.block(0, "handle"));
///
/// let text = to_console_string(&profiler.get_results());
/// assert!(text.starts_with("Profiler: console\n  Track 0 (Requests): 1 block, total "));
/// assert!(text.contains("    Call sites:\n      handle ("));
/// ```
#[must_use]
pub fn to_console_string(results: &ProfilerResults) -> String {
    let mut text = String::new();

    // Writing into a String cannot fail.
    _ = writeln!(text, "Profiler: {}", results.profiler_name());

    if results.tracks().is_empty() {
        text.push_str("  No tracks recorded.\n");
        return text;
    }

    let session_total_ns = results.total_duration_ns();

    for track in results.tracks() {
        _ = write!(text, "  Track {}", track.track_index());
        if let Some(name) = track.name() {
            _ = write!(text, " ({name})");
        }
        _ = writeln!(
            text,
            ": {}, total {}",
            counted(track.len(), "block", "blocks"),
            format_duration_ns(track.total_duration_ns())
        );

        for block in track.blocks() {
            _ = writeln!(
                text,
                "    [{}] {} ({}): {}",
                block.block_index(),
                block.name(),
                block.location(),
                format_duration_ns(block.duration_ns())
            );
        }

        if track.is_empty() {
            continue;
        }

        text.push_str("    Call sites:\n");
        for site in track.call_site_stats() {
            _ = writeln!(
                text,
                "      {} ({}): {}, total {}, mean {}, min {}, max {}, {:.1}% of track, {:.1}% of total",
                site.name(),
                site.location(),
                counted(usize::try_from(site.hit_count()).unwrap_or(usize::MAX), "hit", "hits"),
                format_duration_ns(site.total_ns()),
                format_duration_ns(site.mean_ns()),
                format_duration_ns(site.min_ns()),
                format_duration_ns(site.max_ns()),
                site.percent_of_track(),
                site.percent_of_total(session_total_ns)
            );
        }
    }

    text
}

fn counted(count: usize, singular: &str, plural: &str) -> String {
    if count == 1 {
        format!("{count} {singular}")
    } else {
        format!("{count} {plural}")
    }
}

/// Writes the console rendering of the results to a stream. See [`to_console_string()`].
///
/// # Errors
///
/// Returns [`Error::Io`](crate::Error::Io) if writing to the stream fails.
pub fn write_console(results: &ProfilerResults, mut writer: impl Write) -> Result<()> {
    writer.write_all(to_console_string(results).as_bytes())?;
    Ok(())
}

/// Prints the console rendering of the results to stdout. See [`to_console_string()`].
#[cfg_attr(test, mutants::skip)] // Too difficult to test stdout output reliably - manually tested.
pub fn print_results(results: &ProfilerResults) {
    print!("{}", to_console_string(results));
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::borrow::Cow;

    use super::*;
    use crate::{Block, SourceLocation, Track};

    #[test]
    fn empty_results() {
        let text = to_console_string(&ProfilerResults::new("idle", Vec::new()));
        assert_eq!(text, "Profiler: idle\n  No tracks recorded.\n");
    }

    fn block(block_index: usize, name: &'static str, line: u32, duration_ns: u64) -> Block {
        Block::new(
            block_index,
            Cow::Borrowed(name),
            SourceLocation::new("src/main.rs", line),
            duration_ns,
        )
    }

    #[test]
    fn renders_hierarchy() {
        let results = ProfilerResults::new(
            "app",
            vec![
                Track::new(
                    0,
                    Some("Requests".to_string()),
                    vec![block(0, "parse", 3, 500), block(1, "render", 9, 2_500_000)],
                ),
                Track::new(1, None, Vec::new()),
            ],
        );

        assert_eq!(
            to_console_string(&results),
            "Profiler: app\n\
             \x20 Track 0 (Requests): 2 blocks, total 2.50 ms\n\
             \x20   [0] parse (src/main.rs:3): 500 ns\n\
             \x20   [1] render (src/main.rs:9): 2.50 ms\n\
             \x20   Call sites:\n\
             \x20     parse (src/main.rs:3): 1 hit, total 500 ns, mean 500 ns, min 500 ns, max 500 ns, 0.0% of track, 0.0% of total\n\
             \x20     render (src/main.rs:9): 1 hit, total 2.50 ms, mean 2.50 ms, min 2.50 ms, max 2.50 ms, 100.0% of track, 100.0% of total\n\
             \x20 Track 1: 0 blocks, total 0 ns\n"
        );
    }

    #[test]
    fn call_site_summary_aggregates_across_tracks() {
        let results = ProfilerResults::new(
            "app",
            vec![
                Track::new(
                    0,
                    None,
                    vec![
                        block(0, "query", 5, 1_000),
                        block(1, "query", 5, 3_000),
                        block(2, "commit", 7, 4_000),
                    ],
                ),
                Track::new(1, None, vec![block(0, "io", 11, 8_000)]),
            ],
        );

        let text = to_console_string(&results);

        assert!(text.contains("  Track 0: 3 blocks, total 8000 ns\n"));
        assert!(text.contains("  Track 1: 1 block, total 8000 ns\n"));
        assert!(text.contains(
            "      query (src/main.rs:5): 2 hits, total 4000 ns, mean 2000 ns, min 1000 ns, max 3000 ns, 50.0% of track, 25.0% of total\n"
        ));
        assert!(text.contains(
            "      commit (src/main.rs:7): 1 hit, total 4000 ns, mean 4000 ns, min 4000 ns, max 4000 ns, 50.0% of track, 25.0% of total\n"
        ));
        assert!(text.contains(
            "      io (src/main.rs:11): 1 hit, total 8000 ns, mean 8000 ns, min 8000 ns, max 8000 ns, 100.0% of track, 50.0% of total\n"
        ));
    }

    #[test]
    fn zero_time_track_renders_zero_shares() {
        let results = ProfilerResults::new(
            "instant",
            vec![Track::new(0, None, vec![block(0, "noop", 1, 0), block(1, "noop", 1, 0)])],
        );

        assert_eq!(
            to_console_string(&results),
            "Profiler: instant\n\
             \x20 Track 0: 2 blocks, total 0 ns\n\
             \x20   [0] noop (src/main.rs:1): 0 ns\n\
             \x20   [1] noop (src/main.rs:1): 0 ns\n\
             \x20   Call sites:\n\
             \x20     noop (src/main.rs:1): 2 hits, total 0 ns, mean 0 ns, min 0 ns, max 0 ns, 0.0% of track, 0.0% of total\n"
        );
    }

    #[test]
    fn write_console_matches_string_form() {
        let results = ProfilerResults::new("stream", Vec::new());
        let mut buffer = Vec::new();

        write_console(&results, &mut buffer).unwrap();

        assert_eq!(String::from_utf8(buffer).unwrap(), to_console_string(&results));
    }
}
