//! Per-instrumentation-point aggregation of recorded blocks.

use std::collections::HashMap;

use crate::format::percent_of;
use crate::{Block, SourceLocation};

/// Aggregated timing of all blocks that came from one instrumentation point in one track.
///
/// # Examples
///
/// ```
/// use stichotrope::Profiler;
///
/// let profiler = Profiler::new("stats");
/// let parse = profiler.track(0, "parse");
///
/// for _ in 0..3 {
///     parse.call(|| std::hint::black_box(7 * 6));
/// }
///
/// let results = profiler.get_results();
/// let stats = results.track(0).unwrap().call_site_stats();
///
/// assert_eq!(stats.len(), 1);
/// assert_eq!(stats[0].name(), "parse");
/// assert_eq!(stats[0].hit_count(), 3);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CallSiteStats {
    name: String,
    location: SourceLocation,
    hit_count: u64,
    total_ns: u64,
    min_ns: u64,
    max_ns: u64,

    // Sum of every block in the track the call site belongs to.
    track_total_ns: u64,
}

impl CallSiteStats {
    pub(crate) fn collect(blocks: &[Block]) -> Vec<Self> {
        let mut positions: HashMap<(&str, &SourceLocation), usize> = HashMap::new();
        let mut stats: Vec<Self> = Vec::new();

        let track_total_ns = blocks
            .iter()
            .map(Block::duration_ns)
            .fold(0, u64::saturating_add);

        for block in blocks {
            let key = (block.name(), block.location());

            match positions.get(&key).and_then(|&position| stats.get_mut(position)) {
                Some(existing) => existing.add(block.duration_ns()),
                None => {
                    positions.insert(key, stats.len());
                    stats.push(Self::first(block, track_total_ns));
                }
            }
        }

        stats
    }

    fn first(block: &Block, track_total_ns: u64) -> Self {
        Self {
            name: block.name().to_string(),
            location: block.location().clone(),
            hit_count: 1,
            total_ns: block.duration_ns(),
            min_ns: block.duration_ns(),
            max_ns: block.duration_ns(),
            track_total_ns,
        }
    }

    fn add(&mut self, duration_ns: u64) {
        self.hit_count = self.hit_count.saturating_add(1);
        self.total_ns = self.total_ns.saturating_add(duration_ns);
        self.min_ns = self.min_ns.min(duration_ns);
        self.max_ns = self.max_ns.max(duration_ns);
    }

    /// The block name shared by the aggregated blocks.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Where the instrumentation point was declared.
    #[must_use]
    pub fn location(&self) -> &SourceLocation {
        &self.location
    }

    /// The number of aggregated blocks.
    #[must_use]
    pub fn hit_count(&self) -> u64 {
        self.hit_count
    }

    /// The sum of the aggregated durations, in nanoseconds.
    #[must_use]
    pub fn total_ns(&self) -> u64 {
        self.total_ns
    }

    /// The shortest aggregated duration, in nanoseconds.
    #[must_use]
    pub fn min_ns(&self) -> u64 {
        self.min_ns
    }

    /// The longest aggregated duration, in nanoseconds.
    #[must_use]
    pub fn max_ns(&self) -> u64 {
        self.max_ns
    }

    /// The mean aggregated duration, in nanoseconds, rounded down.
    #[must_use]
    pub fn mean_ns(&self) -> u64 {
        self.total_ns.checked_div(self.hit_count).unwrap_or_default()
    }

    /// The share of the track's total time spent at this call site, in percent.
    ///
    /// Zero if the track's total time is zero.
    #[must_use]
    pub fn percent_of_track(&self) -> f64 {
        percent_of(self.total_ns, self.track_total_ns)
    }

    /// The share of `total_ns` spent at this call site, in percent. Pass
    /// [`ProfilerResults::total_duration_ns()`](crate::ProfilerResults::total_duration_ns) to
    /// get the share of the whole session.
    ///
    /// Zero if `total_ns` is zero.
    #[must_use]
    pub fn percent_of_total(&self, total_ns: u64) -> f64 {
        percent_of(self.total_ns, total_ns)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::borrow::Cow;

    use super::*;

    fn block(block_index: usize, name: &'static str, line: u32, duration_ns: u64) -> Block {
        Block::new(
            block_index,
            Cow::Borrowed(name),
            SourceLocation::new("src/app.rs", line),
            duration_ns,
        )
    }

    #[test]
    fn no_blocks_no_stats() {
        assert!(CallSiteStats::collect(&[]).is_empty());
    }

    #[test]
    fn aggregates_same_call_site() {
        let blocks = [
            block(0, "query", 10, 1_000),
            block(1, "query", 10, 3_000),
            block(2, "query", 10, 2_000),
        ];

        let stats = CallSiteStats::collect(&blocks);
        assert_eq!(stats.len(), 1);

        let query = stats.first().unwrap();
        assert_eq!(query.hit_count(), 3);
        assert_eq!(query.total_ns(), 6_000);
        assert_eq!(query.min_ns(), 1_000);
        assert_eq!(query.max_ns(), 3_000);
        assert_eq!(query.mean_ns(), 2_000);
    }

    #[test]
    fn same_name_different_line_is_separate() {
        let blocks = [
            block(0, "query", 10, 1_000),
            block(1, "query", 20, 5_000),
            block(2, "query", 10, 1_000),
        ];

        let stats = CallSiteStats::collect(&blocks);
        assert_eq!(stats.len(), 2);
        assert_eq!(stats[0].location().line(), 10);
        assert_eq!(stats[0].hit_count(), 2);
        assert_eq!(stats[1].location().line(), 20);
        assert_eq!(stats[1].hit_count(), 1);
    }

    #[test]
    fn keeps_first_seen_order() {
        let blocks = [
            block(0, "b", 1, 10),
            block(1, "a", 1, 10),
            block(2, "b", 1, 10),
            block(3, "c", 1, 10),
        ];

        let names: Vec<_> = CallSiteStats::collect(&blocks)
            .iter()
            .map(|s| s.name().to_string())
            .collect();
        assert_eq!(names, vec!["b", "a", "c"]);
    }

    #[test]
    fn shares_of_track_and_total() {
        let blocks = [
            block(0, "query", 10, 1_000),
            block(1, "render", 20, 3_000),
        ];

        let stats = CallSiteStats::collect(&blocks);

        assert!((stats[0].percent_of_track() - 25.0).abs() < 1e-9);
        assert!((stats[1].percent_of_track() - 75.0).abs() < 1e-9);
        assert!((stats[0].percent_of_total(8_000) - 12.5).abs() < 1e-9);
    }

    #[test]
    fn zero_time_track_has_zero_shares() {
        let blocks = [block(0, "instant", 10, 0), block(1, "instant", 10, 0)];

        let stats = CallSiteStats::collect(&blocks);

        assert_eq!(stats[0].mean_ns(), 0);
        assert!(stats[0].percent_of_track().abs() < f64::EPSILON);
        assert!(stats[0].percent_of_total(0).abs() < f64::EPSILON);
    }
}
