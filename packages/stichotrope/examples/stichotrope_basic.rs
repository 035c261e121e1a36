//! Demonstrates scoped and decorator instrumentation, track controls and the exporters.
//!
//! Run with: `cargo run --example stichotrope_basic`.
#![expect(
    clippy::unseparated_literal_suffix,
    reason = "this is example code that does not need production-level safety"
)]

use std::collections::HashMap;
use std::fmt::Write;
use std::hint::black_box;

use stichotrope::{Profiler, to_csv_string, to_json_string};

fn main() {
    println!("=== Block Profiling Example ===");
    println!();

    let profiler = Profiler::builder("example")
        .track_name(0, "main")
        .track_name(1, "helpers")
        .build();

    // Decorator instrumentation: every call of `checksum` becomes a block on track 1.
    let checksum = profiler.track(1, "checksum").wrap_with(|text: String| {
        text.bytes()
            .fold(0u64, |sum, byte| sum.wrapping_mul(31).wrapping_add(u64::from(byte)))
    });

    {
        let _outer = profiler.block(0, "build_strings");

        for i in 0..10 {
            let mut text = String::new();
            for j in 0..2000 {
                write!(text, "String number {i}-{j} with some content. ").unwrap();
            }
            black_box(checksum(text));
        }
    }

    {
        let _outer = profiler.block(0, "hashmap");

        let mut map = HashMap::new();
        for i in 0..10_000 {
            map.insert(format!("key{i}"), i);
        }
        for i in 0..10_000 {
            black_box(map.get(&format!("key{i}")));
        }
    }

    // Blocks on a disabled track are not recorded, but the code inside still runs.
    profiler.set_track_enabled(1, false);
    black_box(checksum("not recorded".to_string()));
    profiler.set_track_enabled(1, true);

    profiler.print_results();
    println!();

    let results = profiler.get_results();
    for track in results.tracks() {
        for site in track.call_site_stats() {
            println!(
                "{} at {}: {} hits, mean {} ns",
                site.name(),
                site.location(),
                site.hit_count(),
                site.mean_ns()
            );
        }
    }
    println!();

    println!("CSV:");
    print!("{}", to_csv_string(&results));
    println!();

    println!("JSON:");
    println!("{}", to_json_string(&results).unwrap());
}
