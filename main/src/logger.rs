//! A small custom `log::Log` implementation, in the manner of the teacher's
//! `shadow_logger`: leveled, timestamped lines to stderr. Debug/trace
//! records are tagged by the channel they were logged against (`target`)
//! and only shown when that channel letter was requested via
//! `-d/--debug-flags`.

use std::collections::HashSet;
use std::time::Instant;

use log::{Level, LevelFilter, Log, Metadata, Record};

struct ChannelLogger {
    channels: HashSet<char>,
    start: Instant,
}

impl Log for ChannelLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        match metadata.level() {
            Level::Error | Level::Warn | Level::Info => true,
            Level::Debug | Level::Trace => metadata
                .target()
                .chars()
                .next()
                .is_some_and(|c| self.channels.contains(&c)),
        }
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let elapsed = self.start.elapsed();
        eprintln!(
            "[{:>6}.{:03}s] {:<5} {}",
            elapsed.as_secs(),
            elapsed.subsec_millis(),
            record.level(),
            record.args()
        );
    }

    fn flush(&self) {}
}

/// Initialize the global logger once. `debug_flags` is the raw
/// `-d/--debug-flags` string, e.g. `"cs"` to enable the compute and
/// scheduler channels.
pub fn init(debug_flags: &str) {
    let channels: HashSet<char> = debug_flags.chars().collect();
    let max_level = if channels.is_empty() {
        LevelFilter::Info
    } else {
        LevelFilter::Trace
    };
    let logger = ChannelLogger {
        channels,
        start: Instant::now(),
    };
    if log::set_boxed_logger(Box::new(logger)).is_ok() {
        log::set_max_level(max_level);
    }
}
