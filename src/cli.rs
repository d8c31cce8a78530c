//! Command-line interface for BlueBox.
//!
//! One subcommand-free surface: time window, event-ID allowlist, per-category
//! cap and output location. Parsed options resolve into
//! [`RunOptions`](crate::core::pipeline::RunOptions) for the pipeline.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use clap::Parser;

use crate::core::pipeline::RunOptions;
use crate::util::constants::DEFAULT_MAX_EVENTS;
use crate::util::error::BlueBoxError;
use crate::util::time::parse_datetime_input;

#[derive(Parser, Debug)]
#[command(
    name = "BlueBox",
    version,
    about = "Single-run Windows diagnostics report generator",
    long_about = "Collects Critical, Error and Warning entries from the Application and \n\
        System event logs plus hardware-related providers, a WMI hardware \n\
        inventory and the installed-application list, then writes a timestamped \n\
        bundle (JSON document, self-contained HTML report and zip archive) \n\
        under the output directory.",
    after_long_help = "Examples:\n  BlueBox\n  BlueBox --start-time \"2026-08-01 00:00\" --end-time \"2026-08-21 23:59\"\n  BlueBox --event-ids 41,6008,1001 --max-events 500\n  BlueBox --output-dir D:\\Reports"
)]
pub struct Cli {
    /// Inclusive lower bound on event timestamps (RFC 3339,
    /// "YYYY-MM-DD HH:MM[:SS]" or "YYYY-MM-DD")
    #[arg(long, value_parser = parse_time_arg)]
    pub start_time: Option<DateTime<Utc>>,

    /// Inclusive upper bound on event timestamps (same formats as --start-time)
    #[arg(long, value_parser = parse_time_arg)]
    pub end_time: Option<DateTime<Utc>>,

    /// Only collect these event IDs, comma separated. Omit to collect all IDs
    #[arg(long, num_args = 0.., value_delimiter = ',')]
    pub event_ids: Option<Vec<u32>>,

    /// Maximum number of events collected per category
    #[arg(long, default_value_t = DEFAULT_MAX_EVENTS)]
    pub max_events: u32,

    /// Parent directory for run output (default: "out" under the current directory)
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Accepted for compatibility with older invocations; warnings are always collected
    #[arg(long, default_value_t = false)]
    pub include_warnings: bool,

    /// Only log errors to the console
    #[arg(long, short = 'q', default_value_t = false)]
    pub quiet: bool,
}

impl Cli {
    /// Resolve the parsed arguments into pipeline options.
    ///
    /// An explicitly empty `--event-ids` list means "no allowlist", the same
    /// as omitting the flag.
    pub fn into_run_options(self) -> RunOptions {
        RunOptions {
            start_time: self.start_time,
            end_time: self.end_time,
            event_ids: self.event_ids.filter(|ids| !ids.is_empty()),
            max_events: self.max_events,
            include_warnings: self.include_warnings,
            output_root: self.output_dir,
        }
    }
}

fn parse_time_arg(input: &str) -> Result<DateTime<Utc>, BlueBoxError> {
    parse_datetime_input(input).ok_or_else(|| {
        BlueBoxError::InvalidArgument(format!(
            "unrecognised date/time {input:?} (expected RFC 3339, \
             \"YYYY-MM-DD HH:MM[:SS]\" or \"YYYY-MM-DD\")"
        ))
    })
}
