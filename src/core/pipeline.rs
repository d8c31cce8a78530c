//! The single-run collection pipeline.
//!
//! Executes the fixed stage list sequentially: three event categories,
//! hardware inventory, application inventory, document assembly, rendering
//! and bundle output. Event and application collectors are fault-isolated
//! (a failure is recorded in the document and the run continues); hardware
//! inventory and everything from assembly onwards is fatal.

use std::path::PathBuf;

use chrono::{DateTime, Utc};

use crate::core::document::{CategorisedEvents, ReportDocument, RunMetadata};
use crate::core::event_reader::{self, EventQuerySpec};
use crate::core::event_record::{Category, EventRecord};
use crate::core::{hardware, publisher_enumerator, software};
use crate::export::bundle::{self, BundlePaths};
use crate::export::html_report;
use crate::util::constants::{
    DEFAULT_MAX_EVENTS, HARDWARE_EVENT_CHANNEL, HARDWARE_EVENT_PROVIDERS, OUTPUT_DIR_PREFIX,
    OUTPUT_ROOT_DIR,
};
use crate::util::error::Result;
use crate::util::progress::ProgressReporter;
use crate::util::time::{format_duration, run_stamp};

/// Number of stages the pipeline reports progress for.
const PIPELINE_STAGES: usize = 8;

/// Everything one run needs to know, resolved from the command line.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Inclusive lower time bound for event queries.
    pub start_time: Option<DateTime<Utc>>,
    /// Inclusive upper time bound for event queries.
    pub end_time: Option<DateTime<Utc>>,
    /// Event-ID allowlist for event queries; `None` collects all IDs.
    pub event_ids: Option<Vec<u32>>,
    /// Cap on collected events per category.
    pub max_events: u32,
    /// Accepted for compatibility; warnings are always collected.
    pub include_warnings: bool,
    /// Parent directory for run output. Defaults to `out` under the
    /// current working directory.
    pub output_root: Option<PathBuf>,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            start_time: None,
            end_time: None,
            event_ids: None,
            max_events: DEFAULT_MAX_EVENTS,
            include_warnings: false,
            output_root: None,
        }
    }
}

/// What a completed run produced.
#[derive(Debug)]
pub struct RunSummary {
    /// Where the artifacts landed.
    pub paths: BundlePaths,
    /// Events collected across all categories.
    pub total_events: usize,
    /// Installed applications collected.
    pub application_count: usize,
    /// Collection errors recorded in the document.
    pub error_count: usize,
}

/// Execute one full collection run and write its output bundle.
///
/// Returns `Ok` even when individual collectors failed — those failures
/// travel inside the document — and `Err` only when the run cannot produce
/// a meaningful report at all (hardware inventory failure, render failure,
/// output I/O failure).
pub fn run_report(options: &RunOptions) -> Result<RunSummary> {
    let started = Utc::now();
    let clock = std::time::Instant::now();
    let mut progress = ProgressReporter::new(PIPELINE_STAGES);
    let mut errors: Vec<String> = Vec::new();
    let mut events = CategorisedEvents::default();

    progress.step("Collecting application events");
    events.application = collect_category(
        base_spec(Category::Application, "Application", options),
        &mut errors,
    );

    progress.step("Collecting system events");
    events.system = collect_category(base_spec(Category::System, "System", options), &mut errors);

    progress.step("Collecting hardware events");
    events.hardware = collect_hardware_events(options, &mut errors);

    progress.step("Collecting hardware inventory");
    let hardware = hardware::collect_hardware()?;

    progress.step("Collecting installed applications");
    let applications = match software::collect_applications() {
        Ok(apps) => apps,
        Err(e) => {
            tracing::error!("Application inventory failed: {e}");
            errors.push(format!("Application inventory: {e}"));
            Vec::new()
        }
    };

    progress.step("Assembling report document");
    let metadata = RunMetadata {
        generated_at: started,
        machine_name: first_env(&["COMPUTERNAME", "HOSTNAME"]),
        user_name: first_env(&["USERNAME", "USER"]),
        start_time: options.start_time,
        end_time: options.end_time,
        event_ids: options.event_ids.clone(),
        max_events: options.max_events,
        include_warnings: options.include_warnings,
        errors,
    };
    let document = ReportDocument::assemble(metadata, events, hardware, applications);

    progress.step("Rendering report page");
    let html = html_report::render_report(&document)?;

    progress.step("Writing output bundle");
    let stamp = run_stamp(&started);
    let output_root = options
        .output_root
        .clone()
        .unwrap_or_else(|| PathBuf::from(OUTPUT_ROOT_DIR));
    let output_dir = output_root.join(format!("{OUTPUT_DIR_PREFIX}{stamp}"));
    let paths = bundle::write_bundle(&output_dir, &stamp, &document, &html)?;

    tracing::info!(
        "Run complete in {}: {} events, {} applications, {} collection error(s)",
        format_duration(clock.elapsed()),
        document.events.total(),
        document.applications.len(),
        document.metadata.errors.len()
    );

    Ok(RunSummary {
        paths,
        total_events: document.events.total(),
        application_count: document.applications.len(),
        error_count: document.metadata.errors.len(),
    })
}

/// Build the query spec shared by the fixed-channel categories.
fn base_spec(category: Category, log_name: &str, options: &RunOptions) -> EventQuerySpec {
    EventQuerySpec {
        category,
        log_name: log_name.to_string(),
        providers: None,
        start_time: options.start_time,
        end_time: options.end_time,
        event_ids: options.event_ids.clone(),
        max_events: options.max_events,
    }
}

/// Run one category query, converting failure into a recorded error plus an
/// empty result so the remaining categories still run.
fn collect_category(spec: EventQuerySpec, errors: &mut Vec<String>) -> Vec<EventRecord> {
    let category = spec.category;
    match event_reader::collect_events(&spec) {
        Ok(records) => {
            tracing::info!("{} events: {} collected", category.as_str(), records.len());
            records
        }
        Err(e) => {
            tracing::error!("{} event collection failed: {e}", category.as_str());
            errors.push(format!("{} events: {e}", category.as_str()));
            Vec::new()
        }
    }
}

/// Collect the hardware event category from the System log.
///
/// The configured provider list is narrowed against the publishers actually
/// registered on this host before the query is built. If none of them is
/// registered there is nothing to ask for: the category stays empty and one
/// error is recorded, without issuing a query.
fn collect_hardware_events(options: &RunOptions, errors: &mut Vec<String>) -> Vec<EventRecord> {
    let registered = match publisher_enumerator::enumerate_publishers() {
        Ok(publishers) => publishers,
        Err(e) => {
            tracing::error!("Publisher enumeration failed: {e}");
            errors.push(format!("Hardware events: {e}"));
            return Vec::new();
        }
    };

    let providers = publisher_enumerator::narrow_providers(HARDWARE_EVENT_PROVIDERS, &registered);
    if providers.is_empty() {
        tracing::warn!("Hardware events: no configured provider is registered on this host");
        errors.push("Hardware events: no configured provider is registered on this host".into());
        return Vec::new();
    }
    tracing::debug!(
        "Hardware event query narrowed to {} of {} configured providers",
        providers.len(),
        HARDWARE_EVENT_PROVIDERS.len()
    );

    let mut spec = base_spec(Category::Hardware, HARDWARE_EVENT_CHANNEL, options);
    spec.providers = Some(providers);
    collect_category(spec, errors)
}

/// First non-empty value among the named environment variables.
fn first_env(names: &[&str]) -> Option<String> {
    names
        .iter()
        .filter_map(|name| std::env::var(name).ok())
        .map(|value| value.trim().to_string())
        .find(|value| !value.is_empty())
}
