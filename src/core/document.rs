//! The report document: everything one collection run produced.
//!
//! The document is assembled fully in memory before any output is written,
//! and it is the single source for both artifacts — the JSON file persists
//! it directly and the HTML page embeds the same serialization. Field names
//! are PascalCase on the wire and `null` means "not available", never a
//! defaulted zero or empty string.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::event_record::EventRecord;
use crate::core::hardware::HardwareProfile;
use crate::core::software::InstalledApplication;

/// Parameters and outcome of the run that produced a document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RunMetadata {
    /// When the run started, UTC.
    pub generated_at: DateTime<Utc>,
    /// Host the report describes, if the environment names one.
    pub machine_name: Option<String>,
    /// Account the run executed under, if the environment names one.
    pub user_name: Option<String>,
    /// Inclusive lower time bound applied to event queries.
    pub start_time: Option<DateTime<Utc>>,
    /// Inclusive upper time bound applied to event queries.
    pub end_time: Option<DateTime<Utc>>,
    /// Event-ID allowlist applied to event queries.
    pub event_ids: Option<Vec<u32>>,
    /// Per-category event cap that was in effect.
    pub max_events: u32,
    /// Accepted for compatibility with older invocations; warnings are
    /// always collected regardless of this value.
    pub include_warnings: bool,
    /// Collection errors in the order they occurred. Empty results are not
    /// errors; only failed collection steps appear here.
    pub errors: Vec<String>,
}

/// Collected events grouped by report category.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CategorisedEvents {
    pub application: Vec<EventRecord>,
    pub system: Vec<EventRecord>,
    pub hardware: Vec<EventRecord>,
}

impl CategorisedEvents {
    /// Total number of events across all categories.
    pub fn total(&self) -> usize {
        self.application.len() + self.system.len() + self.hardware.len()
    }
}

/// The complete report document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ReportDocument {
    pub metadata: RunMetadata,
    pub events: CategorisedEvents,
    pub hardware: HardwareProfile,
    pub applications: Vec<InstalledApplication>,
}

impl ReportDocument {
    /// Combine the collector outputs into one document. Pure aggregation:
    /// nothing is filtered, reordered or dropped here.
    pub fn assemble(
        metadata: RunMetadata,
        events: CategorisedEvents,
        hardware: HardwareProfile,
        applications: Vec<InstalledApplication>,
    ) -> Self {
        Self {
            metadata,
            events,
            hardware,
            applications,
        }
    }
}
