//! Canonical data structure for a single collected event log entry.
//!
//! Every entry is parsed from the XML rendered by `EvtRender` into this
//! struct, already normalized to the shape the report document persists.

use chrono::{DateTime, Utc};

/// Report category an event was collected under.
///
/// Serializes as the bare variant name (`"Application"`, `"System"`,
/// `"Hardware"`), which is also how the report page filters rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Category {
    Application,
    System,
    Hardware,
}

impl Category {
    /// Display name, used for log lines and collection error prefixes.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Application => "Application",
            Category::System => "System",
            Category::Hardware => "Hardware",
        }
    }
}

/// Represents a single normalized event log entry.
///
/// All fields are extracted from the XML rendered by `EvtRender`. The struct
/// is immutable once produced; serialization names are PascalCase to match
/// the persisted report document.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct EventRecord {
    /// Category this event was collected under.
    pub category: Category,

    /// The log channel this event came from (e.g. `"Application"`, `"System"`).
    pub log_name: String,

    /// Timestamp of the event in UTC.
    pub time_created: DateTime<Utc>,

    /// Severity label derived from the numeric ETW level
    /// (`"Critical"`, `"Error"` or `"Warning"` for collected events).
    pub level: String,

    /// Event ID — the numeric identifier for this event type.
    pub event_id: u32,

    /// The event provider / source name.
    pub provider: String,

    /// Task category display name, if the provider metadata resolves one.
    pub task: Option<String>,

    /// Record number within the source log, if present.
    pub record_id: Option<u64>,

    /// The formatted / rendered message string. Falls back to the raw event
    /// data pairs when the provider metadata is unavailable on this machine.
    pub message: String,
}

impl EventRecord {
    /// Returns the human-readable level name for a given numeric level.
    ///
    /// Maps the standard ETW level values to display strings. Unknown values
    /// fall through to `"Unknown"`.
    pub fn level_to_name(level: u8) -> &'static str {
        match level {
            0 => "LogAlways",
            1 => "Critical",
            2 => "Error",
            3 => "Warning",
            4 => "Information",
            5 => "Verbose",
            _ => "Unknown",
        }
    }
}
