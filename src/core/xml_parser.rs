//! XML parser for Windows Event Log entries.
//!
//! `EvtRender` hands back one XML document per event. This module turns that
//! document into the fixed-shape [`EventRecord`] the report stores, reading
//! only the envelope fields the report keeps. Parsing is done with
//! `roxmltree` over the rendered string.

use crate::core::event_record::{Category, EventRecord};
use crate::util::error::BlueBoxError;
use chrono::{DateTime, Utc};

/// Turn one rendered event XML document into an [`EventRecord`].
///
/// A typical document:
///
/// ```xml
/// <Event xmlns="http://schemas.microsoft.com/win/2004/08/events/event">
///   <System>
///     <Provider Name="disk" />
///     <EventID Qualifiers="32772">7</EventID>
///     <Level>2</Level>
///     <TimeCreated SystemTime="2025-03-02T08:14:09.4411230Z" />
///     <EventRecordID>118204</EventRecordID>
///     <Channel>System</Channel>
///   </System>
///   <EventData>
///     <Data Name="DeviceName">\Device\Harddisk1\DR1</Data>
///   </EventData>
/// </Event>
/// ```
///
/// `log_name` is the channel the query ran against and stands in when the
/// document carries no `<Channel>` of its own. `formatted_message` and `task`
/// come from `EvtFormatMessage`; when the publisher could not render a
/// message, the record falls back to a joined form of the `<EventData>`
/// values so a real fault never shows up as an empty row.
///
/// # Errors
/// Returns [`BlueBoxError::XmlParse`] if the document is malformed or has no
/// `<System>` element.
pub fn parse_event_xml(
    xml: &str,
    category: Category,
    log_name: &str,
    formatted_message: Option<String>,
    task: Option<String>,
) -> Result<EventRecord, BlueBoxError> {
    let doc = roxmltree::Document::parse(xml)
        .map_err(|e| BlueBoxError::XmlParse(format!("Failed to parse XML: {e}")))?;
    let root = doc.root_element();

    let system = find_child(&root, "System")
        .ok_or_else(|| BlueBoxError::XmlParse("Missing <System> element".into()))?;

    let provider = find_child(&system, "Provider")
        .and_then(|p| p.attribute("Name").map(String::from))
        .unwrap_or_default();

    // Classic providers wrap the ID in a Qualifiers attribute; the text
    // content is the ID either way.
    let event_id: u32 = element_text(&system, "EventID")
        .and_then(|t| t.trim().parse().ok())
        .unwrap_or(0);

    let level: u8 = element_text(&system, "Level")
        .and_then(|t| t.trim().parse().ok())
        .unwrap_or(0);

    // A missing or unreadable stamp falls back to collection time.
    let time_created = find_child(&system, "TimeCreated")
        .and_then(|e| e.attribute("SystemTime"))
        .and_then(parse_system_time)
        .unwrap_or_else(Utc::now);

    // Record number within the source log.
    let record_id: Option<u64> =
        element_text(&system, "EventRecordID").and_then(|t| t.trim().parse().ok());

    // The document's own channel wins over the channel the query named.
    let log_name = match element_text(&system, "Channel") {
        Some(channel) if !channel.is_empty() => channel.to_string(),
        _ => log_name.to_string(),
    };

    let message =
        formatted_message.unwrap_or_else(|| join_data_pairs(&collect_data_pairs(&root)));

    Ok(EventRecord {
        category,
        log_name,
        time_created,
        level: EventRecord::level_to_name(level).to_string(),
        event_id,
        provider,
        task,
        record_id,
        message,
    })
}

/// Direct-child lookup by local name. Event XML is namespace-qualified, so
/// matching on the full tag name would never hit.
fn find_child<'a>(
    parent: &'a roxmltree::Node<'a, 'a>,
    name: &str,
) -> Option<roxmltree::Node<'a, 'a>> {
    parent
        .children()
        .find(|n| n.is_element() && n.tag_name().name() == name)
}

/// Text content of a direct child element, if present.
fn element_text<'a>(parent: &'a roxmltree::Node<'a, 'a>, name: &str) -> Option<&'a str> {
    find_child(parent, name).and_then(|e| e.text())
}

/// Parse the `SystemTime` attribute of `<TimeCreated>`.
///
/// Stamps arrive in ISO 8601 at whatever precision the log kept, commonly
/// the seven fractional digits of FILETIME (`2025-03-02T08:14:09.4411230Z`).
fn parse_system_time(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    // Seven digits overflow what strict RFC 3339 parsers accept; cap the
    // fraction at microseconds and retry.
    if let Some(capped) = cap_fraction_at_micros(s) {
        if let Ok(dt) = DateTime::parse_from_rfc3339(&capped) {
            return Some(dt.with_timezone(&Utc));
        }
    }

    // Last try: parse as a naive stamp and pin it to UTC.
    chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.fZ")
        .ok()
        .map(|naive| DateTime::from_naive_utc_and_offset(naive, Utc))
}

fn cap_fraction_at_micros(s: &str) -> Option<String> {
    let dot = s.find('.')?;
    let z = s.find('Z')?;
    let frac = s.get(dot + 1..z)?;
    if frac.len() <= 6 {
        return None;
    }
    Some(format!("{}.{}Z", s.get(..dot)?, frac.get(..6)?))
}

/// Pull `<EventData>` (or `<UserData>`) children out as name/value pairs.
///
/// Manifest-based providers emit `<Data Name="key">value</Data>`; classic
/// providers often leave `Name` off, in which case the pair is named by
/// position (`Data_1`, `Data_2`, ...). `<UserData>` wraps provider-defined
/// elements one level deeper, and there the element tag doubles as the name.
fn collect_data_pairs(root: &roxmltree::Node) -> Vec<(String, String)> {
    if let Some(event_data) = find_child(root, "EventData") {
        return event_data
            .children()
            .filter(|n| n.is_element())
            .enumerate()
            .map(|(idx, child)| {
                let name = child
                    .attribute("Name")
                    .map(String::from)
                    .unwrap_or_else(|| format!("Data_{}", idx + 1));
                (name, element_content(&child))
            })
            .collect();
    }

    let mut pairs = Vec::new();
    if let Some(user_data) = find_child(root, "UserData") {
        for wrapper in user_data.children().filter(|n| n.is_element()) {
            for child in wrapper.children().filter(|n| n.is_element()) {
                pairs.push((child.tag_name().name().to_string(), element_content(&child)));
            }
        }
    }
    pairs
}

/// Joined `name: value` form used when no rendered message is available.
fn join_data_pairs(pairs: &[(String, String)]) -> String {
    pairs
        .iter()
        .map(|(name, value)| {
            if name.is_empty() {
                value.clone()
            } else {
                format!("{name}: {value}")
            }
        })
        .collect::<Vec<_>>()
        .join("; ")
}

/// All text beneath an element, flattened and trimmed.
fn element_content(node: &roxmltree::Node) -> String {
    let text: String = node
        .descendants()
        .filter(|d| d.is_text())
        .filter_map(|d| d.text())
        .collect();
    text.trim().to_string()
}
