//! Event log query execution.
//!
//! Queries a Windows Event Log channel using the modern Evt* API and
//! returns the matching entries as parsed [`EventRecord`]s. Severity, time
//! bounds, event IDs and provider names are all pushed into an XPath filter
//! so the API pre-filters server-side; the query runs newest-first and
//! stops at the per-category cap.

use chrono::{DateTime, Utc};

use crate::core::event_record::{Category, EventRecord};
use crate::util::error::Result;

/// Parameters for one category's event log query.
#[derive(Debug, Clone)]
pub struct EventQuerySpec {
    /// Report category the results are collected under.
    pub category: Category,
    /// Channel to query (e.g. `"Application"`, `"System"`).
    pub log_name: String,
    /// Restrict results to these provider names. `None` means any provider.
    pub providers: Option<Vec<String>>,
    /// Inclusive lower bound on `TimeCreated`.
    pub start_time: Option<DateTime<Utc>>,
    /// Inclusive upper bound on `TimeCreated`.
    pub end_time: Option<DateTime<Utc>>,
    /// Restrict results to these event IDs. `None` means any ID.
    pub event_ids: Option<Vec<u32>>,
    /// Maximum number of events to collect.
    pub max_events: u32,
}

/// Build the XPath filter for a query spec.
///
/// Severity is always constrained to Critical/Error/Warning; the optional
/// time bounds, event-ID allowlist and provider allowlist each contribute a
/// predicate only when present. All predicates are combined with `and`
/// inside a single `*[System[...]]` selector.
pub fn build_xpath_query(spec: &EventQuerySpec) -> String {
    use crate::util::constants::COLLECTED_LEVELS;

    let mut conditions = Vec::new();

    let levels = COLLECTED_LEVELS
        .iter()
        .map(|l| format!("Level={l}"))
        .collect::<Vec<_>>()
        .join(" or ");
    conditions.push(format!("({levels})"));

    if let Some(from) = spec.start_time {
        conditions.push(format!(
            "TimeCreated[@SystemTime >= '{}']",
            from.format("%Y-%m-%dT%H:%M:%S%.3fZ")
        ));
    }
    if let Some(to) = spec.end_time {
        conditions.push(format!(
            "TimeCreated[@SystemTime <= '{}']",
            to.format("%Y-%m-%dT%H:%M:%S%.3fZ")
        ));
    }

    if let Some(ids) = spec.event_ids.as_deref() {
        if !ids.is_empty() {
            let ids = ids
                .iter()
                .map(|id| format!("EventID={id}"))
                .collect::<Vec<_>>()
                .join(" or ");
            conditions.push(format!("({ids})"));
        }
    }

    if let Some(providers) = spec.providers.as_deref() {
        if !providers.is_empty() {
            let names = providers
                .iter()
                .map(|p| format!("@Name='{p}'"))
                .collect::<Vec<_>>()
                .join(" or ");
            conditions.push(format!("Provider[{names}]"));
        }
    }

    format!("*[System[{}]]", conditions.join(" and "))
}

/// Quick extraction of the `Provider Name` attribute from raw event XML.
///
/// Avoids a full XML parse just to get the provider name for publisher
/// metadata lookup. Looks for `Provider Name="..."` in the string.
pub fn extract_provider_name(xml: &str) -> Option<String> {
    let marker = "Provider Name=\"";
    let start = xml.find(marker)? + marker.len();
    let end = xml[start..].find('"')? + start;
    Some(xml[start..end].to_string())
}

/// Convert a `&str` to a null-terminated UTF-16 vector.
pub fn to_wide(s: &str) -> Vec<u16> {
    s.encode_utf16().chain(std::iter::once(0)).collect()
}

/// Run the query and collect up to `spec.max_events` entries, newest first.
///
/// An empty result is success; only API failures (channel missing, access
/// denied, query rejected) are errors.
#[cfg(windows)]
pub fn collect_events(spec: &EventQuerySpec) -> Result<Vec<EventRecord>> {
    use std::collections::HashMap;

    use windows::core::PCWSTR;
    use windows::Win32::System::EventLog::{
        EvtClose, EvtNext, EvtQuery, EvtQueryChannelPath, EvtQueryReverseDirection, EVT_HANDLE,
    };

    use crate::core::event_format::{render_event_xml, try_format_message, try_format_task};
    use crate::core::xml_parser::parse_event_xml;
    use crate::util::constants::*;
    use crate::util::error::BlueBoxError;

    let xpath = build_xpath_query(spec);
    let channel_wide = to_wide(&spec.log_name);
    let xpath_wide = to_wide(&xpath);

    tracing::debug!(
        "Querying channel '{}' with XPath: {}",
        spec.log_name,
        xpath
    );

    // SAFETY: both strings are null-terminated UTF-16 and outlive the call.
    // A None session targets the local machine; the flags select channel-path
    // mode reading newest-first.
    let query_handle = unsafe {
        EvtQuery(
            None,
            PCWSTR(channel_wide.as_ptr()),
            PCWSTR(xpath_wide.as_ptr()),
            EvtQueryChannelPath.0 | EvtQueryReverseDirection.0,
        )
    }
    .map_err(|e| BlueBoxError::WindowsApi {
        hr: e.code().0 as u32,
        context: format!("EvtQuery on channel '{}'", spec.log_name),
    })?;

    let max = spec.max_events as usize;
    let mut events = Vec::new();
    let mut handles = vec![0isize; EVT_BATCH_SIZE];

    // Reusable buffers and publisher metadata cache shared across the query.
    let mut render_buffer: Vec<u16> = Vec::new();
    let mut format_buffer: Vec<u16> = Vec::new();
    let mut publisher_cache: HashMap<String, EVT_HANDLE> = HashMap::new();

    loop {
        if events.len() >= max {
            break;
        }

        let mut returned = 0u32;

        // SAFETY: query_handle came from EvtQuery above; `handles` has
        // EVT_BATCH_SIZE slots and `returned` reports how many were filled.
        let result = unsafe {
            EvtNext(
                query_handle,
                &mut handles,
                EVT_NEXT_TIMEOUT_MS,
                0,
                &mut returned,
            )
        };

        match result {
            Ok(()) if returned == 0 => break,
            Err(e) => {
                let code = e.code().0 as u32;
                // ERROR_NO_MORE_ITEMS, raw or HRESULT-wrapped: channel
                // exhausted.
                if code == 259 || code == 0x80070103 {
                    break;
                }
                // ERROR_TIMEOUT: nothing more arrived within the pull
                // window; close out with what we have.
                if code == 1460 || code == 0x800705B4 {
                    break;
                }
                // The query handle must not leak on the error path.
                unsafe {
                    let _ = EvtClose(query_handle);
                }
                close_publisher_cache(&mut publisher_cache);
                return Err(BlueBoxError::WindowsApi {
                    hr: code,
                    context: format!("EvtNext on channel '{}'", spec.log_name),
                });
            }
            _ => {}
        }

        for &event_handle in &handles[..returned as usize] {
            // Handles past the cap still need closing.
            if events.len() >= max {
                // SAFETY: handle from EvtNext; closing is all that is left
                // to do with it.
                unsafe {
                    let _ = EvtClose(EVT_HANDLE(event_handle));
                }
                continue;
            }

            // Render to XML; the record fields and the publisher lookup both
            // read from it.
            let xml = match render_event_xml(event_handle, &mut render_buffer) {
                Ok(xml) => xml,
                Err(e) => {
                    tracing::trace!("Skipping unrenderable event: {e}");
                    // SAFETY: still a valid handle; close before skipping.
                    unsafe {
                        let _ = EvtClose(EVT_HANDLE(event_handle));
                    }
                    continue;
                }
            };

            // Resolve the formatted message and task name via EvtFormatMessage
            let formatted_msg =
                try_format_message(event_handle, &xml, &mut publisher_cache, &mut format_buffer);
            let task =
                try_format_task(event_handle, &xml, &mut publisher_cache, &mut format_buffer);

            match parse_event_xml(&xml, spec.category, &spec.log_name, formatted_msg, task) {
                Ok(record) => events.push(record),
                Err(e) => {
                    tracing::trace!("Skipping unparseable event XML: {e}");
                }
            }

            // SAFETY: the handle is not used past this point.
            unsafe {
                let _ = EvtClose(EVT_HANDLE(event_handle));
            }
        }
    }

    // SAFETY: the query handle is closed exactly once, here.
    unsafe {
        let _ = EvtClose(query_handle);
    }
    close_publisher_cache(&mut publisher_cache);

    tracing::debug!(
        "Collected {} events from channel '{}' for category {}",
        events.len(),
        spec.log_name,
        spec.category.as_str()
    );
    Ok(events)
}

/// Close all cached publisher metadata handles.
#[cfg(windows)]
fn close_publisher_cache(
    publisher_cache: &mut std::collections::HashMap<
        String,
        windows::Win32::System::EventLog::EVT_HANDLE,
    >,
) {
    use windows::Win32::System::EventLog::EvtClose;

    for (name, handle) in publisher_cache.drain() {
        if handle.0 != 0 {
            // SAFETY: handle is a valid publisher metadata handle
            // that we opened with EvtOpenPublisherMetadata.
            unsafe {
                let _ = EvtClose(handle);
            }
            tracing::trace!("Closed publisher metadata for '{}'", name);
        }
    }
}

/// Live event log queries need the Windows Evt* API.
#[cfg(not(windows))]
pub fn collect_events(spec: &EventQuerySpec) -> Result<Vec<EventRecord>> {
    use crate::util::error::BlueBoxError;

    Err(BlueBoxError::Unsupported(format!(
        "event log query on channel '{}'",
        spec.log_name
    )))
}
