//! Windows Event Log message rendering.
//!
//! Wraps the `EvtRender` and `EvtFormatMessage` calls that turn an event
//! handle into its XML document and into publisher-rendered text. Split out
//! from the query loop so the unsafe call surface stays in one module.

use std::collections::HashMap;

use windows::core::PCWSTR;
use windows::Win32::System::EventLog::{
    EvtFormatMessage, EvtFormatMessageEvent, EvtFormatMessageTask, EvtOpenPublisherMetadata,
    EvtRender, EvtRenderEventXml, EVT_HANDLE,
};

use crate::util::constants::*;
use crate::util::error::BlueBoxError;

use super::event_reader::{extract_provider_name, to_wide};

/// Render a single event handle to its XML document via `EvtRender`.
///
/// The caller owns the scratch buffer so repeated events share one
/// allocation; the buffer keeps whatever size it grows to.
pub(super) fn render_event_xml(
    event_handle: isize,
    buffer: &mut Vec<u16>,
) -> Result<String, BlueBoxError> {
    if buffer.len() < EVT_RENDER_BUFFER_SIZE {
        buffer.resize(EVT_RENDER_BUFFER_SIZE, 0);
    }
    let mut used_bytes = 0u32;
    let mut property_count = 0u32;
    let mut grown = false;

    loop {
        // SAFETY: event_handle is valid and the byte size passed matches the
        // buffer. EvtRenderEventXml writes a null-terminated UTF-16 string.
        let result = unsafe {
            EvtRender(
                None,
                EVT_HANDLE(event_handle),
                EvtRenderEventXml.0,
                (buffer.len() * 2) as u32,
                Some(buffer.as_mut_ptr() as *mut _),
                &mut used_bytes,
                &mut property_count,
            )
        };

        match result {
            Ok(()) => return Ok(utf16_bytes_to_string(buffer, used_bytes)),
            Err(e) => {
                let code = e.code().0 as u32;
                // ERROR_INSUFFICIENT_BUFFER — HRESULT 0x8007007A. windows-rs
                // surfaces Win32 failures as HRESULTs, so the raw code 122
                // never appears here. On this error `used_bytes` holds the
                // exact size required; one growth pass settles it.
                if code == 0x8007007A && !grown {
                    buffer.resize(used_bytes as usize / 2 + 1, 0);
                    grown = true;
                    continue;
                }
                return Err(BlueBoxError::WindowsApi {
                    hr: code,
                    context: if grown { "EvtRender retry" } else { "EvtRender" }.into(),
                });
            }
        }
    }
}

/// Publisher-rendered message text for an event, if the publisher can
/// produce one.
///
/// Failure is routine (stale or third-party publishers with missing
/// metadata) and yields `None`; the caller falls back to the raw event
/// data. Metadata handles are cached per provider in `publisher_cache`.
pub(super) fn try_format_message(
    event_handle: isize,
    xml: &str,
    publisher_cache: &mut HashMap<String, EVT_HANDLE>,
    buffer: &mut Vec<u16>,
) -> Option<String> {
    let pub_handle = publisher_handle(xml, publisher_cache)?;
    format_with_kind(pub_handle, event_handle, MessageKind::Event, buffer)
}

/// Task category display name for an event, resolved through the same
/// publisher metadata path as [`try_format_message`]. Events without a task
/// yield `None`.
pub(super) fn try_format_task(
    event_handle: isize,
    xml: &str,
    publisher_cache: &mut HashMap<String, EVT_HANDLE>,
    buffer: &mut Vec<u16>,
) -> Option<String> {
    let pub_handle = publisher_handle(xml, publisher_cache)?;
    format_with_kind(pub_handle, event_handle, MessageKind::Task, buffer)
}

/// Which `EvtFormatMessage` output to request.
#[derive(Clone, Copy)]
enum MessageKind {
    Event,
    Task,
}

/// Look up (or open and cache) the publisher metadata handle for the
/// provider named in the event XML.
///
/// A cached handle of 0 records a provider whose metadata already failed to
/// open, so repeated events from it skip the API call.
fn publisher_handle(
    xml: &str,
    publisher_cache: &mut HashMap<String, EVT_HANDLE>,
) -> Option<EVT_HANDLE> {
    // The lookup key is sliced out of the XML directly, without a full parse.
    let provider = extract_provider_name(xml)?;

    match publisher_cache.get(&provider) {
        Some(&h) if h.0 != 0 => Some(h),
        Some(_) => None, // Known failure
        None => {
            let provider_wide = to_wide(&provider);
            // SAFETY: provider_wide is a valid null-terminated UTF-16 string.
            let result = unsafe {
                EvtOpenPublisherMetadata(None, PCWSTR(provider_wide.as_ptr()), None, 0, 0)
            };
            match result {
                Ok(h) => {
                    publisher_cache.insert(provider, h);
                    Some(h)
                }
                Err(_) => {
                    publisher_cache.insert(provider, EVT_HANDLE(0));
                    None
                }
            }
        }
    }
}

/// Run `EvtFormatMessage` for the requested output kind.
///
/// Returns the trimmed string, or `None` when formatting fails or produces
/// an empty result.
fn format_with_kind(
    pub_handle: EVT_HANDLE,
    event_handle: isize,
    kind: MessageKind,
    buffer: &mut Vec<u16>,
) -> Option<String> {
    let flag = match kind {
        MessageKind::Event => EvtFormatMessageEvent.0,
        MessageKind::Task => EvtFormatMessageTask.0,
    };
    if buffer.len() < EVT_FORMAT_BUFFER_SIZE {
        buffer.resize(EVT_FORMAT_BUFFER_SIZE, 0);
    }
    let mut used = 0u32;
    let mut grown = false;

    loop {
        // SAFETY: pub_handle and event_handle stay valid for the call; the
        // slice length is the capacity the API sees.
        let result = unsafe {
            EvtFormatMessage(
                pub_handle,
                EVT_HANDLE(event_handle),
                0,
                None,
                flag,
                Some(buffer.as_mut_slice()),
                &mut used,
            )
        };

        match result {
            Ok(()) => return non_empty_utf16(buffer, used),
            // ERROR_INSUFFICIENT_BUFFER as an HRESULT; `used` is the required
            // length in UTF-16 units. Grow once, then take whatever comes.
            Err(e) if e.code().0 as u32 == 0x8007007A && !grown => {
                buffer.resize(used as usize + 1, 0);
                grown = true;
            }
            Err(_) => return None,
        }
    }
}

/// Decode `used_bytes` of rendered UTF-16 output, dropping the trailing
/// null terminator if present.
fn utf16_bytes_to_string(buffer: &[u16], used_bytes: u32) -> String {
    let mut len = used_bytes as usize / 2;
    if len > 0 && buffer[len - 1] == 0 {
        len -= 1;
    }
    String::from_utf16_lossy(&buffer[..len])
}

/// Decode `used` UTF-16 code units (including the null terminator) from the
/// buffer, trimming whitespace and mapping empty output to `None`.
fn non_empty_utf16(buffer: &[u16], used: u32) -> Option<String> {
    let end = if used > 0 { used as usize - 1 } else { 0 };
    let msg = String::from_utf16_lossy(&buffer[..end]);
    let trimmed = msg.trim().to_string();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}
