//! Provider enumeration via the Windows Evt* API.
//!
//! Discovers all event providers registered on the system using
//! `EvtOpenPublisherEnum` and `EvtNextPublisherId`. The hardware event
//! category only queries providers that actually exist on the host, so the
//! configured allowlist is narrowed against this enumeration first.

use crate::util::error::{BlueBoxError, Result};

/// Enumerate all event providers registered on the local system.
///
/// Returns a sorted list of publisher identifiers. Whether a provider's
/// metadata is usable is not checked here — only registration matters for
/// allowlist narrowing.
///
/// # Errors
/// Returns [`BlueBoxError::PublisherEnum`] if the enumeration handle
/// cannot be opened.
#[cfg(windows)]
pub fn enumerate_publishers() -> Result<Vec<String>> {
    use windows::Win32::System::EventLog::{EvtClose, EvtNextPublisherId, EvtOpenPublisherEnum};

    // SAFETY: a null session opens the local enumeration; the handle is
    // closed once the loop finishes.
    let handle = unsafe { EvtOpenPublisherEnum(None, 0) }
        .map_err(|e| BlueBoxError::PublisherEnum(format!("EvtOpenPublisherEnum failed: {e}")))?;

    let mut publishers = Vec::with_capacity(512);
    // Most publisher ids fit here; the loop grows the buffer on demand.
    let mut buffer = vec![0u16; 512];
    let mut used = 0u32;

    loop {
        // SAFETY: handle stays valid; the call writes one publisher id per
        // iteration as a null-terminated UTF-16 string.
        let result = unsafe { EvtNextPublisherId(handle, Some(buffer.as_mut_slice()), &mut used) };

        match result {
            Ok(()) => {
                if let Some(name) = utf16_id(&buffer, used) {
                    publishers.push(name);
                }
            }
            // windows-rs wraps Win32 codes as HRESULTs, so only the 0x8007
            // forms can match here.
            Err(e) => match e.code().0 as u32 {
                // ERROR_NO_MORE_ITEMS: enumeration complete.
                0x80070103 => break,
                // ERROR_INSUFFICIENT_BUFFER: `used` holds the required size.
                0x8007007A => buffer.resize(used as usize, 0),
                _ => {
                    tracing::warn!("EvtNextPublisherId returned unexpected error: {e}");
                    break;
                }
            },
        }
    }

    // SAFETY: the enumeration handle is closed exactly once, here.
    unsafe {
        let _ = EvtClose(handle);
    }

    publishers.sort_unstable_by_key(|p| p.to_lowercase());

    tracing::info!("Enumerated {} registered event providers", publishers.len());
    Ok(publishers)
}

/// Decode one enumerated id; `used` counts UTF-16 units including the null
/// terminator. Empty ids are dropped.
#[cfg(windows)]
fn utf16_id(buffer: &[u16], used: u32) -> Option<String> {
    let len = (used as usize).saturating_sub(1);
    let name = String::from_utf16_lossy(&buffer[..len]);
    (!name.is_empty()).then_some(name)
}

/// Provider enumeration needs the Windows Evt* API.
#[cfg(not(windows))]
pub fn enumerate_publishers() -> Result<Vec<String>> {
    Err(BlueBoxError::Unsupported("event provider enumeration".into()))
}

/// Narrow a configured provider allowlist to the providers actually
/// registered on the host.
///
/// Matching is case-insensitive, and the result pushes the **actual**
/// registered name (preserving the casing returned by the OS) rather than
/// the configured spelling, so later XPath predicates match what the log
/// records carry. Order follows the configured list.
pub fn narrow_providers(requested: &[&str], registered: &[String]) -> Vec<String> {
    requested
        .iter()
        .filter_map(|name| {
            registered
                .iter()
                .find(|p| p.eq_ignore_ascii_case(name))
                .cloned()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strv(s: &[&str]) -> Vec<String> {
        s.iter().map(|s| s.to_string()).collect()
    }

    /// `narrow_providers` must return the **actual** string from the
    /// registered list, not the configured spelling, so the query predicate
    /// matches the provider name the OS writes into event records.
    #[test]
    fn test_narrow_preserves_registered_casing() {
        let registered = strv(&["DISK", "ntfs", "Microsoft-Windows-WHEA-Logger"]);
        let result = narrow_providers(&["disk", "Ntfs", "Microsoft-Windows-WHEA-Logger"], &registered);
        assert_eq!(
            result,
            strv(&["DISK", "ntfs", "Microsoft-Windows-WHEA-Logger"])
        );
    }

    /// Providers absent from the host must not be queried.
    #[test]
    fn test_narrow_skips_unregistered() {
        let registered = strv(&["disk", "volmgr"]);
        let result = narrow_providers(&["disk", "Ntfs", "volmgr", "stornvme"], &registered);
        assert_eq!(result, strv(&["disk", "volmgr"]));
    }

    /// No overlap at all yields an empty list; the caller decides what that
    /// means (the hardware category records an error and skips its query).
    #[test]
    fn test_narrow_disjoint_is_empty() {
        let registered = strv(&["Microsoft-Windows-ABC", "Something-Else"]);
        let result = narrow_providers(&["disk", "Ntfs"], &registered);
        assert!(result.is_empty());
    }

    /// The returned names must be exact elements of the registered slice.
    #[test]
    fn test_narrow_names_are_registered_elements() {
        let registered = strv(&["Disk", "NTFS", "partmgr", "Unrelated"]);
        let result = narrow_providers(&["disk", "ntfs", "partmgr"], &registered);
        for name in &result {
            assert!(
                registered.contains(name),
                "returned name '{name}' must be an element of the registered slice"
            );
        }
    }
}
