//! Installed application inventory from the Windows registry.
//!
//! Scans the three uninstall registration locations: the 64-bit and 32-bit
//! (WOW6432Node) views of `HKLM\SOFTWARE\Microsoft\Windows\CurrentVersion\
//! Uninstall`, plus the per-user key under HKCU. Entries without a display
//! name are registration fragments and are dropped; the merged list is
//! sorted and de-duplicated by name.

use serde::{Deserialize, Serialize};

use crate::util::error::Result;

/// An installed application entry from an uninstall registration key.
///
/// `install_date` is carried as the opaque string the registry stores
/// (usually `YYYYMMDD`, but vendors write all sorts of things), never parsed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct InstalledApplication {
    pub name: String,
    pub version: Option<String>,
    pub publisher: Option<String>,
    pub install_date: Option<String>,
    pub install_location: Option<String>,
    pub uninstall_command: Option<String>,
}

/// Sort applications by name and collapse duplicate registrations.
///
/// Ordering is case-insensitive by name, with the exact name as tiebreaker;
/// entries whose names differ only by case count as duplicates and the
/// first occurrence in that order wins. The sort is stable, so entries with
/// byte-identical names keep their scan order (HKLM 64-bit first).
pub fn dedup_applications(mut apps: Vec<InstalledApplication>) -> Vec<InstalledApplication> {
    apps.sort_by_cached_key(|a| (a.name.to_lowercase(), a.name.clone()));
    apps.dedup_by(|a, b| a.name.to_lowercase() == b.name.to_lowercase());
    apps
}

/// Collect installed applications from all three uninstall locations.
///
/// A location that cannot be opened (missing hive, access denied)
/// contributes nothing; that is normal on machines without 32-bit software
/// or with restricted user hives, so it is not an error.
#[cfg(windows)]
pub fn collect_applications() -> Result<Vec<InstalledApplication>> {
    use windows::Win32::System::Registry::{
        HKEY_CURRENT_USER, HKEY_LOCAL_MACHINE, KEY_READ, KEY_WOW64_32KEY, KEY_WOW64_64KEY,
    };

    const UNINSTALL_PATH: &str = r"SOFTWARE\Microsoft\Windows\CurrentVersion\Uninstall";

    let mut apps = Vec::new();
    apps.extend(scan_uninstall_key(
        HKEY_LOCAL_MACHINE,
        UNINSTALL_PATH,
        KEY_READ | KEY_WOW64_64KEY,
    ));
    apps.extend(scan_uninstall_key(
        HKEY_LOCAL_MACHINE,
        UNINSTALL_PATH,
        KEY_READ | KEY_WOW64_32KEY,
    ));
    apps.extend(scan_uninstall_key(HKEY_CURRENT_USER, UNINSTALL_PATH, KEY_READ));

    let total = apps.len();
    let apps = dedup_applications(apps);
    tracing::info!(
        "Application inventory: {} entries ({} before dedup)",
        apps.len(),
        total
    );
    Ok(apps)
}

/// Enumerate one uninstall key's subkeys into application entries.
///
/// Subkeys without a `DisplayName` value are skipped.
#[cfg(windows)]
fn scan_uninstall_key(
    root: windows::Win32::System::Registry::HKEY,
    path: &str,
    sam: windows::Win32::System::Registry::REG_SAM_FLAGS,
) -> Vec<InstalledApplication> {
    use windows::core::{PCWSTR, PWSTR};
    use windows::Win32::Foundation::ERROR_NO_MORE_ITEMS;
    use windows::Win32::System::Registry::{RegCloseKey, RegEnumKeyExW, RegOpenKeyExW, HKEY};

    use crate::core::event_reader::to_wide;

    let mut apps = Vec::new();

    let path_wide = to_wide(path);
    let mut hkey = HKEY::default();
    // SAFETY: path_wide is a valid null-terminated UTF-16 string and hkey
    // receives the opened handle.
    let result = unsafe {
        RegOpenKeyExW(root, PCWSTR(path_wide.as_ptr()), Some(0), sam, &mut hkey)
    };
    if result.is_err() {
        tracing::debug!("Uninstall key not readable under this view: {path}");
        return apps;
    }

    let mut index = 0u32;
    loop {
        let mut name_buf = [0u16; 256];
        let mut name_len = name_buf.len() as u32;

        // SAFETY: hkey is an open key; name_buf/name_len describe a valid
        // output buffer. Class and timestamp outputs are not requested.
        let result = unsafe {
            RegEnumKeyExW(
                hkey,
                index,
                PWSTR(name_buf.as_mut_ptr()),
                &mut name_len,
                None,
                PWSTR::null(),
                None,
                None,
            )
        };
        if result == ERROR_NO_MORE_ITEMS || result.is_err() {
            break;
        }
        index += 1;

        let subkey_name = String::from_utf16_lossy(&name_buf[..name_len as usize]);
        if let Some(app) = read_application_entry(hkey, &subkey_name, sam) {
            apps.push(app);
        }
    }

    // SAFETY: hkey is open and no longer used after this.
    unsafe {
        let _ = RegCloseKey(hkey);
    }

    apps
}

/// Read one uninstall subkey into an entry, or `None` if it has no
/// `DisplayName` (registration fragments, hotfix stubs).
#[cfg(windows)]
fn read_application_entry(
    parent: windows::Win32::System::Registry::HKEY,
    subkey_name: &str,
    sam: windows::Win32::System::Registry::REG_SAM_FLAGS,
) -> Option<InstalledApplication> {
    use windows::core::PCWSTR;
    use windows::Win32::System::Registry::{RegCloseKey, RegOpenKeyExW, HKEY};

    use crate::core::event_reader::to_wide;

    let subkey_wide = to_wide(subkey_name);
    let mut hkey = HKEY::default();
    // SAFETY: subkey_wide is a valid null-terminated UTF-16 string.
    let result = unsafe {
        RegOpenKeyExW(parent, PCWSTR(subkey_wide.as_ptr()), Some(0), sam, &mut hkey)
    };
    if result.is_err() {
        return None;
    }

    let name = read_reg_string(hkey, "DisplayName").filter(|n| !n.trim().is_empty());
    let app = name.map(|name| InstalledApplication {
        name,
        version: read_reg_string(hkey, "DisplayVersion"),
        publisher: read_reg_string(hkey, "Publisher"),
        install_date: read_reg_string(hkey, "InstallDate"),
        install_location: read_reg_string(hkey, "InstallLocation"),
        uninstall_command: read_reg_string(hkey, "UninstallString"),
    });

    // SAFETY: hkey is open and no longer used after this.
    unsafe {
        let _ = RegCloseKey(hkey);
    }

    app
}

/// Read a REG_SZ / REG_EXPAND_SZ value, or `None` if absent, unreadable,
/// of another type, or empty.
#[cfg(windows)]
fn read_reg_string(
    hkey: windows::Win32::System::Registry::HKEY,
    value_name: &str,
) -> Option<String> {
    use windows::core::PCWSTR;
    use windows::Win32::Foundation::ERROR_MORE_DATA;
    use windows::Win32::System::Registry::{
        RegQueryValueExW, REG_EXPAND_SZ, REG_SZ, REG_VALUE_TYPE,
    };

    use crate::core::event_reader::to_wide;

    let name_wide = to_wide(value_name);
    let mut buf: Vec<u8> = vec![0u8; 512];
    let mut buf_size = buf.len() as u32;
    let mut reg_type = REG_VALUE_TYPE(0);

    // SAFETY: all pointers reference live locals sized per buf_size.
    let mut result = unsafe {
        RegQueryValueExW(
            hkey,
            PCWSTR(name_wide.as_ptr()),
            None,
            Some(&mut reg_type),
            Some(buf.as_mut_ptr()),
            Some(&mut buf_size),
        )
    };

    // Value longer than the initial buffer: grow to the reported size and retry.
    if result == ERROR_MORE_DATA {
        buf.resize(buf_size as usize, 0);
        // SAFETY: same as above with the grown buffer.
        result = unsafe {
            RegQueryValueExW(
                hkey,
                PCWSTR(name_wide.as_ptr()),
                None,
                Some(&mut reg_type),
                Some(buf.as_mut_ptr()),
                Some(&mut buf_size),
            )
        };
    }

    if result.is_err() || (reg_type != REG_SZ && reg_type != REG_EXPAND_SZ) || buf_size < 2 {
        return None;
    }

    // Convert UTF-16LE bytes to String, trimming at the first null.
    let wide: Vec<u16> = buf[..buf_size as usize]
        .chunks_exact(2)
        .map(|chunk| u16::from_le_bytes([chunk[0], chunk[1]]))
        .collect();
    let len = wide.iter().position(|&c| c == 0).unwrap_or(wide.len());
    let value = String::from_utf16_lossy(&wide[..len]);
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

/// Application inventory needs the Windows registry.
#[cfg(not(windows))]
pub fn collect_applications() -> Result<Vec<InstalledApplication>> {
    use crate::util::error::BlueBoxError;

    Err(BlueBoxError::Unsupported(
        "application inventory from the registry".into(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app(name: &str, version: &str) -> InstalledApplication {
        InstalledApplication {
            name: name.into(),
            version: Some(version.into()),
            publisher: None,
            install_date: None,
            install_location: None,
            uninstall_command: None,
        }
    }

    #[test]
    fn test_dedup_is_case_insensitive() {
        let apps = vec![app("Zoom", "5.0"), app("zoom", "4.0"), app("7-Zip", "23.01")];
        let result = dedup_applications(apps);
        assert_eq!(result.len(), 2);
        assert_eq!(result[0].name, "7-Zip");
        // Uppercase sorts before lowercase for otherwise-equal names.
        assert_eq!(result[1].name, "Zoom");
        assert_eq!(result[1].version.as_deref(), Some("5.0"));
    }

    #[test]
    fn test_dedup_identical_names_keep_first_scanned() {
        // Same app registered in the 64-bit view (scanned first) and the
        // 32-bit view; the 64-bit entry must win.
        let apps = vec![app("Widget", "2.0"), app("Widget", "1.0")];
        let result = dedup_applications(apps);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].version.as_deref(), Some("2.0"));
    }

    #[test]
    fn test_dedup_output_is_sorted() {
        let apps = vec![app("beta", "1"), app("Alpha", "1"), app("gamma", "1")];
        let names: Vec<_> = dedup_applications(apps)
            .into_iter()
            .map(|a| a.name)
            .collect();
        assert_eq!(names, vec!["Alpha", "beta", "gamma"]);
    }

    #[test]
    fn test_dedup_empty_input() {
        assert!(dedup_applications(Vec::new()).is_empty());
    }
}
