//! Application-wide constants for BlueBox.
//!
//! Centralising magic numbers and configuration defaults here keeps the rest
//! of the codebase clean and makes tuning straightforward.

/// Number of event handles to request per `EvtNext` call.
/// Larger batches reduce API call overhead; 200 is a good balance between
/// memory and throughput.
pub const EVT_BATCH_SIZE: usize = 200;

/// Timeout in milliseconds passed to `EvtNext`. A finite timeout keeps a
/// stuck query from hanging the run forever.
pub const EVT_NEXT_TIMEOUT_MS: u32 = 1000;

/// Buffer size (in `u16` units) for `EvtRender` output.
/// 8 KB (16 KB raw) is enough for the vast majority of events; the buffer
/// grows on demand for larger events and the allocation is reused across
/// all events in a query.
pub const EVT_RENDER_BUFFER_SIZE: usize = 8_192;

/// Buffer size (in `u16` units) for `EvtFormatMessage` output.
/// 2 KB (4 KB raw) covers most formatted message strings; the buffer
/// grows on demand and is reused across events.
pub const EVT_FORMAT_BUFFER_SIZE: usize = 2_048;

/// Default cap on the number of events collected per log category.
pub const DEFAULT_MAX_EVENTS: u32 = 2_000;

/// ETW severity levels collected by every query: Critical (1), Error (2)
/// and Warning (3). Warnings are always collected; the `--include-warnings`
/// flag is accepted for compatibility but has no effect.
pub const COLLECTED_LEVELS: &[u8] = &[1, 2, 3];

/// Event log providers consulted for the hardware health category.
///
/// These are the storage, kernel and WHEA publishers that report device
/// faults into the System log. The list is narrowed at runtime against the
/// publishers actually registered on the host, so entries that only exist
/// on some Windows versions are harmless.
pub const HARDWARE_EVENT_PROVIDERS: &[&str] = &[
    "disk",
    "Ntfs",
    "volmgr",
    "partmgr",
    "storahci",
    "stornvme",
    "iaStorA",
    "nvme",
    "Microsoft-Windows-WHEA-Logger",
    "Microsoft-Windows-DiskDiagnostic",
    "Microsoft-Windows-Kernel-PnP",
    "Microsoft-Windows-Kernel-Power",
];

/// Log channel the hardware event category reads from.
pub const HARDWARE_EVENT_CHANNEL: &str = "System";

/// Subdirectory of the current working directory that holds run output.
pub const OUTPUT_ROOT_DIR: &str = "out";

/// Prefix of the per-run output directory and archive names; the run
/// timestamp is appended.
pub const OUTPUT_DIR_PREFIX: &str = "BlueBox_";

/// File name of the JSON report document inside the output directory.
pub const REPORT_JSON_NAME: &str = "BlueBox_Report.json";

/// File name of the HTML report page inside the output directory.
pub const REPORT_HTML_NAME: &str = "BlueBox_Report.html";

/// Maximum number of event rows the report page will render at once.
/// The full data set is still embedded; this only bounds the visible table.
pub const REPORT_EVENT_ROW_CAP: usize = 2_000;

/// Maximum number of application rows the report page will render at once.
pub const REPORT_APP_ROW_CAP: usize = 3_000;

/// Application display name used in log banners and report headers.
pub const APP_NAME: &str = "BlueBox";

/// Application version string.
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// HRESULT code for E_ACCESSDENIED from the Windows API.
#[allow(dead_code)]
pub const HRESULT_ACCESS_DENIED: u32 = 0x80070005;
