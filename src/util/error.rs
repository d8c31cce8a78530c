//! Unified error types for BlueBox.
//!
//! Every fallible operation in the crate returns `Result<T, BlueBoxError>`,
//! so failures propagate with `?` and arrive at the pipeline with their
//! context attached.

/// Unified error type used throughout BlueBox.
///
/// The display form matters: non-fatal collection errors are recorded
/// verbatim in the report document and shown in the page footer.
#[derive(Debug, thiserror::Error)]
pub enum BlueBoxError {
    /// A Win32/Evt* call failed. `hr` is the HRESULT as surfaced by
    /// `windows-rs`; `context` names the call and its target.
    #[error("Windows API error: {context} (HRESULT: 0x{hr:08X})")]
    WindowsApi {
        /// HRESULT of the failed call.
        hr: u32,
        /// Which call failed, and on what.
        context: String,
    },

    /// Rendered event XML that would not parse.
    #[error("XML parse error: {0}")]
    XmlParse(String),

    /// Publisher enumeration via `EvtOpenPublisherEnum` / `EvtNextPublisherId` failed.
    #[error("Publisher enumeration failed: {0}")]
    PublisherEnum(String),

    /// The HTML report could not be produced.
    #[error("Report rendering failed: {0}")]
    Render(String),

    /// A user-supplied command-line value could not be parsed.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Live collection was requested on a platform without the required APIs.
    #[error("Unsupported on this platform: {0}")]
    Unsupported(String),

    /// Catch-all for I/O errors (file writes, directory creation, etc.).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization of the report document failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Writing the output archive failed.
    #[error("Archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// A WMI query against the local CIM repository failed.
    #[cfg(windows)]
    #[error("WMI query failed: {0}")]
    Wmi(#[from] wmi::WMIError),
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, BlueBoxError>;

/// Shorthand for [`BlueBoxError::WindowsApi`] from a raw HRESULT and a
/// context string.
///
/// # Example
/// ```ignore
/// windows_err(0x80070522, "EvtQuery on channel 'System'")
/// ```
#[allow(dead_code)]
pub fn windows_err(hr: u32, context: impl Into<String>) -> BlueBoxError {
    BlueBoxError::WindowsApi {
        hr,
        context: context.into(),
    }
}
