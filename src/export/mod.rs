//! Report artifact writers for BlueBox.
//!
//! Contains the JSON document writer, the HTML report renderer and the
//! per-run bundle assembly (directory layout plus zip archive).

pub mod bundle;
pub mod html_report;
pub mod json_export;
