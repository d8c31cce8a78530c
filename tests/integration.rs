//! Integration tests for BlueBox.
//!
//! These tests exercise the library crate the way the binary does: building
//! documents, rendering the report page and writing real bundles under the
//! system temp directory. Everything here is platform-neutral; the live
//! Windows collectors are covered by their own platform-gated paths.

mod bundle_validation;
mod document_roundtrip;
mod time_utils;
