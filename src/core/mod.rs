//! Core domain modules for BlueBox.
//!
//! Contains the event data model, query building and collection, XML
//! parsing, publisher enumeration, the hardware and application
//! inventories, the report document, and the run pipeline.

pub mod document;
pub mod event_reader;
pub mod event_record;
pub mod hardware;
pub mod pipeline;
pub mod publisher_enumerator;
pub mod software;
pub mod xml_parser;

#[cfg(windows)]
mod event_format;
