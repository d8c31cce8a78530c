//! Shared utilities: error types, constants, time helpers and progress
//! reporting.

pub mod constants;
pub mod error;
pub mod progress;
pub mod time;
