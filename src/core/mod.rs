//! Building blocks shared by every command
//!
//! - **config**: `shipnotes.toml` parsing and validation
//! - **context**: the run context threaded through every operation
//! - **error**: error taxonomy with contextual help messages

pub mod config;
pub mod context;
pub mod error;
