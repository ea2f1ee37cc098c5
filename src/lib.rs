//! shipnotes - milestone release notes and GitHub release reconciliation
//!
//! Reads the closed issues of a milestone, renders categorized Markdown notes
//! and brings the matching GitHub release to the desired draft/public state.
//! Organization-wide runs release every repository and finish with a rollup
//! release linking them all.

pub mod approval;
pub mod commands;
pub mod core;
pub mod notes;
pub mod release;
pub mod store;
