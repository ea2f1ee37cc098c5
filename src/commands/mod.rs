//! CLI commands
//!
//! - **publish**: build notes for a milestone and reconcile the matching
//!   release, for one repository or a whole organization (plus rollup)
//!
//! Commands take a `&RunContext` and never construct their own store.

pub mod publish;

pub use publish::{ComponentOutcome, PublishReport, PublishRequest, run_publish};
