//! Release notes rendering
//!
//! - **category**: label-based issue classification
//! - **builder**: per-repository notes grouped by category
//! - **rollup**: umbrella notes linking every component release of a milestone

pub mod builder;
pub mod category;
pub mod rollup;

pub use builder::{ReleaseNotes, build};
pub use category::{Category, categorize};
pub use rollup::RollupNotesBuilder;
