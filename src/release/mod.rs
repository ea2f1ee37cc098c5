//! Releases: data model, milestone selection and reconciliation
//!
//! A release is identified by its name within a component. Its tag, body and
//! prerelease flag are content that may change between runs; draft/public is
//! visibility, reconciled separately (see [`reconcile`]).

pub mod milestone;
pub mod model;
pub mod reconcile;

pub use model::{Component, Issue, Milestone, MilestoneState, Release, ReleasePatch, ReleaseSpec, Target};
pub use reconcile::{ReconcilePlan, Reconciler, ReleaseAction, ReleaseState};
