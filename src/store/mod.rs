//! Remote tracker/registry abstraction
//!
//! The reconciler and the publish command only talk to the outside world
//! through [`ReleaseStore`]. The GitHub implementation lives in [`github`];
//! tests substitute an in-memory store.
//!
//! Every call blocks until it completes. Callers issue them one at a time, so
//! implementations need no internal ordering guarantees beyond that.

pub mod github;

use crate::core::error::ShipResult;
use crate::release::model::{Component, Issue, Milestone, Release, ReleasePatch, ReleaseSpec};

pub use github::{Credentials, GitHubStore};

/// Source of milestones, issues and releases; sink for release writes
///
/// # Example
///
/// ```rust,ignore
/// use shipnotes::store::ReleaseStore;
///
/// fn releases_named(store: &dyn ReleaseStore, component: &Component, name: &str) -> ShipResult<Option<Release>> {
///   Ok(store.list_releases(component)?.into_iter().find(|r| r.name == name))
/// }
/// ```
pub trait ReleaseStore {
  /// Repositories of an organization, in listing order
  fn list_components(&self, owner: &str) -> ShipResult<Vec<Component>>;

  /// All milestones (open and closed) of a component
  fn list_milestones(&self, component: &Component) -> ShipResult<Vec<Milestone>>;

  /// Closed issues attached to a milestone
  fn list_closed_issues(&self, component: &Component, milestone_id: u64) -> ShipResult<Vec<Issue>>;

  /// Open issues carrying `label`
  fn list_open_labeled_issues(&self, repo: &Component, label: &str) -> ShipResult<Vec<Issue>>;

  /// All releases, drafts included
  fn list_releases(&self, component: &Component) -> ShipResult<Vec<Release>>;

  fn create_release(&self, component: &Component, spec: &ReleaseSpec) -> ShipResult<Release>;

  fn update_release(&self, component: &Component, release_id: u64, patch: &ReleasePatch) -> ShipResult<Release>;
}

/// Existing release with the given name (the stable key; tags may move)
pub fn find_release_by_name(
  store: &dyn ReleaseStore,
  component: &Component,
  name: &str,
) -> ShipResult<Option<Release>> {
  Ok(store.list_releases(component)?.into_iter().find(|r| r.name == name))
}
