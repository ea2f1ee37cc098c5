//! Release reconciliation: bring one release to its desired state
//!
//! # States
//!
//! A release (keyed by component and name) is `Absent`, `Draft` or `Public`.
//! The transition is computed from three facts: does it exist, is it a
//! draft, is publishing requested. Content (body, tag, prerelease flag) is
//! reconciled separately from visibility.
//!
//! ```text
//! Absent  --create(draft = !publish)-->      Draft | Public
//! Draft   --publish (if requested)-->        Public
//! Public  --unpublish (if not requested,
//!           and only when approved)-->       Draft
//! any     --update content (if changed)-->   same state
//! ```
//!
//! Every transition is first computed as a [`ReconcilePlan`], which can be
//! printed (dry-run) or executed by a [`Reconciler`]. Executing the same
//! desired spec twice in a row issues no mutating calls the second time.

use crate::approval::ApprovalOracle;
use crate::core::error::ShipResult;
use crate::release::model::{Component, Release, ReleasePatch, ReleaseSpec, is_prerelease_tag};
use crate::store::ReleaseStore;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info, warn};

/// Visibility state of a release
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReleaseState {
  Absent,
  Draft,
  Public,
}

impl ReleaseState {
  pub fn of(release: Option<&Release>) -> Self {
    match release {
      None => ReleaseState::Absent,
      Some(r) if r.draft => ReleaseState::Draft,
      Some(_) => ReleaseState::Public,
    }
  }
}

impl fmt::Display for ReleaseState {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ReleaseState::Absent => write!(f, "absent"),
      ReleaseState::Draft => write!(f, "draft"),
      ReleaseState::Public => write!(f, "public"),
    }
  }
}

/// One store mutation the reconciler may perform
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ReleaseAction {
  /// Create the release (draft unless publishing)
  Create { draft: bool },

  /// Replace body, tag and prerelease flag
  UpdateContent { patch: ReleasePatch },

  /// Draft -> public
  Publish,

  /// Public -> draft, gated on approval
  Unpublish,
}

impl fmt::Display for ReleaseAction {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ReleaseAction::Create { draft: true } => write!(f, "create draft release"),
      ReleaseAction::Create { draft: false } => write!(f, "create public release"),
      ReleaseAction::UpdateContent { patch } => {
        write!(f, "update content")?;
        if let Some(tag) = &patch.tag_name {
          write!(f, " (tag {})", tag)?;
        }
        Ok(())
      }
      ReleaseAction::Publish => write!(f, "publish"),
      ReleaseAction::Unpublish => write!(f, "unpublish (requires approval)"),
    }
  }
}

/// Computed transition for one release
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcilePlan {
  pub name: String,
  pub from: ReleaseState,
  /// State after every action (including an approved unpublish) is applied
  pub to: ReleaseState,
  pub actions: Vec<ReleaseAction>,
}

/// Whether the actual release's content already matches the desired spec
///
/// The prerelease flag is compared against the value derived from the tag,
/// since that is what creates and content updates write.
pub fn content_matches(desired: &ReleaseSpec, actual: &Release) -> bool {
  actual.body == desired.body
    && actual.prerelease == is_prerelease_tag(&desired.tag_name)
    && actual.tag_name == desired.tag_name
}

impl ReconcilePlan {
  /// Compute the minimal transition from `actual` to `desired`
  pub fn compute(desired: &ReleaseSpec, actual: Option<&Release>) -> Self {
    let from = ReleaseState::of(actual);
    let mut actions = Vec::new();

    match actual {
      None => actions.push(ReleaseAction::Create { draft: !desired.publish }),
      Some(current) => {
        if !content_matches(desired, current) {
          actions.push(ReleaseAction::UpdateContent {
            patch: ReleasePatch::content(desired),
          });
        }

        match (current.draft, desired.publish) {
          (true, true) => actions.push(ReleaseAction::Publish),
          (false, false) => actions.push(ReleaseAction::Unpublish),
          _ => {}
        }
      }
    }

    let to = if desired.publish {
      ReleaseState::Public
    } else {
      ReleaseState::Draft
    };

    Self {
      name: desired.name.clone(),
      from,
      to,
      actions,
    }
  }

  /// Nothing to do
  pub fn is_noop(&self) -> bool {
    self.actions.is_empty()
  }

  /// Human-readable summary (dry-run output)
  pub fn to_human_readable(&self) -> String {
    if self.is_noop() {
      return format!("'{}' is up to date ({})", self.name, self.from);
    }

    let steps: Vec<String> = self.actions.iter().map(|a| a.to_string()).collect();
    format!("'{}' {} -> {}: {}", self.name, self.from, self.to, steps.join(", "))
  }
}

/// Applies reconcile plans through a store, asking the oracle where required
pub struct Reconciler<'a> {
  store: &'a dyn ReleaseStore,
  oracle: &'a dyn ApprovalOracle,
}

impl<'a> Reconciler<'a> {
  pub fn new(store: &'a dyn ReleaseStore, oracle: &'a dyn ApprovalOracle) -> Self {
    Self { store, oracle }
  }

  /// Bring the release named `desired.name` to the desired state
  ///
  /// Store failures abort immediately and are returned as-is; earlier
  /// successful calls are not rolled back.
  pub fn reconcile(&self, component: &Component, desired: &ReleaseSpec, actual: Option<Release>) -> ShipResult<Release> {
    let plan = ReconcilePlan::compute(desired, actual.as_ref());
    debug!(%component, plan = %plan.to_human_readable(), "reconciling release");

    let Some(mut release) = actual else {
      let spec = ReleaseSpec {
        prerelease: is_prerelease_tag(&desired.tag_name),
        ..desired.clone()
      };
      info!(%component, name = %spec.name, tag = %spec.tag_name, draft = !spec.publish, "creating release");
      return self.store.create_release(component, &spec);
    };

    for action in &plan.actions {
      release = match action {
        // Only planned for absent releases, handled above
        ReleaseAction::Create { .. } => release,
        ReleaseAction::UpdateContent { patch } => {
          info!(%component, name = %release.name, "updating release content");
          self.store.update_release(component, release.id, patch)?
        }
        ReleaseAction::Publish => {
          info!(%component, name = %release.name, "publishing release");
          self.store.update_release(component, release.id, &ReleasePatch::draft(false))?
        }
        ReleaseAction::Unpublish => self.unpublish(component, release)?,
      };
    }

    Ok(release)
  }

  fn unpublish(&self, component: &Component, release: Release) -> ShipResult<Release> {
    let prompt = format!(
      "Release '{}' in {} is public. Unpublish it (back to draft)?",
      release.name, component
    );

    if self.oracle.confirm(&prompt) {
      info!(%component, name = %release.name, "unpublishing release");
      self.store.update_release(component, release.id, &ReleasePatch::draft(true))
    } else {
      warn!(%component, name = %release.name, "unpublish declined; release stays public");
      Ok(release)
    }
  }
}
