//! Release and issue data shared by the notes builders and the reconciler
//!
//! Everything here is a plain snapshot: issues, milestones and releases are
//! owned by the remote store and only read here. `ReleaseSpec` is the desired
//! state the caller builds from a milestone's notes; `ReleasePatch` is the
//! partial update the reconciler sends back.

use crate::core::error::{ShipResult, UsageError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A repository participating in a release
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Component {
  pub owner: String,
  pub name: String,
}

impl Component {
  pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
    Self {
      owner: owner.into(),
      name: name.into(),
    }
  }

  /// Sibling repository in the same organization
  pub fn sibling(&self, name: impl Into<String>) -> Self {
    Self::new(self.owner.clone(), name)
  }
}

impl fmt::Display for Component {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}/{}", self.owner, self.name)
  }
}

impl FromStr for Component {
  type Err = UsageError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.split_once('/') {
      Some((owner, name)) if !owner.is_empty() && !name.is_empty() && !name.contains('/') => {
        Ok(Component::new(owner, name))
      }
      _ => Err(UsageError::MalformedRepository { value: s.to_string() }),
    }
  }
}

/// What the repository argument selects: one component or a whole organization
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
  Repository(Component),
  Organization(String),
}

impl Target {
  /// Parse `owner/name` or `owner`
  pub fn parse(value: &str) -> ShipResult<Self> {
    let value = value.trim();
    if value.is_empty() {
      return Err(
        UsageError::EmptyArgument {
          name: "repository".to_string(),
        }
        .into(),
      );
    }

    if value.contains('/') {
      Ok(Target::Repository(value.parse()?))
    } else {
      Ok(Target::Organization(value.to_string()))
    }
  }
}

/// Milestone lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MilestoneState {
  Open,
  Closed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Milestone {
  pub number: u64,
  pub title: String,
  pub state: MilestoneState,
}

/// An issue as fetched from the tracker
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
  pub number: u64,
  pub title: String,
  #[serde(default)]
  pub body: String,
  pub url: String,
  /// Label names, in tracker order
  #[serde(default)]
  pub labels: Vec<String>,
  #[serde(default)]
  pub milestone: Option<Milestone>,
}

/// A release as it currently exists in the registry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Release {
  pub id: u64,
  pub name: String,
  pub tag_name: String,
  #[serde(default)]
  pub body: String,
  pub prerelease: bool,
  pub draft: bool,
  pub url: String,
}

/// Whether a tag names a prerelease
///
/// Fixed rule: leading `0` (pre-1.0 line) or any hyphen (`-rc1`, `-beta`).
pub fn is_prerelease_tag(tag: &str) -> bool {
  tag.starts_with('0') || tag.contains('-')
}

/// Desired state of a release
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseSpec {
  pub tag_name: String,
  /// Stable key across runs; the tag may change under the same name
  pub name: String,
  pub body: String,
  pub prerelease: bool,
  /// true: release should be public; false: draft unless already public and left alone
  pub publish: bool,
  /// Branch or commit the tag is cut from when it does not exist yet
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub target_commitish: Option<String>,
}

impl ReleaseSpec {
  /// Build a spec whose prerelease flag follows the tag
  pub fn new(tag_name: impl Into<String>, name: impl Into<String>, body: impl Into<String>, publish: bool) -> Self {
    let tag_name = tag_name.into();
    Self {
      prerelease: is_prerelease_tag(&tag_name),
      tag_name,
      name: name.into(),
      body: body.into(),
      publish,
      target_commitish: None,
    }
  }

  pub fn with_target(mut self, target: Option<String>) -> Self {
    self.target_commitish = target;
    self
  }
}

/// Partial release update; `None` fields are left untouched
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleasePatch {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub tag_name: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub body: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub prerelease: Option<bool>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub draft: Option<bool>,
}

impl ReleasePatch {
  /// Content update: body, tag and the prerelease flag recomputed from the tag
  pub fn content(spec: &ReleaseSpec) -> Self {
    Self {
      tag_name: Some(spec.tag_name.clone()),
      body: Some(spec.body.clone()),
      prerelease: Some(is_prerelease_tag(&spec.tag_name)),
      draft: None,
    }
  }

  /// Visibility update only
  pub fn draft(draft: bool) -> Self {
    Self {
      draft: Some(draft),
      ..Default::default()
    }
  }

  /// Apply this patch to a snapshot (used by in-memory stores)
  pub fn apply_to(&self, release: &mut Release) {
    if let Some(tag) = &self.tag_name {
      release.tag_name = tag.clone();
    }
    if let Some(body) = &self.body {
      release.body = body.clone();
    }
    if let Some(prerelease) = self.prerelease {
      release.prerelease = prerelease;
    }
    if let Some(draft) = self.draft {
      release.draft = draft;
    }
  }
}
