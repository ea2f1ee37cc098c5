//! Issue classification from labels
//!
//! Labels are matched by substring, so `feature-request` counts as `feature`
//! and `Status: Done` counts as `Done`. Matching is case-sensitive.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Release-notes category of an issue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
  BugsFixed,
  Features,
  /// Not mentioned in the notes
  Excluded,
}

impl Category {
  /// Heading text used in the notes
  pub fn display_name(&self) -> &'static str {
    match self {
      Category::BugsFixed => "Bugs Fixed",
      Category::Features => "Features",
      Category::Excluded => "none",
    }
  }

  pub fn is_included(&self) -> bool {
    !matches!(self, Category::Excluded)
  }
}

impl fmt::Display for Category {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.display_name())
  }
}

fn any_contains<S: AsRef<str>>(labels: &[S], needle: &str) -> bool {
  labels.iter().any(|l| l.as_ref().contains(needle))
}

/// Classify an issue by its label names
///
/// Only finished work (`Done` or `closed-fixed`) is categorized. Among
/// finished issues `bug` beats `feature`/`enhancement` regardless of label
/// order.
pub fn categorize<S: AsRef<str>>(labels: &[S]) -> Category {
  if !any_contains(labels, "Done") && !any_contains(labels, "closed-fixed") {
    return Category::Excluded;
  }

  let is_bug = any_contains(labels, "bug");
  let is_feature = any_contains(labels, "feature") || any_contains(labels, "enhancement");

  match (is_bug, is_feature) {
    (true, _) => Category::BugsFixed,
    (false, true) => Category::Features,
    (false, false) => Category::Excluded,
  }
}
