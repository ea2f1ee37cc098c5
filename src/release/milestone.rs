//! Milestone selection by title suffix

use crate::core::error::{ShipError, ShipResult};
use crate::release::model::{Component, Milestone};

/// Case-insensitive `ends_with`
pub fn title_matches(title: &str, token: &str) -> bool {
  title.to_lowercase().ends_with(&token.to_lowercase())
}

/// First milestone (in store listing order) whose title ends with `token`
///
/// There is no tie-break: if several titles share the suffix, whichever the
/// store listed first wins.
pub fn select<'a>(milestones: &'a [Milestone], token: &str) -> Option<&'a Milestone> {
  milestones.iter().find(|m| title_matches(&m.title, token))
}

/// Like [`select`], but a miss is fatal for the component
pub fn require<'a>(milestones: &'a [Milestone], token: &str, component: &Component) -> ShipResult<&'a Milestone> {
  select(milestones, token).ok_or_else(|| ShipError::MilestoneNotFound {
    component: component.to_string(),
    milestone: token.to_string(),
  })
}
