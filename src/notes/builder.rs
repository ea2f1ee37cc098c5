//! Per-repository release notes from a milestone's closed issues

use crate::notes::category::{Category, categorize};
use crate::release::model::Issue;

/// Rendered notes for one component
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReleaseNotes {
  pub markdown: String,
  /// Issues that made it into the notes
  pub issue_count: usize,
}

impl ReleaseNotes {
  pub fn is_empty(&self) -> bool {
    self.issue_count == 0
  }
}

/// Group issues by category, keeping input order inside each group
///
/// Groups come out ordered by heading, descending, so "Features" precedes
/// "Bugs Fixed".
pub fn group(issues: &[Issue]) -> Vec<(Category, Vec<&Issue>)> {
  let mut groups: Vec<(Category, Vec<&Issue>)> = Vec::new();

  for issue in issues {
    let category = categorize(&issue.labels);
    if !category.is_included() {
      continue;
    }

    match groups.iter_mut().find(|(c, _)| *c == category) {
      Some((_, members)) => members.push(issue),
      None => groups.push((category, vec![issue])),
    }
  }

  groups.sort_by(|(a, _), (b, _)| b.display_name().cmp(a.display_name()));
  groups
}

/// Render Markdown notes for a set of issues
pub fn build(issues: &[Issue]) -> ReleaseNotes {
  let mut markdown = String::new();
  let mut issue_count = 0;

  for (category, members) in group(issues) {
    markdown.push_str(&format!("### {}\n\n", category));

    for issue in members {
      markdown.push_str(&format!("* {} ([#{}]({}))\n", issue.title, issue.number, issue.url));
      issue_count += 1;
    }

    markdown.push('\n');
  }

  ReleaseNotes { markdown, issue_count }
}
