//! Umbrella notes that link every component release of a milestone
//!
//! The rollup body is rendered after all component releases are reconciled,
//! because it links their final URLs. Components whose notes came out empty
//! are left out of the link list.

use crate::release::model::{Issue, Release};
use reqwest::Url;
use std::collections::BTreeMap;

/// Renders rollup notes
#[derive(Debug, Clone)]
pub struct RollupNotesBuilder {
  /// Issue list of the announcements repository, e.g. `https://github.com/acme/Announcements/issues`
  announcements: Url,
}

impl RollupNotesBuilder {
  pub fn new(announcements: Url) -> Self {
    Self { announcements }
  }

  /// Announcements issue search filtered by milestone
  pub fn breaking_changes_url(&self, milestone_label: &str) -> String {
    let mut url = self.announcements.clone();
    url
      .query_pairs_mut()
      .append_pair("q", &format!("is:issue milestone:{}", milestone_label));
    url.to_string()
  }

  /// Render the rollup notes
  ///
  /// `releases` maps component name to its release; the map's ordering gives
  /// the ascending link order.
  pub fn build(&self, milestone_label: &str, releases: &BTreeMap<String, Release>, known_issues: &[Issue]) -> String {
    let mut output = String::new();

    output.push_str(&format!("# {} Release Notes\n\n", milestone_label));
    output.push_str(&format!("We are pleased to announce the release of {}!\n\n", milestone_label));
    output.push_str("You can find the new features and bug fixes of each component in its own release notes:\n\n");

    for (name, release) in releases {
      if release.body.trim().is_empty() {
        continue;
      }
      output.push_str(&format!("- [{}]({})\n", name, release.url));
    }
    output.push('\n');

    output.push_str("## Breaking Changes\n\n");
    output.push_str(&format!(
      "- For the breaking changes in this release, see the [announcements for {}]({}).\n\n",
      milestone_label,
      self.breaking_changes_url(milestone_label)
    ));

    output.push_str("## Known Issues\n\n");
    if known_issues.is_empty() {
      output.push_str("There are no known issues for this release.\n");
    }
    for issue in known_issues {
      output.push_str(&format!("- **{}**\n\n", issue.title));
      for line in issue.body.lines() {
        output.push_str("  ");
        output.push_str(line);
        output.push('\n');
      }
      output.push('\n');
    }

    output
  }
}
