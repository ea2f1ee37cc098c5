//! Test helpers for integration tests

use anyhow::{Context, Result};
use shipnotes::approval::ApprovalOracle;
use shipnotes::core::error::{ShipResult, StoreError};
use shipnotes::release::{Component, Issue, Milestone, MilestoneState, Release, ReleasePatch, ReleaseSpec};
use shipnotes::store::ReleaseStore;
use std::cell::{Cell, RefCell};
use std::collections::{HashMap, VecDeque};
use std::path::Path;
use std::process::{Command, Output};

/// One recorded store call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
  ListComponents(String),
  ListMilestones(Component),
  ListClosedIssues(Component, u64),
  ListOpenLabeledIssues(Component, String),
  ListReleases(Component),
  Create(Component, ReleaseSpec),
  Update(Component, u64, ReleasePatch),
}

impl Call {
  pub fn is_mutation(&self) -> bool {
    matches!(self, Call::Create(..) | Call::Update(..))
  }
}

/// In-memory release store recording every call
#[derive(Default)]
pub struct MemoryStore {
  components: HashMap<String, Vec<Component>>,
  milestones: HashMap<Component, Vec<Milestone>>,
  closed_issues: HashMap<(Component, u64), Vec<Issue>>,
  open_issues: HashMap<Component, Vec<Issue>>,
  releases: RefCell<HashMap<Component, Vec<Release>>>,
  calls: RefCell<Vec<Call>>,
  next_id: Cell<u64>,
  fail_mutations: Cell<bool>,
}

impl MemoryStore {
  pub fn new() -> Self {
    Self {
      next_id: Cell::new(1000),
      ..Default::default()
    }
  }

  pub fn with_components(mut self, owner: &str, names: &[&str]) -> Self {
    self
      .components
      .insert(owner.to_string(), names.iter().map(|n| Component::new(owner, *n)).collect());
    self
  }

  /// Add a milestone with its closed issues
  pub fn with_milestone(mut self, component: &Component, number: u64, title: &str, issues: Vec<Issue>) -> Self {
    self.milestones.entry(component.clone()).or_default().push(Milestone {
      number,
      title: title.to_string(),
      state: MilestoneState::Closed,
    });
    self.closed_issues.insert((component.clone(), number), issues);
    self
  }

  pub fn with_open_issue(mut self, repo: &Component, issue: Issue) -> Self {
    self.open_issues.entry(repo.clone()).or_default().push(issue);
    self
  }

  pub fn with_release(self, component: &Component, release: Release) -> Self {
    self
      .releases
      .borrow_mut()
      .entry(component.clone())
      .or_default()
      .push(release);
    self
  }

  /// Make every create/update fail with a 500
  pub fn fail_mutations(&self) {
    self.fail_mutations.set(true);
  }

  pub fn calls(&self) -> Vec<Call> {
    self.calls.borrow().clone()
  }

  pub fn mutations(&self) -> Vec<Call> {
    self.calls().into_iter().filter(Call::is_mutation).collect()
  }

  pub fn clear_calls(&self) {
    self.calls.borrow_mut().clear();
  }

  pub fn releases_of(&self, component: &Component) -> Vec<Release> {
    self.releases.borrow().get(component).cloned().unwrap_or_default()
  }

  fn record(&self, call: Call) {
    self.calls.borrow_mut().push(call);
  }

  fn check_mutation(&self, component: &Component) -> ShipResult<()> {
    if self.fail_mutations.get() {
      return Err(
        StoreError::Api {
          endpoint: format!("/repos/{}/releases", component),
          status: 500,
          message: "Server Error".to_string(),
        }
        .into(),
      );
    }
    Ok(())
  }
}

impl ReleaseStore for MemoryStore {
  fn list_components(&self, owner: &str) -> ShipResult<Vec<Component>> {
    self.record(Call::ListComponents(owner.to_string()));
    Ok(self.components.get(owner).cloned().unwrap_or_default())
  }

  fn list_milestones(&self, component: &Component) -> ShipResult<Vec<Milestone>> {
    self.record(Call::ListMilestones(component.clone()));
    Ok(self.milestones.get(component).cloned().unwrap_or_default())
  }

  fn list_closed_issues(&self, component: &Component, milestone_id: u64) -> ShipResult<Vec<Issue>> {
    self.record(Call::ListClosedIssues(component.clone(), milestone_id));
    Ok(
      self
        .closed_issues
        .get(&(component.clone(), milestone_id))
        .cloned()
        .unwrap_or_default(),
    )
  }

  fn list_open_labeled_issues(&self, repo: &Component, label: &str) -> ShipResult<Vec<Issue>> {
    self.record(Call::ListOpenLabeledIssues(repo.clone(), label.to_string()));
    Ok(
      self
        .open_issues
        .get(repo)
        .map(|issues| issues.iter().filter(|i| i.labels.iter().any(|l| l == label)).cloned().collect())
        .unwrap_or_default(),
    )
  }

  fn list_releases(&self, component: &Component) -> ShipResult<Vec<Release>> {
    self.record(Call::ListReleases(component.clone()));
    Ok(self.releases_of(component))
  }

  fn create_release(&self, component: &Component, spec: &ReleaseSpec) -> ShipResult<Release> {
    self.record(Call::Create(component.clone(), spec.clone()));
    self.check_mutation(component)?;

    let id = self.next_id.get();
    self.next_id.set(id + 1);

    let release = Release {
      id,
      name: spec.name.clone(),
      tag_name: spec.tag_name.clone(),
      body: spec.body.clone(),
      prerelease: spec.prerelease,
      draft: !spec.publish,
      url: format!("https://github.com/{}/releases/tag/{}", component, spec.tag_name),
    };
    self
      .releases
      .borrow_mut()
      .entry(component.clone())
      .or_default()
      .push(release.clone());
    Ok(release)
  }

  fn update_release(&self, component: &Component, release_id: u64, patch: &ReleasePatch) -> ShipResult<Release> {
    self.record(Call::Update(component.clone(), release_id, patch.clone()));
    self.check_mutation(component)?;

    let mut releases = self.releases.borrow_mut();
    let release = releases
      .get_mut(component)
      .and_then(|list| list.iter_mut().find(|r| r.id == release_id))
      .ok_or_else(|| StoreError::NotFound {
        endpoint: format!("/repos/{}/releases/{}", component, release_id),
      })?;

    patch.apply_to(release);
    Ok(release.clone())
  }
}

/// Oracle answering from a script; records every prompt
pub struct ScriptedOracle {
  answers: RefCell<VecDeque<bool>>,
  prompts: RefCell<Vec<String>>,
}

impl ScriptedOracle {
  pub fn new(answers: &[bool]) -> Self {
    Self {
      answers: RefCell::new(answers.iter().copied().collect()),
      prompts: RefCell::new(Vec::new()),
    }
  }

  pub fn prompts(&self) -> Vec<String> {
    self.prompts.borrow().clone()
  }
}

impl ApprovalOracle for ScriptedOracle {
  fn confirm(&self, prompt: &str) -> bool {
    self.prompts.borrow_mut().push(prompt.to_string());
    // Out of answers means "no"
    self.answers.borrow_mut().pop_front().unwrap_or(false)
  }
}

pub fn issue(number: u64, title: &str, labels: &[&str]) -> Issue {
  Issue {
    number,
    title: title.to_string(),
    body: String::new(),
    url: format!("https://github.com/acme/widgets/issues/{}", number),
    labels: labels.iter().map(|l| l.to_string()).collect(),
    milestone: None,
  }
}

pub fn release(id: u64, name: &str, tag: &str, body: &str, draft: bool) -> Release {
  Release {
    id,
    name: name.to_string(),
    tag_name: tag.to_string(),
    body: body.to_string(),
    prerelease: shipnotes::release::model::is_prerelease_tag(tag),
    draft,
    url: format!("https://github.com/acme/releases/tag/{}", tag),
  }
}

/// Run the shipnotes binary; never fails on a non-zero exit
pub fn run_shipnotes(cwd: &Path, args: &[&str]) -> Result<Output> {
  let shipnotes_bin = env!("CARGO_BIN_EXE_shipnotes");

  Command::new(shipnotes_bin)
    .current_dir(cwd)
    .args(args)
    // Keep the run credential-free
    .env_remove("GITHUB_TOKEN")
    .env_remove("GITHUB_USER")
    .env_remove("GITHUB_PASSWORD")
    .output()
    .context("Failed to run shipnotes")
}
