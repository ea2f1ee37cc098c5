//! Publish command: milestone notes -> reconciled release
//!
//! Single repository (`owner/name`): select the milestone, render notes from
//! its closed issues and reconcile the release named after the milestone.
//!
//! Organization (`owner`): do the same for every repository in listing order,
//! skipping the configured exclusions, then reconcile the rollup release
//! (if configured) strictly last. The first failure aborts the run.

use crate::core::context::RunContext;
use crate::core::error::{ResultExt, ShipResult};
use crate::notes::{self, RollupNotesBuilder};
use crate::release::milestone;
use crate::release::model::{Component, Issue, Release, ReleaseSpec, Target};
use crate::release::reconcile::{ReconcilePlan, ReleaseState};
use crate::store::find_release_by_name;
use std::collections::BTreeMap;
use tracing::{debug, info};

/// What to release
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishRequest {
  pub target: Target,
  /// Tag every release points at
  pub tag: String,
  /// Milestone suffix token; also the rollup release name
  pub milestone: String,
  /// Public (true) or draft (false)
  pub publish: bool,
}

impl PublishRequest {
  /// `milestone` defaults to `tag`
  pub fn new(target: Target, tag: impl Into<String>, milestone: Option<String>, publish: bool) -> Self {
    let tag = tag.into();
    Self {
      target,
      milestone: milestone.unwrap_or_else(|| tag.clone()),
      tag,
      publish,
    }
  }
}

/// Result of releasing one component (or the rollup)
#[derive(Debug, Clone)]
pub struct ComponentOutcome {
  pub component: Component,
  /// Release name (milestone title, or the milestone label for the rollup)
  pub name: String,
  /// Issues in the notes (known issues for the rollup)
  pub issue_count: usize,
  pub plan: ReconcilePlan,
  /// Release after reconciliation; in dry-run mode, the existing release if any
  pub release: Option<Release>,
}

/// Everything a run touched
#[derive(Debug, Clone, Default)]
pub struct PublishReport {
  pub components: Vec<ComponentOutcome>,
  pub rollup: Option<ComponentOutcome>,
}

/// Run the publish command
pub fn run_publish(ctx: &RunContext<'_>, request: &PublishRequest) -> ShipResult<PublishReport> {
  if ctx.dry_run {
    println!("🔍 Dry-run mode (no changes will be applied)");
    println!();
  }

  let report = match &request.target {
    Target::Repository(component) => PublishReport {
      components: vec![release_component(ctx, component, request)?],
      rollup: None,
    },
    Target::Organization(owner) => release_organization(ctx, owner, request)?,
  };

  print_summary(ctx, &report);
  Ok(report)
}

fn release_organization(ctx: &RunContext<'_>, owner: &str, request: &PublishRequest) -> ShipResult<PublishReport> {
  let rollup_repo = ctx.config.rollup.repository.as_deref();

  let all = ctx
    .store
    .list_components(owner)
    .with_context(|| format!("Failed to list repositories of '{}'", owner))?;
  println!("Found ({}) repositories in {}", all.len(), owner);
  println!();

  let components: Vec<Component> = all
    .into_iter()
    .filter(|c| {
      let skip = ctx.config.organization.is_excluded(&c.name) || Some(c.name.as_str()) == rollup_repo;
      if skip {
        debug!(component = %c, "skipping component");
      }
      !skip
    })
    .collect();

  let mut report = PublishReport::default();
  for component in &components {
    report.components.push(release_component(ctx, component, request)?);
  }

  if let Some(repo) = rollup_repo {
    let rollup = Component::new(owner, repo);
    report.rollup = Some(release_rollup(ctx, &rollup, request, &report.components)?);
  }

  Ok(report)
}

fn release_component(ctx: &RunContext<'_>, component: &Component, request: &PublishRequest) -> ShipResult<ComponentOutcome> {
  println!("📦 {}", component);

  let milestones = ctx.store.list_milestones(component)?;
  let milestone = milestone::require(&milestones, &request.milestone, component)?;
  info!(%component, milestone = %milestone.title, number = milestone.number, "selected milestone");

  let issues = ctx.store.list_closed_issues(component, milestone.number)?;
  let notes = notes::build(&issues);

  println!("Found ({}) issues in {}", notes.issue_count, milestone.title);
  println!();
  if !notes.is_empty() {
    println!("{}", notes.markdown);
  }

  let desired = ReleaseSpec::new(&request.tag, &milestone.title, notes.markdown, request.publish)
    .with_target(ctx.config.release.target_commitish.clone());

  apply(ctx, component, desired, notes.issue_count)
}

fn release_rollup(
  ctx: &RunContext<'_>,
  rollup: &Component,
  request: &PublishRequest,
  components: &[ComponentOutcome],
) -> ShipResult<ComponentOutcome> {
  println!("📦 {} (rollup)", rollup);

  let known_issues = known_issues(ctx, rollup, &request.milestone)?;

  let releases: BTreeMap<String, Release> = components
    .iter()
    .filter_map(|o| o.release.clone().map(|r| (o.component.name.clone(), r)))
    .collect();

  let builder = RollupNotesBuilder::new(ctx.config.announcements_url(&rollup.owner)?);
  let body = builder.build(&request.milestone, &releases, &known_issues);

  println!("Found ({}) known issues for {}", known_issues.len(), request.milestone);
  println!();
  println!("{}", body);

  let desired = ReleaseSpec::new(&request.tag, &request.milestone, body, request.publish)
    .with_target(ctx.config.release.target_commitish.clone());

  apply(ctx, rollup, desired, known_issues.len())
}

/// Open notices carrying the notice label whose milestone matches `milestone_label`
fn known_issues(ctx: &RunContext<'_>, rollup: &Component, milestone_label: &str) -> ShipResult<Vec<Issue>> {
  let notices = rollup.sibling(ctx.config.rollup.notices_repository.clone());
  let issues = ctx
    .store
    .list_open_labeled_issues(&notices, &ctx.config.rollup.notice_label)
    .with_context(|| format!("Failed to list known issues in {}", notices))?;

  Ok(
    issues
      .into_iter()
      .filter(|issue| {
        issue
          .milestone
          .as_ref()
          .is_some_and(|m| milestone::title_matches(&m.title, milestone_label))
      })
      .collect(),
  )
}

/// Plan, then reconcile (or just print the plan when dry-running)
fn apply(ctx: &RunContext<'_>, component: &Component, desired: ReleaseSpec, issue_count: usize) -> ShipResult<ComponentOutcome> {
  let actual = find_release_by_name(ctx.store, component, &desired.name)?;
  let plan = ReconcilePlan::compute(&desired, actual.as_ref());

  let release = if ctx.dry_run {
    println!("🔍 {}", plan.to_human_readable());
    actual
  } else {
    let release = ctx.reconciler().reconcile(component, &desired, actual)?;
    let state = ReleaseState::of(Some(&release));
    if plan.is_noop() {
      println!("✅ {}", plan.to_human_readable());
    } else if state == plan.to {
      println!("✅ '{}' is now {}: {}", release.name, state, release.url);
    } else {
      println!("⚠️  '{}' left {}: {}", release.name, state, release.url);
    }
    Some(release)
  };
  println!();

  Ok(ComponentOutcome {
    component: component.clone(),
    name: desired.name,
    issue_count,
    plan,
    release,
  })
}

fn print_summary(ctx: &RunContext<'_>, report: &PublishReport) {
  let changed = report
    .components
    .iter()
    .chain(report.rollup.iter())
    .filter(|o| !o.plan.is_noop())
    .count();
  let total = report.components.len() + usize::from(report.rollup.is_some());

  if ctx.dry_run {
    println!("🔍 {} of {} release(s) would change", changed, total);
  } else {
    println!("✅ {} of {} release(s) changed", changed, total);
  }
}
