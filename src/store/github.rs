//! GitHub REST v3 implementation of [`ReleaseStore`]
//!
//! Uses the blocking reqwest client: the run is strictly sequential, so there
//! is nothing to gain from an async runtime. List endpoints are paginated with
//! `per_page=100` until a short page comes back.

use crate::core::config::GitHubConfig;
use crate::core::error::{ShipError, ShipResult, StoreError};
use crate::release::model::{Component, Issue, Milestone, MilestoneState, Release, ReleasePatch, ReleaseSpec};
use crate::store::ReleaseStore;
use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

const PER_PAGE: usize = 100;

/// How requests authenticate
#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
  Token(String),
  Basic { user: String, password: String },
  Anonymous,
}

impl Credentials {
  /// Read `GITHUB_TOKEN`, else `GITHUB_USER` + `GITHUB_PASSWORD`
  pub fn from_env() -> Self {
    Self::from_values(
      std::env::var("GITHUB_TOKEN").ok(),
      std::env::var("GITHUB_USER").ok(),
      std::env::var("GITHUB_PASSWORD").ok(),
    )
  }

  /// Token wins; user/password only count as a pair
  pub fn from_values(token: Option<String>, user: Option<String>, password: Option<String>) -> Self {
    let non_empty = |v: Option<String>| v.filter(|s| !s.is_empty());

    match (non_empty(token), non_empty(user), non_empty(password)) {
      (Some(token), _, _) => Credentials::Token(token),
      (None, Some(user), Some(password)) => Credentials::Basic { user, password },
      _ => Credentials::Anonymous,
    }
  }

  fn apply(&self, request: RequestBuilder) -> RequestBuilder {
    match self {
      Credentials::Token(token) => request.bearer_auth(token),
      Credentials::Basic { user, password } => request.basic_auth(user, Some(password)),
      Credentials::Anonymous => request,
    }
  }
}

// Never print secrets
impl std::fmt::Debug for Credentials {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Credentials::Token(_) => write!(f, "Token(***)"),
      Credentials::Basic { user, .. } => write!(f, "Basic({}, ***)", user),
      Credentials::Anonymous => write!(f, "Anonymous"),
    }
  }
}

// ----------------------------------------------------------------------------
// Wire types
// ----------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct GhOwner {
  login: String,
}

#[derive(Debug, Deserialize)]
struct GhRepository {
  name: String,
  owner: GhOwner,
}

#[derive(Debug, Deserialize)]
struct GhLabel {
  name: String,
}

#[derive(Debug, Deserialize)]
struct GhMilestone {
  number: u64,
  title: String,
  state: MilestoneState,
}

#[derive(Debug, Deserialize)]
struct GhIssue {
  number: u64,
  title: String,
  #[serde(default)]
  body: Option<String>,
  html_url: String,
  #[serde(default)]
  labels: Vec<GhLabel>,
  #[serde(default)]
  milestone: Option<GhMilestone>,
}

#[derive(Debug, Deserialize)]
struct GhRelease {
  id: u64,
  #[serde(default)]
  name: Option<String>,
  tag_name: String,
  #[serde(default)]
  body: Option<String>,
  prerelease: bool,
  draft: bool,
  html_url: String,
}

#[derive(Debug, Serialize)]
struct CreateReleaseRequest<'a> {
  tag_name: &'a str,
  name: &'a str,
  body: &'a str,
  draft: bool,
  prerelease: bool,
  #[serde(skip_serializing_if = "Option::is_none")]
  target_commitish: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct GhErrorBody {
  message: String,
}

impl From<GhRepository> for Component {
  fn from(repo: GhRepository) -> Self {
    Component::new(repo.owner.login, repo.name)
  }
}

impl From<GhMilestone> for Milestone {
  fn from(m: GhMilestone) -> Self {
    Milestone {
      number: m.number,
      title: m.title,
      state: m.state,
    }
  }
}

impl From<GhIssue> for Issue {
  fn from(issue: GhIssue) -> Self {
    Issue {
      number: issue.number,
      title: issue.title,
      body: issue.body.unwrap_or_default(),
      url: issue.html_url,
      labels: issue.labels.into_iter().map(|l| l.name).collect(),
      milestone: issue.milestone.map(Milestone::from),
    }
  }
}

impl From<GhRelease> for Release {
  fn from(r: GhRelease) -> Self {
    Release {
      id: r.id,
      name: r.name.unwrap_or_default(),
      tag_name: r.tag_name,
      body: r.body.unwrap_or_default(),
      prerelease: r.prerelease,
      draft: r.draft,
      url: r.html_url,
    }
  }
}

// ----------------------------------------------------------------------------
// Client
// ----------------------------------------------------------------------------

/// GitHub-backed release store
pub struct GitHubStore {
  client: Client,
  api_url: String,
  credentials: Credentials,
}

impl GitHubStore {
  /// Build a store from config and credentials
  pub fn new(config: &GitHubConfig, credentials: Credentials) -> ShipResult<Self> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json"));
    headers.insert("X-GitHub-Api-Version", HeaderValue::from_static("2022-11-28"));

    let client = Client::builder()
      .user_agent(concat!("shipnotes/", env!("CARGO_PKG_VERSION")))
      .default_headers(headers)
      .timeout(Duration::from_secs(config.timeout_secs))
      .build()
      .map_err(|e| ShipError::message(format!("Failed to create HTTP client: {}", e)))?;

    debug!(api_url = %config.api_url, credentials = ?credentials, "GitHub store ready");

    Ok(Self {
      client,
      api_url: config.api_url.trim_end_matches('/').to_string(),
      credentials,
    })
  }

  fn url(&self, path: &str) -> String {
    format!("{}{}", self.api_url, path)
  }

  fn send(&self, method: Method, path: &str, query: &[(&str, String)], body: Option<&serde_json::Value>) -> ShipResult<Response> {
    let endpoint = self.url(path);
    debug!(%method, %endpoint, ?query, "GitHub request");

    let mut request = self.client.request(method, &endpoint).query(query);
    if let Some(body) = body {
      request = request.json(body);
    }

    let response = self.credentials.apply(request).send().map_err(|e| StoreError::Transport {
      endpoint: Some(endpoint.clone()),
      message: e.to_string(),
    })?;

    check_status(&endpoint, response)
  }

  fn get_paged<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> ShipResult<Vec<T>> {
    collect_pages(|page| {
      let mut paged: Vec<(&str, String)> = query.to_vec();
      paged.push(("per_page", PER_PAGE.to_string()));
      paged.push(("page", page.to_string()));

      decode(&self.url(path), self.send(Method::GET, path, &paged, None)?)
    })
  }

  fn write<T: DeserializeOwned>(&self, method: Method, path: &str, body: serde_json::Value) -> ShipResult<T> {
    decode(&self.url(path), self.send(method, path, &[], Some(&body))?)
  }
}

/// Fetch pages 1, 2, ... until one comes back with fewer than `PER_PAGE` items
fn collect_pages<T, F>(mut fetch: F) -> ShipResult<Vec<T>>
where
  F: FnMut(usize) -> ShipResult<Vec<T>>,
{
  let mut items = Vec::new();

  for page in 1.. {
    let batch = fetch(page)?;
    let len = batch.len();
    items.extend(batch);

    if len < PER_PAGE {
      break;
    }
  }

  Ok(items)
}

fn check_status(endpoint: &str, response: Response) -> ShipResult<Response> {
  let status = response.status();
  if status.is_success() {
    return Ok(response);
  }

  let headers = response.headers().clone();
  let body = response.text().unwrap_or_default();
  Err(status_error(endpoint, status, &headers, &body).into())
}

/// Map a non-success response to a store error
fn status_error(endpoint: &str, status: StatusCode, headers: &HeaderMap, body: &str) -> StoreError {
  let endpoint = endpoint.to_string();
  let header = |name: &str| headers.get(name).and_then(|v| v.to_str().ok());
  let rate_limit_exhausted = header("x-ratelimit-remaining").is_some_and(|v| v == "0");

  match status {
    StatusCode::UNAUTHORIZED => StoreError::Unauthorized { endpoint },
    StatusCode::FORBIDDEN | StatusCode::TOO_MANY_REQUESTS if rate_limit_exhausted => StoreError::RateLimited {
      endpoint,
      reset: header("x-ratelimit-reset").and_then(|v| v.parse().ok()),
    },
    StatusCode::NOT_FOUND => StoreError::NotFound { endpoint },
    _ => {
      let message = serde_json::from_str::<GhErrorBody>(body)
        .map(|e| e.message)
        .unwrap_or_else(|_| body.to_string());
      StoreError::Api {
        endpoint,
        status: status.as_u16(),
        message,
      }
    }
  }
}

fn decode<T: DeserializeOwned>(endpoint: &str, response: Response) -> ShipResult<T> {
  let text = response.text().map_err(|e| StoreError::Transport {
    endpoint: Some(endpoint.to_string()),
    message: e.to_string(),
  })?;

  serde_json::from_str(&text).map_err(|e| {
    StoreError::Decode {
      endpoint: Some(endpoint.to_string()),
      message: e.to_string(),
    }
    .into()
  })
}

fn repo_path(component: &Component) -> String {
  format!("/repos/{}/{}", component.owner, component.name)
}

fn create_body(spec: &ReleaseSpec) -> ShipResult<serde_json::Value> {
  let request = CreateReleaseRequest {
    tag_name: &spec.tag_name,
    name: &spec.name,
    body: &spec.body,
    draft: !spec.publish,
    prerelease: spec.prerelease,
    target_commitish: spec.target_commitish.as_deref(),
  };
  Ok(serde_json::to_value(request)?)
}

impl ReleaseStore for GitHubStore {
  fn list_components(&self, owner: &str) -> ShipResult<Vec<Component>> {
    let repos: Vec<GhRepository> = self.get_paged(&format!("/orgs/{}/repos", owner), &[("type", "all".to_string())])?;
    Ok(repos.into_iter().map(Component::from).collect())
  }

  fn list_milestones(&self, component: &Component) -> ShipResult<Vec<Milestone>> {
    let path = format!("{}/milestones", repo_path(component));

    // Open first, then closed
    let mut milestones: Vec<GhMilestone> = self.get_paged(&path, &[("state", "open".to_string())])?;
    milestones.extend(self.get_paged::<GhMilestone>(&path, &[("state", "closed".to_string())])?);

    Ok(milestones.into_iter().map(Milestone::from).collect())
  }

  fn list_closed_issues(&self, component: &Component, milestone_id: u64) -> ShipResult<Vec<Issue>> {
    let issues: Vec<GhIssue> = self.get_paged(
      &format!("{}/issues", repo_path(component)),
      &[("state", "closed".to_string()), ("milestone", milestone_id.to_string())],
    )?;
    Ok(issues.into_iter().map(Issue::from).collect())
  }

  fn list_open_labeled_issues(&self, repo: &Component, label: &str) -> ShipResult<Vec<Issue>> {
    let issues: Vec<GhIssue> = self.get_paged(
      &format!("{}/issues", repo_path(repo)),
      &[("state", "open".to_string()), ("labels", label.to_string())],
    )?;
    Ok(issues.into_iter().map(Issue::from).collect())
  }

  fn list_releases(&self, component: &Component) -> ShipResult<Vec<Release>> {
    let releases: Vec<GhRelease> = self.get_paged(&format!("{}/releases", repo_path(component)), &[])?;
    Ok(releases.into_iter().map(Release::from).collect())
  }

  fn create_release(&self, component: &Component, spec: &ReleaseSpec) -> ShipResult<Release> {
    let release: GhRelease = self.write(
      Method::POST,
      &format!("{}/releases", repo_path(component)),
      create_body(spec)?,
    )?;
    Ok(release.into())
  }

  fn update_release(&self, component: &Component, release_id: u64, patch: &ReleasePatch) -> ShipResult<Release> {
    let release: GhRelease = self.write(
      Method::PATCH,
      &format!("{}/releases/{}", repo_path(component), release_id),
      serde_json::to_value(patch)?,
    )?;
    Ok(release.into())
  }
}
