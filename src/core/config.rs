use crate::core::error::{ConfigError, ResultExt, ShipError, ShipResult};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Configuration for shipnotes
/// Searched in order: shipnotes.toml, .shipnotes.toml, .config/shipnotes.toml
///
/// Every section is optional; a missing file means built-in defaults.
///
/// # Example
///
/// ```toml
/// [organization]
/// exclude = ["Announcements", "Docs"]
///
/// [rollup]
/// repository = "Home"
/// notices_repository = "Announcements"
/// notice_label = "release-note"
///
/// [release]
/// target_commitish = "release"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NotesConfig {
  #[serde(default)]
  pub github: GitHubConfig,
  #[serde(default)]
  pub organization: OrganizationConfig,
  #[serde(default)]
  pub rollup: RollupConfig,
  #[serde(default)]
  pub release: ReleaseConfig,
}

/// GitHub endpoints
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GitHubConfig {
  /// REST API root (default: https://api.github.com)
  #[serde(default = "default_api_url")]
  pub api_url: String,

  /// Web root used for links in generated notes (default: https://github.com)
  #[serde(default = "default_web_url")]
  pub web_url: String,

  /// Per-request timeout in seconds (default: 30)
  #[serde(default = "default_timeout_secs")]
  pub timeout_secs: u64,
}

fn default_api_url() -> String {
  "https://api.github.com".to_string()
}

fn default_web_url() -> String {
  "https://github.com".to_string()
}

fn default_timeout_secs() -> u64 {
  30
}

impl Default for GitHubConfig {
  fn default() -> Self {
    Self {
      api_url: default_api_url(),
      web_url: default_web_url(),
      timeout_secs: default_timeout_secs(),
    }
  }
}

/// Organization-wide run settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OrganizationConfig {
  /// Repository names never released in an organization-wide run
  #[serde(default)]
  pub exclude: BTreeSet<String>,
}

impl OrganizationConfig {
  pub fn is_excluded(&self, name: &str) -> bool {
    self.exclude.contains(name)
  }
}

/// Umbrella release aggregating every component of an organization-wide run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RollupConfig {
  /// Repository receiving the rollup release; no rollup when unset
  #[serde(default)]
  pub repository: Option<String>,

  /// Repository holding release notices and breaking-change announcements
  #[serde(default = "default_notices_repository")]
  pub notices_repository: String,

  /// Label marking an open notice as a known issue of a release
  #[serde(default = "default_notice_label")]
  pub notice_label: String,
}

fn default_notices_repository() -> String {
  "Announcements".to_string()
}

fn default_notice_label() -> String {
  "release-note".to_string()
}

impl Default for RollupConfig {
  fn default() -> Self {
    Self {
      repository: None,
      notices_repository: default_notices_repository(),
      notice_label: default_notice_label(),
    }
  }
}

/// Release creation settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReleaseConfig {
  /// Branch new tags are cut from (default: the repository's default branch)
  #[serde(default)]
  pub target_commitish: Option<String>,
}

impl NotesConfig {
  /// Find config file in search order: shipnotes.toml, .shipnotes.toml, .config/shipnotes.toml
  pub fn find_config_path(path: &Path) -> Option<PathBuf> {
    let candidates = vec![
      path.join("shipnotes.toml"),
      path.join(".shipnotes.toml"),
      path.join(".config").join("shipnotes.toml"),
    ];

    candidates.into_iter().find(|p| p.exists())
  }

  /// Load config from `dir`, falling back to defaults when no file exists
  pub fn discover(dir: &Path) -> ShipResult<Self> {
    match Self::find_config_path(dir) {
      Some(path) => Self::load_file(&path),
      None => Ok(Self::default()),
    }
  }

  /// Load an explicitly named config file
  pub fn load_file(config_path: &Path) -> ShipResult<Self> {
    if !config_path.exists() {
      return Err(ShipError::Config(ConfigError::NotFound {
        path: config_path.to_path_buf(),
      }));
    }

    let content = fs::read_to_string(config_path)
      .with_context(|| format!("Failed to read config from {}", config_path.display()))?;
    let config: NotesConfig = toml_edit::de::from_str(&content)
      .with_context(|| format!("Failed to parse config from {}", config_path.display()))?;

    config.validate().map_err(|reason| {
      ShipError::Config(ConfigError::Invalid {
        path: config_path.to_path_buf(),
        reason,
      })
    })?;

    Ok(config)
  }

  /// Validate cross-field constraints
  pub fn validate(&self) -> Result<(), String> {
    for (key, value) in [("github.api_url", &self.github.api_url), ("github.web_url", &self.github.web_url)] {
      if Url::parse(value).is_err() {
        return Err(format!("{} '{}' is not a valid URL", key, value));
      }
    }

    if self.github.timeout_secs == 0 {
      return Err("github.timeout_secs must be greater than zero".to_string());
    }

    if self.rollup.notices_repository.trim().is_empty() {
      return Err("rollup.notices_repository must not be empty".to_string());
    }

    if self.rollup.notice_label.trim().is_empty() {
      return Err("rollup.notice_label must not be empty".to_string());
    }

    if let Some(repo) = &self.rollup.repository {
      if repo.trim().is_empty() {
        return Err("rollup.repository must not be empty when set".to_string());
      }
      if self.organization.is_excluded(repo) {
        return Err(format!(
          "rollup.repository '{}' is also listed in organization.exclude",
          repo
        ));
      }
    }

    Ok(())
  }

  /// Issue list of the notices repository, e.g. `https://github.com/acme/Announcements/issues`
  pub fn announcements_url(&self, owner: &str) -> ShipResult<Url> {
    let raw = format!(
      "{}/{}/{}/issues",
      self.github.web_url.trim_end_matches('/'),
      owner,
      self.rollup.notices_repository
    );
    Url::parse(&raw).map_err(|e| {
      ShipError::with_help(
        format!("Invalid announcements URL '{}': {}", raw, e),
        "Check [github] web_url and [rollup] notices_repository in shipnotes.toml.",
      )
    })
  }
}
