//! Error types for shipnotes with contextual messages and exit codes
//!
//! Every failure the run can hit is categorized here: invalid invocations,
//! configuration problems, missing milestones, and anything the remote store
//! reports. Each category can carry a help message that points the user
//! toward a fix. A declined approval prompt is deliberately absent: it is an
//! outcome, not a failure.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Exit codes for shipnotes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
  /// Run completed
  Success = 0,
  /// Usage error or any failure during the run
  Failure = 1,
}

impl ExitCode {
  /// Convert to i32 for process exit
  pub fn as_i32(self) -> i32 {
    self as i32
  }
}

/// Main error type for shipnotes
#[derive(Debug)]
pub enum ShipError {
  /// Malformed invocation (caught before any network activity)
  Usage(UsageError),

  /// Configuration errors
  Config(ConfigError),

  /// No milestone matched the requested token
  MilestoneNotFound { component: String, milestone: String },

  /// Remote tracker/registry failures
  Store(StoreError),

  /// I/O errors
  Io(io::Error),

  /// Generic error with message and optional context
  Message {
    message: String,
    context: Option<String>,
    help: Option<String>,
  },
}

impl ShipError {
  /// Create a simple error message
  pub fn message(msg: impl Into<String>) -> Self {
    ShipError::Message {
      message: msg.into(),
      context: None,
      help: None,
    }
  }

  /// Create an error with help text
  pub fn with_help(msg: impl Into<String>, help: impl Into<String>) -> Self {
    ShipError::Message {
      message: msg.into(),
      context: None,
      help: Some(help.into()),
    }
  }

  /// Add context to an existing error
  pub fn context(self, ctx: impl Into<String>) -> Self {
    let ctx_str = ctx.into();
    match self {
      ShipError::Message { message, context, help } => ShipError::Message {
        message,
        context: Some(context.map(|c| format!("{}\n{}", ctx_str, c)).unwrap_or(ctx_str)),
        help,
      },
      ShipError::Config(ConfigError::Invalid { path, reason }) => ShipError::Config(ConfigError::Invalid {
        path,
        reason: format!("{}: {}", ctx_str, reason),
      }),
      _ => self,
    }
  }

  /// Get the exit code for this error
  ///
  /// Usage errors and run failures share a code; the message tells them apart.
  pub fn exit_code(&self) -> ExitCode {
    ExitCode::Failure
  }

  /// Get contextual help message for this error
  pub fn help_message(&self) -> Option<String> {
    match self {
      ShipError::Usage(e) => e.help_message(),
      ShipError::Config(e) => e.help_message(),
      ShipError::MilestoneNotFound { component, .. } => Some(format!(
        "Check the milestone titles of {} on GitHub. The milestone argument is matched as a case-insensitive suffix.",
        component
      )),
      ShipError::Store(e) => e.help_message(),
      ShipError::Message { help, .. } => help.clone(),
      ShipError::Io(_) => None,
    }
  }

  /// Whether this is a usage error (reported before any network call)
  pub fn is_usage(&self) -> bool {
    matches!(self, ShipError::Usage(_))
  }
}

impl fmt::Display for ShipError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ShipError::Usage(e) => write!(f, "{}", e),
      ShipError::Config(e) => write!(f, "{}", e),
      ShipError::MilestoneNotFound { component, milestone } => {
        write!(f, "No milestone matching '{}' found in {}", milestone, component)
      }
      ShipError::Store(e) => write!(f, "{}", e),
      ShipError::Io(e) => write!(f, "I/O error: {}", e),
      ShipError::Message { message, context, .. } => {
        write!(f, "{}", message)?;
        if let Some(ctx) = context {
          write!(f, "\n{}", ctx)?;
        }
        Ok(())
      }
    }
  }
}

impl std::error::Error for ShipError {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    match self {
      ShipError::Io(e) => Some(e),
      _ => None,
    }
  }
}

impl From<io::Error> for ShipError {
  fn from(err: io::Error) -> Self {
    ShipError::Io(err)
  }
}

impl From<String> for ShipError {
  fn from(msg: String) -> Self {
    ShipError::message(msg)
  }
}

impl From<&str> for ShipError {
  fn from(msg: &str) -> Self {
    ShipError::message(msg)
  }
}

impl From<UsageError> for ShipError {
  fn from(err: UsageError) -> Self {
    ShipError::Usage(err)
  }
}

impl From<StoreError> for ShipError {
  fn from(err: StoreError) -> Self {
    ShipError::Store(err)
  }
}

impl From<ConfigError> for ShipError {
  fn from(err: ConfigError) -> Self {
    ShipError::Config(err)
  }
}

impl From<toml_edit::de::Error> for ShipError {
  fn from(err: toml_edit::de::Error) -> Self {
    ShipError::message(format!("TOML deserialization error: {}", err))
  }
}

impl From<serde_json::Error> for ShipError {
  fn from(err: serde_json::Error) -> Self {
    ShipError::Store(StoreError::Decode {
      endpoint: None,
      message: err.to_string(),
    })
  }
}

impl From<reqwest::Error> for ShipError {
  fn from(err: reqwest::Error) -> Self {
    ShipError::Store(StoreError::Transport {
      endpoint: err.url().map(|u| u.to_string()),
      message: err.to_string(),
    })
  }
}

/// Invocation errors
#[derive(Debug)]
pub enum UsageError {
  /// Repository argument is not `owner` or `owner/name`
  MalformedRepository { value: String },

  /// A required argument was empty
  EmptyArgument { name: String },
}

impl UsageError {
  fn help_message(&self) -> Option<String> {
    match self {
      UsageError::MalformedRepository { .. } => Some(
        "Pass `owner/name` to release one repository or `owner` to release every repository of an organization."
          .to_string(),
      ),
      UsageError::EmptyArgument { .. } => Some("Run `shipnotes --help` for usage.".to_string()),
    }
  }
}

impl fmt::Display for UsageError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      UsageError::MalformedRepository { value } => {
        write!(f, "Malformed repository '{}': expected `owner` or `owner/name`", value)
      }
      UsageError::EmptyArgument { name } => write!(f, "Argument <{}> must not be empty", name),
    }
  }
}

/// Configuration-related errors
#[derive(Debug)]
pub enum ConfigError {
  /// Explicitly requested config file does not exist
  NotFound { path: PathBuf },

  /// Config file parsed but failed validation
  Invalid { path: PathBuf, reason: String },
}

impl ConfigError {
  fn help_message(&self) -> Option<String> {
    match self {
      ConfigError::NotFound { .. } => {
        Some("Drop the --config flag to use shipnotes.toml from the current directory (or built-in defaults).".to_string())
      }
      ConfigError::Invalid { .. } => None,
    }
  }
}

impl fmt::Display for ConfigError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ConfigError::NotFound { path } => write!(f, "Configuration file not found: {}", path.display()),
      ConfigError::Invalid { path, reason } => {
        write!(f, "Invalid configuration in {}: {}", path.display(), reason)
      }
    }
  }
}

/// Remote tracker/registry errors
#[derive(Debug)]
pub enum StoreError {
  /// Request never produced a response (DNS, TLS, connection reset...)
  Transport { endpoint: Option<String>, message: String },

  /// 401 from the API
  Unauthorized { endpoint: String },

  /// 403 with an exhausted rate limit
  RateLimited { endpoint: String, reset: Option<u64> },

  /// 404 from the API
  NotFound { endpoint: String },

  /// Any other non-success status
  Api {
    endpoint: String,
    status: u16,
    message: String,
  },

  /// Response body did not match the expected shape
  Decode { endpoint: Option<String>, message: String },
}

impl StoreError {
  fn help_message(&self) -> Option<String> {
    match self {
      StoreError::Unauthorized { .. } => {
        Some("Set GITHUB_TOKEN (or GITHUB_USER and GITHUB_PASSWORD) to valid credentials.".to_string())
      }
      StoreError::RateLimited { reset, .. } => Some(match reset {
        Some(epoch) => format!(
          "GitHub API rate limit exhausted; it resets at unix time {}. Authenticated requests get a higher limit.",
          epoch
        ),
        None => "GitHub API rate limit exhausted. Authenticated requests get a higher limit.".to_string(),
      }),
      StoreError::NotFound { .. } => Some(
        "Check the repository name. Private repositories and draft releases are only visible with credentials."
          .to_string(),
      ),
      StoreError::Transport { .. } => Some("Check network connectivity and the [github] api_url setting.".to_string()),
      _ => None,
    }
  }
}

impl fmt::Display for StoreError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      StoreError::Transport { endpoint, message } => match endpoint {
        Some(endpoint) => write!(f, "Request to {} failed: {}", endpoint, message),
        None => write!(f, "Request failed: {}", message),
      },
      StoreError::Unauthorized { endpoint } => write!(f, "Authentication rejected by {}", endpoint),
      StoreError::RateLimited { endpoint, .. } => write!(f, "Rate limited by {}", endpoint),
      StoreError::NotFound { endpoint } => write!(f, "Not found: {}", endpoint),
      StoreError::Api {
        endpoint,
        status,
        message,
      } => write!(f, "GitHub API error ({}) from {}: {}", status, endpoint, message),
      StoreError::Decode { endpoint, message } => match endpoint {
        Some(endpoint) => write!(f, "Unexpected response from {}: {}", endpoint, message),
        None => write!(f, "Unexpected response: {}", message),
      },
    }
  }
}

/// Result type alias for shipnotes
pub type ShipResult<T> = Result<T, ShipError>;

/// Helper trait to add context to Results
pub trait ResultExt<T> {
  /// Add context to an error result
  fn context(self, ctx: impl Into<String>) -> ShipResult<T>;

  /// Add context using a closure (lazy evaluation)
  fn with_context<F>(self, f: F) -> ShipResult<T>
  where
    F: FnOnce() -> String;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
  E: Into<ShipError>,
{
  fn context(self, ctx: impl Into<String>) -> ShipResult<T> {
    self.map_err(|e| e.into().context(ctx))
  }

  fn with_context<F>(self, f: F) -> ShipResult<T>
  where
    F: FnOnce() -> String,
  {
    self.map_err(|e| e.into().context(f()))
  }
}

/// Pretty-print an error to stderr with help text
pub fn print_error(error: &ShipError) {
  eprintln!("\n❌ {}\n", error);

  if let Some(help) = error.help_message() {
    eprintln!("💡 Help: {}\n", help);
  }
}
