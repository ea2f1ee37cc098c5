//! Integration tests for the `shipnotes` binary
//!
//! Only invocations that fail before any network access are exercised here.

use crate::helpers::run_shipnotes;
use anyhow::Result;
use tempfile::TempDir;

#[test]
fn test_malformed_repository_exits_with_one() -> Result<()> {
  let dir = TempDir::new()?;
  let output = run_shipnotes(dir.path(), &["acme/widgets/extra", "1.0.0"])?;

  assert_eq!(output.status.code(), Some(1));
  let stderr = String::from_utf8_lossy(&output.stderr);
  assert!(stderr.contains("Malformed repository 'acme/widgets/extra'"), "stderr: {stderr}");

  Ok(())
}

#[test]
fn test_missing_arguments_exit_with_one() -> Result<()> {
  let dir = TempDir::new()?;

  let output = run_shipnotes(dir.path(), &[])?;
  assert_eq!(output.status.code(), Some(1));

  let output = run_shipnotes(dir.path(), &["acme/widgets"])?;
  assert_eq!(output.status.code(), Some(1));

  Ok(())
}

#[test]
fn test_help_exits_with_zero() -> Result<()> {
  let dir = TempDir::new()?;
  let output = run_shipnotes(dir.path(), &["--help"])?;

  assert!(output.status.success());
  let stdout = String::from_utf8_lossy(&output.stdout);
  assert!(stdout.contains("--publish"));
  assert!(stdout.contains("--dry-run"));

  Ok(())
}

#[test]
fn test_explicit_missing_config_exits_with_one() -> Result<()> {
  let dir = TempDir::new()?;
  let output = run_shipnotes(dir.path(), &["acme/widgets", "1.0.0", "--config", "nope.toml"])?;

  assert_eq!(output.status.code(), Some(1));
  assert!(String::from_utf8_lossy(&output.stderr).contains("Configuration file not found"));

  Ok(())
}

#[test]
fn test_invalid_config_exits_with_one() -> Result<()> {
  let dir = TempDir::new()?;
  std::fs::write(dir.path().join("shipnotes.toml"), "[github]\ntimeout_secs = 0\n")?;

  let output = run_shipnotes(dir.path(), &["acme", "1.0.0"])?;
  assert_eq!(output.status.code(), Some(1));
  assert!(String::from_utf8_lossy(&output.stderr).contains("timeout_secs"));

  Ok(())
}
