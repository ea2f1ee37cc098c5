use clap::Parser;
use shipnotes::approval::{ApprovalOracle, AutoApprove, ConsoleOracle};
use shipnotes::commands::{PublishRequest, run_publish};
use shipnotes::core::config::NotesConfig;
use shipnotes::core::context::RunContext;
use shipnotes::core::error::{ExitCode, ShipError, ShipResult, UsageError, print_error};
use shipnotes::release::Target;
use shipnotes::store::{Credentials, GitHubStore};
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Generate release notes from a milestone's closed issues and sync the GitHub release
#[derive(Parser)]
#[command(name = "shipnotes")]
#[command(version, about, long_about = None)]
#[command(styles = get_styles())]
#[command(after_help = "Examples:\n  shipnotes signalr/signalr 2.1.1\n  shipnotes aspnet 1.0.0-rc2 rc2 --publish")]
struct Cli {
  /// Repository (`owner/name`) or organization (`owner`) to release
  repository: String,

  /// Tag the release points at
  tag: String,

  /// Milestone title suffix (defaults to the tag)
  milestone: Option<String>,

  /// Make releases public instead of drafts
  #[arg(long)]
  publish: bool,

  /// Show what would change without touching any release
  #[arg(long)]
  dry_run: bool,

  /// Answer yes to every confirmation prompt
  #[arg(short, long)]
  yes: bool,

  /// Config file (default: shipnotes.toml, .shipnotes.toml or .config/shipnotes.toml)
  #[arg(long, value_name = "PATH")]
  config: Option<PathBuf>,

  /// Log debug diagnostics to stderr
  #[arg(short, long)]
  verbose: bool,
}

fn get_styles() -> clap::builder::Styles {
  let yellow = anstyle::Color::Ansi(anstyle::AnsiColor::Yellow);
  let green = anstyle::Color::Ansi(anstyle::AnsiColor::Green);
  let red = anstyle::Color::Ansi(anstyle::AnsiColor::Red);

  clap::builder::Styles::styled()
    .usage(anstyle::Style::new().bold().underline().fg_color(Some(yellow)))
    .header(anstyle::Style::new().bold().underline().fg_color(Some(yellow)))
    .literal(anstyle::Style::new().fg_color(Some(green)))
    .invalid(anstyle::Style::new().bold().fg_color(Some(red)))
    .error(anstyle::Style::new().bold().fg_color(Some(red)))
    .valid(anstyle::Style::new().bold().underline().fg_color(Some(green)))
    .placeholder(anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::White))))
}

/// `SHIPNOTES_LOG` wins; otherwise `warn`, or `debug` with `--verbose`
fn init_tracing(verbose: bool) {
  let default_level = if verbose { "debug" } else { "warn" };
  let filter = EnvFilter::try_from_env("SHIPNOTES_LOG").unwrap_or_else(|_| EnvFilter::new(default_level));

  tracing_subscriber::registry()
    .with(
      fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr),
    )
    .with(filter)
    .init();
}

fn handle_error(err: ShipError) -> ! {
  print_error(&err);
  std::process::exit(err.exit_code().as_i32());
}

fn load_config(explicit: Option<&PathBuf>) -> ShipResult<NotesConfig> {
  match explicit {
    Some(path) => NotesConfig::load_file(path),
    None => NotesConfig::discover(&std::env::current_dir()?),
  }
}

fn run(cli: Cli) -> ShipResult<()> {
  // Validate arguments before any network activity
  let target = Target::parse(&cli.repository)?;
  if cli.tag.trim().is_empty() {
    return Err(UsageError::EmptyArgument { name: "tag".to_string() }.into());
  }
  let milestone = cli.milestone.filter(|m| !m.trim().is_empty());

  let config = load_config(cli.config.as_ref())?;
  let store = GitHubStore::new(&config.github, Credentials::from_env())?;
  let oracle: Box<dyn ApprovalOracle> = if cli.yes {
    Box::new(AutoApprove)
  } else {
    Box::new(ConsoleOracle::stdio())
  };

  let ctx = RunContext::new(&store, oracle.as_ref(), &config).with_dry_run(cli.dry_run);
  let request = PublishRequest::new(target, cli.tag, milestone, cli.publish);

  run_publish(&ctx, &request)?;
  Ok(())
}

fn main() {
  let cli = match Cli::try_parse() {
    Ok(cli) => cli,
    // --help / --version print and exit 0; everything else is a usage error
    Err(e) if !e.use_stderr() => e.exit(),
    Err(e) => {
      let _ = e.print();
      std::process::exit(ExitCode::Failure.as_i32());
    }
  };

  init_tracing(cli.verbose);

  match run(cli) {
    Ok(()) => std::process::exit(ExitCode::Success.as_i32()),
    Err(err) => handle_error(err),
  }
}
