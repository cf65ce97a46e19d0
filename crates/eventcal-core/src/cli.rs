use std::io::IsTerminal;
use std::path::PathBuf;

use anyhow::anyhow;
use chrono::NaiveDate;
use clap::{ArgAction, Parser, ValueEnum};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Month grid plus a per-day agenda for the terminal.
    #[default]
    Text,
    /// The `#calendar` fragment the web frontend renders.
    Html,
}

#[derive(Parser, Debug, Clone)]
#[command(
    name = "eventcal",
    version,
    about = "Render this month's calendar with its recurring events"
)]
pub struct GlobalCli {
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    pub verbose: u8,

    #[arg(short = 'q', long = "quiet", action = ArgAction::Count)]
    pub quiet: u8,

    /// Path to eventcal.toml.
    #[arg(long = "config")]
    pub config: Option<PathBuf>,

    /// Events JSON file; overrides the `events` setting.
    #[arg(long = "events")]
    pub events: Option<PathBuf>,

    /// Render as if today were this date (YYYY-MM-DD).
    #[arg(long = "today")]
    pub today: Option<NaiveDate>,

    /// IANA timezone id, or `local`.
    #[arg(long = "timezone", env = "EVENTCAL_TIMEZONE")]
    pub timezone: Option<String>,

    #[arg(long = "format", value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Write to this file instead of stdout.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    #[arg(long = "no-color")]
    pub no_color: bool,
}

/// Level used when `RUST_LOG` is unset. Each `-q` beats any `-v`.
fn default_level(verbose: u8, quiet: u8) -> &'static str {
    match (quiet, verbose) {
        (2.., _) => "error",
        (1, _) => "warn",
        (0, 3..) => "trace",
        (0, 2) => "debug",
        (0, 1) => "info",
        (0, 0) => "warn",
    }
}

fn log_ansi(no_color: bool, stderr_is_terminal: bool) -> bool {
    !no_color && stderr_is_terminal
}

/// Logs go to stderr so rendered output on stdout stays clean.
/// `--no-color` strips ANSI from both.
pub fn init_tracing(verbose: u8, quiet: u8, no_color: bool) -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level(verbose, quiet)))
        .map_err(|e| anyhow!("invalid RUST_LOG / log filter: {e}"))?;

    let init_result = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .with_ansi(log_ansi(no_color, std::io::stderr().is_terminal()))
        .try_init();

    if let Err(err) = init_result {
        debug!(error = %err, "tracing subscriber already set, continuing");
    }

    Ok(())
}
