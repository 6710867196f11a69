//! Command-line arguments.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use covenant_domain::RequestDescriptor;

/// Run contract scenarios against a remote JSON API.
#[derive(Debug, Parser)]
#[command(name = "covenant", version, about)]
pub struct Cli {
    /// Directory holding application.yml, data/ and suites/.
    #[arg(long, env = "COVENANT_CONFIG_DIR", default_value = "harness")]
    pub config_dir: PathBuf,

    /// Profile to run against (defaults to `default_profile`, then the first declared).
    #[arg(long, short = 'p', env = "COVENANT_PROFILE")]
    pub profile: Option<String>,

    /// Dataset to use (defaults to `default_dataset`, then the profile name).
    #[arg(long, short = 'd', env = "COVENANT_DATASET")]
    pub dataset: Option<String>,

    /// Suite file or directory (defaults to `<config-dir>/suites`).
    #[arg(long, short = 's')]
    pub suite: Option<PathBuf>,

    /// Tag expression, e.g. `@functional and not @slow`.
    #[arg(long, short = 't')]
    pub tags: Option<String>,

    /// Number of scenarios to run concurrently.
    #[arg(long, default_value_t = 1)]
    pub parallel: usize,

    /// Per-request timeout in milliseconds.
    #[arg(long, env = "COVENANT_TIMEOUT_MS", default_value_t = RequestDescriptor::DEFAULT_TIMEOUT_MS)]
    pub timeout_ms: u64,

    /// Report format written to stdout.
    #[arg(long, value_enum, default_value_t = ReportFormat::Text)]
    pub format: ReportFormat,

    /// Default log level when `RUST_LOG` is not set.
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

impl Cli {
    /// Suite location after applying the default.
    #[must_use]
    pub fn suite_path(&self) -> PathBuf {
        self.suite
            .clone()
            .unwrap_or_else(|| self.config_dir.join(covenant_infrastructure::persistence::SUITES_DIR))
    }
}

/// How the suite report is printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    /// Human-readable summary.
    Text,
    /// The full report as JSON.
    Json,
}
