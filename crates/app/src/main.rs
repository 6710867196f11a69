//! Covenant - Main Entry Point
//!
//! Wires the file-backed configuration, fixture and suite adapters and the
//! reqwest transport into the harness core, runs the selected scenarios and
//! prints the report.
//!
//! Exit codes: 0 when every scenario passed, 1 when any failed, 2 when the
//! run could not start.

mod cli;
mod telemetry;

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use covenant_application::{
    ConfigError, ConfigResolver, FixtureStore, RequestBuilder, ResponseComparator, RunSelection,
    ScenarioRunner, SuiteRunner, TransportError, log_startup_banner, prepare_run,
};
use covenant_domain::SuiteReport;
use covenant_infrastructure::{
    FileConfigSource, FileFixtureSource, ReqwestTransport, SerializationError, SuiteLoadError,
    SuiteLoader, TokioFileSystem, render_text, to_json_stable,
};
use tracing::error;

use crate::cli::{Cli, ReportFormat};

/// Failures that prevent the suite from running or being reported.
#[derive(Debug, thiserror::Error)]
enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Suite(#[from] SuiteLoadError),

    #[error("cannot create HTTP client: {0}")]
    Transport(#[from] TransportError),

    #[error("cannot render report: {0}")]
    Output(#[from] SerializationError),
}

impl AppError {
    const fn exit_code(&self) -> u8 {
        match self {
            Self::Output(_) => 1,
            Self::Config(_) | Self::Suite(_) | Self::Transport(_) => 2,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    telemetry::init_tracing(&cli.log_level);

    match run(&cli).await {
        Ok(report) => {
            if report.all_passed() {
                ExitCode::SUCCESS
            } else {
                ExitCode::from(1)
            }
        }
        Err(e) => {
            error!(error = %e, "Run aborted");
            eprintln!("error: {e}");
            ExitCode::from(e.exit_code())
        }
    }
}

async fn run(cli: &Cli) -> Result<SuiteReport, AppError> {
    let source = FileConfigSource::new(&cli.config_dir).with_env_overrides(std::env::vars());
    let resolver = ConfigResolver::new(Arc::new(source));

    let suite = SuiteLoader::new(TokioFileSystem::new())
        .load(&cli.suite_path())
        .await?;
    let selection = RunSelection {
        profile: cli.profile.clone(),
        dataset: cli.dataset.clone(),
        tags: cli.tags.clone(),
    };
    let prepared = prepare_run(&resolver, &suite, &selection).await?;
    log_startup_banner(&prepared.config, &prepared.dataset);

    let fixtures = FileFixtureSource::for_dataset(&cli.config_dir, &prepared.dataset.name);
    let comparator = ResponseComparator::new(Arc::new(FixtureStore::new(Arc::new(fixtures))));
    let builder = RequestBuilder::new(Arc::clone(&prepared.config)).with_timeout_ms(cli.timeout_ms);
    let transport = Arc::new(ReqwestTransport::new()?);
    let runner = ScenarioRunner::new(builder, transport, comparator);

    let report = SuiteRunner::new(Arc::new(runner))
        .with_parallelism(cli.parallel)
        .run(
            &prepared.config.profile.name,
            &prepared.dataset.name,
            prepared.scenarios,
        )
        .await;

    let rendered = match cli.format {
        ReportFormat::Text => render_text(&report),
        ReportFormat::Json => to_json_stable(&report)?,
    };
    print!("{rendered}");
    Ok(report)
}
