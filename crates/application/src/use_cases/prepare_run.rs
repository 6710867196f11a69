//! Startup: everything that must succeed before the first request.

use std::sync::Arc;

use covenant_domain::{Dataset, ResolvedConfig, Scenario, SuiteSpec, TagExpression};
use tracing::info;

use super::compile_suite::{compile_suite, select_by_tags};
use crate::config_resolver::ConfigResolver;
use crate::error::ConfigError;

/// What the caller asked to run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSelection {
    /// Profile name; falls back to the source default.
    pub profile: Option<String>,
    /// Dataset name; falls back to the source default, then the profile name.
    pub dataset: Option<String>,
    /// Tag expression; all scenarios when absent.
    pub tags: Option<String>,
}

/// A validated run, ready to execute.
#[derive(Debug, Clone)]
pub struct PreparedRun {
    /// Resolved profile configuration.
    pub config: Arc<ResolvedConfig>,
    /// Selected dataset.
    pub dataset: Arc<Dataset>,
    /// Scenarios selected by the tag filter, in declaration order.
    pub scenarios: Vec<Scenario>,
}

/// Resolves profile and dataset, compiles the suite and checks that every
/// endpoint it uses is configured.
///
/// # Errors
///
/// Any `ConfigError`; the run must not start.
pub async fn prepare_run(
    resolver: &ConfigResolver,
    suite: &SuiteSpec,
    selection: &RunSelection,
) -> Result<PreparedRun, ConfigError> {
    let filter = selection
        .tags
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(TagExpression::parse)
        .transpose()?;

    let profile = resolver.select_profile(selection.profile.as_deref()).await?;
    let config = resolver.resolve(&profile).await?;
    let dataset_name = resolver
        .select_dataset(selection.dataset.as_deref(), &profile)
        .await?;
    let dataset = resolver.dataset(&dataset_name).await?;

    let compiled = compile_suite(suite, &dataset)?;
    ConfigResolver::require_endpoints(&config, &compiled)?;
    let scenarios = select_by_tags(compiled, filter.as_ref());

    Ok(PreparedRun {
        config: Arc::new(config),
        dataset,
        scenarios,
    })
}

/// Logs the selected environment. Called once by the entry point before
/// any scenario runs.
pub fn log_startup_banner(config: &ResolvedConfig, dataset: &Dataset) {
    info!("baseUri is {}", config.base_uri);
    info!(
        profile = %config.profile.name,
        dataset = %dataset.name,
        endpoints = config.endpoints.len(),
        "Harness configured"
    );
}
