//! Run a set of scenarios, sequentially or with bounded parallelism.

use std::sync::Arc;
use std::time::Instant;

use covenant_domain::{Failure, Scenario, ScenarioReport, SuiteReport};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{error, info};

use super::run_scenario::ScenarioRunner;

/// Runs scenarios and aggregates their reports in declaration order.
pub struct SuiteRunner {
    runner: Arc<ScenarioRunner>,
    parallelism: usize,
}

impl SuiteRunner {
    /// Creates a sequential suite runner.
    #[must_use]
    pub const fn new(runner: Arc<ScenarioRunner>) -> Self {
        Self {
            runner,
            parallelism: 1,
        }
    }

    /// Runs up to `parallelism` scenarios at once. Values below 1 mean 1.
    #[must_use]
    pub fn with_parallelism(mut self, parallelism: usize) -> Self {
        self.parallelism = parallelism.max(1);
        self
    }

    /// Runs every scenario and returns the suite report.
    ///
    /// A failing scenario never stops the others.
    pub async fn run(&self, profile: &str, dataset: &str, scenarios: Vec<Scenario>) -> SuiteReport {
        let started = Instant::now();
        info!(
            scenarios = scenarios.len(),
            parallelism = self.parallelism,
            "Running suite"
        );

        let reports = if self.parallelism == 1 {
            self.run_sequential(&scenarios).await
        } else {
            self.run_parallel(scenarios).await
        };

        let duration_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        let report = SuiteReport::new(profile, dataset, reports, duration_ms);
        info!(
            total = report.total,
            passed = report.passed,
            failed = report.failed,
            duration_ms,
            "Suite finished"
        );
        report
    }

    async fn run_sequential(&self, scenarios: &[Scenario]) -> Vec<ScenarioReport> {
        let mut reports = Vec::with_capacity(scenarios.len());
        for scenario in scenarios {
            reports.push(self.runner.run(scenario).await);
        }
        reports
    }

    async fn run_parallel(&self, scenarios: Vec<Scenario>) -> Vec<ScenarioReport> {
        let semaphore = Arc::new(Semaphore::new(self.parallelism));
        let names: Vec<String> = scenarios.iter().map(|s| s.name.clone()).collect();
        let mut tasks = JoinSet::new();

        for (index, scenario) in scenarios.into_iter().enumerate() {
            let runner = Arc::clone(&self.runner);
            let semaphore = Arc::clone(&semaphore);
            tasks.spawn(async move {
                // The semaphore is never closed, so acquiring cannot fail.
                let _permit = semaphore.acquire_owned().await.ok();
                (index, runner.run(&scenario).await)
            });
        }

        let mut slots: Vec<Option<ScenarioReport>> = vec![None; names.len()];
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, report)) => {
                    if let Some(slot) = slots.get_mut(index) {
                        *slot = Some(report);
                    }
                }
                Err(e) => error!(error = %e, "Scenario task did not complete"),
            }
        }

        slots
            .into_iter()
            .zip(names)
            .map(|(slot, name)| {
                slot.unwrap_or_else(|| {
                    ScenarioReport::failed(
                        name,
                        Failure::new("Aborted", "scenario task did not complete"),
                        0,
                        0,
                    )
                })
            })
            .collect()
    }
}
