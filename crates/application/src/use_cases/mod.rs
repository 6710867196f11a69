//! Use cases
//!
//! Startup preparation, suite compilation and the scenario/suite runners.

mod compile_suite;
mod prepare_run;
mod run_scenario;
mod run_suite;

pub use compile_suite::{compile_suite, select_by_tags};
pub use prepare_run::{PreparedRun, RunSelection, log_startup_banner, prepare_run};
pub use run_scenario::ScenarioRunner;
pub use run_suite::SuiteRunner;
