//! File-backed implementations of the configuration, fixture and file
//! system ports, plus the suite file loader.

mod config_source;
mod file_system;
mod fixture_source;
mod suite_loader;

pub use config_source::{
    CONFIG_FILE, DATASET_FILE, ENV_PREFIX, FileConfigSource, env_name,
};
pub use file_system::TokioFileSystem;
pub use fixture_source::{FileFixtureSource, InMemoryFixtureSource};
pub use suite_loader::{SUITES_DIR, SuiteLoadError, SuiteLoader};
