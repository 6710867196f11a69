//! Covenant Application - Use cases and ports
//!
//! This crate defines the harness core:
//! - Port traits for the transport, configuration and fixture collaborators
//! - Configuration resolution and request building
//! - The fixture-based response comparator
//! - Scenario and suite runners
//! - Application-level error handling

pub mod comparator;
pub mod config_resolver;
pub mod error;
pub mod fixture_store;
pub mod ports;
pub mod request_builder;
pub mod use_cases;
pub mod variable_resolver;

pub use comparator::{ExpectedDocument, ResponseComparator, evaluate};
pub use config_resolver::ConfigResolver;
pub use error::{ConfigError, JsonSide, ScenarioError};
pub use fixture_store::FixtureStore;
pub use ports::{
    ConfigSource, ConfigSourceError, FileSystem, FileSystemError, FixtureSource,
    FixtureSourceError, KeyTable, Transport, TransportError,
};
pub use request_builder::RequestBuilder;
pub use use_cases::{
    PreparedRun, RunSelection, ScenarioRunner, SuiteRunner, compile_suite, log_startup_banner,
    prepare_run, select_by_tags,
};
