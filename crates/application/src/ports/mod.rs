//! Port definitions (interfaces)
//!
//! Ports define the boundaries between the harness core and external systems.
//! Each port is a trait implemented by adapters in the infrastructure layer.

mod config_source;
mod file_system;
mod fixture_source;
mod transport;

pub use config_source::{ConfigSource, ConfigSourceError, KeyTable};
pub use file_system::{FileSystem, FileSystemError};
pub use fixture_source::{FixtureSource, FixtureSourceError};
pub use transport::{Transport, TransportError};
