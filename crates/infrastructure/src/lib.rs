//! Covenant Infrastructure - Adapters and implementations
//!
//! This crate provides concrete implementations of the ports defined in the
//! application layer: an HTTP transport over reqwest, a configuration source
//! reading `application.yml` and `.properties` datasets, fixture sources, a
//! suite file loader and report serialization.

pub mod adapters;
pub mod persistence;
pub mod serialization;

pub use adapters::ReqwestTransport;
pub use persistence::{
    FileConfigSource, FileFixtureSource, InMemoryFixtureSource, SuiteLoadError, SuiteLoader,
    TokioFileSystem,
};
pub use serialization::{SerializationError, render_text, to_json_stable};
