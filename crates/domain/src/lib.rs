//! Covenant Domain - Core contract-testing types
//!
//! This crate defines the domain model for the Covenant API contract harness:
//! profiles, endpoints, datasets, fixtures, comparison modes and scenarios.
//! All types here are pure Rust with no I/O dependencies.

pub mod dataset;
pub mod endpoint;
pub mod error;
pub mod fixture;
pub mod profile;
pub mod request;
pub mod response;
pub mod testing;

pub use dataset::{Dataset, coerce};
pub use endpoint::{EndpointSpec, PathTemplate, TemplateSegment};
pub use error::{DomainError, DomainResult};
pub use fixture::{Expectation, Fixture};
pub use profile::{DEFAULT_PROFILE, Profile, ResolvedConfig};
pub use request::{APPLICATION_JSON, Header, Headers, HttpMethod, RequestDescriptor};
pub use response::ResponseSpec;
pub use testing::{
    Check, CheckSpec, ComparisonMode, ComparisonOutcome, ComparisonRequest, Count, Diff,
    ExpectSpec, Failure, ModeSpec, NodePath, PathSegment, Scenario, ScenarioReport, ScenarioSpec,
    ScenarioState, SuiteReport, SuiteSpec, TagExpression,
};
