//! Contract checking types: comparison modes, node paths, scenarios and reports.

mod mode;
mod outcome;
mod path;
mod report;
mod scenario;
mod tags;

pub use mode::{Check, ComparisonMode, ComparisonRequest};
pub use outcome::{ComparisonOutcome, Diff};
pub use path::{NodePath, PathSegment};
pub use report::{Failure, ScenarioReport, SuiteReport};
pub use scenario::{
    CheckSpec, Count, ExpectSpec, ModeSpec, Scenario, ScenarioSpec, ScenarioState, SuiteSpec,
};
pub use tags::TagExpression;
