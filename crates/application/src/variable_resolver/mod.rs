//! Dataset reference resolution
//!
//! Scenario declarations refer to dataset values with `{{key}}`; these are
//! substituted once, when the suite is compiled.

pub mod engine;
pub mod parser;

pub use engine::VariableResolver;
pub use parser::{VariableReference, extract_variable_names, has_variables, parse_variables};
