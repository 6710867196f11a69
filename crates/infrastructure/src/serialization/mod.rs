//! Report output: deterministic JSON and a plain-text summary.

mod json;
mod text;

pub use json::{SerializationError, to_json_stable};
pub use text::render_text;
