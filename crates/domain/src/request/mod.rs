//! Request-side domain types

mod descriptor;
mod header;
mod method;

pub use descriptor::RequestDescriptor;
pub use header::{APPLICATION_JSON, Header, Headers};
pub use method::HttpMethod;
