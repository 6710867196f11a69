//! Response-side domain types

mod spec;

pub use spec::ResponseSpec;
