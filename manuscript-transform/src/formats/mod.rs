//! Format implementations
//!
//! Each format converts between its own text representation and the manuscript tree.

pub mod jats;
pub mod json;

pub use jats::JatsFormat;
pub use json::JsonFormat;
