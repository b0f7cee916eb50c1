//! CLI command implementations

pub mod bom;
pub mod build;
pub mod completions;
pub mod validate;
