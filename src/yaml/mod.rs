//! Harness file loading
//!
//! Reads YAML files into untyped documents for the pipeline. Syntax errors
//! carry the source text so miette can point at the line.

pub mod diagnostics;

use serde_yml::Value;
use std::path::Path;

pub use diagnostics::{YamlError, YamlSyntaxError};

/// Parse harness text; `filename` is only used in diagnostics
pub fn parse_document(source: &str, filename: &str) -> Result<Value, YamlError> {
    serde_yml::from_str(source)
        .map_err(|e| YamlSyntaxError::from_serde_error(&e, source, filename).into())
}

/// Read and parse a harness file
pub fn load_document(path: &Path) -> Result<Value, YamlError> {
    let source = std::fs::read_to_string(path).map_err(|source| YamlError::Io {
        path: path.display().to_string(),
        source,
    })?;
    log::debug!("loaded {} ({} bytes)", path.display(), source.len());
    parse_document(&source, &path.display().to_string())
}

/// Harness name used in reports and the multiplier table: the file stem
pub fn harness_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
