//! Harness build errors
//!
//! Every failure in the core is one of these kinds. They are reported
//! synchronously and halt processing of the harness file that raised them.

use miette::Diagnostic;
use thiserror::Error;

/// Errors raised while building, resolving, assembling or aggregating a harness
#[derive(Debug, Clone, PartialEq, Error, Diagnostic)]
pub enum HarnessError {
    /// A declared count disagrees with the number of explicit items
    #[error("{entity}: {message}")]
    #[diagnostic(
        code(harnessviz::schema),
        help("check that pincount/wirecount agree with the listed pins, labels and colors")
    )]
    Schema { entity: String, message: String },

    /// A connection or mate names a component, pin or wire that does not exist
    #[error("{reference} not found")]
    #[diagnostic(code(harnessviz::unresolved_reference))]
    UnresolvedReference { reference: String },

    /// The same pin (or wire end) is claimed twice
    #[error("{target} is claimed by both {first} and {second}")]
    #[diagnostic(
        code(harnessviz::conflict),
        help("a pin side can terminate only one wire, and a wire end only one pin")
    )]
    Conflict {
        target: String,
        first: String,
        second: String,
    },

    /// A structural impossibility in the harness description
    #[error("{0}")]
    #[diagnostic(code(harnessviz::configuration))]
    Configuration(String),

    /// Two BOM entries with the same identity but different units
    #[error("BOM entry '{item}' is listed with unit {first} and unit {second}")]
    #[diagnostic(code(harnessviz::unit_mismatch))]
    UnitMismatch {
        item: String,
        first: String,
        second: String,
    },

    /// A malformed connection set or connection
    #[error("{0}")]
    #[diagnostic(code(harnessviz::validation))]
    Validation(String),
}

impl HarnessError {
    pub fn schema(entity: impl Into<String>, message: impl Into<String>) -> Self {
        HarnessError::Schema {
            entity: entity.into(),
            message: message.into(),
        }
    }

    pub fn unresolved(reference: impl Into<String>) -> Self {
        HarnessError::UnresolvedReference {
            reference: reference.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        HarnessError::Configuration(message.into())
    }

    pub fn validation(message: impl Into<String>) -> Self {
        HarnessError::Validation(message.into())
    }

    /// Short name of the error kind, used in batch summaries
    pub fn kind(&self) -> &'static str {
        match self {
            HarnessError::Schema { .. } => "SchemaError",
            HarnessError::UnresolvedReference { .. } => "UnresolvedReferenceError",
            HarnessError::Conflict { .. } => "ConflictError",
            HarnessError::Configuration(_) => "ConfigurationError",
            HarnessError::UnitMismatch { .. } => "UnitMismatchError",
            HarnessError::Validation(_) => "ValidationError",
        }
    }
}

pub type Result<T, E = HarnessError> = std::result::Result<T, E>;
