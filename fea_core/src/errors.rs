//! # Error Types
//!
//! Structured error types for fea_core. Each variant carries enough context
//! for a caller (or a script driving the CLI) to understand which unit, point
//! or file was involved without parsing the message.
//!
//! Geometry resolution does not use these errors: a beam or shell that cannot
//! be built is reported through [`crate::geometry::NotResolvable`], which is a
//! normal, recoverable outcome.
//!
//! ## Example
//!
//! ```rust
//! use fea_core::errors::{FeaError, FeaResult};
//!
//! fn validate_thickness(thickness: f64) -> FeaResult<()> {
//!     if thickness < 0.0 {
//!         return Err(FeaError::invalid_input(
//!             "thickness",
//!             thickness.to_string(),
//!             "Thickness cannot be negative",
//!         ));
//!     }
//!     Ok(())
//! }
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for fea_core operations
pub type FeaResult<T> = Result<T, FeaError>;

/// Structured error type for model, unit and file operations.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "details")]
pub enum FeaError {
    /// One or both unit symbols are not in the unit table
    #[error("{}", unknown_unit_message(.symbols))]
    UnknownUnit { symbols: Vec<String> },

    /// The two units measure different physical quantities
    #[error("Cannot convert between different unit types: '{from}' is {from_quantity}, '{to}' is {to_quantity}")]
    IncompatibleUnits {
        from: String,
        to: String,
        from_quantity: String,
        to_quantity: String,
    },

    /// An input value is invalid (out of range, wrong type, etc.)
    #[error("Invalid input for '{field}': {value} - {reason}")]
    InvalidInput {
        field: String,
        value: String,
        reason: String,
    },

    /// A named model element does not exist
    #[error("{kind} not found: {name}")]
    NotFound { kind: String, name: String },

    /// A model element with this name already exists
    #[error("{kind} '{name}' already exists")]
    DuplicateName { kind: String, name: String },

    /// The element is still referenced and cannot be removed
    #[error("Cannot delete {kind} '{name}': used by {}", .users.join(", "))]
    InUse {
        kind: String,
        name: String,
        users: Vec<String>,
    },

    /// File I/O error
    #[error("File error: {operation} on '{path}' - {reason}")]
    FileError {
        operation: String,
        path: String,
        reason: String,
    },

    /// JSON serialization/deserialization error
    #[error("Serialization error: {reason}")]
    SerializationError { reason: String },

    /// Schema version mismatch
    #[error("Version mismatch: file version {file_version}, expected {expected_version}")]
    VersionMismatch {
        file_version: String,
        expected_version: String,
    },

    /// Generic internal error (should be rare)
    #[error("Internal error: {message}")]
    Internal { message: String },
}

fn unknown_unit_message(symbols: &[String]) -> String {
    match symbols {
        [one] => format!("Invalid unit: {}", one),
        [from, to] => format!("Invalid units: {} and {}", from, to),
        _ => format!("Invalid units: {}", symbols.join(", ")),
    }
}

impl FeaError {
    /// Create an UnknownUnit error for the given symbols
    pub fn unknown_unit<I, S>(symbols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        FeaError::UnknownUnit {
            symbols: symbols.into_iter().map(Into::into).collect(),
        }
    }

    /// Create an InvalidInput error
    pub fn invalid_input(field: impl Into<String>, value: impl Into<String>, reason: impl Into<String>) -> Self {
        FeaError::InvalidInput {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create a NotFound error
    pub fn not_found(kind: impl Into<String>, name: impl Into<String>) -> Self {
        FeaError::NotFound {
            kind: kind.into(),
            name: name.into(),
        }
    }

    /// Create a DuplicateName error
    pub fn duplicate_name(kind: impl Into<String>, name: impl Into<String>) -> Self {
        FeaError::DuplicateName {
            kind: kind.into(),
            name: name.into(),
        }
    }

    /// Create a FileError
    pub fn file_error(operation: impl Into<String>, path: impl Into<String>, reason: impl Into<String>) -> Self {
        FeaError::FileError {
            operation: operation.into(),
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a SerializationError
    pub fn serialization(reason: impl Into<String>) -> Self {
        FeaError::SerializationError {
            reason: reason.into(),
        }
    }

    /// Get a short error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            FeaError::UnknownUnit { .. } => "UNKNOWN_UNIT",
            FeaError::IncompatibleUnits { .. } => "INCOMPATIBLE_UNITS",
            FeaError::InvalidInput { .. } => "INVALID_INPUT",
            FeaError::NotFound { .. } => "NOT_FOUND",
            FeaError::DuplicateName { .. } => "DUPLICATE_NAME",
            FeaError::InUse { .. } => "IN_USE",
            FeaError::FileError { .. } => "FILE_ERROR",
            FeaError::SerializationError { .. } => "SERIALIZATION_ERROR",
            FeaError::VersionMismatch { .. } => "VERSION_MISMATCH",
            FeaError::Internal { .. } => "INTERNAL_ERROR",
        }
    }
}

impl From<serde_json::Error> for FeaError {
    fn from(e: serde_json::Error) -> Self {
        FeaError::serialization(e.to_string())
    }
}
