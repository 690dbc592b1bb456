//! Storage-specific error types for pure row operations.
//!
//! These errors describe persistence failures only. Missing rows are not errors:
//! `get` returns `None`.

use std::fmt;

/// Errors that can occur during storage operations.
#[derive(Debug)]
pub enum StorageError {
    /// Row data that cannot be stored (not an object, id mismatch, ...).
    InvalidData { message: String, cause: String },

    /// A stored row could not be decoded into its typed form.
    Serialization { message: String, table: String },
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::InvalidData { message, cause } => {
                write!(f, "Invalid data: {} (cause: {})", message, cause)
            }
            StorageError::Serialization { message, table } => {
                write!(f, "Serialization error: {} (table: {})", message, table)
            }
        }
    }
}

impl std::error::Error for StorageError {}

impl StorageError {
    /// Create a new InvalidData error.
    pub fn invalid_data(message: impl Into<String>, cause: impl Into<String>) -> Self {
        Self::InvalidData {
            message: message.into(),
            cause: cause.into(),
        }
    }

    /// Create a new Serialization error for a table.
    pub fn serialization(table: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Serialization {
            message: message.into(),
            table: table.into(),
        }
    }
}
