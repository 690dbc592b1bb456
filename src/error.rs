//! Error types for library API operations.
//!
//! Every failure surfaced by the handler is an [`ApiError`], which maps onto an
//! HTTP status code and a stable machine-readable code. Hydration problems with
//! request bodies are [`ValidationError`]s; configuration problems are
//! [`BuildError`]s.

use crate::storage::StorageError;

/// Main error type for library API operations.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Request body failed hydration
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Errors from the storage backend
    #[error("Storage error: {0}")]
    Storage(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// No row with this id behind the resource
    #[error("Resource not found: {resource} with ID {id}")]
    NotFound { resource: String, id: String },

    /// No resource registered under this name
    #[error("Unknown resource: {0}")]
    UnknownResource(String),

    /// The resource does not allow this method on this endpoint
    #[error("Method '{method}' not allowed on {resource} {endpoint} endpoint")]
    MethodNotAllowed {
        resource: String,
        method: String,
        endpoint: String,
    },

    /// Filter on a field the resource does not allow
    #[error("Invalid filter '{filter}': {reason}")]
    InvalidFilter { filter: String, reason: String },

    /// Malformed request parameters
    #[error("Bad request: {message}")]
    BadRequest { message: String },

    /// Missing or invalid credentials
    #[error("Unauthorized: {message}")]
    Unauthorized { message: String },

    /// Authenticated but lacking permission
    #[error("Forbidden: {message}")]
    Forbidden { message: String },

    /// Internal errors
    #[error("Internal error: {message}")]
    Internal { message: String },
}

/// Errors raised while hydrating a request body into a row.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    /// Body is not a JSON object
    #[error("Request body must be a JSON object")]
    NotAnObject,

    /// Required field absent on create
    #[error("Required field '{field}' is missing")]
    MissingRequiredField { field: String },

    /// Field value has the wrong JSON type
    #[error("Field '{field}' has invalid type, expected {expected}")]
    InvalidFieldType { field: String, expected: String },

    /// Related field value is not a URI, id or object with an id
    #[error("Field '{field}' has an unrecognized reference: {value}")]
    InvalidReference { field: String, value: String },

    /// Related field points at a row that does not exist
    #[error("Field '{field}' references missing {resource} {id}")]
    BrokenReference {
        field: String,
        resource: String,
        id: u64,
    },
}

/// Errors that can occur while building an API instance.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    /// Invalid configuration provided
    #[error("Invalid configuration: {message}")]
    InvalidConfiguration { message: String },

    /// Two resources registered under the same name
    #[error("Resource '{name}' registered twice")]
    DuplicateResource { name: String },
}

impl ApiError {
    /// Create a not found error
    pub fn not_found(resource: impl Into<String>, id: impl ToString) -> Self {
        Self::NotFound {
            resource: resource.into(),
            id: id.to_string(),
        }
    }

    /// Create an invalid filter error
    pub fn invalid_filter(filter: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidFilter {
            filter: filter.into(),
            reason: reason.into(),
        }
    }

    /// Create a bad request error
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
        }
    }

    /// Create an unauthorized error
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized {
            message: message.into(),
        }
    }

    /// Create a forbidden error
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden {
            message: message.into(),
        }
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Wrap a storage backend error
    pub fn storage<E>(error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Storage(Box::new(error))
    }

    /// HTTP status code for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::Validation(_)
            | ApiError::Json(_)
            | ApiError::InvalidFilter { .. }
            | ApiError::BadRequest { .. } => 400,
            ApiError::Unauthorized { .. } => 401,
            ApiError::Forbidden { .. } => 403,
            ApiError::NotFound { .. } | ApiError::UnknownResource(_) => 404,
            ApiError::MethodNotAllowed { .. } => 405,
            ApiError::Storage(_) | ApiError::Internal { .. } => 500,
        }
    }

    /// Stable machine-readable code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Validation(_) => "VALIDATION_ERROR",
            ApiError::Json(_) => "INVALID_JSON",
            ApiError::InvalidFilter { .. } => "INVALID_FILTER",
            ApiError::BadRequest { .. } => "BAD_REQUEST",
            ApiError::Unauthorized { .. } => "UNAUTHORIZED",
            ApiError::Forbidden { .. } => "FORBIDDEN",
            ApiError::NotFound { .. } => "RESOURCE_NOT_FOUND",
            ApiError::UnknownResource(_) => "UNKNOWN_RESOURCE",
            ApiError::MethodNotAllowed { .. } => "METHOD_NOT_ALLOWED",
            ApiError::Storage(_) => "STORAGE_ERROR",
            ApiError::Internal { .. } => "INTERNAL_ERROR",
        }
    }
}

impl From<StorageError> for ApiError {
    fn from(error: StorageError) -> Self {
        ApiError::storage(error)
    }
}

// Result type aliases for convenience
pub type ApiResult<T> = Result<T, ApiError>;
pub type ValidationResult<T> = Result<T, ValidationError>;
pub type BuildResult<T> = Result<T, BuildError>;
