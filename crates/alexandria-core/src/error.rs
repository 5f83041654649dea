//! Error types for Alexandria.
//!
//! [`ServiceError`] is the standard error taxonomy used throughout the
//! application:
//!
//! | Variant | Recovery |
//! |---|---|
//! | `Validation` | recovered locally; degrades to "not found" or a redirect |
//! | `NotFound` | surfaced as a 404 with a human-readable message |
//! | `Domain` | surfaced as a message in the rendered page, not an HTTP error |
//! | `Unsupported` | default 405 for mutating requests no hook handles |
//! | `Render` / `Internal` | unhandled faults, surfaced by the hosting layer as 500 |
//!
//! No operation is retried automatically; failures are terminal for the
//! current request and never crash the serving process.

use http::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias using [`ServiceError`].
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Categories of errors for classification and handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Malformed or missing request input.
    Validation,
    /// Resource not found.
    NotFound,
    /// Domain rule rejected the operation (e.g. document already on loan).
    Domain,
    /// The request method is not supported by the service.
    Unsupported,
    /// Fragment rendering failed.
    Render,
    /// Internal server errors.
    Internal,
}

impl ErrorCategory {
    /// Returns the default HTTP status code for this error category.
    #[must_use]
    pub const fn default_status_code(&self) -> StatusCode {
        match self {
            Self::Validation => StatusCode::BAD_REQUEST,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Domain => StatusCode::CONFLICT,
            Self::Unsupported => StatusCode::METHOD_NOT_ALLOWED,
            Self::Render | Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Standard error type for Alexandria.
///
/// # Example
///
/// ```
/// use alexandria_core::ServiceError;
///
/// fn parse_id(raw: &str) -> Result<u64, ServiceError> {
///     raw.parse()
///         .map_err(|_| ServiceError::validation(format!("'{raw}' is not a document id")))
/// }
/// ```
#[derive(Error, Debug)]
pub enum ServiceError {
    /// Request input was malformed or missing.
    #[error("Validation error: {message}")]
    Validation {
        /// Human-readable error message.
        message: String,
    },

    /// Resource not found.
    #[error("Not found: {message}")]
    NotFound {
        /// Human-readable error message.
        message: String,
    },

    /// A domain rule rejected the operation.
    #[error("{message}")]
    Domain {
        /// User-visible message, shown in the rendered page.
        message: String,
    },

    /// The request method is not supported.
    #[error("Method not supported: {message}")]
    Unsupported {
        /// Human-readable error message.
        message: String,
    },

    /// Fragment rendering failed.
    #[error("Render error: {message}")]
    Render {
        /// Human-readable error message.
        message: String,
    },

    /// Internal server error.
    #[error("Internal error: {message}")]
    Internal {
        /// Human-readable error message.
        message: String,
        /// The underlying error (not exposed to clients).
        #[source]
        source: Option<anyhow::Error>,
    },
}

impl ServiceError {
    /// Creates a validation error.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Creates a not found error.
    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// Creates a domain error.
    #[must_use]
    pub fn domain(message: impl Into<String>) -> Self {
        Self::Domain {
            message: message.into(),
        }
    }

    /// Creates an unsupported-method error.
    #[must_use]
    pub fn unsupported(message: impl Into<String>) -> Self {
        Self::Unsupported {
            message: message.into(),
        }
    }

    /// Creates a render error.
    #[must_use]
    pub fn render(message: impl Into<String>) -> Self {
        Self::Render {
            message: message.into(),
        }
    }

    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
            source: None,
        }
    }

    /// Creates an internal error with a source error.
    pub fn internal_with_source(
        message: impl Into<String>,
        source: impl Into<anyhow::Error>,
    ) -> Self {
        Self::Internal {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Returns the error category.
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::Validation { .. } => ErrorCategory::Validation,
            Self::NotFound { .. } => ErrorCategory::NotFound,
            Self::Domain { .. } => ErrorCategory::Domain,
            Self::Unsupported { .. } => ErrorCategory::Unsupported,
            Self::Render { .. } => ErrorCategory::Render,
            Self::Internal { .. } => ErrorCategory::Internal,
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        self.category().default_status_code()
    }
}
