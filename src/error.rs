//! Error types for SCIM path, filter and patch operations.
//!
//! Every error produced by this crate is a client-input error in SCIM terms:
//! each variant maps to an RFC 7644 `scimType` keyword and an HTTP status so a
//! REST layer can turn it into an [`ErrorResponse`](crate::messages::ErrorResponse)
//! without inspecting messages.

/// Main error type for SCIM path, filter and document operations.
#[derive(Debug, thiserror::Error)]
pub enum ScimError {
    /// Malformed attribute path
    #[error("Invalid path: {message}")]
    InvalidPath {
        message: String,
        /// 0-based character offset where the problem was detected
        position: Option<usize>,
    },

    /// Malformed filter, or a filter that cannot be evaluated
    #[error("Invalid filter: {message}")]
    InvalidFilter {
        message: String,
        /// 0-based character offset where the problem was detected
        position: Option<usize>,
    },

    /// A value cannot be applied to the addressed attribute
    #[error("Invalid value: {message}")]
    InvalidValue { message: String },

    /// A value filter in a mutation path matched nothing
    #[error("No target: {message}")]
    NoTarget { message: String },

    /// A singular lookup resolved to more than one value
    #[error("Ambiguous path: {message}")]
    Ambiguous { message: String },

    /// Malformed request message
    #[error("Invalid syntax: {message}")]
    InvalidSyntax { message: String },

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

// Convenience methods for creating common errors
impl ScimError {
    /// Create an invalid path error without a position
    pub fn invalid_path(message: impl Into<String>) -> Self {
        Self::InvalidPath {
            message: message.into(),
            position: None,
        }
    }

    /// Create an invalid path error detected at `position`
    pub fn invalid_path_at(message: impl Into<String>, position: usize) -> Self {
        Self::InvalidPath {
            message: message.into(),
            position: Some(position),
        }
    }

    /// Create an invalid filter error without a position
    pub fn invalid_filter(message: impl Into<String>) -> Self {
        Self::InvalidFilter {
            message: message.into(),
            position: None,
        }
    }

    /// Create an invalid filter error detected at `position`
    pub fn invalid_filter_at(message: impl Into<String>, position: usize) -> Self {
        Self::InvalidFilter {
            message: message.into(),
            position: Some(position),
        }
    }

    /// Create an invalid value error
    pub fn invalid_value(message: impl Into<String>) -> Self {
        Self::InvalidValue {
            message: message.into(),
        }
    }

    /// Create a no target error
    pub fn no_target(message: impl Into<String>) -> Self {
        Self::NoTarget {
            message: message.into(),
        }
    }

    /// Create an ambiguous path error
    pub fn ambiguous(message: impl Into<String>) -> Self {
        Self::Ambiguous {
            message: message.into(),
        }
    }

    /// Create an invalid syntax error
    pub fn invalid_syntax(message: impl Into<String>) -> Self {
        Self::InvalidSyntax {
            message: message.into(),
        }
    }

    /// Character offset at which a parse error was detected, if known.
    pub fn position(&self) -> Option<usize> {
        match self {
            Self::InvalidPath { position, .. } | Self::InvalidFilter { position, .. } => *position,
            _ => None,
        }
    }

    /// The RFC 7644 `scimType` keyword for this error, if there is one.
    ///
    /// Ambiguous lookups are an application-level misuse rather than a
    /// protocol error and carry no `scimType`.
    pub fn scim_type(&self) -> Option<&'static str> {
        match self {
            Self::InvalidPath { .. } => Some("invalidPath"),
            Self::InvalidFilter { .. } => Some("invalidFilter"),
            Self::InvalidValue { .. } => Some("invalidValue"),
            Self::NoTarget { .. } => Some("noTarget"),
            Self::InvalidSyntax { .. } | Self::Json(_) => Some("invalidSyntax"),
            Self::Ambiguous { .. } => None,
        }
    }

    /// HTTP status code a REST layer should answer with.
    pub fn status(&self) -> u16 {
        match self {
            Self::Ambiguous { .. } => 500,
            _ => 400,
        }
    }
}

pub type ScimResult<T> = Result<T, ScimError>;
