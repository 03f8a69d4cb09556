//! Error bodies (RFC 7644 Section 3.12).

use super::ERROR_SCHEMA;
use crate::error::ScimError;
use serde::{Deserialize, Serialize};

/// A SCIM error response body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub schemas: Vec<String>,
    /// HTTP status code, serialized as a string
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scim_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl ErrorResponse {
    pub fn new(status: u16, scim_type: Option<&str>, detail: impl Into<String>) -> Self {
        Self {
            schemas: vec![ERROR_SCHEMA.to_string()],
            status: status.to_string(),
            scim_type: scim_type.map(str::to_string),
            detail: Some(detail.into()),
        }
    }

    /// The status as a number, if it parses.
    pub fn status_code(&self) -> Option<u16> {
        self.status.parse().ok()
    }
}

impl From<&ScimError> for ErrorResponse {
    fn from(error: &ScimError) -> Self {
        Self::new(error.status(), error.scim_type(), error.to_string())
    }
}

impl From<ScimError> for ErrorResponse {
    fn from(error: ScimError) -> Self {
        Self::from(&error)
    }
}
