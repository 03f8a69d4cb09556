//! Bulk operations (RFC 7644 Section 3.7).
//!
//! These are the request and response bodies only; executing a bulk request
//! against a store is left to the caller. A PATCH operation's `data` can be
//! read back as a [`PatchRequest`] with [`BulkOperation::patch_request`].

use super::{BULK_REQUEST_SCHEMA, BULK_RESPONSE_SCHEMA, ErrorResponse, PatchRequest};
use crate::error::{ScimError, ScimResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// HTTP method of a bulk operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum BulkMethod {
    Post,
    Put,
    Patch,
    Delete,
}

/// One operation of a bulk request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkOperation {
    pub method: BulkMethod,
    /// Client-chosen identifier, required for POST
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bulk_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Resource endpoint relative to the service base, e.g. `/Users/2819c223`
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl BulkOperation {
    /// Check the per-method requirements of RFC 7644 Section 3.7.
    pub fn validate(&self) -> ScimResult<()> {
        match self.method {
            BulkMethod::Post if self.bulk_id.is_none() => Err(ScimError::invalid_syntax(
                "A POST bulk operation requires a bulkId",
            )),
            BulkMethod::Post | BulkMethod::Put | BulkMethod::Patch if self.data.is_none() => {
                Err(ScimError::invalid_syntax(format!(
                    "A {:?} bulk operation on '{}' requires data",
                    self.method, self.path
                )))
            }
            _ => Ok(()),
        }
    }

    /// The `data` of a PATCH operation as a [`PatchRequest`].
    pub fn patch_request(&self) -> ScimResult<PatchRequest> {
        if self.method != BulkMethod::Patch {
            return Err(ScimError::invalid_syntax(format!(
                "Bulk operation on '{}' is not a PATCH",
                self.path
            )));
        }
        let data = self.data.clone().ok_or_else(|| {
            ScimError::invalid_syntax("A PATCH bulk operation requires data")
        })?;
        Ok(serde_json::from_value(data)?)
    }
}

/// A bulk request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkRequest {
    pub schemas: Vec<String>,
    /// Number of errors after which the service stops processing
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fail_on_errors: Option<usize>,
    #[serde(rename = "Operations")]
    pub operations: Vec<BulkOperation>,
}

impl BulkRequest {
    pub fn new(operations: Vec<BulkOperation>) -> Self {
        Self {
            schemas: vec![BULK_REQUEST_SCHEMA.to_string()],
            fail_on_errors: None,
            operations,
        }
    }

    pub fn with_fail_on_errors(mut self, fail_on_errors: usize) -> Self {
        self.fail_on_errors = Some(fail_on_errors);
        self
    }

    pub fn validate(&self) -> ScimResult<()> {
        if !super::has_schema(&self.schemas, BULK_REQUEST_SCHEMA) {
            return Err(ScimError::invalid_syntax(format!(
                "Bulk request must declare schema '{}'",
                BULK_REQUEST_SCHEMA
            )));
        }
        self.operations.iter().try_for_each(BulkOperation::validate)
    }
}

/// The outcome of one bulk operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkOperationResult {
    pub method: BulkMethod,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bulk_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// HTTP status code, serialized as a string
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<Value>,
}

impl BulkOperationResult {
    pub fn success(operation: &BulkOperation, status: u16, location: Option<String>) -> Self {
        Self {
            method: operation.method,
            bulk_id: operation.bulk_id.clone(),
            version: operation.version.clone(),
            location,
            status: status.to_string(),
            response: None,
        }
    }

    /// A failed operation, with the error body as its `response`.
    pub fn failure(operation: &BulkOperation, error: &ScimError) -> Self {
        let body = ErrorResponse::from(error);
        Self {
            method: operation.method,
            bulk_id: operation.bulk_id.clone(),
            version: operation.version.clone(),
            location: None,
            status: body.status.clone(),
            response: serde_json::to_value(body).ok(),
        }
    }
}

/// A bulk response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BulkResponse {
    pub schemas: Vec<String>,
    #[serde(rename = "Operations")]
    pub operations: Vec<BulkOperationResult>,
}

impl BulkResponse {
    pub fn new(operations: Vec<BulkOperationResult>) -> Self {
        Self {
            schemas: vec![BULK_RESPONSE_SCHEMA.to_string()],
            operations,
        }
    }
}
