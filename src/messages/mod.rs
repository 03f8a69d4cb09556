//! RFC 7644 protocol messages built on the path and filter engine.
//!
//! Each message carries its `urn:ietf:params:scim:api:messages:2.0:*` URN in
//! `schemas` and serializes with the attribute names RFC 7644 uses.
//!
//! - [`PatchRequest`] / [`PatchOperation`]: PATCH (Section 3.5.2), applied to
//!   a JSON resource with the path accessor
//! - [`SearchRequest`]: filtering, sorting and paging (Section 3.4.3), with an
//!   in-memory [`SearchRequest::apply`]
//! - [`ListResponse`]: query results (Section 3.4.2)
//! - [`ErrorResponse`]: error bodies (Section 3.12)
//! - [`BulkRequest`] / [`BulkResponse`]: bulk operations (Section 3.7)

pub mod bulk;
pub mod error_response;
pub mod list_response;
pub mod patch;
pub mod search_request;

pub use bulk::{BulkMethod, BulkOperation, BulkOperationResult, BulkRequest, BulkResponse};
pub use error_response::ErrorResponse;
pub use list_response::ListResponse;
pub use patch::{PatchOpType, PatchOperation, PatchRequest};
pub use search_request::{SearchRequest, SortOrder};

pub const PATCH_OP_SCHEMA: &str = "urn:ietf:params:scim:api:messages:2.0:PatchOp";
pub const LIST_RESPONSE_SCHEMA: &str = "urn:ietf:params:scim:api:messages:2.0:ListResponse";
pub const SEARCH_REQUEST_SCHEMA: &str = "urn:ietf:params:scim:api:messages:2.0:SearchRequest";
pub const ERROR_SCHEMA: &str = "urn:ietf:params:scim:api:messages:2.0:Error";
pub const BULK_REQUEST_SCHEMA: &str = "urn:ietf:params:scim:api:messages:2.0:BulkRequest";
pub const BULK_RESPONSE_SCHEMA: &str = "urn:ietf:params:scim:api:messages:2.0:BulkResponse";

/// Whether `schemas` names the message URN `expected` (case-insensitive).
pub(crate) fn has_schema(schemas: &[String], expected: &str) -> bool {
    schemas.iter().any(|schema| schema.eq_ignore_ascii_case(expected))
}
