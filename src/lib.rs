//! SCIM 2.0 attribute paths and filters for Rust.
//!
//! Parses RFC 7644 attribute paths and filter expressions, evaluates filters
//! against JSON resources, and reads and modifies resources by path.
//!
//! # Core Components
//!
//! - [`Path`] - Attribute path with optional schema URN and value filters
//! - [`Filter`] - Filter expression tree
//! - [`parser`] - Path and filter parsing with positioned errors
//! - [`FilterEvaluator`] - Filter matching against JSON documents
//! - [`accessor`] - Path-addressed get/replace/add/remove on JSON documents
//! - [`messages`] - PATCH, search, list, error and bulk messages
//! - [`resource::GenericScimResource`] - Typed access to a JSON resource
//!
//! # Quick Start
//!
//! ```rust
//! use scim_path::{Filter, FilterEvaluator, Path, accessor};
//! use serde_json::json;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut user = json!({
//!         "userName": "bjensen",
//!         "friends": [{"name": "Alice"}, {"name": "Bob"}]
//!     });
//!
//!     let names = accessor::get_values(&Path::parse("friends.name")?, &user)?;
//!     assert_eq!(names, vec![json!("Alice"), json!("Bob")]);
//!
//!     let filter = Filter::parse(r#"userName eq "BJENSEN" and friends[name sw "a"]"#)?;
//!     assert!(FilterEvaluator::default().evaluate(&filter, &user)?);
//!
//!     accessor::replace_value(&Path::parse("name.givenName")?, &mut user, json!("Barbara"))?;
//!     assert_eq!(user["name"]["givenName"], json!("Barbara"));
//!     Ok(())
//! }
//! ```
//!
//! The crate logs through the `log` facade; install any logger (for example
//! `env_logger`) to see parser and PATCH activity.

pub mod accessor;
pub mod comparator;
pub mod error;
pub mod evaluator;
pub mod filter;
pub mod messages;
pub mod parser;
pub mod path;
pub mod resource;

// Re-export commonly used types for convenience
pub use error::{ScimError, ScimResult};
pub use evaluator::FilterEvaluator;
pub use filter::{ComparisonOperator, Filter, FilterType};
pub use parser::{parse_filter, parse_path};
pub use path::{Element, Path, SchemaUrn, is_urn};

// Protocol messages
pub use messages::{
    BulkRequest, BulkResponse, ErrorResponse, ListResponse, PatchOperation, PatchRequest,
    SearchRequest,
};
pub use resource::GenericScimResource;
