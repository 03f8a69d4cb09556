//! SCIM PATCH requests.
//!
//! This module implements RFC 7644 Section 3.5.2 (Modifying with PATCH) on top
//! of the path accessor:
//! - `add` adds attributes or values; without a path the value's attributes
//!   are merged into the resource
//! - `remove` removes attributes or the values selected by a value filter
//! - `replace` replaces attribute values, merging sub-attributes of complex
//!   attributes
//!
//! A [`PatchRequest`] is applied atomically: if any operation fails the
//! resource is left untouched.
//!
//! # Usage
//!
//! ```rust
//! use scim_path::messages::PatchRequest;
//! use serde_json::json;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut user = json!({
//!         "schemas": ["urn:ietf:params:scim:schemas:core:2.0:User"],
//!         "userName": "bjensen",
//!         "phoneNumbers": [{"type": "fax", "value": "555-1234"}]
//!     });
//!
//!     let request: PatchRequest = serde_json::from_value(json!({
//!         "schemas": ["urn:ietf:params:scim:api:messages:2.0:PatchOp"],
//!         "Operations": [
//!             {"op": "add", "path": "emails", "value": [{"value": "new@example.com", "type": "work"}]},
//!             {"op": "Replace", "path": "active", "value": false},
//!             {"op": "remove", "path": "phoneNumbers[type eq \"fax\"]"}
//!         ]
//!     }))?;
//!     request.apply(&mut user)?;
//!
//!     assert_eq!(user["emails"][0]["type"], json!("work"));
//!     assert_eq!(user["active"], json!(false));
//!     assert!(user.get("phoneNumbers").is_none());
//!     Ok(())
//! }
//! ```

use super::{PATCH_OP_SCHEMA, has_schema};
use crate::accessor;
use crate::error::{ScimError, ScimResult};
use crate::path::{Path, SCHEMAS_PATH, SchemaUrn, is_urn};
use log::debug;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// The kind of a PATCH operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PatchOpType {
    Add,
    Remove,
    Replace,
}

impl PatchOpType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Remove => "remove",
            Self::Replace => "replace",
        }
    }
}

impl fmt::Display for PatchOpType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PatchOpType {
    type Err = ScimError;

    /// Operation names are case-insensitive; some clients send `Add`.
    fn from_str(s: &str) -> ScimResult<Self> {
        match s.to_ascii_lowercase().as_str() {
            "add" => Ok(Self::Add),
            "remove" => Ok(Self::Remove),
            "replace" => Ok(Self::Replace),
            _ => Err(ScimError::invalid_syntax(format!(
                "Unsupported PATCH operation: {}",
                s
            ))),
        }
    }
}

impl<'de> Deserialize<'de> for PatchOpType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        value.parse().map_err(serde::de::Error::custom)
    }
}

/// A single PATCH operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatchOperation {
    pub op: PatchOpType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<Path>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}

impl PatchOperation {
    pub fn add(path: Option<Path>, value: Value) -> Self {
        Self {
            op: PatchOpType::Add,
            path,
            value: Some(value),
        }
    }

    pub fn remove(path: Path) -> Self {
        Self {
            op: PatchOpType::Remove,
            path: Some(path),
            value: None,
        }
    }

    pub fn replace(path: Option<Path>, value: Value) -> Self {
        Self {
            op: PatchOpType::Replace,
            path,
            value: Some(value),
        }
    }

    /// Apply this operation to a resource in place.
    ///
    /// A failed operation may leave the resource partly modified; use
    /// [`PatchRequest::apply`] for all-or-nothing semantics.
    ///
    /// # Arguments
    /// * `resource` - The resource JSON object to modify
    ///
    /// # Errors
    /// * [`ScimError::InvalidSyntax`] if `add`/`replace` has no value
    /// * [`ScimError::NoTarget`] if `remove` has no path, or a value filter
    ///   in the path matches nothing
    /// * [`ScimError::InvalidValue`] if the value does not fit the target
    pub fn apply(&self, resource: &mut Value) -> ScimResult<()> {
        debug!(
            "Applying PATCH {} at '{}'",
            self.op,
            self.path.as_ref().map(ToString::to_string).unwrap_or_default()
        );

        match self.op {
            PatchOpType::Add => {
                let value = self.required_value()?;
                match &self.path {
                    Some(path) => add_at(path, resource, value)?,
                    None => {
                        for (path, value) in attributes_of(value)? {
                            add_at(&path, resource, &value)?;
                        }
                    }
                }
                register_extensions(self.path.as_ref(), value, resource)
            }
            PatchOpType::Remove => {
                let path = self.path.as_ref().ok_or_else(|| {
                    ScimError::no_target("A remove operation requires a path")
                })?;
                accessor::remove_values(path, resource)?;
                Ok(())
            }
            PatchOpType::Replace => {
                let value = self.required_value()?;
                match &self.path {
                    Some(path) => accessor::replace_value(path, resource, value.clone())?,
                    None => {
                        for (path, value) in attributes_of(value)? {
                            accessor::replace_value(&path, resource, value)?;
                        }
                    }
                }
                register_extensions(self.path.as_ref(), value, resource)
            }
        }
    }

    fn required_value(&self) -> ScimResult<&Value> {
        self.value.as_ref().ok_or_else(|| {
            ScimError::invalid_syntax(format!("A {} operation requires a value", self.op))
        })
    }
}

/// A PATCH request: an ordered list of operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatchRequest {
    pub schemas: Vec<String>,
    #[serde(rename = "Operations")]
    pub operations: Vec<PatchOperation>,
}

impl PatchRequest {
    pub fn new(operations: Vec<PatchOperation>) -> Self {
        Self {
            schemas: vec![PATCH_OP_SCHEMA.to_string()],
            operations,
        }
    }

    /// Apply all operations in order. Either every operation succeeds or the
    /// resource is left unchanged.
    pub fn apply(&self, resource: &mut Value) -> ScimResult<()> {
        if !has_schema(&self.schemas, PATCH_OP_SCHEMA) {
            return Err(ScimError::invalid_syntax(format!(
                "PATCH request must declare schema '{}'",
                PATCH_OP_SCHEMA
            )));
        }
        if self.operations.is_empty() {
            return Err(ScimError::invalid_syntax(
                "PATCH request must contain at least one operation",
            ));
        }

        let mut patched = resource.clone();
        for operation in &self.operations {
            operation.apply(&mut patched)?;
        }
        *resource = patched;
        Ok(())
    }
}

/// `add` appends to multi-valued attributes and replaces anything else.
fn add_at(path: &Path, resource: &mut Value, value: &Value) -> ScimResult<()> {
    let filtered_leaf = path
        .last_element()
        .is_some_and(|element| element.value_filter().is_some());
    if path.is_root() || filtered_leaf {
        return accessor::replace_value(path, resource, value.clone());
    }

    let multi_valued = value.is_array()
        || accessor::get_values(path, resource)?
            .iter()
            .any(Value::is_array);
    if multi_valued {
        accessor::add_values(path, resource, value.clone())
    } else {
        accessor::replace_value(path, resource, value.clone())
    }
}

/// Splits a pathless operation's value into one path per attribute. A key
/// that is a schema URN addresses the extension object of that schema.
fn attributes_of(value: &Value) -> ScimResult<Vec<(Path, Value)>> {
    let Value::Object(fields) = value else {
        return Err(ScimError::invalid_value(
            "An operation without a path requires a JSON object value",
        ));
    };

    fields
        .iter()
        .map(|(key, value)| {
            let path = if is_urn(key) {
                Path::root_with_schema(key)?
            } else {
                Path::root().attribute(key)?
            };
            Ok((path, value.clone()))
        })
        .collect()
}

/// Adds the URNs of extension objects written by an operation to the
/// resource's `schemas`.
fn register_extensions(path: Option<&Path>, value: &Value, resource: &mut Value) -> ScimResult<()> {
    let mut urns: Vec<SchemaUrn> = Vec::new();
    match path {
        Some(path) => urns.extend(path.schema_urn().cloned()),
        None => {
            if let Value::Object(fields) = value {
                for key in fields.keys().filter(|key| is_urn(key)) {
                    urns.push(SchemaUrn::new(key.as_str())?);
                }
            }
        }
    }

    for urn in urns.iter().filter(|urn| !urn.is_core()) {
        let declared = accessor::get_values(&SCHEMAS_PATH, resource)?
            .iter()
            .flat_map(|schemas| schemas.as_array().cloned().unwrap_or_default())
            .any(|schema| schema.as_str().is_some_and(|s| urn.matches(s)));
        if !declared {
            accessor::add_values(&SCHEMAS_PATH, resource, Value::String(urn.to_string()))?;
        }
    }
    Ok(())
}
