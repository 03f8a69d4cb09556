//! Generic SCIM resources.
//!
//! [`GenericScimResource`] wraps the JSON object of any SCIM resource (User,
//! Group, or a custom type) and exposes path-addressed reads and writes plus
//! typed helpers for the SCIM attribute data types. No schema is consulted;
//! the typed getters check the JSON type of what they find.

use crate::accessor;
use crate::error::{ScimError, ScimResult};
use crate::evaluator::FilterEvaluator;
use crate::filter::Filter;
use crate::messages::PatchRequest;
use crate::path::{EXTERNAL_ID_PATH, ID_PATH, META_PATH, Path, SCHEMAS_PATH};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Anything that names an attribute path: a parsed [`Path`] or a path string.
pub trait ToPath {
    fn to_path(&self) -> ScimResult<Path>;
}

impl ToPath for Path {
    fn to_path(&self) -> ScimResult<Path> {
        Ok(self.clone())
    }
}

impl ToPath for &Path {
    fn to_path(&self) -> ScimResult<Path> {
        Ok((*self).clone())
    }
}

impl ToPath for &str {
    fn to_path(&self) -> ScimResult<Path> {
        Path::parse(self)
    }
}

impl ToPath for String {
    fn to_path(&self) -> ScimResult<Path> {
        Path::parse(self)
    }
}

/// A SCIM resource held as a JSON object.
///
/// # Example
/// ```rust
/// use scim_path::resource::GenericScimResource;
/// use serde_json::json;
///
/// fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let mut user = GenericScimResource::try_from(json!({
///         "schemas": ["urn:ietf:params:scim:schemas:core:2.0:User"],
///         "id": "2819c223-7f76-453a-919d-413861904646",
///         "userName": "bjensen",
///         "meta": {"lastModified": "2011-05-13T04:42:34Z"}
///     }))?;
///
///     assert_eq!(user.id(), Some("2819c223-7f76-453a-919d-413861904646"));
///     assert_eq!(user.get_string_value("userName")?, Some("bjensen".to_string()));
///     assert!(user.get_date_time_value("meta.lastModified")?.is_some());
///
///     user.add_values("emails", json!({"value": "bjensen@example.com"}))?;
///     assert!(user.matches(&"emails pr".parse()?)?);
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "Value")]
pub struct GenericScimResource {
    object: Value,
}

impl Default for GenericScimResource {
    fn default() -> Self {
        Self {
            object: Value::Object(Map::new()),
        }
    }
}

impl GenericScimResource {
    /// An empty resource.
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty resource declaring `schemas`.
    pub fn with_schemas<I, S>(schemas: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let schemas = schemas.into_iter().map(|s| Value::String(s.into())).collect();
        let mut object = Map::new();
        object.insert("schemas".to_string(), Value::Array(schemas));
        Self {
            object: Value::Object(object),
        }
    }

    /// The underlying JSON object.
    pub fn as_value(&self) -> &Value {
        &self.object
    }

    pub fn into_value(self) -> Value {
        self.object
    }

    /// All values addressed by `path`.
    pub fn get_values(&self, path: impl ToPath) -> ScimResult<Vec<Value>> {
        accessor::get_values(&path.to_path()?, &self.object)
    }

    /// The single value addressed by `path`.
    pub fn get_value(&self, path: impl ToPath) -> ScimResult<Option<Value>> {
        accessor::get_value(&path.to_path()?, &self.object)
    }

    pub fn replace_value(&mut self, path: impl ToPath, value: impl Into<Value>) -> ScimResult<()> {
        accessor::replace_value(&path.to_path()?, &mut self.object, value.into())
    }

    pub fn add_values(&mut self, path: impl ToPath, values: impl Into<Value>) -> ScimResult<()> {
        accessor::add_values(&path.to_path()?, &mut self.object, values.into())
    }

    pub fn remove_values(&mut self, path: impl ToPath) -> ScimResult<Vec<Value>> {
        accessor::remove_values(&path.to_path()?, &mut self.object)
    }

    pub fn get_string_value(&self, path: impl ToPath) -> ScimResult<Option<String>> {
        let path = path.to_path()?;
        self.typed_value(&path, "string", |v| v.as_str().map(str::to_string))
    }

    /// Every string value at `path`, with multi-valued attributes flattened.
    pub fn get_string_values(&self, path: impl ToPath) -> ScimResult<Vec<String>> {
        let path = path.to_path()?;
        flatten(accessor::get_values(&path, &self.object)?)
            .into_iter()
            .map(|value| match value {
                Value::String(s) => Ok(s),
                other => Err(type_mismatch(&path, "string", &other)),
            })
            .collect()
    }

    pub fn get_boolean_value(&self, path: impl ToPath) -> ScimResult<Option<bool>> {
        let path = path.to_path()?;
        self.typed_value(&path, "boolean", Value::as_bool)
    }

    pub fn get_integer_value(&self, path: impl ToPath) -> ScimResult<Option<i64>> {
        let path = path.to_path()?;
        self.typed_value(&path, "integer", Value::as_i64)
    }

    pub fn get_decimal_value(&self, path: impl ToPath) -> ScimResult<Option<f64>> {
        let path = path.to_path()?;
        self.typed_value(&path, "decimal", Value::as_f64)
    }

    /// An RFC 3339 `dateTime` value, normalized to UTC.
    pub fn get_date_time_value(&self, path: impl ToPath) -> ScimResult<Option<DateTime<Utc>>> {
        let path = path.to_path()?;
        let Some(text) = self.get_string_value(&path)? else {
            return Ok(None);
        };
        DateTime::parse_from_rfc3339(&text)
            .map(|dt| Some(dt.with_timezone(&Utc)))
            .map_err(|e| {
                ScimError::invalid_value(format!(
                    "Attribute '{}' is not a valid dateTime '{}': {}",
                    path, text, e
                ))
            })
    }

    pub fn replace_date_time_value(&mut self, path: impl ToPath, value: DateTime<Utc>) -> ScimResult<()> {
        self.replace_value(path, value.to_rfc3339_opts(SecondsFormat::AutoSi, true))
    }

    /// A base64-encoded `binary` value, decoded.
    pub fn get_binary_value(&self, path: impl ToPath) -> ScimResult<Option<Vec<u8>>> {
        let path = path.to_path()?;
        let Some(text) = self.get_string_value(&path)? else {
            return Ok(None);
        };
        STANDARD.decode(text.as_bytes()).map(Some).map_err(|e| {
            ScimError::invalid_value(format!("Attribute '{}' is not valid base64: {}", path, e))
        })
    }

    pub fn replace_binary_value(&mut self, path: impl ToPath, bytes: &[u8]) -> ScimResult<()> {
        self.replace_value(path, STANDARD.encode(bytes))
    }

    pub fn id(&self) -> Option<&str> {
        self.top_level(&ID_PATH).and_then(Value::as_str)
    }

    pub fn set_id(&mut self, id: impl Into<String>) -> ScimResult<()> {
        self.replace_value(&*ID_PATH, id.into())
    }

    pub fn external_id(&self) -> Option<&str> {
        self.top_level(&EXTERNAL_ID_PATH).and_then(Value::as_str)
    }

    pub fn set_external_id(&mut self, external_id: impl Into<String>) -> ScimResult<()> {
        self.replace_value(&*EXTERNAL_ID_PATH, external_id.into())
    }

    /// The declared schema URNs.
    pub fn schemas(&self) -> Vec<String> {
        self.top_level(&SCHEMAS_PATH)
            .and_then(Value::as_array)
            .map(|schemas| {
                schemas
                    .iter()
                    .filter_map(|s| s.as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn meta(&self) -> Option<&Value> {
        self.top_level(&META_PATH)
    }

    /// Whether this resource matches `filter`.
    pub fn matches(&self, filter: &Filter) -> ScimResult<bool> {
        FilterEvaluator::default().evaluate(filter, &self.object)
    }

    /// Apply a PATCH request; on error the resource is unchanged.
    pub fn apply_patch(&mut self, request: &PatchRequest) -> ScimResult<()> {
        request.apply(&mut self.object)
    }

    fn top_level(&self, path: &Path) -> Option<&Value> {
        let name = path.element(0)?.attribute();
        crate::accessor::lookup(self.object.as_object()?, name)
    }

    fn typed_value<T>(
        &self,
        path: &Path,
        expected: &str,
        convert: impl Fn(&Value) -> Option<T>,
    ) -> ScimResult<Option<T>> {
        let Some(value) = accessor::get_value(path, &self.object)? else {
            return Ok(None);
        };
        convert(&value)
            .map(Some)
            .ok_or_else(|| type_mismatch(path, expected, &value))
    }
}

impl TryFrom<Value> for GenericScimResource {
    type Error = ScimError;

    fn try_from(value: Value) -> ScimResult<Self> {
        if !value.is_object() {
            return Err(ScimError::invalid_value(format!(
                "A SCIM resource must be a JSON object, not {}",
                value_type(&value)
            )));
        }
        Ok(Self { object: value })
    }
}

impl From<GenericScimResource> for Value {
    fn from(resource: GenericScimResource) -> Self {
        resource.object
    }
}

fn flatten(values: Vec<Value>) -> Vec<Value> {
    values
        .into_iter()
        .flat_map(|value| match value {
            Value::Array(items) => items,
            other => vec![other],
        })
        .collect()
}

fn type_mismatch(path: &Path, expected: &str, found: &Value) -> ScimError {
    ScimError::invalid_value(format!(
        "Attribute '{}' should be {} but is {}",
        path,
        expected,
        value_type(found)
    ))
}

/// JSON type name used in error messages.
fn value_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_i64() || n.is_u64() => "integer",
        Value::Number(_) => "decimal",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
