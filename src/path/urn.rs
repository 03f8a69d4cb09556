//! Schema URN value object.
//!
//! A schema URN qualifies an attribute path with the schema that defines the
//! attribute (`urn:ietf:params:scim:schemas:core:2.0:User:userName`). URNs are
//! case-insensitive identifiers, so equality and hashing ignore case while the
//! original spelling is kept for display.

use crate::error::{ScimError, ScimResult};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::hash::{Hash, Hasher};

const URN_PREFIX: &str = "urn:";
const CORE_SCHEMA_PREFIX: &str = "urn:ietf:params:scim:schemas:core:";

/// Whether `value` looks like a URN: starts with `urn:` (any case) and has
/// something after the prefix.
pub fn is_urn(value: &str) -> bool {
    value.len() > URN_PREFIX.len()
        && value
            .get(..URN_PREFIX.len())
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case(URN_PREFIX))
}

/// A validated, case-insensitive schema URN.
///
/// ## Examples
///
/// ```rust
/// use scim_path::path::SchemaUrn;
///
/// fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let core = SchemaUrn::new("urn:ietf:params:scim:schemas:core:2.0:User")?;
///     let shouting = SchemaUrn::new("URN:IETF:PARAMS:SCIM:SCHEMAS:CORE:2.0:USER")?;
///     assert_eq!(core, shouting);
///     assert!(core.is_core());
///
///     assert!(SchemaUrn::new("http://example.com").is_err());
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct SchemaUrn(String);

impl SchemaUrn {
    /// Create a new SchemaUrn, rejecting anything that is not a URN.
    pub fn new(value: impl Into<String>) -> ScimResult<Self> {
        let value = value.into();
        if !is_urn(&value) {
            return Err(ScimError::invalid_path(format!(
                "Invalid schema URN '{}'",
                value
            )));
        }
        Ok(Self(value))
    }

    /// Get the string representation with its original casing.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Get the owned string value.
    pub fn into_string(self) -> String {
        self.0
    }

    /// Whether this URN names one of the RFC 7643 core schemas, whose
    /// attributes live at the top level of a resource rather than inside an
    /// extension object.
    pub fn is_core(&self) -> bool {
        self.0
            .get(..CORE_SCHEMA_PREFIX.len())
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case(CORE_SCHEMA_PREFIX))
    }

    /// Case-insensitive comparison against a raw string such as an object key.
    pub fn matches(&self, other: &str) -> bool {
        self.0.eq_ignore_ascii_case(other)
    }
}

impl PartialEq for SchemaUrn {
    fn eq(&self, other: &Self) -> bool {
        self.0.eq_ignore_ascii_case(&other.0)
    }
}

impl Eq for SchemaUrn {}

impl Hash for SchemaUrn {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.to_ascii_lowercase().hash(state);
    }
}

impl fmt::Display for SchemaUrn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for SchemaUrn {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for SchemaUrn {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        Self::new(value).map_err(serde::de::Error::custom)
    }
}

impl TryFrom<&str> for SchemaUrn {
    type Error = ScimError;

    fn try_from(value: &str) -> ScimResult<Self> {
        Self::new(value)
    }
}
