//! SCIM attribute paths.
//!
//! A [`Path`] addresses an attribute inside a SCIM resource: an optional schema
//! URN followed by attribute names, each of which may carry a value filter that
//! selects among the values of a multi-valued attribute.
//!
//! ```rust
//! use scim_path::Path;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let path: Path = r#"emails[type eq "work"].value"#.parse()?;
//!     assert_eq!(path.size(), 2);
//!     assert_eq!(path.element(0).unwrap().attribute(), "emails");
//!     assert!(path.element(0).unwrap().value_filter().is_some());
//!
//!     let built = Path::root().attribute("name")?.attribute("givenName")?;
//!     assert_eq!(built, "NAME.GIVENNAME".parse::<Path>()?);
//!     Ok(())
//! }
//! ```
//!
//! Paths are immutable: every builder method returns a new value, so paths can
//! be shared freely and used as map keys. Attribute names and schema URNs
//! compare case-insensitively but keep their original spelling for display.

mod urn;

pub use urn::{SchemaUrn, is_urn};

use crate::error::{ScimError, ScimResult};
use crate::filter::Filter;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use std::sync::LazyLock;

/// The `schemas` attribute present on every resource.
pub static SCHEMAS_PATH: LazyLock<Path> = LazyLock::new(|| Path::root().child("schemas"));

/// The `id` attribute.
pub static ID_PATH: LazyLock<Path> = LazyLock::new(|| Path::root().child("id"));

/// The `externalId` attribute.
pub static EXTERNAL_ID_PATH: LazyLock<Path> = LazyLock::new(|| Path::root().child("externalId"));

/// The `meta` attribute.
pub static META_PATH: LazyLock<Path> = LazyLock::new(|| Path::root().child("meta"));

/// Whether `name` is a legal attribute name: non-empty and made of ASCII
/// letters, digits, `-`, `_` and `$`.
pub fn is_valid_attribute_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '$')
}

/// One segment of a path: an attribute name and an optional value filter.
#[derive(Debug, Clone)]
pub struct Element {
    attribute: String,
    value_filter: Option<Filter>,
}

impl Element {
    fn new(attribute: &str, value_filter: Option<Filter>) -> ScimResult<Self> {
        if !is_valid_attribute_name(attribute) {
            return Err(ScimError::invalid_path(format!(
                "Invalid attribute name '{}'",
                attribute
            )));
        }
        Ok(Self {
            attribute: attribute.to_string(),
            value_filter,
        })
    }

    /// The attribute name as written.
    pub fn attribute(&self) -> &str {
        &self.attribute
    }

    /// The value filter, if any.
    pub fn value_filter(&self) -> Option<&Filter> {
        self.value_filter.as_ref()
    }

    /// Case-insensitive comparison of the attribute name.
    pub fn is_named(&self, name: &str) -> bool {
        self.attribute.eq_ignore_ascii_case(name)
    }
}

impl PartialEq for Element {
    fn eq(&self, other: &Self) -> bool {
        self.attribute.eq_ignore_ascii_case(&other.attribute)
            && self.value_filter == other.value_filter
    }
}

impl Eq for Element {}

impl Hash for Element {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.attribute.to_ascii_lowercase().hash(state);
        self.value_filter.hash(state);
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.attribute)?;
        if let Some(filter) = &self.value_filter {
            write!(f, "[{}]", filter)?;
        }
        Ok(())
    }
}

/// An attribute path into a SCIM resource.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Path {
    schema_urn: Option<SchemaUrn>,
    elements: Vec<Element>,
}

impl Path {
    /// The root path, addressing the whole resource.
    pub fn root() -> Self {
        Self::default()
    }

    /// A root path qualified by a schema URN, addressing the attributes of
    /// that schema (an extension object, or the top level for core schemas).
    pub fn root_with_schema(schema_urn: &str) -> ScimResult<Self> {
        Ok(Self {
            schema_urn: Some(SchemaUrn::new(schema_urn)?),
            elements: Vec::new(),
        })
    }

    /// Parse a path string. An empty string is the root path.
    pub fn parse(text: &str) -> ScimResult<Self> {
        crate::parser::parse_path(text)
    }

    /// A new path with `name` appended.
    pub fn attribute(&self, name: &str) -> ScimResult<Self> {
        self.with_element(Element::new(name, None)?)
    }

    /// A new path with `name` and its value filter appended.
    pub fn attribute_with_filter(&self, name: &str, value_filter: Filter) -> ScimResult<Self> {
        self.with_element(Element::new(name, Some(value_filter))?)
    }

    pub(crate) fn attribute_with_optional_filter(
        &self,
        name: &str,
        value_filter: Option<Filter>,
    ) -> ScimResult<Self> {
        self.with_element(Element::new(name, value_filter)?)
    }

    /// Appends an unfiltered element whose name is already known to be valid.
    pub(crate) fn child(&self, name: &str) -> Self {
        let mut elements = self.elements.clone();
        elements.push(Element {
            attribute: name.to_string(),
            value_filter: None,
        });
        Self {
            schema_urn: self.schema_urn.clone(),
            elements,
        }
    }

    fn with_element(&self, element: Element) -> ScimResult<Self> {
        let mut elements = self.elements.clone();
        elements.push(element);
        Ok(Self {
            schema_urn: self.schema_urn.clone(),
            elements,
        })
    }

    /// The first `end` elements of this path, keeping the schema URN.
    pub fn sub_path(&self, end: usize) -> Self {
        let end = end.min(self.elements.len());
        Self {
            schema_urn: self.schema_urn.clone(),
            elements: self.elements[..end].to_vec(),
        }
    }

    /// The path without its last element, or `None` for a root path.
    pub fn parent(&self) -> Option<Self> {
        if self.elements.is_empty() {
            None
        } else {
            Some(self.sub_path(self.elements.len() - 1))
        }
    }

    /// Number of elements.
    pub fn size(&self) -> usize {
        self.elements.len()
    }

    /// Whether this path has no elements. A root path may still carry a
    /// schema URN.
    pub fn is_root(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn element(&self, index: usize) -> Option<&Element> {
        self.elements.get(index)
    }

    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    pub fn last_element(&self) -> Option<&Element> {
        self.elements.last()
    }

    pub fn schema_urn(&self) -> Option<&SchemaUrn> {
        self.schema_urn.as_ref()
    }

    /// A new path with the attribute name at `index` replaced. The value
    /// filter at that position is kept.
    pub fn replace_attribute(&self, index: usize, name: &str) -> ScimResult<Self> {
        let current = self.element_at(index)?;
        let element = Element::new(name, current.value_filter.clone())?;
        Ok(self.with_replaced(index, element))
    }

    /// A new path with the value filter at `index` replaced or cleared.
    pub fn replace_filter(&self, index: usize, value_filter: Option<Filter>) -> ScimResult<Self> {
        let current = self.element_at(index)?;
        let element = Element {
            attribute: current.attribute.clone(),
            value_filter,
        };
        Ok(self.with_replaced(index, element))
    }

    /// This path with every value filter dropped.
    pub fn without_filters(&self) -> Self {
        Self {
            schema_urn: self.schema_urn.clone(),
            elements: self
                .elements
                .iter()
                .map(|element| Element {
                    attribute: element.attribute.clone(),
                    value_filter: None,
                })
                .collect(),
        }
    }

    /// This path with the schema URN dropped.
    pub(crate) fn without_schema(&self) -> Self {
        Self {
            schema_urn: None,
            elements: self.elements.clone(),
        }
    }

    /// Whether `other` is a prefix of this path. Schema URNs must match when
    /// `other` has one.
    pub fn starts_with(&self, other: &Path) -> bool {
        if other.schema_urn.is_some() && other.schema_urn != self.schema_urn {
            return false;
        }
        other.elements.len() <= self.elements.len()
            && other
                .elements
                .iter()
                .zip(&self.elements)
                .all(|(a, b)| a == b)
    }

    fn element_at(&self, index: usize) -> ScimResult<&Element> {
        self.elements.get(index).ok_or_else(|| {
            ScimError::invalid_path(format!(
                "Element index {} is out of range for path '{}'",
                index, self
            ))
        })
    }

    fn with_replaced(&self, index: usize, element: Element) -> Self {
        let mut elements = self.elements.clone();
        elements[index] = element;
        Self {
            schema_urn: self.schema_urn.clone(),
            elements,
        }
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(urn) = &self.schema_urn {
            write!(f, "{}:", urn)?;
        }
        for (i, element) in self.elements.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "{}", element)?;
        }
        Ok(())
    }
}

impl FromStr for Path {
    type Err = ScimError;

    fn from_str(s: &str) -> ScimResult<Self> {
        crate::parser::parse_path(s)
    }
}

impl TryFrom<&str> for Path {
    type Error = ScimError;

    fn try_from(value: &str) -> ScimResult<Self> {
        crate::parser::parse_path(value)
    }
}

impl Serialize for Path {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Path {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        crate::parser::parse_path(&value).map_err(serde::de::Error::custom)
    }
}
