//! SCIM filter expressions (RFC 7644 Section 3.4.2.2).
//!
//! A [`Filter`] is a closed tree of comparison, presence, logical and complex
//! value nodes. Filters are produced by the parser or by the factory functions
//! below, never change after construction, and print back to a canonical string
//! that parses to an equal filter.
//!
//! ```rust
//! use scim_path::{Filter, Path};
//! use serde_json::json;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let parsed: Filter = r#"userName eq "bjensen" and active pr"#.parse()?;
//!
//!     let built = Filter::and(vec![
//!         Filter::eq(Path::parse("userName")?, json!("bjensen")),
//!         Filter::pr(Path::parse("active")?),
//!     ])?;
//!
//!     assert_eq!(parsed, built);
//!     assert_eq!(built.to_string(), r#"(userName eq "bjensen" and active pr)"#);
//!     Ok(())
//! }
//! ```

use crate::error::{ScimError, ScimResult};
use crate::path::Path;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

/// Attribute comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComparisonOperator {
    /// Equal comparison
    #[serde(rename = "eq")]
    Equal,

    /// Not equal comparison
    #[serde(rename = "ne")]
    NotEqual,

    /// Contains operation for strings
    #[serde(rename = "co")]
    Contains,

    /// Starts with operation for strings
    #[serde(rename = "sw")]
    StartsWith,

    /// Ends with operation for strings
    #[serde(rename = "ew")]
    EndsWith,

    /// Greater than
    #[serde(rename = "gt")]
    GreaterThan,

    /// Greater than or equal
    #[serde(rename = "ge")]
    GreaterThanOrEqual,

    /// Less than
    #[serde(rename = "lt")]
    LessThan,

    /// Less than or equal
    #[serde(rename = "le")]
    LessThanOrEqual,
}

impl ComparisonOperator {
    pub const ALL: [ComparisonOperator; 9] = [
        Self::Equal,
        Self::NotEqual,
        Self::Contains,
        Self::StartsWith,
        Self::EndsWith,
        Self::GreaterThan,
        Self::GreaterThanOrEqual,
        Self::LessThan,
        Self::LessThanOrEqual,
    ];

    /// The filter keyword, e.g. `eq`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Equal => "eq",
            Self::NotEqual => "ne",
            Self::Contains => "co",
            Self::StartsWith => "sw",
            Self::EndsWith => "ew",
            Self::GreaterThan => "gt",
            Self::GreaterThanOrEqual => "ge",
            Self::LessThan => "lt",
            Self::LessThanOrEqual => "le",
        }
    }

    /// Look up an operator by keyword, ignoring case.
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|op| op.as_str().eq_ignore_ascii_case(keyword))
    }

    /// Whether this operator orders values, which rules out boolean operands.
    pub fn is_ordering(&self) -> bool {
        matches!(
            self,
            Self::GreaterThan | Self::GreaterThanOrEqual | Self::LessThan | Self::LessThanOrEqual
        )
    }
}

impl fmt::Display for ComparisonOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The kind of a filter node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterType {
    Comparison(ComparisonOperator),
    Present,
    And,
    Or,
    Not,
    ComplexValue,
}

impl FilterType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Comparison(op) => op.as_str(),
            Self::Present => "pr",
            Self::And => "and",
            Self::Or => "or",
            Self::Not => "not",
            Self::ComplexValue => "complex",
        }
    }
}

/// A SCIM filter expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    /// `attribute op value`
    Comparison {
        operator: ComparisonOperator,
        attribute: Path,
        value: Value,
    },
    /// `attribute pr`
    Present { attribute: Path },
    /// Conjunction of one or more filters
    And(Vec<Filter>),
    /// Disjunction of one or more filters
    Or(Vec<Filter>),
    /// `not(filter)`
    Not(Box<Filter>),
    /// `attribute[filter]`: some value of a complex attribute matches
    ComplexValue {
        attribute: Path,
        value_filter: Box<Filter>,
    },
}

#[allow(clippy::should_implement_trait)]
impl Filter {
    /// Parse a filter string.
    pub fn parse(text: &str) -> ScimResult<Self> {
        crate::parser::parse_filter(text)
    }

    /// A comparison filter with an explicit operator.
    pub fn compare(operator: ComparisonOperator, attribute: Path, value: impl Into<Value>) -> Self {
        Self::Comparison {
            operator,
            attribute,
            value: value.into(),
        }
    }

    pub fn eq(attribute: Path, value: impl Into<Value>) -> Self {
        Self::compare(ComparisonOperator::Equal, attribute, value)
    }

    pub fn ne(attribute: Path, value: impl Into<Value>) -> Self {
        Self::compare(ComparisonOperator::NotEqual, attribute, value)
    }

    pub fn co(attribute: Path, value: impl Into<Value>) -> Self {
        Self::compare(ComparisonOperator::Contains, attribute, value)
    }

    pub fn sw(attribute: Path, value: impl Into<Value>) -> Self {
        Self::compare(ComparisonOperator::StartsWith, attribute, value)
    }

    pub fn ew(attribute: Path, value: impl Into<Value>) -> Self {
        Self::compare(ComparisonOperator::EndsWith, attribute, value)
    }

    pub fn gt(attribute: Path, value: impl Into<Value>) -> Self {
        Self::compare(ComparisonOperator::GreaterThan, attribute, value)
    }

    pub fn ge(attribute: Path, value: impl Into<Value>) -> Self {
        Self::compare(ComparisonOperator::GreaterThanOrEqual, attribute, value)
    }

    pub fn lt(attribute: Path, value: impl Into<Value>) -> Self {
        Self::compare(ComparisonOperator::LessThan, attribute, value)
    }

    pub fn le(attribute: Path, value: impl Into<Value>) -> Self {
        Self::compare(ComparisonOperator::LessThanOrEqual, attribute, value)
    }

    pub fn pr(attribute: Path) -> Self {
        Self::Present { attribute }
    }

    /// Conjunction of `components`, which must not be empty.
    pub fn and(components: Vec<Filter>) -> ScimResult<Self> {
        if components.is_empty() {
            return Err(ScimError::invalid_filter(
                "An 'and' filter requires at least one component",
            ));
        }
        Ok(Self::And(components))
    }

    /// Disjunction of `components`, which must not be empty.
    pub fn or(components: Vec<Filter>) -> ScimResult<Self> {
        if components.is_empty() {
            return Err(ScimError::invalid_filter(
                "An 'or' filter requires at least one component",
            ));
        }
        Ok(Self::Or(components))
    }

    pub fn not(filter: Filter) -> Self {
        Self::Not(Box::new(filter))
    }

    pub fn has_complex_value(attribute: Path, value_filter: Filter) -> Self {
        Self::ComplexValue {
            attribute,
            value_filter: Box::new(value_filter),
        }
    }

    pub fn filter_type(&self) -> FilterType {
        match self {
            Self::Comparison { operator, .. } => FilterType::Comparison(*operator),
            Self::Present { .. } => FilterType::Present,
            Self::And(_) => FilterType::And,
            Self::Or(_) => FilterType::Or,
            Self::Not(_) => FilterType::Not,
            Self::ComplexValue { .. } => FilterType::ComplexValue,
        }
    }

    /// The attribute this filter tests, for comparison, presence and complex
    /// value filters.
    pub fn attribute_path(&self) -> Option<&Path> {
        match self {
            Self::Comparison { attribute, .. }
            | Self::Present { attribute }
            | Self::ComplexValue { attribute, .. } => Some(attribute),
            _ => None,
        }
    }

    pub fn comparison_value(&self) -> Option<&Value> {
        match self {
            Self::Comparison { value, .. } => Some(value),
            _ => None,
        }
    }

    /// Components of an `and`/`or` filter.
    pub fn components(&self) -> Option<&[Filter]> {
        match self {
            Self::And(components) | Self::Or(components) => Some(components),
            _ => None,
        }
    }

    pub fn is_combining(&self) -> bool {
        matches!(self, Self::And(_) | Self::Or(_))
    }
}

impl Hash for Filter {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Self::Comparison {
                operator,
                attribute,
                value,
            } => {
                operator.hash(state);
                attribute.hash(state);
                // Only scalars are hashed; equal values always print alike.
                if !value.is_array() && !value.is_object() {
                    value.to_string().hash(state);
                }
            }
            Self::Present { attribute } => attribute.hash(state),
            Self::And(components) | Self::Or(components) => components.hash(state),
            Self::Not(inner) => inner.hash(state),
            Self::ComplexValue {
                attribute,
                value_filter,
            } => {
                attribute.hash(state);
                value_filter.hash(state);
            }
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Comparison {
                operator,
                attribute,
                value,
            } => write!(f, "{} {} {}", attribute, operator, value),
            Self::Present { attribute } => write!(f, "{} pr", attribute),
            Self::And(components) | Self::Or(components) => {
                let keyword = self.filter_type().as_str();
                f.write_str("(")?;
                for (i, component) in components.iter().enumerate() {
                    if i > 0 {
                        write!(f, " {} ", keyword)?;
                    }
                    write!(f, "{}", component)?;
                }
                f.write_str(")")
            }
            Self::Not(inner) => write!(f, "not({})", inner),
            Self::ComplexValue {
                attribute,
                value_filter,
            } => write!(f, "{}[{}]", attribute, value_filter),
        }
    }
}

impl FromStr for Filter {
    type Err = ScimError;

    fn from_str(s: &str) -> ScimResult<Self> {
        crate::parser::parse_filter(s)
    }
}

impl Serialize for Filter {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Filter {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        crate::parser::parse_filter(&value).map_err(serde::de::Error::custom)
    }
}
