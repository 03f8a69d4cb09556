//! Filter evaluation against JSON resource documents.
//!
//! [`FilterEvaluator`] walks a [`Filter`] tree and tests it against live
//! document data. Attribute values are gathered with the path accessor, so a
//! filter on a multi-valued attribute matches when any of its values does.
//!
//! Missing attributes, `null`, and arrays holding only empty values are all
//! empty: `x eq null` and `not(x pr)` agree on them.
//!
//! ```rust
//! use scim_path::{Filter, FilterEvaluator, Path};
//! use serde_json::json;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let user = json!({
//!         "userName": "BJensen",
//!         "emails": [{"type": "work", "value": "bjensen@example.com"}]
//!     });
//!
//!     let evaluator = FilterEvaluator::default();
//!     assert!(evaluator.evaluate(&r#"userName eq "bjensen""#.parse()?, &user)?);
//!     assert!(evaluator.evaluate(&r#"emails[type eq "work" and value ew "example.com"]"#.parse()?, &user)?);
//!
//!     let strict = FilterEvaluator::default().with_case_exact(Path::parse("userName")?);
//!     assert!(!strict.evaluate(&Filter::eq(Path::parse("userName")?, "bjensen"), &user)?);
//!     Ok(())
//! }
//! ```

use crate::accessor;
use crate::comparator;
use crate::error::{ScimError, ScimResult};
use crate::filter::{ComparisonOperator, Filter};
use crate::path::Path;
use log::debug;
use serde_json::{Map, Value};
use std::cmp::Ordering;
use std::collections::HashSet;

/// Evaluates filters against JSON objects.
///
/// String comparisons ignore case unless the attribute was registered with
/// [`with_case_exact`](Self::with_case_exact).
#[derive(Debug, Clone, Default)]
pub struct FilterEvaluator {
    case_exact: HashSet<Path>,
}

impl FilterEvaluator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `attribute` as case-exact. Value filters and schema URNs in the
    /// path are ignored; `emails.value` covers the `value` sub-attribute of
    /// every email.
    pub fn with_case_exact(mut self, attribute: Path) -> Self {
        self.case_exact
            .insert(attribute.without_filters().without_schema());
        self
    }

    /// Whether string comparisons on `attribute` are case-exact.
    pub fn is_case_exact(&self, attribute: &Path) -> bool {
        !self.case_exact.is_empty()
            && self
                .case_exact
                .contains(&attribute.without_filters().without_schema())
    }

    /// Test `filter` against a JSON object.
    pub fn evaluate(&self, filter: &Filter, object: &Value) -> ScimResult<bool> {
        self.evaluate_at(filter, object, &Path::root())
    }

    /// Test a value filter against one value of a multi-valued attribute.
    /// Scalar values are tested as if they were `{"value": <scalar>}`.
    pub(crate) fn matches_element(
        &self,
        filter: &Filter,
        element: &Value,
        prefix: &Path,
    ) -> ScimResult<bool> {
        if element.is_object() {
            return self.evaluate_at(filter, element, prefix);
        }
        let mut wrapper = Map::new();
        wrapper.insert("value".to_string(), element.clone());
        self.evaluate_at(filter, &Value::Object(wrapper), prefix)
    }

    /// `prefix` is the path of `object` within the resource.
    fn evaluate_at(&self, filter: &Filter, object: &Value, prefix: &Path) -> ScimResult<bool> {
        match filter {
            Filter::Comparison {
                operator,
                attribute,
                value,
            } => self.evaluate_comparison(*operator, attribute, value, object, prefix),
            Filter::Present { attribute } => {
                let nodes = accessor::select(self, attribute, object, prefix)?;
                Ok(nodes.into_iter().any(|node| !is_empty(node)))
            }
            Filter::And(components) => {
                for component in components {
                    if !self.evaluate_at(component, object, prefix)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            Filter::Or(components) => {
                for component in components {
                    if self.evaluate_at(component, object, prefix)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
            Filter::Not(inner) => Ok(!self.evaluate_at(inner, object, prefix)?),
            Filter::ComplexValue {
                attribute,
                value_filter,
            } => {
                let element_prefix = qualify(prefix, attribute);
                for node in accessor::select(self, attribute, object, prefix)? {
                    let matched = match node {
                        Value::Array(items) => {
                            let mut matched = false;
                            for item in items {
                                if self.matches_element(value_filter, item, &element_prefix)? {
                                    matched = true;
                                    break;
                                }
                            }
                            matched
                        }
                        other => self.matches_element(value_filter, other, &element_prefix)?,
                    };
                    if matched {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
        }
    }

    fn evaluate_comparison(
        &self,
        operator: ComparisonOperator,
        attribute: &Path,
        value: &Value,
        object: &Value,
        prefix: &Path,
    ) -> ScimResult<bool> {
        let nodes = accessor::select(self, attribute, object, prefix)?;
        let case_exact = self.is_case_exact(&qualify(prefix, attribute));
        let candidates: Vec<&Value> = nodes.iter().copied().flat_map(flatten).collect();

        match operator {
            ComparisonOperator::Equal => Ok(matches_equal(&nodes, &candidates, value, case_exact)),
            ComparisonOperator::NotEqual => {
                Ok(!matches_equal(&nodes, &candidates, value, case_exact))
            }
            ComparisonOperator::Contains
            | ComparisonOperator::StartsWith
            | ComparisonOperator::EndsWith => Ok(candidates
                .iter()
                .any(|candidate| matches_text(operator, candidate, value, case_exact))),
            ComparisonOperator::GreaterThan
            | ComparisonOperator::GreaterThanOrEqual
            | ComparisonOperator::LessThan
            | ComparisonOperator::LessThanOrEqual => {
                if value.is_boolean() || candidates.iter().any(|c| c.is_boolean()) {
                    debug!(
                        "Rejected ordering comparison '{} {} {}' on a boolean value",
                        attribute, operator, value
                    );
                    return Err(ScimError::invalid_filter(format!(
                        "Greater than and less than comparisons are not allowed on boolean values ('{} {} {}')",
                        attribute, operator, value
                    )));
                }
                Ok(candidates.iter().any(|candidate| {
                    comparator::compare_with(candidate, value, case_exact)
                        .is_some_and(|ordering| satisfies(operator, ordering))
                }))
            }
        }
    }
}

fn matches_equal(nodes: &[&Value], candidates: &[&Value], value: &Value, case_exact: bool) -> bool {
    if value.is_null() && nodes.iter().all(|node| is_empty(node)) {
        return true;
    }
    candidates
        .iter()
        .any(|candidate| comparator::equals_with(candidate, value, case_exact))
}

fn matches_text(operator: ComparisonOperator, candidate: &Value, value: &Value, case_exact: bool) -> bool {
    if let (Value::String(text), Value::String(pattern)) = (candidate, value) {
        let (text, pattern) = if case_exact {
            (text.clone(), pattern.clone())
        } else {
            (text.to_lowercase(), pattern.to_lowercase())
        };
        let found = match operator {
            ComparisonOperator::Contains => text.contains(&pattern),
            ComparisonOperator::StartsWith => text.starts_with(&pattern),
            _ => text.ends_with(&pattern),
        };
        if found {
            return true;
        }
    }
    comparator::equals_with(candidate, value, case_exact)
}

fn satisfies(operator: ComparisonOperator, ordering: Ordering) -> bool {
    match operator {
        ComparisonOperator::GreaterThan => ordering == Ordering::Greater,
        ComparisonOperator::GreaterThanOrEqual => ordering != Ordering::Less,
        ComparisonOperator::LessThan => ordering == Ordering::Less,
        ComparisonOperator::LessThanOrEqual => ordering != Ordering::Greater,
        _ => ordering == Ordering::Equal,
    }
}

/// Array nodes contribute their elements; everything else contributes itself.
fn flatten(node: &Value) -> Vec<&Value> {
    match node {
        Value::Array(items) => items.iter().collect(),
        other => vec![other],
    }
}

/// `prefix` extended with the attribute names of `attribute`.
fn qualify(prefix: &Path, attribute: &Path) -> Path {
    attribute
        .elements()
        .iter()
        .fold(prefix.clone(), |path, element| path.child(element.attribute()))
}

/// Null is empty, and so is an array whose elements are all empty.
pub fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Array(items) => items.iter().all(is_empty),
        _ => false,
    }
}
