//! Query requests (RFC 7644 Section 3.4.3).
//!
//! A [`SearchRequest`] carries the filter, sort and paging parameters of a
//! query. [`SearchRequest::apply`] runs the query over resources held in
//! memory and produces a [`ListResponse`].
//!
//! ```rust
//! use scim_path::messages::{SearchRequest, SortOrder};
//! use serde_json::json;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let users = vec![
//!         json!({"userName": "carol", "active": true}),
//!         json!({"userName": "alice", "active": true}),
//!         json!({"userName": "bob", "active": false}),
//!     ];
//!
//!     let response = SearchRequest::new()
//!         .with_filter("active eq true".parse()?)
//!         .with_sort_by("userName".parse()?, SortOrder::Ascending)
//!         .apply(users)?;
//!
//!     assert_eq!(response.total_results, 2);
//!     assert_eq!(response.resources[0]["userName"], json!("alice"));
//!     Ok(())
//! }
//! ```

use super::{ListResponse, SEARCH_REQUEST_SCHEMA};
use crate::accessor;
use crate::comparator;
use crate::error::ScimResult;
use crate::evaluator::FilterEvaluator;
use crate::filter::Filter;
use crate::path::Path;
use log::trace;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cmp::Ordering;

/// Page size used when a request does not set `count`.
pub const DEFAULT_COUNT: usize = 100;

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

/// A SCIM query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    pub schemas: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<Path>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub excluded_attributes: Vec<Path>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<Filter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_by: Option<Path>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_order: Option<SortOrder>,
    /// 1-based index of the first result to return
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_index: Option<usize>,
    /// Maximum number of results per page
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
}

impl Default for SearchRequest {
    fn default() -> Self {
        Self {
            schemas: vec![SEARCH_REQUEST_SCHEMA.to_string()],
            attributes: Vec::new(),
            excluded_attributes: Vec::new(),
            filter: None,
            sort_by: None,
            sort_order: None,
            start_index: None,
            count: None,
        }
    }
}

impl SearchRequest {
    /// Create a new empty request.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the filter.
    pub fn with_filter(mut self, filter: Filter) -> Self {
        self.filter = Some(filter);
        self
    }

    /// Set the sort attribute and direction.
    pub fn with_sort_by(mut self, sort_by: Path, order: SortOrder) -> Self {
        self.sort_by = Some(sort_by);
        self.sort_order = Some(order);
        self
    }

    /// Set the starting index.
    pub fn with_start_index(mut self, start_index: usize) -> Self {
        self.start_index = Some(start_index);
        self
    }

    /// Set the maximum count.
    pub fn with_count(mut self, count: usize) -> Self {
        self.count = Some(count);
        self
    }

    /// The effective 1-based start index; values below 1 are treated as 1.
    pub fn effective_start_index(&self) -> usize {
        self.start_index.unwrap_or(1).max(1)
    }

    pub fn effective_count(&self) -> usize {
        self.count.unwrap_or(DEFAULT_COUNT)
    }

    /// Run this query over `resources` with the default evaluator.
    pub fn apply(&self, resources: Vec<Value>) -> ScimResult<ListResponse<Value>> {
        self.apply_with(&FilterEvaluator::default(), resources)
    }

    /// Filter, sort and page `resources`.
    ///
    /// Sorting is stable and uses the first value of the sort attribute;
    /// resources without one sort last in either direction.
    pub fn apply_with(
        &self,
        evaluator: &FilterEvaluator,
        resources: Vec<Value>,
    ) -> ScimResult<ListResponse<Value>> {
        let mut matched = Vec::with_capacity(resources.len());
        for resource in resources {
            let keep = match &self.filter {
                Some(filter) => evaluator.evaluate(filter, &resource)?,
                None => true,
            };
            if keep {
                matched.push(resource);
            }
        }

        if let Some(sort_by) = &self.sort_by {
            let descending = self.sort_order == Some(SortOrder::Descending);
            let mut keyed = matched
                .into_iter()
                .map(|resource| -> ScimResult<(Option<Value>, Value)> {
                    Ok((sort_key(evaluator, sort_by, &resource)?, resource))
                })
                .collect::<ScimResult<Vec<_>>>()?;
            keyed.sort_by(|(a, _), (b, _)| compare_keys(a.as_ref(), b.as_ref(), descending));
            matched = keyed.into_iter().map(|(_, resource)| resource).collect();
        }

        let total = matched.len();
        let start_index = self.effective_start_index();
        let page: Vec<Value> = matched
            .into_iter()
            .skip(start_index - 1)
            .take(self.effective_count())
            .collect();

        trace!(
            "Search matched {} resources, returning {} from index {}",
            total,
            page.len(),
            start_index
        );
        Ok(ListResponse::new(page, total, start_index))
    }
}

/// The first scalar value of `sort_by` in `resource`.
fn sort_key(evaluator: &FilterEvaluator, sort_by: &Path, resource: &Value) -> ScimResult<Option<Value>> {
    let values = accessor::get_values_with(evaluator, sort_by, resource)?;
    Ok(values.into_iter().find_map(|value| match value {
        Value::Array(items) => items.into_iter().find(|item| !item.is_null()),
        Value::Null => None,
        other => Some(other),
    }))
}

fn compare_keys(a: Option<&Value>, b: Option<&Value>, descending: bool) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => {
            let ordering = comparator::compare(a, b).unwrap_or(Ordering::Equal);
            if descending { ordering.reverse() } else { ordering }
        }
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
