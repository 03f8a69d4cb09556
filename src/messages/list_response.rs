//! Query results (RFC 7644 Section 3.4.2).

use super::LIST_RESPONSE_SCHEMA;
use serde::{Deserialize, Serialize};

/// One page of query results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListResponse<T> {
    pub schemas: Vec<String>,
    /// Number of results matched by the query, across all pages
    pub total_results: usize,
    /// 1-based index of the first result in this page
    pub start_index: usize,
    /// Number of results in this page
    pub items_per_page: usize,
    #[serde(rename = "Resources", default = "Vec::new")]
    pub resources: Vec<T>,
}

impl<T> ListResponse<T> {
    pub fn new(resources: Vec<T>, total_results: usize, start_index: usize) -> Self {
        Self {
            schemas: vec![LIST_RESPONSE_SCHEMA.to_string()],
            total_results,
            start_index,
            items_per_page: resources.len(),
            resources,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }
}

impl<T> From<Vec<T>> for ListResponse<T> {
    /// A single page holding every result.
    fn from(resources: Vec<T>) -> Self {
        let total = resources.len();
        Self::new(resources, total, 1)
    }
}
