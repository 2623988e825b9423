//! Search query model for the arXiv `query` method.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Sort key accepted by the arXiv API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortBy {
    Relevance,
    #[default]
    LastUpdatedDate,
    SubmittedDate,
}

impl SortBy {
    /// Value of the `sortBy` query parameter
    pub fn as_str(&self) -> &'static str {
        match self {
            SortBy::Relevance => "relevance",
            SortBy::LastUpdatedDate => "lastUpdatedDate",
            SortBy::SubmittedDate => "submittedDate",
        }
    }
}

impl fmt::Display for SortBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Ascending,
    #[default]
    Descending,
}

impl SortOrder {
    /// Value of the `sortOrder` query parameter
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Ascending => "ascending",
            SortOrder::Descending => "descending",
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Search query parameters
///
/// Mirrors the parameters of the arXiv API `query` method. The search
/// expression may contain spaces, parentheses and double quotes; they are
/// percent-encoded when the request URL is built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchQuery {
    /// `search_query`, e.g. `au:ficial_a_i AND ti:quantum`
    pub search_query: String,

    /// `id_list`, comma-separated arXiv ids
    pub id_list: String,

    pub start: usize,

    pub max_results: usize,

    pub sort_by: SortBy,

    pub sort_order: SortOrder,
}

impl Default for SearchQuery {
    fn default() -> Self {
        Self {
            search_query: String::new(),
            id_list: String::new(),
            start: 0,
            max_results: 50,
            sort_by: SortBy::default(),
            sort_order: SortOrder::default(),
        }
    }
}

impl SearchQuery {
    /// Create a new search query
    pub fn new(search_query: impl Into<String>) -> Self {
        Self {
            search_query: search_query.into(),
            ..Default::default()
        }
    }

    /// Set the id list
    pub fn id_list(mut self, ids: impl Into<String>) -> Self {
        self.id_list = ids.into();
        self
    }

    /// Set the result offset
    pub fn start(mut self, start: usize) -> Self {
        self.start = start;
        self
    }

    /// Set maximum results
    pub fn max_results(mut self, max: usize) -> Self {
        self.max_results = max;
        self
    }

    /// Set sort by
    pub fn sort_by(mut self, sort: SortBy) -> Self {
        self.sort_by = sort;
        self
    }

    /// Set sort order
    pub fn sort_order(mut self, order: SortOrder) -> Self {
        self.sort_order = order;
        self
    }

    /// Query string (without the leading `?`) for the arXiv API
    pub fn to_query_string(&self) -> String {
        format!(
            "search_query={}&id_list={}&start={}&max_results={}&sortBy={}&sortOrder={}",
            urlencoding::encode(&self.search_query),
            urlencoding::encode(&self.id_list),
            self.start,
            self.max_results,
            self.sort_by,
            self.sort_order
        )
    }
}
