//! Mock source for testing purposes.

use async_trait::async_trait;
use std::sync::Mutex;

use crate::models::{Entry, SearchQuery};
use crate::sources::{FeedSource, SourceError};

/// A mock source that returns predefined entries and records the queries it saw.
#[derive(Debug, Default)]
pub struct MockSource {
    entries: Vec<Entry>,
    queries: Mutex<Vec<SearchQuery>>,
}

impl MockSource {
    /// Create a mock source returning `entries` for every query.
    pub fn new(entries: Vec<Entry>) -> Self {
        Self {
            entries,
            queries: Mutex::new(Vec::new()),
        }
    }

    /// Queries received so far
    pub fn queries(&self) -> Vec<SearchQuery> {
        self.queries
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl FeedSource for MockSource {
    fn name(&self) -> &str {
        "Mock Source"
    }

    async fn search(&self, query: &SearchQuery) -> Result<Vec<Entry>, SourceError> {
        if let Ok(mut guard) = self.queries.lock() {
            guard.push(query.clone());
        }
        Ok(self.entries.clone())
    }
}
