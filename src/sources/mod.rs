//! Feed sources.
//!
//! A [`FeedSource`] turns a [`SearchQuery`] into the ordered list of
//! [`Entry`] records the rest of the pipeline consumes. [`ArxivSource`]
//! talks to the arXiv Atom API; [`MockSource`] returns canned entries for
//! tests.

mod arxiv;
pub mod mock;

pub use arxiv::{ArxivSource, ARXIV_API_URL};
pub use mock::MockSource;

use async_trait::async_trait;

use crate::models::{Entry, SearchQuery};

/// Supplier of feed entries, in feed order
#[async_trait]
pub trait FeedSource: Send + Sync + std::fmt::Debug {
    /// Human-readable name of this source
    fn name(&self) -> &str;

    /// Run the query and return every entry of the response, in feed order
    async fn search(&self, query: &SearchQuery) -> Result<Vec<Entry>, SourceError>;
}

/// Errors that can occur when querying a source
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// Network or HTTP error
    #[error("Network error: {0}")]
    Network(String),

    /// Feed could not be decoded
    #[error("Parse error: {0}")]
    Parse(String),

    /// API error from the source
    #[error("API error: {0}")]
    Api(String),
}

impl From<reqwest::Error> for SourceError {
    fn from(err: reqwest::Error) -> Self {
        SourceError::Network(err.to_string())
    }
}

impl From<feed_rs::parser::ParseFeedError> for SourceError {
    fn from(err: feed_rs::parser::ParseFeedError) -> Self {
        SourceError::Parse(format!("Atom feed: {}", err))
    }
}
