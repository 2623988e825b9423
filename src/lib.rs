//! # arxiv-paper
//!
//! A command-line arXiv article browser and batch PDF downloader.
//!
//! ## Architecture
//!
//! - [`sources`]: feed sources; [`sources::ArxivSource`] queries the arXiv Atom API
//! - [`models`]: feed entries and search queries
//! - [`results`]: year filtering and display numbering of entries
//! - [`download`]: fetching, naming and validating PDFs, non-pdf handling
//! - [`utils`]: range expressions, filename templates, PDF sniffing, HTTP client
//! - [`ui`]: terminal listing and the interactive operator
//! - [`config`]: layered configuration

pub mod config;
pub mod download;
pub mod models;
pub mod results;
pub mod sources;
pub mod ui;
pub mod utils;

// Re-export commonly used types
pub use models::{Entry, FilteredEntry};
pub use sources::{ArxivSource, FeedSource};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
