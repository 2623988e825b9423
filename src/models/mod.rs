//! Core data models for feed entries and search queries.

mod entry;
mod query;

pub use entry::{Entry, EntryBuilder, FilteredEntry, Link, LinkRole};
pub use query::{SearchQuery, SortBy, SortOrder};
