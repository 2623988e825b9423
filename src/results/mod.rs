//! Year filtering and display indexing of feed entries.
//!
//! [`index_entries`] wraps the feed's entries in a lazy iterator that drops
//! entries outside the configured year ranges and numbers the survivors
//! 1, 2, 3, ... in feed order. Download selection refers to these numbers,
//! so the numbering only depends on the feed order and the filters.

use crate::models::{Entry, FilteredEntry};
use crate::utils::RangeSpec;

/// Publish-year and update-year filters; `None` admits every year
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct YearFilter {
    pub publish_years: Option<RangeSpec>,
    pub update_years: Option<RangeSpec>,
}

impl YearFilter {
    pub fn new(publish_years: Option<RangeSpec>, update_years: Option<RangeSpec>) -> Self {
        Self {
            publish_years,
            update_years,
        }
    }

    /// Whether the entry passes both active filters
    pub fn admits(&self, entry: &Entry) -> bool {
        let publish_ok = self
            .publish_years
            .as_ref()
            .is_none_or(|spec| spec.contains(entry.publish_year().into()));
        let update_ok = self
            .update_years
            .as_ref()
            .is_none_or(|spec| spec.contains(entry.update_year().into()));
        publish_ok && update_ok
    }
}

/// Streaming filter that assigns display indices to surviving entries
#[derive(Debug)]
pub struct Indexed<I> {
    entries: I,
    filter: YearFilter,
    last_index: usize,
}

impl<I> Iterator for Indexed<I>
where
    I: Iterator<Item = Entry>,
{
    type Item = FilteredEntry;

    fn next(&mut self) -> Option<FilteredEntry> {
        for entry in self.entries.by_ref() {
            if !self.filter.admits(&entry) {
                tracing::debug!(
                    "skipping {} (published {}, updated {})",
                    entry.id,
                    entry.publish_year(),
                    entry.update_year()
                );
                continue;
            }

            self.last_index += 1;
            return Some(FilteredEntry {
                index: self.last_index,
                entry,
            });
        }
        None
    }
}

/// Filter `entries` by year and number the survivors starting at 1.
pub fn index_entries<I>(entries: I, filter: YearFilter) -> Indexed<I::IntoIter>
where
    I: IntoIterator<Item = Entry>,
{
    Indexed {
        entries: entries.into_iter(),
        filter,
        last_index: 0,
    }
}
