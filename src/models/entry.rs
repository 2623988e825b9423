//! Entry model representing one article from the arXiv feed.

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};

/// Role of a link attached to an entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkRole {
    /// The downloadable main artifact (the PDF)
    PrimaryDocument,
    Other,
}

/// A link from the feed, tagged by role
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub href: String,
    pub role: LinkRole,
}

impl Link {
    pub fn primary(href: impl Into<String>) -> Self {
        Self {
            href: href.into(),
            role: LinkRole::PrimaryDocument,
        }
    }

    pub fn other(href: impl Into<String>) -> Self {
        Self {
            href: href.into(),
            role: LinkRole::Other,
        }
    }

    pub fn is_primary(&self) -> bool {
        self.role == LinkRole::PrimaryDocument
    }
}

/// One search result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    /// arXiv identifier, including any version suffix (e.g. "2309.06314v1")
    pub id: String,

    pub title: String,

    /// Author names in feed order
    pub authors: Vec<String>,

    pub published: DateTime<Utc>,

    pub updated: DateTime<Utc>,

    /// Links in feed order
    pub links: Vec<Link>,
}

impl Entry {
    /// Year of `published`, in UTC
    pub fn publish_year(&self) -> i32 {
        self.published.year()
    }

    pub fn update_year(&self) -> i32 {
        self.updated.year()
    }

    /// Primary-document links in feed order
    pub fn primary_links(&self) -> impl Iterator<Item = &str> {
        self.links
            .iter()
            .filter(|l| l.is_primary())
            .map(|l| l.href.as_str())
    }

    /// Links that are not primary documents, in feed order
    pub fn other_links(&self) -> impl Iterator<Item = &str> {
        self.links
            .iter()
            .filter(|l| !l.is_primary())
            .map(|l| l.href.as_str())
    }
}

/// An entry that survived filtering, with its 1-based display index
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilteredEntry {
    pub index: usize,
    pub entry: Entry,
}

/// Builder for constructing Entry objects
#[derive(Debug, Clone)]
pub struct EntryBuilder {
    entry: Entry,
}

impl EntryBuilder {
    /// Start an entry; both timestamps default to `published`.
    pub fn new(id: impl Into<String>, title: impl Into<String>, published: DateTime<Utc>) -> Self {
        Self {
            entry: Entry {
                id: id.into(),
                title: title.into(),
                authors: Vec::new(),
                published,
                updated: published,
                links: Vec::new(),
            },
        }
    }

    pub fn author(mut self, name: impl Into<String>) -> Self {
        self.entry.authors.push(name.into());
        self
    }

    pub fn authors<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.entry.authors.extend(names.into_iter().map(Into::into));
        self
    }

    pub fn updated(mut self, updated: DateTime<Utc>) -> Self {
        self.entry.updated = updated;
        self
    }

    pub fn link(mut self, link: Link) -> Self {
        self.entry.links.push(link);
        self
    }

    pub fn build(self) -> Entry {
        self.entry
    }
}
