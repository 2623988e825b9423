//! Filename templates and slugs.
//!
//! Templates use brace placeholders, `{{` and `}}` stand for literal braces:
//!
//! | placeholder | value                                   |
//! |-------------|-----------------------------------------|
//! | `{id}`      | arXiv identifier                        |
//! | `{auth}`    | slugified author names joined with `-`  |
//! | `{title}`   | slugified title                         |
//! | `{pub}`     | publish year                            |
//! | `{updt}`    | update year                             |
//!
//! The template is parsed once at startup so that unknown placeholders are
//! reported before any request is made.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

use crate::models::Entry;

/// Default template used when none is configured
pub const DEFAULT_TEMPLATE: &str = "{pub}-{auth}-{title}-{id}";

static NON_SLUG_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("[^0-9a-zA-Z_]+").expect("slug pattern is valid"));

/// Replace every run of characters outside `[0-9A-Za-z_]` with a single underscore.
pub fn slugify(text: &str) -> String {
    NON_SLUG_RUN.replace_all(text, "_").into_owned()
}

/// Template parse errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TemplateError {
    #[error("unknown placeholder {{{0}}} (expected one of {{id}}, {{auth}}, {{title}}, {{pub}}, {{updt}})")]
    UnknownPlaceholder(String),

    #[error("unmatched '{0}' at byte {1}")]
    UnmatchedBrace(char, usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Placeholder {
    Id,
    Authors,
    Title,
    PublishYear,
    UpdateYear,
}

impl Placeholder {
    fn from_name(name: &str) -> Option<Self> {
        match name {
            "id" => Some(Placeholder::Id),
            "auth" => Some(Placeholder::Authors),
            "title" => Some(Placeholder::Title),
            "pub" => Some(Placeholder::PublishYear),
            "updt" => Some(Placeholder::UpdateYear),
            _ => None,
        }
    }

    fn name(self) -> &'static str {
        match self {
            Placeholder::Id => "id",
            Placeholder::Authors => "auth",
            Placeholder::Title => "title",
            Placeholder::PublishYear => "pub",
            Placeholder::UpdateYear => "updt",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Field(Placeholder),
}

/// Values substituted into a template
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateFields {
    pub identifier: String,
    pub author_slugs: Vec<String>,
    pub title_slug: String,
    pub publish_year: String,
    pub update_year: String,
}

impl TemplateFields {
    /// Slugify an entry's title and authors and extract its years.
    pub fn from_entry(entry: &Entry) -> Self {
        Self {
            identifier: entry.id.clone(),
            author_slugs: entry.authors.iter().map(|a| slugify(a)).collect(),
            title_slug: slugify(&entry.title),
            publish_year: entry.publish_year().to_string(),
            update_year: entry.update_year().to_string(),
        }
    }
}

/// A parsed filename template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilenameTemplate {
    source: String,
    segments: Vec<Segment>,
}

impl FilenameTemplate {
    pub fn parse(template: &str) -> Result<Self, TemplateError> {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut chars = template.char_indices().peekable();

        while let Some((pos, ch)) = chars.next() {
            match ch {
                '{' if chars.peek().map(|&(_, c)| c) == Some('{') => {
                    chars.next();
                    literal.push('{');
                }
                '}' if chars.peek().map(|&(_, c)| c) == Some('}') => {
                    chars.next();
                    literal.push('}');
                }
                '{' => {
                    let mut name = String::new();
                    let mut closed = false;
                    for (_, c) in chars.by_ref() {
                        if c == '}' {
                            closed = true;
                            break;
                        }
                        name.push(c);
                    }
                    if !closed {
                        return Err(TemplateError::UnmatchedBrace('{', pos));
                    }
                    let field = Placeholder::from_name(&name)
                        .ok_or(TemplateError::UnknownPlaceholder(name))?;
                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    segments.push(Segment::Field(field));
                }
                '}' => return Err(TemplateError::UnmatchedBrace('}', pos)),
                c => literal.push(c),
            }
        }

        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        Ok(Self {
            source: template.to_string(),
            segments,
        })
    }

    /// Substitute `fields` into the template, producing a file basename.
    pub fn render(&self, fields: &TemplateFields) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Field(Placeholder::Id) => out.push_str(&fields.identifier),
                Segment::Field(Placeholder::Authors) => {
                    out.push_str(&fields.author_slugs.join("-"))
                }
                Segment::Field(Placeholder::Title) => out.push_str(&fields.title_slug),
                Segment::Field(Placeholder::PublishYear) => out.push_str(&fields.publish_year),
                Segment::Field(Placeholder::UpdateYear) => out.push_str(&fields.update_year),
            }
        }
        out
    }

    /// Names of the placeholders used, in template order
    pub fn placeholders(&self) -> Vec<&'static str> {
        self.segments
            .iter()
            .filter_map(|s| match s {
                Segment::Field(p) => Some(p.name()),
                Segment::Literal(_) => None,
            })
            .collect()
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }
}

impl Default for FilenameTemplate {
    fn default() -> Self {
        Self::parse(DEFAULT_TEMPLATE).expect("default template is valid")
    }
}

impl FromStr for FilenameTemplate {
    type Err = TemplateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for FilenameTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}
