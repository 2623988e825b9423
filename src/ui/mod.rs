//! Terminal output: entry listings, the interactive operator and status lines.
//!
//! Entry listings go to stdout so they can be piped; prompts, status lines
//! and logs go to stderr.

use std::io::{self, BufRead, IsTerminal, Write};

use chrono::{DateTime, Utc};
use owo_colors::OwoColorize;
use serde::Serialize;

use crate::download::{DownloadSummary, Operator};
use crate::models::FilteredEntry;

/// Timestamp format of the listing, e.g. `Tue Sep 12 2023 10:00:00AM UTC`
pub const TIME_FORMAT: &str = "%a %b %d %Y %I:%M:%S%p %Z";

/// Output format for entry listings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Human-readable blocks
    #[default]
    Plain,
    /// One JSON object per line
    Json,
}

/// Check if stderr is a terminal.
pub fn stderr_is_terminal() -> bool {
    io::stderr().is_terminal()
}

/// Serializable view of one listed entry
#[derive(Debug, Clone, Serialize)]
pub struct EntryView<'a> {
    pub index: usize,
    pub id: &'a str,
    pub title: &'a str,
    pub authors: &'a [String],
    pub published: DateTime<Utc>,
    pub updated: DateTime<Utc>,
    pub output_file: String,
    pub pdf_links: Vec<&'a str>,
    pub other_links: Vec<&'a str>,
}

impl<'a> EntryView<'a> {
    pub fn new(item: &'a FilteredEntry, basename: &str) -> Self {
        let entry = &item.entry;
        Self {
            index: item.index,
            id: &entry.id,
            title: &entry.title,
            authors: &entry.authors,
            published: entry.published,
            updated: entry.updated,
            output_file: format!("{}.pdf", basename),
            pdf_links: entry.primary_links().collect(),
            other_links: entry.other_links().collect(),
        }
    }
}

/// Render an entry as a numbered plain-text block.
pub fn render_plain(item: &FilteredEntry, basename: &str) -> String {
    let view = EntryView::new(item, basename);
    let numbering = view.index.to_string();

    format!(
        "{numbering}\n{underline}\n\
         ID: {id}\n\
         Authors: {authors:?}\n\
         Title: {title}\n\
         Published: {published}\n\
         Updated: {updated}\n\
         Output file name: {output_file}\n\
         PDF links:\n{pdf_links:?}\n\
         Other links:\n{other_links:?}\n",
        underline = "-".repeat(numbering.len()),
        id = view.id,
        authors = view.authors,
        title = view.title,
        published = view.published.format(TIME_FORMAT),
        updated = view.updated.format(TIME_FORMAT),
        output_file = view.output_file,
        pdf_links = view.pdf_links,
        other_links = view.other_links,
    )
}

/// Render an entry as a single JSON line.
pub fn render_json(item: &FilteredEntry, basename: &str) -> serde_json::Result<String> {
    serde_json::to_string(&EntryView::new(item, basename))
}

/// Print an entry to stdout.
pub fn print_entry(item: &FilteredEntry, basename: &str, format: OutputFormat) -> io::Result<()> {
    let mut stdout = io::stdout().lock();
    match format {
        OutputFormat::Plain => writeln!(stdout, "{}", render_plain(item, basename))?,
        OutputFormat::Json => {
            let line = render_json(item, basename).map_err(io::Error::other)?;
            writeln!(stdout, "{}", line)?;
        }
    }
    stdout.flush()
}

/// Print the end-of-run download summary to stderr.
pub fn print_summary(summary: &DownloadSummary) {
    let clean = summary.failed == 0 && summary.removed == 0 && summary.kept_invalid == 0;
    if !stderr_is_terminal() {
        eprintln!("{}", summary);
    } else if clean {
        eprintln!("{} {}", "✓".green().bold(), summary);
    } else {
        eprintln!("{} {}", "⚠".yellow().bold(), summary);
    }
}

/// Operator reading answers from stdin and prompting on stderr
#[derive(Debug, Default)]
pub struct StdinOperator;

impl StdinOperator {
    pub fn new() -> Self {
        Self
    }
}

impl Operator for StdinOperator {
    fn ask(&mut self, question: &str) -> io::Result<Option<String>> {
        let mut stderr = io::stderr().lock();
        if stderr_is_terminal() {
            write!(stderr, "{}", question.yellow())?;
        } else {
            write!(stderr, "{}", question)?;
        }
        stderr.flush()?;

        let mut line = String::new();
        let read = io::stdin().lock().read_line(&mut line)?;
        writeln!(stderr)?;

        if read == 0 {
            Ok(None)
        } else {
            Ok(Some(line))
        }
    }

    fn complain(&mut self, message: &str) {
        if stderr_is_terminal() {
            eprintln!("{}", message.red());
        } else {
            eprintln!("{}", message);
        }
    }
}
