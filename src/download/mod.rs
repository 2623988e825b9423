//! Downloading and validating the PDFs of selected entries.
//!
//! For every entry the [`DownloadManager`] is handed, it
//!
//! 1. checks the entry against the download selection,
//! 2. renders the file basename from the filename template,
//! 3. fetches each primary-document link to `{dir}/{basename}.pdf`,
//!    `{dir}/{basename}--2.pdf`, ... in link order,
//! 4. checks the PDF signature of each fetched file and applies the
//!    [`NonPdfPolicy`] to files that fail it.
//!
//! A failed fetch is reported and skipped; it never stops the remaining
//! links or entries. Filesystem errors while validating or removing a file
//! abort the run.

pub mod disposition;
mod transport;

pub use disposition::{Disposition, NonPdfPolicy, Operator, ScriptedOperator};
pub use transport::{write_atomically, HttpTransport, Transport, TransportError};

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;

use crate::models::FilteredEntry;
use crate::utils::{has_pdf_signature, FilenameTemplate, RangeSpec, TemplateFields};

const DOWNLOAD_FAIL_HINT: &str =
    "failed to download file; it is possible that the article was withdrawn";

/// Fatal download errors
#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("filesystem error on {}: {source}", path.display())]
    Filesystem {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("could not get an answer for {}: {source}", path.display())]
    Operator {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Download behaviour for the run
#[derive(Debug, Clone)]
pub struct DownloadSettings {
    /// Global download toggle
    pub enabled: bool,

    /// Display indices to download; `None` selects every entry
    pub selection: Option<RangeSpec>,

    pub output_dir: PathBuf,

    pub template: FilenameTemplate,

    pub policy: NonPdfPolicy,
}

impl Default for DownloadSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            selection: None,
            output_dir: PathBuf::from("."),
            template: FilenameTemplate::default(),
            policy: NonPdfPolicy::default(),
        }
    }
}

impl DownloadSettings {
    /// Whether the entry with display index `index` should be downloaded
    pub fn selects(&self, index: usize) -> bool {
        self.enabled
            && self
                .selection
                .as_ref()
                .is_none_or(|spec| spec.contains_index(index))
    }
}

/// Path for the `ordinal`-th (1-based) primary link of an entry
pub fn target_path(output_dir: &Path, basename: &str, ordinal: usize) -> PathBuf {
    if ordinal > 1 {
        output_dir.join(format!("{}--{}.pdf", basename, ordinal))
    } else {
        output_dir.join(format!("{}.pdf", basename))
    }
}

/// Result of one link
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadOutcome {
    /// Fetched and carries the PDF signature
    Saved { path: PathBuf, bytes: u64 },
    /// Fetch failed; the link was skipped
    Failed {
        url: String,
        path: PathBuf,
        error: String,
    },
    /// Not a PDF, deleted
    Removed { path: PathBuf },
    /// Not a PDF, left in place
    KeptInvalid { path: PathBuf },
}

impl DownloadOutcome {
    pub fn path(&self) -> &Path {
        match self {
            DownloadOutcome::Saved { path, .. }
            | DownloadOutcome::Failed { path, .. }
            | DownloadOutcome::Removed { path }
            | DownloadOutcome::KeptInvalid { path } => path,
        }
    }
}

/// Counts of outcomes over the run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DownloadSummary {
    pub entries: usize,
    pub saved: usize,
    pub failed: usize,
    pub removed: usize,
    pub kept_invalid: usize,
}

impl DownloadSummary {
    fn record(&mut self, outcome: &DownloadOutcome) {
        match outcome {
            DownloadOutcome::Saved { .. } => self.saved += 1,
            DownloadOutcome::Failed { .. } => self.failed += 1,
            DownloadOutcome::Removed { .. } => self.removed += 1,
            DownloadOutcome::KeptInvalid { .. } => self.kept_invalid += 1,
        }
    }

    /// Number of links attempted
    pub fn attempted(&self) -> usize {
        self.saved + self.failed + self.removed + self.kept_invalid
    }
}

impl fmt::Display for DownloadSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} entries, {} links: {} saved, {} failed, {} non-pdf removed, {} non-pdf kept",
            self.entries,
            self.attempted(),
            self.saved,
            self.failed,
            self.removed,
            self.kept_invalid
        )
    }
}

/// Fetches, names and validates the files of selected entries
pub struct DownloadManager {
    settings: DownloadSettings,
    transport: Arc<dyn Transport>,
    operator: Box<dyn Operator>,
    summary: DownloadSummary,
}

impl fmt::Debug for DownloadManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DownloadManager")
            .field("settings", &self.settings)
            .field("transport", &self.transport)
            .field("summary", &self.summary)
            .finish_non_exhaustive()
    }
}

impl DownloadManager {
    pub fn new(
        settings: DownloadSettings,
        transport: Arc<dyn Transport>,
        operator: Box<dyn Operator>,
    ) -> Self {
        Self {
            settings,
            transport,
            operator,
            summary: DownloadSummary::default(),
        }
    }

    pub fn summary(&self) -> DownloadSummary {
        self.summary
    }

    /// File basename (without `.pdf`) for an entry
    pub fn basename(&self, item: &FilteredEntry) -> String {
        self.settings
            .template
            .render(&TemplateFields::from_entry(&item.entry))
    }

    /// Download every primary link of `item` if it is selected.
    ///
    /// Returns one outcome per attempted link; unselected entries yield none.
    pub async fn process(
        &mut self,
        item: &FilteredEntry,
    ) -> Result<Vec<DownloadOutcome>, DownloadError> {
        if !self.settings.selects(item.index) {
            return Ok(Vec::new());
        }

        self.summary.entries += 1;
        let basename = self.basename(item);
        let mut outcomes = Vec::new();

        for (offset, url) in item.entry.primary_links().enumerate() {
            let path = target_path(&self.settings.output_dir, &basename, offset + 1);
            let outcome = self.fetch_one(&item.entry.id, url, path).await?;
            self.summary.record(&outcome);
            outcomes.push(outcome);
        }

        Ok(outcomes)
    }

    async fn fetch_one(
        &mut self,
        entry_id: &str,
        url: &str,
        path: PathBuf,
    ) -> Result<DownloadOutcome, DownloadError> {
        tracing::debug!("fetching {} to {}", url, path.display());

        let bytes = match self.transport.fetch(url, &path).await {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::error!(entry = %entry_id, link = %url, "{}: {}", DOWNLOAD_FAIL_HINT, e);
                return Ok(DownloadOutcome::Failed {
                    url: url.to_string(),
                    path,
                    error: e.to_string(),
                });
            }
        };

        self.validate(path, bytes)
    }

    /// Signature check and disposition of a freshly fetched file
    fn validate(&mut self, path: PathBuf, bytes: u64) -> Result<DownloadOutcome, DownloadError> {
        let is_pdf = has_pdf_signature(&path).map_err(|source| DownloadError::Filesystem {
            path: path.clone(),
            source,
        })?;

        if is_pdf {
            tracing::info!("saved {} ({} bytes)", path.display(), bytes);
            return Ok(DownloadOutcome::Saved { path, bytes });
        }

        let disposition = disposition::decide(self.settings.policy, &path, self.operator.as_mut())
            .map_err(|source| DownloadError::Operator {
                path: path.clone(),
                source,
            })?;

        match disposition {
            Disposition::Remove => {
                std::fs::remove_file(&path).map_err(|source| DownloadError::Filesystem {
                    path: path.clone(),
                    source,
                })?;
                tracing::info!("removed non-pdf file {}", path.display());
                Ok(DownloadOutcome::Removed { path })
            }
            Disposition::Keep => {
                tracing::warn!("kept non-pdf file {}", path.display());
                Ok(DownloadOutcome::KeptInvalid { path })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EntryBuilder, Link};
    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};
    use std::collections::HashMap;
    use std::sync::Mutex;
    use tempfile::tempdir;

    /// Serves canned bodies per URL; unknown URLs fail
    #[derive(Debug, Default)]
    struct FakeTransport {
        bodies: HashMap<String, Vec<u8>>,
        requested: Mutex<Vec<(String, PathBuf)>>,
    }

    impl FakeTransport {
        fn with(mut self, url: &str, body: &[u8]) -> Self {
            self.bodies.insert(url.to_string(), body.to_vec());
            self
        }

        fn requested(&self) -> Vec<(String, PathBuf)> {
            self.requested.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Transport for FakeTransport {
        async fn fetch(&self, url: &str, path: &Path) -> Result<u64, TransportError> {
            self.requested
                .lock()
                .unwrap()
                .push((url.to_string(), path.to_path_buf()));
            match self.bodies.get(url) {
                Some(body) => {
                    std::fs::write(path, body).unwrap();
                    Ok(body.len() as u64)
                }
                None => Err(TransportError::Status {
                    url: url.to_string(),
                    status: 404,
                }),
            }
        }
    }

    fn item(index: usize, links: &[&str]) -> FilteredEntry {
        let mut builder = EntryBuilder::new(
            "2309.06314",
            "Quantum Stuff",
            Utc.with_ymd_and_hms(2023, 9, 12, 0, 0, 0).unwrap(),
        )
        .author("Art Ficial")
        .link(Link::other("http://arxiv.org/abs/2309.06314"));
        for link in links {
            builder = builder.link(Link::primary(*link));
        }
        FilteredEntry {
            index,
            entry: builder.build(),
        }
    }

    fn settings(dir: &Path, policy: NonPdfPolicy) -> DownloadSettings {
        DownloadSettings {
            enabled: true,
            selection: None,
            output_dir: dir.to_path_buf(),
            template: FilenameTemplate::parse("X").unwrap(),
            policy,
        }
    }

    fn manager(
        settings: DownloadSettings,
        transport: Arc<FakeTransport>,
        answers: &[&str],
    ) -> DownloadManager {
        DownloadManager::new(
            settings,
            transport,
            Box::new(ScriptedOperator::new(answers.iter().copied())),
        )
    }

    #[test]
    fn test_target_path() {
        let dir = Path::new("out");
        assert_eq!(target_path(dir, "X", 1), PathBuf::from("out/X.pdf"));
        assert_eq!(target_path(dir, "X", 2), PathBuf::from("out/X--2.pdf"));
        assert_eq!(target_path(dir, "X", 3), PathBuf::from("out/X--3.pdf"));
    }

    #[test]
    fn test_selection() {
        let mut s = DownloadSettings {
            enabled: true,
            ..Default::default()
        };
        assert!(s.selects(1));
        assert!(s.selects(99));

        s.selection = Some(RangeSpec::parse("2,4-5").unwrap());
        assert!(!s.selects(1));
        assert!(s.selects(2));
        assert!(s.selects(5));

        s.enabled = false;
        assert!(!s.selects(2));
    }

    #[test]
    fn test_basename_uses_template() {
        let transport = Arc::new(FakeTransport::default());
        let mut s = settings(Path::new("."), NonPdfPolicy::AutoKeep);
        s.template = FilenameTemplate::default();
        let m = manager(s, transport, &[]);
        assert_eq!(
            m.basename(&item(1, &[])),
            "2023-Art_Ficial-Quantum_Stuff-2309.06314"
        );
    }

    #[tokio::test]
    async fn test_multiple_links_get_suffixes() {
        let dir = tempdir().unwrap();
        let transport = Arc::new(
            FakeTransport::default()
                .with("http://a/1", b"%PDF-1.4 one")
                .with("http://a/2", b"%PDF-1.4 two"),
        );
        let mut m = manager(
            settings(dir.path(), NonPdfPolicy::Prompt),
            transport.clone(),
            &[],
        );

        let outcomes = m.process(&item(1, &["http://a/1", "http://a/2"])).await.unwrap();

        let paths: Vec<PathBuf> = outcomes.iter().map(|o| o.path().to_path_buf()).collect();
        assert_eq!(
            paths,
            vec![dir.path().join("X.pdf"), dir.path().join("X--2.pdf")]
        );
        assert!(outcomes
            .iter()
            .all(|o| matches!(o, DownloadOutcome::Saved { .. })));
        assert_eq!(std::fs::read(dir.path().join("X--2.pdf")).unwrap(), b"%PDF-1.4 two");
        assert_eq!(transport.requested().len(), 2);
    }

    #[tokio::test]
    async fn test_failed_link_does_not_stop_siblings() {
        let dir = tempdir().unwrap();
        let transport = Arc::new(FakeTransport::default().with("http://a/2", b"%PDF-1.4"));
        let mut m = manager(
            settings(dir.path(), NonPdfPolicy::Prompt),
            transport.clone(),
            &[],
        );

        let outcomes = m.process(&item(1, &["http://a/1", "http://a/2"])).await.unwrap();

        assert_eq!(outcomes.len(), 2);
        assert!(matches!(&outcomes[0], DownloadOutcome::Failed { url, .. } if url == "http://a/1"));
        // the ordinal advances even though the first link failed
        assert_eq!(
            outcomes[1],
            DownloadOutcome::Saved {
                path: dir.path().join("X--2.pdf"),
                bytes: 8
            }
        );
        assert!(!dir.path().join("X.pdf").exists());
        assert_eq!(m.summary().failed, 1);
        assert_eq!(m.summary().saved, 1);
    }

    #[tokio::test]
    async fn test_pdf_never_removed() {
        for policy in [
            NonPdfPolicy::Prompt,
            NonPdfPolicy::AutoRemove,
            NonPdfPolicy::AutoKeep,
        ] {
            let dir = tempdir().unwrap();
            let transport = Arc::new(FakeTransport::default().with("http://a/1", b"%PDF-1.7"));
            let mut m = manager(settings(dir.path(), policy), transport, &[]);

            let outcomes = m.process(&item(1, &["http://a/1"])).await.unwrap();

            assert!(matches!(outcomes[0], DownloadOutcome::Saved { .. }));
            assert!(dir.path().join("X.pdf").exists(), "{:?}", policy);
        }
    }

    #[tokio::test]
    async fn test_auto_remove_deletes_invalid() {
        let dir = tempdir().unwrap();
        let transport = Arc::new(FakeTransport::default().with("http://a/1", b"<html>withdrawn"));
        let mut m = manager(settings(dir.path(), NonPdfPolicy::AutoRemove), transport, &[]);

        let outcomes = m.process(&item(1, &["http://a/1"])).await.unwrap();

        assert_eq!(
            outcomes,
            vec![DownloadOutcome::Removed {
                path: dir.path().join("X.pdf")
            }]
        );
        assert!(!dir.path().join("X.pdf").exists());
    }

    #[tokio::test]
    async fn test_auto_keep_keeps_invalid() {
        let dir = tempdir().unwrap();
        let transport = Arc::new(FakeTransport::default().with("http://a/1", b"<html>withdrawn"));
        let mut m = manager(settings(dir.path(), NonPdfPolicy::AutoKeep), transport, &[]);

        let outcomes = m.process(&item(1, &["http://a/1"])).await.unwrap();

        assert!(matches!(outcomes[0], DownloadOutcome::KeptInvalid { .. }));
        assert!(dir.path().join("X.pdf").exists());
        assert_eq!(m.summary().kept_invalid, 1);
    }

    #[tokio::test]
    async fn test_prompt_answers() {
        for (answers, removed) in [
            (vec!["y"], true),
            (vec![""], true),
            (vec!["YES"], true),
            (vec!["n"], false),
            (vec!["huh", "no"], false),
            (vec!["?", "??", "y"], true),
        ] {
            let dir = tempdir().unwrap();
            let transport =
                Arc::new(FakeTransport::default().with("http://a/1", b"<html>withdrawn"));
            let mut m = manager(settings(dir.path(), NonPdfPolicy::Prompt), transport, &answers);

            m.process(&item(1, &["http://a/1"])).await.unwrap();

            assert_eq!(
                !dir.path().join("X.pdf").exists(),
                removed,
                "answers {:?}",
                answers
            );
        }
    }

    #[tokio::test]
    async fn test_prompt_end_of_input_is_fatal() {
        let dir = tempdir().unwrap();
        let transport = Arc::new(FakeTransport::default().with("http://a/1", b"<html>"));
        let mut m = manager(settings(dir.path(), NonPdfPolicy::Prompt), transport, &[]);

        let result = m.process(&item(1, &["http://a/1"])).await;

        assert!(matches!(result, Err(DownloadError::Operator { .. })));
    }

    #[tokio::test]
    async fn test_unselected_entry_is_untouched() {
        let dir = tempdir().unwrap();
        let transport = Arc::new(FakeTransport::default().with("http://a/1", b"%PDF"));
        let mut s = settings(dir.path(), NonPdfPolicy::Prompt);
        s.selection = Some(RangeSpec::parse("2").unwrap());
        let mut m = manager(s, transport.clone(), &[]);

        let outcomes = m.process(&item(1, &["http://a/1"])).await.unwrap();

        assert!(outcomes.is_empty());
        assert!(transport.requested().is_empty());
        assert_eq!(m.summary(), DownloadSummary::default());
    }

    #[tokio::test]
    async fn test_disabled_downloads() {
        let dir = tempdir().unwrap();
        let transport = Arc::new(FakeTransport::default().with("http://a/1", b"%PDF"));
        let mut s = settings(dir.path(), NonPdfPolicy::Prompt);
        s.enabled = false;
        let mut m = manager(s, transport.clone(), &[]);

        assert!(m.process(&item(1, &["http://a/1"])).await.unwrap().is_empty());
        assert!(transport.requested().is_empty());
    }

    #[test]
    fn test_summary_display() {
        let summary = DownloadSummary {
            entries: 2,
            saved: 2,
            failed: 1,
            removed: 1,
            kept_invalid: 0,
        };
        assert_eq!(
            summary.to_string(),
            "2 entries, 4 links: 2 saved, 1 failed, 1 non-pdf removed, 0 non-pdf kept"
        );
    }
}
