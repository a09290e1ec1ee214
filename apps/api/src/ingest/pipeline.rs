//! Ingest pipeline: Resolver → Fetcher → Expander → {Classifier → Extractor}.
//!
//! # Execution model
//! One request runs its stages strictly in sequence; batch links run one at a time in
//! input order. Blocking work (archive expansion, directory walks, document parsing)
//! goes through `tokio::task::spawn_blocking` so the executor stays free, and both
//! retrieval and per-file extraction are bounded by timeouts. A timed-out extraction
//! is abandoned, not cancelled: the blocking thread finishes on its own.
//!
//! Every request owns one `WorkingArea`. It is released on the blocking pool when the
//! request finishes; if the request future is dropped first, the area's `Drop` removes it.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::errors::ErrorKind;
use crate::ingest::archive::{self, ArchiveLimits};
use crate::ingest::extract::{
    CandidateWalk, ExtractOutcome, ExtractionResult, SelectionPolicy, TextExtractor,
};
use crate::ingest::fetch::{self, ContentFetcher, FetchError};
use crate::ingest::link::{self, LinkError, RetrievalTarget};
use crate::ingest::workspace::WorkingArea;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Unresolvable(#[from] LinkError),

    #[error(transparent)]
    Retrieval(#[from] FetchError),

    #[error("working area error: {0}")]
    Workspace(#[from] std::io::Error),

    #[error("background task failed: {0}")]
    Task(String),
}

impl PipelineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Unresolvable(e) => e.kind(),
            Self::Retrieval(e) => e.kind(),
            Self::Workspace(_) => ErrorKind::RetrievalFailed,
            Self::Task(_) => ErrorKind::ExtractionFailed,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PipelineLimits {
    pub fetch_timeout: Duration,
    pub extract_timeout: Duration,
    pub archive: ArchiveLimits,
    /// Parent directory for working areas; `None` uses the system temp dir.
    pub work_dir: Option<PathBuf>,
}

impl Default for PipelineLimits {
    fn default() -> Self {
        Self {
            fetch_timeout: Duration::from_secs(120),
            extract_timeout: Duration::from_secs(60),
            archive: ArchiveLimits::default(),
            work_dir: None,
        }
    }
}

/// One row of a batch response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResumeRecord {
    pub source_file: String,
    pub resume_text: String,
}

pub struct Pipeline {
    fetcher: Arc<dyn ContentFetcher>,
    extractor: Arc<TextExtractor>,
    limits: PipelineLimits,
}

impl Pipeline {
    pub fn new(
        fetcher: Arc<dyn ContentFetcher>,
        extractor: Arc<TextExtractor>,
        limits: PipelineLimits,
    ) -> Self {
        Self {
            fetcher,
            extractor,
            limits,
        }
    }

    /// Single-link mode: the first non-empty document text, or `None` when nothing in
    /// the retrieved content yields text. Resolution and retrieval failures are errors.
    pub async fn process_single(&self, reference: &str) -> Result<Option<String>, PipelineError> {
        let target = link::resolve(reference)?;
        let area = WorkingArea::open(self.limits.work_dir.clone()).await?;
        let result = self.single_in(&area, &target).await;
        area.release().await;
        result
    }

    async fn single_in(
        &self,
        area: &WorkingArea,
        target: &RetrievalTarget,
    ) -> Result<Option<String>, PipelineError> {
        let dest = area.target_dir(&target.id).await?;

        fetch::retrieve(
            self.fetcher.as_ref(),
            target,
            &dest,
            self.limits.fetch_timeout,
        )
        .await?;

        let selected = self
            .extract_from(&dest, SelectionPolicy::FirstNonEmpty)
            .await?;
        Ok(selected.into_iter().next().map(|r| r.raw_text))
    }

    /// Batch mode: every extracted document from every resolvable, retrievable link.
    /// A link that fails at any stage is logged and skipped; only a working area that
    /// cannot be created fails the batch.
    pub async fn process_batch(
        &self,
        references: &[String],
    ) -> Result<Vec<ResumeRecord>, PipelineError> {
        let area = WorkingArea::open(self.limits.work_dir.clone()).await?;
        let mut records = Vec::new();

        for (idx, reference) in references.iter().enumerate() {
            info!("Processing link {}/{}: {reference}", idx + 1, references.len());
            match self.batch_link(&area, reference).await {
                Ok(found) => records.extend(found),
                Err(e) => warn!(kind = ?e.kind(), "Skipping {reference}: {e}"),
            }
        }

        area.release().await;
        Ok(records)
    }

    async fn batch_link(
        &self,
        area: &WorkingArea,
        reference: &str,
    ) -> Result<Vec<ResumeRecord>, PipelineError> {
        let target = link::resolve(reference)?;
        let dest = area.target_dir(&target.id).await?;
        fetch::retrieve(
            self.fetcher.as_ref(),
            &target,
            &dest,
            self.limits.fetch_timeout,
        )
        .await?;

        let selected = self
            .extract_from(&dest, SelectionPolicy::collect_all())
            .await?;
        Ok(selected
            .into_iter()
            .map(|r| ResumeRecord {
                source_file: area.display_path(&r.source_path),
                resume_text: r.raw_text,
            })
            .collect())
    }

    /// Expands archives under `dir`, then runs the extractor over its leaf files.
    async fn extract_from(
        &self,
        dir: &Path,
        policy: SelectionPolicy,
    ) -> Result<Vec<ExtractionResult>, PipelineError> {
        let root = dir.to_path_buf();
        let archive_limits = self.limits.archive;
        let candidates = tokio::task::spawn_blocking(move || {
            archive::expand_all(&root, archive_limits);
            CandidateWalk::new(&root).into_iter().collect::<Vec<_>>()
        })
        .await
        .map_err(|e| PipelineError::Task(format!("archive expansion failed: {e}")))?;

        let mut selected = Vec::new();
        for path in candidates {
            let outcome = self.extract_one(path).await;
            if policy.offer(outcome, &mut selected).is_break() {
                break;
            }
        }
        Ok(selected)
    }

    async fn extract_one(&self, path: PathBuf) -> ExtractOutcome {
        let extractor = Arc::clone(&self.extractor);
        let task_path = path.clone();
        let task = tokio::task::spawn_blocking(move || extractor.extract_path(&task_path));

        match tokio::time::timeout(self.limits.extract_timeout, task).await {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(join_err)) => ExtractOutcome::Skipped {
                path,
                kind: ErrorKind::ExtractionFailed,
                reason: format!("extraction task failed: {join_err}"),
            },
            Err(_) => ExtractOutcome::Skipped {
                path,
                kind: ErrorKind::ExtractionFailed,
                reason: format!(
                    "extraction timed out after {:?}",
                    self.limits.extract_timeout
                ),
            },
        }
    }
}
