//! Text Extractor: dispatches each candidate to its format backend.
//!
//! Nothing raised by a backend escapes `TextExtractor::extract`: every candidate ends as
//! an `ExtractOutcome`, and the caller applies a `SelectionPolicy` over the sequence.

pub mod doc;
pub mod docx;
pub mod pdf;

use std::ops::ControlFlow;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::errors::ErrorKind;
use crate::ingest::format::{classify, CandidateFile, DocumentKind};

use self::doc::{DocConvertError, LegacyDocConverter};
use self::pdf::PdfReader;

/// Per-file cap on text returned in collect-all mode.
pub const BATCH_TEXT_LIMIT: usize = 10_000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractionResult {
    pub source_path: PathBuf,
    pub raw_text: String,
    pub truncated: bool,
}

/// What happened to one candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractOutcome {
    Extracted(ExtractionResult),
    Skipped {
        path: PathBuf,
        kind: ErrorKind,
        reason: String,
    },
}

impl ExtractOutcome {
    fn skipped(path: &Path, kind: ErrorKind, reason: impl Into<String>) -> Self {
        ExtractOutcome::Skipped {
            path: path.to_path_buf(),
            kind,
            reason: reason.into(),
        }
    }
}

/// How results across candidates are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionPolicy {
    /// Stop at the first candidate whose text is not blank.
    FirstNonEmpty,
    /// Keep every successful extraction, each capped at `max_chars` characters.
    CollectAll { max_chars: usize },
}

impl SelectionPolicy {
    pub fn collect_all() -> Self {
        SelectionPolicy::CollectAll {
            max_chars: BATCH_TEXT_LIMIT,
        }
    }

    /// Feeds one outcome into `selected`. `Break` means no further candidate is needed.
    pub fn offer(
        &self,
        outcome: ExtractOutcome,
        selected: &mut Vec<ExtractionResult>,
    ) -> ControlFlow<()> {
        let result = match outcome {
            ExtractOutcome::Extracted(result) => result,
            ExtractOutcome::Skipped { path, kind, reason } => {
                warn!(kind = ?kind, "Skipping {}: {reason}", path.display());
                return ControlFlow::Continue(());
            }
        };

        match *self {
            SelectionPolicy::FirstNonEmpty => {
                if result.raw_text.trim().is_empty() {
                    debug!("No text in {}; trying next candidate", result.source_path.display());
                    ControlFlow::Continue(())
                } else {
                    selected.push(result);
                    ControlFlow::Break(())
                }
            }
            SelectionPolicy::CollectAll { max_chars } => {
                selected.push(truncate_chars(result, max_chars));
                ControlFlow::Continue(())
            }
        }
    }

    /// Runs the policy over an in-memory sequence of outcomes.
    pub fn select<I>(&self, outcomes: I) -> Vec<ExtractionResult>
    where
        I: IntoIterator<Item = ExtractOutcome>,
    {
        let mut selected = Vec::new();
        for outcome in outcomes {
            if self.offer(outcome, &mut selected).is_break() {
                break;
            }
        }
        selected
    }
}

fn truncate_chars(mut result: ExtractionResult, max_chars: usize) -> ExtractionResult {
    if let Some((cut, _)) = result.raw_text.char_indices().nth(max_chars) {
        result.raw_text.truncate(cut);
        result.truncated = true;
    }
    result
}

/// The leaf files of a working area, in sorted traversal order.
///
/// Iteration is lazy and the walk can be restarted by iterating again.
#[derive(Debug, Clone)]
pub struct CandidateWalk {
    root: PathBuf,
}

impl CandidateWalk {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl IntoIterator for &CandidateWalk {
    type Item = PathBuf;
    type IntoIter = Box<dyn Iterator<Item = PathBuf>>;

    fn into_iter(self) -> Self::IntoIter {
        Box::new(
            WalkDir::new(&self.root)
                .sort_by_file_name()
                .into_iter()
                .filter_map(Result::ok)
                .filter(|e| e.file_type().is_file())
                .map(|e| e.into_path()),
        )
    }
}

/// Format dispatch plus the pluggable backends it dispatches to.
pub struct TextExtractor {
    pdf: Arc<dyn PdfReader>,
    legacy_doc: Arc<dyn LegacyDocConverter>,
}

impl TextExtractor {
    pub fn new(pdf: Arc<dyn PdfReader>, legacy_doc: Arc<dyn LegacyDocConverter>) -> Self {
        Self { pdf, legacy_doc }
    }

    /// Sniffs, classifies and extracts one file.
    pub fn extract_path(&self, path: &Path) -> ExtractOutcome {
        let candidate = CandidateFile::inspect(path);
        let kind = classify(&candidate);
        debug!(
            "Candidate {} (mime: {:?}, suffix: {:?}) -> {kind:?}",
            candidate.path.display(),
            candidate.detected_mime,
            candidate.suffix
        );
        self.extract(&candidate, kind)
    }

    pub fn extract(&self, candidate: &CandidateFile, kind: DocumentKind) -> ExtractOutcome {
        let path = candidate.path.as_path();

        let text = match kind {
            DocumentKind::Unsupported => {
                return ExtractOutcome::skipped(
                    path,
                    ErrorKind::UnsupportedFormat,
                    "not a PDF, DOCX or DOC document",
                );
            }
            DocumentKind::Pdf => std::fs::read(path)
                .map_err(|e| format!("Failed to read PDF file: {e}"))
                .and_then(|bytes| self.pdf.pages(&bytes).map_err(|e| e.to_string()))
                .map(pdf::join_pages),
            DocumentKind::Docx => std::fs::read(path)
                .map_err(|e| format!("Failed to read DOCX file: {e}"))
                .and_then(|bytes| docx::extract_paragraphs(&bytes)),
            DocumentKind::Doc => match self.legacy_doc.convert(path) {
                Err(DocConvertError::Unavailable) => {
                    return ExtractOutcome::skipped(
                        path,
                        ErrorKind::ExtractionFailed,
                        "legacy .doc converter not installed",
                    );
                }
                other => other.map_err(|e| e.to_string()),
            },
        };

        match text {
            Ok(raw_text) => {
                debug!("Extracted {} chars from {}", raw_text.chars().count(), path.display());
                ExtractOutcome::Extracted(ExtractionResult {
                    source_path: path.to_path_buf(),
                    raw_text,
                    truncated: false,
                })
            }
            Err(reason) => ExtractOutcome::skipped(path, ErrorKind::ExtractionFailed, reason),
        }
    }
}
