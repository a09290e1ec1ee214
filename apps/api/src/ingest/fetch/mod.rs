//! Content Fetcher: pulls remote content into a WorkingArea directory.
//!
//! `ContentFetcher` is the pluggable backend (`DriveFetcher` in production, fakes in
//! tests). `retrieve` owns the retrieval policy: folder listing first, single-file
//! download on any failure, each strategy bounded by a timeout.

pub mod drive;

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{info, warn};

use crate::errors::ErrorKind;
use crate::ingest::link::RetrievalTarget;

pub use drive::DriveFetcher;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("remote returned status {status}")]
    Status { status: u16 },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("folder listing unavailable: {0}")]
    FolderListing(String),

    #[error("folder contains no files")]
    EmptyFolder,

    #[error("remote answered with a web page instead of file content")]
    NotDownloadable,

    #[error("download exceeds {limit} bytes")]
    TooLarge { limit: u64 },

    #[error("timed out after {0:?}")]
    Timeout(Duration),

    #[error("folder retrieval failed ({folder}); file retrieval failed ({file})")]
    BothStrategiesFailed { folder: String, file: String },
}

impl FetchError {
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::RetrievalFailed
    }
}

/// A retrieval backend. Implementations write into `dest`, which already exists.
#[async_trait]
pub trait ContentFetcher: Send + Sync {
    /// Downloads every file of the folder `id`. Returns the number of files written.
    async fn fetch_folder(&self, id: &str, dest: &Path) -> Result<usize, FetchError>;

    /// Downloads the single file `id`. Returns the written path.
    async fn fetch_file(&self, id: &str, dest: &Path) -> Result<PathBuf, FetchError>;
}

/// Folder-style bulk retrieval, falling back to single-file retrieval with the same id.
/// Only fails when both strategies fail. There is no retry beyond that one fallback at
/// this level; transient HTTP errors are retried inside the backend.
pub async fn retrieve(
    fetcher: &dyn ContentFetcher,
    target: &RetrievalTarget,
    dest: &Path,
    step_timeout: Duration,
) -> Result<(), FetchError> {
    let folder_err = match tokio::time::timeout(step_timeout, fetcher.fetch_folder(&target.id, dest))
        .await
    {
        Ok(Ok(count)) if count > 0 => {
            info!("Fetched {count} file(s) from folder {}", target.id);
            return Ok(());
        }
        Ok(Ok(_)) => FetchError::EmptyFolder,
        Ok(Err(e)) => e,
        Err(_) => FetchError::Timeout(step_timeout),
    };
    warn!(
        "Folder retrieval failed for {}: {folder_err}; trying single file",
        target.id
    );

    match tokio::time::timeout(step_timeout, fetcher.fetch_file(&target.id, dest)).await {
        Ok(Ok(path)) => {
            info!("Fetched file {} -> {}", target.id, path.display());
            Ok(())
        }
        Ok(Err(file_err)) => Err(FetchError::BothStrategiesFailed {
            folder: folder_err.to_string(),
            file: file_err.to_string(),
        }),
        Err(_) => Err(FetchError::BothStrategiesFailed {
            folder: folder_err.to_string(),
            file: FetchError::Timeout(step_timeout).to_string(),
        }),
    }
}
