//! WorkingArea: the per-request scratch directory.
//!
//! Created before retrieval, owned by exactly one request, and removed recursively.
//! Async callers go through `open`/`target_dir`/`release` so no filesystem call runs on
//! the executor; `Drop` still removes the area synchronously if `release` was never
//! reached (early return, cancellation, panic unwind).

use std::io;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tracing::{debug, warn};

const AREA_PREFIX: &str = "resume_dl_";

#[derive(Debug)]
pub struct WorkingArea {
    dir: Option<TempDir>,
    root: PathBuf,
}

impl WorkingArea {
    /// Creates a fresh, uniquely named directory under `parent` (or the system temp dir).
    pub fn create(parent: Option<&Path>) -> io::Result<Self> {
        let mut builder = tempfile::Builder::new();
        builder.prefix(AREA_PREFIX);
        let dir = match parent {
            Some(parent) => {
                std::fs::create_dir_all(parent)?;
                builder.tempdir_in(parent)?
            }
            None => builder.tempdir()?,
        };
        let root = dir.path().to_path_buf();
        debug!("Working area created at {}", root.display());
        Ok(Self {
            dir: Some(dir),
            root,
        })
    }

    /// `create` on the blocking pool.
    pub async fn open(parent: Option<PathBuf>) -> io::Result<Self> {
        tokio::task::spawn_blocking(move || Self::create(parent.as_deref()))
            .await
            .map_err(io::Error::other)?
    }

    pub fn path(&self) -> &Path {
        &self.root
    }

    /// Creates the download directory for one retrieval id. A repeated id within the same
    /// request gets a numbered sibling so two links never share a directory.
    pub async fn target_dir(&self, id: &str) -> io::Result<PathBuf> {
        let mut n = 1;
        loop {
            let candidate = match n {
                1 => self.root.join(id),
                _ => self.root.join(format!("{id}-{n}")),
            };
            match tokio::fs::create_dir(&candidate).await {
                Ok(()) => return Ok(candidate),
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => n += 1,
                Err(e) => return Err(e),
            }
        }
    }

    /// Removes the area on the blocking pool.
    pub async fn release(mut self) {
        let Some(dir) = self.dir.take() else {
            return;
        };
        let root = self.root.clone();
        match tokio::task::spawn_blocking(move || dir.close()).await {
            Ok(Ok(())) => debug!("Working area removed: {}", root.display()),
            Ok(Err(e)) => warn!("Failed to remove working area {}: {e}", root.display()),
            Err(e) => warn!("Working area cleanup task failed for {}: {e}", root.display()),
        }
    }

    /// Path of `path` relative to the area root, for reporting back to clients.
    pub fn display_path(&self, path: &Path) -> String {
        path.strip_prefix(&self.root)
            .unwrap_or(path)
            .to_string_lossy()
            .replace('\\', "/")
    }
}

impl Drop for WorkingArea {
    fn drop(&mut self) {
        if let Some(dir) = self.dir.take() {
            if let Err(e) = dir.close() {
                warn!("Failed to remove working area {}: {e}", self.root.display());
            } else {
                debug!("Working area removed: {}", self.root.display());
            }
        }
    }
}
