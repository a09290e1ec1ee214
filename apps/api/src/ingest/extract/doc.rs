use std::path::{Path, PathBuf};
use std::process::Command;

use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum DocConvertError {
    #[error("no legacy .doc converter installed")]
    Unavailable,

    #[error("failed to run converter: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("converter exited with {status}: {stderr}")]
    Failed { status: String, stderr: String },
}

/// External capability that turns a legacy binary Word file into text.
pub trait LegacyDocConverter: Send + Sync {
    fn convert(&self, path: &Path) -> Result<String, DocConvertError>;
}

/// `antiword`, resolved once at startup.
pub struct AntiwordConverter {
    binary: Option<PathBuf>,
}

impl AntiwordConverter {
    /// Uses `explicit` when given, otherwise looks `antiword` up on `PATH`.
    pub fn locate(explicit: Option<PathBuf>) -> Self {
        let binary = explicit.or_else(|| which::which("antiword").ok());
        match &binary {
            Some(path) => info!("Legacy .doc support via {}", path.display()),
            None => info!("antiword not found; legacy .doc files will be skipped"),
        }
        Self { binary }
    }
}

impl LegacyDocConverter for AntiwordConverter {
    fn convert(&self, path: &Path) -> Result<String, DocConvertError> {
        let binary = self.binary.as_ref().ok_or(DocConvertError::Unavailable)?;

        let output = Command::new(binary).arg("-w").arg("0").arg(path).output()?;
        if !output.status.success() {
            return Err(DocConvertError::Failed {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_binary_reports_unavailable() {
        let converter = AntiwordConverter { binary: None };
        assert!(matches!(
            converter.convert(Path::new("cv.doc")),
            Err(DocConvertError::Unavailable)
        ));
    }

    #[test]
    fn test_nonexistent_binary_is_spawn_error() {
        let converter = AntiwordConverter::locate(Some(PathBuf::from("/nonexistent/antiword")));
        assert!(matches!(
            converter.convert(Path::new("cv.doc")),
            Err(DocConvertError::Spawn(_))
        ));
    }
}
