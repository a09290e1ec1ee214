//! Role prediction over normalized resume text.
//!
//! The model is an opaque collaborator: the request path only ever sees a label
//! or the `UNAVAILABLE_LABEL` sentinel, never an error.

pub mod linear;

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::Path;
use std::sync::Arc;

use thiserror::Error;
use tracing::{info, warn};

use crate::errors::ErrorKind;

pub use linear::LinearRoleModel;

/// Reported as the role whenever no prediction could be made.
pub const UNAVAILABLE_LABEL: &str = "Unavailable";

#[derive(Debug, Error)]
pub enum ClassifierError {
    #[error("failed to read role model {path}: {source}")]
    Load {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("role model is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("role model is invalid: {0}")]
    Invalid(String),

    #[error("prediction failed: {0}")]
    Prediction(String),
}

/// Implement this to plug in a different model backend.
pub trait RoleClassifier: Send + Sync {
    fn predict(&self, text: &str) -> Result<String, ClassifierError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassificationOutcome {
    pub predicted_label: Option<String>,
    pub error: Option<ErrorKind>,
}

impl ClassificationOutcome {
    fn unavailable() -> Self {
        Self {
            predicted_label: None,
            error: Some(ErrorKind::ClassificationUnavailable),
        }
    }

    pub fn label_or_sentinel(&self) -> String {
        self.predicted_label
            .clone()
            .unwrap_or_else(|| UNAVAILABLE_LABEL.to_string())
    }
}

/// Role prediction as configured at startup.
#[derive(Clone)]
pub enum RoleClassifierHandle {
    Ready(Arc<dyn RoleClassifier>),
    /// Configured but failed to load; every call yields the sentinel.
    Unavailable { reason: String },
}

impl RoleClassifierHandle {
    /// Loads the JSON linear model at `path`. A bad model is logged, not fatal.
    pub fn load(path: &Path) -> Self {
        match LinearRoleModel::from_path(path) {
            Ok(model) => {
                info!(
                    "Role model loaded from {} ({} labels)",
                    path.display(),
                    model.labels().len()
                );
                Self::Ready(Arc::new(model))
            }
            Err(e) => {
                warn!(kind = ?ErrorKind::ClassificationUnavailable, "Role model unavailable: {e}");
                Self::Unavailable {
                    reason: e.to_string(),
                }
            }
        }
    }

    pub fn classify(&self, text: &str) -> ClassificationOutcome {
        let model = match self {
            Self::Ready(model) => model,
            Self::Unavailable { reason } => {
                warn!(kind = ?ErrorKind::ClassificationUnavailable, "Skipping prediction: {reason}");
                return ClassificationOutcome::unavailable();
            }
        };

        match catch_unwind(AssertUnwindSafe(|| model.predict(text))) {
            Ok(Ok(label)) => ClassificationOutcome {
                predicted_label: Some(label),
                error: None,
            },
            Ok(Err(e)) => {
                warn!(kind = ?ErrorKind::ClassificationUnavailable, "Role prediction failed: {e}");
                ClassificationOutcome::unavailable()
            }
            Err(_) => {
                warn!(kind = ?ErrorKind::ClassificationUnavailable, "Role model panicked");
                ClassificationOutcome::unavailable()
            }
        }
    }
}


#[cfg(test)]
mod tests {
    use super::testing::*;
    use super::*;

    #[test]
    fn test_ready_classifier_returns_label() {
        let handle = RoleClassifierHandle::Ready(Arc::new(FixedClassifier("Data Scientist")));
        let outcome = handle.classify("python pandas");
        assert_eq!(outcome.predicted_label.as_deref(), Some("Data Scientist"));
        assert_eq!(outcome.error, None);
        assert_eq!(outcome.label_or_sentinel(), "Data Scientist");
    }

    #[test]
    fn test_failing_classifier_yields_sentinel() {
        let handle = RoleClassifierHandle::Ready(Arc::new(FailingClassifier));
        let outcome = handle.classify("text");
        assert_eq!(outcome.error, Some(ErrorKind::ClassificationUnavailable));
        assert_eq!(outcome.label_or_sentinel(), UNAVAILABLE_LABEL);
    }

    #[test]
    fn test_panicking_classifier_yields_sentinel() {
        let handle = RoleClassifierHandle::Ready(Arc::new(PanickingClassifier));
        assert_eq!(handle.classify("text").label_or_sentinel(), UNAVAILABLE_LABEL);
    }

    #[test]
    fn test_missing_model_file_loads_as_unavailable() {
        let handle = RoleClassifierHandle::load(Path::new("/nonexistent/role-model.json"));
        assert!(matches!(handle, RoleClassifierHandle::Unavailable { .. }));
        assert_eq!(handle.classify("text").label_or_sentinel(), UNAVAILABLE_LABEL);
    }

    #[test]
    fn test_model_file_loads_as_ready() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        std::fs::write(&path, r#"{"labels": ["Backend"], "weights": {"rust": [1.0]}}"#).unwrap();

        let handle = RoleClassifierHandle::load(&path);
        assert_eq!(handle.classify("rust").label_or_sentinel(), "Backend");
    }
}
