use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;

use crate::ingest::pipeline::PipelineError;

/// Failure taxonomy shared by every stage of the ingest pipeline.
///
/// Only `UnresolvableReference` and `RetrievalFailed` (single-link mode) ever reach the
/// client as a non-2xx status. Everything else is absorbed where it happens and logged
/// under its kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    UnresolvableReference,
    RetrievalFailed,
    ArchiveCorrupt,
    UnsupportedFormat,
    ExtractionFailed,
    ClassificationUnavailable,
}

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("No attachment_link provided")]
    MissingLink,

    #[error("Invalid Google Drive file link")]
    InvalidLink,

    #[error("Download failed: {0}")]
    DownloadFailed(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<PipelineError> for AppError {
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::Unresolvable(_) => AppError::InvalidLink,
            PipelineError::Retrieval(e) => AppError::DownloadFailed(e.to_string()),
            PipelineError::Workspace(e) => {
                AppError::Internal(anyhow::Error::new(e).context("working area unavailable"))
            }
            PipelineError::Task(msg) => AppError::Internal(anyhow::anyhow!(msg)),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::MissingLink | AppError::InvalidLink => {
                (StatusCode::BAD_REQUEST, self.to_string())
            }
            AppError::DownloadFailed(detail) => {
                tracing::warn!(kind = ?ErrorKind::RetrievalFailed, "Download failed: {detail}");
                (StatusCode::INTERNAL_SERVER_ERROR, self.to_string())
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal server error occurred".to_string(),
                )
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::fetch::FetchError;
    use crate::ingest::link::LinkError;

    #[test]
    fn test_missing_link_is_bad_request() {
        let response = AppError::MissingLink.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_unresolvable_maps_to_invalid_link() {
        let err: AppError = PipelineError::Unresolvable(LinkError::Unresolvable).into();
        assert_eq!(err.to_string(), "Invalid Google Drive file link");
    }

    #[test]
    fn test_retrieval_failure_keeps_detail() {
        let err: AppError = PipelineError::Retrieval(FetchError::NotDownloadable).into();
        assert!(err.to_string().starts_with("Download failed: "));
        assert_eq!(
            err.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_error_kind_serializes_snake_case() {
        let value = serde_json::to_value(ErrorKind::ClassificationUnavailable).unwrap();
        assert_eq!(value, "classification_unavailable");
    }
}
