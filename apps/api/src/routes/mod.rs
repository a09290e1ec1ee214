pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::ingest::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(health::root_handler))
        .route("/health", get(health::health_handler))
        .route("/process", post(handlers::handle_process))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::io::Write;
    use std::path::Path;
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::classifier::testing::FixedClassifier;
    use crate::classifier::RoleClassifierHandle;
    use crate::ingest::extract::docx::testing::docx_bytes;
    use crate::ingest::extract::testing::extractor;
    use crate::ingest::fetch::testing::FakeFetcher;
    use crate::ingest::pipeline::{Pipeline, PipelineLimits};
    use crate::normalize::{LexiconTagger, Normalizer};

    fn state(
        fetcher: FakeFetcher,
        pages: &[&str],
        work_dir: &Path,
        role_classifier: Option<RoleClassifierHandle>,
    ) -> AppState {
        let pipeline = Pipeline::new(
            Arc::new(fetcher),
            Arc::new(extractor(pages)),
            PipelineLimits {
                work_dir: Some(work_dir.to_path_buf()),
                ..PipelineLimits::default()
            },
        );
        AppState {
            pipeline: Arc::new(pipeline),
            normalizer: Arc::new(Normalizer::new(HashSet::new(), Arc::new(LexiconTagger::new()))),
            role_classifier,
        }
    }

    fn zip_of(name: &str, bytes: &[u8]) -> Vec<u8> {
        let mut cursor = std::io::Cursor::new(Vec::new());
        {
            let mut writer = zip::ZipWriter::new(&mut cursor);
            writer
                .start_file(name, zip::write::SimpleFileOptions::default())
                .unwrap();
            writer.write_all(bytes).unwrap();
            writer.finish().unwrap();
        }
        cursor.into_inner()
    }

    async fn post_process(state: AppState, body: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri("/process")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let response = build_router(state).oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_root_reports_ready() {
        let work = tempfile::tempdir().unwrap();
        let app = build_router(state(FakeFetcher::default(), &[], work.path(), None));

        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(bytes, health::READY_MESSAGE.as_bytes());
    }

    #[tokio::test]
    async fn test_single_pdf_link_returns_text() {
        let work = tempfile::tempdir().unwrap();
        let fetcher = FakeFetcher::default().with_file("ABC123", "file", b"%PDF-1.4".to_vec());
        let state = state(fetcher, &["Hello World", ""], work.path(), None);

        let (status, body) = post_process(
            state,
            r#"{"attachment_link": "https://example/d/ABC123/view"}"#,
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "resume_text": "Hello World" }));
    }

    #[tokio::test]
    async fn test_missing_link_is_bad_request() {
        let work = tempfile::tempdir().unwrap();

        for body in [r#"{}"#, r#"{"attachment_link": ""}"#, r#"{"attachment_link": []}"#, "not json"] {
            let state = state(FakeFetcher::default(), &[], work.path(), None);
            let (status, value) = post_process(state, body).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "body {body}");
            assert_eq!(value, json!({ "error": "No attachment_link provided" }));
        }
    }

    #[tokio::test]
    async fn test_unparseable_link_is_bad_request() {
        let work = tempfile::tempdir().unwrap();
        let state = state(FakeFetcher::default(), &[], work.path(), None);

        let (status, body) =
            post_process(state, r#"{"attachment_link": "https://example.com/nothing"}"#).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "error": "Invalid Google Drive file link" }));
    }

    #[tokio::test]
    async fn test_download_failure_is_server_error() {
        let work = tempfile::tempdir().unwrap();
        let state = state(FakeFetcher::default(), &[], work.path(), None);

        let (status, body) =
            post_process(state, r#"{"attachment_link": "https://example/d/GONE/view"}"#).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        let message = body["error"].as_str().unwrap();
        assert!(message.starts_with("Download failed: "), "{message}");
    }

    #[tokio::test]
    async fn test_folder_with_zipped_docx() {
        let work = tempfile::tempdir().unwrap();
        let archive = zip_of("resume.docx", &docx_bytes(&["Name: A", "Skills: Python"]));
        let fetcher = FakeFetcher::default().with_folder("XYZ", vec![("resumes.zip", archive)]);
        let state = state(fetcher, &[], work.path(), None);

        let (status, body) =
            post_process(state, r#"{"attachment_link": "https://example/folders/XYZ"}"#).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "resume_text": "Name: A\nSkills: Python" }));
    }

    #[tokio::test]
    async fn test_batch_skips_unresolvable_link() {
        let work = tempfile::tempdir().unwrap();
        let fetcher = FakeFetcher::default().with_file("GOOD", "cv.pdf", b"%PDF-1.7".to_vec());
        let state = state(fetcher, &["Batch text"], work.path(), None);

        let (status, body) = post_process(
            state,
            r#"{"attachment_link": ["https://example/d/GOOD/view", "not a link"]}"#,
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({ "resumes": [{ "source_file": "GOOD/cv.pdf", "resume_text": "Batch text" }] })
        );
    }

    #[tokio::test]
    async fn test_single_with_classifier_adds_role_fields() {
        let work = tempfile::tempdir().unwrap();
        let fetcher = FakeFetcher::default().with_file("ABC", "file", b"%PDF-1.4".to_vec());
        let classifier = RoleClassifierHandle::Ready(Arc::new(FixedClassifier("Backend")));
        let state = state(
            fetcher,
            &["alpha beta python kafka"],
            work.path(),
            Some(classifier),
        );

        let (status, body) =
            post_process(state, r#"{"attachment_link": "https://example/d/ABC/view"}"#).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["resume_text"], "alpha beta python kafka");
        assert_eq!(body["relevant_text"], "python kafka");
        assert_eq!(body["predicted_role"], "Backend");
    }

    #[tokio::test]
    async fn test_unavailable_classifier_reports_sentinel() {
        let work = tempfile::tempdir().unwrap();
        let fetcher = FakeFetcher::default().with_file("ABC", "file", b"%PDF-1.4".to_vec());
        let classifier = RoleClassifierHandle::Unavailable {
            reason: "not loaded".into(),
        };
        let state = state(fetcher, &["some text"], work.path(), Some(classifier));

        let (status, body) =
            post_process(state, r#"{"attachment_link": "https://example/d/ABC/view"}"#).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["predicted_role"], crate::classifier::UNAVAILABLE_LABEL);
    }
}
