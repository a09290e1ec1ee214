use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::errors::AppError;
use crate::ingest::pipeline::ResumeRecord;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ProcessRequest {
    #[serde(default)]
    pub attachment_link: Option<AttachmentLink>,
}

/// A single reference selects single-document mode; a list selects batch mode.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum AttachmentLink {
    One(String),
    Many(Vec<String>),
}

#[derive(Debug, Serialize)]
pub struct SingleResumeResponse {
    pub resume_text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relevant_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub predicted_role: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct BatchResumeResponse {
    pub resumes: Vec<ResumeRecord>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum ProcessResponse {
    Single(SingleResumeResponse),
    Batch(BatchResumeResponse),
}

/// POST /process
///
/// A body that is missing, malformed or carries an empty `attachment_link` is
/// answered with 400 "No attachment_link provided".
pub async fn handle_process(
    State(state): State<AppState>,
    payload: Result<Json<ProcessRequest>, JsonRejection>,
) -> Result<Json<ProcessResponse>, AppError> {
    let request_id = Uuid::new_v4();
    dispatch(state, payload)
        .instrument(info_span!("process", %request_id))
        .await
}

async fn dispatch(
    state: AppState,
    payload: Result<Json<ProcessRequest>, JsonRejection>,
) -> Result<Json<ProcessResponse>, AppError> {
    let link = match payload {
        Ok(Json(req)) => req.attachment_link,
        Err(rejection) => {
            warn!("Rejected request body: {rejection}");
            None
        }
    };

    let response = match link {
        Some(AttachmentLink::One(reference)) if !reference.trim().is_empty() => {
            ProcessResponse::Single(process_single(&state, &reference).await?)
        }
        Some(AttachmentLink::Many(references)) if !references.is_empty() => {
            ProcessResponse::Batch(process_batch(&state, &references).await?)
        }
        _ => return Err(AppError::MissingLink),
    };

    Ok(Json(response))
}

async fn process_single(
    state: &AppState,
    reference: &str,
) -> Result<SingleResumeResponse, AppError> {
    let resume_text = state
        .pipeline
        .process_single(reference)
        .await?
        .unwrap_or_default();
    info!("Extracted {} characters", resume_text.chars().count());

    let Some(classifier) = state.role_classifier.clone() else {
        return Ok(SingleResumeResponse {
            resume_text,
            relevant_text: None,
            predicted_role: None,
        });
    };

    // Normalization and prediction are CPU-bound.
    let normalizer = state.normalizer.clone();
    let raw = resume_text.clone();
    let (relevant_text, predicted_role) = tokio::task::spawn_blocking(move || {
        let relevant = normalizer.normalize(&raw);
        let role = classifier.classify(&relevant).label_or_sentinel();
        (relevant, role)
    })
    .await
    .map_err(|e| anyhow::anyhow!("role prediction task failed: {e}"))?;

    info!("Predicted role: {predicted_role}");
    Ok(SingleResumeResponse {
        resume_text,
        relevant_text: Some(relevant_text),
        predicted_role: Some(predicted_role),
    })
}

async fn process_batch(
    state: &AppState,
    references: &[String],
) -> Result<BatchResumeResponse, AppError> {
    let resumes = state.pipeline.process_batch(references).await?;
    info!(
        "Batch of {} links produced {} resumes",
        references.len(),
        resumes.len()
    );
    Ok(BatchResumeResponse { resumes })
}
