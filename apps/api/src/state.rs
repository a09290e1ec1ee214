use std::sync::Arc;

use crate::classifier::RoleClassifierHandle;
use crate::ingest::pipeline::Pipeline;
use crate::normalize::Normalizer;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<Pipeline>,
    pub normalizer: Arc<Normalizer>,
    /// `None` when no role model is configured; responses then omit
    /// `relevant_text` and `predicted_role`.
    pub role_classifier: Option<RoleClassifierHandle>,
}
