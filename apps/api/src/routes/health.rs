use axum::Json;
use serde_json::{json, Value};

pub const READY_MESSAGE: &str =
    "Resume parser is running. Use POST /process with {attachment_link}";

/// GET /
/// Static readiness string.
pub async fn root_handler() -> &'static str {
    READY_MESSAGE
}

/// GET /health
/// Returns a simple status object with service version.
pub async fn health_handler() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "resume-api"
    }))
}
