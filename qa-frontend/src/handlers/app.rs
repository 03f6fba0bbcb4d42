use axum::Json;
use serde_json::{json, Value};

/// Liveness only; the question-answering backend is not probed.
pub async fn health_check() -> Json<Value> {
    Json(json!({ "status": "healthy" }))
}
