use axum::{
    http::header,
    response::{IntoResponse, Json, Response},
    Extension,
};
use serde_json::{json, Value};
use std::sync::Arc;

pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

/// Route catalog snapshot taken at finalize time.
#[derive(Clone)]
pub struct OpenApiDoc(pub Arc<Value>);

pub async fn openapi_json(Extension(doc): Extension<OpenApiDoc>) -> Response {
    (
        [(header::CACHE_CONTROL, "no-store")],
        Json((*doc.0).clone()),
    )
        .into_response()
}
