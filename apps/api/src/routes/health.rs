use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /health
/// Returns service status, version and whether generation is configured.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    let provider = state.generator.provider();
    let jobs_tracked = state.jobs.len().await;
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "tailor-api",
        "models_available": provider.is_some(),
        "provider": provider,
        "jobs_tracked": jobs_tracked,
    }))
}
