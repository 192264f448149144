use std::sync::Arc;

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use serde_json::json;

use crate::state::AppState;

pub async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let uptime = Utc::now().signed_duration_since(state.started_at);
    Json(json!({
        "status": "ok",
        "index_passages": state.pipeline.retriever().passage_count(),
        "model": state.pipeline.settings().model,
        "uptime_secs": uptime.num_seconds().max(0)
    }))
}
