use std::sync::Arc;

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use axum_extra::extract::cookie::CookieJar;
use serde_json::json;

use crate::server::session;
use crate::state::AppState;

pub async fn get_history(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
) -> impl IntoResponse {
    let history = match session::existing(&jar, &state.config.session.cookie_name) {
        Some(id) => state.sessions.get(&id).await.unwrap_or_default(),
        None => Vec::new(),
    };
    Json(json!({ "history": history }))
}

pub async fn clear_history(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
) -> impl IntoResponse {
    if let Some(id) = session::existing(&jar, &state.config.session.cookie_name) {
        if state.sessions.remove(&id).await {
            tracing::info!("Cleared session history");
        }
    }
    Json(json!({ "status": "cleared" }))
}
