use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use serde_json::json;

use crate::core::errors::ApiError;
use crate::server::session;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AskRequest {
    #[serde(default)]
    pub question: Option<String>,
}

/// Answers one question for the caller's session.
///
/// The session history is replaced only after a successful answer; a failed
/// request leaves it exactly as it was.
pub async fn ask(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    payload: Result<Json<AskRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(payload) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let (jar, session_id) = session::resolve(jar, &state.config.session.cookie_name);

    let question = payload.question.unwrap_or_default();
    let history = state.sessions.get(&session_id).await.unwrap_or_default();

    let answer = state
        .pipeline
        .answer(&question, &history)
        .await
        .inspect_err(|e| tracing::warn!("Failed to answer question: {}", e))?;

    state.sessions.set(&session_id, answer.history).await;

    Ok((jar, Json(json!({ "answer": answer.text }))))
}
