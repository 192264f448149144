use std::sync::Arc;

use axum::extract::State;
use axum::response::{Html, IntoResponse};
use axum_extra::extract::cookie::CookieJar;

use crate::core::errors::ApiError;
use crate::server::{page, session};
use crate::state::AppState;

/// Serves the chat page with the caller's conversation so far.
pub async fn index(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
) -> Result<impl IntoResponse, ApiError> {
    let (jar, session_id) = session::resolve(jar, &state.config.session.cookie_name);
    let history = state.sessions.get(&session_id).await.unwrap_or_default();

    let body = page::render_index(&state.templates, &history).map_err(ApiError::internal)?;
    Ok((jar, Html(body)))
}
