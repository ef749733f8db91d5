use axum::{extract::State, http::StatusCode, Json};

use crate::error::AppError;
use crate::models::user::SessionResponse;
use crate::AppState;

pub async fn health() -> &'static str {
    "OK"
}

/// Issue a fresh anonymous session. Clients send the id back in the
/// `x-session-id` header.
pub async fn create_session(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<SessionResponse>), AppError> {
    let session = state.sessions.create().await?;

    Ok((
        StatusCode::CREATED,
        Json(SessionResponse {
            session_id: session.id().to_string(),
        }),
    ))
}
