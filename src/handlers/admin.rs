use axum::{extract::State, Json};

use crate::error::AppError;
use crate::extractors::AuthUser;
use crate::models::dashboard::AdminDashboardResponse;
use crate::services::admin;
use crate::AppState;

pub async fn dashboard(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<AdminDashboardResponse>, AppError> {
    let summary = admin::dashboard(&state.db).await?;
    tracing::debug!(admin_id = auth.user.id, "Admin dashboard viewed");
    Ok(Json(summary))
}
