use axum::{extract::State, Json};

use crate::error::AppError;
use crate::extractors::AuthUser;
use crate::models::user::{ProfileResponse, UpdateProfileRequest};
use crate::services::auth;
use crate::AppState;

pub async fn get_profile(auth: AuthUser) -> Json<ProfileResponse> {
    Json(ProfileResponse::from_models(&auth.user, &auth.profile))
}

pub async fn update_profile(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<Json<ProfileResponse>, AppError> {
    let (user, profile) = auth::update_profile(&state.db, auth.user, auth.profile, payload).await?;
    Ok(Json(ProfileResponse::from_models(&user, &profile)))
}
