use axum::{extract::State, http::StatusCode, Json};

use crate::error::AppError;
use crate::extractors::CurrentSession;
use crate::models::user::{
    LoginRequest, LoginResponse, LogoutResponse, ProfileResponse, RegisterRequest,
    VerifyOtpRequest,
};
use crate::services::auth;
use crate::AppState;

/// Create an account and log it in on the calling session
pub async fn register(
    State(state): State<AppState>,
    CurrentSession(mut session): CurrentSession,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<ProfileResponse>), AppError> {
    let (user, profile) = auth::register(&state.db, payload).await?;

    session.login(user.id);
    state.sessions.save(&mut session).await?;

    Ok((
        StatusCode::CREATED,
        Json(ProfileResponse::from_models(&user, &profile)),
    ))
}

/// First login step: check the password and mail an OTP
pub async fn login(
    State(state): State<AppState>,
    CurrentSession(_session): CurrentSession,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let user = auth::authenticate(&state.db, &payload.username, &payload.password).await?;
    auth::issue_login_otp(&state.db, state.mailer.as_ref(), &user).await?;

    Ok(Json(LoginResponse {
        otp_required: true,
        message: "An OTP has been sent to your email.".to_string(),
    }))
}

/// Second login step: a matching OTP binds the user to the session
pub async fn verify_otp(
    State(state): State<AppState>,
    CurrentSession(mut session): CurrentSession,
    Json(payload): Json<VerifyOtpRequest>,
) -> Result<Json<ProfileResponse>, AppError> {
    let user = auth::verify_otp(&state.db, &payload.username, &payload.otp).await?;

    let (user, profile) = auth::load_identity(&state.db, user.id)
        .await?
        .ok_or_else(|| AppError::Internal(format!("User {} vanished during login", user.id)))?;

    session.login(user.id);
    state.sessions.save(&mut session).await?;

    tracing::info!(user_id = user.id, session_id = session.id(), "User logged in");
    Ok(Json(ProfileResponse::from_models(&user, &profile)))
}

/// Drop the user and the cart by replacing the session with a fresh one
pub async fn logout(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
) -> Result<Json<LogoutResponse>, AppError> {
    let user_id = session.user_id();
    let fresh = state.sessions.flush(&session).await?;

    tracing::info!(?user_id, "User logged out");
    Ok(Json(LogoutResponse {
        message: "You have been logged out.".to_string(),
        session_id: fresh.id().to_string(),
    }))
}
