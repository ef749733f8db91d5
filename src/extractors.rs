//! Request extractors for the session header and the logged-in user, and
//! the role gate applied to the vendor and admin route groups

use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};

use crate::entities::{profiles, users};
use crate::error::{AppError, AppResult};
use crate::models::user::Role;
use crate::services::{auth, session_store::Session};
use crate::AppState;

/// Header carrying the session id issued by POST /api/sessions
pub const SESSION_HEADER: &str = "x-session-id";

fn session_id(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(SESSION_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|id| !id.is_empty())
}

/// The caller's session; missing or unknown ids are rejected with 401
pub struct CurrentSession(pub Session);

impl FromRequestParts<AppState> for CurrentSession {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let id = session_id(parts).ok_or_else(|| {
            AppError::Unauthorized(format!("Missing {} header", SESSION_HEADER))
        })?;

        let session = state.sessions.load(id).await?.ok_or_else(|| {
            tracing::debug!(session_id = id, "Unknown session");
            AppError::Unauthorized("Session expired or unknown".to_string())
        })?;

        Ok(CurrentSession(session))
    }
}

/// The logged-in user behind the session
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user: users::Model,
    pub profile: profiles::Model,
    pub role: Role,
    pub session: Session,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        // Already resolved by the role gate
        if let Some(auth) = parts.extensions.get::<AuthUser>() {
            return Ok(auth.clone());
        }

        let CurrentSession(session) = CurrentSession::from_request_parts(parts, state).await?;
        let user_id = session
            .user_id()
            .ok_or_else(|| AppError::Unauthorized("Login required".to_string()))?;

        let (user, profile) = auth::load_identity(&state.db, user_id)
            .await?
            .ok_or_else(|| AppError::Unauthorized("Login required".to_string()))?;

        let role = profile.role.parse::<Role>().map_err(AppError::Internal)?;

        Ok(AuthUser {
            user,
            profile,
            role,
            session,
        })
    }
}

/// Who is looking, if anyone. Never rejects for a missing or stale session.
pub struct Viewer(pub Option<i32>);

impl FromRequestParts<AppState> for Viewer {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let Some(id) = session_id(parts) else {
            return Ok(Viewer(None));
        };
        let user_id = state.sessions.load(id).await?.and_then(|s| s.user_id());
        Ok(Viewer(user_id))
    }
}

pub async fn require_vendor(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> AppResult<Response> {
    require_role(&state, req, next, Role::Vendor).await
}

pub async fn require_admin(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> AppResult<Response> {
    require_role(&state, req, next, Role::Admin).await
}

async fn require_role(state: &AppState, req: Request, next: Next, role: Role) -> AppResult<Response> {
    let (mut parts, body) = req.into_parts();
    let auth = AuthUser::from_request_parts(&mut parts, state).await?;

    if auth.role != role {
        tracing::warn!(
            user_id = auth.user.id,
            role = %auth.role,
            required = %role,
            path = %parts.uri.path(),
            "Role gate rejected request"
        );
        return Err(AppError::Forbidden(format!("Access restricted to {} accounts", role)));
    }

    parts.extensions.insert(auth);
    Ok(next.run(Request::from_parts(parts, body)).await)
}
