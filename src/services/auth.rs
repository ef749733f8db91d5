//! Accounts, password checks and the two-step OTP login
//!
//! Login is split in two: the password check issues a 6-digit one-time
//! password that is stored on the profile and mailed to the user; only
//! presenting that code binds the user to the session.

use chrono::Utc;
use rand::Rng;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, EntityTrait,
    QueryFilter, Set, TransactionTrait,
};

use crate::entities::{prelude::*, profiles, users};
use crate::error::{AppError, AppResult};
use crate::models::user::{RegisterRequest, Role, UpdateProfileRequest};
use crate::services::mailer::Mailer;

pub const MIN_PASSWORD_LEN: usize = 8;

const INVALID_CREDENTIALS: &str = "Invalid username or password";

/// Six decimal digits, never starting with zero
pub fn generate_otp() -> String {
    let code: u32 = rand::thread_rng().gen_range(100_000..1_000_000);
    code.to_string()
}

/// Argon2id hash, computed off the async runtime
pub async fn hash_password(password: String) -> AppResult<String> {
    tokio::task::spawn_blocking(move || {
        use argon2::password_hash::rand_core::OsRng;
        use argon2::password_hash::SaltString;
        use argon2::{Argon2, PasswordHasher};

        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))
    })
    .await
    .map_err(|e| AppError::Internal(format!("Hashing task failed: {}", e)))?
}

pub async fn verify_password(password: String, hash: String) -> AppResult<bool> {
    tokio::task::spawn_blocking(move || {
        use argon2::{Argon2, PasswordHash, PasswordVerifier};

        let Ok(parsed) = PasswordHash::new(&hash) else {
            return false;
        };
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    })
    .await
    .map_err(|e| AppError::Internal(format!("Verification task failed: {}", e)))
}

/// Create the user and its profile together
pub async fn register(
    db: &DatabaseConnection,
    request: RegisterRequest,
) -> AppResult<(users::Model, profiles::Model)> {
    let username = request.username.trim().to_string();
    let email = request.email.trim().to_string();

    if username.is_empty() {
        return Err(AppError::Validation("Username is required".to_string()));
    }
    if email.is_empty() || !email.contains('@') {
        return Err(AppError::Validation(
            "A valid email address is required".to_string(),
        ));
    }
    if request.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::Validation(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }
    if request.role == Role::Admin {
        return Err(AppError::Forbidden(
            "Admin accounts cannot be self-registered".to_string(),
        ));
    }

    let password_hash = hash_password(request.password).await?;

    let txn = db.begin().await?;
    match insert_account(&txn, &username, &email, password_hash, request.role).await {
        Ok(account) => {
            txn.commit().await?;
            tracing::info!(
                user_id = account.0.id,
                username = %account.0.username,
                role = %request.role,
                "User registered"
            );
            Ok(account)
        }
        Err(e) => {
            if let Err(rollback_err) = txn.rollback().await {
                tracing::error!(error = %rollback_err, "Failed to roll back registration");
            }
            Err(e)
        }
    }
}

async fn insert_account(
    txn: &DatabaseTransaction,
    username: &str,
    email: &str,
    password_hash: String,
    role: Role,
) -> AppResult<(users::Model, profiles::Model)> {
    let taken = Users::find()
        .filter(users::Column::Username.eq(username))
        .one(txn)
        .await?;
    if taken.is_some() {
        return Err(AppError::Conflict(format!(
            "Username '{}' is already taken",
            username
        )));
    }

    let user = users::ActiveModel {
        username: Set(username.to_string()),
        email: Set(email.to_string()),
        password_hash: Set(password_hash),
        is_staff: Set(false),
        created_at: Set(Utc::now().fixed_offset()),
        ..Default::default()
    }
    .insert(txn)
    .await?;

    let profile = profiles::ActiveModel {
        user_id: Set(user.id),
        role: Set(role.to_string()),
        phone: Set(String::new()),
        address: Set(String::new()),
        otp: Set(None),
        is_verified: Set(false),
        ..Default::default()
    }
    .insert(txn)
    .await?;

    Ok((user, profile))
}

/// Check a username/password pair. Unknown users and wrong passwords are
/// reported identically.
pub async fn authenticate(
    db: &DatabaseConnection,
    username: &str,
    password: &str,
) -> AppResult<users::Model> {
    let user = Users::find()
        .filter(users::Column::Username.eq(username.trim()))
        .one(db)
        .await?
        .ok_or_else(|| AppError::Unauthorized(INVALID_CREDENTIALS.to_string()))?;

    if !verify_password(password.to_string(), user.password_hash.clone()).await? {
        tracing::warn!(username = %user.username, "Failed password check");
        return Err(AppError::Unauthorized(INVALID_CREDENTIALS.to_string()));
    }

    Ok(user)
}

/// Generate a fresh OTP, store it on the profile and mail it
pub async fn issue_login_otp(
    db: &DatabaseConnection,
    mailer: &dyn Mailer,
    user: &users::Model,
) -> AppResult<()> {
    let profile = find_profile(db, user.id).await?;
    let code = generate_otp();

    let mut active: profiles::ActiveModel = profile.into();
    active.otp = Set(Some(code.clone()));
    active.update(db).await?;

    mailer.send_otp(&user.email, &user.username, &code).await?;

    tracing::info!(user_id = user.id, "Login OTP issued");
    Ok(())
}

/// Consume a pending OTP. On success the code is cleared and the profile
/// marked verified.
pub async fn verify_otp(
    db: &DatabaseConnection,
    username: &str,
    code: &str,
) -> AppResult<users::Model> {
    let invalid = || AppError::Unauthorized("Invalid or expired OTP".to_string());

    let user = Users::find()
        .filter(users::Column::Username.eq(username.trim()))
        .one(db)
        .await?
        .ok_or_else(invalid)?;
    let profile = find_profile(db, user.id).await?;

    match profile.otp.as_deref() {
        Some(pending) if pending == code.trim() => {}
        _ => {
            tracing::warn!(user_id = user.id, "OTP mismatch");
            return Err(invalid());
        }
    }

    let mut active: profiles::ActiveModel = profile.into();
    active.otp = Set(None);
    active.is_verified = Set(true);
    active.update(db).await?;

    tracing::info!(user_id = user.id, "OTP verified");
    Ok(user)
}

/// The user and profile behind a session, if both still exist
pub async fn load_identity(
    db: &DatabaseConnection,
    user_id: i32,
) -> AppResult<Option<(users::Model, profiles::Model)>> {
    let Some(user) = Users::find_by_id(user_id).one(db).await? else {
        return Ok(None);
    };
    let profile = Profiles::find()
        .filter(profiles::Column::UserId.eq(user.id))
        .one(db)
        .await?;
    Ok(profile.map(|profile| (user, profile)))
}

pub async fn update_profile(
    db: &DatabaseConnection,
    user: users::Model,
    profile: profiles::Model,
    request: UpdateProfileRequest,
) -> AppResult<(users::Model, profiles::Model)> {
    let mut user_changes: users::ActiveModel = user.clone().into();

    if let Some(username) = request.username.map(|u| u.trim().to_string()) {
        if username.is_empty() {
            return Err(AppError::Validation("Username cannot be empty".to_string()));
        }
        if username != user.username {
            let taken = Users::find()
                .filter(users::Column::Username.eq(username.as_str()))
                .one(db)
                .await?;
            if taken.is_some() {
                return Err(AppError::Conflict(format!(
                    "Username '{}' is already taken",
                    username
                )));
            }
        }
        user_changes.username = Set(username);
    }
    if let Some(email) = request.email.map(|e| e.trim().to_string()) {
        if !email.contains('@') {
            return Err(AppError::Validation(
                "A valid email address is required".to_string(),
            ));
        }
        user_changes.email = Set(email);
    }

    let mut profile_changes: profiles::ActiveModel = profile.clone().into();
    if let Some(phone) = request.phone {
        profile_changes.phone = Set(phone.trim().to_string());
    }
    if let Some(address) = request.address {
        profile_changes.address = Set(address.trim().to_string());
    }

    let txn = db.begin().await?;
    let user = if user_changes.is_changed() {
        user_changes.update(&txn).await?
    } else {
        user
    };
    let profile = if profile_changes.is_changed() {
        profile_changes.update(&txn).await?
    } else {
        profile
    };
    txn.commit().await?;

    tracing::info!(user_id = user.id, "Profile updated");
    Ok((user, profile))
}

async fn find_profile(db: &DatabaseConnection, user_id: i32) -> AppResult<profiles::Model> {
    Profiles::find()
        .filter(profiles::Column::UserId.eq(user_id))
        .one(db)
        .await?
        .ok_or_else(|| AppError::Internal(format!("User {} has no profile", user_id)))
}
