//! Login and logout.
//!
//! `POST /api/auth/login` is the only unauthenticated write. Failed attempts
//! count against a per-username throttle; once it trips, logins for that
//! username get `429` with `Retry-After` until the window slides.

use axum::extract::State;
use axum::http::StatusCode;
use axum::{Extension, Json};
use serde::Deserialize;
use zeroize::Zeroizing;

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, UserContext};
use crate::auth::{self, IssuedToken};

#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// `POST /api/auth/login` — exchange credentials for a bearer token.
pub async fn login(
    State(ctx): State<ApiContext>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<IssuedToken>, ApiError> {
    let username = body.username.trim().to_string();
    let password = Zeroizing::new(body.password);
    if username.is_empty() || password.is_empty() {
        return Err(ApiError::BadRequest("username and password are required".into()));
    }

    // Counted as a failure until the verdict is in
    let attempt = ctx
        .core
        .lock_throttle()?
        .reserve(&username)
        .map_err(|retry_after| ApiError::RateLimited { retry_after })?;

    // PBKDF2 runs on the blocking pool
    let core = ctx.core.clone();
    let user = username.clone();
    let verdict = tokio::task::spawn_blocking(move || -> Result<(), ApiError> {
        let conn = core.open_db()?;
        auth::verify_login(&conn, &user, &password)?;
        Ok(())
    })
    .await
    .unwrap_or_else(|e| Err(ApiError::Internal(format!("login task failed: {e}"))));

    match verdict {
        Ok(()) => {
            ctx.core.lock_throttle()?.clear(&username);
            let issued = ctx.core.write_sessions()?.issue(&username);
            tracing::info!(username = %username, "Admin logged in");
            Ok(Json(issued))
        }
        Err(ApiError::InvalidCredentials) => {
            tracing::warn!(username = %username, "Failed login attempt");
            Err(ApiError::InvalidCredentials)
        }
        Err(other) => {
            ctx.core.lock_throttle()?.release(&username, attempt);
            Err(other)
        }
    }
}

/// `POST /api/auth/logout` — revoke the caller's token.
pub async fn logout(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<UserContext>,
) -> Result<StatusCode, ApiError> {
    ctx.core.write_sessions()?.revoke(&user.token);
    tracing::info!(username = %user.username, "Admin logged out");
    Ok(StatusCode::NO_CONTENT)
}
