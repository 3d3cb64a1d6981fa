use chrono::Utc;
use pbkdf2::pbkdf2_hmac;
use rand::RngCore;
use rusqlite::Connection;
use sha2::Sha256;
use subtle::ConstantTimeEq;

use super::AuthError;
use crate::config::AdminBootstrap;
use crate::db::{self, DatabaseError};
use crate::models::AdminUser;

pub const PBKDF2_ITERATIONS: u32 = 600_000;
pub const HASH_LENGTH: usize = 32;
pub const SALT_LENGTH: usize = 32;

/// Derive the stored digest for `password` with PBKDF2-HMAC-SHA256.
pub fn hash_password(password: &str, salt: &[u8], iterations: u32) -> [u8; HASH_LENGTH] {
    let mut out = [0u8; HASH_LENGTH];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, iterations, &mut out);
    out
}

/// Generate a cryptographically random salt
pub fn generate_salt() -> [u8; SALT_LENGTH] {
    let mut salt = [0u8; SALT_LENGTH];
    rand::thread_rng().fill_bytes(&mut salt);
    salt
}

/// Store a new admin. Fails with a constraint error if the username exists.
pub fn create_admin(
    conn: &Connection,
    username: &str,
    password: &str,
    iterations: u32,
) -> Result<AdminUser, AuthError> {
    let salt = generate_salt();
    let user = AdminUser {
        username: username.to_string(),
        salt: salt.to_vec(),
        password_hash: hash_password(password, &salt, iterations).to_vec(),
        iterations,
        created_at: Utc::now(),
    };
    db::insert_admin_user(conn, &user)?;
    Ok(user)
}

/// Create the configured admin on first start. Returns `true` if created.
///
/// An existing account is left untouched so a password changed later is not
/// reset by a stale environment.
pub fn ensure_admin(conn: &Connection, bootstrap: &AdminBootstrap) -> Result<bool, AuthError> {
    if db::get_admin_user(conn, &bootstrap.username)?.is_some() {
        return Ok(false);
    }
    create_admin(conn, &bootstrap.username, &bootstrap.password, PBKDF2_ITERATIONS)?;
    tracing::info!(username = %bootstrap.username, "Admin account created");
    Ok(true)
}

/// Check a username/password pair against the credential store.
pub fn verify_login(conn: &Connection, username: &str, password: &str) -> Result<(), AuthError> {
    let Some(user) = db::get_admin_user(conn, username)? else {
        // Burn comparable time so unknown users are not distinguishable
        let _ = hash_password(password, &[0u8; SALT_LENGTH], PBKDF2_ITERATIONS);
        return Err(AuthError::InvalidCredentials);
    };
    if user.iterations == 0 {
        return Err(AuthError::Database(DatabaseError::ConstraintViolation(
            "admin_users.iterations must be positive".into(),
        )));
    }

    let candidate = hash_password(password, &user.salt, user.iterations);
    if candidate.as_slice().ct_eq(user.password_hash.as_slice()).unwrap_u8() == 1 {
        Ok(())
    } else {
        Err(AuthError::InvalidCredentials)
    }
}
