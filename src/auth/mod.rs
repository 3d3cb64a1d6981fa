//! Admin authentication: hashed credentials, server-side sessions and a
//! failed-login throttle.

pub mod credentials;
pub mod session;
pub mod throttle;

pub use credentials::{create_admin, ensure_admin, verify_login};
pub use session::{generate_token, hash_token, IssuedToken, Session, SessionStore};
pub use throttle::LoginThrottle;

use thiserror::Error;

use crate::db::DatabaseError;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Session expired or unknown")]
    SessionExpired,

    #[error("Too many failed attempts, retry after {retry_after}s")]
    Throttled { retry_after: u64 },

    #[error("Auth state lock poisoned")]
    LockPoisoned,

    #[error("Credential store error: {0}")]
    Database(#[from] DatabaseError),
}
