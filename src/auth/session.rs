//! Server-issued bearer sessions.
//!
//! Tokens are random, returned to the client once and kept here only as
//! SHA-256 digests. Every lookup checks the absolute expiry.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use super::AuthError;
use crate::config::MAX_SESSION_HOURS;

/// Hash a bearer token string using SHA-256.
pub fn hash_token(token: &str) -> [u8; 32] {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hasher.finalize().into()
}

/// Generate a random bearer token (URL-safe base64, 32 bytes of entropy).
pub fn generate_token() -> String {
    use base64::Engine;
    let bytes: [u8; 32] = rand::random();
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub username: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// Token handed to the client after a successful login.
#[derive(Debug, Clone, Serialize)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

pub struct SessionStore {
    sessions: HashMap<[u8; 32], Session>,
    ttl: Duration,
}

impl SessionStore {
    /// `ttl_hours` is clamped to `1..=MAX_SESSION_HOURS`.
    pub fn new(ttl_hours: i64) -> Self {
        Self {
            sessions: HashMap::new(),
            ttl: Duration::hours(ttl_hours.clamp(1, MAX_SESSION_HOURS)),
        }
    }

    pub fn issue(&mut self, username: &str) -> IssuedToken {
        self.issue_at(username, Utc::now())
    }

    pub fn issue_at(&mut self, username: &str, now: DateTime<Utc>) -> IssuedToken {
        self.purge_expired(now);
        let token = generate_token();
        let expires_at = now + self.ttl;
        self.sessions.insert(
            hash_token(&token),
            Session {
                username: username.to_string(),
                issued_at: now,
                expires_at,
            },
        );
        IssuedToken { token, expires_at }
    }

    pub fn validate(&mut self, token: &str) -> Result<Session, AuthError> {
        self.validate_at(token, Utc::now())
    }

    /// Look up a token. Expired sessions are dropped on sight.
    pub fn validate_at(&mut self, token: &str, now: DateTime<Utc>) -> Result<Session, AuthError> {
        let key = hash_token(token);
        match self.sessions.get(&key) {
            Some(session) if now < session.expires_at => Ok(session.clone()),
            Some(_) => {
                self.sessions.remove(&key);
                Err(AuthError::SessionExpired)
            }
            None => Err(AuthError::SessionExpired),
        }
    }

    /// Revoke a token. Returns `true` if it was live.
    pub fn revoke(&mut self, token: &str) -> bool {
        self.sessions.remove(&hash_token(token)).is_some()
    }

    pub fn purge_expired(&mut self, now: DateTime<Utc>) {
        self.sessions.retain(|_, s| now < s.expires_at);
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generate_token_is_unique() {
        let t1 = generate_token();
        let t2 = generate_token();
        assert_ne!(t1, t2);
        assert_eq!(t1.len(), 43);
    }

    #[test]
    fn hash_token_is_deterministic() {
        assert_eq!(hash_token("test"), hash_token("test"));
        assert_ne!(hash_token("token-a"), hash_token("token-b"));
    }

    #[test]
    fn issued_token_validates() {
        let mut store = SessionStore::new(24);
        let issued = store.issue("admin");
        let session = store.validate(&issued.token).unwrap();
        assert_eq!(session.username, "admin");
        assert_eq!(session.expires_at, issued.expires_at);
    }

    #[test]
    fn unknown_token_is_rejected() {
        let mut store = SessionStore::new(24);
        assert!(matches!(store.validate("forged"), Err(AuthError::SessionExpired)));
    }

    #[test]
    fn session_expires_after_ttl() {
        let mut store = SessionStore::new(24);
        let now = Utc::now();
        let issued = store.issue_at("admin", now);
        assert!(store.validate_at(&issued.token, now + Duration::hours(23)).is_ok());
        assert!(matches!(
            store.validate_at(&issued.token, now + Duration::hours(24)),
            Err(AuthError::SessionExpired)
        ));
        assert!(store.is_empty(), "expired session dropped");
    }

    #[test]
    fn oversized_ttl_is_clamped() {
        let mut store = SessionStore::new(i64::MAX);
        let now = Utc::now();
        let issued = store.issue_at("admin", now);
        assert_eq!(issued.expires_at, now + Duration::hours(MAX_SESSION_HOURS));
    }

    #[test]
    fn revoke_ends_session() {
        let mut store = SessionStore::new(24);
        let issued = store.issue("admin");
        assert!(store.revoke(&issued.token));
        assert!(!store.revoke(&issued.token));
        assert!(store.validate(&issued.token).is_err());
    }

    #[test]
    fn raw_tokens_are_not_kept() {
        let mut store = SessionStore::new(24);
        let issued = store.issue("admin");
        assert!(store.sessions.contains_key(&hash_token(&issued.token)));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn issuing_purges_expired_sessions() {
        let mut store = SessionStore::new(1);
        let now = Utc::now();
        store.issue_at("a", now);
        store.issue_at("b", now + Duration::hours(2));
        assert_eq!(store.len(), 1);
    }
}
