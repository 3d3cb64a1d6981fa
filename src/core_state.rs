//! Shared application state for the HTTP API.
//!
//! Wrapped in `Arc` at startup. Each request opens its own SQLite
//! connection; sessions and the login throttle live behind locks.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, RwLock, RwLockWriteGuard};

use crate::auth::{LoginThrottle, SessionStore};
use crate::config::{AppConfig, LabProfile};
use crate::db;

pub struct CoreState {
    db_path: PathBuf,
    /// Printed lab details used by the renderer.
    pub lab: LabProfile,
    sessions: RwLock<SessionStore>,
    throttle: Mutex<LoginThrottle>,
}

impl CoreState {
    pub fn new(db_path: PathBuf, lab: LabProfile, session_hours: i64) -> Self {
        Self {
            db_path,
            lab,
            sessions: RwLock::new(SessionStore::new(session_hours)),
            throttle: Mutex::new(LoginThrottle::new()),
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.db_path.clone(), config.lab.clone(), config.session_hours)
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    /// Open a database connection. Migrations are idempotent, so this is
    /// safe to call per request.
    pub fn open_db(&self) -> Result<rusqlite::Connection, CoreError> {
        db::open_database(&self.db_path).map_err(CoreError::Database)
    }

    /// Validation drops expired sessions, so even lookups take the write lock.
    pub fn write_sessions(&self) -> Result<RwLockWriteGuard<'_, SessionStore>, CoreError> {
        self.sessions.write().map_err(|_| CoreError::LockPoisoned)
    }

    pub fn lock_throttle(&self) -> Result<MutexGuard<'_, LoginThrottle>, CoreError> {
        self.throttle.lock().map_err(|_| CoreError::LockPoisoned)
    }
}

/// Errors from CoreState operations.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Internal lock error")]
    LockPoisoned,
    #[error("Database error: {0}")]
    Database(#[from] db::DatabaseError),
}
