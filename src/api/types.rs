//! Shared types for the API layer.

use std::sync::Arc;

use crate::core_state::CoreState;

/// Shared context for all API routes and middleware.
#[derive(Clone)]
pub struct ApiContext {
    pub core: Arc<CoreState>,
}

impl ApiContext {
    pub fn new(core: Arc<CoreState>) -> Self {
        Self { core }
    }
}

/// Authenticated admin, injected into request extensions by the auth
/// middleware after the bearer token validates.
#[derive(Clone)]
pub struct UserContext {
    pub username: String,
    /// Raw bearer token, kept so logout can revoke it.
    pub token: String,
}

impl std::fmt::Debug for UserContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserContext")
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}
