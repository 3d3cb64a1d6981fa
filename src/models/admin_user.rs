use chrono::{DateTime, Utc};

/// A stored admin credential. Only the salted PBKDF2 digest is kept.
#[derive(Clone, PartialEq, Eq)]
pub struct AdminUser {
    pub username: String,
    pub salt: Vec<u8>,
    pub password_hash: Vec<u8>,
    pub iterations: u32,
    pub created_at: DateTime<Utc>,
}

impl std::fmt::Debug for AdminUser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminUser")
            .field("username", &self.username)
            .field("iterations", &self.iterations)
            .field("created_at", &self.created_at)
            .finish_non_exhaustive()
    }
}
