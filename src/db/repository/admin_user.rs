use rusqlite::{params, Connection, OptionalExtension};

use super::patient::{timestamp_from_sql, timestamp_to_sql};
use crate::db::DatabaseError;
use crate::models::AdminUser;

pub fn insert_admin_user(conn: &Connection, user: &AdminUser) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO admin_users (username, salt, password_hash, iterations, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            user.username,
            user.salt,
            user.password_hash,
            user.iterations,
            timestamp_to_sql(&user.created_at),
        ],
    )?;
    Ok(())
}

/// Replace the stored digest for an existing user.
pub fn update_admin_password(
    conn: &Connection,
    username: &str,
    salt: &[u8],
    password_hash: &[u8],
    iterations: u32,
) -> Result<(), DatabaseError> {
    let updated = conn.execute(
        "UPDATE admin_users SET salt = ?2, password_hash = ?3, iterations = ?4 WHERE username = ?1",
        params![username, salt, password_hash, iterations],
    )?;
    if updated == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "AdminUser".into(),
            id: username.into(),
        });
    }
    Ok(())
}

pub fn get_admin_user(conn: &Connection, username: &str) -> Result<Option<AdminUser>, DatabaseError> {
    let row = conn
        .query_row(
            "SELECT username, salt, password_hash, iterations, created_at
             FROM admin_users WHERE username = ?1",
            params![username],
            |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, Vec<u8>>(1)?,
                    row.get::<_, Vec<u8>>(2)?,
                    row.get::<_, u32>(3)?,
                    row.get::<_, String>(4)?,
                ))
            },
        )
        .optional()?;

    row.map(|(username, salt, password_hash, iterations, created_at)| {
        Ok(AdminUser {
            username,
            salt,
            password_hash,
            iterations,
            created_at: timestamp_from_sql(&created_at)?,
        })
    })
    .transpose()
}

pub fn count_admin_users(conn: &Connection) -> Result<i64, DatabaseError> {
    let count = conn.query_row("SELECT COUNT(*) FROM admin_users", [], |row| row.get(0))?;
    Ok(count)
}

