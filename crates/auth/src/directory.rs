use sqlx::SqlitePool;

use crate::error::{AuthError, Result};
use crate::model::{Role, User};

/// Lookup and creation of user records keyed by email
#[derive(Debug, Clone)]
pub struct UserDirectory {
    db: SqlitePool,
}

impl UserDirectory {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Insert a user. A concurrent registration that slips past the
    /// caller's existence check still fails on the unique email index.
    pub async fn create(&self, email: &str, hashed_password: &str, role: Role) -> Result<User> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (email, hashed_password, role)
            VALUES (?, ?, ?)
            RETURNING id, email, hashed_password, role
            "#,
        )
        .bind(email)
        .bind(hashed_password)
        .bind(role.as_str())
        .fetch_one(&self.db)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                AuthError::DuplicateEmail
            }
            other => AuthError::Database(other),
        })
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, email, hashed_password, role FROM users WHERE email = ? LIMIT 1",
        )
        .bind(email)
        .fetch_optional(&self.db)
        .await?;

        Ok(user)
    }
}
