use async_trait::async_trait;
use sqlx::{SqliteConnection, SqlitePool};

/// A single forward-only schema change.
#[async_trait]
pub trait Migration: Send + Sync {
    fn name(&self) -> &str;

    fn version(&self) -> i64;

    async fn up(&self, conn: &mut SqliteConnection) -> Result<(), sqlx::Error>;
}

/// Migration to create users table
struct CreateUsersTable;

#[async_trait]
impl Migration for CreateUsersTable {
    fn name(&self) -> &str {
        "create_users_table"
    }

    fn version(&self) -> i64 {
        20250901_000001
    }

    async fn up(&self, conn: &mut SqliteConnection) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            CREATE TABLE users (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                email TEXT NOT NULL,
                hashed_password TEXT NOT NULL,
                role TEXT NOT NULL DEFAULT 'user'
            )
            "#,
        )
        .execute(&mut *conn)
        .await?;
        sqlx::query("CREATE UNIQUE INDEX idx_users_email ON users (email)")
            .execute(&mut *conn)
            .await?;
        Ok(())
    }
}

/// Migration to create authors table
struct CreateAuthorsTable;

#[async_trait]
impl Migration for CreateAuthorsTable {
    fn name(&self) -> &str {
        "create_authors_table"
    }

    fn version(&self) -> i64 {
        20250901_000002
    }

    async fn up(&self, conn: &mut SqliteConnection) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            CREATE TABLE authors (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL
            )
            "#,
        )
        .execute(&mut *conn)
        .await?;
        // Bulk import looks authors up by exact name.
        sqlx::query("CREATE INDEX idx_authors_name ON authors (name)")
            .execute(&mut *conn)
            .await?;
        Ok(())
    }
}

/// Migration to create books table
struct CreateBooksTable;

#[async_trait]
impl Migration for CreateBooksTable {
    fn name(&self) -> &str {
        "create_books_table"
    }

    fn version(&self) -> i64 {
        20250901_000003
    }

    async fn up(&self, conn: &mut SqliteConnection) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            CREATE TABLE books (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL,
                title_search TEXT NOT NULL,
                genre TEXT NOT NULL,
                published_year INTEGER NOT NULL,
                author_id INTEGER NOT NULL REFERENCES authors (id)
            )
            "#,
        )
        .execute(&mut *conn)
        .await?;
        sqlx::query("CREATE INDEX idx_books_title_author ON books (title, author_id)")
            .execute(&mut *conn)
            .await?;
        sqlx::query("CREATE INDEX idx_books_author_id ON books (author_id)")
            .execute(&mut *conn)
            .await?;
        Ok(())
    }
}

fn all_migrations() -> Vec<Box<dyn Migration>> {
    vec![
        Box::new(CreateUsersTable),
        Box::new(CreateAuthorsTable),
        Box::new(CreateBooksTable),
    ]
}

/// Run all pending migrations in version order.
/// Returns the number of migrations applied by this call.
pub async fn run_migrations(pool: &SqlitePool) -> Result<usize, sqlx::Error> {
    let mut conn = pool.acquire().await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            applied_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(&mut *conn)
    .await?;

    let applied: Vec<i64> = sqlx::query_scalar("SELECT version FROM schema_migrations")
        .fetch_all(&mut *conn)
        .await?;

    let mut migrations = all_migrations();
    migrations.sort_by_key(|m| m.version());

    let mut count = 0;
    for migration in migrations.iter().filter(|m| !applied.contains(&m.version())) {
        let mut tx = sqlx::Connection::begin(&mut *conn).await?;
        migration.up(&mut tx).await?;
        sqlx::query("INSERT INTO schema_migrations (version, name) VALUES (?, ?)")
            .bind(migration.version())
            .bind(migration.name())
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        tracing::info!(version = migration.version(), name = migration.name(), "applied migration");
        count += 1;
    }

    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DatabaseConfig;
    use crate::database::connect;

    async fn bare_pool() -> SqlitePool {
        connect(&DatabaseConfig {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
        })
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_migrations_apply_once() {
        let pool = bare_pool().await;

        assert_eq!(run_migrations(&pool).await.unwrap(), 3);
        assert_eq!(run_migrations(&pool).await.unwrap(), 0);

        let versions: Vec<i64> =
            sqlx::query_scalar("SELECT version FROM schema_migrations ORDER BY version")
                .fetch_all(&pool)
                .await
                .unwrap();
        assert_eq!(versions, vec![20250901_000001, 20250901_000002, 20250901_000003]);
    }

    #[tokio::test]
    async fn test_email_is_unique() {
        let pool = bare_pool().await;
        run_migrations(&pool).await.unwrap();

        let insert = "INSERT INTO users (email, hashed_password) VALUES ('a@b.c', 'x')";
        sqlx::query(insert).execute(&pool).await.unwrap();
        assert!(sqlx::query(insert).execute(&pool).await.is_err());
    }

    #[tokio::test]
    async fn test_book_requires_existing_author() {
        let pool = bare_pool().await;
        run_migrations(&pool).await.unwrap();

        let result = sqlx::query(
            "INSERT INTO books (title, title_search, genre, published_year, author_id) VALUES ('t', 't', 'Fiction', 2000, 42)",
        )
        .execute(&pool)
        .await;
        assert!(result.is_err());
    }
}
