use sqlx::SqlitePool;

use crate::error::Result;
use crate::model::Author;

/// Creation and listing of authors.
///
/// Bulk import follows a fetch-or-create policy: it never fails on the
/// data itself, an existing name simply resolves to the stored row.
#[derive(Debug, Clone)]
pub struct AuthorRegistry {
    db: SqlitePool,
}

impl AuthorRegistry {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Insert unconditionally; names are not unique on single create.
    pub async fn create(&self, name: &str) -> Result<Author> {
        let author = sqlx::query_as::<_, Author>(
            "INSERT INTO authors (name) VALUES (?) RETURNING id, name",
        )
        .bind(name)
        .fetch_one(&self.db)
        .await?;

        Ok(author)
    }

    pub async fn list(&self) -> Result<Vec<Author>> {
        let authors = sqlx::query_as::<_, Author>("SELECT id, name FROM authors ORDER BY id")
            .fetch_all(&self.db)
            .await?;

        Ok(authors)
    }

    /// Resolve every name to an author row, inserting the missing ones.
    /// Results follow input order; running the same batch twice creates nothing new.
    pub async fn bulk_import(&self, names: &[String]) -> Result<Vec<Author>> {
        let mut conn = self.db.acquire().await?;
        let mut results = Vec::with_capacity(names.len());
        let mut inserted = 0usize;

        for name in names {
            let existing = sqlx::query_as::<_, Author>(
                "SELECT id, name FROM authors WHERE name = ? ORDER BY id LIMIT 1",
            )
            .bind(name)
            .fetch_optional(&mut *conn)
            .await?;

            let author = match existing {
                Some(author) => author,
                None => {
                    inserted += 1;
                    sqlx::query_as::<_, Author>(
                        "INSERT INTO authors (name) VALUES (?) RETURNING id, name",
                    )
                    .bind(name)
                    .fetch_one(&mut *conn)
                    .await?
                }
            };
            results.push(author);
        }

        tracing::info!(requested = names.len(), inserted, "imported authors");
        Ok(results)
    }
}
