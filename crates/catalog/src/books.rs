use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};

use crate::error::{CatalogError, Result};
use crate::model::{Book, BookFilter, BookSort, BookUpdate, NewBook, Pagination};

const BOOK_COLUMNS: &str = "id, title, genre, published_year, author_id";

/// Book CRUD, filtered listing and bulk import.
///
/// Every operation works on a single pooled connection that is returned to
/// the pool when the operation ends, whatever the outcome.
#[derive(Debug, Clone)]
pub struct BookCatalog {
    db: SqlitePool,
}

impl BookCatalog {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    pub async fn create(&self, book: &NewBook) -> Result<Book> {
        let mut conn = self.db.acquire().await?;

        ensure_author(&mut conn, book.author_id).await?;
        let created = insert_book(&mut conn, book).await?;

        tracing::debug!(book_id = created.id, "created book");
        Ok(created)
    }

    pub async fn list(
        &self,
        filter: &BookFilter,
        page: Pagination,
        sort: BookSort,
    ) -> Result<Vec<Book>> {
        let mut conn = self.db.acquire().await?;
        let mut qb = list_query(filter, page, sort);

        let books = qb.build_query_as::<Book>().fetch_all(&mut *conn).await?;
        Ok(books)
    }

    pub async fn get(&self, id: i64) -> Result<Option<Book>> {
        let book = sqlx::query_as::<_, Book>(&format!(
            "SELECT {BOOK_COLUMNS} FROM books WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?;

        Ok(book)
    }

    /// Apply the supplied fields only.
    ///
    /// An update with no fields reports `None`, exactly like a missing id,
    /// and never touches the store.
    pub async fn update(&self, id: i64, update: &BookUpdate) -> Result<Option<Book>> {
        if update.is_empty() {
            return Ok(None);
        }

        let mut conn = self.db.acquire().await?;
        if let Some(author_id) = update.author_id {
            ensure_author(&mut conn, author_id).await?;
        }

        let mut qb = QueryBuilder::<Sqlite>::new("UPDATE books SET ");
        let mut fields = qb.separated(", ");
        if let Some(title) = &update.title {
            fields.push("title = ").push_bind_unseparated(title.clone());
            fields
                .push("title_search = ")
                .push_bind_unseparated(search_key(title));
        }
        if let Some(genre) = update.genre {
            fields.push("genre = ").push_bind_unseparated(genre.as_str());
        }
        if let Some(year) = update.published_year {
            fields.push("published_year = ").push_bind_unseparated(year);
        }
        if let Some(author_id) = update.author_id {
            fields.push("author_id = ").push_bind_unseparated(author_id);
        }
        qb.push(" WHERE id = ").push_bind(id);
        qb.push(" RETURNING ").push(BOOK_COLUMNS);

        let updated = qb.build_query_as::<Book>().fetch_optional(&mut *conn).await?;
        Ok(updated)
    }

    pub async fn delete(&self, id: i64) -> Result<Option<i64>> {
        let deleted: Option<i64> = sqlx::query_scalar("DELETE FROM books WHERE id = ? RETURNING id")
            .bind(id)
            .fetch_optional(&self.db)
            .await?;

        Ok(deleted)
    }

    /// Import books in order, reusing rows that match on `(title, author_id)`.
    ///
    /// The first element whose author is missing aborts the call with
    /// [`CatalogError::AuthorNotFound`]. Each statement commits on its own,
    /// so rows inserted before that element remain.
    pub async fn bulk_import(&self, books: &[NewBook]) -> Result<Vec<Book>> {
        let mut conn = self.db.acquire().await?;
        let mut results = Vec::with_capacity(books.len());
        let mut inserted = 0usize;

        for book in books {
            if let Err(e) = ensure_author(&mut conn, book.author_id).await {
                tracing::warn!(
                    author_id = book.author_id,
                    processed = results.len(),
                    inserted,
                    "book import aborted on missing author"
                );
                return Err(e);
            }

            let existing = sqlx::query_as::<_, Book>(&format!(
                "SELECT {BOOK_COLUMNS} FROM books WHERE title = ? AND author_id = ? ORDER BY id LIMIT 1"
            ))
            .bind(&book.title)
            .bind(book.author_id)
            .fetch_optional(&mut *conn)
            .await?;

            let row = match existing {
                Some(row) => row,
                None => {
                    inserted += 1;
                    insert_book(&mut conn, book).await?
                }
            };
            results.push(row);
        }

        tracing::info!(requested = books.len(), inserted, "imported books");
        Ok(results)
    }
}

async fn ensure_author(conn: &mut SqliteConnection, author_id: i64) -> Result<()> {
    let found: Option<i64> = sqlx::query_scalar("SELECT id FROM authors WHERE id = ?")
        .bind(author_id)
        .fetch_optional(&mut *conn)
        .await?;

    match found {
        Some(_) => Ok(()),
        None => Err(CatalogError::AuthorNotFound(author_id)),
    }
}

async fn insert_book(conn: &mut SqliteConnection, book: &NewBook) -> Result<Book> {
    let created = sqlx::query_as::<_, Book>(&format!(
        "INSERT INTO books (title, title_search, genre, published_year, author_id) VALUES (?, ?, ?, ?, ?) RETURNING {BOOK_COLUMNS}"
    ))
    .bind(&book.title)
    .bind(search_key(&book.title))
    .bind(book.genre.as_str())
    .bind(book.published_year)
    .bind(book.author_id)
    .fetch_one(&mut *conn)
    .await?;

    Ok(created)
}

/// Case-folded copy of a title, stored in `title_search`.
///
/// SQLite's `LOWER` and `LIKE` only fold ASCII, so both the column and the
/// filter pattern are folded here instead.
fn search_key(title: &str) -> String {
    title.to_lowercase()
}

/// Escape `LIKE` wildcards so caller text matches literally under `ESCAPE '\'`.
fn escape_like(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Build the listing statement. Caller text only ever reaches the query
/// as bound parameters; the ORDER BY clause comes from fixed enum names.
fn list_query(filter: &BookFilter, page: Pagination, sort: BookSort) -> QueryBuilder<'static, Sqlite> {
    let mut qb = QueryBuilder::<Sqlite>::new("SELECT ");
    qb.push(BOOK_COLUMNS).push(" FROM books WHERE 1 = 1");

    if let Some(title) = filter.title.as_deref().filter(|t| !t.is_empty()) {
        qb.push(" AND title_search LIKE ")
            .push_bind(format!("%{}%", escape_like(&search_key(title))))
            .push(" ESCAPE '\\'");
    }
    if let Some(genre) = filter.genre {
        qb.push(" AND genre = ").push_bind(genre.as_str());
    }
    if let Some(from) = filter.published_year_from {
        qb.push(" AND published_year >= ").push_bind(from);
    }
    if let Some(to) = filter.published_year_to {
        qb.push(" AND published_year <= ").push_bind(to);
    }

    qb.push(" ORDER BY ")
        .push(sort.field.column())
        .push(" ")
        .push(sort.order.keyword());
    qb.push(" LIMIT ").push_bind(page.limit);
    qb.push(" OFFSET ").push_bind(page.offset);

    qb
}
