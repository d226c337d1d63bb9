use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Author with id {0} does not exist")]
    AuthorNotFound(i64),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub type Result<T> = std::result::Result<T, CatalogError>;
