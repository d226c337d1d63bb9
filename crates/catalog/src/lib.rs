//! Authors and books over the relational store
//!
//! Provides:
//! - Author creation, listing and fetch-or-create bulk import
//! - Book CRUD with partial updates
//! - Filtered, sorted and paginated book listing
//! - Book bulk import that aborts on the first missing author
//! - The configurable `published_year` rule

pub mod authors;
pub mod books;
pub mod error;
pub mod model;
pub mod validation;

pub use authors::AuthorRegistry;
pub use books::BookCatalog;
pub use error::{CatalogError, Result};
pub use model::{
    Author, Book, BookFilter, BookSort, BookUpdate, Genre, NewAuthor, NewBook, Pagination,
    SortField, SortOrder,
};
pub use validation::YearPolicy;
