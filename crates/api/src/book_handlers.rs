use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;

use crate::error::{ApiError, ApiResult};
use crate::extract::{JsonBody, PathParam, QueryParams};
use crate::middleware::AuthUser;
use crate::upload::JsonFile;
use crate::AppState;
use catalog::{Book, BookFilter, BookSort, BookUpdate, Genre, NewBook, Pagination, YearPolicy};

#[derive(Debug, Deserialize, Validate)]
pub struct ListBooksParams {
    pub title: Option<String>,
    pub genre: Option<Genre>,
    pub year_from: Option<i32>,
    pub year_to: Option<i32>,
    #[serde(default = "default_limit")]
    #[validate(range(min = 1, max = 100, message = "limit must be between 1 and 100"))]
    pub limit: i64,
    #[serde(default)]
    #[validate(range(min = 0, message = "offset must not be negative"))]
    pub offset: i64,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
}

fn default_limit() -> i64 {
    10
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub message: String,
    pub id: i64,
}

fn check_year(policy: YearPolicy, year: i32) -> ApiResult<()> {
    policy.check(year).map_err(ApiError::Validation)
}

fn validate_new_book(policy: YearPolicy, book: &NewBook) -> ApiResult<()> {
    book.validate()?;
    check_year(policy, book.published_year)
}

/// POST /books/
pub async fn create_book(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    JsonBody(payload): JsonBody<NewBook>,
) -> ApiResult<Json<Book>> {
    validate_new_book(state.year_policy, &payload)?;

    let book = state.books.create(&payload).await?;
    tracing::info!(book_id = book.id, user = %user.email, "book created");
    Ok(Json(book))
}

/// GET /books/ - filtered, sorted, paginated listing
pub async fn list_books(
    State(state): State<Arc<AppState>>,
    QueryParams(params): QueryParams<ListBooksParams>,
) -> ApiResult<Json<Vec<Book>>> {
    params.validate()?;

    let sort = BookSort::parse(params.sort_by.as_deref(), params.sort_order.as_deref());
    let page = Pagination {
        limit: params.limit,
        offset: params.offset,
    };
    let filter = BookFilter {
        title: params.title,
        genre: params.genre,
        published_year_from: params.year_from,
        published_year_to: params.year_to,
    };

    Ok(Json(state.books.list(&filter, page, sort).await?))
}

/// GET /books/{id}
pub async fn get_book(
    State(state): State<Arc<AppState>>,
    PathParam(book_id): PathParam<i64>,
) -> ApiResult<Json<Book>> {
    state
        .books
        .get(book_id)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound("Book"))
}

/// PUT /books/{id} - partial update
pub async fn update_book(
    State(state): State<Arc<AppState>>,
    PathParam(book_id): PathParam<i64>,
    AuthUser(user): AuthUser,
    JsonBody(payload): JsonBody<BookUpdate>,
) -> ApiResult<Json<Book>> {
    payload.validate()?;
    if let Some(year) = payload.published_year {
        check_year(state.year_policy, year)?;
    }

    let book = state
        .books
        .update(book_id, &payload)
        .await?
        .ok_or(ApiError::NotFound("Book"))?;

    tracing::info!(book_id, user = %user.email, "book updated");
    Ok(Json(book))
}

/// DELETE /books/{id}
pub async fn delete_book(
    State(state): State<Arc<AppState>>,
    PathParam(book_id): PathParam<i64>,
    AuthUser(user): AuthUser,
) -> ApiResult<Json<DeleteResponse>> {
    let id = state
        .books
        .delete(book_id)
        .await?
        .ok_or(ApiError::NotFound("Book"))?;

    tracing::info!(book_id = id, user = %user.email, "book deleted");
    Ok(Json(DeleteResponse {
        message: "Book deleted".to_string(),
        id,
    }))
}

/// POST /books/bulk - JSON file of book objects
///
/// Every element is validated before the first insert.
pub async fn bulk_import_books(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    JsonFile(items): JsonFile<NewBook>,
) -> ApiResult<Json<Vec<Book>>> {
    for item in &items {
        validate_new_book(state.year_policy, item)?;
    }

    let books = state.books.bulk_import(&items).await?;
    tracing::info!(count = books.len(), user = %user.email, "book import finished");
    Ok(Json(books))
}
