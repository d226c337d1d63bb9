use axum::{extract::State, Json};
use std::sync::Arc;

use crate::error::ApiResult;
use crate::extract::JsonBody;
use crate::upload::JsonFile;
use crate::AppState;
use catalog::{Author, NewAuthor};

/// POST /authors/
pub async fn create_author(
    State(state): State<Arc<AppState>>,
    JsonBody(payload): JsonBody<NewAuthor>,
) -> ApiResult<Json<Author>> {
    let author = state.authors.create(&payload.name).await?;
    Ok(Json(author))
}

/// GET /authors/
pub async fn list_authors(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<Author>>> {
    Ok(Json(state.authors.list().await?))
}

/// POST /authors/bulk - JSON file of `{name}` objects
pub async fn bulk_import_authors(
    State(state): State<Arc<AppState>>,
    JsonFile(items): JsonFile<NewAuthor>,
) -> ApiResult<Json<Vec<Author>>> {
    let names: Vec<String> = items.into_iter().map(|a| a.name).collect();

    Ok(Json(state.authors.bulk_import(&names).await?))
}
