use axum::{
    middleware,
    routing::{get, post, put},
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::{
    author_handlers, auth_handlers, book_handlers, middleware as auth_middleware, rate_limit,
    AppState,
};

async fn root() -> Json<Value> {
    Json(json!({ "message": "Book Management API is running" }))
}

pub fn router(state: Arc<AppState>) -> Router {
    let require_auth = middleware::from_fn_with_state(state.clone(), auth_middleware::require_auth);
    let limit_listing =
        middleware::from_fn_with_state(state.clone(), rate_limit::limit_author_listing);

    // User routes; only /users/me needs a token
    let user_routes = Router::new()
        .route("/users/register", post(auth_handlers::register))
        .route("/users/login", post(auth_handlers::login))
        .route("/users/refresh", post(auth_handlers::refresh))
        .route(
            "/users/me",
            get(auth_handlers::me).route_layer(require_auth.clone()),
        );

    // Author routes; the listing is rate limited per client
    let author_collection = get(author_handlers::list_authors)
        .route_layer(limit_listing)
        .post(author_handlers::create_author);
    let author_routes = Router::new()
        .route("/authors", author_collection.clone())
        .route("/authors/", author_collection)
        .route("/authors/bulk", post(author_handlers::bulk_import_authors));

    // Book routes; reads are public, every mutation requires an access token.
    // A method router layer only wraps the methods registered before it.
    let book_collection = post(book_handlers::create_book)
        .route_layer(require_auth.clone())
        .get(book_handlers::list_books);
    let book_item = put(book_handlers::update_book)
        .delete(book_handlers::delete_book)
        .route_layer(require_auth.clone())
        .get(book_handlers::get_book);
    let book_routes = Router::new()
        .route("/books", book_collection.clone())
        .route("/books/", book_collection)
        .route(
            "/books/bulk",
            post(book_handlers::bulk_import_books).route_layer(require_auth),
        )
        .route("/books/{book_id}", book_item);

    // Combine all routes
    Router::new()
        .route("/", get(root))
        .merge(user_routes)
        .merge(author_routes)
        .merge(book_routes)
        .with_state(state)
}
