#![allow(dead_code)]

use api::{router::router, AppState};
use axum_test::multipart::{MultipartForm, Part};
use axum_test::TestServer;
use bookshelf_core::{connect_in_memory, AppConfig};
use serde_json::{json, Value};
use std::sync::Arc;

pub const BASE_CONFIG: &str = r#"
[database]
url = "sqlite::memory:"

[auth]
jwt_secret = "integration-test-secret"
"#;

pub async fn server() -> TestServer {
    server_with(BASE_CONFIG).await
}

/// Build a server from a TOML document (database URL is ignored; every
/// server gets its own in-memory store).
pub async fn server_with(config_toml: &str) -> TestServer {
    let config = AppConfig::from_toml_str(config_toml).unwrap();
    let db = connect_in_memory().await.unwrap();
    let state = Arc::new(AppState::from_config(db, &config));
    TestServer::try_new(router(state)).unwrap()
}

/// Register and log in, returning the access token.
pub async fn access_token(server: &TestServer, email: &str) -> String {
    server
        .post("/users/register")
        .json(&json!({ "email": email, "password": "password123" }))
        .await
        .assert_status_ok();

    let body: Value = server
        .post("/users/login")
        .json(&json!({ "email": email, "password": "password123" }))
        .await
        .json();
    body["access_token"].as_str().unwrap().to_string()
}

pub async fn create_author(server: &TestServer, name: &str) -> i64 {
    let body: Value = server
        .post("/authors/")
        .json(&json!({ "name": name }))
        .await
        .json();
    body["id"].as_i64().unwrap()
}

pub async fn create_book(
    server: &TestServer,
    token: &str,
    title: &str,
    genre: &str,
    year: i32,
    author_id: i64,
) -> Value {
    let response = server
        .post("/books/")
        .authorization_bearer(token)
        .json(&json!({
            "title": title,
            "genre": genre,
            "published_year": year,
            "author_id": author_id
        }))
        .await;
    response.assert_status_ok();
    response.json()
}

pub fn json_file(file_name: &str, content: &str) -> MultipartForm {
    MultipartForm::new().add_part(
        "file",
        Part::bytes(content.as_bytes().to_vec())
            .file_name(file_name)
            .mime_type("application/json"),
    )
}
