mod common;

use axum::http::StatusCode;
use common::{access_token, server, server_with};
use serde_json::{json, Value};

#[tokio::test]
async fn test_root_reports_running() {
    let server = server().await;

    let body: Value = server.get("/").await.json();
    assert_eq!(body["message"], "Book Management API is running");
}

#[tokio::test]
async fn test_register_user() {
    let server = server().await;

    let response = server
        .post("/users/register")
        .json(&json!({ "email": "new@example.com", "password": "strongpass" }))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["email"], "new@example.com");
    assert_eq!(body["role"], "user");
    assert!(body["id"].as_i64().is_some());
    assert!(body.get("hashed_password").is_none());
}

#[tokio::test]
async fn test_register_duplicate_email() {
    let server = server().await;
    let payload = json!({ "email": "dup@example.com", "password": "strongpass" });

    server.post("/users/register").json(&payload).await.assert_status_ok();
    let response = server
        .post("/users/register")
        .json(&json!({ "email": "dup@example.com", "password": "anotherpass" }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"], "Email already registered");
}

#[tokio::test]
async fn test_register_validation() {
    let server = server().await;

    let bad_email = server
        .post("/users/register")
        .json(&json!({ "email": "not-an-email", "password": "strongpass" }))
        .await;
    bad_email.assert_status(StatusCode::UNPROCESSABLE_ENTITY);

    let short_password = server
        .post("/users/register")
        .json(&json!({ "email": "short@example.com", "password": "12345" }))
        .await;
    short_password.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_login_success() {
    let server = server().await;
    server
        .post("/users/register")
        .json(&json!({ "email": "login@example.com", "password": "password123" }))
        .await
        .assert_status_ok();

    let response = server
        .post("/users/login")
        .json(&json!({ "email": "login@example.com", "password": "password123" }))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert!(body["access_token"].as_str().is_some());
    assert!(body["refresh_token"].as_str().is_some());
    assert_eq!(body["token_type"], "bearer");
}

#[tokio::test]
async fn test_login_invalid_credentials() {
    let server = server().await;
    access_token(&server, "exists@example.com").await;

    for payload in [
        json!({ "email": "notexist@example.com", "password": "wrong" }),
        json!({ "email": "exists@example.com", "password": "wrong-password" }),
    ] {
        let response = server.post("/users/login").json(&payload).await;
        response.assert_status(StatusCode::UNAUTHORIZED);
        let body: Value = response.json();
        assert_eq!(body["error"], "Invalid credentials");
    }
}

#[tokio::test]
async fn test_refresh_token() {
    let server = server().await;
    server
        .post("/users/register")
        .json(&json!({ "email": "refresh@example.com", "password": "password123" }))
        .await
        .assert_status_ok();
    let login: Value = server
        .post("/users/login")
        .json(&json!({ "email": "refresh@example.com", "password": "password123" }))
        .await
        .json();
    let refresh_token = login["refresh_token"].as_str().unwrap();

    let response = server
        .post("/users/refresh")
        .add_query_param("refresh_token", refresh_token)
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["token_type"], "bearer");

    // The minted token works as an access token
    let access = body["access_token"].as_str().unwrap();
    let me: Value = server.get("/users/me").authorization_bearer(access).await.json();
    assert_eq!(me["email"], "refresh@example.com");
}

#[tokio::test]
async fn test_refresh_rejects_access_token() {
    let server = server().await;
    let access = access_token(&server, "swap@example.com").await;

    let response = server
        .post("/users/refresh")
        .add_query_param("refresh_token", &access)
        .await;

    response.assert_status(StatusCode::UNAUTHORIZED);
    let body: Value = response.json();
    assert_eq!(body["error"], "Invalid or expired token");
}

#[tokio::test]
async fn test_malformed_requests_get_json_errors() {
    let server = server().await;

    let missing_token = server.post("/users/refresh").await;
    missing_token.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    assert!(missing_token.json::<Value>()["error"].is_string());

    let broken_body = server
        .post("/users/register")
        .text("{\"email\": ")
        .content_type("application/json")
        .await;
    broken_body.assert_status(StatusCode::BAD_REQUEST);
    assert!(broken_body.json::<Value>()["error"].is_string());

    let missing_field = server
        .post("/users/login")
        .json(&json!({ "email": "nobody@example.com" }))
        .await;
    missing_field.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    assert!(missing_field.json::<Value>()["error"].is_string());
}

#[tokio::test]
async fn test_current_user_requires_access_token() {
    let server = server().await;
    access_token(&server, "me@example.com").await;
    let login_body: Value = server
        .post("/users/login")
        .json(&json!({ "email": "me@example.com", "password": "password123" }))
        .await
        .json();
    let access = login_body["access_token"].as_str().unwrap();
    let refresh = login_body["refresh_token"].as_str().unwrap();

    let ok = server.get("/users/me").authorization_bearer(access).await;
    ok.assert_status_ok();
    assert_eq!(ok.json::<Value>()["email"], "me@example.com");

    server
        .get("/users/me")
        .authorization_bearer(refresh)
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
    server
        .get("/users/me")
        .authorization_bearer("garbage")
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
    server.get("/users/me").await.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_token_from_other_secret_is_rejected() {
    let issuer = server_with(
        r#"
        [database]
        url = "sqlite::memory:"

        [auth]
        jwt_secret = "some-other-secret"
        "#,
    )
    .await;
    let foreign = access_token(&issuer, "foreign@example.com").await;

    let server = server().await;
    server
        .get("/users/me")
        .authorization_bearer(&foreign)
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_verify_subject_policy() {
    let strict_config = r#"
        [database]
        url = "sqlite::memory:"

        [auth]
        jwt_secret = "integration-test-secret"
        verify_subject = true
        "#;

    // Same secret, different store: the subject is unknown to `strict`
    let issuer = server().await;
    let token = access_token(&issuer, "elsewhere@example.com").await;

    let trusting = server().await;
    trusting
        .get("/users/me")
        .authorization_bearer(&token)
        .await
        .assert_status_ok();

    let strict = server_with(strict_config).await;
    strict
        .get("/users/me")
        .authorization_bearer(&token)
        .await
        .assert_status(StatusCode::UNAUTHORIZED);

    let own = access_token(&strict, "local@example.com").await;
    strict
        .get("/users/me")
        .authorization_bearer(&own)
        .await
        .assert_status_ok();
}
