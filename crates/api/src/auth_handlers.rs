use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;

use crate::error::ApiResult;
use crate::extract::{JsonBody, QueryParams};
use crate::middleware::AuthUser;
use crate::AppState;
use auth::{CurrentUser, TokenPair, UserView};

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(email(message = "value is not a valid email address"))]
    pub email: String,
    #[validate(length(min = 6, message = "password must be at least 6 characters"))]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RefreshParams {
    pub refresh_token: String,
}

#[derive(Debug, Serialize)]
pub struct AccessTokenResponse {
    pub access_token: String,
    pub token_type: String,
}

/// POST /users/register
pub async fn register(
    State(state): State<Arc<AppState>>,
    JsonBody(payload): JsonBody<RegisterRequest>,
) -> ApiResult<Json<UserView>> {
    payload.validate()?;

    let user = state
        .auth_service
        .register(&payload.email, &payload.password)
        .await?;

    Ok(Json(user))
}

/// POST /users/login
pub async fn login(
    State(state): State<Arc<AppState>>,
    JsonBody(payload): JsonBody<LoginRequest>,
) -> ApiResult<Json<TokenPair>> {
    let pair = state
        .auth_service
        .login(&payload.email, &payload.password)
        .await
        .inspect_err(|e| tracing::warn!(error = %e, "login failed"))?;

    Ok(Json(pair))
}

/// POST /users/refresh?refresh_token=...
pub async fn refresh(
    State(state): State<Arc<AppState>>,
    QueryParams(params): QueryParams<RefreshParams>,
) -> ApiResult<Json<AccessTokenResponse>> {
    let access_token = state.auth_service.refresh(&params.refresh_token).await?;

    Ok(Json(AccessTokenResponse {
        access_token,
        token_type: "bearer".to_string(),
    }))
}

/// GET /users/me
pub async fn me(AuthUser(user): AuthUser) -> Json<CurrentUser> {
    Json(user)
}
