//! `/api/auth` routes.

use std::sync::Arc;

use axum::extract::State;
use axum::response::Redirect;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;

use super::{ApiJson, ApiPath, MessageResponse};
use crate::error::ApiError;
use crate::services::auth_service::{LoginRequest, RegisterRequest};
use crate::services::AuthService;
use crate::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/register", post(register))
        .route("/verify-email/{token}", get(verify_email))
        .route("/login", post(login))
        .route("/logout", post(logout))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub message: &'static str,
    pub token: String,
    /// Seconds until the token expires
    pub expires_in: i64,
}

async fn register(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<RegisterRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    AuthService::new(state).register(req).await?;
    Ok(Json(MessageResponse::new(
        "Registration successful. Please check your email to verify your account.",
    )))
}

async fn verify_email(
    State(state): State<Arc<AppState>>,
    ApiPath(token): ApiPath<String>,
) -> Result<Redirect, ApiError> {
    let redirect = state.config.login_redirect_url.clone();
    AuthService::new(state).verify_email(&token).await?;
    Ok(Redirect::to(&redirect))
}

async fn login(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let expires_in = state.jwt.lifetime_secs();
    let token = AuthService::new(state).login(req).await?;
    Ok(Json(LoginResponse {
        message: "Logged in successfully",
        token,
        expires_in,
    }))
}

/// Tokens are stateless; the client discards its copy.
async fn logout() -> Json<MessageResponse> {
    Json(MessageResponse::new("Successfully logged out"))
}
