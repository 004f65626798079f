//! HTTP routes.
//!
//! ```text
//! /health                          health
//! /api/auth/...                    auth       (public)
//! /api/inventory/devices[/{id}]    inventory  (bearer)
//! /api/sales[/...]                 sales      (bearer)
//! ```

pub mod auth;
pub mod health;
pub mod inventory;
pub mod sales;

use axum::extract::{FromRequest, FromRequestParts};
use serde::Serialize;

use crate::error::ApiError;

/// JSON body extractor whose rejections use the API error body.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// Path parameter extractor whose rejections use the API error body.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct ApiPath<T>(pub T);

/// `{ "message": ... }`
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

impl MessageResponse {
    pub fn new(message: &'static str) -> Self {
        MessageResponse { message }
    }
}
