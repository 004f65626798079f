//! # API Error Type
//!
//! Unified error type for HTTP handlers.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in Shopfront                              │
//! │                                                                         │
//! │  Handler / Service                                                     │
//! │  Result<T, ApiError>                                                   │
//! │         │                                                               │
//! │         ├── DbError::NotFound ─────────────┐                           │
//! │         ├── DbError::Domain(CoreError) ────┤                           │
//! │         ├── CoreError::Validation ─────────┼──► ApiError { code, msg } │
//! │         ├── EmailError ────────────────────┤          │                │
//! │         └── auth failures ─────────────────┘          │                │
//! │                                                       ▼                │
//! │                                         IntoResponse: status + JSON    │
//! │                                                                         │
//! │  { "code": "NOT_FOUND", "message": "Device not found: 12" }            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Server-side failures (5xx) are logged with their detail and answered with
//! a generic message.

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use shopfront_core::CoreError;
use shopfront_db::DbError;

use crate::email::EmailError;

/// API error returned from handlers.
///
/// ## Serialization
/// ```json
/// {
///   "code": "INSUFFICIENT_STOCK",
///   "message": "Insufficient quantity for iPhone 15"
/// }
/// ```
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Input validation failed (400)
    ValidationError,

    /// Email already registered (400)
    DuplicateEmail,

    /// Unknown or already used verification token (400)
    InvalidToken,

    /// Unknown email or wrong password (400)
    InvalidCredentials,

    /// Correct password, email not verified yet (400)
    EmailNotVerified,

    /// Missing or invalid bearer token (401)
    Unauthorized,

    /// Resource not found (404)
    NotFound,

    /// Not enough units on hand (400)
    InsufficientStock,

    /// Outgoing mail could not be sent (500)
    EmailDispatch,

    /// Database operation failed (500)
    DatabaseError,

    /// Internal server error (500)
    Internal,
}

impl ErrorCode {
    /// HTTP status for this code.
    pub fn status(self) -> StatusCode {
        match self {
            ErrorCode::ValidationError
            | ErrorCode::DuplicateEmail
            | ErrorCode::InvalidToken
            | ErrorCode::InvalidCredentials
            | ErrorCode::EmailNotVerified
            | ErrorCode::InsufficientStock => StatusCode::BAD_REQUEST,
            ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::EmailDispatch | ErrorCode::DatabaseError | ErrorCode::Internal => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    /// Creates a not found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::NotFound, message)
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    /// Creates an unauthorized error.
    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Unauthorized, message)
    }

    /// Creates an internal error. The detail is logged, not returned.
    pub fn internal(detail: impl std::fmt::Display) -> Self {
        tracing::error!(error = %detail, "Internal error");
        ApiError::new(ErrorCode::Internal, "Internal server error")
    }

    /// HTTP status of this error.
    pub fn status(&self) -> StatusCode {
        self.code.status()
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(self)).into_response()
    }
}

/// Converts database errors to API errors.
impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => {
                ApiError::not_found(format!("{entity} not found: {id}"))
            }
            DbError::UniqueViolation { field, value } if field == "email" => ApiError::new(
                ErrorCode::DuplicateEmail,
                format!("Email '{value}' is already registered"),
            ),
            DbError::Domain(core) => ApiError::from(core),
            DbError::UniqueViolation { field, .. } => {
                tracing::error!(%field, "Unexpected unique violation");
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
            DbError::ForeignKeyViolation { message } => {
                tracing::error!("Foreign key violation: {}", message);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
            DbError::ConnectionFailed(e) => {
                tracing::error!("Database connection failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database connection failed")
            }
            DbError::MigrationFailed(e) => {
                tracing::error!("Database migration failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database migration failed")
            }
            DbError::QueryFailed(e) => {
                tracing::error!("Database query failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
            DbError::TransactionFailed(e) => {
                tracing::error!("Transaction failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database transaction failed")
            }
            DbError::PoolExhausted => {
                tracing::error!("Database pool exhausted");
                ApiError::new(ErrorCode::DatabaseError, "Database is busy")
            }
            DbError::Internal(e) => {
                tracing::error!("Internal database error: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
        }
    }
}

/// Converts core errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::DeviceNotFound(_) | CoreError::ReceiptNotFound(_) => {
                ApiError::not_found(err.to_string())
            }
            CoreError::InsufficientStock { .. } => {
                ApiError::new(ErrorCode::InsufficientStock, err.to_string())
            }
            CoreError::EmptyCart
            | CoreError::CartTooLarge { .. }
            | CoreError::QuantityTooLarge { .. }
            | CoreError::AmountOverflow { .. } => ApiError::validation(err.to_string()),
            CoreError::Validation(inner) => ApiError::validation(inner.to_string()),
        }
    }
}

/// Malformed or mistyped JSON bodies are validation errors.
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::validation(rejection.body_text())
    }
}

/// Unparseable path parameters are validation errors.
impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::validation(rejection.body_text())
    }
}

/// Converts mail failures to API errors.
impl From<EmailError> for ApiError {
    fn from(err: EmailError) -> Self {
        tracing::error!(error = %err, "Email dispatch failed");
        ApiError::new(ErrorCode::EmailDispatch, "Failed to send email")
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
