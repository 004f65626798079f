//! JWT authentication module.
//!
//! Handles session token generation and validation, password hashing, and
//! the [`AuthStore`] extractor that guards inventory and sales routes.
//!
//! ## Request Authentication
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Authorization: Bearer <jwt>                                           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  extract_bearer_token() ── missing / malformed ──► 401 UNAUTHORIZED    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  JwtManager::validate_token() ── bad signature / expired ──► 401       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  AuthStore { store_id, store_name } ──► handler                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::{Arc, OnceLock};

use argon2::password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, TokenData, Validation};
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use crate::error::ApiError;
use crate::AppState;

/// JWT claims structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (store owner id)
    pub sub: String,

    /// Store name, printed on receipts
    pub store_name: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration (Unix timestamp)
    pub exp: i64,

    /// JWT ID (unique identifier for this token)
    pub jti: String,
}

/// JWT token manager.
pub struct JwtManager {
    secret: String,
    lifetime_secs: i64,
}

impl JwtManager {
    /// Create a new JWT manager.
    pub fn new(secret: String, lifetime_secs: i64) -> Self {
        JwtManager {
            secret,
            lifetime_secs,
        }
    }

    /// Token lifetime in seconds.
    pub fn lifetime_secs(&self) -> i64 {
        self.lifetime_secs
    }

    /// Generate a session token for a store owner.
    pub fn generate_token(&self, store_id: i64, store_name: &str) -> Result<String, ApiError> {
        let now = Utc::now();
        let exp = now + Duration::seconds(self.lifetime_secs);

        let claims = Claims {
            sub: store_id.to_string(),
            store_name: store_name.to_string(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| ApiError::internal(format!("Failed to generate token: {e}")))
    }

    /// Validate and decode a token.
    pub fn validate_token(&self, token: &str) -> Result<Claims, ApiError> {
        let validation = Validation::default();

        let token_data: TokenData<Claims> = decode(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        )
        .map_err(|e| {
            warn!(error = %e, "Rejected session token");
            ApiError::unauthorized("Invalid or expired token")
        })?;

        Ok(token_data.claims)
    }
}

/// Extract bearer token from authorization header.
pub fn extract_bearer_token(auth_header: &str) -> Option<&str> {
    auth_header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

// =============================================================================
// Passwords
// =============================================================================

/// Hash a password with Argon2id and a random salt (PHC string).
pub fn hash_password(password: &str) -> Result<String, ApiError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| ApiError::internal(format!("Failed to hash password: {e}")))
}

/// Hash checked when a login names an unknown email.
static UNKNOWN_ACCOUNT_HASH: OnceLock<Option<String>> = OnceLock::new();

/// Runs one full Argon2 verification against a throwaway hash and returns
/// `false`, so unknown emails cost the same as wrong passwords.
pub fn verify_unknown_account(password: &str) -> bool {
    let hash = UNKNOWN_ACCOUNT_HASH.get_or_init(|| hash_password("unknown-account").ok());

    if let Some(hash) = hash {
        let _ = verify_password(password, hash);
    }
    false
}

/// Verify a password against a stored PHC string.
pub fn verify_password(password: &str, hash: &str) -> bool {
    let parsed_hash = match PasswordHash::new(hash) {
        Ok(h) => h,
        Err(_) => return false,
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

// =============================================================================
// Extractor
// =============================================================================

/// The authenticated store of a request.
///
/// # Example
///
/// ```rust,ignore
/// async fn list_devices(
///     State(state): State<Arc<AppState>>,
///     AuthStore(store): AuthStore,
/// ) -> Result<Json<Vec<Device>>, ApiError> { ... }
/// ```
#[derive(Debug, Clone)]
pub struct AuthStore(pub AuthenticatedStore);

/// Identity carried by a valid session token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedStore {
    pub store_id: i64,
    pub store_name: String,
}

impl FromRequestParts<Arc<AppState>> for AuthStore {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| ApiError::unauthorized("Missing authorization token"))?;

        let token = extract_bearer_token(header)
            .ok_or_else(|| ApiError::unauthorized("Malformed authorization header"))?;

        let claims = state.jwt.validate_token(token)?;

        let store_id = claims
            .sub
            .parse::<i64>()
            .map_err(|_| ApiError::unauthorized("Invalid or expired token"))?;

        Ok(AuthStore(AuthenticatedStore {
            store_id,
            store_name: claims.store_name,
        }))
    }
}
