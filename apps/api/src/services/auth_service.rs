//! Store owner accounts: registration, email verification and login.

use std::sync::Arc;

use serde::Deserialize;
use shopfront_core::validation::{validate_email, validate_password, validate_required};
use shopfront_core::{CoreError, NewStoreOwner, StoreOwner};
use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::{hash_password, verify_password, verify_unknown_account};
use crate::email::verification_email;
use crate::error::{ApiError, ErrorCode};
use crate::AppState;

/// Registration request body.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub owner_name: String,
    pub store_name: String,
    pub email: String,
    pub password: String,
    pub phone: String,
    pub address: String,
}

/// Login request body.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Authentication service.
pub struct AuthService {
    state: Arc<AppState>,
}

impl AuthService {
    pub fn new(state: Arc<AppState>) -> Self {
        AuthService { state }
    }

    /// Registers a pending store owner and emails the verification link.
    ///
    /// The owner row is committed before the email goes out. A dispatch
    /// failure returns `EMAIL_DISPATCH` and leaves the row in place.
    pub async fn register(&self, req: RegisterRequest) -> Result<StoreOwner, ApiError> {
        validate_registration(&req)?;

        let email = normalize_email(&req.email);

        info!(email = %email, store_name = %req.store_name.trim(), "Registration request");

        if self.state.db.owners().email_exists(&email).await? {
            warn!(email = %email, "Registration for existing email");
            return Err(duplicate_email(&email));
        }

        let password_hash = hash_password(&req.password)?;
        let token = Uuid::new_v4().simple().to_string();

        let owner = self
            .state
            .db
            .owners()
            .insert(&NewStoreOwner {
                owner_name: req.owner_name.trim().to_string(),
                store_name: req.store_name.trim().to_string(),
                email: email.clone(),
                password_hash,
                phone: req.phone.trim().to_string(),
                address: req.address.trim().to_string(),
                email_verification_token: token.clone(),
            })
            .await?;

        self.state
            .mailer
            .send(verification_email(
                &owner.email,
                &self.state.config.public_base_url,
                &token,
            ))
            .await?;

        info!(store_id = owner.id, "Store owner registered, verification email sent");
        Ok(owner)
    }

    /// Consumes a verification token.
    pub async fn verify_email(&self, token: &str) -> Result<StoreOwner, ApiError> {
        match self.state.db.owners().verify_email(token).await? {
            Some(owner) => {
                info!(store_id = owner.id, "Email verified");
                Ok(owner)
            }
            None => {
                warn!("Unknown or used verification token");
                Err(ApiError::new(
                    ErrorCode::InvalidToken,
                    "Invalid or expired verification token",
                ))
            }
        }
    }

    /// Checks credentials and issues a session token.
    ///
    /// Unknown email and wrong password produce the same error after the
    /// same Argon2 work. The verified flag is only revealed to a caller who
    /// knows the password.
    pub async fn login(&self, req: LoginRequest) -> Result<String, ApiError> {
        let email = normalize_email(&req.email);

        let owner = self.state.db.owners().find_by_email(&email).await?;
        let password_ok = match &owner {
            Some(owner) => verify_password(&req.password, &owner.password_hash),
            None => verify_unknown_account(&req.password),
        };

        let owner = match owner {
            Some(owner) if password_ok => owner,
            _ => {
                warn!(email = %email, "Login failed");
                return Err(invalid_credentials());
            }
        };

        if !owner.is_verified {
            warn!(store_id = owner.id, "Login before email verification");
            return Err(ApiError::new(
                ErrorCode::EmailNotVerified,
                "Email is not verified",
            ));
        }

        let token = self.state.jwt.generate_token(owner.id, &owner.store_name)?;

        info!(store_id = owner.id, "Login successful");
        Ok(token)
    }
}

fn validate_registration(req: &RegisterRequest) -> Result<(), ApiError> {
    let checks = [
        validate_required("ownerName", &req.owner_name),
        validate_required("storeName", &req.store_name),
        validate_email("email", &req.email),
        validate_password(&req.password),
        validate_required("phone", &req.phone),
        validate_required("address", &req.address),
    ];

    for check in checks {
        check.map_err(CoreError::from)?;
    }
    Ok(())
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn duplicate_email(email: &str) -> ApiError {
    ApiError::new(
        ErrorCode::DuplicateEmail,
        format!("Email '{email}' is already registered"),
    )
}

fn invalid_credentials() -> ApiError {
    ApiError::new(ErrorCode::InvalidCredentials, "Invalid credentials")
}
