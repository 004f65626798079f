//! # Store Owner Repository
//!
//! Credential store for store owners.
//!
//! ## Account Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  insert()            is_verified = false, token = <opaque>             │
//! │     │                                                                   │
//! │     ▼                                                                   │
//! │  verify_email(token) is_verified = true,  token = NULL                 │
//! │     │                (single conditional UPDATE, single use)            │
//! │     ▼                                                                   │
//! │  find_by_email()     login lookups                                     │
//! │                                                                         │
//! │  Owners are never deleted.                                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use shopfront_core::{NewStoreOwner, StoreOwner};

/// Repository for store owner records.
#[derive(Debug, Clone)]
pub struct StoreOwnerRepository {
    pool: SqlitePool,
}

impl StoreOwnerRepository {
    /// Creates a new StoreOwnerRepository.
    pub fn new(pool: SqlitePool) -> Self {
        StoreOwnerRepository { pool }
    }

    /// Inserts a pending (unverified) store owner.
    ///
    /// ## Returns
    /// * `Ok(StoreOwner)` - Inserted owner with generated id
    /// * `Err(DbError::UniqueViolation)` - Email already registered
    pub async fn insert(&self, owner: &NewStoreOwner) -> DbResult<StoreOwner> {
        debug!(email = %owner.email, store_name = %owner.store_name, "Inserting store owner");

        let now = Utc::now();

        let result = sqlx::query_as::<_, StoreOwner>(
            r#"
            INSERT INTO stores (
                owner_name, store_name, email, password_hash,
                phone, address, email_verification_token, is_verified,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 0, ?8, ?8)
            RETURNING
                id, owner_name, store_name, email, password_hash,
                phone, address, email_verification_token, is_verified,
                created_at, updated_at
            "#,
        )
        .bind(&owner.owner_name)
        .bind(&owner.store_name)
        .bind(&owner.email)
        .bind(&owner.password_hash)
        .bind(&owner.phone)
        .bind(&owner.address)
        .bind(&owner.email_verification_token)
        .bind(now)
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(inserted) => Ok(inserted),
            Err(err) => match DbError::from(err) {
                DbError::UniqueViolation { field, .. } if field == "stores.email" => {
                    Err(DbError::duplicate("email", owner.email.clone()))
                }
                other => Err(other),
            },
        }
    }

    /// Gets a store owner by email.
    pub async fn find_by_email(&self, email: &str) -> DbResult<Option<StoreOwner>> {
        let owner = sqlx::query_as::<_, StoreOwner>(
            r#"
            SELECT
                id, owner_name, store_name, email, password_hash,
                phone, address, email_verification_token, is_verified,
                created_at, updated_at
            FROM stores
            WHERE email = ?1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(owner)
    }

    /// Gets a store owner by id.
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<StoreOwner>> {
        let owner = sqlx::query_as::<_, StoreOwner>(
            r#"
            SELECT
                id, owner_name, store_name, email, password_hash,
                phone, address, email_verification_token, is_verified,
                created_at, updated_at
            FROM stores
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(owner)
    }

    /// Checks whether an email is already registered.
    pub async fn email_exists(&self, email: &str) -> DbResult<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM stores WHERE email = ?1)")
            .bind(email)
            .fetch_one(&self.pool)
            .await?;

        Ok(exists)
    }

    /// Marks the owner holding `token` as verified and clears the token.
    ///
    /// ## Returns
    /// * `Ok(Some(StoreOwner))` - Owner verified
    /// * `Ok(None)` - No owner holds this token (unknown or already used)
    pub async fn verify_email(&self, token: &str) -> DbResult<Option<StoreOwner>> {
        debug!("Consuming email verification token");

        let owner = sqlx::query_as::<_, StoreOwner>(
            r#"
            UPDATE stores SET
                is_verified = 1,
                email_verification_token = NULL,
                updated_at = ?2
            WHERE email_verification_token = ?1
            RETURNING
                id, owner_name, store_name, email, password_hash,
                phone, address, email_verification_token, is_verified,
                created_at, updated_at
            "#,
        )
        .bind(token)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        Ok(owner)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
