//! # Device Repository
//!
//! Inventory store: devices scoped to the owning store.
//!
//! ## Tenant Scoping
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Every statement carries `store_id = ?` next to the primary key.        │
//! │                                                                         │
//! │  GET /devices/12 as store 1   → WHERE id = 12 AND store_id = 1 → row   │
//! │  GET /devices/12 as store 2   → WHERE id = 12 AND store_id = 2 → none  │
//! │                                                   └─► NotFound (404)    │
//! │                                                                         │
//! │  A foreign device is indistinguishable from a missing one.             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use shopfront_core::{Device, DeviceUpdate, NewDevice};

/// Repository for device database operations.
#[derive(Debug, Clone)]
pub struct DeviceRepository {
    pool: SqlitePool,
}

impl DeviceRepository {
    /// Creates a new DeviceRepository.
    pub fn new(pool: SqlitePool) -> Self {
        DeviceRepository { pool }
    }

    /// Inserts a device for `store_id`.
    pub async fn insert(&self, store_id: i64, device: &NewDevice) -> DbResult<Device> {
        debug!(store_id, model_name = %device.model_name, "Inserting device");

        let now = Utc::now();

        let inserted = sqlx::query_as::<_, Device>(
            r#"
            INSERT INTO devices (
                store_id, device_type, brand, model_name,
                price_cents, quantity_available, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)
            RETURNING
                id, store_id, device_type, brand, model_name,
                price_cents, quantity_available, created_at, updated_at
            "#,
        )
        .bind(store_id)
        .bind(device.device_type.trim())
        .bind(device.brand.trim())
        .bind(device.model_name.trim())
        .bind(device.price_cents)
        .bind(device.quantity_available)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(inserted)
    }

    /// Lists every device of a store, oldest first.
    pub async fn list(&self, store_id: i64) -> DbResult<Vec<Device>> {
        let devices = sqlx::query_as::<_, Device>(
            r#"
            SELECT
                id, store_id, device_type, brand, model_name,
                price_cents, quantity_available, created_at, updated_at
            FROM devices
            WHERE store_id = ?1
            ORDER BY id
            "#,
        )
        .bind(store_id)
        .fetch_all(&self.pool)
        .await?;

        debug!(store_id, count = devices.len(), "Listed devices");
        Ok(devices)
    }

    /// Gets a device by id within a store.
    ///
    /// ## Returns
    /// * `Ok(Some(Device))` - Device found
    /// * `Ok(None)` - Missing, or owned by another store
    pub async fn get_by_id(&self, store_id: i64, id: i64) -> DbResult<Option<Device>> {
        let mut conn = self.pool.acquire().await?;
        fetch_scoped(&mut conn, store_id, id).await
    }

    /// Applies the supplied fields of `update`.
    ///
    /// Absent fields bind NULL and `COALESCE` keeps the stored value; every
    /// column is NOT NULL so a supplied value, zero included, always wins.
    ///
    /// ## Returns
    /// * `Ok(Device)` - Updated device
    /// * `Err(DbError::NotFound)` - No such device in this store
    pub async fn update(&self, store_id: i64, id: i64, update: &DeviceUpdate) -> DbResult<Device> {
        debug!(store_id, id, "Updating device");

        let updated = sqlx::query_as::<_, Device>(
            r#"
            UPDATE devices SET
                device_type        = COALESCE(?3, device_type),
                brand              = COALESCE(?4, brand),
                model_name         = COALESCE(?5, model_name),
                price_cents        = COALESCE(?6, price_cents),
                quantity_available = COALESCE(?7, quantity_available),
                updated_at         = ?8
            WHERE id = ?1 AND store_id = ?2
            RETURNING
                id, store_id, device_type, brand, model_name,
                price_cents, quantity_available, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(store_id)
        .bind(update.device_type.as_deref().map(str::trim))
        .bind(update.brand.as_deref().map(str::trim))
        .bind(update.model_name.as_deref().map(str::trim))
        .bind(update.price_cents)
        .bind(update.quantity_available)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        updated.ok_or_else(|| DbError::not_found("Device", id))
    }

    /// Deletes a device. Past sale items keep their snapshot.
    pub async fn delete(&self, store_id: i64, id: i64) -> DbResult<()> {
        debug!(store_id, id, "Deleting device");

        let result = sqlx::query("DELETE FROM devices WHERE id = ?1 AND store_id = ?2")
            .bind(id)
            .bind(store_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Device", id));
        }

        Ok(())
    }

    /// Counts devices of a store.
    #[cfg(test)]
    pub(crate) async fn count(&self, store_id: i64) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM devices WHERE store_id = ?1")
            .bind(store_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Connection-level helpers (shared with the sale transaction)
// =============================================================================

/// Loads a device by id within a store on an existing connection.
pub(crate) async fn fetch_scoped(
    conn: &mut SqliteConnection,
    store_id: i64,
    id: i64,
) -> DbResult<Option<Device>> {
    let device = sqlx::query_as::<_, Device>(
        r#"
        SELECT
            id, store_id, device_type, brand, model_name,
            price_cents, quantity_available, created_at, updated_at
        FROM devices
        WHERE id = ?1 AND store_id = ?2
        "#,
    )
    .bind(id)
    .bind(store_id)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(device)
}

/// Decrements stock only if enough units remain.
///
/// ## Conditional Decrement
/// ```text
/// UPDATE devices SET quantity_available = quantity_available - 3
/// WHERE id = ? AND store_id = ? AND quantity_available >= 3
///
/// rows_affected = 1 → decremented
/// rows_affected = 0 → someone else took the stock first
/// ```
///
/// ## Returns
/// `true` when the row was decremented.
pub(crate) async fn decrement_stock(
    conn: &mut SqliteConnection,
    store_id: i64,
    id: i64,
    quantity: i64,
) -> DbResult<bool> {
    let result = sqlx::query(
        r#"
        UPDATE devices SET
            quantity_available = quantity_available - ?3,
            updated_at = ?4
        WHERE id = ?1 AND store_id = ?2 AND quantity_available >= ?3
        "#,
    )
    .bind(id)
    .bind(store_id)
    .bind(quantity)
    .bind(Utc::now())
    .execute(&mut *conn)
    .await?;

    Ok(result.rows_affected() == 1)
}

// =============================================================================
// Unit Tests
// =============================================================================
