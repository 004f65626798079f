//! Store-scoped device inventory.

use std::sync::Arc;

use shopfront_core::validation::{validate_device_update, validate_new_device};
use shopfront_core::{CoreError, Device, DeviceUpdate, NewDevice};
use tracing::info;

use crate::auth::AuthenticatedStore;
use crate::error::ApiError;
use crate::AppState;

/// Inventory service.
pub struct InventoryService {
    state: Arc<AppState>,
}

impl InventoryService {
    pub fn new(state: Arc<AppState>) -> Self {
        InventoryService { state }
    }

    pub async fn add(&self, store: &AuthenticatedStore, device: NewDevice) -> Result<Device, ApiError> {
        validate_new_device(&device).map_err(CoreError::from)?;

        let device = self.state.db.devices().insert(store.store_id, &device).await?;

        info!(store_id = store.store_id, device_id = device.id, "Device added");
        Ok(device)
    }

    pub async fn list(&self, store: &AuthenticatedStore) -> Result<Vec<Device>, ApiError> {
        Ok(self.state.db.devices().list(store.store_id).await?)
    }

    pub async fn get(&self, store: &AuthenticatedStore, id: i64) -> Result<Device, ApiError> {
        self.state
            .db
            .devices()
            .get_by_id(store.store_id, id)
            .await?
            .ok_or_else(|| CoreError::DeviceNotFound(id).into())
    }

    /// Applies the fields present in `update`.
    pub async fn update(
        &self,
        store: &AuthenticatedStore,
        id: i64,
        update: DeviceUpdate,
    ) -> Result<Device, ApiError> {
        if update.is_empty() {
            return Err(ApiError::validation("At least one field must be supplied"));
        }
        validate_device_update(&update).map_err(CoreError::from)?;

        let device = self
            .state
            .db
            .devices()
            .update(store.store_id, id, &update)
            .await?;

        info!(store_id = store.store_id, device_id = id, "Device updated");
        Ok(device)
    }

    pub async fn delete(&self, store: &AuthenticatedStore, id: i64) -> Result<(), ApiError> {
        self.state.db.devices().delete(store.store_id, id).await?;

        info!(store_id = store.store_id, device_id = id, "Device deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::email::LogMailer;
    use crate::error::ErrorCode;
    use crate::ApiConfig;
    use shopfront_db::{Database, DbConfig};

    async fn service() -> InventoryService {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let state = AppState::new(db, Arc::new(LogMailer), ApiConfig::for_tests());
        InventoryService::new(Arc::new(state))
    }

    async fn store(service: &InventoryService, email: &str) -> AuthenticatedStore {
        let owner = service
            .state
            .db
            .owners()
            .insert(&shopfront_core::NewStoreOwner {
                owner_name: "Owner".to_string(),
                store_name: "Store".to_string(),
                email: email.to_string(),
                password_hash: "$argon2id$placeholder".to_string(),
                phone: "555-0100".to_string(),
                address: "1 Main St".to_string(),
                email_verification_token: format!("token-{email}"),
            })
            .await
            .unwrap();
        AuthenticatedStore {
            store_id: owner.id,
            store_name: owner.store_name,
        }
    }

    fn phone(quantity_available: i64) -> NewDevice {
        NewDevice {
            device_type: "Phone".to_string(),
            brand: "Apple".to_string(),
            model_name: "iPhone 15".to_string(),
            price_cents: 79_900,
            quantity_available,
        }
    }

    #[tokio::test]
    async fn test_add_rejects_negative_stock() {
        let service = service().await;
        let owner = store(&service, "a@example.com").await;

        let err = service.add(&owner, phone(-1)).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }

    #[tokio::test]
    async fn test_other_store_sees_not_found() {
        let service = service().await;
        let owner = store(&service, "a@example.com").await;
        let other = store(&service, "b@example.com").await;

        let device = service.add(&owner, phone(5)).await.unwrap();

        assert!(service.list(&other).await.unwrap().is_empty());
        let err = service.get(&other, device.id).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
        assert_eq!(service.get(&owner, device.id).await.unwrap().id, device.id);
    }

    #[tokio::test]
    async fn test_empty_update_rejected() {
        let service = service().await;
        let owner = store(&service, "a@example.com").await;
        let device = service.add(&owner, phone(5)).await.unwrap();

        let err = service
            .update(&owner, device.id, DeviceUpdate::default())
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }
}
