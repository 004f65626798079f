//! `/api/inventory` routes. All require a bearer token.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use shopfront_core::{Device, DeviceUpdate, NewDevice};

use super::{ApiJson, ApiPath, MessageResponse};
use crate::auth::AuthStore;
use crate::error::ApiError;
use crate::services::InventoryService;
use crate::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/devices", get(list_devices).post(add_device))
        .route(
            "/devices/{id}",
            get(get_device).put(update_device).delete(delete_device),
        )
}

#[derive(Debug, Serialize)]
pub struct DeviceUpdated {
    pub message: &'static str,
    pub device: Device,
}

async fn add_device(
    State(state): State<Arc<AppState>>,
    AuthStore(store): AuthStore,
    ApiJson(device): ApiJson<NewDevice>,
) -> Result<(StatusCode, Json<Device>), ApiError> {
    let device = InventoryService::new(state).add(&store, device).await?;
    Ok((StatusCode::CREATED, Json(device)))
}

async fn list_devices(
    State(state): State<Arc<AppState>>,
    AuthStore(store): AuthStore,
) -> Result<Json<Vec<Device>>, ApiError> {
    Ok(Json(InventoryService::new(state).list(&store).await?))
}

async fn get_device(
    State(state): State<Arc<AppState>>,
    AuthStore(store): AuthStore,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<Device>, ApiError> {
    Ok(Json(InventoryService::new(state).get(&store, id).await?))
}

async fn update_device(
    State(state): State<Arc<AppState>>,
    AuthStore(store): AuthStore,
    ApiPath(id): ApiPath<i64>,
    ApiJson(update): ApiJson<DeviceUpdate>,
) -> Result<Json<DeviceUpdated>, ApiError> {
    let device = InventoryService::new(state).update(&store, id, update).await?;
    Ok(Json(DeviceUpdated {
        message: "Device updated successfully",
        device,
    }))
}

async fn delete_device(
    State(state): State<Arc<AppState>>,
    AuthStore(store): AuthStore,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<MessageResponse>, ApiError> {
    InventoryService::new(state).delete(&store, id).await?;
    Ok(Json(MessageResponse::new("Device deleted successfully")))
}
