//! `/api/sales` routes. All require a bearer token.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use shopfront_core::{NewSale, ReceiptFilter, Sale, SaleItem};

use super::{ApiJson, ApiPath};
use crate::auth::AuthStore;
use crate::error::ApiError;
use crate::services::sale_service::SaleReceipt;
use crate::services::SaleService;
use crate::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_sales).post(record_sale))
        .route("/receipts/{receipt_id}", get(get_receipt))
        .route("/recall", get(recall_receipts))
        .route("/largest-receipt-id", get(largest_receipt_id))
}

#[derive(Debug, Serialize)]
pub struct SaleLogged {
    pub message: &'static str,
    pub sale: SaleReceipt,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptResponse {
    pub receipt_id: i64,
    pub receipt: String,
    pub items: Vec<SaleItem>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LargestReceiptId {
    pub largest_receipt_id: i64,
}

async fn record_sale(
    State(state): State<Arc<AppState>>,
    AuthStore(store): AuthStore,
    ApiJson(sale): ApiJson<NewSale>,
) -> Result<(StatusCode, Json<SaleLogged>), ApiError> {
    let sale = SaleService::new(state).record(&store, sale).await?;
    Ok((
        StatusCode::CREATED,
        Json(SaleLogged {
            message: "Sale logged and receipt generated",
            sale,
        }),
    ))
}

async fn list_sales(
    State(state): State<Arc<AppState>>,
    AuthStore(store): AuthStore,
) -> Result<Json<Vec<Sale>>, ApiError> {
    Ok(Json(SaleService::new(state).list(&store).await?))
}

async fn get_receipt(
    State(state): State<Arc<AppState>>,
    AuthStore(store): AuthStore,
    ApiPath(receipt_id): ApiPath<i64>,
) -> Result<Json<ReceiptResponse>, ApiError> {
    let (sale, items) = SaleService::new(state).receipt(&store, receipt_id).await?;
    Ok(Json(ReceiptResponse {
        receipt_id: sale.receipt_id,
        receipt: sale.receipt,
        items,
    }))
}

async fn recall_receipts(
    State(state): State<Arc<AppState>>,
    AuthStore(store): AuthStore,
    Query(filter): Query<ReceiptFilter>,
) -> Result<Json<Vec<Sale>>, ApiError> {
    Ok(Json(SaleService::new(state).recall(&store, filter).await?))
}

async fn largest_receipt_id(
    State(state): State<Arc<AppState>>,
    AuthStore(_store): AuthStore,
) -> Result<Json<LargestReceiptId>, ApiError> {
    let largest_receipt_id = SaleService::new(state).largest_receipt_id().await?;
    Ok(Json(LargestReceiptId { largest_receipt_id }))
}
