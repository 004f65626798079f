//! # Domain Types
//!
//! Core domain types used throughout Shopfront.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │   StoreOwner    │   │     Device      │   │      Sale       │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id             │◄──│  store_id       │   │  receipt_id     │       │
//! │  │  store_name     │   │  model_name     │   │  store_id ──────┼──►    │
//! │  │  email (unique) │   │  price_cents    │   │  total_cents    │       │
//! │  │  is_verified    │   │  quantity_avail │   │  receipt (text) │       │
//! │  └─────────────────┘   └─────────────────┘   └────────┬────────┘       │
//! │                                                       │ 1..n           │
//! │                                              ┌────────▼────────┐       │
//! │                                              │    SaleItem     │       │
//! │                                              │  model_name     │       │
//! │                                              │  quantity       │       │
//! │                                              │  line_total     │       │
//! │                                              └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Tenancy
//! A StoreOwner is the tenant. Every Device and Sale carries the owning
//! `store_id` and every lookup filters on it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// Store Owner
// =============================================================================

/// A registered store owner (the tenant).
///
/// The password hash and verification token never leave the server.
#[derive(Debug, Clone, Serialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct StoreOwner {
    pub id: i64,
    pub owner_name: String,
    pub store_name: String,
    pub email: String,
    #[serde(skip_serializing)]
    #[ts(skip)]
    pub password_hash: String,
    pub phone: String,
    pub address: String,
    #[serde(skip_serializing)]
    #[ts(skip)]
    pub email_verification_token: Option<String>,
    pub is_verified: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

/// Fields needed to insert a pending (unverified) store owner.
#[derive(Debug, Clone)]
pub struct NewStoreOwner {
    pub owner_name: String,
    pub store_name: String,
    pub email: String,
    pub password_hash: String,
    pub phone: String,
    pub address: String,
    pub email_verification_token: String,
}

// =============================================================================
// Device
// =============================================================================

/// A device model held in a store's inventory.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    pub id: i64,
    pub store_id: i64,
    pub device_type: String,
    pub brand: String,
    pub model_name: String,
    /// Unit price in cents.
    pub price_cents: i64,
    /// Units on hand. Never negative.
    pub quantity_available: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Device {
    /// Returns the unit price as a Money type.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    /// Checks whether `quantity` units can be sold from current stock.
    #[inline]
    pub fn has_stock(&self, quantity: i64) -> bool {
        quantity <= self.quantity_available
    }
}

/// Request body for adding a device.
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct NewDevice {
    pub device_type: String,
    pub brand: String,
    pub model_name: String,
    pub price_cents: i64,
    pub quantity_available: i64,
}

/// Partial update of a device.
///
/// A field is applied when its key is present in the request body. Zero is a
/// real value: `{"quantityAvailable": 0}` empties the shelf.
#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase", default)]
pub struct DeviceUpdate {
    pub device_type: Option<String>,
    pub brand: Option<String>,
    pub model_name: Option<String>,
    pub price_cents: Option<i64>,
    pub quantity_available: Option<i64>,
}

impl DeviceUpdate {
    /// True when no field was supplied.
    pub fn is_empty(&self) -> bool {
        self.device_type.is_none()
            && self.brand.is_none()
            && self.model_name.is_none()
            && self.price_cents.is_none()
            && self.quantity_available.is_none()
    }
}

// =============================================================================
// Payment Status
// =============================================================================

/// Payment state of a sale. No gateway is integrated, so every recorded sale
/// is `Completed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    #[default]
    Completed,
}

// =============================================================================
// Sale
// =============================================================================

/// A recorded sale. Immutable once written.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Sale {
    pub id: i64,
    /// Global, strictly increasing receipt number.
    pub receipt_id: i64,
    pub store_id: i64,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_address: String,
    pub customer_phone: String,
    pub sale_attendant: String,
    pub total_cents: i64,
    pub payment_status: PaymentStatus,
    /// Rendered plain-text receipt.
    pub receipt: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Sale Item
// =============================================================================

/// A line item of a sale.
/// Uses snapshot pattern to freeze device data at time of sale; `device_id`
/// is kept for reference only and may point at a deleted device.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SaleItem {
    pub id: i64,
    pub sale_id: i64,
    pub device_id: i64,
    /// Model name at time of sale (frozen).
    pub model_name: String,
    /// Serial identifier captured at the till, if any.
    pub imei: Option<String>,
    pub quantity: i64,
    /// Unit price in cents at time of sale (frozen).
    pub unit_price_cents: i64,
    pub line_total_cents: i64,
}

// =============================================================================
// Sale Requests
// =============================================================================

/// One line of a sale cart.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub device_id: i64,
    pub quantity: i64,
    #[serde(default)]
    pub imei: Option<String>,
}

/// Request body for recording a sale.
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct NewSale {
    pub customer_name: String,
    pub customer_email: String,
    #[serde(default)]
    pub customer_address: String,
    #[serde(default)]
    pub customer_phone: String,
    pub sale_attendant: String,
    pub cart: Vec<CartLine>,
}

/// Filters for receipt recall. Supplied filters combine with AND.
#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase", default)]
pub struct ReceiptFilter {
    pub imei: Option<String>,
    pub model_name: Option<String>,
    pub customer_email: Option<String>,
}

impl ReceiptFilter {
    /// True when no filter was supplied (matches every sale of the store).
    pub fn is_empty(&self) -> bool {
        self.imei.is_none() && self.model_name.is_none() && self.customer_email.is_none()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
