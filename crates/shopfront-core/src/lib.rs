//! # shopfront-core: Pure Business Logic for Shopfront
//!
//! Domain types, money arithmetic, validation rules and receipt rendering for
//! the Shopfront inventory and point-of-sale service. Nothing in this crate
//! performs I/O.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Shopfront Architecture                            │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   apps/api (axum HTTP)                          │   │
//! │  │   register, login, devices CRUD, create sale, recall receipt    │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             ★ shopfront-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │  receipt  │  │ validation│  │   │
//! │  │   │  Device   │  │   Money   │  │  pricing  │  │   rules   │  │   │
//! │  │   │   Sale    │  │           │  │  text     │  │  checks   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 shopfront-db (Database Layer)                   │   │
//! │  │          SQLite queries, migrations, sale transaction           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (StoreOwner, Device, Sale, SaleItem)
//! - [`money`] - Money type with integer arithmetic
//! - [`receipt`] - Line pricing and plain-text receipt rendering
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation rules
//!
//! ## Example Usage
//!
//! ```rust
//! use shopfront_core::money::Money;
//!
//! let unit_price = Money::from_cents(49_999); // $499.99
//! let line_total = unit_price.checked_multiply_quantity(2);
//!
//! assert_eq!(line_total.map(|m| m.to_string()).as_deref(), Some("$999.98"));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod money;
pub mod receipt;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use receipt::{PricedLine, Receipt};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum lines allowed in a single sale cart.
///
/// ## Business Reason
/// Prevents runaway carts and keeps the sale transaction short.
pub const MAX_CART_ITEMS: usize = 100;

/// Maximum quantity of a single cart line.
///
/// ## Business Reason
/// Prevents accidental over-ordering (e.g., typing 1000 instead of 10).
pub const MAX_ITEM_QUANTITY: i64 = 999;

/// Maximum unit price of a device, in cents ($10,000,000.00).
///
/// ## Business Reason
/// Keeps every line total and sale total well inside `i64`, even for a
/// full cart at maximum quantity.
pub const MAX_PRICE_CENTS: i64 = 1_000_000_000;

/// Maximum length of free-text fields (names, brands, addresses).
pub const MAX_TEXT_LENGTH: usize = 100;

/// Minimum length of a store owner password.
pub const MIN_PASSWORD_LENGTH: usize = 8;
