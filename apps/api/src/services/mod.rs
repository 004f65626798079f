//! Service layer.
//!
//! Each service holds the shared [`AppState`](crate::AppState) and carries the
//! business flow of one area. HTTP handlers in [`crate::routes`] stay thin.

pub mod auth_service;
pub mod inventory_service;
pub mod sale_service;

pub use auth_service::AuthService;
pub use inventory_service::InventoryService;
pub use sale_service::SaleService;
