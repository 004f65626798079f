//! # Repository Module
//!
//! Database repository implementations for Shopfront.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  HTTP handler                                                          │
//! │       │                                                                 │
//! │       │  db.devices().list(store_id)                                   │
//! │       ▼                                                                 │
//! │  DeviceRepository                                                      │
//! │  ├── insert(&self, store_id, device)                                   │
//! │  ├── get_by_id(&self, store_id, id)                                    │
//! │  ├── update(&self, store_id, id, update)                               │
//! │  └── delete(&self, store_id, id)                                       │
//! │       │                                                                 │
//! │       │  SQL Query (always filtered by store_id)                       │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`StoreOwnerRepository`](store_owner::StoreOwnerRepository) - Registration, verification, login lookups
//! - [`DeviceRepository`](device::DeviceRepository) - Store-scoped inventory CRUD
//! - [`SaleRepository`](sale::SaleRepository) - Sale transaction and receipt recall

pub mod device;
pub mod sale;
pub mod store_owner;
