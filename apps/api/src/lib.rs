//! # Shopfront API
//!
//! Multi-tenant inventory and point-of-sale HTTP service.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Shopfront API                                   │
//! │                                                                         │
//! │  ┌────────────────┐  ┌────────────────┐  ┌────────────────────────────┐│
//! │  │  AuthService   │  │ InventoryServ. │  │  SaleService               ││
//! │  │                │  │                │  │                            ││
//! │  │ • register     │  │ • add          │  │ • record (one transaction) ││
//! │  │ • verify_email │  │ • list / get   │  │ • list / receipt by id     ││
//! │  │ • login        │  │ • update       │  │ • recall                   ││
//! │  │ • logout       │  │ • delete       │  │ • largest receipt id       ││
//! │  └────────────────┘  └────────────────┘  └────────────────────────────┘│
//! │                                                                         │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │                      Infrastructure                               │  │
//! │  │                                                                   │  │
//! │  │  ┌──────────────┐  ┌──────────────┐  ┌──────────────────────────┐│  │
//! │  │  │  SQLite      │  │   Mailer     │  │    JWT Auth              ││  │
//! │  │  │ shopfront-db │  │ SMTP / log   │  │ Bearer session tokens    ││  │
//! │  │  └──────────────┘  └──────────────┘  └──────────────────────────┘│  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration
//! Environment variables (see [`config::ApiConfig::load`]):
//! - `HTTP_PORT` - listen port (default: 8080)
//! - `DATABASE_PATH` - SQLite file (default: ./shopfront.db)
//! - `JWT_SECRET` - Secret for JWT signing
//! - `JWT_LIFETIME_SECS` - Session lifetime (default: 259200)
//! - `SMTP_HOST`, `SMTP_PORT`, `SMTP_USERNAME`, `SMTP_PASSWORD`, `EMAIL_FROM`

pub mod auth;
pub mod config;
pub mod email;
pub mod error;
pub mod routes;
pub mod services;

use std::sync::Arc;

use axum::Router;
use shopfront_db::{Database, DbConfig};
use tower_http::trace::TraceLayer;

// Re-exports
pub use config::ApiConfig;
pub use error::{ApiError, ErrorCode};

use crate::auth::JwtManager;
use crate::email::{EmailError, LogMailer, Mailer, SmtpMailer};

/// Shared application state.
pub struct AppState {
    pub db: Database,
    pub jwt: JwtManager,
    pub mailer: Arc<dyn Mailer>,
    pub config: ApiConfig,
}

impl AppState {
    pub fn new(db: Database, mailer: Arc<dyn Mailer>, config: ApiConfig) -> Self {
        let jwt = JwtManager::new(config.jwt_secret.clone(), config.jwt_lifetime_secs);
        AppState {
            db,
            jwt,
            mailer,
            config,
        }
    }
}

/// Database settings derived from the API configuration.
pub fn db_config(config: &ApiConfig) -> DbConfig {
    DbConfig::new(&config.database_path).max_connections(config.db_max_connections)
}

/// SMTP when a relay is configured, otherwise the log-only mailer.
pub fn build_mailer(config: &ApiConfig) -> Result<Arc<dyn Mailer>, EmailError> {
    match &config.smtp {
        Some(smtp) => Ok(Arc::new(SmtpMailer::new(smtp, &config.email_from)?)),
        None => {
            tracing::warn!("SMTP_HOST not set, outgoing email will only be logged");
            Ok(Arc::new(LogMailer))
        }
    }
}

/// Builds the HTTP router.
pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(routes::health::router())
        .nest("/api/auth", routes::auth::router())
        .nest("/api/inventory", routes::inventory::router())
        .nest("/api/sales", routes::sales::router())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
