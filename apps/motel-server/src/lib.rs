//! # motel-server: HTTP API for Motel Ledger
//!
//! JSON over HTTP for the front desk: rooms and their occupation, till
//! handover and cash movements, staff records.
//!
//! ## Module Organization
//!
//! - [`config`] - `server.toml` + `MOTEL_*` environment configuration
//! - [`error`] - `ApiError` and the HTTP status mapping
//! - [`services`] - Till manager, occupancy engine, reports, notifiers
//! - [`routes`] - axum handlers and the router
//! - [`state`] - Shared handler state
//!
//! ## Usage
//!
//! ```rust,ignore
//! use motel_server::{create_router, AppState, ServerConfig};
//!
//! let config = ServerConfig::load(None)?;
//! let db = motel_db::Database::new(config.database.db_config()).await?;
//! let app = create_router(AppState::new(db, config));
//! ```

pub mod config;
pub mod error;
pub mod routes;
pub mod services;
pub mod state;

pub use config::ServerConfig;
pub use error::{ApiError, ErrorCode};
pub use routes::create_router;
pub use state::AppState;
