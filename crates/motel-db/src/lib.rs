//! # motel-db: Database Layer for Motel Ledger
//!
//! This crate provides database access for Motel Ledger.
//! It uses SQLite for storage with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Motel Ledger Data Flow                           │
//! │                                                                         │
//! │  HTTP handler (PATCH /rooms/12)                                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     motel-db (THIS CRATE)                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │    Ledger     │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │  (ledger.rs)  │    │  (embedded)  │  │   │
//! │  │   │               │    │ occupy, renew │    │              │  │   │
//! │  │   │ SqlitePool    │◄───│ open/close    │    │ 001_initial  │  │   │
//! │  │   │ Repositories  │    │ record_move   │    │              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database (WAL)                       │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Reads and per-table SQL
//! - [`ledger`] - Atomic multi-row write units
//!
//! ## Usage
//!
//! ```rust,ignore
//! use motel_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("ledger.db")).await?;
//!
//! let handover = db.ledger().open_till(employee_id, 50_000, None).await?;
//! let rooms = db.rooms().list().await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod ledger;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use ledger::{
    Ledger, OccupancyOutcome, OccupyRequest, OpenTillOutcome, RenewRequest, StatusOutcome,
    StatusRequest,
};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::employee::EmployeeRepository;
pub use repository::history::HistoryRepository;
pub use repository::payment::PaymentRepository;
pub use repository::room::RoomRepository;
pub use repository::till::TillRepository;
