//! # Services
//!
//! Orchestration between the HTTP routes and the store.
//!
//! ```text
//! routes ──► TillManager ──────► Ledger (atomic units) ──► SQLite
//!        │        │
//!        │        └─ after commit ─► ReportRenderer ─► ReportNotifier
//!        │
//!        └─► OccupancyEngine ────► Ledger
//!                 │
//!                 └─ after commit ─► StatusNotifier
//! ```
//!
//! Work that happens after commit never undoes the commit. Its failures are
//! logged and, for turn reports, returned to the caller as a warning.

pub mod notify;
pub mod occupancy;
pub mod report;
pub mod till;

use thiserror::Error;

use motel_core::{CoreError, ValidationError};
use motel_db::DbError;

pub use notify::{Envelope, LogNotifier, LogStatusNotifier, ReportNotifier, SpoolNotifier, StatusNotifier};
pub use occupancy::{OccupancyEngine, RenewalDetails, RoomPatch, RoomUpdate};
pub use report::{ReportDocument, ReportError, ReportRenderer, TextReportRenderer};
pub use till::{Handover, ReportDelivery, ReportStatus, TillClosure, TillManager};

/// Errors raised by the service layer.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Db(#[from] DbError),

    #[error(transparent)]
    Report(#[from] ReportError),
}

impl From<CoreError> for ServiceError {
    fn from(err: CoreError) -> Self {
        ServiceError::Db(DbError::Domain(err))
    }
}

impl From<ValidationError> for ServiceError {
    fn from(err: ValidationError) -> Self {
        ServiceError::Db(err.into())
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;
