//! # Error Types
//!
//! Domain-specific error types for motel-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  motel-core errors (this file)                                         │
//! │  ├── CoreError        - Domain rule violations                         │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  motel-db errors (separate crate)                                      │
//! │  └── DbError          - Database failures, wraps CoreError             │
//! │                                                                         │
//! │  motel-server errors (in app)                                          │
//! │  └── ApiError         - What the front desk sees (code + message)      │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → ApiError → HTTP         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Categories
//! Every [`CoreError`] belongs to exactly one [`ErrorKind`], which is what
//! the outer layers use to pick a status code.

use thiserror::Error;

use crate::types::RoomStatus;

// =============================================================================
// Error Kind
// =============================================================================

/// Coarse error taxonomy shared by every layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad or missing input.
    Validation,
    /// A referenced room, till, payment or employee is absent.
    NotFound,
    /// An invariant would be violated (double close, illegal transition).
    Conflict,
    /// The document renderer or the notifier failed.
    Dependency,
}

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Room number does not exist.
    #[error("Room not found: {0}")]
    RoomNotFound(i64),

    /// Till id does not exist.
    #[error("Till not found: {0}")]
    TillNotFound(i64),

    /// Employee id does not exist.
    #[error("Employee not found: {0}")]
    EmployeeNotFound(i64),

    /// No till is open, so there is nothing to post cash against.
    ///
    /// ## Policy
    /// Every cash movement requires an open till. Occupations and renewals
    /// are rejected as a whole (nothing is written) rather than proceeding
    /// without a ledger entry.
    #[error("No open till to post against")]
    NoOpenTill,

    /// The room has no payment on record.
    ///
    /// ## When This Occurs
    /// - Renewing a room that is Occupied but has no payment (inconsistent state)
    /// - Reconstructing a renewal window for an unknown vehicle
    #[error("No payment found for room {room_number}")]
    PaymentNotFound { room_number: i64 },

    /// The till is already closed.
    #[error("Till {0} is already closed")]
    TillAlreadyClosed(i64),

    /// Requested status change is not allowed from the current status.
    ///
    /// ## When This Occurs
    /// - Renewing a room that is not Occupied
    /// - Occupying a room that is already Occupied
    #[error("Room {room_number} cannot go from {from} to {to}")]
    InvalidTransition {
        room_number: i64,
        from: RoomStatus,
        to: RoomStatus,
    },

    /// A room with this number already exists.
    #[error("Room {0} already exists")]
    RoomExists(i64),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Returns the taxonomy bucket for this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            CoreError::RoomNotFound(_)
            | CoreError::TillNotFound(_)
            | CoreError::EmployeeNotFound(_)
            | CoreError::NoOpenTill
            | CoreError::PaymentNotFound { .. } => ErrorKind::NotFound,
            CoreError::TillAlreadyClosed(_)
            | CoreError::InvalidTransition { .. }
            | CoreError::RoomExists(_) => ErrorKind::Conflict,
            CoreError::Validation(_) => ErrorKind::Validation,
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when user input doesn't meet requirements.
/// Used for early validation before any transaction is opened.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    MustNotBeNegative { field: String },

    /// Invalid format or inconsistent values.
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
