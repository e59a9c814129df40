//! # motel-core: Pure Business Logic for Motel Ledger
//!
//! This crate is the **heart** of Motel Ledger. It contains the rental and
//! cash-drawer rules as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Motel Ledger Architecture                          │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Front Desk UI                                │   │
//! │  │    Room Board ──► Payment Modal ──► Till Modal ──► Movements    │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ HTTP / JSON                            │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    motel-server                                 │   │
//! │  │    Till Manager, Occupancy Engine, Renderer, Notifier           │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ motel-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │ occupancy │  │   till    │  │   │
//! │  │   │   Room    │  │   Money   │  │  window   │  │  balance  │  │   │
//! │  │   │   Till    │  │  (cents)  │  │  renewal  │  │  report   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    motel-db (Database Layer)                    │   │
//! │  │        SQLite queries, migrations, atomic ledger units          │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Room, Payment, Till, CashMovement, ...)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`occupancy`] - Occupation window, renewal and reconstruction math
//! - [`till`] - Till balance, the single source of truth for cash totals
//! - [`report`] - Turn report model consumed by document renderers
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//!
//! ## Example Usage
//!
//! ```rust
//! use chrono::{TimeZone, Utc};
//! use motel_core::occupancy::OccupancyWindow;
//!
//! let t0 = Utc.with_ymd_and_hms(2024, 8, 1, 22, 0, 0).unwrap();
//! let window = OccupancyWindow::start(t0, 4).renew(2).renew(1);
//!
//! // Renewals never move the original occupation time
//! assert_eq!(window.occupation_time, t0);
//! assert_eq!(window.total_hours, 7);
//! assert_eq!(window.expiry_time, t0 + chrono::Duration::hours(7));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod money;
pub mod occupancy;
pub mod report;
pub mod till;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, ValidationError};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Rental length used when an occupation request names no duration.
///
/// ## Business Reason
/// The front desk sells four-hour blocks by default.
pub const DEFAULT_RENT_DURATION_HOURS: i64 = 4;

/// Extension length used when a renewal request names no duration.
pub const DEFAULT_RENEWAL_DURATION_HOURS: i64 = 1;

/// Longest single rental or renewal block accepted (one week).
///
/// ## Business Reason
/// Catches typos such as 400 instead of 4 before they reach the ledger.
pub const MAX_RENT_DURATION_HOURS: i64 = 168;

/// Maximum length of a cash movement concept.
pub const MAX_CONCEPT_LENGTH: usize = 255;
