//! # Domain Types
//!
//! Core domain types used throughout Motel Ledger.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │      Room       │   │     Payment     │   │   RoomHistory   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  number (key)   │◄──│  room_number    │   │  room_number    │       │
//! │  │  status         │   │  amount_cents   │   │  previous_status│       │
//! │  │  rent_price     │   │  vehicle_info   │   │  new_status     │       │
//! │  │  occupation win │   │  duration (h)   │   │  changed_at     │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Employee     │   │      Till       │   │  CashMovement   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id             │◄──│  employee_id    │◄──│  till_id        │       │
//! │  │  name           │   │  opening_amount │   │  in | out       │       │
//! │  │  position       │   │  is_closed      │   │  concept        │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Identity
//! Rooms are keyed by their door number. Every other entity uses the
//! store-assigned integer id. Payments, cash movements and history rows are
//! append-only.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::Money;

// =============================================================================
// Room Status
// =============================================================================

/// The lifecycle status of a room.
///
/// ## Transitions
/// ```text
///            occupy                 renew (stays Occupied)
///  Available ──────► Occupied ◄─────────────┐
///  Clean     ──────►    │     ──────────────┘
///  Maintenance ────►    │ mark_dirty
///                       ▼
///                     Dirty ──► Clean / Available / Maintenance
/// ```
/// Occupied is only ever entered through an occupation with a payment.
///
/// Legacy two-letter codes (`AV`, `OC`, `CL`, `MT`, `LI`) are accepted on
/// input for front ends that still send them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum RoomStatus {
    #[serde(alias = "AV")]
    Available,
    #[serde(alias = "OC")]
    Occupied,
    /// Waiting for cleaning staff.
    #[serde(alias = "CL")]
    Dirty,
    #[serde(alias = "MT")]
    Maintenance,
    /// Cleaned and inspected, ready to be let.
    #[serde(alias = "LI")]
    Clean,
}

impl RoomStatus {
    /// Wire name, as stored and serialized.
    pub const fn as_str(&self) -> &'static str {
        match self {
            RoomStatus::Available => "available",
            RoomStatus::Occupied => "occupied",
            RoomStatus::Dirty => "dirty",
            RoomStatus::Maintenance => "maintenance",
            RoomStatus::Clean => "clean",
        }
    }
}

impl Default for RoomStatus {
    fn default() -> Self {
        RoomStatus::Available
    }
}

impl fmt::Display for RoomStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RoomStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "available" | "AV" => Ok(RoomStatus::Available),
            "occupied" | "OC" => Ok(RoomStatus::Occupied),
            "dirty" | "CL" => Ok(RoomStatus::Dirty),
            "maintenance" | "MT" => Ok(RoomStatus::Maintenance),
            "clean" | "LI" => Ok(RoomStatus::Clean),
            other => Err(ValidationError::InvalidFormat {
                field: "status".to_string(),
                reason: format!("unknown room status '{}'", other),
            }),
        }
    }
}

// =============================================================================
// Room
// =============================================================================

/// A rentable room and its live occupation window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Room {
    /// Door number, the room's identity.
    pub number: i64,

    pub status: RoomStatus,

    /// Default price of one rental block, in cents.
    pub rent_price_cents: i64,

    /// When the current occupation started. Set iff Occupied.
    #[ts(as = "Option<String>")]
    pub occupation_time: Option<DateTime<Utc>>,

    /// `occupation_time + total_hours`. Set iff Occupied.
    #[ts(as = "Option<String>")]
    pub expiry_time: Option<DateTime<Utc>>,

    /// Last time the room was sent to cleaning.
    #[ts(as = "Option<String>")]
    pub cleaning_start_time: Option<DateTime<Utc>>,

    /// Hours paid for in the current occupation (initial block + renewals).
    pub total_hours: i64,

    /// Whether the current occupation has been renewed at least once.
    pub is_renewal: bool,
}

impl Room {
    #[inline]
    pub fn rent_price(&self) -> Money {
        Money::from_cents(self.rent_price_cents)
    }

    #[inline]
    pub fn is_occupied(&self) -> bool {
        self.status == RoomStatus::Occupied
    }
}

// =============================================================================
// Payment
// =============================================================================

/// A rental payment. One is written per occupation and per renewal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Payment {
    pub id: i64,
    pub room_number: i64,
    #[ts(as = "String")]
    pub payment_time: DateTime<Utc>,
    pub amount_cents: i64,
    /// Free-text vehicle description (plate, make, colour).
    pub vehicle_info: String,
    /// Hours bought by this payment.
    pub rent_duration_hours: i64,
}

impl Payment {
    #[inline]
    pub fn amount(&self) -> Money {
        Money::from_cents(self.amount_cents)
    }
}

// =============================================================================
// Room History
// =============================================================================

/// One audited status change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct RoomHistory {
    pub id: i64,
    pub room_number: i64,
    pub previous_status: RoomStatus,
    pub new_status: RoomStatus,
    #[ts(as = "String")]
    pub changed_at: DateTime<Utc>,
}

// =============================================================================
// Employees and Shifts
// =============================================================================

/// Staff position, also used as the role worked in a shift.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum Position {
    Laundry,
    Cleaning,
    Administration,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Employee {
    pub id: i64,
    pub name: String,
    pub position: Position,
    #[ts(as = "String")]
    pub date_hired: DateTime<Utc>,
}

/// A scheduled work period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Shift {
    pub id: i64,
    pub employee_id: i64,
    #[ts(as = "String")]
    pub start_time: DateTime<Utc>,
    #[ts(as = "String")]
    pub end_time: DateTime<Utc>,
    pub role: Position,
}

// =============================================================================
// Till
// =============================================================================

/// A cash-drawer session run by one employee.
///
/// ## Lifecycle
/// ```text
/// ┌──────────┐   close / next open   ┌──────────┐
/// │   Open   │ ────────────────────► │  Closed  │  (terminal)
/// └──────────┘                       └──────────┘
/// ```
/// At most one till is open at any time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Till {
    pub id: i64,
    /// Employee responsible for the drawer.
    pub employee_id: i64,
    #[ts(as = "String")]
    pub opened_at: DateTime<Utc>,
    pub opening_amount_cents: i64,
    /// Free-text comments, printed on the turn report.
    pub description: Option<String>,
    pub is_closed: bool,
    #[ts(as = "Option<String>")]
    pub closed_at: Option<DateTime<Utc>>,
}

impl Till {
    #[inline]
    pub fn opening_amount(&self) -> Money {
        Money::from_cents(self.opening_amount_cents)
    }

    #[inline]
    pub fn is_open(&self) -> bool {
        !self.is_closed
    }
}

// =============================================================================
// Cash Movements
// =============================================================================

/// Direction of a cash movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum MovementType {
    /// Cash into the drawer (rent, deposits).
    #[serde(alias = "entrada")]
    In,
    /// Cash out of the drawer (supplies, refunds).
    #[serde(alias = "salida")]
    Out,
}

impl MovementType {
    pub const fn as_str(&self) -> &'static str {
        match self {
            MovementType::In => "in",
            MovementType::Out => "out",
        }
    }
}

impl fmt::Display for MovementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An immutable ledger entry against a till.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct CashMovement {
    pub id: i64,
    pub till_id: i64,
    pub movement_type: MovementType,
    pub concept: String,
    /// Always positive; direction comes from `movement_type`.
    pub amount_cents: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl CashMovement {
    #[inline]
    pub fn amount(&self) -> Money {
        Money::from_cents(self.amount_cents)
    }

    /// Amount with the sign of its effect on the drawer.
    pub fn signed_amount(&self) -> Money {
        match self.movement_type {
            MovementType::In => self.amount(),
            MovementType::Out => Money::zero() - self.amount(),
        }
    }
}

// =============================================================================
// Input Types
// =============================================================================

/// Data needed to register a room.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewRoom {
    pub number: i64,
    pub rent_price_cents: i64,
    #[serde(default)]
    pub status: Option<RoomStatus>,
}

/// Data needed to register an employee.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewEmployee {
    pub name: String,
    pub position: Position,
    /// Defaults to now when omitted.
    #[ts(as = "Option<String>")]
    #[serde(default)]
    pub date_hired: Option<DateTime<Utc>>,
}

/// Data needed to schedule a shift.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewShift {
    pub employee_id: i64,
    #[ts(as = "String")]
    pub start_time: DateTime<Utc>,
    #[ts(as = "String")]
    pub end_time: DateTime<Utc>,
    pub role: Position,
}

// =============================================================================
// Unit Tests
// =============================================================================
