//! # Occupancy Module
//!
//! Timing rules for room occupations and renewals.
//!
//! ## The Occupation Window
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  T0 = occupation_time (first payment)                                   │
//! │                                                                         │
//! │  occupy 4h   ├────────────────┤                    expiry = T0 + 4h     │
//! │  renew  2h   ├────────────────────────┤            expiry = T0 + 6h     │
//! │  renew  1h   ├────────────────────────────┤        expiry = T0 + 7h     │
//! │                                                                         │
//! │  Expiry is ALWAYS derived from T0 + total_hours. A renewal paid late   │
//! │  or early never shifts the start of the window.                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Everything here is pure. Persisting a window (and the payment, cash
//! movement and history row that go with it) is done atomically by the
//! database layer.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::types::{Payment, Room, RoomStatus};

// =============================================================================
// Occupancy Window
// =============================================================================

/// The paid-for span of an occupation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OccupancyWindow {
    #[ts(as = "String")]
    pub occupation_time: DateTime<Utc>,
    #[ts(as = "String")]
    pub expiry_time: DateTime<Utc>,
    pub total_hours: i64,
}

impl OccupancyWindow {
    /// Starts a window at the payment time.
    pub fn start(occupation_time: DateTime<Utc>, hours: i64) -> Self {
        OccupancyWindow {
            occupation_time,
            expiry_time: occupation_time + Duration::hours(hours),
            total_hours: hours,
        }
    }

    /// Extends the window by `hours`, anchored on the original start.
    pub fn renew(self, hours: i64) -> Self {
        let total_hours = self.total_hours + hours;
        OccupancyWindow {
            occupation_time: self.occupation_time,
            expiry_time: self.occupation_time + Duration::hours(total_hours),
            total_hours,
        }
    }

    /// Reads the live window stored on a room.
    ///
    /// Returns `None` unless the room is Occupied with both timestamps set.
    pub fn from_room(room: &Room) -> Option<Self> {
        if !room.is_occupied() {
            return None;
        }
        let occupation_time = room.occupation_time?;
        let expiry_time = room.expiry_time?;
        Some(OccupancyWindow {
            occupation_time,
            expiry_time,
            total_hours: room.total_hours,
        })
    }

    /// Rebuilds a window purely from payment history.
    ///
    /// The first payment (by time) marks the start, the durations add up.
    /// This is independent of the room's stored `total_hours`, so it can be
    /// used to audit it.
    ///
    /// ## Returns
    /// `None` when `payments` is empty.
    pub fn reconstruct(payments: &[Payment]) -> Option<Self> {
        let first = payments.iter().min_by_key(|p| (p.payment_time, p.id))?;
        let total_hours: i64 = payments.iter().map(|p| p.rent_duration_hours).sum();
        Some(OccupancyWindow::start(first.payment_time, total_hours))
    }

    /// Time left before expiry; zero once expired.
    pub fn remaining(&self, now: DateTime<Utc>) -> Duration {
        let left = self.expiry_time - now;
        if left < Duration::zero() {
            Duration::zero()
        } else {
            left
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expiry_time
    }
}

// =============================================================================
// Occupation Snapshot
// =============================================================================

/// What the room board shows for a room's occupation.
///
/// Empty (all `None`, zero hours) for rooms that are not Occupied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OccupationSnapshot {
    pub room_number: i64,
    pub status: RoomStatus,
    #[ts(as = "Option<String>")]
    pub occupation_time: Option<DateTime<Utc>>,
    #[ts(as = "Option<String>")]
    pub expiry_time: Option<DateTime<Utc>>,
    pub total_hours: i64,
    pub is_renewal: bool,
    pub remaining_minutes: Option<i64>,
}

impl OccupationSnapshot {
    pub fn of(room: &Room, now: DateTime<Utc>) -> Self {
        match OccupancyWindow::from_room(room) {
            Some(window) => OccupationSnapshot {
                room_number: room.number,
                status: room.status,
                occupation_time: Some(window.occupation_time),
                expiry_time: Some(window.expiry_time),
                total_hours: window.total_hours,
                is_renewal: room.is_renewal,
                remaining_minutes: Some(window.remaining(now).num_minutes()),
            },
            None => OccupationSnapshot {
                room_number: room.number,
                status: room.status,
                occupation_time: None,
                expiry_time: None,
                total_hours: 0,
                is_renewal: false,
                remaining_minutes: None,
            },
        }
    }
}

// =============================================================================
// Transitions
// =============================================================================

/// What a requested status change means for a room.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoomTransition {
    /// Start a paid occupation.
    Occupy,
    /// Extend the current occupation.
    Renew,
    /// Send to cleaning and stamp `cleaning_start_time`.
    MarkDirty,
    /// Plain status change with no payment.
    Set(RoomStatus),
}

impl RoomTransition {
    /// Classifies a request to move a room from `current` to `requested`.
    ///
    /// Asking for Occupied on an Occupied room is a renewal. Every other
    /// target is reachable from every status.
    pub fn classify(current: RoomStatus, requested: RoomStatus) -> Self {
        match (current, requested) {
            (RoomStatus::Occupied, RoomStatus::Occupied) => RoomTransition::Renew,
            (_, RoomStatus::Occupied) => RoomTransition::Occupy,
            (_, RoomStatus::Dirty) => RoomTransition::MarkDirty,
            (_, other) => RoomTransition::Set(other),
        }
    }

    /// The status the room ends in.
    pub fn target(&self) -> RoomStatus {
        match self {
            RoomTransition::Occupy | RoomTransition::Renew => RoomStatus::Occupied,
            RoomTransition::MarkDirty => RoomStatus::Dirty,
            RoomTransition::Set(status) => *status,
        }
    }

    /// Whether this transition takes money.
    pub fn requires_payment(&self) -> bool {
        matches!(self, RoomTransition::Occupy | RoomTransition::Renew)
    }
}

// =============================================================================
// Room State Changes
// =============================================================================

impl Room {
    /// The room after a new occupation (or a renewal) with `window`.
    pub fn with_occupation(&self, window: OccupancyWindow, is_renewal: bool) -> Room {
        Room {
            status: RoomStatus::Occupied,
            occupation_time: Some(window.occupation_time),
            expiry_time: Some(window.expiry_time),
            total_hours: window.total_hours,
            is_renewal,
            ..self.clone()
        }
    }

    /// The room after moving to a non-Occupied `status` at `at`.
    ///
    /// Clears the occupation window. Dirty stamps `cleaning_start_time`;
    /// other statuses keep the previous stamp.
    pub fn with_status(&self, status: RoomStatus, at: DateTime<Utc>) -> Room {
        let cleaning_start_time = if status == RoomStatus::Dirty {
            Some(at)
        } else {
            self.cleaning_start_time
        };
        Room {
            status,
            occupation_time: None,
            expiry_time: None,
            cleaning_start_time,
            total_hours: 0,
            is_renewal: false,
            ..self.clone()
        }
    }
}

/// Checks that a room may start a new occupation.
pub fn ensure_can_occupy(room: &Room) -> CoreResult<()> {
    if room.is_occupied() {
        return Err(CoreError::InvalidTransition {
            room_number: room.number,
            from: room.status,
            to: RoomStatus::Occupied,
        });
    }
    Ok(())
}

/// Checks that a room has an occupation to extend and returns its window.
pub fn ensure_can_renew(room: &Room) -> CoreResult<OccupancyWindow> {
    OccupancyWindow::from_room(room).ok_or(CoreError::InvalidTransition {
        room_number: room.number,
        from: room.status,
        to: RoomStatus::Occupied,
    })
}

/// Checks a plain status change. Occupied is reserved for occupations.
pub fn ensure_can_set(room: &Room, status: RoomStatus) -> CoreResult<()> {
    if status == RoomStatus::Occupied {
        return Err(CoreError::InvalidTransition {
            room_number: room.number,
            from: room.status,
            to: status,
        });
    }
    Ok(())
}

/// Concept written on the `in` cash movement of an occupation or renewal.
///
/// ## Example
/// ```rust
/// use motel_core::occupancy::movement_concept;
///
/// assert_eq!(movement_concept(12, "Red sedan ABC-123", 4), "Room-12 Red sedan ABC-123 4h");
/// assert_eq!(movement_concept(12, "", 4), "Room-12 4h");
/// ```
pub fn movement_concept(room_number: i64, vehicle_info: &str, hours: i64) -> String {
    let concept = match vehicle_info.trim() {
        "" => format!("Room-{} {}h", room_number, hours),
        vehicle => format!("Room-{} {} {}h", room_number, vehicle, hours),
    };
    if concept.chars().count() > crate::MAX_CONCEPT_LENGTH {
        concept.chars().take(crate::MAX_CONCEPT_LENGTH).collect()
    } else {
        concept
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 8, 1, 22, 0, 0).unwrap()
    }

    fn room(status: RoomStatus) -> Room {
        Room {
            number: 7,
            status,
            rent_price_cents: 25000,
            occupation_time: None,
            expiry_time: None,
            cleaning_start_time: None,
            total_hours: 0,
            is_renewal: false,
        }
    }

    fn payment(id: i64, at: DateTime<Utc>, hours: i64) -> Payment {
        Payment {
            id,
            room_number: 7,
            payment_time: at,
            amount_cents: 10000,
            vehicle_info: "Blue pickup XYZ-987".to_string(),
            rent_duration_hours: hours,
        }
    }

    #[test]
    fn test_start_window() {
        let window = OccupancyWindow::start(t0(), 4);
        assert_eq!(window.occupation_time, t0());
        assert_eq!(window.expiry_time, t0() + Duration::hours(4));
        assert_eq!(window.total_hours, 4);
    }

    #[test]
    fn test_renewals_keep_original_start() {
        let window = OccupancyWindow::start(t0(), 4).renew(2).renew(1);
        assert_eq!(window.occupation_time, t0());
        assert_eq!(window.total_hours, 7);
        assert_eq!(window.expiry_time, t0() + Duration::hours(7));
    }

    #[test]
    fn test_reconstruct_from_payments() {
        // Out of order on purpose: the earliest payment anchors the window
        let payments = vec![
            payment(2, t0() + Duration::hours(3), 2),
            payment(1, t0(), 4),
            payment(3, t0() + Duration::hours(5), 1),
        ];
        let window = OccupancyWindow::reconstruct(&payments).unwrap();
        assert_eq!(window.occupation_time, t0());
        assert_eq!(window.total_hours, 7);
        assert_eq!(window.expiry_time, t0() + Duration::hours(7));

        assert!(OccupancyWindow::reconstruct(&[]).is_none());
    }

    #[test]
    fn test_from_room_requires_occupied() {
        let mut r = room(RoomStatus::Available);
        assert!(OccupancyWindow::from_room(&r).is_none());

        r.status = RoomStatus::Occupied;
        r.occupation_time = Some(t0());
        r.expiry_time = Some(t0() + Duration::hours(4));
        r.total_hours = 4;
        let window = OccupancyWindow::from_room(&r).unwrap();
        assert_eq!(window.total_hours, 4);
    }

    #[test]
    fn test_remaining_and_expiry() {
        let window = OccupancyWindow::start(t0(), 4);
        assert_eq!(window.remaining(t0() + Duration::hours(1)), Duration::hours(3));
        assert_eq!(window.remaining(t0() + Duration::hours(9)), Duration::zero());
        assert!(!window.is_expired(t0()));
        assert!(window.is_expired(t0() + Duration::hours(4)));
    }

    #[test]
    fn test_snapshot_empty_when_not_occupied() {
        let snapshot = OccupationSnapshot::of(&room(RoomStatus::Dirty), t0());
        assert_eq!(snapshot.occupation_time, None);
        assert_eq!(snapshot.expiry_time, None);
        assert_eq!(snapshot.total_hours, 0);
        assert_eq!(snapshot.remaining_minutes, None);
    }

    #[test]
    fn test_snapshot_live_window() {
        let mut r = room(RoomStatus::Occupied);
        r.occupation_time = Some(t0());
        r.expiry_time = Some(t0() + Duration::hours(6));
        r.total_hours = 6;
        r.is_renewal = true;

        let snapshot = OccupationSnapshot::of(&r, t0() + Duration::minutes(90));
        assert_eq!(snapshot.total_hours, 6);
        assert!(snapshot.is_renewal);
        assert_eq!(snapshot.remaining_minutes, Some(270));
    }

    #[test]
    fn test_classify_transitions() {
        use RoomStatus::*;
        assert_eq!(RoomTransition::classify(Available, Occupied), RoomTransition::Occupy);
        assert_eq!(RoomTransition::classify(Clean, Occupied), RoomTransition::Occupy);
        assert_eq!(RoomTransition::classify(Occupied, Occupied), RoomTransition::Renew);
        assert_eq!(RoomTransition::classify(Occupied, Dirty), RoomTransition::MarkDirty);
        assert_eq!(
            RoomTransition::classify(Dirty, Clean),
            RoomTransition::Set(Clean)
        );
        assert!(RoomTransition::Renew.requires_payment());
        assert!(!RoomTransition::MarkDirty.requires_payment());
        assert_eq!(RoomTransition::Set(Maintenance).target(), Maintenance);
    }

    #[test]
    fn test_guards() {
        assert!(ensure_can_occupy(&room(RoomStatus::Clean)).is_ok());
        assert!(matches!(
            ensure_can_occupy(&room(RoomStatus::Occupied)),
            Err(CoreError::InvalidTransition { .. })
        ));
        assert!(ensure_can_renew(&room(RoomStatus::Available)).is_err());
        assert!(ensure_can_set(&room(RoomStatus::Dirty), RoomStatus::Occupied).is_err());
        assert!(ensure_can_set(&room(RoomStatus::Dirty), RoomStatus::Clean).is_ok());
    }

    #[test]
    fn test_room_with_occupation_and_status() {
        let occupied = room(RoomStatus::Clean).with_occupation(OccupancyWindow::start(t0(), 4), false);
        assert_eq!(occupied.status, RoomStatus::Occupied);
        assert_eq!(occupied.occupation_time, Some(t0()));
        assert_eq!(occupied.total_hours, 4);

        let dirty_at = t0() + Duration::hours(5);
        let dirty = occupied.with_status(RoomStatus::Dirty, dirty_at);
        assert_eq!(dirty.status, RoomStatus::Dirty);
        assert_eq!(dirty.occupation_time, None);
        assert_eq!(dirty.expiry_time, None);
        assert_eq!(dirty.total_hours, 0);
        assert!(!dirty.is_renewal);
        assert_eq!(dirty.cleaning_start_time, Some(dirty_at));

        // Cleaning stamp survives until the next Dirty transition
        let clean = dirty.with_status(RoomStatus::Clean, dirty_at + Duration::hours(1));
        assert_eq!(clean.cleaning_start_time, Some(dirty_at));
        assert_eq!(clean.rent_price_cents, 25000);
    }

    #[test]
    fn test_movement_concept() {
        assert_eq!(movement_concept(3, " ABC-123 ", 2), "Room-3 ABC-123 2h");
        assert_eq!(movement_concept(3, "  ", 2), "Room-3 2h");
        let long = movement_concept(3, &"v".repeat(400), 2);
        assert_eq!(long.chars().count(), crate::MAX_CONCEPT_LENGTH);
    }
}
