//! # Occupancy Engine
//!
//! Room transitions and the occupation reads of the front desk.
//!
//! ## Transition Dispatch
//! ```text
//! PATCH /rooms/{n} { status, payment_amount?, vehicle_info?, rent_duration? }
//!
//!   current      requested     action
//!   ─────────    ─────────     ──────────────────────────────────────
//!   Occupied  →  occupied      renew  (payment required)
//!   other     →  occupied      occupy (payment defaults to rent price)
//!   any       →  dirty         mark_dirty (stamps cleaning start)
//!   any       →  other         set_status
//! ```
//!
//! Classification here is advisory. The ledger re-reads the room inside its
//! transaction, so a request that raced another one fails with a conflict
//! instead of acting on a stale status.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use motel_core::occupancy::{OccupancyWindow, OccupationSnapshot, RoomTransition};
use motel_core::validation::validate_room_number;
use motel_core::{
    CashMovement, CoreError, NewRoom, Payment, Room, RoomHistory, RoomStatus, ValidationError,
};
use motel_db::{
    Database, OccupancyOutcome, OccupyRequest, RenewRequest, StatusOutcome, StatusRequest,
};

use super::notify::StatusNotifier;
use super::ServiceResult;
use crate::config::RentalSettings;

// =============================================================================
// Requests and Results
// =============================================================================

/// Body of a room update.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RoomPatch {
    #[serde(default)]
    pub status: Option<RoomStatus>,
    #[serde(default)]
    pub payment_amount: Option<i64>,
    #[serde(default)]
    pub vehicle_info: Option<String>,
    #[serde(default)]
    pub rent_duration: Option<i64>,
    #[serde(default)]
    pub rent_price: Option<i64>,
}

/// Result of a room update. Payment fields are present for occupy and renew.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomUpdate {
    pub room: Room,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment: Option<Payment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub movement: Option<CashMovement>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub history: Option<RoomHistory>,
}

impl From<OccupancyOutcome> for RoomUpdate {
    fn from(outcome: OccupancyOutcome) -> Self {
        RoomUpdate {
            room: outcome.room,
            payment: Some(outcome.payment),
            movement: Some(outcome.movement),
            history: Some(outcome.history),
        }
    }
}

impl From<StatusOutcome> for RoomUpdate {
    fn from(outcome: StatusOutcome) -> Self {
        RoomUpdate {
            room: outcome.room,
            payment: None,
            movement: None,
            history: Some(outcome.history),
        }
    }
}

/// An occupation window rebuilt from a vehicle's payments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenewalDetails {
    pub room_number: i64,
    pub vehicle_info: String,
    pub occupation_time: DateTime<Utc>,
    pub expiry_time: DateTime<Utc>,
    pub total_hours: i64,
    pub payment_count: usize,
}

// =============================================================================
// Occupancy Engine
// =============================================================================

#[derive(Clone)]
pub struct OccupancyEngine {
    db: Database,
    notifier: Arc<dyn StatusNotifier>,
    rental: RentalSettings,
}

impl OccupancyEngine {
    pub fn new(db: Database, notifier: Arc<dyn StatusNotifier>, rental: RentalSettings) -> Self {
        OccupancyEngine {
            db,
            notifier,
            rental,
        }
    }

    // -------------------------------------------------------------------------
    // Rooms
    // -------------------------------------------------------------------------

    pub async fn list_rooms(&self) -> ServiceResult<Vec<Room>> {
        Ok(self.db.rooms().list().await?)
    }

    pub async fn create_room(&self, new_room: &NewRoom) -> ServiceResult<Room> {
        Ok(self.db.rooms().create(new_room).await?)
    }

    pub async fn room(&self, number: i64) -> ServiceResult<Room> {
        Ok(self
            .db
            .rooms()
            .get(number)
            .await?
            .ok_or(CoreError::RoomNotFound(number))?)
    }

    // -------------------------------------------------------------------------
    // Transitions
    // -------------------------------------------------------------------------

    /// Starts a paid occupation. Amount defaults to the room's rent price,
    /// duration to the configured rental length.
    pub async fn occupy(
        &self,
        room_number: i64,
        payment_amount: Option<i64>,
        vehicle_info: &str,
        rent_duration: Option<i64>,
    ) -> ServiceResult<RoomUpdate> {
        self.apply_occupy(OccupyRequest {
            room_number,
            amount_cents: payment_amount,
            vehicle_info: vehicle_info.to_string(),
            rent_duration_hours: rent_duration.unwrap_or(self.rental.default_rent_hours),
            rent_price_cents: None,
        })
        .await
    }

    /// Extends an occupation. The amount is required.
    pub async fn renew(
        &self,
        room_number: i64,
        payment_amount: i64,
        rent_duration: Option<i64>,
    ) -> ServiceResult<RoomUpdate> {
        self.apply_renew(RenewRequest {
            room_number,
            amount_cents: payment_amount,
            rent_duration_hours: rent_duration.unwrap_or(self.rental.default_renewal_hours),
            rent_price_cents: None,
        })
        .await
    }

    pub async fn mark_dirty(&self, room_number: i64) -> ServiceResult<RoomUpdate> {
        self.set_status(room_number, RoomStatus::Dirty).await
    }

    /// Available, Maintenance, Clean or Dirty. Occupied needs [`Self::occupy`].
    pub async fn set_status(&self, room_number: i64, status: RoomStatus) -> ServiceResult<RoomUpdate> {
        self.apply_status(StatusRequest {
            room_number,
            status,
            rent_price_cents: None,
        })
        .await
    }

    /// Applies a room update request.
    ///
    /// A `rent_price` travels with the transition and commits in the same
    /// transaction, so an occupation in the same request charges the new
    /// price by default and a failed transition leaves the price unchanged.
    pub async fn update_room(&self, room_number: i64, patch: RoomPatch) -> ServiceResult<RoomUpdate> {
        validate_room_number(room_number)?;

        let Some(requested) = patch.status else {
            let price = patch.rent_price.ok_or_else(|| ValidationError::Required {
                field: "status".to_string(),
            })?;
            let room = self.db.rooms().update_rent_price(room_number, price).await?;
            return Ok(RoomUpdate {
                room,
                payment: None,
                movement: None,
                history: None,
            });
        };

        let room = self.room(room_number).await?;
        match RoomTransition::classify(room.status, requested) {
            RoomTransition::Occupy => {
                self.apply_occupy(OccupyRequest {
                    room_number,
                    amount_cents: patch.payment_amount,
                    vehicle_info: patch.vehicle_info.unwrap_or_default(),
                    rent_duration_hours: patch
                        .rent_duration
                        .unwrap_or(self.rental.default_rent_hours),
                    rent_price_cents: patch.rent_price,
                })
                .await
            }
            RoomTransition::Renew => {
                let amount = patch.payment_amount.ok_or_else(|| ValidationError::Required {
                    field: "payment_amount".to_string(),
                })?;
                self.apply_renew(RenewRequest {
                    room_number,
                    amount_cents: amount,
                    rent_duration_hours: patch
                        .rent_duration
                        .unwrap_or(self.rental.default_renewal_hours),
                    rent_price_cents: patch.rent_price,
                })
                .await
            }
            transition @ (RoomTransition::MarkDirty | RoomTransition::Set(_)) => {
                self.apply_status(StatusRequest {
                    room_number,
                    status: transition.target(),
                    rent_price_cents: patch.rent_price,
                })
                .await
            }
        }
    }

    async fn apply_occupy(&self, request: OccupyRequest) -> ServiceResult<RoomUpdate> {
        let outcome = self.db.ledger().occupy(&request).await?;
        self.notifier
            .status_changed(&outcome.room, &outcome.history)
            .await;
        Ok(outcome.into())
    }

    async fn apply_renew(&self, request: RenewRequest) -> ServiceResult<RoomUpdate> {
        let outcome = self.db.ledger().renew(&request).await?;
        self.notifier
            .status_changed(&outcome.room, &outcome.history)
            .await;
        Ok(outcome.into())
    }

    async fn apply_status(&self, request: StatusRequest) -> ServiceResult<RoomUpdate> {
        let outcome = self.db.ledger().change_status(&request).await?;
        self.notifier
            .status_changed(&outcome.room, &outcome.history)
            .await;
        Ok(outcome.into())
    }

    // -------------------------------------------------------------------------
    // Reads
    // -------------------------------------------------------------------------

    /// The live occupation window; empty for rooms that are not Occupied.
    pub async fn occupation_snapshot(&self, room_number: i64) -> ServiceResult<OccupationSnapshot> {
        let room = self.room(room_number).await?;
        Ok(OccupationSnapshot::of(&room, Utc::now()))
    }

    pub async fn last_payment(&self, room_number: i64) -> ServiceResult<Payment> {
        self.room(room_number).await?;
        Ok(self
            .db
            .payments()
            .last_for_room(room_number)
            .await?
            .ok_or(CoreError::PaymentNotFound { room_number })?)
    }

    /// Vehicle of the latest payment, or an empty string.
    pub async fn last_vehicle_info(&self, room_number: i64) -> ServiceResult<String> {
        self.room(room_number).await?;
        Ok(self
            .db
            .payments()
            .last_for_room(room_number)
            .await?
            .map(|p| p.vehicle_info)
            .unwrap_or_default())
    }

    pub async fn payments(&self, room_number: i64) -> ServiceResult<Vec<Payment>> {
        self.room(room_number).await?;
        Ok(self.db.payments().list_for_room(room_number).await?)
    }

    /// A vehicle's payments in a room, oldest first.
    pub async fn payments_by_vehicle(
        &self,
        room_number: i64,
        vehicle_info: &str,
    ) -> ServiceResult<Vec<Payment>> {
        Ok(self
            .db
            .payments()
            .list_for_vehicle(room_number, vehicle_info.trim())
            .await?)
    }

    /// Rebuilds the occupation window from payments alone.
    ///
    /// Independent of the room's stored `total_hours`, so it can be used to
    /// cross-check the live window.
    pub async fn renewal_window(
        &self,
        room_number: i64,
        vehicle_info: Option<&str>,
    ) -> ServiceResult<RenewalDetails> {
        let vehicle_info = vehicle_info
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| ValidationError::Required {
                field: "vehicle_info".to_string(),
            })?;
        self.room(room_number).await?;

        let payments = self.payments_by_vehicle(room_number, vehicle_info).await?;
        let window = OccupancyWindow::reconstruct(&payments)
            .ok_or(CoreError::PaymentNotFound { room_number })?;

        Ok(RenewalDetails {
            room_number,
            vehicle_info: vehicle_info.to_string(),
            occupation_time: window.occupation_time,
            expiry_time: window.expiry_time,
            total_hours: window.total_hours,
            payment_count: payments.len(),
        })
    }

    /// Status audit rows, oldest first.
    pub async fn room_history(&self, room_number: i64) -> ServiceResult<Vec<RoomHistory>> {
        self.room(room_number).await?;
        Ok(self.db.history().list_for_room(room_number).await?)
    }
}
