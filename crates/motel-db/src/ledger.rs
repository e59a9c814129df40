//! # Ledger
//!
//! Atomic write units. Every state change that touches more than one row
//! (or must read-then-write safely) is one method here, one transaction in
//! SQLite.
//!
//! ## Unit Shape
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  validate input (no transaction yet)                                    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  BEGIN                                                                  │
//! │  acquire_write_lock      ← first statement is a write: queued units    │
//! │       │                    wait here instead of racing                  │
//! │       ▼                                                                 │
//! │  read current state (room, open till)                                   │
//! │  check rules (motel-core)                                               │
//! │  write rows (CAS on the state that was read)                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  COMMIT  ── any error before this drops the transaction: ROLLBACK      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Units
//! | Unit | Rows written |
//! |------|--------------|
//! | `occupy` | room, payment, cash movement (in), history |
//! | `renew` | room, payment, cash movement (in), history |
//! | `change_status` / `mark_dirty` / `set_status` | room, history |
//!
//! Room units optionally carry a new rent price, written in the same
//! transaction as the status change.
//! | `open_till` | previous till (closed), new till |
//! | `close_till` | till |
//! | `record_movement` | cash movement |
//!
//! Rendering and delivering reports happens after commit, outside this crate.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info};

use crate::error::DbResult;
use crate::repository::{employee, history, payment, room, till};
use motel_core::occupancy::{
    ensure_can_occupy, ensure_can_renew, ensure_can_set, movement_concept, OccupancyWindow,
};
use motel_core::validation::{
    validate_amount_cents, validate_concept, validate_description, validate_opening_amount,
    validate_rent_duration, validate_vehicle_info,
};
use motel_core::{
    CashMovement, CoreError, MovementType, Payment, Room, RoomHistory, RoomStatus, Till,
};

// =============================================================================
// Requests and Outcomes
// =============================================================================

/// Start a paid occupation.
#[derive(Debug, Clone)]
pub struct OccupyRequest {
    pub room_number: i64,
    /// Defaults to the room's rent price.
    pub amount_cents: Option<i64>,
    pub vehicle_info: String,
    pub rent_duration_hours: i64,
    /// New rent price, saved before the amount defaults to it.
    pub rent_price_cents: Option<i64>,
}

/// Extend the current occupation.
#[derive(Debug, Clone)]
pub struct RenewRequest {
    pub room_number: i64,
    pub amount_cents: i64,
    pub rent_duration_hours: i64,
    pub rent_price_cents: Option<i64>,
}

/// Move a room to a non-Occupied status.
#[derive(Debug, Clone)]
pub struct StatusRequest {
    pub room_number: i64,
    pub status: RoomStatus,
    pub rent_price_cents: Option<i64>,
}

/// Rows written by an occupation or renewal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OccupancyOutcome {
    pub room: Room,
    pub payment: Payment,
    pub movement: CashMovement,
    pub history: RoomHistory,
}

/// Rows written by a plain status change.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusOutcome {
    pub room: Room,
    pub history: RoomHistory,
}

/// Result of opening a till.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenTillOutcome {
    pub till: Till,
    /// The till that was open before, closed by this unit.
    pub closed: Option<Till>,
}

// =============================================================================
// Ledger
// =============================================================================

/// Entry point for atomic writes.
#[derive(Debug, Clone)]
pub struct Ledger {
    pool: SqlitePool,
}

impl Ledger {
    pub fn new(pool: SqlitePool) -> Self {
        Ledger { pool }
    }

    // -------------------------------------------------------------------------
    // Occupancy
    // -------------------------------------------------------------------------

    /// Occupies a room: payment, room window, `in` movement and history row.
    ///
    /// ## Errors
    /// - `RoomNotFound`, `NoOpenTill`
    /// - `InvalidTransition` if the room is already Occupied
    /// - validation errors for amount, vehicle or duration
    pub async fn occupy(&self, request: &OccupyRequest) -> DbResult<OccupancyOutcome> {
        validate_vehicle_info(&request.vehicle_info)?;
        validate_rent_duration(request.rent_duration_hours)?;
        if let Some(amount) = request.amount_cents {
            validate_amount_cents("payment_amount", amount)?;
        }
        validate_rent_price(request.rent_price_cents)?;
        let vehicle_info = request.vehicle_info.trim();

        let mut tx = self.pool.begin().await?;
        till::acquire_write_lock(&mut *tx).await?;

        let current =
            fetch_with_price(&mut tx, request.room_number, request.rent_price_cents).await?;
        ensure_can_occupy(&current)?;
        let open_till = till::fetch_open(&mut *tx).await?.ok_or(CoreError::NoOpenTill)?;

        let amount_cents = request.amount_cents.unwrap_or(current.rent_price_cents);
        let now = Utc::now();

        let payment = payment::insert(
            &mut *tx,
            current.number,
            now,
            amount_cents,
            vehicle_info,
            request.rent_duration_hours,
        )
        .await?;

        let window = OccupancyWindow::start(payment.payment_time, request.rent_duration_hours);
        let updated = current.with_occupation(window, false);
        room::save_state(&mut *tx, &updated, current.status).await?;

        let concept = movement_concept(current.number, vehicle_info, request.rent_duration_hours);
        let movement = till::insert_movement(
            &mut *tx,
            open_till.id,
            MovementType::In,
            &concept,
            amount_cents,
            now,
        )
        .await?;

        let history =
            history::insert(&mut *tx, current.number, current.status, RoomStatus::Occupied, now)
                .await?;

        tx.commit().await?;

        info!(
            room = current.number,
            payment_id = payment.id,
            till_id = open_till.id,
            amount_cents,
            hours = request.rent_duration_hours,
            "Room occupied"
        );

        Ok(OccupancyOutcome {
            room: updated,
            payment,
            movement,
            history,
        })
    }

    /// Renews an occupation, reusing the vehicle of the latest payment.
    ///
    /// The window stays anchored on the original occupation time.
    pub async fn renew(&self, request: &RenewRequest) -> DbResult<OccupancyOutcome> {
        validate_amount_cents("payment_amount", request.amount_cents)?;
        validate_rent_duration(request.rent_duration_hours)?;
        validate_rent_price(request.rent_price_cents)?;

        let mut tx = self.pool.begin().await?;
        till::acquire_write_lock(&mut *tx).await?;

        let current =
            fetch_with_price(&mut tx, request.room_number, request.rent_price_cents).await?;
        let window = ensure_can_renew(&current)?;
        let last_payment = payment::last_for_room(&mut *tx, current.number)
            .await?
            .ok_or(CoreError::PaymentNotFound {
                room_number: current.number,
            })?;
        let open_till = till::fetch_open(&mut *tx).await?.ok_or(CoreError::NoOpenTill)?;

        let now = Utc::now();
        let payment = payment::insert(
            &mut *tx,
            current.number,
            now,
            request.amount_cents,
            &last_payment.vehicle_info,
            request.rent_duration_hours,
        )
        .await?;

        let updated = current.with_occupation(window.renew(request.rent_duration_hours), true);
        room::save_state(&mut *tx, &updated, RoomStatus::Occupied).await?;

        let concept = movement_concept(
            current.number,
            &last_payment.vehicle_info,
            request.rent_duration_hours,
        );
        let movement = till::insert_movement(
            &mut *tx,
            open_till.id,
            MovementType::In,
            &concept,
            request.amount_cents,
            now,
        )
        .await?;

        let history = history::insert(
            &mut *tx,
            current.number,
            RoomStatus::Occupied,
            RoomStatus::Occupied,
            now,
        )
        .await?;

        tx.commit().await?;

        info!(
            room = current.number,
            payment_id = payment.id,
            till_id = open_till.id,
            amount_cents = request.amount_cents,
            total_hours = updated.total_hours,
            "Room renewed"
        );

        Ok(OccupancyOutcome {
            room: updated,
            payment,
            movement,
            history,
        })
    }

    // -------------------------------------------------------------------------
    // Plain status changes
    // -------------------------------------------------------------------------

    /// Sends a room to cleaning and stamps `cleaning_start_time`.
    pub async fn mark_dirty(&self, room_number: i64) -> DbResult<StatusOutcome> {
        self.change_status(&StatusRequest {
            room_number,
            status: RoomStatus::Dirty,
            rent_price_cents: None,
        })
        .await
    }

    /// Moves a room to Available, Maintenance, Clean or Dirty.
    ///
    /// Occupied is rejected: it needs a payment (see [`Ledger::occupy`]).
    pub async fn set_status(&self, room_number: i64, status: RoomStatus) -> DbResult<StatusOutcome> {
        self.change_status(&StatusRequest {
            room_number,
            status,
            rent_price_cents: None,
        })
        .await
    }

    /// Plain status change, optionally repricing the room.
    pub async fn change_status(&self, request: &StatusRequest) -> DbResult<StatusOutcome> {
        validate_rent_price(request.rent_price_cents)?;
        let room_number = request.room_number;
        let status = request.status;

        let mut tx = self.pool.begin().await?;
        till::acquire_write_lock(&mut *tx).await?;

        let current = fetch_with_price(&mut tx, room_number, request.rent_price_cents).await?;
        ensure_can_set(&current, status)?;

        let now = Utc::now();
        let updated = current.with_status(status, now);
        room::save_state(&mut *tx, &updated, current.status).await?;
        let history = history::insert(&mut *tx, room_number, current.status, status, now).await?;

        tx.commit().await?;

        info!(
            room = room_number,
            from = %current.status,
            to = %status,
            "Room status changed"
        );

        Ok(StatusOutcome {
            room: updated,
            history,
        })
    }

    // -------------------------------------------------------------------------
    // Tills
    // -------------------------------------------------------------------------

    /// Closes the open till (if any) and opens a new one, atomically.
    pub async fn open_till(
        &self,
        employee_id: i64,
        opening_amount_cents: i64,
        description: Option<&str>,
    ) -> DbResult<OpenTillOutcome> {
        validate_opening_amount(opening_amount_cents)?;
        validate_description(description)?;
        let description = description.map(str::trim).filter(|d| !d.is_empty());

        let mut tx = self.pool.begin().await?;
        till::acquire_write_lock(&mut *tx).await?;

        if employee::fetch(&mut *tx, employee_id).await?.is_none() {
            return Err(CoreError::EmployeeNotFound(employee_id).into());
        }

        let now = Utc::now();
        let closed = match till::fetch_open(&mut *tx).await? {
            Some(previous) => {
                debug!(till_id = previous.id, "Closing previous till");
                Some(till::close(&mut tx, previous.id, now).await?)
            }
            None => None,
        };

        let opened = till::insert(&mut *tx, employee_id, now, opening_amount_cents, description).await?;

        tx.commit().await?;

        info!(
            till_id = opened.id,
            employee_id,
            opening_amount_cents,
            closed_till_id = closed.as_ref().map(|t| t.id),
            "Till opened"
        );

        Ok(OpenTillOutcome {
            till: opened,
            closed,
        })
    }

    /// Closes a till. A second close fails with `TillAlreadyClosed`.
    pub async fn close_till(&self, till_id: i64) -> DbResult<Till> {
        let mut tx = self.pool.begin().await?;
        till::acquire_write_lock(&mut *tx).await?;

        let closed = till::close(&mut tx, till_id, Utc::now()).await?;

        tx.commit().await?;

        info!(till_id, "Till closed");
        Ok(closed)
    }

    /// Posts a cash movement to the open till.
    pub async fn record_movement(
        &self,
        movement_type: MovementType,
        concept: &str,
        amount_cents: i64,
    ) -> DbResult<CashMovement> {
        validate_amount_cents("amount", amount_cents)?;
        validate_concept(concept)?;

        let mut tx = self.pool.begin().await?;
        till::acquire_write_lock(&mut *tx).await?;

        let open_till = till::fetch_open(&mut *tx).await?.ok_or(CoreError::NoOpenTill)?;
        let movement = till::insert_movement(
            &mut *tx,
            open_till.id,
            movement_type,
            concept.trim(),
            amount_cents,
            Utc::now(),
        )
        .await?;

        tx.commit().await?;

        info!(
            till_id = open_till.id,
            movement_id = movement.id,
            movement_type = %movement_type,
            amount_cents,
            "Cash movement recorded"
        );
        Ok(movement)
    }
}

fn validate_rent_price(rent_price_cents: Option<i64>) -> DbResult<()> {
    if let Some(price) = rent_price_cents {
        validate_amount_cents("rent_price", price)?;
    }
    Ok(())
}

/// Reads a room, applying a new rent price first when given.
async fn fetch_with_price(
    conn: &mut SqliteConnection,
    room_number: i64,
    rent_price_cents: Option<i64>,
) -> DbResult<Room> {
    if let Some(price) = rent_price_cents {
        room::set_rent_price(&mut *conn, room_number, price).await?;
    }
    room::fetch_existing(&mut *conn, room_number).await
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DbError;
    use crate::{Database, DbConfig};
    use chrono::Duration;
    use motel_core::till::TillSummary;
    use motel_core::{NewEmployee, NewRoom, Position};

    struct Fixture {
        db: Database,
        employee_id: i64,
    }

    async fn fixture() -> Fixture {
        fixture_with(DbConfig::in_memory()).await
    }

    async fn fixture_with(config: DbConfig) -> Fixture {
        let db = Database::new(config).await.unwrap();
        let employee = db
            .employees()
            .create(&NewEmployee {
                name: "Ana".to_string(),
                position: Position::Administration,
                date_hired: None,
            })
            .await
            .unwrap();
        for number in [1, 2] {
            db.rooms()
                .create(&NewRoom {
                    number,
                    rent_price_cents: 25000,
                    status: None,
                })
                .await
                .unwrap();
        }
        Fixture {
            db,
            employee_id: employee.id,
        }
    }

    fn occupy_request(room_number: i64, amount: Option<i64>, hours: i64) -> OccupyRequest {
        OccupyRequest {
            room_number,
            amount_cents: amount,
            vehicle_info: "Red sedan ABC-123".to_string(),
            rent_duration_hours: hours,
            rent_price_cents: None,
        }
    }

    async fn count(db: &Database, table: &str) -> i64 {
        sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}", table))
            .fetch_one(db.pool())
            .await
            .unwrap()
    }

    // -------------------------------------------------------------------------
    // Tills
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_balance_after_movements() {
        let f = fixture().await;
        let ledger = f.db.ledger();
        let opened = ledger.open_till(f.employee_id, 50000, None).await.unwrap();
        assert!(opened.closed.is_none());

        ledger.record_movement(MovementType::In, "Deposit", 12345).await.unwrap();
        ledger.record_movement(MovementType::Out, "Supplies", 2345).await.unwrap();

        let movements = f.db.tills().movements(opened.till.id).await.unwrap();
        let summary = TillSummary::compute(&opened.till, &movements);
        assert_eq!(summary.balance.cents(), 60000);
    }

    #[tokio::test]
    async fn test_opening_closes_previous_till() {
        let f = fixture().await;
        let ledger = f.db.ledger();
        let first = ledger.open_till(f.employee_id, 0, Some("morning")).await.unwrap();
        let second = ledger.open_till(f.employee_id, 1000, None).await.unwrap();

        let closed = second.closed.unwrap();
        assert_eq!(closed.id, first.till.id);
        assert!(closed.is_closed);
        assert!(second.till.is_open());
        assert_eq!(f.db.tills().current().await.unwrap().unwrap().id, second.till.id);

        let open_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM tills WHERE is_closed = 0")
            .fetch_one(f.db.pool())
            .await
            .unwrap();
        assert_eq!(open_count, 1);
    }

    #[tokio::test]
    async fn test_open_till_unknown_employee() {
        let f = fixture().await;
        let err = f.db.ledger().open_till(404, 0, None).await.unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::EmployeeNotFound(404))));
        assert_eq!(count(&f.db, "tills").await, 0);
    }

    #[tokio::test]
    async fn test_double_close_conflicts() {
        let f = fixture().await;
        let ledger = f.db.ledger();
        let opened = ledger.open_till(f.employee_id, 0, None).await.unwrap();

        ledger.close_till(opened.till.id).await.unwrap();
        let err = ledger.close_till(opened.till.id).await.unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::TillAlreadyClosed(_))));
    }

    #[tokio::test]
    async fn test_movement_validation_writes_nothing() {
        let f = fixture().await;
        let ledger = f.db.ledger();
        ledger.open_till(f.employee_id, 0, None).await.unwrap();

        for amount in [0, -500] {
            let err = ledger
                .record_movement(MovementType::Out, "Refund", amount)
                .await
                .unwrap_err();
            assert!(matches!(err, DbError::Domain(CoreError::Validation(_))));
        }
        assert!(ledger
            .record_movement(MovementType::In, &"x".repeat(256), 100)
            .await
            .is_err());
        assert_eq!(count(&f.db, "cash_movements").await, 0);
    }

    #[tokio::test]
    async fn test_movement_without_open_till() {
        let f = fixture().await;
        let err = f
            .db
            .ledger()
            .record_movement(MovementType::In, "Deposit", 100)
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::NoOpenTill)));
    }

    // -------------------------------------------------------------------------
    // Occupancy
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_occupy_writes_payment_movement_and_history() {
        let f = fixture().await;
        let ledger = f.db.ledger();
        let till = ledger.open_till(f.employee_id, 0, None).await.unwrap().till;

        let outcome = ledger.occupy(&occupy_request(1, None, 4)).await.unwrap();

        // Defaults to the room price
        assert_eq!(outcome.payment.amount_cents, 25000);
        assert_eq!(outcome.movement.amount_cents, outcome.payment.amount_cents);
        assert_eq!(outcome.movement.movement_type, MovementType::In);
        assert_eq!(outcome.movement.till_id, till.id);
        assert_eq!(outcome.movement.concept, "Room-1 Red sedan ABC-123 4h");

        let room = f.db.rooms().get(1).await.unwrap().unwrap();
        assert_eq!(room.status, RoomStatus::Occupied);
        assert_eq!(room.occupation_time, Some(outcome.payment.payment_time));
        assert_eq!(
            room.expiry_time,
            Some(outcome.payment.payment_time + Duration::hours(4))
        );
        assert_eq!(room.total_hours, 4);
        assert!(!room.is_renewal);

        assert_eq!(outcome.history.previous_status, RoomStatus::Available);
        assert_eq!(outcome.history.new_status, RoomStatus::Occupied);
        assert_eq!(count(&f.db, "payments").await, 1);
        assert_eq!(count(&f.db, "cash_movements").await, 1);
        assert_eq!(count(&f.db, "room_history").await, 1);
    }

    #[tokio::test]
    async fn test_renewals_extend_from_original_time() {
        let f = fixture().await;
        let ledger = f.db.ledger();
        ledger.open_till(f.employee_id, 0, None).await.unwrap();

        let occupied = ledger.occupy(&occupy_request(1, Some(20000), 4)).await.unwrap();
        let t0 = occupied.payment.payment_time;

        for (hours, amount) in [(2, 8000), (1, 4000)] {
            let renewed = ledger
                .renew(&RenewRequest {
                    room_number: 1,
                    amount_cents: amount,
                    rent_duration_hours: hours,
                    rent_price_cents: None,
                })
                .await
                .unwrap();
            assert_eq!(renewed.payment.vehicle_info, "Red sedan ABC-123");
            assert_eq!(renewed.movement.amount_cents, amount);
            assert_eq!(renewed.history.previous_status, RoomStatus::Occupied);
            assert_eq!(renewed.history.new_status, RoomStatus::Occupied);
        }

        let room = f.db.rooms().get(1).await.unwrap().unwrap();
        assert_eq!(room.occupation_time, Some(t0));
        assert_eq!(room.total_hours, 7);
        assert_eq!(room.expiry_time, Some(t0 + Duration::hours(7)));
        assert!(room.is_renewal);

        // Reconstruction from payments agrees with the stored window
        let payments = f
            .db
            .payments()
            .list_for_vehicle(1, "Red sedan ABC-123")
            .await
            .unwrap();
        let window = OccupancyWindow::reconstruct(&payments).unwrap();
        assert_eq!(window.total_hours, 7);
        assert_eq!(window.occupation_time, t0);
        assert_eq!(count(&f.db, "payments").await, 3);
        assert_eq!(count(&f.db, "cash_movements").await, 3);
    }

    #[tokio::test]
    async fn test_occupy_without_open_till_rolls_back() {
        let f = fixture().await;
        let err = f
            .db
            .ledger()
            .occupy(&occupy_request(1, None, 4))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::NoOpenTill)));

        let room = f.db.rooms().get(1).await.unwrap().unwrap();
        assert_eq!(room.status, RoomStatus::Available);
        assert_eq!(count(&f.db, "payments").await, 0);
        assert_eq!(count(&f.db, "room_history").await, 0);
    }

    #[tokio::test]
    async fn test_reprice_rolls_back_with_failed_occupy() {
        let f = fixture().await;
        let err = f
            .db
            .ledger()
            .occupy(&OccupyRequest {
                rent_price_cents: Some(99900),
                ..occupy_request(1, None, 4)
            })
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::NoOpenTill)));

        let room = f.db.rooms().get(1).await.unwrap().unwrap();
        assert_eq!(room.rent_price_cents, 25000);
        assert_eq!(room.status, RoomStatus::Available);
    }

    #[tokio::test]
    async fn test_occupy_charges_new_price() {
        let f = fixture().await;
        let ledger = f.db.ledger();
        ledger.open_till(f.employee_id, 0, None).await.unwrap();

        let outcome = ledger
            .occupy(&OccupyRequest {
                vehicle_info: String::new(),
                rent_price_cents: Some(30000),
                ..occupy_request(1, None, 4)
            })
            .await
            .unwrap();
        assert_eq!(outcome.room.rent_price_cents, 30000);
        assert_eq!(outcome.payment.amount_cents, 30000);
        assert_eq!(outcome.payment.vehicle_info, "");
        assert_eq!(outcome.movement.concept, "Room-1 4h");
    }

    #[tokio::test]
    async fn test_reprice_rolls_back_with_rejected_status() {
        let f = fixture().await;
        let err = f
            .db
            .ledger()
            .change_status(&StatusRequest {
                room_number: 2,
                status: RoomStatus::Occupied,
                rent_price_cents: Some(12300),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::InvalidTransition { .. })));

        let room = f.db.rooms().get(2).await.unwrap().unwrap();
        assert_eq!(room.rent_price_cents, 25000);
        assert_eq!(count(&f.db, "room_history").await, 0);
    }

    #[tokio::test]
    async fn test_occupy_occupied_room_conflicts() {
        let f = fixture().await;
        let ledger = f.db.ledger();
        ledger.open_till(f.employee_id, 0, None).await.unwrap();
        ledger.occupy(&occupy_request(1, None, 4)).await.unwrap();

        let err = ledger.occupy(&occupy_request(1, None, 4)).await.unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::InvalidTransition { .. })));
        assert_eq!(count(&f.db, "payments").await, 1);
    }

    #[tokio::test]
    async fn test_renew_requires_occupied() {
        let f = fixture().await;
        let ledger = f.db.ledger();
        ledger.open_till(f.employee_id, 0, None).await.unwrap();

        let err = ledger
            .renew(&RenewRequest {
                room_number: 2,
                amount_cents: 100,
                rent_duration_hours: 1,
                rent_price_cents: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::InvalidTransition { .. })));
    }

    #[tokio::test]
    async fn test_renew_rejects_zero_amount() {
        let f = fixture().await;
        let err = f
            .db
            .ledger()
            .renew(&RenewRequest {
                room_number: 1,
                amount_cents: 0,
                rent_duration_hours: 1,
                rent_price_cents: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::Validation(_))));
    }

    #[tokio::test]
    async fn test_unknown_room() {
        let f = fixture().await;
        let err = f.db.ledger().mark_dirty(77).await.unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::RoomNotFound(77))));
    }

    #[tokio::test]
    async fn test_leaving_occupied_clears_window() {
        let f = fixture().await;
        let ledger = f.db.ledger();
        ledger.open_till(f.employee_id, 0, None).await.unwrap();
        ledger.occupy(&occupy_request(2, None, 4)).await.unwrap();

        let dirty = ledger.mark_dirty(2).await.unwrap();
        assert_eq!(dirty.room.status, RoomStatus::Dirty);
        assert!(dirty.room.cleaning_start_time.is_some());
        assert_eq!(dirty.history.previous_status, RoomStatus::Occupied);

        let stored = f.db.rooms().get(2).await.unwrap().unwrap();
        assert_eq!(stored, dirty.room);
        assert_eq!(stored.occupation_time, None);
        assert_eq!(stored.expiry_time, None);
        assert_eq!(stored.total_hours, 0);

        let clean = ledger.set_status(2, RoomStatus::Clean).await.unwrap();
        assert_eq!(clean.room.cleaning_start_time, dirty.room.cleaning_start_time);

        let err = ledger.set_status(2, RoomStatus::Occupied).await.unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::InvalidTransition { .. })));
        assert_eq!(f.db.history().list_for_room(2).await.unwrap().len(), 3);
    }

    // -------------------------------------------------------------------------
    // Concurrency (on-disk database, several connections)
    // -------------------------------------------------------------------------

    fn temp_db_config() -> (DbConfig, std::path::PathBuf) {
        let path = std::env::temp_dir().join(format!("motel-ledger-{}.db", uuid::Uuid::new_v4()));
        (DbConfig::new(&path).max_connections(4), path)
    }

    fn remove_db_files(path: &std::path::Path) {
        for suffix in ["", "-wal", "-shm"] {
            let _ = std::fs::remove_file(format!("{}{}", path.display(), suffix));
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_status_updates_keep_history_consistent() {
        let (config, path) = temp_db_config();
        let f = fixture_with(config).await;
        let ledger = f.db.ledger();

        let (a, b) = tokio::join!(
            ledger.set_status(1, RoomStatus::Maintenance),
            ledger.mark_dirty(1)
        );
        a.unwrap();
        b.unwrap();

        let rows = f.db.history().list_for_room(1).await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].previous_status, RoomStatus::Available);
        // The second writer saw the first writer's result
        assert_eq!(rows[1].previous_status, rows[0].new_status);

        let room = f.db.rooms().get(1).await.unwrap().unwrap();
        assert_eq!(room.status, rows[1].new_status);

        f.db.close().await;
        remove_db_files(&path);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_opens_leave_one_open_till() {
        let (config, path) = temp_db_config();
        let f = fixture_with(config).await;
        let ledger = f.db.ledger();
        ledger.open_till(f.employee_id, 0, None).await.unwrap();

        let (a, b) = tokio::join!(
            ledger.open_till(f.employee_id, 100, None),
            ledger.open_till(f.employee_id, 200, None)
        );
        let (a, b) = (a.unwrap(), b.unwrap());

        // Each open closed exactly the till that was open before it
        let closed_ids = [a.closed.unwrap().id, b.closed.unwrap().id];
        assert_ne!(closed_ids[0], closed_ids[1]);

        let open: Vec<(i64,)> = sqlx::query_as("SELECT id FROM tills WHERE is_closed = 0")
            .fetch_all(f.db.pool())
            .await
            .unwrap();
        assert_eq!(open.len(), 1);
        assert_eq!(count(&f.db, "tills").await, 3);

        f.db.close().await;
        remove_db_files(&path);
    }
}
