//! # Room Repository
//!
//! Database operations for rooms.
//!
//! Status changes never go through here directly: they are ledger units
//! (see [`crate::ledger`]) because each one also writes a history row, and
//! occupations write a payment and a cash movement too. This repository
//! covers registration, price changes and reads.

use sqlx::sqlite::SqliteExecutor;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use motel_core::validation::{validate_amount_cents, validate_room_number};
use motel_core::{CoreError, NewRoom, Room, RoomStatus};

const ROOM_COLUMNS: &str = "number, status, rent_price_cents, occupation_time, expiry_time, \
                            cleaning_start_time, total_hours, is_renewal";

// =============================================================================
// Query Functions
// =============================================================================

/// Fetches a room by number.
pub async fn fetch(exec: impl SqliteExecutor<'_>, number: i64) -> DbResult<Option<Room>> {
    let sql = format!("SELECT {} FROM rooms WHERE number = ?1", ROOM_COLUMNS);
    let room = sqlx::query_as::<_, Room>(&sql)
        .bind(number)
        .fetch_optional(exec)
        .await?;
    Ok(room)
}

/// Fetches a room or fails with `RoomNotFound`.
pub async fn fetch_existing(exec: impl SqliteExecutor<'_>, number: i64) -> DbResult<Room> {
    fetch(exec, number)
        .await?
        .ok_or(DbError::Domain(CoreError::RoomNotFound(number)))
}

/// Writes a room's state, provided its status is still `expected`.
///
/// ## Returns
/// `DbError::Conflict` when the stored status moved on since it was read.
pub async fn save_state(
    exec: impl SqliteExecutor<'_>,
    room: &Room,
    expected: RoomStatus,
) -> DbResult<()> {
    let result = sqlx::query(
        r#"
        UPDATE rooms
        SET status = ?1,
            occupation_time = ?2,
            expiry_time = ?3,
            cleaning_start_time = ?4,
            total_hours = ?5,
            is_renewal = ?6
        WHERE number = ?7 AND status = ?8
        "#,
    )
    .bind(room.status)
    .bind(room.occupation_time)
    .bind(room.expiry_time)
    .bind(room.cleaning_start_time)
    .bind(room.total_hours)
    .bind(room.is_renewal)
    .bind(room.number)
    .bind(expected)
    .execute(exec)
    .await?;

    if result.rows_affected() != 1 {
        return Err(DbError::Conflict(format!(
            "room {} is no longer {}",
            room.number, expected
        )));
    }

    Ok(())
}

/// Changes a room's default rental price.
pub async fn set_rent_price(
    exec: impl SqliteExecutor<'_>,
    number: i64,
    rent_price_cents: i64,
) -> DbResult<()> {
    debug!(number, rent_price_cents, "Updating rent price");

    let result = sqlx::query("UPDATE rooms SET rent_price_cents = ?1 WHERE number = ?2")
        .bind(rent_price_cents)
        .bind(number)
        .execute(exec)
        .await?;

    if result.rows_affected() != 1 {
        return Err(DbError::Domain(CoreError::RoomNotFound(number)));
    }

    Ok(())
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for room database operations.
#[derive(Debug, Clone)]
pub struct RoomRepository {
    pool: SqlitePool,
}

impl RoomRepository {
    pub fn new(pool: SqlitePool) -> Self {
        RoomRepository { pool }
    }

    /// Lists every room, ordered by number.
    pub async fn list(&self) -> DbResult<Vec<Room>> {
        let sql = format!("SELECT {} FROM rooms ORDER BY number", ROOM_COLUMNS);
        let rooms = sqlx::query_as::<_, Room>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(rooms)
    }

    pub async fn get(&self, number: i64) -> DbResult<Option<Room>> {
        fetch(&self.pool, number).await
    }

    /// Registers a room.
    ///
    /// A room may be registered in any status except Occupied, which needs
    /// a payment.
    pub async fn create(&self, new_room: &NewRoom) -> DbResult<Room> {
        validate_room_number(new_room.number)?;
        validate_amount_cents("rent_price", new_room.rent_price_cents)?;

        let status = new_room.status.unwrap_or_default();
        if status == RoomStatus::Occupied {
            return Err(CoreError::InvalidTransition {
                room_number: new_room.number,
                from: RoomStatus::Available,
                to: RoomStatus::Occupied,
            }
            .into());
        }

        debug!(number = new_room.number, status = %status, "Creating room");

        let sql = format!(
            "INSERT INTO rooms (number, status, rent_price_cents) VALUES (?1, ?2, ?3) RETURNING {}",
            ROOM_COLUMNS
        );
        let room = sqlx::query_as::<_, Room>(&sql)
            .bind(new_room.number)
            .bind(status)
            .bind(new_room.rent_price_cents)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| match DbError::from(e) {
                DbError::UniqueViolation { .. } => {
                    DbError::Domain(CoreError::RoomExists(new_room.number))
                }
                other => other,
            })?;

        Ok(room)
    }

    /// Changes the default rental price. Status is untouched.
    pub async fn update_rent_price(&self, number: i64, rent_price_cents: i64) -> DbResult<Room> {
        validate_amount_cents("rent_price", rent_price_cents)?;
        set_rent_price(&self.pool, number, rent_price_cents).await?;
        fetch_existing(&self.pool, number).await
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};

    async fn db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    fn new_room(number: i64) -> NewRoom {
        NewRoom {
            number,
            rent_price_cents: 25000,
            status: None,
        }
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let db = db().await;
        let room = db.rooms().create(&new_room(12)).await.unwrap();
        assert_eq!(room.number, 12);
        assert_eq!(room.status, RoomStatus::Available);
        assert_eq!(room.total_hours, 0);
        assert!(!room.is_renewal);

        let fetched = db.rooms().get(12).await.unwrap().unwrap();
        assert_eq!(fetched, room);
        assert!(db.rooms().get(99).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_room_is_rejected() {
        let db = db().await;
        db.rooms().create(&new_room(1)).await.unwrap();
        let err = db.rooms().create(&new_room(1)).await.unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::RoomExists(1))));
    }

    #[tokio::test]
    async fn test_cannot_register_occupied() {
        let db = db().await;
        let mut room = new_room(3);
        room.status = Some(RoomStatus::Occupied);
        assert!(db.rooms().create(&room).await.is_err());
    }

    #[tokio::test]
    async fn test_list_is_ordered() {
        let db = db().await;
        for n in [5, 2, 9] {
            db.rooms().create(&new_room(n)).await.unwrap();
        }
        let numbers: Vec<i64> = db.rooms().list().await.unwrap().iter().map(|r| r.number).collect();
        assert_eq!(numbers, vec![2, 5, 9]);
    }

    #[tokio::test]
    async fn test_update_rent_price() {
        let db = db().await;
        db.rooms().create(&new_room(4)).await.unwrap();
        let room = db.rooms().update_rent_price(4, 30000).await.unwrap();
        assert_eq!(room.rent_price_cents, 30000);

        assert!(db.rooms().update_rent_price(4, 0).await.is_err());
        assert!(matches!(
            db.rooms().update_rent_price(40, 100).await,
            Err(DbError::Domain(CoreError::RoomNotFound(40)))
        ));
    }

    #[tokio::test]
    async fn test_save_state_checks_expected_status() {
        let db = db().await;
        let room = db.rooms().create(&new_room(8)).await.unwrap();
        let dirty = room.with_status(RoomStatus::Dirty, chrono::Utc::now());

        // Stored status is Available, not Clean
        let err = save_state(db.pool(), &dirty, RoomStatus::Clean).await.unwrap_err();
        assert!(matches!(err, DbError::Conflict(_)));

        save_state(db.pool(), &dirty, RoomStatus::Available).await.unwrap();
        assert_eq!(db.rooms().get(8).await.unwrap().unwrap().status, RoomStatus::Dirty);
    }
}
