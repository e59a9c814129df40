//! # History Repository
//!
//! Append-only audit of room status changes. Rows are written by the ledger
//! in the same transaction as the change they record.

use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteExecutor;
use sqlx::SqlitePool;

use crate::error::DbResult;
use motel_core::{RoomHistory, RoomStatus};

const HISTORY_COLUMNS: &str = "id, room_number, previous_status, new_status, changed_at";

pub async fn insert(
    exec: impl SqliteExecutor<'_>,
    room_number: i64,
    previous_status: RoomStatus,
    new_status: RoomStatus,
    changed_at: DateTime<Utc>,
) -> DbResult<RoomHistory> {
    let sql = format!(
        "INSERT INTO room_history (room_number, previous_status, new_status, changed_at) \
         VALUES (?1, ?2, ?3, ?4) RETURNING {}",
        HISTORY_COLUMNS
    );
    let row = sqlx::query_as::<_, RoomHistory>(&sql)
        .bind(room_number)
        .bind(previous_status)
        .bind(new_status)
        .bind(changed_at)
        .fetch_one(exec)
        .await?;
    Ok(row)
}

#[derive(Debug, Clone)]
pub struct HistoryRepository {
    pool: SqlitePool,
}

impl HistoryRepository {
    pub fn new(pool: SqlitePool) -> Self {
        HistoryRepository { pool }
    }

    /// Status changes of a room, oldest first.
    pub async fn list_for_room(&self, room_number: i64) -> DbResult<Vec<RoomHistory>> {
        let sql = format!(
            "SELECT {} FROM room_history WHERE room_number = ?1 ORDER BY id",
            HISTORY_COLUMNS
        );
        let rows = sqlx::query_as::<_, RoomHistory>(&sql)
            .bind(room_number)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }
}
