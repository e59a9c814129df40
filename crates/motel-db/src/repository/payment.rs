//! # Payment Repository
//!
//! Rental payments are append-only: one row per occupation and one per
//! renewal, written by the ledger. This repository serves the reads the
//! front desk needs (last payment, payments for a vehicle).

use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteExecutor;
use sqlx::SqlitePool;

use crate::error::DbResult;
use motel_core::Payment;

const PAYMENT_COLUMNS: &str =
    "id, room_number, payment_time, amount_cents, vehicle_info, rent_duration_hours";

/// Inserts a payment row.
pub async fn insert(
    exec: impl SqliteExecutor<'_>,
    room_number: i64,
    payment_time: DateTime<Utc>,
    amount_cents: i64,
    vehicle_info: &str,
    rent_duration_hours: i64,
) -> DbResult<Payment> {
    let sql = format!(
        "INSERT INTO payments (room_number, payment_time, amount_cents, vehicle_info, rent_duration_hours) \
         VALUES (?1, ?2, ?3, ?4, ?5) RETURNING {}",
        PAYMENT_COLUMNS
    );
    let payment = sqlx::query_as::<_, Payment>(&sql)
        .bind(room_number)
        .bind(payment_time)
        .bind(amount_cents)
        .bind(vehicle_info)
        .bind(rent_duration_hours)
        .fetch_one(exec)
        .await?;
    Ok(payment)
}

/// Most recent payment for a room.
pub async fn last_for_room(
    exec: impl SqliteExecutor<'_>,
    room_number: i64,
) -> DbResult<Option<Payment>> {
    let sql = format!(
        "SELECT {} FROM payments WHERE room_number = ?1 ORDER BY payment_time DESC, id DESC LIMIT 1",
        PAYMENT_COLUMNS
    );
    let payment = sqlx::query_as::<_, Payment>(&sql)
        .bind(room_number)
        .fetch_optional(exec)
        .await?;
    Ok(payment)
}

/// Repository for payment reads.
#[derive(Debug, Clone)]
pub struct PaymentRepository {
    pool: SqlitePool,
}

impl PaymentRepository {
    pub fn new(pool: SqlitePool) -> Self {
        PaymentRepository { pool }
    }

    pub async fn last_for_room(&self, room_number: i64) -> DbResult<Option<Payment>> {
        last_for_room(&self.pool, room_number).await
    }

    /// All payments for a room, oldest first.
    pub async fn list_for_room(&self, room_number: i64) -> DbResult<Vec<Payment>> {
        let sql = format!(
            "SELECT {} FROM payments WHERE room_number = ?1 ORDER BY payment_time, id",
            PAYMENT_COLUMNS
        );
        let payments = sqlx::query_as::<_, Payment>(&sql)
            .bind(room_number)
            .fetch_all(&self.pool)
            .await?;
        Ok(payments)
    }

    /// Payments for one vehicle in one room, oldest first.
    pub async fn list_for_vehicle(
        &self,
        room_number: i64,
        vehicle_info: &str,
    ) -> DbResult<Vec<Payment>> {
        let sql = format!(
            "SELECT {} FROM payments WHERE room_number = ?1 AND vehicle_info = ?2 \
             ORDER BY payment_time, id",
            PAYMENT_COLUMNS
        );
        let payments = sqlx::query_as::<_, Payment>(&sql)
            .bind(room_number)
            .bind(vehicle_info)
            .fetch_all(&self.pool)
            .await?;
        Ok(payments)
    }
}
