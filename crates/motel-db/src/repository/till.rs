//! # Till Repository
//!
//! Database operations for tills and their cash movements.
//!
//! ## Store-Level Guarantees
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  tills                                                                  │
//! │  ├── idx_tills_single_open   UNIQUE(is_closed) WHERE is_closed = 0     │
//! │  └── trg_tills_no_reopen     closed → open is rejected                 │
//! │                                                                         │
//! │  cash_movements                                                         │
//! │  ├── trg_cash_movements_open_till   insert into closed till rejected   │
//! │  └── trg_cash_movements_immutable   no UPDATE / DELETE                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Opening, closing and posting are ledger units; this module holds the SQL
//! for them plus the read side.

use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteExecutor;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use motel_core::{CashMovement, CoreError, MovementType, Till};

const TILL_COLUMNS: &str =
    "id, employee_id, opened_at, opening_amount_cents, description, is_closed, closed_at";

const MOVEMENT_COLUMNS: &str = "id, till_id, movement_type, concept, amount_cents, created_at";

// =============================================================================
// Query Functions
// =============================================================================

/// Takes SQLite's write lock for the current transaction.
///
/// Must be the first statement of every ledger unit: a deferred transaction
/// that reads first and writes later can fail with SQLITE_BUSY instead of
/// waiting, so units start with a write that changes no values.
pub async fn acquire_write_lock(exec: impl SqliteExecutor<'_>) -> DbResult<()> {
    sqlx::query("UPDATE tills SET is_closed = is_closed WHERE is_closed = 0")
        .execute(exec)
        .await?;
    Ok(())
}

pub async fn fetch(exec: impl SqliteExecutor<'_>, id: i64) -> DbResult<Option<Till>> {
    let sql = format!("SELECT {} FROM tills WHERE id = ?1", TILL_COLUMNS);
    let till = sqlx::query_as::<_, Till>(&sql)
        .bind(id)
        .fetch_optional(exec)
        .await?;
    Ok(till)
}

/// The open till, if any.
pub async fn fetch_open(exec: impl SqliteExecutor<'_>) -> DbResult<Option<Till>> {
    let sql = format!("SELECT {} FROM tills WHERE is_closed = 0", TILL_COLUMNS);
    let till = sqlx::query_as::<_, Till>(&sql)
        .fetch_optional(exec)
        .await?;
    Ok(till)
}

/// Inserts a new open till.
///
/// Fails with `UniqueViolation` if another till is still open.
pub async fn insert(
    exec: impl SqliteExecutor<'_>,
    employee_id: i64,
    opened_at: DateTime<Utc>,
    opening_amount_cents: i64,
    description: Option<&str>,
) -> DbResult<Till> {
    let sql = format!(
        "INSERT INTO tills (employee_id, opened_at, opening_amount_cents, description, is_closed) \
         VALUES (?1, ?2, ?3, ?4, 0) RETURNING {}",
        TILL_COLUMNS
    );
    let till = sqlx::query_as::<_, Till>(&sql)
        .bind(employee_id)
        .bind(opened_at)
        .bind(opening_amount_cents)
        .bind(description)
        .fetch_one(exec)
        .await?;
    Ok(till)
}

/// Closes a till, only if it is still open.
///
/// ## Returns
/// * `Ok(Till)` - the till as closed by this call
/// * `Err(TillAlreadyClosed)` - the till was already closed
/// * `Err(TillNotFound)` - no such till
pub async fn close(
    conn: &mut sqlx::SqliteConnection,
    id: i64,
    closed_at: DateTime<Utc>,
) -> DbResult<Till> {
    let sql = format!(
        "UPDATE tills SET is_closed = 1, closed_at = ?1 WHERE id = ?2 AND is_closed = 0 RETURNING {}",
        TILL_COLUMNS
    );
    let closed = sqlx::query_as::<_, Till>(&sql)
        .bind(closed_at)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

    match closed {
        Some(till) => Ok(till),
        None => match fetch(&mut *conn, id).await? {
            Some(_) => Err(CoreError::TillAlreadyClosed(id).into()),
            None => Err(CoreError::TillNotFound(id).into()),
        },
    }
}

/// Inserts a cash movement against `till_id`.
pub async fn insert_movement(
    exec: impl SqliteExecutor<'_>,
    till_id: i64,
    movement_type: MovementType,
    concept: &str,
    amount_cents: i64,
    created_at: DateTime<Utc>,
) -> DbResult<CashMovement> {
    let sql = format!(
        "INSERT INTO cash_movements (till_id, movement_type, concept, amount_cents, created_at) \
         VALUES (?1, ?2, ?3, ?4, ?5) RETURNING {}",
        MOVEMENT_COLUMNS
    );
    let movement = sqlx::query_as::<_, CashMovement>(&sql)
        .bind(till_id)
        .bind(movement_type)
        .bind(concept)
        .bind(amount_cents)
        .bind(created_at)
        .fetch_one(exec)
        .await?;
    Ok(movement)
}

/// Movements of a till in chronological order.
pub async fn list_movements(
    exec: impl SqliteExecutor<'_>,
    till_id: i64,
) -> DbResult<Vec<CashMovement>> {
    let sql = format!(
        "SELECT {} FROM cash_movements WHERE till_id = ?1 ORDER BY created_at, id",
        MOVEMENT_COLUMNS
    );
    let movements = sqlx::query_as::<_, CashMovement>(&sql)
        .bind(till_id)
        .fetch_all(exec)
        .await?;
    Ok(movements)
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for till reads.
#[derive(Debug, Clone)]
pub struct TillRepository {
    pool: SqlitePool,
}

impl TillRepository {
    pub fn new(pool: SqlitePool) -> Self {
        TillRepository { pool }
    }

    pub async fn get(&self, id: i64) -> DbResult<Option<Till>> {
        fetch(&self.pool, id).await
    }

    /// Fetches a till or fails with `TillNotFound`.
    pub async fn get_existing(&self, id: i64) -> DbResult<Till> {
        self.get(id)
            .await?
            .ok_or(DbError::Domain(CoreError::TillNotFound(id)))
    }

    pub async fn current(&self) -> DbResult<Option<Till>> {
        fetch_open(&self.pool).await
    }

    /// The most recently closed till.
    pub async fn last_closed(&self) -> DbResult<Option<Till>> {
        let sql = format!(
            "SELECT {} FROM tills WHERE is_closed = 1 ORDER BY closed_at DESC, id DESC LIMIT 1",
            TILL_COLUMNS
        );
        let till = sqlx::query_as::<_, Till>(&sql)
            .fetch_optional(&self.pool)
            .await?;
        Ok(till)
    }

    pub async fn movements(&self, till_id: i64) -> DbResult<Vec<CashMovement>> {
        debug!(till_id, "Listing cash movements");
        list_movements(&self.pool, till_id).await
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
