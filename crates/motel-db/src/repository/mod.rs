//! # Repository Module
//!
//! Database repository implementations for Motel Ledger.
//!
//! ## Two Ways In
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  Handler reads                     Ledger units (writes)               │
//! │       │                                  │                              │
//! │       │  db.rooms().get(12)              │  tx = pool.begin()           │
//! │       ▼                                  ▼                              │
//! │  RoomRepository ──┐              room::fetch(&mut *tx, 12)             │
//! │  (owns a pool)    │              payment::insert(&mut *tx, ...)        │
//! │                   │              history::insert(&mut *tx, ...)        │
//! │                   ▼                      │                              │
//! │        module-level query functions ◄────┘                              │
//! │        generic over SqliteExecutor                                      │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each repository's SQL lives once, in free functions that take any
//! executor. The repository structs call them with the pool; the
//! [`Ledger`](crate::ledger::Ledger) calls them with an open transaction.
//!
//! ## Available Repositories
//!
//! - [`RoomRepository`](room::RoomRepository) - Rooms and their live state
//! - [`PaymentRepository`](payment::PaymentRepository) - Rental payments
//! - [`TillRepository`](till::TillRepository) - Tills and cash movements
//! - [`EmployeeRepository`](employee::EmployeeRepository) - Staff and shifts
//! - [`HistoryRepository`](history::HistoryRepository) - Room status audit

pub mod employee;
pub mod history;
pub mod payment;
pub mod room;
pub mod till;
