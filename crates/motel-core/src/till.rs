//! # Till Module
//!
//! Balance computation for a till (cash-drawer session).
//!
//! ```text
//! balance = opening + Σ in − Σ out
//! ```
//!
//! [`TillSummary::compute`] is the only place this formula lives. The balance
//! endpoint, the last-report endpoint and the rendered turn report all go
//! through it.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::types::{CashMovement, MovementType, Till};

/// Totals for one till.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TillSummary {
    pub till_id: i64,
    pub opening: Money,
    pub total_in: Money,
    pub total_out: Money,
    pub balance: Money,
    pub movement_count: usize,
}

impl TillSummary {
    /// Computes totals from a till and its movements.
    ///
    /// Movements belonging to other tills are ignored.
    pub fn compute(till: &Till, movements: &[CashMovement]) -> Self {
        let own = movements.iter().filter(|m| m.till_id == till.id);

        let mut total_in = Money::zero();
        let mut total_out = Money::zero();
        let mut movement_count = 0;
        for movement in own {
            match movement.movement_type {
                MovementType::In => total_in += movement.amount(),
                MovementType::Out => total_out += movement.amount(),
            }
            movement_count += 1;
        }

        let opening = till.opening_amount();
        TillSummary {
            till_id: till.id,
            opening,
            total_in,
            total_out,
            balance: opening + total_in - total_out,
            movement_count,
        }
    }
}
