//! # Turn Report
//!
//! The data behind a till's end-of-turn report.
//!
//! ## Report Flow
//! ```text
//! ┌──────────┐   ┌──────────────┐   ┌─────────────┐   ┌────────────┐
//! │   Till   │──►│  TurnReport  │──►│  Renderer   │──►│  Notifier  │
//! │ + moves  │   │ (this file)  │   │ (document)  │   │ (delivery) │
//! └──────────┘   └──────────────┘   └─────────────┘   └────────────┘
//!                       │
//!                       └──► JSON for the last-report endpoint
//! ```
//!
//! The report never computes totals itself; it embeds a [`TillSummary`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::till::TillSummary;
use crate::types::{CashMovement, Till};

/// A till's turn report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TurnReport {
    pub till: Till,
    /// Name of the employee responsible for the till.
    pub responsible: String,
    pub summary: TillSummary,
    /// Movements in chronological order.
    pub movements: Vec<CashMovement>,
    /// Close time for a closed till, generation time for an open one.
    #[ts(as = "String")]
    pub as_of: DateTime<Utc>,
}

impl TurnReport {
    /// Builds a report, ordering movements oldest first.
    ///
    /// `generated_at` is only used while the till is still open.
    pub fn build(
        till: Till,
        responsible: impl Into<String>,
        mut movements: Vec<CashMovement>,
        generated_at: DateTime<Utc>,
    ) -> Self {
        movements.retain(|m| m.till_id == till.id);
        movements.sort_by_key(|m| (m.created_at, m.id));

        let summary = TillSummary::compute(&till, &movements);
        let as_of = till.closed_at.unwrap_or(generated_at);

        TurnReport {
            till,
            responsible: responsible.into(),
            summary,
            movements,
            as_of,
        }
    }

    /// Whether this is the final report of a closed till.
    pub fn is_final(&self) -> bool {
        self.till.is_closed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::MovementType;
    use chrono::{Duration, TimeZone};

    fn opened_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 8, 1, 14, 0, 0).unwrap()
    }

    fn movement(id: i64, minutes: i64, movement_type: MovementType, cents: i64) -> CashMovement {
        CashMovement {
            id,
            till_id: 4,
            movement_type,
            concept: format!("m{}", id),
            amount_cents: cents,
            created_at: opened_at() + Duration::minutes(minutes),
        }
    }

    fn till(closed: bool) -> Till {
        Till {
            id: 4,
            employee_id: 2,
            opened_at: opened_at(),
            opening_amount_cents: 50000,
            description: Some("Quiet night".to_string()),
            is_closed: closed,
            closed_at: closed.then(|| opened_at() + Duration::hours(8)),
        }
    }

    #[test]
    fn test_build_orders_movements() {
        let movements = vec![
            movement(2, 30, MovementType::Out, 2345),
            movement(1, 10, MovementType::In, 12345),
        ];
        let report = TurnReport::build(till(true), "Ana", movements, opened_at());

        let ids: Vec<i64> = report.movements.iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![1, 2]);
        assert_eq!(report.summary.balance.cents(), 60000);
        assert_eq!(report.responsible, "Ana");
    }

    #[test]
    fn test_as_of_uses_close_time_when_closed() {
        let generated = opened_at() + Duration::hours(20);

        let closed = TurnReport::build(till(true), "Ana", vec![], generated);
        assert!(closed.is_final());
        assert_eq!(closed.as_of, opened_at() + Duration::hours(8));

        let open = TurnReport::build(till(false), "Ana", vec![], generated);
        assert!(!open.is_final());
        assert_eq!(open.as_of, generated);
    }
}
