//! # Till Manager
//!
//! Shift handover and cash posting.
//!
//! ## Handover Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  open_till(employee, opening)                                           │
//! │                                                                         │
//! │  ┌──────────── one transaction ────────────┐                           │
//! │  │ lock → close open till (CAS) → insert   │──► commit                 │
//! │  └─────────────────────────────────────────┘       │                   │
//! │                                                     ▼                   │
//! │                         prior till closed? ── no ──► report_status=none │
//! │                                │                                        │
//! │                               yes                                       │
//! │                                ▼                                        │
//! │              build report → render → notify                             │
//! │                                │                                        │
//! │                  ok ──► delivered      err ──► failed + warning         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A failed report never reopens the till. The closed till and its movements
//! are already committed; `last_report` and the spool can be retried by hand.

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use motel_core::report::TurnReport;
use motel_core::till::TillSummary;
use motel_core::{CashMovement, CoreError, Money, MovementType, Till};
use motel_db::{Database, DbError};

use super::notify::ReportNotifier;
use super::report::{ReportDocument, ReportRenderer};
use super::ServiceResult;
use crate::error::ApiError;

// =============================================================================
// Results
// =============================================================================

/// What happened to the turn report of a till closed by this request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportStatus {
    /// Rendered and handed to the notifier.
    Delivered,
    /// Rendering or delivery failed; see the warning.
    Failed,
    /// No till was closed.
    None,
}

/// Report outcome attached to handover and close results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportDelivery {
    pub report_status: ReportStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning: Option<ApiError>,
}

impl ReportDelivery {
    fn none() -> Self {
        ReportDelivery {
            report_status: ReportStatus::None,
            warning: None,
        }
    }

    fn delivered() -> Self {
        ReportDelivery {
            report_status: ReportStatus::Delivered,
            warning: None,
        }
    }

    fn failed(warning: ApiError) -> Self {
        ReportDelivery {
            report_status: ReportStatus::Failed,
            warning: Some(warning),
        }
    }
}

/// Result of opening a till.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Handover {
    /// The newly opened till.
    pub till: Till,
    /// The till this handover closed, if one was open.
    pub closed_till: Option<Till>,
    #[serde(flatten)]
    pub delivery: ReportDelivery,
}

/// Result of an explicit close.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TillClosure {
    pub till: Till,
    pub summary: TillSummary,
    #[serde(flatten)]
    pub delivery: ReportDelivery,
}

// =============================================================================
// Till Manager
// =============================================================================

#[derive(Clone)]
pub struct TillManager {
    db: Database,
    renderer: Arc<dyn ReportRenderer>,
    notifier: Arc<dyn ReportNotifier>,
}

impl TillManager {
    pub fn new(
        db: Database,
        renderer: Arc<dyn ReportRenderer>,
        notifier: Arc<dyn ReportNotifier>,
    ) -> Self {
        TillManager {
            db,
            renderer,
            notifier,
        }
    }

    /// Closes the open till (if any), opens a new one, then sends the
    /// closed till's report.
    pub async fn open_till(
        &self,
        employee_id: i64,
        opening_amount_cents: i64,
        description: Option<&str>,
    ) -> ServiceResult<Handover> {
        let outcome = self
            .db
            .ledger()
            .open_till(employee_id, opening_amount_cents, description)
            .await?;

        let delivery = match &outcome.closed {
            Some(closed) => self.publish(closed).await,
            None => ReportDelivery::none(),
        };

        Ok(Handover {
            till: outcome.till,
            closed_till: outcome.closed,
            delivery,
        })
    }

    /// The open till.
    pub async fn current_till(&self) -> ServiceResult<Till> {
        Ok(self.db.tills().current().await?.ok_or(CoreError::NoOpenTill)?)
    }

    pub async fn record_movement(
        &self,
        movement_type: MovementType,
        concept: &str,
        amount_cents: i64,
    ) -> ServiceResult<CashMovement> {
        Ok(self
            .db
            .ledger()
            .record_movement(movement_type, concept, amount_cents)
            .await?)
    }

    /// Totals of a till, open or closed.
    pub async fn summary(&self, till_id: i64) -> ServiceResult<TillSummary> {
        let till = self.db.tills().get_existing(till_id).await?;
        let movements = self.db.tills().movements(till_id).await?;
        Ok(TillSummary::compute(&till, &movements))
    }

    /// `opening + Σin − Σout`.
    pub async fn balance(&self, till_id: i64) -> ServiceResult<Money> {
        Ok(self.summary(till_id).await?.balance)
    }

    /// Closes a till and sends its report. Closing twice is a conflict.
    pub async fn close_till(&self, till_id: i64) -> ServiceResult<TillClosure> {
        let till = self.db.ledger().close_till(till_id).await?;
        let movements = self.db.tills().movements(till_id).await?;
        let summary = TillSummary::compute(&till, &movements);
        let delivery = self.publish(&till).await;

        Ok(TillClosure {
            till,
            summary,
            delivery,
        })
    }

    pub async fn movements(&self, till_id: i64) -> ServiceResult<Vec<CashMovement>> {
        self.db.tills().get_existing(till_id).await?;
        Ok(self.db.tills().movements(till_id).await?)
    }

    pub async fn current_movements(&self) -> ServiceResult<Vec<CashMovement>> {
        let till = self.current_till().await?;
        Ok(self.db.tills().movements(till.id).await?)
    }

    /// Report of the most recently closed till.
    pub async fn last_report(&self) -> ServiceResult<TurnReport> {
        let till = self
            .db
            .tills()
            .last_closed()
            .await?
            .ok_or_else(|| DbError::not_found("Closed till", "last"))?;
        self.build_report(till).await
    }

    /// Renders the open till's report without closing it.
    pub async fn export_current_report(&self) -> ServiceResult<ReportDocument> {
        let till = self.current_till().await?;
        let report = self.build_report(till).await?;
        Ok(self.renderer.render(&report)?)
    }

    async fn build_report(&self, till: Till) -> ServiceResult<TurnReport> {
        let responsible = match self.db.employees().get(till.employee_id).await? {
            Some(employee) => employee.name,
            None => format!("Employee #{}", till.employee_id),
        };
        let movements = self.db.tills().movements(till.id).await?;
        Ok(TurnReport::build(till, responsible, movements, Utc::now()))
    }

    async fn render_and_send(&self, till: &Till) -> ServiceResult<()> {
        let report = self.build_report(till.clone()).await?;
        let document = self.renderer.render(&report)?;
        self.notifier.deliver(&report, &document).await?;
        Ok(())
    }

    /// Post-commit report delivery. Never fails the request.
    async fn publish(&self, till: &Till) -> ReportDelivery {
        match self.render_and_send(till).await {
            Ok(()) => {
                info!(till_id = till.id, "Turn report delivered");
                ReportDelivery::delivered()
            }
            Err(err) => {
                warn!(till_id = till.id, error = %err, "Turn report not delivered");
                ReportDelivery::failed(ApiError::dependency(format!(
                    "Till {} is closed but its report was not delivered: {}",
                    till.id, err
                )))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::services::notify::LogNotifier;
    use crate::services::report::{ReportError, TextReportRenderer};
    use crate::services::ServiceError;
    use async_trait::async_trait;
    use motel_core::{NewEmployee, Position};
    use motel_db::DbConfig;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingNotifier {
        delivered: Mutex<Vec<(i64, String)>>,
    }

    #[async_trait]
    impl ReportNotifier for RecordingNotifier {
        async fn deliver(
            &self,
            report: &TurnReport,
            document: &ReportDocument,
        ) -> Result<(), ReportError> {
            let text = String::from_utf8_lossy(&document.bytes).to_string();
            self.delivered.lock().unwrap().push((report.till.id, text));
            Ok(())
        }
    }

    struct FailingNotifier;

    #[async_trait]
    impl ReportNotifier for FailingNotifier {
        async fn deliver(&self, _: &TurnReport, _: &ReportDocument) -> Result<(), ReportError> {
            Err(ReportError::Delivery("relay unreachable".to_string()))
        }
    }

    struct FailingRenderer;

    impl ReportRenderer for FailingRenderer {
        fn render(&self, _: &TurnReport) -> Result<ReportDocument, ReportError> {
            Err(ReportError::Render("template missing".to_string()))
        }
    }

    async fn setup(notifier: Arc<dyn ReportNotifier>) -> (TillManager, Database, i64) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let employee = db
            .employees()
            .create(&NewEmployee {
                name: "Ana".to_string(),
                position: Position::Administration,
                date_hired: None,
            })
            .await
            .unwrap();
        let manager = TillManager::new(
            db.clone(),
            Arc::new(TextReportRenderer::default()),
            notifier,
        );
        (manager, db, employee.id)
    }

    #[tokio::test]
    async fn test_first_open_has_no_report() {
        let (manager, _db, employee_id) = setup(Arc::new(LogNotifier::default())).await;
        let handover = manager.open_till(employee_id, 50_000, None).await.unwrap();
        assert!(handover.closed_till.is_none());
        assert_eq!(handover.delivery.report_status, ReportStatus::None);
        assert_eq!(manager.current_till().await.unwrap().id, handover.till.id);
    }

    #[tokio::test]
    async fn test_handover_delivers_closed_till_report() {
        let notifier = Arc::new(RecordingNotifier::default());
        let (manager, _db, employee_id) = setup(notifier.clone()).await;

        let first = manager.open_till(employee_id, 50_000, None).await.unwrap();
        manager
            .record_movement(MovementType::In, "Room-1 ABC 4h", 12_345)
            .await
            .unwrap();
        manager
            .record_movement(MovementType::Out, "Towels", 2_345)
            .await
            .unwrap();

        let second = manager.open_till(employee_id, 0, None).await.unwrap();
        assert_eq!(second.closed_till.as_ref().unwrap().id, first.till.id);
        assert_eq!(second.delivery.report_status, ReportStatus::Delivered);
        assert!(second.delivery.warning.is_none());

        let delivered = notifier.delivered.lock().unwrap().clone();
        assert_eq!(delivered.len(), 1);
        assert_eq!(delivered[0].0, first.till.id);
        assert!(delivered[0].1.contains("Closing balance:  $600.00"));
    }

    #[tokio::test]
    async fn test_failed_delivery_keeps_till_closed() {
        let (manager, db, employee_id) = setup(Arc::new(FailingNotifier)).await;

        let first = manager.open_till(employee_id, 0, None).await.unwrap();
        let second = manager.open_till(employee_id, 0, None).await.unwrap();

        assert_eq!(second.delivery.report_status, ReportStatus::Failed);
        let warning = second.delivery.warning.unwrap();
        assert_eq!(warning.code, ErrorCode::DependencyError);
        assert!(warning.message.contains("relay unreachable"));

        let closed = db.tills().get_existing(first.till.id).await.unwrap();
        assert!(closed.is_closed);
        assert!(second.till.is_open());
    }

    #[tokio::test]
    async fn test_failed_render_keeps_till_closed() {
        let notifier = Arc::new(RecordingNotifier::default());
        let (_, db, employee_id) = setup(notifier.clone()).await;
        let manager = TillManager::new(db.clone(), Arc::new(FailingRenderer), notifier.clone());

        let opened = manager.open_till(employee_id, 2_000, None).await.unwrap();
        let closure = manager.close_till(opened.till.id).await.unwrap();

        assert!(closure.till.is_closed);
        assert_eq!(closure.summary.balance.cents(), 2_000);
        assert_eq!(closure.delivery.report_status, ReportStatus::Failed);
        let warning = closure.delivery.warning.unwrap();
        assert_eq!(warning.code, ErrorCode::DependencyError);
        assert!(warning.message.contains("template missing"));
        assert!(notifier.delivered.lock().unwrap().is_empty());

        manager.open_till(employee_id, 0, None).await.unwrap();
        let export = manager.export_current_report().await.unwrap_err();
        assert!(matches!(export, ServiceError::Report(ReportError::Render(_))));
    }

    #[tokio::test]
    async fn test_close_till_twice_conflicts() {
        let (manager, _db, employee_id) = setup(Arc::new(LogNotifier::default())).await;
        let opened = manager.open_till(employee_id, 1_000, None).await.unwrap();
        manager.record_movement(MovementType::In, "Deposit", 500).await.unwrap();

        let closure = manager.close_till(opened.till.id).await.unwrap();
        assert!(closure.till.is_closed);
        assert_eq!(closure.summary.balance.cents(), 1_500);
        assert_eq!(closure.delivery.report_status, ReportStatus::Delivered);

        let again = manager.close_till(opened.till.id).await.unwrap_err();
        assert!(matches!(
            again,
            ServiceError::Db(DbError::Domain(CoreError::TillAlreadyClosed(_)))
        ));

        let no_till = manager.current_till().await.unwrap_err();
        assert!(matches!(
            no_till,
            ServiceError::Db(DbError::Domain(CoreError::NoOpenTill))
        ));
    }

    #[tokio::test]
    async fn test_balance_and_movements() {
        let (manager, _db, employee_id) = setup(Arc::new(LogNotifier::default())).await;
        let opened = manager.open_till(employee_id, 50_000, None).await.unwrap();
        manager.record_movement(MovementType::In, "Deposit", 12_345).await.unwrap();
        manager.record_movement(MovementType::Out, "Supplies", 2_345).await.unwrap();

        assert_eq!(manager.balance(opened.till.id).await.unwrap(), Money::from_cents(60_000));

        let concepts: Vec<String> = manager
            .current_movements()
            .await
            .unwrap()
            .into_iter()
            .map(|m| m.concept)
            .collect();
        assert_eq!(concepts, vec!["Deposit", "Supplies"]);
        assert_eq!(manager.movements(opened.till.id).await.unwrap().len(), 2);

        let missing = manager.balance(999).await.unwrap_err();
        assert!(matches!(
            missing,
            ServiceError::Db(DbError::Domain(CoreError::TillNotFound(999)))
        ));
    }

    #[tokio::test]
    async fn test_last_report_and_export() {
        let (manager, _db, employee_id) = setup(Arc::new(LogNotifier::default())).await;
        assert!(manager.last_report().await.is_err());

        let first = manager.open_till(employee_id, 10_000, Some("morning")).await.unwrap();
        manager.record_movement(MovementType::In, "Room-2 XYZ 4h", 25_000).await.unwrap();
        manager.open_till(employee_id, 0, None).await.unwrap();

        let report = manager.last_report().await.unwrap();
        assert_eq!(report.till.id, first.till.id);
        assert_eq!(report.responsible, "Ana");
        assert_eq!(report.summary.balance.cents(), 35_000);
        assert_eq!(report.movements.len(), 1);
        assert!(report.is_final());

        let document = manager.export_current_report().await.unwrap();
        let text = String::from_utf8(document.bytes).unwrap();
        assert!(text.contains("Generated:"));
        assert!(manager.current_till().await.unwrap().is_open());
    }
}
