//! # Notifiers
//!
//! Outbound notifications. Two kinds:
//!
//! - [`ReportNotifier`]: delivers a rendered turn report to the report
//!   distribution list. A failure comes back as a [`ReportError`] and the
//!   caller reports it as a warning.
//! - [`StatusNotifier`]: told about every committed room status change.
//!   Fire and forget; implementations log their own failures.
//!
//! Actual mail transport lives outside this process. [`SpoolNotifier`]
//! drops the document and an envelope into a directory a relay watches.

use std::path::PathBuf;

use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, info, warn};

use motel_core::report::TurnReport;
use motel_core::{Room, RoomHistory, RoomStatus};

use super::report::{ReportDocument, ReportError};

// =============================================================================
// Report Notifier
// =============================================================================

/// Delivers turn report documents.
#[async_trait]
pub trait ReportNotifier: Send + Sync {
    async fn deliver(&self, report: &TurnReport, document: &ReportDocument)
        -> Result<(), ReportError>;
}

/// Addressing shared by the report notifiers.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Envelope {
    pub from: String,
    pub to: Vec<String>,
    pub bcc: Vec<String>,
}

fn subject(report: &TurnReport) -> String {
    format!(
        "Turn report - till #{} - {}",
        report.till.id, report.responsible
    )
}

/// Writes a structured log line per report.
#[derive(Debug, Clone, Default)]
pub struct LogNotifier {
    envelope: Envelope,
}

impl LogNotifier {
    pub fn new(envelope: Envelope) -> Self {
        LogNotifier { envelope }
    }
}

#[async_trait]
impl ReportNotifier for LogNotifier {
    async fn deliver(
        &self,
        report: &TurnReport,
        document: &ReportDocument,
    ) -> Result<(), ReportError> {
        info!(
            till_id = report.till.id,
            subject = %subject(report),
            to = ?self.envelope.to,
            filename = %document.filename,
            balance = %report.summary.balance,
            "Turn report ready"
        );
        Ok(())
    }
}

/// Spool entry written next to the document.
#[derive(Debug, Serialize)]
struct SpoolEnvelope<'a> {
    #[serde(flatten)]
    envelope: &'a Envelope,
    subject: String,
    attachment: &'a str,
    content_type: &'a str,
}

/// Writes the document and a JSON envelope into a spool directory.
#[derive(Debug, Clone)]
pub struct SpoolNotifier {
    dir: PathBuf,
    envelope: Envelope,
}

impl SpoolNotifier {
    pub fn new(dir: impl Into<PathBuf>, envelope: Envelope) -> Self {
        SpoolNotifier {
            dir: dir.into(),
            envelope,
        }
    }

    pub fn dir(&self) -> &PathBuf {
        &self.dir
    }
}

#[async_trait]
impl ReportNotifier for SpoolNotifier {
    async fn deliver(
        &self,
        report: &TurnReport,
        document: &ReportDocument,
    ) -> Result<(), ReportError> {
        let delivery = |e: std::io::Error| ReportError::Delivery(e.to_string());

        tokio::fs::create_dir_all(&self.dir).await.map_err(delivery)?;

        let document_path = self.dir.join(&document.filename);
        tokio::fs::write(&document_path, &document.bytes)
            .await
            .map_err(delivery)?;

        let entry = SpoolEnvelope {
            envelope: &self.envelope,
            subject: subject(report),
            attachment: &document.filename,
            content_type: &document.content_type,
        };
        let json = serde_json::to_vec_pretty(&entry)
            .map_err(|e| ReportError::Delivery(e.to_string()))?;
        let envelope_path = self.dir.join(format!("{}.json", document.filename));
        tokio::fs::write(&envelope_path, json).await.map_err(delivery)?;

        debug!(path = ?document_path, "Turn report spooled");
        Ok(())
    }
}

// =============================================================================
// Status Notifier
// =============================================================================

/// Told about each committed room status change.
#[async_trait]
pub trait StatusNotifier: Send + Sync {
    async fn status_changed(&self, room: &Room, change: &RoomHistory);
}

/// Logs cleaning and maintenance requests for the configured lists.
#[derive(Debug, Clone, Default)]
pub struct LogStatusNotifier {
    cleaning: Vec<String>,
    maintenance: Vec<String>,
}

impl LogStatusNotifier {
    pub fn new(cleaning: Vec<String>, maintenance: Vec<String>) -> Self {
        LogStatusNotifier {
            cleaning,
            maintenance,
        }
    }
}

#[async_trait]
impl StatusNotifier for LogStatusNotifier {
    async fn status_changed(&self, room: &Room, change: &RoomHistory) {
        let (request, recipients) = match change.new_status {
            RoomStatus::Dirty => ("cleaning", &self.cleaning),
            RoomStatus::Maintenance => ("maintenance", &self.maintenance),
            _ => {
                debug!(
                    room = room.number,
                    from = %change.previous_status,
                    to = %change.new_status,
                    "Status change needs no request"
                );
                return;
            }
        };

        if recipients.is_empty() {
            warn!(room = room.number, request, "No recipients configured for request");
            return;
        }

        info!(
            room = room.number,
            request,
            to = ?recipients,
            changed_at = %change.changed_at,
            "Room request sent"
        );
    }
}
