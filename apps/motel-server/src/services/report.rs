//! # Report Rendering
//!
//! Turns a [`TurnReport`] into a downloadable document.
//!
//! The default renderer produces a fixed-layout text file:
//!
//! ```text
//! TURN REPORT - TILL #12
//! =========================================
//! Responsible:      Ana
//! Started:          2024-08-01 08:00
//! Opening amount:   $500.00
//! Total in:         $123.45
//! Total out:        $23.45
//! Closing balance:  $600.00
//! Closed:           2024-08-01 16:00
//! Comments:         night shift
//!
//! TIME              TYPE  AMOUNT        CONCEPT
//! 2024-08-01 09:15  in    $123.45       Room-3 ABC-123 4h
//! ```

use chrono::{DateTime, FixedOffset, Offset, Utc};
use serde::Serialize;
use thiserror::Error;

use motel_core::report::TurnReport;

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Rendering or delivery failed.
///
/// Always a dependency failure: the till state is already committed.
#[derive(Debug, Error)]
pub enum ReportError {
    /// Raised by renderers that can fail (templating, PDF backends).
    /// [`TextReportRenderer`] never does.
    #[error("Report rendering failed: {0}")]
    Render(String),

    #[error("Report delivery failed: {0}")]
    Delivery(String),
}

/// A rendered report, ready to download or send.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportDocument {
    pub filename: String,
    pub content_type: String,
    #[serde(skip)]
    pub bytes: Vec<u8>,
}

/// Renders turn reports into documents.
pub trait ReportRenderer: Send + Sync {
    fn render(&self, report: &TurnReport) -> Result<ReportDocument, ReportError>;
}

/// Plain text renderer with timestamps shown at a fixed offset.
#[derive(Debug, Clone)]
pub struct TextReportRenderer {
    offset: FixedOffset,
}

impl TextReportRenderer {
    pub fn new(offset: FixedOffset) -> Self {
        TextReportRenderer { offset }
    }

    fn local(&self, at: DateTime<Utc>) -> String {
        at.with_timezone(&self.offset).format(TIME_FORMAT).to_string()
    }

    fn render_text(&self, report: &TurnReport) -> String {
        let till = &report.till;
        let summary = &report.summary;
        let mut out = String::new();

        out.push_str(&format!("TURN REPORT - TILL #{}\n", till.id));
        out.push_str(&"=".repeat(41));
        out.push('\n');
        out.push_str(&format!("{:<18}{}\n", "Responsible:", report.responsible));
        out.push_str(&format!("{:<18}{}\n", "Started:", self.local(till.opened_at)));
        out.push_str(&format!("{:<18}{}\n", "Opening amount:", summary.opening));
        out.push_str(&format!("{:<18}{}\n", "Total in:", summary.total_in));
        out.push_str(&format!("{:<18}{}\n", "Total out:", summary.total_out));
        out.push_str(&format!("{:<18}{}\n", "Closing balance:", summary.balance));

        let as_of_label = if report.is_final() { "Closed:" } else { "Generated:" };
        out.push_str(&format!("{:<18}{}\n", as_of_label, self.local(report.as_of)));

        if let Some(description) = till.description.as_deref() {
            out.push_str(&format!("{:<18}{}\n", "Comments:", description));
        }

        out.push('\n');
        out.push_str(&format!("{:<18}{:<6}{:<14}{}\n", "TIME", "TYPE", "AMOUNT", "CONCEPT"));
        for movement in &report.movements {
            out.push_str(&format!(
                "{:<18}{:<6}{:<14}{}\n",
                self.local(movement.created_at),
                movement.movement_type.as_str(),
                movement.amount().to_string(),
                movement.concept
            ));
        }
        if report.movements.is_empty() {
            out.push_str("(no movements)\n");
        }

        out
    }
}

impl Default for TextReportRenderer {
    fn default() -> Self {
        TextReportRenderer::new(Utc.fix())
    }
}

impl ReportRenderer for TextReportRenderer {
    fn render(&self, report: &TurnReport) -> Result<ReportDocument, ReportError> {
        let stamp = report
            .as_of
            .with_timezone(&self.offset)
            .format("%Y%m%d-%H%M");
        Ok(ReportDocument {
            filename: format!("turn-report-{}-{}.txt", report.till.id, stamp),
            content_type: "text/plain; charset=utf-8".to_string(),
            bytes: self.render_text(report).into_bytes(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use motel_core::{CashMovement, MovementType, Till};

    fn report(closed: bool) -> TurnReport {
        let opened_at = Utc.with_ymd_and_hms(2024, 8, 1, 14, 0, 0).unwrap();
        let till = Till {
            id: 12,
            employee_id: 1,
            opened_at,
            opening_amount_cents: 50_000,
            description: Some("night shift".to_string()),
            is_closed: closed,
            closed_at: closed.then(|| opened_at + Duration::hours(8)),
        };
        let movements = vec![
            CashMovement {
                id: 2,
                till_id: 12,
                movement_type: MovementType::Out,
                concept: "Detergent".to_string(),
                amount_cents: 2_345,
                created_at: opened_at + Duration::hours(2),
            },
            CashMovement {
                id: 1,
                till_id: 12,
                movement_type: MovementType::In,
                concept: "Room-3 ABC-123 4h".to_string(),
                amount_cents: 12_345,
                created_at: opened_at + Duration::minutes(15),
            },
        ];
        TurnReport::build(till, "Ana", movements, opened_at + Duration::hours(3))
    }

    #[test]
    fn test_text_layout() {
        let renderer = TextReportRenderer::new(FixedOffset::west_opt(6 * 3600).unwrap());
        let document = renderer.render(&report(true)).unwrap();
        let text = String::from_utf8(document.bytes).unwrap();

        assert!(text.starts_with("TURN REPORT - TILL #12\n"));
        assert!(text.contains("Responsible:      Ana\n"));
        // 14:00 UTC shown at UTC-6
        assert!(text.contains("Started:          2024-08-01 08:00\n"));
        assert!(text.contains("Opening amount:   $500.00\n"));
        assert!(text.contains("Total in:         $123.45\n"));
        assert!(text.contains("Total out:        $23.45\n"));
        assert!(text.contains("Closing balance:  $600.00\n"));
        assert!(text.contains("Closed:           2024-08-01 16:00\n"));
        assert!(text.contains("Comments:         night shift\n"));

        let room_line = text.find("Room-3 ABC-123 4h").unwrap();
        let detergent_line = text.find("Detergent").unwrap();
        assert!(room_line < detergent_line);
        assert!(text.contains("2024-08-01 08:15  in    $123.45       Room-3 ABC-123 4h\n"));
    }

    #[test]
    fn test_document_metadata() {
        let document = TextReportRenderer::default().render(&report(true)).unwrap();
        assert_eq!(document.filename, "turn-report-12-20240801-2200.txt");
        assert_eq!(document.content_type, "text/plain; charset=utf-8");
    }

    #[test]
    fn test_open_till_is_marked_generated() {
        let document = TextReportRenderer::default().render(&report(false)).unwrap();
        let text = String::from_utf8(document.bytes).unwrap();
        assert!(text.contains("Generated:        2024-08-01 17:00\n"));
        assert!(!text.contains("Closed:"));
    }
}
