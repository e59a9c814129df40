//! Application state shared by all request handlers.

use std::sync::Arc;

use motel_db::Database;

use crate::config::{NotifierKind, ServerConfig};
use crate::services::{
    Envelope, LogNotifier, LogStatusNotifier, OccupancyEngine, ReportNotifier, ReportRenderer,
    SpoolNotifier, StatusNotifier, TextReportRenderer, TillManager,
};

/// Shared application state. Cheap to clone.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<Inner>,
}

struct Inner {
    db: Database,
    config: ServerConfig,
    tills: TillManager,
    occupancy: OccupancyEngine,
}

impl AppState {
    /// Builds the state with the renderer and notifiers named in `config`.
    pub fn new(db: Database, config: ServerConfig) -> Self {
        let renderer: Arc<dyn ReportRenderer> =
            Arc::new(TextReportRenderer::new(config.report.utc_offset()));

        let envelope = Envelope {
            from: config.report.sender.clone(),
            to: config.report.recipients.clone(),
            bcc: config.report.bcc.clone(),
        };
        let notifier: Arc<dyn ReportNotifier> = match config.report.notifier {
            NotifierKind::Log => Arc::new(LogNotifier::new(envelope)),
            NotifierKind::Spool => {
                Arc::new(SpoolNotifier::new(config.report.spool_dir.clone(), envelope))
            }
        };

        let status_notifier: Arc<dyn StatusNotifier> = Arc::new(LogStatusNotifier::new(
            config.notifications.cleaning.clone(),
            config.notifications.maintenance.clone(),
        ));

        Self::with_services(db, config, renderer, notifier, status_notifier)
    }

    /// Builds the state with explicit collaborators.
    pub fn with_services(
        db: Database,
        config: ServerConfig,
        renderer: Arc<dyn ReportRenderer>,
        notifier: Arc<dyn ReportNotifier>,
        status_notifier: Arc<dyn StatusNotifier>,
    ) -> Self {
        let tills = TillManager::new(db.clone(), renderer, notifier);
        let occupancy = OccupancyEngine::new(db.clone(), status_notifier, config.rental.clone());
        AppState {
            inner: Arc::new(Inner {
                db,
                config,
                tills,
                occupancy,
            }),
        }
    }

    pub fn db(&self) -> &Database {
        &self.inner.db
    }

    pub fn config(&self) -> &ServerConfig {
        &self.inner.config
    }

    pub fn tills(&self) -> &TillManager {
        &self.inner.tills
    }

    pub fn occupancy(&self) -> &OccupancyEngine {
        &self.inner.occupancy
    }
}
