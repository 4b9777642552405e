use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::broadcast::{self, error::TryRecvError};
use tracing::{debug, warn};

use progress_core::model::{PageId, ProgressRecord};
use services::snapshot::ensure_json_file_name;
use services::{
    Clock, ExportFile, ProgressError, ProgressEvent, ProgressStore, RepairReport, VisitOutcome,
};

use crate::host::HostPage;
use crate::renderer::DisplayRenderer;
use crate::shortcuts::Shortcut;
use crate::vm::NotificationKind;

/// Longest stretch credited to a single page, in seconds.
pub const MAX_READING_SECONDS: u64 = 30 * 60;

const IMPORT_CONFIRMATION: &str = "Importing will overwrite your current reading progress. Continue?";
const RESET_CONFIRMATION: &str = "Reset all reading progress? This cannot be undone.";

/// What the host should do after a shortcut.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControllerAction {
    Download(ExportFile),
    OpenImportPicker,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ImportOutcome {
    Imported(ProgressRecord),
    Cancelled,
}

/// Wires the store to the renderer for one browsing session.
pub struct ProgressController {
    store: Arc<ProgressStore>,
    renderer: DisplayRenderer,
    events: broadcast::Receiver<ProgressEvent>,
    clock: Clock,
    reading: Option<(PageId, DateTime<Utc>)>,
}

impl ProgressController {
    #[must_use]
    pub fn new(store: Arc<ProgressStore>, renderer: DisplayRenderer) -> Self {
        let events = store.subscribe();
        let clock = store.clock();
        Self {
            store,
            renderer,
            events,
            clock,
            reading: None,
        }
    }

    #[must_use]
    pub fn store(&self) -> &Arc<ProgressStore> {
        &self.store
    }

    #[must_use]
    pub fn renderer(&self) -> &DisplayRenderer {
        &self.renderer
    }

    /// Clock used to measure reading time.
    pub fn clock_mut(&mut self) -> &mut Clock {
        &mut self.clock
    }

    /// Drop pages that no longer belong to the curriculum. Run once per session.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::StorageUnavailable` if the cleaned record cannot be written.
    pub async fn repair_on_start(&mut self) -> Result<RepairReport, ProgressError> {
        let report = self.store.repair().await?;
        if !report.removed.is_empty() {
            debug!(removed = report.removed.len(), "removed stale pages on start");
        }
        self.discard_events();
        Ok(report)
    }

    /// Handle arrival on the host's current location.
    ///
    /// Returns `None` when the location does not map to a page.
    pub async fn on_navigation(&mut self, host: &mut dyn HostPage) -> Option<VisitOutcome> {
        let page = match self.renderer.current_page(host) {
            Ok(page) => page,
            Err(err) => {
                warn!(location = %host.location_path(), error = %err, "unrecognized location");
                self.refresh(host).await;
                return None;
            }
        };

        self.credit_reading_time(&page).await;
        let outcome = self.store.record_visit(&page).await;
        self.drain_events(host);
        self.renderer.render_all(host, &outcome.record);
        Some(outcome)
    }

    /// Redraw every view from the stored record.
    pub async fn refresh(&mut self, host: &mut dyn HostPage) {
        self.drain_events(host);
        let record = self.store.load().await;
        self.renderer.render_all(host, &record);
    }

    /// Apply store events published since the last render.
    ///
    /// Imports, resets and repairs invalidate every view, so any of them
    /// triggers a full redraw. Returns whether the views were redrawn.
    pub async fn sync(&mut self, host: &mut dyn HostPage) -> bool {
        if !self.drain_events(host) {
            return false;
        }
        let record = self.store.load().await;
        self.renderer.render_all(host, &record);
        true
    }

    /// # Errors
    ///
    /// Returns `ProgressError::MalformedPersistedData` if the record cannot be serialized.
    pub async fn handle_export(&mut self, host: &mut dyn HostPage) -> Result<ExportFile, ProgressError> {
        match self.store.export_snapshot().await {
            Ok(file) => {
                self.renderer.show_notification(
                    host,
                    NotificationKind::Success,
                    "Progress exported successfully.",
                );
                Ok(file)
            }
            Err(err) => {
                warn!(error = %err, "export failed");
                self.renderer.show_notification(
                    host,
                    NotificationKind::Error,
                    "Export failed. Please try again later.",
                );
                Err(err)
            }
        }
    }

    /// Import a user-selected file after asking for confirmation.
    ///
    /// A declined confirmation leaves stored progress untouched.
    ///
    /// # Errors
    ///
    /// Returns `UnsupportedFileType` for non-`.json` names and the store's
    /// import errors otherwise.
    pub async fn handle_import_file(
        &mut self,
        host: &mut dyn HostPage,
        name: &str,
        bytes: &[u8],
    ) -> Result<ImportOutcome, ProgressError> {
        if let Err(err) = ensure_json_file_name(name) {
            self.renderer.show_notification(
                host,
                NotificationKind::Error,
                "Please choose a valid JSON file.",
            );
            return Err(err);
        }
        if !host.confirm(IMPORT_CONFIRMATION) {
            debug!(file = name, "import cancelled");
            return Ok(ImportOutcome::Cancelled);
        }

        match self.store.import_file(name, bytes).await {
            Ok(record) => {
                self.sync(host).await;
                self.renderer.show_notification(
                    host,
                    NotificationKind::Success,
                    "Progress imported successfully.",
                );
                Ok(ImportOutcome::Imported(record))
            }
            Err(err) => {
                warn!(file = name, error = %err, "import rejected");
                let message = if err.is_import_rejection() {
                    "Import failed: the file is not a valid progress backup."
                } else {
                    "Import failed: progress could not be saved."
                };
                self.renderer.show_notification(host, NotificationKind::Error, message);
                Err(err)
            }
        }
    }

    /// Clear all progress after asking for confirmation.
    ///
    /// Returns whether a reset happened.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::StorageUnavailable` if the keys cannot be removed.
    pub async fn handle_reset(&mut self, host: &mut dyn HostPage) -> Result<bool, ProgressError> {
        if !host.confirm(RESET_CONFIRMATION) {
            return Ok(false);
        }
        match self.store.reset().await {
            Ok(()) => {
                self.reading = None;
                self.sync(host).await;
                self.renderer.show_notification(
                    host,
                    NotificationKind::Success,
                    "Reading progress has been reset.",
                );
                Ok(true)
            }
            Err(err) => {
                warn!(error = %err, "reset failed");
                self.renderer.show_notification(
                    host,
                    NotificationKind::Error,
                    "Reset failed. Please try again later.",
                );
                Err(err)
            }
        }
    }

    /// # Errors
    ///
    /// Returns the export error for [`Shortcut::Export`].
    pub async fn handle_shortcut(
        &mut self,
        host: &mut dyn HostPage,
        shortcut: Shortcut,
    ) -> Result<ControllerAction, ProgressError> {
        match shortcut {
            Shortcut::Export => self.handle_export(host).await.map(ControllerAction::Download),
            Shortcut::Import => Ok(ControllerAction::OpenImportPicker),
        }
    }

    async fn credit_reading_time(&mut self, next: &PageId) {
        let now = self.clock.now();
        let Some((previous, started)) = self.reading.replace((next.clone(), now)) else {
            return;
        };
        if !self.store.curriculum().is_tracked(&previous) {
            return;
        }
        let elapsed = u64::try_from((now - started).num_seconds()).unwrap_or(0);
        let seconds = elapsed.min(MAX_READING_SECONDS);
        if seconds == 0 {
            return;
        }
        if let Err(err) = self.store.add_reading_time(seconds).await {
            warn!(page = %previous, error = %err, "reading time not persisted");
        }
    }

    /// Shows pending completion notices. Returns whether a full redraw is due.
    fn drain_events(&mut self, host: &mut dyn HostPage) -> bool {
        let mut stale = false;
        loop {
            match self.events.try_recv() {
                Ok(ProgressEvent::StageCompleted(notice)) => {
                    self.renderer.show_completion(host, &notice);
                }
                Ok(event) => stale |= event.requires_full_refresh(),
                Err(TryRecvError::Lagged(skipped)) => {
                    warn!(skipped, "progress events dropped");
                    stale = true;
                }
                Err(TryRecvError::Empty | TryRecvError::Closed) => break,
            }
        }
        stale
    }

    fn discard_events(&mut self) {
        while !matches!(
            self.events.try_recv(),
            Err(TryRecvError::Empty | TryRecvError::Closed)
        ) {}
    }
}
