use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use progress_core::calculator;
use progress_core::model::{Curriculum, PageId, ProgressOverview, ProgressRecord};
use storage::repository::KeyValueStore;

use crate::Clock;
use crate::error::ProgressError;
use crate::events::ProgressEvent;
use crate::keys::StorageKeys;
use crate::notifier::{CompletionNotice, CompletionNotifier};
use crate::snapshot::{ExportFile, ensure_json_file_name, parse_snapshot};

const EVENT_CAPACITY: usize = 32;

/// What `record_visit` did with a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisitStatus {
    /// Home or an untracked page; nothing recorded.
    Ignored,
    /// Already in the record; nothing written.
    AlreadyVisited,
    /// Newly added to the record.
    Recorded,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VisitOutcome {
    pub status: VisitStatus,
    pub record: ProgressRecord,
    /// False when the write failed; the caller's view may then be ahead of storage.
    pub persisted: bool,
    pub notice: Option<CompletionNotice>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepairReport {
    pub removed: Vec<PageId>,
    pub kept: usize,
}

/// Sole owner of the persisted progress record and completion marker.
///
/// Built once per session and shared by reference; every other component
/// works on copies returned from here.
pub struct ProgressStore {
    clock: Clock,
    curriculum: Arc<Curriculum>,
    kv: Arc<dyn KeyValueStore>,
    keys: StorageKeys,
    notifier: CompletionNotifier,
    events: broadcast::Sender<ProgressEvent>,
}

impl ProgressStore {
    #[must_use]
    pub fn new(
        clock: Clock,
        curriculum: Arc<Curriculum>,
        kv: Arc<dyn KeyValueStore>,
        keys: StorageKeys,
    ) -> Self {
        let notifier = CompletionNotifier::new(
            Arc::clone(&curriculum),
            Arc::clone(&kv),
            keys.completion_shown.clone(),
        );
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            clock,
            curriculum,
            kv,
            keys,
            notifier,
            events,
        }
    }

    /// Store over a fresh in-memory backend with the reference curriculum.
    #[must_use]
    pub fn in_memory(clock: Clock) -> Self {
        Self::new(
            clock,
            Arc::new(Curriculum::reference()),
            Arc::new(storage::repository::InMemoryStore::new()),
            StorageKeys::default(),
        )
    }

    #[must_use]
    pub fn curriculum(&self) -> &Arc<Curriculum> {
        &self.curriculum
    }

    #[must_use]
    pub fn keys(&self) -> &StorageKeys {
        &self.keys
    }

    #[must_use]
    pub fn clock(&self) -> Clock {
        self.clock
    }

    #[must_use]
    pub fn notifier(&self) -> &CompletionNotifier {
        &self.notifier
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ProgressEvent> {
        self.events.subscribe()
    }

    fn publish(&self, event: ProgressEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }

    fn empty_record(&self) -> ProgressRecord {
        ProgressRecord::new(&self.curriculum, self.clock.now())
    }

    /// Current record, merged with defaults. Never fails: storage and parse
    /// errors yield an empty record and a warning.
    pub async fn load(&self) -> ProgressRecord {
        match self.try_load().await {
            Ok(record) => record,
            Err(err) => {
                warn!(error = %err, "failed to load progress; using an empty record");
                self.empty_record()
            }
        }
    }

    async fn try_load(&self) -> Result<ProgressRecord, ProgressError> {
        let Some(raw) = self.kv.get(&self.keys.progress).await? else {
            return Ok(self.empty_record());
        };
        let value: serde_json::Value = serde_json::from_str(&raw)
            .map_err(|err| ProgressError::MalformedPersistedData(err.to_string()))?;
        ProgressRecord::from_persisted(value, &self.curriculum, self.clock.now())
            .map_err(|err| ProgressError::MalformedPersistedData(err.to_string()))
    }

    /// Stamp `lastVisit` and persist. The in-memory record keeps its changes
    /// even if the write fails.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::StorageUnavailable` if the write fails.
    pub async fn save(&self, record: &mut ProgressRecord) -> Result<(), ProgressError> {
        record.touch(self.clock.now());
        self.write(record).await
    }

    async fn write(&self, record: &ProgressRecord) -> Result<(), ProgressError> {
        let raw = record
            .to_json()
            .map_err(|err| ProgressError::MalformedPersistedData(err.to_string()))?;
        self.kv.set(&self.keys.progress, &raw).await?;
        Ok(())
    }

    /// Record that `page` was read.
    ///
    /// Idempotent; home and untracked pages are ignored. When the visit
    /// finishes a stage for the first time, the outcome carries the
    /// completion notice. Completion is evaluated even if the write fails.
    pub async fn record_visit(&self, page: &PageId) -> VisitOutcome {
        let mut record = self.load().await;

        if !self.curriculum.is_tracked(page) {
            return VisitOutcome {
                status: VisitStatus::Ignored,
                record,
                persisted: false,
                notice: None,
            };
        }
        if !record.insert_visit(page.clone()) {
            return VisitOutcome {
                status: VisitStatus::AlreadyVisited,
                record,
                persisted: false,
                notice: None,
            };
        }

        let mut persisted = match self.save(&mut record).await {
            Ok(()) => true,
            Err(err) => {
                warn!(page = %page, error = %err, "visit not persisted");
                false
            }
        };
        debug!(page = %page, persisted, "visit recorded");

        let notice = self.notifier.pending_for(&record, page).await;
        if let Some(notice) = &notice {
            record.set_stage_completed(&notice.stage_id, true);
            if let Err(err) = self.save(&mut record).await {
                warn!(stage = %notice.stage_id, error = %err, "stage completion not persisted");
                persisted = false;
            }
            if let Err(err) = self.notifier.acknowledge(&notice.stage_id).await {
                warn!(stage = %notice.stage_id, error = %err, "completion marker not persisted");
            }
            info!(stage = %notice.stage_id, "stage completed");
        }

        self.publish(ProgressEvent::Visited {
            page: page.clone(),
            record: record.clone(),
        });
        if let Some(notice) = &notice {
            self.publish(ProgressEvent::StageCompleted(notice.clone()));
        }

        VisitOutcome {
            status: VisitStatus::Recorded,
            record,
            persisted,
            notice,
        }
    }

    pub async fn is_page_visited(&self, page: &PageId) -> bool {
        self.load().await.has_visited(page)
    }

    pub async fn overview(&self) -> ProgressOverview {
        calculator::overview(&self.load().await, &self.curriculum)
    }

    /// Clear the record and the completion marker.
    ///
    /// Callers must obtain the user's confirmation first.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::StorageUnavailable` if either key cannot be removed.
    pub async fn reset(&self) -> Result<(), ProgressError> {
        self.kv.remove(&self.keys.progress).await?;
        self.kv.remove(&self.keys.completion_shown).await?;
        info!("progress reset");
        self.publish(ProgressEvent::Reset);
        Ok(())
    }

    /// Pretty-printed copy of the current record, ready for download.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::MalformedPersistedData` if the record cannot be serialized.
    pub async fn export_snapshot(&self) -> Result<ExportFile, ProgressError> {
        let record = self.load().await;
        let contents = record
            .to_pretty_json()
            .map_err(|err| ProgressError::MalformedPersistedData(err.to_string()))?;
        Ok(ExportFile::new(&self.clock, contents))
    }

    /// Replace the stored record with an imported snapshot.
    ///
    /// Full overwrite, not a merge. On any error nothing is written.
    ///
    /// # Errors
    ///
    /// Returns `ImportParseFailed` for non-JSON input, `ImportValidationFailed`
    /// for a wrong shape, and `StorageUnavailable` if the write fails.
    pub async fn import_snapshot(&self, bytes: &[u8]) -> Result<ProgressRecord, ProgressError> {
        let value = parse_snapshot(bytes)?;
        let record = ProgressRecord::from_snapshot(value, &self.curriculum, self.clock.now())?;
        self.write(&record).await?;
        info!(pages = record.visited_pages().len(), "progress imported");
        self.publish(ProgressEvent::Imported(record.clone()));
        Ok(record)
    }

    /// Import a user-selected file after checking its extension.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::UnsupportedFileType` for non-`.json` names and
    /// the errors of [`ProgressStore::import_snapshot`] otherwise.
    pub async fn import_file(&self, name: &str, bytes: &[u8]) -> Result<ProgressRecord, ProgressError> {
        ensure_json_file_name(name)?;
        self.import_snapshot(bytes).await
    }

    /// Drop visited pages that belong to no stage.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::StorageUnavailable` if the cleaned record cannot be written.
    pub async fn repair(&self) -> Result<RepairReport, ProgressError> {
        let mut record = self.load().await;
        let curriculum = Arc::clone(&self.curriculum);
        let removed = record.retain_visits(|page| curriculum.contains_page(page));
        let kept = record.visited_pages().len();

        if !removed.is_empty() {
            self.save(&mut record).await?;
            info!(removed = removed.len(), kept, "progress cleaned");
            self.publish(ProgressEvent::Repaired {
                removed: removed.clone(),
            });
        }

        Ok(RepairReport { removed, kept })
    }

    /// Credit `seconds` of reading time.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::StorageUnavailable` if the record cannot be written.
    pub async fn add_reading_time(&self, seconds: u64) -> Result<ProgressRecord, ProgressError> {
        let mut record = self.load().await;
        if seconds == 0 {
            return Ok(record);
        }
        record.add_reading_time(seconds);
        self.save(&mut record).await?;
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use progress_core::model::StageId;
    use progress_core::time::{fixed_clock, fixed_now};
    use storage::repository::{InMemoryStore, StorageError};

    fn page(raw: &str) -> PageId {
        PageId::parse(raw).unwrap()
    }

    fn store_over(kv: &InMemoryStore) -> ProgressStore {
        ProgressStore::new(
            fixed_clock(),
            Arc::new(Curriculum::reference()),
            Arc::new(kv.clone()),
            StorageKeys::default(),
        )
    }

    #[tokio::test]
    async fn load_defaults_when_nothing_stored() {
        let store = ProgressStore::in_memory(fixed_clock());
        let record = store.load().await;
        assert!(record.visited_pages().is_empty());
        assert_eq!(record.completed_stages().len(), 5);
        assert_eq!(record.last_visit(), fixed_now());
    }

    #[tokio::test]
    async fn load_falls_back_on_corrupt_json() {
        let kv = InMemoryStore::new();
        kv.set(StorageKeys::DEFAULT_PROGRESS, "{not json").await.unwrap();
        let store = store_over(&kv);

        let record = store.load().await;
        assert!(record.visited_pages().is_empty());
        assert!(matches!(
            store.try_load().await,
            Err(ProgressError::MalformedPersistedData(_))
        ));
    }

    #[tokio::test]
    async fn load_falls_back_when_storage_is_disabled() {
        let kv = InMemoryStore::new();
        let store = store_over(&kv);
        store.record_visit(&page("prerequisites/tools")).await;

        kv.set_available(false);
        assert!(store.load().await.visited_pages().is_empty());
        assert!(matches!(
            store.try_load().await,
            Err(ProgressError::StorageUnavailable(StorageError::Unavailable))
        ));
    }

    #[tokio::test]
    async fn record_visit_is_idempotent() {
        let store = ProgressStore::in_memory(fixed_clock());
        let tools = page("prerequisites/tools");

        let first = store.record_visit(&tools).await;
        assert_eq!(first.status, VisitStatus::Recorded);
        assert!(first.persisted);

        let second = store.record_visit(&tools).await;
        assert_eq!(second.status, VisitStatus::AlreadyVisited);
        assert_eq!(second.record.visited_pages(), first.record.visited_pages());
        assert_eq!(store.load().await.visited_pages().len(), 1);
    }

    #[tokio::test]
    async fn home_and_untracked_pages_are_not_recorded() {
        let store = ProgressStore::in_memory(fixed_clock());
        assert_eq!(
            store.record_visit(&PageId::home()).await.status,
            VisitStatus::Ignored
        );
        assert_eq!(
            store.record_visit(&page("about")).await.status,
            VisitStatus::Ignored
        );
        let record = store.load().await;
        assert!(record.visited_pages().is_empty());
        assert!(calculator::overall_percentage(&record, store.curriculum()).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn save_stamps_last_visit() {
        let kv = InMemoryStore::new();
        let mut clock = fixed_clock();
        clock.advance(chrono::Duration::hours(3));
        let store = ProgressStore::new(
            clock,
            Arc::new(Curriculum::reference()),
            Arc::new(kv.clone()),
            StorageKeys::default(),
        );
        let mut record = ProgressRecord::new(store.curriculum(), fixed_now());
        store.save(&mut record).await.unwrap();
        assert_eq!(record.last_visit(), clock.now());
        assert_eq!(store.load().await.last_visit(), clock.now());
    }

    #[tokio::test]
    async fn completion_fires_once_in_any_order() {
        let store = ProgressStore::in_memory(fixed_clock());
        let stage = store
            .curriculum()
            .stage(&StageId::new("stage4-expert"))
            .unwrap()
            .clone();

        let mut notices = Vec::new();
        for page in stage.pages().iter().rev() {
            notices.extend(store.record_visit(page).await.notice);
        }
        for page in stage.pages() {
            notices.extend(store.record_visit(page).await.notice);
        }

        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].stage_name, "Stage 4: Expert Mastery");
        assert!(notices[0].next_stage.is_none());

        let record = store.load().await;
        assert!(record.is_stage_marked_completed(stage.id()));
    }

    #[tokio::test]
    async fn reset_clears_record_and_marker() {
        let kv = InMemoryStore::new();
        let store = store_over(&kv);
        let stage = store
            .curriculum()
            .stage(&StageId::new("stage3-advanced"))
            .unwrap()
            .clone();
        for page in stage.pages() {
            store.record_visit(page).await;
        }
        assert!(kv.get(StorageKeys::DEFAULT_COMPLETION_SHOWN).await.unwrap().is_some());

        store.reset().await.unwrap();
        assert!(kv.get(StorageKeys::DEFAULT_PROGRESS).await.unwrap().is_none());
        assert!(kv.get(StorageKeys::DEFAULT_COMPLETION_SHOWN).await.unwrap().is_none());

        // After a reset the acknowledgement is due again.
        let mut notices = 0;
        for page in stage.pages() {
            notices += usize::from(store.record_visit(page).await.notice.is_some());
        }
        assert_eq!(notices, 1);
    }

    #[tokio::test]
    async fn export_then_import_round_trips() {
        let store = ProgressStore::in_memory(fixed_clock());
        for raw in ["prerequisites", "prerequisites/tools", "stage2-intermediate/subsystems"] {
            store.record_visit(&page(raw)).await;
        }
        let before = store.load().await;
        let file = store.export_snapshot().await.unwrap();
        assert_eq!(file.file_name, "zephyr-learning-progress-2023-11-14.json");
        assert_eq!(file.mime_type, "application/json");

        store.reset().await.unwrap();
        let imported = store.import_snapshot(&file.contents).await.unwrap();

        assert_eq!(imported.visited_pages(), before.visited_pages());
        assert_eq!(imported.completed_stages(), before.completed_stages());
        let after = store.load().await;
        assert_eq!(after.visited_pages(), before.visited_pages());
        assert_eq!(after.completed_stages(), before.completed_stages());
    }

    #[tokio::test]
    async fn import_rejects_non_array_visited_pages() {
        let store = ProgressStore::in_memory(fixed_clock());
        store.record_visit(&page("prerequisites/tools")).await;
        let before = store.load().await;

        let raw = br#"{"visitedPages": "all", "completedStages": {}, "lastVisit": "2024-01-01T00:00:00Z"}"#;
        let err = store.import_snapshot(raw).await.unwrap_err();
        assert!(matches!(err, ProgressError::ImportValidationFailed(_)));
        assert_eq!(store.load().await, before);
    }

    #[tokio::test]
    async fn import_accepts_date_only_last_visit() {
        let store = ProgressStore::in_memory(fixed_clock());

        let raw = br#"{"visitedPages":["prerequisites/tools"],"completedStages":{},"lastVisit":"2024-01-01"}"#;
        let record = store.import_snapshot(raw).await.unwrap();
        assert_eq!(record.visited_pages(), &[page("prerequisites/tools")]);
        assert_eq!(record.last_visit(), fixed_now());

        let raw = br#"{"visitedPages":["stage1-foundation/west-tool", "../up"],"completedStages":{},"lastVisit":"Mon Jan 01 2024"}"#;
        store.import_snapshot(raw).await.unwrap();
        assert_eq!(
            store.load().await.visited_pages(),
            &[page("stage1-foundation/west-tool")]
        );
    }

    #[tokio::test]
    async fn import_rejects_non_json() {
        let store = ProgressStore::in_memory(fixed_clock());
        let err = store.import_snapshot(b"<html>").await.unwrap_err();
        assert!(matches!(err, ProgressError::ImportParseFailed(_)));
        assert!(err.is_import_rejection());
    }

    #[tokio::test]
    async fn import_overwrites_instead_of_merging() {
        let store = ProgressStore::in_memory(fixed_clock());
        store.record_visit(&page("prerequisites/tools")).await;

        let raw = br#"{"visitedPages": ["stage1-foundation/west-tool"], "completedStages": {"stage1-foundation": true}, "lastVisit": "2024-01-01T00:00:00.000Z"}"#;
        store.import_file("progress.json", raw).await.unwrap();

        let record = store.load().await;
        assert_eq!(record.visited_pages(), &[page("stage1-foundation/west-tool")]);
        // Stale completion flags from the file are not trusted.
        assert!(!record.is_stage_marked_completed(&StageId::new("stage1-foundation")));
    }

    #[tokio::test]
    async fn import_file_checks_extension_first() {
        let store = ProgressStore::in_memory(fixed_clock());
        let err = store.import_file("progress.txt", b"{}").await.unwrap_err();
        assert!(matches!(err, ProgressError::UnsupportedFileType { .. }));
    }

    #[tokio::test]
    async fn repair_drops_pages_outside_curriculum() {
        let store = ProgressStore::in_memory(fixed_clock());
        store.record_visit(&page("blog/announcement")).await;
        store.record_visit(&page("prerequisites/tools")).await;

        let report = store.repair().await.unwrap();
        assert_eq!(report.removed, vec![page("blog/announcement")]);
        assert_eq!(report.kept, 1);
        assert_eq!(store.load().await.visited_pages(), &[page("prerequisites/tools")]);

        let again = store.repair().await.unwrap();
        assert!(again.removed.is_empty());
    }

    #[tokio::test]
    async fn reading_time_accumulates() {
        let store = ProgressStore::in_memory(fixed_clock());
        store.add_reading_time(90).await.unwrap();
        store.add_reading_time(0).await.unwrap();
        let record = store.add_reading_time(30).await.unwrap();
        assert_eq!(record.total_reading_time(), 120);
        assert_eq!(store.load().await.total_reading_time(), 120);
    }

    #[tokio::test]
    async fn events_are_published_for_mutations() {
        let store = ProgressStore::in_memory(fixed_clock());
        let mut events = store.subscribe();

        store.record_visit(&page("prerequisites/tools")).await;
        store.reset().await.unwrap();

        assert!(matches!(events.try_recv(), Ok(ProgressEvent::Visited { .. })));
        assert!(matches!(events.try_recv(), Ok(ProgressEvent::Reset)));
        assert!(events.try_recv().is_err());
    }
}
