use std::sync::Arc;

use tracing::warn;

use progress_core::calculator;
use progress_core::model::{CompletionMarker, Curriculum, NextStage, PageId, ProgressRecord, StageId};
use storage::repository::KeyValueStore;

use crate::error::ProgressError;

/// Payload handed to the renderer when a stage is finished.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionNotice {
    pub stage_id: StageId,
    pub stage_name: String,
    pub next_stage: Option<NextStage>,
}

/// Acknowledgement state of one stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AckState {
    NotYetAcknowledged,
    Acknowledged,
}

/// Decides when a stage-completion acknowledgement is due and remembers
/// that it was shown.
///
/// The transition is one-way; only clearing the marker key resets it.
#[derive(Clone)]
pub struct CompletionNotifier {
    curriculum: Arc<Curriculum>,
    kv: Arc<dyn KeyValueStore>,
    marker_key: String,
}

impl CompletionNotifier {
    #[must_use]
    pub fn new(
        curriculum: Arc<Curriculum>,
        kv: Arc<dyn KeyValueStore>,
        marker_key: impl Into<String>,
    ) -> Self {
        Self {
            curriculum,
            kv,
            marker_key: marker_key.into(),
        }
    }

    /// Read the marker; unreadable or corrupt markers count as empty.
    pub async fn load_marker(&self) -> CompletionMarker {
        match self.kv.get(&self.marker_key).await {
            Ok(Some(raw)) => CompletionMarker::from_json(&raw).unwrap_or_else(|err| {
                warn!(error = %err, "completion marker is corrupt; treating as empty");
                CompletionMarker::new()
            }),
            Ok(None) => CompletionMarker::new(),
            Err(err) => {
                warn!(error = %err, "completion marker unavailable; treating as empty");
                CompletionMarker::new()
            }
        }
    }

    pub async fn state(&self, stage: &StageId) -> AckState {
        if self.load_marker().await.contains(stage) {
            AckState::Acknowledged
        } else {
            AckState::NotYetAcknowledged
        }
    }

    /// The notice due after `page` was added to `record`, if any.
    ///
    /// Due only when the page's stage is now fully read and has not been
    /// acknowledged before. Does not write anything.
    pub async fn pending_for(&self, record: &ProgressRecord, page: &PageId) -> Option<CompletionNotice> {
        let stage = self.curriculum.stage_of(page)?;
        if !calculator::is_stage_complete(record, &self.curriculum, stage.id()) {
            return None;
        }
        if self.state(stage.id()).await == AckState::Acknowledged {
            return None;
        }
        Some(CompletionNotice {
            stage_id: stage.id().clone(),
            stage_name: stage.name().to_string(),
            next_stage: calculator::next_stage(&self.curriculum, stage.id()),
        })
    }

    /// Move `stage` to `Acknowledged` and persist the marker.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::StorageUnavailable` if the marker cannot be written.
    pub async fn acknowledge(&self, stage: &StageId) -> Result<(), ProgressError> {
        let mut marker = self.load_marker().await;
        if !marker.insert(stage.clone()) {
            return Ok(());
        }
        let raw = marker
            .to_json()
            .map_err(|err| ProgressError::MalformedPersistedData(err.to_string()))?;
        self.kv.set(&self.marker_key, &raw).await?;
        Ok(())
    }
}
