use serde::{Deserialize, Serialize};

use crate::model::ids::StageId;

/// Stages whose one-time completion acknowledgement was already shown.
///
/// Persisted as a JSON array of stage ids, independent of the progress
/// record's completion cache.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CompletionMarker {
    stages: Vec<StageId>,
}

impl CompletionMarker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse the persisted form.
    ///
    /// # Errors
    ///
    /// Returns `serde_json::Error` if `raw` is not an array of strings.
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    /// # Errors
    ///
    /// Returns `serde_json::Error` if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    #[must_use]
    pub fn contains(&self, stage: &StageId) -> bool {
        self.stages.contains(stage)
    }

    /// Records `stage`; returns false if it was already present.
    pub fn insert(&mut self, stage: StageId) -> bool {
        if self.contains(&stage) {
            return false;
        }
        self.stages.push(stage);
        true
    }

    #[must_use]
    pub fn stages(&self) -> &[StageId] {
        &self.stages
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }
}
