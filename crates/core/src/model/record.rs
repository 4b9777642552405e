use std::collections::BTreeMap;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::calculator;
use crate::model::curriculum::Curriculum;
use crate::model::ids::{PageId, StageId};

const VISITED_PAGES: &str = "visitedPages";
const COMPLETED_STAGES: &str = "completedStages";
const LAST_VISIT: &str = "lastVisit";
const TOTAL_READING_TIME: &str = "totalReadingTime";

/// Shape violations found while validating a user-supplied snapshot.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SnapshotError {
    #[error("snapshot must be a JSON object")]
    NotAnObject,

    #[error("visitedPages must be an array")]
    VisitedPagesNotArray,

    #[error("visitedPages[{index}] must be a string")]
    VisitedPageNotString { index: usize },

    #[error("completedStages must be an object")]
    CompletedStagesNotObject,

    #[error("lastVisit must be a string")]
    LastVisitNotString,
}

/// The persisted reading progress of one visitor.
///
/// `completed_stages` is a cache derived from `visited_pages` and the
/// curriculum; [`ProgressRecord::reconcile`] rebuilds it. Fields this version
/// does not know about are kept in `extra` and written back untouched.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressRecord {
    visited_pages: Vec<PageId>,
    completed_stages: BTreeMap<StageId, bool>,
    #[serde(serialize_with = "serialize_timestamp")]
    last_visit: DateTime<Utc>,
    total_reading_time: u64,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

fn serialize_timestamp<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Millis, true))
}

impl ProgressRecord {
    /// Empty record with every curriculum stage marked incomplete.
    #[must_use]
    pub fn new(curriculum: &Curriculum, now: DateTime<Utc>) -> Self {
        let completed_stages = curriculum
            .stages()
            .iter()
            .map(|stage| (stage.id().clone(), false))
            .collect();
        Self {
            visited_pages: Vec::new(),
            completed_stages,
            last_visit: now,
            total_reading_time: 0,
            extra: Map::new(),
        }
    }

    /// Rehydrate a persisted record, filling in anything missing.
    ///
    /// Entries that cannot be interpreted are dropped rather than rejected;
    /// only a non-object document is an error.
    ///
    /// # Errors
    ///
    /// Returns `SnapshotError::NotAnObject` if `value` is not a JSON object.
    pub fn from_persisted(
        value: Value,
        curriculum: &Curriculum,
        now: DateTime<Utc>,
    ) -> Result<Self, SnapshotError> {
        let Value::Object(mut fields) = value else {
            return Err(SnapshotError::NotAnObject);
        };

        let mut record = Self::new(curriculum, now);

        if let Some(Value::Array(pages)) = fields.remove(VISITED_PAGES) {
            record.insert_tracked(pages.iter().filter_map(Value::as_str), curriculum);
        }

        fields.remove(COMPLETED_STAGES);

        if let Some(last_visit) = fields
            .remove(LAST_VISIT)
            .as_ref()
            .and_then(Value::as_str)
            .and_then(parse_timestamp)
        {
            record.last_visit = last_visit;
        }

        if let Some(seconds) = fields.remove(TOTAL_READING_TIME).as_ref().and_then(as_seconds) {
            record.total_reading_time = seconds;
        }

        record.extra = fields;
        record.reconcile(curriculum);
        Ok(record)
    }

    /// Validate a user-supplied snapshot and build a record from it.
    ///
    /// Only the shape is checked: `visitedPages` must be an array of strings,
    /// `completedStages` an object and `lastVisit` a string. Page entries
    /// that do not name a tracked page are skipped, and a `lastVisit` that
    /// does not parse as a timestamp becomes `now`.
    ///
    /// # Errors
    ///
    /// Returns the first `SnapshotError` encountered.
    pub fn from_snapshot(
        value: Value,
        curriculum: &Curriculum,
        now: DateTime<Utc>,
    ) -> Result<Self, SnapshotError> {
        let Value::Object(mut fields) = value else {
            return Err(SnapshotError::NotAnObject);
        };

        let Some(Value::Array(pages)) = fields.remove(VISITED_PAGES) else {
            return Err(SnapshotError::VisitedPagesNotArray);
        };
        let mut visited = Vec::with_capacity(pages.len());
        for (index, page) in pages.iter().enumerate() {
            visited.push(page.as_str().ok_or(SnapshotError::VisitedPageNotString { index })?);
        }

        if !matches!(fields.remove(COMPLETED_STAGES), Some(Value::Object(_))) {
            return Err(SnapshotError::CompletedStagesNotObject);
        }

        let last_visit = match fields.remove(LAST_VISIT) {
            Some(Value::String(raw)) => parse_timestamp(&raw).unwrap_or(now),
            _ => return Err(SnapshotError::LastVisitNotString),
        };

        let mut record = Self::new(curriculum, last_visit);
        record.insert_tracked(visited, curriculum);
        record.total_reading_time = fields
            .remove(TOTAL_READING_TIME)
            .as_ref()
            .and_then(as_seconds)
            .unwrap_or(0);
        record.extra = fields;
        record.reconcile(curriculum);
        Ok(record)
    }

    fn insert_tracked<'a>(
        &mut self,
        pages: impl IntoIterator<Item = &'a str>,
        curriculum: &Curriculum,
    ) {
        for page in pages.into_iter().filter_map(|raw| PageId::parse(raw).ok()) {
            if curriculum.is_tracked(&page) {
                self.insert_visit(page);
            }
        }
    }

    /// Rebuild `completed_stages` from the visited pages.
    ///
    /// Stage keys unknown to the curriculum are dropped.
    pub fn reconcile(&mut self, curriculum: &Curriculum) {
        self.completed_stages = curriculum
            .stages()
            .iter()
            .map(|stage| {
                let done = calculator::is_stage_complete(self, curriculum, stage.id());
                (stage.id().clone(), done)
            })
            .collect();
    }

    /// Adds `page` unless it is home or already present. Returns whether it was added.
    pub fn insert_visit(&mut self, page: PageId) -> bool {
        if page.is_home() || self.visited_pages.contains(&page) {
            return false;
        }
        self.visited_pages.push(page);
        true
    }

    /// Keeps only the visited pages matching `keep`, returning the removed ones.
    pub fn retain_visits(&mut self, mut keep: impl FnMut(&PageId) -> bool) -> Vec<PageId> {
        let mut removed = Vec::new();
        self.visited_pages.retain(|page| {
            if keep(page) {
                true
            } else {
                removed.push(page.clone());
                false
            }
        });
        removed
    }

    pub fn set_stage_completed(&mut self, stage: &StageId, completed: bool) {
        self.completed_stages.insert(stage.clone(), completed);
    }

    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.last_visit = now;
    }

    pub fn add_reading_time(&mut self, seconds: u64) {
        self.total_reading_time = self.total_reading_time.saturating_add(seconds);
    }

    #[must_use]
    pub fn visited_pages(&self) -> &[PageId] {
        &self.visited_pages
    }

    #[must_use]
    pub fn has_visited(&self, page: &PageId) -> bool {
        self.visited_pages.contains(page)
    }

    #[must_use]
    pub fn completed_stages(&self) -> &BTreeMap<StageId, bool> {
        &self.completed_stages
    }

    #[must_use]
    pub fn is_stage_marked_completed(&self, stage: &StageId) -> bool {
        self.completed_stages.get(stage).copied().unwrap_or(false)
    }

    #[must_use]
    pub fn last_visit(&self) -> DateTime<Utc> {
        self.last_visit
    }

    #[must_use]
    pub fn total_reading_time(&self) -> u64 {
        self.total_reading_time
    }

    #[must_use]
    pub fn extra(&self) -> &Map<String, Value> {
        &self.extra
    }

    /// Compact JSON as written to storage.
    ///
    /// # Errors
    ///
    /// Returns `serde_json::Error` if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Indented JSON as offered for download.
    ///
    /// # Errors
    ///
    /// Returns `serde_json::Error` if serialization fails.
    pub fn to_pretty_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|value| value.with_timezone(&Utc))
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn as_seconds(value: &Value) -> Option<u64> {
    value.as_u64().or_else(|| {
        value
            .as_f64()
            .filter(|secs| secs.is_finite() && *secs >= 0.0)
            .map(|secs| secs.floor() as u64)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;
    use serde_json::json;

    fn page(raw: &str) -> PageId {
        PageId::parse(raw).unwrap()
    }

    #[test]
    fn new_record_lists_every_stage_incomplete() {
        let curriculum = Curriculum::reference();
        let record = ProgressRecord::new(&curriculum, fixed_now());
        assert_eq!(record.completed_stages().len(), 5);
        assert!(record.completed_stages().values().all(|done| !done));
        assert!(record.visited_pages().is_empty());
        assert_eq!(record.total_reading_time(), 0);
    }

    #[test]
    fn insert_visit_is_idempotent_and_skips_home() {
        let curriculum = Curriculum::reference();
        let mut record = ProgressRecord::new(&curriculum, fixed_now());
        assert!(record.insert_visit(page("prerequisites/tools")));
        assert!(!record.insert_visit(page("prerequisites/tools")));
        assert!(!record.insert_visit(PageId::home()));
        assert_eq!(record.visited_pages().len(), 1);
    }

    #[test]
    fn persisted_record_fills_missing_fields() {
        let curriculum = Curriculum::reference();
        let value = json!({ "visitedPages": ["prerequisites/tools", 7, "index"] });
        let record = ProgressRecord::from_persisted(value, &curriculum, fixed_now()).unwrap();

        assert_eq!(record.visited_pages(), &[page("prerequisites/tools")]);
        assert_eq!(record.completed_stages().len(), 5);
        assert_eq!(record.last_visit(), fixed_now());
        assert_eq!(record.total_reading_time(), 0);
    }

    #[test]
    fn persisted_record_keeps_unknown_fields() {
        let curriculum = Curriculum::reference();
        let value = json!({
            "visitedPages": [],
            "completedStages": {},
            "lastVisit": "2024-03-01T10:00:00.000Z",
            "totalReadingTime": 12,
            "theme": "dark"
        });
        let record = ProgressRecord::from_persisted(value, &curriculum, fixed_now()).unwrap();
        assert_eq!(record.extra().get("theme"), Some(&json!("dark")));

        let written: Value = serde_json::from_str(&record.to_json().unwrap()).unwrap();
        assert_eq!(written["theme"], json!("dark"));
        assert_eq!(written["totalReadingTime"], json!(12));
        assert_eq!(written["lastVisit"], json!("2024-03-01T10:00:00.000Z"));
    }

    #[test]
    fn tampered_completion_flags_are_recomputed() {
        let curriculum = Curriculum::reference();
        let value = json!({
            "visitedPages": ["stage4-expert/index"],
            "completedStages": { "stage4-expert": true, "ghost-stage": true },
            "lastVisit": "2024-03-01T10:00:00Z"
        });
        let record = ProgressRecord::from_persisted(value, &curriculum, fixed_now()).unwrap();
        assert!(!record.is_stage_marked_completed(&StageId::new("stage4-expert")));
        assert!(!record.completed_stages().contains_key(&StageId::new("ghost-stage")));
    }

    #[test]
    fn persisted_non_object_is_rejected() {
        let curriculum = Curriculum::reference();
        let err = ProgressRecord::from_persisted(json!([1, 2]), &curriculum, fixed_now());
        assert_eq!(err, Err(SnapshotError::NotAnObject));
    }

    #[test]
    fn snapshot_requires_array_of_strings() {
        let curriculum = Curriculum::reference();
        let err = ProgressRecord::from_snapshot(
            json!({ "visitedPages": "nope", "completedStages": {}, "lastVisit": "2024-01-01T00:00:00Z" }),
            &curriculum,
            fixed_now(),
        );
        assert_eq!(err, Err(SnapshotError::VisitedPagesNotArray));

        let err = ProgressRecord::from_snapshot(
            json!({ "visitedPages": ["a", 1], "completedStages": {}, "lastVisit": "2024-01-01T00:00:00Z" }),
            &curriculum,
            fixed_now(),
        );
        assert_eq!(err, Err(SnapshotError::VisitedPageNotString { index: 1 }));
    }

    #[test]
    fn snapshot_checks_types_not_timestamp_format() {
        let curriculum = Curriculum::reference();
        let err = ProgressRecord::from_snapshot(
            json!({ "visitedPages": [], "completedStages": [], "lastVisit": "2024-01-01T00:00:00Z" }),
            &curriculum,
            fixed_now(),
        );
        assert_eq!(err, Err(SnapshotError::CompletedStagesNotObject));

        let err = ProgressRecord::from_snapshot(
            json!({ "visitedPages": [], "completedStages": {}, "lastVisit": 5 }),
            &curriculum,
            fixed_now(),
        );
        assert_eq!(err, Err(SnapshotError::LastVisitNotString));

        let record = ProgressRecord::from_snapshot(
            json!({ "visitedPages": [], "completedStages": {}, "lastVisit": "yesterday" }),
            &curriculum,
            fixed_now(),
        )
        .unwrap();
        assert_eq!(record.last_visit(), fixed_now());
    }

    #[test]
    fn snapshot_accepts_loose_dates_and_skips_bad_pages() {
        let curriculum = Curriculum::reference();
        for last_visit in ["2024-01-01", "Mon Jan 01 2024"] {
            let record = ProgressRecord::from_snapshot(
                json!({
                    "visitedPages": ["prerequisites/tools", "", "../../etc", "index"],
                    "completedStages": {},
                    "lastVisit": last_visit
                }),
                &curriculum,
                fixed_now(),
            )
            .unwrap();
            assert_eq!(record.visited_pages(), &[page("prerequisites/tools")]);
            assert_eq!(record.last_visit(), fixed_now());
        }

        let record = ProgressRecord::from_snapshot(
            json!({ "visitedPages": [], "completedStages": {}, "lastVisit": "2024-01-01T08:30:00Z" }),
            &curriculum,
            fixed_now(),
        )
        .unwrap();
        assert!(record.to_json().unwrap().contains("2024-01-01T08:30:00.000Z"));
    }

    #[test]
    fn custom_home_never_lands_in_visited_pages() {
        let curriculum = Curriculum::from_json(
            r#"{
                "home": "start",
                "untracked": ["about"],
                "stages": [{ "id": "basics", "name": "Basics", "pages": ["basics", "basics/one"] }]
            }"#,
        )
        .unwrap();
        let value = json!({
            "visitedPages": ["start", "about", "basics/one"],
            "completedStages": {},
            "lastVisit": "2024-01-01T00:00:00Z"
        });

        let imported = ProgressRecord::from_snapshot(value.clone(), &curriculum, fixed_now()).unwrap();
        assert_eq!(imported.visited_pages(), &[page("basics/one")]);

        let persisted = ProgressRecord::from_persisted(value, &curriculum, fixed_now()).unwrap();
        assert_eq!(persisted.visited_pages(), &[page("basics/one")]);
    }

    #[test]
    fn retain_visits_reports_removed_pages() {
        let curriculum = Curriculum::reference();
        let mut record = ProgressRecord::new(&curriculum, fixed_now());
        record.insert_visit(page("prerequisites/tools"));
        record.insert_visit(page("blog/release-notes"));

        let removed = record.retain_visits(|page| curriculum.contains_page(page));
        assert_eq!(removed, vec![page("blog/release-notes")]);
        assert_eq!(record.visited_pages(), &[page("prerequisites/tools")]);
    }
}
