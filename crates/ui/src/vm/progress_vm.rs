use progress_core::model::{ProgressOverview, ProgressRecord, StageProgress};

use crate::vm::time_fmt::{fill_width, format_datetime, format_duration, format_percent, format_percent_precise};

/// Bar shown on a stage's landing page.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProgressBarVm {
    pub stage_id: String,
    pub visited: usize,
    pub total: usize,
    pub percent_label: String,
    pub fill_width: String,
}

impl From<&StageProgress> for ProgressBarVm {
    fn from(stage: &StageProgress) -> Self {
        Self {
            stage_id: stage.id.as_str().to_string(),
            visited: stage.visited,
            total: stage.total,
            percent_label: format_percent(stage.percentage),
            fill_width: fill_width(stage.percentage),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StageCardVm {
    pub name: String,
    pub visited: usize,
    pub total: usize,
    pub percent_label: String,
    pub fill_width: String,
    pub completed: bool,
}

impl StageCardVm {
    #[must_use]
    pub fn status_icon(&self) -> &'static str {
        if self.completed { "✅" } else { "📖" }
    }

    #[must_use]
    pub fn status_text(&self) -> &'static str {
        if self.completed { "Completed" } else { "In progress" }
    }
}

impl From<&StageProgress> for StageCardVm {
    fn from(stage: &StageProgress) -> Self {
        Self {
            name: stage.name.clone(),
            visited: stage.visited,
            total: stage.total,
            percent_label: format_percent(stage.percentage),
            fill_width: fill_width(stage.percentage),
            completed: stage.completed,
        }
    }
}

/// Home page overview: aggregate bar plus one card per stage.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OverviewVm {
    pub visited: usize,
    pub total: usize,
    pub percent_label: String,
    pub fill_width: String,
    pub stages: Vec<StageCardVm>,
}

impl From<&ProgressOverview> for OverviewVm {
    fn from(overview: &ProgressOverview) -> Self {
        Self {
            visited: overview.visited_pages,
            total: overview.total_pages,
            percent_label: format_percent(overview.overall_percentage),
            fill_width: fill_width(overview.overall_percentage),
            stages: overview.stages.iter().map(StageCardVm::from).collect(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DetailsVm {
    pub total: usize,
    pub visited: usize,
    pub remaining: usize,
    pub percent_label: String,
    pub last_visit: String,
    pub reading_time: String,
}

#[must_use]
pub fn map_details(overview: &ProgressOverview, record: &ProgressRecord) -> DetailsVm {
    DetailsVm {
        total: overview.total_pages,
        visited: overview.visited_pages,
        remaining: overview.remaining_pages(),
        percent_label: format_percent_precise(overview.overall_percentage),
        last_visit: format_datetime(record.last_visit()),
        reading_time: format_duration(record.total_reading_time()),
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StatsVm {
    pub visited: usize,
    pub completed_stages: String,
    pub percent_label: String,
    pub reading_time: String,
}

#[must_use]
pub fn map_stats(overview: &ProgressOverview, record: &ProgressRecord) -> StatsVm {
    StatsVm {
        visited: overview.visited_pages,
        completed_stages: format!("{}/{}", overview.completed_stages(), overview.stages.len()),
        percent_label: format_percent(overview.overall_percentage),
        reading_time: format_duration(record.total_reading_time()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use progress_core::calculator;
    use progress_core::model::{Curriculum, PageId, StageId};
    use progress_core::time::fixed_now;

    fn overview_with(pages: &[&str]) -> (ProgressOverview, ProgressRecord) {
        let curriculum = Curriculum::reference();
        let mut record = ProgressRecord::new(&curriculum, fixed_now());
        for raw in pages {
            record.insert_visit(PageId::parse(raw).unwrap());
        }
        (calculator::overview(&record, &curriculum), record)
    }

    #[test]
    fn stage_bar_uses_whole_percent() {
        let (overview, _) = overview_with(&["prerequisites", "prerequisites/tools"]);
        let stage = overview
            .stages
            .iter()
            .find(|stage| stage.id == StageId::new("prerequisites"))
            .unwrap();
        let bar = ProgressBarVm::from(stage);
        assert_eq!(bar.stage_id, "prerequisites");
        assert_eq!(bar.visited, 2);
        assert_eq!(bar.percent_label, format_percent(stage.percentage));
        assert!(bar.fill_width.ends_with('%'));
    }

    #[test]
    fn details_and_stats_summarize_overview() {
        let (overview, mut record) = overview_with(&["stage4-expert"]);
        record.add_reading_time(5 * 60);

        let details = map_details(&overview, &record);
        assert_eq!(details.visited, 1);
        assert_eq!(details.remaining, overview.total_pages - 1);
        assert_eq!(details.reading_time, "5 min");
        assert!(details.percent_label.contains('.'));

        let stats = map_stats(&overview, &record);
        assert_eq!(stats.completed_stages, "0/5");
        assert_eq!(stats.visited, 1);
    }

    #[test]
    fn completed_card_reports_status() {
        let curriculum = Curriculum::reference();
        let mut record = ProgressRecord::new(&curriculum, fixed_now());
        let stage = curriculum.stage(&StageId::new("stage4-expert")).unwrap();
        for page in stage.pages() {
            record.insert_visit(page.clone());
        }
        let vm = OverviewVm::from(&calculator::overview(&record, &curriculum));
        let card = vm.stages.last().unwrap();
        assert!(card.completed);
        assert_eq!(card.status_text(), "Completed");
        assert_eq!(card.percent_label, "100%");
    }
}
