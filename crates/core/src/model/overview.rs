use crate::model::ids::StageId;

/// Completion figures for one stage.
#[derive(Debug, Clone, PartialEq)]
pub struct StageProgress {
    pub id: StageId,
    pub name: String,
    pub total: usize,
    pub visited: usize,
    pub percentage: f64,
    pub completed: bool,
}

/// Everything needed to draw the home page overview in one value.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressOverview {
    pub total_pages: usize,
    pub visited_pages: usize,
    pub overall_percentage: f64,
    pub stages: Vec<StageProgress>,
}

impl ProgressOverview {
    #[must_use]
    pub fn completed_stages(&self) -> usize {
        self.stages.iter().filter(|stage| stage.completed).count()
    }

    #[must_use]
    pub fn remaining_pages(&self) -> usize {
        self.total_pages.saturating_sub(self.visited_pages)
    }
}

/// Link target offered after a stage is finished.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NextStage {
    pub id: StageId,
    pub name: String,
    pub url: String,
}
