//! Completion arithmetic over a progress record and a curriculum.
//!
//! Everything here is pure: no storage, no clock, safe to call on every
//! navigation.

use crate::model::{
    Curriculum, NextStage, PageId, ProgressOverview, ProgressRecord, StageId, StageProgress,
};

/// Number of pages in a stage; 0 for an unknown stage.
#[must_use]
pub fn stage_total(curriculum: &Curriculum, stage: &StageId) -> usize {
    curriculum.stage(stage).map_or(0, |stage| stage.pages().len())
}

/// Number of a stage's pages present in `record`.
#[must_use]
pub fn stage_visited_count(
    record: &ProgressRecord,
    curriculum: &Curriculum,
    stage: &StageId,
) -> usize {
    curriculum.stage(stage).map_or(0, |stage| {
        stage
            .pages()
            .iter()
            .filter(|page| record.has_visited(page))
            .count()
    })
}

/// Percentage of a stage read, in `[0, 100]`; 0 when the stage has no pages.
#[must_use]
pub fn stage_percentage(record: &ProgressRecord, curriculum: &Curriculum, stage: &StageId) -> f64 {
    percentage(
        stage_visited_count(record, curriculum, stage),
        stage_total(curriculum, stage),
    )
}

#[must_use]
pub fn is_stage_complete(record: &ProgressRecord, curriculum: &Curriculum, stage: &StageId) -> bool {
    let total = stage_total(curriculum, stage);
    total > 0 && stage_visited_count(record, curriculum, stage) == total
}

/// Pooled completion across all stages.
///
/// Larger stages weigh proportionally more; this is not the mean of the
/// per-stage percentages.
#[must_use]
pub fn overall_percentage(record: &ProgressRecord, curriculum: &Curriculum) -> f64 {
    let (visited, total) = curriculum
        .stages()
        .iter()
        .fold((0, 0), |(visited, total), stage| {
            (
                visited + stage_visited_count(record, curriculum, stage.id()),
                total + stage.pages().len(),
            )
        });
    percentage(visited, total)
}

#[must_use]
pub fn completed_stage_count(record: &ProgressRecord, curriculum: &Curriculum) -> usize {
    curriculum
        .stages()
        .iter()
        .filter(|stage| is_stage_complete(record, curriculum, stage.id()))
        .count()
}

/// Reverse lookup of the stage owning `page`.
#[must_use]
pub fn page_stage(curriculum: &Curriculum, page: &PageId) -> Option<StageId> {
    curriculum.stage_of(page).map(|stage| stage.id().clone())
}

/// The stage after `stage`, with a link to its landing page.
#[must_use]
pub fn next_stage(curriculum: &Curriculum, stage: &StageId) -> Option<NextStage> {
    curriculum.next_stage(stage).map(|next| NextStage {
        id: next.id().clone(),
        name: next.name().to_string(),
        url: next.index_page().url(),
    })
}

#[must_use]
pub fn overview(record: &ProgressRecord, curriculum: &Curriculum) -> ProgressOverview {
    let stages: Vec<StageProgress> = curriculum
        .stages()
        .iter()
        .map(|stage| {
            let total = stage.pages().len();
            let visited = stage_visited_count(record, curriculum, stage.id());
            let percentage = percentage(visited, total);
            StageProgress {
                id: stage.id().clone(),
                name: stage.name().to_string(),
                total,
                visited,
                percentage,
                completed: total > 0 && visited == total,
            }
        })
        .collect();

    let total_pages = stages.iter().map(|stage| stage.total).sum();
    let visited_pages = stages.iter().map(|stage| stage.visited).sum();

    ProgressOverview {
        total_pages,
        visited_pages,
        overall_percentage: percentage(visited_pages, total_pages),
        stages,
    }
}

#[allow(clippy::cast_precision_loss)]
fn percentage(visited: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (visited as f64 / total as f64) * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::StageDraft;
    use crate::time::fixed_now;

    fn page(raw: &str) -> PageId {
        PageId::parse(raw).unwrap()
    }

    fn two_stage_curriculum() -> Curriculum {
        let small = StageDraft {
            id: "small".into(),
            name: "Small".into(),
            pages: vec!["small/a".into(), "small/b".into()],
        };
        let large = StageDraft {
            id: "large".into(),
            name: "Large".into(),
            pages: (0..8).map(|i| format!("large/p{i}")).collect(),
        };
        Curriculum::new(vec![small, large], &[]).unwrap()
    }

    #[test]
    fn overall_is_pooled_not_averaged() {
        let curriculum = two_stage_curriculum();
        let mut record = ProgressRecord::new(&curriculum, fixed_now());
        record.insert_visit(page("small/a"));
        record.insert_visit(page("small/b"));

        assert!((stage_percentage(&record, &curriculum, &StageId::new("small")) - 100.0).abs() < 1e-9);
        assert!(stage_percentage(&record, &curriculum, &StageId::new("large")).abs() < 1e-9);
        assert!((overall_percentage(&record, &curriculum) - 20.0).abs() < 1e-9);
    }

    #[test]
    fn unknown_stage_has_zero_totals() {
        let curriculum = two_stage_curriculum();
        let record = ProgressRecord::new(&curriculum, fixed_now());
        let ghost = StageId::new("ghost");
        assert_eq!(stage_total(&curriculum, &ghost), 0);
        assert_eq!(stage_visited_count(&record, &curriculum, &ghost), 0);
        assert!(stage_percentage(&record, &curriculum, &ghost).abs() < f64::EPSILON);
        assert!(!is_stage_complete(&record, &curriculum, &ghost));
    }

    #[test]
    fn visited_never_exceeds_total() {
        let curriculum = Curriculum::reference();
        let mut record = ProgressRecord::new(&curriculum, fixed_now());
        for stage in curriculum.stages() {
            for page in stage.pages() {
                record.insert_visit(page.clone());
            }
        }
        record.insert_visit(page("blog/extra"));

        for stage in curriculum.stages() {
            let visited = stage_visited_count(&record, &curriculum, stage.id());
            assert!(visited <= stage_total(&curriculum, stage.id()));
        }
        assert!((overall_percentage(&record, &curriculum) - 100.0).abs() < 1e-9);
    }

    #[test]
    fn pages_outside_stages_do_not_count() {
        let curriculum = two_stage_curriculum();
        let mut record = ProgressRecord::new(&curriculum, fixed_now());
        record.insert_visit(page("about"));
        record.insert_visit(PageId::home());

        let overview = overview(&record, &curriculum);
        assert_eq!(overview.visited_pages, 0);
        assert_eq!(overview.total_pages, 10);
    }

    #[test]
    fn overview_marks_completed_stages() {
        let curriculum = two_stage_curriculum();
        let mut record = ProgressRecord::new(&curriculum, fixed_now());
        record.insert_visit(page("small/a"));
        record.insert_visit(page("small/b"));
        record.insert_visit(page("large/p0"));

        let overview = overview(&record, &curriculum);
        assert_eq!(overview.visited_pages, 3);
        assert_eq!(overview.completed_stages(), 1);
        assert_eq!(completed_stage_count(&record, &curriculum), 1);
        assert_eq!(overview.remaining_pages(), 7);
        assert!(overview.stages[0].completed);
        assert_eq!(overview.stages[1].visited, 1);
        assert!(!overview.stages[1].completed);
    }

    #[test]
    fn next_stage_links_to_landing_page() {
        let curriculum = Curriculum::reference();
        let next = next_stage(&curriculum, &StageId::new("prerequisites")).unwrap();
        assert_eq!(next.id.as_str(), "stage1-foundation");
        assert_eq!(next.url, "/stage1-foundation/");
        assert!(next_stage(&curriculum, &StageId::new("stage4-expert")).is_none());
    }

    #[test]
    fn page_stage_resolves_owner() {
        let curriculum = Curriculum::reference();
        assert_eq!(
            page_stage(&curriculum, &page("stage3-advanced/bsp-porting")),
            Some(StageId::new("stage3-advanced"))
        );
        assert_eq!(page_stage(&curriculum, &page("about")), None);
    }
}
