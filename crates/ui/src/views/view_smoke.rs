use progress_core::calculator;
use progress_core::model::{Curriculum, NextStage, PageId, ProgressRecord, StageId};
use progress_core::time::fixed_now;
use services::CompletionNotice;

use crate::render::{
    completion_html, details_html, management_html, notification_html, overview_html,
    stage_progress_html, stats_html, visited_badge_html,
};
use crate::vm::{
    CompletionVm, NotificationKind, NotificationVm, OverviewVm, ProgressBarVm, map_details,
    map_stats,
};

fn record_with(curriculum: &Curriculum, pages: &[&str]) -> ProgressRecord {
    let mut record = ProgressRecord::new(curriculum, fixed_now());
    for raw in pages {
        record.insert_visit(PageId::parse(raw).unwrap());
    }
    record
}

#[test]
fn stage_bar_smoke_renders_counts() {
    let curriculum = Curriculum::reference();
    let record = record_with(&curriculum, &["stage1-foundation", "stage1-foundation/west-tool"]);
    let overview = calculator::overview(&record, &curriculum);
    let stage = &overview.stages[1];

    let html = stage_progress_html(ProgressBarVm::from(stage));
    assert!(html.contains("class=\"progress-container\""), "missing container in {html}");
    assert!(html.contains("data-stage=\"stage1-foundation\""), "missing stage in {html}");
    let expected = format!("2 / {} pages read", stage.total);
    assert!(html.contains(&expected), "missing {expected} in {html}");
}

#[test]
fn overview_smoke_renders_every_stage() {
    let curriculum = Curriculum::reference();
    let record = record_with(&curriculum, &["prerequisites/tools"]);
    let overview = calculator::overview(&record, &curriculum);

    let html = overview_html(OverviewVm::from(&overview));
    assert!(html.contains("progress-overview"));
    assert_eq!(html.matches("stage-progress-card").count(), 5);
    for stage in curriculum.stages() {
        assert!(html.contains(stage.name()), "missing {} in {html}", stage.name());
    }
    let expected = format!("1 / {} pages read", curriculum.total_pages());
    assert!(html.contains(&expected), "missing {expected} in {html}");
}

#[test]
fn management_smoke_renders_actions() {
    let html = management_html();
    for action in ["export", "import", "reset"] {
        let attr = format!("data-action=\"{action}\"");
        assert!(html.contains(&attr), "missing {attr} in {html}");
    }
    assert!(html.contains("accept=\".json\""), "missing file filter in {html}");
}

#[test]
fn details_and_stats_smoke() {
    let curriculum = Curriculum::reference();
    let mut record = record_with(&curriculum, &["stage4-expert"]);
    record.add_reading_time(3 * 60);
    let overview = calculator::overview(&record, &curriculum);

    let details = details_html(map_details(&overview, &record));
    assert!(details.contains("progress-details-panel"));
    assert!(details.contains("4.0%"), "missing one-decimal percentage in {details}");
    assert!(details.contains("2023-11-14 22:13 UTC"));
    assert!(details.contains("3 min"));

    let stats = stats_html(map_stats(&overview, &record));
    assert!(stats.contains("progress-stats-card"));
    assert!(stats.contains("0/5"));
}

#[test]
fn completion_modal_links_to_next_stage() {
    let notice = CompletionNotice {
        stage_id: StageId::new("prerequisites"),
        stage_name: "Prerequisites".into(),
        next_stage: Some(NextStage {
            id: StageId::new("stage1-foundation"),
            name: "Stage 1: Foundation".into(),
            url: "/stage1-foundation/".into(),
        }),
    };
    let html = completion_html(CompletionVm::from(&notice));
    assert!(html.contains("congratulations-modal"));
    assert!(html.contains("Prerequisites"));
    assert!(html.contains("href=\"/stage1-foundation/\""), "missing link in {html}");
}

#[test]
fn completion_modal_for_last_stage_has_no_link() {
    let notice = CompletionNotice {
        stage_id: StageId::new("stage4-expert"),
        stage_name: "Stage 4: Expert Mastery".into(),
        next_stage: None,
    };
    let html = completion_html(CompletionVm::from(&notice));
    assert!(!html.contains("href="), "unexpected link in {html}");
    assert!(html.contains("completed every stage"));
}

#[test]
fn notification_and_badge_smoke() {
    let html = notification_html(NotificationVm::new(NotificationKind::Warning, "Heads up"));
    assert!(html.contains("progress-notification notification-warning"), "{html}");
    assert!(html.contains("Heads up"));

    let badge = visited_badge_html();
    assert!(badge.contains("visited-icon"));
}
