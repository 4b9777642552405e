use dioxus::core::ComponentFunction;
use dioxus::prelude::*;

use crate::views::{
    CompletionModal, CompletionModalProps, DetailsPanel, DetailsPanelProps, ManagementPanel,
    Notification, NotificationProps, PageShell, PageShellProps, ProgressOverviewPanel, ProgressOverviewPanelProps,
    StageProgressBar, StageProgressBarProps, StatsCard, StatsCardProps, VisitedBadge,
};
use crate::vm::{CompletionVm, DetailsVm, NotificationVm, OverviewVm, ProgressBarVm, StatsVm};

/// Render one component to an HTML string.
pub fn render_component<P: Clone + 'static, M: 'static>(
    component: impl ComponentFunction<P, M>,
    props: P,
) -> String {
    let mut dom = VirtualDom::new_with_props(component, props);
    dom.rebuild_in_place();
    dioxus_ssr::render(&dom)
}

#[must_use]
pub fn stage_progress_html(bar: ProgressBarVm) -> String {
    render_component(StageProgressBar, StageProgressBarProps { bar })
}

#[must_use]
pub fn overview_html(overview: OverviewVm) -> String {
    render_component(ProgressOverviewPanel, ProgressOverviewPanelProps { overview })
}

#[must_use]
pub fn management_html() -> String {
    render_component(ManagementPanel, ())
}

#[must_use]
pub fn details_html(details: DetailsVm) -> String {
    render_component(DetailsPanel, DetailsPanelProps { details })
}

#[must_use]
pub fn stats_html(stats: StatsVm) -> String {
    render_component(StatsCard, StatsCardProps { stats })
}

#[must_use]
pub fn completion_html(completion: CompletionVm) -> String {
    render_component(CompletionModal, CompletionModalProps { completion })
}

#[must_use]
pub fn notification_html(notification: NotificationVm) -> String {
    render_component(Notification, NotificationProps { notification })
}

#[must_use]
pub fn visited_badge_html() -> String {
    render_component(VisitedBadge, ())
}

/// Full document for a static page, doctype included.
#[must_use]
pub fn page_html(props: PageShellProps) -> String {
    format!("<!DOCTYPE html>\n{}", render_component(PageShell, props))
}
