use std::sync::Arc;

use tracing::debug;

use progress_core::calculator;
use progress_core::model::{Curriculum, PageId, PageIdError, ProgressRecord, Stage};
use progress_core::path::SitePaths;
use services::CompletionNotice;

use crate::host::{Anchor, Fragment, HostPage};
use crate::render;
use crate::vm::{
    CompletionVm, NotificationKind, NotificationVm, OverviewVm, ProgressBarVm, map_details,
    map_stats,
};

/// Draws progress views into a [`HostPage`].
///
/// Every fragment is removed before it is inserted, so drawing the same
/// record twice leaves the page unchanged.
#[derive(Debug, Clone)]
pub struct DisplayRenderer {
    curriculum: Arc<Curriculum>,
    paths: SitePaths,
}

impl DisplayRenderer {
    #[must_use]
    pub fn new(curriculum: Arc<Curriculum>, paths: SitePaths) -> Self {
        Self { curriculum, paths }
    }

    #[must_use]
    pub fn paths(&self) -> &SitePaths {
        &self.paths
    }

    /// Page identifier of the host's current location.
    ///
    /// # Errors
    ///
    /// Returns `PageIdError` if the location cannot be normalized.
    pub fn current_page(&self, host: &dyn HostPage) -> Result<PageId, PageIdError> {
        self.paths.page_for_location(&host.location_path())
    }

    /// Navigation marks plus whichever views belong on the current page.
    pub fn render_all(&self, host: &mut dyn HostPage, record: &ProgressRecord) {
        self.mark_visited_nav(host, record);

        let page = match self.current_page(host) {
            Ok(page) => page,
            Err(err) => {
                debug!(error = %err, "location is not a page; skipping views");
                return;
            }
        };
        if page.is_home() {
            self.render_home(host, record);
        } else if let Some(stage) = self.curriculum.stage_for_index_page(&page) {
            self.render_stage_progress(host, record, stage);
        }
    }

    pub fn mark_visited_nav(&self, host: &mut dyn HostPage, record: &ProgressRecord) {
        let location = host.location_path();
        let badge = render::visited_badge_html();
        for (index, link) in host.nav_links().into_iter().enumerate() {
            let visited = self
                .paths
                .resolve_href(&location, &link.href)
                .is_some_and(|page| record.has_visited(&page));
            if visited {
                host.mark_nav_visited(index, &badge);
            } else if link.visited {
                host.unmark_nav_visited(index);
            }
        }
    }

    pub fn render_stage_progress(&self, host: &mut dyn HostPage, record: &ProgressRecord, stage: &Stage) {
        let overview = calculator::overview(record, &self.curriculum);
        let Some(progress) = overview.stages.iter().find(|entry| &entry.id == stage.id()) else {
            return;
        };
        let html = render::stage_progress_html(ProgressBarVm::from(progress));
        host.remove_fragment(Fragment::StageProgress);
        host.insert_fragment(Anchor::AfterFirstHeading, Fragment::StageProgress, html);
    }

    /// Overview, management panel, details and stats, in that order.
    pub fn render_home(&self, host: &mut dyn HostPage, record: &ProgressRecord) {
        let overview = calculator::overview(record, &self.curriculum);

        for fragment in [
            Fragment::Overview,
            Fragment::Management,
            Fragment::Details,
            Fragment::Stats,
        ] {
            host.remove_fragment(fragment);
        }

        let inserted = host.insert_fragment(
            Anchor::AfterFirstHeading,
            Fragment::Overview,
            render::overview_html(OverviewVm::from(&overview)),
        );
        if !inserted {
            debug!("home page has no heading; progress views skipped");
            return;
        }
        host.insert_fragment(
            Anchor::After(Fragment::Overview),
            Fragment::Management,
            render::management_html(),
        );
        host.insert_fragment(
            Anchor::After(Fragment::Management),
            Fragment::Details,
            render::details_html(map_details(&overview, record)),
        );
        host.insert_fragment(
            Anchor::After(Fragment::Details),
            Fragment::Stats,
            render::stats_html(map_stats(&overview, record)),
        );
    }

    pub fn show_completion(&self, host: &mut dyn HostPage, notice: &CompletionNotice) {
        host.remove_fragment(Fragment::CompletionModal);
        host.insert_fragment(
            Anchor::ModalLayer,
            Fragment::CompletionModal,
            render::completion_html(CompletionVm::from(notice)),
        );
    }

    pub fn dismiss_completion(&self, host: &mut dyn HostPage) -> bool {
        host.remove_fragment(Fragment::CompletionModal)
    }

    /// Replace any visible notification with a new one.
    pub fn show_notification(&self, host: &mut dyn HostPage, kind: NotificationKind, message: &str) {
        host.remove_fragment(Fragment::Notification);
        host.insert_fragment(
            Anchor::ModalLayer,
            Fragment::Notification,
            render::notification_html(NotificationVm::new(kind, message)),
        );
    }
}
