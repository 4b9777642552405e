//! The page the progress views are drawn into.
//!
//! The renderer only talks to this trait, so the same code patches a real
//! document, an in-memory page in tests, or the CLI's rendered output.

/// A page region owned by the progress views, identified by its marker class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Fragment {
    StageProgress,
    Overview,
    Management,
    Details,
    Stats,
    CompletionModal,
    Notification,
}

impl Fragment {
    /// CSS class carried by the fragment's root element.
    #[must_use]
    pub fn marker_class(self) -> &'static str {
        match self {
            Fragment::StageProgress => "progress-container",
            Fragment::Overview => "progress-overview",
            Fragment::Management => "progress-management",
            Fragment::Details => "progress-details-panel",
            Fragment::Stats => "progress-stats-card",
            Fragment::CompletionModal => "congratulations-modal",
            Fragment::Notification => "progress-notification",
        }
    }
}

/// Where a fragment is inserted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    /// Directly after the first heading of the content area.
    AfterFirstHeading,
    /// Directly after another fragment already on the page.
    After(Fragment),
    /// Overlay layer above the content (modals and notifications).
    ModalLayer,
}

/// One entry of the site navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavLink {
    pub href: String,
    pub title: String,
    pub visited: bool,
    pub badge: Option<String>,
}

impl NavLink {
    #[must_use]
    pub fn new(href: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            href: href.into(),
            title: title.into(),
            visited: false,
            badge: None,
        }
    }

    #[must_use]
    pub fn class_name(&self) -> &'static str {
        if self.visited {
            "md-nav__link visited"
        } else {
            "md-nav__link"
        }
    }
}

pub trait HostPage {
    /// Path component of the current location, e.g. `/stage1-foundation/`.
    fn location_path(&self) -> String;

    fn nav_links(&self) -> Vec<NavLink>;

    /// Add the `visited` class and, if missing, the badge to link `index`.
    fn mark_nav_visited(&mut self, index: usize, badge_html: &str);

    /// Remove the `visited` class and badge from link `index`.
    fn unmark_nav_visited(&mut self, index: usize);

    /// Remove every element carrying the fragment's marker class.
    /// Returns whether anything was removed.
    fn remove_fragment(&mut self, fragment: Fragment) -> bool;

    /// Insert `html` at `anchor`. Returns false when the anchor is missing.
    fn insert_fragment(&mut self, anchor: Anchor, fragment: Fragment, html: String) -> bool;

    /// Ask the user a yes/no question.
    fn confirm(&mut self, message: &str) -> bool;
}
