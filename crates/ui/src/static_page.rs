use progress_core::model::Curriculum;
use progress_core::path::SitePaths;

use crate::host::{Anchor, Fragment, HostPage, NavLink};
use crate::render::page_html;
use crate::views::PageShellProps;

/// In-memory [`HostPage`] with a navigation list, one content heading and a
/// modal layer.
///
/// Used by tests and by the CLI, which prints [`StaticPage::to_html`].
#[derive(Debug, Clone)]
pub struct StaticPage {
    location: String,
    title: String,
    has_heading: bool,
    nav: Vec<NavLink>,
    content: Vec<(Fragment, String)>,
    modal_layer: Vec<(Fragment, String)>,
    confirm_answer: bool,
    prompts: Vec<String>,
}

impl StaticPage {
    #[must_use]
    pub fn new(location: impl Into<String>) -> Self {
        let location = location.into();
        Self {
            title: title_for(&location),
            location,
            has_heading: true,
            nav: Vec::new(),
            content: Vec::new(),
            modal_layer: Vec::new(),
            confirm_answer: true,
            prompts: Vec::new(),
        }
    }

    /// Page whose navigation lists the home page and every curriculum page.
    #[must_use]
    pub fn for_curriculum(curriculum: &Curriculum, paths: &SitePaths, location: &str) -> Self {
        let base = paths.base_path();
        let mut page = Self::new(location).with_nav_link(base, "Home");
        for stage in curriculum.stages() {
            for id in stage.pages() {
                let href = format!("{base}{}/", id.as_str());
                let title = if id == stage.index_page() {
                    stage.name().to_string()
                } else {
                    title_for(id.as_str())
                };
                page = page.with_nav_link(href, title);
            }
        }
        page
    }

    #[must_use]
    pub fn with_nav_link(mut self, href: impl Into<String>, title: impl Into<String>) -> Self {
        self.nav.push(NavLink::new(href, title));
        self
    }

    #[must_use]
    pub fn without_heading(mut self) -> Self {
        self.has_heading = false;
        self
    }

    /// Answer returned by every later [`HostPage::confirm`] call.
    pub fn set_confirm_answer(&mut self, answer: bool) {
        self.confirm_answer = answer;
    }

    /// Questions asked through [`HostPage::confirm`], oldest first.
    #[must_use]
    pub fn prompts(&self) -> &[String] {
        &self.prompts
    }

    /// Move to another location. Content and overlays belong to the old page
    /// and are dropped; navigation marks stay.
    pub fn navigate(&mut self, location: impl Into<String>) {
        self.location = location.into();
        self.title = title_for(&self.location);
        self.content.clear();
        self.modal_layer.clear();
    }

    #[must_use]
    pub fn fragment_html(&self, fragment: Fragment) -> Option<&str> {
        self.content
            .iter()
            .chain(self.modal_layer.iter())
            .find(|(kind, _)| *kind == fragment)
            .map(|(_, html)| html.as_str())
    }

    #[must_use]
    pub fn fragment_count(&self, fragment: Fragment) -> usize {
        self.content
            .iter()
            .chain(self.modal_layer.iter())
            .filter(|(kind, _)| *kind == fragment)
            .count()
    }

    /// Content fragments in document order.
    #[must_use]
    pub fn content_order(&self) -> Vec<Fragment> {
        self.content.iter().map(|(kind, _)| *kind).collect()
    }

    #[must_use]
    pub fn to_html(&self) -> String {
        page_html(PageShellProps {
            nav: self.nav.clone(),
            heading: self.has_heading.then(|| self.title.clone()),
            content: self.content.iter().map(|(_, html)| html.clone()).collect(),
            overlays: self.modal_layer.iter().map(|(_, html)| html.clone()).collect(),
        })
    }
}

impl HostPage for StaticPage {
    fn location_path(&self) -> String {
        self.location.clone()
    }

    fn nav_links(&self) -> Vec<NavLink> {
        self.nav.clone()
    }

    fn mark_nav_visited(&mut self, index: usize, badge_html: &str) {
        if let Some(link) = self.nav.get_mut(index) {
            link.visited = true;
            if link.badge.is_none() {
                link.badge = Some(badge_html.to_string());
            }
        }
    }

    fn unmark_nav_visited(&mut self, index: usize) {
        if let Some(link) = self.nav.get_mut(index) {
            link.visited = false;
            link.badge = None;
        }
    }

    fn remove_fragment(&mut self, fragment: Fragment) -> bool {
        let before = self.content.len() + self.modal_layer.len();
        self.content.retain(|(kind, _)| *kind != fragment);
        self.modal_layer.retain(|(kind, _)| *kind != fragment);
        before != self.content.len() + self.modal_layer.len()
    }

    fn insert_fragment(&mut self, anchor: Anchor, fragment: Fragment, html: String) -> bool {
        match anchor {
            Anchor::AfterFirstHeading => {
                if !self.has_heading {
                    return false;
                }
                self.content.insert(0, (fragment, html));
                true
            }
            Anchor::After(previous) => {
                let Some(position) = self.content.iter().position(|(kind, _)| *kind == previous)
                else {
                    return false;
                };
                self.content.insert(position + 1, (fragment, html));
                true
            }
            Anchor::ModalLayer => {
                self.modal_layer.push((fragment, html));
                true
            }
        }
    }

    fn confirm(&mut self, message: &str) -> bool {
        self.prompts.push(message.to_string());
        self.confirm_answer
    }
}

fn title_for(location: &str) -> String {
    let last = location
        .split(['?', '#'])
        .next()
        .unwrap_or_default()
        .trim_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or_default();
    if last.is_empty() || last == "index" {
        "Home".to_string()
    } else {
        last.replace('-', " ")
    }
}
