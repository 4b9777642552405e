//! Mapping between browser locations, navigation hrefs and page identifiers.

use thiserror::Error;
use url::Url;

use crate::model::{PageId, PageIdError};

// Placeholder origin; only paths are ever compared.
const SITE_ORIGIN: &str = "http://site.invalid";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SitePathError {
    #[error("invalid base path: {0}")]
    InvalidBase(String),
}

/// Site prefix under which the documentation is served (`/` or `/docs/`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SitePaths {
    base_path: String,
}

impl Default for SitePaths {
    fn default() -> Self {
        Self {
            base_path: "/".to_string(),
        }
    }
}

impl SitePaths {
    /// # Errors
    ///
    /// Returns `SitePathError::InvalidBase` if `base_path` cannot be used as a URL path.
    pub fn new(base_path: &str) -> Result<Self, SitePathError> {
        let trimmed = base_path.trim().trim_matches('/');
        let base_path = if trimmed.is_empty() {
            "/".to_string()
        } else {
            format!("/{trimmed}/")
        };
        Url::parse(SITE_ORIGIN)
            .and_then(|origin| origin.join(&base_path))
            .map_err(|err| SitePathError::InvalidBase(format!("{base_path}: {err}")))?;
        Ok(Self { base_path })
    }

    #[must_use]
    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    /// Page identifier for the current location path.
    ///
    /// A location outside the base path maps to its full path.
    ///
    /// # Errors
    ///
    /// Returns `PageIdError` if the path cannot be normalized.
    pub fn page_for_location(&self, location_path: &str) -> Result<PageId, PageIdError> {
        PageId::parse(self.strip_base(location_path).unwrap_or(location_path))
    }

    /// Resolve a navigation href as seen from `location_path`.
    ///
    /// Returns `None` for non-HTTP links, links outside the site and the
    /// home page, which is never tagged.
    #[must_use]
    pub fn resolve_href(&self, location_path: &str, href: &str) -> Option<PageId> {
        let href = href.trim();
        if href.is_empty() || href.starts_with('#') {
            return None;
        }

        let origin = Url::parse(SITE_ORIGIN).ok()?;
        let current = origin.join(location_path).ok()?;
        let resolved = current.join(href).ok()?;
        if !matches!(resolved.scheme(), "http" | "https") {
            return None;
        }

        let relative = self.strip_base(resolved.path())?;
        let page = PageId::parse(relative).ok()?;
        (!page.is_home()).then_some(page)
    }

    fn strip_base<'a>(&self, path: &'a str) -> Option<&'a str> {
        if self.base_path == "/" {
            return Some(path);
        }
        let bare = self.base_path.trim_end_matches('/');
        if path == bare {
            return Some("");
        }
        path.strip_prefix(self.base_path.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn location_maps_to_page() {
        let paths = SitePaths::default();
        let page = paths.page_for_location("/stage1-foundation/west-tool/").unwrap();
        assert_eq!(page.as_str(), "stage1-foundation/west-tool");
        assert!(paths.page_for_location("/").unwrap().is_home());
    }

    #[test]
    fn base_path_is_stripped() {
        let paths = SitePaths::new("zephyr-docs").unwrap();
        assert_eq!(paths.base_path(), "/zephyr-docs/");
        let page = paths
            .page_for_location("/zephyr-docs/prerequisites/tools/")
            .unwrap();
        assert_eq!(page.as_str(), "prerequisites/tools");
        assert!(paths.page_for_location("/zephyr-docs").unwrap().is_home());
    }

    #[test]
    fn resolves_relative_hrefs() {
        let paths = SitePaths::default();
        let page = paths
            .resolve_href("/stage1-foundation/west-tool/", "../environment-setup/")
            .unwrap();
        assert_eq!(page.as_str(), "stage1-foundation/environment-setup");

        let page = paths
            .resolve_href("/stage1-foundation/west-tool/", "../../stage2-intermediate/")
            .unwrap();
        assert_eq!(page.as_str(), "stage2-intermediate");
    }

    #[test]
    fn resolves_absolute_hrefs() {
        let paths = SitePaths::default();
        let page = paths
            .resolve_href("/", "https://example.org/prerequisites/tools.html")
            .unwrap();
        assert_eq!(page.as_str(), "prerequisites/tools");

        let page = paths.resolve_href("/", "/stage3-advanced/security/#hardening").unwrap();
        assert_eq!(page.as_str(), "stage3-advanced/security");
    }

    #[test]
    fn skips_home_anchors_and_foreign_schemes() {
        let paths = SitePaths::default();
        assert_eq!(paths.resolve_href("/a/", "/"), None);
        assert_eq!(paths.resolve_href("/a/", "../"), None);
        assert_eq!(paths.resolve_href("/a/", "#section"), None);
        assert_eq!(paths.resolve_href("/a/", "mailto:someone@example.org"), None);
    }

    #[test]
    fn skips_links_outside_base_path() {
        let paths = SitePaths::new("/docs/").unwrap();
        assert_eq!(paths.resolve_href("/docs/", "/blog/post/"), None);
        let page = paths.resolve_href("/docs/", "prerequisites/").unwrap();
        assert_eq!(page.as_str(), "prerequisites");
    }
}
