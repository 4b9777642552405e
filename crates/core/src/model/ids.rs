use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Identifier of the site home page.
pub const HOME_PAGE: &str = "index";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum PageIdError {
    #[error("page identifier contains a relative segment: {raw}")]
    RelativeSegment { raw: String },

    #[error("page identifier contains a backslash: {raw}")]
    Backslash { raw: String },
}

/// Normalized path identifying one content page.
///
/// Normal form: no leading or trailing slash, no `.html`/`.md` extension,
/// no trailing `/index`. The empty path and `index` both map to [`HOME_PAGE`].
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PageId(String);

impl PageId {
    /// Normalizes a raw page path into a `PageId`.
    ///
    /// # Errors
    ///
    /// Returns `PageIdError` if the path contains `.`/`..` segments or backslashes.
    pub fn parse(raw: &str) -> Result<Self, PageIdError> {
        if raw.contains('\\') {
            return Err(PageIdError::Backslash {
                raw: raw.to_string(),
            });
        }

        let mut path = raw.trim();
        if let Some(idx) = path.find(['?', '#']) {
            path = &path[..idx];
        }
        let path = path.trim_matches('/');
        let path = path
            .strip_suffix(".html")
            .or_else(|| path.strip_suffix(".md"))
            .unwrap_or(path);

        if path.is_empty() || path == HOME_PAGE {
            return Ok(Self::home());
        }

        let path = path.strip_suffix("/index").unwrap_or(path).trim_end_matches('/');

        if path
            .split('/')
            .any(|segment| segment == "." || segment == "..")
        {
            return Err(PageIdError::RelativeSegment {
                raw: raw.to_string(),
            });
        }

        // Collapse duplicate separators ("a//b").
        let normalized = path
            .split('/')
            .filter(|segment| !segment.is_empty())
            .collect::<Vec<_>>()
            .join("/");

        Ok(Self(normalized))
    }

    #[must_use]
    pub fn home() -> Self {
        Self(HOME_PAGE.to_string())
    }

    #[must_use]
    pub fn is_home(&self) -> bool {
        self.0 == HOME_PAGE
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Site-relative URL of the page in directory-URL form (`/a/b/`).
    #[must_use]
    pub fn url(&self) -> String {
        if self.is_home() {
            "/".to_string()
        } else {
            format!("/{}/", self.0)
        }
    }
}

/// Key of a curriculum stage.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StageId(String);

impl StageId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PageId({})", self.0)
    }
}

impl fmt::Debug for StageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StageId({})", self.0)
    }
}

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for StageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for PageId {
    type Err = PageIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<&str> for StageId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}
