use std::collections::{HashMap, HashSet};

use serde::Deserialize;
use thiserror::Error;

use crate::model::ids::{PageId, PageIdError, StageId};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CurriculumError {
    #[error("curriculum has no stages")]
    NoStages,

    #[error("stage id cannot be empty")]
    EmptyStageId,

    #[error("duplicate stage id: {0}")]
    DuplicateStage(String),

    #[error("stage {0} has no pages")]
    EmptyStage(String),

    #[error("page {page} listed in both {first} and {second}")]
    DuplicatePage {
        page: String,
        first: String,
        second: String,
    },

    #[error("stage {0} lists the home page")]
    HomeInStage(String),

    #[error(transparent)]
    InvalidPage(#[from] PageIdError),

    #[error("invalid curriculum file: {0}")]
    Parse(String),
}

//
// ─── STAGES ────────────────────────────────────────────────────────────────────
//

/// A named, ordered group of pages completed once every page is visited.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stage {
    id: StageId,
    name: String,
    pages: Vec<PageId>,
}

impl Stage {
    #[must_use]
    pub fn id(&self) -> &StageId {
        &self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn pages(&self) -> &[PageId] {
        &self.pages
    }

    /// The first page of a stage doubles as its landing page.
    #[must_use]
    pub fn index_page(&self) -> &PageId {
        &self.pages[0]
    }
}

//
// ─── CURRICULUM ────────────────────────────────────────────────────────────────
//

/// Static, read-only map from stages to their ordered pages.
///
/// Page identifiers are unique across the whole map, so every page belongs
/// to at most one stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Curriculum {
    home: PageId,
    untracked: HashSet<PageId>,
    stages: Vec<Stage>,
    page_index: HashMap<PageId, usize>,
}

/// Builder input for a single stage.
#[derive(Debug, Clone, Deserialize)]
pub struct StageDraft {
    pub id: String,
    pub name: String,
    pub pages: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct CurriculumFile {
    #[serde(default)]
    home: Option<String>,
    #[serde(default)]
    untracked: Vec<String>,
    stages: Vec<StageDraft>,
}

impl Curriculum {
    /// Build and validate a curriculum.
    ///
    /// # Errors
    ///
    /// Returns `CurriculumError` if stages are empty, ids repeat, or a page is
    /// listed twice.
    pub fn new(
        stages: Vec<StageDraft>,
        untracked: &[&str],
    ) -> Result<Self, CurriculumError> {
        Self::build(PageId::home(), stages, untracked.iter().copied())
    }

    /// Parse a curriculum from its JSON description.
    ///
    /// # Errors
    ///
    /// Returns `CurriculumError::Parse` on malformed JSON and the validation
    /// errors of [`Curriculum::new`] otherwise.
    pub fn from_json(raw: &str) -> Result<Self, CurriculumError> {
        let file: CurriculumFile =
            serde_json::from_str(raw).map_err(|err| CurriculumError::Parse(err.to_string()))?;
        let home = match file.home.as_deref() {
            Some(raw_home) => PageId::parse(raw_home)?,
            None => PageId::home(),
        };
        Self::build(home, file.stages, file.untracked.iter().map(String::as_str))
    }

    fn build<'a>(
        home: PageId,
        drafts: Vec<StageDraft>,
        untracked: impl Iterator<Item = &'a str>,
    ) -> Result<Self, CurriculumError> {
        if drafts.is_empty() {
            return Err(CurriculumError::NoStages);
        }

        let mut stages = Vec::with_capacity(drafts.len());
        let mut page_index: HashMap<PageId, usize> = HashMap::new();
        let mut seen_stages = HashSet::new();

        for (position, draft) in drafts.into_iter().enumerate() {
            let id = draft.id.trim().to_string();
            if id.is_empty() {
                return Err(CurriculumError::EmptyStageId);
            }
            if !seen_stages.insert(id.clone()) {
                return Err(CurriculumError::DuplicateStage(id));
            }
            if draft.pages.is_empty() {
                return Err(CurriculumError::EmptyStage(id));
            }

            let mut pages = Vec::with_capacity(draft.pages.len());
            for raw in &draft.pages {
                let page = PageId::parse(raw)?;
                if page == home {
                    return Err(CurriculumError::HomeInStage(id));
                }
                if let Some(&owner) = page_index.get(&page) {
                    let first = if owner == position {
                        id.clone()
                    } else {
                        stages
                            .get(owner)
                            .map_or_else(String::new, |stage: &Stage| stage.id.to_string())
                    };
                    return Err(CurriculumError::DuplicatePage {
                        page: page.to_string(),
                        first,
                        second: id,
                    });
                }
                page_index.insert(page.clone(), position);
                pages.push(page);
            }

            stages.push(Stage {
                id: StageId::new(id),
                name: draft.name,
                pages,
            });
        }

        let untracked = untracked
            .map(PageId::parse)
            .collect::<Result<HashSet<_>, _>>()?;

        Ok(Self {
            home,
            untracked,
            stages,
            page_index,
        })
    }

    /// The five-stage Zephyr RTOS learning path served by the reference site.
    #[must_use]
    pub fn reference() -> Self {
        fn draft(id: &str, name: &str, pages: &[&str]) -> StageDraft {
            StageDraft {
                id: id.to_string(),
                name: name.to_string(),
                pages: pages.iter().map(|page| format!("{id}/{page}")).collect(),
            }
        }

        let stages = vec![
            draft(
                "prerequisites",
                "Prerequisites",
                &["index", "c-language", "embedded-basics", "rtos-concepts", "tools"],
            ),
            draft(
                "stage1-foundation",
                "Stage 1: Foundation",
                &[
                    "index",
                    "introduction",
                    "environment-setup",
                    "west-tool",
                    "project-structure",
                    "basic-examples",
                ],
            ),
            draft(
                "stage2-intermediate",
                "Stage 2: Intermediate Practice",
                &[
                    "index",
                    "kernel-mechanisms",
                    "kconfig-devicetree",
                    "driver-development",
                    "subsystems",
                ],
            ),
            draft(
                "stage3-advanced",
                "Stage 3: Advanced Study",
                &["index", "kernel-source", "bsp-porting", "optimization", "security"],
            ),
            draft(
                "stage4-expert",
                "Stage 4: Expert Mastery",
                &[
                    "index",
                    "architecture-design",
                    "community-contribution",
                    "technical-evangelism",
                ],
            ),
        ];

        match Self::new(stages, &["about"]) {
            Ok(curriculum) => curriculum,
            Err(err) => unreachable!("reference curriculum is valid: {err}"),
        }
    }

    #[must_use]
    pub fn home(&self) -> &PageId {
        &self.home
    }

    #[must_use]
    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    #[must_use]
    pub fn stage(&self, id: &StageId) -> Option<&Stage> {
        self.stages.iter().find(|stage| &stage.id == id)
    }

    /// Reverse lookup from a page to the stage that lists it.
    #[must_use]
    pub fn stage_of(&self, page: &PageId) -> Option<&Stage> {
        self.page_index.get(page).map(|&idx| &self.stages[idx])
    }

    /// The stage immediately after `id` in curriculum order.
    #[must_use]
    pub fn next_stage(&self, id: &StageId) -> Option<&Stage> {
        let position = self.stages.iter().position(|stage| &stage.id == id)?;
        self.stages.get(position + 1)
    }

    /// Returns the stage whose landing page is `page`, if any.
    #[must_use]
    pub fn stage_for_index_page(&self, page: &PageId) -> Option<&Stage> {
        self.stage_of(page)
            .filter(|stage| stage.index_page() == page)
    }

    #[must_use]
    pub fn contains_page(&self, page: &PageId) -> bool {
        self.page_index.contains_key(page)
    }

    /// Home and explicitly untracked pages are never recorded as visited.
    #[must_use]
    pub fn is_tracked(&self, page: &PageId) -> bool {
        page != &self.home && !page.is_home() && !self.untracked.contains(page)
    }

    #[must_use]
    pub fn total_pages(&self) -> usize {
        self.page_index.len()
    }
}
