use progress_core::model::{PageId, ProgressRecord};

use crate::notifier::CompletionNotice;

/// Published after every mutating store operation.
///
/// Views subscribe to these instead of inspecting the document for changes.
#[derive(Debug, Clone, PartialEq)]
pub enum ProgressEvent {
    Visited { page: PageId, record: ProgressRecord },
    StageCompleted(CompletionNotice),
    Imported(ProgressRecord),
    Repaired { removed: Vec<PageId> },
    Reset,
}

impl ProgressEvent {
    /// Events after which every progress view must be redrawn.
    #[must_use]
    pub fn requires_full_refresh(&self) -> bool {
        matches!(self, Self::Imported(_) | Self::Reset | Self::Repaired { .. })
    }
}
