mod curriculum;
mod ids;
mod marker;
mod overview;
mod record;

pub use curriculum::{Curriculum, CurriculumError, Stage, StageDraft};
pub use ids::{HOME_PAGE, PageId, PageIdError, StageId};
pub use marker::CompletionMarker;
pub use overview::{NextStage, ProgressOverview, StageProgress};
pub use record::{ProgressRecord, SnapshotError};
