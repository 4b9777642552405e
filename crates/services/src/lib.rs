#![forbid(unsafe_code)]

pub mod error;
pub mod events;
pub mod keys;
pub mod notifier;
pub mod progress_store;
pub mod snapshot;

pub use progress_core::Clock;

pub use error::ProgressError;
pub use events::ProgressEvent;
pub use keys::StorageKeys;
pub use notifier::{AckState, CompletionNotice, CompletionNotifier};
pub use progress_store::{ProgressStore, RepairReport, VisitOutcome, VisitStatus};
pub use snapshot::{EXPORT_MIME_TYPE, ExportFile, export_file_name};
