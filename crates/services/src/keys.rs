/// Storage keys of the progress record and the completion marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageKeys {
    pub progress: String,
    pub completion_shown: String,
}

impl StorageKeys {
    pub const DEFAULT_PROGRESS: &'static str = "zephyrLearningProgress";
    pub const DEFAULT_COMPLETION_SHOWN: &'static str = "zephyrCompletionShown";

    #[must_use]
    pub fn new(progress: impl Into<String>, completion_shown: impl Into<String>) -> Self {
        Self {
            progress: progress.into(),
            completion_shown: completion_shown.into(),
        }
    }
}

impl Default for StorageKeys {
    fn default() -> Self {
        Self::new(Self::DEFAULT_PROGRESS, Self::DEFAULT_COMPLETION_SHOWN)
    }
}
