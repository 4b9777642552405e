mod management;
mod notice;
mod progress;
mod shell;

#[cfg(test)]
mod view_smoke;

pub use management::{
    DetailsPanel, DetailsPanelProps, IMPORT_INPUT_ID, ManagementPanel, StatsCard, StatsCardProps,
};
pub use notice::{
    CompletionModal, CompletionModalProps, Notification, NotificationProps, VisitedBadge,
};
pub use progress::{
    ProgressOverviewPanel, ProgressOverviewPanelProps, StageProgressBar, StageProgressBarProps,
};
pub use shell::{PageShell, PageShellProps};
