mod notice_vm;
mod progress_vm;
mod time_fmt;

pub use notice_vm::{CompletionVm, NextStageVm, NotificationKind, NotificationVm};
pub use progress_vm::{
    DetailsVm, OverviewVm, ProgressBarVm, StageCardVm, StatsVm, map_details, map_stats,
};
pub use time_fmt::{format_datetime, format_duration, format_percent};
