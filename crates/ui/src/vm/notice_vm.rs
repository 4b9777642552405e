use services::CompletionNotice;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NextStageVm {
    pub name: String,
    pub url: String,
}

/// Congratulations modal for a finished stage.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompletionVm {
    pub stage_name: String,
    pub next: Option<NextStageVm>,
}

impl From<&CompletionNotice> for CompletionVm {
    fn from(notice: &CompletionNotice) -> Self {
        Self {
            stage_name: notice.stage_name.clone(),
            next: notice.next_stage.as_ref().map(|next| NextStageVm {
                name: next.name.clone(),
                url: next.url.clone(),
            }),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Error,
    Info,
    Warning,
}

impl NotificationKind {
    #[must_use]
    pub fn class_suffix(self) -> &'static str {
        match self {
            NotificationKind::Success => "success",
            NotificationKind::Error => "error",
            NotificationKind::Info => "info",
            NotificationKind::Warning => "warning",
        }
    }

    #[must_use]
    pub fn icon(self) -> &'static str {
        match self {
            NotificationKind::Success => "✅",
            NotificationKind::Error => "❌",
            NotificationKind::Info => "ℹ️",
            NotificationKind::Warning => "⚠️",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NotificationVm {
    pub kind: NotificationKind,
    pub message: String,
}

impl NotificationVm {
    #[must_use]
    pub fn new(kind: NotificationKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn class_name(&self) -> String {
        format!("progress-notification notification-{}", self.kind.class_suffix())
    }
}
