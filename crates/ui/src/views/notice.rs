use dioxus::prelude::*;

use crate::vm::{CompletionVm, NotificationVm};

#[component]
pub fn CompletionModal(completion: CompletionVm) -> Element {
    rsx! {
        div { class: "congratulations-modal",
            div { class: "modal-content",
                h2 { "🎉 Congratulations on finishing {completion.stage_name}!" }
                p { "You have read every page of this stage." }
                if let Some(next) = completion.next.as_ref() {
                    p { "Ready for the next stage?" }
                    a { class: "btn-primary", href: "{next.url}", "Continue to {next.name} →" }
                } else {
                    p { "You have completed every stage. Well done! 🎊" }
                }
                button {
                    class: "btn-secondary",
                    r#type: "button",
                    "data-action": "close-modal",
                    "Close"
                }
            }
        }
    }
}

#[component]
pub fn Notification(notification: NotificationVm) -> Element {
    let class = notification.class_name();
    let icon = notification.kind.icon();

    rsx! {
        div { class: "{class}", role: "status",
            span { class: "notification-icon", "{icon}" }
            span { class: "notification-message", "{notification.message}" }
            button {
                class: "notification-close",
                r#type: "button",
                "data-action": "close-notification",
                "×"
            }
        }
    }
}

/// Check mark appended to visited navigation links.
#[component]
pub fn VisitedBadge() -> Element {
    rsx! {
        span { class: "visited-icon", title: "Read", " ✓" }
    }
}
