use dioxus::prelude::*;

use crate::vm::{DetailsVm, StatsVm};

/// Id of the hidden file input the import button opens.
pub const IMPORT_INPUT_ID: &str = "progress-import-file";

/// Export, import and reset controls.
///
/// Buttons carry `data-action`; the host wires them to the controller.
#[component]
pub fn ManagementPanel() -> Element {
    rsx! {
        div { class: "progress-management",
            h3 { "📋 Manage progress" }
            div { class: "management-buttons",
                button {
                    class: "btn-action btn-export",
                    r#type: "button",
                    "data-action": "export",
                    span { class: "icon", "💾" }
                    span { class: "text", "Export progress" }
                }
                button {
                    class: "btn-action btn-import",
                    r#type: "button",
                    "data-action": "import",
                    span { class: "icon", "📥" }
                    span { class: "text", "Import progress" }
                }
                button {
                    class: "btn-action btn-reset",
                    r#type: "button",
                    "data-action": "reset",
                    span { class: "icon", "🔄" }
                    span { class: "text", "Reset progress" }
                }
            }
            input {
                id: IMPORT_INPUT_ID,
                r#type: "file",
                accept: ".json",
                style: "display: none",
            }
            div { class: "management-info",
                p { class: "info-text",
                    "Progress is kept in this browser only. Export a backup before clearing site data or switching devices."
                }
                p { class: "info-text", "Shortcuts: Ctrl/Cmd+E exports, Ctrl/Cmd+I imports." }
            }
        }
    }
}

#[component]
pub fn DetailsPanel(details: DetailsVm) -> Element {
    rsx! {
        div { class: "progress-details-panel",
            h3 { "📈 Reading statistics" }
            div { class: "details-grid",
                div { class: "detail-item",
                    div { class: "detail-label", "Total pages" }
                    div { class: "detail-value", "{details.total}" }
                }
                div { class: "detail-item",
                    div { class: "detail-label", "Read" }
                    div { class: "detail-value", "{details.visited}" }
                }
                div { class: "detail-item",
                    div { class: "detail-label", "Remaining" }
                    div { class: "detail-value", "{details.remaining}" }
                }
                div { class: "detail-item",
                    div { class: "detail-label", "Completion" }
                    div { class: "detail-value", "{details.percent_label}" }
                }
            }
            div { class: "last-visit",
                span { class: "label", "Last visit: " }
                span { class: "value", "{details.last_visit}" }
            }
            div { class: "reading-time",
                span { class: "label", "Reading time: " }
                span { class: "value", "{details.reading_time}" }
            }
        }
    }
}

#[component]
pub fn StatsCard(stats: StatsVm) -> Element {
    rsx! {
        div { class: "progress-stats-card",
            div { class: "stat-item",
                div { class: "stat-value", "{stats.visited}" }
                div { class: "stat-label", "Pages read" }
            }
            div { class: "stat-item",
                div { class: "stat-value", "{stats.completed_stages}" }
                div { class: "stat-label", "Stages completed" }
            }
            div { class: "stat-item",
                div { class: "stat-value", "{stats.percent_label}" }
                div { class: "stat-label", "Overall progress" }
            }
            div { class: "stat-item",
                div { class: "stat-value", "{stats.reading_time}" }
                div { class: "stat-label", "Reading time" }
            }
        }
    }
}
