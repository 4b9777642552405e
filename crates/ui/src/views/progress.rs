use dioxus::prelude::*;

use crate::vm::{OverviewVm, ProgressBarVm, StageCardVm};

#[component]
pub fn StageProgressBar(bar: ProgressBarVm) -> Element {
    rsx! {
        div { class: "progress-container", "data-stage": "{bar.stage_id}",
            div { class: "progress-label",
                span { class: "progress-title", "Reading progress" }
                span { class: "progress-percentage", "{bar.percent_label}" }
            }
            div { class: "progress-bar",
                div { class: "progress-fill", style: "width: {bar.fill_width}" }
            }
            div { class: "progress-stats",
                span { "{bar.visited} / {bar.total} pages read" }
            }
        }
    }
}

#[component]
pub fn ProgressOverviewPanel(overview: OverviewVm) -> Element {
    let cards = overview.stages.iter().map(|card| {
        let card = card.clone();
        rsx! {
            StageCard { card }
        }
    });

    rsx! {
        div { class: "progress-overview",
            h2 { "📊 Reading progress overview" }
            div { class: "overall-progress",
                div { class: "progress-label",
                    span { class: "progress-title", "Overall progress" }
                    span { class: "progress-percentage", "{overview.percent_label}" }
                }
                div { class: "progress-bar progress-bar-large",
                    div { class: "progress-fill", style: "width: {overview.fill_width}" }
                }
                div { class: "progress-stats",
                    span { "{overview.visited} / {overview.total} pages read" }
                }
            }
            h3 { "Progress by stage" }
            div { class: "stages-progress", {cards} }
        }
    }
}

#[component]
fn StageCard(card: StageCardVm) -> Element {
    let class = if card.completed {
        "stage-progress-card completed"
    } else {
        "stage-progress-card"
    };
    let icon = card.status_icon();
    let status = card.status_text();

    rsx! {
        div { class: "{class}",
            div { class: "stage-header",
                span { class: "stage-icon", "{icon}" }
                span { class: "stage-name", "{card.name}" }
                span { class: "stage-status", "{status}" }
            }
            div { class: "progress-bar",
                div { class: "progress-fill", style: "width: {card.fill_width}" }
            }
            div { class: "progress-stats",
                span { "{card.visited} / {card.total} pages" }
                span { class: "progress-percentage", "{card.percent_label}" }
            }
        }
    }
}
