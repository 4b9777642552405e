use dioxus::prelude::*;

use crate::host::NavLink;

/// Whole document of a [`crate::StaticPage`]: navigation, article and modal layer.
///
/// Fragments and badges arrive pre-rendered and are inserted as-is.
#[component]
pub fn PageShell(
    nav: Vec<NavLink>,
    heading: Option<String>,
    content: Vec<String>,
    overlays: Vec<String>,
) -> Element {
    rsx! {
        html {
            body {
                nav { class: "md-nav",
                    for link in nav.iter() {
                        a { class: link.class_name(), href: "{link.href}",
                            "{link.title}"
                            if let Some(badge) = link.badge.as_ref() {
                                span { class: "md-nav__badge", dangerous_inner_html: "{badge}" }
                            }
                        }
                    }
                }
                article { class: "md-content",
                    if let Some(title) = heading.as_ref() {
                        h1 { "{title}" }
                    }
                    for html in content.iter() {
                        div { class: "md-fragment", dangerous_inner_html: "{html}" }
                    }
                }
                for html in overlays.iter() {
                    div { class: "md-overlay", dangerous_inner_html: "{html}" }
                }
            }
        }
    }
}
