#![forbid(unsafe_code)]

pub mod controller;
pub mod host;
pub mod render;
pub mod renderer;
pub mod shortcuts;
pub mod static_page;
pub mod views;
pub mod vm;

pub use controller::{ControllerAction, ImportOutcome, MAX_READING_SECONDS, ProgressController};
pub use host::{Anchor, Fragment, HostPage, NavLink};
pub use renderer::DisplayRenderer;
pub use shortcuts::Shortcut;
pub use static_page::StaticPage;
