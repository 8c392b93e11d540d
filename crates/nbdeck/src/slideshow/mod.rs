//! Notebook cells to animated slides: classification, the slide tree, the
//! paging state machine and the visibility protocol that drives a host.

pub mod classify;
pub mod commands;
pub mod error;
pub mod host;
pub mod layout;
pub mod navigation;
pub mod session;
pub mod visibility;

#[cfg(test)]
mod tests;

pub use classify::{TransitionDefaults, TransitionName};
pub use commands::SlideshowCommand;
pub use error::HostError;
pub use host::{Host, HostCommand, HostEvent, NavKey, WindowingMode};
pub use layout::PageWrapper;
pub use navigation::StartMode;
pub use session::Slideshow;
pub use visibility::{Animation, AnimationClass, Motion, NodeStyle, Side};
