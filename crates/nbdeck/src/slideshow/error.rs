use thiserror::Error;

/// Failures reported by a host while the slideshow restyles it.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum HostError {
    /// The host already removed the node (a page wrapper or a cell).
    #[error("{what} {index} is no longer attached")]
    Detached { what: &'static str, index: usize },

    #[error("fullscreen request failed: {0}")]
    Fullscreen(String),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SlideshowError {
    #[error("a slideshow is already running")]
    AlreadyActive,

    #[error("no slideshow is running")]
    NotActive,

    #[error("no notebook is open")]
    NoDocument,

    #[error("the notebook has no cells to present")]
    EmptyLayout,

    #[error(transparent)]
    Host(#[from] HostError),
}
