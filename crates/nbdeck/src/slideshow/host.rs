use std::future::Future;

use super::error::HostError;
use super::layout::PageWrapper;
use super::visibility::NodeStyle;

/// How the host renders its cell list. `None` keeps every cell
/// materialized, which a session needs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WindowingMode {
    #[default]
    Full,
    Defer,
    None,
}

/// The narrow surface of the notebook application the slideshow drives.
pub trait Host {
    /// Ordinal of the cell the host currently has selected.
    fn active_cell(&self) -> usize;

    /// Select (and scroll to) a cell.
    fn set_active_cell(&mut self, index: usize);

    /// Hide or restore toolbars, footers and other chrome.
    fn set_chrome_hidden(&mut self, hidden: bool);

    fn windowing_mode(&self) -> WindowingMode;

    fn set_windowing_mode(&mut self, mode: WindowingMode);

    /// Build one container per page, in page order, ahead of the first cell.
    fn insert_wrappers(&mut self, wrappers: &[PageWrapper]);

    fn remove_wrapper(&mut self, page: usize) -> Result<(), HostError>;

    /// Mirror a node's presentation fields onto its cell.
    fn style_cell(&mut self, index: usize, style: &NodeStyle);

    /// Strip every slideshow class and per-cell override from a cell.
    fn clear_cell_style(&mut self, index: usize) -> Result<(), HostError>;

    /// Start or stop forwarding keyboard, command and fullscreen events.
    fn set_listening(&mut self, listening: bool);

    fn request_fullscreen(&mut self) -> impl Future<Output = Result<(), HostError>>;

    fn exit_fullscreen(&mut self);
}

/// Navigation keys the slideshow reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavKey {
    Space,
    Right,
    Left,
    Down,
    Up,
    Escape,
}

impl NavKey {
    /// Map a key name, DOM-style (`" "`, `"ArrowRight"`) or short (`"Right"`).
    pub fn from_key_name(name: &str) -> Option<Self> {
        match name {
            " " | "Space" => Some(Self::Space),
            "ArrowRight" | "Right" => Some(Self::Right),
            "ArrowLeft" | "Left" => Some(Self::Left),
            "ArrowDown" | "Down" => Some(Self::Down),
            "ArrowUp" | "Up" => Some(Self::Up),
            "Escape" | "Esc" => Some(Self::Escape),
            _ => None,
        }
    }

    pub fn is_forward(&self) -> bool {
        matches!(self, Self::Space | Self::Right | Self::Down)
    }
}

pub const RUN_CELL_AND_SELECT_NEXT: &str = "notebook:run-cell-and-select-next";
pub const MOVE_CURSOR_UP: &str = "notebook:move-cursor-up";
pub const MOVE_CURSOR_DOWN: &str = "notebook:move-cursor-down";

/// A host command whose execution the slideshow observes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostCommand {
    RunCellAndSelectNext,
    MoveCursorUp,
    MoveCursorDown,
    Other(String),
}

impl HostCommand {
    pub fn from_id(id: &str) -> Self {
        match id {
            RUN_CELL_AND_SELECT_NEXT => Self::RunCellAndSelectNext,
            MOVE_CURSOR_UP => Self::MoveCursorUp,
            MOVE_CURSOR_DOWN => Self::MoveCursorDown,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Self::RunCellAndSelectNext => RUN_CELL_AND_SELECT_NEXT,
            Self::MoveCursorUp => MOVE_CURSOR_UP,
            Self::MoveCursorDown => MOVE_CURSOR_DOWN,
            Self::Other(id) => id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostEvent {
    Key(NavKey),
    CommandExecuted(HostCommand),
    FullscreenChanged { fullscreen: bool },
}
