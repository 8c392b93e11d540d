use tracing::warn;

use crate::notebook::DocumentSource;

use super::error::SlideshowError;
use super::host::Host;
use super::navigation::StartMode;
use super::session::Slideshow;

/// The commands the slideshow registers with the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlideshowCommand {
    ViewFirst,
    ViewCurrent,
    Exit,
}

impl SlideshowCommand {
    pub const ALL: [SlideshowCommand; 3] = [Self::ViewFirst, Self::ViewCurrent, Self::Exit];

    pub fn id(&self) -> &'static str {
        match self {
            Self::ViewFirst => "slideshow:view-first",
            Self::ViewCurrent => "slideshow:view-current",
            Self::Exit => "slideshow:exit",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::ViewFirst => "Start from first cell",
            Self::ViewCurrent => "Start from current cell",
            Self::Exit => "Exit slideshow",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.id() == id)
    }

    /// Start commands need an idle slideshow; exit needs a running one.
    pub fn is_enabled(&self, active: bool) -> bool {
        match self {
            Self::ViewFirst | Self::ViewCurrent => !active,
            Self::Exit => active,
        }
    }
}

impl Slideshow {
    /// Run a command the way the host's command palette would. Failures are
    /// logged and leave the host as it was.
    pub async fn execute<D, H>(&mut self, command: SlideshowCommand, doc: Option<&D>, host: &mut H)
    where
        D: DocumentSource,
        H: Host,
    {
        let result = match command {
            SlideshowCommand::ViewFirst => self.start_with(StartMode::First, doc, host).await,
            SlideshowCommand::ViewCurrent => self.start_with(StartMode::Current, doc, host).await,
            SlideshowCommand::Exit if !self.is_active() => Err(SlideshowError::NotActive),
            SlideshowCommand::Exit => {
                self.exit(host);
                Ok(())
            }
        };
        if let Err(err) = result {
            warn!(command = command.id(), %err, "command did nothing");
        }
    }

    async fn start_with<D, H>(
        &mut self,
        mode: StartMode,
        doc: Option<&D>,
        host: &mut H,
    ) -> Result<(), SlideshowError>
    where
        D: DocumentSource,
        H: Host,
    {
        if self.is_active() {
            return Err(SlideshowError::AlreadyActive);
        }
        let doc = doc.ok_or(SlideshowError::NoDocument)?;
        self.start(mode, doc, host).await
    }
}
