use tracing::{debug, info, warn};

use crate::notebook::DocumentSource;

use super::classify::TransitionDefaults;
use super::error::SlideshowError;
use super::host::{Host, HostEvent, WindowingMode};
use super::layout::{self, Layout, NodeAddr};
use super::navigation::{NavigationState, Outcome, Position, StartMode, resolve_start};
use super::visibility::{Level, TransitionRequest};

/// Everything one slideshow session owns. Dropping it ends the session.
#[derive(Debug, Clone)]
pub struct SessionState {
    pub(crate) layout: Layout,
    pub(crate) nav: NavigationState,
    /// Cells in the snapshot, including skipped ones.
    pub(crate) cell_count: usize,
    pub(crate) saved_windowing: WindowingMode,
}

impl SessionState {
    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn page_index(&self) -> usize {
        self.nav.page_index
    }

    pub fn active_index(&self) -> usize {
        self.nav.active_index
    }

    /// Style the whole layout so only the resolved page is shown, with the
    /// fragments up to the resolved cell revealed.
    fn render_initial<H: Host>(&mut self, position: Position, host: &mut H) {
        if let Some(page) = self.layout.page_mut(position.page_index) {
            for fragment in &mut page.fragments {
                fragment.node.style.revealed = fragment.node.index() <= position.active_index;
            }
        }
        for page in 0..self.layout.len() {
            let request = TransitionRequest::plain(page == position.page_index, Level::Page);
            self.update(NodeAddr::Page(page), &request, host);
        }
        self.nav.page_index = position.page_index;
        self.nav.prev_index = position.page_index;
        self.set_active(position.active_index, host);
    }
}

/// Start/stop orchestration. At most one session exists at a time.
#[derive(Debug, Default)]
pub struct Slideshow {
    session: Option<SessionState>,
    defaults: TransitionDefaults,
}

impl Slideshow {
    pub fn new(defaults: TransitionDefaults) -> Self {
        Self {
            session: None,
            defaults,
        }
    }

    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    pub fn session(&self) -> Option<&SessionState> {
        self.session.as_ref()
    }

    /// Enter presentation mode over `doc`.
    pub async fn start<D, H>(
        &mut self,
        mode: StartMode,
        doc: &D,
        host: &mut H,
    ) -> Result<(), SlideshowError>
    where
        D: DocumentSource,
        H: Host,
    {
        if self.is_active() {
            return Err(SlideshowError::AlreadyActive);
        }

        let saved_windowing = host.windowing_mode();
        host.set_chrome_hidden(true);
        host.set_windowing_mode(WindowingMode::None);

        let cells = layout::snapshot(doc, &self.defaults).await;
        let layout = Layout::build(&cells);
        if layout.is_empty() {
            host.set_windowing_mode(saved_windowing);
            host.set_chrome_hidden(false);
            return Err(SlideshowError::EmptyLayout);
        }

        let position = resolve_start(&layout, mode, host.active_cell());
        host.insert_wrappers(&layout.wrappers());

        let mut session = SessionState {
            nav: NavigationState::new(&layout),
            layout,
            cell_count: cells.len(),
            saved_windowing,
        };
        session.render_initial(position, host);
        info!(
            %mode,
            pages = session.layout.len(),
            page = position.page_index,
            active = position.active_index,
            "slideshow started"
        );
        self.session = Some(session);

        host.set_listening(true);
        if let Err(err) = host.request_fullscreen().await {
            warn!(%err, "continuing without fullscreen");
        }
        Ok(())
    }

    /// Route one host event into the running session.
    pub fn handle_event<H: Host>(&mut self, event: &HostEvent, host: &mut H) -> Outcome {
        let Some(session) = self.session.as_mut() else {
            debug!(?event, "event ignored, no active slideshow");
            return Outcome::Unchanged;
        };
        let outcome = match event {
            HostEvent::Key(key) => session.handle_key(*key, host),
            HostEvent::CommandExecuted(command) => session.handle_command(command, host),
            HostEvent::FullscreenChanged { fullscreen: true } => Outcome::Unchanged,
            HostEvent::FullscreenChanged { fullscreen: false } => Outcome::Exit,
        };
        if outcome == Outcome::Exit {
            self.exit(host);
        }
        outcome
    }

    /// Leave presentation mode, undoing every change `start` made. Safe to
    /// call at any time, including twice.
    pub fn exit<H: Host>(&mut self, host: &mut H) {
        let Some(mut session) = self.session.take() else {
            debug!("exit requested with no active slideshow");
            return;
        };

        host.set_listening(false);
        for index in 0..session.cell_count {
            if let Err(err) = host.clear_cell_style(index) {
                debug!(%err, "skipping cell during teardown");
            }
        }
        session.layout.reset_styles();
        for page in 0..session.layout.len() {
            if let Err(err) = host.remove_wrapper(page) {
                debug!(%err, "skipping page wrapper during teardown");
            }
        }
        host.set_chrome_hidden(false);
        host.set_windowing_mode(session.saved_windowing);
        host.exit_fullscreen();
        info!(page = session.nav.page_index, "slideshow exited");
    }
}
