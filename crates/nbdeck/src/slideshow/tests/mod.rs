mod scenarios;

use std::collections::{BTreeSet, HashMap};
use std::future::{self, Future};

use futures::executor::block_on;

use crate::notebook::{
    CellKind, CellMetadata, Notebook, NotebookCell, NotebookMetadata, SlideshowMetadata,
};

use super::classify::{SlideType, TransitionDefaults};
use super::error::HostError;
use super::host::{Host, HostEvent, NavKey, WindowingMode};
use super::layout::PageWrapper;
use super::navigation::{Outcome, StartMode};
use super::session::Slideshow;
use super::visibility::NodeStyle;

/// In-memory host that records everything the slideshow asks of it.
#[derive(Debug, Default)]
struct MockHost {
    selected: usize,
    selections: Vec<usize>,
    chrome_hidden: bool,
    windowing: WindowingMode,
    wrappers: Vec<PageWrapper>,
    styles: HashMap<usize, NodeStyle>,
    listening: bool,
    fullscreen: bool,
    fullscreen_fails: bool,
    /// Cells the host no longer has; clearing them reports `Detached`.
    detached: BTreeSet<usize>,
}

impl MockHost {
    fn with_selection(selected: usize) -> Self {
        Self {
            selected,
            ..Self::default()
        }
    }

    fn style(&self, index: usize) -> NodeStyle {
        self.styles.get(&index).copied().unwrap_or_default()
    }

    fn is_visible(&self, index: usize) -> bool {
        self.style(index).is_visible()
    }

    fn is_restored(&self) -> bool {
        !self.chrome_hidden
            && !self.listening
            && !self.fullscreen
            && self.wrappers.is_empty()
            && self.styles.is_empty()
    }
}

impl Host for MockHost {
    fn active_cell(&self) -> usize {
        self.selected
    }

    fn set_active_cell(&mut self, index: usize) {
        self.selected = index;
        self.selections.push(index);
    }

    fn set_chrome_hidden(&mut self, hidden: bool) {
        self.chrome_hidden = hidden;
    }

    fn windowing_mode(&self) -> WindowingMode {
        self.windowing
    }

    fn set_windowing_mode(&mut self, mode: WindowingMode) {
        self.windowing = mode;
    }

    fn insert_wrappers(&mut self, wrappers: &[PageWrapper]) {
        self.wrappers = wrappers.to_vec();
    }

    fn remove_wrapper(&mut self, page: usize) -> Result<(), HostError> {
        let position = self
            .wrappers
            .iter()
            .position(|w| w.page == page)
            .ok_or(HostError::Detached {
                what: "page wrapper",
                index: page,
            })?;
        self.wrappers.remove(position);
        Ok(())
    }

    fn style_cell(&mut self, index: usize, style: &NodeStyle) {
        self.styles.insert(index, *style);
    }

    fn clear_cell_style(&mut self, index: usize) -> Result<(), HostError> {
        self.styles.remove(&index);
        if self.detached.contains(&index) {
            return Err(HostError::Detached { what: "cell", index });
        }
        Ok(())
    }

    fn set_listening(&mut self, listening: bool) {
        self.listening = listening;
    }

    fn request_fullscreen(&mut self) -> impl Future<Output = Result<(), HostError>> {
        let result = if self.fullscreen_fails {
            Err(HostError::Fullscreen("denied".to_string()))
        } else {
            self.fullscreen = true;
            Ok(())
        };
        future::ready(result)
    }

    fn exit_fullscreen(&mut self) {
        self.fullscreen = false;
    }
}

/// Notebook with one code cell per entry, tagged with the given slide type.
fn notebook(types: &[Option<SlideType>]) -> Notebook {
    let cells = types
        .iter()
        .map(|slide_type| NotebookCell {
            cell_type: CellKind::Code,
            source: String::new(),
            metadata: CellMetadata {
                slideshow: slide_type.map(|t| SlideshowMetadata {
                    slide_type: Some(t.as_str().to_string()),
                    ..SlideshowMetadata::default()
                }),
            },
            outputs: Vec::new(),
        })
        .collect();
    Notebook {
        cells,
        metadata: NotebookMetadata::default(),
        nbformat: 4,
    }
}

fn start(types: &[Option<SlideType>], mode: StartMode, host: &mut MockHost) -> Slideshow {
    let mut slideshow = Slideshow::new(TransitionDefaults::default());
    block_on(slideshow.start(mode, &notebook(types), host)).expect("slideshow starts");
    slideshow
}

fn press(slideshow: &mut Slideshow, host: &mut MockHost, key: NavKey) -> Outcome {
    slideshow.handle_event(&HostEvent::Key(key), host)
}

fn page_index(slideshow: &Slideshow) -> usize {
    slideshow.session().expect("session running").page_index()
}

fn active_index(slideshow: &Slideshow) -> usize {
    slideshow.session().expect("session running").active_index()
}
