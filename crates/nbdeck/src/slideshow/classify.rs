use std::fmt;

use tracing::debug;

use crate::notebook::SlideshowMetadata;

/// The `slide_type` a cell carries in its slideshow metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlideType {
    Slide,
    Subslide,
    Fragment,
    Notes,
    Skip,
}

impl SlideType {
    /// Parse a metadata value. Unknown values (including nbconvert's `-`)
    /// mean "no type".
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "slide" => Some(Self::Slide),
            "subslide" => Some(Self::Subslide),
            "fragment" => Some(Self::Fragment),
            "notes" => Some(Self::Notes),
            "skip" => Some(Self::Skip),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Slide => "slide",
            Self::Subslide => "subslide",
            Self::Fragment => "fragment",
            Self::Notes => "notes",
            Self::Skip => "skip",
        }
    }
}

impl fmt::Display for SlideType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionName {
    Slide,
    Fade,
    Zoom,
}

impl TransitionName {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "slide" => Some(Self::Slide),
            "fade" => Some(Self::Fade),
            "zoom" => Some(Self::Zoom),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Slide => "slide",
            Self::Fade => "fade",
            Self::Zoom => "zoom",
        }
    }
}

impl fmt::Display for TransitionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Horizontal,
    Vertical,
}

impl Axis {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "horizontal" | "h" | "x" => Some(Self::Horizontal),
            "vertical" | "v" | "y" => Some(Self::Vertical),
            _ => None,
        }
    }
}

/// Per-cell transition descriptor. Every field is optional.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Transition {
    pub name: Option<TransitionName>,
    /// Seconds.
    pub duration: Option<f32>,
    pub axis: Option<Axis>,
}

/// Fallbacks for cells that do not name their own transition.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TransitionDefaults {
    pub name: Option<TransitionName>,
    pub duration: Option<f32>,
}

/// Everything classification needs to know about one cell.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CellMeta {
    pub slide_type: Option<SlideType>,
    pub transition: Transition,
    pub hide_code: bool,
}

impl CellMeta {
    #[cfg(test)]
    pub fn new(slide_type: Option<SlideType>) -> Self {
        Self {
            slide_type,
            ..Self::default()
        }
    }

    pub fn from_metadata(meta: Option<&SlideshowMetadata>, defaults: &TransitionDefaults) -> Self {
        let Some(meta) = meta else {
            return Self {
                transition: Transition {
                    name: defaults.name,
                    duration: defaults.duration,
                    axis: None,
                },
                ..Self::default()
            };
        };

        let slide_type = meta.slide_type.as_deref().and_then(|raw| {
            let parsed = SlideType::parse(raw);
            if parsed.is_none() {
                debug!(value = raw, "unrecognized slide_type, treating cell as untyped");
            }
            parsed
        });
        let name = match meta.transition.as_deref() {
            Some(raw) => TransitionName::parse(raw),
            None => defaults.name,
        };

        Self {
            slide_type,
            transition: Transition {
                name,
                duration: meta.transition_duration.or(defaults.duration),
                axis: meta.slide_dir.as_deref().and_then(Axis::parse),
            },
            hide_code: meta.hide_code.unwrap_or(false),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageKind {
    Slide,
    Subslide,
}

/// What the layout builder does with one cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Start a new page anchored at this cell.
    StartPage(PageKind),
    /// Start a page for a leading untyped cell. It stays provisional until
    /// the first typed cell arrives.
    StartProvisional,
    /// Anchor a new `Slide` at this cell and fold the provisional page into
    /// it as leading children.
    Adopt,
    AppendFragment,
    AttachChild,
    Drop,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum Progress {
    #[default]
    Empty,
    Provisional,
    Started,
}

/// Single forward pass over the cells; each decision depends only on the
/// decisions made before it.
///
/// `notes` cells are attached exactly like untyped cells: speaker notes have
/// no separate affordance, so they ride along with the page or fragment
/// they follow.
#[derive(Debug, Default)]
pub struct Classifier {
    progress: Progress,
}

impl Classifier {
    pub fn classify(&mut self, slide_type: Option<SlideType>) -> Decision {
        use SlideType::{Fragment, Notes, Skip, Slide, Subslide};

        let decision = match (self.progress, slide_type) {
            (_, Some(Skip)) => Decision::Drop,

            (Progress::Empty, Some(Slide | Subslide | Fragment)) => {
                Decision::StartPage(PageKind::Slide)
            }
            (Progress::Provisional, Some(Slide | Subslide | Fragment)) => Decision::Adopt,
            (Progress::Started, Some(Slide)) => Decision::StartPage(PageKind::Slide),
            (Progress::Started, Some(Subslide)) => Decision::StartPage(PageKind::Subslide),
            (Progress::Started, Some(Fragment)) => Decision::AppendFragment,

            (Progress::Empty, Some(Notes) | None) => Decision::StartProvisional,
            (_, Some(Notes) | None) => Decision::AttachChild,
        };

        self.progress = match decision {
            Decision::StartPage(_) | Decision::Adopt => Progress::Started,
            Decision::StartProvisional => Progress::Provisional,
            _ => self.progress,
        };
        decision
    }
}
