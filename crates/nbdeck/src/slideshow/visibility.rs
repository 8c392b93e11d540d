//! Presentation state of slide-tree nodes and the update protocol that keeps
//! it consistent with the navigation position.
//!
//! Node styles are the source of truth for what is on screen. The host only
//! mirrors them: every change is pushed through [`Host::style_cell`].

use std::fmt;

use tracing::warn;

use super::classify::{Axis, Transition, TransitionName};
use super::host::Host;
use super::layout::{NodeAddr, Role};
use super::session::SessionState;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Visibility {
    /// No slideshow styling applied (outside a session).
    #[default]
    Unstyled,
    Shown,
    Hidden,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Motion {
    In,
    Out,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
    Up,
    Down,
}

/// The animation a node is playing, named after the CSS class a web host
/// would attach (`slide-in-left`, `fade-out`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimationClass {
    Slide(Motion, Side),
    Fade(Motion),
    Zoom(Motion),
}

impl AnimationClass {
    /// `slide` moves along `axis`: forward travels left (or up), backward
    /// right (or down). `fade` and `zoom` ignore direction and axis.
    pub fn new(name: TransitionName, motion: Motion, axis: Axis, forward: bool) -> Self {
        match name {
            TransitionName::Slide => {
                let side = match (axis, forward) {
                    (Axis::Horizontal, true) => Side::Left,
                    (Axis::Horizontal, false) => Side::Right,
                    (Axis::Vertical, true) => Side::Up,
                    (Axis::Vertical, false) => Side::Down,
                };
                Self::Slide(motion, side)
            }
            TransitionName::Fade => Self::Fade(motion),
            TransitionName::Zoom => Self::Zoom(motion),
        }
    }
}

impl fmt::Display for AnimationClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let motion = |m: Motion| match m {
            Motion::In => "in",
            Motion::Out => "out",
        };
        match *self {
            Self::Slide(m, side) => {
                let side = match side {
                    Side::Left => "left",
                    Side::Right => "right",
                    Side::Up => "up",
                    Side::Down => "down",
                };
                write!(f, "slide-{}-{side}", motion(m))
            }
            Self::Fade(m) => write!(f, "fade-{}", motion(m)),
            Self::Zoom(m) => write!(f, "zoom-{}", motion(m)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Animation {
    pub class: AnimationClass,
    /// Seconds; `None` leaves the host's default.
    pub duration: Option<f32>,
}

/// Explicit presentation fields of one node.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct NodeStyle {
    pub visibility: Visibility,
    /// Fragment has been revealed on its page. Survives the page being
    /// hidden, so returning to a page restores its revealed fragments.
    pub revealed: bool,
    pub focused: bool,
    pub animation: Option<Animation>,
    /// Per-cell override: hide the code input while presenting.
    pub hide_code: bool,
}

impl NodeStyle {
    pub fn is_visible(&self) -> bool {
        self.visibility == Visibility::Shown
    }

    fn clear_transient(&mut self) {
        self.visibility = Visibility::Unstyled;
        self.animation = None;
        self.focused = false;
    }

    pub(crate) fn reset(&mut self) {
        *self = Self::default();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Page,
    Fragment,
}

/// One show/hide step for a page or fragment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransitionRequest {
    pub show: bool,
    pub level: Level,
    pub forward: bool,
    pub transition: Transition,
    pub axis: Axis,
}

impl TransitionRequest {
    /// Unanimated show/hide, used for the initial render and resets.
    pub fn plain(show: bool, level: Level) -> Self {
        Self {
            show,
            level,
            forward: true,
            transition: Transition::default(),
            axis: Axis::Horizontal,
        }
    }

    fn animation(&self, motion: Motion) -> Option<Animation> {
        let name = self.transition.name?;
        Some(Animation {
            class: AnimationClass::new(name, motion, self.axis, self.forward),
            duration: self.transition.duration,
        })
    }
}

/// A node waiting to inherit its parent's show/hide decision.
#[derive(Debug, Clone, Copy)]
struct Pending {
    addr: NodeAddr,
    show: bool,
    animation: Option<Animation>,
}

impl SessionState {
    /// Apply `request` to the node at `target` and everything it carries.
    ///
    /// Order: the target node, then its direct children, then each fragment
    /// followed by that fragment's own children. Children only inherit.
    pub(crate) fn update<H: Host>(
        &mut self,
        target: NodeAddr,
        request: &TransitionRequest,
        host: &mut H,
    ) {
        let Some(node) = self.layout.node_mut(target) else {
            warn!(?target, "transition target not in layout");
            return;
        };

        node.style.clear_transient();
        let animation = if request.show {
            node.style.visibility = Visibility::Shown;
            node.style.focused = request.level == Level::Page;
            request.animation(Motion::In)
        } else {
            node.style.visibility = Visibility::Hidden;
            // Fragments have no exit animation; stepping back simply
            // re-hides them.
            if node.role == Role::Fragment {
                None
            } else {
                request.animation(Motion::Out)
            }
        };
        node.style.animation = animation;
        if request.level == Level::Fragment {
            node.style.revealed = request.show;
        }
        let index = node.index();
        host.style_cell(index, &node.style);

        if request.show {
            self.set_active(index, host);
        } else if !request.forward {
            let active = self.nav.step_back(index);
            self.set_active(active, host);
        }

        let mut stack = self.dependents(target, request.show, animation, request);
        while let Some(pending) = stack.pop() {
            let Some(node) = self.layout.node_mut(pending.addr) else {
                continue;
            };
            node.style.clear_transient();
            node.style.visibility = if pending.show {
                Visibility::Shown
            } else {
                Visibility::Hidden
            };
            node.style.animation = pending.animation;
            host.style_cell(node.index(), &node.style);

            if let NodeAddr::Fragment { page, fragment } = pending.addr {
                let children =
                    self.fragment_children(page, fragment, pending.show, pending.animation);
                stack.extend(children.into_iter().rev());
            }
        }
    }

    /// Direct dependents of `target`, reversed for stack processing.
    fn dependents(
        &self,
        target: NodeAddr,
        show: bool,
        animation: Option<Animation>,
        request: &TransitionRequest,
    ) -> Vec<Pending> {
        let mut items = Vec::new();
        match target {
            NodeAddr::Page(page) => {
                let Some(slide) = self.layout.page(page) else {
                    return items;
                };
                items.extend((0..slide.children.len()).map(|child| Pending {
                    addr: NodeAddr::PageChild { page, child },
                    show,
                    animation,
                }));
                for (fragment, node) in slide.fragments.iter().enumerate() {
                    let shown = show && node.node.style.revealed;
                    items.push(Pending {
                        addr: NodeAddr::Fragment { page, fragment },
                        show: shown,
                        animation: if shown {
                            request.animation(Motion::In)
                        } else {
                            None
                        },
                    });
                }
            }
            NodeAddr::Fragment { page, fragment } => {
                items = self.fragment_children(page, fragment, show, animation);
            }
            NodeAddr::PageChild { .. } | NodeAddr::FragmentChild { .. } => {}
        }
        items.reverse();
        items
    }

    fn fragment_children(
        &self,
        page: usize,
        fragment: usize,
        show: bool,
        animation: Option<Animation>,
    ) -> Vec<Pending> {
        let count = self
            .layout
            .page(page)
            .and_then(|p| p.fragments.get(fragment))
            .map_or(0, |f| f.children.len());
        (0..count)
            .map(|child| Pending {
                addr: NodeAddr::FragmentChild {
                    page,
                    fragment,
                    child,
                },
                show,
                animation,
            })
            .collect()
    }
}
