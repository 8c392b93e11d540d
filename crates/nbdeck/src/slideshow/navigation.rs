use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use tracing::{debug, warn};

use super::classify::{Axis, PageKind};
use super::host::{Host, HostCommand, NavKey};
use super::layout::{FragmentNode, Layout, NodeAddr, Owner, SlideNode};
use super::session::SessionState;
use super::visibility::{Level, TransitionRequest};

/// Where a session starts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StartMode {
    #[default]
    First,
    /// Resolve the host's selected cell to a page.
    Current,
}

impl StartMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::First => "first",
            Self::Current => "current",
        }
    }
}

impl FromStr for StartMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "first" => Ok(Self::First),
            "current" => Ok(Self::Current),
            other => Err(format!("Invalid start mode: {other}. Must be 'first' or 'current'.")),
        }
    }
}

impl fmt::Display for StartMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Paging position of an active session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NavigationState {
    pub page_index: usize,
    /// Page before the last transition.
    pub prev_index: usize,
    /// Ordinal of the cell the host should have selected.
    pub active_index: usize,
    presence: BTreeSet<usize>,
    floor: usize,
}

impl NavigationState {
    pub fn new(layout: &Layout) -> Self {
        Self {
            presence: layout.anchors(),
            floor: layout.page(0).map_or(0, SlideNode::index),
            ..Self::default()
        }
    }

    /// Nearest present ordinal below `from`, floored at the first page's
    /// anchor.
    pub fn step_back(&self, from: usize) -> usize {
        self.presence
            .range(..from)
            .next_back()
            .copied()
            .unwrap_or(self.floor)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub page_index: usize,
    pub active_index: usize,
}

/// Map a start request to a page. Never fails: anything unresolvable lands
/// on the first page.
pub fn resolve_start(layout: &Layout, mode: StartMode, selected: usize) -> Position {
    let first = Position {
        page_index: 0,
        active_index: layout.page(0).map_or(0, SlideNode::index),
    };
    if mode == StartMode::First {
        return first;
    }

    if let Some(page_index) = layout.page_of(selected) {
        return Position {
            page_index,
            active_index: selected,
        };
    }

    let Some(page_index) = layout.floor_page(selected) else {
        debug!(selected, "selected cell precedes every page, starting at the first");
        return first;
    };
    let Some(page) = layout.page(page_index) else {
        return first;
    };
    let active_index = match layout.owner_of(selected) {
        Some(Owner::Fragment { page: owner, fragment }) if owner == page_index => page
            .fragments
            .get(fragment)
            .map_or(page.index(), FragmentNode::index),
        _ => page.index(),
    };
    Position {
        page_index,
        active_index,
    }
}

/// What a navigation event did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Moved focus to an already visible fragment.
    Refocused,
    Revealed,
    Retracted,
    Paged,
    Unchanged,
    Exit,
}

impl SessionState {
    pub(crate) fn set_active<H: Host>(&mut self, index: usize, host: &mut H) {
        self.nav.active_index = index;
        host.set_active_cell(index);
    }

    /// Interpret one navigation key. Fragment steps take precedence over
    /// page moves.
    pub fn handle_key<H: Host>(&mut self, key: NavKey, host: &mut H) -> Outcome {
        if self.layout.page(self.nav.page_index).is_none() {
            warn!(page = self.nav.page_index, "navigation position outside layout");
            return Outcome::Unchanged;
        }
        self.nav.prev_index = self.nav.page_index;

        if key == NavKey::Escape {
            return Outcome::Exit;
        }
        let fragment_step = if key.is_forward() {
            self.step_fragment_forward(host)
        } else {
            self.step_fragment_backward(host)
        };
        if let Some(outcome) = fragment_step {
            debug!(?key, ?outcome, active = self.nav.active_index, "fragment step");
            return outcome;
        }

        let (target, reset) = match key {
            NavKey::Space => (self.next_page(), false),
            NavKey::Right => (self.next_slide(), true),
            NavKey::Down => (self.subslide_below(), true),
            NavKey::Left => (self.previous_slide(), false),
            NavKey::Up => (self.page_above(), false),
            NavKey::Escape => return Outcome::Exit,
        };
        let Some(target) = target else {
            return Outcome::Unchanged;
        };

        self.nav.page_index = target;
        if reset {
            self.reset_hidden_fragments(target, host);
        }
        self.change_page(key.is_forward(), host);
        debug!(
            ?key,
            from = self.nav.prev_index,
            to = target,
            active = self.nav.active_index,
            "page change"
        );
        Outcome::Paged
    }

    /// React to a host command the session listens for.
    pub fn handle_command<H: Host>(&mut self, command: &HostCommand, host: &mut H) -> Outcome {
        debug!(command = command.id(), "host command");
        match command {
            // Running a cell advances exactly like one forward step. The host
            // has already moved its selection, so pin it back even when the
            // step goes nowhere.
            HostCommand::RunCellAndSelectNext => {
                let outcome = self.handle_key(NavKey::Space, host);
                host.set_active_cell(self.nav.active_index);
                outcome
            }
            HostCommand::MoveCursorUp | HostCommand::MoveCursorDown => {
                host.set_active_cell(self.nav.active_index);
                Outcome::Unchanged
            }
            HostCommand::Other(_) => Outcome::Unchanged,
        }
    }

    fn step_fragment_forward<H: Host>(&mut self, host: &mut H) -> Option<Outcome> {
        let page_index = self.nav.page_index;
        let active = self.nav.active_index;
        let page = self.layout.page(page_index)?;

        let refocus = page
            .fragments
            .iter()
            .find(|f| f.is_visible() && f.index() > active)
            .map(FragmentNode::index);
        if let Some(index) = refocus {
            self.set_active(index, host);
            return Some(Outcome::Refocused);
        }

        let fragment = page.fragments.iter().position(|f| !f.is_visible())?;
        let transition = page.fragments[fragment].node.transition;
        let request = TransitionRequest {
            show: true,
            level: Level::Fragment,
            forward: true,
            transition,
            axis: transition.axis.unwrap_or(Axis::Horizontal),
        };
        self.update(
            NodeAddr::Fragment {
                page: page_index,
                fragment,
            },
            &request,
            host,
        );
        Some(Outcome::Revealed)
    }

    fn step_fragment_backward<H: Host>(&mut self, host: &mut H) -> Option<Outcome> {
        let page_index = self.nav.page_index;
        let page = self.layout.page(page_index)?;
        let fragment = page.fragments.iter().rposition(FragmentNode::is_visible)?;
        let transition = page.fragments[fragment].node.transition;
        let request = TransitionRequest {
            show: false,
            level: Level::Fragment,
            forward: false,
            transition,
            axis: transition.axis.unwrap_or(Axis::Horizontal),
        };
        self.update(
            NodeAddr::Fragment {
                page: page_index,
                fragment,
            },
            &request,
            host,
        );
        Some(Outcome::Retracted)
    }

    fn next_page(&self) -> Option<usize> {
        let page = self.nav.page_index;
        (page + 1 < self.layout.len()).then_some(page + 1)
    }

    /// Next `Slide` page, jumping over subslides. Refuses to land on a
    /// trailing subslide.
    fn next_slide(&self) -> Option<usize> {
        let pages = self.layout.pages();
        let last = pages.len().checked_sub(1)?;
        let mut next = self.nav.page_index;
        if next >= last {
            return None;
        }
        loop {
            next += 1;
            if next >= last || !pages[next].is_subslide() {
                break;
            }
        }
        if next == last && pages[next].is_subslide() {
            return None;
        }
        Some(next)
    }

    fn previous_slide(&self) -> Option<usize> {
        let pages = self.layout.pages();
        let mut prev = self.nav.page_index;
        if prev == 0 {
            return None;
        }
        loop {
            prev -= 1;
            if prev == 0 || !pages[prev].is_subslide() {
                break;
            }
        }
        Some(prev)
    }

    fn subslide_below(&self) -> Option<usize> {
        let below = self.nav.page_index + 1;
        self.layout
            .page(below)
            .filter(|p| p.is_subslide())
            .map(|_| below)
    }

    fn page_above(&self) -> Option<usize> {
        let page = self.nav.page_index;
        let current = self.layout.page(page)?;
        (page > 0 && current.kind() != PageKind::Slide).then(|| page - 1)
    }

    /// Forget the revealed state of every hidden fragment on `page`.
    fn reset_hidden_fragments<H: Host>(&mut self, page: usize, host: &mut H) {
        let hidden: Vec<usize> = self
            .layout
            .page(page)
            .map(|p| {
                p.fragments
                    .iter()
                    .enumerate()
                    .filter(|(_, f)| !f.is_visible())
                    .map(|(i, _)| i)
                    .collect()
            })
            .unwrap_or_default();
        let request = TransitionRequest::plain(false, Level::Fragment);
        for fragment in hidden {
            self.update(NodeAddr::Fragment { page, fragment }, &request, host);
        }
    }

    /// Hide the previous page and show the current one. The destination's
    /// transition animates both; the axis follows the destination going
    /// forward and the page being left going backward.
    fn change_page<H: Host>(&mut self, forward: bool, host: &mut H) {
        let (prev, next) = (self.nav.prev_index, self.nav.page_index);
        if prev == next {
            return;
        }
        let (Some(source), Some(target)) = (self.layout.page(prev), self.layout.page(next)) else {
            return;
        };
        let steering = if forward { target } else { source };
        let axis = steering
            .node
            .transition
            .axis
            .unwrap_or(match steering.kind() {
                PageKind::Subslide => Axis::Vertical,
                PageKind::Slide => Axis::Horizontal,
            });
        let hide = TransitionRequest {
            show: false,
            level: Level::Page,
            forward,
            transition: target.node.transition,
            axis,
        };
        let show = TransitionRequest { show: true, ..hide };
        self.update(NodeAddr::Page(prev), &hide, host);
        self.update(NodeAddr::Page(next), &show, host);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slideshow::classify::{CellMeta, SlideType};

    fn layout(types: &[Option<SlideType>]) -> Layout {
        let cells: Vec<CellMeta> = types.iter().map(|t| CellMeta::new(*t)).collect();
        Layout::build(&cells)
    }

    #[test]
    fn test_step_back_walks_presence() {
        use SlideType::*;
        let layout = layout(&[Some(Skip), Some(Slide), None, Some(Fragment), Some(Slide)]);
        let nav = NavigationState::new(&layout);
        assert_eq!(nav.step_back(4), 3);
        assert_eq!(nav.step_back(3), 1);
        assert_eq!(nav.step_back(1), 1);
        assert_eq!(nav.step_back(0), 1);
    }

    #[test]
    fn test_resolve_first() {
        use SlideType::*;
        let layout = layout(&[None, Some(Slide), Some(Slide)]);
        assert_eq!(
            resolve_start(&layout, StartMode::First, 2),
            Position {
                page_index: 0,
                active_index: 1
            }
        );
    }

    #[test]
    fn test_resolve_current_exact_and_floor() {
        use SlideType::*;
        let layout = layout(&[
            Some(Slide),
            None,
            Some(Fragment),
            None,
            Some(Slide),
            None,
        ]);
        let at = |selected| resolve_start(&layout, StartMode::Current, selected);
        assert_eq!(at(4), Position { page_index: 1, active_index: 4 });
        assert_eq!(at(2), Position { page_index: 0, active_index: 2 });
        // Child of a fragment resolves to the fragment.
        assert_eq!(at(3), Position { page_index: 0, active_index: 2 });
        // Child of the page itself resolves to the page.
        assert_eq!(at(1), Position { page_index: 0, active_index: 0 });
        assert_eq!(at(5), Position { page_index: 1, active_index: 4 });
        assert_eq!(at(40), Position { page_index: 1, active_index: 4 });
    }

    #[test]
    fn test_resolve_current_before_first_page_falls_back() {
        use SlideType::*;
        let layout = layout(&[Some(Skip), Some(Slide)]);
        assert_eq!(
            resolve_start(&layout, StartMode::Current, 0),
            Position {
                page_index: 0,
                active_index: 1
            }
        );
    }

    #[test]
    fn test_start_mode_parse() {
        assert_eq!("current".parse::<StartMode>(), Ok(StartMode::Current));
        assert!("middle".parse::<StartMode>().is_err());
    }
}
