use std::collections::BTreeSet;

use futures::future::join_all;
use tracing::trace;

use crate::notebook::{CellSource, DocumentSource};

use super::classify::{CellMeta, Classifier, Decision, PageKind, Transition, TransitionDefaults};
use super::visibility::NodeStyle;

/// Identifies one notebook cell by its ordinal in the document snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CellRef {
    pub index: usize,
}

/// The role a cell plays in the slide tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Slide,
    Subslide,
    Fragment,
    Child,
}

impl From<PageKind> for Role {
    fn from(kind: PageKind) -> Self {
        match kind {
            PageKind::Slide => Role::Slide,
            PageKind::Subslide => Role::Subslide,
        }
    }
}

/// Fields shared by every node of the slide tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub cell: CellRef,
    pub role: Role,
    pub transition: Transition,
    pub style: NodeStyle,
}

impl Node {
    fn new(index: usize, role: Role, meta: &CellMeta) -> Self {
        Self {
            cell: CellRef { index },
            role,
            transition: meta.transition,
            style: NodeStyle {
                hide_code: meta.hide_code,
                ..NodeStyle::default()
            },
        }
    }

    pub fn index(&self) -> usize {
        self.cell.index
    }
}

/// One navigable page.
#[derive(Debug, Clone, PartialEq)]
pub struct SlideNode {
    pub node: Node,
    pub fragments: Vec<FragmentNode>,
    pub children: Vec<Node>,
}

impl SlideNode {
    fn new(index: usize, kind: PageKind, meta: &CellMeta) -> Self {
        Self {
            node: Node::new(index, kind.into(), meta),
            fragments: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn index(&self) -> usize {
        self.node.index()
    }

    pub fn kind(&self) -> PageKind {
        match self.node.role {
            Role::Subslide => PageKind::Subslide,
            _ => PageKind::Slide,
        }
    }

    pub fn is_subslide(&self) -> bool {
        self.kind() == PageKind::Subslide
    }

    /// All cells of this page in document order.
    pub fn cell_indices(&self) -> Vec<usize> {
        let mut cells: Vec<usize> = std::iter::once(self.index())
            .chain(self.children.iter().map(Node::index))
            .chain(self.fragments.iter().flat_map(|f| {
                std::iter::once(f.index()).chain(f.children.iter().map(Node::index))
            }))
            .collect();
        cells.sort_unstable();
        cells
    }
}

/// A sub-step revealed within a page.
#[derive(Debug, Clone, PartialEq)]
pub struct FragmentNode {
    pub node: Node,
    pub children: Vec<Node>,
}

impl FragmentNode {
    fn new(index: usize, meta: &CellMeta) -> Self {
        Self {
            node: Node::new(index, Role::Fragment, meta),
            children: Vec::new(),
        }
    }

    pub fn index(&self) -> usize {
        self.node.index()
    }

    pub fn is_visible(&self) -> bool {
        self.node.style.is_visible()
    }
}

/// Address of a node inside a [`Layout`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeAddr {
    Page(usize),
    PageChild { page: usize, child: usize },
    Fragment { page: usize, fragment: usize },
    FragmentChild { page: usize, fragment: usize, child: usize },
}

/// Where a cell ordinal lives in the slide tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Owner {
    /// The page anchor itself, or a child attached directly to the page.
    Page(usize),
    /// A fragment anchor, or a child revealed with that fragment.
    Fragment { page: usize, fragment: usize },
}

/// Description of the container a host builds for one page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageWrapper {
    pub page: usize,
    pub kind: PageKind,
    /// Cell ordinals placed in this container, in document order.
    pub cells: Vec<usize>,
}

/// The ordered page list built once per session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Layout {
    pages: Vec<SlideNode>,
    skipped: Vec<CellRef>,
}

impl Layout {
    /// Build the slide tree from classified cells in document order.
    pub fn build(cells: &[CellMeta]) -> Self {
        let mut classifier = Classifier::default();
        let mut layout = Layout::default();

        for (index, meta) in cells.iter().enumerate() {
            let decision = classifier.classify(meta.slide_type);
            trace!(index, ?decision, "classified cell");
            match decision {
                Decision::Drop => layout.skipped.push(CellRef { index }),
                Decision::StartPage(kind) => layout.pages.push(SlideNode::new(index, kind, meta)),
                Decision::StartProvisional => {
                    layout.pages.push(SlideNode::new(index, PageKind::Slide, meta));
                }
                Decision::Adopt => {
                    let mut page = SlideNode::new(index, PageKind::Slide, meta);
                    if let Some(provisional) = layout.pages.pop() {
                        let mut anchor = provisional.node;
                        anchor.role = Role::Child;
                        page.children.push(anchor);
                        page.children.extend(provisional.children);
                    }
                    layout.pages.push(page);
                }
                Decision::AppendFragment => match layout.pages.last_mut() {
                    Some(page) => page.fragments.push(FragmentNode::new(index, meta)),
                    None => layout.pages.push(SlideNode::new(index, PageKind::Slide, meta)),
                },
                Decision::AttachChild => {
                    let child = Node::new(index, Role::Child, meta);
                    match layout.pages.last_mut() {
                        Some(page) => match page.fragments.last_mut() {
                            Some(fragment) => fragment.children.push(child),
                            None => page.children.push(child),
                        },
                        None => layout
                            .pages
                            .push(SlideNode::new(index, PageKind::Slide, meta)),
                    }
                }
            }
        }

        layout
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub fn pages(&self) -> &[SlideNode] {
        &self.pages
    }

    pub fn page(&self, index: usize) -> Option<&SlideNode> {
        self.pages.get(index)
    }

    pub(crate) fn page_mut(&mut self, index: usize) -> Option<&mut SlideNode> {
        self.pages.get_mut(index)
    }

    pub fn skipped(&self) -> &[CellRef] {
        &self.skipped
    }

    /// Ordinals that are navigation targets: page and fragment anchors.
    pub fn anchors(&self) -> BTreeSet<usize> {
        self.pages
            .iter()
            .flat_map(|p| std::iter::once(p.index()).chain(p.fragments.iter().map(|f| f.index())))
            .collect()
    }

    /// Page whose anchor, or one of whose fragment anchors, is `ordinal`.
    pub fn page_of(&self, ordinal: usize) -> Option<usize> {
        self.pages.iter().position(|p| {
            p.index() == ordinal || p.fragments.iter().any(|f| f.index() == ordinal)
        })
    }

    /// The last page anchored at or before `ordinal`.
    pub fn floor_page(&self, ordinal: usize) -> Option<usize> {
        match self.pages.iter().position(|p| p.index() > ordinal) {
            Some(0) => None,
            Some(next) => Some(next - 1),
            None if self.pages.is_empty() => None,
            None => Some(self.pages.len() - 1),
        }
    }

    /// Locate the node holding `ordinal`, whatever its role.
    pub fn owner_of(&self, ordinal: usize) -> Option<Owner> {
        self.pages.iter().enumerate().find_map(|(page_index, page)| {
            if page.index() == ordinal || page.children.iter().any(|c| c.index() == ordinal) {
                return Some(Owner::Page(page_index));
            }
            page.fragments
                .iter()
                .position(|f| {
                    f.index() == ordinal || f.children.iter().any(|c| c.index() == ordinal)
                })
                .map(|fragment| Owner::Fragment {
                    page: page_index,
                    fragment,
                })
        })
    }

    pub fn wrappers(&self) -> Vec<PageWrapper> {
        self.pages
            .iter()
            .enumerate()
            .map(|(page, node)| PageWrapper {
                page,
                kind: node.kind(),
                cells: node.cell_indices(),
            })
            .collect()
    }

    #[cfg(test)]
    pub fn node(&self, addr: NodeAddr) -> Option<&Node> {
        match addr {
            NodeAddr::Page(page) => self.pages.get(page).map(|p| &p.node),
            NodeAddr::PageChild { page, child } => self.pages.get(page)?.children.get(child),
            NodeAddr::Fragment { page, fragment } => {
                self.pages.get(page)?.fragments.get(fragment).map(|f| &f.node)
            }
            NodeAddr::FragmentChild {
                page,
                fragment,
                child,
            } => self
                .pages
                .get(page)?
                .fragments
                .get(fragment)?
                .children
                .get(child),
        }
    }

    pub(crate) fn node_mut(&mut self, addr: NodeAddr) -> Option<&mut Node> {
        match addr {
            NodeAddr::Page(page) => self.pages.get_mut(page).map(|p| &mut p.node),
            NodeAddr::PageChild { page, child } => {
                self.pages.get_mut(page)?.children.get_mut(child)
            }
            NodeAddr::Fragment { page, fragment } => self
                .pages
                .get_mut(page)?
                .fragments
                .get_mut(fragment)
                .map(|f| &mut f.node),
            NodeAddr::FragmentChild {
                page,
                fragment,
                child,
            } => self
                .pages
                .get_mut(page)?
                .fragments
                .get_mut(fragment)?
                .children
                .get_mut(child),
        }
    }

    /// Every node in tree order: page, its children, then each fragment
    /// followed by that fragment's children.
    #[cfg(test)]
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.pages.iter().flat_map(|p| {
            std::iter::once(&p.node)
                .chain(p.children.iter())
                .chain(
                    p.fragments
                        .iter()
                        .flat_map(|f| std::iter::once(&f.node).chain(f.children.iter())),
                )
        })
    }

    /// Drop every presentation field back to its unstyled state.
    pub(crate) fn reset_styles(&mut self) {
        for page in &mut self.pages {
            page.node.style.reset();
            for child in &mut page.children {
                child.style.reset();
            }
            for fragment in &mut page.fragments {
                fragment.node.style.reset();
                for child in &mut fragment.children {
                    child.style.reset();
                }
            }
        }
    }
}

/// Wait for the document and each of its cells to report ready, then take
/// the classification snapshot. The snapshot is never re-read during a
/// session.
pub async fn snapshot<D: DocumentSource>(doc: &D, defaults: &TransitionDefaults) -> Vec<CellMeta> {
    doc.ready().await;
    let cells = doc.cells();
    join_all(cells.iter().map(|cell| cell.ready())).await;
    cells
        .iter()
        .map(|cell| CellMeta::from_metadata(cell.slideshow(), defaults))
        .collect()
}
