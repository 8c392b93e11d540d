use std::future::{self, Future};

use super::{Notebook, NotebookCell, SlideshowMetadata};

/// One cell as exposed by the host document.
pub trait CellSource {
    fn slideshow(&self) -> Option<&SlideshowMetadata>;

    /// Resolves once the cell is fully materialized by the host.
    fn ready(&self) -> impl Future<Output = ()>;
}

/// The host's notebook document: a readiness signal plus an ordered cell list.
pub trait DocumentSource {
    type Cell: CellSource;

    /// Resolves once the document itself has loaded.
    fn ready(&self) -> impl Future<Output = ()>;

    fn cells(&self) -> &[Self::Cell];
}

impl CellSource for NotebookCell {
    fn slideshow(&self) -> Option<&SlideshowMetadata> {
        NotebookCell::slideshow(self)
    }

    fn ready(&self) -> impl Future<Output = ()> {
        future::ready(())
    }
}

impl DocumentSource for Notebook {
    type Cell = NotebookCell;

    fn ready(&self) -> impl Future<Output = ()> {
        future::ready(())
    }

    fn cells(&self) -> &[NotebookCell] {
        &self.cells
    }
}
