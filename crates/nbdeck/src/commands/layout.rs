use std::fmt::Write;
use std::path::Path;

use anyhow::Result;
use colored::Colorize;

use crate::config::Config;
use crate::notebook::Notebook;
use crate::slideshow::classify::{CellMeta, PageKind, Transition};
use crate::slideshow::layout::{self, Layout, Node};

const PREVIEW_WIDTH: usize = 48;

/// Print the slide tree of a notebook without opening a window.
pub fn run(file: &Path) -> Result<()> {
    let notebook = Notebook::load(file)?;
    let defaults = Config::load_or_default().transition_defaults();
    let cells = futures::executor::block_on(layout::snapshot(&notebook, &defaults));
    let layout = Layout::build(&cells);
    print!("{}", format_tree(&layout, &cells, &notebook));
    Ok(())
}

fn format_tree(layout: &Layout, cells: &[CellMeta], notebook: &Notebook) -> String {
    let mut out = String::new();
    if layout.is_empty() {
        let _ = writeln!(out, "{}", "No cells to present.".yellow());
        return out;
    }

    let line = |node: &Node| {
        let source = notebook
            .cells
            .get(node.index())
            .map(|c| c.source.as_str())
            .unwrap_or_default();
        format!(
            "cell {:<3} {}{}",
            node.index(),
            preview(source).dimmed(),
            transition_label(&node.transition)
        )
    };

    for (page_index, page) in layout.pages().iter().enumerate() {
        let kind = match page.kind() {
            PageKind::Slide => "slide".green().bold(),
            PageKind::Subslide => "subslide".cyan().bold(),
        };
        let _ = writeln!(out, "{:>3}. {kind:<9} {}", page_index + 1, line(&page.node));
        for child in &page.children {
            let _ = writeln!(out, "       {}", line(child));
        }
        for fragment in &page.fragments {
            let _ = writeln!(out, "     {} {}", "+".magenta(), line(&fragment.node));
            for child in &fragment.children {
                let _ = writeln!(out, "         {}", line(child));
            }
        }
    }

    if !layout.skipped().is_empty() {
        let skipped = layout
            .skipped()
            .iter()
            .map(|c| c.index.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        let _ = writeln!(out, "{} {skipped}", "skipped:".dimmed());
    }
    let _ = writeln!(
        out,
        "{} pages, {} cells",
        layout.len(),
        cells.len()
    );
    out
}

fn preview(source: &str) -> String {
    let first = source.lines().find(|l| !l.trim().is_empty()).unwrap_or("");
    let first = first.trim();
    if first.chars().count() > PREVIEW_WIDTH {
        let cut: String = first.chars().take(PREVIEW_WIDTH - 3).collect();
        format!("{cut}...")
    } else {
        first.to_string()
    }
}

fn transition_label(transition: &Transition) -> String {
    let Some(name) = transition.name else {
        return String::new();
    };
    match transition.duration {
        Some(duration) => format!("  [{name} {duration}s]"),
        None => format!("  [{name}]"),
    }
}
