pub mod document;

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

pub use document::{CellSource, DocumentSource};

/// An nbformat v4 notebook, reduced to what the viewer and the slideshow read.
#[derive(Debug, Clone, Deserialize)]
pub struct Notebook {
    pub cells: Vec<NotebookCell>,
    #[serde(default)]
    pub metadata: NotebookMetadata,
    #[serde(default)]
    pub nbformat: u32,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NotebookMetadata {
    #[serde(default)]
    pub kernelspec: Option<KernelSpec>,
    #[serde(default)]
    pub language_info: Option<LanguageInfo>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct KernelSpec {
    #[serde(default)]
    pub language: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LanguageInfo {
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NotebookCell {
    pub cell_type: CellKind,
    #[serde(default, deserialize_with = "multiline")]
    pub source: String,
    #[serde(default)]
    pub metadata: CellMetadata,
    #[serde(default)]
    pub outputs: Vec<Output>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CellKind {
    Markdown,
    Code,
    Raw,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CellMetadata {
    #[serde(default)]
    pub slideshow: Option<SlideshowMetadata>,
}

/// The `slideshow` metadata group as written by Jupyter and RISE-style tools.
///
/// Values are kept as raw strings; interpretation happens during
/// classification so that unknown values degrade to "no type" instead of
/// failing the whole document.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SlideshowMetadata {
    #[serde(default)]
    pub slide_type: Option<String>,
    #[serde(default)]
    pub transition: Option<String>,
    #[serde(default, deserialize_with = "seconds")]
    pub transition_duration: Option<f32>,
    #[serde(default)]
    pub slide_dir: Option<String>,
    #[serde(default)]
    pub hide_code: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "output_type", rename_all = "snake_case")]
pub enum Output {
    Stream {
        #[serde(default)]
        name: String,
        #[serde(default, deserialize_with = "multiline")]
        text: String,
    },
    ExecuteResult {
        #[serde(default)]
        data: Map<String, Value>,
    },
    DisplayData {
        #[serde(default)]
        data: Map<String, Value>,
    },
    Error {
        #[serde(default)]
        ename: String,
        #[serde(default)]
        evalue: String,
    },
}

impl Output {
    /// Plain-text rendition of this output, as shown under a code cell.
    pub fn text(&self) -> String {
        match self {
            Self::Stream { text, .. } => text.clone(),
            Self::ExecuteResult { data } | Self::DisplayData { data } => {
                match data.get("text/plain") {
                    Some(Value::String(s)) => s.clone(),
                    Some(Value::Array(lines)) => lines
                        .iter()
                        .filter_map(Value::as_str)
                        .collect::<Vec<_>>()
                        .concat(),
                    _ => {
                        let kinds: Vec<&str> = data.keys().map(String::as_str).collect();
                        format!("[{}]", kinds.join(", "))
                    }
                }
            }
            Self::Error { ename, evalue } => format!("{ename}: {evalue}"),
        }
    }

    pub fn is_error(&self) -> bool {
        match self {
            Self::Error { .. } => true,
            Self::Stream { name, .. } => name == "stderr",
            _ => false,
        }
    }
}

impl NotebookCell {
    pub fn slideshow(&self) -> Option<&SlideshowMetadata> {
        self.metadata.slideshow.as_ref()
    }

    pub fn is_code(&self) -> bool {
        self.cell_type == CellKind::Code
    }
}

impl Notebook {
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::parse(&contents).with_context(|| format!("Failed to parse {}", path.display()))
    }

    pub fn parse(contents: &str) -> Result<Self> {
        let notebook: Notebook = serde_json::from_str(contents)?;
        if notebook.nbformat != 0 && notebook.nbformat < 4 {
            anyhow::bail!(
                "Unsupported notebook format v{}. Only nbformat 4 is supported.",
                notebook.nbformat
            );
        }
        Ok(notebook)
    }

    /// Language name used to pick a syntax for code cells.
    pub fn language(&self) -> &str {
        self.metadata
            .language_info
            .as_ref()
            .and_then(|l| l.name.as_deref())
            .or_else(|| {
                self.metadata
                    .kernelspec
                    .as_ref()
                    .and_then(|k| k.language.as_deref())
            })
            .unwrap_or("python")
    }
}

/// nbformat stores multiline text either as one string or as a list of lines.
fn multiline<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Multiline {
        One(String),
        Many(Vec<String>),
        Null(()),
    }

    Ok(match Multiline::deserialize(deserializer)? {
        Multiline::One(s) => s,
        Multiline::Many(lines) => lines.concat(),
        Multiline::Null(()) => String::new(),
    })
}

/// Durations show up as numbers or numeric strings; anything else is ignored.
fn seconds<'de, D>(deserializer: D) -> Result<Option<f32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Number(n)) => n.as_f64().map(|n| n as f32),
        Some(Value::String(s)) => s.trim().trim_end_matches('s').parse::<f32>().ok(),
        _ => None,
    };
    Ok(value.filter(|d| d.is_finite() && *d >= 0.0))
}
