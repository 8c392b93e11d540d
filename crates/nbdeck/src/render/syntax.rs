use std::sync::OnceLock;

use eframe::egui::{self, Color32, FontFamily, FontId};
use syntect::easy::HighlightLines;
use syntect::highlighting::{Style, ThemeSet};
use syntect::parsing::SyntaxSet;
use syntect::util::LinesWithEndings;
use tracing::debug;

use crate::theme::Theme;

/// A run of source text with its highlight color. `None` uses the theme's
/// code foreground.
#[derive(Debug, Clone, PartialEq)]
pub struct Span {
    pub text: String,
    pub color: Option<Color32>,
}

fn syntax_set() -> &'static SyntaxSet {
    static SET: OnceLock<SyntaxSet> = OnceLock::new();
    SET.get_or_init(SyntaxSet::load_defaults_newlines)
}

fn theme_set() -> &'static ThemeSet {
    static SET: OnceLock<ThemeSet> = OnceLock::new();
    SET.get_or_init(ThemeSet::load_defaults)
}

fn plain(code: &str) -> Vec<Span> {
    vec![Span {
        text: code.to_string(),
        color: None,
    }]
}

fn to_color(style: Style) -> Color32 {
    let c = style.foreground;
    Color32::from_rgb(c.r, c.g, c.b)
}

/// Split `code` into colored spans using the syntect theme `theme_name`.
/// Unknown languages and themes degrade to plain text.
pub fn highlight(code: &str, language: &str, theme_name: &str) -> Vec<Span> {
    let syntaxes = syntax_set();
    let syntax = syntaxes
        .find_syntax_by_token(language)
        .unwrap_or_else(|| syntaxes.find_syntax_plain_text());
    let Some(theme) = theme_set().themes.get(theme_name) else {
        debug!(theme = theme_name, "unknown syntax theme");
        return plain(code);
    };

    let mut highlighter = HighlightLines::new(syntax, theme);
    let mut spans = Vec::new();
    for line in LinesWithEndings::from(code) {
        match highlighter.highlight_line(line, syntaxes) {
            Ok(ranges) => spans.extend(ranges.into_iter().map(|(style, text)| Span {
                text: text.to_string(),
                color: Some(to_color(style)),
            })),
            Err(err) => {
                debug!(%err, "highlighting failed, using plain text");
                spans.push(Span {
                    text: line.to_string(),
                    color: None,
                });
            }
        }
    }
    spans
}

/// Build a monospace layout job from highlighted spans.
pub fn code_job(
    spans: &[Span],
    font_size: f32,
    theme: &Theme,
    opacity: f32,
    max_width: f32,
) -> egui::text::LayoutJob {
    let mut job = egui::text::LayoutJob::default();
    job.wrap.max_width = max_width;
    let fallback = theme.code_foreground;
    for span in spans {
        let format = egui::text::TextFormat {
            font_id: FontId::new(font_size, FontFamily::Monospace),
            color: Theme::with_opacity(span.color.unwrap_or(fallback), opacity),
            ..Default::default()
        };
        job.append(&span.text, 0.0, format);
    }
    job
}
