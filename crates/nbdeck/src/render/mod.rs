pub mod syntax;

use std::sync::Arc;

use eframe::egui::{self, Color32, FontFamily, FontId, Galley, Pos2, Rect, Vec2};

use crate::notebook::{CellKind, NotebookCell};
use crate::slideshow::{Animation, AnimationClass, Motion, Side};
use crate::theme::Theme;

use syntax::Span;

/// Seconds an animation runs when its cell names no duration.
pub const DEFAULT_DURATION: f32 = 0.5;

/// Drawing parameters for one cell.
pub struct CellOptions<'a> {
    pub theme: &'a Theme,
    /// Highlighted source of a code cell; `None` draws it unhighlighted.
    pub spans: Option<&'a [Span]>,
    pub opacity: f32,
    pub scale: f32,
    pub hide_code: bool,
}

enum Piece {
    Text {
        galley: Arc<Galley>,
        offset: Vec2,
        color: Color32,
    },
    Panel {
        rect: Rect,
        color: Color32,
    },
}

/// A cell laid out at a given width, ready to paint anywhere.
pub struct CellView {
    pieces: Vec<Piece>,
    pub height: f32,
}

impl CellView {
    pub fn layout(
        painter: &egui::Painter,
        cell: &NotebookCell,
        opts: &CellOptions<'_>,
        width: f32,
    ) -> Self {
        let mut view = CellView {
            pieces: Vec::new(),
            height: 0.0,
        };
        match cell.cell_type {
            CellKind::Markdown => view.markdown(painter, &cell.source, opts, width),
            CellKind::Code => view.code(painter, cell, opts, width),
            CellKind::Raw => {
                let color = Theme::with_opacity(opts.theme.muted, opts.opacity);
                let size = opts.theme.code_size * opts.scale;
                view.text(painter, &cell.source, FontFamily::Monospace, size, color, width);
            }
        }
        view
    }

    pub fn paint(&self, painter: &egui::Painter, origin: Pos2, scale: f32) {
        for piece in &self.pieces {
            match piece {
                Piece::Panel { rect, color } => {
                    painter.rect_filled(rect.translate(origin.to_vec2()), 6.0 * scale, *color);
                }
                Piece::Text {
                    galley,
                    offset,
                    color,
                } => painter.galley(origin + *offset, galley.clone(), *color),
            }
        }
    }

    fn text(
        &mut self,
        painter: &egui::Painter,
        text: &str,
        family: FontFamily,
        size: f32,
        color: Color32,
        width: f32,
    ) {
        let mut job = egui::text::LayoutJob::default();
        job.wrap.max_width = width;
        job.append(
            text,
            0.0,
            egui::text::TextFormat {
                font_id: FontId::new(size, family),
                color,
                ..Default::default()
            },
        );
        self.push_job(painter, job, color, Vec2::new(0.0, self.height));
    }

    fn push_job(
        &mut self,
        painter: &egui::Painter,
        job: egui::text::LayoutJob,
        color: Color32,
        offset: Vec2,
    ) -> f32 {
        let galley = painter.layout_job(job);
        let height = galley.rect.height();
        self.pieces.push(Piece::Text {
            galley,
            offset,
            color,
        });
        self.height = self.height.max(offset.y + height);
        height
    }

    fn markdown(
        &mut self,
        painter: &egui::Painter,
        source: &str,
        opts: &CellOptions<'_>,
        width: f32,
    ) {
        let theme = opts.theme;
        let scale = opts.scale;
        let body = Theme::with_opacity(theme.foreground, opts.opacity);
        let heading = Theme::with_opacity(theme.heading_color, opts.opacity);
        let gap = theme.body_size * 0.4 * scale;

        let mut fence: Option<String> = None;
        for line in source.lines() {
            if line.trim_start().starts_with("```") {
                match fence.take() {
                    Some(code) => self.panel_text(painter, &code, opts, width),
                    None => fence = Some(String::new()),
                }
                continue;
            }
            if let Some(code) = fence.as_mut() {
                code.push_str(line);
                code.push('\n');
                continue;
            }

            let line = line.trim_end();
            if line.is_empty() {
                self.height += gap;
                continue;
            }
            let level = line.chars().take_while(|c| *c == '#').count();
            if (1..=6).contains(&level) && line[level..].starts_with(' ') {
                let size = theme.heading_size(level) * scale;
                let text = line[level..].trim();
                self.text(painter, text, FontFamily::Proportional, size, heading, width);
                self.height += gap;
            } else if let Some(item) = ["- ", "* ", "+ "]
                .iter()
                .find_map(|marker| line.trim_start().strip_prefix(marker))
            {
                let indent = (line.len() - line.trim_start().len()) as f32 * 8.0 * scale;
                let start = self.height;
                let bullet = format!("\u{2022}  {item}");
                let mut job = egui::text::LayoutJob::default();
                job.wrap.max_width = width - indent;
                job.append(
                    &bullet,
                    0.0,
                    egui::text::TextFormat {
                        font_id: FontId::new(theme.body_size * scale, FontFamily::Proportional),
                        color: body,
                        ..Default::default()
                    },
                );
                self.push_job(painter, job, body, Vec2::new(indent, start));
            } else {
                let size = theme.body_size * scale;
                self.text(painter, line, FontFamily::Proportional, size, body, width);
            }
        }
        if let Some(code) = fence {
            self.panel_text(painter, &code, opts, width);
        }
    }

    fn code(
        &mut self,
        painter: &egui::Painter,
        cell: &NotebookCell,
        opts: &CellOptions<'_>,
        width: f32,
    ) {
        let theme = opts.theme;
        let scale = opts.scale;
        let padding = 12.0 * scale;

        if !opts.hide_code {
            let owned;
            let spans = match opts.spans {
                Some(spans) => spans,
                None => {
                    owned = vec![Span {
                        text: cell.source.clone(),
                        color: None,
                    }];
                    &owned[..]
                }
            };
            let job = syntax::code_job(
                spans,
                theme.code_size * scale,
                theme,
                opts.opacity,
                width - padding * 2.0,
            );
            self.panel(painter, job, opts, width);
        }

        for output in &cell.outputs {
            let text = output.text();
            if text.trim().is_empty() {
                continue;
            }
            let color = if output.is_error() {
                theme.error_foreground
            } else {
                theme.output_foreground
            };
            self.height += padding * 0.5;
            let color = Theme::with_opacity(color, opts.opacity);
            self.text(
                painter,
                text.trim_end(),
                FontFamily::Monospace,
                theme.code_size * scale,
                color,
                width,
            );
        }
    }

    fn panel_text(
        &mut self,
        painter: &egui::Painter,
        code: &str,
        opts: &CellOptions<'_>,
        width: f32,
    ) {
        let spans = [Span {
            text: code.trim_end().to_string(),
            color: None,
        }];
        let padding = 12.0 * opts.scale;
        let job = syntax::code_job(
            &spans,
            opts.theme.code_size * opts.scale,
            opts.theme,
            opts.opacity,
            width - padding * 2.0,
        );
        self.panel(painter, job, opts, width);
    }

    /// Code on a filled background.
    fn panel(
        &mut self,
        painter: &egui::Painter,
        job: egui::text::LayoutJob,
        opts: &CellOptions<'_>,
        width: f32,
    ) {
        let padding = 12.0 * opts.scale;
        let top = self.height;
        let panel_index = self.pieces.len();
        self.pieces.push(Piece::Panel {
            rect: Rect::NOTHING,
            color: Theme::with_opacity(opts.theme.code_background, opts.opacity),
        });
        let fallback = Theme::with_opacity(opts.theme.code_foreground, opts.opacity);
        let height = self.push_job(painter, job, fallback, Vec2::new(padding, top + padding));
        let rect = Rect::from_min_size(
            Pos2::new(0.0, top),
            Vec2::new(width, height + padding * 2.0),
        );
        if let Some(Piece::Panel { rect: slot, .. }) = self.pieces.get_mut(panel_index) {
            *slot = rect;
        }
        self.height = top + rect.height();
    }
}

/// Where an animated cell sits relative to its resting place.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    /// Fraction of the page size.
    pub offset: Vec2,
    pub opacity: f32,
    pub scale: f32,
}

impl Pose {
    pub const REST: Pose = Pose {
        offset: Vec2::ZERO,
        opacity: 1.0,
        scale: 1.0,
    };
}

fn progress(animation: &Animation, elapsed: f32) -> f32 {
    let duration = animation.duration.unwrap_or(DEFAULT_DURATION);
    if duration <= 0.0 {
        return 1.0;
    }
    let t = (elapsed / duration).clamp(0.0, 1.0);
    1.0 - (1.0 - t).powi(3)
}

pub fn is_running(animation: &Animation, elapsed: f32) -> bool {
    progress(animation, elapsed) < 1.0
}

/// Pose of a cell `elapsed` seconds into `animation`.
pub fn pose(animation: &Animation, elapsed: f32) -> Pose {
    let t = progress(animation, elapsed);
    let mut pose = Pose::REST;
    match animation.class {
        AnimationClass::Slide(motion, side) => {
            let travel = match motion {
                Motion::In => 1.0 - t,
                Motion::Out => -t,
            };
            pose.offset = match side {
                Side::Left => Vec2::new(travel, 0.0),
                Side::Right => Vec2::new(-travel, 0.0),
                Side::Up => Vec2::new(0.0, travel),
                Side::Down => Vec2::new(0.0, -travel),
            };
        }
        AnimationClass::Fade(Motion::In) => pose.opacity = t,
        AnimationClass::Fade(Motion::Out) => pose.opacity = 1.0 - t,
        AnimationClass::Zoom(Motion::In) => {
            pose.opacity = t;
            pose.scale = 0.5 + 0.5 * t;
        }
        AnimationClass::Zoom(Motion::Out) => {
            pose.opacity = 1.0 - t;
            pose.scale = 1.0 + 0.5 * t;
        }
    }
    pose
}

#[cfg(test)]
mod tests {
    use super::*;

    fn animation(class: AnimationClass) -> Animation {
        Animation {
            class,
            duration: Some(1.0),
        }
    }

    #[test]
    fn test_slide_in_left_enters_from_the_right() {
        let a = animation(AnimationClass::Slide(Motion::In, Side::Left));
        assert_eq!(pose(&a, 0.0).offset, Vec2::new(1.0, 0.0));
        assert_eq!(pose(&a, 1.0), Pose::REST);
    }

    #[test]
    fn test_slide_out_down_leaves_downward() {
        let a = animation(AnimationClass::Slide(Motion::Out, Side::Down));
        assert_eq!(pose(&a, 0.0).offset, Vec2::ZERO);
        assert_eq!(pose(&a, 5.0).offset, Vec2::new(0.0, 1.0));
    }

    #[test]
    fn test_fade_and_zoom() {
        let fade = animation(AnimationClass::Fade(Motion::Out));
        let halfway = pose(&fade, 0.5).opacity;
        assert!(halfway > 0.0 && halfway < 1.0);

        let zoom = animation(AnimationClass::Zoom(Motion::In));
        assert_eq!(pose(&zoom, 0.0).scale, 0.5);
        assert_eq!(pose(&zoom, 0.0).opacity, 0.0);
    }

    #[test]
    fn test_default_duration() {
        let a = Animation {
            class: AnimationClass::Fade(Motion::In),
            duration: None,
        };
        assert!(is_running(&a, DEFAULT_DURATION * 0.5));
        assert!(!is_running(&a, DEFAULT_DURATION));
    }
}
