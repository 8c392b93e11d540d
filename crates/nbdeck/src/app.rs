use eframe::egui;
use std::collections::HashMap;
use std::future::{self, Future};
use std::path::PathBuf;
use std::time::Instant;

use tracing::{debug, info};

use crate::config::Config;
use crate::notebook::Notebook;
use crate::render::{self, CellOptions, CellView, Pose, syntax};
use crate::slideshow::host::{MOVE_CURSOR_DOWN, MOVE_CURSOR_UP, RUN_CELL_AND_SELECT_NEXT};
use crate::slideshow::{
    Host, HostCommand, HostError, HostEvent, NavKey, NodeStyle, PageWrapper, Slideshow,
    SlideshowCommand, StartMode, WindowingMode,
};
use crate::theme::Theme;

pub struct Options {
    pub file: PathBuf,
    pub windowed: bool,
    pub start: Option<StartMode>,
    pub cell: Option<usize>,
}

/// Style most recently pushed for a cell, and when.
#[derive(Debug, Clone, Copy)]
struct CellStyle {
    style: NodeStyle,
    since: Instant,
}

/// The notebook window, as the slideshow sees it.
struct EguiHost {
    selected: usize,
    cell_count: usize,
    chrome_hidden: bool,
    windowing: WindowingMode,
    wrappers: Vec<PageWrapper>,
    styles: HashMap<usize, CellStyle>,
    listening: bool,
    windowed: bool,
    entered_fullscreen: bool,
    scroll_to_selected: bool,
    // Sent after input handling; sending inside ctx.input() deadlocks
    viewport_cmds: Vec<egui::ViewportCommand>,
}

impl EguiHost {
    fn new(cell_count: usize, selected: usize, windowed: bool) -> Self {
        Self {
            selected,
            cell_count,
            chrome_hidden: false,
            windowing: WindowingMode::Defer,
            wrappers: Vec::new(),
            styles: HashMap::new(),
            listening: false,
            windowed,
            entered_fullscreen: false,
            scroll_to_selected: true,
            viewport_cmds: Vec::new(),
        }
    }

    fn move_cursor(&mut self, delta: isize) {
        let last = self.cell_count.saturating_sub(1);
        let next = self.selected.saturating_add_signed(delta).min(last);
        self.set_active_cell(next);
    }
}

impl Host for EguiHost {
    fn active_cell(&self) -> usize {
        self.selected
    }

    fn set_active_cell(&mut self, index: usize) {
        self.selected = index;
        self.scroll_to_selected = true;
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
        self.styles.insert(
            index,
            CellStyle {
                style: *style,
                since: Instant::now(),
            },
        );
    }

    fn clear_cell_style(&mut self, index: usize) -> Result<(), HostError> {
        if index >= self.cell_count {
            return Err(HostError::Detached { what: "cell", index });
        }
        self.styles.remove(&index);
        Ok(())
    }

    fn set_listening(&mut self, listening: bool) {
        self.listening = listening;
    }

    fn request_fullscreen(&mut self) -> impl Future<Output = Result<(), HostError>> {
        if self.windowed {
            let err = HostError::Fullscreen("running with --windowed".to_string());
            return future::ready(Err(err));
        }
        self.viewport_cmds.push(egui::ViewportCommand::Fullscreen(true));
        self.entered_fullscreen = true;
        future::ready(Ok(()))
    }

    fn exit_fullscreen(&mut self) {
        if std::mem::take(&mut self.entered_fullscreen) {
            self.viewport_cmds.push(egui::ViewportCommand::Fullscreen(false));
        }
    }
}

struct Toast {
    message: String,
    start: Instant,
}

impl Toast {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            start: Instant::now(),
        }
    }

    fn opacity(&self) -> f32 {
        let elapsed = self.start.elapsed().as_secs_f32();
        let duration = 1.5;
        let fade_start = 1.0;
        if elapsed < fade_start {
            1.0
        } else if elapsed < duration {
            1.0 - (elapsed - fade_start) / (duration - fade_start)
        } else {
            0.0
        }
    }

    fn is_expired(&self) -> bool {
        self.start.elapsed().as_secs_f32() >= 1.5
    }
}

const KEY_HINTS: &str =
    "F5 present  \u{00b7}  Shift+F5 from current cell  \u{00b7}  D theme  \u{00b7}  Q quit";

/// Keyboard shortcuts, by command id.
const KEYMAP: [(egui::Modifiers, egui::Key, &str); 7] = [
    (egui::Modifiers::SHIFT, egui::Key::Enter, RUN_CELL_AND_SELECT_NEXT),
    (egui::Modifiers::NONE, egui::Key::J, MOVE_CURSOR_DOWN),
    (egui::Modifiers::NONE, egui::Key::ArrowDown, MOVE_CURSOR_DOWN),
    (egui::Modifiers::NONE, egui::Key::K, MOVE_CURSOR_UP),
    (egui::Modifiers::NONE, egui::Key::ArrowUp, MOVE_CURSOR_UP),
    (egui::Modifiers::NONE, egui::Key::F5, "slideshow:view-first"),
    (egui::Modifiers::SHIFT, egui::Key::F5, "slideshow:view-current"),
];

/// What a frame's input asked for, applied once the input lock is released.
enum Action {
    Quit,
    ToggleTheme,
    Command(SlideshowCommand),
    /// A notebook command; a running slideshow observes it.
    HostCommand(HostCommand),
    Event(HostEvent),
}

struct NotebookApp {
    notebook: Notebook,
    title: String,
    theme: Theme,
    /// Highlighted source per code cell, for the current theme.
    spans: HashMap<usize, Vec<syntax::Span>>,
    host: EguiHost,
    slideshow: Slideshow,
    runtime: tokio::runtime::Runtime,
    pending: Option<SlideshowCommand>,
    last_fullscreen: Option<bool>,
    toast: Option<Toast>,
}

impl NotebookApp {
    fn new(
        notebook: Notebook,
        title: String,
        config: &Config,
        options: &Options,
        runtime: tokio::runtime::Runtime,
    ) -> Self {
        let cell_count = notebook.cells.len();
        let selected = options
            .cell
            .unwrap_or(0)
            .min(cell_count.saturating_sub(1));
        let pending = options
            .start
            .or_else(|| config.start_mode())
            .map(|mode| match mode {
                StartMode::First => SlideshowCommand::ViewFirst,
                StartMode::Current => SlideshowCommand::ViewCurrent,
            });

        let mut app = Self {
            notebook,
            title,
            theme: Theme::from_name(config.theme()),
            spans: HashMap::new(),
            host: EguiHost::new(cell_count, selected, options.windowed),
            slideshow: Slideshow::new(config.transition_defaults()),
            runtime,
            pending,
            last_fullscreen: None,
            toast: None,
        };
        app.highlight();
        app
    }

    fn highlight(&mut self) {
        let language = self.notebook.language().to_string();
        let theme_name = self.theme.syntect_theme_name().to_string();
        self.spans = self
            .notebook
            .cells
            .iter()
            .enumerate()
            .filter(|(_, cell)| cell.is_code())
            .map(|(index, cell)| {
                (
                    index,
                    syntax::highlight(&cell.source, &language, &theme_name),
                )
            })
            .collect();
    }

    fn toggle_theme(&mut self) {
        self.theme = self.theme.toggled();
        self.highlight();
        self.toast = Some(Toast::new(format!("Theme: {}", self.theme.name)));
    }

    fn execute(&mut self, command: SlideshowCommand) {
        let was_active = self.slideshow.is_active();
        self.runtime.block_on(self.slideshow.execute(
            command,
            Some(&self.notebook),
            &mut self.host,
        ));
        if !was_active && !self.slideshow.is_active() && command != SlideshowCommand::Exit {
            self.toast = Some(Toast::new("Nothing to present"));
        }
    }

    fn dispatch(&mut self, event: HostEvent) {
        if !self.host.listening {
            return;
        }
        let outcome = self.slideshow.handle_event(&event, &mut self.host);
        let active = self.slideshow.session().map(|s| s.active_index());
        debug!(?event, ?outcome, ?active, "slideshow event");
    }

    fn apply(&mut self, action: Action) -> Option<egui::ViewportCommand> {
        match action {
            Action::Quit => return Some(egui::ViewportCommand::Close),
            Action::ToggleTheme => self.toggle_theme(),
            Action::Command(command) => self.execute(command),
            Action::HostCommand(command) => {
                match command {
                    HostCommand::RunCellAndSelectNext | HostCommand::MoveCursorDown => {
                        self.host.move_cursor(1)
                    }
                    HostCommand::MoveCursorUp => self.host.move_cursor(-1),
                    HostCommand::Other(_) => {}
                }
                self.dispatch(HostEvent::CommandExecuted(command));
            }
            Action::Event(event) => self.dispatch(event),
        }
        None
    }

    fn collect_actions(&self, i: &egui::InputState) -> Vec<Action> {
        let mut actions = Vec::new();
        let active = self.slideshow.is_active();

        if active {
            for event in &i.events {
                if let egui::Event::Key {
                    key, pressed: true, ..
                } = event
                {
                    if let Some(nav) = NavKey::from_key_name(key.name()) {
                        actions.push(Action::Event(HostEvent::Key(nav)));
                    }
                }
            }
        } else {
            if i.key_pressed(egui::Key::Q) {
                return vec![Action::Quit];
            }
            if i.key_pressed(egui::Key::D) {
                actions.push(Action::ToggleTheme);
            }
        }

        for (modifiers, key, id) in KEYMAP {
            if !i.modifiers.matches_exact(modifiers) || !i.key_pressed(key) {
                continue;
            }
            if active && NavKey::from_key_name(key.name()).is_some() {
                continue;
            }
            match SlideshowCommand::from_id(id) {
                Some(command) if command.is_enabled(active) => {
                    actions.push(Action::Command(command));
                }
                Some(_) => {}
                None => actions.push(Action::HostCommand(HostCommand::from_id(id))),
            }
        }
        actions
    }

    /// Leaving fullscreen while presenting ends the session.
    fn watch_fullscreen(&mut self, ctx: &egui::Context) {
        let fullscreen = ctx.input(|i| i.viewport().fullscreen);
        if let (Some(now), Some(before)) = (fullscreen, self.last_fullscreen) {
            if now != before {
                self.dispatch(HostEvent::FullscreenChanged { fullscreen: now });
            }
        }
        self.last_fullscreen = fullscreen;
    }

    fn draw_command_bar(&self, ctx: &egui::Context) -> Option<SlideshowCommand> {
        let mut clicked = None;
        let active = self.slideshow.is_active();
        egui::TopBottomPanel::top("commands").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.strong(&self.title);
                ui.separator();
                for command in SlideshowCommand::ALL {
                    let button = egui::Button::new(command.label());
                    if ui.add_enabled(command.is_enabled(active), button).clicked() {
                        clicked = Some(command);
                    }
                }
            });
        });
        egui::TopBottomPanel::bottom("status").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label(format!(
                    "Cell {} of {}",
                    self.host.selected + 1,
                    self.notebook.cells.len()
                ));
                ui.separator();
                ui.weak(KEY_HINTS);
            });
        });
        clicked
    }

    fn draw_notebook(&mut self, ui: &mut egui::Ui) -> Option<usize> {
        let mut clicked = None;
        let selected = self.host.selected;
        let scroll = std::mem::take(&mut self.host.scroll_to_selected);
        let theme = &self.theme;
        let spans = &self.spans;
        let cells = &self.notebook.cells;

        egui::ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui| {
                let width = ui.available_width().min(960.0);
                let padding = egui::vec2(16.0, 12.0);
                for (index, cell) in cells.iter().enumerate() {
                    let opts = CellOptions {
                        theme,
                        spans: spans.get(&index).map(Vec::as_slice),
                        opacity: 1.0,
                        scale: 1.0,
                        hide_code: false,
                    };
                    let view = CellView::layout(ui.painter(), cell, &opts, width - padding.x * 2.0);
                    let (rect, response) = ui.allocate_exact_size(
                        egui::vec2(width, view.height + padding.y * 2.0),
                        egui::Sense::click(),
                    );
                    if index == selected {
                        ui.painter().rect_stroke(
                            rect,
                            6.0,
                            egui::Stroke::new(2.0, theme.accent),
                            egui::StrokeKind::Inside,
                        );
                    }
                    view.paint(ui.painter(), rect.min + padding, 1.0);
                    if response.clicked() {
                        clicked = Some(index);
                    }
                    if index == selected && scroll {
                        response.scroll_to_me(Some(egui::Align::Center));
                    }
                    ui.add_space(8.0);
                }
            });
        clicked
    }

    fn compute_scale(rect: egui::Rect) -> f32 {
        let ref_w = 1280.0;
        let ref_h = 720.0;
        (rect.width() / ref_w).min(rect.height() / ref_h).max(0.5)
    }

    /// Draw every cell the slideshow has shown, or is still animating out.
    /// Returns whether any animation is in flight.
    fn draw_slideshow(&self, ui: &egui::Ui) -> bool {
        let rect = ui.max_rect();
        let scale = Self::compute_scale(rect);
        let painter = ui.painter();
        let now = Instant::now();
        let width = (rect.width() * 0.8).min(1100.0 * scale);
        let left = rect.center().x - width / 2.0;
        let mut animating = false;

        for wrapper in &self.host.wrappers {
            let mut y = rect.top() + 60.0 * scale;
            for &index in &wrapper.cells {
                let (Some(entry), Some(cell)) =
                    (self.host.styles.get(&index), self.notebook.cells.get(index))
                else {
                    continue;
                };
                let elapsed = now.duration_since(entry.since).as_secs_f32();
                let pose = match entry.style.animation {
                    Some(animation) if render::is_running(&animation, elapsed) => {
                        animating = true;
                        render::pose(&animation, elapsed)
                    }
                    _ if entry.style.is_visible() => Pose::REST,
                    _ => continue,
                };

                let opts = CellOptions {
                    theme: &self.theme,
                    spans: self.spans.get(&index).map(Vec::as_slice),
                    opacity: pose.opacity,
                    scale: scale * pose.scale,
                    hide_code: entry.style.hide_code,
                };
                let view = CellView::layout(painter, cell, &opts, width);
                let origin = egui::pos2(
                    left + pose.offset.x * rect.width(),
                    y + pose.offset.y * rect.height(),
                );
                view.paint(painter, origin, scale);
                y += view.height + 16.0 * scale;
            }
        }

        if let Some(session) = self.slideshow.session() {
            painter.text(
                rect.right_bottom() - egui::vec2(24.0, 16.0) * scale,
                egui::Align2::RIGHT_BOTTOM,
                format!("{} / {}", session.page_index() + 1, session.layout().len()),
                egui::FontId::proportional(14.0 * scale),
                Theme::with_opacity(self.theme.muted, 0.8),
            );
        }
        animating
    }

    fn draw_toast(&mut self, ui: &egui::Ui) {
        let Some(toast) = &self.toast else {
            return;
        };
        if toast.is_expired() {
            self.toast = None;
            return;
        }
        let rect = ui.max_rect();
        let opacity = toast.opacity();
        let galley = ui.painter().layout_no_wrap(
            toast.message.clone(),
            egui::FontId::proportional(18.0),
            Theme::with_opacity(self.theme.foreground, opacity),
        );
        let pos = egui::pos2(
            rect.center().x - galley.size().x / 2.0,
            rect.bottom() - 60.0,
        );
        let bg = egui::Rect::from_min_size(pos, galley.size()).expand(10.0);
        ui.painter()
            .rect_filled(bg, 8.0, Theme::with_opacity(self.theme.code_background, opacity * 0.9));
        ui.painter().galley(pos, galley, self.theme.foreground);
        ui.ctx().request_repaint();
    }
}

impl eframe::App for NotebookApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if let Some(command) = self.pending.take() {
            self.execute(command);
        }
        self.watch_fullscreen(ctx);

        let actions = ctx.input(|i| self.collect_actions(i));
        let mut viewport_cmds = Vec::new();
        for action in actions {
            viewport_cmds.extend(self.apply(action));
        }

        if !self.host.chrome_hidden {
            if let Some(command) = self.draw_command_bar(ctx) {
                self.execute(command);
            }
        }

        let frame = egui::Frame::NONE.fill(self.theme.background);
        egui::CentralPanel::default().frame(frame).show(ctx, |ui| {
            if self.slideshow.is_active() {
                if self.draw_slideshow(ui) {
                    ctx.request_repaint();
                }
            } else if let Some(index) = self.draw_notebook(ui) {
                self.host.set_active_cell(index);
            }
            self.draw_toast(ui);
        });

        viewport_cmds.append(&mut self.host.viewport_cmds);
        for cmd in viewport_cmds {
            ctx.send_viewport_cmd(cmd);
        }
    }
}

pub fn run(options: Options) -> anyhow::Result<()> {
    let notebook = Notebook::load(&options.file)?;
    let config = Config::load_or_default();

    let title = format!(
        "nbdeck - {}",
        options.file.file_name().unwrap_or_default().to_string_lossy()
    );
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()?;

    info!(
        file = %options.file.display(),
        cells = notebook.cells.len(),
        language = notebook.language(),
        "opening notebook"
    );

    let viewport = egui::ViewportBuilder::default()
        .with_inner_size([1280.0, 800.0])
        .with_title(&title);
    let native = eframe::NativeOptions {
        viewport,
        ..Default::default()
    };

    eframe::run_native(
        "nbdeck",
        native,
        Box::new(move |_cc| {
            let app = NotebookApp::new(notebook, title, &config, &options, runtime);
            Ok(Box::new(app))
        }),
    )
    .map_err(|e| anyhow::anyhow!("{e}"))
}
