//! Whitespace highlighting demo
//!
//! A tiny terminal editor, built with crossterm and ratatui, that hosts `whitespace-core`:
//! trailing whitespace and mixed indentation are highlighted live while typing.
//!
//! # Usage
//!
//! ```bash
//! cargo run -p whitespace-tui -- <file_path> [--config <settings.json>]
//! ```
//!
//! Without `--config`, `.whitespace.json` in the current directory is used if present.
//! Logs go to `whitespace-tui.log` in the system temp directory (`RUST_LOG` filters them).
//!
//! # Shortcuts
//!
//! - Arrow keys / Home / End: move the cursor
//! - Ctrl+T: toggle highlighting
//! - Ctrl+W: toggle the editor's own whitespace rendering
//! - Ctrl+R: reload the settings file
//! - Ctrl+S: save
//! - Ctrl+Q: quit

use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span as TextSpan},
    widgets::{Block, Borders, Paragraph},
};
use std::{
    borrow::Cow,
    collections::HashMap,
    env, fs,
    io::{self, stdout},
    path::{Path, PathBuf},
    process,
    time::{Duration, Instant},
};
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};
use unicode_width::UnicodeWidthChar;
use whitespace_core::{
    ConfigProvider, CursorPosition, CursorProvider, DocumentId, DocumentProvider,
    HighlightCategory, HighlightLayer, LineIndex, PollTimer, Position, RenderSink, RuleKind,
    RuleSet, Span, WhitespaceConfig, WhitespaceHighlighter,
};

const DOCUMENT: DocumentId = DocumentId(1);
const TAB_WIDTH: usize = 4;
const DEFAULT_SETTINGS_FILE: &str = ".whitespace.json";
const IDLE_POLL: Duration = Duration::from_millis(500);

/// The single open file.
struct Buffer {
    path: PathBuf,
    text: LineIndex,
    cursor: usize,
    revision: u64,
    modified: bool,
}

impl Buffer {
    fn open(path: PathBuf) -> io::Result<Self> {
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => String::new(),
            Err(err) => return Err(err),
        };
        Ok(Self {
            path,
            text: LineIndex::from_text(&text),
            cursor: 0,
            revision: 1,
            modified: false,
        })
    }

    fn save(&mut self) -> io::Result<()> {
        fs::write(&self.path, self.text.get_text())?;
        self.modified = false;
        Ok(())
    }

    fn position(&self) -> Position {
        self.text.char_offset_to_position(self.cursor)
    }

    fn insert(&mut self, s: &str) {
        self.text.insert(self.cursor, s);
        self.cursor += s.chars().count();
        self.touch();
    }

    fn backspace(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        // At a line start, remove the whole line break ("\r\n" counts as one).
        let pos = self.position();
        let start = if pos.column == 0 {
            self.text
                .position_to_char_offset(Position::new(pos.line - 1, usize::MAX))
        } else {
            self.cursor - 1
        };
        self.text.delete(start, self.cursor - start);
        self.cursor = start;
        self.touch();
        true
    }

    fn delete(&mut self) -> bool {
        if self.cursor >= self.text.char_count() {
            return false;
        }
        let pos = self.position();
        let end = if pos.column == self.text.line_len(pos.line) {
            self.text.position_to_char_offset(Position::new(pos.line + 1, 0))
        } else {
            self.cursor + 1
        };
        self.text.delete(self.cursor, end - self.cursor);
        self.touch();
        true
    }

    fn touch(&mut self) {
        self.revision += 1;
        self.modified = true;
    }

    fn move_horizontal(&mut self, forward: bool) {
        let pos = self.position();
        self.cursor = if forward {
            if pos.column < self.text.line_len(pos.line) {
                self.cursor + 1
            } else {
                self.text.position_to_char_offset(Position::new(pos.line + 1, 0))
            }
        } else if pos.column > 0 {
            self.cursor - 1
        } else if pos.line > 0 {
            self.text
                .position_to_char_offset(Position::new(pos.line - 1, usize::MAX))
        } else {
            0
        };
    }

    fn move_vertical(&mut self, down: bool) {
        let pos = self.position();
        let line = if down {
            (pos.line + 1).min(self.text.line_count().saturating_sub(1))
        } else {
            pos.line.saturating_sub(1)
        };
        self.cursor = self
            .text
            .position_to_char_offset(Position::new(line, pos.column));
    }

    fn move_line_edge(&mut self, end: bool) {
        let line = self.position().line;
        let column = if end { usize::MAX } else { 0 };
        self.cursor = self.text.position_to_char_offset(Position::new(line, column));
    }
}

impl DocumentProvider for Buffer {
    fn active_document(&self) -> Option<DocumentId> {
        Some(DOCUMENT)
    }

    fn revision(&self, document: DocumentId) -> Option<u64> {
        (document == DOCUMENT).then_some(self.revision)
    }

    fn text(&self, document: DocumentId) -> Option<Cow<'_, str>> {
        (document == DOCUMENT).then(|| Cow::Owned(self.text.get_text()))
    }
}

impl CursorProvider for Buffer {
    fn cursor(&self) -> Option<CursorPosition> {
        Some(CursorPosition::Offset(self.cursor))
    }
}

/// Settings file plus the editor's own whitespace-rendering switch.
struct Settings {
    path: Option<PathBuf>,
    config: WhitespaceConfig,
    render_whitespace: bool,
}

impl Settings {
    fn load(path: Option<PathBuf>) -> (Self, Option<String>) {
        let mut settings = Self {
            path,
            config: WhitespaceConfig::default(),
            render_whitespace: false,
        };
        let error = settings.reload();
        (settings, error)
    }

    /// Re-read the settings file. Errors keep the previous configuration.
    fn reload(&mut self) -> Option<String> {
        let path = self.path.as_ref()?;
        match WhitespaceConfig::load(path) {
            Ok(config) => {
                tracing::info!("loaded settings from {}", path.display());
                self.config = config;
                None
            }
            Err(err) => {
                tracing::warn!("failed to load {}: {}", path.display(), err);
                Some(format!("Settings not loaded: {err}"))
            }
        }
    }
}

impl ConfigProvider for Settings {
    fn config(&self) -> WhitespaceConfig {
        self.config.clone()
    }

    fn host_renders_whitespace(&self) -> bool {
        self.render_whitespace
    }
}

/// Receives painted layers and status messages from the highlighter.
#[derive(Default)]
struct Painter {
    layers: HashMap<HighlightCategory, (Style, Vec<Span>)>,
    status: String,
}

impl Painter {
    fn style_at(&self, offset: usize) -> Option<(HighlightCategory, Style)> {
        // Glyphs first so they draw on top of the rule background.
        [
            HighlightCategory::WhitespaceGlyphs,
            HighlightCategory::Rule(RuleKind::TrailingWhitespace),
            HighlightCategory::Rule(RuleKind::MixedIndentation),
        ]
        .into_iter()
        .find_map(|category| {
            let (style, spans) = self.layers.get(&category)?;
            let idx = spans.partition_point(|span| span.end <= offset);
            spans
                .get(idx)
                .filter(|span| span.contains(offset))
                .map(|_| (category, *style))
        })
    }

    fn default_style(category: HighlightCategory) -> Style {
        match category {
            HighlightCategory::Rule(RuleKind::TrailingWhitespace) => Style::default().bg(Color::Red),
            HighlightCategory::Rule(RuleKind::MixedIndentation) => {
                Style::default().bg(Color::Yellow)
            }
            HighlightCategory::WhitespaceGlyphs => Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::DIM),
        }
    }
}

impl RenderSink for Painter {
    fn paint(&mut self, layer: &HighlightLayer, spans: &[Span]) {
        let mut style = Self::default_style(layer.category);
        if let Some(color) = layer.color.as_deref() {
            match color.parse::<Color>() {
                Ok(color) => style = style.bg(color),
                Err(_) => tracing::warn!("ignoring unknown color {:?}", color),
            }
        }
        self.layers.insert(layer.category, (style, spans.to_vec()));
    }

    fn notify(&mut self, message: &str) {
        self.status = message.to_string();
    }
}

struct App {
    buffer: Buffer,
    settings: Settings,
    painter: Painter,
    highlighter: WhitespaceHighlighter<PollTimer>,
    scroll_top: usize,
    should_quit: bool,
}

impl App {
    fn new(file_path: PathBuf, settings_path: Option<PathBuf>) -> io::Result<Self> {
        let buffer = Buffer::open(file_path)?;
        let (settings, settings_error) = Settings::load(settings_path);
        let rules = RuleSet::builtin().map_err(io::Error::other)?;

        let mut app = Self {
            highlighter: WhitespaceHighlighter::new(rules, settings.config(), PollTimer::new()),
            buffer,
            settings,
            painter: Painter::default(),
            scroll_top: 0,
            should_quit: false,
        };
        if let Some(error) = settings_error {
            app.painter.status = error;
        }
        app.highlighter.on_active_document_changed(&app.buffer);
        Ok(app)
    }

    fn poll_timeout(&self) -> Duration {
        self.highlighter.timer().timeout(Instant::now(), IDLE_POLL)
    }

    fn fire_expired(&mut self) {
        let expired = self.highlighter.timer_mut().expired(Instant::now());
        for handle in expired {
            let outcome = self.highlighter.fire(
                handle,
                &self.buffer,
                &self.buffer,
                &self.settings,
                &mut self.painter,
            );
            tracing::debug!("scan: {:?}", outcome);
        }
    }

    fn handle_key_event(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }

        let revision = self.buffer.revision;
        let cursor = self.buffer.cursor;

        match (key.modifiers, key.code) {
            (KeyModifiers::CONTROL, KeyCode::Char('q')) => self.should_quit = true,
            (KeyModifiers::CONTROL, KeyCode::Char('s')) => {
                self.painter.status = match self.buffer.save() {
                    Ok(()) => format!("Saved {}", self.buffer.path.display()),
                    Err(e) => format!("Save failed: {e}"),
                };
            }
            (KeyModifiers::CONTROL, KeyCode::Char('t')) => {
                self.highlighter.toggle(&self.buffer, &mut self.painter);
            }
            (KeyModifiers::CONTROL, KeyCode::Char('w')) => {
                self.settings.render_whitespace = !self.settings.render_whitespace;
                self.painter.status = format!(
                    "Editor whitespace rendering {}",
                    if self.settings.render_whitespace { "on" } else { "off" }
                );
                self.highlighter
                    .on_config_changed(&self.buffer, &self.settings);
            }
            (KeyModifiers::CONTROL, KeyCode::Char('r')) => {
                self.painter.status = self
                    .settings
                    .reload()
                    .unwrap_or_else(|| "Settings reloaded".to_string());
                self.highlighter
                    .on_config_changed(&self.buffer, &self.settings);
            }
            (_, KeyCode::Left) => self.buffer.move_horizontal(false),
            (_, KeyCode::Right) => self.buffer.move_horizontal(true),
            (_, KeyCode::Up) => self.buffer.move_vertical(false),
            (_, KeyCode::Down) => self.buffer.move_vertical(true),
            (_, KeyCode::Home) => self.buffer.move_line_edge(false),
            (_, KeyCode::End) => self.buffer.move_line_edge(true),
            (_, KeyCode::Enter) => self.buffer.insert("\n"),
            (_, KeyCode::Tab) => self.buffer.insert("\t"),
            (_, KeyCode::Backspace) => {
                self.buffer.backspace();
            }
            (_, KeyCode::Delete) => {
                self.buffer.delete();
            }
            (KeyModifiers::NONE | KeyModifiers::SHIFT, KeyCode::Char(c)) => {
                self.buffer.insert(c.encode_utf8(&mut [0; 4]));
            }
            _ => {}
        }

        if self.buffer.revision != revision {
            self.highlighter.on_text_changed(&self.buffer, DOCUMENT);
        } else if self.buffer.cursor != cursor {
            self.highlighter.on_cursor_moved(&self.buffer);
        }
    }

    fn adjust_scroll(&mut self, height: usize) {
        let line = self.buffer.position().line;
        if line < self.scroll_top {
            self.scroll_top = line;
        } else if height > 0 && line >= self.scroll_top + height {
            self.scroll_top = line + 1 - height;
        }
    }

    fn render(&mut self, frame: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(1),    // editor
                Constraint::Length(1), // status line
                Constraint::Length(1), // shortcuts
            ])
            .split(frame.area());

        self.render_editor(frame, chunks[0]);
        self.render_status_line(frame, chunks[1]);
        frame.render_widget(
            Paragraph::new(
                "^T toggle  ^W editor whitespace  ^R reload settings  ^S save  ^Q quit",
            )
            .style(Style::default().fg(Color::DarkGray)),
            chunks[2],
        );
    }

    fn render_editor(&mut self, frame: &mut Frame, area: Rect) {
        let height = area.height.saturating_sub(2) as usize;
        self.adjust_scroll(height);

        let text = &self.buffer.text;
        let last_line = (self.scroll_top + height).min(text.line_count());
        let lines: Vec<Line> = (self.scroll_top..last_line)
            .map(|line| self.render_line(line))
            .collect();

        let title = format!(
            " {}{} ",
            self.buffer.path.display(),
            if self.buffer.modified { " *" } else { "" }
        );
        frame.render_widget(
            Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title(title)),
            area,
        );

        let pos = self.buffer.position();
        let x = self.visual_column(pos.line, pos.column);
        frame.set_cursor_position((
            area.x + 1 + x as u16,
            area.y + 1 + (pos.line - self.scroll_top) as u16,
        ));
    }

    fn render_line(&self, line: usize) -> Line<'static> {
        let text = &self.buffer.text;
        let start = text.position_to_char_offset(Position::new(line, 0));
        let content = text.get_line_text(line).unwrap_or_default();
        let glyphs = self.settings.render_whitespace;

        let mut spans = Vec::new();
        let mut x = 0;
        for (column, ch) in content.chars().enumerate() {
            let highlight = self.painter.style_at(start + column);
            let glyph_layer =
                matches!(highlight, Some((HighlightCategory::WhitespaceGlyphs, _)));
            let show_glyph = glyphs || glyph_layer;

            let (cell, width) = match ch {
                '\t' => {
                    let width = TAB_WIDTH - x % TAB_WIDTH;
                    let lead = if show_glyph { "→" } else { " " };
                    (format!("{lead}{}", " ".repeat(width - 1)), width)
                }
                ' ' if show_glyph => ("·".to_string(), 1),
                c if c.is_control() => ("�".to_string(), 1),
                c => (c.to_string(), c.width().unwrap_or(0)),
            };
            x += width;

            let style = match highlight {
                // The glyph layer only changes the character drawn; keep the rule background.
                Some((HighlightCategory::WhitespaceGlyphs, glyph_style)) => self
                    .rule_style_at(start + column)
                    .unwrap_or_default()
                    .patch(glyph_style),
                Some((_, style)) => style,
                None if show_glyph && matches!(ch, ' ' | '\t') => {
                    Style::default().fg(Color::DarkGray)
                }
                None => Style::default(),
            };
            spans.push(TextSpan::styled(cell, style));
        }
        Line::from(spans)
    }

    fn rule_style_at(&self, offset: usize) -> Option<Style> {
        RuleKind::ALL.into_iter().find_map(|kind| {
            let (style, spans) = self.painter.layers.get(&HighlightCategory::Rule(kind))?;
            let idx = spans.partition_point(|span| span.end <= offset);
            spans
                .get(idx)
                .filter(|span| span.contains(offset))
                .map(|_| *style)
        })
    }

    fn visual_column(&self, line: usize, column: usize) -> usize {
        let content = self.buffer.text.get_line_text(line).unwrap_or_default();
        content.chars().take(column).fold(0, |x, ch| match ch {
            '\t' => x + TAB_WIDTH - x % TAB_WIDTH,
            c if c.is_control() => x + 1,
            c => x + c.width().unwrap_or(0),
        })
    }

    fn render_status_line(&self, frame: &mut Frame, area: Rect) {
        let pos = self.buffer.position();
        let flagged: usize = RuleKind::ALL
            .iter()
            .filter_map(|kind| self.painter.layers.get(&HighlightCategory::Rule(*kind)))
            .map(|(_, spans)| spans.len())
            .sum();
        let state = if self.highlighter.show_highlights() {
            format!("{flagged} flagged")
        } else {
            "highlighting off".to_string()
        };
        let pending = if self.highlighter.scheduler().is_pending() {
            " …"
        } else {
            ""
        };

        let status = format!(
            " Ln {}, Col {} | {}{} | {}",
            pos.line + 1,
            pos.column + 1,
            state,
            pending,
            self.painter.status
        );
        frame.render_widget(
            Paragraph::new(status).style(Style::default().bg(Color::Blue).fg(Color::White)),
            area,
        );
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("whitespace_core=debug,whitespace_tui=debug"));
    let file_appender = tracing_appender::rolling::never(env::temp_dir(), "whitespace-tui.log");

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(file_appender)
                .with_ansi(false)
                .with_target(true)
                .with_filter(filter),
        )
        .init();
}

fn parse_args(args: &[String]) -> Option<(PathBuf, Option<PathBuf>)> {
    let mut file = None;
    let mut settings = None;
    let mut iter = args.iter().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--config" => settings = Some(PathBuf::from(iter.next()?)),
            _ if file.is_none() => file = Some(PathBuf::from(arg)),
            _ => return None,
        }
    }

    let settings = settings.or_else(|| {
        let default = Path::new(DEFAULT_SETTINGS_FILE);
        default.exists().then(|| default.to_path_buf())
    });
    Some((file?, settings))
}

fn main() -> io::Result<()> {
    let args: Vec<String> = env::args().collect();
    let Some((file_path, settings_path)) = parse_args(&args) else {
        eprintln!("Usage: whitespace-tui <file_path> [--config <settings.json>]");
        process::exit(1);
    };

    init_tracing();
    let mut app = App::new(file_path, settings_path)?;

    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = result {
        eprintln!("Error: {}", err);
    }

    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> io::Result<()> {
    loop {
        terminal.draw(|f| app.render(f))?;

        if app.should_quit {
            break;
        }

        if event::poll(app.poll_timeout())? {
            if let Event::Key(key) = event::read()? {
                app.handle_key_event(key);
            }
        }

        app.fire_expired();
    }

    Ok(())
}
