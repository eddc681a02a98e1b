//! Terminal renderer using crossterm.
//!
//! Composes each frame into an off-screen cell buffer (backdrop glyphs
//! first, then the terminal panel and status bar on top) and flushes only
//! the cells that changed since the previous frame, inside a synchronized
//! update so partially-drawn frames are never visible.
//!
//! The renderer owns the drawing surface exclusively; nothing else writes
//! to stdout while it is initialized.

use std::io::{self, Write};

use crossterm::{
    cursor::{Hide, MoveTo, Show},
    execute, queue,
    style::{Attribute, Print, ResetColor, SetAttribute, SetBackgroundColor, SetForegroundColor},
    terminal::{
        self, BeginSynchronizedUpdate, Clear, ClearType, DisableLineWrap, EnableLineWrap,
        EndSynchronizedUpdate, EnterAlternateScreen, LeaveAlternateScreen,
    },
};
use unicode_width::UnicodeWidthChar;

use crate::anim::{Frame, GlyphStyle};
use crate::config::{Color, Theme};
use crate::core::session::TerminalSession;

/// Widest the terminal panel will grow, in cells.
const PANEL_MAX_WIDTH: u16 = 76;

/// Block cursor drawn at the end of the live input line.
const CURSOR_GLYPH: char = '▊';

/// Version string from Cargo.toml
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// One composed screen cell.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Cell {
    ch: char,
    fg: Color,
    bg: Option<Color>,
    bold: bool,
}

impl Cell {
    fn blank() -> Self {
        Self {
            ch: ' ',
            fg: Color::new(0, 0, 0),
            bg: None,
            bold: false,
        }
    }
}

/// Runtime facts shown in the status bar.
pub struct StatusInfo<'a> {
    pub backdrop: &'a str,
    pub population: usize,
    pub history_len: usize,
    pub panel_visible: bool,
}

/// Full-screen renderer with a diffed cell buffer.
pub struct Renderer {
    theme: Theme,
    cols: u16,
    rows: u16,
    prev: Vec<Cell>,
    back: Vec<Cell>,
    initialized: bool,
    force_redraw: bool,
}

impl Renderer {
    pub fn new(theme: Theme) -> Self {
        Self {
            theme,
            cols: 0,
            rows: 0,
            prev: Vec::new(),
            back: Vec::new(),
            initialized: false,
            force_redraw: true,
        }
    }

    /// Current terminal size
    pub fn size() -> io::Result<(u16, u16)> {
        terminal::size()
    }

    /// Initialize the terminal for rendering
    pub fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(
            stdout,
            EnterAlternateScreen,
            Hide,
            DisableLineWrap,
            Clear(ClearType::All),
            MoveTo(0, 0)
        )?;
        stdout.flush()?;

        let (cols, rows) = Self::size()?;
        self.resize_buffers(cols, rows);
        self.initialized = true;
        Ok(())
    }

    /// Cleanup the terminal
    pub fn cleanup(&mut self) -> io::Result<()> {
        if !self.initialized {
            return Ok(());
        }
        self.initialized = false;

        let mut stdout = io::stdout();
        execute!(
            stdout,
            ResetColor,
            Show,
            EnableLineWrap,
            LeaveAlternateScreen
        )?;
        terminal::disable_raw_mode()?;
        Ok(())
    }

    /// Adopt new dimensions; the next render repaints everything.
    pub fn handle_resize(&mut self, cols: u16, rows: u16) {
        self.resize_buffers(cols, rows);
    }

    fn resize_buffers(&mut self, cols: u16, rows: u16) {
        self.cols = cols;
        self.rows = rows;
        let n = usize::from(cols) * usize::from(rows);
        self.prev = vec![Cell::blank(); n];
        self.back = vec![Cell::blank(); n];
        self.force_redraw = true;
    }

    fn set_cell(&mut self, col: u16, row: u16, cell: Cell) {
        if col < self.cols && row < self.rows {
            let idx = usize::from(row) * usize::from(self.cols) + usize::from(col);
            self.back[idx] = cell;
        }
    }

    /// Compose and flush one frame.
    pub fn render(
        &mut self,
        frame: &Frame,
        session: &TerminalSession,
        status: &StatusInfo,
    ) -> io::Result<()> {
        if self.cols == 0 || self.rows == 0 {
            return Ok(());
        }

        self.back.fill(Cell::blank());
        self.compose_backdrop(frame);
        if status.panel_visible {
            self.compose_panel(session);
        }
        self.compose_status_bar(status);
        self.flush_diff()
    }

    fn compose_backdrop(&mut self, frame: &Frame) {
        for glyph in frame {
            let (fg, bold) = if glyph.style.contains(GlyphStyle::BOLD) {
                (self.theme.backdrop_head, true)
            } else {
                (self.theme.backdrop.scaled(glyph.level), false)
            };
            self.set_cell(
                glyph.col,
                glyph.row,
                Cell {
                    ch: glyph.ch,
                    fg,
                    bg: None,
                    bold,
                },
            );
        }
    }

    fn compose_panel(&mut self, session: &TerminalSession) {
        // Too cramped for a bordered panel; the backdrop still runs.
        if self.cols < 24 || self.rows < 8 {
            return;
        }

        let panel_w = (self.cols - 4).min(PANEL_MAX_WIDTH);
        let panel_h = (u32::from(self.rows) * 2 / 3).clamp(6, u32::from(self.rows) - 2) as u16;
        let x0 = (self.cols - panel_w) / 2;
        let y0 = 1;

        self.draw_border(x0, y0, panel_w, panel_h);
        self.draw_title(x0, y0, panel_w);

        let interior_w = usize::from(panel_w) - 4;
        let interior_h = usize::from(panel_h) - 2;

        // Scrollback tail plus the live input line, newest pinned to the
        // bottom of the panel.
        let mut display: Vec<String> = session
            .lines()
            .iter()
            .take(session.lines().len().saturating_sub(1))
            .cloned()
            .collect();
        let mut live = session
            .lines()
            .last()
            .cloned()
            .unwrap_or_default();
        live.push_str(session.input());
        if session.cursor_visible() {
            live.push(CURSOR_GLYPH);
        }
        display.push(live);

        let skip = display.len().saturating_sub(interior_h);
        let text = self.theme.panel_text;
        for (i, line) in display.iter().skip(skip).enumerate() {
            let row = y0 + 1 + i as u16;
            for (j, ch) in clip_to_width(line, interior_w).chars().enumerate() {
                self.set_cell(
                    x0 + 2 + j as u16,
                    row,
                    Cell {
                        ch,
                        fg: text,
                        bg: None,
                        bold: false,
                    },
                );
            }
        }
    }

    fn draw_border(&mut self, x0: u16, y0: u16, w: u16, h: u16) {
        let border = self.theme.panel_border;
        let cell = |ch| Cell {
            ch,
            fg: border,
            bg: None,
            bold: false,
        };

        for dx in 1..w - 1 {
            self.set_cell(x0 + dx, y0, cell('─'));
            self.set_cell(x0 + dx, y0 + h - 1, cell('─'));
        }
        for dy in 1..h - 1 {
            self.set_cell(x0, y0 + dy, cell('│'));
            self.set_cell(x0 + w - 1, y0 + dy, cell('│'));
            // Blank the interior so the backdrop never bleeds through.
            for dx in 1..w - 1 {
                self.set_cell(x0 + dx, y0 + dy, Cell::blank());
            }
        }
        self.set_cell(x0, y0, cell('┌'));
        self.set_cell(x0 + w - 1, y0, cell('┐'));
        self.set_cell(x0, y0 + h - 1, cell('└'));
        self.set_cell(x0 + w - 1, y0 + h - 1, cell('┘'));
    }

    fn draw_title(&mut self, x0: u16, y0: u16, w: u16) {
        let title = format!(" NEOTERM v{} ", VERSION);
        if title.len() + 4 > usize::from(w) {
            return;
        }
        let start = x0 + (w - title.len() as u16) / 2;
        let fg = self.theme.panel_title;
        for (i, ch) in title.chars().enumerate() {
            self.set_cell(
                start + i as u16,
                y0,
                Cell {
                    ch,
                    fg,
                    bg: None,
                    bold: true,
                },
            );
        }
    }

    fn compose_status_bar(&mut self, status: &StatusInfo) {
        if self.rows < 2 {
            return;
        }
        let row = self.rows - 1;
        let bg = Some(self.theme.status_bar_bg);
        let fg = self.theme.status_bar_fg;

        for col in 0..self.cols {
            self.set_cell(
                col,
                row,
                Cell {
                    ch: ' ',
                    fg,
                    bg,
                    bold: false,
                },
            );
        }

        let left = format!(
            " NEOTERM v{} │ {} │ {} elements │ {} cmds",
            VERSION, status.backdrop, status.population, status.history_len
        );
        let hint = if status.panel_visible {
            "Ctrl+Q quit"
        } else {
            "press any key for terminal │ Ctrl+Q quit"
        };
        let right = format!("{} │ {} ", chrono::Local::now().format("%H:%M:%S"), hint);

        for (i, ch) in left.chars().enumerate() {
            if i as u16 >= self.cols {
                break;
            }
            self.set_cell(
                i as u16,
                row,
                Cell {
                    ch,
                    fg,
                    bg,
                    bold: false,
                },
            );
        }
        let right_len = right.chars().count() as u16;
        if right_len < self.cols {
            let start = self.cols - right_len;
            for (i, ch) in right.chars().enumerate() {
                self.set_cell(
                    start + i as u16,
                    row,
                    Cell {
                        ch,
                        fg,
                        bg,
                        bold: false,
                    },
                );
            }
        }
    }

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut stdout = io::stdout();
        queue!(stdout, BeginSynchronizedUpdate)?;

        let mut cur_fg: Option<Color> = None;
        let mut cur_bg: Option<Option<Color>> = None;
        let mut cur_bold = false;

        for row in 0..self.rows {
            for col in 0..self.cols {
                let idx = usize::from(row) * usize::from(self.cols) + usize::from(col);
                let cell = self.back[idx];
                if !self.force_redraw && cell == self.prev[idx] {
                    continue;
                }

                queue!(stdout, MoveTo(col, row))?;

                if cur_bg != Some(cell.bg) {
                    match cell.bg {
                        Some(bg) => queue!(stdout, SetBackgroundColor(bg.to_crossterm()))?,
                        None => {
                            // ResetColor clears both; force the fg to re-emit.
                            queue!(stdout, ResetColor)?;
                            cur_fg = None;
                        }
                    }
                    cur_bg = Some(cell.bg);
                }
                if cur_fg != Some(cell.fg) {
                    queue!(stdout, SetForegroundColor(cell.fg.to_crossterm()))?;
                    cur_fg = Some(cell.fg);
                }
                if cur_bold != cell.bold {
                    let attr = if cell.bold {
                        Attribute::Bold
                    } else {
                        Attribute::NormalIntensity
                    };
                    queue!(stdout, SetAttribute(attr))?;
                    cur_bold = cell.bold;
                }

                queue!(stdout, Print(cell.ch))?;
            }
        }

        queue!(stdout, ResetColor, EndSynchronizedUpdate)?;
        stdout.flush()?;

        std::mem::swap(&mut self.prev, &mut self.back);
        self.force_redraw = false;
        Ok(())
    }
}

/// Truncate `line` so its display width fits `max_width` cells.
fn clip_to_width(line: &str, max_width: usize) -> &str {
    let mut width = 0;
    for (i, ch) in line.char_indices() {
        let w = ch.width().unwrap_or(0);
        if width + w > max_width {
            return &line[..i];
        }
        width += w;
    }
    line
}
