// Terminal UI
// Draws the board with ratatui and turns crossterm mouse/key events into session calls

use std::io;
use std::time::{Duration, Instant};

use color_eyre::Result;
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
    KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use crossterm::{execute, terminal};
use rand::Rng;
use ratatui::Frame;
use ratatui::Terminal;
use ratatui::backend::{Backend, CrosstermBackend};
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Span, Spans, Text};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use tracing::{debug, warn};
use unicode_width::UnicodeWidthStr;

use crate::tsw_color::Palette;
use crate::tsw_config::Config;
use crate::tsw_game::{Difficulty, GameSession, GameState, TileRenderer};
use crate::tsw_grid::Pos;
use crate::tsw_lang::{Lang, fill};
use crate::tsw_reveal::{MarkOutcome, RevealOutcome, TileView};

const TICK_RATE: Duration = Duration::from_millis(200);

/// Last known view of every tile, kept current through [`GameSession::flush`]
#[derive(Debug, Default)]
struct TileCache {
    cols: usize,
    views: Vec<TileView>,
}

impl TileRenderer for TileCache {
    fn reset(&mut self, cols: usize, rows: usize) {
        self.cols = cols;
        self.views = vec![TileView::Hidden; cols * rows];
    }

    fn render_tile(&mut self, pos: Pos, view: TileView) {
        self.views[pos.row * self.cols + pos.col] = view;
    }
}

impl TileCache {
    fn get(&self, pos: Pos) -> TileView {
        self.views[pos.row * self.cols + pos.col]
    }
}

struct Glyphs {
    hidden: &'static str,
    flag: &'static str,
    mine: &'static str,
}

impl Glyphs {
    fn new(ascii: bool) -> Self {
        Glyphs {
            hidden: if ascii { "#" } else { "■" },
            flag: if ascii { "F" } else { "⚑" },
            mine: if ascii { "*" } else { "☼" },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Modal {
    Help,
    Difficulty { selected: usize },
    Won,
    Lost,
    Invalid(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Help,
    Start,
    Difficulty,
    RevealAll,
    Exit,
}

const MENU: [(&str, Command); 5] = [
    ("F1", Command::Help),
    ("F2", Command::Start),
    ("F5", Command::Difficulty),
    ("F8", Command::RevealAll),
    ("Esc", Command::Exit),
];

// Runtime UI variables grouped so the draw and event code can share them
#[derive(Debug, Default)]
struct UiState {
    modal: Option<Modal>,
    cursor: Pos,               // Keyboard cursor, follows the mouse over the board
    left_press: Option<Pos>,   // Cell the left button went down on
    right_held: Option<Pos>,   // Cell the right button is held on
    menu_hover: Option<usize>,
    exit_requested: bool,
    // geometry from the last draw, used for mouse hit-testing
    menu_rect: Option<Rect>,
    board_rect: Option<Rect>,
    modal_rect: Option<Rect>,
    modal_close_rect: Option<Rect>,
}

/// Run the UI until the player quits
pub fn run<R: Rng>(session: &mut GameSession<R>, cfg: &Config, lang: &Lang) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnableMouseCapture, terminal::EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App {
        session,
        cfg,
        lang,
        palette: Palette::detect(),
        glyphs: Glyphs::new(cfg.ascii_icons),
        tiles: TileCache::default(),
        ui: UiState::default(),
    };
    let result = app.event_loop(&mut terminal);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), DisableMouseCapture, terminal::LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    result
}

struct App<'a, R> {
    session: &'a mut GameSession<R>,
    cfg: &'a Config,
    lang: &'a Lang,
    palette: Palette,
    glyphs: Glyphs,
    tiles: TileCache,
    ui: UiState,
}

impl<R: Rng> App<'_, R> {
    fn event_loop<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<()> {
        self.session.flush(&mut self.tiles);
        loop {
            terminal.draw(|f| self.draw(f))?;

            let now = Instant::now();
            let timeout = self
                .session
                .timer()
                .until_next_tick(now)
                .map_or(TICK_RATE, |d| d.min(TICK_RATE));
            if event::poll(timeout)? {
                match event::read()? {
                    Event::Key(key) if key.kind == KeyEventKind::Press => self.handle_key(key),
                    Event::Mouse(me) => self.handle_mouse(me),
                    _ => {}
                }
            }

            self.session.tick(Instant::now());
            self.session.flush(&mut self.tiles);
            if self.ui.exit_requested {
                break;
            }
        }
        Ok(())
    }

    // ---- commands -------------------------------------------------------

    fn run_command(&mut self, command: Command) {
        match command {
            Command::Help => self.ui.modal = Some(Modal::Help),
            Command::Start => self.start(),
            Command::Difficulty => {
                let selected = self.session.difficulty().to_index();
                self.ui.modal = Some(Modal::Difficulty { selected });
            }
            Command::RevealAll => self.session.reveal_all_debug(),
            Command::Exit => self.ui.exit_requested = true,
        }
    }

    fn start(&mut self) {
        match self.session.start_game(Instant::now()) {
            Ok(()) => self.reset_pointer(),
            Err(e) => {
                warn!(error = %e, "cannot start game");
                self.ui.modal = Some(Modal::Invalid(e.to_string()));
            }
        }
    }

    fn choose_difficulty(&mut self, index: usize) {
        let difficulty = match Difficulty::PRESETS.get(index) {
            Some(preset) => *preset,
            None => self.cfg.custom_board(),
        };
        match self.session.select_difficulty(difficulty) {
            Ok(()) => {
                self.ui.modal = None;
                self.reset_pointer();
            }
            Err(e) => {
                warn!(error = %e, %difficulty, "difficulty rejected");
                self.ui.modal = Some(Modal::Invalid(e.to_string()));
            }
        }
    }

    fn reset_pointer(&mut self) {
        let (cols, rows) = self.session.size();
        let cursor = self.ui.cursor;
        self.ui.cursor = Pos::new(cursor.col.min(cols - 1), cursor.row.min(rows - 1));
        self.ui.left_press = None;
        self.ui.right_held = None;
    }

    // ---- presentation adapter ------------------------------------------

    fn primary(&mut self, pos: Pos) {
        let outcome = self.session.on_primary_activate(pos);
        match outcome {
            RevealOutcome::HitMine => self.ui.modal = Some(Modal::Lost),
            RevealOutcome::Won => self.ui.modal = Some(Modal::Won),
            RevealOutcome::Revealed | RevealOutcome::NoChange => {}
        }
        debug!(col = pos.col, row = pos.row, ?outcome, "primary");
    }

    fn secondary_press(&mut self, pos: Pos) {
        self.ui.right_held = Some(pos);
        if self.session.on_secondary_press(pos) == MarkOutcome::Changed {
            debug!(col = pos.col, row = pos.row, "flag toggled");
        }
    }

    fn secondary_release(&mut self) {
        if let Some(pos) = self.ui.right_held.take() {
            self.session.on_secondary_release(pos);
        }
    }

    // ---- keyboard --------------------------------------------------------

    fn handle_key(&mut self, key: KeyEvent) {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.ui.exit_requested = true;
            return;
        }
        if let Some(modal) = self.ui.modal.clone() {
            self.modal_key(modal, key);
            return;
        }
        let cursor = self.ui.cursor;
        match key.code {
            KeyCode::F(1) => self.run_command(Command::Help),
            KeyCode::F(2) => self.run_command(Command::Start),
            KeyCode::F(5) => self.run_command(Command::Difficulty),
            KeyCode::F(8) => self.run_command(Command::RevealAll),
            KeyCode::Esc | KeyCode::Char('q') => self.run_command(Command::Exit),
            KeyCode::Up | KeyCode::Char('k') => self.step_cursor(0, -1),
            KeyCode::Down | KeyCode::Char('j') => self.step_cursor(0, 1),
            KeyCode::Left | KeyCode::Char('h') => self.step_cursor(-1, 0),
            KeyCode::Right | KeyCode::Char('l') => self.step_cursor(1, 0),
            KeyCode::Char(' ') => self.primary(cursor),
            KeyCode::Char('f') | KeyCode::Char('F') => {
                self.secondary_press(cursor);
                self.secondary_release();
            }
            KeyCode::Enter if self.session.board().cell(cursor).revealed => {
                // same as holding the right button and clicking left
                self.secondary_press(cursor);
                self.primary(cursor);
                self.secondary_release();
            }
            _ => {}
        }
    }

    fn modal_key(&mut self, modal: Modal, key: KeyEvent) {
        match modal {
            Modal::Difficulty { selected } => match key.code {
                KeyCode::Up | KeyCode::Char('k') => {
                    self.ui.modal = Some(Modal::Difficulty { selected: (selected + 3) % 4 });
                }
                KeyCode::Down | KeyCode::Char('j') => {
                    self.ui.modal = Some(Modal::Difficulty { selected: (selected + 1) % 4 });
                }
                KeyCode::Enter | KeyCode::Char(' ') => self.choose_difficulty(selected),
                KeyCode::Char(c @ '1'..='4') => self.choose_difficulty(c as usize - '1' as usize),
                KeyCode::Esc | KeyCode::F(5) => self.ui.modal = None,
                _ => {}
            },
            _ => {
                if matches!(key.code, KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' ')) {
                    self.ui.modal = None;
                }
            }
        }
    }

    fn step_cursor(&mut self, dx: isize, dy: isize) {
        let (cols, rows) = self.session.size();
        let col = (self.ui.cursor.col as isize + dx).clamp(0, cols as isize - 1) as usize;
        let row = (self.ui.cursor.row as isize + dy).clamp(0, rows as isize - 1) as usize;
        self.ui.cursor = Pos::new(col, row);
    }

    // ---- mouse -----------------------------------------------------------

    fn handle_mouse(&mut self, me: MouseEvent) {
        if let Some(modal) = self.ui.modal.clone() {
            self.modal_mouse(modal, me);
            return;
        }

        let items = self.menu_items();
        let menu_hit = self
            .ui
            .menu_rect
            .and_then(|r| menu_item_at(r, &items, me.column, me.row));
        let (cols, rows) = self.session.size();
        let hit = self
            .ui
            .board_rect
            .and_then(|r| cell_at(r, cols, rows, me.column, me.row));

        match me.kind {
            MouseEventKind::Moved | MouseEventKind::Drag(_) => {
                self.ui.menu_hover = menu_hit;
                if let Some(pos) = hit {
                    self.ui.cursor = pos;
                }
            }
            MouseEventKind::Down(MouseButton::Left) => {
                if let Some(i) = menu_hit {
                    self.run_command(MENU[i].1);
                    return;
                }
                self.ui.left_press = hit;
            }
            MouseEventKind::Up(MouseButton::Left) => {
                // a press only counts if it is released on the same cell
                if let (Some(pressed), Some(released)) = (self.ui.left_press.take(), hit) {
                    if pressed == released {
                        self.primary(released);
                    }
                }
            }
            MouseEventKind::Down(MouseButton::Right) => {
                if let Some(pos) = hit {
                    self.secondary_press(pos);
                }
            }
            MouseEventKind::Up(MouseButton::Right) => self.secondary_release(),
            _ => {}
        }
    }

    fn modal_mouse(&mut self, modal: Modal, me: MouseEvent) {
        let inside = |r: Option<Rect>| r.is_some_and(|r| contains(r, me.column, me.row));
        if let Modal::Difficulty { .. } = modal {
            let picked = self
                .ui
                .modal_rect
                .and_then(|r| picker_item_at(r, me.column, me.row));
            if let Some(index) = picked {
                match me.kind {
                    MouseEventKind::Moved => {
                        self.ui.modal = Some(Modal::Difficulty { selected: index });
                    }
                    MouseEventKind::Down(MouseButton::Left) => self.choose_difficulty(index),
                    _ => {}
                }
                return;
            }
        }
        if me.kind == MouseEventKind::Down(MouseButton::Left) && inside(self.ui.modal_close_rect) {
            self.ui.modal = None;
        }
    }

    // ---- drawing ---------------------------------------------------------

    fn draw<B: Backend>(&mut self, f: &mut Frame<'_, B>) {
        let size = f.size();
        let (cols, rows) = self.session.size();
        let (board_w, board_h) = board_extent(cols, rows);
        let min_width = board_w.max(66);
        let min_height = board_h.saturating_add(6);
        if size.width < min_width || size.height < min_height {
            let assets = &self.lang.assets;
            let warn_lines = vec![
                Spans::from(Span::raw(assets.tsmsg_line1)),
                Spans::from(Span::raw(fill(assets.tsmsg_line2, &[&min_width, &min_height]))),
            ];
            let warn = Paragraph::new(Text::from(warn_lines))
                .block(Block::default().borders(Borders::ALL).title(assets.tsmsg_title))
                .alignment(Alignment::Center);
            f.render_widget(Clear, size);
            let w = 40u16.min(size.width.saturating_sub(2));
            let h = 5u16.min(size.height.saturating_sub(2));
            f.render_widget(warn, center_rect(w, h, size));
            self.ui.menu_rect = None;
            self.ui.board_rect = None;
            self.ui.modal_rect = None;
            self.ui.modal_close_rect = None;
            return;
        }

        // layout: top menu row, center board, bottom status
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .margin(0)
            .constraints(
                [
                    Constraint::Length(3),
                    Constraint::Min(6),
                    Constraint::Length(3),
                ]
                .as_ref(),
            )
            .split(size);

        self.draw_menu(f, chunks[0]);
        self.draw_board(f, chunks[1]);
        self.draw_status(f, chunks[2]);
        self.draw_modal(f, size);
    }

    fn menu_label(&self, command: Command) -> &'static str {
        let assets = &self.lang.assets;
        match command {
            Command::Help => assets.menu_help,
            Command::Start => assets.menu_start,
            Command::Difficulty => assets.menu_difficulty,
            Command::RevealAll => assets.menu_reveal_all,
            Command::Exit => assets.menu_exit,
        }
    }

    fn menu_items(&self) -> Vec<(&'static str, &'static str)> {
        MENU.iter()
            .map(|(key, command)| (*key, self.menu_label(*command)))
            .collect()
    }

    fn draw_menu<B: Backend>(&mut self, f: &mut Frame<'_, B>, area: Rect) {
        let mut spans = vec![Span::raw(" ")];
        for (i, (key, label)) in self.menu_items().into_iter().enumerate() {
            if i > 0 {
                spans.push(Span::raw(MENU_GAP));
            }
            let (key_style, rest_style) = if Some(i) == self.ui.menu_hover {
                let hover = Style::default().bg(self.palette.menu_hover_bg);
                (hover.add_modifier(Modifier::BOLD), hover)
            } else {
                (
                    Style::default().fg(self.palette.menu_key).add_modifier(Modifier::BOLD),
                    Style::default(),
                )
            };
            spans.push(Span::styled(key.to_string(), key_style));
            spans.push(Span::styled(format!(": {label}"), rest_style));
        }
        let menu = Paragraph::new(Spans::from(spans)).block(Block::default().borders(Borders::ALL));
        f.render_widget(menu, area);
        self.ui.menu_rect = Some(area);
    }

    fn draw_board<B: Backend>(&mut self, f: &mut Frame<'_, B>, area: Rect) {
        let (cols, rows) = self.session.size();
        let (board_w, board_h) = board_extent(cols, rows);
        let board_area = centered_block(board_w, board_h, area);
        self.ui.board_rect = Some(board_area);

        let board_bg = self.palette.board_bg;
        let show_cursor = self.cfg.show_indicator && !self.session.state().is_finished();
        let detonated = self.session.board().detonated();
        let chord_area: Vec<Pos> = self
            .session
            .chord_intent()
            .map(|c| self.session.board().grid().neighbors(c))
            .unwrap_or_default();

        let mut lines = Vec::with_capacity(rows);
        for row in 0..rows {
            let mut spans = Vec::with_capacity(cols + 1);
            for col in 0..cols {
                let pos = Pos::new(col, row);
                let view = self.tiles.get(pos);
                let glyph = match view {
                    TileView::Hidden => self.glyphs.hidden.to_string(),
                    TileView::Flagged => self.glyphs.flag.to_string(),
                    TileView::Mine => self.glyphs.mine.to_string(),
                    TileView::Numeral(0) => " ".to_string(),
                    TileView::Numeral(n) => n.to_string(),
                };
                let mut style = Style::default().fg(self.palette.tile_fg(view)).bg(board_bg);
                if matches!(view, TileView::Numeral(_)) {
                    style = style.add_modifier(Modifier::BOLD);
                }
                let pressed = self.ui.left_press == Some(pos) || chord_area.contains(&pos);
                if detonated == Some(pos) {
                    style = style.bg(self.palette.detonated_bg);
                } else if pressed && view == TileView::Hidden {
                    style = style.bg(self.palette.chord_bg).fg(self.palette.chord_bg);
                } else if show_cursor && self.ui.cursor == pos {
                    style = style.bg(self.palette.hover_bg);
                }
                spans.push(Span::styled(format!(" {glyph}"), style));
            }
            // trailing pad column keeps the board background on the right edge
            spans.push(Span::styled(" ", Style::default().bg(board_bg)));
            lines.push(Spans::from(spans));
        }

        let title = self.lang.diff_name(self.session.difficulty().to_index());
        let paragraph = Paragraph::new(Text::from(lines))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(title)
                    .title_alignment(Alignment::Center),
            )
            .alignment(Alignment::Left);
        f.render_widget(paragraph, board_area);
    }

    fn draw_status<B: Backend>(&mut self, f: &mut Frame<'_, B>, area: Rect) {
        let assets = &self.lang.assets;
        let mines = format!("{:03}", self.session.mines_left());
        let time = format!("{:03}", self.session.elapsed_secs().min(999));
        let left_text = fill(assets.status_mines_fmt, &[&mines, &time]);
        let right_text = match self.session.state() {
            GameState::Idle => assets.state_idle,
            GameState::Playing => assets.state_playing,
            GameState::Won => assets.state_won,
            GameState::Lost => assets.state_lost,
        };
        let inner_w = area.width.saturating_sub(2) as usize;
        let used = left_text.as_str().width() + right_text.width() + 1;
        let mid_spaces = inner_w.saturating_sub(used).max(1);
        let status = Paragraph::new(Spans::from(vec![
            Span::raw(left_text),
            Span::raw(" ".repeat(mid_spaces)),
            Span::styled(right_text, Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(" "),
        ]))
        .block(Block::default().borders(Borders::ALL));
        f.render_widget(status, area);
    }

    fn draw_modal<B: Backend>(&mut self, f: &mut Frame<'_, B>, size: Rect) {
        self.ui.modal_rect = None;
        self.ui.modal_close_rect = None;
        let Some(modal) = self.ui.modal.clone() else {
            return;
        };
        let lang = self.lang;
        let assets = &lang.assets;
        match modal {
            Modal::Help => {
                let lines = [
                    assets.help_controls,
                    assets.help_move,
                    assets.help_reveal,
                    assets.help_flag,
                    assets.help_chord,
                    assets.help_start,
                ]
                .into_iter()
                .map(|l| Spans::from(Span::raw(l)))
                .collect();
                self.draw_dialog(f, centered_block(48, 10, size), assets.menu_help, lines, true);
            }
            Modal::Difficulty { selected } => {
                let custom = self.cfg.custom_board();
                let options = [
                    Difficulty::Beginner,
                    Difficulty::Intermediate,
                    Difficulty::Expert,
                    custom,
                ];
                let lines = options
                    .iter()
                    .enumerate()
                    .map(|(i, d)| {
                        let (mines, cols, rows) = d.params();
                        let text = format!(
                            " {}. {:<14}{}",
                            i + 1,
                            lang.diff_name(i),
                            fill(assets.diff_board_fmt, &[&cols, &rows, &mines])
                        );
                        let style = if i == selected {
                            Style::default()
                                .bg(self.palette.menu_hover_bg)
                                .add_modifier(Modifier::BOLD)
                        } else {
                            Style::default()
                        };
                        Spans::from(Span::styled(text, style))
                    })
                    .collect();
                let rect = centered_block(44, 6, size);
                self.draw_dialog(f, rect, assets.menu_difficulty, lines, false);
            }
            Modal::Won => {
                let time = fill(assets.win_time_fmt, &[&self.session.elapsed_secs()]);
                let lines = vec![
                    Spans::from(""),
                    Spans::from(Span::raw(assets.win_message)),
                    Spans::from(Span::raw(time)),
                ];
                let rect = bottom_centered_block(40, 7, size);
                self.draw_dialog(f, rect, assets.win_title, lines, true);
            }
            Modal::Lost => {
                let lines = vec![Spans::from(""), Spans::from(Span::raw(assets.loss_message))];
                let rect = bottom_centered_block(40, 6, size);
                self.draw_dialog(f, rect, assets.loss_title, lines, true);
            }
            Modal::Invalid(message) => {
                let lines = vec![Spans::from(""), Spans::from(Span::raw(format!(" {message}")))];
                let width = (message.width() as u16 + 4).clamp(30, size.width);
                let rect = centered_block(width, 6, size);
                self.draw_dialog(f, rect, assets.diff_invalid_title, lines, true);
            }
        }
    }

    fn draw_dialog<B: Backend>(
        &mut self,
        f: &mut Frame<'_, B>,
        rect: Rect,
        title: &'static str,
        lines: Vec<Spans<'static>>,
        close_button: bool,
    ) {
        self.ui.modal_rect = Some(rect);
        f.render_widget(Clear, rect);
        let body = Paragraph::new(Text::from(lines))
            .block(Block::default().borders(Borders::ALL).title(title))
            .alignment(Alignment::Left);
        f.render_widget(body, rect);

        if close_button {
            let label = self.lang.assets.btn_close;
            let btn_w = label.width() as u16;
            let bx = rect.x + rect.width.saturating_sub(btn_w) / 2;
            let by = rect.y + rect.height.saturating_sub(2);
            let btn_rect = Rect::new(bx, by, btn_w, 1);
            self.ui.modal_close_rect = Some(btn_rect);
            let style = Style::default()
                .bg(self.palette.hidden)
                .fg(self.palette.mine)
                .add_modifier(Modifier::BOLD);
            f.render_widget(Paragraph::new(Spans::from(Span::styled(label, style))), btn_rect);
        }
    }
}

const MENU_GAP: &str = "   ";

/// Outer size of the board block: two columns per cell, the border and a pad column
fn board_extent(cols: usize, rows: usize) -> (u16, u16) {
    let width = u16::try_from(cols * 2 + 3).unwrap_or(u16::MAX);
    let height = u16::try_from(rows + 2).unwrap_or(u16::MAX);
    (width, height)
}

/// Board cell under a terminal position; cells are two columns wide
fn cell_at(board: Rect, cols: usize, rows: usize, column: u16, row: u16) -> Option<Pos> {
    let inner = Rect::new(
        board.x + 1,
        board.y + 1,
        board.width.saturating_sub(2),
        board.height.saturating_sub(2),
    );
    if !contains(inner, column, row) {
        return None;
    }
    let cx = ((column - inner.x) / 2) as usize;
    let cy = (row - inner.y) as usize;
    (cx < cols && cy < rows).then_some(Pos::new(cx, cy))
}

/// Index of the menu item under a terminal position
///
/// `items` are the key/label pairs in the order [`App::draw_menu`] lays them out.
fn menu_item_at(menu: Rect, items: &[(&str, &str)], column: u16, row: u16) -> Option<usize> {
    if row != menu.y + 1 {
        return None;
    }
    // border + leading space
    let mut x = menu.x + 2;
    for (i, (key, label)) in items.iter().enumerate() {
        let w = (key.width() + 2 + label.width()) as u16;
        if column >= x && column < x + w {
            return Some(i);
        }
        x += w + MENU_GAP.width() as u16;
    }
    None
}

/// Row of the difficulty picker under a terminal position
fn picker_item_at(dialog: Rect, column: u16, row: u16) -> Option<usize> {
    if !contains(dialog, column, row) || row <= dialog.y {
        return None;
    }
    let index = (row - dialog.y - 1) as usize;
    (index < 4).then_some(index)
}

fn contains(r: Rect, column: u16, row: u16) -> bool {
    column >= r.x && column < r.x + r.width && row >= r.y && row < r.y + r.height
}

fn center_rect(width: u16, height: u16, r: Rect) -> Rect {
    let width = width.min(r.width);
    let height = height.min(r.height);
    let x = r.x + (r.width.saturating_sub(width)) / 2;
    let y = r.y + (r.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width, height)
}

fn centered_block(w: u16, h: u16, r: Rect) -> Rect {
    center_rect(w, h, r)
}

fn bottom_centered_block(width: u16, height: u16, r: Rect) -> Rect {
    let width = width.min(r.width);
    let height = height.min(r.height);
    let x = r.x + (r.width.saturating_sub(width)) / 2;
    let y = r.y + r.height.saturating_sub(height);
    Rect::new(x, y, width, height)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tsw_grid::{MAX_COLS, MAX_ROWS};

    #[test]
    fn cells_are_two_columns_wide_inside_the_border() {
        // 9x9 board: width 9*2+3, height 9+2
        let board = Rect::new(10, 5, 21, 11);

        assert_eq!(cell_at(board, 9, 9, 11, 6), Some(Pos::new(0, 0)));
        assert_eq!(cell_at(board, 9, 9, 12, 6), Some(Pos::new(0, 0)));
        assert_eq!(cell_at(board, 9, 9, 13, 6), Some(Pos::new(1, 0)));
        assert_eq!(cell_at(board, 9, 9, 28, 14), Some(Pos::new(8, 8)));
        // border and trailing pad column
        assert_eq!(cell_at(board, 9, 9, 10, 6), None);
        assert_eq!(cell_at(board, 9, 9, 29, 6), None);
        assert_eq!(cell_at(board, 9, 9, 12, 5), None);
        assert_eq!(cell_at(board, 9, 9, 12, 15), None);
    }

    #[test]
    fn board_extent_covers_the_largest_board() {
        assert_eq!(board_extent(9, 9), (21, 11));
        assert_eq!(board_extent(MAX_COLS, MAX_ROWS), (131, 42));
        assert_eq!(board_extent(1, 70000), (5, u16::MAX));
    }

    #[test]
    fn menu_hit_test_follows_label_widths() {
        let menu = Rect::new(0, 0, 80, 3);
        let items = [("F1", "Help"), ("F2", "Start"), ("Esc", "Exit")];

        // " F1: Help   F2: Start   Esc: Exit" after the left border
        assert_eq!(menu_item_at(menu, &items, 2, 1), Some(0));
        assert_eq!(menu_item_at(menu, &items, 9, 1), Some(0));
        assert_eq!(menu_item_at(menu, &items, 10, 1), None);
        assert_eq!(menu_item_at(menu, &items, 13, 1), Some(1));
        assert_eq!(menu_item_at(menu, &items, 25, 1), Some(2));
        assert_eq!(menu_item_at(menu, &items, 2, 0), None);
    }

    #[test]
    fn wide_labels_shift_later_items() {
        let menu = Rect::new(0, 0, 80, 3);
        let items = [("F1", "帮助"), ("F2", "开始")];

        // "F1: 帮助" is 8 columns wide
        assert_eq!(menu_item_at(menu, &items, 9, 1), Some(0));
        assert_eq!(menu_item_at(menu, &items, 10, 1), None);
        assert_eq!(menu_item_at(menu, &items, 13, 1), Some(1));
    }

    #[test]
    fn picker_rows_map_to_difficulties() {
        let dialog = Rect::new(5, 5, 44, 6);

        assert_eq!(picker_item_at(dialog, 10, 5), None);
        assert_eq!(picker_item_at(dialog, 10, 6), Some(0));
        assert_eq!(picker_item_at(dialog, 10, 9), Some(3));
        assert_eq!(picker_item_at(dialog, 10, 10), None);
        assert_eq!(picker_item_at(dialog, 60, 6), None);
    }

    #[test]
    fn blocks_are_clamped_to_the_area() {
        let area = Rect::new(0, 0, 20, 10);

        assert_eq!(center_rect(10, 4, area), Rect::new(5, 3, 10, 4));
        assert_eq!(center_rect(40, 40, area), area);
        assert_eq!(bottom_centered_block(10, 4, area), Rect::new(5, 6, 10, 4));
    }

    #[test]
    fn tile_cache_tracks_rendered_views() {
        let mut cache = TileCache::default();
        cache.reset(3, 2);
        cache.render_tile(Pos::new(2, 1), TileView::Numeral(3));

        assert_eq!(cache.get(Pos::new(2, 1)), TileView::Numeral(3));
        assert_eq!(cache.get(Pos::new(0, 0)), TileView::Hidden);

        cache.reset(2, 2);
        assert_eq!(cache.views.len(), 4);
        assert_eq!(cache.get(Pos::new(1, 1)), TileView::Hidden);
    }
}
