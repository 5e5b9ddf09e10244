// Game lifecycle
// Difficulty presets, the Idle/Playing/Won/Lost state machine and the calls the UI drives it with

use std::fmt;
use std::str::FromStr;
use std::time::Instant;

use rand::Rng;
use tracing::{debug, info};

use crate::tsw_error::Result;
use crate::tsw_grid::{Grid, Placement, Pos};
use crate::tsw_reveal::{Board, MarkOutcome, RevealOutcome, TileView};
use crate::tsw_timer::TickTimer;

/// Difficulty presets and custom settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Difficulty {
    Beginner,     // 9x9, 10 mines
    Intermediate, // 15x15, 40 mines
    Expert,       // 30x16, 99 mines
    Custom { mines: usize, cols: usize, rows: usize },
}

impl Difficulty {
    pub const PRESETS: [Difficulty; 3] = [
        Difficulty::Beginner,
        Difficulty::Intermediate,
        Difficulty::Expert,
    ];

    /// Mine count, columns and rows for this difficulty
    pub fn params(&self) -> (usize, usize, usize) {
        match *self {
            Difficulty::Beginner => (10, 9, 9),
            Difficulty::Intermediate => (40, 15, 15),
            Difficulty::Expert => (99, 30, 16),
            Difficulty::Custom { mines, cols, rows } => (mines, cols, rows),
        }
    }

    /// Stable identifier used on the command line and in the config file
    pub fn name(&self) -> &'static str {
        match self {
            Difficulty::Beginner => "beginner",
            Difficulty::Intermediate => "intermediate",
            Difficulty::Expert => "expert",
            Difficulty::Custom { .. } => "custom",
        }
    }

    /// Position in the difficulty picker (0-3)
    pub fn to_index(&self) -> usize {
        match self {
            Difficulty::Beginner => 0,
            Difficulty::Intermediate => 1,
            Difficulty::Expert => 2,
            Difficulty::Custom { .. } => 3,
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Difficulty::Custom { mines, cols, rows } => {
                write!(f, "custom {cols}x{rows}, {mines} mines")
            }
            preset => f.write_str(preset.name()),
        }
    }
}

impl FromStr for Difficulty {
    type Err = String;

    /// Accepts a preset name, or `custom` followed by `COLSxROWSxMINES`
    /// (e.g. `custom:20x12x30`)
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        match lower.as_str() {
            "beginner" => Ok(Difficulty::Beginner),
            "intermediate" => Ok(Difficulty::Intermediate),
            "expert" => Ok(Difficulty::Expert),
            other => {
                let dims = other
                    .strip_prefix("custom:")
                    .ok_or_else(|| format!("unknown difficulty `{s}`"))?;
                let parts: Vec<usize> = dims
                    .split('x')
                    .map(|v| v.parse::<usize>())
                    .collect::<std::result::Result<_, _>>()
                    .map_err(|e| format!("bad custom difficulty `{s}`: {e}"))?;
                match parts[..] {
                    [cols, rows, mines] => Ok(Difficulty::Custom { mines, cols, rows }),
                    _ => Err(format!("custom difficulty should be COLSxROWSxMINES, got `{s}`")),
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameState {
    Idle,    // No timer; board inert until started
    Playing, // Timer running, input accepted
    Won,
    Lost,
}

impl GameState {
    pub fn accepts_input(self) -> bool {
        matches!(self, GameState::Playing)
    }

    pub fn is_finished(self) -> bool {
        matches!(self, GameState::Won | GameState::Lost)
    }
}

/// Receives tile updates from a [`GameSession`]
pub trait TileRenderer {
    /// The board was replaced; every tile will be rendered next
    fn reset(&mut self, cols: usize, rows: usize);

    fn render_tile(&mut self, pos: Pos, view: TileView);
}

/// One player's game: the board, its lifecycle state and the clock
///
/// Owned by the event loop; every call runs to completion before the next
/// input is handled.
pub struct GameSession<R> {
    difficulty: Difficulty,
    placement: Placement,
    board: Board,
    state: GameState,
    timer: TickTimer,
    chord_intent: Option<Pos>, // Revealed cell the secondary button is held on
    full_redraw: bool,
    rng: R,
}

impl<R: Rng> GameSession<R> {
    /// Create an idle session with a freshly generated board
    pub fn new(difficulty: Difficulty, placement: Placement, mut rng: R) -> Result<Self> {
        let board = Board::new(generate(difficulty, placement, &mut rng)?);
        Ok(GameSession {
            difficulty,
            placement,
            board,
            state: GameState::Idle,
            timer: TickTimer::new(),
            chord_intent: None,
            full_redraw: true,
            rng,
        })
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Columns and rows of the current board
    pub fn size(&self) -> (usize, usize) {
        (self.board.grid().cols(), self.board.grid().rows())
    }

    pub fn view(&self, pos: Pos) -> TileView {
        self.board.view(pos)
    }

    /// Mines minus flags; negative when the player over-flags
    pub fn mines_left(&self) -> isize {
        self.board.grid().mine_count() as isize - self.board.flagged_count() as isize
    }

    pub fn elapsed_secs(&self) -> u64 {
        self.timer.seconds()
    }

    pub fn timer(&self) -> &TickTimer {
        &self.timer
    }

    pub fn chord_intent(&self) -> Option<Pos> {
        self.chord_intent
    }

    /// Begin a new game on a fresh board; a game in progress is discarded
    pub fn start_game(&mut self, now: Instant) -> Result<()> {
        let grid = generate(self.difficulty, self.placement, &mut self.rng)?;
        self.begin(grid, now);
        Ok(())
    }

    fn begin(&mut self, grid: Grid, now: Instant) {
        self.timer.reset();
        self.replace_board(grid);
        self.state = GameState::Playing;
        self.timer.start(now);
        info!(difficulty = %self.difficulty, "game started");
    }

    /// Switch difficulty; always lands in Idle with a new board
    ///
    /// An invalid difficulty is reported and leaves the session untouched.
    pub fn select_difficulty(&mut self, difficulty: Difficulty) -> Result<()> {
        let grid = generate(difficulty, self.placement, &mut self.rng)?;
        self.timer.reset();
        self.difficulty = difficulty;
        self.replace_board(grid);
        self.state = GameState::Idle;
        debug!(%difficulty, "difficulty selected");
        Ok(())
    }

    fn replace_board(&mut self, grid: Grid) {
        self.board = Board::new(grid);
        self.chord_intent = None;
        self.full_redraw = true;
    }

    /// Left click / primary activation on a cell
    pub fn on_primary_activate(&mut self, pos: Pos) -> RevealOutcome {
        if !self.state.accepts_input() {
            return RevealOutcome::NoChange;
        }
        if self.board.cell(pos).revealed {
            if self.chord_intent == Some(pos) {
                return self.chord_reveal(pos);
            }
            return RevealOutcome::NoChange;
        }
        self.reveal(pos)
    }

    /// Right button down: flag a hidden cell, or arm a chord on a revealed one
    pub fn on_secondary_press(&mut self, pos: Pos) -> MarkOutcome {
        if !self.state.accepts_input() {
            return MarkOutcome::NoChange;
        }
        if self.board.cell(pos).revealed {
            self.chord_intent = Some(pos);
            MarkOutcome::NoChange
        } else {
            self.toggle_flag(pos)
        }
    }

    pub fn on_secondary_release(&mut self, _pos: Pos) {
        self.chord_intent = None;
    }

    pub fn reveal(&mut self, pos: Pos) -> RevealOutcome {
        if !self.state.accepts_input() {
            return RevealOutcome::NoChange;
        }
        let outcome = self.board.reveal_single(pos);
        self.settle(outcome)
    }

    pub fn chord_reveal(&mut self, pos: Pos) -> RevealOutcome {
        if !self.state.accepts_input() {
            return RevealOutcome::NoChange;
        }
        let outcome = self.board.chord_reveal(pos);
        self.settle(outcome)
    }

    pub fn toggle_flag(&mut self, pos: Pos) -> MarkOutcome {
        if !self.state.accepts_input() {
            return MarkOutcome::NoChange;
        }
        self.board.toggle_flag(pos)
    }

    /// Show the whole board; a running game is forfeited
    pub fn reveal_all_debug(&mut self) {
        self.board.reveal_all();
        if self.state == GameState::Playing {
            self.timer.stop();
            self.state = GameState::Lost;
            info!("board revealed, game forfeited");
        }
    }

    /// Advance the clock; true when the displayed time changed
    pub fn tick(&mut self, now: Instant) -> bool {
        self.timer.poll(now) > 0
    }

    /// Deliver pending tile updates to `renderer`
    pub fn flush(&mut self, renderer: &mut impl TileRenderer) {
        let changes = self.board.take_changes();
        if self.full_redraw {
            self.full_redraw = false;
            self.redraw_all(renderer);
            return;
        }
        for pos in changes {
            renderer.render_tile(pos, self.board.view(pos));
        }
    }

    pub fn redraw_all(&self, renderer: &mut impl TileRenderer) {
        let (cols, rows) = self.size();
        renderer.reset(cols, rows);
        for cell in self.board.grid().cells() {
            renderer.render_tile(cell.pos, self.board.view(cell.pos));
        }
    }

    fn settle(&mut self, outcome: RevealOutcome) -> RevealOutcome {
        match outcome {
            RevealOutcome::HitMine => {
                self.timer.stop();
                self.state = GameState::Lost;
                self.board.reveal_all_mines();
                info!(secs = self.timer.seconds(), "game lost");
            }
            RevealOutcome::Won => {
                self.timer.stop();
                self.state = GameState::Won;
                info!(secs = self.timer.seconds(), "game won");
            }
            RevealOutcome::Revealed | RevealOutcome::NoChange => {}
        }
        outcome
    }

    #[cfg(test)]
    fn start_with(&mut self, grid: Grid, now: Instant) {
        self.begin(grid, now);
    }
}

fn generate<R: Rng>(difficulty: Difficulty, placement: Placement, rng: &mut R) -> Result<Grid> {
    let (mines, cols, rows) = difficulty.params();
    Grid::generate(mines, cols, rows, placement, rng)
}
