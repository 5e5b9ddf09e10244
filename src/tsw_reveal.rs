// Reveal engine
// Single, flood and chord reveals, flag toggling and win/loss detection over one grid

use std::collections::VecDeque;
use std::ops::BitOr;

use tracing::debug;

use crate::tsw_grid::{Cell, Content, Grid, Pos};

/// What the presentation layer needs to draw one tile
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TileView {
    Hidden,
    Flagged,
    Numeral(u8),
    Mine,
}

impl TileView {
    pub fn of(cell: &Cell) -> TileView {
        match (cell.revealed, cell.flagged, cell.content) {
            (_, true, _) => TileView::Flagged,
            (false, false, _) => TileView::Hidden,
            (true, false, Content::Mine) => TileView::Mine,
            (true, false, Content::Hint(n)) => TileView::Numeral(n),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RevealOutcome {
    NoChange,
    Revealed,
    HitMine,
    Won,
}

impl BitOr for RevealOutcome {
    type Output = RevealOutcome;

    fn bitor(self, rhs: Self) -> Self::Output {
        use RevealOutcome::*;
        match (self, rhs) {
            (HitMine, _) | (_, HitMine) => HitMine,
            (Won, _) | (_, Won) => Won,
            (Revealed, _) | (_, Revealed) => Revealed,
            (NoChange, NoChange) => NoChange,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MarkOutcome {
    NoChange,
    Changed,
}

/// A grid in play: per-cell reveal/flag state plus the running counters
#[derive(Debug, Clone)]
pub struct Board {
    grid: Grid,
    revealed_count: usize,     // Safe cells revealed so far
    flagged_count: usize,
    detonated: Option<Pos>,    // Mine revealed by the player, if any
    changes: Vec<Pos>,         // Cells whose view changed since the last take_changes
}

impl Board {
    pub fn new(grid: Grid) -> Self {
        Board {
            grid,
            revealed_count: 0,
            flagged_count: 0,
            detonated: None,
            changes: Vec::new(),
        }
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn cell(&self, pos: Pos) -> &Cell {
        &self.grid[pos]
    }

    pub fn view(&self, pos: Pos) -> TileView {
        TileView::of(&self.grid[pos])
    }

    pub fn revealed_count(&self) -> usize {
        self.revealed_count
    }

    pub fn flagged_count(&self) -> usize {
        self.flagged_count
    }

    pub fn detonated(&self) -> Option<Pos> {
        self.detonated
    }

    /// Reveal one cell; zero cells open their whole region
    pub fn reveal_single(&mut self, pos: Pos) -> RevealOutcome {
        let cell = self.grid[pos];
        if cell.flagged || cell.revealed {
            return RevealOutcome::NoChange;
        }
        if cell.hint() == Some(0) {
            return self.flood_reveal(pos);
        }
        self.open(pos);
        if cell.is_mine() {
            debug!(col = pos.col, row = pos.row, "mine revealed");
            self.detonated = Some(pos);
            return RevealOutcome::HitMine;
        }
        self.settle()
    }

    /// Reveal the connected zero region around `pos` together with its
    /// numbered border
    ///
    /// Works off a queue; a cell is marked revealed before it is queued, so
    /// the revealed flag doubles as the visited set. Flagged cells stop the
    /// fill and keep their flag.
    pub fn flood_reveal(&mut self, pos: Pos) -> RevealOutcome {
        let cell = self.grid[pos];
        if cell.flagged || cell.revealed {
            return RevealOutcome::NoChange;
        }
        if cell.hint() != Some(0) {
            return self.reveal_single(pos);
        }

        self.open(pos);
        let mut queue = VecDeque::from([pos]);
        while let Some(next) = queue.pop_front() {
            for nb in self.grid.neighbors(next) {
                let neighbor = self.grid[nb];
                if neighbor.revealed || neighbor.flagged {
                    continue;
                }
                // neighbours of a zero cell are never mines
                self.open(nb);
                if neighbor.hint() == Some(0) {
                    queue.push_back(nb);
                }
            }
        }
        self.settle()
    }

    /// Reveal every hidden, unflagged neighbour of a revealed number once the
    /// flags around it match the number exactly
    pub fn chord_reveal(&mut self, pos: Pos) -> RevealOutcome {
        let cell = self.grid[pos];
        if !cell.revealed {
            return RevealOutcome::NoChange;
        }
        let hint = match cell.hint() {
            Some(n @ 1..=8) => n as usize,
            _ => return RevealOutcome::NoChange,
        };
        if self.flagged_neighbors(pos) != hint {
            return RevealOutcome::NoChange;
        }
        self.grid
            .neighbors(pos)
            .into_iter()
            .map(|nb| self.reveal_single(nb))
            .fold(RevealOutcome::NoChange, BitOr::bitor)
    }

    pub fn toggle_flag(&mut self, pos: Pos) -> MarkOutcome {
        let cell = self.grid.cell_mut(pos);
        if cell.revealed {
            return MarkOutcome::NoChange;
        }
        cell.flagged = !cell.flagged;
        if cell.flagged {
            self.flagged_count += 1;
        } else {
            self.flagged_count -= 1;
        }
        self.changes.push(pos);
        MarkOutcome::Changed
    }

    pub fn flagged_neighbors(&self, pos: Pos) -> usize {
        self.grid
            .neighbors(pos)
            .into_iter()
            .filter(|nb| self.grid[*nb].flagged)
            .count()
    }

    pub fn check_win(&self) -> bool {
        self.detonated.is_none() && self.revealed_count == self.grid.safe_count()
    }

    /// Show every unflagged mine; counters are left alone
    pub fn reveal_all_mines(&mut self) {
        self.force_open(|cell| cell.is_mine());
    }

    /// Show every unflagged cell; counters are left alone
    pub fn reveal_all(&mut self) {
        self.force_open(|_| true);
    }

    /// Positions whose view changed since the previous call
    pub fn take_changes(&mut self) -> Vec<Pos> {
        std::mem::take(&mut self.changes)
    }

    fn open(&mut self, pos: Pos) {
        let cell = self.grid.cell_mut(pos);
        cell.revealed = true;
        if !cell.is_mine() {
            self.revealed_count += 1;
        }
        self.changes.push(pos);
    }

    fn force_open(&mut self, select: impl Fn(&Cell) -> bool) {
        for cell in self.grid.cells_mut() {
            if !cell.revealed && !cell.flagged && select(cell) {
                cell.revealed = true;
                self.changes.push(cell.pos);
            }
        }
    }

    fn settle(&self) -> RevealOutcome {
        if self.check_win() {
            RevealOutcome::Won
        } else {
            RevealOutcome::Revealed
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board(cols: usize, rows: usize, mines: &[(usize, usize)]) -> Board {
        let mines: Vec<Pos> = mines.iter().map(|&(c, r)| Pos::new(c, r)).collect();
        Board::new(Grid::from_mines(cols, rows, &mines).unwrap())
    }

    fn revealed(board: &Board) -> Vec<Pos> {
        board.grid().cells().filter(|c| c.revealed).map(|c| c.pos).collect()
    }

    #[test]
    fn empty_board_floods_and_wins_from_any_cell() {
        let mut b = board(9, 9, &[]);

        assert_eq!(b.reveal_single(Pos::new(4, 7)), RevealOutcome::Won);
        assert_eq!(b.revealed_count(), 81);
        assert!(b.grid().cells().all(|c| c.revealed));
    }

    #[test]
    fn flood_never_reveals_corner_mine() {
        let mut b = board(9, 9, &[(0, 0)]);

        assert_eq!(b.reveal_single(Pos::new(8, 8)), RevealOutcome::Won);
        assert!(!b.cell(Pos::new(0, 0)).revealed);
        assert_eq!(b.view(Pos::new(1, 1)), TileView::Numeral(1));
        assert_eq!(b.detonated(), None);
    }

    #[test]
    fn flood_stops_at_numbered_border() {
        // column 2 is a wall of mines
        let mut b = board(5, 5, &[(2, 0), (2, 1), (2, 2), (2, 3), (2, 4)]);

        assert_eq!(b.reveal_single(Pos::new(0, 2)), RevealOutcome::Revealed);

        let mut expected: Vec<Pos> = (0..5)
            .flat_map(|row| [Pos::new(0, row), Pos::new(1, row)])
            .collect();
        expected.sort_by_key(|p| (p.row, p.col));
        assert_eq!(revealed(&b), expected);
        assert_eq!(b.revealed_count(), 10);
    }

    #[test]
    fn flood_skips_flagged_cells_and_keeps_flags() {
        let mut b = board(4, 1, &[(3, 0)]);
        b.toggle_flag(Pos::new(1, 0));

        assert_eq!(b.reveal_single(Pos::new(0, 0)), RevealOutcome::Revealed);
        assert_eq!(b.view(Pos::new(1, 0)), TileView::Flagged);
        assert!(!b.cell(Pos::new(2, 0)).revealed);
        assert_eq!(b.flagged_count(), 1);
    }

    #[test]
    fn revealing_flagged_or_revealed_cell_is_ignored() {
        let mut b = board(3, 3, &[(0, 0)]);
        b.toggle_flag(Pos::new(0, 0));
        assert_eq!(b.reveal_single(Pos::new(0, 0)), RevealOutcome::NoChange);

        assert_eq!(b.reveal_single(Pos::new(1, 1)), RevealOutcome::Revealed);
        assert_eq!(b.reveal_single(Pos::new(1, 1)), RevealOutcome::NoChange);
        assert_eq!(b.revealed_count(), 1);
    }

    #[test]
    fn revealing_mine_detonates() {
        let mut b = board(2, 2, &[(0, 0)]);

        assert_eq!(b.reveal_single(Pos::new(0, 0)), RevealOutcome::HitMine);
        assert_eq!(b.detonated(), Some(Pos::new(0, 0)));
        assert_eq!(b.view(Pos::new(0, 0)), TileView::Mine);
        assert_eq!(b.revealed_count(), 0);
        assert!(!b.check_win());
    }

    #[test]
    fn chord_with_wrong_flag_hits_hidden_mine() {
        let mut b = board(3, 3, &[(0, 0), (2, 0)]);
        b.reveal_single(Pos::new(1, 1));
        assert_eq!(b.view(Pos::new(1, 1)), TileView::Numeral(2));
        b.toggle_flag(Pos::new(0, 0));
        b.toggle_flag(Pos::new(0, 2));

        assert_eq!(b.chord_reveal(Pos::new(1, 1)), RevealOutcome::HitMine);
        assert_eq!(b.detonated(), Some(Pos::new(2, 0)));
    }

    #[test]
    fn chord_with_too_few_flags_is_a_no_op() {
        let mut b = board(3, 3, &[(0, 0), (2, 0)]);
        b.reveal_single(Pos::new(1, 1));
        b.toggle_flag(Pos::new(0, 0));
        let before: Vec<Cell> = b.grid().cells().copied().collect();
        b.take_changes();

        assert_eq!(b.chord_reveal(Pos::new(1, 1)), RevealOutcome::NoChange);
        let after: Vec<Cell> = b.grid().cells().copied().collect();
        assert_eq!(before, after);
        assert!(b.take_changes().is_empty());
    }

    #[test]
    fn chord_with_too_many_flags_is_a_no_op() {
        let mut b = board(3, 3, &[(0, 0)]);
        b.reveal_single(Pos::new(1, 1));
        b.toggle_flag(Pos::new(0, 0));
        b.toggle_flag(Pos::new(2, 2));

        assert_eq!(b.chord_reveal(Pos::new(1, 1)), RevealOutcome::NoChange);
    }

    #[test]
    fn chord_with_matching_flags_clears_neighbours() {
        let mut b = board(3, 3, &[(0, 1), (2, 1)]);
        b.reveal_single(Pos::new(1, 1));
        b.toggle_flag(Pos::new(0, 1));
        b.toggle_flag(Pos::new(2, 1));

        assert_eq!(b.chord_reveal(Pos::new(1, 1)), RevealOutcome::Won);
        assert_eq!(b.view(Pos::new(1, 0)), TileView::Numeral(2));
        assert_eq!(b.view(Pos::new(1, 2)), TileView::Numeral(2));
        assert_eq!(b.flagged_count(), 2);
    }

    #[test]
    fn chord_floods_zero_neighbours() {
        let mut b = board(5, 1, &[(0, 0)]);
        b.reveal_single(Pos::new(1, 0));
        b.toggle_flag(Pos::new(0, 0));

        assert_eq!(b.chord_reveal(Pos::new(1, 0)), RevealOutcome::Won);
        assert!(b.cell(Pos::new(4, 0)).revealed);
    }

    #[test]
    fn chord_on_zero_or_hidden_cell_is_ignored() {
        let mut b = board(4, 1, &[(3, 0)]);
        assert_eq!(b.chord_reveal(Pos::new(2, 0)), RevealOutcome::NoChange);

        b.reveal_single(Pos::new(0, 0));
        assert_eq!(b.chord_reveal(Pos::new(0, 0)), RevealOutcome::NoChange);
    }

    #[test]
    fn flags_toggle_only_on_unrevealed_cells() {
        let mut b = board(3, 1, &[(2, 0)]);
        assert_eq!(b.toggle_flag(Pos::new(2, 0)), MarkOutcome::Changed);
        assert_eq!(b.flagged_count(), 1);
        assert_eq!(b.toggle_flag(Pos::new(2, 0)), MarkOutcome::Changed);
        assert_eq!(b.flagged_count(), 0);
        assert_eq!(b.revealed_count(), 0);

        b.reveal_single(Pos::new(1, 0));
        assert_eq!(b.toggle_flag(Pos::new(1, 0)), MarkOutcome::NoChange);
        assert_eq!(b.flagged_count(), 0);
    }

    #[test]
    fn win_is_reported_once() {
        let mut b = board(2, 1, &[(0, 0)]);

        assert_eq!(b.reveal_single(Pos::new(1, 0)), RevealOutcome::Won);
        assert_eq!(b.reveal_single(Pos::new(1, 0)), RevealOutcome::NoChange);
        assert!(b.check_win());
    }

    #[test]
    fn win_needs_every_safe_cell() {
        let mut b = board(3, 1, &[(0, 0)]);

        assert_eq!(b.reveal_single(Pos::new(1, 0)), RevealOutcome::Revealed);
        assert!(!b.check_win());
        assert_eq!(b.reveal_single(Pos::new(2, 0)), RevealOutcome::Won);
    }

    #[test]
    fn detonation_blocks_a_later_win() {
        let mut b = board(3, 1, &[(0, 0)]);

        assert_eq!(b.reveal_single(Pos::new(0, 0)), RevealOutcome::HitMine);
        // clears every safe cell, but a mine is already showing
        assert_eq!(b.reveal_single(Pos::new(2, 0)), RevealOutcome::Revealed);
        assert_eq!(b.revealed_count(), b.grid().safe_count());
        assert!(!b.check_win());
    }

    #[test]
    fn hit_mine_dominates_combined_outcomes() {
        use RevealOutcome::*;

        assert_eq!(Won | HitMine, HitMine);
        assert_eq!(HitMine | Won, HitMine);
        assert_eq!(Revealed | Won, Won);
        assert_eq!(NoChange | Revealed, Revealed);
        assert_eq!(NoChange | NoChange, NoChange);
        assert_eq!(
            [Revealed, Won, HitMine, Revealed].into_iter().fold(NoChange, BitOr::bitor),
            HitMine
        );
    }

    #[test]
    fn chord_reveals_safe_neighbours_alongside_a_mine() {
        // wrong flag on (1, 0); (2, 0) is an unflagged mine
        let mut b = board(3, 2, &[(0, 0), (2, 0)]);
        b.reveal_single(Pos::new(1, 1));
        b.toggle_flag(Pos::new(0, 0));
        b.toggle_flag(Pos::new(1, 0));

        assert_eq!(b.chord_reveal(Pos::new(1, 1)), RevealOutcome::HitMine);
        assert_eq!(b.detonated(), Some(Pos::new(2, 0)));
        assert!(b.cell(Pos::new(0, 1)).revealed);
        assert!(b.cell(Pos::new(2, 1)).revealed);
        assert!(!b.check_win());
    }

    #[test]
    fn reveal_all_mines_keeps_flags_and_counters() {
        let mut b = board(3, 3, &[(0, 0), (2, 2)]);
        b.toggle_flag(Pos::new(0, 0));

        b.reveal_all_mines();

        assert_eq!(b.view(Pos::new(0, 0)), TileView::Flagged);
        assert_eq!(b.view(Pos::new(2, 2)), TileView::Mine);
        assert_eq!(b.view(Pos::new(1, 1)), TileView::Hidden);
        assert_eq!(b.revealed_count(), 0);
        assert_eq!(b.flagged_count(), 1);
    }

    #[test]
    fn reveal_all_opens_every_unflagged_cell() {
        let mut b = board(3, 3, &[(0, 0)]);
        b.toggle_flag(Pos::new(1, 0));

        b.reveal_all();

        assert_eq!(revealed(&b).len(), 8);
        assert_eq!(b.view(Pos::new(1, 0)), TileView::Flagged);
        assert_eq!(b.revealed_count(), 0);
    }

    #[test]
    fn changes_are_recorded_and_drained() {
        let mut b = board(3, 1, &[(2, 0)]);
        b.toggle_flag(Pos::new(2, 0));
        b.reveal_single(Pos::new(0, 0));

        let changes = b.take_changes();
        assert_eq!(changes, vec![Pos::new(2, 0), Pos::new(0, 0), Pos::new(1, 0)]);
        assert!(b.take_changes().is_empty());
    }
}
