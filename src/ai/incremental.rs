use crate::ai::heuristic::{
    DEFAULT_BASE, Window, from_perspective, signed_window_score, windows, windows_through,
};
use crate::ai::{Evaluator, Score};
use crate::board::{Board, Direction};
use crate::types::{Player, Position};

/// Cached signed window scores, one table per direction.
///
/// Read-only view of the incremental evaluator's state; slot order matches
/// [`windows`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowTables {
    scores: [Vec<Score>; 4],
    total: Score,
}

impl WindowTables {
    fn empty() -> Self {
        Self {
            scores: Direction::ALL.map(|direction| vec![0; windows(direction).len()]),
            total: 0,
        }
    }

    pub fn direction(&self, direction: Direction) -> &[Score] {
        &self.scores[direction.index()]
    }

    /// Cached score of the window at `offset` on `line`, if such a window exists.
    pub fn score_at(&self, direction: Direction, line: u8, offset: u8) -> Option<Score> {
        windows(direction)
            .iter()
            .position(|window| window.line == line && window.offset == offset)
            .map(|slot| self.scores[direction.index()][slot])
    }

    /// Sum of every cached window, from player one's side.
    pub fn total(&self) -> Score {
        self.total
    }

    fn store(&mut self, window: &Window, slot: usize, score: Score) {
        let entry = &mut self.scores[window.direction.index()][slot];
        self.total += score - *entry;
        *entry = score;
    }
}

/// Window evaluator that only rescans windows through the changed cell.
///
/// `score` reports the board last fed through `placed`/`lifted` (or
/// `from_board`); the `board` argument is not rescanned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncrementalHeuristic {
    base: Score,
    tables: WindowTables,
}

impl IncrementalHeuristic {
    pub fn new(base: Score) -> Self {
        Self {
            base,
            tables: WindowTables::empty(),
        }
    }

    pub fn from_board(board: &Board, base: Score) -> Self {
        let mut evaluator = Self::new(base);
        for direction in Direction::ALL {
            for (slot, window) in windows(direction).iter().enumerate() {
                let score = signed_window_score(board, window, base);
                evaluator.tables.store(window, slot, score);
            }
        }
        evaluator
    }

    pub fn base(&self) -> Score {
        self.base
    }

    pub fn tables(&self) -> &WindowTables {
        &self.tables
    }

    fn refresh(&mut self, board: &Board, at: Position) {
        for &(direction, slot) in windows_through(at) {
            let window = &windows(direction)[slot];
            let score = signed_window_score(board, window, self.base);
            self.tables.store(window, slot, score);
        }
    }
}

impl Default for IncrementalHeuristic {
    fn default() -> Self {
        Self::new(DEFAULT_BASE)
    }
}

impl Evaluator for IncrementalHeuristic {
    fn score(&self, _board: &Board, player: Player) -> Score {
        from_perspective(self.tables.total, player)
    }

    fn placed(&mut self, board: &Board, at: Position) {
        self.refresh(board, at);
    }

    fn lifted(&mut self, board: &Board, at: Position) {
        self.refresh(board, at);
    }
}
