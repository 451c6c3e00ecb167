pub mod heuristic;
pub mod incremental;
pub mod search;

use crate::board::Board;
use crate::types::{Player, Position};

pub type Score = i32;

/// Static position scorer used at search leaves.
///
/// The judge calls `placed`/`lifted` right after each board mutation so
/// evaluators that cache per-window state can stay in sync.
pub trait Evaluator {
    /// Score of `board` from `player`'s point of view. Must be antisymmetric:
    /// `score(b, p) == -score(b, p.opponent())`.
    fn score(&self, board: &Board, player: Player) -> Score;

    fn placed(&mut self, _board: &Board, _at: Position) {}

    fn lifted(&mut self, _board: &Board, _at: Position) {}
}
