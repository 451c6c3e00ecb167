use crate::ai::heuristic::DEFAULT_BASE;
use crate::ai::incremental::IncrementalHeuristic;
use crate::ai::{Evaluator, Score};
use crate::board::{Board, COLUMNS};
use crate::error::JudgeError;
use crate::types::{GameState, Player, Position};

/// Rules capability the search depends on.
///
/// Every `commit` must be paired with an `undo` before control returns to
/// the caller that owns the position.
pub trait RulesAuthority {
    /// Open columns in ascending order.
    fn legal_moves(&self) -> Vec<usize>;

    fn commit(&mut self, column: usize) -> Result<Position, JudgeError>;

    fn undo(&mut self) -> Result<Position, JudgeError>;

    /// State of the committed position, judged around the last move.
    fn terminal_state(&self) -> GameState;

    fn move_count(&self) -> usize;

    fn current_player(&self) -> Player {
        Player::to_move(self.move_count())
    }

    /// Static score of the committed position for `player`.
    fn analyze(&self, player: Player) -> Score;

    fn center_column(&self) -> usize {
        COLUMNS / 2
    }
}

/// Owns the board and move history of one game.
///
/// A judge built with `from_board` starts from pieces it has no history for:
/// they count towards `move_count` but can't be taken back.
#[derive(Debug, Clone)]
pub struct Judge<E = IncrementalHeuristic> {
    board: Board,
    moves: Vec<usize>,
    seeded: usize,
    first: Player,
    evaluator: E,
}

impl Judge {
    pub fn new() -> Self {
        Self::with_evaluator(IncrementalHeuristic::default())
    }

    /// Replays `moves` from the empty board.
    pub fn from_moves(moves: &[usize]) -> Result<Self, JudgeError> {
        Self::from_moves_with(IncrementalHeuristic::default(), moves)
    }

    /// Starts from an arbitrary position with `to_move` to play.
    pub fn from_board(board: Board, to_move: Player) -> Result<Self, JudgeError> {
        let evaluator = IncrementalHeuristic::from_board(&board, DEFAULT_BASE);
        Self::from_board_with(evaluator, board, to_move)
    }
}

impl Default for Judge {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Evaluator> Judge<E> {
    pub fn with_evaluator(evaluator: E) -> Self {
        Self {
            board: Board::new(),
            moves: Vec::new(),
            seeded: 0,
            first: Player::One,
            evaluator,
        }
    }

    /// `evaluator` must already reflect `board`. Positions that are already
    /// won are refused.
    pub fn from_board_with(
        evaluator: E,
        board: Board,
        to_move: Player,
    ) -> Result<Self, JudgeError> {
        if board.has_win() {
            return Err(JudgeError::GameOver);
        }
        Ok(Self {
            board,
            moves: Vec::new(),
            seeded: board.piece_count(),
            first: to_move,
            evaluator,
        })
    }

    pub fn from_moves_with(evaluator: E, moves: &[usize]) -> Result<Self, JudgeError> {
        let mut judge = Self::with_evaluator(evaluator);
        for &column in moves {
            judge.add_move(column)?;
        }
        Ok(judge)
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn evaluator(&self) -> &E {
        &self.evaluator
    }

    /// Pieces on the board, seeded ones included.
    pub fn move_count(&self) -> usize {
        self.seeded + self.moves.len()
    }

    pub fn current_player(&self) -> Player {
        if self.moves.len() % 2 == 0 {
            self.first
        } else {
            self.first.opponent()
        }
    }

    /// Previews `input` as the next move without committing it.
    /// Never fails: bad text and out-of-range columns report `Invalid`.
    pub fn validate(&self, input: &str) -> GameState {
        let Ok(column) = parse_column(input) else {
            return GameState::Invalid;
        };
        if self.board.is_column_full(column) {
            return GameState::Illegal;
        }

        let mut preview = self.board;
        match preview.drop_piece(column, self.current_player()) {
            Ok(at) => classify(&preview, at),
            Err(_) => GameState::Illegal,
        }
    }

    /// Commits a move for the side to move and returns the cell it landed in.
    pub fn add_move(&mut self, column: usize) -> Result<Position, JudgeError> {
        let at = self.board.drop_piece(column, self.current_player())?;
        self.moves.push(column);
        self.evaluator.placed(&self.board, at);
        Ok(at)
    }

    /// Takes back the most recent move. Only search backtracking should need this.
    pub fn remove_last_move(&mut self) -> Result<Position, JudgeError> {
        let &column = self.moves.last().ok_or(JudgeError::EmptyHistory)?;
        let at = self.board.lift_piece(column)?;
        self.moves.pop();
        self.evaluator.lifted(&self.board, at);
        Ok(at)
    }

    pub fn is_game_over(&self) -> GameState {
        match self.get_last_move() {
            Some(at) => classify(&self.board, at),
            None if self.board.is_full() => GameState::Draw,
            None => GameState::Continue,
        }
    }

    pub fn get_valid_moves(&self) -> Vec<usize> {
        (0..COLUMNS)
            .filter(|&column| !self.board.is_column_full(column))
            .collect()
    }

    /// `None` until a move has been played on this judge.
    pub fn get_last_move(&self) -> Option<Position> {
        self.moves.last().and_then(|&column| self.board.top(column))
    }

    pub fn get_all_moves(&self) -> Vec<String> {
        self.moves.iter().map(ToString::to_string).collect()
    }

    /// Drawn positions score 0 regardless of window totals.
    pub fn analyze(&self, player: Player) -> Score {
        if self.is_game_over() == GameState::Draw {
            return 0;
        }
        self.evaluator.score(&self.board, player)
    }
}

impl<E: Evaluator> RulesAuthority for Judge<E> {
    fn legal_moves(&self) -> Vec<usize> {
        self.get_valid_moves()
    }

    fn commit(&mut self, column: usize) -> Result<Position, JudgeError> {
        self.add_move(column)
    }

    fn undo(&mut self) -> Result<Position, JudgeError> {
        self.remove_last_move()
    }

    fn terminal_state(&self) -> GameState {
        self.is_game_over()
    }

    fn move_count(&self) -> usize {
        Judge::<E>::move_count(self)
    }

    fn current_player(&self) -> Player {
        Judge::<E>::current_player(self)
    }

    fn analyze(&self, player: Player) -> Score {
        Judge::<E>::analyze(self, player)
    }
}

/// Parses untrusted text as a column index on this board.
pub fn parse_column(input: &str) -> Result<usize, JudgeError> {
    let value: i64 = input
        .trim()
        .parse()
        .map_err(|_| JudgeError::Unparsable(input.to_string()))?;
    if !(0..COLUMNS as i64).contains(&value) {
        return Err(JudgeError::ColumnOutOfRange(value));
    }
    Ok(value as usize)
}

fn classify(board: &Board, last: Position) -> GameState {
    if board.wins_at(last) {
        GameState::Win
    } else if board.is_full() {
        GameState::Draw
    } else {
        GameState::Continue
    }
}
