use std::ops::{Deref, DerefMut};

use log::{debug, trace};
use web_time::{Duration, Instant};

use crate::ai::Score;
use crate::board::NUM_CELLS;
use crate::config::EngineConfig;
use crate::error::{EngineError, JudgeError};
use crate::judge::RulesAuthority;
use crate::types::GameState;

/// Score of a win on the very next ply; each further ply costs one point.
pub const MATE_SCORE: Score = 10_000_000;
const MIN_SCORE: Score = -MATE_SCORE - 1;
const MAX_SCORE: Score = MATE_SCORE + 1;
/// Below this many played moves the centre column is returned without search.
const OPENING_MOVES: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SearchResult {
    Complete(usize, Score),
    TimedOut,
}

/// A committed move that is taken back when the guard drops.
pub struct MoveGuard<'a, R: RulesAuthority + ?Sized> {
    rules: &'a mut R,
}

impl<'a, R: RulesAuthority + ?Sized> MoveGuard<'a, R> {
    pub fn commit(rules: &'a mut R, column: usize) -> Result<Self, JudgeError> {
        rules.commit(column)?;
        Ok(Self { rules })
    }
}

impl<R: RulesAuthority + ?Sized> Deref for MoveGuard<'_, R> {
    type Target = R;

    fn deref(&self) -> &R {
        self.rules
    }
}

impl<R: RulesAuthority + ?Sized> DerefMut for MoveGuard<'_, R> {
    fn deref_mut(&mut self) -> &mut R {
        self.rules
    }
}

impl<R: RulesAuthority + ?Sized> Drop for MoveGuard<'_, R> {
    fn drop(&mut self) {
        if let Err(err) = self.rules.undo() {
            unreachable!("guarded move could not be taken back: {err}");
        }
    }
}

/// Iterative-deepening negamax over any [`RulesAuthority`].
pub struct Searcher {
    start_time: Instant,
    timeout: Duration,
    max_depth: u8,
    alpha_beta: bool,
    timed_out: bool,
    nodes: u64,
    completed_depth: u8,
}

impl Searcher {
    pub fn new(max_depth: u8) -> Self {
        Self::with_timeout(max_depth, EngineConfig::default().timeout())
    }

    pub fn with_timeout(max_depth: u8, timeout: Duration) -> Self {
        Self {
            start_time: Instant::now(),
            timeout,
            max_depth,
            alpha_beta: true,
            timed_out: false,
            nodes: 0,
            completed_depth: 0,
        }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        let mut searcher = Self::with_timeout(config.max_depth, config.timeout());
        searcher.alpha_beta = config.alpha_beta;
        searcher
    }

    /// Picks a column for the side to move. `rules` is back in its original
    /// position when this returns, whether the search finished or timed out.
    pub fn search<R: RulesAuthority + ?Sized>(
        &mut self,
        rules: &mut R,
    ) -> Result<usize, EngineError> {
        self.start_time = Instant::now();
        self.timed_out = false;
        self.nodes = 0;
        self.completed_depth = 0;

        let center = rules.center_column();
        let moves = rules.legal_moves();
        if moves.is_empty() {
            return Err(EngineError::NoLegalMoves);
        }
        if rules.move_count() < OPENING_MOVES && moves.contains(&center) {
            trace!("opening move, playing centre column {center}");
            return Ok(center);
        }
        if moves.len() == 1 {
            return Ok(moves[0]);
        }

        let mut best_move = center_first(moves, center)[0];

        for depth in 1..=self.max_depth {
            match self.negamax(rules, depth, 1, depth, MIN_SCORE, MAX_SCORE)? {
                SearchResult::Complete(mv, score) => {
                    best_move = mv;
                    self.completed_depth = depth;
                    debug!(
                        "depth {depth}: column {mv} scores {score} ({} nodes)",
                        self.nodes
                    );
                    if is_proven(score) {
                        break;
                    }
                }
                SearchResult::TimedOut => {
                    debug!(
                        "deadline hit during depth {depth}, keeping column {best_move} from depth {}",
                        self.completed_depth
                    );
                    break;
                }
            }
        }

        Ok(best_move)
    }

    pub fn timed_out(&self) -> bool {
        self.timed_out
    }

    /// Nodes visited by the last `search`.
    pub fn nodes(&self) -> u64 {
        self.nodes
    }

    /// Deepest iteration the last `search` finished.
    pub fn completed_depth(&self) -> u8 {
        self.completed_depth
    }

    fn negamax<R: RulesAuthority + ?Sized>(
        &mut self,
        rules: &mut R,
        depth: u8,
        ply: u8,
        root_depth: u8,
        alpha: Score,
        beta: Score,
    ) -> Result<SearchResult, EngineError> {
        // Keep depth-1 search guaranteed by suppressing timeout checks at root depth 1.
        if root_depth > 1 && self.start_time.elapsed() >= self.timeout {
            self.timed_out = true;
            return Ok(SearchResult::TimedOut);
        }
        self.nodes += 1;

        let player = rules.current_player();
        if depth == 0 {
            return Ok(SearchResult::Complete(0, rules.analyze(player)));
        }

        let center = rules.center_column();
        let moves = center_first(rules.legal_moves(), center);
        let Some(&first) = moves.first() else {
            return Ok(SearchResult::Complete(0, 0));
        };

        let mut best_move = first;
        let mut best_score = MIN_SCORE;
        let mut alpha = alpha;

        for mv in moves {
            let mut guard = MoveGuard::commit(rules, mv)?;
            let score = match guard.terminal_state() {
                GameState::Win => MATE_SCORE - ply as Score,
                GameState::Draw => 0,
                _ => {
                    let (child_alpha, child_beta) = if self.alpha_beta {
                        (-beta, -alpha)
                    } else {
                        (MIN_SCORE, MAX_SCORE)
                    };
                    match self.negamax(
                        &mut *guard,
                        depth - 1,
                        ply + 1,
                        root_depth,
                        child_alpha,
                        child_beta,
                    )? {
                        SearchResult::TimedOut => return Ok(SearchResult::TimedOut),
                        SearchResult::Complete(_, score) => -score,
                    }
                }
            };
            drop(guard);

            if is_better_move(score, mv, best_score, best_move, center) {
                best_score = score;
                best_move = mv;
            }
            if score > alpha {
                alpha = score;
            }
            if self.alpha_beta && alpha >= beta {
                break;
            }
        }

        Ok(SearchResult::Complete(best_move, best_score))
    }
}

/// Higher score wins; equal scores go to the column nearer the centre, then
/// the lower index.
fn is_better_move(
    score: Score,
    mv: usize,
    best_score: Score,
    best_move: usize,
    center: usize,
) -> bool {
    score > best_score
        || (score == best_score && center_rank(mv, center) < center_rank(best_move, center))
}

fn center_rank(column: usize, center: usize) -> (usize, usize) {
    (column.abs_diff(center), column)
}

fn center_first(mut moves: Vec<usize>, center: usize) -> Vec<usize> {
    moves.sort_by_key(|&column| center_rank(column, center));
    moves
}

/// A forced win or loss within the reachable plies.
fn is_proven(score: Score) -> bool {
    score.abs() >= MATE_SCORE - NUM_CELLS as Score
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Board, COLUMNS, ROWS};
    use crate::judge::Judge;
    use crate::types::{Player, Position};

    const EMPTY: [u8; ROWS] = [0; ROWS];

    const LONG: Duration = Duration::from_secs(60);

    fn judge(moves: &[usize]) -> Judge {
        Judge::from_moves(moves).expect("test moves must be legal")
    }

    fn best_on(columns: [[u8; ROWS]; COLUMNS], to_move: Player, depth: u8) -> usize {
        let board = Board::from_columns(&columns).expect("test board must be well formed");
        let mut judge = Judge::from_board(board, to_move).expect("test board must be open");
        Searcher::with_timeout(depth, LONG).search(&mut judge).unwrap()
    }

    fn best(moves: &[usize], depth: u8) -> usize {
        let mut judge = judge(moves);
        Searcher::with_timeout(depth, LONG).search(&mut judge).unwrap()
    }

    /// Game tree defined by closures over the path of moves played so far.
    struct ScriptedRules {
        path: Vec<usize>,
        width: usize,
        wins: fn(&[usize]) -> bool,
        score: fn(&[usize]) -> Score,
    }

    impl ScriptedRules {
        fn new(width: usize, wins: fn(&[usize]) -> bool, score: fn(&[usize]) -> Score) -> Self {
            Self {
                path: Vec::new(),
                width,
                wins,
                score,
            }
        }
    }

    impl RulesAuthority for ScriptedRules {
        fn legal_moves(&self) -> Vec<usize> {
            (0..self.width).collect()
        }

        fn commit(&mut self, column: usize) -> Result<Position, JudgeError> {
            self.path.push(column);
            Ok(Position::new(column, 0))
        }

        fn undo(&mut self) -> Result<Position, JudgeError> {
            let column = self.path.pop().ok_or(JudgeError::EmptyHistory)?;
            Ok(Position::new(column, 0))
        }

        fn terminal_state(&self) -> GameState {
            if (self.wins)(&self.path) {
                GameState::Win
            } else {
                GameState::Continue
            }
        }

        fn move_count(&self) -> usize {
            // Skip the opening shortcut.
            self.path.len() + OPENING_MOVES
        }

        /// Scripted scores are from player one's side.
        fn analyze(&self, player: Player) -> Score {
            let score = (self.score)(&self.path);
            match player {
                Player::One => score,
                Player::Two => -score,
            }
        }

        fn center_column(&self) -> usize {
            0
        }
    }

    fn no_wins(_: &[usize]) -> bool {
        false
    }

    #[test]
    fn depth_one_picks_highest_leaf() {
        fn score(path: &[usize]) -> Score {
            match path {
                [0] => 2,
                [1] => 3,
                _ => 0,
            }
        }
        let mut rules = ScriptedRules::new(2, no_wins, score);
        let mut searcher = Searcher::with_timeout(1, LONG);

        assert_eq!(searcher.search(&mut rules).unwrap(), 1);
        assert!(rules.path.is_empty());
    }

    #[test]
    fn depth_two_assumes_opponent_minimizes() {
        fn score(path: &[usize]) -> Score {
            match path {
                [0, 0] => 2,
                [0, 1] => 1,
                [1, 0] => 2,
                [1, 1] => 4,
                _ => 0,
            }
        }
        let mut rules = ScriptedRules::new(2, no_wins, score);
        let mut searcher = Searcher::with_timeout(2, LONG);

        let result = searcher
            .negamax(&mut rules, 2, 1, 2, MIN_SCORE, MAX_SCORE)
            .unwrap();
        assert_eq!(result, SearchResult::Complete(1, 2));
        assert!(rules.path.is_empty());
    }

    #[test]
    fn equal_scores_keep_the_centre_most_column() {
        let mut rules = ScriptedRules::new(3, no_wins, |_| 5);
        let mut searcher = Searcher::with_timeout(3, LONG);

        assert_eq!(searcher.search(&mut rules).unwrap(), 0);
        assert!(is_better_move(5, 3, 5, 4, 3));
        assert!(is_better_move(5, 2, 5, 4, 3));
        assert!(!is_better_move(5, 4, 5, 2, 3));
        assert_eq!(center_first(vec![0, 1, 2, 3, 4, 5, 6], 3), vec![3, 2, 4, 1, 5, 0, 6]);
    }

    #[test]
    fn slower_loss_is_preferred_over_faster_loss() {
        // Opening 0 loses on ply 2; opening 1 loses on ply 4.
        fn wins(path: &[usize]) -> bool {
            matches!(path, [0, _] | [1, _, _, _])
        }
        let mut rules = ScriptedRules::new(2, wins, |_| 0);
        let mut searcher = Searcher::with_timeout(4, LONG);

        assert_eq!(searcher.search(&mut rules).unwrap(), 1);
        let result = searcher
            .negamax(&mut rules, 4, 1, 4, MIN_SCORE, MAX_SCORE)
            .unwrap();
        assert_eq!(result, SearchResult::Complete(1, -(MATE_SCORE - 4)));
    }

    #[test]
    fn faster_win_is_preferred_over_slower_win() {
        // Opening 1 wins immediately; opening 0 wins on ply 3 whatever the reply.
        fn wins(path: &[usize]) -> bool {
            matches!(path, [1] | [0, _, _])
        }
        let mut rules = ScriptedRules::new(2, wins, |_| 0);
        let mut searcher = Searcher::with_timeout(3, LONG);

        let result = searcher
            .negamax(&mut rules, 3, 1, 3, MIN_SCORE, MAX_SCORE)
            .unwrap();
        assert_eq!(result, SearchResult::Complete(1, MATE_SCORE - 1));
    }

    #[test]
    fn opening_returns_centre_column() {
        let mut empty = Judge::new();
        let mut searcher = Searcher::new(6);
        assert_eq!(searcher.search(&mut empty).unwrap(), 3);
        assert_eq!(searcher.nodes(), 0);

        let mut after_centre = judge(&[3]);
        assert_eq!(searcher.search(&mut after_centre).unwrap(), 3);
    }

    #[test]
    fn completes_a_vertical_four() {
        assert_eq!(best(&[0, 6, 1, 6, 0, 6, 1], 6), 6);
    }

    #[test]
    fn completes_a_horizontal_four() {
        assert_eq!(best(&[0, 0, 1, 1, 2, 2], 6), 3);
    }

    #[test]
    fn completes_a_diagonal_four() {
        assert_eq!(best(&[0, 1, 2, 3, 1, 2, 0, 1, 0], 6), 0);
    }

    #[test]
    fn blocks_opponent_threats() {
        assert_eq!(best(&[1, 2, 1, 2, 1], 4), 1);
        assert_eq!(best(&[0, 3, 0, 1, 3, 2], 4), 4);
        assert_eq!(best(&[3, 3, 3, 4, 4, 4, 5, 5, 5, 5], 4), 2);
        assert_eq!(best(&[3, 3, 3, 2, 2, 2, 1, 1, 1, 1], 4), 4);
    }

    #[test]
    fn takes_the_immediate_win_over_a_slower_forced_win() {
        let moves = [2, 2, 3, 3, 4, 0];
        let column = best(&moves, 6);
        assert_eq!(judge(&moves).validate(&column.to_string()), GameState::Win);
        assert_eq!(column, 1);
    }

    #[test]
    fn completes_a_diagonal_on_a_seeded_board() {
        let columns = [
            [1, 2, 2, 0, 0, 0],
            [1, 1, 2, 0, 0, 0],
            [2, 1, 1, 0, 0, 0],
            [2, 1, 2, 0, 0, 0],
            EMPTY,
            EMPTY,
            EMPTY,
        ];
        assert_eq!(best_on(columns, Player::One, 6), 3);
    }

    #[test]
    fn goes_for_the_quickest_win() {
        let columns = [
            [1, 0, 0, 0, 0, 0],
            [1, 2, 1, 0, 0, 0],
            [2, 2, 1, 2, 0, 0],
            [2, 1, 0, 0, 0, 0],
            [2, 2, 0, 0, 0, 0],
            [1, 1, 1, 2, 1, 2],
            [1, 2, 0, 0, 0, 0],
        ];
        assert_eq!(best_on(columns, Player::One, 6), 4);
    }

    #[test]
    fn blocks_an_immediate_win() {
        let columns = [
            [1, 0, 0, 0, 0, 0],
            [1, 2, 1, 0, 0, 0],
            [2, 2, 1, 2, 0, 0],
            [2, 1, 1, 0, 0, 0],
            [2, 2, 0, 0, 0, 0],
            [1, 1, 1, 2, 1, 2],
            [1, 2, 0, 0, 0, 0],
        ];
        assert_eq!(best_on(columns, Player::Two, 6), 4);
    }

    #[test]
    fn open_vertical_three_decides_a_crowded_board() {
        let columns = [
            [2, 2, 2, 0, 0, 0],
            [2, 1, 2, 1, 2, 1],
            [2, 1, 1, 0, 0, 0],
            [1, 2, 1, 2, 1, 2],
            [1, 1, 0, 0, 0, 0],
            [2, 1, 2, 1, 1, 2],
            [1, 2, 0, 0, 0, 0],
        ];
        assert_eq!(best_on(columns, Player::One, 6), 0);
        assert_eq!(best_on(columns, Player::Two, 6), 0);
    }

    #[test]
    fn caps_an_open_two_on_the_bottom_row() {
        let columns = [
            EMPTY,
            EMPTY,
            [1, 0, 0, 0, 0, 0],
            [1, 2, 0, 0, 0, 0],
            EMPTY,
            EMPTY,
            EMPTY,
        ];
        let column = best_on(columns, Player::Two, 6);
        assert!([1, 4].contains(&column), "{column}");
        assert_eq!(column, 4);
    }

    #[test]
    fn search_leaves_the_position_untouched() {
        let mut judge = judge(&[3, 3, 2, 4, 2]);
        let board = *judge.board();
        let tables = judge.evaluator().tables().clone();

        Searcher::with_timeout(5, LONG).search(&mut judge).unwrap();

        assert_eq!(*judge.board(), board);
        assert_eq!(judge.move_count(), 5);
        assert_eq!(*judge.evaluator().tables(), tables);
    }

    #[test]
    fn expired_deadline_falls_back_to_depth_one() {
        let mut judge = judge(&[3, 3, 2, 4]);
        let board = *judge.board();
        let mut searcher = Searcher::with_timeout(8, Duration::ZERO);

        let column = searcher.search(&mut judge).unwrap();

        assert!(searcher.timed_out());
        assert_eq!(searcher.completed_depth(), 1);
        assert!(judge.get_valid_moves().contains(&column));
        assert_eq!(*judge.board(), board);
    }

    #[test]
    fn full_board_reports_no_legal_moves() {
        let mut judge = judge(&[
            0, 2, 1, 0, 1, 5, 2, 0, 0, 0, 0, 5, 2, 6, 3, 1, 2, 3, 3, 4, 4, 1, 4, 1, 1, 3, 3, 4,
            3, 6, 6, 4, 4, 2, 6, 2, 6, 5, 5, 5, 5, 6,
        ]);
        let result = Searcher::new(4).search(&mut judge);
        assert_eq!(result, Err(EngineError::NoLegalMoves));
    }

    #[test]
    fn plain_minimax_agrees_with_alpha_beta() {
        for moves in [&[3, 3, 2, 4][..], &[3, 2, 3, 3, 4, 5], &[0, 6, 1, 6, 0]] {
            let mut pruned = Searcher::with_timeout(4, LONG);
            let mut full = Searcher::with_timeout(4, LONG);
            full.alpha_beta = false;

            let pruned_move = pruned.search(&mut judge(moves)).unwrap();
            let full_move = full.search(&mut judge(moves)).unwrap();

            assert_eq!(pruned_move, full_move, "{moves:?}");
            assert!(pruned.nodes() <= full.nodes());
        }
    }
}
