use log::debug;

use crate::ai::incremental::IncrementalHeuristic;
use crate::ai::search::Searcher;
use crate::config::EngineConfig;
use crate::error::{ConfigError, EngineError, JudgeError};
use crate::judge::{Judge, RulesAuthority, parse_column};
use crate::board::Board;
use crate::types::{GameState, Player, Position, Snapshot};

pub trait MoveSelector {
    fn select_move(&mut self, rules: &mut dyn RulesAuthority) -> Result<usize, EngineError>;
}

/// Depth-limited, deadline-bounded search.
pub struct MinimaxSelector {
    searcher: Searcher,
}

impl MinimaxSelector {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            searcher: Searcher::from_config(config),
        }
    }
}

impl MoveSelector for MinimaxSelector {
    fn select_move(&mut self, rules: &mut dyn RulesAuthority) -> Result<usize, EngineError> {
        self.searcher.search(rules)
    }
}

/// One game driven by text moves, with an engine that can suggest replies.
pub struct Game {
    judge: Judge,
    config: EngineConfig,
    selector: Box<dyn MoveSelector>,
}

impl Game {
    pub fn new(config: EngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::with_selector(config, Box::new(MinimaxSelector::new(&config))))
    }

    /// Resumes from `board` with `to_move` to play.
    pub fn from_board(
        config: EngineConfig,
        board: Board,
        to_move: Player,
    ) -> Result<Self, EngineError> {
        config.validate()?;
        let evaluator = IncrementalHeuristic::from_board(&board, config.heuristic_base);
        Ok(Self {
            judge: Judge::from_board_with(evaluator, board, to_move)?,
            config,
            selector: Box::new(MinimaxSelector::new(&config)),
        })
    }

    pub fn with_selector(config: EngineConfig, selector: Box<dyn MoveSelector>) -> Self {
        Self {
            judge: Judge::with_evaluator(IncrementalHeuristic::new(config.heuristic_base)),
            config,
            selector,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn judge(&self) -> &Judge {
        &self.judge
    }

    pub fn validate(&self, raw_move: &str) -> GameState {
        self.judge.validate(raw_move)
    }

    /// Commits a text move. Refused once the game has been won or drawn.
    pub fn add_move(&mut self, raw_move: &str) -> Result<Position, JudgeError> {
        if self.judge.is_game_over().is_terminal() {
            return Err(JudgeError::GameOver);
        }
        let column = parse_column(raw_move)?;
        self.judge.add_move(column)
    }

    pub fn remove_last_move(&mut self) -> Result<Position, JudgeError> {
        self.judge.remove_last_move()
    }

    pub fn get_valid_moves(&self) -> Vec<usize> {
        self.judge.get_valid_moves()
    }

    pub fn get_last_move(&self) -> Option<Position> {
        self.judge.get_last_move()
    }

    pub fn is_game_over(&self) -> GameState {
        self.judge.is_game_over()
    }

    pub fn get_all_moves(&self) -> Vec<String> {
        self.judge.get_all_moves()
    }

    /// Engine's choice for the side to move. Does not commit it.
    pub fn get_best_move(&mut self) -> Result<String, EngineError> {
        if self.judge.is_game_over().is_terminal() {
            return Err(JudgeError::GameOver.into());
        }

        let legal = self.judge.get_valid_moves();
        let column = self.selector.select_move(&mut self.judge)?;
        if !legal.contains(&column) {
            return Err(EngineError::IllegalSelection { column, legal });
        }
        Ok(column.to_string())
    }

    /// Searches and commits the engine's move.
    pub fn do_ai_move(&mut self) -> Result<Position, EngineError> {
        let column = self.get_best_move()?;
        let at = self.add_move(&column)?;
        debug!("engine played column {column} after {} moves", self.judge.move_count());
        Ok(at)
    }

    pub fn to_snapshot(&self) -> Snapshot {
        let state = self.judge.is_game_over();
        let winner = self
            .get_last_move()
            .filter(|_| state == GameState::Win)
            .and_then(|at| self.judge.board().cell(at).owner())
            .map(|player| player.code());

        Snapshot {
            board: self.judge.board().to_array().to_vec(),
            moves: self.judge.get_all_moves(),
            next_player: self.judge.current_player().code(),
            state,
            winner,
            last_move: self.get_last_move(),
        }
    }
}
