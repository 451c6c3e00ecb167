use wasm_bindgen::prelude::*;

pub mod ai;
pub mod board;
pub mod config;
pub mod error;
pub mod game;
pub mod judge;
pub mod types;

use crate::board::{Board, COLUMNS, ROWS};
use crate::config::EngineConfig;
use crate::error::JudgeError;
use crate::game::Game;
use crate::types::Player;

#[wasm_bindgen]
pub fn wasm_ready() -> bool {
    true
}

/// JS handle to one game and its engine.
#[wasm_bindgen]
pub struct WasmGame {
    game: Game,
}

#[wasm_bindgen]
impl WasmGame {
    /// `config` may be `undefined` or an object with any of `max_depth`,
    /// `timeout_ms`, `heuristic_base` and `alpha_beta`.
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<WasmGame, JsError> {
        Ok(Self {
            game: Game::new(engine_config(config)?)?,
        })
    }

    /// Difficulty preset 1-6 with default timeout and heuristic.
    #[wasm_bindgen(js_name = withLevel)]
    pub fn with_level(level: u8) -> Result<WasmGame, JsError> {
        Ok(Self {
            game: Game::new(EngineConfig::for_level(level)?)?,
        })
    }

    /// `columns` is seven arrays of six cell codes, bottom row first.
    /// `to_move` is 1 or 2.
    #[wasm_bindgen(js_name = fromBoard)]
    pub fn from_board(
        config: JsValue,
        columns: JsValue,
        to_move: u8,
    ) -> Result<WasmGame, JsError> {
        let columns: [[u8; ROWS]; COLUMNS] = serde_wasm_bindgen::from_value(columns)?;
        let board = Board::from_columns(&columns)?;
        let to_move = Player::from_code(to_move).ok_or(JudgeError::InvalidPlayer(to_move))?;
        Ok(Self {
            game: Game::from_board(engine_config(config)?, board, to_move)?,
        })
    }

    /// Returns `"continue"`, `"invalid"`, `"illegal"`, `"draw"` or `"win"`.
    pub fn validate(&self, raw_move: &str) -> String {
        self.game.validate(raw_move).as_str().to_string()
    }

    #[wasm_bindgen(js_name = addMove)]
    pub fn add_move(&mut self, raw_move: &str) -> Result<JsValue, JsError> {
        let at = self.game.add_move(raw_move)?;
        Ok(serde_wasm_bindgen::to_value(&at)?)
    }

    #[wasm_bindgen(js_name = bestMove)]
    pub fn best_move(&mut self) -> Result<String, JsError> {
        Ok(self.game.get_best_move()?)
    }

    #[wasm_bindgen(js_name = aiMove)]
    pub fn ai_move(&mut self) -> Result<JsValue, JsError> {
        let at = self.game.do_ai_move()?;
        Ok(serde_wasm_bindgen::to_value(&at)?)
    }

    #[wasm_bindgen(js_name = validMoves)]
    pub fn valid_moves(&self) -> Vec<u8> {
        self.game
            .get_valid_moves()
            .into_iter()
            .map(|column| column as u8)
            .collect()
    }

    pub fn moves(&self) -> Vec<String> {
        self.game.get_all_moves()
    }

    pub fn state(&self) -> Result<JsValue, JsError> {
        Ok(serde_wasm_bindgen::to_value(&self.game.to_snapshot())?)
    }
}

/// `undefined` and `null` select the defaults.
fn engine_config(config: JsValue) -> Result<EngineConfig, JsError> {
    if config.is_undefined() || config.is_null() {
        Ok(EngineConfig::default())
    } else {
        Ok(serde_wasm_bindgen::from_value(config)?)
    }
}
