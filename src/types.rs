use std::ops::{Add, Neg, Sub};

use serde::Serialize;

/// One of the two sides. `One` always moves first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Player {
    One,
    Two,
}

impl Player {
    /// Side to move after `moves_played` moves.
    pub fn to_move(moves_played: usize) -> Self {
        if moves_played % 2 == 0 {
            Self::One
        } else {
            Self::Two
        }
    }

    pub fn opponent(self) -> Self {
        match self {
            Self::One => Self::Two,
            Self::Two => Self::One,
        }
    }

    /// Numeric code used on the wire: 1 or 2.
    pub fn code(self) -> u8 {
        match self {
            Self::One => 1,
            Self::Two => 2,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(Self::One),
            2 => Some(Self::Two),
            _ => None,
        }
    }
}

/// Contents of one grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Cell {
    #[default]
    Empty,
    PlayerOne,
    PlayerTwo,
}

impl Cell {
    pub fn owner(self) -> Option<Player> {
        match self {
            Self::Empty => None,
            Self::PlayerOne => Some(Player::One),
            Self::PlayerTwo => Some(Player::Two),
        }
    }

    /// Numeric code: 0=empty, 1=player one, 2=player two.
    pub fn code(self) -> u8 {
        self.owner().map_or(0, Player::code)
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::Empty),
            1 => Some(Self::PlayerOne),
            2 => Some(Self::PlayerTwo),
            _ => None,
        }
    }
}

impl From<Player> for Cell {
    fn from(player: Player) -> Self {
        match player {
            Player::One => Self::PlayerOne,
            Player::Two => Self::PlayerTwo,
        }
    }
}

/// A board coordinate. Row 0 is the bottom row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Position {
    pub column: u8,
    pub row: u8,
}

impl Position {
    pub fn new(column: usize, row: usize) -> Self {
        Self {
            column: column as u8,
            row: row as u8,
        }
    }

    pub fn point(self) -> Point {
        Point::new(self.column as i32, self.row as i32)
    }
}

/// Signed grid offset. `x` runs along columns, `y` along rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl Add for Point {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self::new(self.x + other.x, self.y + other.y)
    }
}

impl Sub for Point {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self::new(self.x - other.x, self.y - other.y)
    }
}

impl Neg for Point {
    type Output = Self;

    fn neg(self) -> Self {
        Self::new(-self.x, -self.y)
    }
}

/// Outcome of validating a candidate move or inspecting a committed position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GameState {
    Continue,
    /// Malformed text or a column outside the board.
    Invalid,
    /// Well-formed column that is already full.
    Illegal,
    Draw,
    Win,
}

impl GameState {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Draw | Self::Win)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Continue => "continue",
            Self::Invalid => "invalid",
            Self::Illegal => "illegal",
            Self::Draw => "draw",
            Self::Win => "win",
        }
    }
}

/// Public game view returned from WASM APIs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Snapshot {
    /// Cell codes, bottom row first, `column + row * 7`.
    pub board: Vec<u8>,
    pub moves: Vec<String>,
    pub next_player: u8,
    pub state: GameState,
    /// Contract:
    /// - `Some(1 | 2)` only when `state` is `Win`.
    /// - `None` otherwise.
    pub winner: Option<u8>,
    pub last_move: Option<Position>,
}
