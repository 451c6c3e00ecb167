use crate::error::JudgeError;
use crate::types::{Cell, Player, Point, Position};

pub const COLUMNS: usize = 7;
pub const ROWS: usize = 6;
pub const NUM_CELLS: usize = COLUMNS * ROWS;
pub const CONNECT: usize = 4;

/// The four line directions a connect-four can run along.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Horizontal,
    Vertical,
    DiagonalUp,
    DiagonalDown,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Horizontal,
        Direction::Vertical,
        Direction::DiagonalUp,
        Direction::DiagonalDown,
    ];

    pub fn step(self) -> Point {
        match self {
            Self::Horizontal => Point::new(1, 0),
            Self::Vertical => Point::new(0, 1),
            Self::DiagonalUp => Point::new(1, 1),
            Self::DiagonalDown => Point::new(1, -1),
        }
    }

    pub fn index(self) -> usize {
        match self {
            Self::Horizontal => 0,
            Self::Vertical => 1,
            Self::DiagonalUp => 2,
            Self::DiagonalDown => 3,
        }
    }
}

/// Connect-four grid, column-major. Pieces stack from row 0 upwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Board {
    cells: [[Cell; ROWS]; COLUMNS],
    heights: [u8; COLUMNS],
    pieces: u8,
}

impl Board {
    pub fn new() -> Self {
        Self {
            cells: [[Cell::Empty; ROWS]; COLUMNS],
            heights: [0; COLUMNS],
            pieces: 0,
        }
    }

    /// Builds a board from per-column cell codes (0=empty, 1, 2), bottom first.
    pub fn from_columns(columns: &[[u8; ROWS]; COLUMNS]) -> Result<Self, JudgeError> {
        let mut board = Self::new();

        for (column, codes) in columns.iter().enumerate() {
            let mut height = 0;
            for (row, &value) in codes.iter().enumerate() {
                let cell = Cell::from_code(value).ok_or(JudgeError::InvalidCell {
                    column,
                    row,
                    value,
                })?;
                if cell == Cell::Empty {
                    continue;
                }
                if row != height {
                    return Err(JudgeError::FloatingPiece { column, row });
                }
                board.cells[column][row] = cell;
                height += 1;
            }
            board.heights[column] = height as u8;
            board.pieces += height as u8;
        }

        Ok(board)
    }

    pub fn cell(&self, position: Position) -> Cell {
        self.cells[position.column as usize][position.row as usize]
    }

    /// Returns `None` when `point` lies outside the grid.
    pub fn cell_at(&self, point: Point) -> Option<Cell> {
        to_position(point).map(|position| self.cell(position))
    }

    pub fn height(&self, column: usize) -> usize {
        self.heights.get(column).map_or(0, |&h| h as usize)
    }

    /// Out-of-range columns count as full.
    pub fn is_column_full(&self, column: usize) -> bool {
        column >= COLUMNS || self.heights[column] as usize == ROWS
    }

    pub fn is_full(&self) -> bool {
        self.pieces as usize == NUM_CELLS
    }

    pub fn piece_count(&self) -> usize {
        self.pieces as usize
    }

    /// Topmost occupied cell of `column`.
    pub fn top(&self, column: usize) -> Option<Position> {
        match self.height(column) {
            0 => None,
            h => Some(Position::new(column, h - 1)),
        }
    }

    /// Drops a piece into the lowest empty row of `column`.
    pub fn drop_piece(&mut self, column: usize, player: Player) -> Result<Position, JudgeError> {
        if column >= COLUMNS {
            return Err(JudgeError::ColumnOutOfRange(column as i64));
        }
        if self.is_column_full(column) {
            return Err(JudgeError::ColumnFull(column));
        }

        let row = self.heights[column] as usize;
        self.cells[column][row] = Cell::from(player);
        self.heights[column] += 1;
        self.pieces += 1;

        Ok(Position::new(column, row))
    }

    /// Clears the topmost piece of `column`.
    pub fn lift_piece(&mut self, column: usize) -> Result<Position, JudgeError> {
        let position = self.top(column).ok_or(JudgeError::EmptyHistory)?;

        self.cells[column][position.row as usize] = Cell::Empty;
        self.heights[column] -= 1;
        self.pieces -= 1;

        Ok(position)
    }

    /// Length of the same-colour run through `position` along `direction`.
    pub fn run_length(&self, position: Position, direction: Direction) -> usize {
        let Some(owner) = self.cell(position).owner() else {
            return 0;
        };
        let target = Cell::from(owner);
        let origin = position.point();
        let step = direction.step();

        let mut run = 1;
        for delta in [step, -step] {
            let mut probe = origin + delta;
            while self.cell_at(probe) == Some(target) {
                run += 1;
                probe = probe + delta;
            }
        }
        run
    }

    /// True when the piece at `position` is part of a connect-four.
    pub fn wins_at(&self, position: Position) -> bool {
        Direction::ALL
            .iter()
            .any(|&direction| self.run_length(position, direction) >= CONNECT)
    }

    /// Scans every occupied cell for a connect-four.
    pub fn has_win(&self) -> bool {
        self.winner().is_some()
    }

    pub fn winner(&self) -> Option<Player> {
        for column in 0..COLUMNS {
            for row in 0..self.height(column) {
                let position = Position::new(column, row);
                if self.wins_at(position) {
                    return self.cell(position).owner();
                }
            }
        }
        None
    }

    /// Converts board to `[u8; 42]` indexed `column + row * 7`, bottom row first.
    pub fn to_array(&self) -> [u8; NUM_CELLS] {
        let mut out = [0u8; NUM_CELLS];
        for (idx, cell) in out.iter_mut().enumerate() {
            *cell = self.cells[idx % COLUMNS][idx / COLUMNS].code();
        }
        out
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

pub fn in_bounds(point: Point) -> bool {
    (0..COLUMNS as i32).contains(&point.x) && (0..ROWS as i32).contains(&point.y)
}

pub fn to_position(point: Point) -> Option<Position> {
    in_bounds(point).then(|| Position::new(point.x as usize, point.y as usize))
}
