use once_cell::sync::Lazy;

use crate::ai::{Evaluator, Score};
use crate::board::{Board, COLUMNS, CONNECT, Direction, ROWS, in_bounds, to_position};
use crate::types::{Cell, Player, Position};

/// Score of a completed four. Larger than any sum of partial windows.
pub const WIN_SCORE: Score = 1_000_000;
pub const DEFAULT_BASE: Score = 2;
/// Largest base that keeps `window_count() * base^3 < WIN_SCORE`.
pub const MAX_BASE: Score = 24;

static GEOMETRY: Lazy<Geometry> = Lazy::new(Geometry::build);

/// A run of four cells scored as one unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub direction: Direction,
    /// Index of the full board line this window lies on, per direction.
    pub line: u8,
    /// Distance of the first cell from the start of its line.
    pub offset: u8,
    pub cells: [Position; CONNECT],
}

struct Geometry {
    windows: [Vec<Window>; 4],
    // Indexed by `column * ROWS + row`.
    through: Vec<Vec<(Direction, usize)>>,
}

impl Geometry {
    fn build() -> Self {
        let mut windows: [Vec<Window>; 4] = Default::default();
        let mut through = vec![Vec::new(); COLUMNS * ROWS];

        for direction in Direction::ALL {
            let step = direction.step();
            let origins = (0..COLUMNS)
                .flat_map(|column| (0..ROWS).map(move |row| Position::new(column, row)))
                .filter(|position| !in_bounds(position.point() - step));

            for (line, origin) in origins.enumerate() {
                let mut cells = Vec::new();
                let mut probe = origin.point();
                while let Some(position) = to_position(probe) {
                    cells.push(position);
                    probe = probe + step;
                }
                if cells.len() < CONNECT {
                    continue;
                }

                for offset in 0..=cells.len() - CONNECT {
                    let mut span = [origin; CONNECT];
                    span.copy_from_slice(&cells[offset..offset + CONNECT]);

                    let slot = windows[direction.index()].len();
                    for position in span {
                        through[cell_index(position)].push((direction, slot));
                    }
                    windows[direction.index()].push(Window {
                        direction,
                        line: line as u8,
                        offset: offset as u8,
                        cells: span,
                    });
                }
            }
        }

        Self { windows, through }
    }
}

fn cell_index(position: Position) -> usize {
    position.column as usize * ROWS + position.row as usize
}

/// All windows along `direction`, in line/offset order.
pub fn windows(direction: Direction) -> &'static [Window] {
    &GEOMETRY.windows[direction.index()]
}

/// `(direction, slot)` of every window containing `position`.
pub fn windows_through(position: Position) -> &'static [(Direction, usize)] {
    &GEOMETRY.through[cell_index(position)]
}

pub fn window_count() -> usize {
    GEOMETRY.windows.iter().map(Vec::len).sum()
}

/// Value of one window to `player`.
/// - Any opposing piece: 0.
/// - `k` own pieces, rest empty: `base^k`, or `WIN_SCORE` when `k == 4`.
pub fn window_score(cells: [Cell; CONNECT], player: Player, base: Score) -> Score {
    let own = Cell::from(player);
    let mut count = 0u32;
    for cell in cells {
        if cell == own {
            count += 1;
        } else if cell != Cell::Empty {
            return 0;
        }
    }

    match count {
        0 => 0,
        c if c as usize == CONNECT => WIN_SCORE,
        c => base.pow(c),
    }
}

/// Window value from player one's side: positive favours `Player::One`.
pub fn signed_window_score(board: &Board, window: &Window, base: Score) -> Score {
    let cells = window.cells.map(|position| board.cell(position));
    window_score(cells, Player::One, base) - window_score(cells, Player::Two, base)
}

pub(crate) fn from_perspective(signed: Score, player: Player) -> Score {
    match player {
        Player::One => signed,
        Player::Two => -signed,
    }
}

/// Full-board window evaluator. Rescans all windows on every call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Heuristic {
    base: Score,
}

impl Heuristic {
    pub fn new(base: Score) -> Self {
        Self { base }
    }

    pub fn base(&self) -> Score {
        self.base
    }

    /// Sum of signed window scores from player one's side.
    pub fn signed_total(&self, board: &Board) -> Score {
        Direction::ALL
            .iter()
            .flat_map(|&direction| windows(direction))
            .map(|window| signed_window_score(board, window, self.base))
            .sum()
    }
}

impl Default for Heuristic {
    fn default() -> Self {
        Self::new(DEFAULT_BASE)
    }
}

impl Evaluator for Heuristic {
    fn score(&self, board: &Board, player: Player) -> Score {
        from_perspective(self.signed_total(board), player)
    }
}
