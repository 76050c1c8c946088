//! Cells and directions on the 7×7 grid.
//!
//! Coordinates are `(x, y)` with `x` growing to the right and `y` growing
//! downwards, so `Up` decreases `y`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Width and height of the board.
pub const BOARD_SIZE: i8 = 7;

/// Number of cells on the board.
pub const CELL_COUNT: usize = (BOARD_SIZE as usize) * (BOARD_SIZE as usize);

/// A grid position.
///
/// Cells carry no identity beyond their coordinates. A `Cell` may lie outside
/// the board (the result of a naive `step`); use `Board::is_inside` or
/// [`Cell::is_on_board`] before indexing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Cell {
    pub x: i8,
    pub y: i8,
}

impl Cell {
    /// Create a new cell.
    #[must_use]
    pub const fn new(x: i8, y: i8) -> Self {
        Self { x, y }
    }

    /// True when both coordinates are in `[0, 7)`.
    #[must_use]
    pub const fn is_on_board(self) -> bool {
        self.x >= 0 && self.x < BOARD_SIZE && self.y >= 0 && self.y < BOARD_SIZE
    }

    /// Row-major index into a `CELL_COUNT` array.
    ///
    /// Returns `None` for cells off the board.
    #[must_use]
    pub fn index(self) -> Option<usize> {
        self.is_on_board()
            .then(|| self.y as usize * BOARD_SIZE as usize + self.x as usize)
    }

    /// Inverse of [`Cell::index`].
    #[must_use]
    pub fn from_index(index: usize) -> Self {
        let size = BOARD_SIZE as usize;
        Self::new((index % size) as i8, (index / size) as i8)
    }

    /// Translate by one cell in `direction`, without any bounds check.
    #[must_use]
    pub const fn offset(self, direction: Direction) -> Self {
        let (dx, dy) = direction.delta();
        Self::new(self.x + dx, self.y + dy)
    }

    /// True when the two cells share a side (`|dx| + |dy| == 1`).
    #[must_use]
    pub fn is_adjacent(self, other: Cell) -> bool {
        let dx = (i16::from(self.x) - i16::from(other.x)).abs();
        let dy = (i16::from(self.y) - i16::from(other.y)).abs();
        dx + dy == 1
    }

    /// The four side neighbours, on-board or not.
    #[must_use]
    pub fn neighbours(self) -> [Cell; 4] {
        Direction::ALL.map(|d| self.offset(d))
    }

    /// Every cell on the board in row-major order.
    pub fn all() -> impl Iterator<Item = Cell> {
        (0..CELL_COUNT).map(Cell::from_index)
    }
}

impl std::fmt::Display for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

impl From<(i8, i8)> for Cell {
    fn from((x, y): (i8, i8)) -> Self {
        Self::new(x, y)
    }
}

/// Facing of Assam.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// All four directions.
    pub const ALL: [Direction; 4] = [Direction::Up, Direction::Down, Direction::Left, Direction::Right];

    /// `(dx, dy)` for a single step.
    #[must_use]
    pub const fn delta(self) -> (i8, i8) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }

    /// The 180° reverse.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    /// True when turning from `self` to `next` would be a U-turn.
    #[must_use]
    pub fn is_reverse_of(self, next: Direction) -> bool {
        self.opposite() == next
    }

    /// Lowercase wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Left => "left",
            Direction::Right => "right",
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string names no direction.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("unknown direction {0:?}, expected up, down, left or right")]
pub struct ParseDirectionError(pub String);

impl std::str::FromStr for Direction {
    type Err = ParseDirectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "up" => Ok(Direction::Up),
            "down" => Ok(Direction::Down),
            "left" => Ok(Direction::Left),
            "right" => Ok(Direction::Right),
            _ => Err(ParseDirectionError(s.to_string())),
        }
    }
}
