//! Static board geometry and Assam's edge-reflection table.
//!
//! When Assam would walk off the board he follows the painted arcs on the
//! physical board's border instead. Those arcs are irregular, so they are
//! written down as a literal rule list rather than derived from a formula.
//! Boundary moves with no rule leave Assam where he is, facing the same way.

use rustc_hash::FxHashMap;
use tracing::trace;

use super::geometry::{Cell, Direction, BOARD_SIZE};

use Direction::{Down, Left, Right, Up};

/// One border rule: `(x, y, outgoing)` re-enters at `(x, y, new facing)`.
type EdgeRule = ((i8, i8, Direction), (i8, i8, Direction));

/// The authored reflection rules.
const EDGE_RULES: &[EdgeRule] = &[
    // Top edge
    ((0, 0, Up), (0, 0, Right)),
    ((0, 0, Left), (0, 0, Down)),
    ((1, 0, Up), (2, 0, Down)),
    ((2, 0, Up), (1, 0, Down)),
    ((3, 0, Up), (4, 0, Down)),
    ((4, 0, Up), (3, 0, Down)),
    ((5, 0, Up), (6, 0, Down)),
    ((6, 0, Up), (5, 0, Down)),
    // Right edge
    ((6, 0, Right), (6, 1, Left)),
    ((6, 1, Right), (6, 0, Left)),
    ((6, 2, Right), (6, 3, Left)),
    ((6, 3, Right), (6, 2, Left)),
    ((6, 4, Right), (6, 5, Left)),
    ((6, 5, Right), (6, 4, Left)),
    ((6, 6, Right), (6, 6, Up)),
    ((6, 6, Down), (6, 6, Left)),
    // Bottom edge
    ((5, 6, Down), (4, 6, Up)),
    ((4, 6, Down), (5, 6, Up)),
    ((3, 6, Down), (2, 6, Up)),
    ((2, 6, Down), (3, 6, Up)),
    ((1, 6, Down), (0, 6, Up)),
    ((0, 6, Down), (1, 6, Up)),
    // Left edge
    ((0, 6, Left), (0, 5, Right)),
    ((0, 4, Left), (0, 3, Right)),
    ((0, 2, Left), (0, 1, Right)),
];

/// Immutable board geometry.
///
/// Built once and shared between games (`Arc<Board>`); nothing mutates it
/// after construction.
///
/// ```
/// use marrakech::board::{Board, Cell, Direction};
///
/// let board = Board::classic();
///
/// // Inside the board a step is a plain translation.
/// assert_eq!(
///     board.move_one_step(Cell::new(3, 3), Direction::Up),
///     (Cell::new(3, 2), Direction::Up),
/// );
///
/// // At the border the authored arcs take over.
/// assert_eq!(
///     board.move_one_step(Cell::new(1, 0), Direction::Up),
///     (Cell::new(2, 0), Direction::Down),
/// );
/// ```
#[derive(Clone, Debug)]
pub struct Board {
    reflections: FxHashMap<(Cell, Direction), (Cell, Direction)>,
}

impl Board {
    /// The standard Marrakech board.
    #[must_use]
    pub fn classic() -> Self {
        Self::from_rules(EDGE_RULES)
    }

    fn from_rules(rules: &[EdgeRule]) -> Self {
        let reflections = rules
            .iter()
            .map(|&((x, y, out), (nx, ny, facing))| ((Cell::new(x, y), out), (Cell::new(nx, ny), facing)))
            .collect();
        Self { reflections }
    }

    /// Board side length.
    #[must_use]
    pub const fn size(&self) -> i8 {
        BOARD_SIZE
    }

    /// True when `cell` lies on the board.
    #[must_use]
    pub fn is_inside(&self, cell: Cell) -> bool {
        cell.is_on_board()
    }

    /// Naive one-cell translation with no bounds check.
    #[must_use]
    pub fn step(&self, cell: Cell, direction: Direction) -> Cell {
        cell.offset(direction)
    }

    /// Re-entry point for a boundary move.
    ///
    /// Pairs missing from the rule list return `(cell, direction)` unchanged.
    #[must_use]
    pub fn reflect(&self, cell: Cell, direction: Direction) -> (Cell, Direction) {
        self.reflections
            .get(&(cell, direction))
            .copied()
            .unwrap_or((cell, direction))
    }

    /// True when the rule list covers this boundary move.
    #[must_use]
    pub fn has_reflection(&self, cell: Cell, direction: Direction) -> bool {
        self.reflections.contains_key(&(cell, direction))
    }

    /// Number of authored reflection rules.
    #[must_use]
    pub fn reflection_count(&self) -> usize {
        self.reflections.len()
    }

    /// One step of Assam's walk.
    #[must_use]
    pub fn move_one_step(&self, cell: Cell, direction: Direction) -> (Cell, Direction) {
        let next = self.step(cell, direction);
        if self.is_inside(next) {
            return (next, direction);
        }
        let reflected = self.reflect(cell, direction);
        trace!(from = %cell, %direction, to = %reflected.0, facing = %reflected.1, "edge reflection");
        reflected
    }

    /// Walk `steps` single steps, re-evaluating the border after each one.
    #[must_use]
    pub fn walk(&self, cell: Cell, direction: Direction, steps: u8) -> (Cell, Direction) {
        (0..steps).fold((cell, direction), |(c, d), _| self.move_one_step(c, d))
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::classic()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_count() {
        let board = Board::classic();
        assert_eq!(board.reflection_count(), EDGE_RULES.len());
        assert_eq!(board.reflection_count(), 25);
    }

    #[test]
    fn test_every_rule_starts_at_a_boundary_exit() {
        let board = Board::classic();
        for &((x, y, out), (nx, ny, _)) in EDGE_RULES {
            let from = Cell::new(x, y);
            assert!(board.is_inside(from));
            assert!(!board.is_inside(board.step(from, out)), "{from} {out} is not a boundary exit");
            assert!(board.is_inside(Cell::new(nx, ny)));
        }
    }

    #[test]
    fn test_corner_turns() {
        let board = Board::classic();
        assert_eq!(board.reflect(Cell::new(0, 0), Up), (Cell::new(0, 0), Right));
        assert_eq!(board.reflect(Cell::new(6, 6), Down), (Cell::new(6, 6), Left));
    }

    #[test]
    fn test_missing_rule_stays_in_place() {
        let board = Board::classic();
        // (0, 1) heading left is not covered by the authored rules.
        assert!(!board.has_reflection(Cell::new(0, 1), Left));
        assert_eq!(board.move_one_step(Cell::new(0, 1), Left), (Cell::new(0, 1), Left));
    }

    #[test]
    fn test_walk_reflects_mid_sequence() {
        let board = Board::classic();
        // (3,1) up: (3,0), then the arc to (4,0) facing down, then (4,1).
        assert_eq!(board.walk(Cell::new(3, 1), Up, 3), (Cell::new(4, 1), Down));
    }

    #[test]
    fn test_walk_zero_steps() {
        let board = Board::classic();
        assert_eq!(board.walk(Cell::new(2, 2), Left, 0), (Cell::new(2, 2), Left));
    }
}
