//! Carpet placements and stacking.
//!
//! The `CarpetLayer` tracks which carpets lie on which cells. Every cell
//! holds an ordered stack, bottom to top. It supports:
//! - Topmost and full-stack queries per cell
//! - Lookup of every placement of one carpet
//! - Flood fill over cells sharing the same visible carpet
//! - Removal of a carpet from the whole board
//!
//! Visibility order is `(placement turn, insertion sequence)`: a later turn
//! always lands on top, and within a turn the later insertion wins.

use std::collections::VecDeque;

use im::Vector;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::board::{Cell, CELL_COUNT};
use crate::core::CarpetId;

/// One half of a laid carpet.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CarpetPlacement {
    pub carpet: CarpetId,
    pub cell: Cell,
    /// Move number the carpet was laid on.
    pub turn: u32,
    /// Global insertion counter, breaks ties within a turn.
    pub sequence: u64,
}

impl CarpetPlacement {
    fn order_key(&self) -> (u32, u64) {
        (self.turn, self.sequence)
    }
}

type Stack = SmallVec<[CarpetPlacement; 4]>;

/// Spatial index of carpet placements.
///
/// Backed by an `im::Vector` of per-cell stacks, so cloning a layer (for a
/// snapshot or a what-if evaluation) is O(1).
///
/// ## Usage
///
/// ```
/// use marrakech::board::Cell;
/// use marrakech::carpets::CarpetLayer;
/// use marrakech::core::CarpetId;
///
/// let mut layer = CarpetLayer::new();
/// let red = CarpetId::new(1);
/// let blue = CarpetId::new(2);
///
/// layer.place(red, Cell::new(2, 2), Cell::new(2, 3), 1);
/// layer.place(blue, Cell::new(2, 3), Cell::new(2, 4), 2);
///
/// assert_eq!(layer.top_carpet(Cell::new(2, 2)), Some(red));
/// assert_eq!(layer.top_carpet(Cell::new(2, 3)), Some(blue));
/// assert_eq!(layer.all_at(Cell::new(2, 3)).len(), 2);
/// assert_eq!(layer.connected_region_size(Cell::new(2, 4), blue), 2);
/// ```
#[derive(Clone, Debug)]
pub struct CarpetLayer {
    stacks: Vector<Stack>,
    next_sequence: u64,
}

impl CarpetLayer {
    /// Create an empty layer.
    #[must_use]
    pub fn new() -> Self {
        Self {
            stacks: (0..CELL_COUNT).map(|_| Stack::new()).collect(),
            next_sequence: 0,
        }
    }

    /// Highest placement at `cell`, if any.
    #[must_use]
    pub fn topmost_at(&self, cell: Cell) -> Option<&CarpetPlacement> {
        self.all_at(cell).last()
    }

    /// The carpet visible at `cell`.
    #[must_use]
    pub fn top_carpet(&self, cell: Cell) -> Option<CarpetId> {
        self.topmost_at(cell).map(|p| p.carpet)
    }

    /// Every placement at `cell`, bottom to top. Empty off the board.
    #[must_use]
    pub fn all_at(&self, cell: Cell) -> &[CarpetPlacement] {
        cell.index()
            .and_then(|i| self.stacks.get(i))
            .map_or(&[], |stack| stack.as_slice())
    }

    /// Record both halves of a carpet laid on `turn`.
    ///
    /// Geometry and overlap rules are the caller's job (see
    /// `carpets::policy`). Cells off the board are ignored.
    pub fn place(&mut self, carpet: CarpetId, first: Cell, second: Cell, turn: u32) -> [CarpetPlacement; 2] {
        debug_assert!(first != second && first.is_adjacent(second));
        let a = self.push(carpet, first, turn);
        let b = self.push(carpet, second, turn);
        [a, b]
    }

    fn push(&mut self, carpet: CarpetId, cell: Cell, turn: u32) -> CarpetPlacement {
        let placement = CarpetPlacement {
            carpet,
            cell,
            turn,
            sequence: self.next_sequence,
        };
        self.insert(placement);
        placement
    }

    /// Insert a placement that already carries its sequence number.
    ///
    /// Used when rebuilding a layer from a snapshot.
    pub fn restore(&mut self, placement: CarpetPlacement) {
        self.insert(placement);
    }

    fn insert(&mut self, placement: CarpetPlacement) {
        self.next_sequence = self.next_sequence.max(placement.sequence + 1);
        let Some(index) = placement.cell.index() else {
            return;
        };
        if let Some(stack) = self.stacks.get_mut(index) {
            let key = placement.order_key();
            let at = stack.partition_point(|p| p.order_key() <= key);
            stack.insert(at, placement);
        }
    }

    /// Every placement of `carpet`, in insertion order.
    #[must_use]
    pub fn all_for_carpet(&self, carpet: CarpetId) -> Vec<CarpetPlacement> {
        let mut found: Vec<_> = self
            .stacks
            .iter()
            .flat_map(|stack| stack.iter())
            .filter(|p| p.carpet == carpet)
            .copied()
            .collect();
        found.sort_by_key(|p| p.sequence);
        found
    }

    /// Every placement on the board, in insertion order.
    #[must_use]
    pub fn placements(&self) -> Vec<CarpetPlacement> {
        let mut all: Vec<_> = self.stacks.iter().flat_map(|stack| stack.iter()).copied().collect();
        all.sort_by_key(|p| p.sequence);
        all
    }

    /// Size of the 4-connected region around `start` whose visible carpet
    /// is `target`.
    ///
    /// Returns 0 when `start` itself does not show `target`.
    #[must_use]
    pub fn connected_region_size(&self, start: Cell, target: CarpetId) -> usize {
        if self.top_carpet(start) != Some(target) {
            return 0;
        }

        let mut visited = [false; CELL_COUNT];
        let mut queue = VecDeque::new();
        let mut count = 0;

        if let Some(i) = start.index() {
            visited[i] = true;
        }
        queue.push_back(start);

        while let Some(cell) = queue.pop_front() {
            count += 1;
            for next in cell.neighbours() {
                let Some(i) = next.index() else { continue };
                if visited[i] || self.top_carpet(next) != Some(target) {
                    continue;
                }
                visited[i] = true;
                queue.push_back(next);
            }
        }

        count
    }

    /// Remove every placement of `carpet`.
    ///
    /// Returns the cells where `carpet` was visible before removal, in
    /// row-major order.
    pub fn remove_carpet(&mut self, carpet: CarpetId) -> Vec<Cell> {
        let mut uncovered = Vec::new();
        for index in 0..CELL_COUNT {
            let Some(stack) = self.stacks.get(index) else { continue };
            if !stack.iter().any(|p| p.carpet == carpet) {
                continue;
            }
            if stack.last().map(|p| p.carpet) == Some(carpet) {
                uncovered.push(Cell::from_index(index));
            }
            if let Some(stack) = self.stacks.get_mut(index) {
                stack.retain(|p| p.carpet != carpet);
            }
        }
        uncovered
    }

    /// Number of cells on which each carpet is visible.
    #[must_use]
    pub fn visible_counts(&self) -> FxHashMap<CarpetId, usize> {
        let mut counts = FxHashMap::default();
        for stack in self.stacks.iter() {
            if let Some(top) = stack.last() {
                *counts.entry(top.carpet).or_insert(0) += 1;
            }
        }
        counts
    }

    /// Number of cells with at least one carpet.
    #[must_use]
    pub fn covered_cells(&self) -> usize {
        self.stacks.iter().filter(|stack| !stack.is_empty()).count()
    }

    /// Total number of placement records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.stacks.iter().map(|stack| stack.len()).sum()
    }

    /// True when the board is bare.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stacks.iter().all(|stack| stack.is_empty())
    }
}

impl Default for CarpetLayer {
    fn default() -> Self {
        Self::new()
    }
}
