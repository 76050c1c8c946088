//! Placement rules.
//!
//! A placement is checked in a fixed order and the first failing rule is
//! reported:
//!
//! 1. the two cells differ
//! 2. they share a side
//! 3. both are on the board
//! 4. neither cell shows a carpet of the placing player
//! 5. the two cells do not show one carpet laid in a single placement, which
//!    the new carpet would bury completely
//!
//! The after-move variant runs two checks against Assam first: neither cell
//! may be Assam's, and the first cell must touch Assam's.

use crate::board::Cell;
use crate::core::{CarpetId, PlayerId};
use crate::error::{EngineError, GeometryError, OverlapError};

use super::layer::CarpetLayer;

/// Rules 1 to 3.
pub fn check_geometry(first: Cell, second: Cell) -> Result<(), GeometryError> {
    if first == second {
        return Err(GeometryError::SameCell(first));
    }
    if !first.is_adjacent(second) {
        return Err(GeometryError::NotAdjacent(first, second));
    }
    for cell in [first, second] {
        if !cell.is_on_board() {
            return Err(GeometryError::OutOfBounds(cell));
        }
    }
    Ok(())
}

/// Rules 4 and 5, for a carpet owned by `owner`.
///
/// `owner_of` resolves the owner of a carpet already on the board.
pub fn check_overlap(
    layer: &CarpetLayer,
    owner: PlayerId,
    owner_of: impl Fn(CarpetId) -> Option<PlayerId>,
    first: Cell,
    second: Cell,
) -> Result<(), OverlapError> {
    for cell in [first, second] {
        let top_owner = layer.top_carpet(cell).and_then(&owner_of);
        if top_owner == Some(owner) {
            return Err(OverlapError::OwnCarpetVisible { cell });
        }
    }

    if let (Some(a), Some(b)) = (layer.topmost_at(first), layer.topmost_at(second)) {
        if a.carpet == b.carpet && a.turn == b.turn {
            return Err(OverlapError::CoversWholeCarpet {
                carpet: a.carpet,
                turn: a.turn,
            });
        }
    }
    Ok(())
}

/// Rules 1 to 5.
pub fn check_placement(
    layer: &CarpetLayer,
    owner: PlayerId,
    owner_of: impl Fn(CarpetId) -> Option<PlayerId>,
    first: Cell,
    second: Cell,
) -> Result<(), EngineError> {
    check_geometry(first, second)?;
    check_overlap(layer, owner, owner_of, first, second)?;
    Ok(())
}

/// The Assam checks of the after-move variant.
pub fn check_near_assam(assam: Cell, first: Cell, second: Cell) -> Result<(), GeometryError> {
    for cell in [first, second] {
        if cell == assam {
            return Err(GeometryError::OnAssam(cell));
        }
    }
    if !first.is_adjacent(assam) {
        return Err(GeometryError::NotTouchingAssam { first, assam });
    }
    Ok(())
}

/// Every rule of the after-move variant.
pub fn check_placement_after_move(
    layer: &CarpetLayer,
    assam: Cell,
    owner: PlayerId,
    owner_of: impl Fn(CarpetId) -> Option<PlayerId>,
    first: Cell,
    second: Cell,
) -> Result<(), EngineError> {
    check_near_assam(assam, first, second)?;
    check_placement(layer, owner, owner_of, first, second)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ME: PlayerId = PlayerId(0);
    const THEM: PlayerId = PlayerId(1);
    const MINE: CarpetId = CarpetId(1);
    const THEIRS: CarpetId = CarpetId(2);

    fn owner_of(carpet: CarpetId) -> Option<PlayerId> {
        match carpet {
            MINE => Some(ME),
            THEIRS => Some(THEM),
            _ => None,
        }
    }

    fn c(x: i8, y: i8) -> Cell {
        Cell::new(x, y)
    }

    #[test]
    fn test_geometry_rules_in_order() {
        assert_eq!(check_geometry(c(1, 1), c(1, 1)), Err(GeometryError::SameCell(c(1, 1))));
        assert_eq!(
            check_geometry(c(1, 1), c(2, 2)),
            Err(GeometryError::NotAdjacent(c(1, 1), c(2, 2)))
        );
        assert_eq!(
            check_geometry(c(1, 1), c(1, 3)),
            Err(GeometryError::NotAdjacent(c(1, 1), c(1, 3)))
        );
        assert_eq!(check_geometry(c(6, 0), c(7, 0)), Err(GeometryError::OutOfBounds(c(7, 0))));
        assert_eq!(check_geometry(c(0, -1), c(0, 0)), Err(GeometryError::OutOfBounds(c(0, -1))));
        assert!(check_geometry(c(0, 0), c(1, 0)).is_ok());
        assert!(check_geometry(c(6, 5), c(6, 6)).is_ok());
    }

    #[test]
    fn test_empty_board_accepts() {
        let layer = CarpetLayer::new();
        assert!(check_placement(&layer, ME, owner_of, c(3, 3), c(3, 4)).is_ok());
    }

    #[test]
    fn test_own_visible_carpet_rejected() {
        let mut layer = CarpetLayer::new();
        layer.place(MINE, c(2, 2), c(2, 3), 1);

        assert_eq!(
            check_placement(&layer, ME, owner_of, c(2, 3), c(2, 4)),
            Err(EngineError::OverlapViolation(OverlapError::OwnCarpetVisible { cell: c(2, 3) }))
        );
        // Someone else may cover it.
        assert!(check_placement(&layer, THEM, owner_of, c(2, 3), c(2, 4)).is_ok());
    }

    #[test]
    fn test_own_carpet_buried_is_fine() {
        let mut layer = CarpetLayer::new();
        layer.place(MINE, c(2, 2), c(2, 3), 1);
        layer.place(THEIRS, c(2, 2), c(1, 2), 2);

        // (2,2) now shows THEIRS; (2,1) is empty.
        assert!(check_placement(&layer, ME, owner_of, c(2, 2), c(2, 1)).is_ok());
    }

    #[test]
    fn test_full_cover_of_single_placement_rejected() {
        let mut layer = CarpetLayer::new();
        layer.place(THEIRS, c(4, 4), c(5, 4), 3);

        assert_eq!(
            check_placement(&layer, ME, owner_of, c(4, 4), c(5, 4)),
            Err(EngineError::OverlapViolation(OverlapError::CoversWholeCarpet {
                carpet: THEIRS,
                turn: 3
            }))
        );
        // Reversed cell order is the same footprint.
        assert!(check_placement(&layer, ME, owner_of, c(5, 4), c(4, 4)).is_err());
        // Half cover is allowed.
        assert!(check_placement(&layer, ME, owner_of, c(4, 4), c(4, 5)).is_ok());
    }

    #[test]
    fn test_same_carpet_different_turns_allowed() {
        let mut layer = CarpetLayer::new();
        layer.place(THEIRS, c(0, 0), c(1, 0), 1);
        layer.place(THEIRS, c(2, 0), c(3, 0), 2);

        // (1,0) and (2,0) both show THEIRS, but from two placements.
        assert!(check_placement(&layer, ME, owner_of, c(1, 0), c(2, 0)).is_ok());
    }

    #[test]
    fn test_own_carpet_reported_before_full_cover() {
        let mut layer = CarpetLayer::new();
        layer.place(MINE, c(0, 0), c(1, 0), 1);

        assert!(matches!(
            check_placement(&layer, ME, owner_of, c(0, 0), c(1, 0)),
            Err(EngineError::OverlapViolation(OverlapError::OwnCarpetVisible { .. }))
        ));
    }

    #[test]
    fn test_near_assam() {
        let assam = c(3, 3);

        assert_eq!(check_near_assam(assam, c(3, 3), c(3, 4)), Err(GeometryError::OnAssam(c(3, 3))));
        assert_eq!(check_near_assam(assam, c(3, 2), c(3, 3)), Err(GeometryError::OnAssam(c(3, 3))));
        assert_eq!(
            check_near_assam(assam, c(5, 3), c(4, 3)),
            Err(GeometryError::NotTouchingAssam { first: c(5, 3), assam })
        );
        // Only the first cell has to touch Assam.
        assert!(check_near_assam(assam, c(4, 3), c(5, 3)).is_ok());
        assert!(check_near_assam(assam, c(2, 3), c(2, 2)).is_ok());
    }

    #[test]
    fn test_after_move_runs_assam_checks_first() {
        let layer = CarpetLayer::new();

        assert_eq!(
            check_placement_after_move(&layer, c(0, 0), ME, owner_of, c(0, 0), c(0, 0)),
            Err(EngineError::InvalidGeometry(GeometryError::OnAssam(c(0, 0))))
        );
        assert_eq!(
            check_placement_after_move(&layer, c(0, 0), ME, owner_of, c(1, 0), c(1, 0)),
            Err(EngineError::InvalidGeometry(GeometryError::SameCell(c(1, 0))))
        );
        assert!(check_placement_after_move(&layer, c(0, 0), ME, owner_of, c(1, 0), c(2, 0)).is_ok());
    }
}
