//! Player actions.
//!
//! Every thing a player can do on their turn is one `Action`. The engine
//! exposes a method per action as well; `RuleEngine::apply` dispatches an
//! `Action` to the matching method, and `RuleEngine::legal_actions` lists the
//! ones that would currently succeed.

use serde::{Deserialize, Serialize};

use super::entity::CarpetId;
use crate::board::{Cell, Direction};

/// One player decision.
///
/// ```
/// use marrakech::board::{Cell, Direction};
/// use marrakech::core::{Action, CarpetId};
///
/// let turn = [
///     Action::Move { direction: Direction::Left },
///     Action::PlaceCarpetAfterMove {
///         carpet: CarpetId::new(1),
///         cells: [Cell::new(1, 3), Cell::new(0, 3)],
///     },
///     Action::SwitchTurn,
/// ];
/// assert!(turn[0].is_move());
/// assert_eq!(turn[1].carpet(), Some(CarpetId::new(1)));
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    /// Face `direction`, roll, walk, pay.
    Move { direction: Direction },

    /// Lay a carpet without the Assam checks.
    PlaceCarpet { carpet: CarpetId, cells: [Cell; 2] },

    /// Lay a carpet next to where Assam stopped.
    PlaceCarpetAfterMove { carpet: CarpetId, cells: [Cell; 2] },

    /// Hand the turn to the next active player.
    SwitchTurn,
}

impl Action {
    #[must_use]
    pub fn is_move(&self) -> bool {
        matches!(self, Action::Move { .. })
    }

    #[must_use]
    pub fn is_placement(&self) -> bool {
        matches!(self, Action::PlaceCarpet { .. } | Action::PlaceCarpetAfterMove { .. })
    }

    /// The carpet a placement lays.
    #[must_use]
    pub fn carpet(&self) -> Option<CarpetId> {
        match self {
            Action::PlaceCarpet { carpet, .. } | Action::PlaceCarpetAfterMove { carpet, .. } => Some(*carpet),
            _ => None,
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Action::Move { direction } => write!(f, "move {direction}"),
            Action::PlaceCarpet { carpet, cells: [a, b] } => write!(f, "place {carpet} on {a} {b}"),
            Action::PlaceCarpetAfterMove { carpet, cells: [a, b] } => {
                write!(f, "place {carpet} next to Assam on {a} {b}")
            }
            Action::SwitchTurn => write!(f, "switch turn"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_predicates() {
        let mv = Action::Move { direction: Direction::Up };
        let place = Action::PlaceCarpet {
            carpet: CarpetId(2),
            cells: [Cell::new(0, 0), Cell::new(0, 1)],
        };

        assert!(mv.is_move());
        assert!(!mv.is_placement());
        assert!(place.is_placement());
        assert_eq!(place.carpet(), Some(CarpetId(2)));
        assert_eq!(Action::SwitchTurn.carpet(), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(Action::Move { direction: Direction::Left }.to_string(), "move left");
        assert_eq!(Action::SwitchTurn.to_string(), "switch turn");
        let place = Action::PlaceCarpet {
            carpet: CarpetId(3),
            cells: [Cell::new(1, 2), Cell::new(1, 3)],
        };
        assert_eq!(place.to_string(), "place Carpet(3) on (1, 2) (1, 3)");
    }

    #[test]
    fn test_json_shape() {
        let action = Action::Move { direction: Direction::Right };
        let json = serde_json::to_string(&action).unwrap();
        assert_eq!(json, r#"{"action":"move","direction":"right"}"#);

        let back: Action = serde_json::from_str(&json).unwrap();
        assert_eq!(back, action);
    }
}
