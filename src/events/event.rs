//! Events emitted by the engine.

use serde::{Deserialize, Serialize};

use crate::board::{Cell, Direction};
use crate::core::{CarpetId, Color, GameId, UserId};
use crate::rules::{FinishReason, PlayerScore};

/// A cell whose visible colour changed, and what shows there now.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellUpdate {
    pub cell: Cell,
    pub color: Option<Color>,
}

/// Something observers need to hear about.
///
/// Serialized with a `type` tag so a broadcaster can forward the JSON as is:
///
/// ```
/// use marrakech::core::UserId;
/// use marrakech::events::GameEvent;
///
/// let event = GameEvent::TurnChanged { user: UserId(4), move_number: 9 };
/// let json = serde_json::to_string(&event).unwrap();
/// assert_eq!(json, r#"{"type":"turn_changed","user":4,"move_number":9}"#);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameEvent {
    GameStarted {
        game: GameId,
        current: UserId,
    },
    AssamMoved {
        dice: u8,
        from: Cell,
        to: Cell,
        direction: Direction,
    },
    /// Only emitted for non-zero transfers.
    PaymentMade {
        from: UserId,
        to: UserId,
        amount: u32,
    },
    PlayerEliminated {
        user: UserId,
        color: Color,
    },
    /// Cells uncovered by a removed carpet.
    FieldChanged {
        cells: Vec<CellUpdate>,
    },
    CarpetPlaced {
        carpet: CarpetId,
        owner: UserId,
        color: Color,
        cells: [Cell; 2],
        turn: u32,
    },
    TurnChanged {
        user: UserId,
        move_number: u32,
    },
    GameFinished {
        winner: Option<UserId>,
        reason: FinishReason,
        scores: Vec<PlayerScore>,
    },
}

impl GameEvent {
    /// Short name, matching the serialized tag.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            GameEvent::GameStarted { .. } => "game_started",
            GameEvent::AssamMoved { .. } => "assam_moved",
            GameEvent::PaymentMade { .. } => "payment_made",
            GameEvent::PlayerEliminated { .. } => "player_eliminated",
            GameEvent::FieldChanged { .. } => "field_changed",
            GameEvent::CarpetPlaced { .. } => "carpet_placed",
            GameEvent::TurnChanged { .. } => "turn_changed",
            GameEvent::GameFinished { .. } => "game_finished",
        }
    }
}
