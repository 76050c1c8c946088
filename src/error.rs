//! Error types.
//!
//! Every engine failure is a local validation failure scoped to one
//! operation: the state it was handed is left exactly as it was. Callers
//! decide whether to re-prompt the player; nothing here is retried.

use thiserror::Error;

use crate::board::{Cell, Direction};
use crate::core::{CarpetId, Color, GameId, PlayerId, TurnPhase, UserId};

/// Result alias for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Failure of an engine operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// The requested direction is the 180° reverse of Assam's facing.
    #[error("Assam cannot turn around: {requested} reverses {current}")]
    InvalidDirection { current: Direction, requested: Direction },

    /// The two chosen cells do not form a legal domino.
    #[error("invalid carpet geometry: {0}")]
    InvalidGeometry(#[from] GeometryError),

    /// The domino is legal but the stacking rules forbid it.
    #[error("carpet overlap violation: {0}")]
    OverlapViolation(#[from] OverlapError),

    /// A game or carpet does not exist.
    #[error("{0} not found")]
    EntityNotFound(Entity),

    /// The operation does not apply to the game's current state.
    #[error("illegal state: {0}")]
    IllegalState(#[from] StateError),

    /// The game's rule constants are inconsistent.
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// A snapshot could not be turned back into a game.
    #[error("invalid snapshot: {0}")]
    InvalidSnapshot(String),
}

impl From<ConfigError> for EngineError {
    fn from(err: ConfigError) -> Self {
        EngineError::InvalidConfig(err.to_string())
    }
}

impl From<SnapshotError> for EngineError {
    fn from(err: SnapshotError) -> Self {
        EngineError::InvalidSnapshot(err.to_string())
    }
}

/// Placement geometry failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GeometryError {
    #[error("both halves of the carpet are on {0}")]
    SameCell(Cell),

    #[error("{0} and {1} do not share a side")]
    NotAdjacent(Cell, Cell),

    #[error("{0} is outside the 7x7 board")]
    OutOfBounds(Cell),

    #[error("Assam is standing on {0}")]
    OnAssam(Cell),

    #[error("first cell {first} does not touch Assam at {assam}")]
    NotTouchingAssam { first: Cell, assam: Cell },
}

/// Stacking-rule failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum OverlapError {
    #[error("your own carpet is on top at {cell}")]
    OwnCarpetVisible { cell: Cell },

    #[error("{carpet} placed on turn {turn} would be covered completely")]
    CoversWholeCarpet { carpet: CarpetId, turn: u32 },
}

/// Operations attempted in the wrong game state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum StateError {
    #[error("the game has not started")]
    NotStarted,

    #[error("the game has already started")]
    AlreadyStarted,

    #[error("the game is finished")]
    Finished,

    #[error("no players are seated")]
    NoPlayersSeated,

    #[error("all {0} seats are taken")]
    TableFull(usize),

    #[error("{0} is already seated")]
    AlreadySeated(UserId),

    #[error("colour {0} is taken or not in the palette")]
    ColorTaken(Color),

    #[error("expected {expected}, game is in {actual}")]
    WrongPhase { expected: TurnPhase, actual: TurnPhase },

    #[error("it is not {0}'s turn")]
    NotYourTurn(PlayerId),

    #[error("{0} is already hosted")]
    AlreadyHosted(GameId),
}

/// What was looked up and not found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    Game(GameId),
    Carpet(CarpetId),
}

impl std::fmt::Display for Entity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Entity::Game(id) => write!(f, "{id}"),
            Entity::Carpet(id) => write!(f, "{id}"),
        }
    }
}

/// Configuration loading failures.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("config validation error: {0}")]
    Validation(String),
}

/// Snapshot encoding and restore failures.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("bincode error: {0}")]
    Bincode(#[from] bincode::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("inconsistent snapshot: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_error_display() {
        let err = EngineError::InvalidDirection {
            current: Direction::Up,
            requested: Direction::Down,
        };
        assert_eq!(err.to_string(), "Assam cannot turn around: down reverses up");
    }

    #[test]
    fn test_geometry_error_converts() {
        let err: EngineError = GeometryError::SameCell(Cell::new(1, 1)).into();
        assert_eq!(err.to_string(), "invalid carpet geometry: both halves of the carpet are on (1, 1)");
    }

    #[test]
    fn test_entity_not_found_display() {
        let err = EngineError::EntityNotFound(Entity::Game(GameId(5)));
        assert_eq!(err.to_string(), "Game(5) not found");
    }

    #[test]
    fn test_state_error_display() {
        let err: EngineError = StateError::TableFull(4).into();
        assert_eq!(err.to_string(), "illegal state: all 4 seats are taken");
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::Validation("dice_faces must not be empty".to_string());
        assert_eq!(err.to_string(), "config validation error: dice_faces must not be empty");

        let err: EngineError = err.into();
        assert_eq!(
            err,
            EngineError::InvalidConfig("config validation error: dice_faces must not be empty".to_string())
        );
    }
}
