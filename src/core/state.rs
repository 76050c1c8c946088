//! Game state: status, Assam, players and the carpet layer.
//!
//! ## GameState
//!
//! One game's complete mutable state:
//! - Status and turn phase
//! - Assam's cell and facing, the move counter
//! - Seated players in turn order, whose turn it is
//! - The carpet layer
//!
//! The board geometry is shared (`Arc<Board>`) and never mutated. Everything
//! else is owned by exactly one `GameState`, and the only writers are setup
//! (`seat_player`, `start`) and the `RuleEngine`.

use std::sync::Arc;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::config::GameConfig;
use super::entity::{CarpetId, GameId, UserId};
use super::player::{Carpet, Color, Player, PlayerId, PlayerMap};
use crate::board::{Board, Cell, Direction};
use crate::carpets::CarpetLayer;
use crate::error::{ConfigError, EngineResult, StateError};
use crate::events::{EventSink, GameEvent};

/// Lifecycle of a game. Only ever moves forward.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameStatus {
    Waiting,
    InProgress,
    Finished,
}

impl std::fmt::Display for GameStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            GameStatus::Waiting => "waiting",
            GameStatus::InProgress => "in_progress",
            GameStatus::Finished => "finished",
        })
    }
}

/// Step within the current player's turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnPhase {
    /// Waiting for the direction and dice roll.
    AwaitingMove,
    /// Assam has moved; the player may lay a carpet.
    AwaitingPlacement,
    /// Nothing left to do but hand over the turn.
    AwaitingSwitch,
}

impl std::fmt::Display for TurnPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            TurnPhase::AwaitingMove => "awaiting move",
            TurnPhase::AwaitingPlacement => "awaiting placement",
            TurnPhase::AwaitingSwitch => "awaiting switch",
        })
    }
}

/// The shared figure.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Assam {
    pub cell: Cell,
    pub direction: Direction,
}

/// Complete state of one game.
///
/// ```
/// use marrakech::core::{GameConfig, GameId, GameState, GameStatus, UserId};
/// use marrakech::events::NullSink;
///
/// let mut state = GameState::new(GameId(1), GameConfig::default()).unwrap();
/// state.seat_player(UserId(10), None).unwrap();
/// state.seat_player(UserId(20), None).unwrap();
/// state.start(&mut NullSink).unwrap();
///
/// assert_eq!(state.status(), GameStatus::InProgress);
/// assert_eq!(state.current_player().map(|p| p.user), Some(UserId(10)));
/// ```
#[derive(Clone, Debug)]
pub struct GameState {
    pub(crate) id: GameId,
    pub(crate) board: Arc<Board>,
    pub(crate) config: GameConfig,
    pub(crate) status: GameStatus,
    pub(crate) phase: TurnPhase,
    pub(crate) assam: Assam,
    pub(crate) move_number: u32,
    pub(crate) players: PlayerMap<Player>,
    pub(crate) current: Option<PlayerId>,
    pub(crate) carpets: CarpetLayer,
    pub(crate) next_carpet: CarpetId,
}

impl GameState {
    /// Create a waiting game on the standard board.
    pub fn new(id: GameId, config: GameConfig) -> Result<Self, ConfigError> {
        Self::with_board(id, config, Arc::new(Board::classic()))
    }

    /// Create a waiting game on a shared board.
    ///
    /// The config is validated first, so Assam starts on the board and
    /// every die face is at least 1.
    pub fn with_board(id: GameId, config: GameConfig, board: Arc<Board>) -> Result<Self, ConfigError> {
        config.validate()?;
        if !board.is_inside(config.assam_start) {
            return Err(ConfigError::Validation(format!(
                "assam_start {} is off the board",
                config.assam_start
            )));
        }
        Ok(Self {
            id,
            board,
            status: GameStatus::Waiting,
            phase: TurnPhase::AwaitingMove,
            assam: Assam {
                cell: config.assam_start,
                direction: config.assam_direction,
            },
            move_number: config.first_move_number,
            players: PlayerMap::new(),
            current: None,
            carpets: CarpetLayer::new(),
            next_carpet: CarpetId::FIRST,
            config,
        })
    }

    // === Accessors ===

    #[must_use]
    pub fn id(&self) -> GameId {
        self.id
    }

    #[must_use]
    pub fn board(&self) -> &Arc<Board> {
        &self.board
    }

    #[must_use]
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    #[must_use]
    pub fn status(&self) -> GameStatus {
        self.status
    }

    #[must_use]
    pub fn phase(&self) -> TurnPhase {
        self.phase
    }

    #[must_use]
    pub fn assam(&self) -> Assam {
        self.assam
    }

    /// Global move counter. Carpets laid now are tagged with it.
    #[must_use]
    pub fn move_number(&self) -> u32 {
        self.move_number
    }

    #[must_use]
    pub fn players(&self) -> &PlayerMap<Player> {
        &self.players
    }

    #[must_use]
    pub fn carpets(&self) -> &CarpetLayer {
        &self.carpets
    }

    /// Seat whose turn it is. `None` before the game starts.
    #[must_use]
    pub fn current_seat(&self) -> Option<PlayerId> {
        self.current
    }

    #[must_use]
    pub fn current_player(&self) -> Option<&Player> {
        self.current.and_then(|seat| self.players.get(seat))
    }

    #[must_use]
    pub fn player(&self, seat: PlayerId) -> Option<&Player> {
        self.players.get(seat)
    }

    #[must_use]
    pub fn player_by_user(&self, user: UserId) -> Option<&Player> {
        self.players.values().find(|p| p.user == user)
    }

    /// The carpet with this id, wherever it is.
    #[must_use]
    pub fn carpet(&self, id: CarpetId) -> Option<&Carpet> {
        self.carpet_owner(id).map(|p| &p.carpet)
    }

    #[must_use]
    pub fn carpet_owner(&self, id: CarpetId) -> Option<&Player> {
        self.players.values().find(|p| p.owns(id))
    }

    /// Players still in the game, in turn order.
    pub fn active_players(&self) -> impl Iterator<Item = &Player> {
        self.players.values().filter(|p| p.active)
    }

    #[must_use]
    pub fn active_count(&self) -> usize {
        self.active_players().count()
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.status == GameStatus::Finished
    }

    /// Colour visible at `cell`.
    #[must_use]
    pub fn color_at(&self, cell: Cell) -> Option<Color> {
        self.carpets
            .top_carpet(cell)
            .and_then(|id| self.carpet(id))
            .map(|c| c.color)
    }

    /// Number of cells on which each colour is visible.
    #[must_use]
    pub fn visible_area(&self) -> FxHashMap<Color, u32> {
        let mut area = FxHashMap::default();
        for (carpet, cells) in self.carpets.visible_counts() {
            if let Some(c) = self.carpet(carpet) {
                *area.entry(c.color).or_insert(0) += cells as u32;
            }
        }
        area
    }

    // === Setup ===

    /// Seat a user and hand them a carpet.
    ///
    /// Without an explicit colour the first free palette colour is used.
    pub fn seat_player(&mut self, user: UserId, color: Option<Color>) -> EngineResult<PlayerId> {
        match self.status {
            GameStatus::Waiting => {}
            GameStatus::InProgress => return Err(StateError::AlreadyStarted.into()),
            GameStatus::Finished => return Err(StateError::Finished.into()),
        }
        if self.players.player_count() >= self.config.max_players {
            return Err(StateError::TableFull(self.config.max_players).into());
        }
        if self.player_by_user(user).is_some() {
            return Err(StateError::AlreadySeated(user).into());
        }

        let taken = |c: Color| self.players.values().any(|p| p.color == c);
        let color = match color {
            Some(c) if self.config.palette.contains(&c) && !taken(c) => c,
            Some(c) => return Err(StateError::ColorTaken(c).into()),
            None => self
                .config
                .palette
                .iter()
                .copied()
                .find(|&c| !taken(c))
                .ok_or(StateError::TableFull(self.players.player_count()))?,
        };

        let carpet = self.next_carpet;
        self.next_carpet = carpet.next();
        let seat = PlayerId(self.players.player_count() as u8);
        self.players
            .push(Player::new(user, seat, color, carpet, self.config.starting_coins));

        info!(game = %self.id, %user, %seat, %color, "player seated");
        Ok(seat)
    }

    /// Leave the waiting room. The first seat moves first.
    pub fn start(&mut self, sink: &mut impl EventSink) -> EngineResult<()> {
        match self.status {
            GameStatus::Waiting => {}
            GameStatus::InProgress => return Err(StateError::AlreadyStarted.into()),
            GameStatus::Finished => return Err(StateError::Finished.into()),
        }
        let first = self
            .players
            .get(PlayerId(0))
            .ok_or(StateError::NoPlayersSeated)?;
        let user = first.user;

        self.status = GameStatus::InProgress;
        self.phase = TurnPhase::AwaitingMove;
        self.current = Some(PlayerId(0));

        info!(game = %self.id, players = self.players.player_count(), "game started");
        sink.emit(GameEvent::GameStarted {
            game: self.id,
            current: user,
        });
        Ok(())
    }

    // === Guards ===

    /// Fail unless the game is being played.
    pub(crate) fn ensure_in_progress(&self) -> Result<(), StateError> {
        match self.status {
            GameStatus::InProgress => Ok(()),
            GameStatus::Waiting => Err(StateError::NotStarted),
            GameStatus::Finished => Err(StateError::Finished),
        }
    }

    pub(crate) fn ensure_phase(&self, expected: TurnPhase) -> Result<(), StateError> {
        if self.phase == expected {
            Ok(())
        } else {
            Err(StateError::WrongPhase {
                expected,
                actual: self.phase,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EngineError;

    fn waiting() -> GameState {
        GameState::new(GameId(1), GameConfig::default()).unwrap()
    }

    #[test]
    fn test_new_game_defaults() {
        let state = waiting();

        assert_eq!(state.status(), GameStatus::Waiting);
        assert_eq!(state.assam().cell, Cell::new(3, 3));
        assert_eq!(state.assam().direction, Direction::Up);
        assert_eq!(state.move_number(), 1);
        assert!(state.current_player().is_none());
        assert!(state.carpets().is_empty());
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let off_board = GameConfig::default().with_assam(Cell::new(7, 3), Direction::Up);
        assert!(matches!(
            GameState::new(GameId(1), off_board),
            Err(ConfigError::Validation(_))
        ));

        let no_dice = GameConfig::default().with_dice_faces(Vec::new());
        assert!(matches!(
            GameState::new(GameId(1), no_dice),
            Err(ConfigError::Validation(_))
        ));

        let turn_zero = GameConfig {
            first_move_number: 0,
            ..GameConfig::default()
        };
        assert!(GameState::new(GameId(1), turn_zero).is_err());
    }

    #[test]
    fn test_seat_assigns_palette_colors_and_carpets() {
        let mut state = waiting();
        let a = state.seat_player(UserId(1), None).unwrap();
        let b = state.seat_player(UserId(2), None).unwrap();

        assert_eq!(a, PlayerId(0));
        assert_eq!(b, PlayerId(1));
        assert_eq!(state.player(a).unwrap().color, Color::Red);
        assert_eq!(state.player(b).unwrap().color, Color::Blue);
        assert_ne!(state.player(a).unwrap().carpet.id, state.player(b).unwrap().carpet.id);
        assert_eq!(state.player(a).unwrap().coins, 30);
    }

    #[test]
    fn test_seat_with_explicit_color() {
        let mut state = waiting();
        state.seat_player(UserId(1), Some(Color::Green)).unwrap();
        state.seat_player(UserId(2), None).unwrap();

        assert_eq!(state.player_by_user(UserId(1)).unwrap().color, Color::Green);
        assert_eq!(state.player_by_user(UserId(2)).unwrap().color, Color::Red);

        let err = state.seat_player(UserId(3), Some(Color::Green)).unwrap_err();
        assert_eq!(err, EngineError::IllegalState(StateError::ColorTaken(Color::Green)));
    }

    #[test]
    fn test_seat_rejections() {
        let mut state = GameState::new(GameId(1), GameConfig::default().with_max_players(2)).unwrap();
        state.seat_player(UserId(1), None).unwrap();

        assert_eq!(
            state.seat_player(UserId(1), None),
            Err(EngineError::IllegalState(StateError::AlreadySeated(UserId(1))))
        );

        state.seat_player(UserId(2), None).unwrap();
        assert_eq!(
            state.seat_player(UserId(3), None),
            Err(EngineError::IllegalState(StateError::TableFull(2)))
        );
    }

    #[test]
    fn test_start_requires_players() {
        let mut state = waiting();
        let mut events = Vec::new();

        assert_eq!(
            state.start(&mut events),
            Err(EngineError::IllegalState(StateError::NoPlayersSeated))
        );
        assert!(events.is_empty());
        assert_eq!(state.status(), GameStatus::Waiting);
    }

    #[test]
    fn test_start_emits_event_and_locks_seating() {
        let mut state = waiting();
        state.seat_player(UserId(7), None).unwrap();
        let mut events = Vec::new();
        state.start(&mut events).unwrap();

        assert_eq!(state.status(), GameStatus::InProgress);
        assert_eq!(state.phase(), TurnPhase::AwaitingMove);
        assert_eq!(
            events,
            vec![GameEvent::GameStarted {
                game: GameId(1),
                current: UserId(7)
            }]
        );

        assert_eq!(
            state.seat_player(UserId(8), None),
            Err(EngineError::IllegalState(StateError::AlreadyStarted))
        );
        assert_eq!(
            state.start(&mut events),
            Err(EngineError::IllegalState(StateError::AlreadyStarted))
        );
    }

    #[test]
    fn test_guards() {
        let mut state = waiting();
        assert_eq!(state.ensure_in_progress(), Err(StateError::NotStarted));

        state.status = GameStatus::Finished;
        assert_eq!(state.ensure_in_progress(), Err(StateError::Finished));

        state.status = GameStatus::InProgress;
        assert!(state.ensure_in_progress().is_ok());
        assert!(state.ensure_phase(TurnPhase::AwaitingMove).is_ok());
        assert_eq!(
            state.ensure_phase(TurnPhase::AwaitingSwitch),
            Err(StateError::WrongPhase {
                expected: TurnPhase::AwaitingSwitch,
                actual: TurnPhase::AwaitingMove
            })
        );
    }

    #[test]
    fn test_visible_area_by_color() {
        let mut state = waiting();
        let red = state.seat_player(UserId(1), None).unwrap();
        let blue = state.seat_player(UserId(2), None).unwrap();
        let red_carpet = state.players[red].carpet.id;
        let blue_carpet = state.players[blue].carpet.id;

        state.carpets.place(red_carpet, Cell::new(0, 0), Cell::new(0, 1), 1);
        state.carpets.place(blue_carpet, Cell::new(0, 1), Cell::new(0, 2), 2);

        let area = state.visible_area();
        assert_eq!(area.get(&Color::Red), Some(&1));
        assert_eq!(area.get(&Color::Blue), Some(&2));
        assert_eq!(state.color_at(Cell::new(0, 1)), Some(Color::Blue));
        assert_eq!(state.color_at(Cell::new(5, 5)), None);
    }
}
