//! # marrakech
//!
//! Rules and turn engine for the board game Marrakech.
//!
//! ## Design Principles
//!
//! 1. **Explicit State**: a game is a `GameState` value. Nothing is global;
//!    hosts own their games and pass them to the engine.
//!
//! 2. **Atomic Operations**: every engine call validates fully before it
//!    mutates. A rejected call changes nothing and emits nothing.
//!
//! 3. **Injectable Dice**: the only nondeterminism is the die, and it comes
//!    through the `DiceRoller` trait.
//!
//! ## Architecture
//!
//! - **Board**: static 7x7 geometry with the authored edge-reflection table,
//!   shared between games through `Arc`.
//!
//! - **Persistent Data Structures**: the carpet layer is backed by `im-rs`,
//!   so cloning a game for a what-if is O(1).
//!
//! ## Modules
//!
//! - `core`: identities, players, state, actions, dice, configuration
//! - `board`: cells, directions and Assam's walk
//! - `carpets`: carpet stacks and the placement rules
//! - `rules`: turn execution and game completion
//! - `events`: what the engine tells the outside world
//! - `table`: many games hosted behind per-game locks
//! - `error`: error types
//!
//! ## Example
//!
//! ```
//! use marrakech::{Direction, GameConfig, GameId, GameState, RuleEngine, ScriptedDice, UserId};
//! use marrakech::events::EventLog;
//!
//! let mut state = GameState::new(GameId(1), GameConfig::default()).unwrap();
//! state.seat_player(UserId(1), None).unwrap();
//! state.seat_player(UserId(2), None).unwrap();
//!
//! let mut log = EventLog::new();
//! state.start(&mut log).unwrap();
//!
//! let mut engine = RuleEngine::new(ScriptedDice::new([3]));
//! engine.complete_move(&mut state, Direction::Left, &mut log).unwrap();
//! engine.switch_turn(&mut state, &mut log).unwrap();
//!
//! assert_eq!(state.current_player().map(|p| p.user), Some(UserId(2)));
//! assert_eq!(log.len(), 3);
//! ```

pub mod core;
pub mod board;
pub mod carpets;
pub mod rules;
pub mod events;
pub mod table;
pub mod error;

// Re-export commonly used types
pub use crate::core::{
    Action,
    CarpetId, GameId, UserId,
    Carpet, Color, Player, PlayerId, PlayerMap,
    DiceRoller, GameRng, GameRngState, ScriptedDice, DICE_FACES,
    GameConfig,
    Assam, GameState, GameStatus, TurnPhase,
    GameSnapshot,
};

pub use crate::board::{Board, Cell, Direction};

pub use crate::carpets::{CarpetLayer, CarpetPlacement};

pub use crate::rules::{
    ActionOutcome, CompletionEvaluator, FinishReason, GameOutcome, MoveOutcome, Payment, PlayerScore, RuleEngine,
    TurnChange,
};

pub use crate::events::{EventLog, EventSink, GameEvent, NullSink};

pub use crate::table::GameTable;

pub use crate::error::{EngineError, EngineResult};
