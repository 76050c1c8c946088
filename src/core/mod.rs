//! Core engine types: identities, players, state, actions, dice, configuration.
//!
//! Everything in here is plain data plus the setup operations of a game.
//! Turn execution lives in `rules`; this module only describes what a game
//! looks like at rest.

pub mod entity;
pub mod player;
pub mod rng;
pub mod config;
pub mod action;
pub mod state;
pub mod snapshot;

pub use entity::{CarpetId, GameId, UserId};
pub use player::{Carpet, Color, ParseColorError, Player, PlayerId, PlayerMap};
pub use rng::{DiceRoller, GameRng, GameRngState, ScriptedDice, DICE_FACES};
pub use config::GameConfig;
pub use action::Action;
pub use state::{Assam, GameState, GameStatus, TurnPhase};
pub use snapshot::{AssamSnapshot, CarpetSnapshot, GameSnapshot, PlacementSnapshot, PlayerSnapshot};
