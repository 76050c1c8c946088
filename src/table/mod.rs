//! Hosting many games at once.
//!
//! ## Key Types
//!
//! - [`GameTable`]: games keyed by [`GameId`](crate::core::GameId), one lock
//!   per game
//! - [`MoveReport`] / [`SwitchReport`]: operation result plus the game's
//!   snapshot afterwards
//!
//! Every operation names its game by id. An unknown id fails with
//! `EntityNotFound(Game)`.

pub mod registry;

pub use registry::{GameTable, MoveReport, SwitchReport};
