//! Turn execution and game completion.
//!
//! `RuleEngine` drives a turn:
//! - Move: direction check, dice roll, Assam's walk, payment, elimination
//! - Placement: geometry and overlap validation, then the carpet write
//! - Switch: rotation to the next active player, then the completion check
//!
//! `CompletionEvaluator` decides when a game is over and ranks the players.

pub mod completion;
pub mod engine;

pub use completion::{CompletionEvaluator, FinishReason, GameOutcome, PlayerScore};
pub use engine::{legal_actions, ActionOutcome, MoveOutcome, Payment, RuleEngine, TurnChange};
