//! Game configuration.
//!
//! Every rule constant the engine uses lives in `GameConfig`. The defaults
//! are the standard Marrakech rules; games can override any of them in code
//! with the `with_*` builders or load a TOML document:
//!
//! ```
//! use marrakech::core::GameConfig;
//!
//! let config = GameConfig::from_toml_str(r#"
//!     starting_coins = 20
//!     dice_faces = [1, 2, 3]
//! "#).unwrap();
//!
//! assert_eq!(config.starting_coins, 20);
//! assert_eq!(config.carpet_quota, 12); // untouched keys keep their defaults
//! ```

use serde::{Deserialize, Serialize};

use super::player::Color;
use super::rng::DICE_FACES;
use crate::board::{Cell, Direction};
use crate::error::ConfigError;

/// Rule constants for one game.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Coins each player is seated with.
    pub starting_coins: u32,

    /// Placements every active player must reach to end the game.
    pub carpet_quota: u32,

    /// Seats available.
    pub max_players: usize,

    /// Faces of the movement die, rolled uniformly.
    pub dice_faces: Vec<u8>,

    /// Assam's starting cell.
    pub assam_start: Cell,

    /// Assam's starting facing.
    pub assam_direction: Direction,

    /// Move number of the first turn. Placement turns are tagged with it.
    pub first_move_number: u32,

    /// Colours handed out in seating order when a player does not pick one.
    pub palette: Vec<Color>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            starting_coins: 30,
            carpet_quota: 12,
            max_players: 4,
            dice_faces: DICE_FACES.to_vec(),
            assam_start: Cell::new(3, 3),
            assam_direction: Direction::Up,
            first_move_number: 1,
            palette: Color::ALL.to_vec(),
        }
    }
}

impl GameConfig {
    /// Standard rules.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse and validate a TOML document. Missing keys take defaults.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the constants are internally consistent.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.dice_faces.is_empty() {
            return Err(ConfigError::Validation("dice_faces must not be empty".into()));
        }
        if self.dice_faces.contains(&0) {
            return Err(ConfigError::Validation("dice faces must be at least 1".into()));
        }
        if !self.assam_start.is_on_board() {
            return Err(ConfigError::Validation(format!(
                "assam_start {} is off the board",
                self.assam_start
            )));
        }
        if self.max_players == 0 {
            return Err(ConfigError::Validation("max_players must be at least 1".into()));
        }
        if self.palette.len() < self.max_players {
            return Err(ConfigError::Validation(format!(
                "palette has {} colours for {} seats",
                self.palette.len(),
                self.max_players
            )));
        }
        for (i, color) in self.palette.iter().enumerate() {
            if self.palette[..i].contains(color) {
                return Err(ConfigError::Validation(format!("colour {color} appears twice in palette")));
            }
        }
        if self.first_move_number == 0 {
            return Err(ConfigError::Validation("first_move_number must be positive".into()));
        }
        Ok(())
    }

    /// Set starting coins.
    #[must_use]
    pub fn with_starting_coins(mut self, coins: u32) -> Self {
        self.starting_coins = coins;
        self
    }

    /// Set the placement quota.
    #[must_use]
    pub fn with_carpet_quota(mut self, quota: u32) -> Self {
        self.carpet_quota = quota;
        self
    }

    /// Set the seat limit.
    #[must_use]
    pub fn with_max_players(mut self, max: usize) -> Self {
        self.max_players = max;
        self
    }

    /// Replace the die.
    #[must_use]
    pub fn with_dice_faces(mut self, faces: impl Into<Vec<u8>>) -> Self {
        self.dice_faces = faces.into();
        self
    }

    /// Set Assam's starting cell and facing.
    #[must_use]
    pub fn with_assam(mut self, cell: Cell, direction: Direction) -> Self {
        self.assam_start = cell;
        self.assam_direction = direction;
        self
    }
}
