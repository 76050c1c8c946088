//! Dice and deterministic random number generation.
//!
//! ## Key Features
//!
//! - **Injectable**: the engine rolls through the [`DiceRoller`] trait, so
//!   tests and replays can script every roll
//! - **Deterministic**: same seed produces an identical dice stream
//! - **Forkable**: a table-level RNG hands each new game its own stream
//! - **Serializable**: O(1) state capture and restore
//!
//! ```
//! use marrakech::core::{DiceRoller, GameRng, ScriptedDice, DICE_FACES};
//!
//! let mut rng = GameRng::new(42);
//! let roll = rng.roll(&DICE_FACES);
//! assert!((1..=4).contains(&roll));
//!
//! let mut scripted = ScriptedDice::new([2, 4]);
//! assert_eq!(scripted.roll(&DICE_FACES), 2);
//! assert_eq!(scripted.roll(&DICE_FACES), 4);
//! ```

use std::collections::VecDeque;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Faces of the Marrakech die. 2 and 3 appear twice.
pub const DICE_FACES: [u8; 6] = [1, 2, 2, 3, 3, 4];

/// Source of die rolls.
///
/// `faces` is the die being rolled; implementations pick one entry of it.
pub trait DiceRoller {
    /// Roll once.
    fn roll(&mut self, faces: &[u8]) -> u8;

    /// Where the stream stands, for dice that can be resumed.
    fn checkpoint(&self) -> Option<GameRngState> {
        None
    }
}

impl<D: DiceRoller + ?Sized> DiceRoller for &mut D {
    fn roll(&mut self, faces: &[u8]) -> u8 {
        (**self).roll(faces)
    }

    fn checkpoint(&self) -> Option<GameRngState> {
        (**self).checkpoint()
    }
}

impl<D: DiceRoller + ?Sized> DiceRoller for Box<D> {
    fn roll(&mut self, faces: &[u8]) -> u8 {
        (**self).roll(faces)
    }

    fn checkpoint(&self) -> Option<GameRngState> {
        (**self).checkpoint()
    }
}

/// Deterministic RNG with forking.
///
/// Uses ChaCha8 for speed while keeping good statistical quality.
#[derive(Clone, Debug)]
pub struct GameRng {
    inner: ChaCha8Rng,
    seed: u64,
    fork_counter: u64,
}

impl GameRng {
    /// Create a new RNG with the given seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            inner: ChaCha8Rng::seed_from_u64(seed),
            seed,
            fork_counter: 0,
        }
    }

    /// The seed this stream started from.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Fork this RNG to create an independent branch.
    ///
    /// Each fork produces a different but deterministic sequence.
    #[must_use]
    pub fn fork(&mut self) -> Self {
        self.fork_counter += 1;
        let fork_seed = self.seed.wrapping_add(self.fork_counter.wrapping_mul(0x9E3779B97F4A7C15));
        Self {
            inner: ChaCha8Rng::seed_from_u64(fork_seed),
            seed: fork_seed,
            fork_counter: 0,
        }
    }

    /// Choose a random element from a slice.
    #[must_use]
    pub fn choose<'a, T>(&mut self, slice: &'a [T]) -> Option<&'a T> {
        use rand::seq::SliceRandom;
        slice.choose(&mut self.inner)
    }

    /// Get the current state for serialization.
    #[must_use]
    pub fn state(&self) -> GameRngState {
        GameRngState {
            seed: self.seed,
            word_pos: self.inner.get_word_pos(),
            fork_counter: self.fork_counter,
        }
    }

    /// Restore from a saved state.
    #[must_use]
    pub fn from_state(state: &GameRngState) -> Self {
        let mut inner = ChaCha8Rng::seed_from_u64(state.seed);
        inner.set_word_pos(state.word_pos);
        Self {
            inner,
            seed: state.seed,
            fork_counter: state.fork_counter,
        }
    }
}

impl DiceRoller for GameRng {
    /// Uniform over `faces`. An empty die rolls 0.
    fn roll(&mut self, faces: &[u8]) -> u8 {
        self.choose(faces).copied().unwrap_or(0)
    }

    fn checkpoint(&self) -> Option<GameRngState> {
        Some(self.state())
    }
}

/// Serializable RNG state for checkpointing.
///
/// Uses ChaCha8 word position for O(1) serialization regardless of
/// how many rolls have been made.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameRngState {
    /// Original seed
    pub seed: u64,
    /// ChaCha8 word position (128-bit counter)
    pub word_pos: u128,
    /// Fork counter for deterministic branching
    pub fork_counter: u64,
}

/// Replays a fixed sequence of rolls, then cycles through it again.
///
/// Ignores the die it is handed. An empty script always rolls 1.
#[derive(Clone, Debug, Default)]
pub struct ScriptedDice {
    script: VecDeque<u8>,
}

impl ScriptedDice {
    /// Create dice that will produce `rolls` in order.
    pub fn new(rolls: impl IntoIterator<Item = u8>) -> Self {
        Self {
            script: rolls.into_iter().collect(),
        }
    }

    /// Queue another roll at the end of the script.
    pub fn push(&mut self, roll: u8) {
        self.script.push_back(roll);
    }
}

impl DiceRoller for ScriptedDice {
    fn roll(&mut self, _faces: &[u8]) -> u8 {
        match self.script.pop_front() {
            Some(roll) => {
                self.script.push_back(roll);
                roll
            }
            None => 1,
        }
    }
}
