//! The game registry.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};

use rustc_hash::FxHashMap;
use tracing::{info, instrument, warn};

use crate::board::{Board, Cell, Direction};
use crate::carpets::CarpetPlacement;
use crate::core::{Action, CarpetId, DiceRoller, GameConfig, GameId, GameRng, GameSnapshot, GameState, UserId};
use crate::error::{EngineError, EngineResult, Entity, StateError};
use crate::events::EventSink;
use crate::rules::{self, ActionOutcome, MoveOutcome, RuleEngine, TurnChange};

/// What `roll_and_move` hands back.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MoveReport {
    pub outcome: MoveOutcome,
    /// The game after the move.
    pub snapshot: GameSnapshot,
}

impl MoveReport {
    #[must_use]
    pub fn dice(&self) -> u8 {
        self.outcome.dice
    }
}

/// What `switch_turn` hands back.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SwitchReport {
    pub change: TurnChange,
    /// The game after the switch.
    pub snapshot: GameSnapshot,
}

/// One hosted game and the engine that runs it.
#[derive(Debug)]
struct TableGame<D: DiceRoller> {
    state: GameState,
    engine: RuleEngine<D>,
}

impl<D: DiceRoller> TableGame<D> {
    fn snapshot(&self) -> GameSnapshot {
        self.state.snapshot().with_dice(self.engine.dice().checkpoint())
    }
}

type Slot<D> = Arc<Mutex<TableGame<D>>>;

/// Hosts many games, each behind its own lock.
///
/// The map lock is only held long enough to find a game. The game's own
/// mutex is then held for the whole operation, so operations on one game
/// are serialized while different games proceed in parallel.
///
/// ```
/// use marrakech::board::Direction;
/// use marrakech::core::{GameConfig, UserId};
/// use marrakech::events::EventLog;
/// use marrakech::table::GameTable;
///
/// let table = GameTable::seeded(7);
/// let mut log = EventLog::new();
/// let game = table
///     .create_seeded(GameConfig::default(), &[UserId(1), UserId(2)], &mut log)
///     .unwrap();
///
/// let report = table.roll_and_move(game, Direction::Left, &mut log).unwrap();
/// assert!((1..=4).contains(&report.dice()));
/// ```
#[derive(Debug)]
pub struct GameTable<D: DiceRoller = GameRng> {
    board: Arc<Board>,
    games: RwLock<FxHashMap<GameId, Slot<D>>>,
    next_id: AtomicU64,
    master_rng: Mutex<GameRng>,
}

impl GameTable<GameRng> {
    /// A table whose games get dice forked from one seeded stream.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self::with_board(Arc::new(Board::classic()), seed)
    }

    /// Create a game with its own fork of the table's dice.
    pub fn create_seeded(
        &self,
        config: GameConfig,
        users: &[UserId],
        sink: &mut impl EventSink,
    ) -> EngineResult<GameId> {
        let dice = lock(&self.master_rng).fork();
        self.create_game(config, users, dice, sink)
    }

    /// Host a game again from its snapshot, under its original id.
    ///
    /// The dice pick up where the checkpoint left them. A snapshot without
    /// one gets a fresh fork of the table's dice.
    #[instrument(skip(self, snapshot, config), fields(game = %snapshot.game_id))]
    pub fn resume_game(&self, snapshot: &GameSnapshot, config: GameConfig) -> EngineResult<GameId> {
        let id = snapshot.game_id;
        let state = GameState::restore(snapshot, config, Arc::clone(&self.board))?;
        let dice = match &snapshot.dice {
            Some(checkpoint) => GameRng::from_state(checkpoint),
            None => lock(&self.master_rng).fork(),
        };

        let mut games = self.games.write().unwrap_or_else(PoisonError::into_inner);
        if games.contains_key(&id) {
            warn!(game = %id, "resume of a hosted game");
            return Err(StateError::AlreadyHosted(id).into());
        }
        games.insert(
            id,
            Arc::new(Mutex::new(TableGame {
                state,
                engine: RuleEngine::new(dice),
            })),
        );
        self.next_id.fetch_max(id.raw().saturating_add(1), Ordering::Relaxed);
        info!(game = %id, "game resumed");
        Ok(id)
    }
}

impl<D: DiceRoller> GameTable<D> {
    /// An empty table on the standard board.
    #[must_use]
    pub fn new() -> Self {
        Self::with_board(Arc::new(Board::classic()), 0)
    }

    /// An empty table sharing `board` between its games.
    #[must_use]
    pub fn with_board(board: Arc<Board>, seed: u64) -> Self {
        Self {
            board,
            games: RwLock::new(FxHashMap::default()),
            next_id: AtomicU64::new(1),
            master_rng: Mutex::new(GameRng::new(seed)),
        }
    }

    /// Number of hosted games.
    #[must_use]
    pub fn len(&self) -> usize {
        self.games.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Ids of all hosted games, ascending.
    #[must_use]
    pub fn game_ids(&self) -> Vec<GameId> {
        let mut ids: Vec<_> = self
            .games
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .copied()
            .collect();
        ids.sort();
        ids
    }

    /// Seat `users` in order, start the game, and host it.
    ///
    /// Nothing is hosted if seating or starting fails.
    #[instrument(skip(self, config, dice, sink))]
    pub fn create_game(
        &self,
        config: GameConfig,
        users: &[UserId],
        dice: D,
        sink: &mut impl EventSink,
    ) -> EngineResult<GameId> {
        let id = GameId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let mut state = GameState::with_board(id, config, Arc::clone(&self.board))?;
        for &user in users {
            state.seat_player(user, None)?;
        }
        state.start(sink)?;

        let slot = Arc::new(Mutex::new(TableGame {
            state,
            engine: RuleEngine::new(dice),
        }));
        self.games
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, slot);
        info!(game = %id, "game hosted");
        Ok(id)
    }

    /// Stop hosting a game. Returns its final snapshot.
    #[instrument(skip(self))]
    pub fn remove_game(&self, id: GameId) -> EngineResult<GameSnapshot> {
        let slot = self
            .games
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&id)
            .ok_or(EngineError::EntityNotFound(Entity::Game(id)))?;
        let snapshot = lock(&slot).snapshot();
        info!(game = %id, "game removed");
        Ok(snapshot)
    }

    /// Roll for the current player and move Assam.
    pub fn roll_and_move(
        &self,
        id: GameId,
        direction: Direction,
        sink: &mut impl EventSink,
    ) -> EngineResult<MoveReport> {
        self.with_game_mut(id, |game| {
            let outcome = game.engine.complete_move(&mut game.state, direction, sink)?;
            Ok(MoveReport {
                outcome,
                snapshot: game.snapshot(),
            })
        })
    }

    pub fn place_carpet(
        &self,
        id: GameId,
        carpet: CarpetId,
        first: Cell,
        second: Cell,
        sink: &mut impl EventSink,
    ) -> EngineResult<[CarpetPlacement; 2]> {
        self.with_game_mut(id, |game| {
            game.engine
                .place_carpet(&mut game.state, carpet, first, second, sink)
        })
    }

    pub fn place_carpet_after_move(
        &self,
        id: GameId,
        carpet: CarpetId,
        first: Cell,
        second: Cell,
        sink: &mut impl EventSink,
    ) -> EngineResult<[CarpetPlacement; 2]> {
        self.with_game_mut(id, |game| {
            game.engine
                .place_carpet_after_move(&mut game.state, carpet, first, second, sink)
        })
    }

    pub fn switch_turn(&self, id: GameId, sink: &mut impl EventSink) -> EngineResult<SwitchReport> {
        self.with_game_mut(id, |game| {
            let change = game.engine.switch_turn(&mut game.state, sink)?;
            Ok(SwitchReport {
                change,
                snapshot: game.snapshot(),
            })
        })
    }

    /// Run any `Action` against a hosted game.
    pub fn apply(&self, id: GameId, action: Action, sink: &mut impl EventSink) -> EngineResult<ActionOutcome> {
        self.with_game_mut(id, |game| game.engine.apply(&mut game.state, action, sink))
    }

    pub fn legal_actions(&self, id: GameId) -> EngineResult<Vec<Action>> {
        self.with_game(id, rules::legal_actions)
    }

    /// The game's snapshot, with a dice checkpoint when the dice allow it.
    pub fn snapshot(&self, id: GameId) -> EngineResult<GameSnapshot> {
        let slot = self.slot(id)?;
        let game = lock(&slot);
        Ok(game.snapshot())
    }

    /// Read a hosted game under its lock.
    pub fn with_game<R>(&self, id: GameId, read: impl FnOnce(&GameState) -> R) -> EngineResult<R> {
        let slot = self.slot(id)?;
        let game = lock(&slot);
        Ok(read(&game.state))
    }

    fn with_game_mut<R>(
        &self,
        id: GameId,
        op: impl FnOnce(&mut TableGame<D>) -> EngineResult<R>,
    ) -> EngineResult<R> {
        let slot = self.slot(id)?;
        let mut game = lock(&slot);
        op(&mut game)
    }

    fn slot(&self, id: GameId) -> EngineResult<Slot<D>> {
        let games = self.games.read().unwrap_or_else(PoisonError::into_inner);
        match games.get(&id) {
            Some(slot) => Ok(Arc::clone(slot)),
            None => {
                warn!(game = %id, "unknown game");
                Err(EngineError::EntityNotFound(Entity::Game(id)))
            }
        }
    }
}

impl<D: DiceRoller> Default for GameTable<D> {
    fn default() -> Self {
        Self::new()
    }
}

/// Lock a mutex, recovering the data if a previous holder panicked.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
