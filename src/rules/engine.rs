//! Turn execution.
//!
//! The `RuleEngine` is the only writer of an in-progress `GameState`. Each
//! entry point validates everything it needs first and only then mutates, so
//! a rejected call leaves the state untouched and emits nothing.
//!
//! ## Turn shape
//!
//! ```text
//! AwaitingMove --complete_move--> AwaitingPlacement --place_*--> AwaitingSwitch
//!                     |                   |                             |
//!                     | (mover eliminated) +--------switch_turn---------+
//!                     v                                                 |
//!              AwaitingSwitch ----------switch_turn----------> AwaitingMove (next player)
//! ```
//!
//! `switch_turn` is where completion is checked.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use super::completion::{CompletionEvaluator, GameOutcome};
use crate::board::{Cell, Direction};
use crate::carpets::{policy, CarpetPlacement};
use crate::core::{Action, CarpetId, DiceRoller, GameRng, GameState, PlayerId, TurnPhase, UserId};
use crate::error::{EngineError, EngineResult, Entity, StateError};
use crate::events::{CellUpdate, EventSink, GameEvent};

/// Coins moved by a landing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    pub from: UserId,
    pub to: UserId,
    /// Size of the region Assam landed in.
    pub due: u32,
    /// What was actually paid: `due`, capped at the payer's balance.
    pub amount: u32,
}

/// Result of `complete_move`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveOutcome {
    pub dice: u8,
    pub from: Cell,
    pub to: Cell,
    /// Facing after the walk; reflections may have turned Assam.
    pub direction: Direction,
    pub payment: Option<Payment>,
    /// The mover ran out of coins.
    pub eliminated: bool,
}

/// Result of `switch_turn`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TurnChange {
    pub next: PlayerId,
    pub move_number: u32,
    /// Set when this switch ended the game.
    pub outcome: Option<GameOutcome>,
}

/// Result of `apply`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ActionOutcome {
    Moved(MoveOutcome),
    Placed([CarpetPlacement; 2]),
    Switched(TurnChange),
}

/// Executes turns against a `GameState`.
///
/// Dice come from `D`, so tests and replays can script them:
///
/// ```
/// use marrakech::board::{Cell, Direction};
/// use marrakech::core::{GameConfig, GameId, GameState, ScriptedDice, UserId};
/// use marrakech::events::NullSink;
/// use marrakech::rules::RuleEngine;
///
/// let mut state = GameState::new(GameId(1), GameConfig::default()).unwrap();
/// state.seat_player(UserId(1), None).unwrap();
/// state.seat_player(UserId(2), None).unwrap();
/// state.start(&mut NullSink).unwrap();
///
/// let mut engine = RuleEngine::new(ScriptedDice::new([2]));
/// let outcome = engine.complete_move(&mut state, Direction::Up, &mut NullSink).unwrap();
///
/// assert_eq!(outcome.dice, 2);
/// assert_eq!(outcome.to, Cell::new(3, 1));
/// assert_eq!(state.assam().cell, Cell::new(3, 1));
/// ```
#[derive(Clone, Debug)]
pub struct RuleEngine<D: DiceRoller = GameRng> {
    dice: D,
}

impl RuleEngine<GameRng> {
    /// Engine with seeded random dice.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self::new(GameRng::new(seed))
    }
}

impl<D: DiceRoller> RuleEngine<D> {
    #[must_use]
    pub fn new(dice: D) -> Self {
        Self { dice }
    }

    #[must_use]
    pub fn dice(&self) -> &D {
        &self.dice
    }

    pub fn dice_mut(&mut self) -> &mut D {
        &mut self.dice
    }

    /// Turn Assam, roll, walk, and settle the landing.
    #[instrument(level = "debug", skip(self, state, sink), fields(game = %state.id()))]
    pub fn complete_move(
        &mut self,
        state: &mut GameState,
        direction: Direction,
        sink: &mut impl EventSink,
    ) -> EngineResult<MoveOutcome> {
        let mover = Self::check_move(state, direction).inspect_err(|err| warn!(%err, "move rejected"))?;

        let dice = self.dice.roll(&state.config.dice_faces);
        let from = state.assam.cell;
        let (to, facing) = state.board.walk(from, direction, dice);
        debug!(dice, %from, %to, %facing, "assam walked");

        let mover_user = state.players[mover].user;
        let payment = state
            .carpets
            .top_carpet(to)
            .and_then(|carpet| state.carpet_owner(carpet))
            .filter(|owner| owner.seat != mover)
            .map(|owner| {
                let due = state.carpets.connected_region_size(to, owner.carpet.id) as u32;
                let payer_coins = state.players[mover].coins;
                (owner.seat, Payment {
                    from: mover_user,
                    to: owner.user,
                    due,
                    amount: due.min(payer_coins),
                })
            });

        // Validation is over; from here on the state changes.
        let mut events = vec![GameEvent::AssamMoved {
            dice,
            from,
            to,
            direction: facing,
        }];
        state.assam.cell = to;
        state.assam.direction = facing;

        let mut eliminated = false;
        if let Some((payee, payment)) = payment {
            debug!(due = payment.due, paid = payment.amount, payee = %payment.to, "payment");
            state.players[mover].coins -= payment.amount;
            state.players[payee].coins += payment.amount;
            if payment.amount > 0 {
                events.push(GameEvent::PaymentMade {
                    from: payment.from,
                    to: payment.to,
                    amount: payment.amount,
                });
            }
            if state.players[mover].coins == 0 {
                eliminated = true;
                Self::eliminate(state, mover, &mut events);
            }
        }

        state.phase = if eliminated {
            TurnPhase::AwaitingSwitch
        } else {
            TurnPhase::AwaitingPlacement
        };

        flush(sink, events);
        Ok(MoveOutcome {
            dice,
            from,
            to,
            direction: facing,
            payment: payment.map(|(_, p)| p),
            eliminated,
        })
    }

    fn check_move(state: &GameState, direction: Direction) -> EngineResult<PlayerId> {
        state.ensure_in_progress()?;
        state.ensure_phase(TurnPhase::AwaitingMove)?;
        let mover = current_seat(state)?;
        let current = state.assam.direction;
        if current.is_reverse_of(direction) {
            return Err(EngineError::InvalidDirection {
                current,
                requested: direction,
            });
        }
        Ok(mover)
    }

    /// Take a bankrupt player out and lift their carpet off the board.
    fn eliminate(state: &mut GameState, seat: PlayerId, events: &mut Vec<GameEvent>) {
        let player = &mut state.players[seat];
        player.active = false;
        let (user, color, carpet) = (player.user, player.color, player.carpet.id);

        let uncovered = state.carpets.remove_carpet(carpet);
        let cells = uncovered
            .into_iter()
            .map(|cell| CellUpdate {
                cell,
                color: state.color_at(cell),
            })
            .collect();

        info!(%user, %color, "player eliminated");
        events.push(GameEvent::PlayerEliminated { user, color });
        events.push(GameEvent::FieldChanged { cells });
    }

    /// Lay a carpet anywhere the placement rules allow.
    #[instrument(level = "debug", skip(self, state, sink), fields(game = %state.id()))]
    pub fn place_carpet(
        &mut self,
        state: &mut GameState,
        carpet: CarpetId,
        first: Cell,
        second: Cell,
        sink: &mut impl EventSink,
    ) -> EngineResult<[CarpetPlacement; 2]> {
        let owner = Self::check_placement(state, carpet, first, second, false)
            .inspect_err(|err| warn!(%err, "placement rejected"))?;
        Ok(Self::lay(state, owner, carpet, first, second, sink))
    }

    /// Lay a carpet whose first cell touches Assam.
    ///
    /// Assam's cell is read from the state.
    #[instrument(level = "debug", skip(self, state, sink), fields(game = %state.id()))]
    pub fn place_carpet_after_move(
        &mut self,
        state: &mut GameState,
        carpet: CarpetId,
        first: Cell,
        second: Cell,
        sink: &mut impl EventSink,
    ) -> EngineResult<[CarpetPlacement; 2]> {
        let owner = Self::check_placement(state, carpet, first, second, true)
            .inspect_err(|err| warn!(%err, "placement rejected"))?;
        Ok(Self::lay(state, owner, carpet, first, second, sink))
    }

    fn check_placement(
        state: &GameState,
        carpet: CarpetId,
        first: Cell,
        second: Cell,
        near_assam: bool,
    ) -> EngineResult<PlayerId> {
        state.ensure_in_progress()?;
        state.ensure_phase(TurnPhase::AwaitingPlacement)?;
        let current = current_seat(state)?;
        let owner = state
            .carpet_owner(carpet)
            .ok_or(EngineError::EntityNotFound(Entity::Carpet(carpet)))?
            .seat;
        if owner != current {
            return Err(StateError::NotYourTurn(owner).into());
        }

        let owner_of = |id| state.carpet_owner(id).map(|p| p.seat);
        if near_assam {
            policy::check_placement_after_move(&state.carpets, state.assam.cell, owner, owner_of, first, second)?;
        } else {
            policy::check_placement(&state.carpets, owner, owner_of, first, second)?;
        }
        Ok(owner)
    }

    fn lay(
        state: &mut GameState,
        owner: PlayerId,
        carpet: CarpetId,
        first: Cell,
        second: Cell,
        sink: &mut impl EventSink,
    ) -> [CarpetPlacement; 2] {
        let turn = state.move_number;
        let placed = state.carpets.place(carpet, first, second, turn);
        let player = &mut state.players[owner];
        player.carpets_placed += 1;
        state.phase = TurnPhase::AwaitingSwitch;

        info!(carpet = %carpet, %first, %second, turn, "carpet placed");
        sink.emit(GameEvent::CarpetPlaced {
            carpet,
            owner: player.user,
            color: player.color,
            cells: [first, second],
            turn,
        });
        placed
    }

    /// Hand the turn to the next active player and check for the end.
    #[instrument(level = "debug", skip(self, state, sink), fields(game = %state.id()))]
    pub fn switch_turn(&mut self, state: &mut GameState, sink: &mut impl EventSink) -> EngineResult<TurnChange> {
        let next = Self::check_switch(state).inspect_err(|err| warn!(%err, "switch rejected"))?;

        state.current = Some(next);
        state.move_number = state.move_number.saturating_add(1);
        state.phase = TurnPhase::AwaitingMove;

        let user = state.players[next].user;
        debug!(%user, move_number = state.move_number, "turn changed");
        let mut events = vec![GameEvent::TurnChanged {
            user,
            move_number: state.move_number,
        }];

        let outcome = CompletionEvaluator::evaluate(state);
        if let Some(outcome) = &outcome {
            events.push(GameEvent::GameFinished {
                winner: outcome.winner,
                reason: outcome.reason,
                scores: outcome.scores.clone(),
            });
        }

        flush(sink, events);
        Ok(TurnChange {
            next,
            move_number: state.move_number,
            outcome,
        })
    }

    fn check_switch(state: &GameState) -> EngineResult<PlayerId> {
        state.ensure_in_progress()?;
        if state.phase == TurnPhase::AwaitingMove {
            return Err(StateError::WrongPhase {
                expected: TurnPhase::AwaitingSwitch,
                actual: state.phase,
            }
            .into());
        }
        let current = current_seat(state)?;
        Ok(next_active(state, current).ok_or(StateError::NoPlayersSeated)?)
    }

    /// Run one `Action`.
    pub fn apply(
        &mut self,
        state: &mut GameState,
        action: Action,
        sink: &mut impl EventSink,
    ) -> EngineResult<ActionOutcome> {
        match action {
            Action::Move { direction } => self.complete_move(state, direction, sink).map(ActionOutcome::Moved),
            Action::PlaceCarpet {
                carpet,
                cells: [first, second],
            } => self
                .place_carpet(state, carpet, first, second, sink)
                .map(ActionOutcome::Placed),
            Action::PlaceCarpetAfterMove {
                carpet,
                cells: [first, second],
            } => self
                .place_carpet_after_move(state, carpet, first, second, sink)
                .map(ActionOutcome::Placed),
            Action::SwitchTurn => self.switch_turn(state, sink).map(ActionOutcome::Switched),
        }
    }

    /// Everything the current player may do right now.
    ///
    /// Placements are listed in their after-move form, since that is the
    /// variant a regular turn uses.
    #[must_use]
    pub fn legal_actions(&self, state: &GameState) -> Vec<Action> {
        legal_actions(state)
    }
}

/// Everything the current player may do right now.
#[must_use]
pub fn legal_actions(state: &GameState) -> Vec<Action> {
    if state.ensure_in_progress().is_err() {
        return Vec::new();
    }
    let Some(player) = state.current_player() else {
        return Vec::new();
    };

    match state.phase {
        TurnPhase::AwaitingMove => Direction::ALL
            .into_iter()
            .filter(|&d| !state.assam.direction.is_reverse_of(d))
            .map(|direction| Action::Move { direction })
            .collect(),
        TurnPhase::AwaitingPlacement => {
            let carpet = player.carpet.id;
            let assam = state.assam.cell;
            let owner_of = |id| state.carpet_owner(id).map(|p| p.seat);
            let mut actions: Vec<Action> = assam
                .neighbours()
                .into_iter()
                .flat_map(|first| first.neighbours().into_iter().map(move |second| [first, second]))
                .filter(|&[first, second]| {
                    policy::check_placement_after_move(&state.carpets, assam, player.seat, owner_of, first, second)
                        .is_ok()
                })
                .map(|cells| Action::PlaceCarpetAfterMove { carpet, cells })
                .collect();
            actions.push(Action::SwitchTurn);
            actions
        }
        TurnPhase::AwaitingSwitch => vec![Action::SwitchTurn],
    }
}

fn current_seat(state: &GameState) -> Result<PlayerId, StateError> {
    debug_assert!(
        !state.players.is_empty(),
        "turn operation on an in-progress game with no players"
    );
    state.current.ok_or(StateError::NoPlayersSeated)
}

/// The next active seat after `from`, wrapping around. May be `from` itself.
fn next_active(state: &GameState, from: PlayerId) -> Option<PlayerId> {
    let count = state.players.player_count();
    (1..=count)
        .map(|offset| PlayerId(((from.index() + offset) % count) as u8))
        .find(|&seat| state.players.get(seat).is_some_and(|p| p.active))
}

fn flush(sink: &mut impl EventSink, events: Vec<GameEvent>) {
    for event in events {
        sink.emit(event);
    }
}
