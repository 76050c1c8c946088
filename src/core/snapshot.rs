//! Persisted game shape.
//!
//! A `GameSnapshot` is plain data: everything needed to rebuild a
//! `GameState` except the rule constants and the board, which the host
//! supplies on restore. Snapshots encode to JSON through serde and to a
//! compact binary form through bincode.
//!
//! Restoring validates the snapshot before building anything, so a corrupt
//! or hand-edited snapshot is rejected instead of producing a state that
//! breaks engine invariants.

use std::sync::Arc;

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use super::config::GameConfig;
use super::entity::{CarpetId, GameId, UserId};
use super::player::{Color, Player, PlayerId, PlayerMap};
use super::rng::GameRngState;
use super::state::{Assam, GameState, GameStatus, TurnPhase};
use crate::board::{Board, Cell, Direction};
use crate::carpets::{CarpetLayer, CarpetPlacement};
use crate::error::SnapshotError;

/// Assam's position and facing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssamSnapshot {
    pub x: i8,
    pub y: i8,
    pub direction: Direction,
}

/// One seated player.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerSnapshot {
    pub user_id: UserId,
    pub color: Color,
    pub coins: u32,
    pub active: bool,
    /// 0-based seat, which is the turn order.
    pub turn_order: u8,
    pub carpets_placed: u32,
}

/// One cell of a laid carpet.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacementSnapshot {
    pub x: i8,
    pub y: i8,
    pub placement_turn: u32,
    /// Insertion order, which breaks stacking ties within a turn.
    pub sequence: u64,
}

/// A carpet and everywhere it lies.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CarpetSnapshot {
    pub carpet_id: CarpetId,
    pub owner_id: UserId,
    pub color: Color,
    pub placements: Vec<PlacementSnapshot>,
}

/// The persisted form of a game.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSnapshot {
    pub game_id: GameId,
    pub status: GameStatus,
    pub phase: TurnPhase,
    pub assam: AssamSnapshot,
    pub move_number: u32,
    /// Whose turn it is; absent before the game starts.
    pub current_user: Option<UserId>,
    /// In turn order.
    pub players: Vec<PlayerSnapshot>,
    pub carpets: Vec<CarpetSnapshot>,
    /// Position in the game's dice stream, when the host rolls seeded dice.
    #[serde(default)]
    pub dice: Option<GameRngState>,
}

impl GameSnapshot {
    /// Attach a dice checkpoint.
    #[must_use]
    pub fn with_dice(mut self, dice: Option<GameRngState>) -> Self {
        self.dice = dice;
        self
    }

    /// Compact binary encoding.
    pub fn to_bytes(&self) -> Result<Vec<u8>, SnapshotError> {
        Ok(bincode::serialize(self)?)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SnapshotError> {
        Ok(bincode::deserialize(bytes)?)
    }

    pub fn to_json(&self) -> Result<String, SnapshotError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Total number of placement records.
    #[must_use]
    pub fn placement_count(&self) -> usize {
        self.carpets.iter().map(|c| c.placements.len()).sum()
    }
}

impl GameState {
    /// Capture the persisted form of this game.
    #[must_use]
    pub fn snapshot(&self) -> GameSnapshot {
        let players = self
            .players
            .values()
            .map(|p| PlayerSnapshot {
                user_id: p.user,
                color: p.color,
                coins: p.coins,
                active: p.active,
                turn_order: p.seat.0,
                carpets_placed: p.carpets_placed,
            })
            .collect();

        let carpets = self
            .players
            .values()
            .map(|p| CarpetSnapshot {
                carpet_id: p.carpet.id,
                owner_id: p.user,
                color: p.carpet.color,
                placements: self
                    .carpets
                    .all_for_carpet(p.carpet.id)
                    .into_iter()
                    .map(|pl| PlacementSnapshot {
                        x: pl.cell.x,
                        y: pl.cell.y,
                        placement_turn: pl.turn,
                        sequence: pl.sequence,
                    })
                    .collect(),
            })
            .collect();

        GameSnapshot {
            game_id: self.id,
            status: self.status,
            phase: self.phase,
            assam: AssamSnapshot {
                x: self.assam.cell.x,
                y: self.assam.cell.y,
                direction: self.assam.direction,
            },
            move_number: self.move_number,
            current_user: self.current_player().map(|p| p.user),
            players,
            carpets,
            dice: None,
        }
    }

    /// Rebuild a game from its persisted form.
    pub fn restore(snapshot: &GameSnapshot, config: GameConfig, board: Arc<Board>) -> Result<Self, SnapshotError> {
        config.validate()?;
        let assam = Cell::new(snapshot.assam.x, snapshot.assam.y);
        if !board.is_inside(assam) {
            return Err(invalid(format!("Assam at {assam} is off the board")));
        }
        if snapshot.players.len() > config.max_players {
            return Err(invalid(format!(
                "{} players for {} seats",
                snapshot.players.len(),
                config.max_players
            )));
        }

        let mut ordered: Vec<&PlayerSnapshot> = snapshot.players.iter().collect();
        ordered.sort_by_key(|p| p.turn_order);
        let mut users = FxHashSet::default();
        let mut colors = FxHashSet::default();
        for (i, p) in ordered.iter().enumerate() {
            if p.turn_order as usize != i {
                return Err(invalid(format!("turn order has a gap at {i}")));
            }
            if !users.insert(p.user_id) {
                return Err(invalid(format!("{} is seated twice", p.user_id)));
            }
            if !colors.insert(p.color) {
                return Err(invalid(format!("colour {} is used twice", p.color)));
            }
        }

        let mut carpet_ids = FxHashSet::default();
        let mut seat_carpets: Vec<Option<&CarpetSnapshot>> = vec![None; ordered.len()];
        for carpet in &snapshot.carpets {
            if !carpet_ids.insert(carpet.carpet_id) {
                return Err(invalid(format!("{} appears twice", carpet.carpet_id)));
            }
            let seat = ordered
                .iter()
                .position(|p| p.user_id == carpet.owner_id)
                .ok_or_else(|| invalid(format!("{} is owned by unseated {}", carpet.carpet_id, carpet.owner_id)))?;
            if ordered[seat].color != carpet.color {
                return Err(invalid(format!("{} does not match its owner's colour", carpet.carpet_id)));
            }
            if seat_carpets[seat].replace(carpet).is_some() {
                return Err(invalid(format!("{} owns two carpets", carpet.owner_id)));
            }
            if let Some(p) = carpet.placements.iter().find(|p| !board.is_inside(Cell::new(p.x, p.y))) {
                return Err(invalid(format!(
                    "{} lies off the board at {}",
                    carpet.carpet_id,
                    Cell::new(p.x, p.y)
                )));
            }
        }

        let mut players = PlayerMap::new();
        let mut layer = CarpetLayer::new();
        let mut next_carpet = CarpetId::FIRST;
        for (p, carpet) in ordered.iter().zip(seat_carpets) {
            let carpet = carpet.ok_or_else(|| invalid(format!("{} has no carpet", p.user_id)))?;
            let seat = PlayerId(p.turn_order);
            let mut player = Player::new(p.user_id, seat, p.color, carpet.carpet_id, p.coins);
            player.active = p.active;
            player.carpets_placed = p.carpets_placed;
            players.push(player);

            for placement in &carpet.placements {
                layer.restore(CarpetPlacement {
                    carpet: carpet.carpet_id,
                    cell: Cell::new(placement.x, placement.y),
                    turn: placement.placement_turn,
                    sequence: placement.sequence,
                });
            }
            next_carpet = next_carpet.max(carpet.carpet_id.next());
        }

        let current = match snapshot.current_user {
            Some(user) => {
                let seat = ordered
                    .iter()
                    .position(|p| p.user_id == user)
                    .ok_or_else(|| invalid(format!("current {user} is not seated")))?;
                Some(PlayerId(seat as u8))
            }
            None => None,
        };
        if snapshot.status == GameStatus::InProgress {
            let player = current
                .and_then(|seat| players.get(seat))
                .ok_or_else(|| invalid("in-progress game needs a current player".to_string()))?;
            // An eliminated mover keeps the turn until it is switched away.
            if !player.active && snapshot.phase != TurnPhase::AwaitingSwitch {
                return Err(invalid(format!(
                    "eliminated {} cannot hold the turn while {}",
                    player.user, snapshot.phase
                )));
            }
        }

        Ok(Self {
            id: snapshot.game_id,
            board,
            config,
            status: snapshot.status,
            phase: snapshot.phase,
            assam: Assam {
                cell: assam,
                direction: snapshot.assam.direction,
            },
            move_number: snapshot.move_number,
            players,
            current,
            carpets: layer,
            next_carpet,
        })
    }
}

fn invalid(message: String) -> SnapshotError {
    SnapshotError::Invalid(message)
}
