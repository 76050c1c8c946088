//! End-of-game detection and final scoring.
//!
//! A game ends when one active player is left, or when every active player
//! has laid the configured number of carpets. Final score is coins plus the
//! number of cells showing the player's colour. Ranking is competition
//! style: equal `(score, coins)` share a place and the next distinct entry
//! takes its position index (1, 1, 3).

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::core::{Color, GameState, GameStatus, Player, PlayerId, UserId};

/// Why the game ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    /// Everybody else was eliminated.
    SingleSurvivor,
    /// Every active player reached the carpet quota.
    QuotaReached,
}

/// One line of the final standings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerScore {
    pub user: UserId,
    pub seat: PlayerId,
    pub color: Color,
    pub active: bool,
    pub coins: u32,
    pub visible_cells: u32,
    /// `coins + visible_cells`.
    pub total: u32,
    /// 1-based, shared on ties.
    pub place: u32,
}

/// Everything decided when a game ends.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameOutcome {
    pub winner: Option<UserId>,
    pub reason: FinishReason,
    /// Best first.
    pub scores: Vec<PlayerScore>,
}

/// Decides whether and how a game ends.
#[derive(Clone, Copy, Debug, Default)]
pub struct CompletionEvaluator;

impl CompletionEvaluator {
    /// The reason the game should end now, if any. Does not mutate.
    #[must_use]
    pub fn check(state: &GameState) -> Option<FinishReason> {
        if state.active_count() == 1 {
            return Some(FinishReason::SingleSurvivor);
        }
        let quota = state.config().carpet_quota;
        if state.active_players().all(|p| p.carpets_placed >= quota) {
            return Some(FinishReason::QuotaReached);
        }
        None
    }

    /// End the game if it is over. Returns the outcome when it ends now.
    pub fn evaluate(state: &mut GameState) -> Option<GameOutcome> {
        if state.status() != GameStatus::InProgress {
            return None;
        }
        let reason = Self::check(state)?;
        Some(Self::finish(state, reason))
    }

    /// Freeze the game and compute the standings.
    pub fn finish(state: &mut GameState, reason: FinishReason) -> GameOutcome {
        state.status = GameStatus::Finished;
        let outcome = GameOutcome {
            winner: Self::winner(state, reason),
            reason,
            scores: Self::scores(state),
        };
        info!(
            game = %state.id(),
            ?reason,
            winner = ?outcome.winner,
            "game finished"
        );
        outcome
    }

    /// The survivor, or the richest active player (earliest seat on a tie).
    #[must_use]
    pub fn winner(state: &GameState, reason: FinishReason) -> Option<UserId> {
        match reason {
            FinishReason::SingleSurvivor => state.active_players().next().map(|p| p.user),
            FinishReason::QuotaReached => state
                .active_players()
                .fold(None, |best: Option<&Player>, p| match best {
                    Some(b) if b.coins >= p.coins => Some(b),
                    _ => Some(p),
                })
                .map(|p| p.user),
        }
    }

    /// Ranked scores for every seated player, eliminated ones included.
    #[must_use]
    pub fn scores(state: &GameState) -> Vec<PlayerScore> {
        let area = state.visible_area();
        let mut scores: Vec<PlayerScore> = state
            .players()
            .values()
            .map(|p| {
                let visible_cells = area.get(&p.color).copied().unwrap_or(0);
                PlayerScore {
                    user: p.user,
                    seat: p.seat,
                    color: p.color,
                    active: p.active,
                    coins: p.coins,
                    visible_cells,
                    total: p.coins + visible_cells,
                    place: 0,
                }
            })
            .collect();

        scores.sort_by(|a, b| b.total.cmp(&a.total).then(b.coins.cmp(&a.coins)));
        rank(&mut scores);
        scores
    }
}

/// Assign competition places to scores already sorted best first.
fn rank(scores: &mut [PlayerScore]) {
    let mut previous: Option<(u32, u32)> = None;
    let mut place = 0;
    for (i, score) in scores.iter_mut().enumerate() {
        let key = (score.total, score.coins);
        if previous != Some(key) {
            place = i as u32 + 1;
            previous = Some(key);
        }
        score.place = place;
    }
}
