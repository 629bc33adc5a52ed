// Post-match rating update.
//
// Team 1's expected share of the goals is its share of the combined rating;
// its actual share is its share of the goals scored. Every participant moves
// by k * (actual - expected) from their own side's perspective, where k grows
// with the player's uncertainty. Uncertainty then decays toward a floor.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{EngineError, Result};
use crate::model::{total_rating, Player, PlayerId, UNCERTAINTY_FLOOR};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RatingParams {
    /// K-factor for a player with zero uncertainty.
    pub base_k: f64,
    /// Uncertainty at which k doubles.
    pub uncertainty_scale: f64,
    /// Multiplier applied to uncertainty after each game.
    pub uncertainty_decay: f64,
    pub uncertainty_floor: f64,
}

impl Default for RatingParams {
    fn default() -> Self {
        Self {
            base_k: 32.0,
            uncertainty_scale: 100.0,
            uncertainty_decay: 0.95,
            uncertainty_floor: UNCERTAINTY_FLOOR,
        }
    }
}

impl RatingParams {
    pub fn k_factor(&self, uncertainty: f64) -> f64 {
        self.base_k * (1.0 + uncertainty / self.uncertainty_scale)
    }

    /// Uncertainty after one more game. The configured floor can raise the
    /// minimum but never lower it below [`UNCERTAINTY_FLOOR`].
    pub fn decayed(&self, uncertainty: f64) -> f64 {
        (uncertainty * self.uncertainty_decay)
            .max(self.uncertainty_floor)
            .max(UNCERTAINTY_FLOOR)
    }
}

/// Before/after snapshot for one participant.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RatingChange {
    pub player_id: PlayerId,
    pub rating_before: f64,
    pub rating_after: f64,
    pub uncertainty_before: f64,
    pub uncertainty_after: f64,
}

impl RatingChange {
    pub fn delta(&self) -> f64 {
        self.rating_after - self.rating_before
    }
}

/// Reject inputs the update rule cannot handle: empty sides, a player on
/// both sides, or a 0-0 score.
pub fn validate_result(
    team1: &[Player],
    team2: &[Player],
    score1: u32,
    score2: u32,
) -> Result<()> {
    if team1.is_empty() || team2.is_empty() {
        return Err(EngineError::EmptyTeam);
    }
    if let Some(p) = team1.iter().find(|p| team2.iter().any(|q| q.id == p.id)) {
        return Err(EngineError::DuplicatePlayer(p.id));
    }
    if u64::from(score1) + u64::from(score2) == 0 {
        return Err(EngineError::ZeroTotalScore);
    }
    Ok(())
}

/// Apply a match result to both teams in place and report every change.
///
/// All rating deltas use each player's pre-match uncertainty; uncertainty is
/// decayed afterwards. On error neither team is modified.
pub fn update_ratings(
    team1: &mut [Player],
    team2: &mut [Player],
    score1: u32,
    score2: u32,
    params: &RatingParams,
) -> Result<Vec<RatingChange>> {
    validate_result(team1, team2, score1, score2)?;

    let combined = total_rating(team1) + total_rating(team2);
    if combined <= 0.0 {
        return Err(EngineError::NonPositiveRatingTotal { total: combined });
    }

    let expected1 = total_rating(team1) / combined;
    let actual1 = f64::from(score1) / (f64::from(score1) + f64::from(score2));

    let mut changes = Vec::with_capacity(team1.len() + team2.len());
    let sides = [
        (team1, actual1 - expected1),
        (team2, (1.0 - actual1) - (1.0 - expected1)),
    ];
    for (team, surprise) in sides {
        for p in team.iter_mut() {
            let k = params.k_factor(p.uncertainty);
            let change = RatingChange {
                player_id: p.id,
                rating_before: p.rating,
                rating_after: p.rating + k * surprise,
                uncertainty_before: p.uncertainty,
                uncertainty_after: params.decayed(p.uncertainty),
            };
            debug!(
                player = p.id,
                k,
                delta = change.delta(),
                "rating updated"
            );
            p.rating = change.rating_after;
            p.uncertainty = change.uncertainty_after;
            changes.push(change);
        }
    }

    Ok(changes)
}
