// Fairness scoring for a proposed two-team split.
//
// The score starts at 100 and loses points for the rating gap between the
// sides, the gap in within-team chemistry, and the cross-team preference
// pressure from team 1 toward team 2. It is clamped to [0, 100] and rounded
// to one decimal.

use serde::{Deserialize, Serialize};

use crate::model::{total_rating, Player};
use crate::signals::SignalStore;

/// Highest possible fairness score.
pub const MAX_FAIRNESS: f64 = 100.0;

/// Penalty weights for each fairness component.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FairnessWeights {
    /// Rating points per fairness point lost.
    pub rating_divisor: f64,
    /// Chemistry units per fairness point lost.
    pub chemistry_divisor: f64,
    /// Fairness points lost per unit of cross-team preference.
    pub preference_multiplier: f64,
}

impl Default for FairnessWeights {
    fn default() -> Self {
        Self {
            rating_divisor: 50.0,
            chemistry_divisor: 10.0,
            preference_multiplier: 10.0,
        }
    }
}

/// The fairness score together with the components it was built from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FairnessBreakdown {
    pub rating_diff: f64,
    pub chemistry_gap: f64,
    pub preference_pressure: f64,
    pub score: f64,
}

/// Score a split, returning every component.
pub fn assess(
    team1: &[Player],
    team2: &[Player],
    signals: &SignalStore,
    weights: &FairnessWeights,
) -> FairnessBreakdown {
    let rating_diff = (total_rating(team1) - total_rating(team2)).abs();
    let chemistry_gap = (signals.team_chemistry(team1) - signals.team_chemistry(team2)).abs();
    let preference_pressure = signals.cross_preference(team1, team2);

    let raw = MAX_FAIRNESS
        - rating_diff / weights.rating_divisor
        - chemistry_gap / weights.chemistry_divisor
        - preference_pressure * weights.preference_multiplier;

    FairnessBreakdown {
        rating_diff,
        chemistry_gap,
        preference_pressure,
        score: round1(raw.clamp(0.0, MAX_FAIRNESS)),
    }
}

/// Fairness score in [0, 100]. Not symmetric in its arguments: the
/// preference term only looks from team 1 toward team 2.
pub fn fairness(
    team1: &[Player],
    team2: &[Player],
    signals: &SignalStore,
    weights: &FairnessWeights,
) -> f64 {
    assess(team1, team2, signals, weights).score
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
