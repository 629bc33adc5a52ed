// Time series over recorded games: fairness and total chemistry per game.

use std::collections::HashMap;

use serde::Serialize;
use tracing::warn;

use crate::fairness::{fairness, FairnessWeights};
use crate::model::{Game, Player, PlayerId};
use crate::signals::SignalStore;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DashboardData {
    pub fairness_over_time: Vec<f64>,
    pub chemistry_over_time: Vec<f64>,
}

/// Walk `games` in ascending id order and score every game whose lineup can
/// be resolved against `roster`. Games without a lineup, or naming a player
/// who has since left the roster, are skipped.
///
/// Fairness uses the players' current ratings, not the ratings they had when
/// the game was played.
pub fn dashboard_series(
    games: &[Game],
    roster: &HashMap<PlayerId, Player>,
    signals: &SignalStore,
    weights: &FairnessWeights,
) -> DashboardData {
    let mut ordered: Vec<&Game> = games.iter().collect();
    ordered.sort_by_key(|g| g.id);

    let mut data = DashboardData::default();
    for game in ordered {
        let Some(lineup) = &game.lineup else {
            continue;
        };
        let (Some(team1), Some(team2)) = (resolve(&lineup.team1, roster), resolve(&lineup.team2, roster))
        else {
            warn!(game = game.id, "skipping game with players no longer on the roster");
            continue;
        };
        if team1.is_empty() || team2.is_empty() {
            continue;
        }

        data.fairness_over_time
            .push(fairness(&team1, &team2, signals, weights));
        data.chemistry_over_time
            .push(signals.team_chemistry(&team1) + signals.team_chemistry(&team2));
    }
    data
}

fn resolve(ids: &[PlayerId], roster: &HashMap<PlayerId, Player>) -> Option<Vec<Player>> {
    ids.iter().map(|id| roster.get(id).cloned()).collect()
}
