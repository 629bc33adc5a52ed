// The engine's entry points: simulate a split, record a result, and build
// the dashboard series, all against a `Repository`.

use std::collections::HashMap;

use chrono::Utc;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::dashboard::{dashboard_series, DashboardData};
use crate::error::{EngineError, Result};
use crate::explain::{explain, Explanation};
use crate::fairness::{assess, FairnessBreakdown, FairnessWeights};
use crate::model::{Game, Lineup, Player, PlayerId, TeamSplit};
use crate::rating::{update_ratings, RatingChange, RatingParams};
use crate::repository::{NewGame, Repository};
use crate::signals::SignalStore;
use crate::teams::{generate_teams, TeamOptions};

/// Tunable parameters for every engine component. Defaults reproduce the
/// stock constants.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub fairness: FairnessWeights,
    pub rating: RatingParams,
    pub teams: TeamOptions,
}

/// Outcome of a pre-match simulation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Simulation {
    pub split: TeamSplit,
    pub fairness: FairnessBreakdown,
    pub explanation: Explanation,
}

/// A persisted match and the rating movement it caused.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordedGame {
    pub game: Game,
    pub changes: Vec<RatingChange>,
}

pub struct Matchmaker<R> {
    repo: R,
    config: EngineConfig,
}

impl<R: Repository> Matchmaker<R> {
    pub fn new(repo: R, config: EngineConfig) -> Self {
        Self { repo, config }
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Draw two teams from `selected_ids`, then score and explain the split.
    pub fn simulate<G: Rng + ?Sized>(
        &self,
        selected_ids: &[PlayerId],
        rng: &mut G,
    ) -> Result<Simulation> {
        self.simulate_with(selected_ids, self.config.teams, rng)
    }

    /// Like [`Matchmaker::simulate`] with explicit team options.
    pub fn simulate_with<G: Rng + ?Sized>(
        &self,
        selected_ids: &[PlayerId],
        options: TeamOptions,
        rng: &mut G,
    ) -> Result<Simulation> {
        let players = self.resolve_players(selected_ids)?;
        let previous = if options.avoid_repeat {
            self.repo.last_game()?.and_then(|g| g.lineup)
        } else {
            None
        };

        let split = generate_teams(players, previous.as_ref(), options, rng)?;
        let signals = self.signals()?;
        let fairness = assess(&split.team1, &split.team2, &signals, &self.config.fairness);
        let explanation = explain(&split.team1, &split.team2, &signals);

        Ok(Simulation {
            split,
            fairness,
            explanation,
        })
    }

    /// Score a hand-picked split without generating one.
    pub fn assess_split(
        &self,
        team1_ids: &[PlayerId],
        team2_ids: &[PlayerId],
    ) -> Result<FairnessBreakdown> {
        let team1 = self.resolve_players(team1_ids)?;
        let team2 = self.resolve_players(team2_ids)?;
        if team1.is_empty() || team2.is_empty() {
            return Err(EngineError::EmptyTeam);
        }
        let signals = self.signals()?;
        Ok(assess(&team1, &team2, &signals, &self.config.fairness))
    }

    /// Apply a final score to both teams and persist the new ratings together
    /// with the game and its lineup in one commit.
    pub fn record_result(
        &self,
        team1_ids: &[PlayerId],
        team2_ids: &[PlayerId],
        score1: u32,
        score2: u32,
    ) -> Result<RecordedGame> {
        let mut team1 = self.resolve_players(team1_ids)?;
        let mut team2 = self.resolve_players(team2_ids)?;

        let changes = update_ratings(&mut team1, &mut team2, score1, score2, &self.config.rating)?;

        let new_game = NewGame {
            played_at: Utc::now(),
            lineup: Lineup {
                team1: team1.iter().map(|p| p.id).collect(),
                team2: team2.iter().map(|p| p.id).collect(),
                score1,
                score2,
            },
        };
        let updated: Vec<Player> = team1.into_iter().chain(team2).collect();
        let game = self.repo.commit_result(&updated, &new_game)?;

        info!(
            game = game.id,
            score1,
            score2,
            players = updated.len(),
            "recorded match result"
        );
        Ok(RecordedGame { game, changes })
    }

    /// Fairness and chemistry per recorded game, oldest first.
    pub fn dashboard_data(&self) -> Result<DashboardData> {
        let games = self.repo.games_ordered()?;
        let roster: HashMap<PlayerId, Player> = self
            .repo
            .list_players()?
            .into_iter()
            .map(|p| (p.id, p))
            .collect();
        let signals = self.signals()?;
        Ok(dashboard_series(
            &games,
            &roster,
            &signals,
            &self.config.fairness,
        ))
    }

    /// The roster ordered by rating, best first.
    pub fn standings(&self) -> Result<Vec<Player>> {
        let mut players = self.repo.list_players()?;
        players.sort_by(|a, b| {
            b.rating
                .partial_cmp(&a.rating)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.id.cmp(&b.id))
        });
        Ok(players)
    }

    fn signals(&self) -> Result<SignalStore> {
        let chemistry = self.repo.chemistry_records()?;
        let preferences = self.repo.preference_records()?;
        Ok(SignalStore::from_records(&chemistry, &preferences))
    }

    /// Resolve ids to players in selection order, collapsing duplicates.
    /// Any id missing from the roster is an error.
    fn resolve_players(&self, ids: &[PlayerId]) -> Result<Vec<Player>> {
        let mut unique: Vec<PlayerId> = Vec::with_capacity(ids.len());
        for &id in ids {
            if !unique.contains(&id) {
                unique.push(id);
            }
        }

        let mut found: HashMap<PlayerId, Player> = self
            .repo
            .players_by_ids(&unique)?
            .into_iter()
            .map(|p| (p.id, p))
            .collect();

        unique
            .into_iter()
            .map(|id| found.remove(&id).ok_or(EngineError::UnknownPlayer(id)))
            .collect()
    }
}
