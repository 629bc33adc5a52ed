// Plain data records exchanged between the engine and its repository.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type PlayerId = i64;

/// Starting rating for a freshly added player.
pub const DEFAULT_RATING: f64 = 1000.0;

/// Starting uncertainty for a freshly added player.
pub const DEFAULT_UNCERTAINTY: f64 = 100.0;

/// Uncertainty never decays below this value.
pub const UNCERTAINTY_FLOOR: f64 = 10.0;

/// A rostered player with their current skill estimate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub rating: f64,
    /// Confidence measure; larger values amplify rating swings.
    pub uncertainty: f64,
}

impl Player {
    /// Create a player with the default rating and uncertainty.
    pub fn new(id: PlayerId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            rating: DEFAULT_RATING,
            uncertainty: DEFAULT_UNCERTAINTY,
        }
    }

    pub fn with_rating(mut self, rating: f64, uncertainty: f64) -> Self {
        self.rating = rating;
        self.uncertainty = uncertainty;
        self
    }
}

/// Symmetric affinity between two players.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Chemistry {
    pub player_a: PlayerId,
    pub player_b: PlayerId,
    pub value: f64,
}

/// Directional weight of `player_a` toward facing `player_b`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Preference {
    pub player_a: PlayerId,
    pub player_b: PlayerId,
    pub weight: f64,
}

/// Which players lined up on which side of a recorded match, and the score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lineup {
    pub team1: Vec<PlayerId>,
    pub team2: Vec<PlayerId>,
    pub score1: u32,
    pub score2: u32,
}

impl Lineup {
    /// Whether two sides form the same partition as this lineup, regardless
    /// of which side is called team 1.
    pub fn same_split(&self, team1: &[PlayerId], team2: &[PlayerId]) -> bool {
        let ours = (as_set(&self.team1), as_set(&self.team2));
        let theirs = (as_set(team1), as_set(team2));
        ours == theirs || (ours.0 == theirs.1 && ours.1 == theirs.0)
    }
}

fn as_set(ids: &[PlayerId]) -> HashSet<PlayerId> {
    ids.iter().copied().collect()
}

/// A recorded match. Games written before lineups were persisted carry no
/// lineup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Game {
    pub id: i64,
    pub played_at: DateTime<Utc>,
    pub lineup: Option<Lineup>,
}

/// Two sides proposed by the team generator.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamSplit {
    pub team1: Vec<Player>,
    pub team2: Vec<Player>,
}

impl TeamSplit {
    pub fn team1_ids(&self) -> Vec<PlayerId> {
        self.team1.iter().map(|p| p.id).collect()
    }

    pub fn team2_ids(&self) -> Vec<PlayerId> {
        self.team2.iter().map(|p| p.id).collect()
    }
}

/// Sum of ratings across a team.
pub fn total_rating(team: &[Player]) -> f64 {
    team.iter().map(|p| p.rating).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_player_uses_defaults() {
        let p = Player::new(7, "Ada");
        assert_eq!(p.rating, DEFAULT_RATING);
        assert_eq!(p.uncertainty, DEFAULT_UNCERTAINTY);
    }

    #[test]
    fn same_split_ignores_order_and_side() {
        let lineup = Lineup {
            team1: vec![1, 2],
            team2: vec![3, 4],
            score1: 3,
            score2: 1,
        };
        assert!(lineup.same_split(&[2, 1], &[4, 3]));
        assert!(lineup.same_split(&[3, 4], &[1, 2]));
        assert!(!lineup.same_split(&[1, 3], &[2, 4]));
    }

    #[test]
    fn same_split_false_for_different_players() {
        let lineup = Lineup {
            team1: vec![1, 2],
            team2: vec![3, 4],
            score1: 0,
            score2: 1,
        };
        assert!(!lineup.same_split(&[1, 2], &[3, 5]));
    }
}
