// Human-readable rationale for a proposed split.

use std::fmt;

use serde::Serialize;

use crate::model::{total_rating, Player};
use crate::signals::SignalStore;

const RATIONALE: &str = "Teams balanced on ratings and chemistry.";

/// Per-team figures behind a split, rendered as a short sentence via
/// `Display`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Explanation {
    pub team1_chemistry: f64,
    pub team2_chemistry: f64,
    pub team1_rating: f64,
    pub team2_rating: f64,
}

pub fn explain(team1: &[Player], team2: &[Player], signals: &SignalStore) -> Explanation {
    Explanation {
        team1_chemistry: signals.team_chemistry(team1),
        team2_chemistry: signals.team_chemistry(team2),
        team1_rating: total_rating(team1),
        team2_rating: total_rating(team2),
    }
}

impl fmt::Display for Explanation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Team 1 chemistry: {}, Team 2 chemistry: {}. Team 1 rating: {:.0}, Team 2 rating: {:.0}. {}",
            self.team1_chemistry, self.team2_chemistry, self.team1_rating, self.team2_rating, RATIONALE
        )
    }
}
