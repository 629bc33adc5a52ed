// Pairwise signal store: chemistry (symmetric) and preference (directional)
// lookups between two players. Missing pairs read as neutral.

use std::collections::HashMap;

use crate::model::{Chemistry, Player, PlayerId, Preference};

/// Read-only lookup of chemistry and preference values.
#[derive(Debug, Clone, Default)]
pub struct SignalStore {
    /// Keyed by the ordered pair `(min, max)`.
    chemistry: HashMap<(PlayerId, PlayerId), f64>,
    preference: HashMap<(PlayerId, PlayerId), f64>,
}

impl SignalStore {
    /// Build a store from raw records. When several records cover the same
    /// pair, the first one wins.
    pub fn from_records(chemistry: &[Chemistry], preferences: &[Preference]) -> Self {
        let mut store = SignalStore::default();
        for c in chemistry {
            store
                .chemistry
                .entry(unordered(c.player_a, c.player_b))
                .or_insert(c.value);
        }
        for p in preferences {
            store
                .preference
                .entry((p.player_a, p.player_b))
                .or_insert(p.weight);
        }
        store
    }

    /// Chemistry between `a` and `b`, in either order. 0.0 when unknown.
    pub fn chemistry(&self, a: PlayerId, b: PlayerId) -> f64 {
        self.chemistry
            .get(&unordered(a, b))
            .copied()
            .unwrap_or(0.0)
    }

    /// Preference of `a` toward `b` only. 0.0 when unknown.
    pub fn preference(&self, a: PlayerId, b: PlayerId) -> f64 {
        self.preference.get(&(a, b)).copied().unwrap_or(0.0)
    }

    /// Summed chemistry over every unordered pair within a team.
    pub fn team_chemistry(&self, team: &[Player]) -> f64 {
        let mut total = 0.0;
        for (i, a) in team.iter().enumerate() {
            for b in &team[i + 1..] {
                total += self.chemistry(a.id, b.id);
            }
        }
        total
    }

    /// Summed preference of every team-1 player toward every team-2 player.
    pub fn cross_preference(&self, team1: &[Player], team2: &[Player]) -> f64 {
        team1
            .iter()
            .flat_map(|a| team2.iter().map(move |b| (a.id, b.id)))
            .map(|(a, b)| self.preference(a, b))
            .sum()
    }
}

fn unordered(a: PlayerId, b: PlayerId) -> (PlayerId, PlayerId) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}
