// Team generation: shuffle the selected players and split at the midpoint.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{EngineError, Result};
use crate::model::{Lineup, Player, TeamSplit};

/// Options controlling how teams are drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TeamOptions {
    /// Try not to hand out the same split as the previous game.
    pub avoid_repeat: bool,
    /// Extra shuffles allowed when avoiding a repeat.
    pub max_rerolls: u32,
}

impl Default for TeamOptions {
    fn default() -> Self {
        Self {
            avoid_repeat: false,
            max_rerolls: 8,
        }
    }
}

/// Randomly partition `players` into two teams.
///
/// Team 1 gets `len / 2` players and team 2 the rest, so odd counts give
/// team 2 the extra player. With `avoid_repeat` set and a `previous` lineup
/// available, the players are reshuffled up to `max_rerolls` times while the
/// split matches the previous one. This is best-effort: when every reroll
/// repeats (two players, for instance) the last shuffle is returned.
pub fn generate_teams<R: Rng + ?Sized>(
    mut players: Vec<Player>,
    previous: Option<&Lineup>,
    options: TeamOptions,
    rng: &mut R,
) -> Result<TeamSplit> {
    if players.len() < 2 {
        return Err(EngineError::TooFewPlayers {
            found: players.len(),
        });
    }

    let mid = players.len() / 2;
    players.shuffle(rng);

    if let (true, Some(previous)) = (options.avoid_repeat, previous) {
        let mut rerolls = 0;
        while rerolls < options.max_rerolls && repeats(previous, &players, mid) {
            players.shuffle(rng);
            rerolls += 1;
        }
        if repeats(previous, &players, mid) {
            debug!(rerolls, "could not avoid repeating the previous split");
        } else if rerolls > 0 {
            debug!(rerolls, "rerolled to avoid repeating the previous split");
        }
    }

    let team2 = players.split_off(mid);
    Ok(TeamSplit {
        team1: players,
        team2,
    })
}

fn repeats(previous: &Lineup, players: &[Player], mid: usize) -> bool {
    let team1: Vec<_> = players[..mid].iter().map(|p| p.id).collect();
    let team2: Vec<_> = players[mid..].iter().map(|p| p.id).collect();
    previous.same_split(&team1, &team2)
}
