// In-memory repository for tests and embedding.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use anyhow::bail;

use crate::model::{Chemistry, Game, Player, PlayerId, Preference};
use crate::repository::{NewGame, Repository};

#[derive(Debug, Default)]
struct Tables {
    players: BTreeMap<PlayerId, Player>,
    chemistry: Vec<Chemistry>,
    preferences: Vec<Preference>,
    games: Vec<Game>,
}

/// A `Repository` backed by plain collections behind a mutex.
#[derive(Debug, Default)]
pub struct MemoryRepository {
    tables: Mutex<Tables>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a repository pre-loaded with a roster.
    pub fn with_players(players: impl IntoIterator<Item = Player>) -> Self {
        let repo = Self::new();
        for p in players {
            repo.insert_player(p);
        }
        repo
    }

    fn tables(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().expect("memory repository mutex poisoned")
    }

    /// Insert or replace a player.
    pub fn insert_player(&self, player: Player) {
        self.tables().players.insert(player.id, player);
    }

    pub fn add_chemistry(&self, player_a: PlayerId, player_b: PlayerId, value: f64) {
        self.tables().chemistry.push(Chemistry {
            player_a,
            player_b,
            value,
        });
    }

    pub fn add_preference(&self, player_a: PlayerId, player_b: PlayerId, weight: f64) {
        self.tables().preferences.push(Preference {
            player_a,
            player_b,
            weight,
        });
    }

    /// Append a game as-is, e.g. a legacy game without a lineup.
    pub fn push_game(&self, game: Game) {
        self.tables().games.push(game);
    }
}

impl Repository for MemoryRepository {
    fn player(&self, id: PlayerId) -> anyhow::Result<Option<Player>> {
        Ok(self.tables().players.get(&id).cloned())
    }

    fn players_by_ids(&self, ids: &[PlayerId]) -> anyhow::Result<Vec<Player>> {
        let tables = self.tables();
        Ok(tables
            .players
            .values()
            .filter(|p| ids.contains(&p.id))
            .cloned()
            .collect())
    }

    fn list_players(&self) -> anyhow::Result<Vec<Player>> {
        Ok(self.tables().players.values().cloned().collect())
    }

    fn chemistry_records(&self) -> anyhow::Result<Vec<Chemistry>> {
        Ok(self.tables().chemistry.clone())
    }

    fn preference_records(&self) -> anyhow::Result<Vec<Preference>> {
        Ok(self.tables().preferences.clone())
    }

    fn games_ordered(&self) -> anyhow::Result<Vec<Game>> {
        let mut games = self.tables().games.clone();
        games.sort_by_key(|g| g.id);
        Ok(games)
    }

    fn commit_result(&self, players: &[Player], game: &NewGame) -> anyhow::Result<Game> {
        let mut tables = self.tables();

        // Check everything before touching anything.
        for p in players {
            if !tables.players.contains_key(&p.id) {
                bail!("cannot update missing player {}", p.id);
            }
        }

        for p in players {
            tables.players.insert(p.id, p.clone());
        }
        let id = tables.games.iter().map(|g| g.id).max().unwrap_or(0) + 1;
        let stored = Game {
            id,
            played_at: game.played_at,
            lineup: Some(game.lineup.clone()),
        };
        tables.games.push(stored.clone());
        Ok(stored)
    }
}
