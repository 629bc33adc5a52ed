// SQLite persistence for the roster, pairwise signals, and recorded games.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use kickabout_core::{
    Chemistry, Game, Lineup, NewGame, Player, PlayerId, Preference, Repository,
};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension};

use crate::config::PlayerDefaults;

/// Side markers stored in `game_players.side`.
const SIDE_TEAM1: i64 = 1;
const SIDE_TEAM2: i64 = 2;

/// A roster entry waiting to be inserted.
#[derive(Debug, Clone, PartialEq)]
pub struct NewPlayer {
    pub name: String,
    pub rating: Option<f64>,
    pub uncertainty: Option<f64>,
}

/// SQLite-backed store implementing [`Repository`].
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Open (or create) a SQLite database at `path` and ensure all tables
    /// exist. Pass `":memory:"` for an ephemeral in-memory database.
    pub fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("failed to open database at {path}"))?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA busy_timeout = 5000;
             PRAGMA foreign_keys = ON;",
        )
        .context("failed to set database pragmas")?;

        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS players (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                name        TEXT NOT NULL,
                rating      REAL NOT NULL,
                uncertainty REAL NOT NULL
            );

            CREATE TABLE IF NOT EXISTS games (
                id        INTEGER PRIMARY KEY AUTOINCREMENT,
                played_at TEXT NOT NULL,
                score1    INTEGER,
                score2    INTEGER
            );

            CREATE TABLE IF NOT EXISTS game_players (
                game_id   INTEGER NOT NULL REFERENCES games(id),
                player_id INTEGER NOT NULL REFERENCES players(id),
                side      INTEGER NOT NULL CHECK (side IN (1, 2)),
                slot      INTEGER NOT NULL,
                PRIMARY KEY (game_id, player_id)
            );

            CREATE TABLE IF NOT EXISTS chemistry (
                id       INTEGER PRIMARY KEY AUTOINCREMENT,
                player_a INTEGER NOT NULL REFERENCES players(id),
                player_b INTEGER NOT NULL REFERENCES players(id),
                value    REAL NOT NULL,
                UNIQUE(player_a, player_b)
            );

            CREATE TABLE IF NOT EXISTS preferences (
                id       INTEGER PRIMARY KEY AUTOINCREMENT,
                player_a INTEGER NOT NULL REFERENCES players(id),
                player_b INTEGER NOT NULL REFERENCES players(id),
                weight   REAL NOT NULL,
                UNIQUE(player_a, player_b)
            );
            ",
        )
        .context("failed to create database schema")?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Acquire the database connection.
    ///
    /// Panics if the mutex is poisoned (another thread panicked while
    /// holding the lock). This should never happen in normal operation.
    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().expect("database mutex poisoned")
    }

    // ------------------------------------------------------------------
    // Roster administration
    // ------------------------------------------------------------------

    /// Add a player with the configured starting rating and uncertainty.
    pub fn add_player(&self, name: &str, defaults: PlayerDefaults) -> Result<Player> {
        let name = name.trim();
        if name.is_empty() {
            bail!("player name must not be empty");
        }
        let conn = self.conn();
        conn.query_row(
            "INSERT INTO players (name, rating, uncertainty) VALUES (?1, ?2, ?3)
             RETURNING id, name, rating, uncertainty",
            params![name, defaults.rating, defaults.uncertainty],
            parse_player_row,
        )
        .context("failed to insert player")
    }

    /// Set chemistry between two players. The pair is unordered, so
    /// `(a, b)` and `(b, a)` address the same row.
    pub fn set_chemistry(&self, a: PlayerId, b: PlayerId, value: f64) -> Result<()> {
        if a == b {
            bail!("chemistry needs two different players, got {a} twice");
        }
        let (lo, hi) = if a < b { (a, b) } else { (b, a) };
        let conn = self.conn();
        conn.execute(
            "INSERT INTO chemistry (player_a, player_b, value) VALUES (?1, ?2, ?3)
             ON CONFLICT(player_a, player_b) DO UPDATE SET value = excluded.value",
            params![lo, hi, value],
        )
        .context("failed to set chemistry")?;
        Ok(())
    }

    /// Set the preference of `a` toward `b`. Directional.
    pub fn set_preference(&self, a: PlayerId, b: PlayerId, weight: f64) -> Result<()> {
        if a == b {
            bail!("preference needs two different players, got {a} twice");
        }
        let conn = self.conn();
        conn.execute(
            "INSERT INTO preferences (player_a, player_b, weight) VALUES (?1, ?2, ?3)
             ON CONFLICT(player_a, player_b) DO UPDATE SET weight = excluded.weight",
            params![a, b, weight],
        )
        .context("failed to set preference")?;
        Ok(())
    }

    /// Insert a batch of players in a single transaction. Missing ratings
    /// and uncertainties take the configured defaults.
    pub fn import_players(&self, players: &[NewPlayer], defaults: PlayerDefaults) -> Result<Vec<Player>> {
        let mut conn = self.conn();
        let tx = conn.transaction().context("failed to begin import transaction")?;

        let mut inserted = Vec::with_capacity(players.len());
        for p in players {
            let player = tx
                .query_row(
                    "INSERT INTO players (name, rating, uncertainty) VALUES (?1, ?2, ?3)
                     RETURNING id, name, rating, uncertainty",
                    params![
                        p.name,
                        p.rating.unwrap_or(defaults.rating),
                        p.uncertainty.unwrap_or(defaults.uncertainty),
                    ],
                    parse_player_row,
                )
                .with_context(|| format!("failed to import player {}", p.name))?;
            inserted.push(player);
        }

        tx.commit().context("failed to commit player import")?;
        Ok(inserted)
    }

    /// Upsert chemistry and preference records in a single transaction.
    pub fn import_signals(&self, chemistry: &[Chemistry], preferences: &[Preference]) -> Result<()> {
        let mut conn = self.conn();
        let tx = conn.transaction().context("failed to begin signal import")?;

        for c in chemistry {
            let (lo, hi) = if c.player_a < c.player_b {
                (c.player_a, c.player_b)
            } else {
                (c.player_b, c.player_a)
            };
            tx.execute(
                "INSERT INTO chemistry (player_a, player_b, value) VALUES (?1, ?2, ?3)
                 ON CONFLICT(player_a, player_b) DO UPDATE SET value = excluded.value",
                params![lo, hi, c.value],
            )
            .with_context(|| format!("failed to import chemistry {lo}-{hi}"))?;
        }
        for p in preferences {
            tx.execute(
                "INSERT INTO preferences (player_a, player_b, weight) VALUES (?1, ?2, ?3)
                 ON CONFLICT(player_a, player_b) DO UPDATE SET weight = excluded.weight",
                params![p.player_a, p.player_b, p.weight],
            )
            .with_context(|| format!("failed to import preference {}->{}", p.player_a, p.player_b))?;
        }

        tx.commit().context("failed to commit signal import")?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Games
    // ------------------------------------------------------------------

    /// Attach lineups to raw game rows. Games with no `game_players` rows
    /// keep `lineup = None`.
    fn attach_lineups(
        conn: &Connection,
        rows: Vec<(i64, DateTime<Utc>, Option<u32>, Option<u32>)>,
    ) -> Result<Vec<Game>> {
        let mut sides: HashMap<i64, (Vec<PlayerId>, Vec<PlayerId>)> = HashMap::new();
        let mut stmt = conn
            .prepare("SELECT game_id, player_id, side FROM game_players ORDER BY game_id, side, slot")
            .context("failed to prepare lineup query")?;
        let members = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, PlayerId>(1)?,
                    row.get::<_, i64>(2)?,
                ))
            })
            .context("failed to query lineups")?
            .collect::<std::result::Result<Vec<_>, _>>()
            .context("failed to map lineup rows")?;

        for (game_id, player_id, side) in members {
            let entry = sides.entry(game_id).or_default();
            if side == SIDE_TEAM1 {
                entry.0.push(player_id);
            } else {
                entry.1.push(player_id);
            }
        }

        Ok(rows
            .into_iter()
            .map(|(id, played_at, score1, score2)| Game {
                id,
                played_at,
                lineup: sides.remove(&id).map(|(team1, team2)| Lineup {
                    team1,
                    team2,
                    score1: score1.unwrap_or(0),
                    score2: score2.unwrap_or(0),
                }),
            })
            .collect())
    }
}

fn parse_player_row(row: &rusqlite::Row) -> rusqlite::Result<Player> {
    Ok(Player {
        id: row.get(0)?,
        name: row.get(1)?,
        rating: row.get(2)?,
        uncertainty: row.get(3)?,
    })
}

impl Repository for Database {
    fn player(&self, id: PlayerId) -> Result<Option<Player>> {
        let conn = self.conn();
        conn.query_row(
            "SELECT id, name, rating, uncertainty FROM players WHERE id = ?1",
            params![id],
            parse_player_row,
        )
        .optional()
        .context("failed to load player")
    }

    fn players_by_ids(&self, ids: &[PlayerId]) -> Result<Vec<Player>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let placeholders = vec!["?"; ids.len()].join(", ");
        let sql = format!(
            "SELECT id, name, rating, uncertainty FROM players WHERE id IN ({placeholders})"
        );

        let conn = self.conn();
        let mut stmt = conn
            .prepare(&sql)
            .context("failed to prepare players_by_ids query")?;
        let players = stmt
            .query_map(params_from_iter(ids.iter()), parse_player_row)
            .context("failed to query players by id")?
            .collect::<std::result::Result<Vec<_>, _>>()
            .context("failed to map player rows")?;
        Ok(players)
    }

    fn list_players(&self) -> Result<Vec<Player>> {
        let conn = self.conn();
        let mut stmt = conn
            .prepare("SELECT id, name, rating, uncertainty FROM players ORDER BY id")
            .context("failed to prepare list_players query")?;
        let players = stmt
            .query_map([], parse_player_row)
            .context("failed to query players")?
            .collect::<std::result::Result<Vec<_>, _>>()
            .context("failed to map player rows")?;
        Ok(players)
    }

    fn chemistry_records(&self) -> Result<Vec<Chemistry>> {
        let conn = self.conn();
        let mut stmt = conn
            .prepare("SELECT player_a, player_b, value FROM chemistry ORDER BY id")
            .context("failed to prepare chemistry query")?;
        let records = stmt
            .query_map([], |row| {
                Ok(Chemistry {
                    player_a: row.get(0)?,
                    player_b: row.get(1)?,
                    value: row.get(2)?,
                })
            })
            .context("failed to query chemistry")?
            .collect::<std::result::Result<Vec<_>, _>>()
            .context("failed to map chemistry rows")?;
        Ok(records)
    }

    fn preference_records(&self) -> Result<Vec<Preference>> {
        let conn = self.conn();
        let mut stmt = conn
            .prepare("SELECT player_a, player_b, weight FROM preferences ORDER BY id")
            .context("failed to prepare preference query")?;
        let records = stmt
            .query_map([], |row| {
                Ok(Preference {
                    player_a: row.get(0)?,
                    player_b: row.get(1)?,
                    weight: row.get(2)?,
                })
            })
            .context("failed to query preferences")?
            .collect::<std::result::Result<Vec<_>, _>>()
            .context("failed to map preference rows")?;
        Ok(records)
    }

    fn games_ordered(&self) -> Result<Vec<Game>> {
        let conn = self.conn();
        let rows = {
            let mut stmt = conn
                .prepare("SELECT id, played_at, score1, score2 FROM games ORDER BY id")
                .context("failed to prepare games query")?;
            let rows: Vec<(i64, DateTime<Utc>, Option<u32>, Option<u32>)> = stmt
                .query_map([], |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)))
                .context("failed to query games")?
                .collect::<std::result::Result<Vec<_>, _>>()
                .context("failed to map game rows")?;
            rows
        };
        Self::attach_lineups(&conn, rows)
    }

    /// Only the newest game and its own lineup rows are read.
    fn last_game(&self) -> Result<Option<Game>> {
        let conn = self.conn();
        let row: Option<(i64, DateTime<Utc>, Option<u32>, Option<u32>)> = conn
            .query_row(
                "SELECT id, played_at, score1, score2 FROM games ORDER BY id DESC LIMIT 1",
                [],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
            )
            .optional()
            .context("failed to load last game")?;
        let Some((id, played_at, score1, score2)) = row else {
            return Ok(None);
        };

        let mut stmt = conn
            .prepare("SELECT player_id, side FROM game_players WHERE game_id = ?1 ORDER BY side, slot")
            .context("failed to prepare lineup query")?;
        let members = stmt
            .query_map(params![id], |row| {
                Ok((row.get::<_, PlayerId>(0)?, row.get::<_, i64>(1)?))
            })
            .context("failed to query lineup")?
            .collect::<std::result::Result<Vec<_>, _>>()
            .context("failed to map lineup rows")?;

        let lineup = if members.is_empty() {
            None
        } else {
            let (team1, team2): (Vec<_>, Vec<_>) =
                members.into_iter().partition(|(_, side)| *side == SIDE_TEAM1);
            Some(Lineup {
                team1: team1.into_iter().map(|(id, _)| id).collect(),
                team2: team2.into_iter().map(|(id, _)| id).collect(),
                score1: score1.unwrap_or(0),
                score2: score2.unwrap_or(0),
            })
        };

        Ok(Some(Game {
            id,
            played_at,
            lineup,
        }))
    }

    /// Record updated ratings, the game, and its lineup in one transaction.
    /// Any player id that matches no row aborts the whole commit.
    fn commit_result(&self, players: &[Player], game: &NewGame) -> Result<Game> {
        let mut conn = self.conn();
        let tx = conn.transaction().context("failed to begin result transaction")?;

        for p in players {
            let changed = tx
                .execute(
                    "UPDATE players SET rating = ?1, uncertainty = ?2 WHERE id = ?3",
                    params![p.rating, p.uncertainty, p.id],
                )
                .context("failed to update player rating")?;
            if changed != 1 {
                bail!("player {} does not exist", p.id);
            }
        }

        let lineup = &game.lineup;
        let game_id: i64 = tx
            .query_row(
                "INSERT INTO games (played_at, score1, score2) VALUES (?1, ?2, ?3) RETURNING id",
                params![game.played_at, lineup.score1, lineup.score2],
                |row| row.get(0),
            )
            .context("failed to insert game")?;

        let members = lineup
            .team1
            .iter()
            .map(|id| (SIDE_TEAM1, id))
            .enumerate()
            .chain(lineup.team2.iter().map(|id| (SIDE_TEAM2, id)).enumerate());
        for (slot, (side, player_id)) in members {
            tx.execute(
                "INSERT INTO game_players (game_id, player_id, side, slot) VALUES (?1, ?2, ?3, ?4)",
                params![game_id, player_id, side, slot as i64],
            )
            .context("failed to insert lineup entry")?;
        }

        tx.commit().context("failed to commit match result")?;

        Ok(Game {
            id: game_id,
            played_at: game.played_at,
            lineup: Some(lineup.clone()),
        })
    }
}
