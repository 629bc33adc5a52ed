// Command handlers: each command runs against the database-backed engine and
// returns the text to print.

use std::fmt::Write as _;

use anyhow::{Context, Result};
use kickabout_core::teams::TeamOptions;
use kickabout_core::{Matchmaker, Player, Repository};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::info;

use crate::cli::Command;
use crate::config::{Config, PlayerDefaults};
use crate::db::Database;
use crate::import;

pub struct App {
    matchmaker: Matchmaker<Database>,
    new_player: PlayerDefaults,
}

impl App {
    pub fn new(db: Database, config: &Config) -> Self {
        Self {
            matchmaker: Matchmaker::new(db, config.engine),
            new_player: config.new_player,
        }
    }

    pub fn db(&self) -> &Database {
        self.matchmaker.repository()
    }

    /// Execute one command and render its output.
    pub fn run(&self, command: &Command) -> Result<String> {
        match command {
            Command::Players => self.players(),
            Command::AddPlayer { name } => {
                let player = self.db().add_player(name, self.new_player)?;
                info!(id = player.id, "added player {}", player.name);
                Ok(format!("Added {} (id {})", player.name, player.id))
            }
            Command::Chemistry {
                player_a,
                player_b,
                value,
            } => {
                self.db().set_chemistry(*player_a, *player_b, *value)?;
                Ok(format!("Chemistry {player_a} <-> {player_b} set to {value}"))
            }
            Command::Preference {
                player_a,
                player_b,
                weight,
            } => {
                self.db().set_preference(*player_a, *player_b, *weight)?;
                Ok(format!("Preference {player_a} -> {player_b} set to {weight}"))
            }
            Command::Simulate {
                players,
                avoid_repeat,
                seed,
                json,
            } => self.simulate(players, *avoid_repeat, *seed, *json),
            Command::Record {
                team1,
                team2,
                score,
            } => self.record(team1, team2, score.team1, score.team2),
            Command::Dashboard { json } => self.dashboard(*json),
            Command::ImportRoster { path } => {
                let rows = import::load_roster(path)?;
                let inserted = self.db().import_players(&rows, self.new_player)?;
                info!(count = inserted.len(), "imported roster from {}", path.display());
                Ok(format!("Imported {} players", inserted.len()))
            }
            Command::ImportSignals { path } => {
                let signals = import::load_signals(path)?;
                self.db()
                    .import_signals(&signals.chemistry, &signals.preferences)?;
                Ok(format!(
                    "Imported {} chemistry and {} preference records",
                    signals.chemistry.len(),
                    signals.preferences.len()
                ))
            }
        }
    }

    fn players(&self) -> Result<String> {
        let standings = self.matchmaker.standings()?;
        if standings.is_empty() {
            return Ok("No players yet.".to_string());
        }
        let mut out = format!("{:>4}  {:<24} {:>8} {:>11}\n", "ID", "Name", "Rating", "Uncertainty");
        for p in &standings {
            writeln!(out, "{:>4}  {:<24} {:>8.1} {:>11.1}", p.id, p.name, p.rating, p.uncertainty)?;
        }
        Ok(out.trim_end().to_string())
    }

    fn simulate(
        &self,
        players: &[i64],
        avoid_repeat: bool,
        seed: Option<u64>,
        json: bool,
    ) -> Result<String> {
        let mut rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let options = TeamOptions {
            avoid_repeat: avoid_repeat || self.matchmaker.config().teams.avoid_repeat,
            ..self.matchmaker.config().teams
        };
        let sim = self.matchmaker.simulate_with(players, options, &mut rng)?;

        if json {
            return serde_json::to_string_pretty(&sim).context("failed to serialize simulation");
        }

        let mut out = String::new();
        write_team(&mut out, "Team 1", &sim.split.team1)?;
        write_team(&mut out, "Team 2", &sim.split.team2)?;
        writeln!(out, "Fairness: {:.1}/100", sim.fairness.score)?;
        write!(out, "{}", sim.explanation)?;
        Ok(out)
    }

    fn record(&self, team1: &[i64], team2: &[i64], score1: u32, score2: u32) -> Result<String> {
        let recorded = self.matchmaker.record_result(team1, team2, score1, score2)?;

        let mut out = format!("Recorded game {} ({score1}-{score2})\n", recorded.game.id);
        for change in &recorded.changes {
            let name = self
                .db()
                .player(change.player_id)?
                .map(|p| p.name)
                .unwrap_or_default();
            writeln!(
                out,
                "  {:<24} {:>8.1} -> {:>8.1} ({:+.1})",
                name,
                change.rating_before,
                change.rating_after,
                change.delta()
            )?;
        }
        Ok(out.trim_end().to_string())
    }

    fn dashboard(&self, json: bool) -> Result<String> {
        let data = self.matchmaker.dashboard_data()?;
        if json {
            return serde_json::to_string_pretty(&data).context("failed to serialize dashboard");
        }
        if data.fairness_over_time.is_empty() {
            return Ok("No games with recorded lineups yet.".to_string());
        }
        let mut out = format!("{:>4} {:>9} {:>10}\n", "#", "Fairness", "Chemistry");
        for (i, (f, c)) in data
            .fairness_over_time
            .iter()
            .zip(&data.chemistry_over_time)
            .enumerate()
        {
            writeln!(out, "{:>4} {:>9.1} {:>10.1}", i + 1, f, c)?;
        }
        Ok(out.trim_end().to_string())
    }
}

fn write_team(out: &mut String, label: &str, team: &[Player]) -> std::fmt::Result {
    let names: Vec<&str> = team.iter().map(|p| p.name.as_str()).collect();
    writeln!(out, "{label}: {}", names.join(", "))
}
