use std::path::PathBuf;

use clap::{Parser, Subcommand};
use kickabout_core::PlayerId;

#[derive(Parser, Debug)]
#[command(author, version, about = "Balanced teams and skill ratings for pickup football")]
pub struct Cli {
    /// Directory holding config/kickabout.toml
    #[arg(long, default_value = ".")]
    pub base_dir: PathBuf,

    /// Database path, overriding the config file
    #[arg(long)]
    pub db: Option<String>,

    /// Command
    #[command(subcommand)]
    pub command: Command,
}

/// A final score written as `HOME-AWAY`, e.g. `3-2`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Score {
    pub team1: u32,
    pub team2: u32,
}

pub fn parse_score(s: &str) -> Result<Score, String> {
    let (a, b) = s
        .split_once('-')
        .ok_or_else(|| format!("expected a score like 3-2, got '{s}'"))?;
    let team1 = a
        .trim()
        .parse()
        .map_err(|_| format!("invalid team 1 score '{a}'"))?;
    let team2 = b
        .trim()
        .parse()
        .map_err(|_| format!("invalid team 2 score '{b}'"))?;
    Ok(Score { team1, team2 })
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// List the roster, best rated first
    Players,
    /// Add a player with the default rating
    AddPlayer { name: String },
    /// Set chemistry between two players (order does not matter)
    Chemistry {
        player_a: PlayerId,
        player_b: PlayerId,
        #[arg(allow_negative_numbers = true)]
        value: f64,
    },
    /// Set how PLAYER_A feels about facing PLAYER_B
    Preference {
        player_a: PlayerId,
        player_b: PlayerId,
        #[arg(allow_negative_numbers = true)]
        weight: f64,
    },
    /// Draw two teams from the selected players and score the split
    Simulate {
        /// Comma-separated player ids
        #[arg(short, long, value_delimiter = ',', required = true)]
        players: Vec<PlayerId>,
        /// Avoid handing out the previous game's split
        #[arg(long)]
        avoid_repeat: bool,
        /// Seed for a reproducible draw
        #[arg(long)]
        seed: Option<u64>,
        #[arg(long)]
        json: bool,
    },
    /// Record a final score and update ratings
    Record {
        #[arg(long, value_delimiter = ',', required = true)]
        team1: Vec<PlayerId>,
        #[arg(long, value_delimiter = ',', required = true)]
        team2: Vec<PlayerId>,
        /// Final score as TEAM1-TEAM2, e.g. 3-2
        #[arg(long, value_parser = parse_score)]
        score: Score,
    },
    /// Fairness and chemistry over recorded games
    Dashboard {
        #[arg(long)]
        json: bool,
    },
    /// Import players from a CSV with columns name[,rating,uncertainty]
    ImportRoster { path: PathBuf },
    /// Import signals from a CSV with columns kind,player_a,player_b,value
    ImportSignals { path: PathBuf },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn score_parses_with_whitespace() {
        assert_eq!(parse_score("3-2"), Ok(Score { team1: 3, team2: 2 }));
        assert_eq!(parse_score(" 0 - 4 "), Ok(Score { team1: 0, team2: 4 }));
    }

    #[test]
    fn score_rejects_garbage() {
        assert!(parse_score("3").is_err());
        assert!(parse_score("a-1").is_err());
        assert!(parse_score("-1-2").is_err());
    }

    #[test]
    fn simulate_accepts_comma_separated_ids() {
        let cli = Cli::try_parse_from(["kickabout", "simulate", "--players", "1,2,3", "--seed", "7"])
            .unwrap();
        assert_eq!(
            cli.command,
            Command::Simulate {
                players: vec![1, 2, 3],
                avoid_repeat: false,
                seed: Some(7),
                json: false,
            }
        );
    }

    #[test]
    fn record_parses_teams_and_score() {
        let cli = Cli::try_parse_from([
            "kickabout", "record", "--team1", "1,2", "--team2", "3,4", "--score", "2-1",
        ])
        .unwrap();
        assert_eq!(
            cli.command,
            Command::Record {
                team1: vec![1, 2],
                team2: vec![3, 4],
                score: Score { team1: 2, team2: 1 },
            }
        );
    }

    #[test]
    fn negative_chemistry_is_accepted() {
        let cli = Cli::try_parse_from(["kickabout", "chemistry", "1", "2", "-3.5"]).unwrap();
        assert_eq!(
            cli.command,
            Command::Chemistry {
                player_a: 1,
                player_b: 2,
                value: -3.5,
            }
        );
    }
}
