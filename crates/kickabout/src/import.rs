// CSV import for rosters and pairwise signals.
//
// Roster files carry `name` and optionally `rating` and `uncertainty`.
// Signal files carry `kind,player_a,player_b,value` where `kind` is
// `chemistry` or `preference`. Malformed rows are skipped with a warning.

use std::io::Read;
use std::path::Path;

use kickabout_core::{Chemistry, Preference};
use serde::Deserialize;
use tracing::warn;

use crate::db::NewPlayer;

#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("failed to read file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("CSV error in {path}: {source}")]
    Csv { path: String, source: csv::Error },

    #[error("validation error: {0}")]
    Validation(String),
}

/// Chemistry and preference rows parsed from one signal file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SignalImport {
    pub chemistry: Vec<Chemistry>,
    pub preferences: Vec<Preference>,
}

// ---------------------------------------------------------------------------
// Raw CSV rows
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct RawPlayer {
    name: String,
    #[serde(default)]
    rating: Option<f64>,
    #[serde(default)]
    uncertainty: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct RawSignal {
    kind: String,
    player_a: i64,
    player_b: i64,
    value: f64,
}

// ---------------------------------------------------------------------------
// Reader-based loaders
// ---------------------------------------------------------------------------

fn players_from_reader<R: Read>(rdr: R) -> Result<Vec<NewPlayer>, csv::Error> {
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(rdr);
    let mut players = Vec::new();
    for result in reader.deserialize::<RawPlayer>() {
        match result {
            Ok(raw) => {
                let name = raw.name.trim();
                if name.is_empty() {
                    warn!("skipping roster row with empty name");
                    continue;
                }
                if raw.rating.is_some_and(|r| !r.is_finite())
                    || raw.uncertainty.is_some_and(|u| !u.is_finite() || u < 0.0)
                {
                    warn!("skipping player '{}': invalid rating or uncertainty", name);
                    continue;
                }
                players.push(NewPlayer {
                    name: name.to_string(),
                    rating: raw.rating,
                    uncertainty: raw.uncertainty,
                });
            }
            Err(e) => {
                warn!("skipping malformed roster row: {}", e);
            }
        }
    }
    Ok(players)
}

fn signals_from_reader<R: Read>(rdr: R) -> Result<SignalImport, csv::Error> {
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(rdr);
    let mut signals = SignalImport::default();
    for result in reader.deserialize::<RawSignal>() {
        match result {
            Ok(raw) => {
                if !raw.value.is_finite() {
                    warn!(
                        "skipping {} {}-{}: non-finite value",
                        raw.kind, raw.player_a, raw.player_b
                    );
                    continue;
                }
                if raw.player_a == raw.player_b {
                    warn!("skipping {} for player {} with themselves", raw.kind, raw.player_a);
                    continue;
                }
                match raw.kind.to_ascii_lowercase().as_str() {
                    "chemistry" => signals.chemistry.push(Chemistry {
                        player_a: raw.player_a,
                        player_b: raw.player_b,
                        value: raw.value,
                    }),
                    "preference" => signals.preferences.push(Preference {
                        player_a: raw.player_a,
                        player_b: raw.player_b,
                        weight: raw.value,
                    }),
                    other => warn!("skipping signal row: unknown kind '{}'", other),
                }
            }
            Err(e) => {
                warn!("skipping malformed signal row: {}", e);
            }
        }
    }
    Ok(signals)
}

// ---------------------------------------------------------------------------
// Public path-based loaders
// ---------------------------------------------------------------------------

/// Load a roster CSV. Fails if no row survives.
pub fn load_roster(path: &Path) -> Result<Vec<NewPlayer>, ImportError> {
    let file = std::fs::File::open(path).map_err(|e| ImportError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    let players = players_from_reader(file).map_err(|e| ImportError::Csv {
        path: path.display().to_string(),
        source: e,
    })?;
    if players.is_empty() {
        return Err(ImportError::Validation(format!(
            "{} produced zero valid players",
            path.display()
        )));
    }
    Ok(players)
}

/// Load a chemistry/preference CSV.
pub fn load_signals(path: &Path) -> Result<SignalImport, ImportError> {
    let file = std::fs::File::open(path).map_err(|e| ImportError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    signals_from_reader(file).map_err(|e| ImportError::Csv {
        path: path.display().to_string(),
        source: e,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roster_optional_columns() {
        let csv = "name,rating,uncertainty\nAda,1200,60\nBo,,\n";
        let players = players_from_reader(csv.as_bytes()).unwrap();
        assert_eq!(players.len(), 2);
        assert_eq!(players[0].rating, Some(1200.0));
        assert_eq!(players[0].uncertainty, Some(60.0));
        assert_eq!(players[1].name, "Bo");
        assert_eq!(players[1].rating, None);
        assert_eq!(players[1].uncertainty, None);
    }

    #[test]
    fn roster_name_only_header() {
        let csv = "name\nAda\n  Bo  \n";
        let players = players_from_reader(csv.as_bytes()).unwrap();
        let names: Vec<_> = players.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Ada", "Bo"]);
    }

    #[test]
    fn roster_skips_bad_rows() {
        let csv = "name,rating,uncertainty\n,1000,100\nCy,abc,100\nDee,1000,-5\nEd,900,80\n";
        let players = players_from_reader(csv.as_bytes()).unwrap();
        assert_eq!(players.len(), 1);
        assert_eq!(players[0].name, "Ed");
    }

    #[test]
    fn signals_split_by_kind() {
        let csv = "kind,player_a,player_b,value\n\
                   chemistry,1,2,3.5\n\
                   Preference,2,1,0.25\n\
                   rivalry,1,3,1\n\
                   chemistry,4,4,2\n\
                   preference,1,x,1\n";
        let signals = signals_from_reader(csv.as_bytes()).unwrap();
        assert_eq!(
            signals.chemistry,
            vec![Chemistry {
                player_a: 1,
                player_b: 2,
                value: 3.5
            }]
        );
        assert_eq!(
            signals.preferences,
            vec![Preference {
                player_a: 2,
                player_b: 1,
                weight: 0.25
            }]
        );
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load_roster(Path::new("definitely/not/here.csv")).unwrap_err();
        assert!(matches!(err, ImportError::Io { .. }));
    }

    #[test]
    fn empty_roster_is_rejected() {
        let path = std::env::temp_dir()
            .join(format!("kickabout_import_empty_roster_{}.csv", std::process::id()));
        std::fs::write(&path, "name\n").unwrap();
        let err = load_roster(&path).unwrap_err();
        assert!(matches!(err, ImportError::Validation(_)));
    }
}
