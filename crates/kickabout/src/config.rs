// Configuration loading and validation (config/kickabout.toml).

use std::path::{Path, PathBuf};

use kickabout_core::fairness::FairnessWeights;
use kickabout_core::model::{DEFAULT_RATING, DEFAULT_UNCERTAINTY, UNCERTAINTY_FLOOR};
use kickabout_core::rating::RatingParams;
use kickabout_core::teams::TeamOptions;
use kickabout_core::EngineConfig;
use serde::Deserialize;
use thiserror::Error;

/// Shipped defaults, written to `config/kickabout.toml` when it is missing.
pub const DEFAULT_CONFIG: &str = include_str!("../defaults/kickabout.toml");

const CONFIG_FILE: &str = "kickabout.toml";

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },

    #[error("failed to initialize config from defaults: {message}")]
    DefaultsCopyError { message: String },
}

// ---------------------------------------------------------------------------
// Assembled config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub engine: EngineConfig,
    pub new_player: PlayerDefaults,
    pub db_path: String,
}

impl Config {
    /// Database location, with relative paths taken from `base_dir`.
    pub fn resolve_db_path(&self, base_dir: &Path) -> String {
        let path = Path::new(&self.db_path);
        if self.db_path == ":memory:" || path.is_absolute() {
            self.db_path.clone()
        } else {
            base_dir.join(path).display().to_string()
        }
    }
}

/// Rating and uncertainty handed to players added through the roster.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerDefaults {
    pub rating: f64,
    pub uncertainty: f64,
}

impl Default for PlayerDefaults {
    fn default() -> Self {
        Self {
            rating: DEFAULT_RATING,
            uncertainty: DEFAULT_UNCERTAINTY,
        }
    }
}

// ---------------------------------------------------------------------------
// kickabout.toml structs
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    fairness: FairnessWeights,
    #[serde(default)]
    rating: RatingSection,
    #[serde(default)]
    teams: TeamOptions,
    #[serde(default)]
    database: DatabaseSection,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct RatingSection {
    base_k: f64,
    uncertainty_scale: f64,
    uncertainty_decay: f64,
    uncertainty_floor: f64,
    default_rating: f64,
    default_uncertainty: f64,
}

impl Default for RatingSection {
    fn default() -> Self {
        let params = RatingParams::default();
        Self {
            base_k: params.base_k,
            uncertainty_scale: params.uncertainty_scale,
            uncertainty_decay: params.uncertainty_decay,
            uncertainty_floor: UNCERTAINTY_FLOOR,
            default_rating: DEFAULT_RATING,
            default_uncertainty: DEFAULT_UNCERTAINTY,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct DatabaseSection {
    path: String,
}

impl Default for DatabaseSection {
    fn default() -> Self {
        Self {
            path: "kickabout.db".into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Path of the config file under `base_dir`.
pub fn config_path(base_dir: &Path) -> PathBuf {
    base_dir.join("config").join(CONFIG_FILE)
}

/// Load and validate `config/kickabout.toml` relative to `base_dir`. Does not
/// create the file; see [`load_config`].
pub fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let path = config_path(base_dir);
    let text = std::fs::read_to_string(&path).map_err(|_| ConfigError::FileNotFound {
        path: path.clone(),
    })?;
    parse_config(&text, &path)
}

fn parse_config(text: &str, path: &Path) -> Result<Config, ConfigError> {
    let file: ConfigFile = toml::from_str(text).map_err(|e| ConfigError::ParseError {
        path: path.to_path_buf(),
        source: e,
    })?;

    let rating = RatingParams {
        base_k: file.rating.base_k,
        uncertainty_scale: file.rating.uncertainty_scale,
        uncertainty_decay: file.rating.uncertainty_decay,
        uncertainty_floor: file.rating.uncertainty_floor,
    };

    let config = Config {
        engine: EngineConfig {
            fairness: file.fairness,
            rating,
            teams: file.teams,
        },
        new_player: PlayerDefaults {
            rating: file.rating.default_rating,
            uncertainty: file.rating.default_uncertainty,
        },
        db_path: file.database.path,
    };

    validate(&config)?;
    Ok(config)
}

/// Write the shipped defaults to `config/kickabout.toml` if no file exists
/// yet. Returns the path when a file was created.
pub fn ensure_config_file(base_dir: &Path) -> Result<Option<PathBuf>, ConfigError> {
    let target = config_path(base_dir);
    if let Some(dir) = target.parent() {
        std::fs::create_dir_all(dir).map_err(|e| ConfigError::DefaultsCopyError {
            message: format!("failed to create config directory: {e}"),
        })?;
    }

    match std::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&target)
    {
        Ok(mut dest) => {
            std::io::Write::write_all(&mut dest, DEFAULT_CONFIG.as_bytes()).map_err(|e| {
                ConfigError::DefaultsCopyError {
                    message: format!("failed to write {}: {e}", target.display()),
                }
            })?;
            Ok(Some(target))
        }
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => Ok(None),
        Err(e) => Err(ConfigError::DefaultsCopyError {
            message: format!("failed to create {}: {e}", target.display()),
        }),
    }
}

/// Seed the config file from defaults if needed, then load it.
pub fn load_config(base_dir: &Path) -> Result<Config, ConfigError> {
    ensure_config_file(base_dir)?;
    load_config_from(base_dir)
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate(config: &Config) -> Result<(), ConfigError> {
    let f = &config.engine.fairness;
    let r = &config.engine.rating;
    let positive_fields: &[(&str, f64)] = &[
        ("fairness.rating_divisor", f.rating_divisor),
        ("fairness.chemistry_divisor", f.chemistry_divisor),
        ("rating.base_k", r.base_k),
        ("rating.uncertainty_scale", r.uncertainty_scale),
    ];
    for (name, val) in positive_fields {
        if !(*val > 0.0) {
            return Err(ConfigError::ValidationError {
                field: name.to_string(),
                message: format!("must be > 0, got {val}"),
            });
        }
    }

    if !(r.uncertainty_decay > 0.0 && r.uncertainty_decay <= 1.0) {
        return Err(ConfigError::ValidationError {
            field: "rating.uncertainty_decay".into(),
            message: format!("must be in (0, 1], got {}", r.uncertainty_decay),
        });
    }

    if !(r.uncertainty_floor >= UNCERTAINTY_FLOOR) {
        return Err(ConfigError::ValidationError {
            field: "rating.uncertainty_floor".into(),
            message: format!("must be >= {UNCERTAINTY_FLOOR}, got {}", r.uncertainty_floor),
        });
    }

    if !(config.new_player.uncertainty >= r.uncertainty_floor) {
        return Err(ConfigError::ValidationError {
            field: "rating.default_uncertainty".into(),
            message: format!(
                "must be >= rating.uncertainty_floor ({}), got {}",
                r.uncertainty_floor, config.new_player.uncertainty
            ),
        });
    }

    if config.db_path.trim().is_empty() {
        return Err(ConfigError::ValidationError {
            field: "database.path".into(),
            message: "must not be empty".into(),
        });
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    /// Helper: a fresh scratch directory under the system temp dir.
    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir()
            .join(format!("kickabout_config_{}_{name}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn write_config(base: &Path, text: &str) {
        let path = config_path(base);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, text).unwrap();
    }

    #[test]
    fn shipped_defaults_match_engine_defaults() {
        let config = parse_config(DEFAULT_CONFIG, Path::new("defaults/kickabout.toml"))
            .expect("shipped defaults should be valid");
        assert_eq!(config.engine, EngineConfig::default());
        assert_eq!(config.new_player, PlayerDefaults::default());
        assert_eq!(config.db_path, "kickabout.db");
    }

    #[test]
    fn load_config_seeds_missing_file() {
        let base = scratch_dir("seed");
        let config = load_config(&base).expect("should load seeded config");
        assert!(config_path(&base).exists());
        assert_eq!(config.engine, EngineConfig::default());

        // A second call leaves the existing file alone.
        assert_eq!(ensure_config_file(&base).unwrap(), None);
    }

    #[test]
    fn existing_file_is_not_overwritten() {
        let base = scratch_dir("keep");
        write_config(&base, "[database]\npath = \"league.db\"\n");
        let config = load_config(&base).unwrap();
        assert_eq!(config.db_path, "league.db");
    }

    #[test]
    fn missing_sections_fall_back_to_defaults() {
        let config = parse_config(
            "[teams]\navoid_repeat = true\n[rating]\nbase_k = 16.0\n",
            Path::new("partial.toml"),
        )
        .unwrap();
        assert!(config.engine.teams.avoid_repeat);
        assert_eq!(config.engine.teams.max_rerolls, 8);
        assert_eq!(config.engine.rating.base_k, 16.0);
        assert_eq!(config.engine.rating.uncertainty_decay, 0.95);
        assert_eq!(config.engine.fairness, FairnessWeights::default());
        assert_eq!(config.db_path, "kickabout.db");
    }

    #[test]
    fn relative_db_path_resolves_against_base_dir() {
        let mut config = parse_config(DEFAULT_CONFIG, Path::new("k.toml")).unwrap();
        let base = Path::new("/srv/league");
        assert_eq!(
            config.resolve_db_path(base),
            base.join("kickabout.db").display().to_string()
        );

        config.db_path = ":memory:".into();
        assert_eq!(config.resolve_db_path(base), ":memory:");
    }

    #[test]
    fn missing_file_is_reported() {
        let base = scratch_dir("missing");
        let err = load_config_from(&base).unwrap_err();
        assert!(matches!(err, ConfigError::FileNotFound { .. }));
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        let err = parse_config("[fairness\nrating_divisor = ", Path::new("bad.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
    }

    #[test]
    fn zero_divisor_is_rejected() {
        let err = parse_config("[fairness]\nrating_divisor = 0.0\n", Path::new("x.toml")).unwrap_err();
        match err {
            ConfigError::ValidationError { field, .. } => {
                assert_eq!(field, "fairness.rating_divisor")
            }
            other => panic!("expected ValidationError, got {other:?}"),
        }
    }

    #[test]
    fn decay_above_one_is_rejected() {
        let err =
            parse_config("[rating]\nuncertainty_decay = 1.5\n", Path::new("x.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError { .. }));
    }

    #[test]
    fn floor_below_minimum_is_rejected() {
        for text in [
            "[rating]\nuncertainty_floor = 5.0\n",
            "[rating]\nuncertainty_floor = 0.0\n",
        ] {
            match parse_config(text, Path::new("x.toml")).unwrap_err() {
                ConfigError::ValidationError { field, .. } => {
                    assert_eq!(field, "rating.uncertainty_floor")
                }
                other => panic!("expected ValidationError, got {other:?}"),
            }
        }
    }

    #[test]
    fn raised_floor_is_accepted() {
        let config = parse_config(
            "[rating]\nuncertainty_floor = 25.0\n",
            Path::new("x.toml"),
        )
        .unwrap();
        assert_eq!(config.engine.rating.uncertainty_floor, 25.0);
    }

    #[test]
    fn default_uncertainty_below_floor_is_rejected() {
        let err = parse_config(
            "[rating]\nuncertainty_floor = 20.0\ndefault_uncertainty = 5.0\n",
            Path::new("x.toml"),
        )
        .unwrap_err();
        match err {
            ConfigError::ValidationError { field, .. } => {
                assert_eq!(field, "rating.default_uncertainty")
            }
            other => panic!("expected ValidationError, got {other:?}"),
        }
    }
}
