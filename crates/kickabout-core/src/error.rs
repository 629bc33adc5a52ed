// Error taxonomy for the balancing engine.

use thiserror::Error;

use crate::model::PlayerId;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("at least 2 players are required, got {found}")]
    TooFewPlayers { found: usize },

    #[error("player {0} is not on the roster")]
    UnknownPlayer(PlayerId),

    #[error("player {0} appears on both teams")]
    DuplicatePlayer(PlayerId),

    #[error("both teams must have at least one player")]
    EmptyTeam,

    #[error("scores must not both be zero")]
    ZeroTotalScore,

    #[error("combined team rating must be positive, got {total}")]
    NonPositiveRatingTotal { total: f64 },

    #[error("persistence failure: {0:#}")]
    Persistence(#[from] anyhow::Error),
}

impl EngineError {
    /// Whether the error was caused by the caller's input rather than the
    /// store.
    pub fn is_invalid_input(&self) -> bool {
        !matches!(self, EngineError::Persistence(_))
    }
}

pub type Result<T, E = EngineError> = std::result::Result<T, E>;
