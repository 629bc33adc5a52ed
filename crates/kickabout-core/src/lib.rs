// Team balancing engine: draws two sides from a pool of players, scores how
// fair a split is from ratings, chemistry and preferences, and updates
// ratings after a result is recorded.

pub mod dashboard;
pub mod error;
pub mod explain;
pub mod fairness;
pub mod matchmaker;
pub mod memory;
pub mod model;
pub mod rating;
pub mod repository;
pub mod signals;
pub mod teams;

pub use error::{EngineError, Result};
pub use matchmaker::{EngineConfig, Matchmaker, RecordedGame, Simulation};
pub use model::{Chemistry, Game, Lineup, Player, PlayerId, Preference, TeamSplit};
pub use repository::{NewGame, Repository};
