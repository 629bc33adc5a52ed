// Storage capabilities the engine depends on. Implementations own the
// records; the engine only reads them and hands back a finished result.

use chrono::{DateTime, Utc};

use crate::model::{Chemistry, Game, Lineup, Player, PlayerId, Preference};

/// A completed match ready to be persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct NewGame {
    pub played_at: DateTime<Utc>,
    pub lineup: Lineup,
}

pub trait Repository {
    /// Look up a single player.
    fn player(&self, id: PlayerId) -> anyhow::Result<Option<Player>>;

    /// Players whose ids appear in `ids`. Unknown ids are left out; order is
    /// unspecified.
    fn players_by_ids(&self, ids: &[PlayerId]) -> anyhow::Result<Vec<Player>>;

    /// Every rostered player.
    fn list_players(&self) -> anyhow::Result<Vec<Player>>;

    fn chemistry_records(&self) -> anyhow::Result<Vec<Chemistry>>;

    fn preference_records(&self) -> anyhow::Result<Vec<Preference>>;

    /// All games in ascending id order.
    fn games_ordered(&self) -> anyhow::Result<Vec<Game>>;

    /// The game with the highest id, if any.
    fn last_game(&self) -> anyhow::Result<Option<Game>> {
        Ok(self.games_ordered()?.pop())
    }

    /// Persist updated players together with a new game, all or nothing.
    /// Returns the stored game.
    fn commit_result(&self, players: &[Player], game: &NewGame) -> anyhow::Result<Game>;
}
