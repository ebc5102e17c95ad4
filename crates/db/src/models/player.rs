//! Player row model.

use roster_core::error::CoreError;
use roster_core::player::Player;
use roster_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// A row from the `players` table.
///
/// `race` and `profession` are stored as their upper-case names.
#[derive(Debug, Clone, FromRow)]
pub struct PlayerRow {
    pub id: DbId,
    pub name: String,
    pub title: String,
    pub race: String,
    pub profession: String,
    pub birthday: Timestamp,
    pub banned: bool,
    pub experience: i32,
    pub level: i32,
    pub until_next_level: i32,
}

impl TryFrom<PlayerRow> for Player {
    type Error = CoreError;

    fn try_from(row: PlayerRow) -> Result<Self, Self::Error> {
        Ok(Player {
            id: row.id,
            name: row.name,
            title: row.title,
            race: row.race.parse()?,
            profession: row.profession.parse()?,
            birthday: row.birthday,
            banned: row.banned,
            experience: row.experience,
            level: row.level,
            until_next_level: row.until_next_level,
        })
    }
}
