//! Persistence seam for players.
//!
//! [`PlayerService`](crate::service::PlayerService) only talks to storage
//! through [`PlayerStore`]. Backends: [`memory::InMemoryPlayerStore`] here,
//! and the PostgreSQL store in `roster-db`.

pub mod memory;

use async_trait::async_trait;

use crate::error::StoreError;
use crate::filter::{PageRequest, PlayerOrder, PlayerPredicate};
use crate::player::{Player, PlayerDraft};
use crate::types::DbId;

pub use memory::InMemoryPlayerStore;

/// Storage operations the player service relies on.
///
/// Implementations provide their own write atomicity; concurrent saves of
/// the same id are last-write-wins.
#[async_trait]
pub trait PlayerStore: Send + Sync {
    /// Fetch one player, `None` if no row has this id.
    async fn find_by_id(&self, id: DbId) -> Result<Option<Player>, StoreError>;

    /// Store a new player and return it with its assigned id.
    async fn insert(&self, draft: &PlayerDraft) -> Result<Player, StoreError>;

    /// Overwrite an existing player. `None` if the row no longer exists.
    async fn save(&self, player: &Player) -> Result<Option<Player>, StoreError>;

    /// Permanently remove a player. Returns `true` if a row was removed.
    async fn delete_by_id(&self, id: DbId) -> Result<bool, StoreError>;

    /// One page of matching players, ascending by `order` then id.
    async fn find_all(
        &self,
        predicate: &PlayerPredicate,
        order: PlayerOrder,
        page: PageRequest,
    ) -> Result<Vec<Player>, StoreError>;

    /// Number of players matching `predicate`.
    async fn count(&self, predicate: &PlayerPredicate) -> Result<i64, StoreError>;

    /// Cheap liveness probe used by the health endpoint.
    async fn health_check(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
