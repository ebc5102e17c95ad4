//! [`PlayerStore`] backed by PostgreSQL.

use async_trait::async_trait;
use roster_core::error::StoreError;
use roster_core::filter::{PageRequest, PlayerOrder, PlayerPredicate};
use roster_core::player::{Player, PlayerDraft};
use roster_core::store::PlayerStore;
use roster_core::types::DbId;

use crate::models::player::PlayerRow;
use crate::repositories::PlayerRepo;
use crate::DbPool;

/// Player store over a shared connection pool.
#[derive(Clone)]
pub struct PgPlayerStore {
    pool: DbPool,
}

impl PgPlayerStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

fn to_player(row: PlayerRow) -> Result<Player, StoreError> {
    Player::try_from(row).map_err(StoreError::new)
}

#[async_trait]
impl PlayerStore for PgPlayerStore {
    async fn find_by_id(&self, id: DbId) -> Result<Option<Player>, StoreError> {
        PlayerRepo::find_by_id(&self.pool, id)
            .await
            .map_err(StoreError::new)?
            .map(to_player)
            .transpose()
    }

    async fn insert(&self, draft: &PlayerDraft) -> Result<Player, StoreError> {
        let row = PlayerRepo::create(&self.pool, draft)
            .await
            .map_err(StoreError::new)?;
        to_player(row)
    }

    async fn save(&self, player: &Player) -> Result<Option<Player>, StoreError> {
        PlayerRepo::update(&self.pool, player)
            .await
            .map_err(StoreError::new)?
            .map(to_player)
            .transpose()
    }

    async fn delete_by_id(&self, id: DbId) -> Result<bool, StoreError> {
        PlayerRepo::delete(&self.pool, id)
            .await
            .map_err(StoreError::new)
    }

    async fn find_all(
        &self,
        predicate: &PlayerPredicate,
        order: PlayerOrder,
        page: PageRequest,
    ) -> Result<Vec<Player>, StoreError> {
        PlayerRepo::list(&self.pool, predicate, order, page)
            .await
            .map_err(StoreError::new)?
            .into_iter()
            .map(to_player)
            .collect()
    }

    async fn count(&self, predicate: &PlayerPredicate) -> Result<i64, StoreError> {
        PlayerRepo::count(&self.pool, predicate)
            .await
            .map_err(StoreError::new)
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        crate::health_check(&self.pool)
            .await
            .map_err(StoreError::new)
    }
}
