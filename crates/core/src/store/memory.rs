//! In-process player store.
//!
//! Keeps players in a `BTreeMap` behind a `tokio` `RwLock`. Used for tests
//! and for running the API without a database (`PLAYER_STORE=memory`).

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::StoreError;
use crate::filter::{PageRequest, PlayerOrder, PlayerPredicate};
use crate::player::{Player, PlayerDraft};
use crate::store::PlayerStore;
use crate::types::DbId;

#[derive(Default)]
struct Rows {
    /// Last id handed out. Ids are never reused, even after deletes.
    last_id: DbId,
    players: BTreeMap<DbId, Player>,
}

/// Thread-safe player store held entirely in memory.
#[derive(Default)]
pub struct InMemoryPlayerStore {
    rows: RwLock<Rows>,
}

impl InMemoryPlayerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored players.
    pub async fn len(&self) -> usize {
        self.rows.read().await.players.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl PlayerStore for InMemoryPlayerStore {
    async fn find_by_id(&self, id: DbId) -> Result<Option<Player>, StoreError> {
        Ok(self.rows.read().await.players.get(&id).cloned())
    }

    async fn insert(&self, draft: &PlayerDraft) -> Result<Player, StoreError> {
        let mut rows = self.rows.write().await;
        rows.last_id += 1;
        let player = draft.clone().into_player(rows.last_id);
        rows.players.insert(player.id, player.clone());
        Ok(player)
    }

    async fn save(&self, player: &Player) -> Result<Option<Player>, StoreError> {
        let mut rows = self.rows.write().await;
        match rows.players.get_mut(&player.id) {
            Some(existing) => {
                *existing = player.clone();
                Ok(Some(player.clone()))
            }
            None => Ok(None),
        }
    }

    async fn delete_by_id(&self, id: DbId) -> Result<bool, StoreError> {
        Ok(self.rows.write().await.players.remove(&id).is_some())
    }

    async fn find_all(
        &self,
        predicate: &PlayerPredicate,
        order: PlayerOrder,
        page: PageRequest,
    ) -> Result<Vec<Player>, StoreError> {
        let rows = self.rows.read().await;
        let mut matched: Vec<&Player> = rows
            .players
            .values()
            .filter(|p| predicate.matches(p))
            .collect();
        matched.sort_by(|a, b| order.compare(a, b));

        let offset = usize::try_from(page.offset()).unwrap_or(usize::MAX);
        let size = usize::try_from(page.size()).unwrap_or(usize::MAX);
        Ok(matched
            .into_iter()
            .skip(offset)
            .take(size)
            .cloned()
            .collect())
    }

    async fn count(&self, predicate: &PlayerPredicate) -> Result<i64, StoreError> {
        let rows = self.rows.read().await;
        let count = rows.players.values().filter(|p| predicate.matches(p)).count();
        i64::try_from(count).map_err(StoreError::new)
    }
}
