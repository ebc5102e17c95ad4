//! Player record service.
//!
//! Runs the request pipeline shared by every operation: check the id
//! shape, validate fields, derive level data, then hand off to the
//! injected [`PlayerStore`]. Nothing invalid ever reaches the store.
//!
//! The service holds no state besides the store handle. Concurrent updates
//! of one player are not serialized here: the last save to reach the store
//! wins.

use std::sync::Arc;

use crate::error::CoreError;
use crate::filter::{PageRequest, PlayerFilter, PlayerOrder};
use crate::player::{validate_id, NewPlayer, Player, PlayerPatch};
use crate::store::PlayerStore;
use crate::types::DbId;

const ENTITY: &str = "Player";

/// Orchestrates player reads and writes against a [`PlayerStore`].
#[derive(Clone)]
pub struct PlayerService {
    store: Arc<dyn PlayerStore>,
}

impl PlayerService {
    pub fn new(store: Arc<dyn PlayerStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn PlayerStore> {
        &self.store
    }

    /// Fetch one player. A missing row is `Ok(None)`, a malformed id is an
    /// error raised before the store is queried.
    pub async fn get_by_id(&self, id: DbId) -> Result<Option<Player>, CoreError> {
        validate_id(id)?;
        Ok(self.store.find_by_id(id).await?)
    }

    /// One page of players matching `filter`.
    pub async fn list(
        &self,
        filter: &PlayerFilter,
        order: PlayerOrder,
        page: PageRequest,
    ) -> Result<Vec<Player>, CoreError> {
        let predicate = filter.compose();
        tracing::debug!(
            constraints = predicate.constraints().len(),
            order = order.as_str(),
            page = page.number(),
            size = page.size(),
            "Listing players"
        );
        Ok(self.store.find_all(&predicate, order, page).await?)
    }

    /// Number of players matching `filter`.
    pub async fn count(&self, filter: &PlayerFilter) -> Result<i64, CoreError> {
        let predicate = filter.compose();
        tracing::debug!(
            constraints = predicate.constraints().len(),
            "Counting players"
        );
        Ok(self.store.count(&predicate).await?)
    }

    /// Validate `input`, derive level data and store it.
    pub async fn create(&self, input: NewPlayer) -> Result<Player, CoreError> {
        let draft = input.validate()?;
        let player = self.store.insert(&draft).await?;
        tracing::info!(id = player.id, name = %player.name, "Player created");
        Ok(player)
    }

    /// Merge `patch` into the stored player.
    ///
    /// The patch is applied only if every present field is valid; level
    /// data is re-derived when experience changes.
    pub async fn update(&self, id: DbId, patch: PlayerPatch) -> Result<Player, CoreError> {
        validate_id(id)?;
        let mut player = self
            .store
            .find_by_id(id)
            .await?
            .ok_or(CoreError::NotFound { entity: ENTITY, id })?;

        patch.apply_to(&mut player)?;

        let saved = self
            .store
            .save(&player)
            .await?
            .ok_or(CoreError::NotFound { entity: ENTITY, id })?;
        tracing::info!(id, "Player updated");
        Ok(saved)
    }

    /// Permanently remove a player.
    pub async fn delete(&self, id: DbId) -> Result<(), CoreError> {
        validate_id(id)?;
        if !self.store.delete_by_id(id).await? {
            return Err(CoreError::NotFound { entity: ENTITY, id });
        }
        tracing::info!(id, "Player deleted");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
