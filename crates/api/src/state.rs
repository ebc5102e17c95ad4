use std::sync::Arc;

use roster_core::service::PlayerService;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// Player record service over the configured store.
    pub players: PlayerService,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
}
