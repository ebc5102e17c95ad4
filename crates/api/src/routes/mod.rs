pub mod health;
pub mod player;

use axum::Router;

use crate::state::AppState;

/// Build the `/rest` route tree.
///
/// ```text
/// /players                 list (GET), create (POST)
/// /players/count           count matching players (GET)
/// /players/{id}            get (GET), update (POST), delete (DELETE)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new().nest("/players", player::router())
}
