//! Handlers for the `/players` resource.
//!
//! Extractor rejections (non-numeric ids, malformed query strings or JSON
//! bodies) are turned into [`AppError::BadRequest`] so every client error
//! uses the same JSON shape.

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use roster_core::error::CoreError;
use roster_core::player::{NewPlayer, Player, PlayerPatch};
use roster_core::types::DbId;

use crate::error::{AppError, AppResult};
use crate::query::{PageParams, PlayerFilterParams};
use crate::state::AppState;

fn path_id(path: Result<Path<DbId>, PathRejection>) -> AppResult<DbId> {
    path.map(|Path(id)| id)
        .map_err(|e| AppError::BadRequest(e.body_text()))
}

fn query<T>(query: Result<Query<T>, QueryRejection>) -> AppResult<T> {
    query
        .map(|Query(params)| params)
        .map_err(|e| AppError::BadRequest(e.body_text()))
}

fn body<T>(json: Result<Json<T>, JsonRejection>) -> AppResult<T> {
    json.map(|Json(input)| input)
        .map_err(|e| AppError::BadRequest(e.body_text()))
}

/// GET /rest/players
///
/// Filters, `order`, `pageNumber` (default 0) and `pageSize` (default 3)
/// are all optional.
pub async fn list(
    State(state): State<AppState>,
    filter: Result<Query<PlayerFilterParams>, QueryRejection>,
    paging: Result<Query<PageParams>, QueryRejection>,
) -> AppResult<Json<Vec<Player>>> {
    let filter = query(filter)?.into_filter()?;
    let (order, page) = query(paging)?.into_order_and_page()?;
    let players = state.players.list(&filter, order, page).await?;
    Ok(Json(players))
}

/// GET /rest/players/count
pub async fn count(
    State(state): State<AppState>,
    filter: Result<Query<PlayerFilterParams>, QueryRejection>,
) -> AppResult<Json<i64>> {
    let filter = query(filter)?.into_filter()?;
    let count = state.players.count(&filter).await?;
    Ok(Json(count))
}

/// GET /rest/players/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    id: Result<Path<DbId>, PathRejection>,
) -> AppResult<Json<Player>> {
    let id = path_id(id)?;
    let player = state
        .players
        .get_by_id(id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Player",
            id,
        }))?;
    Ok(Json(player))
}

/// POST /rest/players
///
/// `banned` defaults to `false`; `level` and `untilNextLevel` are derived
/// from `experience` and ignored if sent.
pub async fn create(
    State(state): State<AppState>,
    input: Result<Json<NewPlayer>, JsonRejection>,
) -> AppResult<Json<Player>> {
    let player = state.players.create(body(input)?).await?;
    Ok(Json(player))
}

/// POST /rest/players/{id}
///
/// Partial update: only fields present in the body are validated and
/// applied. Any invalid field rejects the whole request.
pub async fn update(
    State(state): State<AppState>,
    id: Result<Path<DbId>, PathRejection>,
    patch: Result<Json<PlayerPatch>, JsonRejection>,
) -> AppResult<Json<Player>> {
    let id = path_id(id)?;
    let player = state.players.update(id, body(patch)?).await?;
    Ok(Json(player))
}

/// DELETE /rest/players/{id}
pub async fn delete(
    State(state): State<AppState>,
    id: Result<Path<DbId>, PathRejection>,
) -> AppResult<StatusCode> {
    let id = path_id(id)?;
    state.players.delete(id).await?;
    Ok(StatusCode::OK)
}
