use axum::extract::{Path, Query, State};
use axum::Json;
use bitcoin::Txid;
use serde::Deserialize;

use bitok_core::explorer::Route;
use bitok_core::rpc::{PeerInfo, RawTransaction};
use bitok_core::{AddressDetails, CoreError, SearchHit, WalletTransaction};

use crate::render::{JsonPage, JsonRenderer};

use super::error::AppError;
use super::SharedState;

pub(super) async fn get_transaction(
    State(state): State<SharedState>,
    Path(txid): Path<String>,
) -> Result<Json<WalletTransaction>, AppError> {
    Ok(Json(
        state.explorer.resolver().resolve_transaction(&txid).await?,
    ))
}

pub(super) async fn get_raw_transaction(
    State(state): State<SharedState>,
    Path(txid): Path<String>,
) -> Result<Json<RawTransaction>, AppError> {
    Ok(Json(state.explorer.resolver().raw_transaction(&txid).await?))
}

pub(super) async fn get_address(
    State(state): State<SharedState>,
    Path(address): Path<String>,
) -> Result<Json<AddressDetails>, AppError> {
    Ok(Json(
        state.explorer.resolver().resolve_address(&address).await?,
    ))
}

#[derive(Deserialize)]
pub(super) struct SearchQuery {
    #[serde(default)]
    q: String,
}

pub(super) async fn search(
    State(state): State<SharedState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<SearchHit>, AppError> {
    if query.q.trim().is_empty() {
        return Err(CoreError::InvalidInput("missing search query `q`".into()).into());
    }
    Ok(Json(state.explorer.resolver().search(&query.q).await?))
}

pub(super) async fn get_mempool(
    State(state): State<SharedState>,
) -> Result<Json<Vec<Txid>>, AppError> {
    Ok(Json(state.explorer.resolver().mempool().await?))
}

pub(super) async fn get_peers(
    State(state): State<SharedState>,
) -> Result<Json<Vec<PeerInfo>>, AppError> {
    Ok(Json(state.explorer.resolver().rpc().get_peer_info().await?))
}

#[derive(Deserialize)]
pub(super) struct PageQuery {
    #[serde(default)]
    route: String,
}

/// Resolve a hash route (`#/blocks/12`) into a tagged page. Failures come back
/// as error bodies carrying the route that produced them.
pub(super) async fn get_page(
    State(state): State<SharedState>,
    Query(query): Query<PageQuery>,
) -> JsonPage {
    let route = Route::parse(&query.route);
    state.explorer.render(&route, &JsonRenderer).await
}
