use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use bitok_core::network::estimate_hashrate;
use bitok_core::rpc::NodeInfo;
use bitok_core::{Block, BlockPage, CoreError, Dashboard};

use super::error::AppError;
use super::{SharedState, MAX_PAGE_SIZE};

#[derive(Serialize)]
pub(super) struct NetworkResponse {
    info: NodeInfo,
    hashrate: f64,
}

/// Always asks the node, and refreshes the shared snapshot on the way.
pub(super) async fn get_network(
    State(state): State<SharedState>,
) -> Result<Json<NetworkResponse>, AppError> {
    let info = state.explorer.resolver().status().refresh().await?;
    Ok(Json(NetworkResponse {
        hashrate: estimate_hashrate(info.difficulty),
        info,
    }))
}

pub(super) async fn get_dashboard(
    State(state): State<SharedState>,
) -> Result<Json<Dashboard>, AppError> {
    Ok(Json(state.explorer.resolver().dashboard().await?))
}

#[derive(Deserialize)]
pub(super) struct BlocksQuery {
    page: Option<u32>,
    page_size: Option<u32>,
}

pub(super) async fn get_blocks(
    State(state): State<SharedState>,
    Query(query): Query<BlocksQuery>,
) -> Result<Json<BlockPage>, AppError> {
    let page = query.page.unwrap_or(1);
    let page_size = query.page_size.unwrap_or(state.explorer.page_size());
    if page_size > MAX_PAGE_SIZE {
        return Err(CoreError::InvalidInput(format!(
            "page_size must be at most {MAX_PAGE_SIZE}"
        ))
        .into());
    }
    Ok(Json(
        state.explorer.resolver().paginate(page, page_size).await?,
    ))
}

pub(super) async fn get_block(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<Block>, AppError> {
    Ok(Json(state.explorer.resolver().resolve_block(&id).await?))
}
