mod chain;
mod error;
mod lookup;

use std::sync::Arc;

use axum::http::{HeaderValue, Method};
use axum::routing::get;
use axum::{Json, Router};
use tower_http::cors::{AllowOrigin, CorsLayer};

use bitok_core::Explorer;

/// Largest `page_size` the block list accepts over HTTP.
pub const MAX_PAGE_SIZE: u32 = 100;

// ==============================================================================
// Application State
// ==============================================================================

pub struct AppState {
    pub explorer: Arc<Explorer>,
}

type SharedState = Arc<AppState>;

// ==============================================================================
// Router
// ==============================================================================

/// Read-only JSON API under `/api/v1`. CORS reflects `allowed_origin` only
/// when the request's `Origin` matches it exactly.
pub fn build_router(state: AppState, allowed_origin: HeaderValue) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::predicate(
            move |request_origin: &HeaderValue, _| *request_origin == allowed_origin,
        ))
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([axum::http::header::CONTENT_TYPE]);

    let api = Router::new()
        .route("/api/v1/health", get(health))
        .route("/api/v1/network", get(chain::get_network))
        .route("/api/v1/dashboard", get(chain::get_dashboard))
        .route("/api/v1/blocks", get(chain::get_blocks))
        .route("/api/v1/block/{id}", get(chain::get_block))
        .route("/api/v1/tx/{txid}", get(lookup::get_transaction))
        .route("/api/v1/rawtx/{txid}", get(lookup::get_raw_transaction))
        .route("/api/v1/address/{address}", get(lookup::get_address))
        .route("/api/v1/search", get(lookup::search))
        .route("/api/v1/mempool", get(lookup::get_mempool))
        .route("/api/v1/peers", get(lookup::get_peers))
        .route("/api/v1/page", get(lookup::get_page));

    Router::new()
        .merge(api)
        .fallback(api_not_found)
        .layer(cors)
        .with_state(Arc::new(state))
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn api_not_found() -> error::AppError {
    error::AppError::NotFound("API route not found".to_string())
}
