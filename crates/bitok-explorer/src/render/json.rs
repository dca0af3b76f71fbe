use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use bitcoin::Txid;
use serde::Serialize;
use serde_json::{json, Value};

use bitok_core::explorer::{PageRenderer, Route};
use bitok_core::rpc::NodeInfo;
use bitok_core::{AddressDetails, Block, BlockPage, CoreError, Dashboard, WalletTransaction};

/// A rendered JSON page together with the HTTP status it maps to.
#[derive(Debug)]
pub struct JsonPage {
    pub status: StatusCode,
    pub body: Value,
}

impl JsonPage {
    fn ok<T: Serialize + ?Sized>(page: &str, data: &T) -> Self {
        match serde_json::to_value(data) {
            Ok(data) => Self {
                status: StatusCode::OK,
                body: json!({ "page": page, "data": data }),
            },
            Err(err) => Self {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                body: json!({ "error": format!("failed to encode {page} page: {err}") }),
            },
        }
    }

    pub fn to_pretty(&self) -> String {
        serde_json::to_string_pretty(&self.body).unwrap_or_else(|_| self.body.to_string())
    }
}

impl IntoResponse for JsonPage {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

/// HTTP status and JSON error body for a core failure.
///
/// Not-found bodies carry `wallet_scope`, which is `true` when the node
/// refused because the transaction is outside its wallet.
pub fn error_body(err: &CoreError) -> (StatusCode, Value) {
    match err {
        CoreError::InvalidInput(_) => (
            StatusCode::BAD_REQUEST,
            json!({ "error": err.to_string() }),
        ),
        CoreError::NotFound(not_found) => (
            StatusCode::NOT_FOUND,
            json!({
                "error": err.to_string(),
                "wallet_scope": not_found.is_wallet_scope(),
            }),
        ),
        CoreError::Rpc(_) => (
            StatusCode::BAD_GATEWAY,
            json!({ "error": err.to_string() }),
        ),
        CoreError::InvalidData(_) | CoreError::Config(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            json!({ "error": err.to_string() }),
        ),
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct JsonRenderer;

impl PageRenderer for JsonRenderer {
    type Output = JsonPage;

    fn home(&self, info: Option<&NodeInfo>) -> JsonPage {
        JsonPage::ok("home", &info)
    }

    fn dashboard(&self, dashboard: &Dashboard) -> JsonPage {
        JsonPage::ok("dashboard", dashboard)
    }

    fn blocks(&self, page: &BlockPage) -> JsonPage {
        JsonPage::ok("blocks", page)
    }

    fn block(&self, block: &Block) -> JsonPage {
        JsonPage::ok("block", block)
    }

    fn transaction(&self, tx: &WalletTransaction) -> JsonPage {
        JsonPage::ok("transaction", tx)
    }

    fn address(&self, details: &AddressDetails) -> JsonPage {
        JsonPage::ok("address", details)
    }

    fn mempool(&self, txids: &[Txid]) -> JsonPage {
        JsonPage::ok("mempool", txids)
    }

    fn failure(&self, route: &Route, error: &CoreError) -> JsonPage {
        let (status, mut body) = error_body(error);
        body["route"] = Value::String(route.fragment());
        JsonPage { status, body }
    }
}
