use bitok_core::explorer::{PageRenderer, Route};
use bitok_core::format::unix_now;
use bitok_core::rpc::NodeRpc;
use bitok_core::Explorer;
use eyre::WrapErr;
use serde::Serialize;

use crate::cli::WalletCommand;
use crate::render::{text, JsonRenderer, TextRenderer};

/// Render one page the way the CLI prints it. `Err` carries the rendered
/// failure.
pub async fn show(explorer: &Explorer, route: &Route, json: bool) -> Result<String, String> {
    match explorer.load(route).await {
        Ok(page) if json => Ok(page.render(&JsonRenderer).to_pretty()),
        Ok(page) => Ok(page.render(&TextRenderer::now())),
        Err(err) if json => Err(JsonRenderer.failure(route, &err).to_pretty()),
        Err(err) => Err(TextRenderer::now().failure(route, &err)),
    }
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> eyre::Result<String> {
    serde_json::to_string_pretty(value).wrap_err("encode JSON output")
}

pub async fn peers(rpc: &dyn NodeRpc, json: bool) -> eyre::Result<String> {
    let peers = rpc.get_peer_info().await.wrap_err("getpeerinfo")?;
    if json {
        to_json(&peers)
    } else {
        Ok(text::peers(&peers))
    }
}

pub async fn wallet(rpc: &dyn NodeRpc, command: &WalletCommand, json: bool) -> eyre::Result<String> {
    match command {
        WalletCommand::Balance => {
            let balance = rpc.get_balance().await.wrap_err("getbalance")?;
            if json {
                to_json(&serde_json::json!({ "balance": balance.to_btc() }))
            } else {
                Ok(text::balance(balance))
            }
        }
        WalletCommand::Transactions {
            count,
            include_generated,
        } => {
            let txs = rpc
                .list_transactions(*count, *include_generated)
                .await
                .wrap_err("listtransactions")?;
            if json {
                to_json(&txs)
            } else {
                Ok(text::wallet_transactions(&txs, unix_now()))
            }
        }
        WalletCommand::NewAddress { label } => {
            let address = rpc
                .get_new_address(label.as_deref())
                .await
                .wrap_err("getnewaddress")?;
            if json {
                to_json(&serde_json::json!({ "address": address }))
            } else {
                Ok(format!("{address}\n"))
            }
        }
    }
}
