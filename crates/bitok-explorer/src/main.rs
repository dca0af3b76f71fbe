mod browse;
mod cli;
mod commands;
mod render;
mod server;

use std::sync::Arc;
use std::time::Duration;

use axum::http::HeaderValue;
use clap::Parser;
use eyre::{eyre, WrapErr};

use bitok_core::explorer::Route;
use bitok_core::rpc::{HttpRpcClient, NodeInfo, NodeRpc};
use bitok_core::{CachedHeightIndex, Explorer, LinearScan, NetworkStatus, Resolver};

use cli::Command;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    let args = cli::Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_file(true)
        .with_line_number(true)
        .with_level(true)
        .init();

    let rpc: Arc<dyn NodeRpc> = Arc::new(
        HttpRpcClient::new(
            &args.rpc_url,
            args.rpc_user.as_deref(),
            args.rpc_pass.as_deref(),
            args.rpc_cookie_file.as_deref(),
            args.rpc_requests_per_second,
        )
        .wrap_err("configure node RPC client")?,
    );

    let status = Arc::new(NetworkStatus::new(rpc.clone()));
    let heights = Arc::new(CachedHeightIndex::new(
        LinearScan::new(rpc.clone()),
        args.height_cache_cap,
    ));
    let resolver = Arc::new(Resolver::new(rpc.clone(), status.clone(), heights));
    let explorer = Arc::new(Explorer::new(resolver, args.page_size));
    let poll_interval = Duration::from_secs(args.poll_interval);

    let route = match &args.command {
        Command::Serve {
            bind,
            port,
            cors_origin,
        } => {
            let info = connect(&status, &args.rpc_url).await?;
            tracing::info!(
                blocks = info.blocks,
                version = info.version,
                testnet = info.testnet,
                "connected to node"
            );
            let refresher = status.clone().spawn_refresh(poll_interval);
            let result = serve(explorer, bind, *port, cors_origin.as_deref()).await;
            refresher.abort();
            return result;
        }
        Command::Browse => {
            let refresher = status.clone().spawn_refresh(poll_interval);
            let result = browse::run(explorer, args.json).await;
            refresher.abort();
            return result;
        }
        Command::Peers => {
            let output = commands::peers(rpc.as_ref(), args.json).await?;
            println!("{}", output.trim_end());
            return Ok(());
        }
        Command::Wallet { command } => {
            let output = commands::wallet(rpc.as_ref(), command, args.json).await?;
            println!("{}", output.trim_end());
            return Ok(());
        }
        Command::Info => {
            connect(&status, &args.rpc_url).await?;
            Route::Home
        }
        Command::Dashboard => Route::Dashboard,
        Command::Block { id } => Route::Block(id.clone()),
        Command::Tx { txid } => Route::Transaction(txid.clone()),
        Command::Address { address } => Route::Address(address.clone()),
        Command::Blocks { page } => Route::Blocks { page: *page },
        Command::Search { query } => Route::Search(query.clone()),
        Command::Mempool => Route::Mempool,
    };

    match commands::show(&explorer, &route, args.json).await {
        Ok(output) => {
            println!("{}", output.trim_end());
            Ok(())
        }
        Err(output) => {
            eprintln!("{}", output.trim_end());
            std::process::exit(1);
        }
    }
}

/// Fetch the first network snapshot, turning a failure into an actionable
/// message.
async fn connect(status: &NetworkStatus, rpc_url: &str) -> eyre::Result<NodeInfo> {
    status.refresh().await.map_err(|err| {
        let message = format_rpc_connect_error(rpc_url, &err.to_string());
        eyre!(message).wrap_err("while attempting to connect to the node RPC")
    })
}

async fn serve(
    explorer: Arc<Explorer>,
    bind: &str,
    port: u16,
    cors_origin: Option<&str>,
) -> eyre::Result<()> {
    let bind_addr = format!("{bind}:{port}");
    let origin = match cors_origin {
        Some(origin) => origin.to_owned(),
        None => format!("http://{bind_addr}"),
    };
    let allowed_origin = HeaderValue::from_str(&origin)
        .wrap_err_with(|| format!("invalid CORS origin `{origin}`"))?;

    let router = server::build_router(server::AppState { explorer }, allowed_origin);

    if bind == "0.0.0.0" {
        tracing::warn!("server is bound to 0.0.0.0 and reachable from the network");
    }

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .context("bind TCP listener")?;

    tracing::info!("listening on http://{bind_addr}/api/v1");
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("run HTTP server")?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %err, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}

fn format_rpc_connect_error(rpc_url: &str, source_error: &str) -> String {
    let mut lines = vec![
        format!("could not reach node RPC at `{rpc_url}`"),
        format!("RPC error: {source_error}"),
    ];

    if source_error.contains("dns error") || source_error.contains("Could not resolve host") {
        lines.push("hint: the hostname did not resolve; check the URL and your network".into());
    } else if source_error.contains("HTTP 401") || source_error.contains("HTTP 403") {
        lines.push(
            "hint: the node rejected the credentials; check --rpc-user/--rpc-pass or the \
             cookie file"
                .into(),
        );
    } else if source_error.contains("HTTP 404") {
        lines.push("hint: the RPC path is wrong; the node listens on `/`".into());
    } else if source_error.contains("Connection refused")
        || source_error.contains("error sending request")
    {
        lines.push(
            "hint: nothing answered; start the node with -server and check -rpcport".into(),
        );
    } else if source_error.contains("Method not found") {
        lines.push("hint: the endpoint is not a Bitok node (no `getinfo`)".into());
    }

    lines.join("\n")
}
