use std::num::NonZeroUsize;
use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Bitok explorer: browse blocks, wallet transactions and addresses through a
/// node's JSON-RPC interface.
#[derive(Parser)]
#[command(version, about)]
pub struct Cli {
    /// Node JSON-RPC URL.
    #[arg(
        long,
        global = true,
        default_value = "http://127.0.0.1:8332/",
        env = "BITOK_RPC_URL"
    )]
    pub rpc_url: String,

    /// RPC username.
    #[arg(long, global = true, env = "BITOK_RPC_USER")]
    pub rpc_user: Option<String>,

    /// RPC password.
    #[arg(long, global = true, env = "BITOK_RPC_PASS")]
    pub rpc_pass: Option<String>,

    /// Cookie file holding `user:password`, used when no user/pass is given.
    #[arg(long, global = true, env = "BITOK_RPC_COOKIE_FILE")]
    pub rpc_cookie_file: Option<PathBuf>,

    /// Cap on outbound RPC requests per second. Unlimited when omitted.
    #[arg(long, global = true)]
    pub rpc_requests_per_second: Option<u32>,

    /// Seconds between network status refreshes.
    #[arg(
        long,
        global = true,
        default_value = "30",
        env = "BITOK_POLL_INTERVAL",
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub poll_interval: u64,

    /// Blocks per page of the block list.
    #[arg(
        long,
        global = true,
        default_value = "20",
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    pub page_size: u32,

    /// Maximum number of remembered hash-to-height lookups.
    #[arg(long, global = true, default_value = "10000")]
    pub height_cache_cap: NonZeroUsize,

    /// Print JSON instead of text.
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Serve the JSON API.
    Serve {
        /// Address to bind the web server to.
        #[arg(long, default_value = "127.0.0.1")]
        bind: String,

        /// Port to listen on.
        #[arg(long, default_value = "3080")]
        port: u16,

        /// Origin allowed by CORS. Defaults to the server's own origin.
        #[arg(long)]
        cors_origin: Option<String>,
    },

    /// Read hash routes (`#/blocks/12`) from stdin and print each page.
    Browse,

    /// Node and network summary.
    Info,

    /// Network statistics and the most recent blocks.
    Dashboard,

    /// A block by height or hash.
    Block { id: String },

    /// A wallet transaction.
    Tx { txid: String },

    /// Received totals, and balance for wallet addresses.
    Address { address: String },

    /// One page of the block list, newest first.
    Blocks {
        #[arg(long, default_value = "1")]
        page: u32,
    },

    /// Look up a height, block hash, transaction id or address.
    Search { query: String },

    /// Transactions waiting in the node's memory pool.
    Mempool,

    /// Connected peers.
    Peers,

    /// Queries against the node's own wallet.
    Wallet {
        #[command(subcommand)]
        command: WalletCommand,
    },
}

#[derive(Subcommand)]
pub enum WalletCommand {
    /// Wallet balance.
    Balance,

    /// Most recent wallet transactions.
    Transactions {
        #[arg(long, default_value = "10")]
        count: u32,

        /// Include generated (mined) coins.
        #[arg(long)]
        include_generated: bool,
    },

    /// Generate a receiving address.
    NewAddress {
        #[arg(long)]
        label: Option<String>,
    },
}
