use std::fmt::Write as _;

use bitcoin::{SignedAmount, Txid};

use bitok_core::explorer::{PageRenderer, Route};
use bitok_core::format::{
    format_age, format_coin, format_hashrate, format_signed_coin, format_timestamp, truncate_hash,
    unix_now,
};
use bitok_core::network::estimate_hashrate;
use bitok_core::rpc::{ListedTransaction, NodeInfo, PeerInfo};
use bitok_core::{AddressDetails, Block, BlockPage, CoreError, Dashboard, WalletTransaction};

const WALLET_SCOPE_NOTE: &str = "The node only tracks transactions and balances for its own \
wallet. Received totals are available for any address; balances and unspent outputs only \
for wallet addresses.";

/// Plain-text pages for terminals.
#[derive(Debug, Clone, Copy)]
pub struct TextRenderer {
    /// Reference time for relative ages, in unix seconds.
    now: u64,
}

impl TextRenderer {
    pub fn now() -> Self {
        Self::at(unix_now())
    }

    pub fn at(now: u64) -> Self {
        Self { now }
    }
}

// `write!` into a `String` cannot fail.
macro_rules! out {
    ($out:expr) => {
        let _ = writeln!($out);
    };
    ($out:expr, $($arg:tt)*) => {
        let _ = writeln!($out, $($arg)*);
    };
}

fn block_table(out: &mut String, blocks: &[Block], now: u64) {
    out!(out, "{:>8}  {:<23}  {:>10}  {:>3}", "HEIGHT", "HASH", "AGE", "TXS");
    for block in blocks {
        out!(
            out,
            "{:>8}  {:<23}  {:>10}  {:>3}",
            block.height,
            truncate_hash(&block.hash.to_string()),
            format_age(block.time, now),
            block.tx.len()
        );
    }
}

fn network_summary(out: &mut String, info: &NodeInfo) {
    out!(out, "Height:       {}", info.blocks);
    out!(out, "Difficulty:   {:.8}", info.difficulty);
    out!(out, "Hashrate:     {}", format_hashrate(estimate_hashrate(info.difficulty)));
    out!(out, "Connections:  {}", info.connections);
    out!(out, "Version:      {}", info.version);
    if info.testnet {
        out!(out, "Network:      testnet");
    }
    if !info.errors.is_empty() {
        out!(out, "Warnings:     {}", info.errors);
    }
}

impl PageRenderer for TextRenderer {
    type Output = String;

    fn home(&self, info: Option<&NodeInfo>) -> String {
        let mut out = String::new();
        out!(out, "Bitok Explorer");
        out!(out);
        match info {
            Some(info) => network_summary(&mut out, info),
            None => {
                out!(out, "No network snapshot yet.");
            }
        }
        out!(out);
        out!(out, "{WALLET_SCOPE_NOTE}");
        out!(out);
        out!(out, "Routes: #/dashboard  #/blocks  #/blocks/<height|hash>  #/transactions/<txid>");
        out!(out, "        #/addresses/<address>  #/search/<query>  #/mempool");
        out
    }

    fn dashboard(&self, dashboard: &Dashboard) -> String {
        let mut out = String::new();
        out!(out, "Network");
        network_summary(&mut out, &dashboard.info);
        out!(out);
        out!(out, "Recent blocks");
        block_table(&mut out, &dashboard.recent_blocks, self.now);
        out
    }

    fn blocks(&self, page: &BlockPage) -> String {
        let mut out = String::new();
        out!(
            out,
            "Blocks: page {} of {} (tip {})",
            page.page,
            page.total_pages.max(1),
            page.tip
        );
        if page.blocks.is_empty() {
            out!(out, "No blocks on this page.");
        } else {
            block_table(&mut out, &page.blocks, self.now);
        }
        if page.page > 1 {
            out!(out, "prev: {}", Route::Blocks { page: page.page - 1 });
        }
        if page.page < page.total_pages {
            out!(out, "next: {}", Route::Blocks { page: page.page + 1 });
        }
        out
    }

    fn block(&self, block: &Block) -> String {
        let mut out = String::new();
        out!(out, "Block {}", block.height);
        out!(out, "Hash:         {}", block.hash);
        out!(
            out,
            "Time:         {} ({})",
            format_timestamp(block.time),
            format_age(block.time, self.now)
        );
        out!(out, "Difficulty:   {:.8}", block.difficulty);
        out!(out, "Nonce:        {}", block.nonce);
        out!(out, "Merkle root:  {}", block.merkle_root);
        match &block.previous_block_hash {
            Some(prev) => {
                out!(out, "Previous:     {}", Route::Block(prev.to_string()));
            }
            None => {
                out!(out, "Previous:     (genesis)");
            }
        }
        out!(out, "Transactions: {}", block.tx.len());
        for txid in &block.tx {
            out!(out, "  {}", Route::Transaction(txid.to_string()));
        }
        out
    }

    fn transaction(&self, tx: &WalletTransaction) -> String {
        let mut out = String::new();
        out!(out, "Transaction {}", tx.txid);
        out!(out, "Amount:        {}", format_signed_coin(tx.amount));
        match tx.fee {
            Some(fee) => {
                out!(out, "Fee:           {}", format_signed_coin(fee));
            }
            None => {
                out!(out, "Fee:           N/A");
            }
        }
        out!(out, "Confirmations: {}", tx.confirmations);
        if let Some(time) = tx.time {
            out!(out, "Time:          {}", format_timestamp(time));
        }
        if let Some(block_hash) = &tx.block_hash {
            out!(out, "Block:         {}", Route::Block(block_hash.to_string()));
        }
        if !tx.details.is_empty() {
            out!(out, "Details:");
            for detail in &tx.details {
                out!(
                    out,
                    "  {:<9} {:<35} {}",
                    detail.category,
                    detail.address.as_deref().unwrap_or("-"),
                    format_signed_coin(detail.amount)
                );
            }
        }
        out
    }

    fn address(&self, details: &AddressDetails) -> String {
        let mut out = String::new();
        out!(out, "Address {}", details.address);
        out!(
            out,
            "In wallet:          {}",
            if details.in_wallet { "yes" } else { "no" }
        );
        out!(out, "Received (0 conf):  {}", format_coin(details.received_unconfirmed));
        out!(out, "Received (6 conf):  {}", format_coin(details.received_confirmed));
        match details.balance {
            Some(balance) => {
                out!(out, "Balance:            {}", format_coin(balance));
            }
            None => {
                out!(out, "Balance:            unavailable outside the wallet");
                out!(out);
                out!(out, "{WALLET_SCOPE_NOTE}");
            }
        }
        if !details.utxos.is_empty() {
            out!(out, "Unspent outputs:");
            for utxo in &details.utxos {
                out!(
                    out,
                    "  {}:{}  {}  ({} conf)",
                    truncate_hash(&utxo.txid.to_string()),
                    utxo.vout,
                    format_coin(utxo.amount),
                    utxo.confirmations
                );
            }
        }
        out
    }

    fn mempool(&self, txids: &[Txid]) -> String {
        let mut out = String::new();
        out!(out, "Mempool: {} transaction(s)", txids.len());
        for txid in txids {
            out!(out, "  {txid}");
        }
        out
    }

    fn failure(&self, route: &Route, error: &CoreError) -> String {
        let mut out = String::new();
        out!(out, "error: {error}");
        out!(out, "route: {route}");
        if let CoreError::NotFound(not_found) = error {
            if not_found.is_wallet_scope() {
                out!(out);
                out!(out, "{WALLET_SCOPE_NOTE}");
            }
        }
        out
    }
}

// ==============================================================================
// Wallet and Network Views
// ==============================================================================

pub fn peers(peers: &[PeerInfo]) -> String {
    let mut out = String::new();
    out!(out, "Peers: {}", peers.len());
    for peer in peers {
        out!(
            out,
            "  {:<22} {:<8} {:<20} height {}",
            peer.addr,
            if peer.inbound == Some(true) { "inbound" } else { "outbound" },
            peer.subver.as_deref().unwrap_or("-"),
            peer.startingheight
                .map(|h| h.to_string())
                .unwrap_or_else(|| "-".to_owned())
        );
    }
    out
}

pub fn balance(balance: SignedAmount) -> String {
    format!("Balance: {}\n", format_signed_coin(balance))
}

pub fn wallet_transactions(txs: &[ListedTransaction], now: u64) -> String {
    let mut out = String::new();
    out!(out, "Wallet transactions: {}", txs.len());
    for tx in txs {
        out!(
            out,
            "  {:<9} {:>22}  {:>6} conf  {:<10}  {}",
            tx.category,
            format_signed_coin(tx.amount),
            tx.confirmations,
            tx.time
                .map(|t| format_age(t, now))
                .unwrap_or_else(|| "-".to_owned()),
            tx.txid
                .map(|t| truncate_hash(&t.to_string()))
                .unwrap_or_else(|| "-".to_owned())
        );
    }
    out
}
