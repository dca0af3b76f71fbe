//! Native JSON-RPC 1.0 client for Bitok / Bitcoin 0.3.x compatible nodes.
//!
//! Implements [`NodeRpc`](super::NodeRpc) over HTTP using `reqwest`, with
//! basic auth (explicit credentials or a cookie file) and optional outbound
//! rate limiting.

mod client;
mod connection;
mod protocol;

pub use client::HttpRpcClient;
