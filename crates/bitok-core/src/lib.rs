pub mod error;
pub mod explorer;
pub mod format;
pub mod network;
pub mod resolver;
pub mod rpc;
pub mod script;
pub mod types;

#[cfg(test)]
pub(crate) mod test_util;

pub use error::{CoreError, NotFound, RpcError};
pub use explorer::{Explorer, Page, PageRenderer, Route};
pub use network::NetworkStatus;
pub use resolver::{CachedHeightIndex, HeightIndex, LinearScan, Resolver, SearchHit};
pub use types::{AddressDetails, Block, BlockHeight, BlockPage, Dashboard, WalletTransaction};
