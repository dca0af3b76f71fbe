use bitcoin::Txid;

/// Failures of a single JSON-RPC round trip.
#[derive(Debug, thiserror::Error)]
pub enum RpcError {
    /// The request could not be sent or the response body could not be read.
    #[error("HTTP error: {0}")]
    Connect(#[from] reqwest::Error),

    /// The node answered with a non-success HTTP status.
    #[error("HTTP {status}: {reason}")]
    Http { status: u16, reason: String },

    /// The body was not a JSON-RPC envelope.
    #[error("invalid JSON-RPC response: {0}")]
    Protocol(String),

    /// The envelope carried a non-null `error`.
    #[error("{message}")]
    Node { code: Option<i64>, message: String },
}

impl RpcError {
    /// Whether this failure means "the node answered, but has no such thing".
    ///
    /// Bitcoin 0.3.x reports every RPC error as HTTP 500, so a bare 500 counts
    /// as a lookup miss alongside an explicit `error` envelope.
    pub fn is_lookup_miss(&self) -> bool {
        match self {
            Self::Node { .. } => true,
            Self::Http { status, .. } => *status == 500,
            Self::Connect(_) | Self::Protocol(_) => false,
        }
    }
}

/// Resolver-level "does not exist" outcomes.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NotFound {
    #[error("block not found: {0}")]
    Block(String),

    #[error("no block at height {0}")]
    Height(u64),

    #[error("transaction not found: {0}")]
    Transaction(Txid),

    /// The node only answers transaction queries for its own wallet.
    #[error("transaction {0} is not in the connected wallet")]
    OutsideWallet(Txid),

    #[error("no block or transaction matches {0}")]
    Query(String),

    #[error("unknown page: {0}")]
    Page(String),
}

impl NotFound {
    /// `true` for outcomes caused by the node's wallet-only scope rather than
    /// missing chain data.
    pub fn is_wallet_scope(&self) -> bool {
        matches!(self, Self::OutsideWallet(_))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("RPC communication failure: {0}")]
    Rpc(#[from] RpcError),

    #[error(transparent)]
    NotFound(#[from] NotFound),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("invalid node data: {0}")]
    InvalidData(String),

    #[error("configuration error: {0}")]
    Config(String),
}

impl CoreError {
    /// Map a lookup failure into `NotFound`, leaving transport and protocol
    /// failures untouched.
    pub(crate) fn into_not_found(self, not_found: impl FnOnce() -> NotFound) -> Self {
        match self {
            Self::Rpc(rpc) if rpc.is_lookup_miss() => Self::NotFound(not_found()),
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_errors_and_http_500_are_lookup_misses() {
        let node = RpcError::Node {
            code: Some(-5),
            message: "Block not found".into(),
        };
        assert!(node.is_lookup_miss());

        let internal = RpcError::Http {
            status: 500,
            reason: "Internal Server Error".into(),
        };
        assert!(internal.is_lookup_miss());

        let unauthorized = RpcError::Http {
            status: 401,
            reason: "Unauthorized".into(),
        };
        assert!(!unauthorized.is_lookup_miss());
        assert!(!RpcError::Protocol("garbage".into()).is_lookup_miss());
    }

    #[test]
    fn into_not_found_preserves_transport_failures() {
        let err = CoreError::Rpc(RpcError::Http {
            status: 503,
            reason: "Service Unavailable".into(),
        });
        let mapped = err.into_not_found(|| NotFound::Block("abc".into()));
        assert!(matches!(
            mapped,
            CoreError::Rpc(RpcError::Http { status: 503, .. })
        ));

        let err = CoreError::Rpc(RpcError::Node {
            code: Some(-5),
            message: "Block not found".into(),
        });
        let mapped = err.into_not_found(|| NotFound::Block("abc".into()));
        assert!(matches!(mapped, CoreError::NotFound(NotFound::Block(ref h)) if h == "abc"));
    }
}
