use crate::error::RpcError;

/// Message used when the node reports an error without one.
const DEFAULT_ERROR_MESSAGE: &str = "RPC Error";

#[derive(serde::Serialize)]
pub(super) struct JsonRpcRequest<'a> {
    pub(super) jsonrpc: &'static str,
    pub(super) id: u64,
    pub(super) method: &'a str,
    pub(super) params: Vec<serde_json::Value>,
}

/// Response envelope. `null` and absent fields are both `None`.
pub(super) struct JsonRpcResponse {
    pub(super) result: Option<serde_json::Value>,
    pub(super) error: Option<serde_json::Value>,
}

/// Decode a response body; anything other than a JSON object is a protocol
/// failure.
pub(super) fn decode_envelope(body: &str) -> Result<JsonRpcResponse, RpcError> {
    let value: serde_json::Value = serde_json::from_str(body)
        .map_err(|e| RpcError::Protocol(format!("decode JSON-RPC response: {e}; body={body}")))?;
    let serde_json::Value::Object(mut envelope) = value else {
        return Err(RpcError::Protocol(format!(
            "JSON-RPC response is not an object; body={body}"
        )));
    };

    let non_null = |v: Option<serde_json::Value>| v.filter(|v| !v.is_null());
    Ok(JsonRpcResponse {
        result: non_null(envelope.remove("result")),
        error: non_null(envelope.remove("error")),
    })
}

/// Parse a non-null JSON-RPC `error` value.
///
/// The node sends `{"code": <int>, "message": <string>}`; either part may be
/// missing, and a bare string is taken as the message.
pub(super) fn parse_jsonrpc_error(err: serde_json::Value) -> RpcError {
    match err {
        serde_json::Value::String(message) if !message.is_empty() => RpcError::Node {
            code: None,
            message,
        },
        other => {
            let code = other.get("code").and_then(serde_json::Value::as_i64);
            let message = other
                .get("message")
                .and_then(serde_json::Value::as_str)
                .filter(|m| !m.is_empty())
                .unwrap_or(DEFAULT_ERROR_MESSAGE)
                .to_owned();
            RpcError::Node { code, message }
        }
    }
}
