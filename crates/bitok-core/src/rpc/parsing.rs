use bitcoin::{Amount, Denomination, SignedAmount};
use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer};

use crate::error::CoreError;

/// Decode an RPC `result` value into a typed entity.
pub(crate) fn decode<T: DeserializeOwned>(
    raw: serde_json::Value,
    method: &str,
) -> Result<T, CoreError> {
    serde_json::from_value(raw)
        .map_err(|e| CoreError::InvalidData(format!("invalid {method} result: {e}")))
}

/// Parse a BTC amount from a JSON value.
///
/// Number values are parsed via `Amount::from_float_in` to support scientific
/// notation, while string values are parsed via `Amount::from_str_in`.
pub(crate) fn parse_btc_amount(value: &serde_json::Value) -> Result<Amount, CoreError> {
    match value {
        serde_json::Value::Number(n) => {
            let parsed = n
                .as_f64()
                .ok_or_else(|| CoreError::InvalidData(format!("invalid BTC amount `{value}`")))?;
            Amount::from_float_in(parsed, Denomination::Bitcoin)
                .map_err(|e| CoreError::InvalidData(format!("invalid BTC amount `{value}`: {e}")))
        }
        serde_json::Value::String(s) => Amount::from_str_in(s, Denomination::Bitcoin)
            .map_err(|e| CoreError::InvalidData(format!("invalid BTC amount `{s}`: {e}"))),
        _ => Err(CoreError::InvalidData(format!(
            "expected numeric BTC amount, got: {value}"
        ))),
    }
}

/// Signed variant of [`parse_btc_amount`]; wallet amounts and fees go negative
/// for outgoing transactions.
pub(crate) fn parse_signed_btc_amount(
    value: &serde_json::Value,
) -> Result<SignedAmount, CoreError> {
    match value {
        serde_json::Value::Number(n) => {
            let parsed = n
                .as_f64()
                .ok_or_else(|| CoreError::InvalidData(format!("invalid BTC amount `{value}`")))?;
            SignedAmount::from_float_in(parsed, Denomination::Bitcoin)
                .map_err(|e| CoreError::InvalidData(format!("invalid BTC amount `{value}`: {e}")))
        }
        serde_json::Value::String(s) => SignedAmount::from_str_in(s, Denomination::Bitcoin)
            .map_err(|e| CoreError::InvalidData(format!("invalid BTC amount `{s}`: {e}"))),
        _ => Err(CoreError::InvalidData(format!(
            "expected numeric BTC amount, got: {value}"
        ))),
    }
}

// ==============================================================================
// Serde Adapters
// ==============================================================================

pub(crate) fn btc_amount<'de, D>(deserializer: D) -> Result<Amount, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    parse_btc_amount(&value).map_err(D::Error::custom)
}

pub(crate) fn signed_btc_amount<'de, D>(deserializer: D) -> Result<SignedAmount, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    parse_signed_btc_amount(&value).map_err(D::Error::custom)
}

/// Missing and `null` both decode to `None`; pair with `#[serde(default)]`.
pub(crate) fn opt_signed_btc_amount<'de, D>(
    deserializer: D,
) -> Result<Option<SignedAmount>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<serde_json::Value>::deserialize(deserializer)? {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(value) => parse_signed_btc_amount(&value)
            .map(Some)
            .map_err(D::Error::custom),
    }
}

// ==============================================================================
// Integer Helpers
// ==============================================================================

pub(crate) fn parse_integer_required<T>(
    value: &serde_json::Value,
    field: &str,
) -> Result<T, CoreError>
where
    T: TryFrom<u64>,
{
    let n = value
        .as_u64()
        .ok_or_else(|| CoreError::InvalidData(format!("missing {field}")))?;
    T::try_from(n).map_err(|_| CoreError::InvalidData(format!("{field} out of range: {n}")))
}
