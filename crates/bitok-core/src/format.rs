//! Display helpers shared by every renderer.

use bitcoin::{Amount, SignedAmount};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

/// Ticker shown after coin amounts.
pub const COIN_TICKER: &str = "BITOK";

const SECS_PER_MINUTE: u64 = 60;
const SECS_PER_HOUR: u64 = 3_600;
const SECS_PER_DAY: u64 = 86_400;
/// Ages of 30 days or more are shown as a date.
const SECS_PER_MONTH: u64 = 2_592_000;

/// `1.50000000 BITOK`.
pub fn format_coin(amount: Amount) -> String {
    format!("{:.8} {COIN_TICKER}", amount.to_btc())
}

/// `-0.00050000 BITOK`.
pub fn format_signed_coin(amount: SignedAmount) -> String {
    format!("{:.8} {COIN_TICKER}", amount.to_btc())
}

/// Two decimals in the largest unit up to GH/s.
pub fn format_hashrate(hashes_per_sec: f64) -> String {
    if hashes_per_sec < 1e3 {
        format!("{hashes_per_sec:.2} H/s")
    } else if hashes_per_sec < 1e6 {
        format!("{:.2} KH/s", hashes_per_sec / 1e3)
    } else if hashes_per_sec < 1e9 {
        format!("{:.2} MH/s", hashes_per_sec / 1e6)
    } else {
        format!("{:.2} GH/s", hashes_per_sec / 1e9)
    }
}

/// First ten and last ten characters joined by `...`. Short inputs are
/// returned unchanged.
pub fn truncate_hash(hash: &str) -> String {
    if hash.len() <= 23 || !hash.is_ascii() {
        return hash.to_owned();
    }
    format!("{}...{}", &hash[..10], &hash[hash.len() - 10..])
}

/// Relative age of `timestamp` as seen at `now` (both unix seconds).
pub fn format_age(timestamp: u64, now: u64) -> String {
    let diff = now.saturating_sub(timestamp);
    if diff < SECS_PER_MINUTE {
        format!("{diff}s ago")
    } else if diff < SECS_PER_HOUR {
        format!("{}m ago", diff / SECS_PER_MINUTE)
    } else if diff < SECS_PER_DAY {
        format!("{}h ago", diff / SECS_PER_HOUR)
    } else if diff < SECS_PER_MONTH {
        format!("{}d ago", diff / SECS_PER_DAY)
    } else {
        format_date(timestamp)
    }
}

/// Current unix time in seconds.
pub fn unix_now() -> u64 {
    OffsetDateTime::now_utc().unix_timestamp().max(0) as u64
}

/// [`format_age`] against the system clock.
pub fn format_age_now(timestamp: u64) -> String {
    format_age(timestamp, unix_now())
}

/// `YYYY-MM-DD` in UTC.
pub fn format_date(timestamp: u64) -> String {
    match to_datetime(timestamp) {
        Some(dt) => dt.date().to_string(),
        None => timestamp.to_string(),
    }
}

/// RFC 3339 in UTC, falling back to the raw number for out-of-range values.
pub fn format_timestamp(timestamp: u64) -> String {
    to_datetime(timestamp)
        .and_then(|dt| dt.format(&Rfc3339).ok())
        .unwrap_or_else(|| timestamp.to_string())
}

fn to_datetime(timestamp: u64) -> Option<OffsetDateTime> {
    let secs = i64::try_from(timestamp).ok()?;
    OffsetDateTime::from_unix_timestamp(secs).ok()
}
