/// Shortest address length the explorer recognises.
pub const MIN_ADDRESS_LEN: usize = 26;
/// Longest address length the explorer recognises.
pub const MAX_ADDRESS_LEN: usize = 35;

/// A free-text search query after classification.
///
/// Rules apply to the trimmed input, in order: all digits is a height; 64 hex
/// characters is a block or transaction hash; 26 to 35 characters is an
/// address; anything else is invalid. Numeric strings are never hashes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchQuery {
    /// `None` when the digits overflow a block height. Such a query can never
    /// match a block and resolves to "not found".
    Height(Option<u32>),
    BlockOrTx(String),
    Address(String),
    Invalid(String),
}

impl SearchQuery {
    pub fn classify(input: &str) -> Self {
        let q = input.trim();
        if !q.is_empty() && q.bytes().all(|b| b.is_ascii_digit()) {
            return Self::Height(q.parse().ok());
        }
        if q.len() == 64 && q.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Self::BlockOrTx(q.to_ascii_lowercase());
        }
        if (MIN_ADDRESS_LEN..=MAX_ADDRESS_LEN).contains(&q.chars().count()) {
            return Self::Address(q.to_owned());
        }
        Self::Invalid(q.to_owned())
    }
}
