use std::ops::RangeInclusive;

use crate::error::CoreError;
use crate::types::BlockHeight;

/// Heights shown on `page` (1-based) of the descending block list.
///
/// `end = tip - (page - 1) * page_size`, `start = max(0, end - page_size + 1)`.
/// Returns `Ok(None)` when `end` would fall below genesis.
pub fn page_window(
    tip: BlockHeight,
    page: u32,
    page_size: u32,
) -> Result<Option<RangeInclusive<u32>>, CoreError> {
    validate(page, page_size)?;

    let offset = u64::from(page - 1) * u64::from(page_size);
    let Some(end) = u64::from(tip.0).checked_sub(offset) else {
        return Ok(None);
    };
    let start = end.saturating_sub(u64::from(page_size) - 1);

    // Both bounds are at most `tip`, which is a u32.
    Ok(Some(start as u32..=end as u32))
}

/// `ceil(tip / page_size)`.
pub fn total_pages(tip: BlockHeight, page_size: u32) -> Result<u32, CoreError> {
    validate(1, page_size)?;
    Ok(tip.0.div_ceil(page_size))
}

fn validate(page: u32, page_size: u32) -> Result<(), CoreError> {
    if page == 0 {
        return Err(CoreError::InvalidInput("page numbers start at 1".to_owned()));
    }
    if page_size == 0 {
        return Err(CoreError::InvalidInput(
            "page size must be at least 1".to_owned(),
        ));
    }
    Ok(())
}
