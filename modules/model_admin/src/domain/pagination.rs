use listing_core::PageInfo;

use crate::contract::model::Record;
use crate::domain::error::DomainError;
use crate::domain::repo::{RecordQuery, RecordStore};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageResult {
    pub items: Vec<Record>,
    pub page: PageInfo,
}

/// Fetch one page. `requested_page` is zero-based as received from the
/// client; anything past the last page falls back to the first.
pub fn paginate(
    store: &dyn RecordStore,
    query: &RecordQuery,
    page_size: u64,
    requested_page: u64,
) -> Result<PageResult, DomainError> {
    let total = store.count(query)?;
    let num_pages = PageInfo::new(1, page_size, total).num_pages;
    let number = requested_page
        .checked_add(1)
        .filter(|n| *n <= num_pages)
        .unwrap_or(1);
    let page = PageInfo::new(number, page_size, total);
    let items = store.fetch(query, page.offset(), page.per_page)?;
    Ok(PageResult { items, page })
}
