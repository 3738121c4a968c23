use serde::{Deserialize, Serialize};

/// Numbered-page metadata. `number` is one-based; transport layers that speak
/// zero-based page indexes convert with [`PageInfo::previous_index`] and
/// [`PageInfo::next_index`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageInfo {
    pub number: u64,
    pub num_pages: u64,
    pub per_page: u64,
    pub total_count: u64,
    pub has_previous: bool,
    pub has_next: bool,
}

impl PageInfo {
    /// `num_pages` is never below one, even for an empty result.
    pub fn new(number: u64, per_page: u64, total_count: u64) -> Self {
        let per_page = per_page.max(1);
        let num_pages = total_count.div_ceil(per_page).max(1);
        let number = number.clamp(1, num_pages);
        Self {
            number,
            num_pages,
            per_page,
            total_count,
            has_previous: number > 1,
            has_next: number < num_pages,
        }
    }

    /// Zero-based offset of the first item on this page.
    pub fn offset(&self) -> u64 {
        (self.number - 1) * self.per_page
    }

    /// Zero-based index of the previous page, if any.
    pub fn previous_index(&self) -> Option<u64> {
        self.has_previous.then(|| self.number - 2)
    }

    /// Zero-based index of the next page, if any.
    pub fn next_index(&self) -> Option<u64> {
        self.has_next.then_some(self.number)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page_info: PageInfo,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, page_info: PageInfo) -> Self {
        Self { items, page_info }
    }

    /// First (and only) page of an empty result.
    pub fn empty(per_page: u64) -> Self {
        Self {
            items: Vec::new(),
            page_info: PageInfo::new(1, per_page, 0),
        }
    }

    /// Map items while preserving page_info (Domain->DTO mapping convenience)
    pub fn map_items<U>(self, mut f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(&mut f).collect(),
            page_info: self.page_info,
        }
    }
}
