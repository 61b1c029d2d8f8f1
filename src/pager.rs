use tracing::trace;

/// Selectable page sizes, cycled from the UI.
pub const PAGE_SIZES: [usize; 4] = [12, 24, 48, 96];

/// 1-based pagination over the filtered view. Every navigation operation
/// routes through the same clamp, so an out-of-range page is never
/// observable.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageState {
    page: usize,
    page_size: usize,
}

impl PageState {
    pub fn new(page_size: usize) -> Self {
        PageState {
            page: 1,
            page_size: page_size.max(1),
        }
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn total_pages(&self, nrows: usize) -> usize {
        nrows.div_ceil(self.page_size).max(1)
    }

    /// Jump to a page, silently clamping to `[1, total_pages]`.
    pub fn goto(&mut self, page: i64, nrows: usize) {
        let total = self.total_pages(nrows) as i64;
        self.page = page.clamp(1, total) as usize;
        trace!("Page {}/{}", self.page, total);
    }

    pub fn first(&mut self) {
        self.page = 1;
    }

    pub fn last(&mut self, nrows: usize) {
        self.page = self.total_pages(nrows);
    }

    pub fn next(&mut self, nrows: usize) {
        self.goto(self.page as i64 + 1, nrows);
    }

    pub fn previous(&mut self, nrows: usize) {
        self.goto(self.page as i64 - 1, nrows);
    }

    /// Changing the page size always resets to the first page.
    pub fn set_page_size(&mut self, page_size: usize) {
        self.page_size = page_size.max(1);
        self.page = 1;
    }

    pub fn cycle_page_size(&mut self) {
        let next = PAGE_SIZES
            .iter()
            .position(|&s| s == self.page_size)
            .map(|i| PAGE_SIZES[(i + 1) % PAGE_SIZES.len()])
            .unwrap_or(PAGE_SIZES[0]);
        self.set_page_size(next);
    }

    /// Re-clamp after the filtered set changed size.
    pub fn reclamp(&mut self, nrows: usize) {
        self.goto(self.page as i64, nrows);
    }

    /// The current page window of the view. Empty only for an empty view.
    pub fn slice<'a>(&self, view: &'a [usize]) -> &'a [usize] {
        let start = (self.page - 1) * self.page_size;
        let end = (start + self.page_size).min(view.len());
        if start >= view.len() {
            &[]
        } else {
            &view[start..end]
        }
    }
}
