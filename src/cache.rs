use std::collections::VecDeque;
use std::sync::Arc;
use tracing::trace;

use crate::view::PageView;

/// Upper bound on cached pages.
pub const PAGE_CACHE_LIMIT: usize = 10;

/// Cache key. The filtered-set size stands in for content identity, which is
/// why every content mutation must go through `invalidate()` instead of
/// relying on key misses.
pub type PageKey = (usize, usize, usize);

pub fn page_key(page: usize, page_size: usize, nrows: usize) -> PageKey {
    (page, page_size, nrows)
}

/// Bounded memo of rendered pages with FIFO eviction. Insertion order is the
/// eviction order, access recency plays no role.
#[derive(Debug, Default)]
pub struct PageCache {
    entries: VecDeque<(PageKey, Arc<PageView>)>,
}

impl PageCache {
    pub fn get(&self, key: PageKey) -> Option<Arc<PageView>> {
        self.entries
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, page)| Arc::clone(page))
    }

    pub fn contains(&self, key: PageKey) -> bool {
        self.entries.iter().any(|(k, _)| *k == key)
    }

    pub fn put(&mut self, key: PageKey, page: Arc<PageView>) {
        if self.contains(key) {
            return;
        }
        if self.entries.len() == PAGE_CACHE_LIMIT {
            if let Some((evicted, _)) = self.entries.pop_front() {
                trace!("Evicting cached page {evicted:?}");
            }
        }
        self.entries.push_back((key, page));
    }

    /// Drop everything. Called whenever the filtered set's contents change
    /// (filter, search, sort, column visibility); pagination alone never
    /// invalidates.
    pub fn invalidate(&mut self) {
        trace!("Invalidating {} cached pages", self.entries.len());
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(n: usize) -> Arc<PageView> {
        Arc::new(PageView {
            cards: Vec::new(),
            page: n,
            total_pages: 99,
        })
    }

    #[test]
    fn get_put_roundtrip() {
        let mut cache = PageCache::default();
        let key = page_key(1, 24, 100);
        assert!(cache.get(key).is_none());
        cache.put(key, page(1));
        assert_eq!(cache.get(key).unwrap().page, 1);
    }

    #[test]
    fn bounded_with_fifo_eviction() {
        let mut cache = PageCache::default();
        for n in 0..PAGE_CACHE_LIMIT {
            cache.put(page_key(n, 24, 100), page(n));
        }
        assert_eq!(cache.len(), PAGE_CACHE_LIMIT);

        // Touch the oldest entry; FIFO ignores access recency.
        assert!(cache.get(page_key(0, 24, 100)).is_some());

        cache.put(page_key(PAGE_CACHE_LIMIT, 24, 100), page(PAGE_CACHE_LIMIT));
        assert_eq!(cache.len(), PAGE_CACHE_LIMIT);
        assert!(cache.get(page_key(0, 24, 100)).is_none());
        assert!(cache.get(page_key(1, 24, 100)).is_some());
    }

    #[test]
    fn duplicate_put_is_ignored() {
        let mut cache = PageCache::default();
        let key = page_key(1, 24, 100);
        cache.put(key, page(1));
        cache.put(key, page(2));
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get(key).unwrap().page, 1);
    }

    #[test]
    fn invalidate_clears_everything() {
        let mut cache = PageCache::default();
        cache.put(page_key(1, 24, 100), page(1));
        cache.put(page_key(2, 24, 100), page(2));
        cache.invalidate();
        assert!(cache.is_empty());
    }
}
