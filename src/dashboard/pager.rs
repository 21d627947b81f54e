/// Fixed server page size for the message table.
pub const PAGE_SIZE: u32 = 20;

/// Tracks the page in view. The server total is not tracked per page, so
/// "more pages exist" is a heuristic: a full page suggests more data, an
/// under-full page is treated as the last one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pager {
    current_page: u32,
    last_page_len: usize,
}

impl Default for Pager {
    fn default() -> Self {
        Self {
            current_page: 1,
            last_page_len: 0,
        }
    }
}

impl Pager {
    pub fn current_page(&self) -> u32 {
        self.current_page
    }

    pub fn offset(&self) -> u32 {
        (self.current_page - 1) * PAGE_SIZE
    }

    /// Remember the size of a fetched page, if it is still the one in view.
    pub fn record_page(&mut self, page: u32, len: usize) {
        if page == self.current_page {
            self.last_page_len = len;
        }
    }

    pub fn can_go_previous(&self) -> bool {
        self.current_page > 1
    }

    /// Enablement heuristic only; `next_page` is not bounded by it.
    pub fn can_go_next(&self) -> bool {
        self.last_page_len == PAGE_SIZE as usize
    }

    /// Always advances; the caller must re-fetch for the returned page.
    pub fn next_page(&mut self) -> u32 {
        self.current_page += 1;
        self.current_page
    }

    /// Returns the page to re-fetch, or `None` when already on page 1
    /// (no decrement, no fetch).
    pub fn previous_page(&mut self) -> Option<u32> {
        if self.current_page > 1 {
            self.current_page -= 1;
            Some(self.current_page)
        } else {
            None
        }
    }

    pub fn go_to_page(&mut self, page: u32) -> u32 {
        self.current_page = page.max(1);
        self.current_page
    }

    pub fn reset(&mut self) {
        self.go_to_page(1);
    }
}

#[cfg(test)]
mod tests {
    use super::{Pager, PAGE_SIZE};

    #[test]
    fn previous_page_is_a_no_op_on_page_one() {
        let mut pager = Pager::default();
        assert_eq!(pager.previous_page(), None);
        assert_eq!(pager.current_page(), 1);
        assert!(!pager.can_go_previous());
    }

    #[test]
    fn full_page_enables_next_and_advancing_updates_offset() {
        let mut pager = Pager::default();
        pager.record_page(1, PAGE_SIZE as usize);
        assert!(pager.can_go_next());

        let page = pager.next_page();
        assert_eq!(page, 2);
        assert_eq!(pager.offset(), 20);
    }

    #[test]
    fn under_full_page_is_treated_as_the_last_one() {
        let mut pager = Pager::default();
        pager.record_page(1, 5);
        assert!(!pager.can_go_next());
    }

    #[test]
    fn stale_page_size_reports_are_ignored() {
        let mut pager = Pager::default();
        pager.next_page();
        pager.record_page(1, PAGE_SIZE as usize);
        assert!(!pager.can_go_next(), "page 1 result arrived after moving to page 2");
    }

    #[test]
    fn navigation_round_trip() {
        let mut pager = Pager::default();
        pager.record_page(1, PAGE_SIZE as usize);
        pager.next_page();
        assert_eq!(pager.previous_page(), Some(1));
        assert_eq!(pager.current_page(), 1);

        pager.go_to_page(0);
        assert_eq!(pager.current_page(), 1, "pages start at 1");

        pager.reset();
        assert_eq!(pager.current_page(), 1);
    }
}
