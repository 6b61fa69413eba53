use std::ops::Range;

pub(crate) const EPISODES_PER_PAGE: usize = 30;

/// Fixed-size paging over the episode picker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct EpisodePager {
    page_size: usize,
    len: usize,
    page: usize,
}

impl EpisodePager {
    pub(crate) fn new(page_size: usize, len: usize) -> Self {
        Self {
            page_size: page_size.max(1),
            len,
            page: 0,
        }
    }

    pub(crate) fn page(&self) -> usize {
        self.page
    }

    pub(crate) fn page_count(&self) -> usize {
        self.len.div_ceil(self.page_size)
    }

    pub(crate) fn page_range(&self) -> Range<usize> {
        let start = (self.page * self.page_size).min(self.len);
        let end = (start + self.page_size).min(self.len);
        start..end
    }

    pub(crate) fn slice<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        let range = self.page_range();
        let end = range.end.min(items.len());
        let start = range.start.min(end);
        &items[start..end]
    }

    /// Moves to the page holding `index` so the picker follows playback.
    pub(crate) fn sync_to_episode(&mut self, index: usize) {
        self.page = index / self.page_size;
    }

    pub(crate) fn next_page(&mut self) {
        let last = self.page_count().saturating_sub(1);
        self.page = self.page.saturating_add(1).min(last);
    }

    pub(crate) fn prev_page(&mut self) {
        self.page = self.page.saturating_sub(1);
    }

    pub(crate) fn set_page(&mut self, page: usize) {
        let last = self.page_count().saturating_sub(1);
        self.page = page.min(last);
    }

    pub(crate) fn has_prev(&self) -> bool {
        self.page > 0
    }

    pub(crate) fn has_next(&self) -> bool {
        self.page.saturating_add(1) < self.page_count()
    }

    pub(crate) fn range_label(&self) -> String {
        let range = self.page_range();
        if range.is_empty() {
            return format!("0 - 0 / {}", self.len);
        }
        format!("{} - {} / {}", range.start + 1, range.end, self.len)
    }
}
