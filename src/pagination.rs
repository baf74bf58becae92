//! Page math shared by the notes, transcript and analytics lists.

use std::ops::Range;

pub const NOTES_PER_PAGE: usize = 6;
pub const TRANSCRIPTS_PER_PAGE: usize = 3;
pub const ATTEMPTS_PER_PAGE: usize = 4;

const MAX_VISIBLE_PAGES: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageItem {
    Page(usize),
    Ellipsis,
}

/// A 1-based page over `total_items`. The current page is clamped into
/// `1..=total_pages` so a shrinking list never leaves an empty page showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    current: usize,
    total_items: usize,
    per_page: usize,
}

impl Pagination {
    pub fn new(current_page: usize, total_items: usize, items_per_page: usize) -> Self {
        let per_page = items_per_page.max(1);
        let total_pages = total_items.div_ceil(per_page).max(1);
        Self {
            current: current_page.clamp(1, total_pages),
            total_items,
            per_page,
        }
    }

    pub fn current_page(&self) -> usize {
        self.current
    }

    pub fn total_items(&self) -> usize {
        self.total_items
    }

    pub fn total_pages(&self) -> usize {
        self.total_items.div_ceil(self.per_page)
    }

    /// 0-based slice bounds of the current page.
    pub fn range(&self) -> Range<usize> {
        let start = ((self.current - 1) * self.per_page).min(self.total_items);
        let end = (start + self.per_page).min(self.total_items);
        start..end
    }

    /// 1-based index of the first item shown, 0 when empty.
    pub fn start_item(&self) -> usize {
        if self.total_items == 0 {
            0
        } else {
            self.range().start + 1
        }
    }

    pub fn end_item(&self) -> usize {
        self.range().end
    }

    pub fn slice<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        let range = self.range();
        let end = range.end.min(items.len());
        &items[range.start.min(end)..end]
    }

    pub fn is_visible(&self) -> bool {
        self.total_pages() > 1
    }

    pub fn has_previous(&self) -> bool {
        self.current > 1
    }

    pub fn has_next(&self) -> bool {
        self.current < self.total_pages()
    }

    pub fn previous(&self) -> Self {
        Self::new(self.current.saturating_sub(1), self.total_items, self.per_page)
    }

    pub fn next(&self) -> Self {
        Self::new(self.current + 1, self.total_items, self.per_page)
    }

    pub fn visible_pages(&self) -> Vec<PageItem> {
        use PageItem::{Ellipsis, Page};

        let total = self.total_pages();
        let current = self.current;

        if total <= MAX_VISIBLE_PAGES {
            return (1..=total).map(Page).collect();
        }
        if current <= 3 {
            return vec![Page(1), Page(2), Page(3), Page(4), Ellipsis, Page(total)];
        }
        if current >= total - 2 {
            return vec![
                Page(1),
                Ellipsis,
                Page(total - 3),
                Page(total - 2),
                Page(total - 1),
                Page(total),
            ];
        }
        vec![
            Page(1),
            Ellipsis,
            Page(current - 1),
            Page(current),
            Page(current + 1),
            Ellipsis,
            Page(total),
        ]
    }

    /// "Showing X to Y of Z notes"
    pub fn summary(&self, item_name: &str) -> String {
        format!(
            "Showing {} to {} of {} {}",
            self.start_item(),
            self.end_item(),
            self.total_items,
            item_name
        )
    }
}
