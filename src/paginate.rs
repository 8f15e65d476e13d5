/// Current page (1-based) and page size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageState {
    pub page: usize,
    pub page_size: usize,
}

impl PageState {
    pub fn new(page_size: usize) -> Self {
        Self {
            page: 1,
            page_size: page_size.max(1),
        }
    }

    pub fn reset(&mut self) {
        self.page = 1;
    }

    /// Keeps the current page inside `[1, total_pages]`.
    pub fn clamp(&mut self, total_pages: usize) {
        self.page = self.page.clamp(1, total_pages.max(1));
    }

    /// Moves to a navigation target, clamped to the existing pages.
    pub fn target(&mut self, target: PageTarget, total_pages: usize) {
        let last = total_pages.max(1);
        self.page = match target {
            PageTarget::First => 1,
            PageTarget::Previous => self.page.saturating_sub(1),
            PageTarget::Next => self.page.saturating_add(1),
            PageTarget::Last => last,
            PageTarget::Number(n) => n,
        }
        .clamp(1, last);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageTarget {
    First,
    Previous,
    Next,
    Last,
    Number(usize),
}

/// Pagination metadata for the slice being shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PageInfo {
    pub current_page: usize,
    pub page_size: usize,
    pub total_items: usize,
    pub total_pages: usize,
    /// 1-based inclusive bounds of the shown slice, 0 when nothing is shown.
    pub range_start: usize,
    pub range_end: usize,
}

impl PageInfo {
    /// Range label such as `1-10 of 20`.
    pub fn range_label(&self) -> String {
        format!("{}-{} of {}", self.range_start, self.range_end, self.total_items)
    }
}

#[derive(Debug)]
pub struct Page<'a, T> {
    pub rows: &'a [T],
    pub info: PageInfo,
}

pub fn total_pages(total_items: usize, page_size: usize) -> usize {
    total_items.div_ceil(page_size.max(1)).max(1)
}

/// Slices the ordered sequence. The page is not clamped here, a page past the
/// end yields an empty slice.
pub fn paginate<'a, T>(rows: &'a [T], state: &PageState) -> Page<'a, T> {
    let page_size = state.page_size.max(1);
    let total_items = rows.len();
    let start = state.page.saturating_sub(1).saturating_mul(page_size);
    let visible = if start < total_items {
        &rows[start..std::cmp::min(start + page_size, total_items)]
    } else {
        &rows[0..0]
    };

    let (range_start, range_end) = if visible.is_empty() {
        (0, 0)
    } else {
        (start + 1, start + visible.len())
    };

    Page {
        rows: visible,
        info: PageInfo {
            current_page: state.page,
            page_size,
            total_items,
            total_pages: total_pages(total_items, page_size),
            range_start,
            range_end,
        },
    }
}
