//! Compressed page-button sequence for paged lists.

use serde::Serialize;
use std::collections::BTreeSet;

/// Pages always shown from either end of the range.
const EDGE_PAGES: u32 = 2;

/// Pages shown on each side of the current page.
const WINDOW_RADIUS: u32 = 2;

/// Up to this many pages, every page gets a button.
const SHOW_ALL_THRESHOLD: u32 = 4;

/// One slot of the pagination bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PageItem {
    Page(u32),
    /// Stands for one or more omitted pages.
    Ellipsis,
}

/// Computes which page buttons to show.
///
/// Pages 1 and 2 and the last two pages are always included; when `current`
/// is past page 3, so is the window `current - 2 ..= current + 2`. An ellipsis
/// is placed wherever two included pages are not adjacent. With four pages or
/// fewer every page is shown.
///
/// # Examples
///
/// ```rust
/// use campus_portal::ui::pagination::{compute_visible_pages, PageItem::{Ellipsis, Page}};
///
/// assert_eq!(
///     compute_visible_pages(10, 20),
///     vec![Page(1), Page(2), Ellipsis, Page(8), Page(9), Page(10), Page(11), Page(12), Ellipsis, Page(19), Page(20)],
/// );
/// ```
#[must_use]
pub fn compute_visible_pages(current: u32, total: u32) -> Vec<PageItem> {
    if total <= SHOW_ALL_THRESHOLD {
        return (1..=total).map(PageItem::Page).collect();
    }

    let mut pages: BTreeSet<u32> = BTreeSet::new();
    pages.extend(1..=EDGE_PAGES);
    pages.extend(total - EDGE_PAGES + 1..=total);
    if current > EDGE_PAGES + 1 {
        let low = current.saturating_sub(WINDOW_RADIUS).max(1);
        let high = current.saturating_add(WINDOW_RADIUS).min(total);
        pages.extend(low..=high);
    }

    let mut items = Vec::with_capacity(pages.len() * 2);
    let mut previous: Option<u32> = None;
    for page in pages {
        if previous.is_some_and(|p| page - p > 1) {
            items.push(PageItem::Ellipsis);
        }
        items.push(PageItem::Page(page));
        previous = Some(page);
    }
    items
}

/// A rendered pagination button.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageButton {
    pub item: PageItem,
    pub is_current: bool,
}

/// Pagination bar state for a list view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaginationView {
    pub buttons: Vec<PageButton>,
    pub current: u32,
    pub total: u32,
    pub has_previous: bool,
    pub has_next: bool,
}

impl PaginationView {
    #[must_use]
    pub fn new(current: u32, total: u32) -> Self {
        let total = total.max(1);
        let current = current.clamp(1, total);
        let buttons = compute_visible_pages(current, total)
            .into_iter()
            .map(|item| PageButton {
                item,
                is_current: item == PageItem::Page(current),
            })
            .collect();
        Self {
            buttons,
            current,
            total,
            has_previous: current > 1,
            has_next: current < total,
        }
    }
}
