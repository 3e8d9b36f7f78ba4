//! View model types representing renderable UI state.
//!
//! This module defines the intermediate representation between application state
//! and rendered output. View models are computed by `AppState` and consumed by the
//! renderer, decoupling state shape from presentation.
//!
//! # Architecture
//!
//! ```text
//! AppState → compute_list_viewmodel → ListViewModel → render_list → text
//! ```
//!
//! View models are immutable snapshots containing only the data needed for one
//! frame: the items of the current page with their search highlights, the
//! pagination bar, and whichever of the loading, error or empty indicators
//! applies.

use super::pagination::PaginationView;
use crate::domain::{Course, TeacherSummary};
use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;
use serde::Serialize;

/// Complete renderable state of a paged list screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListViewModel {
    pub header: HeaderInfo,

    pub search_bar: SearchBarInfo,

    /// Items of the current page, in backend order.
    pub display_items: Vec<DisplayItem>,

    /// Absent until the first page has loaded.
    pub pagination: Option<PaginationView>,

    /// A request for this list is in flight.
    pub loading: bool,

    /// Shown only when the list has never loaded; later failures keep the
    /// previous page on screen.
    pub error: Option<String>,

    /// Set when a loaded page has no items.
    pub empty_state: Option<EmptyState>,
}

/// A single row of a list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayItem {
    /// Backend id, used to build the detail route.
    pub id: String,

    pub title: String,

    pub subtitle: Option<String>,

    /// Character ranges `(start, end)` of `title` matched by the active search
    /// term. Empty when no search is active or nothing matched.
    pub highlight_ranges: Vec<(usize, usize)>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeaderInfo {
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmptyState {
    pub message: String,

    pub subtitle: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchBarInfo {
    /// Text as typed, including keystrokes not yet committed.
    pub input: String,

    /// Term the displayed results were fetched with.
    pub committed: String,
}

impl SearchBarInfo {
    /// Typed text differs from what the results reflect.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.input != self.committed
    }
}

/// Something that can be shown as a list row.
pub trait Listable {
    fn id(&self) -> &str;
    fn title(&self) -> &str;
    fn subtitle(&self) -> Option<String> {
        None
    }
}

impl Listable for Course {
    fn id(&self) -> &str {
        &self.id
    }

    fn title(&self) -> &str {
        &self.name
    }
}

impl Listable for TeacherSummary {
    fn id(&self) -> &str {
        &self.id
    }

    fn title(&self) -> &str {
        &self.name
    }

    fn subtitle(&self) -> Option<String> {
        (!self.title.trim().is_empty()).then(|| self.title.clone())
    }
}

/// Builds the rows for `items`, highlighting matches of `term`.
pub fn display_items<T: Listable>(items: &[T], term: &str) -> Vec<DisplayItem> {
    let term = term.trim();
    let matcher = (!term.is_empty()).then(SkimMatcherV2::default);

    items
        .iter()
        .map(|item| DisplayItem {
            id: item.id().to_string(),
            title: item.title().to_string(),
            subtitle: item.subtitle(),
            highlight_ranges: matcher
                .as_ref()
                .map_or_else(Vec::new, |m| compute_highlight_ranges(item.title(), term, m)),
        })
        .collect()
}

/// Computes character index ranges to highlight for a fuzzy match of `term`.
///
/// Consecutive matched indices are coalesced into `(start, end)` ranges with an
/// exclusive end.
#[must_use]
pub fn compute_highlight_ranges(
    text: &str,
    term: &str,
    matcher: &SkimMatcherV2,
) -> Vec<(usize, usize)> {
    let Some((_score, indices)) = matcher.fuzzy_indices(text, term) else {
        return vec![];
    };

    let mut ranges: Vec<(usize, usize)> = Vec::new();
    for idx in indices {
        match ranges.last_mut() {
            Some((_, end)) if *end == idx => *end = idx + 1,
            _ => ranges.push((idx, idx + 1)),
        }
    }
    ranges
}

#[cfg(test)]
mod tests {
    use super::*;

    fn course(id: &str, name: &str) -> Course {
        Course {
            id: id.into(),
            name: name.into(),
        }
    }

    #[test]
    fn contiguous_matches_form_one_range() {
        let matcher = SkimMatcherV2::default();
        assert_eq!(
            compute_highlight_ranges("Data Structures", "data", &matcher),
            vec![(0, 4)]
        );
    }

    #[test]
    fn no_match_yields_no_ranges() {
        let matcher = SkimMatcherV2::default();
        assert!(compute_highlight_ranges("Calculus", "xyz", &matcher).is_empty());
    }

    #[test]
    fn blank_term_disables_highlighting() {
        let rows = display_items(&[course("c1", "Algorithms")], "  ");
        assert_eq!(rows.len(), 1);
        assert!(rows[0].highlight_ranges.is_empty());
        assert_eq!(rows[0].id, "c1");
    }

    #[test]
    fn teacher_rows_carry_title_as_subtitle() {
        let teacher = TeacherSummary {
            id: "t1".into(),
            name: "Grace Hopper".into(),
            title: "Professor".into(),
            image_base64: None,
        };
        let rows = display_items(&[teacher], "grace");
        assert_eq!(rows[0].subtitle.as_deref(), Some("Professor"));
        assert_eq!(rows[0].highlight_ranges, vec![(0, 5)]);
    }

    #[test]
    fn dirty_search_bar() {
        let bar = SearchBarInfo {
            input: "alg".into(),
            committed: "al".into(),
        };
        assert!(bar.is_dirty());
    }
}
