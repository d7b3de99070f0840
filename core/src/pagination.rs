//! Visible page-range computation for pagination controls.
//!
//! # Design
//! The page list is a pure function of `(current_page, last_page, delta)`.
//! Page 1 and the last page are fixed anchors; between them sits a window of
//! `delta` pages on either side of the current page. A gap between an anchor
//! and the window collapses into a single `Ellipsis`, which is only emitted
//! when it hides at least one page.
//!
//! Inputs come from the remote API's pagination metadata and from the
//! `?page=` query string, so they are clamped rather than trusted: a stale
//! URL after the list shrank must degrade to a valid control, never panic.

use serde::Serialize;

/// Pages shown on each side of the current page.
pub const DEFAULT_DELTA: u64 = 2;

/// One rendered unit of a pagination control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageMarker {
    Page(u64),
    Ellipsis,
}

/// Pages serialize as numbers and gaps as `"..."`.
impl Serialize for PageMarker {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            PageMarker::Page(page) => serializer.serialize_u64(*page),
            PageMarker::Ellipsis => serializer.serialize_str("..."),
        }
    }
}

/// Clamp raw page numbers into `1 <= current <= last`.
pub fn clamp_pages(current_page: i64, last_page: i64) -> (u64, u64) {
    let last = last_page.max(1) as u64;
    let current = current_page.clamp(1, last as i64) as u64;
    (current, last)
}

/// Compute the ordered markers for a pagination control.
///
/// Returns an empty vector when there is a single page: the control is
/// hidden entirely.
pub fn compute_markers(current_page: i64, last_page: i64, delta: u64) -> Vec<PageMarker> {
    let (current, last) = clamp_pages(current_page, last_page);
    if last <= 1 {
        return Vec::new();
    }

    let window_start = current.saturating_sub(delta).max(2);
    let window_end = current.saturating_add(delta).min(last - 1);

    let window_len = (window_end + 1).saturating_sub(window_start) as usize;
    let mut markers = Vec::with_capacity(window_len + 4);
    markers.push(PageMarker::Page(1));
    if current.saturating_sub(delta) > 2 {
        markers.push(PageMarker::Ellipsis);
    }
    markers.extend((window_start..=window_end).map(PageMarker::Page));
    if current.saturating_add(delta) < last - 1 {
        markers.push(PageMarker::Ellipsis);
    }
    markers.push(PageMarker::Page(last));
    markers
}

/// Target page for an activated marker, if activating it navigates anywhere.
pub fn on_marker_activated(marker: PageMarker, current_page: u64) -> Option<u64> {
    match marker {
        PageMarker::Page(page) if page != current_page => Some(page),
        _ => None,
    }
}

/// Parse the `?page=` query parameter. Absent or malformed values mean page 1.
pub fn parse_page_param(raw: Option<&str>) -> i64 {
    raw.and_then(|value| value.trim().parse::<i64>().ok())
        .unwrap_or(1)
}

/// Pagination metadata for one page of a collection, already clamped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationState {
    pub current_page: u64,
    pub last_page: u64,
    pub total: u64,
    pub per_page: u64,
    pub from: u64,
    pub to: u64,
}

impl PaginationState {
    pub fn new(current_page: i64, last_page: i64, total: u64, per_page: u64, from: u64, to: u64) -> Self {
        let (current_page, last_page) = clamp_pages(current_page, last_page);
        let (from, to) = if total == 0 { (0, 0) } else { (from.min(to), to.min(total)) };
        Self {
            current_page,
            last_page,
            total,
            per_page: per_page.max(1),
            from,
            to,
        }
    }

    /// Whether the controls are rendered at all.
    pub fn is_paginated(&self) -> bool {
        self.last_page > 1
    }

    /// `None` when "previous" is disabled.
    pub fn previous_page(&self) -> Option<u64> {
        (self.current_page > 1).then(|| self.current_page - 1)
    }

    /// `None` when "next" is disabled.
    pub fn next_page(&self) -> Option<u64> {
        (self.current_page < self.last_page).then(|| self.current_page + 1)
    }
}

/// Everything a renderer needs to draw one pagination control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageControls {
    pub current_page: u64,
    pub previous: Option<u64>,
    pub next: Option<u64>,
    pub markers: Vec<PageMarker>,
}

impl PageControls {
    pub fn activate(&self, marker: PageMarker) -> Option<u64> {
        on_marker_activated(marker, self.current_page)
    }

    pub fn is_hidden(&self) -> bool {
        self.markers.is_empty()
    }
}

/// Builds `PageControls` with a configurable neighborhood width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paginator {
    delta: u64,
}

impl Default for Paginator {
    fn default() -> Self {
        Self { delta: DEFAULT_DELTA }
    }
}

impl Paginator {
    pub fn new(delta: u64) -> Self {
        Self { delta }
    }

    pub fn delta(&self) -> u64 {
        self.delta
    }

    pub fn markers(&self, state: &PaginationState) -> Vec<PageMarker> {
        compute_markers(state.current_page as i64, state.last_page as i64, self.delta)
    }

    pub fn controls(&self, state: &PaginationState) -> PageControls {
        PageControls {
            current_page: state.current_page,
            previous: state.previous_page(),
            next: state.next_page(),
            markers: self.markers(state),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use PageMarker::{Ellipsis, Page};

    #[test]
    fn single_page_hides_controls() {
        assert!(compute_markers(1, 1, DEFAULT_DELTA).is_empty());
        assert!(compute_markers(7, 1, DEFAULT_DELTA).is_empty());
    }

    #[test]
    fn two_pages_have_no_window() {
        assert_eq!(compute_markers(1, 2, 2), vec![Page(1), Page(2)]);
        assert_eq!(compute_markers(2, 2, 2), vec![Page(1), Page(2)]);
    }

    #[test]
    fn first_page_of_five() {
        assert_eq!(
            compute_markers(1, 5, 2),
            vec![Page(1), Page(2), Page(3), Ellipsis, Page(5)]
        );
    }

    #[test]
    fn middle_page_has_both_ellipses() {
        assert_eq!(
            compute_markers(5, 10, 2),
            vec![Page(1), Ellipsis, Page(3), Page(4), Page(5), Page(6), Page(7), Ellipsis, Page(10)]
        );
    }

    #[test]
    fn last_page_of_ten() {
        assert_eq!(
            compute_markers(10, 10, 2),
            vec![Page(1), Ellipsis, Page(8), Page(9), Page(10)]
        );
    }

    #[test]
    fn window_touching_both_anchors() {
        assert_eq!(
            compute_markers(3, 5, 2),
            vec![Page(1), Page(2), Page(3), Page(4), Page(5)]
        );
    }

    #[test]
    fn gap_of_one_page_is_shown_not_collapsed() {
        // current - delta == 2: page 2 is adjacent to the anchor, no ellipsis.
        assert_eq!(compute_markers(4, 7, 2)[..3], [Page(1), Page(2), Page(3)]);
        // current - delta == 3: page 2 is hidden behind an ellipsis.
        assert_eq!(compute_markers(5, 7, 2)[..3], [Page(1), Ellipsis, Page(3)]);
    }

    #[test]
    fn out_of_range_inputs_are_clamped() {
        assert_eq!(compute_markers(0, 5, 2), compute_markers(1, 5, 2));
        assert_eq!(compute_markers(-3, 5, 2), compute_markers(1, 5, 2));
        assert_eq!(compute_markers(42, 10, 2), compute_markers(10, 10, 2));
        assert!(compute_markers(3, -1, 2).is_empty());
        assert!(compute_markers(3, 0, 2).is_empty());
    }

    #[test]
    fn zero_delta_keeps_only_current_and_anchors() {
        assert_eq!(
            compute_markers(5, 9, 0),
            vec![Page(1), Ellipsis, Page(5), Ellipsis, Page(9)]
        );
    }

    #[test]
    fn huge_delta_does_not_overflow() {
        assert_eq!(
            compute_markers(2, 4, u64::MAX),
            vec![Page(1), Page(2), Page(3), Page(4)]
        );
    }

    #[test]
    fn activating_markers() {
        assert_eq!(on_marker_activated(Page(4), 2), Some(4));
        assert_eq!(on_marker_activated(Page(2), 2), None);
        assert_eq!(on_marker_activated(Ellipsis, 2), None);
    }

    #[test]
    fn previous_and_next_are_disabled_at_the_bounds() {
        let first = PaginationState::new(1, 3, 25, 10, 1, 10);
        assert_eq!(first.previous_page(), None);
        assert_eq!(first.next_page(), Some(2));

        let last = PaginationState::new(3, 3, 25, 10, 21, 25);
        assert_eq!(last.previous_page(), Some(2));
        assert_eq!(last.next_page(), None);
    }

    #[test]
    fn empty_collection_state() {
        let state = PaginationState::new(1, 0, 0, 10, 7, 9);
        assert_eq!(state.last_page, 1);
        assert_eq!((state.from, state.to), (0, 0));
        assert!(!state.is_paginated());
        assert!(Paginator::default().controls(&state).is_hidden());
    }

    #[test]
    fn paginator_uses_its_delta() {
        let state = PaginationState::new(5, 10, 100, 10, 41, 50);
        let wide = Paginator::new(4).controls(&state);
        assert_eq!(wide.markers, (1..=10).map(Page).collect::<Vec<_>>());
        assert_eq!(wide.activate(Page(9)), Some(9));
        assert_eq!(wide.activate(Page(5)), None);
    }

    #[test]
    fn page_param_parsing() {
        assert_eq!(parse_page_param(None), 1);
        assert_eq!(parse_page_param(Some("3")), 3);
        assert_eq!(parse_page_param(Some(" 12 ")), 12);
        assert_eq!(parse_page_param(Some("abc")), 1);
        assert_eq!(parse_page_param(Some("-4")), -4);
    }

    #[test]
    fn markers_serialize_like_the_rendered_control() {
        let json = serde_json::to_string(&compute_markers(1, 5, 2)).unwrap();
        assert_eq!(json, r#"[1,2,3,"...",5]"#);
    }
}
