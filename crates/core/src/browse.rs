//! Alphabetic browse pagination and highlighting
//!
//! Pure functions that decide which browse-handler queries to issue for a
//! request and how to present the page that comes back: which page links to
//! offer and which row is the nearest match for the anchor term.
//!
//! The shell drives the steps itself ([`primary_query`], [`after_primary`],
//! [`after_fallback`]) so it can await the backend between them.
//! [`compute_browse`] runs the same steps against a synchronous query function.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Errors raised before any backend query is issued
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BrowseError {
    #[error("Invalid browse request: {0}")]
    InvalidRequest(String),
}

/// Failure reported by a browse backend
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BackendError {
    #[error("Browse backend unavailable: {0}")]
    Unavailable(String),

    #[error("Browse backend timed out: {0}")]
    Timeout(String),

    #[error("Browse index missing: {0}")]
    IndexMissing(String),
}

/// A validated browse request
///
/// Page indices are relative to the anchor term: page 0 holds the anchor,
/// negative pages hold the headings that sort before it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowseRequest {
    source: String,
    from: Option<String>,
    page: i64,
    page_size: i64,
    rows_before: i64,
    highlighting: bool,
    extra_params: BTreeMap<String, String>,
}

impl BrowseRequest {
    /// Validate and build a request
    ///
    /// # Errors
    /// `InvalidRequest` when `page_size` is not positive, `rows_before` is
    /// negative, `page` is too large to address as a row offset, or a
    /// non-empty `from` term is given without a source.
    pub fn new(
        source: impl Into<String>,
        from: Option<String>,
        page: i64,
        page_size: i64,
        rows_before: i64,
        highlighting: bool,
    ) -> Result<Self, BrowseError> {
        let source = source.into();

        if page_size <= 0 {
            return Err(BrowseError::InvalidRequest(format!(
                "page size must be positive, got {page_size}"
            )));
        }

        if rows_before < 0 {
            return Err(BrowseError::InvalidRequest(format!(
                "rows before must not be negative, got {rows_before}"
            )));
        }

        if !page_in_range(page, page_size, rows_before) {
            return Err(BrowseError::InvalidRequest(format!(
                "page {page} is out of range"
            )));
        }

        if source.is_empty() && from.as_deref().is_some_and(|f| !f.is_empty()) {
            return Err(BrowseError::InvalidRequest(
                "a browse source is required when a starting term is given".to_string(),
            ));
        }

        Ok(Self {
            source,
            from,
            page,
            page_size,
            rows_before,
            highlighting,
            extra_params: BTreeMap::new(),
        })
    }

    /// Attach extra backend parameters (e.g. `extras=title:author`)
    pub fn with_extra_params(mut self, extra_params: BTreeMap<String, String>) -> Self {
        self.extra_params = extra_params;
        self
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn from(&self) -> Option<&str> {
        self.from.as_deref()
    }

    pub fn page(&self) -> i64 {
        self.page
    }

    pub fn page_size(&self) -> i64 {
        self.page_size
    }

    pub fn rows_before(&self) -> i64 {
        self.rows_before
    }

    pub fn extra_params(&self) -> &BTreeMap<String, String> {
        &self.extra_params
    }

    /// Highlighting requested and there is an anchor to highlight against
    pub fn highlighting_enabled(&self) -> bool {
        self.highlighting && self.from.as_deref().is_some_and(|f| !f.is_empty())
    }
}

/// Every offset and page link derived from `page` fits in an `i64`
///
/// Covers the primary offset, the fallback page and its offset, and the
/// next/previous links of either page.
fn page_in_range(page: i64, page_size: i64, rows_before: i64) -> bool {
    let primary_offset = page
        .checked_mul(page_size)
        .and_then(|offset| offset.checked_sub(rows_before));
    let fallback_offset = page
        .checked_sub(1)
        .and_then(|fallback| fallback.checked_mul(page_size));

    primary_offset.is_some()
        && fallback_offset.is_some()
        && page.checked_sub(2).is_some()
        && page.checked_add(1).is_some()
}

/// Arguments of a single browse-handler call
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BrowseQuery {
    pub source: String,
    pub from: String,
    pub page: i64,
    pub page_size: i64,
    pub extra_params: BTreeMap<String, String>,
    pub negative_offset: i64,
}

impl BrowseQuery {
    /// Row offset relative to the anchor term
    pub fn offset(&self) -> i64 {
        self.page
            .saturating_mul(self.page_size)
            .saturating_add(self.negative_offset)
    }
}

/// Heading referenced from another heading (see also / use instead)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrowseReference {
    pub heading: String,
    #[serde(default)]
    pub count: u64,
}

/// A single heading in a browse page
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct BrowseItem {
    pub heading: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_key: Option<String>,
    pub count: u64,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ids: Vec<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub extras: BTreeMap<String, Vec<String>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub see_also: Vec<BrowseReference>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub use_instead: Vec<BrowseReference>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl BrowseItem {
    /// First value of an extra field, if any
    pub fn first_extra(&self, field: &str) -> Option<&str> {
        self.extras
            .get(field)
            .and_then(|values| values.first())
            .map(String::as_str)
    }
}

/// Window of headings returned by the browse handler
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct BrowsePage {
    pub total_count: i64,
    pub offset: i64,
    /// 1-based position of the anchor row in the full list
    pub start_row: i64,
    pub match_type: String,
    pub rows: Vec<BrowseItem>,
}

/// Kind of backend failure absorbed into a view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Unavailable,
    Timeout,
    IndexMissing,
}

/// Error indicator attached to a failed browse view
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BrowseFailure {
    pub kind: FailureKind,
    pub message: String,
}

impl From<&BackendError> for BrowseFailure {
    fn from(err: &BackendError) -> Self {
        let kind = match err {
            BackendError::Unavailable(_) => FailureKind::Unavailable,
            BackendError::Timeout(_) => FailureKind::Timeout,
            BackendError::IndexMissing(_) => FailureKind::IndexMissing,
        };
        Self {
            kind,
            message: err.to_string(),
        }
    }
}

/// Everything the view layer needs to render a browse page
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct BrowseViewResult {
    pub page: Option<BrowsePage>,
    pub next_page_index: Option<i64>,
    pub prev_page_index: Option<i64>,
    /// 0-based index into `page.rows`
    pub highlight_row_index: Option<usize>,
    pub highlight_at_end: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<BrowseFailure>,
}

impl BrowseViewResult {
    /// Result shown when there is nothing to browse yet
    pub fn empty() -> Self {
        Self::default()
    }

    /// Empty result carrying the backend failure
    pub fn failed(err: &BackendError) -> Self {
        Self {
            error: Some(err.into()),
            ..Self::default()
        }
    }

    pub fn is_failed(&self) -> bool {
        self.error.is_some()
    }

    /// True when a query ran and found nothing, even after the fallback
    pub fn is_no_results(&self) -> bool {
        self.page.as_ref().is_some_and(|p| p.total_count == 0)
    }
}

/// First query for a request, or `None` when there is nothing to browse
pub fn primary_query(request: &BrowseRequest) -> Option<BrowseQuery> {
    let from = request.from.as_deref().filter(|f| !f.is_empty())?;
    if request.source.is_empty() {
        return None;
    }

    Some(BrowseQuery {
        source: request.source.clone(),
        from: from.to_string(),
        page: request.page,
        page_size: request.page_size,
        extra_params: request.extra_params.clone(),
        negative_offset: -request.rows_before,
    })
}

/// Retry on the previous page, without padding, when the first page came
/// back empty (the anchor sorted past the end of the list)
pub fn fallback_query(primary: &BrowseQuery, page: &BrowsePage) -> Option<BrowseQuery> {
    if page.total_count != 0 {
        return None;
    }

    Some(BrowseQuery {
        page: primary.page.checked_sub(1)?,
        negative_offset: 0,
        ..primary.clone()
    })
}

/// Compute page links and highlighting for the page being displayed
///
/// `displayed` is the query that produced `page`; it differs from `primary`
/// only when the empty-page fallback ran.
pub fn build_view(
    request: &BrowseRequest,
    primary: &BrowseQuery,
    displayed: &BrowseQuery,
    page: BrowsePage,
) -> BrowseViewResult {
    let fell_back = displayed != primary;
    let highlighting = request.highlighting_enabled();

    let next_page_index = (page.total_count > request.page_size)
        .then(|| displayed.page.checked_add(1))
        .flatten();
    let prev_page_index = (page.offset.saturating_add(page.start_row) > 1)
        .then(|| displayed.page.checked_sub(1))
        .flatten();

    let mut highlight_at_end = fell_back && highlighting;
    let mut highlight_row_index = None;

    if highlighting && primary.page == 0 {
        let start_row_adj = page.start_row.saturating_sub(1);
        let mut total_rows = page.total_count;
        if page.start_row.saturating_add(page.offset) > 0 {
            total_rows = total_rows.saturating_add(start_row_adj.saturating_add(page.offset));
        }

        let row = if start_row_adj < request.rows_before {
            start_row_adj
        } else {
            request.rows_before
        };

        if page.start_row > total_rows {
            highlight_at_end = true;
        }

        if !highlight_at_end {
            highlight_row_index = usize::try_from(row)
                .ok()
                .filter(|idx| *idx < page.rows.len());
        }
    }

    BrowseViewResult {
        page: Some(page),
        next_page_index,
        prev_page_index,
        highlight_row_index,
        highlight_at_end,
        error: None,
    }
}

/// What to do once the primary query has answered
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrowseStep {
    /// The view is final
    Done(BrowseViewResult),
    /// The first page was empty; run this query and finish with [`after_fallback`]
    Fallback(BrowseQuery),
}

/// Turn the primary query's outcome into a view, or ask for the fallback query
pub fn after_primary(
    request: &BrowseRequest,
    primary: &BrowseQuery,
    outcome: Result<BrowsePage, BackendError>,
) -> BrowseStep {
    let page = match outcome {
        Ok(page) => page,
        Err(err) => return BrowseStep::Done(BrowseViewResult::failed(&err)),
    };

    match fallback_query(primary, &page) {
        Some(fallback) => BrowseStep::Fallback(fallback),
        None => BrowseStep::Done(build_view(request, primary, primary, page)),
    }
}

/// Turn the fallback query's outcome into the final view
pub fn after_fallback(
    request: &BrowseRequest,
    primary: &BrowseQuery,
    fallback: &BrowseQuery,
    outcome: Result<BrowsePage, BackendError>,
) -> BrowseViewResult {
    match outcome {
        Ok(page) => build_view(request, primary, fallback, page),
        Err(err) => BrowseViewResult::failed(&err),
    }
}

/// Run a whole browse computation against a synchronous query function
///
/// Issues no query for an empty request, one query normally, and a second
/// one when the first page is empty. Backend failures are absorbed into
/// [`BrowseViewResult::failed`].
pub fn compute_browse<F>(request: &BrowseRequest, mut query: F) -> BrowseViewResult
where
    F: FnMut(&BrowseQuery) -> Result<BrowsePage, BackendError>,
{
    let Some(primary) = primary_query(request) else {
        return BrowseViewResult::empty();
    };

    match after_primary(request, &primary, query(&primary)) {
        BrowseStep::Done(view) => view,
        BrowseStep::Fallback(fallback) => {
            let outcome = query(&fallback);
            after_fallback(request, &primary, &fallback, outcome)
        }
    }
}

/// Commands that open the neighbouring pages of a view
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Navigation {
    pub next_page_command: Option<String>,
    pub prev_page_command: Option<String>,
}

/// Shell-quoted `alphabrowse browse` invocation
pub fn browse_command(source: &str, from: &str, page: Option<i64>) -> String {
    let quoted = shlex::try_quote(from)
        .map(|q| q.into_owned())
        .unwrap_or_else(|_| format!("'{}'", from.replace(['\'', '\0'], "")));

    match page {
        Some(page) if page != 0 => {
            format!("alphabrowse browse {source} {quoted} --page={page}")
        }
        _ => format!("alphabrowse browse {source} {quoted}"),
    }
}

pub fn navigation(request: &BrowseRequest, view: &BrowseViewResult) -> Navigation {
    let from = request.from().unwrap_or_default();
    Navigation {
        next_page_command: view
            .next_page_index
            .map(|page| browse_command(request.source(), from, Some(page))),
        prev_page_command: view
            .prev_page_index
            .map(|page| browse_command(request.source(), from, Some(page))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn items(n: usize) -> Vec<BrowseItem> {
        (0..n)
            .map(|i| BrowseItem {
                heading: format!("Heading {i:03}"),
                count: 1,
                ..BrowseItem::default()
            })
            .collect()
    }

    fn page(total_count: i64, offset: i64, start_row: i64, rows: usize) -> BrowsePage {
        BrowsePage {
            total_count,
            offset,
            start_row,
            match_type: "EXACT".to_string(),
            rows: items(rows),
        }
    }

    fn request(page: i64, rows_before: i64, highlighting: bool) -> BrowseRequest {
        BrowseRequest::new(
            "topic",
            Some("science".to_string()),
            page,
            20,
            rows_before,
            highlighting,
        )
        .unwrap()
    }

    /// Runs `compute_browse` against canned pages, recording every query
    fn run(request: &BrowseRequest, pages: Vec<BrowsePage>) -> (BrowseViewResult, Vec<BrowseQuery>) {
        let mut pages = pages.into_iter();
        let mut seen = Vec::new();
        let view = compute_browse(request, |q| {
            seen.push(q.clone());
            Ok(pages.next().expect("unexpected extra query"))
        });
        (view, seen)
    }

    // ============================================================================
    // BrowseRequest validation
    // ============================================================================

    #[test]
    fn test_request_rejects_zero_page_size() {
        let err = BrowseRequest::new("topic", Some("a".into()), 0, 0, 0, false).unwrap_err();
        assert!(matches!(err, BrowseError::InvalidRequest(_)));
    }

    #[test]
    fn test_request_rejects_negative_page_size() {
        assert!(BrowseRequest::new("topic", Some("a".into()), 0, -5, 0, false).is_err());
    }

    #[test]
    fn test_request_rejects_negative_rows_before() {
        assert!(BrowseRequest::new("topic", Some("a".into()), 0, 20, -1, false).is_err());
    }

    #[test]
    fn test_request_rejects_from_without_source() {
        let err = BrowseRequest::new("", Some("science".into()), 0, 20, 0, false).unwrap_err();
        assert!(err.to_string().contains("source is required"));
    }

    #[test]
    fn test_request_allows_empty_source_without_from() {
        assert!(BrowseRequest::new("", None, 0, 20, 0, false).is_ok());
        assert!(BrowseRequest::new("", Some(String::new()), 0, 20, 0, false).is_ok());
    }

    #[test]
    fn test_request_rejects_pages_that_overflow_offsets() {
        for page in [i64::MAX, i64::MIN, i64::MAX / 20 + 1, i64::MIN / 20] {
            let err = BrowseRequest::new("topic", Some("a".into()), page, 20, 5, true).unwrap_err();
            assert!(err.to_string().contains("out of range"), "page {page}");
        }
    }

    #[test]
    fn test_request_accepts_large_addressable_pages() {
        let req = request(1_000_000, 5, false);
        let (view, seen) = run(&req, vec![page(0, 0, 0, 0), page(40, 5, 1, 20)]);
        assert_eq!(seen[0].offset(), 19_999_995);
        assert_eq!(seen[1].page, 999_999);
        assert_eq!(view.prev_page_index, Some(999_998));
    }

    #[test]
    fn test_highlighting_forced_off_for_empty_from() {
        let req = BrowseRequest::new("topic", Some(String::new()), 0, 20, 0, true).unwrap();
        assert!(!req.highlighting_enabled());

        let req = BrowseRequest::new("topic", Some("x".into()), 0, 20, 0, true).unwrap();
        assert!(req.highlighting_enabled());
    }

    // ============================================================================
    // Query planning
    // ============================================================================

    #[test]
    fn test_empty_from_issues_no_query() {
        for from in [None, Some(String::new())] {
            let req = BrowseRequest::new("topic", from, 0, 20, 5, true).unwrap();
            let (view, seen) = run(&req, vec![]);
            assert!(seen.is_empty());
            assert_eq!(view, BrowseViewResult::empty());
        }
    }

    #[test]
    fn test_empty_source_issues_no_query() {
        let req = BrowseRequest::new("", None, 0, 20, 5, false).unwrap();
        let (view, seen) = run(&req, vec![]);
        assert!(seen.is_empty());
        assert!(view.page.is_none());
    }

    #[test]
    fn test_primary_query_pads_with_rows_before() {
        let req = request(2, 5, false)
            .with_extra_params(BTreeMap::from([("extras".to_string(), "title".to_string())]));
        let q = primary_query(&req).unwrap();
        assert_eq!(q.page, 2);
        assert_eq!(q.negative_offset, -5);
        assert_eq!(q.offset(), 35);
        assert_eq!(q.extra_params.get("extras").map(String::as_str), Some("title"));
    }

    #[test]
    fn test_fallback_issued_once_on_empty_page() {
        let req = request(3, 5, false);
        let (view, seen) = run(&req, vec![page(0, 0, 0, 0), page(40, 55, 1, 20)]);

        assert_eq!(seen.len(), 2);
        assert_eq!(seen[1].page, 2);
        assert_eq!(seen[1].negative_offset, 0);
        assert_eq!(view.page.as_ref().map(|p| p.total_count), Some(40));
    }

    #[test]
    fn test_no_fallback_when_first_page_has_results() {
        let req = request(0, 5, false);
        let (_, seen) = run(&req, vec![page(100, -5, 6, 20)]);
        assert_eq!(seen.len(), 1);
    }

    #[test]
    fn test_empty_after_fallback_is_no_results() {
        let req = request(0, 0, false);
        let (view, seen) = run(&req, vec![page(0, 0, 0, 0), page(0, 0, 0, 0)]);
        assert_eq!(seen.len(), 2);
        assert!(view.is_no_results());
        assert!(!view.is_failed());
    }

    // ============================================================================
    // Page links
    // ============================================================================

    #[test]
    fn test_next_page_only_when_more_than_page_size() {
        let req = request(0, 0, false);
        let (view, _) = run(&req, vec![page(21, 0, 1, 20)]);
        assert_eq!(view.next_page_index, Some(1));

        let (view, _) = run(&req, vec![page(20, 0, 1, 20)]);
        assert_eq!(view.next_page_index, None);
    }

    #[test]
    fn test_prev_page_only_when_rows_precede_window() {
        let req = request(0, 0, false);
        let (view, _) = run(&req, vec![page(100, 0, 1, 20)]);
        assert_eq!(view.prev_page_index, None);

        let (view, _) = run(&req, vec![page(100, 0, 2, 20)]);
        assert_eq!(view.prev_page_index, Some(-1));
    }

    #[test]
    fn test_links_follow_fallback_page() {
        let req = request(4, 0, false);
        let (view, _) = run(&req, vec![page(0, 0, 0, 0), page(30, 60, 1, 20)]);
        assert_eq!(view.next_page_index, Some(4));
        assert_eq!(view.prev_page_index, Some(2));
    }

    #[test]
    fn test_topic_science_scenario() {
        let req = request(0, 5, false);
        let (view, _) = run(&req, vec![page(100, 0, 8, 20)]);
        assert_eq!(view.next_page_index, Some(1));
        // Page -1 addresses the headings sorting before the anchor.
        assert_eq!(view.prev_page_index, Some(-1));
    }

    // ============================================================================
    // Highlighting
    // ============================================================================

    #[test]
    fn test_highlight_defaults_to_rows_before() {
        let req = request(0, 5, true);
        let (view, _) = run(&req, vec![page(100, -5, 10, 20)]);
        assert_eq!(view.highlight_row_index, Some(5));
        assert!(!view.highlight_at_end);
    }

    #[test]
    fn test_highlight_near_list_start() {
        let req = request(0, 5, true);
        let (view, _) = run(&req, vec![page(100, 0, 3, 20)]);
        assert_eq!(view.highlight_row_index, Some(2));
    }

    #[test]
    fn test_highlight_first_row_of_list() {
        let req = request(0, 5, true);
        let (view, _) = run(&req, vec![page(100, 0, 1, 20)]);
        assert_eq!(view.highlight_row_index, Some(0));
    }

    #[test]
    fn test_highlight_past_end_of_list() {
        let req = request(0, 5, true);
        // start_row 9 with offset -5: 4 rows before, total 2 + 8 - 5 = 5 < 9
        let (view, _) = run(&req, vec![page(2, -5, 9, 2)]);
        assert!(view.highlight_at_end);
        assert_eq!(view.highlight_row_index, None);
    }

    #[test]
    fn test_highlight_only_on_anchor_page() {
        let req = request(1, 5, true);
        let (view, _) = run(&req, vec![page(100, 15, 1, 20)]);
        assert_eq!(view.highlight_row_index, None);
        assert!(!view.highlight_at_end);
    }

    #[test]
    fn test_highlight_disabled() {
        let req = request(0, 5, false);
        let (view, _) = run(&req, vec![page(100, -5, 10, 20)]);
        assert_eq!(view.highlight_row_index, None);
        assert!(!view.highlight_at_end);
    }

    #[test]
    fn test_fallback_marks_highlight_at_end() {
        let req = request(0, 5, true);
        let (view, _) = run(&req, vec![page(0, 0, 0, 0), page(20, -20, 21, 20)]);
        assert!(view.highlight_at_end);
        assert_eq!(view.highlight_row_index, None);
    }

    #[test]
    fn test_fallback_without_highlighting_leaves_end_unset() {
        let req = request(0, 5, false);
        let (view, _) = run(&req, vec![page(0, 0, 0, 0), page(20, -20, 21, 20)]);
        assert!(!view.highlight_at_end);
    }

    #[test]
    fn test_highlight_ignores_row_outside_window() {
        let req = request(0, 5, true);
        let (view, _) = run(&req, vec![page(100, -5, 10, 3)]);
        assert_eq!(view.highlight_row_index, None);
        assert!(!view.highlight_at_end);
    }

    // ============================================================================
    // Failures and determinism
    // ============================================================================

    #[test]
    fn test_backend_failure_absorbed() {
        let req = request(0, 5, true);
        let view = compute_browse(&req, |_| Err(BackendError::Timeout("10s".to_string())));
        assert!(view.page.is_none());
        let failure = view.error.unwrap();
        assert_eq!(failure.kind, FailureKind::Timeout);
        assert!(failure.message.contains("10s"));
    }

    #[test]
    fn test_fallback_failure_absorbed() {
        let req = request(0, 0, false);
        let mut calls = 0;
        let view = compute_browse(&req, |_| {
            calls += 1;
            if calls == 1 {
                Ok(page(0, 0, 0, 0))
            } else {
                Err(BackendError::Unavailable("connection refused".to_string()))
            }
        });
        assert_eq!(calls, 2);
        assert_eq!(view.error.map(|e| e.kind), Some(FailureKind::Unavailable));
    }

    #[test]
    fn test_after_primary_requests_fallback_for_empty_page() {
        let req = request(0, 5, true);
        let primary = primary_query(&req).unwrap();

        let BrowseStep::Fallback(fallback) = after_primary(&req, &primary, Ok(page(0, 0, 0, 0)))
        else {
            panic!("expected a fallback query");
        };
        assert_eq!(fallback.page, -1);
        assert_eq!(fallback.negative_offset, 0);

        let view = after_fallback(&req, &primary, &fallback, Ok(page(20, -20, 21, 20)));
        assert!(view.highlight_at_end);
    }

    #[test]
    fn test_after_primary_finishes_on_results_or_failure() {
        let req = request(0, 5, true);
        let primary = primary_query(&req).unwrap();

        let step = after_primary(&req, &primary, Ok(page(100, -5, 10, 20)));
        assert!(matches!(
            step,
            BrowseStep::Done(BrowseViewResult { highlight_row_index: Some(5), .. })
        ));

        let step = after_primary(&req, &primary, Err(BackendError::IndexMissing("topic".into())));
        let BrowseStep::Done(view) = step else {
            panic!("expected a final view");
        };
        assert_eq!(view.error.map(|e| e.kind), Some(FailureKind::IndexMissing));
    }

    #[test]
    fn test_links_saturate_on_extreme_backend_counts() {
        let req = request(0, 5, true);
        let (view, _) = run(&req, vec![page(i64::MAX, i64::MAX, i64::MAX, 20)]);
        assert_eq!(view.next_page_index, Some(1));
        assert_eq!(view.prev_page_index, Some(-1));
    }

    #[test]
    fn test_compute_browse_is_idempotent() {
        let req = request(0, 5, true);
        let backend = |q: &BrowseQuery| Ok(page(100, q.negative_offset, 6, 20));
        assert_eq!(compute_browse(&req, backend), compute_browse(&req, backend));
    }

    // ============================================================================
    // Navigation commands
    // ============================================================================

    #[test]
    fn test_browse_command_quotes_term() {
        let command = browse_command("topic", "World War, 1939-1945", None);
        assert_eq!(
            shlex::split(&command).unwrap(),
            vec!["alphabrowse", "browse", "topic", "World War, 1939-1945"]
        );
        assert_eq!(
            browse_command("lcc", "QA76", Some(-1)),
            "alphabrowse browse lcc QA76 --page=-1"
        );
    }

    #[test]
    fn test_navigation_from_view() {
        let req = request(0, 0, false);
        let (view, _) = run(&req, vec![page(100, 0, 8, 20)]);
        let nav = navigation(&req, &view);
        assert_eq!(
            nav.next_page_command.as_deref(),
            Some("alphabrowse browse topic science --page=1")
        );
        assert_eq!(
            nav.prev_page_command.as_deref(),
            Some("alphabrowse browse topic science --page=-1")
        );
    }

    #[test]
    fn test_navigation_without_links() {
        let req = request(0, 0, false);
        let (view, _) = run(&req, vec![page(5, 0, 1, 5)]);
        assert_eq!(navigation(&req, &view), Navigation::default());
    }

    #[test]
    fn test_view_serializes_failure_kind() {
        let view = BrowseViewResult::failed(&BackendError::IndexMissing("topic".to_string()));
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["error"]["kind"], "index_missing");
        assert_eq!(json["page"], serde_json::Value::Null);
    }
}
