//! State of one search view
//!
//! The view owns its result set and filter state. Fetches are issued with
//! [`SearchView::begin`], which numbers each one, and their completions fed
//! back through [`SearchView::receive`]; a completion carrying any number but
//! the latest arrived late and is dropped instead of overwriting newer
//! results, even when it asked for the same page. Filter changes only
//! recompute [`SearchView::visible`].

use tracing::debug;

use crate::catalog::{Book, FetchError, SearchPage, SearchRequest};
use crate::filter::{apply_filters, FilterOutcome, Filters};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewStatus {
    Idle,
    Loading,
    Loaded,
    Failed,
}

/// A finished fetch, tagged with the number [`SearchView::begin`] gave it
#[derive(Debug)]
pub struct Completion {
    pub fetch: u64,
    pub request: SearchRequest,
    pub result: Result<SearchPage, FetchError>,
}

/// What [`SearchView::receive`] did with a completion
#[derive(Debug)]
pub enum Delivery {
    /// Results replaced the previous page
    Loaded,
    /// The current fetch failed; results were cleared
    Failed(FetchError),
    /// The completion belonged to a superseded request and was discarded
    Stale,
}

#[derive(Debug)]
pub struct SearchView {
    current: Option<SearchRequest>,
    /// Number of the latest fetch; 0 before the first
    fetch: u64,
    books: Vec<Book>,
    total_items: u64,
    filters: Filters,
    status: ViewStatus,
}

impl Default for SearchView {
    fn default() -> Self {
        Self::new()
    }
}

impl SearchView {
    pub fn new() -> Self {
        Self {
            current: None,
            fetch: 0,
            books: Vec::new(),
            total_items: 0,
            filters: Filters::default(),
            status: ViewStatus::Idle,
        }
    }

    /// Make `request` the one whose completion will be accepted
    ///
    /// Returns the fetch number the completion must carry.
    pub fn begin(&mut self, request: SearchRequest) -> u64 {
        self.fetch += 1;
        debug!(
            fetch = self.fetch,
            query = %request.query,
            page = request.page,
            "fetch started"
        );
        self.current = Some(request);
        self.status = ViewStatus::Loading;
        self.fetch
    }

    /// Apply a completion if it answers the latest fetch
    pub fn receive(&mut self, completion: Completion) -> Delivery {
        if self.current.is_none() || completion.fetch != self.fetch {
            debug!(
                fetch = completion.fetch,
                latest = self.fetch,
                query = %completion.request.query,
                page = completion.request.page,
                "discarding stale completion"
            );
            return Delivery::Stale;
        }

        match completion.result {
            Ok(page) => {
                debug!(
                    query = %page.request.query,
                    page = page.request.page,
                    books = page.books.len(),
                    "applying search results"
                );
                self.books = page.books;
                self.total_items = page.total_items;
                self.status = ViewStatus::Loaded;
                Delivery::Loaded
            }
            Err(e) => {
                // No partial results on failure
                self.books.clear();
                self.total_items = 0;
                self.status = ViewStatus::Failed;
                Delivery::Failed(e)
            }
        }
    }

    pub fn current(&self) -> Option<&SearchRequest> {
        self.current.as_ref()
    }

    pub fn status(&self) -> ViewStatus {
        self.status
    }

    /// Every book on the loaded page, before filtering
    pub fn books(&self) -> &[Book] {
        &self.books
    }

    /// Upstream match count, independent of filtering
    pub fn total_items(&self) -> u64 {
        self.total_items
    }

    pub fn filters(&self) -> &Filters {
        &self.filters
    }

    pub fn filters_mut(&mut self) -> &mut Filters {
        &mut self.filters
    }

    /// Filtered books and facets for the loaded page
    pub fn visible(&self) -> FilterOutcome<'_> {
        apply_filters(&self.books, &self.filters)
    }

    /// `ceil(total_items / limit)`, or 0 before anything is loaded
    pub fn total_pages(&self) -> u32 {
        match &self.current {
            Some(request) => total_pages(self.total_items, request.limit),
            None => 0,
        }
    }

    pub fn next_page(&self) -> Option<SearchRequest> {
        let current = self.current.as_ref()?;
        (current.page < self.total_pages()).then(|| current.with_page(current.page + 1))
    }

    pub fn prev_page(&self) -> Option<SearchRequest> {
        let current = self.current.as_ref()?;
        (current.page > 1).then(|| current.with_page(current.page - 1))
    }

    /// Request for `page`, clamped to the known page range
    pub fn goto_page(&self, page: u32) -> Option<SearchRequest> {
        let current = self.current.as_ref()?;
        let last = self.total_pages();
        if last == 0 {
            return None;
        }
        Some(current.with_page(page.clamp(1, last)))
    }
}

/// Number of pages needed for `total_items` at `limit` per page
pub fn total_pages(total_items: u64, limit: u32) -> u32 {
    if limit == 0 {
        return 0;
    }
    let pages = total_items.div_ceil(u64::from(limit));
    u32::try_from(pages).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::YearRange;

    fn page(fetch: u64, request: &SearchRequest, ids: &[&str], total: u64) -> Completion {
        Completion {
            fetch,
            request: request.clone(),
            result: Ok(SearchPage {
                request: request.clone(),
                books: ids
                    .iter()
                    .map(|id| Book {
                        id: id.to_string(),
                        ..Default::default()
                    })
                    .collect(),
                total_items: total,
            }),
        }
    }

    fn failure(fetch: u64, request: &SearchRequest, status: u16) -> Completion {
        Completion {
            fetch,
            request: request.clone(),
            result: Err(FetchError::Status {
                url: "https://openlibrary.org/search.json".to_string(),
                status,
            }),
        }
    }

    fn ids(view: &SearchView) -> Vec<&str> {
        view.books().iter().map(|b| b.id.as_str()).collect()
    }

    #[test]
    fn test_total_pages() {
        assert_eq!(total_pages(120, 8), 15);
        assert_eq!(total_pages(121, 8), 16);
        assert_eq!(total_pages(0, 8), 0);
        assert_eq!(total_pages(5, 0), 0);
    }

    #[test]
    fn test_loads_current_request() {
        let mut view = SearchView::new();
        let request = SearchRequest::new("fantasy", 1, 8);
        let fetch = view.begin(request.clone());
        assert_eq!(view.status(), ViewStatus::Loading);

        assert!(matches!(
            view.receive(page(fetch, &request, &["a", "b"], 120)),
            Delivery::Loaded
        ));
        assert_eq!(view.status(), ViewStatus::Loaded);
        assert_eq!(ids(&view), vec!["a", "b"]);
        assert_eq!(view.total_items(), 120);
        assert_eq!(view.total_pages(), 15);
    }

    #[test]
    fn test_fetch_numbers_increase() {
        let mut view = SearchView::new();
        let request = SearchRequest::new("fantasy", 1, 8);
        let first = view.begin(request.clone());
        let second = view.begin(request);
        assert!(second > first);
    }

    #[test]
    fn test_late_completion_is_discarded() {
        let mut view = SearchView::new();
        let first = SearchRequest::new("tolkien", 1, 8);
        let second = SearchRequest::new("pratchett", 1, 8);

        let first_fetch = view.begin(first.clone());
        let second_fetch = view.begin(second.clone());

        // Newer request finishes first, then the superseded one arrives
        assert!(matches!(
            view.receive(page(second_fetch, &second, &["p1"], 10)),
            Delivery::Loaded
        ));
        assert!(matches!(
            view.receive(page(first_fetch, &first, &["t1", "t2"], 99)),
            Delivery::Stale
        ));

        assert_eq!(ids(&view), vec!["p1"]);
        assert_eq!(view.total_items(), 10);
        assert_eq!(view.current(), Some(&second));
    }

    #[test]
    fn test_late_failure_of_repeated_request_is_discarded() {
        let mut view = SearchView::new();
        let a = SearchRequest::new("tolkien", 1, 8);
        let b = SearchRequest::new("pratchett", 1, 8);

        let old_a = view.begin(a.clone());
        view.begin(b);
        let new_a = view.begin(a.clone());

        assert!(matches!(
            view.receive(page(new_a, &a, &["t1"], 30)),
            Delivery::Loaded
        ));
        // The first fetch of the same request times out afterwards
        assert!(matches!(
            view.receive(failure(old_a, &a, 504)),
            Delivery::Stale
        ));

        assert_eq!(view.status(), ViewStatus::Loaded);
        assert_eq!(ids(&view), vec!["t1"]);
        assert_eq!(view.total_items(), 30);
    }

    #[test]
    fn test_stale_failure_is_ignored() {
        let mut view = SearchView::new();
        let first = SearchRequest::new("a", 1, 8);
        let second = SearchRequest::new("a", 2, 8);

        let first_fetch = view.begin(first.clone());
        view.receive(page(first_fetch, &first, &["x"], 20));
        view.begin(second);

        assert!(matches!(
            view.receive(failure(first_fetch, &first, 500)),
            Delivery::Stale
        ));
        assert_eq!(view.status(), ViewStatus::Loading);
        assert_eq!(ids(&view), vec!["x"]);
    }

    #[test]
    fn test_completion_without_request_is_stale() {
        let mut view = SearchView::new();
        let request = SearchRequest::new("a", 1, 8);
        assert!(matches!(
            view.receive(page(0, &request, &["x"], 1)),
            Delivery::Stale
        ));
        assert!(view.books().is_empty());
    }

    #[test]
    fn test_failure_clears_results() {
        let mut view = SearchView::new();
        let first = SearchRequest::new("a", 1, 8);
        let fetch = view.begin(first.clone());
        view.receive(page(fetch, &first, &["x"], 20));

        let retry = SearchRequest::new("b", 1, 8);
        let fetch = view.begin(retry.clone());
        assert!(matches!(
            view.receive(failure(fetch, &retry, 500)),
            Delivery::Failed(_)
        ));
        assert_eq!(view.status(), ViewStatus::Failed);
        assert!(view.books().is_empty());
        assert_eq!(view.total_items(), 0);
    }

    #[test]
    fn test_page_navigation() {
        let mut view = SearchView::new();
        assert!(view.next_page().is_none());

        let request = SearchRequest::new("fantasy", 1, 8);
        let fetch = view.begin(request.clone());
        view.receive(page(fetch, &request, &["a"], 20));

        assert_eq!(view.prev_page(), None);
        assert_eq!(view.next_page().map(|r| r.page), Some(2));
        assert_eq!(view.goto_page(99).map(|r| r.page), Some(3));
        assert_eq!(view.goto_page(0).map(|r| r.page), Some(1));

        let last = view.goto_page(3).unwrap();
        let fetch = view.begin(last.clone());
        view.receive(page(fetch, &last, &["z"], 20));
        assert_eq!(view.next_page(), None);
        assert_eq!(view.prev_page().map(|r| r.page), Some(2));
    }

    #[test]
    fn test_filter_change_keeps_loaded_books() {
        let mut view = SearchView::new();
        let request = SearchRequest::new("fantasy", 1, 8);
        let fetch = view.begin(request.clone());
        view.receive(Completion {
            fetch,
            request: request.clone(),
            result: Ok(SearchPage {
                request: request.clone(),
                books: vec![
                    Book {
                        id: "old".to_string(),
                        published_date: Some("1950".to_string()),
                        ..Default::default()
                    },
                    Book {
                        id: "new".to_string(),
                        published_date: Some("2010".to_string()),
                        ..Default::default()
                    },
                ],
                total_items: 2,
            }),
        });

        view.filters_mut().year_range = YearRange::new(Some(2000), None);
        let visible = view.visible();
        assert_eq!(
            visible.books.iter().map(|b| b.id.as_str()).collect::<Vec<_>>(),
            vec!["new"]
        );
        assert_eq!(view.books().len(), 2);
    }
}
