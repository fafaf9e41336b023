//! Catalog client: builds endpoint URLs, consults the cache, fetches and normalizes

use chrono::Utc;
use serde::de::DeserializeOwned;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, warn};

use super::book::{Book, WORK_KEY_PREFIX};
use super::error::FetchError;
use super::normalize::{Document, SearchResponse, WorkDoc};
use super::transport::Transport;
use crate::cache::{CacheKey, ResponseCache};

/// Default API base
pub const DEFAULT_BASE_URL: &str = "https://openlibrary.org";

/// One page of a search, as requested
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub query: String,
    /// 1-based page number
    pub page: u32,
    pub limit: u32,
}

impl SearchRequest {
    pub fn new(query: impl Into<String>, page: u32, limit: u32) -> Self {
        Self {
            query: query.into(),
            page: page.max(1),
            limit: limit.max(1),
        }
    }

    /// Request for the page containing the zero-based `start_index`
    pub fn from_start_index(query: impl Into<String>, start_index: u32, limit: u32) -> Self {
        let limit = limit.max(1);
        Self::new(query, start_index / limit + 1, limit)
    }

    /// Zero-based index of the first result on this page
    pub fn start_index(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.limit)
    }

    /// Same query and limit, different page
    pub fn with_page(&self, page: u32) -> Self {
        Self::new(self.query.clone(), page, self.limit)
    }

    pub fn cache_key(&self) -> CacheKey {
        CacheKey::Search {
            query: self.query.clone(),
            page: self.page,
            limit: self.limit,
        }
    }
}

/// A fetched search page, tagged with the request that produced it
#[derive(Debug, Clone)]
pub struct SearchPage {
    pub request: SearchRequest,
    pub books: Vec<Book>,
    /// Upstream match count across all pages, not the size of `books`
    pub total_items: u64,
}

/// Accept either a bare work id or a `/works/...` key
pub fn work_id(input: &str) -> String {
    let trimmed = input.trim();
    trimmed
        .strip_prefix(WORK_KEY_PREFIX)
        .unwrap_or(trimmed)
        .trim_end_matches(".json")
        .to_string()
}

/// Drop books with no id and repeats of an id already seen, keeping order
fn unique_books(books: impl IntoIterator<Item = Book>) -> Vec<Book> {
    let mut seen = HashSet::new();
    books
        .into_iter()
        .filter(|book| {
            if book.id.is_empty() {
                debug!(title = %book.title, "skipping search result without a key");
                return false;
            }
            if !seen.insert(book.id.clone()) {
                debug!(id = %book.id, "skipping duplicate search result");
                return false;
            }
            true
        })
        .collect()
}

/// Client for the search and work endpoints
pub struct CatalogClient {
    transport: Arc<dyn Transport>,
    base_url: String,
    cache: Option<ResponseCache>,
}

impl CatalogClient {
    pub fn new(transport: Arc<dyn Transport>, base_url: &str) -> Self {
        Self {
            transport,
            base_url: base_url.trim_end_matches('/').to_string(),
            cache: None,
        }
    }

    /// Serve repeated requests from `cache` while they are fresh
    pub fn with_cache(mut self, cache: ResponseCache) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn search_url(&self, request: &SearchRequest) -> String {
        format!(
            "{}/search.json?q={}&page={}&limit={}",
            self.base_url,
            urlencoding::encode(&request.query),
            request.page,
            request.limit
        )
    }

    pub fn work_url(&self, id: &str) -> String {
        format!("{}/works/{}.json", self.base_url, urlencoding::encode(id))
    }

    /// Fetch and normalize one page of search results
    pub async fn search(&self, request: &SearchRequest) -> Result<SearchPage, FetchError> {
        let url = self.search_url(request);
        let response: SearchResponse = self.fetch_json(&request.cache_key(), &url).await?;

        let books = unique_books(
            response
                .docs
                .into_iter()
                .map(|doc| Document::Search(doc).normalize()),
        );

        debug!(
            query = %request.query,
            page = request.page,
            returned = books.len(),
            total = response.num_found,
            "search page loaded"
        );

        Ok(SearchPage {
            request: request.clone(),
            books,
            total_items: response.num_found,
        })
    }

    /// Fetch and normalize a single work
    pub async fn work(&self, id: &str) -> Result<Book, FetchError> {
        let id = work_id(id);
        let url = self.work_url(&id);
        let key = CacheKey::Work { id: id.clone() };
        let doc: WorkDoc = self.fetch_json(&key, &url).await?;

        Ok(Document::Work { id, doc }.normalize())
    }

    async fn fetch_json<T: DeserializeOwned>(
        &self,
        key: &CacheKey,
        url: &str,
    ) -> Result<T, FetchError> {
        if let Some(cache) = &self.cache {
            if let Some(body) = cache.get(key, Utc::now()) {
                match serde_json::from_str(&body) {
                    Ok(parsed) => return Ok(parsed),
                    Err(e) => warn!("Discarding cached body for {}: {}", url, e),
                }
            }
        }

        let body = self.transport.get(url).await?;
        let parsed = serde_json::from_str(&body).map_err(|source| FetchError::MalformedPayload {
            url: url.to_string(),
            source,
        })?;

        // Only bodies that parsed are worth keeping
        if let Some(cache) = &self.cache {
            if let Err(e) = cache.put(key, &body, Utc::now()) {
                warn!("Failed to cache response for {}: {:#}", url, e);
            }
        }

        Ok(parsed)
    }
}
