//! Pagination handling for GitHub API.
//!
//! [`PageIterator`] turns a page-fetching closure into a lazy, finite sequence
//! of pages so that callers never manage page counters or stop flags.

use crate::errors::{GitHubError, GitHubResult};
use reqwest::header::HeaderMap;
use serde::Serialize;
use std::future::Future;

/// Pagination links parsed from Link header.
#[derive(Debug, Clone, Default)]
pub struct PaginationLinks {
    /// URL for the next page.
    pub next: Option<String>,
    /// URL for the previous page.
    pub prev: Option<String>,
    /// URL for the first page.
    pub first: Option<String>,
    /// URL for the last page.
    pub last: Option<String>,
}

impl PaginationLinks {
    /// Parses pagination links from the Link header (RFC 8288).
    pub fn from_header(header_value: &str) -> Self {
        let mut links = Self::default();

        for part in header_value.split(',') {
            let mut url = None;
            let mut rel = None;

            for segment in part.split(';') {
                let segment = segment.trim();
                if segment.starts_with('<') && segment.ends_with('>') {
                    url = Some(segment[1..segment.len() - 1].to_string());
                } else if let Some(value) = segment.strip_prefix("rel=") {
                    rel = Some(value.trim_matches('"').to_string());
                }
            }

            if let (Some(url), Some(rel)) = (url, rel) {
                match rel.as_str() {
                    "next" => links.next = Some(url),
                    "prev" => links.prev = Some(url),
                    "first" => links.first = Some(url),
                    "last" => links.last = Some(url),
                    _ => {}
                }
            }
        }

        links
    }

    /// Parses pagination links from response headers.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        headers
            .get("link")
            .and_then(|v| v.to_str().ok())
            .map(Self::from_header)
            .unwrap_or_default()
    }

    /// Returns true if the response carried any pagination link.
    pub fn is_present(&self) -> bool {
        self.next.is_some() || self.prev.is_some() || self.first.is_some() || self.last.is_some()
    }

    /// Returns true if there is a next page.
    pub fn has_next(&self) -> bool {
        self.next.is_some()
    }

    /// Gets the total page count from the last link.
    pub fn total_pages(&self) -> Option<u32> {
        self.last.as_deref().and_then(extract_page_number)
    }
}

/// A single page of results.
#[derive(Debug, Clone)]
pub struct Page<T> {
    /// The items in this page.
    pub items: Vec<T>,
    /// Pagination links.
    pub links: PaginationLinks,
    /// Current page number.
    pub page: Option<u32>,
    /// Items per page.
    pub per_page: Option<u32>,
    /// Total count (search endpoints only).
    pub total_count: Option<u64>,
}

impl<T> Page<T> {
    /// Creates a new page.
    pub fn new(items: Vec<T>, links: PaginationLinks) -> Self {
        Self {
            items,
            links,
            page: None,
            per_page: None,
            total_count: None,
        }
    }

    /// Sets the page number.
    pub fn with_page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    /// Sets items per page.
    pub fn with_per_page(mut self, per_page: u32) -> Self {
        self.per_page = Some(per_page);
        self
    }

    /// Sets total count.
    pub fn with_total_count(mut self, count: u64) -> Self {
        self.total_count = Some(count);
        self
    }

    /// Returns true if there is a next page.
    pub fn has_next(&self) -> bool {
        self.links.has_next()
    }

    /// Returns the number of items in this page.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true if the page is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Consumes the page and returns the items.
    pub fn into_items(self) -> Vec<T> {
        self.items
    }

    /// Returns true if this is known to be the final page: it is shorter than
    /// requested, or the Link header is present without a `next` relation.
    pub fn is_last(&self, per_page: u32) -> bool {
        self.items.len() < per_page as usize || (self.links.is_present() && !self.has_next())
    }
}

impl<T> IntoIterator for Page<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

/// Pagination parameters for list requests.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct PaginationParams {
    /// Page number (1-indexed).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    /// Items per page (max 100).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub per_page: Option<u32>,
}

impl PaginationParams {
    /// Creates new pagination parameters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the page number.
    pub fn page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    /// Sets items per page.
    pub fn per_page(mut self, per_page: u32) -> Self {
        // GitHub API limits to 100
        self.per_page = Some(per_page.min(100));
        self
    }

    /// Converts to query parameters.
    pub fn to_query(&self) -> Vec<(String, String)> {
        let mut params = Vec::new();
        if let Some(page) = self.page {
            params.push(("page".to_string(), page.to_string()));
        }
        if let Some(per_page) = self.per_page {
            params.push(("per_page".to_string(), per_page.to_string()));
        }
        params
    }
}

/// Bounded lazy sequence of pages.
///
/// The sequence ends after an empty page, after the final page (see
/// [`Page::is_last`]), once `max_pages` pages were fetched, or after the first
/// error, which is yielded exactly once.
pub struct PageIterator<F> {
    fetch: F,
    per_page: u32,
    max_pages: u32,
    next_page: u32,
    exhausted: bool,
}

impl<F, Fut, T> PageIterator<F>
where
    F: FnMut(PaginationParams) -> Fut,
    Fut: Future<Output = GitHubResult<Page<T>>>,
{
    /// Creates a new page iterator.
    pub fn new(fetch: F, per_page: u32, max_pages: u32) -> Self {
        let per_page = per_page.clamp(1, 100);
        Self {
            fetch,
            per_page,
            max_pages,
            next_page: 1,
            exhausted: max_pages == 0,
        }
    }

    /// Fetches the next page, or `None` once the sequence has ended.
    pub async fn next_page(&mut self) -> Option<GitHubResult<Page<T>>> {
        if self.exhausted {
            return None;
        }

        let params = PaginationParams::new()
            .page(self.next_page)
            .per_page(self.per_page);
        self.next_page += 1;

        match (self.fetch)(params).await {
            Ok(page) if page.is_empty() => {
                self.exhausted = true;
                None
            }
            Ok(page) => {
                if page.is_last(self.per_page) || self.next_page > self.max_pages {
                    self.exhausted = true;
                }
                Some(Ok(page))
            }
            Err(e) => {
                self.exhausted = true;
                Some(Err(e))
            }
        }
    }

    /// Number of pages requested so far.
    pub fn pages_fetched(&self) -> u32 {
        self.next_page - 1
    }

    /// Returns true if more pages may follow.
    pub fn has_more(&self) -> bool {
        !self.exhausted
    }

    /// Collects every item, keeping whatever arrived before a failure.
    pub async fn collect_partial(mut self) -> PartialCollection<T> {
        let mut items = Vec::new();
        let mut error = None;

        while let Some(page) = self.next_page().await {
            match page {
                Ok(page) => items.extend(page.into_items()),
                Err(e) => error = Some(e),
            }
        }

        PartialCollection {
            items,
            error,
            pages: self.pages_fetched(),
        }
    }
}

/// Items collected from a paginated listing plus the error that cut it short.
#[derive(Debug)]
pub struct PartialCollection<T> {
    /// Items received before the sequence ended.
    pub items: Vec<T>,
    /// The failure that ended the sequence, if any.
    pub error: Option<GitHubError>,
    /// Pages requested.
    pub pages: u32,
}

/// Extracts page number from a URL.
pub fn extract_page_number(url: &str) -> Option<u32> {
    url::Url::parse(url).ok().and_then(|u| {
        u.query_pairs()
            .find(|(k, _)| k == "page")
            .and_then(|(_, v)| v.parse().ok())
    })
}
