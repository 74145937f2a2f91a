//! Pagination utilities for Favro API responses.
//!
//! Favro pages collections behind a `requestId` cursor. The first request
//! returns page 0 together with a `requestId`; every later page is fetched
//! by repeating the same URL with `requestId` and the next `page` number.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;

/// Query parameter carrying the paging cursor.
pub const REQUEST_ID_PARAM: &str = "requestId";
/// Query parameter carrying the zero-indexed page number.
pub const PAGE_PARAM: &str = "page";

/// One page of a paged collection, as sent on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PagedEnvelope {
    /// Maximum entities per page.
    #[serde(default)]
    pub limit: u32,
    /// Current page (0-indexed).
    pub page: u32,
    /// Total number of pages.
    #[serde(default)]
    pub pages: u32,
    /// Cursor identifying this logical query on the server.
    #[serde(default)]
    pub request_id: Option<String>,
    /// Raw records on this page, in server order.
    pub entities: Vec<Value>,
}

impl PagedEnvelope {
    /// Extract the continuation cursor.
    pub fn cursor(&self) -> PageCursor {
        PageCursor {
            request_id: self.request_id.clone(),
            page: self.page,
            pages: self.pages,
        }
    }
}

/// Continuation facts for one paged envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageCursor {
    /// Server-side cursor for the logical query.
    pub request_id: Option<String>,
    /// Current page (0-indexed).
    pub page: u32,
    /// Total number of pages.
    pub pages: u32,
}

impl PageCursor {
    /// True when `page >= pages - 1`.
    pub fn is_last(&self) -> bool {
        self.page.saturating_add(1) >= self.pages
    }

    /// The URL of the following page: `url` with `requestId` and `page`
    /// replaced and every other parameter kept in place.
    pub fn next_page_url(&self, url: &Url) -> Url {
        let kept: Vec<(String, String)> = url
            .query_pairs()
            .filter(|(key, _)| key != REQUEST_ID_PARAM && key != PAGE_PARAM)
            .map(|(key, value)| (key.into_owned(), value.into_owned()))
            .collect();

        let mut next = url.clone();
        {
            let mut query = next.query_pairs_mut();
            query.clear();
            query.extend_pairs(kept);
            if let Some(request_id) = &self.request_id {
                query.append_pair(REQUEST_ID_PARAM, request_id);
            }
            query.append_pair(PAGE_PARAM, &(self.page + 1).to_string());
        }
        next
    }
}

/// Where a paged query stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkState {
    /// Nothing fetched yet.
    Empty,
    /// A page is fetched but not yet converted to entities.
    HasUnhydratedPage,
    /// The latest page is converted; more pages may follow.
    Hydrated,
    /// The latest page was the last one. No further requests are made.
    Exhausted,
}
