//! Response wrapper for a single Favro API call.
//!
//! The body is read off the wire during dispatch; parsing and classification
//! happen lazily on first access and are memoized.

use std::sync::OnceLock;

use chrono::{DateTime, TimeZone, Utc};
use reqwest::header::{HeaderMap, CONTENT_TYPE};
use serde_json::Value;
use url::Url;

use crate::client::{FavroClient, Method, RequestOptions};
use crate::error::{FavroError, Result};
use crate::pagination::{PageCursor, PagedEnvelope};

/// Header carrying the number of requests left in the budget window.
pub const RATE_LIMIT_REMAINING_HEADER: &str = "X-RateLimit-Remaining";
/// Header carrying the time the budget window resets.
pub const RATE_LIMIT_RESET_HEADER: &str = "X-RateLimit-Reset";
/// Header carrying the backend routing identifier.
pub const BACKEND_ID_HEADER: &str = "X-Favro-Backend-Identifier";

/// A parsed JSON body, classified once by shape.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    /// A bare entity (or any non-array, non-envelope JSON value).
    Single(Value),
    /// A bare array of entities.
    Array(Vec<Value>),
    /// One page of a paged collection.
    Paged(PagedEnvelope),
}

impl ResponseBody {
    /// Classify a JSON value. Objects carrying both `page` and `entities`
    /// are paged envelopes.
    fn classify(value: Value, raw: &[u8]) -> Result<Self> {
        let is_envelope = value
            .as_object()
            .map(|map| map.contains_key("page") && map.contains_key("entities"))
            .unwrap_or(false);

        if is_envelope {
            return serde_json::from_value(value)
                .map(Self::Paged)
                .map_err(|source| FavroError::InvalidBody {
                    content: String::from_utf8_lossy(raw).into_owned(),
                    source,
                });
        }

        Ok(match value {
            Value::Array(items) => Self::Array(items),
            other => Self::Single(other),
        })
    }
}

/// One HTTP response from the Favro API.
#[derive(Debug)]
pub struct FavroResponse {
    request: RequestOptions,
    url: Url,
    status: u16,
    headers: HeaderMap,
    body: Vec<u8>,
    parsed: OnceLock<Option<ResponseBody>>,
}

impl FavroResponse {
    /// Assemble a response from already-received parts.
    pub fn from_parts(
        method: Method,
        url: Url,
        status: u16,
        headers: HeaderMap,
        body: Vec<u8>,
    ) -> Self {
        Self {
            request: RequestOptions::new().method(method),
            url,
            status,
            headers,
            body,
            parsed: OnceLock::new(),
        }
    }

    /// Keep the options that produced this response so follow-up pages
    /// go out the same way. Query and body are not carried over.
    #[must_use]
    pub fn with_request_options(mut self, mut options: RequestOptions) -> Self {
        options.query.clear();
        options.body = None;
        self.request = options;
        self
    }

    /// HTTP status code.
    pub fn status(&self) -> u16 {
        self.status
    }

    /// True for 200-399.
    pub fn succeeded(&self) -> bool {
        (200..400).contains(&self.status)
    }

    /// True outside 200-399.
    pub fn failed(&self) -> bool {
        !self.succeeded()
    }

    /// The URL that produced this response.
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// The verb that produced this response.
    pub fn method(&self) -> Method {
        self.request.method
    }

    /// Raw response headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// The body as (lossy) text.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// The Content-Type header, if any.
    pub fn content_type(&self) -> Option<&str> {
        self.header_str(CONTENT_TYPE.as_str())
    }

    /// Whether the Content-Type declares JSON.
    pub fn is_json(&self) -> bool {
        self.content_type()
            .map(|ct| {
                let ct = ct.to_ascii_lowercase();
                ct.contains("application/json") || ct.contains("+json")
            })
            .unwrap_or(false)
    }

    fn header_str(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Remaining request budget. `None` means unlimited (header absent or
    /// unparsable). Negative values clamp to zero.
    pub fn requests_remaining(&self) -> Option<u32> {
        let raw: i64 = self
            .header_str(RATE_LIMIT_REMAINING_HEADER)?
            .trim()
            .parse()
            .ok()?;
        Some(u32::try_from(raw.max(0)).unwrap_or(u32::MAX))
    }

    /// When the budget resets, defaulting to now.
    pub fn limit_resets_at(&self) -> DateTime<Utc> {
        self.limit_resets_at_header().unwrap_or_else(Utc::now)
    }

    /// When the budget resets, only if the server said so.
    pub(crate) fn limit_resets_at_header(&self) -> Option<DateTime<Utc>> {
        parse_reset(self.header_str(RATE_LIMIT_RESET_HEADER)?)
    }

    /// The backend routing identifier, if the server sent one.
    pub fn backend_id(&self) -> Option<&str> {
        self.header_str(BACKEND_ID_HEADER).filter(|v| !v.is_empty())
    }

    /// Parse and classify the body.
    ///
    /// Returns `Ok(None)` without parsing when the response is not JSON or
    /// has no body. The result is cached after the first success.
    ///
    /// # Errors
    ///
    /// [`FavroError::InvalidBody`] if the body claims to be JSON but is not.
    pub fn parsed_body(&self) -> Result<Option<&ResponseBody>> {
        if let Some(parsed) = self.parsed.get() {
            return Ok(parsed.as_ref());
        }
        if !self.is_json() {
            return Ok(None);
        }

        let parsed = if self.body.iter().all(u8::is_ascii_whitespace) {
            None
        } else {
            let value: Value =
                serde_json::from_slice(&self.body).map_err(|source| FavroError::InvalidBody {
                    content: self.text(),
                    source,
                })?;
            match value {
                Value::Null => None,
                value => Some(ResponseBody::classify(value, &self.body)?),
            }
        };

        Ok(self.parsed.get_or_init(|| parsed).as_ref())
    }

    /// Deserialize the body directly into `T`.
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_slice(&self.body).map_err(|source| FavroError::InvalidBody {
            content: self.text(),
            source,
        })
    }

    /// Continuation cursor, if this is a paged envelope.
    pub fn page_cursor(&self) -> Result<Option<PageCursor>> {
        Ok(match self.parsed_body()? {
            Some(ResponseBody::Paged(envelope)) => Some(envelope.cursor()),
            _ => None,
        })
    }

    /// True unless this is a paged envelope with pages still to come.
    pub fn is_last_page(&self) -> Result<bool> {
        Ok(self
            .page_cursor()?
            .map(|cursor| cursor.is_last())
            .unwrap_or(true))
    }

    /// Raw entity records in this response, whatever its shape.
    pub fn entities_data(&self) -> Result<Vec<Value>> {
        Ok(match self.parsed_body()? {
            None => Vec::new(),
            Some(ResponseBody::Single(value)) => vec![value.clone()],
            Some(ResponseBody::Array(values)) => values.clone(),
            Some(ResponseBody::Paged(envelope)) => envelope.entities.clone(),
        })
    }

    /// Request the page after this one.
    ///
    /// Reuses this response's URL with `requestId` and `page` replaced from
    /// the envelope and the options of the originating request, and pins
    /// the backend that served this page. Returns
    /// `Ok(None)` without a network call when this is the last page.
    #[tracing::instrument(skip(self, client), fields(url = %self.url))]
    pub async fn next_page(&self, client: &FavroClient) -> Result<Option<FavroResponse>> {
        let Some(cursor) = self.page_cursor()? else {
            return Ok(None);
        };
        if cursor.is_last() {
            return Ok(None);
        }

        let url = cursor.next_page_url(&self.url);
        let mut options = self.request.clone();
        if let Some(backend_id) = self.backend_id() {
            options = options.backend_id(backend_id);
        }

        tracing::debug!(
            page = cursor.page + 1,
            pages = cursor.pages,
            "requesting next page"
        );
        client.request_url(url, options).await.map(Some)
    }
}

/// Reset times arrive as RFC 3339 dates; integer epoch seconds are accepted too.
fn parse_reset(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(date) = DateTime::parse_from_rfc3339(value) {
        return Some(date.with_timezone(&Utc));
    }
    let secs: i64 = value.parse().ok()?;
    Utc.timestamp_opt(secs, 0).single()
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;
    use serde_json::json;

    fn response_with(content_type: Option<&str>, body: &str) -> FavroResponse {
        let mut headers = HeaderMap::new();
        if let Some(ct) = content_type {
            headers.insert(CONTENT_TYPE, HeaderValue::from_str(ct).unwrap());
        }
        FavroResponse::from_parts(
            Method::Get,
            Url::parse("https://favro.com/api/v1/cards?widgetCommonId=w1").unwrap(),
            200,
            headers,
            body.as_bytes().to_vec(),
        )
    }

    fn json_response(body: Value) -> FavroResponse {
        response_with(Some("application/json; charset=utf-8"), &body.to_string())
    }

    fn envelope(page: u32, pages: u32) -> Value {
        json!({
            "limit": 2,
            "page": page,
            "pages": pages,
            "requestId": "req-1",
            "entities": [{"cardId": "a"}, {"cardId": "b"}]
        })
    }

    #[test]
    fn test_non_json_body_is_null() {
        let response = response_with(Some("text/html"), "{\"looks\": \"like json\"}");
        assert!(response.parsed_body().unwrap().is_none());
        assert!(response.entities_data().unwrap().is_empty());
        assert!(response.is_last_page().unwrap());
    }

    #[test]
    fn test_missing_content_type_is_null() {
        let response = response_with(None, "[1, 2]");
        assert!(response.parsed_body().unwrap().is_none());
    }

    #[test]
    fn test_invalid_json_names_content() {
        let response = response_with(Some("application/json"), "<html>oops</html>");
        match response.parsed_body() {
            Err(FavroError::InvalidBody { content, .. }) => {
                assert_eq!(content, "<html>oops</html>");
            }
            other => panic!("expected InvalidBody, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_json_body_is_null() {
        let response = response_with(Some("application/json"), "");
        assert!(response.parsed_body().unwrap().is_none());
    }

    #[test]
    fn test_classifies_single_entity() {
        let response = json_response(json!({"collectionId": "c1", "name": "Roadmap"}));
        assert!(matches!(
            response.parsed_body().unwrap(),
            Some(ResponseBody::Single(_))
        ));
        assert_eq!(response.entities_data().unwrap().len(), 1);
        assert!(response.is_last_page().unwrap());
    }

    #[test]
    fn test_classifies_bare_array() {
        let response = json_response(json!([{"id": 1}, {"id": 2}, {"id": 3}]));
        assert!(matches!(
            response.parsed_body().unwrap(),
            Some(ResponseBody::Array(items)) if items.len() == 3
        ));
        assert!(response.is_last_page().unwrap());
    }

    #[test]
    fn test_object_with_only_page_is_single() {
        let response = json_response(json!({"page": 3, "name": "not an envelope"}));
        assert!(matches!(
            response.parsed_body().unwrap(),
            Some(ResponseBody::Single(_))
        ));
    }

    #[test]
    fn test_paged_envelope_entities_in_order() {
        let response = json_response(envelope(0, 3));
        let data = response.entities_data().unwrap();
        assert_eq!(data, vec![json!({"cardId": "a"}), json!({"cardId": "b"})]);
    }

    #[test]
    fn test_last_page_detection() {
        assert!(!json_response(envelope(0, 3)).is_last_page().unwrap());
        assert!(!json_response(envelope(1, 3)).is_last_page().unwrap());
        assert!(json_response(envelope(2, 3)).is_last_page().unwrap());
        assert!(json_response(envelope(0, 1)).is_last_page().unwrap());
        assert!(json_response(envelope(0, 0)).is_last_page().unwrap());
    }

    #[test]
    fn test_parsed_body_is_memoized() {
        let response = json_response(envelope(0, 2));
        let first = response.parsed_body().unwrap().unwrap() as *const ResponseBody;
        let second = response.parsed_body().unwrap().unwrap() as *const ResponseBody;
        assert_eq!(first, second);
    }

    #[test]
    fn test_rate_limit_headers() {
        let mut response = json_response(json!({}));
        response
            .headers
            .insert("x-ratelimit-remaining", HeaderValue::from_static("17"));
        response
            .headers
            .insert("x-ratelimit-reset", HeaderValue::from_static("1893456000"));
        response
            .headers
            .insert("x-favro-backend-identifier", HeaderValue::from_static("shard-7"));

        assert_eq!(response.requests_remaining(), Some(17));
        assert_eq!(response.limit_resets_at().timestamp(), 1_893_456_000);
        assert_eq!(response.backend_id(), Some("shard-7"));
    }

    #[test]
    fn test_malformed_rate_limit_headers_are_unset() {
        let mut response = json_response(json!({}));
        response
            .headers
            .insert("x-ratelimit-remaining", HeaderValue::from_static("lots"));
        response
            .headers
            .insert("x-ratelimit-reset", HeaderValue::from_static("soon"));

        assert_eq!(response.requests_remaining(), None);
        assert!(response.limit_resets_at_header().is_none());
        let before = Utc::now() - chrono::Duration::seconds(1);
        assert!(response.limit_resets_at() >= before);
    }

    #[test]
    fn test_negative_remaining_clamps_to_zero() {
        let mut response = json_response(json!({}));
        response
            .headers
            .insert("x-ratelimit-remaining", HeaderValue::from_static("-3"));
        assert_eq!(response.requests_remaining(), Some(0));
    }

    #[test]
    fn test_succeeded_range() {
        let mut response = json_response(json!({}));
        assert!(response.succeeded());
        response.status = 302;
        assert!(response.succeeded());
        response.status = 404;
        assert!(response.failed());
    }
}
