//! Client-side session bookkeeping.
//!
//! The server is authoritative about rate limits; this is best-effort
//! tracking so that a client stops hammering the API once it has been told
//! the budget is spent.

use chrono::{DateTime, Utc};

use crate::error::{FavroError, Result};
use crate::response::FavroResponse;

/// Mutable per-client state, updated once after every completed request.
///
/// Transitions are pure: [`SessionState::after_response`] produces the next
/// state from the current one and the response metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    /// Requests left in the current budget window. `None` means unknown,
    /// which is treated as unlimited.
    pub requests_remaining: Option<u32>,
    /// When the server said the budget window resets.
    pub limit_resets_at: DateTime<Utc>,
    /// Last backend identifier observed from the server.
    pub backend_id: Option<String>,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            requests_remaining: None,
            limit_resets_at: Utc::now(),
            backend_id: None,
        }
    }
}

impl SessionState {
    /// Fail fast if the tracked budget is spent.
    pub fn check_budget(&self) -> Result<()> {
        match self.requests_remaining {
            Some(0) => Err(FavroError::BudgetExhausted {
                resets_at: self.limit_resets_at,
            }),
            _ => Ok(()),
        }
    }

    /// Whether the budget has been pinned to zero.
    pub fn is_exhausted(&self) -> bool {
        self.requests_remaining == Some(0)
    }

    /// Compute the state that follows a completed response.
    ///
    /// Metadata absent from the response leaves the previous value in place.
    /// A 429, or a remaining count below one, pins the budget to zero.
    #[must_use]
    pub fn after_response(&self, response: &FavroResponse) -> SessionState {
        let mut next = self.clone();

        if let Some(backend_id) = response.backend_id() {
            next.backend_id = Some(backend_id.to_string());
        }
        if let Some(remaining) = response.requests_remaining() {
            next.requests_remaining = Some(remaining);
        }
        if let Some(resets_at) = response.limit_resets_at_header() {
            next.limit_resets_at = resets_at;
        }
        if response.status() == 429 || next.requests_remaining == Some(0) {
            next.requests_remaining = Some(0);
        }
        next
    }

    /// Clear a pinned budget so requests are attempted again.
    #[must_use]
    pub fn with_budget_cleared(&self) -> SessionState {
        SessionState {
            requests_remaining: None,
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::Method;
    use reqwest::header::{HeaderMap, HeaderValue};
    use url::Url;

    fn response(status: u16, headers: &[(&'static str, &str)]) -> FavroResponse {
        let mut map = HeaderMap::new();
        for (name, value) in headers {
            map.insert(*name, HeaderValue::from_str(value).unwrap());
        }
        FavroResponse::from_parts(
            Method::Get,
            Url::parse("https://favro.com/api/v1/cards").unwrap(),
            status,
            map,
            Vec::new(),
        )
    }

    #[test]
    fn test_default_is_unlimited() {
        let state = SessionState::default();
        assert!(state.check_budget().is_ok());
        assert!(!state.is_exhausted());
    }

    #[test]
    fn test_adopts_response_metadata() {
        let state = SessionState::default();
        let next = state.after_response(&response(
            200,
            &[
                ("x-ratelimit-remaining", "42"),
                ("x-ratelimit-reset", "2030-01-01T00:00:00Z"),
                ("x-favro-backend-identifier", "shard-7"),
            ],
        ));
        assert_eq!(next.requests_remaining, Some(42));
        assert_eq!(next.backend_id.as_deref(), Some("shard-7"));
        assert_eq!(next.limit_resets_at.to_rfc3339(), "2030-01-01T00:00:00+00:00");
        // The original value is untouched.
        assert_eq!(state.requests_remaining, None);
    }

    #[test]
    fn test_missing_headers_keep_previous_values() {
        let state = SessionState {
            requests_remaining: Some(10),
            backend_id: Some("shard-1".to_string()),
            ..Default::default()
        };
        let next = state.after_response(&response(200, &[]));
        assert_eq!(next.requests_remaining, Some(10));
        assert_eq!(next.backend_id.as_deref(), Some("shard-1"));
    }

    #[test]
    fn test_zero_remaining_pins_budget() {
        let next = SessionState::default()
            .after_response(&response(200, &[("x-ratelimit-remaining", "0")]));
        assert!(next.is_exhausted());
        assert!(matches!(
            next.check_budget(),
            Err(FavroError::BudgetExhausted { .. })
        ));
    }

    #[test]
    fn test_429_pins_budget_even_with_remaining_header() {
        let next = SessionState::default()
            .after_response(&response(429, &[("x-ratelimit-remaining", "500")]));
        assert_eq!(next.requests_remaining, Some(0));
    }

    #[test]
    fn test_clearing_budget() {
        let pinned = SessionState {
            requests_remaining: Some(0),
            ..Default::default()
        };
        assert!(pinned.with_budget_cleared().check_budget().is_ok());
    }
}
