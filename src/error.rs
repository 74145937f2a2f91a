//! Error types for Favro API operations.

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Errors that can occur during Favro API operations.
#[derive(Debug, Error)]
pub enum FavroError {
    /// Configuration is missing or incomplete.
    #[error("Favro configuration required: {0}")]
    ConfigMissing(String),

    /// Credentials are present but malformed.
    #[error("Invalid Favro credentials: {0}")]
    InvalidCredentials(String),

    /// The local request budget is spent; nothing was sent.
    #[error("No requests remaining! Budget resets at {resets_at}")]
    BudgetExhausted { resets_at: DateTime<Utc> },

    /// The request needs an organization scope but the client has none.
    #[error("An organization ID must be set before making this request")]
    OrganizationRequired,

    /// A body was supplied on a verb that cannot carry one.
    #[error("HTTP {method} requests cannot include a body")]
    BodyNotAllowed { method: &'static str },

    /// A list query is missing a filter the endpoint requires.
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    /// A header name or value could not be encoded.
    #[error("Invalid header: {0}")]
    InvalidHeader(String),

    /// The server rejected the request with 429.
    #[error("Rate limited by Favro (HTTP 429), budget resets at {resets_at}")]
    RateLimited { resets_at: DateTime<Utc> },

    /// Entity not found.
    #[error("{entity_type} '{id}' not found")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// API request failed.
    #[error("Favro API error: {message}")]
    ApiError {
        message: String,
        status_code: Option<u16>,
    },

    /// The response claimed to be JSON but was not.
    #[error("Unable to parse response body as JSON: {content}")]
    InvalidBody {
        content: String,
        #[source]
        source: serde_json::Error,
    },

    /// A raw record did not have the shape of its entity type.
    #[error("Unable to hydrate {entity_type}: {source}")]
    Hydration {
        entity_type: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// HTTP transport error.
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    /// JSON serialization error.
    #[error("Failed to serialize JSON: {0}")]
    ParseError(#[from] serde_json::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    UrlError(#[from] url::ParseError),
}

impl FavroError {
    /// The HTTP status behind this error, if it came from a response.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::RateLimited { .. } => Some(429),
            Self::NotFound { .. } => Some(404),
            Self::ApiError { status_code, .. } => *status_code,
            Self::HttpError(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// True for errors raised locally before anything went over the wire.
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            Self::BudgetExhausted { .. }
                | Self::OrganizationRequired
                | Self::BodyNotAllowed { .. }
                | Self::InvalidHeader(_)
                | Self::InvalidQuery(_)
        )
    }
}

/// Result type alias for Favro operations.
pub type Result<T> = core::result::Result<T, FavroError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_code_for_rate_limit() {
        let err = FavroError::RateLimited {
            resets_at: Utc::now(),
        };
        assert_eq!(err.status_code(), Some(429));
        assert!(!err.is_precondition());
    }

    #[test]
    fn test_precondition_classification() {
        assert!(FavroError::OrganizationRequired.is_precondition());
        assert!(FavroError::BodyNotAllowed { method: "GET" }.is_precondition());
        assert!(!FavroError::ApiError {
            message: "boom".to_string(),
            status_code: Some(500),
        }
        .is_precondition());
    }
}
