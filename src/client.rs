//! Favro API client.
//!
//! Low-level HTTP dispatcher that handles authentication, routing headers
//! and rate-limit bookkeeping. Higher-level operations are implemented via
//! traits on entity types.

use std::env;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

use base64::Engine as _;
use reqwest::header::{
    HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE, HOST, USER_AGENT as UA,
};
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use url::Url;

use crate::error::{FavroError, Result};
use crate::response::{FavroResponse, BACKEND_ID_HEADER};
use crate::session::SessionState;

const DEFAULT_API_URL: &str = "https://favro.com/api/v1";
const USER_AGENT: &str = concat!("favroapi/", env!("CARGO_PKG_VERSION"), " (Rust)");

/// Host header value the Favro API expects on every request.
pub const FAVRO_HOST: &str = "favro.com";
/// Header carrying the organization scope.
pub const ORGANIZATION_HEADER: &str = "organizationId";

/// HTTP verbs supported by the Favro API.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Method {
    #[default]
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    /// Upper-case verb name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }

    /// Favro rejects bodies on GET and DELETE.
    pub fn allows_body(&self) -> bool {
        matches!(self, Method::Post | Method::Put)
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
        }
    }
}

/// A request payload. The Content-Type is derived from the variant.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    /// Sent as `application/octet-stream`.
    Binary(Vec<u8>),
    /// Sent as `text/markdown`.
    Markdown(String),
    /// Sent as `application/json`.
    Json(Value),
}

impl RequestBody {
    /// Serialize any value into a JSON body.
    pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<Self> {
        Ok(Self::Json(serde_json::to_value(value)?))
    }

    /// The derived Content-Type.
    pub fn content_type(&self) -> &'static str {
        match self {
            RequestBody::Binary(_) => "application/octet-stream",
            RequestBody::Markdown(_) => "text/markdown",
            RequestBody::Json(_) => "application/json",
        }
    }

    fn into_bytes(self) -> Result<Vec<u8>> {
        Ok(match self {
            RequestBody::Binary(bytes) => bytes,
            RequestBody::Markdown(text) => text.into_bytes(),
            RequestBody::Json(value) => serde_json::to_vec(&value)?,
        })
    }
}

/// Per-request options for [`FavroClient::request`].
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    /// HTTP verb (defaults to GET).
    pub method: Method,
    /// Query parameters appended to the URL.
    pub query: Vec<(String, String)>,
    /// Optional payload.
    pub body: Option<RequestBody>,
    /// Header overrides, applied last.
    pub headers: Vec<(String, String)>,
    /// Backend to pin this request to, instead of the last one seen.
    pub backend_id: Option<String>,
    /// Fail locally if the client has no organization set.
    pub requires_organization: bool,
    /// Leave the organization header off.
    pub exclude_organization: bool,
    /// Non-success statuses the caller handles itself.
    pub accepted_statuses: Vec<u16>,
}

impl RequestOptions {
    /// Default options: a GET with no extras.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the HTTP verb.
    #[must_use]
    pub fn method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// Add a query parameter.
    #[must_use]
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Add a query parameter when a value is present.
    #[must_use]
    pub fn query_opt(self, key: impl Into<String>, value: Option<impl ToString>) -> Self {
        match value {
            Some(value) => self.query(key, value.to_string()),
            None => self,
        }
    }

    /// Add every non-null field of a serializable query struct.
    pub fn query_params<Q: Serialize + ?Sized>(mut self, params: &Q) -> Result<Self> {
        if let Value::Object(map) = serde_json::to_value(params)? {
            for (key, value) in map {
                match value {
                    Value::Null => {}
                    Value::String(s) => self.query.push((key, s)),
                    other => self.query.push((key, other.to_string())),
                }
            }
        }
        Ok(self)
    }

    /// Set the payload.
    #[must_use]
    pub fn body(mut self, body: RequestBody) -> Self {
        self.body = Some(body);
        self
    }

    /// Set a JSON body.
    #[must_use]
    pub fn json(self, value: Value) -> Self {
        self.body(RequestBody::Json(value))
    }

    /// Override a header. Overrides win over derived headers.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Pin the request to a backend.
    #[must_use]
    pub fn backend_id(mut self, backend_id: impl Into<String>) -> Self {
        self.backend_id = Some(backend_id.into());
        self
    }

    /// Fail locally unless the client has an organization.
    #[must_use]
    pub fn requires_organization(mut self) -> Self {
        self.requires_organization = true;
        self
    }

    /// Send no organization header.
    #[must_use]
    pub fn exclude_organization(mut self) -> Self {
        self.exclude_organization = true;
        self
    }

    /// Treat `status` as a non-error response.
    #[must_use]
    pub fn accept_status(mut self, status: u16) -> Self {
        self.accepted_statuses.push(status);
        self
    }
}

/// Favro user credentials: the account email and an API token.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    email: String,
    token: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

impl Credentials {
    /// Validate and wrap credentials.
    ///
    /// # Errors
    ///
    /// Returns [`FavroError::InvalidCredentials`] if the token is empty or
    /// contains whitespace, or the email is not shaped like `user@domain`.
    pub fn new(email: &str, token: &str) -> Result<Self> {
        let email = email.trim();
        let token = token.trim();

        if token.is_empty() || token.chars().any(char::is_whitespace) {
            return Err(FavroError::InvalidCredentials(
                "API token must be a non-empty string without whitespace".to_string(),
            ));
        }
        match email.split_once('@') {
            Some((user, domain)) if !user.is_empty() && !domain.is_empty() && !domain.contains('@') => {}
            _ => {
                return Err(FavroError::InvalidCredentials(format!(
                    "'{email}' is not a valid user email"
                )))
            }
        }

        Ok(Self {
            email: email.to_string(),
            token: token.to_string(),
        })
    }

    /// The user email.
    pub fn email(&self) -> &str {
        &self.email
    }

    /// `Basic base64(email:token)`.
    pub fn basic_auth(&self) -> String {
        let encoded = base64::engine::general_purpose::STANDARD
            .encode(format!("{}:{}", self.email, self.token));
        format!("Basic {encoded}")
    }
}

/// Low-level Favro API client.
///
/// Handles authentication and HTTP requests. Entity-specific operations
/// are implemented via the `Get`, `List`, and `Delete` traits on model types.
///
/// Clones share the same connection pool and the same [`SessionState`], so
/// budget and backend affinity observed through one clone apply to all.
///
/// # Example
///
/// ```no_run
/// use favroapi::{Credentials, FavroClient};
///
/// # fn example() -> favroapi::Result<()> {
/// // Create from environment variables
/// let client = FavroClient::from_env()?;
///
/// // Or configure manually
/// let credentials = Credentials::new("me@example.com", "your-api-token")?;
/// let client = FavroClient::new(credentials, "https://favro.com/api/v1")?
///     .with_organization("your-org-id");
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct FavroClient {
    http: Client,
    base_url: Arc<Url>,
    credentials: Arc<Credentials>,
    organization_id: Option<String>,
    session: Arc<Mutex<SessionState>>,
}

impl fmt::Debug for FavroClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FavroClient")
            .field("base_url", &self.base_url.as_str())
            .field("organization_id", &self.organization_id)
            .finish_non_exhaustive()
    }
}

impl FavroClient {
    /// Create a client from environment variables.
    ///
    /// Uses `FAVRO_TOKEN` and `FAVRO_USER_EMAIL` for authentication,
    /// optionally `FAVRO_ORGANIZATION_ID` for the organization scope and
    /// `FAVRO_API_URL` for the base URL (defaults to `https://favro.com/api/v1`).
    ///
    /// # Errors
    ///
    /// Returns an error if `FAVRO_TOKEN` or `FAVRO_USER_EMAIL` is not set.
    pub fn from_env() -> Result<Self> {
        let token = env::var("FAVRO_TOKEN").map_err(|_| {
            FavroError::ConfigMissing("FAVRO_TOKEN environment variable not set".to_string())
        })?;
        let email = env::var("FAVRO_USER_EMAIL").map_err(|_| {
            FavroError::ConfigMissing("FAVRO_USER_EMAIL environment variable not set".to_string())
        })?;
        let base_url = env::var("FAVRO_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());

        let client = Self::new(Credentials::new(&email, &token)?, &base_url)?;
        Ok(match env::var("FAVRO_ORGANIZATION_ID") {
            Ok(org) if !org.trim().is_empty() => client.with_organization(org.trim()),
            _ => client,
        })
    }

    /// Create a new client with the provided credentials and base URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is invalid.
    pub fn new(credentials: Credentials, base_url: &str) -> Result<Self> {
        // Ensure base URL ends with /
        let base_url_str = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{base_url}/")
        };

        let base_url = Url::parse(&base_url_str)?;

        let http = Client::builder()
            .brotli(true)
            .gzip(true)
            .deflate(true)
            .build()
            .map_err(FavroError::HttpError)?;

        Ok(Self {
            http,
            base_url: Arc::new(base_url),
            credentials: Arc::new(credentials),
            organization_id: None,
            session: Arc::new(Mutex::new(SessionState::default())),
        })
    }

    /// Scope requests to an organization.
    #[must_use]
    pub fn with_organization(mut self, organization_id: impl Into<String>) -> Self {
        self.organization_id = Some(organization_id.into());
        self
    }

    /// Change (or clear) the organization scope of this clone.
    pub fn set_organization(&mut self, organization_id: Option<String>) {
        self.organization_id = organization_id;
    }

    /// The organization scope, if any.
    pub fn organization_id(&self) -> Option<&str> {
        self.organization_id.as_deref()
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// The user email requests are made as.
    pub fn user_email(&self) -> &str {
        self.credentials.email()
    }

    /// A snapshot of the session state.
    pub fn session(&self) -> SessionState {
        self.lock_session().clone()
    }

    /// Clear a budget pinned at zero so requests go out again.
    ///
    /// The client never does this on its own; call it once the reset time
    /// reported by [`SessionState::limit_resets_at`] has passed.
    pub fn reset_budget(&self) {
        let mut session = self.lock_session();
        *session = session.with_budget_cleared();
    }

    fn lock_session(&self) -> MutexGuard<'_, SessionState> {
        self.session
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Make a request against a path relative to the base URL.
    pub async fn request(&self, path: &str, options: RequestOptions) -> Result<FavroResponse> {
        let url = self.base_url.join(path.trim_start_matches('/'))?;
        self.request_url(url, options).await
    }

    /// Make a request against an absolute URL.
    ///
    /// Checks preconditions against the current session, sends exactly one
    /// HTTP request, then commits the session transition for the response
    /// before classifying its status.
    ///
    /// # Errors
    ///
    /// Precondition errors are returned without touching the network.
    /// Non-success statuses not listed in `accepted_statuses` become
    /// [`FavroError::RateLimited`] (429) or [`FavroError::ApiError`].
    #[tracing::instrument(skip_all, fields(method = %options.method, url = %url))]
    pub async fn request_url(&self, url: Url, mut options: RequestOptions) -> Result<FavroResponse> {
        let session = self.session();
        if let Err(err) = self.preflight(&session, &options) {
            tracing::warn!(error = %err, "request refused locally");
            return Err(err);
        }
        let headers = self.build_headers(&session, &options)?;

        let mut url = url;
        let query = std::mem::take(&mut options.query);
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(&query);
        }

        let mut request = self
            .http
            .request(options.method.into(), url.clone())
            .headers(headers);
        if let Some(body) = options.body.take() {
            request = request.body(body.into_bytes()?);
        }

        let raw = request.send().await.map_err(FavroError::HttpError)?;
        let status = raw.status().as_u16();
        let response_headers = raw.headers().clone();
        let body = raw.bytes().await.map_err(FavroError::HttpError)?.to_vec();
        let accepted = options.accepted_statuses.contains(&status);
        // Query and body are gone; what is left shapes any follow-up page.
        let response = FavroResponse::from_parts(options.method, url, status, response_headers, body)
            .with_request_options(options);

        let next = self.commit(&response);

        if response.succeeded() || accepted {
            return Ok(response);
        }

        if status == 429 {
            tracing::warn!(resets_at = %next.limit_resets_at, "rate limited, budget pinned to zero");
            return Err(FavroError::RateLimited {
                resets_at: next.limit_resets_at,
            });
        }

        Err(FavroError::ApiError {
            message: Self::extract_error_message(&response),
            status_code: Some(status),
        })
    }

    /// Apply the response's session transition.
    fn commit(&self, response: &FavroResponse) -> SessionState {
        let mut session = self.lock_session();
        let next = session.after_response(response);
        if next != *session {
            tracing::debug!(
                requests_remaining = ?next.requests_remaining,
                backend_id = ?next.backend_id,
                "session updated"
            );
        }
        *session = next.clone();
        next
    }

    /// Checks that must pass before anything goes over the wire.
    fn preflight(&self, session: &SessionState, options: &RequestOptions) -> Result<()> {
        session.check_budget()?;

        if options.requires_organization && self.organization_id.is_none() {
            return Err(FavroError::OrganizationRequired);
        }

        if options.body.is_some() && !options.method.allows_body() {
            return Err(FavroError::BodyNotAllowed {
                method: options.method.as_str(),
            });
        }

        Ok(())
    }

    /// Build the outgoing headers. Absent values are omitted entirely.
    fn build_headers(&self, session: &SessionState, options: &RequestOptions) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(HOST, HeaderValue::from_static(FAVRO_HOST));
        headers.insert(UA, HeaderValue::from_static(USER_AGENT));
        headers.insert(AUTHORIZATION, header_value("Authorization", &self.credentials.basic_auth())?);

        if !options.exclude_organization {
            if let Some(org) = &self.organization_id {
                headers.insert(
                    HeaderName::from_static("organizationid"),
                    header_value(ORGANIZATION_HEADER, org)?,
                );
            }
        }

        if let Some(backend_id) = options.backend_id.as_ref().or(session.backend_id.as_ref()) {
            headers.insert(
                HeaderName::from_static("x-favro-backend-identifier"),
                header_value(BACKEND_ID_HEADER, backend_id)?,
            );
        }

        if let Some(body) = &options.body {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static(body.content_type()));
        }

        for (name, value) in &options.headers {
            let header_name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|_| FavroError::InvalidHeader(name.clone()))?;
            headers.insert(header_name, header_value(name, value)?);
        }

        Ok(headers)
    }

    /// Extract error message from a failed response.
    fn extract_error_message(response: &FavroResponse) -> String {
        let body = response.text();

        // Try to parse as JSON and extract message field
        if let Ok(json) = serde_json::from_str::<Value>(&body) {
            if let Some(msg) = json.get("message").and_then(|m| m.as_str()) {
                return msg.to_string();
            }
            if let Some(err) = json.get("error").and_then(|m| m.as_str()) {
                return err.to_string();
            }
        }

        if body.trim().is_empty() {
            format!("HTTP {}", response.status())
        } else {
            body
        }
    }
}

fn header_value(name: &str, value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value).map_err(|_| FavroError::InvalidHeader(name.to_string()))
}
