//! Mock Favro API server.
//!
//! Provides an axum-based HTTP server that simulates the Favro API.

use axum::{
    extract::{Request, State},
    http::{HeaderName, HeaderValue, StatusCode},
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
    Router,
};
use chrono::{Duration, Utc};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use super::fixtures::Fixtures;
use super::handlers;
use super::state::{MockState, RecordedRequest, SharedState};
use crate::{Credentials, FavroClient, BACKEND_ID_HEADER};

const API_PREFIX: &str = "/api/v1";

/// A mock Favro API server for testing.
///
/// The server runs in the background and can be used to test the Favro
/// client against a realistic API implementation.
pub struct MockServer {
    /// The URL where the server is listening.
    url: String,
    /// Organization the fixtures belong to.
    organization_id: String,
    /// Handle to the server task.
    handle: JoinHandle<()>,
    /// Shared state that can be modified during tests.
    state: SharedState,
}

impl MockServer {
    /// Start a new mock server with default fixtures.
    ///
    /// The server listens on a random available port and returns immediately.
    /// Use `url()` to get the server's base URL.
    pub async fn start() -> Self {
        Self::with_state(Fixtures::default_scenario()).await
    }

    /// Start a mock server with empty state.
    ///
    /// Useful when you want to control exactly what data is available.
    pub async fn start_empty() -> Self {
        Self::with_state(MockState::new()).await
    }

    /// Start a mock server with custom state.
    pub async fn with_state(state: MockState) -> Self {
        let organization_id = state.organization_id.clone();
        let shared_state = state.shared();
        let app = Self::create_router(shared_state.clone());

        // Bind to a random available port
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to address");
        let addr = listener.local_addr().expect("Failed to get local address");

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.expect("Server error");
        });

        Self {
            url: format!("http://{}", addr),
            organization_id,
            handle,
            state: shared_state,
        }
    }

    /// Get the base URL of the mock server.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// The API root to hand to [`FavroClient::new`].
    pub fn api_url(&self) -> String {
        format!("{}{API_PREFIX}", self.url)
    }

    /// A client pointed at this server, scoped to the fixture organization.
    pub fn client(&self) -> FavroClient {
        let credentials =
            Credentials::new("mock@example.com", "mock-token").expect("valid mock credentials");
        FavroClient::new(credentials, &self.api_url())
            .expect("valid mock server URL")
            .with_organization(self.organization_id.clone())
    }

    /// Get access to the server's shared state.
    ///
    /// This allows modifying the mock data during a test.
    pub fn state(&self) -> SharedState {
        self.state.clone()
    }

    /// Shutdown the server.
    ///
    /// This aborts the server task. It's safe to call multiple times.
    pub async fn shutdown(self) {
        self.handle.abort();
        let _ = self.handle.await;
    }

    /// Create the axum router with all routes.
    fn create_router(state: SharedState) -> Router {
        let api = Router::new()
            // Organization routes
            .route("/organizations", get(handlers::list_organizations))
            .route("/organizations/:id", get(handlers::get_organization))
            // Collection routes
            .route(
                "/collections",
                get(handlers::list_collections).post(handlers::create_collection),
            )
            .route(
                "/collections/:id",
                get(handlers::get_collection).delete(handlers::delete_collection),
            )
            // Widget routes
            .route("/widgets", get(handlers::list_widgets))
            .route(
                "/widgets/:id",
                get(handlers::get_widget).delete(handlers::delete_widget),
            )
            // Column routes
            .route(
                "/columns",
                get(handlers::list_columns).post(handlers::create_column),
            )
            .route(
                "/columns/:id",
                get(handlers::get_column).delete(handlers::delete_column),
            )
            // Card routes
            .route("/cards", get(handlers::list_cards).post(handlers::create_card))
            .route(
                "/cards/:id",
                get(handlers::get_card)
                    .put(handlers::update_card)
                    .delete(handlers::delete_card),
            )
            .route("/cards/:id/attachment", post(handlers::attach_to_card));

        Router::new()
            .nest(API_PREFIX, api)
            // Health check
            .route("/health", get(health_check))
            .layer(middleware::from_fn_with_state(state.clone(), gateway))
            .with_state(state)
    }
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "ok"
}

/// What the real API does around every call: auth and scope checks,
/// backend affinity for paged follow-ups, and the request budget.
async fn gateway(State(state): State<SharedState>, request: Request, next: Next) -> Response {
    if !request.uri().path().starts_with(API_PREFIX) {
        return next.run(request).await;
    }

    let (recorded, authorized) = {
        let header = |name: &str| {
            request
                .headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(String::from)
        };
        let recorded = RecordedRequest {
            method: request.method().to_string(),
            path: request.uri().path().to_string(),
            query: request.uri().query().map(String::from),
            host: header("host"),
            backend_id: header(BACKEND_ID_HEADER),
            organization_id: header("organizationid"),
            content_type: header("content-type"),
        };
        let authorized = header("authorization")
            .map(|auth| auth.starts_with("Basic "))
            .unwrap_or(false);
        (recorded, authorized)
    };

    let (remaining, backend_id) = {
        let mut state = state.write().await;
        state.request_log.push(recorded.clone());

        if !authorized {
            return handlers::error(StatusCode::UNAUTHORIZED, "Missing basic authentication");
        }

        let org_exempt = recorded
            .path
            .starts_with(&format!("{API_PREFIX}/organizations"));
        if !org_exempt && recorded.organization_id.is_none() {
            return handlers::error(StatusCode::BAD_REQUEST, "organizationId header is required");
        }

        let is_follow_up = recorded
            .query
            .as_deref()
            .map(|q| q.split('&').any(|pair| pair.starts_with("requestId=")))
            .unwrap_or(false);
        if is_follow_up && recorded.backend_id.as_deref() != Some(state.backend_id.as_str()) {
            return handlers::error(StatusCode::BAD_REQUEST, "requestId belongs to another backend");
        }

        let remaining = match state.requests_remaining {
            Some(n) if n <= 0 => {
                let mut response =
                    handlers::error(StatusCode::TOO_MANY_REQUESTS, "Request limit exceeded");
                stamp(&mut response, Some(0), &state.backend_id);
                return response;
            }
            Some(n) => {
                state.requests_remaining = Some(n - 1);
                Some(n - 1)
            }
            None => None,
        };
        (remaining, state.backend_id.clone())
    };

    let mut response = next.run(request).await;
    stamp(&mut response, remaining, &backend_id);
    response
}

/// Add the rate-limit and backend headers to a response.
fn stamp(response: &mut Response, remaining: Option<i64>, backend_id: &str) {
    let headers = response.headers_mut();
    if let Ok(value) = HeaderValue::from_str(backend_id) {
        headers.insert(HeaderName::from_static("x-favro-backend-identifier"), value);
    }
    if let Some(remaining) = remaining {
        headers.insert(
            HeaderName::from_static("x-ratelimit-remaining"),
            HeaderValue::from(remaining),
        );
        let resets_at = (Utc::now() + Duration::hours(1)).to_rfc3339();
        if let Ok(value) = HeaderValue::from_str(&resets_at) {
            headers.insert(HeaderName::from_static("x-ratelimit-reset"), value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Card, Collection, FavroError, Get, List};
    use axum::body::Body;
    use axum::http::Request as HttpRequest;
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_server_starts_and_responds() {
        let server = MockServer::start().await;

        // Server should be accessible
        let client = reqwest::Client::new();
        let response = client
            .get(format!("{}/health", server.url()))
            .send()
            .await
            .expect("Failed to send request");

        assert!(response.status().is_success());
        assert_eq!(response.text().await.unwrap(), "ok");

        server.shutdown().await;
    }

    #[tokio::test]
    async fn test_router_requires_basic_auth() {
        let router = MockServer::create_router(Fixtures::default_scenario().shared());

        let response = router
            .oneshot(
                HttpRequest::builder()
                    .uri("/api/v1/cards?widgetCommonId=widget-1")
                    .header("organizationId", "org-1")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_router_requires_organization() {
        let router = MockServer::create_router(Fixtures::default_scenario().shared());

        let response = router
            .oneshot(
                HttpRequest::builder()
                    .uri("/api/v1/collections")
                    .header("Authorization", "Basic bWU6dG9rZW4=")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_router_pins_follow_ups_to_backend() {
        let state = Fixtures::default_scenario().with_backend_id("shard-1").shared();
        let router = MockServer::create_router(state.clone());

        let response = router
            .oneshot(
                HttpRequest::builder()
                    .uri("/api/v1/cards?widgetCommonId=widget-1&requestId=r1&page=1")
                    .header("Authorization", "Basic bWU6dG9rZW4=")
                    .header("organizationId", "org-1")
                    .header("X-Favro-Backend-Identifier", "shard-2")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let state = state.read().await;
        assert_eq!(state.request_log.len(), 1);
        assert_eq!(state.request_log[0].backend_id.as_deref(), Some("shard-2"));
    }

    #[tokio::test]
    async fn test_get_card_with_favro_client() {
        let server = MockServer::start().await;
        let client = server.client();

        let card = Card::get(&client, "card-1").await.expect("Failed to get card");

        assert_eq!(card.name, "Card 1");
        assert_eq!(client.session().backend_id.as_deref(), Some("backend-1"));

        server.shutdown().await;
    }

    #[tokio::test]
    async fn test_list_collections_with_favro_client() {
        let server = MockServer::start().await;
        let client = server.client();

        let mut collections = Collection::list(&client, &Default::default()).unwrap();
        let all = collections.all_entities().await.expect("Failed to list");

        assert_eq!(all.len(), 1);
        assert_eq!(all[0].name, "Roadmap");

        server.shutdown().await;
    }

    #[tokio::test]
    async fn test_empty_server() {
        let server = MockServer::start_empty().await;
        let client = server.client();

        let result = Card::get(&client, "nonexistent").await;

        assert!(matches!(result, Err(FavroError::NotFound { .. })));

        server.shutdown().await;
    }

    #[tokio::test]
    async fn test_budget_runs_out() {
        let server = MockServer::with_state(Fixtures::default_scenario().with_budget(1)).await;
        let client = server.client();

        Card::get(&client, "card-1").await.expect("first request fits the budget");
        assert_eq!(client.session().requests_remaining, Some(0));

        let refused = Card::get(&client, "card-2").await;
        assert!(matches!(refused, Err(FavroError::BudgetExhausted { .. })));
        assert_eq!(server.state().read().await.request_log.len(), 1);

        server.shutdown().await;
    }
}
