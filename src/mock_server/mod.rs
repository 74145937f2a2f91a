//! Mock Favro API server for E2E testing.
//!
//! An in-memory server that simulates the Favro API, including the paging
//! protocol (`requestId` cursors pinned to one backend) and the rate-limit
//! headers. Unlike wiremock, which mocks at the HTTP level per-test, this
//! server keeps state across requests, enabling realistic workflow tests.
//!
//! # Example
//!
//! ```ignore
//! use favroapi::mock_server::MockServer;
//! use favroapi::{Card, Get};
//!
//! #[tokio::test]
//! async fn test_workflow() {
//!     let server = MockServer::start().await;
//!     let client = server.client();
//!
//!     // Server comes with default fixtures
//!     let card = Card::get(&client, "card-1").await.unwrap();
//!     assert_eq!(card.name, "Card 1");
//!
//!     server.shutdown().await;
//! }
//! ```

mod fixtures;
mod handlers;
mod server;
mod state;

pub use fixtures::Fixtures;
pub use server::MockServer;
pub use state::{MockState, RecordedRequest};
