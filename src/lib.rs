//! Favro API client library.
//!
//! A Rust library for the Favro REST API built around a rate-limit aware
//! request dispatcher and a lazy, resumable page walker. Each operation
//! (Get, List, Update, Delete) is a trait that entity types implement.
//!
//! # Quick Start
//!
//! ```no_run
//! use favroapi::{Card, CardListQuery, Collection, FavroClient, Get, List};
//!
//! #[tokio::main]
//! async fn main() -> favroapi::Result<()> {
//!     // Create client from environment variables
//!     let client = FavroClient::from_env()?;
//!
//!     // List every collection (one request per page)
//!     let mut collections = Collection::list(&client, &Default::default())?;
//!     for collection in collections.all_entities().await? {
//!         println!("Collection: {}", collection.name);
//!     }
//!
//!     // Page through cards one page at a time
//!     let mut cards = Card::list(&client, &CardListQuery::for_widget("widget-id"))?;
//!     while let Some(page) = cards.fetch_next_page().await? {
//!         println!("Got {} more cards", page.len());
//!     }
//!
//!     // Get a card and delete it
//!     let card = Card::get(&client, "card-id").await?;
//!     card.delete().await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! - [`FavroClient::request`] sends exactly one request, attaching auth,
//!   organization and backend-affinity headers, and tracks the request
//!   budget in a [`SessionState`]. Once the budget is spent, requests are
//!   refused locally.
//! - [`FavroResponse`] classifies a body as a single record, an array, or
//!   one page of a paged envelope, and knows how to request the next page.
//! - [`EntityList`] walks the pages of one query, hydrating each page into
//!   typed [`Entity`] values as it arrives.
//!
//! # Configuration
//!
//! The client reads configuration from environment variables:
//!
//! - `FAVRO_TOKEN` (required) - Your Favro API token
//! - `FAVRO_USER_EMAIL` (required) - The email of the token's user
//! - `FAVRO_ORGANIZATION_ID` (optional) - Organization to scope requests to
//! - `FAVRO_API_URL` (optional) - Base URL (defaults to `https://favro.com/api/v1`)

pub mod cli;
mod client;
mod entities;
mod error;
mod models;
pub mod output;
mod pagination;
mod response;
mod session;
mod traits;

#[cfg(feature = "test-server")]
pub mod mock_server;

// Re-export core types
pub use client::{
    Credentials, FavroClient, Method, RequestBody, RequestOptions, FAVRO_HOST,
    ORGANIZATION_HEADER,
};
pub use entities::{Entity, EntityList, Hydrate};
pub use error::{FavroError, Result};
pub use pagination::{PageCursor, PagedEnvelope, WalkState, PAGE_PARAM, REQUEST_ID_PARAM};
pub use response::{
    FavroResponse, ResponseBody, BACKEND_ID_HEADER, RATE_LIMIT_REMAINING_HEADER,
    RATE_LIMIT_RESET_HEADER,
};
pub use session::SessionState;

// Re-export traits
pub use traits::{Delete, Get, List, Update};

// Re-export models
pub use models::{
    // Organization types
    Organization,
    OrganizationMember,
    // User types
    User,
    // Collection types
    Collection,
    CollectionCreateParams,
    CollectionListQuery,
    CollectionMember,
    CollectionUpdateParams,
    // Widget types
    Widget,
    WidgetListQuery,
    // Column types
    Column,
    ColumnCreateParams,
    ColumnListQuery,
    ColumnUpdateParams,
    // Card types
    Card,
    CardAssignment,
    CardAttachment,
    CardCreateParams,
    CardCustomFieldValue,
    CardListQuery,
    CardUpdateParams,
    // Custom field types
    CustomField,
    CustomFieldItem,
    // Webhook types
    Webhook,
    WebhookCreateParams,
    WebhookOptions,
};
