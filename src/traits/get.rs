//! Get trait for fetching single entities.

use async_trait::async_trait;

use crate::client::{FavroClient, RequestOptions};
use crate::entities::{Entity, Hydrate};
use crate::error::{FavroError, Result};

/// Fetch a single entity by ID.
///
/// # Example
///
/// ```ignore
/// use favroapi::{Card, FavroClient, Get};
///
/// let client = FavroClient::from_env()?;
/// let card = Card::get(&client, "card-id").await?;
/// ```
#[async_trait]
pub trait Get: Hydrate + Sized {
    /// Path of the single-entity endpoint for `id`.
    fn get_path(id: &str) -> String;

    /// Options for the request. Most endpoints need an organization.
    fn get_options() -> RequestOptions {
        RequestOptions::new().requires_organization()
    }

    /// Fetch the entity by ID.
    ///
    /// # Errors
    ///
    /// Returns [`FavroError::NotFound`] on a 404, or any dispatch error.
    async fn get(client: &FavroClient, id: &str) -> Result<Entity<Self>> {
        tracing::debug!(entity_type = Self::ENTITY_TYPE, id = id, "fetching entity");
        let response = client
            .request(&Self::get_path(id), Self::get_options().accept_status(404))
            .await?;

        let not_found = || FavroError::NotFound {
            entity_type: Self::ENTITY_TYPE,
            id: id.to_string(),
        };
        if response.status() == 404 {
            return Err(not_found());
        }

        // Single-entity endpoints answer with a bare record, or with a
        // one-entity envelope for a few of them.
        let raw = response
            .entities_data()?
            .into_iter()
            .next()
            .ok_or_else(not_found)?;
        Entity::hydrate(&raw, client)
    }
}
