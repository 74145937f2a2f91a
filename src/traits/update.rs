//! Update trait for modifying entities.

use async_trait::async_trait;
use serde::Serialize;

use crate::client::{FavroClient, Method, RequestBody, RequestOptions};
use crate::entities::{Entity, Hydrate};
use crate::error::Result;

/// Update an existing entity.
///
/// # Example
///
/// ```ignore
/// use favroapi::{Card, CardUpdateParams, FavroClient, Get, Update};
///
/// let client = FavroClient::from_env()?;
/// let mut card = Card::get(&client, "card-id").await?;
/// card.update(CardUpdateParams {
///     name: Some("New name".to_string()),
///     ..Default::default()
/// })
/// .await?;
/// ```
#[async_trait]
pub trait Update: Hydrate + Sized {
    /// Parameters for the update.
    type Params: Serialize + Send + Sync;

    /// Path of the endpoint that updates `id`.
    fn update_path(id: &str) -> String;

    /// Options for the request, before the body is attached.
    fn update_options() -> RequestOptions {
        RequestOptions::new()
            .method(Method::Put)
            .requires_organization()
    }

    /// Update the entity and return the updated version.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found or the request fails.
    async fn update(client: &FavroClient, id: &str, params: &Self::Params) -> Result<Entity<Self>> {
        tracing::debug!(entity_type = Self::ENTITY_TYPE, id = id, "updating entity");
        let options = Self::update_options().body(RequestBody::json(params)?);
        let response = client.request(&Self::update_path(id), options).await?;
        let raw = response.json()?;
        Entity::hydrate(&raw, client)
    }
}

impl<T: Update> Entity<T> {
    /// Write `params` and refresh this entity from the server's answer.
    pub async fn update(&mut self, params: &T::Params) -> Result<()> {
        let updated = T::update(self.client(), self.id(), params).await?;
        self.refresh(updated.raw().clone())
    }
}
