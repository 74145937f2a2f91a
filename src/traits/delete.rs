//! Delete trait for removing entities.

use async_trait::async_trait;

use crate::client::{FavroClient, Method, RequestOptions};
use crate::entities::{Entity, Hydrate};
use crate::error::Result;

/// Delete an entity by ID.
#[async_trait]
pub trait Delete: Hydrate + Sized {
    /// Path of the endpoint that deletes `id`.
    fn delete_path(id: &str) -> String;

    /// Delete the entity.
    ///
    /// # Errors
    ///
    /// Returns an error for any non-success status.
    async fn delete(client: &FavroClient, id: &str) -> Result<()> {
        tracing::debug!(entity_type = Self::ENTITY_TYPE, id = id, "deleting entity");
        let options = RequestOptions::new()
            .method(Method::Delete)
            .requires_organization();
        client.request(&Self::delete_path(id), options).await?;
        Ok(())
    }
}

impl<T: Delete> Entity<T> {
    /// Delete this entity on the server using the client that fetched it.
    pub async fn delete(&self) -> Result<()> {
        T::delete(self.client(), self.id()).await
    }
}
