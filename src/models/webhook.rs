//! Webhook model and trait implementations.

use serde::{Deserialize, Serialize};

use crate::client::{FavroClient, Method, RequestBody, RequestOptions};
use crate::entities::{Entity, Hydrate};
use crate::error::Result;
use crate::traits::{entity_path, Delete, List};

/// A webhook posting widget events to an external URL.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Webhook {
    pub webhook_id: String,
    pub widget_common_id: String,
    pub name: String,
    pub options: WebhookOptions,
}

/// Delivery settings for a webhook.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookOptions {
    pub post_to_url: String,
    /// Shared secret used to sign deliveries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret: Option<String>,
}

/// Parameters for creating a webhook.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookCreateParams {
    pub widget_common_id: String,
    pub name: String,
    pub options: WebhookOptions,
}

impl Hydrate for Webhook {
    const ENTITY_TYPE: &'static str = "Webhook";

    fn id(&self) -> &str {
        &self.webhook_id
    }
}

impl List for Webhook {
    type Query = ();
    const LIST_PATH: &'static str = "webhooks";

    fn list_options(_query: &()) -> Result<RequestOptions> {
        Ok(RequestOptions::new().requires_organization())
    }
}

impl Delete for Webhook {
    fn delete_path(id: &str) -> String {
        entity_path("webhooks", id)
    }
}

impl Webhook {
    /// Register a webhook on a widget.
    pub async fn create(client: &FavroClient, params: &WebhookCreateParams) -> Result<Entity<Webhook>> {
        let options = RequestOptions::new()
            .method(Method::Post)
            .requires_organization()
            .body(RequestBody::json(params)?);
        let response = client.request(Self::LIST_PATH, options).await?;
        Entity::hydrate(&response.json()?, client)
    }
}
