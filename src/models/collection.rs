//! Collection model and trait implementations.

use serde::{Deserialize, Serialize};

use crate::client::{FavroClient, Method, RequestBody, RequestOptions};
use crate::entities::{Entity, EntityList, Hydrate};
use crate::error::Result;
use crate::models::widget::{Widget, WidgetListQuery};
use crate::traits::{entity_path, Delete, Get, List, Update};

/// A Favro collection.
///
/// Collections group widgets (boards and backlogs) and control who can
/// see them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Collection {
    /// The collection ID.
    pub collection_id: String,

    /// The organization the collection belongs to.
    pub organization_id: String,

    /// Collection name.
    pub name: String,

    /// Users the collection is shared with.
    #[serde(default)]
    pub shared_to_users: Vec<CollectionMember>,

    /// Public sharing level, e.g. "users" or "organization".
    #[serde(default)]
    pub public_sharing: Option<String>,

    /// Background style.
    #[serde(default)]
    pub background: Option<String>,

    /// Whether the collection is archived.
    #[serde(default)]
    pub archived: bool,

    /// Whether full members may add widgets.
    #[serde(default)]
    pub full_members_can_add_widgets: bool,
}

/// A user a collection is shared with.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionMember {
    pub user_id: String,
    /// Role, e.g. "admin", "edit", "view".
    pub role: String,
}

/// Query parameters for listing collections.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionListQuery {
    /// Include archived collections.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub archived: Option<bool>,
}

/// Parameters for creating a collection.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionCreateParams {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_sharing: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background: Option<String>,
}

/// Parameters for updating a collection.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionUpdateParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub archive: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_sharing: Option<String>,
}

impl Hydrate for Collection {
    const ENTITY_TYPE: &'static str = "Collection";

    fn id(&self) -> &str {
        &self.collection_id
    }
}

impl Get for Collection {
    fn get_path(id: &str) -> String {
        entity_path("collections", id)
    }
}

impl List for Collection {
    type Query = CollectionListQuery;
    const LIST_PATH: &'static str = "collections";

    fn list_options(query: &CollectionListQuery) -> Result<RequestOptions> {
        RequestOptions::new()
            .requires_organization()
            .query_params(query)
    }
}

impl Update for Collection {
    type Params = CollectionUpdateParams;

    fn update_path(id: &str) -> String {
        entity_path("collections", id)
    }
}

impl Delete for Collection {
    fn delete_path(id: &str) -> String {
        entity_path("collections", id)
    }
}

impl Collection {
    /// Create a collection in the client's organization.
    pub async fn create(
        client: &FavroClient,
        params: &CollectionCreateParams,
    ) -> Result<Entity<Collection>> {
        let options = RequestOptions::new()
            .method(Method::Post)
            .requires_organization()
            .body(RequestBody::json(params)?);
        let response = client.request(Self::LIST_PATH, options).await?;
        Entity::hydrate(&response.json()?, client)
    }
}

impl Entity<Collection> {
    /// List the widgets in this collection.
    pub fn widgets(&self) -> Result<EntityList<Widget>> {
        Widget::list(self.client(), &WidgetListQuery::in_collection(self.id()))
    }
}
