//! Card model and trait implementations.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::client::{FavroClient, Method, RequestBody, RequestOptions};
use crate::entities::{Entity, Hydrate};
use crate::error::{FavroError, Result};
use crate::traits::{entity_path, Delete, Get, List, Update};

/// A Favro card.
///
/// A card has a `cardCommonId` shared by every widget it appears on, and a
/// distinct `cardId` per widget instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    /// ID of this card instance.
    pub card_id: String,

    /// ID shared by all instances of the card.
    pub card_common_id: String,

    pub organization_id: String,

    /// Widget this instance lives on, if it is on one.
    #[serde(default)]
    pub widget_common_id: Option<String>,

    #[serde(default)]
    pub column_id: Option<String>,

    #[serde(default)]
    pub lane_id: Option<String>,

    #[serde(default)]
    pub parent_card_id: Option<String>,

    #[serde(default)]
    pub is_lane: bool,

    #[serde(default)]
    pub archived: bool,

    #[serde(default)]
    pub position: Option<f64>,

    #[serde(default)]
    pub list_position: Option<f64>,

    pub name: String,

    /// Description, in the format requested when the card was fetched.
    #[serde(default)]
    pub detailed_description: Option<String>,

    #[serde(default)]
    pub tags: Vec<String>,

    /// Organization-wide sequential number (the "#123" in the UI).
    #[serde(default)]
    pub sequential_id: Option<u64>,

    #[serde(default)]
    pub start_date: Option<String>,

    #[serde(default)]
    pub due_date: Option<String>,

    #[serde(default)]
    pub assignments: Vec<CardAssignment>,

    #[serde(default)]
    pub num_comments: u32,

    #[serde(default)]
    pub tasks_total: u32,

    #[serde(default)]
    pub tasks_done: u32,

    #[serde(default)]
    pub attachments: Vec<CardAttachment>,

    #[serde(default)]
    pub custom_fields: Vec<CardCustomFieldValue>,
}

/// A user assigned to a card.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardAssignment {
    pub user_id: String,
    #[serde(default)]
    pub completed: bool,
}

/// A file attached to a card.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardAttachment {
    pub name: String,
    pub file_url: String,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
}

/// A custom field value set on a card. The value shape depends on the
/// field type, so it stays untyped here.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardCustomFieldValue {
    pub custom_field_id: String,
    #[serde(default)]
    pub value: Option<Value>,
    #[serde(default)]
    pub total: Option<f64>,
}

impl Card {
    /// Whether the card is assigned to `user_id`.
    pub fn is_assigned_to(&self, user_id: &str) -> bool {
        self.assignments.iter().any(|a| a.user_id == user_id)
    }

    /// The value of a custom field, if set.
    pub fn custom_field(&self, custom_field_id: &str) -> Option<&CardCustomFieldValue> {
        self.custom_fields
            .iter()
            .find(|f| f.custom_field_id == custom_field_id)
    }

    /// Whether every task on the card is done.
    pub fn tasks_complete(&self) -> bool {
        self.tasks_done >= self.tasks_total
    }
}

/// Query parameters for listing cards.
///
/// Favro requires at least one of the scoping filters (widget, collection,
/// column, card common ID or sequential ID).
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CardListQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub widget_common_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub collection_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub column_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub card_common_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub sequential_id: Option<u64>,

    /// Return one instance per card common ID.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unique: Option<bool>,

    /// Only cards on the requesting user's todo list.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub todo_list: Option<bool>,

    /// "markdown" to get descriptions as markdown.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description_format: Option<String>,
}

impl CardListQuery {
    /// Cards on one widget.
    pub fn for_widget(widget_common_id: &str) -> Self {
        Self {
            widget_common_id: Some(widget_common_id.to_string()),
            ..Default::default()
        }
    }

    /// Cards anywhere in one collection.
    pub fn for_collection(collection_id: &str) -> Self {
        Self {
            collection_id: Some(collection_id.to_string()),
            ..Default::default()
        }
    }

    /// The card with a given sequential ID.
    pub fn for_sequential_id(sequential_id: u64) -> Self {
        Self {
            sequential_id: Some(sequential_id),
            ..Default::default()
        }
    }

    fn is_scoped(&self) -> bool {
        self.widget_common_id.is_some()
            || self.collection_id.is_some()
            || self.column_id.is_some()
            || self.card_common_id.is_some()
            || self.sequential_id.is_some()
            || self.todo_list == Some(true)
    }
}

/// Parameters for creating a card.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CardCreateParams {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub widget_common_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detailed_description: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

/// Parameters for updating a card.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CardUpdateParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detailed_description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub archive: Option<bool>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub add_tags: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub remove_tags: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub add_assignment_ids: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub remove_assignment_ids: Vec<String>,
}

impl Hydrate for Card {
    const ENTITY_TYPE: &'static str = "Card";

    fn id(&self) -> &str {
        &self.card_id
    }
}

impl Get for Card {
    fn get_path(id: &str) -> String {
        entity_path("cards", id)
    }
}

impl List for Card {
    type Query = CardListQuery;
    const LIST_PATH: &'static str = "cards";

    fn list_options(query: &CardListQuery) -> Result<RequestOptions> {
        if !query.is_scoped() {
            return Err(FavroError::InvalidQuery(
                "listing cards needs a widget, collection, column, card or sequential ID"
                    .to_string(),
            ));
        }
        RequestOptions::new()
            .requires_organization()
            .query_params(query)
    }
}

impl Update for Card {
    type Params = CardUpdateParams;

    fn update_path(id: &str) -> String {
        entity_path("cards", id)
    }

    fn update_options() -> RequestOptions {
        RequestOptions::new()
            .method(Method::Put)
            .requires_organization()
            .query("descriptionFormat", "markdown")
    }
}

impl Delete for Card {
    fn delete_path(id: &str) -> String {
        entity_path("cards", id)
    }
}

impl Card {
    /// Create a card.
    pub async fn create(client: &FavroClient, params: &CardCreateParams) -> Result<Entity<Card>> {
        let options = RequestOptions::new()
            .method(Method::Post)
            .requires_organization()
            .query("descriptionFormat", "markdown")
            .body(RequestBody::json(params)?);
        let response = client.request(Self::LIST_PATH, options).await?;
        Entity::hydrate(&response.json()?, client)
    }
}

impl Entity<Card> {
    /// Upload a file and attach it to this card.
    pub async fn attach(&self, filename: &str, data: Vec<u8>) -> Result<CardAttachment> {
        let path = format!("{}/attachment", entity_path("cards", self.id()));
        let options = RequestOptions::new()
            .method(Method::Post)
            .requires_organization()
            .query("filename", filename)
            .body(RequestBody::Binary(data));
        let response = self.client().request(&path, options).await?;
        response.json()
    }
}
