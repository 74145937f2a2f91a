//! Column model and trait implementations.

use serde::{Deserialize, Serialize};

use crate::client::{FavroClient, Method, RequestBody, RequestOptions};
use crate::entities::{Entity, Hydrate};
use crate::error::{FavroError, Result};
use crate::traits::{entity_path, Delete, Get, List, Update};

/// A column on a board.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    pub column_id: String,
    pub organization_id: String,
    /// The widget this column belongs to.
    pub widget_common_id: String,
    pub name: String,
    /// Zero-based position on the board.
    #[serde(default)]
    pub position: u32,
    #[serde(default)]
    pub card_count: u32,
    /// Total time spent on cards in the column, in milliseconds.
    #[serde(default)]
    pub time_sum: u64,
    #[serde(default)]
    pub estimation_sum: f64,
}

/// Query parameters for listing columns. A widget is required.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnListQuery {
    pub widget_common_id: Option<String>,
}

impl ColumnListQuery {
    /// Columns on one widget.
    pub fn for_widget(widget_common_id: &str) -> Self {
        Self {
            widget_common_id: Some(widget_common_id.to_string()),
        }
    }
}

/// Parameters for creating a column.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnCreateParams {
    pub widget_common_id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<u32>,
}

/// Parameters for updating a column.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnUpdateParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<u32>,
}

impl Hydrate for Column {
    const ENTITY_TYPE: &'static str = "Column";

    fn id(&self) -> &str {
        &self.column_id
    }
}

impl Get for Column {
    fn get_path(id: &str) -> String {
        entity_path("columns", id)
    }
}

impl List for Column {
    type Query = ColumnListQuery;
    const LIST_PATH: &'static str = "columns";

    fn list_options(query: &ColumnListQuery) -> Result<RequestOptions> {
        let widget = query.widget_common_id.as_deref().ok_or_else(|| {
            FavroError::InvalidQuery("a widget is required to list columns".to_string())
        })?;
        Ok(RequestOptions::new()
            .requires_organization()
            .query("widgetCommonId", widget))
    }
}

impl Update for Column {
    type Params = ColumnUpdateParams;

    fn update_path(id: &str) -> String {
        entity_path("columns", id)
    }
}

impl Delete for Column {
    fn delete_path(id: &str) -> String {
        entity_path("columns", id)
    }
}

impl Column {
    /// Create a column on a widget.
    pub async fn create(client: &FavroClient, params: &ColumnCreateParams) -> Result<Entity<Column>> {
        let options = RequestOptions::new()
            .method(Method::Post)
            .requires_organization()
            .body(RequestBody::json(params)?);
        let response = client.request(Self::LIST_PATH, options).await?;
        Entity::hydrate(&response.json()?, client)
    }
}
