//! Widget (board/backlog) model and trait implementations.

use serde::{Deserialize, Serialize};

use crate::client::RequestOptions;
use crate::entities::{Entity, EntityList, Hydrate};
use crate::error::Result;
use crate::models::card::{Card, CardListQuery};
use crate::models::column::{Column, ColumnListQuery};
use crate::traits::{entity_path, Delete, Get, List};

/// A Favro widget: a board or a backlog.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Widget {
    /// The widget's common ID, shared across the collections it appears in.
    pub widget_common_id: String,

    pub organization_id: String,

    /// Collections the widget appears in.
    #[serde(default)]
    pub collection_ids: Vec<String>,

    pub name: String,

    /// Widget type: "board" or "backlog".
    #[serde(rename = "type", default)]
    pub widget_type: Option<String>,

    /// Card this widget is a breakdown of, if any.
    #[serde(default)]
    pub breakdown_card_common_id: Option<String>,

    #[serde(default)]
    pub color: Option<String>,

    #[serde(default)]
    pub owner_role: Option<String>,

    #[serde(default)]
    pub edit_role: Option<String>,
}

impl Widget {
    /// Whether this widget is a backlog rather than a board.
    pub fn is_backlog(&self) -> bool {
        self.widget_type.as_deref() == Some("backlog")
    }
}

/// Query parameters for listing widgets.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetListQuery {
    /// Only widgets in this collection.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collection_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub archived: Option<bool>,
}

impl WidgetListQuery {
    /// Widgets in one collection.
    pub fn in_collection(collection_id: &str) -> Self {
        Self {
            collection_id: Some(collection_id.to_string()),
            ..Default::default()
        }
    }
}

impl Hydrate for Widget {
    const ENTITY_TYPE: &'static str = "Widget";

    fn id(&self) -> &str {
        &self.widget_common_id
    }
}

impl Get for Widget {
    fn get_path(id: &str) -> String {
        entity_path("widgets", id)
    }
}

impl List for Widget {
    type Query = WidgetListQuery;
    const LIST_PATH: &'static str = "widgets";

    fn list_options(query: &WidgetListQuery) -> Result<RequestOptions> {
        RequestOptions::new()
            .requires_organization()
            .query_params(query)
    }
}

impl Delete for Widget {
    fn delete_path(id: &str) -> String {
        entity_path("widgets", id)
    }
}

impl Entity<Widget> {
    /// List the columns on this widget.
    pub fn columns(&self) -> Result<EntityList<Column>> {
        Column::list(self.client(), &ColumnListQuery::for_widget(self.id()))
    }

    /// List the cards on this widget.
    pub fn cards(&self) -> Result<EntityList<Card>> {
        Card::list(self.client(), &CardListQuery::for_widget(self.id()))
    }
}
