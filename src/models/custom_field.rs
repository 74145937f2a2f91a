//! Custom field definitions.

use serde::{Deserialize, Serialize};

use crate::client::RequestOptions;
use crate::entities::Hydrate;
use crate::error::Result;
use crate::traits::{entity_path, Get, List};

/// An organization-wide custom field definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomField {
    pub custom_field_id: String,
    pub organization_id: String,
    /// Field type, e.g. "Single select", "Number", "Text".
    #[serde(rename = "type")]
    pub field_type: String,
    pub name: String,
    #[serde(default)]
    pub enabled: bool,
    /// Options for select-type fields.
    #[serde(default)]
    pub custom_field_items: Vec<CustomFieldItem>,
}

/// One selectable option of a select-type field.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomFieldItem {
    pub custom_field_item_id: String,
    pub name: String,
}

impl CustomField {
    /// Look up a select option by name.
    pub fn item_named(&self, name: &str) -> Option<&CustomFieldItem> {
        self.custom_field_items.iter().find(|item| item.name == name)
    }
}

impl Hydrate for CustomField {
    const ENTITY_TYPE: &'static str = "CustomField";

    fn id(&self) -> &str {
        &self.custom_field_id
    }
}

impl Get for CustomField {
    fn get_path(id: &str) -> String {
        entity_path("customfields", id)
    }
}

impl List for CustomField {
    type Query = ();
    const LIST_PATH: &'static str = "customfields";

    fn list_options(_query: &()) -> Result<RequestOptions> {
        Ok(RequestOptions::new().requires_organization())
    }
}
