//! User model.

use serde::{Deserialize, Serialize};

use crate::client::RequestOptions;
use crate::entities::Hydrate;
use crate::error::Result;
use crate::traits::List;

/// A user in the current organization.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub user_id: String,
    pub name: String,
    pub email: String,
    /// Role in the organization, e.g. "administrator".
    #[serde(default)]
    pub organization_role: Option<String>,
}

impl Hydrate for User {
    const ENTITY_TYPE: &'static str = "User";

    fn id(&self) -> &str {
        &self.user_id
    }
}

impl List for User {
    type Query = ();
    const LIST_PATH: &'static str = "users";

    fn list_options(_query: &()) -> Result<RequestOptions> {
        Ok(RequestOptions::new().requires_organization())
    }
}
