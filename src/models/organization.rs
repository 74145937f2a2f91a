//! Organization model.

use serde::{Deserialize, Serialize};

use crate::client::RequestOptions;
use crate::entities::Hydrate;
use crate::error::Result;
use crate::traits::{entity_path, Get, List};

/// A Favro organization.
///
/// Organizations are the top-level scope; nearly every other request is
/// made on behalf of one via the `organizationId` header.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Organization {
    /// The organization ID.
    pub organization_id: String,

    /// Organization name.
    pub name: String,

    /// Members of the organization.
    #[serde(default)]
    pub shared_to_users: Vec<OrganizationMember>,
}

/// A user's membership in an organization.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationMember {
    pub user_id: String,
    /// Role, e.g. "administrator", "fullMember", "guest".
    pub role: String,
    #[serde(default)]
    pub join_date: Option<String>,
}

impl Hydrate for Organization {
    const ENTITY_TYPE: &'static str = "Organization";

    fn id(&self) -> &str {
        &self.organization_id
    }
}

impl Get for Organization {
    fn get_path(id: &str) -> String {
        entity_path("organizations", id)
    }

    // Organizations are looked up before a scope is chosen.
    fn get_options() -> RequestOptions {
        RequestOptions::new().exclude_organization()
    }
}

impl List for Organization {
    type Query = ();
    const LIST_PATH: &'static str = "organizations";

    fn list_options(_query: &()) -> Result<RequestOptions> {
        Ok(RequestOptions::new().exclude_organization())
    }
}
