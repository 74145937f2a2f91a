//! List trait for fetching collections of entities.

use crate::client::{FavroClient, RequestOptions};
use crate::entities::{EntityList, Hydrate};
use crate::error::Result;

/// List entities of a type, lazily and page by page.
///
/// Listing makes no request by itself: the returned [`EntityList`] issues
/// the first request on its first fetch.
///
/// # Example
///
/// ```ignore
/// use favroapi::{Collection, FavroClient, List};
///
/// let client = FavroClient::from_env()?;
///
/// // Fetch a single page
/// let mut collections = Collection::list(&client, &Default::default())?;
/// let first_page = collections.fetch_next_page().await?;
///
/// // Fetch all pages
/// let all = collections.all_entities().await?;
/// ```
pub trait List: Hydrate + Sized {
    /// Query parameters for filtering.
    type Query: Default + Send + Sync;

    /// Path of the list endpoint.
    const LIST_PATH: &'static str;

    /// Build the request options for a query.
    ///
    /// # Errors
    ///
    /// Returns an error if the query is missing a required filter.
    fn list_options(query: &Self::Query) -> Result<RequestOptions>;

    /// Start listing entities matching the query.
    fn list(client: &FavroClient, query: &Self::Query) -> Result<EntityList<Self>> {
        Ok(EntityList::lazy(
            client,
            Self::LIST_PATH,
            Self::list_options(query)?,
        ))
    }
}
