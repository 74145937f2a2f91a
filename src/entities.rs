//! Typed entities and lazily hydrated entity lists.
//!
//! An [`EntityList`] walks the pages of one logical query. Raw page payloads
//! are converted to [`Entity`] values one page at a time and appended, in
//! arrival order, to an accumulator that only ever grows.

use std::fmt;
use std::ops::Deref;

use serde::de::DeserializeOwned;
use serde::{Serialize, Serializer};
use serde_json::Value;

use crate::client::{FavroClient, RequestOptions};
use crate::error::{FavroError, Result};
use crate::pagination::WalkState;
use crate::response::FavroResponse;

/// A record type that can be built from one raw JSON record.
pub trait Hydrate: DeserializeOwned + Send + Sync {
    /// Human-readable entity name, used in errors.
    const ENTITY_TYPE: &'static str;

    /// The record's primary identifier.
    fn id(&self) -> &str;
}

/// A read-only typed record plus the client that produced it.
///
/// Dereferences to the record type. The raw JSON the record was built from
/// is kept alongside and is what gets serialized.
#[derive(Clone)]
pub struct Entity<T> {
    record: T,
    raw: Value,
    client: FavroClient,
}

impl<T: Hydrate> Entity<T> {
    /// Build an entity from a raw record, validating its shape.
    ///
    /// # Errors
    ///
    /// [`FavroError::Hydration`] if the record does not match `T`.
    pub fn hydrate(raw: &Value, client: &FavroClient) -> Result<Self> {
        let record = T::deserialize(raw).map_err(|source| FavroError::Hydration {
            entity_type: T::ENTITY_TYPE,
            source,
        })?;
        Ok(Self {
            record,
            raw: raw.clone(),
            client: client.clone(),
        })
    }

    /// The record's primary identifier.
    pub fn id(&self) -> &str {
        self.record.id()
    }

    /// Swap in a fresh record after a successful write.
    pub(crate) fn refresh(&mut self, raw: Value) -> Result<()> {
        let fresh = Self::hydrate(&raw, &self.client)?;
        self.record = fresh.record;
        self.raw = fresh.raw;
        Ok(())
    }
}

impl<T> Entity<T> {
    /// The typed record.
    pub fn record(&self) -> &T {
        &self.record
    }

    /// The JSON this entity was built from.
    pub fn raw(&self) -> &Value {
        &self.raw
    }

    /// The client that fetched this entity.
    pub fn client(&self) -> &FavroClient {
        &self.client
    }

    /// Drop the client and keep the record.
    pub fn into_record(self) -> T {
        self.record
    }
}

impl<T> Deref for Entity<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.record
    }
}

impl<T: fmt::Debug> fmt::Debug for Entity<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.record, f)
    }
}

impl<T> Serialize for Entity<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> core::result::Result<S::Ok, S::Error> {
        self.raw.serialize(serializer)
    }
}

/// A lazily paged, incrementally hydrated list of entities for one query.
///
/// Two lists built from the same query are independent: nothing is shared
/// or deduplicated between them.
///
/// # Example
///
/// ```no_run
/// use favroapi::{Card, CardListQuery, FavroClient, List};
///
/// # async fn example() -> favroapi::Result<()> {
/// let client = FavroClient::from_env()?;
/// let mut cards = Card::list(&client, &CardListQuery::for_widget("widget-id"))?;
///
/// // Stop paging as soon as a match shows up
/// let found = cards.find(|card| card.name == "Release notes").await?;
/// println!("found: {:?}", found.map(|card| card.id()));
/// # Ok(())
/// # }
/// ```
pub struct EntityList<T> {
    client: FavroClient,
    initial: Option<(String, RequestOptions)>,
    latest: Option<FavroResponse>,
    state: WalkState,
    entities: Vec<Entity<T>>,
    pages_fetched: usize,
}

impl<T> fmt::Debug for EntityList<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityList")
            .field("state", &self.state)
            .field("pages_fetched", &self.pages_fetched)
            .field("entities", &self.entities.len())
            .finish_non_exhaustive()
    }
}

impl<T: Hydrate> EntityList<T> {
    /// A list whose first request has not been made yet.
    pub fn lazy(client: &FavroClient, path: impl Into<String>, options: RequestOptions) -> Self {
        Self {
            client: client.clone(),
            initial: Some((path.into(), options)),
            latest: None,
            state: WalkState::Empty,
            entities: Vec::new(),
            pages_fetched: 0,
        }
    }

    /// A list seeded with an already fetched first page.
    pub fn from_response(client: &FavroClient, response: FavroResponse) -> Self {
        Self {
            client: client.clone(),
            initial: None,
            latest: Some(response),
            state: WalkState::HasUnhydratedPage,
            entities: Vec::new(),
            pages_fetched: 1,
        }
    }

    /// Where the page walk stands.
    pub fn state(&self) -> WalkState {
        self.state
    }

    /// True once the last page has been hydrated.
    pub fn is_exhausted(&self) -> bool {
        self.state == WalkState::Exhausted
    }

    /// Number of pages received so far.
    pub fn pages_fetched(&self) -> usize {
        self.pages_fetched
    }

    /// Convert the pending page, if there is one.
    ///
    /// Returns the newly hydrated entities, or `None` when nothing was
    /// pending. Calling it twice in a row is a no-op the second time.
    /// A page that fails to hydrate stays pending and adds nothing.
    pub fn hydrate(&mut self) -> Result<Option<&[Entity<T>]>> {
        if self.state != WalkState::HasUnhydratedPage {
            return Ok(None);
        }
        let Some(page) = &self.latest else {
            return Ok(None);
        };

        let hydrated = page
            .entities_data()?
            .iter()
            .map(|raw| Entity::hydrate(raw, &self.client))
            .collect::<Result<Vec<_>>>()?;
        let is_last = page.is_last_page()?;

        let start = self.entities.len();
        self.entities.extend(hydrated);
        self.state = if is_last {
            WalkState::Exhausted
        } else {
            WalkState::Hydrated
        };

        tracing::debug!(
            entity_type = T::ENTITY_TYPE,
            added = self.entities.len() - start,
            total = self.entities.len(),
            exhausted = is_last,
            "hydrated page"
        );
        Ok(Some(&self.entities[start..]))
    }

    /// Flush any pending page, then fetch and hydrate the next one.
    ///
    /// Returns only the entities from the newly fetched page, or `None` when
    /// there are no more pages (in which case nothing is sent). On error the
    /// entities hydrated so far are kept and the walk can be resumed.
    pub async fn fetch_next_page(&mut self) -> Result<Option<&[Entity<T>]>> {
        self.hydrate()?;

        let response = match self.state {
            WalkState::Empty => {
                let Some((path, options)) = &self.initial else {
                    self.state = WalkState::Exhausted;
                    return Ok(None);
                };
                self.client.request(path, options.clone()).await?
            }
            WalkState::Hydrated => {
                let next = match &self.latest {
                    Some(latest) => latest.next_page(&self.client).await?,
                    None => None,
                };
                match next {
                    Some(response) => response,
                    None => {
                        self.state = WalkState::Exhausted;
                        return Ok(None);
                    }
                }
            }
            WalkState::HasUnhydratedPage | WalkState::Exhausted => return Ok(None),
        };

        self.initial = None;
        self.latest = Some(response);
        self.state = WalkState::HasUnhydratedPage;
        self.pages_fetched += 1;
        self.hydrate()
    }

    /// Fetch every remaining page and return everything in arrival order.
    pub async fn all_entities(&mut self) -> Result<&[Entity<T>]> {
        while self.fetch_next_page().await?.is_some() {}
        Ok(&self.entities)
    }

    /// Everything hydrated so far, without fetching more pages.
    pub fn fetched_entities(&mut self) -> Result<&[Entity<T>]> {
        self.hydrate()?;
        Ok(&self.entities)
    }

    /// Page through the query until an entity matches.
    ///
    /// Already fetched entities are checked first; paging stops at the
    /// first page containing a match.
    pub async fn find<F>(&mut self, mut predicate: F) -> Result<Option<&Entity<T>>>
    where
        F: FnMut(&Entity<T>) -> bool,
    {
        self.hydrate()?;
        if let Some(index) = self.entities.iter().position(&mut predicate) {
            return Ok(Some(&self.entities[index]));
        }

        loop {
            let start = self.entities.len();
            if self.fetch_next_page().await?.is_none() {
                return Ok(None);
            }
            if let Some(offset) = self.entities[start..].iter().position(&mut predicate) {
                return Ok(Some(&self.entities[start + offset]));
            }
        }
    }

    /// Consume the list, keeping what has been hydrated.
    pub fn into_entities(mut self) -> Result<Vec<Entity<T>>> {
        self.hydrate()?;
        Ok(self.entities)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{Credentials, Method};
    use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
    use serde::Deserialize;
    use serde_json::json;
    use url::Url;

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct Thing {
        thing_id: String,
        #[serde(default)]
        label: Option<String>,
    }

    impl Hydrate for Thing {
        const ENTITY_TYPE: &'static str = "Thing";

        fn id(&self) -> &str {
            &self.thing_id
        }
    }

    fn client() -> FavroClient {
        let credentials = Credentials::new("me@example.com", "token").unwrap();
        FavroClient::new(credentials, "http://127.0.0.1:9/api/v1").unwrap()
    }

    fn json_response(body: Value) -> FavroResponse {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        FavroResponse::from_parts(
            Method::Get,
            Url::parse("http://127.0.0.1:9/api/v1/things").unwrap(),
            200,
            headers,
            body.to_string().into_bytes(),
        )
    }

    #[test]
    fn test_entity_hydration_keeps_raw() {
        let raw = json!({"thingId": "t1", "label": "first", "extra": true});
        let entity: Entity<Thing> = Entity::hydrate(&raw, &client()).unwrap();
        assert_eq!(entity.id(), "t1");
        assert_eq!(entity.label.as_deref(), Some("first"));
        assert_eq!(entity.raw(), &raw);
        assert_eq!(serde_json::to_value(&entity).unwrap(), raw);
    }

    #[test]
    fn test_entity_hydration_rejects_bad_shape() {
        let err = Entity::<Thing>::hydrate(&json!({"label": "no id"}), &client()).unwrap_err();
        assert!(matches!(
            err,
            FavroError::Hydration {
                entity_type: "Thing",
                ..
            }
        ));
    }

    #[test]
    fn test_hydrate_is_idempotent() {
        let response = json_response(json!([{"thingId": "a"}, {"thingId": "b"}]));
        let mut list: EntityList<Thing> = EntityList::from_response(&client(), response);
        assert_eq!(list.state(), WalkState::HasUnhydratedPage);

        let first = list.hydrate().unwrap().map(<[_]>::len);
        assert_eq!(first, Some(2));
        assert!(list.hydrate().unwrap().is_none());
        assert_eq!(list.fetched_entities().unwrap().len(), 2);
    }

    #[test]
    fn test_bare_array_is_exhausted_after_hydration() {
        let response = json_response(json!([{"thingId": "a"}]));
        let mut list: EntityList<Thing> = EntityList::from_response(&client(), response);
        list.hydrate().unwrap();
        assert!(list.is_exhausted());
    }

    #[test]
    fn test_unfinished_envelope_is_hydrated_not_exhausted() {
        let response = json_response(json!({
            "limit": 1, "page": 0, "pages": 2, "requestId": "r",
            "entities": [{"thingId": "a"}]
        }));
        let mut list: EntityList<Thing> = EntityList::from_response(&client(), response);
        list.hydrate().unwrap();
        assert_eq!(list.state(), WalkState::Hydrated);
    }

    #[test]
    fn test_failed_hydration_keeps_page_pending() {
        let response = json_response(json!([{"thingId": "a"}, {"nope": 1}]));
        let mut list: EntityList<Thing> = EntityList::from_response(&client(), response);
        assert!(list.hydrate().is_err());
        assert_eq!(list.state(), WalkState::HasUnhydratedPage);
        assert!(list.entities.is_empty());
    }

    #[tokio::test]
    async fn test_exhausted_list_makes_no_requests() {
        // The client points at a closed port: any request would fail.
        let response = json_response(json!({"thingId": "only"}));
        let mut list: EntityList<Thing> = EntityList::from_response(&client(), response);

        assert!(list.fetch_next_page().await.unwrap().is_none());
        assert!(list.fetch_next_page().await.unwrap().is_none());
        let all = list.all_entities().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].id(), "only");
    }

    #[tokio::test]
    async fn test_find_checks_fetched_entities_first() {
        let response = json_response(json!([{"thingId": "a"}, {"thingId": "b"}]));
        let mut list: EntityList<Thing> = EntityList::from_response(&client(), response);

        let found = list.find(|t| t.id() == "b").await.unwrap();
        assert_eq!(found.map(|t| t.id().to_string()), Some("b".to_string()));
        let missing = list.find(|t| t.id() == "z").await.unwrap();
        assert!(missing.is_none());
    }
}
