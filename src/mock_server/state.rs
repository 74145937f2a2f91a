//! Mock server state management.
//!
//! Records are stored as raw JSON, exactly as the API would send them.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::{json, Value};
use tokio::sync::RwLock;

/// Shared handle to the mock state.
pub type SharedState = Arc<RwLock<MockState>>;

/// One request as the server saw it.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub host: Option<String>,
    pub backend_id: Option<String>,
    pub organization_id: Option<String>,
    pub content_type: Option<String>,
}

/// State for the mock server.
#[derive(Debug)]
pub struct MockState {
    pub organization_id: String,
    pub organizations: Vec<Value>,
    pub collections: Vec<Value>,
    pub widgets: Vec<Value>,
    pub columns: Vec<Value>,
    pub cards: Vec<Value>,

    /// Entities per page of a paged list.
    pub page_size: usize,

    /// Requests left before the server answers 429. `None` disables the
    /// rate-limit headers entirely.
    pub requests_remaining: Option<i64>,

    /// Backend identifier sent on every response. Paged follow-ups must
    /// echo it back.
    pub backend_id: String,

    /// Every request received, in order.
    pub request_log: Vec<RecordedRequest>,

    cursors: HashMap<String, Vec<Value>>,
    next_id: u64,
}

impl Default for MockState {
    fn default() -> Self {
        Self {
            organization_id: "org-1".to_string(),
            organizations: Vec::new(),
            collections: Vec::new(),
            widgets: Vec::new(),
            columns: Vec::new(),
            cards: Vec::new(),
            page_size: 100,
            requests_remaining: None,
            backend_id: "backend-1".to_string(),
            request_log: Vec::new(),
            cursors: HashMap::new(),
            next_id: 1000,
        }
    }
}

impl MockState {
    /// Create a new empty state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create state wrapped in Arc<RwLock> for sharing.
    pub fn shared(self) -> SharedState {
        Arc::new(RwLock::new(self))
    }

    pub fn with_organization(mut self, organization: Value) -> Self {
        self.organizations.push(organization);
        self
    }

    pub fn with_collection(mut self, collection: Value) -> Self {
        self.collections.push(collection);
        self
    }

    pub fn with_widget(mut self, widget: Value) -> Self {
        self.widgets.push(widget);
        self
    }

    pub fn with_column(mut self, column: Value) -> Self {
        self.columns.push(column);
        self
    }

    pub fn with_card(mut self, card: Value) -> Self {
        self.cards.push(card);
        self
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn with_budget(mut self, requests: i64) -> Self {
        self.requests_remaining = Some(requests);
        self
    }

    pub fn with_backend_id(mut self, backend_id: &str) -> Self {
        self.backend_id = backend_id.to_string();
        self
    }

    /// A fresh identifier with the given prefix.
    pub fn new_id(&mut self, prefix: &str) -> String {
        let id = format!("{prefix}-{}", self.next_id);
        self.next_id += 1;
        id
    }

    /// Build one page of a paged list.
    ///
    /// Without a `request_id` the matching records are snapshotted under a
    /// new cursor. Returns `None` for an unknown cursor.
    pub fn page_of(
        &mut self,
        request_id: Option<&str>,
        page: usize,
        matching: Vec<Value>,
    ) -> Option<Value> {
        let (request_id, records) = match request_id {
            Some(id) => (id.to_string(), self.cursors.get(id)?.clone()),
            None => {
                let id = self.new_id("request");
                self.cursors.insert(id.clone(), matching.clone());
                (id, matching)
            }
        };

        let pages = records.len().div_ceil(self.page_size).max(1);
        let entities: Vec<Value> = records
            .into_iter()
            .skip(page * self.page_size)
            .take(self.page_size)
            .collect();

        Some(json!({
            "limit": self.page_size,
            "page": page,
            "pages": pages,
            "requestId": request_id,
            "entities": entities,
        }))
    }

    /// Requests that hit `path` (relative to the API root).
    pub fn requests_to(&self, path: &str) -> Vec<&RecordedRequest> {
        let full = format!("/api/v1/{}", path.trim_start_matches('/'));
        self.request_log.iter().filter(|r| r.path == full).collect()
    }
}

/// Find a record by its id field.
pub(crate) fn find_by<'a>(records: &'a [Value], key: &str, id: &str) -> Option<&'a Value> {
    records
        .iter()
        .find(|r| r.get(key).and_then(Value::as_str) == Some(id))
}

/// Remove a record by its id field, returning whether it existed.
pub(crate) fn remove_by(records: &mut Vec<Value>, key: &str, id: &str) -> bool {
    let before = records.len();
    records.retain(|r| r.get(key).and_then(Value::as_str) != Some(id));
    records.len() != before
}
