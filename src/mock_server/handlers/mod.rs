//! HTTP request handlers for the mock server.

pub mod boards;
pub mod cards;

pub use boards::*;
pub use cards::*;

use std::collections::HashMap;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::Value;

use super::state::MockState;

/// Query string as a flat map.
pub type Params = HashMap<String, String>;

/// A Favro-shaped error body.
pub fn error(status: StatusCode, message: &str) -> Response {
    (
        status,
        Json(serde_json::json!({ "message": message })),
    )
        .into_response()
}

/// 404 for an entity type.
pub fn not_found(entity: &str, id: &str) -> Response {
    error(
        StatusCode::NOT_FOUND,
        &format!("No {entity} found with id: {id}"),
    )
}

/// Whether `record[key]` equals the query value for every key present.
pub fn matches_filters(record: &Value, params: &Params, keys: &[&str]) -> bool {
    keys.iter().all(|key| match params.get(*key) {
        None => true,
        Some(expected) => match record.get(*key) {
            Some(Value::String(s)) => s == expected,
            Some(Value::Array(items)) => items.iter().any(|i| i.as_str() == Some(expected)),
            Some(other) => other.to_string() == *expected,
            None => false,
        },
    })
}

/// Answer with one page of `matching`, honoring `requestId` and `page`.
pub fn paged(state: &mut MockState, params: &Params, matching: Vec<Value>) -> Response {
    let page = params
        .get("page")
        .and_then(|p| p.parse().ok())
        .unwrap_or(0);
    match state.page_of(params.get("requestId").map(String::as_str), page, matching) {
        Some(body) => (StatusCode::OK, Json(body)).into_response(),
        None => error(StatusCode::BAD_REQUEST, "Unknown requestId"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_matches_filters() {
        let widget = json!({"widgetCommonId": "w1", "collectionIds": ["c1", "c2"], "sequentialId": 7});
        let mut params = Params::new();
        assert!(matches_filters(&widget, &params, &["collectionIds"]));

        params.insert("collectionIds".to_string(), "c2".to_string());
        assert!(matches_filters(&widget, &params, &["collectionIds"]));

        params.insert("sequentialId".to_string(), "7".to_string());
        assert!(matches_filters(&widget, &params, &["collectionIds", "sequentialId"]));

        params.insert("widgetCommonId".to_string(), "w2".to_string());
        assert!(!matches_filters(&widget, &params, &["widgetCommonId"]));
    }
}
