//! Organization, collection, widget and column handlers.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};

use super::{error, matches_filters, not_found, paged, Params};
use crate::mock_server::state::{find_by, remove_by, SharedState};

/// GET /organizations
pub async fn list_organizations(
    State(state): State<SharedState>,
    Query(params): Query<Params>,
) -> Response {
    let mut state = state.write().await;
    let all = state.organizations.clone();
    paged(&mut state, &params, all)
}

/// GET /organizations/{id}
pub async fn get_organization(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Response {
    let state = state.read().await;
    match find_by(&state.organizations, "organizationId", &id) {
        Some(org) => (StatusCode::OK, Json(org.clone())).into_response(),
        None => not_found("organization", &id),
    }
}

/// GET /collections
pub async fn list_collections(
    State(state): State<SharedState>,
    Query(params): Query<Params>,
) -> Response {
    let mut state = state.write().await;
    let include_archived = params.get("archived").map(String::as_str) == Some("true");
    let matching: Vec<Value> = state
        .collections
        .iter()
        .filter(|c| include_archived || c.get("archived") != Some(&Value::Bool(true)))
        .cloned()
        .collect();
    paged(&mut state, &params, matching)
}

/// GET /collections/{id}
pub async fn get_collection(State(state): State<SharedState>, Path(id): Path<String>) -> Response {
    let state = state.read().await;
    match find_by(&state.collections, "collectionId", &id) {
        Some(c) => (StatusCode::OK, Json(c.clone())).into_response(),
        None => not_found("collection", &id),
    }
}

/// POST /collections
pub async fn create_collection(
    State(state): State<SharedState>,
    Json(params): Json<Value>,
) -> Response {
    let Some(name) = params.get("name").and_then(Value::as_str) else {
        return error(StatusCode::BAD_REQUEST, "name is required");
    };

    let mut state = state.write().await;
    let collection = json!({
        "collectionId": state.new_id("collection"),
        "organizationId": state.organization_id,
        "name": name,
        "sharedToUsers": [],
        "publicSharing": params.get("publicSharing").cloned().unwrap_or(json!("users")),
        "archived": false,
    });
    state.collections.push(collection.clone());
    (StatusCode::OK, Json(collection)).into_response()
}

/// DELETE /collections/{id}
pub async fn delete_collection(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Response {
    let mut state = state.write().await;
    if remove_by(&mut state.collections, "collectionId", &id) {
        StatusCode::OK.into_response()
    } else {
        not_found("collection", &id)
    }
}

/// GET /widgets
pub async fn list_widgets(
    State(state): State<SharedState>,
    Query(params): Query<Params>,
) -> Response {
    let mut state = state.write().await;
    let matching: Vec<Value> = state
        .widgets
        .iter()
        .filter(|w| match params.get("collectionId") {
            Some(collection) => w
                .get("collectionIds")
                .and_then(Value::as_array)
                .map(|ids| ids.iter().any(|id| id.as_str() == Some(collection)))
                .unwrap_or(false),
            None => true,
        })
        .cloned()
        .collect();
    paged(&mut state, &params, matching)
}

/// GET /widgets/{id}
pub async fn get_widget(State(state): State<SharedState>, Path(id): Path<String>) -> Response {
    let state = state.read().await;
    match find_by(&state.widgets, "widgetCommonId", &id) {
        Some(w) => (StatusCode::OK, Json(w.clone())).into_response(),
        None => not_found("widget", &id),
    }
}

/// DELETE /widgets/{id}
pub async fn delete_widget(State(state): State<SharedState>, Path(id): Path<String>) -> Response {
    let mut state = state.write().await;
    if remove_by(&mut state.widgets, "widgetCommonId", &id) {
        StatusCode::OK.into_response()
    } else {
        not_found("widget", &id)
    }
}

/// GET /columns
pub async fn list_columns(
    State(state): State<SharedState>,
    Query(params): Query<Params>,
) -> Response {
    if !params.contains_key("widgetCommonId") && !params.contains_key("requestId") {
        return error(StatusCode::BAD_REQUEST, "widgetCommonId is required");
    }
    let mut state = state.write().await;
    let matching: Vec<Value> = state
        .columns
        .iter()
        .filter(|c| matches_filters(c, &params, &["widgetCommonId"]))
        .cloned()
        .collect();
    paged(&mut state, &params, matching)
}

/// GET /columns/{id}
pub async fn get_column(State(state): State<SharedState>, Path(id): Path<String>) -> Response {
    let state = state.read().await;
    match find_by(&state.columns, "columnId", &id) {
        Some(c) => (StatusCode::OK, Json(c.clone())).into_response(),
        None => not_found("column", &id),
    }
}

/// POST /columns
pub async fn create_column(State(state): State<SharedState>, Json(params): Json<Value>) -> Response {
    let (Some(widget), Some(name)) = (
        params.get("widgetCommonId").and_then(Value::as_str),
        params.get("name").and_then(Value::as_str),
    ) else {
        return error(StatusCode::BAD_REQUEST, "widgetCommonId and name are required");
    };

    let mut state = state.write().await;
    let position = state
        .columns
        .iter()
        .filter(|c| c.get("widgetCommonId").and_then(Value::as_str) == Some(widget))
        .count();
    let column = json!({
        "columnId": state.new_id("column"),
        "organizationId": state.organization_id,
        "widgetCommonId": widget,
        "name": name,
        "position": params.get("position").cloned().unwrap_or(json!(position)),
        "cardCount": 0,
    });
    state.columns.push(column.clone());
    (StatusCode::OK, Json(column)).into_response()
}

/// DELETE /columns/{id}
pub async fn delete_column(State(state): State<SharedState>, Path(id): Path<String>) -> Response {
    let mut state = state.write().await;
    if remove_by(&mut state.columns, "columnId", &id) {
        StatusCode::OK.into_response()
    } else {
        not_found("column", &id)
    }
}
