//! Card endpoint handlers.

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};

use super::{error, matches_filters, not_found, paged, Params};
use crate::mock_server::state::{find_by, remove_by, SharedState};

const CARD_FILTERS: &[&str] = &["widgetCommonId", "columnId", "cardCommonId", "sequentialId"];

/// GET /cards
pub async fn list_cards(
    State(state): State<SharedState>,
    Query(params): Query<Params>,
) -> Response {
    let mut state = state.write().await;

    let in_collection: Option<Vec<String>> = params.get("collectionId").map(|collection| {
        state
            .widgets
            .iter()
            .filter(|w| {
                w.get("collectionIds")
                    .and_then(Value::as_array)
                    .map(|ids| ids.iter().any(|id| id.as_str() == Some(collection.as_str())))
                    .unwrap_or(false)
            })
            .filter_map(|w| w.get("widgetCommonId").and_then(Value::as_str).map(String::from))
            .collect()
    });

    let matching: Vec<Value> = state
        .cards
        .iter()
        .filter(|c| matches_filters(c, &params, CARD_FILTERS))
        .filter(|c| match &in_collection {
            Some(widgets) => c
                .get("widgetCommonId")
                .and_then(Value::as_str)
                .map(|w| widgets.iter().any(|id| id == w))
                .unwrap_or(false),
            None => true,
        })
        .cloned()
        .collect();
    paged(&mut state, &params, matching)
}

/// GET /cards/{id}
pub async fn get_card(State(state): State<SharedState>, Path(id): Path<String>) -> Response {
    let state = state.read().await;
    match find_by(&state.cards, "cardId", &id) {
        Some(card) => (StatusCode::OK, Json(card.clone())).into_response(),
        None => not_found("card", &id),
    }
}

/// POST /cards
pub async fn create_card(State(state): State<SharedState>, Json(params): Json<Value>) -> Response {
    let Some(name) = params.get("name").and_then(Value::as_str) else {
        return error(StatusCode::BAD_REQUEST, "name is required");
    };

    let mut state = state.write().await;
    let sequential_id = state.cards.len() as u64 + 1;
    let card = json!({
        "cardId": state.new_id("card"),
        "cardCommonId": state.new_id("common"),
        "organizationId": state.organization_id,
        "widgetCommonId": params.get("widgetCommonId"),
        "columnId": params.get("columnId"),
        "name": name,
        "detailedDescription": params.get("detailedDescription"),
        "tags": params.get("tags").cloned().unwrap_or(json!([])),
        "sequentialId": sequential_id,
        "archived": false,
    });
    state.cards.push(card.clone());
    (StatusCode::OK, Json(card)).into_response()
}

/// PUT /cards/{id}
pub async fn update_card(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Json(params): Json<Value>,
) -> Response {
    let mut state = state.write().await;
    let Some(card) = state
        .cards
        .iter_mut()
        .find(|c| c.get("cardId").and_then(Value::as_str) == Some(id.as_str()))
    else {
        return not_found("card", &id);
    };

    for (param, field) in [
        ("name", "name"),
        ("detailedDescription", "detailedDescription"),
        ("columnId", "columnId"),
        ("archive", "archived"),
    ] {
        if let Some(value) = params.get(param) {
            card[field] = value.clone();
        }
    }

    let mut tags: Vec<Value> = card["tags"].as_array().cloned().unwrap_or_default();
    if let Some(add) = params.get("addTags").and_then(Value::as_array) {
        for tag in add {
            if !tags.contains(tag) {
                tags.push(tag.clone());
            }
        }
    }
    if let Some(remove) = params.get("removeTags").and_then(Value::as_array) {
        tags.retain(|t| !remove.contains(t));
    }
    card["tags"] = Value::Array(tags);

    (StatusCode::OK, Json(card.clone())).into_response()
}

/// DELETE /cards/{id}
pub async fn delete_card(State(state): State<SharedState>, Path(id): Path<String>) -> Response {
    let mut state = state.write().await;
    if remove_by(&mut state.cards, "cardId", &id) {
        StatusCode::OK.into_response()
    } else {
        not_found("card", &id)
    }
}

/// POST /cards/{id}/attachment
pub async fn attach_to_card(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Query(params): Query<Params>,
    body: Bytes,
) -> Response {
    let Some(filename) = params.get("filename") else {
        return error(StatusCode::BAD_REQUEST, "filename is required");
    };

    let mut state = state.write().await;
    let Some(card) = state
        .cards
        .iter_mut()
        .find(|c| c.get("cardId").and_then(Value::as_str) == Some(id.as_str()))
    else {
        return not_found("card", &id);
    };

    let attachment = json!({
        "name": filename,
        "fileUrl": format!("https://files.favro.test/{id}/{filename}?size={}", body.len()),
    });
    match card.get_mut("attachments").and_then(Value::as_array_mut) {
        Some(list) => list.push(attachment.clone()),
        None => card["attachments"] = json!([attachment.clone()]),
    }
    (StatusCode::OK, Json(attachment)).into_response()
}
