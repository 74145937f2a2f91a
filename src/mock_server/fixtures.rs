//! Test data fixtures for the mock server.
//!
//! Factories return records as raw JSON, shaped the way the API sends them.

use serde_json::{json, Value};

use super::state::MockState;

/// Collection of fixture factories for test data.
pub struct Fixtures;

impl Fixtures {
    /// An organization with one administrator.
    pub fn organization(organization_id: &str, name: &str) -> Value {
        json!({
            "organizationId": organization_id,
            "name": name,
            "sharedToUsers": [
                {"userId": "user-1", "role": "administrator", "joinDate": "2024-01-15T09:00:00.000Z"}
            ],
        })
    }

    /// A collection shared with one user.
    pub fn collection(collection_id: &str, name: &str) -> Value {
        json!({
            "collectionId": collection_id,
            "organizationId": "org-1",
            "name": name,
            "sharedToUsers": [{"userId": "user-1", "role": "admin"}],
            "publicSharing": "users",
            "archived": false,
            "fullMembersCanAddWidgets": true,
        })
    }

    /// A board in one collection.
    pub fn board(widget_common_id: &str, name: &str, collection_id: &str) -> Value {
        json!({
            "widgetCommonId": widget_common_id,
            "organizationId": "org-1",
            "collectionIds": [collection_id],
            "name": name,
            "type": "board",
            "color": "blue",
        })
    }

    /// A column on a board.
    pub fn column(column_id: &str, widget_common_id: &str, name: &str, position: u32) -> Value {
        json!({
            "columnId": column_id,
            "organizationId": "org-1",
            "widgetCommonId": widget_common_id,
            "name": name,
            "position": position,
            "cardCount": 0,
        })
    }

    /// A card instance on a board column.
    pub fn card(n: u64, widget_common_id: &str, column_id: &str) -> Value {
        json!({
            "cardId": format!("card-{n}"),
            "cardCommonId": format!("common-{n}"),
            "organizationId": "org-1",
            "widgetCommonId": widget_common_id,
            "columnId": column_id,
            "name": format!("Card {n}"),
            "detailedDescription": format!("Description of card {n}"),
            "tags": [],
            "sequentialId": n,
            "assignments": [{"userId": "user-1", "completed": false}],
            "tasksTotal": 2,
            "tasksDone": n % 3,
            "archived": false,
        })
    }

    /// One organization, one collection holding one board with two
    /// columns, and five cards served two per page.
    pub fn default_scenario() -> MockState {
        let mut state = MockState::new()
            .with_organization(Self::organization("org-1", "Acme"))
            .with_collection(Self::collection("col-1", "Roadmap"))
            .with_widget(Self::board("widget-1", "Sprint board", "col-1"))
            .with_column(Self::column("column-todo", "widget-1", "To do", 0))
            .with_column(Self::column("column-done", "widget-1", "Done", 1))
            .with_page_size(2);

        for n in 1..=5 {
            let column = if n <= 3 { "column-todo" } else { "column-done" };
            state = state.with_card(Self::card(n, "widget-1", column));
        }
        state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Card, Collection, Column, Organization, Widget};

    #[test]
    fn test_fixtures_hydrate_as_models() {
        let card: Card = serde_json::from_value(Fixtures::card(3, "w", "c")).unwrap();
        assert_eq!(card.card_id, "card-3");
        assert_eq!(card.sequential_id, Some(3));
        assert!(!card.tasks_complete());

        let widget: Widget = serde_json::from_value(Fixtures::board("w", "Board", "c")).unwrap();
        assert!(!widget.is_backlog());

        let _: Collection = serde_json::from_value(Fixtures::collection("c", "C")).unwrap();
        let _: Column = serde_json::from_value(Fixtures::column("k", "w", "K", 0)).unwrap();
        let _: Organization = serde_json::from_value(Fixtures::organization("o", "O")).unwrap();
    }

    #[test]
    fn test_default_scenario() {
        let state = Fixtures::default_scenario();
        assert_eq!(state.organization_id, "org-1");
        assert_eq!(state.cards.len(), 5);
        assert_eq!(state.columns.len(), 2);
        assert_eq!(state.page_size, 2);
    }
}
