//! Output formatting for CLI display.
//!
//! Provides the [`PrettyPrint`] trait for human-readable output
//! as an alternative to JSON serialization.

use crate::{Card, Collection, Column, Widget};

/// Trait for human-readable key-value output.
///
/// Implemented by entity types to provide formatted output
/// suitable for terminal display when `--json` is not specified.
pub trait PrettyPrint {
    /// Returns a formatted string for terminal display.
    fn pretty_print(&self) -> String;
}

fn header(label: &str, id: &str) -> Vec<String> {
    let title = format!("{label}: {id}");
    let divider = "─".repeat(title.chars().count().max(30));
    vec![title, divider]
}

impl PrettyPrint for Card {
    fn pretty_print(&self) -> String {
        let mut lines = header("Card", &self.card_id);
        lines.push(format!("Name:           {}", self.name));

        if let Some(seq) = self.sequential_id {
            lines.push(format!("Sequential ID:  #{seq}"));
        }
        if let Some(ref widget) = self.widget_common_id {
            lines.push(format!("Widget:         {widget}"));
        }
        if let Some(ref column) = self.column_id {
            lines.push(format!("Column:         {column}"));
        }
        if !self.tags.is_empty() {
            lines.push(format!("Tags:           {}", self.tags.join(", ")));
        }
        if self.tasks_total > 0 {
            lines.push(format!(
                "Tasks:          {}/{} done",
                self.tasks_done, self.tasks_total
            ));
        }
        if !self.assignments.is_empty() {
            let users: Vec<&str> = self.assignments.iter().map(|a| a.user_id.as_str()).collect();
            lines.push(format!("Assigned:       {}", users.join(", ")));
        }
        if self.archived {
            lines.push("Archived:       yes".to_string());
        }

        lines.join("\n")
    }
}

impl PrettyPrint for Collection {
    fn pretty_print(&self) -> String {
        let mut lines = header("Collection", &self.collection_id);
        lines.push(format!("Name:           {}", self.name));
        lines.push(format!("Members:        {}", self.shared_to_users.len()));
        if let Some(ref sharing) = self.public_sharing {
            lines.push(format!("Sharing:        {sharing}"));
        }
        if self.archived {
            lines.push("Archived:       yes".to_string());
        }
        lines.join("\n")
    }
}

impl PrettyPrint for Widget {
    fn pretty_print(&self) -> String {
        let mut lines = header("Widget", &self.widget_common_id);
        lines.push(format!("Name:           {}", self.name));
        if let Some(ref kind) = self.widget_type {
            lines.push(format!("Type:           {kind}"));
        }
        lines.push(format!("Collections:    {}", self.collection_ids.join(", ")));
        lines.join("\n")
    }
}

impl PrettyPrint for Column {
    fn pretty_print(&self) -> String {
        let mut lines = header("Column", &self.column_id);
        lines.push(format!("Name:           {}", self.name));
        lines.push(format!("Widget:         {}", self.widget_common_id));
        lines.push(format!("Position:       {}", self.position));
        lines.push(format!("Cards:          {}", self.card_count));
        lines.join("\n")
    }
}
