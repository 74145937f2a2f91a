//! CLI argument parsing types.
//!
//! This module provides the command-line interface structure for the favroapi binary.

use clap::{Parser, Subcommand, ValueEnum};

/// Favro API command-line interface.
#[derive(Parser, Debug)]
#[command(name = "favroapi", about = "Favro API CLI", version)]
pub struct Cli {
    /// Output results as JSON instead of a table.
    #[arg(long, global = true, default_value = "false")]
    pub json: bool,

    /// Organization to scope requests to.
    #[arg(long, global = true, env = "FAVRO_ORGANIZATION_ID")]
    pub organization: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Get a single entity by ID.
    Get {
        /// The type of entity to get.
        entity: Entity,

        /// The entity ID.
        id: String,
    },

    /// List entities, page by page.
    List {
        /// The type of entity to list.
        entity: Entity,

        /// Collection to list widgets or cards from.
        #[arg(long)]
        collection: Option<String>,

        /// Widget to list columns or cards from.
        #[arg(long)]
        widget: Option<String>,

        /// Stop after this many pages.
        #[arg(long)]
        pages: Option<usize>,
    },

    /// Delete an entity.
    Delete {
        /// The type of entity to delete.
        entity: Entity,

        /// The entity ID.
        id: String,
    },
}

/// Entity types that can be operated on.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Entity {
    /// An organization.
    #[value(alias = "organizations")]
    Organization,
    /// A user in the organization.
    #[value(alias = "users")]
    User,
    /// A collection of widgets.
    #[value(alias = "collections")]
    Collection,
    /// A board or backlog.
    #[value(aliases = ["widgets", "board", "boards"])]
    Widget,
    /// A board column.
    #[value(alias = "columns")]
    Column,
    /// A card.
    #[value(alias = "cards")]
    Card,
    /// A custom field definition.
    #[value(aliases = ["custom-fields", "customfields"])]
    CustomField,
    /// A webhook.
    #[value(alias = "webhooks")]
    Webhook,
}
