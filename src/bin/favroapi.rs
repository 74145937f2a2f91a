//! Favro API CLI binary.
//!
//! A command-line interface for interacting with the Favro API.

use clap::Parser;
use favroapi::cli::{Cli, Command, Entity as EntityKind};
use favroapi::output::PrettyPrint;
use favroapi::{
    Card, CardListQuery, Collection, Column, ColumnListQuery, CustomField, Delete, Entity,
    EntityList, FavroClient, FavroError, Get, Hydrate, List, Organization, User, Webhook, Widget,
    WidgetListQuery,
};
use serde::Serialize;
use std::process::ExitCode;
use tabled::{Table, Tabled};

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let cli = Cli::parse();

    let mut client = match FavroClient::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {e}");
            eprintln!("Hint: Set FAVRO_TOKEN and FAVRO_USER_EMAIL environment variables");
            return ExitCode::FAILURE;
        }
    };
    if let Some(org) = cli.organization.clone() {
        client.set_organization(Some(org));
    }

    match run(&client, cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(client: &FavroClient, cli: Cli) -> favroapi::Result<()> {
    match cli.command {
        Command::Get { entity, id } => handle_get(client, entity, &id, cli.json).await,
        Command::List {
            entity,
            collection,
            widget,
            pages,
        } => handle_list(client, entity, collection, widget, pages, cli.json).await,
        Command::Delete { entity, id } => handle_delete(client, entity, &id).await,
    }
}

async fn handle_get(
    client: &FavroClient,
    entity: EntityKind,
    id: &str,
    json: bool,
) -> favroapi::Result<()> {
    match entity {
        EntityKind::Organization => print_json(&Organization::get(client, id).await?)?,
        EntityKind::Collection => output_single(&Collection::get(client, id).await?, json)?,
        EntityKind::Widget => output_single(&Widget::get(client, id).await?, json)?,
        EntityKind::Column => output_single(&Column::get(client, id).await?, json)?,
        EntityKind::Card => output_single(&Card::get(client, id).await?, json)?,
        EntityKind::CustomField => print_json(&CustomField::get(client, id).await?)?,
        EntityKind::User | EntityKind::Webhook => {
            return Err(FavroError::InvalidQuery(format!(
                "{entity:?} entities can only be listed"
            )));
        }
    }
    Ok(())
}

async fn handle_list(
    client: &FavroClient,
    entity: EntityKind,
    collection: Option<String>,
    widget: Option<String>,
    pages: Option<usize>,
    json: bool,
) -> favroapi::Result<()> {
    match entity {
        EntityKind::Organization => {
            let list = Organization::list(client, &())?;
            output_list(collect(list, pages).await?, json, |e| OrganizationRow::from(e))?;
        }
        EntityKind::User => {
            let list = User::list(client, &())?;
            output_list(collect(list, pages).await?, json, |e| UserRow::from(e))?;
        }
        EntityKind::Collection => {
            let list = Collection::list(client, &Default::default())?;
            output_list(collect(list, pages).await?, json, |e| CollectionRow::from(e))?;
        }
        EntityKind::Widget => {
            let query = WidgetListQuery {
                collection_id: collection,
                ..Default::default()
            };
            let list = Widget::list(client, &query)?;
            output_list(collect(list, pages).await?, json, |e| WidgetRow::from(e))?;
        }
        EntityKind::Column => {
            let query = ColumnListQuery {
                widget_common_id: widget,
            };
            let list = Column::list(client, &query)?;
            output_list(collect(list, pages).await?, json, |e| ColumnRow::from(e))?;
        }
        EntityKind::Card => {
            let query = CardListQuery {
                widget_common_id: widget,
                collection_id: collection,
                ..Default::default()
            };
            let list = Card::list(client, &query)?;
            output_list(collect(list, pages).await?, json, |e| CardRow::from(e))?;
        }
        EntityKind::CustomField => {
            let list = CustomField::list(client, &())?;
            output_list(collect(list, pages).await?, json, |e| CustomFieldRow::from(e))?;
        }
        EntityKind::Webhook => {
            let list = Webhook::list(client, &())?;
            output_list(collect(list, pages).await?, json, |e| WebhookRow::from(e))?;
        }
    }

    let session = client.session();
    if let Some(remaining) = session.requests_remaining {
        eprintln!(
            "{remaining} requests remaining (resets {})",
            session.limit_resets_at.format("%Y-%m-%d %H:%M:%S UTC")
        );
    }
    Ok(())
}

async fn handle_delete(client: &FavroClient, entity: EntityKind, id: &str) -> favroapi::Result<()> {
    match entity {
        EntityKind::Collection => Collection::delete(client, id).await?,
        EntityKind::Widget => Widget::delete(client, id).await?,
        EntityKind::Column => Column::delete(client, id).await?,
        EntityKind::Card => Card::delete(client, id).await?,
        EntityKind::Webhook => Webhook::delete(client, id).await?,
        _ => {
            return Err(FavroError::InvalidQuery(format!(
                "delete is not supported for {entity:?}"
            )));
        }
    }
    eprintln!("Deleted {entity:?} {id}");
    Ok(())
}

/// Fetch up to `pages` pages, or everything when no limit is given.
async fn collect<T: Hydrate>(
    mut list: EntityList<T>,
    pages: Option<usize>,
) -> favroapi::Result<Vec<Entity<T>>> {
    match pages {
        None => {
            list.all_entities().await?;
        }
        Some(limit) => {
            for _ in 0..limit {
                if list.fetch_next_page().await?.is_none() {
                    break;
                }
            }
        }
    }
    list.into_entities()
}

fn print_json<T: Serialize>(item: &T) -> favroapi::Result<()> {
    println!("{}", serde_json::to_string_pretty(item)?);
    Ok(())
}

fn output_single<T: PrettyPrint>(item: &Entity<T>, json: bool) -> favroapi::Result<()> {
    if json {
        print_json(item)
    } else {
        println!("{}", item.pretty_print());
        Ok(())
    }
}

fn output_list<T, R, F>(entities: Vec<Entity<T>>, json: bool, to_row: F) -> favroapi::Result<()>
where
    R: Tabled,
    F: Fn(&Entity<T>) -> R,
{
    if json {
        print_json(&entities)
    } else {
        let rows: Vec<R> = entities.iter().map(to_row).collect();
        println!("{}", Table::new(rows));
        println!("\n{} total", entities.len());
        Ok(())
    }
}

// Table row types for non-JSON output

#[derive(Tabled)]
struct OrganizationRow {
    id: String,
    name: String,
    members: usize,
}

impl From<&Entity<Organization>> for OrganizationRow {
    fn from(o: &Entity<Organization>) -> Self {
        Self {
            id: o.organization_id.clone(),
            name: o.name.clone(),
            members: o.shared_to_users.len(),
        }
    }
}

#[derive(Tabled)]
struct UserRow {
    id: String,
    name: String,
    email: String,
    role: String,
}

impl From<&Entity<User>> for UserRow {
    fn from(u: &Entity<User>) -> Self {
        Self {
            id: u.user_id.clone(),
            name: u.name.clone(),
            email: u.email.clone(),
            role: u.organization_role.clone().unwrap_or_default(),
        }
    }
}

#[derive(Tabled)]
struct CollectionRow {
    id: String,
    name: String,
    archived: bool,
}

impl From<&Entity<Collection>> for CollectionRow {
    fn from(c: &Entity<Collection>) -> Self {
        Self {
            id: c.collection_id.clone(),
            name: c.name.clone(),
            archived: c.archived,
        }
    }
}

#[derive(Tabled)]
struct WidgetRow {
    id: String,
    name: String,
    #[tabled(rename = "type")]
    widget_type: String,
}

impl From<&Entity<Widget>> for WidgetRow {
    fn from(w: &Entity<Widget>) -> Self {
        Self {
            id: w.widget_common_id.clone(),
            name: w.name.clone(),
            widget_type: w.widget_type.clone().unwrap_or_default(),
        }
    }
}

#[derive(Tabled)]
struct ColumnRow {
    id: String,
    name: String,
    position: u32,
    cards: u32,
}

impl From<&Entity<Column>> for ColumnRow {
    fn from(c: &Entity<Column>) -> Self {
        Self {
            id: c.column_id.clone(),
            name: c.name.clone(),
            position: c.position,
            cards: c.card_count,
        }
    }
}

#[derive(Tabled)]
struct CardRow {
    id: String,
    #[tabled(rename = "#")]
    sequential_id: String,
    name: String,
    column: String,
}

impl From<&Entity<Card>> for CardRow {
    fn from(c: &Entity<Card>) -> Self {
        Self {
            id: c.card_id.clone(),
            sequential_id: c.sequential_id.map(|s| s.to_string()).unwrap_or_default(),
            name: c.name.clone(),
            column: c.column_id.clone().unwrap_or_default(),
        }
    }
}

#[derive(Tabled)]
struct CustomFieldRow {
    id: String,
    name: String,
    #[tabled(rename = "type")]
    field_type: String,
    enabled: bool,
}

impl From<&Entity<CustomField>> for CustomFieldRow {
    fn from(f: &Entity<CustomField>) -> Self {
        Self {
            id: f.custom_field_id.clone(),
            name: f.name.clone(),
            field_type: f.field_type.clone(),
            enabled: f.enabled,
        }
    }
}

#[derive(Tabled)]
struct WebhookRow {
    id: String,
    name: String,
    widget: String,
    url: String,
}

impl From<&Entity<Webhook>> for WebhookRow {
    fn from(w: &Entity<Webhook>) -> Self {
        Self {
            id: w.webhook_id.clone(),
            name: w.name.clone(),
            widget: w.widget_common_id.clone(),
            url: w.options.post_to_url.clone(),
        }
    }
}
